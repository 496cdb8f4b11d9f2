//! Offer Store: read, search, field-level update and soft delete of offers.

use chrono::Utc;
use tracing::instrument;

use super::draft_validator::{check_date_order, reject_blank};
use super::store_failure;
use crate::auth::TenantContext;
use crate::dtos::common::Page;
use crate::dtos::non_blank;
use crate::dtos::offer::{OfferSearchParams, UpdateOfferRequest};
use crate::error::AppError;
use crate::models::buyer::Buyer;
use crate::models::offer::{OfferAggregate, OfferChanges, OfferStatus};
use crate::state::AppState;
use crate::store::{OfferFilter, Paging};

fn parse_status(raw: &str) -> Result<OfferStatus, AppError> {
    OfferStatus::from_string(raw.trim())
        .ok_or_else(|| AppError::validation(format!("Invalid offer status: {raw}")))
}

/// The offer with a summary of its buyer, when the buyer is still live.
#[instrument(skip(state, tenant), fields(tenant = tenant.business_owner_id))]
pub async fn get_offer(
    state: &AppState,
    tenant: TenantContext,
    offer_id: i64,
) -> Result<(OfferAggregate, Option<Buyer>), AppError> {
    let offer = state
        .repo
        .find_offer(tenant.business_owner_id, offer_id)
        .await?
        .ok_or_else(|| AppError::not_found("Offer not found"))?;
    let buyer = state
        .repo
        .find_buyer(tenant.business_owner_id, offer.offer.buyer_id)
        .await?;
    Ok((offer, buyer))
}

#[instrument(skip(state, tenant, params), fields(tenant = tenant.business_owner_id))]
pub async fn search_offers(
    state: &AppState,
    tenant: TenantContext,
    params: OfferSearchParams,
) -> Result<Page<OfferAggregate>, AppError> {
    let paging = Paging::new(params.offset, params.limit);
    let status = match non_blank(&params.status) {
        Some(raw) => Some(parse_status(&raw)?),
        None => None,
    };

    let filter = OfferFilter {
        offer_name: params.offer_name,
        business_name: params.business_name,
        to_party: params.to_party,
        buyer: params.buyer,
        product_name: params.product_name,
        status,
    };

    let (items, total) = state
        .repo
        .search_offers(tenant.business_owner_id, &filter, paging)
        .await?;
    Ok(Page::new(items, total, paging))
}

#[instrument(skip(state, tenant, req), fields(tenant = tenant.business_owner_id))]
pub async fn update_offer(
    state: &AppState,
    tenant: TenantContext,
    offer_id: i64,
    req: UpdateOfferRequest,
) -> Result<OfferAggregate, AppError> {
    let (existing, _) = get_offer(state, tenant, offer_id).await?;
    let current = existing.offer.status();

    reject_blank(&[
        ("offerName", &req.offer_name),
        ("toParty", &req.to_party),
        ("destination", &req.destination),
        ("fromParty", &req.from_party),
        ("origin", &req.origin),
        ("plantApprovalNumber", &req.plant_approval_number),
        ("brand", &req.brand),
    ])?;

    let status = match &req.status {
        Some(raw) => {
            let next = parse_status(raw)?;
            if !current.can_transition_to(next) {
                return Err(AppError::validation(format!(
                    "Offer status cannot change from {} to {}",
                    current.as_str(),
                    next.as_str()
                )));
            }
            (next != current).then_some(next)
        }
        None => None,
    };

    let terms = req.terms_changes();
    if terms.touches_dates() {
        let validity = terms.offer_validity_date.or(existing.offer.terms.offer_validity_date);
        let shipment = terms.shipment_date.or(existing.offer.terms.shipment_date);
        check_date_order(
            validity,
            shipment,
            terms.offer_validity_date.is_some(),
            Utc::now().date_naive(),
        )?;
    }

    let changes = OfferChanges {
        offer_name: non_blank(&req.offer_name),
        business_name: req.business_name,
        to_party: non_blank(&req.to_party),
        destination: non_blank(&req.destination),
        terms,
        grand_total: req.grand_total,
        status,
    };

    async {
        let mut uow = state.repo.begin().await?;
        uow.update_offer(tenant.business_owner_id, offer_id, &changes)
            .await?
            .ok_or_else(|| AppError::not_found("Offer not found"))?;
        uow.commit().await
    }
    .await
    .map_err(|e| store_failure(e, "Failed to update offer"))?;

    if let Some(next) = status {
        tracing::info!(offer_id, from = current.as_str(), to = next.as_str(), "Offer status changed");
    }

    state
        .repo
        .find_offer(tenant.business_owner_id, offer_id)
        .await?
        .ok_or_else(|| AppError::not_found("Offer not found"))
}

#[instrument(skip(state, tenant), fields(tenant = tenant.business_owner_id))]
pub async fn delete_offer(state: &AppState, tenant: TenantContext, offer_id: i64) -> Result<(), AppError> {
    if !state.repo.soft_delete_offer(tenant.business_owner_id, offer_id).await? {
        return Err(AppError::not_found("Offer not found"));
    }
    tracing::info!(offer_id, "Offer deleted");
    Ok(())
}
