//! Draft Store: create, read, update, soft delete and search offer drafts.

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::instrument;

use super::draft_validator::{
    check_breakup_total, check_date_order, reject_blank, require_fields, to_product_lines,
};
use super::store_failure;
use crate::auth::TenantContext;
use crate::dtos::common::Page;
use crate::dtos::draft::{CreateDraftRequest, DraftSearchParams, UpdateDraftRequest};
use crate::dtos::non_blank;
use crate::error::AppError;
use crate::models::draft::{DraftAggregate, DraftChanges, DraftProductAggregate, NewDraft};
use crate::models::line::{CommercialTerms, ProductWithBreakups};
use crate::state::AppState;
use crate::store::{normalize_filter, DraftFilter, Paging, UnitOfWork};

const CREATE_FAILED: &str = "Failed to create offer draft";
const UPDATE_FAILED: &str = "Failed to update offer draft";

#[instrument(skip(state, tenant, req), fields(tenant = tenant.business_owner_id))]
pub async fn create_draft(
    state: &AppState,
    tenant: TenantContext,
    req: CreateDraftRequest,
) -> Result<DraftAggregate, AppError> {
    require_fields(&[
        ("fromParty", &req.from_party),
        ("origin", &req.origin),
        ("plantApprovalNumber", &req.plant_approval_number),
        ("brand", &req.brand),
    ])?;

    let lines = to_product_lines(&req.products)?;
    let grand_total = req.grand_total.unwrap_or(Decimal::ZERO);
    check_breakup_total(&lines, grand_total)?;

    let today = Utc::now().date_naive();
    check_date_order(req.offer_validity_date, req.shipment_date, true, today)?;

    let draft_name = non_blank(&req.draft_name);
    if let Some(name) = &draft_name {
        if state.repo.draft_name_exists(tenant.business_owner_id, name, None).await? {
            return Err(AppError::validation(format!("Draft name \"{name}\" already exists")));
        }
    }

    let new_draft = NewDraft {
        draft_name,
        terms: CommercialTerms {
            from_party: non_blank(&req.from_party).unwrap_or_default(),
            origin: non_blank(&req.origin).unwrap_or_default(),
            processor: non_blank(&req.processor),
            plant_approval_number: non_blank(&req.plant_approval_number).unwrap_or_default(),
            brand: non_blank(&req.brand).unwrap_or_default(),
            offer_validity_date: req.offer_validity_date,
            shipment_date: req.shipment_date,
            quantity: req.quantity,
            tolerance: req.tolerance,
            payment_terms: req.payment_terms,
            remark: req.remark,
        },
        grand_total,
    };

    let created = async {
        let mut uow = state.repo.begin().await?;
        let draft = uow.insert_draft(tenant.business_owner_id, &new_draft).await?;
        let products = write_products(uow.as_mut(), draft.draft_no, &lines).await?;
        uow.commit().await?;
        Ok::<_, AppError>(DraftAggregate { draft, products })
    }
    .await
    .map_err(|e| store_failure(e, CREATE_FAILED))?;

    tracing::info!(
        draft_no = created.draft.draft_no,
        products = created.products.len(),
        "Offer draft created"
    );
    Ok(created)
}

async fn write_products(
    uow: &mut dyn UnitOfWork,
    draft_no: i64,
    products: &[ProductWithBreakups],
) -> Result<Vec<DraftProductAggregate>, AppError> {
    let mut written = Vec::with_capacity(products.len());
    for p in products {
        let product = uow.insert_draft_product(draft_no, &p.line).await?;
        let mut size_breakups = Vec::with_capacity(p.size_breakups.len());
        for b in &p.size_breakups {
            size_breakups.push(uow.insert_draft_breakup(product.id, b).await?);
        }
        written.push(DraftProductAggregate { product, size_breakups });
    }
    Ok(written)
}

#[instrument(skip(state, tenant), fields(tenant = tenant.business_owner_id))]
pub async fn get_draft(state: &AppState, tenant: TenantContext, draft_no: i64) -> Result<DraftAggregate, AppError> {
    state
        .repo
        .find_draft(tenant.business_owner_id, draft_no)
        .await?
        .ok_or_else(|| AppError::not_found("Offer draft not found"))
}

#[instrument(skip(state, tenant, req), fields(tenant = tenant.business_owner_id))]
pub async fn update_draft(
    state: &AppState,
    tenant: TenantContext,
    draft_no: i64,
    req: UpdateDraftRequest,
) -> Result<DraftAggregate, AppError> {
    let existing = get_draft(state, tenant, draft_no).await?;

    reject_blank(&[
        ("draftName", &req.draft_name),
        ("fromParty", &req.from_party),
        ("origin", &req.origin),
        ("plantApprovalNumber", &req.plant_approval_number),
        ("brand", &req.brand),
    ])?;

    let terms = req.terms_changes();
    if terms.touches_dates() {
        let validity = terms.offer_validity_date.or(existing.draft.terms.offer_validity_date);
        let shipment = terms.shipment_date.or(existing.draft.terms.shipment_date);
        check_date_order(
            validity,
            shipment,
            terms.offer_validity_date.is_some(),
            Utc::now().date_naive(),
        )?;
    }

    let replacement = match &req.products {
        Some(products) => Some(to_product_lines(products)?),
        None => None,
    };
    if replacement.is_some() || req.grand_total.is_some() {
        let products = replacement
            .clone()
            .unwrap_or_else(|| existing.product_lines());
        let grand_total = req.grand_total.unwrap_or(existing.draft.grand_total);
        check_breakup_total(&products, grand_total)?;
    }

    let draft_name = non_blank(&req.draft_name);
    if let Some(name) = &draft_name {
        if state
            .repo
            .draft_name_exists(tenant.business_owner_id, name, Some(draft_no))
            .await?
        {
            return Err(AppError::validation(format!("Draft name \"{name}\" already exists")));
        }
    }

    let changes = DraftChanges {
        draft_name,
        terms,
        grand_total: req.grand_total,
    };

    async {
        let mut uow = state.repo.begin().await?;
        uow.update_draft(tenant.business_owner_id, draft_no, &changes)
            .await?
            .ok_or_else(|| AppError::not_found("Offer draft not found"))?;
        if let Some(products) = &replacement {
            uow.clear_draft_products(tenant.business_owner_id, draft_no).await?;
            write_products(uow.as_mut(), draft_no, products).await?;
        }
        uow.commit().await
    }
    .await
    .map_err(|e| store_failure(e, UPDATE_FAILED))?;

    tracing::info!(draft_no, replaced_products = replacement.is_some(), "Offer draft updated");
    get_draft(state, tenant, draft_no).await
}

/// Soft delete. Nested products and breakups are left in place.
#[instrument(skip(state, tenant), fields(tenant = tenant.business_owner_id))]
pub async fn delete_draft(state: &AppState, tenant: TenantContext, draft_no: i64) -> Result<(), AppError> {
    if !state.repo.soft_delete_draft(tenant.business_owner_id, draft_no).await? {
        return Err(AppError::not_found("Offer draft not found"));
    }
    tracing::info!(draft_no, "Offer draft deleted");
    Ok(())
}

#[instrument(skip(state, tenant, params), fields(tenant = tenant.business_owner_id))]
pub async fn search_drafts(
    state: &AppState,
    tenant: TenantContext,
    params: DraftSearchParams,
) -> Result<Page<DraftAggregate>, AppError> {
    let paging = Paging::new(params.offset, params.limit);

    let draft_nos = match normalize_filter(&params.product_name) {
        Some(product_name) => {
            let nos = state
                .repo
                .draft_nos_with_product(tenant.business_owner_id, &product_name)
                .await?;
            if nos.is_empty() {
                return Ok(Page::empty(paging));
            }
            Some(nos)
        }
        None => None,
    };

    let filter = DraftFilter {
        draft_no: params.draft_no,
        draft_name: params.draft_name,
        draft_nos,
    };

    let (items, total) = state
        .repo
        .search_drafts(tenant.business_owner_id, &filter, paging)
        .await?;
    Ok(Page::new(items, total, paging))
}
