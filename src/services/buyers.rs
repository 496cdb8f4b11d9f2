//! Tenant-scoped buyer registry. Offers can only be addressed to these.

use tracing::instrument;

use super::draft_validator::require_fields;
use crate::auth::TenantContext;
use crate::dtos::buyer::CreateBuyerRequest;
use crate::dtos::non_blank;
use crate::error::AppError;
use crate::models::buyer::{Buyer, NewBuyer};
use crate::state::AppState;

#[instrument(skip(state, tenant, req), fields(tenant = tenant.business_owner_id))]
pub async fn create_buyer(state: &AppState, tenant: TenantContext, req: CreateBuyerRequest) -> Result<Buyer, AppError> {
    require_fields(&[("companyName", &req.company_name), ("email", &req.email)])?;

    let email = non_blank(&req.email).unwrap_or_default();
    if !email.contains('@') {
        return Err(AppError::validation(format!("Invalid email address: {email}")));
    }

    let buyer = NewBuyer {
        company_name: non_blank(&req.company_name).unwrap_or_default(),
        contact_name: non_blank(&req.contact_name),
        email,
        phone: non_blank(&req.phone),
        address: non_blank(&req.address),
        city: non_blank(&req.city),
        state: non_blank(&req.state),
        country: non_blank(&req.country),
        postal_code: non_blank(&req.postal_code),
    };

    let created = state.repo.insert_buyer(tenant.business_owner_id, &buyer).await?;
    tracing::info!(buyer_id = created.id, "Buyer created");
    Ok(created)
}

pub async fn get_buyer(state: &AppState, tenant: TenantContext, buyer_id: i64) -> Result<Buyer, AppError> {
    state
        .repo
        .find_buyer(tenant.business_owner_id, buyer_id)
        .await?
        .ok_or_else(|| AppError::not_found("Buyer not found"))
}

pub async fn list_buyers(state: &AppState, tenant: TenantContext) -> Result<Vec<Buyer>, AppError> {
    state.repo.list_buyers(tenant.business_owner_id).await
}

#[instrument(skip(state, tenant), fields(tenant = tenant.business_owner_id))]
pub async fn delete_buyer(state: &AppState, tenant: TenantContext, buyer_id: i64) -> Result<(), AppError> {
    if !state.repo.soft_delete_buyer(tenant.business_owner_id, buyer_id).await? {
        return Err(AppError::not_found("Buyer not found"));
    }
    tracing::info!(buyer_id, "Buyer deleted");
    Ok(())
}
