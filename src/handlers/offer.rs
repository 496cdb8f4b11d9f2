use axum::{extract::State, Extension, Json};
use crate::auth::TenantContext;
use crate::dtos::common::{ApiResponse, MessageResponse, Page};
use crate::dtos::offer::{OfferResponse, OfferSearchParams, UpdateOfferRequest};
use crate::error::AppError;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::services::offers;
use crate::state::AppState;

pub async fn get_offer(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<ApiResponse<OfferResponse>>, AppError> {
    let (offer, buyer) = offers::get_offer(&state, tenant, id).await?;
    Ok(Json(ApiResponse::ok(OfferResponse::from(offer).with_buyer(buyer))))
}

pub async fn list_offers(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    AppQuery(params): AppQuery<OfferSearchParams>,
) -> Result<Json<ApiResponse<Page<OfferResponse>>>, AppError> {
    let page = offers::search_offers(&state, tenant, params).await?;
    Ok(Json(ApiResponse::ok(page.map(OfferResponse::from))))
}

pub async fn update_offer(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    AppPath(id): AppPath<i64>,
    AppJson(req): AppJson<UpdateOfferRequest>,
) -> Result<Json<ApiResponse<OfferResponse>>, AppError> {
    let offer = offers::update_offer(&state, tenant, id, req).await?;
    Ok(Json(ApiResponse::ok(offer.into())))
}

pub async fn delete_offer(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<ApiResponse<MessageResponse>>, AppError> {
    offers::delete_offer(&state, tenant, id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("Offer deleted"))))
}
