use axum::{extract::State, Extension, Json};
use axum::http::StatusCode;
use crate::auth::TenantContext;
use crate::dtos::buyer::{BuyerResponse, CreateBuyerRequest};
use crate::dtos::common::{ApiResponse, MessageResponse};
use crate::error::AppError;
use crate::extract::{AppJson, AppPath};
use crate::services::buyers;
use crate::state::AppState;

pub async fn create_buyer(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    AppJson(req): AppJson<CreateBuyerRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BuyerResponse>>), AppError> {
    let buyer = buyers::create_buyer(&state, tenant, req).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(buyer.into()))))
}

pub async fn get_buyer(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<ApiResponse<BuyerResponse>>, AppError> {
    let buyer = buyers::get_buyer(&state, tenant, id).await?;
    Ok(Json(ApiResponse::ok(buyer.into())))
}

pub async fn list_buyers(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
) -> Result<Json<ApiResponse<Vec<BuyerResponse>>>, AppError> {
    let buyers = buyers::list_buyers(&state, tenant).await?;
    Ok(Json(ApiResponse::ok(buyers.into_iter().map(Into::into).collect())))
}

pub async fn delete_buyer(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<ApiResponse<MessageResponse>>, AppError> {
    buyers::delete_buyer(&state, tenant, id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("Buyer deleted"))))
}
