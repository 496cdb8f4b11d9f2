use axum::{extract::State, Extension, Json};
use axum::http::StatusCode;
use crate::auth::TenantContext;
use crate::dtos::common::{ApiResponse, MessageResponse, Page};
use crate::dtos::draft::{CreateDraftRequest, DraftResponse, DraftSearchParams, UpdateDraftRequest};
use crate::dtos::offer::{OfferResponse, PromoteDraftRequest, PromotionResponse};
use crate::error::AppError;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::services::{drafts, promoter};
use crate::state::AppState;

pub async fn create_draft(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    AppJson(req): AppJson<CreateDraftRequest>,
) -> Result<(StatusCode, Json<ApiResponse<DraftResponse>>), AppError> {
    let draft = drafts::create_draft(&state, tenant, req).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(draft.into()))))
}

pub async fn get_draft(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    AppPath(draft_no): AppPath<i64>,
) -> Result<Json<ApiResponse<DraftResponse>>, AppError> {
    let draft = drafts::get_draft(&state, tenant, draft_no).await?;
    Ok(Json(ApiResponse::ok(draft.into())))
}

pub async fn list_drafts(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    AppQuery(params): AppQuery<DraftSearchParams>,
) -> Result<Json<ApiResponse<Page<DraftResponse>>>, AppError> {
    let page = drafts::search_drafts(&state, tenant, params).await?;
    Ok(Json(ApiResponse::ok(page.map(DraftResponse::from))))
}

pub async fn update_draft(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    AppPath(draft_no): AppPath<i64>,
    AppJson(req): AppJson<UpdateDraftRequest>,
) -> Result<Json<ApiResponse<DraftResponse>>, AppError> {
    let draft = drafts::update_draft(&state, tenant, draft_no, req).await?;
    Ok(Json(ApiResponse::ok(draft.into())))
}

pub async fn delete_draft(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    AppPath(draft_no): AppPath<i64>,
) -> Result<Json<ApiResponse<MessageResponse>>, AppError> {
    drafts::delete_draft(&state, tenant, draft_no).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("Offer draft deleted"))))
}

pub async fn promote_draft(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    AppPath(draft_no): AppPath<i64>,
    AppJson(req): AppJson<PromoteDraftRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PromotionResponse>>), AppError> {
    let promotion = promoter::promote_draft(&state, tenant, draft_no, req).await?;

    let body = PromotionResponse {
        offer: OfferResponse::from(promotion.offer).with_buyer(Some(promotion.buyer)),
        draft_source: promotion.source,
        skipped_items: promotion.skipped_items,
    };
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(body))))
}
