//! Offer Promoter: turns a draft into an offer addressed to a buyer.
//!
//! The draft is looked up by tenant and live status. When it cannot be found the
//! promotion still goes ahead from a [`DraftSource::Synthesized`] stand-in built
//! from the caller's overrides. The buyer has no such fallback.

use askama::Template;
use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::instrument;

use super::draft_validator::{check_date_order, require_fields};
use super::store_failure;
use crate::auth::TenantContext;
use crate::config::CopyMode;
use crate::dtos::non_blank;
use crate::dtos::offer::PromoteDraftRequest;
use crate::error::AppError;
use crate::models::buyer::Buyer;
use crate::models::draft::DraftAggregate;
use crate::models::line::{CommercialTerms, ProductWithBreakups};
use crate::models::offer::{NewOffer, Offer, OfferAggregate};
use crate::state::AppState;

pub const UNKNOWN_COMPANY: &str = "Unknown Company";
pub const UNKNOWN_ORIGIN: &str = "Unknown Origin";
pub const NOT_AVAILABLE: &str = "N/A";
pub const DEFAULT_VALIDITY_DAYS: i64 = 30;

const PROMOTE_FAILED: &str = "Failed to promote offer draft";

/// Where the promoted offer's draft-side fields came from.
#[derive(Debug, Clone)]
pub enum DraftSource {
    Persisted(DraftAggregate),
    /// No live draft matched; the caller's overrides stand in for it.
    Synthesized(PromoteDraftRequest),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftSourceKind {
    Persisted,
    Synthesized,
}

impl DraftSource {
    pub fn kind(&self) -> DraftSourceKind {
        match self {
            DraftSource::Persisted(_) => DraftSourceKind::Persisted,
            DraftSource::Synthesized(_) => DraftSourceKind::Synthesized,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, DraftSource::Synthesized(_))
    }

    /// Products to copy. A synthesized draft has none.
    pub fn product_lines(&self) -> Vec<ProductWithBreakups> {
        match self {
            DraftSource::Persisted(agg) => agg.product_lines(),
            DraftSource::Synthesized(_) => Vec::new(),
        }
    }

    fn terms(&self) -> CommercialTerms {
        match self {
            DraftSource::Persisted(agg) => agg.draft.terms.clone(),
            DraftSource::Synthesized(overrides) => {
                let mut terms = CommercialTerms {
                    from_party: UNKNOWN_COMPANY.to_string(),
                    origin: UNKNOWN_ORIGIN.to_string(),
                    processor: None,
                    plant_approval_number: NOT_AVAILABLE.to_string(),
                    brand: NOT_AVAILABLE.to_string(),
                    offer_validity_date: None,
                    shipment_date: None,
                    quantity: None,
                    tolerance: None,
                    payment_terms: None,
                    remark: None,
                };
                overrides.terms_changes().apply_to(&mut terms);
                terms
            }
        }
    }

    fn grand_total(&self) -> Decimal {
        match self {
            DraftSource::Persisted(agg) => agg.draft.grand_total,
            DraftSource::Synthesized(overrides) => overrides.grand_total.unwrap_or(Decimal::ZERO),
        }
    }

    fn draft_name(&self) -> Option<String> {
        match self {
            DraftSource::Persisted(agg) => agg.draft.draft_name.clone(),
            DraftSource::Synthesized(overrides) => non_blank(&overrides.draft_name),
        }
    }
}

/// The offer header a promotion writes: draft fields first, overrides on top,
/// validity defaulting to thirty days out.
pub fn offer_from_source(
    source: &DraftSource,
    buyer: &Buyer,
    overrides: &PromoteDraftRequest,
    today: NaiveDate,
) -> NewOffer {
    let mut terms = source.terms();
    overrides.terms_changes().apply_to(&mut terms);
    if terms.offer_validity_date.is_none() {
        terms.offer_validity_date = Some(today + Duration::days(DEFAULT_VALIDITY_DAYS));
    }

    NewOffer {
        buyer_id: buyer.id,
        offer_name: non_blank(&overrides.offer_name).unwrap_or_default(),
        business_name: non_blank(&overrides.business_name),
        to_party: non_blank(&overrides.to_party).unwrap_or_else(|| buyer.company_name.clone()),
        destination: non_blank(&overrides.destination).unwrap_or_default(),
        draft_name: non_blank(&overrides.draft_name).or_else(|| source.draft_name()),
        terms,
        grand_total: overrides.grand_total.unwrap_or_else(|| source.grand_total()),
    }
}

#[derive(Debug, Clone)]
pub struct Promotion {
    pub offer: OfferAggregate,
    pub buyer: Buyer,
    pub source: DraftSourceKind,
    /// Products and breakups that failed to copy under best-effort copying.
    pub skipped_items: usize,
}

#[instrument(skip(state, tenant, overrides), fields(tenant = tenant.business_owner_id))]
pub async fn promote_draft(
    state: &AppState,
    tenant: TenantContext,
    draft_no: i64,
    overrides: PromoteDraftRequest,
) -> Result<Promotion, AppError> {
    require_fields(&[
        ("offerName", &overrides.offer_name),
        ("destination", &overrides.destination),
    ])?;
    let buyer_id = overrides
        .buyer_id
        .ok_or_else(|| AppError::validation("Missing required fields: buyerId"))?;

    let today = Utc::now().date_naive();
    let override_terms = overrides.terms_changes();
    if override_terms.touches_dates() {
        check_date_order(
            override_terms.offer_validity_date,
            override_terms.shipment_date,
            override_terms.offer_validity_date.is_some(),
            today,
        )?;
    }

    let tenant_id = tenant.business_owner_id;
    let source = match state.repo.find_draft(tenant_id, draft_no).await {
        Ok(Some(agg)) => DraftSource::Persisted(agg),
        Ok(None) => DraftSource::Synthesized(overrides.clone()),
        Err(e) => {
            tracing::warn!(draft_no, error = %e, "Draft lookup failed, promoting from overrides");
            DraftSource::Synthesized(overrides.clone())
        }
    };
    tracing::info!(draft_no, fallback = source.is_fallback(), "Resolved draft for promotion");

    let buyer = state
        .repo
        .find_buyer(tenant_id, buyer_id)
        .await?
        .ok_or_else(|| AppError::not_found("Buyer not found"))?;

    let new_offer = offer_from_source(&source, &buyer, &overrides, today);
    // overrides may land next to a draft or default date they were never compared with
    check_date_order(
        new_offer.terms.offer_validity_date,
        new_offer.terms.shipment_date,
        false,
        today,
    )?;
    let products = source.product_lines();

    let (offer, skipped_items) = match state.copy_mode {
        CopyMode::Atomic => (copy_atomic(state, tenant_id, &new_offer, &products).await?, 0),
        CopyMode::BestEffort => copy_best_effort(state, tenant_id, &new_offer, &products).await?,
    };

    let offer = state
        .repo
        .find_offer(tenant_id, offer.id)
        .await?
        .ok_or_else(|| AppError::internal(PROMOTE_FAILED))?;

    tracing::info!(
        offer_id = offer.offer.id,
        products = offer.products.len(),
        skipped_items,
        "Offer created from draft"
    );

    notify_buyer(state, &buyer, &offer.offer);

    Ok(Promotion {
        offer,
        buyer,
        source: source.kind(),
        skipped_items,
    })
}

/// Header and nested rows in one unit of work.
async fn copy_atomic(
    state: &AppState,
    tenant_id: i64,
    new_offer: &NewOffer,
    products: &[ProductWithBreakups],
) -> Result<Offer, AppError> {
    async {
        let mut uow = state.repo.begin().await?;
        let offer = uow.insert_offer(tenant_id, new_offer).await?;
        for p in products {
            let product = uow.insert_offer_product(offer.id, &p.line).await?;
            for b in &p.size_breakups {
                uow.insert_offer_breakup(product.id, b).await?;
            }
        }
        uow.commit().await?;
        Ok::<_, AppError>(offer)
    }
    .await
    .map_err(|e| store_failure(e, PROMOTE_FAILED))
}

/// Header commits first. Each nested row is then copied on its own; a failed row
/// is logged and skipped, and a failed product skips its breakups with it.
async fn copy_best_effort(
    state: &AppState,
    tenant_id: i64,
    new_offer: &NewOffer,
    products: &[ProductWithBreakups],
) -> Result<(Offer, usize), AppError> {
    let offer = async {
        let mut uow = state.repo.begin().await?;
        let offer = uow.insert_offer(tenant_id, new_offer).await?;
        uow.commit().await?;
        Ok::<_, AppError>(offer)
    }
    .await
    .map_err(|e| store_failure(e, PROMOTE_FAILED))?;

    let mut skipped = 0;
    for p in products {
        let product = async {
            let mut uow = state.repo.begin().await?;
            let product = uow.insert_offer_product(offer.id, &p.line).await?;
            uow.commit().await?;
            Ok::<_, AppError>(product)
        }
        .await;

        let product = match product {
            Ok(product) => product,
            Err(e) => {
                tracing::warn!(
                    offer_id = offer.id,
                    product = %p.line.product_name,
                    error = %e,
                    "Product not copied to offer"
                );
                skipped += 1 + p.size_breakups.len();
                continue;
            }
        };

        for b in &p.size_breakups {
            let copied = async {
                let mut uow = state.repo.begin().await?;
                uow.insert_offer_breakup(product.id, b).await?;
                uow.commit().await
            }
            .await;

            if let Err(e) = copied {
                tracing::warn!(
                    offer_id = offer.id,
                    product = %p.line.product_name,
                    size = %b.size,
                    error = %e,
                    "Size breakup not copied to offer"
                );
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        tracing::warn!(offer_id = offer.id, skipped, "Offer created with a partial product set");
    }
    Ok((offer, skipped))
}

struct OfferEmail<'a> {
    greeting: &'a str,
    offer_name: &'a str,
    destination: &'a str,
    grand_total: String,
    valid_until: String,
}

impl<'a> OfferEmail<'a> {
    fn new(buyer: &'a Buyer, offer: &'a Offer) -> Self {
        Self {
            greeting: buyer.contact_name.as_deref().unwrap_or(&buyer.company_name),
            offer_name: &offer.offer_name,
            destination: &offer.destination,
            grand_total: offer.grand_total.normalize().to_string(),
            valid_until: offer
                .terms
                .offer_validity_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        }
    }
}

#[derive(Template)]
#[template(path = "emails/offer_created.html")]
struct OfferEmailHtml<'a> {
    email: &'a OfferEmail<'a>,
}

#[derive(Template)]
#[template(path = "emails/offer_created.txt")]
struct OfferEmailText<'a> {
    email: &'a OfferEmail<'a>,
}

/// Subject, HTML body and plain-text body for the new-offer email.
pub(crate) fn render_offer_email(buyer: &Buyer, offer: &Offer) -> Result<(String, String, String), askama::Error> {
    let email = OfferEmail::new(buyer, offer);
    let html = OfferEmailHtml { email: &email }.render()?;
    let text = OfferEmailText { email: &email }.render()?;
    Ok((format!("New offer: {}", offer.offer_name), html, text))
}

/// Fire and forget. The outcome never reaches the caller.
fn notify_buyer(state: &AppState, buyer: &Buyer, offer: &Offer) {
    let offer_id = offer.id;
    let (subject, html, text) = match render_offer_email(buyer, offer) {
        Ok(rendered) => rendered,
        Err(e) => {
            tracing::warn!(offer_id, error = %e, "Buyer notification not rendered");
            return;
        }
    };
    let notifier = state.notifier.clone();
    let recipient = buyer.email.clone();

    tokio::spawn(async move {
        let outcome = notifier.notify(&recipient, &subject, &html, &text).await;
        if !outcome.success {
            tracing::warn!(
                offer_id,
                to = %recipient,
                error = outcome.error.as_deref().unwrap_or("unknown"),
                "Buyer notification failed"
            );
        }
    });
}
