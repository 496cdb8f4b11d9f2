use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::buyer::BuyerSummary;
use super::non_blank;
use super::line::{ProductResponse, TermsResponse};
use crate::models::buyer::Buyer;
use crate::models::line::TermsChanges;
use crate::models::offer::{OfferAggregate, OfferStatus};
use crate::services::promoter::DraftSourceKind;

/// Offer fields for promotion. `buyerId`, `offerName` and `destination` are required;
/// every other field overrides what the draft carries.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoteDraftRequest {
    pub buyer_id: Option<i64>,
    pub offer_name: Option<String>,
    pub destination: Option<String>,
    pub business_name: Option<String>,
    pub to_party: Option<String>,
    pub draft_name: Option<String>,
    pub from_party: Option<String>,
    pub origin: Option<String>,
    pub processor: Option<String>,
    pub plant_approval_number: Option<String>,
    pub brand: Option<String>,
    pub offer_validity_date: Option<NaiveDate>,
    pub shipment_date: Option<NaiveDate>,
    pub quantity: Option<String>,
    pub tolerance: Option<String>,
    pub payment_terms: Option<String>,
    pub remark: Option<String>,
    pub grand_total: Option<Decimal>,
}

impl PromoteDraftRequest {
    /// Overrides as term changes. Blank text counts as not supplied.
    pub fn terms_changes(&self) -> TermsChanges {
        TermsChanges {
            from_party: non_blank(&self.from_party),
            origin: non_blank(&self.origin),
            processor: non_blank(&self.processor),
            plant_approval_number: non_blank(&self.plant_approval_number),
            brand: non_blank(&self.brand),
            offer_validity_date: self.offer_validity_date,
            shipment_date: self.shipment_date,
            quantity: non_blank(&self.quantity),
            tolerance: non_blank(&self.tolerance),
            payment_terms: non_blank(&self.payment_terms),
            remark: non_blank(&self.remark),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOfferRequest {
    pub offer_name: Option<String>,
    pub business_name: Option<String>,
    pub to_party: Option<String>,
    pub destination: Option<String>,
    pub from_party: Option<String>,
    pub origin: Option<String>,
    pub processor: Option<String>,
    pub plant_approval_number: Option<String>,
    pub brand: Option<String>,
    pub offer_validity_date: Option<NaiveDate>,
    pub shipment_date: Option<NaiveDate>,
    pub quantity: Option<String>,
    pub tolerance: Option<String>,
    pub payment_terms: Option<String>,
    pub remark: Option<String>,
    pub grand_total: Option<Decimal>,
    pub status: Option<String>,
}

impl UpdateOfferRequest {
    pub fn terms_changes(&self) -> TermsChanges {
        let trimmed = |v: &Option<String>| v.as_deref().map(|s| s.trim().to_string());
        TermsChanges {
            from_party: trimmed(&self.from_party),
            origin: trimmed(&self.origin),
            processor: self.processor.clone(),
            plant_approval_number: trimmed(&self.plant_approval_number),
            brand: trimmed(&self.brand),
            offer_validity_date: self.offer_validity_date,
            shipment_date: self.shipment_date,
            quantity: self.quantity.clone(),
            tolerance: self.tolerance.clone(),
            payment_terms: self.payment_terms.clone(),
            remark: self.remark.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferSearchParams {
    pub offer_name: Option<String>,
    pub business_name: Option<String>,
    pub to_party: Option<String>,
    pub buyer: Option<String>,
    pub product_name: Option<String>,
    pub status: Option<String>,
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferResponse {
    pub id: i64,
    pub buyer_id: i64,
    pub offer_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
    pub to_party: String,
    pub destination: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft_name: Option<String>,
    #[serde(flatten)]
    pub terms: TermsResponse,
    #[serde(with = "rust_decimal::serde::float")]
    pub grand_total: Decimal,
    pub status: OfferStatus,
    pub products: Vec<ProductResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyer: Option<BuyerSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<OfferAggregate> for OfferResponse {
    fn from(agg: OfferAggregate) -> Self {
        let status = agg.offer.status();
        let o = agg.offer;
        Self {
            id: o.id,
            buyer_id: o.buyer_id,
            offer_name: o.offer_name,
            business_name: o.business_name,
            to_party: o.to_party,
            destination: o.destination,
            draft_name: o.draft_name,
            terms: o.terms.into(),
            grand_total: o.grand_total,
            status,
            products: agg.products.into_iter().map(Into::into).collect(),
            buyer: None,
            created_at: o.created_at,
            updated_at: o.updated_at,
        }
    }
}

impl OfferResponse {
    pub fn with_buyer(mut self, buyer: Option<Buyer>) -> Self {
        self.buyer = buyer.map(Into::into);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionResponse {
    pub offer: OfferResponse,
    pub draft_source: DraftSourceKind,
    /// Products and breakups that could not be copied.
    pub skipped_items: usize,
}
