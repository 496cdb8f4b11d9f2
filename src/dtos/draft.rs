use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::line::{ProductInput, ProductResponse, TermsResponse};
use crate::models::draft::DraftAggregate;
use crate::models::line::TermsChanges;

/// Mandatory fields are optional here so a missing one is reported as a validation
/// failure naming the field, not as a body rejection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDraftRequest {
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
    #[serde(default)]
    pub products: Vec<ProductInput>,
}

/// Only fields present in the payload change.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDraftRequest {
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
    /// Replaces the whole product set when present.
    pub products: Option<Vec<ProductInput>>,
}

impl UpdateDraftRequest {
    pub fn terms_changes(&self) -> TermsChanges {
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

fn trimmed(value: &Option<String>) -> Option<String> {
    value.as_deref().map(|v| v.trim().to_string())
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftSearchParams {
    pub draft_no: Option<i64>,
    pub draft_name: Option<String>,
    pub product_name: Option<String>,
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftResponse {
    pub draft_no: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft_name: Option<String>,
    #[serde(flatten)]
    pub terms: TermsResponse,
    #[serde(with = "rust_decimal::serde::float")]
    pub grand_total: Decimal,
    pub products: Vec<ProductResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DraftAggregate> for DraftResponse {
    fn from(agg: DraftAggregate) -> Self {
        let d = agg.draft;
        Self {
            draft_no: d.draft_no,
            draft_name: d.draft_name,
            terms: d.terms.into(),
            grand_total: d.grand_total,
            products: agg.products.into_iter().map(Into::into).collect(),
            created_at: d.created_at,
            updated_at: d.updated_at,
        }
    }
}
