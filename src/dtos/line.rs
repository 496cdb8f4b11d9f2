//! Wire shapes for products, size breakups and trade terms, shared by drafts and offers.
//! Decimals leave the service as JSON numbers; absent optionals are omitted.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::draft::{DraftProductAggregate, OfferDraftSizeBreakup};
use crate::models::line::{CommercialTerms, ProductLine, SizeBreakupLine};
use crate::models::offer::{OfferProductAggregate, OfferSizeBreakup};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeBreakupInput {
    pub size: String,
    pub breakup: Decimal,
    pub price: Decimal,
    pub condition: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub product_id: i64,
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub species: String,
    pub packing: Option<String>,
    pub size_details: Option<String>,
    pub breakup_details: Option<String>,
    pub price_details: Option<String>,
    pub condition_details: Option<String>,
    /// Must be present, even if empty.
    pub size_breakups: Option<Vec<SizeBreakupInput>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TermsResponse {
    pub from_party: String,
    pub origin: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processor: Option<String>,
    pub plant_approval_number: String,
    pub brand: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offer_validity_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipment_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_terms: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
}

impl From<CommercialTerms> for TermsResponse {
    fn from(t: CommercialTerms) -> Self {
        Self {
            from_party: t.from_party,
            origin: t.origin,
            processor: t.processor,
            plant_approval_number: t.plant_approval_number,
            brand: t.brand,
            offer_validity_date: t.offer_validity_date,
            shipment_date: t.shipment_date,
            quantity: t.quantity,
            tolerance: t.tolerance,
            payment_terms: t.payment_terms,
            remark: t.remark,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeBreakupResponse {
    pub id: i64,
    pub size: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub breakup: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

impl SizeBreakupResponse {
    fn new(id: i64, line: SizeBreakupLine) -> Self {
        Self {
            id,
            size: line.size,
            breakup: line.breakup,
            price: line.price,
            condition: line.condition,
        }
    }
}

impl From<OfferDraftSizeBreakup> for SizeBreakupResponse {
    fn from(b: OfferDraftSizeBreakup) -> Self {
        Self::new(b.id, b.line)
    }
}

impl From<OfferSizeBreakup> for SizeBreakupResponse {
    fn from(b: OfferSizeBreakup) -> Self {
        Self::new(b.id, b.line)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub species: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packing: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakup_details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition_details: Option<String>,
    pub size_breakups: Vec<SizeBreakupResponse>,
}

impl ProductResponse {
    fn new(id: i64, line: ProductLine, size_breakups: Vec<SizeBreakupResponse>) -> Self {
        Self {
            id,
            product_id: line.product_id,
            product_name: line.product_name,
            species: line.species,
            packing: line.packing,
            size_details: line.size_details,
            breakup_details: line.breakup_details,
            price_details: line.price_details,
            condition_details: line.condition_details,
            size_breakups,
        }
    }
}

impl From<DraftProductAggregate> for ProductResponse {
    fn from(p: DraftProductAggregate) -> Self {
        let breakups = p.size_breakups.into_iter().map(Into::into).collect();
        Self::new(p.product.id, p.product.line, breakups)
    }
}

impl From<OfferProductAggregate> for ProductResponse {
    fn from(p: OfferProductAggregate) -> Self {
        let breakups = p.size_breakups.into_iter().map(Into::into).collect();
        Self::new(p.product.id, p.product.line, breakups)
    }
}
