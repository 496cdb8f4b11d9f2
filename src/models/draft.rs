// src/models/draft.rs
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

use super::line::{CommercialTerms, ProductLine, ProductWithBreakups, SizeBreakupLine, TermsChanges};

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct OfferDraft {
    pub draft_no: i64,
    pub business_owner_id: i64,
    pub draft_name: Option<String>,
    #[sqlx(flatten)]
    pub terms: CommercialTerms,
    pub grand_total: Decimal,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct OfferDraftProduct {
    pub id: i64,
    pub draft_no: i64,
    #[sqlx(flatten)]
    pub line: ProductLine,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct OfferDraftSizeBreakup {
    pub id: i64,
    pub draft_product_id: i64,
    #[sqlx(flatten)]
    pub line: SizeBreakupLine,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DraftProductAggregate {
    pub product: OfferDraftProduct,
    pub size_breakups: Vec<OfferDraftSizeBreakup>,
}

/// A draft with its products and their breakups, in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftAggregate {
    pub draft: OfferDraft,
    pub products: Vec<DraftProductAggregate>,
}

impl DraftAggregate {
    /// The nested rows stripped of their keys, as promotion copies them.
    pub fn product_lines(&self) -> Vec<ProductWithBreakups> {
        self.products
            .iter()
            .map(|p| ProductWithBreakups {
                line: p.product.line.clone(),
                size_breakups: p.size_breakups.iter().map(|b| b.line.clone()).collect(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewDraft {
    pub draft_name: Option<String>,
    pub terms: CommercialTerms,
    pub grand_total: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DraftChanges {
    pub draft_name: Option<String>,
    pub terms: TermsChanges,
    pub grand_total: Option<Decimal>,
}
