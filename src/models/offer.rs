// src/models/offer.rs
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::line::{CommercialTerms, ProductLine, SizeBreakupLine, TermsChanges};

/// Offer status. An offer starts `open` and may only move to `close`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferStatus {
    Open,
    Close,
}

impl OfferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OfferStatus::Open => "open",
            OfferStatus::Close => "close",
        }
    }

    pub fn from_string(s: &str) -> Option<Self> {
        match s {
            "open" => Some(OfferStatus::Open),
            "close" => Some(OfferStatus::Close),
            _ => None,
        }
    }

    pub fn can_transition_to(&self, next: OfferStatus) -> bool {
        matches!(
            (self, next),
            (OfferStatus::Open, _) | (OfferStatus::Close, OfferStatus::Close)
        )
    }
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Offer {
    pub id: i64,
    pub business_owner_id: i64,
    pub buyer_id: i64,
    pub offer_name: String,
    pub business_name: Option<String>,
    pub to_party: String,
    pub destination: String,
    pub draft_name: Option<String>,
    #[sqlx(flatten)]
    pub terms: CommercialTerms,
    pub grand_total: Decimal,
    pub status: String,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Offer {
    /// Unknown stored values read as `open`, the only status an offer is created with.
    pub fn status(&self) -> OfferStatus {
        OfferStatus::from_string(&self.status).unwrap_or(OfferStatus::Open)
    }
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct OfferProduct {
    pub id: i64,
    pub offer_id: i64,
    #[sqlx(flatten)]
    pub line: ProductLine,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct OfferSizeBreakup {
    pub id: i64,
    pub offer_product_id: i64,
    #[sqlx(flatten)]
    pub line: SizeBreakupLine,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OfferProductAggregate {
    pub product: OfferProduct,
    pub size_breakups: Vec<OfferSizeBreakup>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OfferAggregate {
    pub offer: Offer,
    pub products: Vec<OfferProductAggregate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOffer {
    pub buyer_id: i64,
    pub offer_name: String,
    pub business_name: Option<String>,
    pub to_party: String,
    pub destination: String,
    pub draft_name: Option<String>,
    pub terms: CommercialTerms,
    pub grand_total: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OfferChanges {
    pub offer_name: Option<String>,
    pub business_name: Option<String>,
    pub to_party: Option<String>,
    pub destination: Option<String>,
    pub terms: TermsChanges,
    pub grand_total: Option<Decimal>,
    pub status: Option<OfferStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_is_terminal() {
        assert!(OfferStatus::Open.can_transition_to(OfferStatus::Close));
        assert!(OfferStatus::Open.can_transition_to(OfferStatus::Open));
        assert!(OfferStatus::Close.can_transition_to(OfferStatus::Close));
        assert!(!OfferStatus::Close.can_transition_to(OfferStatus::Open));
    }

    #[test]
    fn status_round_trips_through_storage_text() {
        for status in [OfferStatus::Open, OfferStatus::Close] {
            assert_eq!(OfferStatus::from_string(status.as_str()), Some(status));
        }
        assert_eq!(OfferStatus::from_string("closed"), None);
    }
}
