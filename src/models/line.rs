// src/models/line.rs
//! Row shapes shared by drafts and offers. Both own products, and products own
//! size breakups, with identical columns apart from the parent key.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::FromRow;

/// Scalar trade terms carried by both a draft and the offer promoted from it.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct CommercialTerms {
    pub from_party: String,
    pub origin: String,
    pub processor: Option<String>,
    pub plant_approval_number: String,
    pub brand: String,
    pub offer_validity_date: Option<NaiveDate>,
    pub shipment_date: Option<NaiveDate>,
    pub quantity: Option<String>,
    pub tolerance: Option<String>,
    pub payment_terms: Option<String>,
    pub remark: Option<String>,
}

/// Field-level changes to `CommercialTerms`. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermsChanges {
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
}

impl TermsChanges {
    pub fn apply_to(&self, terms: &mut CommercialTerms) {
        fn set<T: Clone>(slot: &mut T, value: &Option<T>) {
            if let Some(v) = value {
                *slot = v.clone();
            }
        }
        fn set_opt<T: Clone>(slot: &mut Option<T>, value: &Option<T>) {
            if value.is_some() {
                *slot = value.clone();
            }
        }

        set(&mut terms.from_party, &self.from_party);
        set(&mut terms.origin, &self.origin);
        set_opt(&mut terms.processor, &self.processor);
        set(&mut terms.plant_approval_number, &self.plant_approval_number);
        set(&mut terms.brand, &self.brand);
        set_opt(&mut terms.offer_validity_date, &self.offer_validity_date);
        set_opt(&mut terms.shipment_date, &self.shipment_date);
        set_opt(&mut terms.quantity, &self.quantity);
        set_opt(&mut terms.tolerance, &self.tolerance);
        set_opt(&mut terms.payment_terms, &self.payment_terms);
        set_opt(&mut terms.remark, &self.remark);
    }

    pub fn touches_dates(&self) -> bool {
        self.offer_validity_date.is_some() || self.shipment_date.is_some()
    }
}

/// Denormalized product reference plus prose describing its breakups.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ProductLine {
    pub product_id: i64,
    pub product_name: String,
    pub species: String,
    pub packing: Option<String>,
    pub size_details: Option<String>,
    pub breakup_details: Option<String>,
    pub price_details: Option<String>,
    pub condition_details: Option<String>,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct SizeBreakupLine {
    pub size: String,
    pub breakup: Decimal,
    pub price: Decimal,
    pub condition: Option<String>,
}

/// A validated product with its breakups, ready to be written under a draft or an offer.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductWithBreakups {
    pub line: ProductLine,
    pub size_breakups: Vec<SizeBreakupLine>,
}
