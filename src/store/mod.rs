// src/store/mod.rs
//! Persistence seam for the draft and offer aggregates.
//!
//! Reads and soft deletes go straight through [`Repository`]. Inserts and
//! updates go through a [`UnitOfWork`] obtained from [`Repository::begin`]:
//! nothing it stages is visible to other readers until [`UnitOfWork::commit`],
//! and dropping it without committing discards every staged write.
//!
//! Every method takes the tenant id. No implementation may read or write a
//! row owned by another tenant.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::buyer::{Buyer, NewBuyer};
use crate::models::draft::{
    DraftAggregate, DraftChanges, NewDraft, OfferDraft, OfferDraftProduct, OfferDraftSizeBreakup,
};
use crate::models::line::{ProductLine, SizeBreakupLine};
use crate::models::offer::{
    NewOffer, Offer, OfferAggregate, OfferChanges, OfferProduct, OfferSizeBreakup, OfferStatus,
};

pub use memory::InMemoryRepository;
pub use postgres::PgRepository;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    pub offset: i64,
    pub limit: i64,
}

impl Paging {
    pub const DEFAULT_LIMIT: i64 = 10;
    pub const MAX_LIMIT: i64 = 100;

    pub fn new(offset: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            offset: offset.unwrap_or(0).max(0),
            limit: limit
                .unwrap_or(Self::DEFAULT_LIMIT)
                .clamp(1, Self::MAX_LIMIT),
        }
    }
}

impl Default for Paging {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Draft search criteria. Text filters are case-insensitive substring matches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DraftFilter {
    pub draft_no: Option<i64>,
    pub draft_name: Option<String>,
    /// Restricts the result to these draft numbers (already resolved from a product-name match).
    pub draft_nos: Option<Vec<i64>>,
}

/// Offer search criteria. Text filters are case-insensitive substring matches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OfferFilter {
    pub offer_name: Option<String>,
    pub business_name: Option<String>,
    pub to_party: Option<String>,
    /// Matches the buyer's company name or contact name.
    pub buyer: Option<String>,
    /// Matches offers with at least one product whose name contains this text.
    pub product_name: Option<String>,
    pub status: Option<OfferStatus>,
}

#[async_trait]
pub trait Repository: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, AppError>;

    // Drafts
    async fn find_draft(&self, tenant_id: i64, draft_no: i64) -> Result<Option<DraftAggregate>, AppError>;
    async fn draft_name_exists(
        &self,
        tenant_id: i64,
        draft_name: &str,
        excluding: Option<i64>,
    ) -> Result<bool, AppError>;
    /// Parent draft numbers of non-deleted drafts owning a product whose name contains `product_name`.
    async fn draft_nos_with_product(&self, tenant_id: i64, product_name: &str) -> Result<Vec<i64>, AppError>;
    async fn search_drafts(
        &self,
        tenant_id: i64,
        filter: &DraftFilter,
        paging: Paging,
    ) -> Result<(Vec<DraftAggregate>, i64), AppError>;
    /// Flags the draft deleted. Returns false when no live draft matched.
    async fn soft_delete_draft(&self, tenant_id: i64, draft_no: i64) -> Result<bool, AppError>;

    // Buyers
    async fn insert_buyer(&self, tenant_id: i64, buyer: &NewBuyer) -> Result<Buyer, AppError>;
    async fn find_buyer(&self, tenant_id: i64, buyer_id: i64) -> Result<Option<Buyer>, AppError>;
    async fn list_buyers(&self, tenant_id: i64) -> Result<Vec<Buyer>, AppError>;
    async fn soft_delete_buyer(&self, tenant_id: i64, buyer_id: i64) -> Result<bool, AppError>;

    // Offers
    async fn find_offer(&self, tenant_id: i64, offer_id: i64) -> Result<Option<OfferAggregate>, AppError>;
    async fn search_offers(
        &self,
        tenant_id: i64,
        filter: &OfferFilter,
        paging: Paging,
    ) -> Result<(Vec<OfferAggregate>, i64), AppError>;
    async fn soft_delete_offer(&self, tenant_id: i64, offer_id: i64) -> Result<bool, AppError>;
}

#[async_trait]
pub trait UnitOfWork: Send {
    async fn insert_draft(&mut self, tenant_id: i64, draft: &NewDraft) -> Result<OfferDraft, AppError>;
    /// Applies the present fields to a live draft. Returns `None` when no live draft matched.
    async fn update_draft(
        &mut self,
        tenant_id: i64,
        draft_no: i64,
        changes: &DraftChanges,
    ) -> Result<Option<OfferDraft>, AppError>;
    /// Removes every product and breakup under the tenant's draft, ahead of writing a replacement set.
    async fn clear_draft_products(&mut self, tenant_id: i64, draft_no: i64) -> Result<(), AppError>;
    async fn insert_draft_product(
        &mut self,
        draft_no: i64,
        line: &ProductLine,
    ) -> Result<OfferDraftProduct, AppError>;
    async fn insert_draft_breakup(
        &mut self,
        draft_product_id: i64,
        line: &SizeBreakupLine,
    ) -> Result<OfferDraftSizeBreakup, AppError>;

    /// Inserts an offer header with status `open`.
    async fn insert_offer(&mut self, tenant_id: i64, offer: &NewOffer) -> Result<Offer, AppError>;
    async fn update_offer(
        &mut self,
        tenant_id: i64,
        offer_id: i64,
        changes: &OfferChanges,
    ) -> Result<Option<Offer>, AppError>;
    async fn insert_offer_product(&mut self, offer_id: i64, line: &ProductLine) -> Result<OfferProduct, AppError>;
    async fn insert_offer_breakup(
        &mut self,
        offer_product_id: i64,
        line: &SizeBreakupLine,
    ) -> Result<OfferSizeBreakup, AppError>;

    async fn commit(self: Box<Self>) -> Result<(), AppError>;
}

/// Lowercases and trims a text filter, dropping it when blank.
pub(crate) fn normalize_filter(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_lowercase)
}
