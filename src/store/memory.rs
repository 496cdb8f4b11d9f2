// src/store/memory.rs
//! In-memory repository for local development and tests.
//!
//! Tables live behind a `RwLock`. A unit of work takes the single writer lock,
//! works on a private copy of the tables and swaps it in on commit, so readers
//! only ever see committed state. Fault points let tests fail the N-th insert
//! of a given kind.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use super::{normalize_filter, DraftFilter, OfferFilter, Paging, Repository, UnitOfWork};
use crate::error::AppError;
use crate::models::buyer::{Buyer, NewBuyer};
use crate::models::draft::{
    DraftAggregate, DraftChanges, DraftProductAggregate, NewDraft, OfferDraft, OfferDraftProduct,
    OfferDraftSizeBreakup,
};
use crate::models::line::{ProductLine, SizeBreakupLine};
use crate::models::offer::{
    NewOffer, Offer, OfferAggregate, OfferChanges, OfferProduct, OfferProductAggregate,
    OfferSizeBreakup, OfferStatus,
};

/// Raw table contents, soft-deleted rows included.
#[derive(Debug, Clone, Default)]
pub struct MemoryTables {
    pub drafts: BTreeMap<i64, OfferDraft>,
    pub draft_products: BTreeMap<i64, OfferDraftProduct>,
    pub draft_breakups: BTreeMap<i64, OfferDraftSizeBreakup>,
    pub buyers: BTreeMap<i64, Buyer>,
    pub offers: BTreeMap<i64, Offer>,
    pub offer_products: BTreeMap<i64, OfferProduct>,
    pub offer_breakups: BTreeMap<i64, OfferSizeBreakup>,
    last_id: i64,
}

impl MemoryTables {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn draft_aggregate(&self, draft: &OfferDraft) -> DraftAggregate {
        let products = self
            .draft_products
            .values()
            .filter(|p| p.draft_no == draft.draft_no)
            .map(|p| DraftProductAggregate {
                product: p.clone(),
                size_breakups: self
                    .draft_breakups
                    .values()
                    .filter(|b| b.draft_product_id == p.id)
                    .cloned()
                    .collect(),
            })
            .collect();
        DraftAggregate { draft: draft.clone(), products }
    }

    fn offer_aggregate(&self, offer: &Offer) -> OfferAggregate {
        let products = self
            .offer_products
            .values()
            .filter(|p| p.offer_id == offer.id)
            .map(|p| OfferProductAggregate {
                product: p.clone(),
                size_breakups: self
                    .offer_breakups
                    .values()
                    .filter(|b| b.offer_product_id == p.id)
                    .cloned()
                    .collect(),
            })
            .collect();
        OfferAggregate { offer: offer.clone(), products }
    }

    fn live_draft_mut(&mut self, tenant_id: i64, draft_no: i64) -> Option<&mut OfferDraft> {
        self.drafts
            .get_mut(&draft_no)
            .filter(|d| d.business_owner_id == tenant_id && !d.is_deleted)
    }

    fn live_offer_mut(&mut self, tenant_id: i64, offer_id: i64) -> Option<&mut Offer> {
        self.offers
            .get_mut(&offer_id)
            .filter(|o| o.business_owner_id == tenant_id && !o.is_deleted)
    }

    fn offer_matches(&self, offer: &Offer, filter: &OfferFilter) -> bool {
        let contains = |haystack: Option<&str>, needle: &Option<String>| match needle {
            None => true,
            Some(n) => haystack.is_some_and(|h| h.to_lowercase().contains(n.as_str())),
        };

        if !contains(Some(&offer.offer_name), &normalize_filter(&filter.offer_name))
            || !contains(offer.business_name.as_deref(), &normalize_filter(&filter.business_name))
            || !contains(Some(&offer.to_party), &normalize_filter(&filter.to_party))
        {
            return false;
        }

        if let Some(status) = filter.status {
            if offer.status() != status {
                return false;
            }
        }

        if let Some(needle) = normalize_filter(&filter.buyer) {
            let buyer_hit = self
                .buyers
                .get(&offer.buyer_id)
                .filter(|b| b.business_owner_id == offer.business_owner_id)
                .is_some_and(|b| {
                    b.company_name.to_lowercase().contains(&needle)
                        || b.contact_name
                            .as_deref()
                            .is_some_and(|c| c.to_lowercase().contains(&needle))
                });
            if !buyer_hit {
                return false;
            }
        }

        if let Some(needle) = normalize_filter(&filter.product_name) {
            let product_hit = self
                .offer_products
                .values()
                .any(|p| p.offer_id == offer.id && p.line.product_name.to_lowercase().contains(&needle));
            if !product_hit {
                return false;
            }
        }

        true
    }
}

/// Insert kinds that can be made to fail on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultPoint {
    InsertDraft,
    InsertDraftProduct,
    InsertDraftBreakup,
    InsertOffer,
    InsertOfferProduct,
    InsertOfferBreakup,
}

#[derive(Debug, Default)]
struct FaultPlan {
    calls: HashMap<FaultPoint, usize>,
    armed: HashMap<FaultPoint, usize>,
}

struct Shared {
    tables: RwLock<MemoryTables>,
    writer: Arc<AsyncMutex<()>>,
    faults: Mutex<FaultPlan>,
}

impl Shared {
    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryTables>, AppError> {
        self.tables
            .read()
            .map_err(|_| AppError::internal("in-memory store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryTables>, AppError> {
        self.tables
            .write()
            .map_err(|_| AppError::internal("in-memory store lock poisoned"))
    }

    fn trip(&self, point: FaultPoint) -> Result<(), AppError> {
        let mut plan = self
            .faults
            .lock()
            .map_err(|_| AppError::internal("fault plan lock poisoned"))?;
        let count = plan.calls.entry(point).or_insert(0);
        *count += 1;
        let count = *count;
        if plan.armed.get(&point) == Some(&count) {
            plan.armed.remove(&point);
            return Err(AppError::db(sqlx::Error::Protocol(format!(
                "injected failure at {point:?} #{count}"
            ))));
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct InMemoryRepository {
    shared: Arc<Shared>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                tables: RwLock::new(MemoryTables::default()),
                writer: Arc::new(AsyncMutex::new(())),
                faults: Mutex::new(FaultPlan::default()),
            }),
        }
    }

    /// Makes the `nth` call (1-based, counted from now) at `point` fail with a store error.
    pub fn fail_nth(&self, point: FaultPoint, nth: usize) {
        if let Ok(mut plan) = self.shared.faults.lock() {
            plan.calls.insert(point, 0);
            plan.armed.insert(point, nth);
        }
    }

    /// Copy of the committed tables, ignoring tenant scope and soft deletes.
    pub fn snapshot(&self) -> MemoryTables {
        self.shared
            .tables
            .read()
            .map(|t| t.clone())
            .unwrap_or_default()
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, AppError> {
        let guard = self.shared.writer.clone().lock_owned().await;
        let staged = self.shared.read()?.clone();
        Ok(Box::new(MemoryUnitOfWork {
            shared: self.shared.clone(),
            staged,
            _guard: guard,
        }))
    }

    async fn find_draft(&self, tenant_id: i64, draft_no: i64) -> Result<Option<DraftAggregate>, AppError> {
        let tables = self.shared.read()?;
        Ok(tables
            .drafts
            .get(&draft_no)
            .filter(|d| d.business_owner_id == tenant_id && !d.is_deleted)
            .map(|d| tables.draft_aggregate(d)))
    }

    async fn draft_name_exists(
        &self,
        tenant_id: i64,
        draft_name: &str,
        excluding: Option<i64>,
    ) -> Result<bool, AppError> {
        let tables = self.shared.read()?;
        Ok(tables.drafts.values().any(|d| {
            d.business_owner_id == tenant_id
                && !d.is_deleted
                && d.draft_name.as_deref() == Some(draft_name)
                && Some(d.draft_no) != excluding
        }))
    }

    async fn draft_nos_with_product(&self, tenant_id: i64, product_name: &str) -> Result<Vec<i64>, AppError> {
        let needle = product_name.trim().to_lowercase();
        let tables = self.shared.read()?;
        let mut nos: Vec<i64> = tables
            .draft_products
            .values()
            .filter(|p| p.line.product_name.to_lowercase().contains(&needle))
            .filter(|p| {
                tables
                    .drafts
                    .get(&p.draft_no)
                    .is_some_and(|d| d.business_owner_id == tenant_id && !d.is_deleted)
            })
            .map(|p| p.draft_no)
            .collect();
        nos.sort_unstable();
        nos.dedup();
        Ok(nos)
    }

    async fn search_drafts(
        &self,
        tenant_id: i64,
        filter: &DraftFilter,
        paging: Paging,
    ) -> Result<(Vec<DraftAggregate>, i64), AppError> {
        let name = normalize_filter(&filter.draft_name);
        let tables = self.shared.read()?;
        let mut matches: Vec<&OfferDraft> = tables
            .drafts
            .values()
            .filter(|d| d.business_owner_id == tenant_id && !d.is_deleted)
            .filter(|d| filter.draft_no.is_none_or(|no| d.draft_no == no))
            .filter(|d| {
                name.as_ref().is_none_or(|n| {
                    d.draft_name
                        .as_deref()
                        .is_some_and(|dn| dn.to_lowercase().contains(n.as_str()))
                })
            })
            .filter(|d| {
                filter
                    .draft_nos
                    .as_ref()
                    .is_none_or(|nos| nos.contains(&d.draft_no))
            })
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.draft_no.cmp(&a.draft_no)));

        let total = matches.len() as i64;
        let page = matches
            .into_iter()
            .skip(paging.offset as usize)
            .take(paging.limit as usize)
            .map(|d| tables.draft_aggregate(d))
            .collect();
        Ok((page, total))
    }

    async fn soft_delete_draft(&self, tenant_id: i64, draft_no: i64) -> Result<bool, AppError> {
        let _writer = self.shared.writer.lock().await;
        let mut tables = self.shared.write()?;
        Ok(match tables.live_draft_mut(tenant_id, draft_no) {
            Some(draft) => {
                let now = Utc::now();
                draft.is_deleted = true;
                draft.deleted_at = Some(now);
                draft.updated_at = now;
                true
            }
            None => false,
        })
    }

    async fn insert_buyer(&self, tenant_id: i64, buyer: &NewBuyer) -> Result<Buyer, AppError> {
        let _writer = self.shared.writer.lock().await;
        let mut tables = self.shared.write()?;
        let row = Buyer {
            id: tables.next_id(),
            business_owner_id: tenant_id,
            company_name: buyer.company_name.clone(),
            contact_name: buyer.contact_name.clone(),
            email: buyer.email.clone(),
            phone: buyer.phone.clone(),
            address: buyer.address.clone(),
            city: buyer.city.clone(),
            state: buyer.state.clone(),
            country: buyer.country.clone(),
            postal_code: buyer.postal_code.clone(),
            status: "active".to_string(),
            is_deleted: false,
            deleted_at: None,
            created_at: Utc::now(),
        };
        tables.buyers.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_buyer(&self, tenant_id: i64, buyer_id: i64) -> Result<Option<Buyer>, AppError> {
        let tables = self.shared.read()?;
        Ok(tables
            .buyers
            .get(&buyer_id)
            .filter(|b| b.business_owner_id == tenant_id && !b.is_deleted)
            .cloned())
    }

    async fn list_buyers(&self, tenant_id: i64) -> Result<Vec<Buyer>, AppError> {
        let tables = self.shared.read()?;
        let mut buyers: Vec<Buyer> = tables
            .buyers
            .values()
            .filter(|b| b.business_owner_id == tenant_id && !b.is_deleted)
            .cloned()
            .collect();
        buyers.sort_by(|a, b| a.company_name.cmp(&b.company_name));
        Ok(buyers)
    }

    async fn soft_delete_buyer(&self, tenant_id: i64, buyer_id: i64) -> Result<bool, AppError> {
        let _writer = self.shared.writer.lock().await;
        let mut tables = self.shared.write()?;
        Ok(match tables
            .buyers
            .get_mut(&buyer_id)
            .filter(|b| b.business_owner_id == tenant_id && !b.is_deleted)
        {
            Some(buyer) => {
                buyer.is_deleted = true;
                buyer.deleted_at = Some(Utc::now());
                true
            }
            None => false,
        })
    }

    async fn find_offer(&self, tenant_id: i64, offer_id: i64) -> Result<Option<OfferAggregate>, AppError> {
        let tables = self.shared.read()?;
        Ok(tables
            .offers
            .get(&offer_id)
            .filter(|o| o.business_owner_id == tenant_id && !o.is_deleted)
            .map(|o| tables.offer_aggregate(o)))
    }

    async fn search_offers(
        &self,
        tenant_id: i64,
        filter: &OfferFilter,
        paging: Paging,
    ) -> Result<(Vec<OfferAggregate>, i64), AppError> {
        let tables = self.shared.read()?;
        let mut matches: Vec<&Offer> = tables
            .offers
            .values()
            .filter(|o| o.business_owner_id == tenant_id && !o.is_deleted)
            .filter(|o| tables.offer_matches(o, filter))
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = matches.len() as i64;
        let page = matches
            .into_iter()
            .skip(paging.offset as usize)
            .take(paging.limit as usize)
            .map(|o| tables.offer_aggregate(o))
            .collect();
        Ok((page, total))
    }

    async fn soft_delete_offer(&self, tenant_id: i64, offer_id: i64) -> Result<bool, AppError> {
        let _writer = self.shared.writer.lock().await;
        let mut tables = self.shared.write()?;
        Ok(match tables.live_offer_mut(tenant_id, offer_id) {
            Some(offer) => {
                let now = Utc::now();
                offer.is_deleted = true;
                offer.deleted_at = Some(now);
                offer.updated_at = now;
                true
            }
            None => false,
        })
    }
}

pub struct MemoryUnitOfWork {
    shared: Arc<Shared>,
    staged: MemoryTables,
    _guard: OwnedMutexGuard<()>,
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn insert_draft(&mut self, tenant_id: i64, draft: &NewDraft) -> Result<OfferDraft, AppError> {
        self.shared.trip(FaultPoint::InsertDraft)?;
        let now = Utc::now();
        let row = OfferDraft {
            draft_no: self.staged.next_id(),
            business_owner_id: tenant_id,
            draft_name: draft.draft_name.clone(),
            terms: draft.terms.clone(),
            grand_total: draft.grand_total,
            is_deleted: false,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        };
        self.staged.drafts.insert(row.draft_no, row.clone());
        Ok(row)
    }

    async fn update_draft(
        &mut self,
        tenant_id: i64,
        draft_no: i64,
        changes: &DraftChanges,
    ) -> Result<Option<OfferDraft>, AppError> {
        let Some(draft) = self.staged.live_draft_mut(tenant_id, draft_no) else {
            return Ok(None);
        };
        if let Some(name) = &changes.draft_name {
            draft.draft_name = Some(name.clone());
        }
        changes.terms.apply_to(&mut draft.terms);
        if let Some(total) = changes.grand_total {
            draft.grand_total = total;
        }
        draft.updated_at = Utc::now();
        Ok(Some(draft.clone()))
    }

    async fn clear_draft_products(&mut self, tenant_id: i64, draft_no: i64) -> Result<(), AppError> {
        let owned = self
            .staged
            .drafts
            .get(&draft_no)
            .is_some_and(|d| d.business_owner_id == tenant_id);
        if !owned {
            return Ok(());
        }

        let product_ids: Vec<i64> = self
            .staged
            .draft_products
            .values()
            .filter(|p| p.draft_no == draft_no)
            .map(|p| p.id)
            .collect();
        self.staged
            .draft_breakups
            .retain(|_, b| !product_ids.contains(&b.draft_product_id));
        self.staged.draft_products.retain(|_, p| p.draft_no != draft_no);
        Ok(())
    }

    async fn insert_draft_product(
        &mut self,
        draft_no: i64,
        line: &ProductLine,
    ) -> Result<OfferDraftProduct, AppError> {
        self.shared.trip(FaultPoint::InsertDraftProduct)?;
        let row = OfferDraftProduct {
            id: self.staged.next_id(),
            draft_no,
            line: line.clone(),
        };
        self.staged.draft_products.insert(row.id, row.clone());
        Ok(row)
    }

    async fn insert_draft_breakup(
        &mut self,
        draft_product_id: i64,
        line: &SizeBreakupLine,
    ) -> Result<OfferDraftSizeBreakup, AppError> {
        self.shared.trip(FaultPoint::InsertDraftBreakup)?;
        let row = OfferDraftSizeBreakup {
            id: self.staged.next_id(),
            draft_product_id,
            line: line.clone(),
        };
        self.staged.draft_breakups.insert(row.id, row.clone());
        Ok(row)
    }

    async fn insert_offer(&mut self, tenant_id: i64, offer: &NewOffer) -> Result<Offer, AppError> {
        self.shared.trip(FaultPoint::InsertOffer)?;
        let now = Utc::now();
        let row = Offer {
            id: self.staged.next_id(),
            business_owner_id: tenant_id,
            buyer_id: offer.buyer_id,
            offer_name: offer.offer_name.clone(),
            business_name: offer.business_name.clone(),
            to_party: offer.to_party.clone(),
            destination: offer.destination.clone(),
            draft_name: offer.draft_name.clone(),
            terms: offer.terms.clone(),
            grand_total: offer.grand_total,
            status: OfferStatus::Open.as_str().to_string(),
            is_deleted: false,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        };
        self.staged.offers.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_offer(
        &mut self,
        tenant_id: i64,
        offer_id: i64,
        changes: &OfferChanges,
    ) -> Result<Option<Offer>, AppError> {
        let Some(offer) = self.staged.live_offer_mut(tenant_id, offer_id) else {
            return Ok(None);
        };
        if let Some(v) = &changes.offer_name {
            offer.offer_name = v.clone();
        }
        if let Some(v) = &changes.business_name {
            offer.business_name = Some(v.clone());
        }
        if let Some(v) = &changes.to_party {
            offer.to_party = v.clone();
        }
        if let Some(v) = &changes.destination {
            offer.destination = v.clone();
        }
        changes.terms.apply_to(&mut offer.terms);
        if let Some(total) = changes.grand_total {
            offer.grand_total = total;
        }
        if let Some(status) = changes.status {
            offer.status = status.as_str().to_string();
        }
        offer.updated_at = Utc::now();
        Ok(Some(offer.clone()))
    }

    async fn insert_offer_product(&mut self, offer_id: i64, line: &ProductLine) -> Result<OfferProduct, AppError> {
        self.shared.trip(FaultPoint::InsertOfferProduct)?;
        let row = OfferProduct {
            id: self.staged.next_id(),
            offer_id,
            line: line.clone(),
        };
        self.staged.offer_products.insert(row.id, row.clone());
        Ok(row)
    }

    async fn insert_offer_breakup(
        &mut self,
        offer_product_id: i64,
        line: &SizeBreakupLine,
    ) -> Result<OfferSizeBreakup, AppError> {
        self.shared.trip(FaultPoint::InsertOfferBreakup)?;
        let row = OfferSizeBreakup {
            id: self.staged.next_id(),
            offer_product_id,
            line: line.clone(),
        };
        self.staged.offer_breakups.insert(row.id, row.clone());
        Ok(row)
    }

    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        let MemoryUnitOfWork { shared, staged, _guard } = *self;
        *shared.write()? = staged;
        Ok(())
    }
}
