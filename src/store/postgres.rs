// src/store/postgres.rs
use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use tracing::instrument;

use super::{normalize_filter, DraftFilter, OfferFilter, Paging, Repository, UnitOfWork};
use crate::error::{map_unique_violation, AppError};
use crate::models::buyer::{Buyer, NewBuyer};
use crate::models::draft::{
    DraftAggregate, DraftChanges, DraftProductAggregate, NewDraft, OfferDraft, OfferDraftProduct,
    OfferDraftSizeBreakup,
};
use crate::models::line::{ProductLine, SizeBreakupLine};
use crate::models::offer::{
    NewOffer, Offer, OfferAggregate, OfferChanges, OfferProduct, OfferProductAggregate,
    OfferSizeBreakup,
};

const DRAFT_COLUMNS: &str = "draft_no, business_owner_id, draft_name, from_party, origin, processor,
    plant_approval_number, brand, offer_validity_date, shipment_date, quantity, tolerance,
    payment_terms, remark, grand_total, is_deleted, deleted_at, created_at, updated_at";

const OFFER_COLUMNS: &str = "id, business_owner_id, buyer_id, offer_name, business_name, to_party,
    destination, draft_name, from_party, origin, processor, plant_approval_number, brand,
    offer_validity_date, shipment_date, quantity, tolerance, payment_terms, remark, grand_total,
    status, is_deleted, deleted_at, created_at, updated_at";

const PRODUCT_LINE_COLUMNS: &str = "product_id, product_name, species, packing, size_details,
    breakup_details, price_details, condition_details";

const BREAKUP_LINE_COLUMNS: &str = "size, breakup, price, condition";

const BUYER_COLUMNS: &str = "id, business_owner_id, company_name, contact_name, email, phone, address,
    city, state, country, postal_code, status, is_deleted, deleted_at, created_at";

const DUPLICATE_DRAFT_NAME: &str = "Draft name already exists";

/// `%text%` for ILIKE with the LIKE metacharacters in `text` escaped.
fn like_pattern(text: &str) -> String {
    let escaped = text
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn hydrate_drafts(&self, drafts: Vec<OfferDraft>) -> Result<Vec<DraftAggregate>, AppError> {
        if drafts.is_empty() {
            return Ok(Vec::new());
        }
        let draft_nos: Vec<i64> = drafts.iter().map(|d| d.draft_no).collect();

        let products = sqlx::query_as::<_, OfferDraftProduct>(&format!(
            "SELECT id, draft_no, {PRODUCT_LINE_COLUMNS}
             FROM offer_draft_products WHERE draft_no = ANY($1) ORDER BY id"
        ))
        .bind(&draft_nos[..])
        .fetch_all(&self.pool)
        .await?;

        let product_ids: Vec<i64> = products.iter().map(|p| p.id).collect();
        let breakups = sqlx::query_as::<_, OfferDraftSizeBreakup>(&format!(
            "SELECT id, draft_product_id, {BREAKUP_LINE_COLUMNS}
             FROM offer_draft_size_breakups WHERE draft_product_id = ANY($1) ORDER BY id"
        ))
        .bind(&product_ids[..])
        .fetch_all(&self.pool)
        .await?;

        let mut breakups_by_product: HashMap<i64, Vec<OfferDraftSizeBreakup>> = HashMap::new();
        for b in breakups {
            breakups_by_product.entry(b.draft_product_id).or_default().push(b);
        }
        let mut products_by_draft: HashMap<i64, Vec<DraftProductAggregate>> = HashMap::new();
        for p in products {
            let size_breakups = breakups_by_product.remove(&p.id).unwrap_or_default();
            products_by_draft
                .entry(p.draft_no)
                .or_default()
                .push(DraftProductAggregate { product: p, size_breakups });
        }

        Ok(drafts
            .into_iter()
            .map(|draft| {
                let products = products_by_draft.remove(&draft.draft_no).unwrap_or_default();
                DraftAggregate { draft, products }
            })
            .collect())
    }

    async fn hydrate_offers(&self, offers: Vec<Offer>) -> Result<Vec<OfferAggregate>, AppError> {
        if offers.is_empty() {
            return Ok(Vec::new());
        }
        let offer_ids: Vec<i64> = offers.iter().map(|o| o.id).collect();

        let products = sqlx::query_as::<_, OfferProduct>(&format!(
            "SELECT id, offer_id, {PRODUCT_LINE_COLUMNS}
             FROM offer_products WHERE offer_id = ANY($1) ORDER BY id"
        ))
        .bind(&offer_ids[..])
        .fetch_all(&self.pool)
        .await?;

        let product_ids: Vec<i64> = products.iter().map(|p| p.id).collect();
        let breakups = sqlx::query_as::<_, OfferSizeBreakup>(&format!(
            "SELECT id, offer_product_id, {BREAKUP_LINE_COLUMNS}
             FROM offer_size_breakups WHERE offer_product_id = ANY($1) ORDER BY id"
        ))
        .bind(&product_ids[..])
        .fetch_all(&self.pool)
        .await?;

        let mut breakups_by_product: HashMap<i64, Vec<OfferSizeBreakup>> = HashMap::new();
        for b in breakups {
            breakups_by_product.entry(b.offer_product_id).or_default().push(b);
        }
        let mut products_by_offer: HashMap<i64, Vec<OfferProductAggregate>> = HashMap::new();
        for p in products {
            let size_breakups = breakups_by_product.remove(&p.id).unwrap_or_default();
            products_by_offer
                .entry(p.offer_id)
                .or_default()
                .push(OfferProductAggregate { product: p, size_breakups });
        }

        Ok(offers
            .into_iter()
            .map(|offer| {
                let products = products_by_offer.remove(&offer.id).unwrap_or_default();
                OfferAggregate { offer, products }
            })
            .collect())
    }
}

fn push_draft_filters(qb: &mut QueryBuilder<'_, Postgres>, tenant_id: i64, filter: &DraftFilter) {
    qb.push(" WHERE business_owner_id = ")
        .push_bind(tenant_id)
        .push(" AND is_deleted = FALSE");
    if let Some(no) = filter.draft_no {
        qb.push(" AND draft_no = ").push_bind(no);
    }
    if let Some(name) = normalize_filter(&filter.draft_name) {
        qb.push(" AND draft_name ILIKE ").push_bind(like_pattern(&name));
    }
    if let Some(nos) = &filter.draft_nos {
        qb.push(" AND draft_no = ANY(").push_bind(nos.clone()).push(")");
    }
}

fn push_offer_filters(qb: &mut QueryBuilder<'_, Postgres>, tenant_id: i64, filter: &OfferFilter) {
    qb.push(" WHERE o.business_owner_id = ")
        .push_bind(tenant_id)
        .push(" AND o.is_deleted = FALSE");
    if let Some(v) = normalize_filter(&filter.offer_name) {
        qb.push(" AND o.offer_name ILIKE ").push_bind(like_pattern(&v));
    }
    if let Some(v) = normalize_filter(&filter.business_name) {
        qb.push(" AND o.business_name ILIKE ").push_bind(like_pattern(&v));
    }
    if let Some(v) = normalize_filter(&filter.to_party) {
        qb.push(" AND o.to_party ILIKE ").push_bind(like_pattern(&v));
    }
    if let Some(status) = filter.status {
        qb.push(" AND o.status = ").push_bind(status.as_str());
    }
    if let Some(v) = normalize_filter(&filter.buyer) {
        let pattern = like_pattern(&v);
        qb.push(
            " AND EXISTS (SELECT 1 FROM buyers b
                 WHERE b.id = o.buyer_id AND b.business_owner_id = o.business_owner_id
                 AND (b.company_name ILIKE ",
        )
        .push_bind(pattern.clone())
        .push(" OR b.contact_name ILIKE ")
        .push_bind(pattern)
        .push("))");
    }
    if let Some(v) = normalize_filter(&filter.product_name) {
        qb.push(" AND EXISTS (SELECT 1 FROM offer_products p WHERE p.offer_id = o.id AND p.product_name ILIKE ")
            .push_bind(like_pattern(&v))
            .push(")");
    }
}

#[async_trait]
impl Repository for PgRepository {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, AppError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgUnitOfWork { tx }))
    }

    #[instrument(skip(self))]
    async fn find_draft(&self, tenant_id: i64, draft_no: i64) -> Result<Option<DraftAggregate>, AppError> {
        let draft = sqlx::query_as::<_, OfferDraft>(&format!(
            "SELECT {DRAFT_COLUMNS} FROM offer_drafts
             WHERE draft_no = $1 AND business_owner_id = $2 AND is_deleted = FALSE"
        ))
        .bind(draft_no)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        match draft {
            Some(d) => Ok(self.hydrate_drafts(vec![d]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn draft_name_exists(
        &self,
        tenant_id: i64,
        draft_name: &str,
        excluding: Option<i64>,
    ) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (
                SELECT 1 FROM offer_drafts
                WHERE business_owner_id = $1 AND draft_name = $2 AND is_deleted = FALSE
                AND ($3::BIGINT IS NULL OR draft_no <> $3)
             )",
        )
        .bind(tenant_id)
        .bind(draft_name)
        .bind(excluding)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn draft_nos_with_product(&self, tenant_id: i64, product_name: &str) -> Result<Vec<i64>, AppError> {
        let nos = sqlx::query_scalar::<_, i64>(
            "SELECT DISTINCT p.draft_no
             FROM offer_draft_products p
             JOIN offer_drafts d ON d.draft_no = p.draft_no
             WHERE d.business_owner_id = $1 AND d.is_deleted = FALSE AND p.product_name ILIKE $2
             ORDER BY p.draft_no",
        )
        .bind(tenant_id)
        .bind(like_pattern(product_name.trim()))
        .fetch_all(&self.pool)
        .await?;
        Ok(nos)
    }

    #[instrument(skip(self, filter))]
    async fn search_drafts(
        &self,
        tenant_id: i64,
        filter: &DraftFilter,
        paging: Paging,
    ) -> Result<(Vec<DraftAggregate>, i64), AppError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM offer_drafts");
        push_draft_filters(&mut count, tenant_id, filter);
        let total: i64 = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {DRAFT_COLUMNS} FROM offer_drafts"));
        push_draft_filters(&mut select, tenant_id, filter);
        select
            .push(" ORDER BY created_at DESC, draft_no DESC LIMIT ")
            .push_bind(paging.limit)
            .push(" OFFSET ")
            .push_bind(paging.offset);
        let drafts = select.build_query_as::<OfferDraft>().fetch_all(&self.pool).await?;

        Ok((self.hydrate_drafts(drafts).await?, total))
    }

    async fn soft_delete_draft(&self, tenant_id: i64, draft_no: i64) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE offer_drafts SET is_deleted = TRUE, deleted_at = NOW(), updated_at = NOW()
             WHERE draft_no = $1 AND business_owner_id = $2 AND is_deleted = FALSE",
        )
        .bind(draft_no)
        .bind(tenant_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_buyer(&self, tenant_id: i64, buyer: &NewBuyer) -> Result<Buyer, AppError> {
        let row = sqlx::query_as::<_, Buyer>(&format!(
            "INSERT INTO buyers (business_owner_id, company_name, contact_name, email, phone,
                                 address, city, state, country, postal_code)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {BUYER_COLUMNS}"
        ))
        .bind(tenant_id)
        .bind(&buyer.company_name)
        .bind(&buyer.contact_name)
        .bind(&buyer.email)
        .bind(&buyer.phone)
        .bind(&buyer.address)
        .bind(&buyer.city)
        .bind(&buyer.state)
        .bind(&buyer.country)
        .bind(&buyer.postal_code)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_buyer(&self, tenant_id: i64, buyer_id: i64) -> Result<Option<Buyer>, AppError> {
        let buyer = sqlx::query_as::<_, Buyer>(&format!(
            "SELECT {BUYER_COLUMNS} FROM buyers
             WHERE id = $1 AND business_owner_id = $2 AND is_deleted = FALSE"
        ))
        .bind(buyer_id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(buyer)
    }

    async fn list_buyers(&self, tenant_id: i64) -> Result<Vec<Buyer>, AppError> {
        let buyers = sqlx::query_as::<_, Buyer>(&format!(
            "SELECT {BUYER_COLUMNS} FROM buyers
             WHERE business_owner_id = $1 AND is_deleted = FALSE
             ORDER BY company_name"
        ))
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(buyers)
    }

    async fn soft_delete_buyer(&self, tenant_id: i64, buyer_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE buyers SET is_deleted = TRUE, deleted_at = NOW()
             WHERE id = $1 AND business_owner_id = $2 AND is_deleted = FALSE",
        )
        .bind(buyer_id)
        .bind(tenant_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn find_offer(&self, tenant_id: i64, offer_id: i64) -> Result<Option<OfferAggregate>, AppError> {
        let offer = sqlx::query_as::<_, Offer>(&format!(
            "SELECT {OFFER_COLUMNS} FROM offers
             WHERE id = $1 AND business_owner_id = $2 AND is_deleted = FALSE"
        ))
        .bind(offer_id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        match offer {
            Some(o) => Ok(self.hydrate_offers(vec![o]).await?.pop()),
            None => Ok(None),
        }
    }

    #[instrument(skip(self, filter))]
    async fn search_offers(
        &self,
        tenant_id: i64,
        filter: &OfferFilter,
        paging: Paging,
    ) -> Result<(Vec<OfferAggregate>, i64), AppError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM offers o");
        push_offer_filters(&mut count, tenant_id, filter);
        let total: i64 = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {OFFER_COLUMNS} FROM offers o"));
        push_offer_filters(&mut select, tenant_id, filter);
        select
            .push(" ORDER BY o.created_at DESC, o.id DESC LIMIT ")
            .push_bind(paging.limit)
            .push(" OFFSET ")
            .push_bind(paging.offset);
        let offers = select.build_query_as::<Offer>().fetch_all(&self.pool).await?;

        Ok((self.hydrate_offers(offers).await?, total))
    }

    async fn soft_delete_offer(&self, tenant_id: i64, offer_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE offers SET is_deleted = TRUE, deleted_at = NOW(), updated_at = NOW()
             WHERE id = $1 AND business_owner_id = $2 AND is_deleted = FALSE",
        )
        .bind(offer_id)
        .bind(tenant_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn insert_draft(&mut self, tenant_id: i64, draft: &NewDraft) -> Result<OfferDraft, AppError> {
        let t = &draft.terms;
        sqlx::query_as::<_, OfferDraft>(&format!(
            "INSERT INTO offer_drafts (business_owner_id, draft_name, from_party, origin, processor,
                plant_approval_number, brand, offer_validity_date, shipment_date, quantity,
                tolerance, payment_terms, remark, grand_total)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
             RETURNING {DRAFT_COLUMNS}"
        ))
        .bind(tenant_id)
        .bind(&draft.draft_name)
        .bind(&t.from_party)
        .bind(&t.origin)
        .bind(&t.processor)
        .bind(&t.plant_approval_number)
        .bind(&t.brand)
        .bind(t.offer_validity_date)
        .bind(t.shipment_date)
        .bind(&t.quantity)
        .bind(&t.tolerance)
        .bind(&t.payment_terms)
        .bind(&t.remark)
        .bind(draft.grand_total)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| map_unique_violation(e, DUPLICATE_DRAFT_NAME))
    }

    async fn update_draft(
        &mut self,
        tenant_id: i64,
        draft_no: i64,
        changes: &DraftChanges,
    ) -> Result<Option<OfferDraft>, AppError> {
        let t = &changes.terms;
        sqlx::query_as::<_, OfferDraft>(&format!(
            "UPDATE offer_drafts SET
                draft_name = COALESCE($3, draft_name),
                from_party = COALESCE($4, from_party),
                origin = COALESCE($5, origin),
                processor = COALESCE($6, processor),
                plant_approval_number = COALESCE($7, plant_approval_number),
                brand = COALESCE($8, brand),
                offer_validity_date = COALESCE($9, offer_validity_date),
                shipment_date = COALESCE($10, shipment_date),
                quantity = COALESCE($11, quantity),
                tolerance = COALESCE($12, tolerance),
                payment_terms = COALESCE($13, payment_terms),
                remark = COALESCE($14, remark),
                grand_total = COALESCE($15, grand_total),
                updated_at = NOW()
             WHERE draft_no = $1 AND business_owner_id = $2 AND is_deleted = FALSE
             RETURNING {DRAFT_COLUMNS}"
        ))
        .bind(draft_no)
        .bind(tenant_id)
        .bind(&changes.draft_name)
        .bind(&t.from_party)
        .bind(&t.origin)
        .bind(&t.processor)
        .bind(&t.plant_approval_number)
        .bind(&t.brand)
        .bind(t.offer_validity_date)
        .bind(t.shipment_date)
        .bind(&t.quantity)
        .bind(&t.tolerance)
        .bind(&t.payment_terms)
        .bind(&t.remark)
        .bind(changes.grand_total)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| map_unique_violation(e, DUPLICATE_DRAFT_NAME))
    }

    async fn clear_draft_products(&mut self, tenant_id: i64, draft_no: i64) -> Result<(), AppError> {
        sqlx::query(
            "DELETE FROM offer_draft_products
             WHERE draft_no = $1
               AND draft_no IN (SELECT draft_no FROM offer_drafts WHERE business_owner_id = $2)",
        )
        .bind(draft_no)
        .bind(tenant_id)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn insert_draft_product(
        &mut self,
        draft_no: i64,
        line: &ProductLine,
    ) -> Result<OfferDraftProduct, AppError> {
        let row = sqlx::query_as::<_, OfferDraftProduct>(&format!(
            "INSERT INTO offer_draft_products (draft_no, {PRODUCT_LINE_COLUMNS})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING id, draft_no, {PRODUCT_LINE_COLUMNS}"
        ))
        .bind(draft_no)
        .bind(line.product_id)
        .bind(&line.product_name)
        .bind(&line.species)
        .bind(&line.packing)
        .bind(&line.size_details)
        .bind(&line.breakup_details)
        .bind(&line.price_details)
        .bind(&line.condition_details)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(row)
    }

    async fn insert_draft_breakup(
        &mut self,
        draft_product_id: i64,
        line: &SizeBreakupLine,
    ) -> Result<OfferDraftSizeBreakup, AppError> {
        let row = sqlx::query_as::<_, OfferDraftSizeBreakup>(&format!(
            "INSERT INTO offer_draft_size_breakups (draft_product_id, {BREAKUP_LINE_COLUMNS})
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, draft_product_id, {BREAKUP_LINE_COLUMNS}"
        ))
        .bind(draft_product_id)
        .bind(&line.size)
        .bind(line.breakup)
        .bind(line.price)
        .bind(&line.condition)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(row)
    }

    async fn insert_offer(&mut self, tenant_id: i64, offer: &NewOffer) -> Result<Offer, AppError> {
        let t = &offer.terms;
        let row = sqlx::query_as::<_, Offer>(&format!(
            "INSERT INTO offers (business_owner_id, buyer_id, offer_name, business_name, to_party,
                destination, draft_name, from_party, origin, processor, plant_approval_number, brand,
                offer_validity_date, shipment_date, quantity, tolerance, payment_terms, remark,
                grand_total, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18,
                $19, 'open')
             RETURNING {OFFER_COLUMNS}"
        ))
        .bind(tenant_id)
        .bind(offer.buyer_id)
        .bind(&offer.offer_name)
        .bind(&offer.business_name)
        .bind(&offer.to_party)
        .bind(&offer.destination)
        .bind(&offer.draft_name)
        .bind(&t.from_party)
        .bind(&t.origin)
        .bind(&t.processor)
        .bind(&t.plant_approval_number)
        .bind(&t.brand)
        .bind(t.offer_validity_date)
        .bind(t.shipment_date)
        .bind(&t.quantity)
        .bind(&t.tolerance)
        .bind(&t.payment_terms)
        .bind(&t.remark)
        .bind(offer.grand_total)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(row)
    }

    async fn update_offer(
        &mut self,
        tenant_id: i64,
        offer_id: i64,
        changes: &OfferChanges,
    ) -> Result<Option<Offer>, AppError> {
        let t = &changes.terms;
        let row = sqlx::query_as::<_, Offer>(&format!(
            "UPDATE offers SET
                offer_name = COALESCE($3, offer_name),
                business_name = COALESCE($4, business_name),
                to_party = COALESCE($5, to_party),
                destination = COALESCE($6, destination),
                from_party = COALESCE($7, from_party),
                origin = COALESCE($8, origin),
                processor = COALESCE($9, processor),
                plant_approval_number = COALESCE($10, plant_approval_number),
                brand = COALESCE($11, brand),
                offer_validity_date = COALESCE($12, offer_validity_date),
                shipment_date = COALESCE($13, shipment_date),
                quantity = COALESCE($14, quantity),
                tolerance = COALESCE($15, tolerance),
                payment_terms = COALESCE($16, payment_terms),
                remark = COALESCE($17, remark),
                grand_total = COALESCE($18, grand_total),
                status = COALESCE($19, status),
                updated_at = NOW()
             WHERE id = $1 AND business_owner_id = $2 AND is_deleted = FALSE
             RETURNING {OFFER_COLUMNS}"
        ))
        .bind(offer_id)
        .bind(tenant_id)
        .bind(&changes.offer_name)
        .bind(&changes.business_name)
        .bind(&changes.to_party)
        .bind(&changes.destination)
        .bind(&t.from_party)
        .bind(&t.origin)
        .bind(&t.processor)
        .bind(&t.plant_approval_number)
        .bind(&t.brand)
        .bind(t.offer_validity_date)
        .bind(t.shipment_date)
        .bind(&t.quantity)
        .bind(&t.tolerance)
        .bind(&t.payment_terms)
        .bind(&t.remark)
        .bind(changes.grand_total)
        .bind(changes.status.map(|s| s.as_str()))
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(row)
    }

    async fn insert_offer_product(&mut self, offer_id: i64, line: &ProductLine) -> Result<OfferProduct, AppError> {
        let row = sqlx::query_as::<_, OfferProduct>(&format!(
            "INSERT INTO offer_products (offer_id, {PRODUCT_LINE_COLUMNS})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING id, offer_id, {PRODUCT_LINE_COLUMNS}"
        ))
        .bind(offer_id)
        .bind(line.product_id)
        .bind(&line.product_name)
        .bind(&line.species)
        .bind(&line.packing)
        .bind(&line.size_details)
        .bind(&line.breakup_details)
        .bind(&line.price_details)
        .bind(&line.condition_details)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(row)
    }

    async fn insert_offer_breakup(
        &mut self,
        offer_product_id: i64,
        line: &SizeBreakupLine,
    ) -> Result<OfferSizeBreakup, AppError> {
        let row = sqlx::query_as::<_, OfferSizeBreakup>(&format!(
            "INSERT INTO offer_size_breakups (offer_product_id, {BREAKUP_LINE_COLUMNS})
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, offer_product_id, {BREAKUP_LINE_COLUMNS}"
        ))
        .bind(offer_product_id)
        .bind(&line.size)
        .bind(line.breakup)
        .bind(line.price)
        .bind(&line.condition)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(row)
    }

    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        self.tx.commit().await?;
        Ok(())
    }
}
