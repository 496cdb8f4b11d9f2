#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;

use offerdesk_backend::auth::TenantContext;
use offerdesk_backend::config::CopyMode;
use offerdesk_backend::dtos::buyer::CreateBuyerRequest;
use offerdesk_backend::dtos::draft::CreateDraftRequest;
use offerdesk_backend::dtos::line::{ProductInput, SizeBreakupInput};
use offerdesk_backend::models::buyer::Buyer;
use offerdesk_backend::models::draft::DraftAggregate;
use offerdesk_backend::services::notifier::{Notifier, NotifyOutcome};
use offerdesk_backend::services::{buyers, drafts};
use offerdesk_backend::state::AppState;
use offerdesk_backend::store::InMemoryRepository;

pub const SECRET: &str = "test-secret";

#[derive(Debug, Clone, PartialEq)]
pub struct SentMail {
    pub recipient: String,
    pub subject: String,
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<SentMail>>,
    pub fail: bool,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, recipient: &str, subject: &str, _html: &str, _text: &str) -> NotifyOutcome {
        self.sent.lock().unwrap().push(SentMail {
            recipient: recipient.to_string(),
            subject: subject.to_string(),
        });
        if self.fail {
            NotifyOutcome::failed("relay refused the message")
        } else {
            NotifyOutcome::delivered()
        }
    }
}

impl RecordingNotifier {
    /// Waits for the spawned notification task to run.
    pub async fn wait_for(&self, count: usize) -> Vec<SentMail> {
        for _ in 0..100 {
            if self.sent.lock().unwrap().len() >= count {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.sent.lock().unwrap().clone()
    }
}

pub struct TestApp {
    pub state: AppState,
    pub repo: InMemoryRepository,
    pub notifier: Arc<RecordingNotifier>,
}

pub fn test_app(copy_mode: CopyMode) -> TestApp {
    test_app_with(copy_mode, RecordingNotifier::default())
}

pub fn test_app_with(copy_mode: CopyMode, notifier: RecordingNotifier) -> TestApp {
    let repo = InMemoryRepository::new();
    let notifier = Arc::new(notifier);
    let state = AppState::new(Arc::new(repo.clone()), notifier.clone(), SECRET, copy_mode);
    TestApp { state, repo, notifier }
}

pub fn tenant(id: i64) -> TenantContext {
    TenantContext::new(id)
}

pub fn dec(v: &str) -> Decimal {
    v.parse().unwrap()
}

pub fn days_from_today(days: i64) -> NaiveDate {
    Utc::now().date_naive() + chrono::Duration::days(days)
}

pub fn breakup(size: &str, qty: &str, price: &str) -> SizeBreakupInput {
    SizeBreakupInput {
        size: size.to_string(),
        breakup: dec(qty),
        price: dec(price),
        condition: None,
    }
}

pub fn product(name: &str, breakups: Option<Vec<SizeBreakupInput>>) -> ProductInput {
    ProductInput {
        product_id: 101,
        product_name: name.to_string(),
        species: "Litopenaeus vannamei".to_string(),
        packing: Some("10 x 1 kg".to_string()),
        size_details: Some("pieces per lb".to_string()),
        breakup_details: Some("cartons".to_string()),
        price_details: Some("USD per kg".to_string()),
        condition_details: None,
        size_breakups: breakups,
    }
}

/// Two products with breakups 10 + 5 and 3, so the grand total must be 18.
pub fn draft_request(name: Option<&str>, grand_total: &str) -> CreateDraftRequest {
    CreateDraftRequest {
        draft_name: name.map(str::to_string),
        from_party: Some("Ocean Fresh Exports".to_string()),
        origin: Some("Vietnam".to_string()),
        processor: None,
        plant_approval_number: Some("DL-123".to_string()),
        brand: Some("SeaStar".to_string()),
        offer_validity_date: Some(days_from_today(7)),
        shipment_date: Some(days_from_today(21)),
        quantity: Some("1 FCL".to_string()),
        tolerance: None,
        payment_terms: Some("CAD".to_string()),
        remark: None,
        grand_total: Some(dec(grand_total)),
        products: vec![
            product(
                "White Shrimp HLSO",
                Some(vec![breakup("16/20", "10", "8.50"), breakup("21/25", "5", "7.75")]),
            ),
            product("Squid Tubes", Some(vec![breakup("U5", "3", "4.10")])),
        ],
    }
}

pub async fn create_draft(app: &TestApp, tenant_id: i64, name: Option<&str>) -> DraftAggregate {
    drafts::create_draft(&app.state, tenant(tenant_id), draft_request(name, "18"))
        .await
        .unwrap()
}

pub async fn create_buyer(app: &TestApp, tenant_id: i64, company: &str) -> Buyer {
    buyers::create_buyer(
        &app.state,
        tenant(tenant_id),
        CreateBuyerRequest {
            company_name: Some(company.to_string()),
            contact_name: Some("Marta Jensen".to_string()),
            email: Some("purchasing@example.com".to_string()),
            country: Some("Denmark".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
}

/// Fails when any JSON null appears anywhere in `value`.
pub fn assert_no_nulls(value: &serde_json::Value) {
    match value {
        serde_json::Value::Null => panic!("unexpected null in payload"),
        serde_json::Value::Array(items) => items.iter().for_each(assert_no_nulls),
        serde_json::Value::Object(map) => map.values().for_each(assert_no_nulls),
        _ => {}
    }
}
