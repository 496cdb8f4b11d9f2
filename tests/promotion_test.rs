mod common;

use common::*;
use offerdesk_backend::config::CopyMode;
use offerdesk_backend::dtos::offer::PromoteDraftRequest;
use offerdesk_backend::error::AppError;
use offerdesk_backend::models::offer::OfferStatus;
use offerdesk_backend::services::promoter::{self, DraftSourceKind};
use offerdesk_backend::services::drafts;
use offerdesk_backend::store::memory::FaultPoint;

fn overrides(buyer_id: i64) -> PromoteDraftRequest {
    PromoteDraftRequest {
        buyer_id: Some(buyer_id),
        offer_name: Some("Shrimp for Aarhus".into()),
        destination: Some("Aarhus, DK".into()),
        ..Default::default()
    }
}

#[tokio::test]
async fn promotion_copies_the_draft_into_an_open_offer() {
    let app = test_app(CopyMode::BestEffort);
    let draft = create_draft(&app, 1, Some("March lot")).await;
    let buyer = create_buyer(&app, 1, "Nordic Seafood ApS").await;

    let promotion = promoter::promote_draft(&app.state, tenant(1), draft.draft.draft_no, overrides(buyer.id))
        .await
        .unwrap();

    assert_eq!(promotion.source, DraftSourceKind::Persisted);
    assert_eq!(promotion.skipped_items, 0);

    let offer = &promotion.offer.offer;
    assert_eq!(offer.business_owner_id, 1);
    assert_eq!(offer.buyer_id, buyer.id);
    assert_eq!(offer.status(), OfferStatus::Open);
    assert_eq!(offer.offer_name, "Shrimp for Aarhus");
    assert_eq!(offer.destination, "Aarhus, DK");
    assert_eq!(offer.to_party, "Nordic Seafood ApS");
    assert_eq!(offer.draft_name.as_deref(), Some("March lot"));
    assert_eq!(offer.terms, draft.draft.terms);
    assert_eq!(offer.grand_total, dec("18"));

    assert_eq!(promotion.offer.products.len(), 2);
    let copied: Vec<_> = promotion
        .offer
        .products
        .iter()
        .map(|p| (p.product.line.clone(), p.size_breakups.iter().map(|b| b.line.clone()).collect::<Vec<_>>()))
        .collect();
    let original: Vec<_> = draft
        .product_lines()
        .into_iter()
        .map(|p| (p.line, p.size_breakups))
        .collect();
    assert_eq!(copied, original);

    // the draft itself is untouched
    assert_eq!(drafts::get_draft(&app.state, tenant(1), draft.draft.draft_no).await.unwrap(), draft);

    let sent = app.notifier.wait_for(1).await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipient, "purchasing@example.com");
    assert!(sent[0].subject.contains("Shrimp for Aarhus"));
}

#[tokio::test]
async fn overrides_take_precedence_over_draft_fields() {
    let app = test_app(CopyMode::BestEffort);
    let draft = create_draft(&app, 1, None).await;
    let buyer = create_buyer(&app, 1, "Nordic Seafood ApS").await;

    let req = PromoteDraftRequest {
        to_party: Some("Nordic Seafood Import".into()),
        brand: Some("Polar".into()),
        shipment_date: Some(days_from_today(45)),
        grand_total: Some(dec("18")),
        business_name: Some("Ocean Fresh Ltd".into()),
        ..overrides(buyer.id)
    };
    let promotion = promoter::promote_draft(&app.state, tenant(1), draft.draft.draft_no, req)
        .await
        .unwrap();

    let offer = &promotion.offer.offer;
    assert_eq!(offer.to_party, "Nordic Seafood Import");
    assert_eq!(offer.terms.brand, "Polar");
    assert_eq!(offer.terms.shipment_date, Some(days_from_today(45)));
    assert_eq!(offer.terms.offer_validity_date, draft.draft.terms.offer_validity_date);
    assert_eq!(offer.terms.origin, "Vietnam");
    assert_eq!(offer.business_name.as_deref(), Some("Ocean Fresh Ltd"));
}

#[tokio::test]
async fn missing_draft_falls_back_to_overrides() {
    let app = test_app(CopyMode::BestEffort);
    let buyer = create_buyer(&app, 1, "Nordic Seafood ApS").await;

    let req = PromoteDraftRequest {
        from_party: Some("Acme".into()),
        grand_total: Some(dec("500")),
        ..overrides(buyer.id)
    };
    let promotion = promoter::promote_draft(&app.state, tenant(1), 9_999, req).await.unwrap();

    assert_eq!(promotion.source, DraftSourceKind::Synthesized);
    let offer = &promotion.offer.offer;
    assert_eq!(offer.terms.from_party, "Acme");
    assert_eq!(offer.grand_total, dec("500"));
    assert_eq!(offer.terms.origin, promoter::UNKNOWN_ORIGIN);
    assert_eq!(offer.terms.plant_approval_number, promoter::NOT_AVAILABLE);
    assert_eq!(offer.terms.brand, promoter::NOT_AVAILABLE);
    assert_eq!(offer.terms.offer_validity_date, Some(days_from_today(promoter::DEFAULT_VALIDITY_DAYS)));
    assert_eq!(offer.terms.shipment_date, None);
    assert!(promotion.offer.products.is_empty());

    assert_eq!(app.repo.snapshot().offers.len(), 1);
}

#[tokio::test]
async fn deleted_or_foreign_drafts_also_fall_back() {
    let app = test_app(CopyMode::BestEffort);
    let buyer = create_buyer(&app, 1, "Nordic Seafood ApS").await;

    let deleted = create_draft(&app, 1, None).await;
    drafts::delete_draft(&app.state, tenant(1), deleted.draft.draft_no).await.unwrap();
    let promotion = promoter::promote_draft(&app.state, tenant(1), deleted.draft.draft_no, overrides(buyer.id))
        .await
        .unwrap();
    assert_eq!(promotion.source, DraftSourceKind::Synthesized);
    assert_eq!(promotion.offer.offer.terms.from_party, promoter::UNKNOWN_COMPANY);
    assert_eq!(promotion.offer.offer.grand_total, dec("0"));

    let foreign = create_draft(&app, 2, None).await;
    let promotion = promoter::promote_draft(&app.state, tenant(1), foreign.draft.draft_no, overrides(buyer.id))
        .await
        .unwrap();
    assert_eq!(promotion.source, DraftSourceKind::Synthesized);
    assert!(promotion.offer.products.is_empty());
}

#[tokio::test]
async fn promotion_requires_a_buyer_of_the_same_tenant() {
    let app = test_app(CopyMode::BestEffort);
    let draft = create_draft(&app, 1, None).await;
    let foreign_buyer = create_buyer(&app, 2, "Someone Else GmbH").await;

    let err = promoter::promote_draft(&app.state, tenant(1), draft.draft.draft_no, overrides(foreign_buyer.id))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = promoter::promote_draft(&app.state, tenant(1), draft.draft.draft_no, overrides(424_242))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let tables = app.repo.snapshot();
    assert!(tables.offers.is_empty());
    assert!(tables.offer_products.is_empty());
    assert!(app.notifier.wait_for(1).await.is_empty());
}

#[tokio::test]
async fn deleted_buyer_cannot_receive_offers() {
    let app = test_app(CopyMode::BestEffort);
    let draft = create_draft(&app, 1, None).await;
    let buyer = create_buyer(&app, 1, "Gone Trading").await;
    offerdesk_backend::services::buyers::delete_buyer(&app.state, tenant(1), buyer.id)
        .await
        .unwrap();

    let err = promoter::promote_draft(&app.state, tenant(1), draft.draft.draft_no, overrides(buyer.id))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn offer_name_destination_and_buyer_are_required() {
    let app = test_app(CopyMode::BestEffort);
    let draft = create_draft(&app, 1, None).await;
    let buyer = create_buyer(&app, 1, "Nordic Seafood ApS").await;

    let req = PromoteDraftRequest {
        offer_name: Some(" ".into()),
        destination: None,
        ..overrides(buyer.id)
    };
    let err = promoter::promote_draft(&app.state, tenant(1), draft.draft.draft_no, req)
        .await
        .unwrap_err();
    assert_eq!(err.public_message(), "Missing required fields: offerName, destination");

    let req = PromoteDraftRequest {
        buyer_id: None,
        ..overrides(buyer.id)
    };
    assert!(matches!(
        promoter::promote_draft(&app.state, tenant(1), draft.draft.draft_no, req).await,
        Err(AppError::ValidationError(_))
    ));

    assert!(app.repo.snapshot().offers.is_empty());
}

#[tokio::test]
async fn best_effort_copy_keeps_the_header_when_a_product_fails() {
    let app = test_app(CopyMode::BestEffort);
    let draft = create_draft(&app, 1, None).await;
    let buyer = create_buyer(&app, 1, "Nordic Seafood ApS").await;
    app.repo.fail_nth(FaultPoint::InsertOfferProduct, 1);

    let promotion = promoter::promote_draft(&app.state, tenant(1), draft.draft.draft_no, overrides(buyer.id))
        .await
        .unwrap();

    // first product and its two breakups were skipped
    assert_eq!(promotion.skipped_items, 3);
    assert_eq!(promotion.offer.products.len(), 1);
    assert_eq!(promotion.offer.products[0].product.line.product_name, "Squid Tubes");
    assert_eq!(promotion.offer.products[0].size_breakups.len(), 1);

    let tables = app.repo.snapshot();
    assert_eq!(tables.offers.len(), 1);
    assert_eq!(tables.offer_products.len(), 1);
    assert_eq!(tables.offer_breakups.len(), 1);
}

#[tokio::test]
async fn best_effort_copy_skips_a_failed_breakup_only() {
    let app = test_app(CopyMode::BestEffort);
    let draft = create_draft(&app, 1, None).await;
    let buyer = create_buyer(&app, 1, "Nordic Seafood ApS").await;
    app.repo.fail_nth(FaultPoint::InsertOfferBreakup, 2);

    let promotion = promoter::promote_draft(&app.state, tenant(1), draft.draft.draft_no, overrides(buyer.id))
        .await
        .unwrap();

    assert_eq!(promotion.skipped_items, 1);
    assert_eq!(promotion.offer.products.len(), 2);
    assert_eq!(promotion.offer.products[0].size_breakups.len(), 1);
    assert_eq!(promotion.offer.products[0].size_breakups[0].line.size, "16/20");
}

#[tokio::test]
async fn atomic_copy_writes_nothing_when_a_breakup_fails() {
    let app = test_app(CopyMode::Atomic);
    let draft = create_draft(&app, 1, None).await;
    let buyer = create_buyer(&app, 1, "Nordic Seafood ApS").await;
    app.repo.fail_nth(FaultPoint::InsertOfferBreakup, 3);

    let err = promoter::promote_draft(&app.state, tenant(1), draft.draft.draft_no, overrides(buyer.id))
        .await
        .unwrap_err();
    assert_eq!(err.public_message(), "Failed to promote offer draft");

    let tables = app.repo.snapshot();
    assert!(tables.offers.is_empty());
    assert!(tables.offer_products.is_empty());
    assert!(tables.offer_breakups.is_empty());
}

#[tokio::test]
async fn atomic_copy_commits_everything_together() {
    let app = test_app(CopyMode::Atomic);
    let draft = create_draft(&app, 1, None).await;
    let buyer = create_buyer(&app, 1, "Nordic Seafood ApS").await;

    let promotion = promoter::promote_draft(&app.state, tenant(1), draft.draft.draft_no, overrides(buyer.id))
        .await
        .unwrap();
    assert_eq!(promotion.skipped_items, 0);
    assert_eq!(promotion.offer.products.len(), 2);
    assert_eq!(app.repo.snapshot().offer_breakups.len(), 3);
}

#[tokio::test]
async fn notification_failure_does_not_fail_promotion() {
    let app = test_app_with(
        CopyMode::BestEffort,
        RecordingNotifier {
            fail: true,
            ..Default::default()
        },
    );
    let draft = create_draft(&app, 1, None).await;
    let buyer = create_buyer(&app, 1, "Nordic Seafood ApS").await;

    let promotion = promoter::promote_draft(&app.state, tenant(1), draft.draft.draft_no, overrides(buyer.id)).await;
    assert!(promotion.is_ok());
    assert_eq!(app.notifier.wait_for(1).await.len(), 1);
}

#[tokio::test]
async fn override_dates_follow_the_ordering_rule() {
    let app = test_app(CopyMode::BestEffort);
    let draft = create_draft(&app, 1, None).await;
    let buyer = create_buyer(&app, 1, "Nordic Seafood ApS").await;

    let req = PromoteDraftRequest {
        offer_validity_date: Some(days_from_today(10)),
        shipment_date: Some(days_from_today(5)),
        ..overrides(buyer.id)
    };
    assert!(matches!(
        promoter::promote_draft(&app.state, tenant(1), draft.draft.draft_no, req).await,
        Err(AppError::ValidationError(_))
    ));
    assert!(app.repo.snapshot().offers.is_empty());

    // shipment override earlier than the draft's stored validity (today + 7)
    let req = PromoteDraftRequest {
        shipment_date: Some(days_from_today(3)),
        ..overrides(buyer.id)
    };
    assert!(matches!(
        promoter::promote_draft(&app.state, tenant(1), draft.draft.draft_no, req).await,
        Err(AppError::ValidationError(_))
    ));

    // shipment override earlier than the default validity of a synthesized draft
    let req = PromoteDraftRequest {
        shipment_date: Some(days_from_today(5)),
        ..overrides(buyer.id)
    };
    assert!(matches!(
        promoter::promote_draft(&app.state, tenant(1), 9_999, req).await,
        Err(AppError::ValidationError(_))
    ));
    assert!(app.repo.snapshot().offers.is_empty());
}
