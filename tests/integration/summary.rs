use crate::helpers::{new_lot, qty, spawn_app, spawn_app_with_mode};
use chrono::Duration;
use rust_decimal::Decimal;
use stock_manager::error::StockError;
use stock_manager::types::AllocationMode;
use uuid::Uuid;

#[tokio::test]
async fn summary_composes_totals_and_breakdown() {
    let app = spawn_app().await;
    let lot1 = app.receive_lot(100).await;
    let lot2 = app.receive_lot(60).await;
    app.manager
        .reserve(app.article_id, qty(30), Uuid::new_v4(), None, "tester", None)
        .await
        .unwrap();

    let summary = app.manager.summarize(app.article_id).await.unwrap();
    assert_eq!(summary.total_current, qty(160));
    assert_eq!(summary.total_reserved, qty(30));
    assert_eq!(summary.total_available, qty(130));
    assert_eq!(summary.lots.len(), 2);
    assert_eq!(summary.lots[0].id, lot1.id);
    assert_eq!(summary.lots[0].available_quantity, qty(70));
    assert_eq!(summary.lots[1].id, lot2.id);
    assert_eq!(summary.lots[1].available_quantity, qty(60));
}

#[tokio::test]
async fn summarizing_an_unknown_article_yields_an_empty_summary() {
    let app = spawn_app().await;
    let summary = app.manager.summarize(Uuid::new_v4()).await.unwrap();
    assert_eq!(summary.total_current, Decimal::ZERO);
    assert_eq!(summary.total_reserved, Decimal::ZERO);
    assert_eq!(summary.total_available, Decimal::ZERO);
    assert!(summary.lots.is_empty());
}

#[tokio::test]
async fn depleted_lots_drop_out_of_the_breakdown() {
    let app = spawn_app().await;
    app.receive_lot(20).await;
    let lot2 = app.receive_lot(50).await;
    app.manager
        .consume(app.article_id, qty(20), None, None, "tester", None)
        .await
        .unwrap();

    let summary = app.manager.summarize(app.article_id).await.unwrap();
    assert_eq!(summary.lots.len(), 1);
    assert_eq!(summary.lots[0].id, lot2.id);
    assert_eq!(summary.total_current, qty(50));
}

#[tokio::test]
async fn on_hand_audit_reports_divergence_without_correcting() {
    let app = spawn_app().await;
    app.receive_lot(80).await;

    let audit = app.manager.audit_on_hand(app.article_id, qty(80)).await.unwrap();
    assert!(audit.is_consistent());

    let audit = app.manager.audit_on_hand(app.article_id, qty(95)).await.unwrap();
    assert!(!audit.is_consistent());
    assert_eq!(audit.ledger_quantity, qty(80));
    assert_eq!(audit.divergence, qty(15));

    let summary = app.manager.summarize(app.article_id).await.unwrap();
    assert_eq!(summary.total_current, qty(80));
}

#[tokio::test]
async fn movement_history_for_an_unknown_lot_is_rejected() {
    let app = spawn_app().await;
    let err = app.manager.movement_history(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, StockError::LotNotFound(_)));
}

#[tokio::test]
async fn fefo_mode_draws_the_nearest_expiry_first() {
    let app = spawn_app_with_mode(AllocationMode::Fefo).await;
    app.clock.advance(Duration::minutes(1));
    let mut later = new_lot(app.article_id, 50);
    later.expiry_date = Some(app.now() + Duration::days(30));
    let later = app.manager.create_lot(later, "tester").await.unwrap();

    app.clock.advance(Duration::minutes(1));
    let mut sooner = new_lot(app.article_id, 50);
    sooner.expiry_date = Some(app.now() + Duration::days(5));
    let sooner = app.manager.create_lot(sooner, "tester").await.unwrap();

    let outcome = app
        .manager
        .consume(app.article_id, qty(60), None, None, "tester", None)
        .await
        .unwrap();
    assert_eq!(outcome.assignments[0].lot.id, sooner.id);
    assert_eq!(outcome.assignments[0].quantity, qty(50));
    assert_eq!(outcome.assignments[1].lot.id, later.id);
    assert_eq!(outcome.assignments[1].quantity, qty(10));
}

#[tokio::test]
async fn fefo_mode_excludes_expired_lots() {
    let app = spawn_app_with_mode(AllocationMode::Fefo).await;
    app.clock.advance(Duration::minutes(1));
    let mut expiring = new_lot(app.article_id, 40);
    expiring.expiry_date = Some(app.now() + Duration::days(1));
    app.manager.create_lot(expiring, "tester").await.unwrap();
    let fresh = app.receive_lot(40).await;

    app.clock.advance(Duration::days(2));
    let outcome = app
        .manager
        .consume(app.article_id, qty(60), None, None, "tester", None)
        .await
        .unwrap();

    assert_eq!(outcome.assignments.len(), 1);
    assert_eq!(outcome.assignments[0].lot.id, fresh.id);
    assert_eq!(outcome.assignments[0].quantity, qty(40));
    assert_eq!(outcome.shortage, qty(20));
}

#[tokio::test]
async fn fifo_mode_keeps_expired_lots_eligible() {
    let app = spawn_app().await;
    let mut expiring = new_lot(app.article_id, 40);
    app.clock.advance(Duration::minutes(1));
    expiring.expiry_date = Some(app.now() + Duration::days(1));
    let expiring = app.manager.create_lot(expiring, "tester").await.unwrap();
    app.receive_lot(40).await;

    app.clock.advance(Duration::days(2));
    let outcome = app
        .manager
        .consume(app.article_id, qty(60), None, None, "tester", None)
        .await
        .unwrap();

    assert_eq!(outcome.assignments.len(), 2);
    assert_eq!(outcome.assignments[0].lot.id, expiring.id);
    assert_eq!(outcome.shortage, Decimal::ZERO);
}
