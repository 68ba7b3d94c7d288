use crate::helpers::{new_lot, qty, spawn_app};
use rust_decimal::Decimal;
use stock_manager::error::StockError;
use stock_manager::store::LotStore;
use stock_manager::types::{Lot, MovementKind};
use stock_manager::Clock;
use uuid::Uuid;

#[tokio::test]
async fn prioritized_lot_becomes_the_allocation_head() {
    let app = spawn_app().await;
    let lot1 = app.receive_lot(50).await;
    let lot2 = app.receive_lot(50).await;

    let prioritized = app.manager.prioritize(lot2.id, "admin", None).await.unwrap();
    assert!(prioritized.entry_date < lot1.entry_date);

    let outcome = app
        .manager
        .consume(app.article_id, qty(10), None, None, "tester", None)
        .await
        .unwrap();
    assert_eq!(outcome.assignments[0].lot.id, lot2.id);
}

#[tokio::test]
async fn prioritize_only_touches_metadata() {
    let app = spawn_app().await;
    let lot = app.receive_lot(75).await;
    let original_entry = lot.entry_date;

    let prioritized = app
        .manager
        .prioritize(lot.id, "admin", Some("urgent order"))
        .await
        .unwrap();

    assert_eq!(prioritized.current_quantity, qty(75));
    assert_eq!(prioritized.reserved_quantity, Decimal::ZERO);

    let history = app.manager.movement_history(lot.id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].kind, MovementKind::PriorityAdjustment);
    assert_eq!(history[0].quantity, Decimal::ZERO);
    let notes = history[0].notes.as_deref().unwrap();
    assert!(notes.contains(&original_entry.to_string()));
    assert!(notes.contains(&prioritized.entry_date.to_string()));
    assert!(notes.contains("urgent order"));
}

#[tokio::test]
async fn prioritizing_a_depleted_lot_is_rejected() {
    let app = spawn_app().await;
    let lot = app.receive_lot(30).await;
    app.manager
        .consume(app.article_id, qty(30), None, None, "tester", None)
        .await
        .unwrap();

    let err = app.manager.prioritize(lot.id, "admin", None).await.unwrap_err();
    assert!(matches!(err, StockError::InvalidState { .. }));
}

#[tokio::test]
async fn prioritizing_an_inactive_lot_is_rejected() {
    let app = spawn_app().await;
    let mut dormant = Lot::new(new_lot(app.article_id, 30), app.clock.now(), "tester");
    dormant.active = false;
    app.store.insert_lot(&dormant).await.unwrap();

    let err = app
        .manager
        .prioritize(dormant.id, "admin", None)
        .await
        .unwrap_err();
    assert!(matches!(err, StockError::InvalidState { .. }));
}

#[tokio::test]
async fn prioritizing_an_unknown_lot_is_rejected() {
    let app = spawn_app().await;
    let err = app
        .manager
        .prioritize(Uuid::new_v4(), "admin", None)
        .await
        .unwrap_err();
    assert!(matches!(err, StockError::LotNotFound(_)));
}

#[tokio::test]
async fn relocation_records_the_old_and_new_placement() {
    let app = spawn_app().await;
    let lot = app.receive_lot(10).await;

    let relocated = app
        .manager
        .relocate(lot.id, "A-03-2", "warehouse", None)
        .await
        .unwrap();
    assert_eq!(relocated.location.as_deref(), Some("A-03-2"));
    assert_eq!(relocated.current_quantity, qty(10));

    let relocated = app
        .manager
        .relocate(lot.id, "B-01-4", "warehouse", None)
        .await
        .unwrap();
    assert_eq!(relocated.location.as_deref(), Some("B-01-4"));

    let history = app.manager.movement_history(lot.id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert!(history
        .iter()
        .all(|movement| movement.kind == MovementKind::LocationAdjustment
            && movement.quantity == Decimal::ZERO));
    let notes = history[1].notes.as_deref().unwrap();
    assert!(notes.contains("A-03-2 -> B-01-4"));
}

#[tokio::test]
async fn relocating_an_unknown_lot_is_rejected() {
    let app = spawn_app().await;
    let err = app
        .manager
        .relocate(Uuid::new_v4(), "A-01-1", "warehouse", None)
        .await
        .unwrap_err();
    assert!(matches!(err, StockError::LotNotFound(_)));
}
