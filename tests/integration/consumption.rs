use crate::helpers::{new_lot, qty, spawn_app};
use rust_decimal::Decimal;
use stock_manager::error::StockError;
use stock_manager::store::LotStore;
use stock_manager::types::{Lot, MovementKind};
use stock_manager::Clock;
use uuid::Uuid;

#[tokio::test]
async fn consumption_splits_across_lots_oldest_first() {
    let app = spawn_app().await;
    let lot1 = app.receive_lot(100).await;
    let lot2 = app.receive_lot(150).await;

    let outcome = app
        .manager
        .consume(app.article_id, qty(120), None, Some("OUT-1"), "tester", None)
        .await
        .unwrap();

    assert_eq!(outcome.shortage, Decimal::ZERO);
    assert_eq!(outcome.assignments.len(), 2);
    assert_eq!(outcome.assignments[0].lot.id, lot1.id);
    assert_eq!(outcome.assignments[0].quantity, qty(100));
    assert_eq!(outcome.assignments[1].lot.id, lot2.id);
    assert_eq!(outcome.assignments[1].quantity, qty(20));

    assert_eq!(app.manager.lot(lot1.id).await.unwrap().current_quantity, qty(0));
    assert_eq!(app.manager.lot(lot2.id).await.unwrap().current_quantity, qty(130));
}

#[tokio::test]
async fn consumption_reports_shortage_instead_of_failing() {
    let app = spawn_app().await;
    let lot = app.receive_lot(30).await;

    let outcome = app
        .manager
        .consume(app.article_id, qty(50), None, None, "tester", None)
        .await
        .unwrap();

    assert_eq!(outcome.assignments.len(), 1);
    assert_eq!(outcome.assignments[0].lot.id, lot.id);
    assert_eq!(outcome.assignments[0].quantity, qty(30));
    assert_eq!(outcome.shortage, qty(20));
    assert_eq!(app.manager.lot(lot.id).await.unwrap().current_quantity, qty(0));
}

#[tokio::test]
async fn zero_quantity_consumption_has_no_side_effects() {
    let app = spawn_app().await;
    let lot = app.receive_lot(10).await;

    let outcome = app
        .manager
        .consume(app.article_id, Decimal::ZERO, None, None, "tester", None)
        .await
        .unwrap();

    assert!(outcome.assignments.is_empty());
    assert_eq!(outcome.shortage, Decimal::ZERO);
    assert!(app.manager.movement_history(lot.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn negative_quantity_is_rejected() {
    let app = spawn_app().await;
    let err = app
        .manager
        .consume(app.article_id, qty(-1), None, None, "tester", None)
        .await
        .unwrap_err();
    assert!(matches!(err, StockError::InvalidQuantity(_)));
}

#[tokio::test]
async fn unknown_article_is_rejected() {
    let app = spawn_app().await;
    let err = app
        .manager
        .consume(Uuid::new_v4(), qty(5), None, None, "tester", None)
        .await
        .unwrap_err();
    assert!(matches!(err, StockError::ArticleNotFound(_)));
}

#[tokio::test]
async fn consuming_without_lots_returns_full_shortage() {
    let app = spawn_app().await;
    let outcome = app
        .manager
        .consume(app.article_id, qty(40), None, None, "tester", None)
        .await
        .unwrap();
    assert!(outcome.assignments.is_empty());
    assert_eq!(outcome.shortage, qty(40));
}

#[tokio::test]
async fn consumed_quantities_are_conserved() {
    let app = spawn_app().await;
    let lots = vec![
        app.receive_lot(40).await,
        app.receive_lot(25).await,
        app.receive_lot(60).await,
    ];

    let mut consumed = Decimal::ZERO;
    for request in &[17i64, 33, 8, 50] {
        let outcome = app
            .manager
            .consume(app.article_id, qty(*request), None, None, "tester", None)
            .await
            .unwrap();
        consumed += outcome.assigned_quantity();
    }

    let mut initial = Decimal::ZERO;
    let mut current = Decimal::ZERO;
    for lot in &lots {
        let lot = app.manager.lot(lot.id).await.unwrap();
        initial += lot.initial_quantity;
        current += lot.current_quantity;
    }
    assert_eq!(initial - current, consumed);
}

#[tokio::test]
async fn assignments_are_ordered_by_entry_date() {
    let app = spawn_app().await;
    for quantity in &[10i64, 20, 30] {
        app.receive_lot(*quantity).await;
    }

    let outcome = app
        .manager
        .consume(app.article_id, qty(45), None, None, "tester", None)
        .await
        .unwrap();

    assert_eq!(outcome.assignments.len(), 3);
    let entry_dates: Vec<_> = outcome
        .assignments
        .iter()
        .map(|assignment| assignment.lot.entry_date)
        .collect();
    let mut sorted = entry_dates.clone();
    sorted.sort();
    assert_eq!(entry_dates, sorted);
}

#[tokio::test]
async fn consumption_does_not_touch_other_orders_reservations() {
    let app = spawn_app().await;
    let lot = app.receive_lot(100).await;
    app.manager
        .reserve(app.article_id, qty(40), Uuid::new_v4(), None, "tester", None)
        .await
        .unwrap();

    let outcome = app
        .manager
        .consume(app.article_id, qty(80), None, None, "tester", None)
        .await
        .unwrap();

    assert_eq!(outcome.assignments[0].quantity, qty(60));
    assert_eq!(outcome.shortage, qty(20));
    let lot = app.manager.lot(lot.id).await.unwrap();
    assert_eq!(lot.current_quantity, qty(40));
    assert_eq!(lot.reserved_quantity, qty(40));
}

#[tokio::test]
async fn consumption_drains_its_own_reservation_first() {
    let app = spawn_app().await;
    let lot = app.receive_lot(100).await;
    let work_order = Uuid::new_v4();
    app.manager
        .reserve(app.article_id, qty(40), work_order, None, "tester", None)
        .await
        .unwrap();

    let outcome = app
        .manager
        .consume(app.article_id, qty(50), Some(work_order), None, "tester", None)
        .await
        .unwrap();

    assert_eq!(outcome.assignments[0].quantity, qty(50));
    assert_eq!(outcome.shortage, Decimal::ZERO);
    let lot = app.manager.lot(lot.id).await.unwrap();
    assert_eq!(lot.current_quantity, qty(50));
    assert_eq!(lot.reserved_quantity, Decimal::ZERO);

    // The hold was fully drained, so a release finds nothing outstanding.
    let released = app.manager.release(work_order, "tester", None).await.unwrap();
    assert!(released.is_empty());

    let kinds: Vec<MovementKind> = app
        .manager
        .movement_history(lot.id)
        .await
        .unwrap()
        .into_iter()
        .map(|movement| movement.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            MovementKind::Reservation,
            MovementKind::Consumption,
            MovementKind::Release,
        ]
    );
}

#[tokio::test]
async fn inactive_lots_are_never_drawn() {
    let app = spawn_app().await;
    let mut dormant = Lot::new(new_lot(app.article_id, 50), app.clock.now(), "tester");
    dormant.active = false;
    app.store.insert_lot(&dormant).await.unwrap();
    let open = app.receive_lot(20).await;

    let outcome = app
        .manager
        .consume(app.article_id, qty(30), None, None, "tester", None)
        .await
        .unwrap();

    assert_eq!(outcome.assignments.len(), 1);
    assert_eq!(outcome.assignments[0].lot.id, open.id);
    assert_eq!(outcome.shortage, qty(10));
}
