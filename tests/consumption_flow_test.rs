mod common;

use assert_matches::assert_matches;
use chrono::NaiveDate;
use finca_api::{
    errors::ServiceError,
    services::consumption::{EventStatus, EventType, NewConsumption, NewConsumptionLine},
};
use rust_decimal_macros::dec;
use uuid::Uuid;

use common::{consumption_service, seed_animal, seed_supply, setup_db, stock_service};

fn event_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 9).unwrap()
}

fn health_event(animal: Uuid, lines: Vec<NewConsumptionLine>) -> NewConsumption {
    NewConsumption {
        event_type: EventType::Health,
        animal_id: animal,
        event_date: event_date(),
        notes: None,
        lines,
    }
}

#[tokio::test]
async fn recording_an_event_debits_stock_and_starts_pending() {
    let db = setup_db().await;
    let animal = seed_animal(&db, "A-001").await;
    let vaccine = seed_supply(&db, "vaccine", dec!(20)).await;
    let service = consumption_service(db.clone());

    let details = service
        .record_consumption(health_event(
            animal,
            vec![NewConsumptionLine {
                supply_item_id: vaccine,
                quantity: 8,
            }],
        ))
        .await
        .unwrap();

    assert_eq!(details.event.document_number, "SANIDAD-0001");
    assert_eq!(details.event.status, "pending");
    assert_eq!(details.lines.len(), 1);

    let stock = stock_service();
    assert_eq!(stock.current(&*db, vaccine).await.unwrap(), dec!(12));
}

#[tokio::test]
async fn feeding_events_draw_from_their_own_sequence() {
    let db = setup_db().await;
    let animal = seed_animal(&db, "A-001").await;
    let hay = seed_supply(&db, "hay", dec!(100)).await;
    let vaccine = seed_supply(&db, "vaccine", dec!(100)).await;
    let service = consumption_service(db.clone());

    let health = service
        .record_consumption(health_event(
            animal,
            vec![NewConsumptionLine {
                supply_item_id: vaccine,
                quantity: 1,
            }],
        ))
        .await
        .unwrap();

    let feeding = service
        .record_consumption(NewConsumption {
            event_type: EventType::Feeding,
            animal_id: animal,
            event_date: event_date(),
            notes: None,
            lines: vec![NewConsumptionLine {
                supply_item_id: hay,
                quantity: 5,
            }],
        })
        .await
        .unwrap();

    // One of each kind: both are the first of their own sequence.
    assert_eq!(health.event.document_number, "SANIDAD-0001");
    assert_eq!(feeding.event.document_number, "ALIMENTO-0001");
}

#[tokio::test]
async fn floor_breach_rejects_the_event_and_leaves_stock_alone() {
    // 12 on hand, floor 10: consuming 5 would leave 7.
    let db = setup_db().await;
    let animal = seed_animal(&db, "A-001").await;
    let vaccine = seed_supply(&db, "vaccine", dec!(12)).await;
    let service = consumption_service(db.clone());

    let err = service
        .record_consumption(health_event(
            animal,
            vec![NewConsumptionLine {
                supply_item_id: vaccine,
                quantity: 5,
            }],
        ))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InsufficientStock(_));

    let stock = stock_service();
    assert_eq!(stock.current(&*db, vaccine).await.unwrap(), dec!(12));

    // No half-written event either.
    let (events, total) = service.list_events(None, 1, 20).await.unwrap();
    assert_eq!(total, 0);
    assert!(events.is_empty());
}

#[tokio::test]
async fn one_short_line_aborts_the_whole_event() {
    let db = setup_db().await;
    let animal = seed_animal(&db, "A-001").await;
    let plentiful = seed_supply(&db, "plentiful", dec!(100)).await;
    let scarce = seed_supply(&db, "scarce", dec!(10)).await;
    let service = consumption_service(db.clone());

    let err = service
        .record_consumption(health_event(
            animal,
            vec![
                NewConsumptionLine {
                    supply_item_id: plentiful,
                    quantity: 50,
                },
                NewConsumptionLine {
                    supply_item_id: scarce,
                    quantity: 1,
                },
            ],
        ))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InsufficientStock(_));

    let stock = stock_service();
    assert_eq!(stock.current(&*db, plentiful).await.unwrap(), dec!(100));
    assert_eq!(stock.current(&*db, scarce).await.unwrap(), dec!(10));
}

#[tokio::test]
async fn reversal_credits_stock_back_and_hides_the_event() {
    let db = setup_db().await;
    let animal = seed_animal(&db, "A-001").await;
    let vaccine = seed_supply(&db, "vaccine", dec!(30)).await;
    let service = consumption_service(db.clone());
    let stock = stock_service();

    let details = service
        .record_consumption(health_event(
            animal,
            vec![NewConsumptionLine {
                supply_item_id: vaccine,
                quantity: 15,
            }],
        ))
        .await
        .unwrap();
    assert_eq!(stock.current(&*db, vaccine).await.unwrap(), dec!(15));

    service.reverse_consumption(details.event.id).await.unwrap();
    assert_eq!(stock.current(&*db, vaccine).await.unwrap(), dec!(30));

    let err = service.get_event(details.event.id).await.unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));

    // Second reversal: nothing to undo, stock untouched.
    let err = service
        .reverse_consumption(details.event.id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
    assert_eq!(stock.current(&*db, vaccine).await.unwrap(), dec!(30));
}

#[tokio::test]
async fn status_change_never_moves_stock() {
    let db = setup_db().await;
    let animal = seed_animal(&db, "A-001").await;
    let vaccine = seed_supply(&db, "vaccine", dec!(25)).await;
    let service = consumption_service(db.clone());
    let stock = stock_service();

    let details = service
        .record_consumption(health_event(
            animal,
            vec![NewConsumptionLine {
                supply_item_id: vaccine,
                quantity: 10,
            }],
        ))
        .await
        .unwrap();
    assert_eq!(stock.current(&*db, vaccine).await.unwrap(), dec!(15));

    let updated = service
        .update_status(details.event.id, EventStatus::Completed)
        .await
        .unwrap();
    assert_eq!(updated.status, "completed");
    assert_eq!(stock.current(&*db, vaccine).await.unwrap(), dec!(15));

    // And back again.
    let updated = service
        .update_status(details.event.id, EventStatus::Pending)
        .await
        .unwrap();
    assert_eq!(updated.status, "pending");
    assert_eq!(stock.current(&*db, vaccine).await.unwrap(), dec!(15));
}

#[tokio::test]
async fn non_positive_quantities_and_duplicates_are_rejected() {
    let db = setup_db().await;
    let animal = seed_animal(&db, "A-001").await;
    let vaccine = seed_supply(&db, "vaccine", dec!(50)).await;
    let service = consumption_service(db.clone());

    let err = service
        .record_consumption(health_event(
            animal,
            vec![NewConsumptionLine {
                supply_item_id: vaccine,
                quantity: 0,
            }],
        ))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));

    let err = service
        .record_consumption(health_event(
            animal,
            vec![
                NewConsumptionLine {
                    supply_item_id: vaccine,
                    quantity: 1,
                },
                NewConsumptionLine {
                    supply_item_id: vaccine,
                    quantity: 2,
                },
            ],
        ))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Conflict(_));
}

#[tokio::test]
async fn unknown_animal_is_not_found() {
    let db = setup_db().await;
    let vaccine = seed_supply(&db, "vaccine", dec!(50)).await;
    let service = consumption_service(db.clone());

    let err = service
        .record_consumption(health_event(
            Uuid::new_v4(),
            vec![NewConsumptionLine {
                supply_item_id: vaccine,
                quantity: 1,
            }],
        ))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn type_filter_narrows_the_listing() {
    let db = setup_db().await;
    let animal = seed_animal(&db, "A-001").await;
    let hay = seed_supply(&db, "hay", dec!(100)).await;
    let service = consumption_service(db.clone());

    for _ in 0..2 {
        service
            .record_consumption(NewConsumption {
                event_type: EventType::Feeding,
                animal_id: animal,
                event_date: event_date(),
                notes: None,
                lines: vec![NewConsumptionLine {
                    supply_item_id: hay,
                    quantity: 5,
                }],
            })
            .await
            .unwrap();
    }
    service
        .record_consumption(health_event(
            animal,
            vec![NewConsumptionLine {
                supply_item_id: hay,
                quantity: 1,
            }],
        ))
        .await
        .unwrap();

    let (_, all) = service.list_events(None, 1, 20).await.unwrap();
    let (feedings, feeding_total) = service
        .list_events(Some(EventType::Feeding), 1, 20)
        .await
        .unwrap();

    assert_eq!(all, 3);
    assert_eq!(feeding_total, 2);
    assert!(feedings
        .iter()
        .all(|details| details.event.event_type == "feeding"));
}
