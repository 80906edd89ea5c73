mod common;

use assert_matches::assert_matches;
use chrono::NaiveDate;
use finca_api::{
    errors::ServiceError,
    services::purchases::{NewPurchase, NewPurchaseLine},
};
use rust_decimal_macros::dec;
use uuid::Uuid;

use common::{purchase_service, seed_supplier, seed_supply, setup_db, stock_service};

fn purchase_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 9).unwrap()
}

#[tokio::test]
async fn recording_a_purchase_credits_stock_and_derives_the_total() {
    let db = setup_db().await;
    let supplier = seed_supplier(&db, "Agroinsumos SA").await;
    let feed = seed_supply(&db, "feed", dec!(0)).await;
    let meds = seed_supply(&db, "meds", dec!(0)).await;
    let service = purchase_service(db.clone());

    let details = service
        .record_purchase(NewPurchase {
            supplier_id: supplier,
            purchase_date: purchase_date(),
            notes: Some("monthly restock".to_string()),
            lines: vec![
                NewPurchaseLine {
                    supply_item_id: feed,
                    unit_price: dec!(100),
                    quantity: dec!(5),
                },
                NewPurchaseLine {
                    supply_item_id: meds,
                    unit_price: dec!(50),
                    quantity: dec!(3),
                },
            ],
        })
        .await
        .unwrap();

    assert_eq!(details.purchase.document_number, "COMPRA-0001");
    assert_eq!(details.lines.len(), 2);
    assert_eq!(details.total, dec!(650));

    let stock = stock_service();
    assert_eq!(stock.current(&*db, feed).await.unwrap(), dec!(5));
    assert_eq!(stock.current(&*db, meds).await.unwrap(), dec!(3));
}

#[tokio::test]
async fn invalid_lines_are_reported_together_and_nothing_is_written() {
    let db = setup_db().await;
    let supplier = seed_supplier(&db, "Agroinsumos SA").await;
    let feed = seed_supply(&db, "feed", dec!(0)).await;
    let service = purchase_service(db.clone());

    let err = service
        .record_purchase(NewPurchase {
            supplier_id: supplier,
            purchase_date: purchase_date(),
            notes: None,
            lines: vec![
                NewPurchaseLine {
                    supply_item_id: feed,
                    unit_price: dec!(0),
                    quantity: dec!(5),
                },
                NewPurchaseLine {
                    supply_item_id: Uuid::new_v4(),
                    unit_price: dec!(10),
                    quantity: dec!(-1),
                },
            ],
        })
        .await
        .unwrap_err();

    let message = assert_matches!(err, ServiceError::ValidationError(m) => m);
    assert!(message.contains("line 1"), "got: {}", message);
    assert!(message.contains("line 2"), "got: {}", message);

    let stock = stock_service();
    assert_eq!(stock.current(&*db, feed).await.unwrap(), dec!(0));
}

#[tokio::test]
async fn empty_line_list_is_a_validation_error() {
    let db = setup_db().await;
    let supplier = seed_supplier(&db, "Agroinsumos SA").await;
    let service = purchase_service(db.clone());

    let err = service
        .record_purchase(NewPurchase {
            supplier_id: supplier,
            purchase_date: purchase_date(),
            notes: None,
            lines: vec![],
        })
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
}

#[tokio::test]
async fn duplicate_supply_in_one_request_is_a_conflict() {
    let db = setup_db().await;
    let supplier = seed_supplier(&db, "Agroinsumos SA").await;
    let feed = seed_supply(&db, "feed", dec!(0)).await;
    let service = purchase_service(db.clone());

    let err = service
        .record_purchase(NewPurchase {
            supplier_id: supplier,
            purchase_date: purchase_date(),
            notes: None,
            lines: vec![
                NewPurchaseLine {
                    supply_item_id: feed,
                    unit_price: dec!(100),
                    quantity: dec!(5),
                },
                NewPurchaseLine {
                    supply_item_id: feed,
                    unit_price: dec!(90),
                    quantity: dec!(2),
                },
            ],
        })
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Conflict(_));
}

#[tokio::test]
async fn unknown_supplier_or_supply_is_not_found() {
    let db = setup_db().await;
    let supplier = seed_supplier(&db, "Agroinsumos SA").await;
    let feed = seed_supply(&db, "feed", dec!(0)).await;
    let service = purchase_service(db.clone());

    let err = service
        .record_purchase(NewPurchase {
            supplier_id: Uuid::new_v4(),
            purchase_date: purchase_date(),
            notes: None,
            lines: vec![NewPurchaseLine {
                supply_item_id: feed,
                unit_price: dec!(100),
                quantity: dec!(5),
            }],
        })
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));

    let err = service
        .record_purchase(NewPurchase {
            supplier_id: supplier,
            purchase_date: purchase_date(),
            notes: None,
            lines: vec![NewPurchaseLine {
                supply_item_id: Uuid::new_v4(),
                unit_price: dec!(100),
                quantity: dec!(5),
            }],
        })
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));

    let stock = stock_service();
    assert_eq!(stock.current(&*db, feed).await.unwrap(), dec!(0));
}

#[tokio::test]
async fn reversal_restores_stock_exactly_and_hides_the_purchase() {
    let db = setup_db().await;
    let supplier = seed_supplier(&db, "Agroinsumos SA").await;
    let feed = seed_supply(&db, "feed", dec!(7)).await;
    let service = purchase_service(db.clone());

    let details = service
        .record_purchase(NewPurchase {
            supplier_id: supplier,
            purchase_date: purchase_date(),
            notes: None,
            lines: vec![NewPurchaseLine {
                supply_item_id: feed,
                unit_price: dec!(12.50),
                quantity: dec!(40),
            }],
        })
        .await
        .unwrap();

    let stock = stock_service();
    assert_eq!(stock.current(&*db, feed).await.unwrap(), dec!(47));

    service.reverse_purchase(details.purchase.id).await.unwrap();
    assert_eq!(stock.current(&*db, feed).await.unwrap(), dec!(7));

    let err = service.get_purchase(details.purchase.id).await.unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn second_reversal_is_not_found_and_stock_is_unchanged() {
    let db = setup_db().await;
    let supplier = seed_supplier(&db, "Agroinsumos SA").await;
    let feed = seed_supply(&db, "feed", dec!(0)).await;
    let service = purchase_service(db.clone());

    let details = service
        .record_purchase(NewPurchase {
            supplier_id: supplier,
            purchase_date: purchase_date(),
            notes: None,
            lines: vec![NewPurchaseLine {
                supply_item_id: feed,
                unit_price: dec!(10),
                quantity: dec!(30),
            }],
        })
        .await
        .unwrap();

    service.reverse_purchase(details.purchase.id).await.unwrap();
    let err = service
        .reverse_purchase(details.purchase.id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));

    let stock = stock_service();
    assert_eq!(stock.current(&*db, feed).await.unwrap(), dec!(0));
}

#[tokio::test]
async fn reversal_may_cross_the_floor_but_never_zero() {
    let db = setup_db().await;
    let supplier = seed_supplier(&db, "Agroinsumos SA").await;
    let feed = seed_supply(&db, "feed", dec!(2)).await;
    let service = purchase_service(db.clone());
    let stock = stock_service();

    let details = service
        .record_purchase(NewPurchase {
            supplier_id: supplier,
            purchase_date: purchase_date(),
            notes: None,
            lines: vec![NewPurchaseLine {
                supply_item_id: feed,
                unit_price: dec!(10),
                quantity: dec!(9),
            }],
        })
        .await
        .unwrap();
    assert_eq!(stock.current(&*db, feed).await.unwrap(), dec!(11));

    // 11 - 9 = 2, below the floor of 10 but above zero: allowed.
    service.reverse_purchase(details.purchase.id).await.unwrap();
    assert_eq!(stock.current(&*db, feed).await.unwrap(), dec!(2));
}

#[tokio::test]
async fn document_numbers_count_only_active_purchases() {
    let db = setup_db().await;
    let supplier = seed_supplier(&db, "Agroinsumos SA").await;
    let feed = seed_supply(&db, "feed", dec!(0)).await;
    let service = purchase_service(db.clone());

    let mut ids = Vec::new();
    for _ in 0..6 {
        let details = service
            .record_purchase(NewPurchase {
                supplier_id: supplier,
                purchase_date: purchase_date(),
                notes: None,
                lines: vec![NewPurchaseLine {
                    supply_item_id: feed,
                    unit_price: dec!(1),
                    quantity: dec!(1),
                }],
            })
            .await
            .unwrap();
        ids.push(details.purchase.id);
    }

    // Six existing purchases: the seventh is COMPRA-0007.
    let seventh = service
        .record_purchase(NewPurchase {
            supplier_id: supplier,
            purchase_date: purchase_date(),
            notes: None,
            lines: vec![NewPurchaseLine {
                supply_item_id: feed,
                unit_price: dec!(1),
                quantity: dec!(1),
            }],
        })
        .await
        .unwrap();
    assert_eq!(seventh.purchase.document_number, "COMPRA-0007");

    // Reversing one shrinks the active count, so the next number repeats 0007.
    // No constraint on document_number exists, so the recycled number inserts
    // cleanly. Reverse the seventh itself so the next draw is unambiguous.
    service.reverse_purchase(seventh.purchase.id).await.unwrap();
    let next = service
        .record_purchase(NewPurchase {
            supplier_id: supplier,
            purchase_date: purchase_date(),
            notes: None,
            lines: vec![NewPurchaseLine {
                supply_item_id: feed,
                unit_price: dec!(1),
                quantity: dec!(1),
            }],
        })
        .await
        .unwrap();
    assert_eq!(next.purchase.document_number, "COMPRA-0007");
}

#[tokio::test]
async fn listing_excludes_reversed_purchases() {
    let db = setup_db().await;
    let supplier = seed_supplier(&db, "Agroinsumos SA").await;
    let feed = seed_supply(&db, "feed", dec!(0)).await;
    let service = purchase_service(db.clone());

    let kept = service
        .record_purchase(NewPurchase {
            supplier_id: supplier,
            purchase_date: purchase_date(),
            notes: None,
            lines: vec![NewPurchaseLine {
                supply_item_id: feed,
                unit_price: dec!(2),
                quantity: dec!(4),
            }],
        })
        .await
        .unwrap();
    let reversed = service
        .record_purchase(NewPurchase {
            supplier_id: supplier,
            purchase_date: purchase_date(),
            notes: None,
            lines: vec![NewPurchaseLine {
                supply_item_id: feed,
                unit_price: dec!(3),
                quantity: dec!(5),
            }],
        })
        .await
        .unwrap();
    service.reverse_purchase(reversed.purchase.id).await.unwrap();

    let (listed, total) = service.list_purchases(1, 20).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].purchase.id, kept.purchase.id);
    assert_eq!(listed[0].total, dec!(8));
}
