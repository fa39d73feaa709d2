use serde_json::{Value, json};
use uuid::Uuid;

use engine::{Category, EngineError, ErrorKind, TransactionDraft, TransactionPatch};

mod common;

use common::{RecordingGateway, StaleGateway, alice, bob, engine_in_memory, engine_with_db};

#[tokio::test]
async fn create_generates_id_and_timestamps() {
    let (engine, _db) = engine_with_db().await;
    let user = alice(&engine, 100.0).await;

    let tx = engine
        .create_transaction(&TransactionDraft::new(user.id, "Coffee", 3.5, "FOOD"))
        .await
        .unwrap();

    assert_eq!(tx.user_id, user.id);
    assert_eq!(tx.description, "Coffee");
    assert_eq!(tx.amount, 3.5);
    assert_eq!(tx.category, Category::Food);
    let created_time = tx.created_time.unwrap();
    assert_eq!(tx.created_date, Some(created_time.date_naive()));
    assert_eq!(engine.transaction(tx.id).await.unwrap(), tx);
}

#[tokio::test]
async fn description_and_category_are_trimmed() {
    let engine = engine_in_memory();
    let user = alice(&engine, 100.0).await;

    let tx = engine
        .create_transaction(&TransactionDraft::new(user.id, "  Bus ticket ", 2.0, " transportation "))
        .await
        .unwrap();

    assert_eq!(tx.description, "Bus ticket");
    assert_eq!(tx.category, Category::Transportation);
}

#[tokio::test]
async fn string_amount_never_reaches_storage() {
    let (engine, gateway) = RecordingGateway::engine();
    let user = alice(&engine, 100.0).await;
    let draft = TransactionDraft {
        amount: Some(Value::String("12".to_string())),
        ..TransactionDraft::new(user.id, "Lunch", 0.0, "FOOD")
    };

    let err = engine.create_transaction(&draft).await.unwrap_err();

    assert_eq!(err, EngineError::InvalidAmountType);
    assert_eq!(gateway.inserts(), 0);
}

#[tokio::test]
async fn non_positive_amounts_never_reach_storage() {
    let (engine, gateway) = RecordingGateway::engine();
    let user = alice(&engine, 100.0).await;

    for amount in [0.0, -5.0] {
        let err = engine
            .create_transaction(&TransactionDraft::new(user.id, "Refund", amount, "OTHER"))
            .await
            .unwrap_err();
        assert_eq!(err, EngineError::AmountNotPositive);
    }
    assert_eq!(gateway.inserts(), 0);
}

#[tokio::test]
async fn unknown_category_never_reaches_storage() {
    let (engine, gateway) = RecordingGateway::engine();
    let user = alice(&engine, 100.0).await;

    let err = engine
        .create_transaction(&TransactionDraft::new(user.id, "Dog food", 9.0, "PETS"))
        .await
        .unwrap_err();

    assert_eq!(err, EngineError::InvalidCategory("PETS".to_string()));
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(gateway.inserts(), 0);
}

#[tokio::test]
async fn every_category_is_accepted_by_storage() {
    let (sql, _db) = engine_with_db().await;
    let (recorded, gateway) = RecordingGateway::engine();

    for engine in [sql, recorded] {
        let user = alice(&engine, 1000.0).await;
        for category in Category::ALL {
            let tx = engine
                .create_transaction(&TransactionDraft::new(user.id, "Item", 1.0, category.as_str()))
                .await
                .unwrap();
            assert_eq!(tx.category, category);
        }
        assert_eq!(
            engine.user_transactions(user.id).await.unwrap().len(),
            Category::ALL.len()
        );
    }
    assert_eq!(gateway.inserts(), Category::ALL.len());
}

#[tokio::test]
async fn unechoed_insert_returns_the_validated_fields() {
    let engine = StaleGateway::engine();
    let user = alice(&engine, 100.0).await;

    let tx = engine
        .create_transaction(&TransactionDraft::new(user.id, " Snacks ", 4.5, "food"))
        .await
        .unwrap();

    assert!(!tx.id.is_nil());
    assert_eq!(tx.user_id, user.id);
    assert_eq!(tx.description, "Snacks");
    assert_eq!(tx.amount, 4.5);
    assert_eq!(tx.category, Category::Food);
    assert!(tx.created_time.is_some());
    assert!(tx.created_date.is_some());
    assert_eq!(engine.transaction(tx.id).await.unwrap(), tx);
}

#[tokio::test]
async fn update_touching_no_rows_fails() {
    let engine = StaleGateway::engine();
    let user = alice(&engine, 100.0).await;
    let tx = engine
        .create_transaction(&TransactionDraft::new(user.id, "Snacks", 4.5, "FOOD"))
        .await
        .unwrap();

    let err = engine
        .update_transaction(tx.id, &TransactionPatch::default().amount(5))
        .await
        .unwrap_err();

    assert_eq!(err, EngineError::UpdateFailed);
    assert_eq!(err.kind(), ErrorKind::System);
}

#[tokio::test]
async fn missing_fields_are_reported_in_order() {
    let engine = engine_in_memory();

    let err = engine
        .create_transaction(&TransactionDraft::default())
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::MissingUserId);

    let draft = TransactionDraft {
        user_id: Some(Uuid::new_v4()),
        description: Some("   ".to_string()),
        ..TransactionDraft::default()
    };
    let err = engine.create_transaction(&draft).await.unwrap_err();
    assert_eq!(err, EngineError::BlankDescription);

    let draft: TransactionDraft = serde_json::from_value(json!({
        "userId": Uuid::new_v4(),
        "description": "Taxi",
        "amount": 20,
    }))
    .unwrap();
    let err = engine.create_transaction(&draft).await.unwrap_err();
    assert_eq!(err, EngineError::MissingCategory);
}

#[tokio::test]
async fn unknown_user_is_rejected_by_both_backends() {
    let (sql, _db) = engine_with_db().await;
    let memory = engine_in_memory();

    for engine in [sql, memory] {
        let err = engine
            .create_transaction(&TransactionDraft::new(Uuid::new_v4(), "Ghost", 1.0, "OTHER"))
            .await
            .unwrap_err();
        assert_eq!(err, EngineError::InvalidUserId);
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }
}

#[tokio::test]
async fn patch_changes_only_supplied_fields() {
    let (engine, _db) = engine_with_db().await;
    let user = alice(&engine, 100.0).await;
    let tx = engine
        .create_transaction(&TransactionDraft::new(user.id, "Cinema", 12.0, "ENTERTAINMENT"))
        .await
        .unwrap();

    let updated = engine
        .update_transaction(tx.id, &TransactionPatch::default().amount(7))
        .await
        .unwrap();

    assert_eq!(updated.amount, 7.0);
    assert_eq!(updated.description, "Cinema");
    assert_eq!(updated.category, Category::Entertainment);
    assert_eq!(updated.user_id, user.id);
    assert_eq!(updated.created_time, tx.created_time);
}

#[tokio::test]
async fn patch_validates_each_supplied_field() {
    let engine = engine_in_memory();
    let user = alice(&engine, 100.0).await;
    let tx = engine
        .create_transaction(&TransactionDraft::new(user.id, "Books", 30.0, "EDUCATION"))
        .await
        .unwrap();

    let err = engine
        .update_transaction(tx.id, &TransactionPatch::default())
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::NoValidFields);

    let err = engine
        .update_transaction(tx.id, &TransactionPatch::default().amount(-1))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::AmountNotPositive);

    let err = engine
        .update_transaction(tx.id, &TransactionPatch::default().category("GIFTS"))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::InvalidCategory("GIFTS".to_string()));

    let stored = engine.transaction(tx.id).await.unwrap();
    assert_eq!(stored, tx);
}

#[tokio::test]
async fn null_patch_fields_are_rejected_not_ignored() {
    let (engine, _db) = engine_with_db().await;
    let user = alice(&engine, 100.0).await;
    let tx = engine
        .create_transaction(&TransactionDraft::new(user.id, "Cinema", 12.0, "ENTERTAINMENT"))
        .await
        .unwrap();

    let patch: TransactionPatch = serde_json::from_value(json!({"amount": null})).unwrap();
    let err = engine.update_transaction(tx.id, &patch).await.unwrap_err();
    assert_eq!(err, EngineError::InvalidAmountType);

    let patch: TransactionPatch =
        serde_json::from_value(json!({"amount": 7, "description": null})).unwrap();
    let err = engine.update_transaction(tx.id, &patch).await.unwrap_err();
    assert_eq!(err, EngineError::MissingDescription);

    let patch: TransactionPatch = serde_json::from_value(json!({"category": null})).unwrap();
    let err = engine.update_transaction(tx.id, &patch).await.unwrap_err();
    assert_eq!(err, EngineError::MissingCategory);

    assert_eq!(engine.transaction(tx.id).await.unwrap(), tx);
}

#[tokio::test]
async fn patching_a_missing_transaction_is_not_found() {
    let engine = engine_in_memory();

    let err = engine
        .update_transaction(Uuid::new_v4(), &TransactionPatch::default())
        .await
        .unwrap_err();

    assert_eq!(err, EngineError::TransactionNotFound);
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn delete_reports_whether_a_row_went_away() {
    let (engine, _db) = engine_with_db().await;
    let user = alice(&engine, 100.0).await;
    let tx = engine
        .create_transaction(&TransactionDraft::new(user.id, "Pharmacy", 8.0, "HEALTHCARE"))
        .await
        .unwrap();

    assert!(engine.delete_transaction(tx.id).await.unwrap());
    assert!(!engine.delete_transaction(tx.id).await.unwrap());
    assert_eq!(
        engine.transaction(tx.id).await.unwrap_err(),
        EngineError::TransactionNotFound
    );
}

#[tokio::test]
async fn listings_are_newest_first() {
    let engine = engine_in_memory();
    let user = alice(&engine, 100.0).await;
    let mut created = Vec::new();
    for description in ["first", "second", "third"] {
        let tx = engine
            .create_transaction(&TransactionDraft::new(user.id, description, 1.0, "OTHER"))
            .await
            .unwrap();
        created.push(tx.id);
    }

    let listed: Vec<Uuid> = engine
        .user_transactions(user.id)
        .await
        .unwrap()
        .into_iter()
        .map(|tx| tx.id)
        .collect();

    created.reverse();
    assert_eq!(listed, created);
}

#[tokio::test]
async fn transactions_are_scoped_to_their_owner() {
    let (engine, _db) = engine_with_db().await;
    let alice = alice(&engine, 100.0).await;
    let bob = bob(&engine, 100.0).await;
    let tx = engine
        .create_transaction(&TransactionDraft::new(alice.id, "Flight", 250.0, "TRAVEL"))
        .await
        .unwrap();

    assert_eq!(engine.user_transaction(alice.id, tx.id).await.unwrap(), tx);
    assert_eq!(
        engine.user_transaction(bob.id, tx.id).await.unwrap_err(),
        EngineError::TransactionNotFound
    );
    assert!(engine.user_transactions(bob.id).await.unwrap().is_empty());
    assert_eq!(
        engine.user_transactions(Uuid::new_v4()).await.unwrap_err(),
        EngineError::UserNotFound
    );
}
