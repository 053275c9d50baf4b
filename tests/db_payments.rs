//! Persistence tests for the payments table: idempotency guard,
//! one-way status transitions, pagination, and statistics.

mod common;

use common::*;

// ============ Pending Insert ============

#[test]
fn test_insert_pending_payment_sets_fields() {
    let conn = setup_test_db();

    let payment = create_test_payment(&conn, "TXN-1", 42, 150.0);

    assert_eq!(payment.transaction_id, "TXN-1");
    assert_eq!(payment.client_id, 42);
    assert_eq!(payment.amount, 150.0);
    assert_eq!(payment.currency_code, "KES");
    assert_eq!(payment.status, PaymentStatus::Pending);
    assert!(payment.response_payload.is_none());
    assert!(payment.error_message.is_none());
    assert!(payment.created_at > 0);

    let stored = queries::get_payment_by_transaction_id(&conn, "TXN-1")
        .expect("query failed")
        .expect("payment should exist");
    assert_eq!(stored.id, payment.id);
    assert_eq!(stored.status, PaymentStatus::Pending);
}

#[test]
fn test_duplicate_transaction_id_rejected() {
    let conn = setup_test_db();
    create_test_payment(&conn, "TXN-1", 1, 100.0);

    let err = queries::insert_pending_payment(
        &conn,
        &CreatePayment {
            transaction_id: "TXN-1".to_string(),
            client_id: 2,
            amount: 200.0,
            currency_code: "KES".to_string(),
            payment_type: None,
            payment_method: None,
        },
    )
    .expect_err("duplicate insert should fail");

    assert!(
        err.is_unique_violation(),
        "duplicate transaction id should be a unique violation, got: {}",
        err
    );

    // Original record untouched
    let stored = queries::get_payment_by_transaction_id(&conn, "TXN-1")
        .unwrap()
        .unwrap();
    assert_eq!(stored.client_id, 1);
    assert_eq!(stored.amount, 100.0);
}

#[test]
fn test_get_payment_nonexistent() {
    let conn = setup_test_db();
    let result = queries::get_payment_by_transaction_id(&conn, "TXN-missing")
        .expect("query should not error");
    assert!(result.is_none());
}

// ============ Status Transitions ============

#[test]
fn test_mark_success_stores_response() {
    let conn = setup_test_db();
    create_test_payment(&conn, "TXN-1", 1, 100.0);

    let updated = queries::mark_payment_success(&conn, "TXN-1", "{\"id\":\"uisp-1\"}")
        .expect("update should not error");
    assert!(updated, "pending payment should be finalized");

    let stored = queries::get_payment_by_transaction_id(&conn, "TXN-1")
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, PaymentStatus::Success);
    assert_eq!(stored.response_payload.as_deref(), Some("{\"id\":\"uisp-1\"}"));
    assert!(stored.error_message.is_none());
}

#[test]
fn test_mark_failed_stores_error() {
    let conn = setup_test_db();
    create_test_payment(&conn, "TXN-1", 1, 100.0);

    let updated = queries::mark_payment_failed(&conn, "TXN-1", "UISP rejected the payment")
        .expect("update should not error");
    assert!(updated);

    let stored = queries::get_payment_by_transaction_id(&conn, "TXN-1")
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, PaymentStatus::Failed);
    assert_eq!(
        stored.error_message.as_deref(),
        Some("UISP rejected the payment")
    );
}

#[test]
fn test_final_status_never_reverts() {
    let conn = setup_test_db();
    create_test_payment(&conn, "TXN-1", 1, 100.0);

    assert!(queries::mark_payment_success(&conn, "TXN-1", "{}").unwrap());

    // Neither finalizer touches a record that already reached a final state
    let changed = queries::mark_payment_failed(&conn, "TXN-1", "late error").unwrap();
    assert!(!changed, "success -> failed must not happen");
    let changed = queries::mark_payment_success(&conn, "TXN-1", "{\"again\":1}").unwrap();
    assert!(!changed, "success is finalized exactly once");

    let stored = queries::get_payment_by_transaction_id(&conn, "TXN-1")
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, PaymentStatus::Success);
    assert_eq!(stored.response_payload.as_deref(), Some("{}"));
    assert!(stored.error_message.is_none());
}

#[test]
fn test_mark_on_unknown_transaction_is_noop() {
    let conn = setup_test_db();
    assert!(!queries::mark_payment_success(&conn, "TXN-missing", "{}").unwrap());
    assert!(!queries::mark_payment_failed(&conn, "TXN-missing", "err").unwrap());
}

// ============ Listing and Pagination ============

#[test]
fn test_pagination_window_and_total() {
    let conn = setup_test_db();
    for i in 0..5 {
        create_test_payment(&conn, &format!("TXN-{}", i), 1, 10.0 * (i + 1) as f64);
    }

    let (page, total) =
        queries::list_payments_paginated(&conn, 2, 1).expect("query should not error");
    assert_eq!(page.len(), 2, "page should honor the limit");
    assert_eq!(total, 5, "total should count all rows");

    let (page, total) = queries::list_payments_paginated(&conn, 10, 0).unwrap();
    assert_eq!(page.len(), 5);
    assert_eq!(total, 5);

    let (page, _) = queries::list_payments_paginated(&conn, 10, 5).unwrap();
    assert!(page.is_empty(), "offset past the end yields an empty page");
}

#[test]
fn test_list_by_client_filters_other_clients() {
    let conn = setup_test_db();
    create_test_payment(&conn, "TXN-1", 1, 100.0);
    create_test_payment(&conn, "TXN-2", 1, 200.0);
    create_test_payment(&conn, "TXN-3", 2, 300.0);

    let payments = queries::list_payments_by_client(&conn, 1).unwrap();
    assert_eq!(payments.len(), 2);
    assert!(payments.iter().all(|p| p.client_id == 1));
}

// ============ Statistics ============

#[test]
fn test_payment_stats_aggregation() {
    let conn = setup_test_db();

    create_test_payment(&conn, "TXN-pending", 1, 10.0);

    create_test_payment(&conn, "TXN-ok-1", 1, 100.0);
    queries::mark_payment_success(&conn, "TXN-ok-1", "{}").unwrap();
    create_test_payment(&conn, "TXN-ok-2", 2, 50.0);
    queries::mark_payment_success(&conn, "TXN-ok-2", "{}").unwrap();

    create_test_payment(&conn, "TXN-bad", 3, 999.0);
    queries::mark_payment_failed(&conn, "TXN-bad", "refused").unwrap();

    let stats = queries::payment_stats(&conn).expect("stats should not error");
    assert_eq!(stats.total_payments, 4);
    assert_eq!(stats.pending_count, 1);
    assert_eq!(stats.success_count, 2);
    assert_eq!(stats.failed_count, 1);
    assert_eq!(stats.total_success_amount, 150.0);
}

#[test]
fn test_payment_stats_empty_db() {
    let conn = setup_test_db();
    let stats = queries::payment_stats(&conn).unwrap();
    assert_eq!(stats.total_payments, 0);
    assert_eq!(stats.total_success_amount, 0.0);
}
