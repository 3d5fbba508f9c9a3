//! Integration tests for `SqliteEventStore`.

use chrono::{Duration, TimeZone, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use hrbridge_core::error::BridgeError;
use hrbridge_core::event::{BridgeEvent, EventPayload, EventStatus, EventType, RiskLevel};
use hrbridge_core::store::{EventFilter, EventStore, StatusUpdate};
use hrbridge_store::SqliteEventStore;

fn fixed_now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, 20, 12, 0, 0).unwrap()
}

fn department_change_event(case_id: &str, minutes_ago: i64) -> BridgeEvent {
    BridgeEvent::admit(
        Uuid::new_v4(),
        case_id.to_owned(),
        "EMP001".to_owned(),
        EventPayload::DepartmentChange {
            old_department: "IT".into(),
            new_department: "Finance".into(),
            has_financial_access: false,
            has_admin_rights: true,
            access_to_sensitive_data: false,
        },
        fixed_now() - Duration::minutes(minutes_ago),
    )
}

fn offboarding_event(case_id: &str, minutes_ago: i64) -> BridgeEvent {
    BridgeEvent::admit(
        Uuid::new_v4(),
        case_id.to_owned(),
        "EMP002".to_owned(),
        EventPayload::EmployeeOffboarding {
            department: Some("Security".into()),
            last_working_day: Some("2026-09-30".into()),
        },
        fixed_now() - Duration::minutes(minutes_ago),
    )
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_create_then_get_round_trips_the_event(pool: SqlitePool) {
    let store = SqliteEventStore::new(pool);
    let event = department_change_event("HRSR-WORK-1", 0);

    store.create(&event).await.unwrap();
    let loaded = store.get(event.id).await.unwrap();

    assert_eq!(loaded.id, event.id);
    assert_eq!(loaded.case_id, "HRSR-WORK-1");
    assert_eq!(loaded.employee_id, "EMP001");
    assert_eq!(loaded.status, EventStatus::Received);
    assert_eq!(loaded.risk_level, None);
    assert_eq!(loaded.received_at, event.received_at);
    assert_eq!(loaded.processed_at, None);
    assert_eq!(loaded.error_detail, None);
    assert_eq!(loaded.payload, event.payload);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_get_unknown_id_returns_not_found(pool: SqlitePool) {
    let store = SqliteEventStore::new(pool);
    let id = Uuid::new_v4();

    match store.get(id).await {
        Err(BridgeError::EventNotFound(missing)) => assert_eq!(missing, id),
        other => panic!("expected EventNotFound, got {other:?}"),
    }
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_create_rejects_blank_required_fields(pool: SqlitePool) {
    let store = SqliteEventStore::new(pool);
    let mut event = department_change_event("HRSR-WORK-1", 0);
    event.employee_id = "   ".into();

    match store.create(&event).await {
        Err(BridgeError::Validation(msg)) => assert!(msg.contains("employeeId")),
        other => panic!("expected Validation, got {other:?}"),
    }

    // Nothing was persisted.
    assert!(matches!(
        store.get(event.id).await,
        Err(BridgeError::EventNotFound(_))
    ));
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_list_orders_by_received_at_descending(pool: SqlitePool) {
    let store = SqliteEventStore::new(pool);
    let oldest = department_change_event("HRSR-WORK-1", 30);
    let middle = department_change_event("HRSR-WORK-2", 20);
    let newest = department_change_event("HRSR-WORK-3", 10);
    for event in [&oldest, &middle, &newest] {
        store.create(event).await.unwrap();
    }

    let listed = store.list(&EventFilter::default()).await.unwrap();

    let ids: Vec<Uuid> = listed.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![newest.id, middle.id, oldest.id]);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_list_applies_filters(pool: SqlitePool) {
    let store = SqliteEventStore::new(pool);
    let change = department_change_event("HRSR-WORK-1", 10);
    let offboarding = offboarding_event("HRSR-WORK-2", 5);
    store.create(&change).await.unwrap();
    store.create(&offboarding).await.unwrap();

    let filter = EventFilter {
        event_type: Some(EventType::EmployeeOffboarding),
        ..EventFilter::default()
    };
    let listed = store.list(&filter).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, offboarding.id);

    let filter = EventFilter {
        case_id: Some("HRSR-WORK-1".into()),
        ..EventFilter::default()
    };
    let listed = store.list(&filter).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, change.id);

    // Time range: only the offboarding falls in the last 7 minutes.
    let filter = EventFilter {
        received_after: Some(fixed_now() - Duration::minutes(7)),
        ..EventFilter::default()
    };
    let listed = store.list(&filter).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, offboarding.id);

    let filter = EventFilter {
        status: Some(EventStatus::Completed),
        ..EventFilter::default()
    };
    assert!(store.list(&filter).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_list_pagination_is_stable_without_concurrent_writes(pool: SqlitePool) {
    let store = SqliteEventStore::new(pool);
    for i in 0..5 {
        store
            .create(&department_change_event(&format!("HRSR-WORK-{i}"), i))
            .await
            .unwrap();
    }

    let all = store.list(&EventFilter::default()).await.unwrap();
    assert_eq!(all.len(), 5);

    let mut paged = Vec::new();
    for offset in [0, 2, 4] {
        let filter = EventFilter {
            limit: 2,
            offset,
            ..EventFilter::default()
        };
        paged.extend(store.list(&filter).await.unwrap());
    }

    let all_ids: Vec<Uuid> = all.iter().map(|e| e.id).collect();
    let paged_ids: Vec<Uuid> = paged.iter().map(|e| e.id).collect();
    assert_eq!(paged_ids, all_ids);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_transition_walks_the_forward_graph(pool: SqlitePool) {
    let store = SqliteEventStore::new(pool);
    let event = department_change_event("HRSR-WORK-1", 0);
    store.create(&event).await.unwrap();

    store
        .transition(event.id, StatusUpdate::processing())
        .await
        .unwrap();
    assert_eq!(
        store.get(event.id).await.unwrap().status,
        EventStatus::Processing
    );

    let processed_at = fixed_now();
    store
        .transition(
            event.id,
            StatusUpdate::completed(RiskLevel::Medium, None, processed_at),
        )
        .await
        .unwrap();

    let loaded = store.get(event.id).await.unwrap();
    assert_eq!(loaded.status, EventStatus::Completed);
    assert_eq!(loaded.risk_level, Some(RiskLevel::Medium));
    assert_eq!(loaded.processed_at, Some(processed_at));
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_transition_rejects_skipping_processing(pool: SqlitePool) {
    let store = SqliteEventStore::new(pool);
    let event = department_change_event("HRSR-WORK-1", 0);
    store.create(&event).await.unwrap();

    let result = store
        .transition(
            event.id,
            StatusUpdate::completed(RiskLevel::Low, None, fixed_now()),
        )
        .await;

    match result {
        Err(BridgeError::InvalidTransition { id, from, to }) => {
            assert_eq!(id, event.id);
            assert_eq!(from, EventStatus::Received);
            assert_eq!(to, EventStatus::Completed);
        }
        other => panic!("expected InvalidTransition, got {other:?}"),
    }

    // The event is unchanged.
    assert_eq!(
        store.get(event.id).await.unwrap().status,
        EventStatus::Received
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_transition_unknown_id_returns_not_found(pool: SqlitePool) {
    let store = SqliteEventStore::new(pool);
    let id = Uuid::new_v4();

    match store.transition(id, StatusUpdate::processing()).await {
        Err(BridgeError::EventNotFound(missing)) => assert_eq!(missing, id),
        other => panic!("expected EventNotFound, got {other:?}"),
    }
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_failed_event_reenters_processing_and_outcome_is_cleared(pool: SqlitePool) {
    let store = SqliteEventStore::new(pool);
    let event = department_change_event("HRSR-WORK-1", 0);
    store.create(&event).await.unwrap();

    store
        .transition(event.id, StatusUpdate::processing())
        .await
        .unwrap();
    store
        .transition(
            event.id,
            StatusUpdate::failed(
                Some(RiskLevel::High),
                "case system unreachable".into(),
                fixed_now(),
            ),
        )
        .await
        .unwrap();

    let failed = store.get(event.id).await.unwrap();
    assert_eq!(failed.status, EventStatus::Failed);
    assert_eq!(failed.error_detail.as_deref(), Some("case system unreachable"));
    assert!(failed.processed_at.is_some());

    // Reprocess claim: back to processing, previous outcome cleared.
    store
        .transition(event.id, StatusUpdate::processing())
        .await
        .unwrap();
    let claimed = store.get(event.id).await.unwrap();
    assert_eq!(claimed.status, EventStatus::Processing);
    assert_eq!(claimed.risk_level, None);
    assert_eq!(claimed.error_detail, None);
    assert_eq!(claimed.processed_at, None);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_completed_event_cannot_be_claimed_again(pool: SqlitePool) {
    let store = SqliteEventStore::new(pool);
    let event = department_change_event("HRSR-WORK-1", 0);
    store.create(&event).await.unwrap();
    store
        .transition(event.id, StatusUpdate::processing())
        .await
        .unwrap();
    store
        .transition(
            event.id,
            StatusUpdate::completed(RiskLevel::Low, None, fixed_now()),
        )
        .await
        .unwrap();

    let result = store.transition(event.id, StatusUpdate::processing()).await;
    assert!(matches!(
        result,
        Err(BridgeError::InvalidTransition {
            from: EventStatus::Completed,
            ..
        })
    ));
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_metrics_counts_only_the_trailing_window(pool: SqlitePool) {
    let store = SqliteEventStore::new(pool);

    let recent_change = department_change_event("HRSR-WORK-1", 60);
    let recent_offboarding = offboarding_event("HRSR-WORK-2", 30);
    let mut stale = department_change_event("HRSR-WORK-3", 0);
    stale.received_at = fixed_now() - Duration::days(10);

    for event in [&recent_change, &recent_offboarding, &stale] {
        store.create(event).await.unwrap();
    }

    // Complete one of the recent events so risk shows up in the counts.
    store
        .transition(recent_change.id, StatusUpdate::processing())
        .await
        .unwrap();
    store
        .transition(
            recent_change.id,
            StatusUpdate::completed(RiskLevel::Medium, None, fixed_now()),
        )
        .await
        .unwrap();

    let since = fixed_now() - Duration::days(7);
    let metrics = store.metrics(since).await.unwrap();

    assert_eq!(metrics.since, since);
    assert_eq!(metrics.total, 2);
    assert_eq!(metrics.by_status.get("completed"), Some(&1));
    assert_eq!(metrics.by_status.get("received"), Some(&1));
    assert_eq!(metrics.by_event_type.get("department_change"), Some(&1));
    assert_eq!(metrics.by_event_type.get("employee_offboarding"), Some(&1));
    assert_eq!(metrics.by_risk_level.get("medium"), Some(&1));
    assert_eq!(metrics.by_risk_level.len(), 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_record_risk_sets_level_without_changing_status(pool: SqlitePool) {
    let store = SqliteEventStore::new(pool);
    let event = department_change_event("HRSR-WORK-1", 0);
    store.create(&event).await.unwrap();
    store
        .transition(event.id, StatusUpdate::processing())
        .await
        .unwrap();

    store.record_risk(event.id, RiskLevel::High).await.unwrap();

    let stored = store.get(event.id).await.unwrap();
    assert_eq!(stored.status, EventStatus::Processing);
    assert_eq!(stored.risk_level, Some(RiskLevel::High));
    assert!(stored.processed_at.is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_record_risk_for_unknown_event_returns_not_found(pool: SqlitePool) {
    let store = SqliteEventStore::new(pool);

    match store.record_risk(Uuid::new_v4(), RiskLevel::Low).await {
        Err(BridgeError::EventNotFound(_)) => {}
        other => panic!("expected EventNotFound, got {other:?}"),
    }
}
