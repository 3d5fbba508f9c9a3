//! `SQLite` implementation of the `EventStore` trait.
//!
//! Status transitions are applied with a single guarded UPDATE whose WHERE
//! clause only matches legal predecessor statuses, so the forward-transition
//! check is atomic and two concurrent processing attempts on the same event
//! cannot both succeed.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use hrbridge_core::error::BridgeError;
use hrbridge_core::event::{BridgeEvent, EventStatus, RiskLevel};
use hrbridge_core::store::{EventFilter, EventMetrics, EventStore, StatusUpdate};

/// SQLite-backed event store.
#[derive(Debug, Clone)]
pub struct SqliteEventStore {
    pool: SqlitePool,
}

impl SqliteEventStore {
    /// Creates a new `SqliteEventStore` on top of an existing pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn storage(err: sqlx::Error) -> BridgeError {
    BridgeError::Storage(err.to_string())
}

/// Fixed-width RFC 3339 UTC text, so lexicographic order is chronological.
fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(text: &str) -> Result<DateTime<Utc>, BridgeError> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| BridgeError::Storage(format!("corrupt timestamp '{text}': {err}")))
}

fn row_to_event(row: &SqliteRow) -> Result<BridgeEvent, BridgeError> {
    let id_text: String = row.try_get("id").map_err(storage)?;
    let id = Uuid::parse_str(&id_text)
        .map_err(|err| BridgeError::Storage(format!("corrupt event id '{id_text}': {err}")))?;

    let payload_json: String = row.try_get("payload").map_err(storage)?;
    let payload = serde_json::from_str(&payload_json)
        .map_err(|err| BridgeError::Storage(format!("corrupt payload for event {id}: {err}")))?;

    let status_text: String = row.try_get("status").map_err(storage)?;
    let status: EventStatus = status_text
        .parse()
        .map_err(|_| BridgeError::Storage(format!("corrupt status '{status_text}'")))?;

    let risk_text: Option<String> = row.try_get("risk_level").map_err(storage)?;
    let risk_level = risk_text
        .map(|text| {
            text.parse::<RiskLevel>()
                .map_err(|_| BridgeError::Storage(format!("corrupt risk level '{text}'")))
        })
        .transpose()?;

    let received_text: String = row.try_get("received_at").map_err(storage)?;
    let processed_text: Option<String> = row.try_get("processed_at").map_err(storage)?;

    Ok(BridgeEvent {
        id,
        case_id: row.try_get("case_id").map_err(storage)?,
        employee_id: row.try_get("employee_id").map_err(storage)?,
        payload,
        status,
        risk_level,
        received_at: parse_timestamp(&received_text)?,
        processed_at: processed_text.as_deref().map(parse_timestamp).transpose()?,
        error_detail: row.try_get("error_detail").map_err(storage)?,
    })
}

#[async_trait]
impl EventStore for SqliteEventStore {
    async fn create(&self, event: &BridgeEvent) -> Result<(), BridgeError> {
        event.validate()?;

        let payload_json = serde_json::to_string(&event.payload)
            .map_err(|err| BridgeError::Storage(format!("payload serialization: {err}")))?;

        sqlx::query(
            "INSERT INTO events \
             (id, case_id, employee_id, event_type, payload, status, risk_level, \
              received_at, processed_at, error_detail) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(event.id.to_string())
        .bind(&event.case_id)
        .bind(&event.employee_id)
        .bind(event.event_type().as_str())
        .bind(payload_json)
        .bind(event.status.as_str())
        .bind(event.risk_level.map(RiskLevel::as_str))
        .bind(format_timestamp(event.received_at))
        .bind(event.processed_at.map(format_timestamp))
        .bind(&event.error_detail)
        .execute(&self.pool)
        .await
        .map_err(storage)?;

        debug!(event_id = %event.id, case_id = %event.case_id, "event persisted");
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<BridgeEvent, BridgeError> {
        let row = sqlx::query("SELECT * FROM events WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?;

        match row {
            Some(row) => row_to_event(&row),
            None => Err(BridgeError::EventNotFound(id)),
        }
    }

    async fn list(&self, filter: &EventFilter) -> Result<Vec<BridgeEvent>, BridgeError> {
        let mut query = QueryBuilder::<Sqlite>::new("SELECT * FROM events WHERE 1 = 1");

        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(event_type) = filter.event_type {
            query.push(" AND event_type = ").push_bind(event_type.as_str());
        }
        if let Some(case_id) = &filter.case_id {
            query.push(" AND case_id = ").push_bind(case_id.clone());
        }
        if let Some(after) = filter.received_after {
            query
                .push(" AND received_at >= ")
                .push_bind(format_timestamp(after));
        }
        if let Some(before) = filter.received_before {
            query
                .push(" AND received_at < ")
                .push_bind(format_timestamp(before));
        }

        query
            .push(" ORDER BY received_at DESC, id DESC LIMIT ")
            .push_bind(filter.limit)
            .push(" OFFSET ")
            .push_bind(filter.offset);

        let rows = query
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(storage)?;

        rows.iter().map(row_to_event).collect()
    }

    async fn record_risk(&self, id: Uuid, risk: RiskLevel) -> Result<(), BridgeError> {
        let result = sqlx::query("UPDATE events SET risk_level = ? WHERE id = ?")
            .bind(risk.as_str())
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(storage)?;

        if result.rows_affected() == 0 {
            return Err(BridgeError::EventNotFound(id));
        }
        debug!(event_id = %id, risk = %risk, "risk level recorded");
        Ok(())
    }

    async fn transition(&self, id: Uuid, update: StatusUpdate) -> Result<(), BridgeError> {
        let mut query = QueryBuilder::<Sqlite>::new("UPDATE events SET status = ");
        query.push_bind(update.to.as_str());
        query
            .push(", risk_level = ")
            .push_bind(update.risk_level.map(RiskLevel::as_str));
        query
            .push(", error_detail = ")
            .push_bind(update.error_detail.clone());
        query
            .push(", processed_at = ")
            .push_bind(update.processed_at.map(format_timestamp));
        query.push(" WHERE id = ").push_bind(id.to_string());

        query.push(" AND status IN (");
        let mut statuses = query.separated(", ");
        for predecessor in EventStatus::predecessors(update.to) {
            statuses.push_bind(predecessor.as_str());
        }
        statuses.push_unseparated(")");

        let result = query.build().execute(&self.pool).await.map_err(storage)?;
        if result.rows_affected() > 0 {
            debug!(event_id = %id, status = %update.to, "status transition applied");
            return Ok(());
        }

        // The guarded UPDATE matched nothing: either the event does not
        // exist or its current status is not a legal predecessor.
        let row = sqlx::query("SELECT status FROM events WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?;

        match row {
            None => Err(BridgeError::EventNotFound(id)),
            Some(row) => {
                let status_text: String = row.try_get("status").map_err(storage)?;
                let from: EventStatus = status_text
                    .parse()
                    .map_err(|_| BridgeError::Storage(format!("corrupt status '{status_text}'")))?;
                Err(BridgeError::InvalidTransition {
                    id,
                    from,
                    to: update.to,
                })
            }
        }
    }

    async fn metrics(&self, since: DateTime<Utc>) -> Result<EventMetrics, BridgeError> {
        let since_text = format_timestamp(since);

        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM events WHERE received_at >= ?")
                .bind(&since_text)
                .fetch_one(&self.pool)
                .await
                .map_err(storage)?;

        let group_counts = |column: &'static str, extra: &'static str| {
            let since_text = since_text.clone();
            let pool = self.pool.clone();
            async move {
                let sql = format!(
                    "SELECT {column} AS k, COUNT(*) AS n FROM events \
                     WHERE received_at >= ?{extra} GROUP BY {column}"
                );
                let rows = sqlx::query(&sql)
                    .bind(&since_text)
                    .fetch_all(&pool)
                    .await
                    .map_err(storage)?;

                let mut counts = std::collections::BTreeMap::new();
                for row in rows {
                    let key: String = row.try_get("k").map_err(storage)?;
                    let count: i64 = row.try_get("n").map_err(storage)?;
                    counts.insert(key, count);
                }
                Ok::<_, BridgeError>(counts)
            }
        };

        let by_status = group_counts("status", "").await?;
        let by_event_type = group_counts("event_type", "").await?;
        let by_risk_level = group_counts("risk_level", " AND risk_level IS NOT NULL").await?;

        Ok(EventMetrics {
            since,
            total,
            by_status,
            by_event_type,
            by_risk_level,
        })
    }
}
