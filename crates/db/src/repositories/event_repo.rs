use async_trait::async_trait;
use sqlx::SqlitePool;
use std::str::FromStr;
use uuid::Uuid;

use domain::errors::{DomainError, DomainResult};
use domain::models::{EventPayload, EventType, GameClass, LeagueEvent, SimDate};
use domain::repositories::EventRepository;

#[derive(Debug, Clone, sqlx::FromRow)]
struct EventRow {
    event_id: String,
    event_type: String,
    timestamp_ms: i64,
    game_id: String,
    dynasty_id: String,
    data: String,
}

impl TryFrom<EventRow> for LeagueEvent {
    type Error = DomainError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        let event_id = Uuid::parse_str(&row.event_id)
            .map_err(|e| DomainError::InternalError(format!("Bad event id: {}", e)))?;
        let event_type = EventType::from_str(&row.event_type)?;
        let data: EventPayload = serde_json::from_str(&row.data).map_err(|e| {
            DomainError::StateCorruption(format!(
                "Event {} payload is not valid JSON: {}",
                row.game_id, e
            ))
        })?;
        Ok(LeagueEvent {
            event_id,
            event_type,
            timestamp_ms: row.timestamp_ms,
            game_id: row.game_id,
            dynasty_id: row.dynasty_id,
            data,
        })
    }
}

/// SQL fragment narrowing GAME events to one scheduling class. Applied
/// only after the dynasty filter; `substr` avoids LIKE's wildcard
/// underscore.
fn class_predicate(class: GameClass) -> &'static str {
    match class {
        GameClass::Playoff => "substr(game_id, 1, 8) = 'playoff_'",
        GameClass::Preseason => "substr(game_id, 1, 10) = 'preseason_'",
        GameClass::RegularSeason => {
            "substr(game_id, 1, 8) != 'playoff_' AND substr(game_id, 1, 10) != 'preseason_'"
        }
    }
}

pub struct EventRepo {
    pool: SqlitePool,
}

impl EventRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn encode_payload(event: &LeagueEvent) -> DomainResult<String> {
        serde_json::to_string(&event.data)
            .map_err(|e| DomainError::InternalError(format!("Failed to encode payload: {}", e)))
    }
}

#[async_trait]
impl EventRepository for EventRepo {
    async fn insert(&self, event: &LeagueEvent) -> DomainResult<Uuid> {
        let data = Self::encode_payload(event)?;
        let result = sqlx::query(
            r#"
            INSERT INTO events (event_id, event_type, timestamp_ms, game_id, dynasty_id, data)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(event.event_id.to_string())
        .bind(event.event_type.to_string())
        .bind(event.timestamp_ms)
        .bind(&event.game_id)
        .bind(&event.dynasty_id)
        .bind(data)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(event.event_id),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(DomainError::DuplicateGameId(format!(
                    "({}, {})",
                    event.dynasty_id, event.game_id
                )))
            }
            Err(e) => Err(DomainError::DatabaseError(e.to_string())),
        }
    }

    async fn update(&self, event: &LeagueEvent) -> DomainResult<()> {
        let data = Self::encode_payload(event)?;
        let result = sqlx::query(
            "UPDATE events SET data = ?1 WHERE event_id = ?2 AND dynasty_id = ?3",
        )
        .bind(data)
        .bind(event.event_id.to_string())
        .bind(&event.dynasty_id)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound(format!(
                "Event {} for dynasty {}",
                event.event_id, event.dynasty_id
            )));
        }
        Ok(())
    }

    async fn find_by_id(&self, event_id: Uuid) -> DomainResult<Option<LeagueEvent>> {
        let row: Option<EventRow> = sqlx::query_as(
            r#"
            SELECT event_id, event_type, timestamp_ms, game_id, dynasty_id, data
            FROM events
            WHERE event_id = ?1
            "#,
        )
        .bind(event_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        row.map(TryInto::try_into).transpose()
    }

    async fn find_by_game_id(
        &self,
        game_id: &str,
        dynasty_id: &str,
    ) -> DomainResult<Option<LeagueEvent>> {
        let row: Option<EventRow> = sqlx::query_as(
            r#"
            SELECT event_id, event_type, timestamp_ms, game_id, dynasty_id, data
            FROM events
            WHERE game_id = ?1 AND dynasty_id = ?2
            "#,
        )
        .bind(game_id)
        .bind(dynasty_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        row.map(TryInto::try_into).transpose()
    }

    async fn list_by_dynasty(
        &self,
        dynasty_id: &str,
        event_type: Option<EventType>,
    ) -> DomainResult<Vec<LeagueEvent>> {
        let rows: Vec<EventRow> = match event_type {
            Some(event_type) => {
                sqlx::query_as(
                    r#"
                    SELECT event_id, event_type, timestamp_ms, game_id, dynasty_id, data
                    FROM events
                    WHERE dynasty_id = ?1 AND event_type = ?2
                    ORDER BY timestamp_ms ASC
                    "#,
                )
                .bind(dynasty_id)
                .bind(event_type.to_string())
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as(
                    r#"
                    SELECT event_id, event_type, timestamp_ms, game_id, dynasty_id, data
                    FROM events
                    WHERE dynasty_id = ?1
                    ORDER BY timestamp_ms ASC
                    "#,
                )
                .bind(dynasty_id)
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn list_on_date(
        &self,
        dynasty_id: &str,
        date: SimDate,
    ) -> DomainResult<Vec<LeagueEvent>> {
        let rows: Vec<EventRow> = sqlx::query_as(
            r#"
            SELECT event_id, event_type, timestamp_ms, game_id, dynasty_id, data
            FROM events
            WHERE dynasty_id = ?1 AND timestamp_ms >= ?2 AND timestamp_ms < ?3
            ORDER BY timestamp_ms ASC
            "#,
        )
        .bind(dynasty_id)
        .bind(date.start_of_day_ms())
        .bind(date.add_days(1).start_of_day_ms())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn first_game_date(
        &self,
        dynasty_id: &str,
        class: GameClass,
        after: Option<SimDate>,
        before: Option<SimDate>,
    ) -> DomainResult<Option<SimDate>> {
        self.boundary_date("MIN", dynasty_id, class, after, before)
            .await
    }

    async fn last_game_date(
        &self,
        dynasty_id: &str,
        class: GameClass,
        after: Option<SimDate>,
        before: Option<SimDate>,
    ) -> DomainResult<Option<SimDate>> {
        self.boundary_date("MAX", dynasty_id, class, after, before)
            .await
    }

    async fn count_games(
        &self,
        dynasty_id: &str,
        class: GameClass,
        executed_only: bool,
        after: Option<SimDate>,
        before: Option<SimDate>,
    ) -> DomainResult<i64> {
        let executed = if executed_only {
            "AND json_extract(data, '$.results') IS NOT NULL"
        } else {
            ""
        };
        let sql = format!(
            r#"
            SELECT COUNT(*) FROM events
            WHERE dynasty_id = ?1 AND event_type = 'GAME'
              AND timestamp_ms >= ?2 AND timestamp_ms < ?3
              AND {} {}
            "#,
            class_predicate(class),
            executed
        );
        let lower = after.map(|d| d.start_of_day_ms()).unwrap_or(i64::MIN);
        let upper = before.map(|d| d.start_of_day_ms()).unwrap_or(i64::MAX);
        let count: i64 = sqlx::query_scalar(&sql)
            .bind(dynasty_id)
            .bind(lower)
            .bind(upper)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;
        Ok(count)
    }
}

impl EventRepo {
    async fn boundary_date(
        &self,
        aggregate: &str,
        dynasty_id: &str,
        class: GameClass,
        after: Option<SimDate>,
        before: Option<SimDate>,
    ) -> DomainResult<Option<SimDate>> {
        let sql = format!(
            r#"
            SELECT {}(timestamp_ms) FROM events
            WHERE dynasty_id = ?1 AND event_type = 'GAME'
              AND timestamp_ms >= ?2 AND timestamp_ms < ?3
              AND {}
            "#,
            aggregate,
            class_predicate(class)
        );
        let lower = after.map(|d| d.start_of_day_ms()).unwrap_or(i64::MIN);
        let upper = before.map(|d| d.start_of_day_ms()).unwrap_or(i64::MAX);
        let ts: Option<i64> = sqlx::query_scalar(&sql)
            .bind(dynasty_id)
            .bind(lower)
            .bind(upper)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;
        Ok(ts.map(SimDate::from_timestamp_ms))
    }
}
