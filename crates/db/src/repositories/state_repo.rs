use async_trait::async_trait;
use sqlx::SqlitePool;
use std::str::FromStr;

use domain::errors::{DomainError, DomainResult};
use domain::models::{DynastyState, Phase, SimDate};
use domain::repositories::DynastyStateRepository;

#[derive(Debug, Clone, sqlx::FromRow)]
struct StateRow {
    dynasty_id: String,
    season: i32,
    current_date: String,
    current_phase: String,
    current_week: i32,
}

impl TryFrom<StateRow> for DynastyState {
    type Error = DomainError;

    fn try_from(row: StateRow) -> Result<Self, Self::Error> {
        Ok(DynastyState {
            dynasty_id: row.dynasty_id,
            season: row.season,
            current_date: SimDate::from_str(&row.current_date)?,
            current_phase: Phase::from_str(&row.current_phase)?,
            current_week: row.current_week,
        })
    }
}

pub struct DynastyStateRepo {
    pool: SqlitePool,
}

impl DynastyStateRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DynastyStateRepository for DynastyStateRepo {
    async fn initialize(&self, state: &DynastyState) -> DomainResult<DynastyState> {
        // Insert-if-absent, then read back: an existing cursor wins so
        // reconstruction never rewinds a save.
        sqlx::query(
            r#"
            INSERT INTO dynasty_state (dynasty_id, season, "current_date", current_phase, current_week)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT (dynasty_id, season) DO NOTHING
            "#,
        )
        .bind(&state.dynasty_id)
        .bind(state.season)
        .bind(state.current_date.to_string())
        .bind(state.current_phase.to_string())
        .bind(state.current_week)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        self.load(&state.dynasty_id, state.season).await
    }

    async fn load(&self, dynasty_id: &str, season: i32) -> DomainResult<DynastyState> {
        self.find(dynasty_id, season).await?.ok_or_else(|| {
            DomainError::StateMissing(format!("({}, {})", dynasty_id, season))
        })
    }

    async fn find(&self, dynasty_id: &str, season: i32) -> DomainResult<Option<DynastyState>> {
        let row: Option<StateRow> = sqlx::query_as(
            r#"
            SELECT dynasty_id, season, "current_date", current_phase, current_week
            FROM dynasty_state
            WHERE dynasty_id = ?1 AND season = ?2
            "#,
        )
        .bind(dynasty_id)
        .bind(season)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        row.map(TryInto::try_into).transpose()
    }

    async fn update(&self, state: &DynastyState) -> DomainResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE dynasty_state
            SET "current_date" = ?3, current_phase = ?4, current_week = ?5
            WHERE dynasty_id = ?1 AND season = ?2
            "#,
        )
        .bind(&state.dynasty_id)
        .bind(state.season)
        .bind(state.current_date.to_string())
        .bind(state.current_phase.to_string())
        .bind(state.current_week)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::StateMissing(format!(
                "({}, {})",
                state.dynasty_id, state.season
            )));
        }
        Ok(())
    }
}
