use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use domain::errors::{DomainError, DomainResult};
use domain::models::Dynasty;
use domain::repositories::DynastyRepository;

#[derive(Debug, Clone, sqlx::FromRow)]
struct DynastyRow {
    dynasty_id: String,
    dynasty_name: String,
    owner_team_id: Option<String>,
    career_wins: i32,
    career_losses: i32,
    career_ties: i32,
    seasons_played: i32,
    created_at: String,
}

impl TryFrom<DynastyRow> for Dynasty {
    type Error = DomainError;

    fn try_from(row: DynastyRow) -> Result<Self, Self::Error> {
        let created_at = row
            .created_at
            .parse::<DateTime<Utc>>()
            .map_err(|e| DomainError::InternalError(format!("Bad created_at: {}", e)))?;
        Ok(Dynasty {
            dynasty_id: row.dynasty_id,
            dynasty_name: row.dynasty_name,
            owner_team_id: row.owner_team_id,
            career_wins: row.career_wins,
            career_losses: row.career_losses,
            career_ties: row.career_ties,
            seasons_played: row.seasons_played,
            created_at,
        })
    }
}

pub struct DynastyRepo {
    pool: SqlitePool,
}

impl DynastyRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DynastyRepository for DynastyRepo {
    async fn create(&self, dynasty: &Dynasty) -> DomainResult<Dynasty> {
        sqlx::query(
            r#"
            INSERT INTO dynasties
                (dynasty_id, dynasty_name, owner_team_id, career_wins, career_losses,
                 career_ties, seasons_played, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&dynasty.dynasty_id)
        .bind(&dynasty.dynasty_name)
        .bind(&dynasty.owner_team_id)
        .bind(dynasty.career_wins)
        .bind(dynasty.career_losses)
        .bind(dynasty.career_ties)
        .bind(dynasty.seasons_played)
        .bind(dynasty.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                DomainError::InvalidState(format!(
                    "Dynasty {} already exists",
                    dynasty.dynasty_id
                ))
            }
            e => DomainError::DatabaseError(e.to_string()),
        })?;
        Ok(dynasty.clone())
    }

    async fn find_by_id(&self, dynasty_id: &str) -> DomainResult<Option<Dynasty>> {
        let row: Option<DynastyRow> = sqlx::query_as(
            r#"
            SELECT dynasty_id, dynasty_name, owner_team_id, career_wins, career_losses,
                   career_ties, seasons_played, created_at
            FROM dynasties
            WHERE dynasty_id = ?1
            "#,
        )
        .bind(dynasty_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        row.map(TryInto::try_into).transpose()
    }

    async fn update(&self, dynasty: &Dynasty) -> DomainResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE dynasties
            SET dynasty_name = ?2, owner_team_id = ?3, career_wins = ?4,
                career_losses = ?5, career_ties = ?6, seasons_played = ?7
            WHERE dynasty_id = ?1
            "#,
        )
        .bind(&dynasty.dynasty_id)
        .bind(&dynasty.dynasty_name)
        .bind(&dynasty.owner_team_id)
        .bind(dynasty.career_wins)
        .bind(dynasty.career_losses)
        .bind(dynasty.career_ties)
        .bind(dynasty.seasons_played)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound(format!(
                "Dynasty {}",
                dynasty.dynasty_id
            )));
        }
        Ok(())
    }

    async fn delete(&self, dynasty_id: &str) -> DomainResult<()> {
        sqlx::query("DELETE FROM dynasties WHERE dynasty_id = ?1")
            .bind(dynasty_id)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;
        Ok(())
    }
}
