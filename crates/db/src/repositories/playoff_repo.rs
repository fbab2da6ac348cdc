use async_trait::async_trait;
use sqlx::SqlitePool;
use std::str::FromStr;

use domain::errors::{DomainError, DomainResult};
use domain::models::{Conference, LeagueSeeding, PlayoffSeed, TiebreakerApplication};
use domain::repositories::PlayoffRepository;

#[derive(Debug, Clone, sqlx::FromRow)]
struct SeedRow {
    conference: String,
    seed: i32,
    team_id: String,
    tiebreaker_note: Option<String>,
}

impl TryFrom<SeedRow> for PlayoffSeed {
    type Error = DomainError;

    fn try_from(row: SeedRow) -> Result<Self, Self::Error> {
        Ok(PlayoffSeed {
            conference: Conference::from_str(&row.conference)?,
            seed: row.seed as u8,
            team_id: row.team_id,
            tiebreaker_note: row.tiebreaker_note,
        })
    }
}

pub struct PlayoffRepo {
    pool: SqlitePool,
}

impl PlayoffRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlayoffRepository for PlayoffRepo {
    async fn save_seeding(
        &self,
        dynasty_id: &str,
        seeding: &LeagueSeeding,
    ) -> DomainResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        sqlx::query("DELETE FROM playoff_seedings WHERE dynasty_id = ?1 AND season = ?2")
            .bind(dynasty_id)
            .bind(seeding.season)
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        for seed in &seeding.seeds {
            sqlx::query(
                r#"
                INSERT INTO playoff_seedings
                    (dynasty_id, season, conference, seed, team_id, tiebreaker_note)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(dynasty_id)
            .bind(seeding.season)
            .bind(seed.conference.to_string())
            .bind(seed.seed as i32)
            .bind(&seed.team_id)
            .bind(&seed.tiebreaker_note)
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))
    }

    async fn load_seeding(
        &self,
        dynasty_id: &str,
        season: i32,
    ) -> DomainResult<Option<LeagueSeeding>> {
        let rows: Vec<SeedRow> = sqlx::query_as(
            r#"
            SELECT conference, seed, team_id, tiebreaker_note
            FROM playoff_seedings
            WHERE dynasty_id = ?1 AND season = ?2
            ORDER BY conference, seed
            "#,
        )
        .bind(dynasty_id)
        .bind(season)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        if rows.is_empty() {
            return Ok(None);
        }
        let seeds = rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<DomainResult<Vec<PlayoffSeed>>>()?;
        Ok(Some(LeagueSeeding::new(season, seeds)?))
    }

    async fn save_tiebreakers(
        &self,
        applications: &[TiebreakerApplication],
    ) -> DomainResult<()> {
        for app in applications {
            let teams = serde_json::to_string(&app.teams).map_err(|e| {
                DomainError::InternalError(format!("Failed to encode tied teams: {}", e))
            })?;
            sqlx::query(
                r#"
                INSERT INTO tiebreaker_applications
                    (dynasty_id, season, step, teams, winner, detail)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(&app.dynasty_id)
            .bind(app.season)
            .bind(&app.step)
            .bind(teams)
            .bind(&app.winner)
            .bind(&app.detail)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::create_memory_pool;
    use crate::schema::migrate;

    async fn setup() -> PlayoffRepo {
        let pool = create_memory_pool().await.unwrap();
        migrate(&pool).await.unwrap();
        sqlx::query(
            "INSERT INTO dynasties (dynasty_id, dynasty_name, created_at) VALUES ('d1', 'd1', '2025-01-01')",
        )
        .execute(&pool)
        .await
        .unwrap();
        PlayoffRepo::new(pool)
    }

    fn sample_seeding() -> LeagueSeeding {
        let afc = ["KC", "BUF", "BAL", "HOU", "PIT", "LAC", "MIA"];
        let nfc = ["PHI", "DET", "SF", "TB", "DAL", "GB", "LAR"];
        let mut seeds = Vec::new();
        for (conference, teams) in [(Conference::AFC, afc), (Conference::NFC, nfc)] {
            for (i, team) in teams.iter().enumerate() {
                seeds.push(PlayoffSeed {
                    conference,
                    seed: (i + 1) as u8,
                    team_id: team.to_string(),
                    tiebreaker_note: if *team == "PIT" {
                        Some("head_to_head: PIT=1.000, MIA=0.000".to_string())
                    } else {
                        None
                    },
                });
            }
        }
        LeagueSeeding::new(2025, seeds).unwrap()
    }

    #[tokio::test]
    async fn test_save_and_load_seeding() {
        let repo = setup().await;
        let seeding = sample_seeding();
        repo.save_seeding("d1", &seeding).await.unwrap();

        let loaded = repo.load_seeding("d1", 2025).await.unwrap().unwrap();
        assert_eq!(loaded.team_at(Conference::AFC, 1).unwrap(), "KC");
        assert_eq!(loaded.seed_of("LAR"), Some(7));
        let pit = loaded
            .seeds
            .iter()
            .find(|s| s.team_id == "PIT")
            .unwrap();
        assert!(pit.tiebreaker_note.is_some());

        assert!(repo.load_seeding("d1", 2024).await.unwrap().is_none());
        assert!(repo.load_seeding("d2", 2025).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_seeding_replaces_prior() {
        let repo = setup().await;
        let seeding = sample_seeding();
        repo.save_seeding("d1", &seeding).await.unwrap();
        repo.save_seeding("d1", &seeding).await.unwrap();

        let loaded = repo.load_seeding("d1", 2025).await.unwrap().unwrap();
        assert_eq!(loaded.seeds.len(), 14);
    }

    #[tokio::test]
    async fn test_save_tiebreakers() {
        let repo = setup().await;
        let apps = vec![TiebreakerApplication {
            dynasty_id: "d1".to_string(),
            season: 2025,
            step: "head_to_head".to_string(),
            teams: vec!["PIT".to_string(), "MIA".to_string()],
            winner: "PIT".to_string(),
            detail: "PIT=1.000, MIA=0.000".to_string(),
        }];
        repo.save_tiebreakers(&apps).await.unwrap();

        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM tiebreaker_applications WHERE dynasty_id = 'd1'")
                .fetch_one(&repo.pool)
                .await
                .unwrap();
        assert_eq!(count, 1);
    }
}
