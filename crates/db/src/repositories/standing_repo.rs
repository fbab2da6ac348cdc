use async_trait::async_trait;
use sqlx::SqlitePool;
use std::str::FromStr;

use domain::errors::{DomainError, DomainResult};
use domain::models::{SeasonType, Standing};
use domain::repositories::StandingRepository;

#[derive(Debug, Clone, sqlx::FromRow)]
struct StandingRow {
    dynasty_id: String,
    team_id: String,
    season: i32,
    season_type: String,
    wins: i32,
    losses: i32,
    ties: i32,
    division_wins: i32,
    division_losses: i32,
    division_ties: i32,
    conference_wins: i32,
    conference_losses: i32,
    conference_ties: i32,
    home_wins: i32,
    home_losses: i32,
    away_wins: i32,
    away_losses: i32,
    points_for: i32,
    points_against: i32,
    current_streak: i32,
}

impl TryFrom<StandingRow> for Standing {
    type Error = DomainError;

    fn try_from(row: StandingRow) -> Result<Self, Self::Error> {
        Ok(Standing {
            dynasty_id: row.dynasty_id,
            team_id: row.team_id,
            season: row.season,
            season_type: SeasonType::from_str(&row.season_type)?,
            wins: row.wins,
            losses: row.losses,
            ties: row.ties,
            division_wins: row.division_wins,
            division_losses: row.division_losses,
            division_ties: row.division_ties,
            conference_wins: row.conference_wins,
            conference_losses: row.conference_losses,
            conference_ties: row.conference_ties,
            home_wins: row.home_wins,
            home_losses: row.home_losses,
            away_wins: row.away_wins,
            away_losses: row.away_losses,
            points_for: row.points_for,
            points_against: row.points_against,
            current_streak: row.current_streak,
        })
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT dynasty_id, team_id, season, season_type, wins, losses, ties,
           division_wins, division_losses, division_ties,
           conference_wins, conference_losses, conference_ties,
           home_wins, home_losses, away_wins, away_losses,
           points_for, points_against, current_streak
    FROM standings
"#;

pub struct StandingRepo {
    pool: SqlitePool,
}

impl StandingRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StandingRepository for StandingRepo {
    async fn get_or_create(
        &self,
        dynasty_id: &str,
        team_id: &str,
        season: i32,
        season_type: SeasonType,
    ) -> DomainResult<Standing> {
        if let Some(existing) = self.find(dynasty_id, team_id, season, season_type).await? {
            return Ok(existing);
        }
        let fresh = Standing::new(dynasty_id, team_id, season, season_type);
        self.upsert(&fresh).await?;
        Ok(fresh)
    }

    async fn upsert(&self, standing: &Standing) -> DomainResult<()> {
        sqlx::query(
            r#"
            INSERT INTO standings
                (dynasty_id, team_id, season, season_type, wins, losses, ties,
                 division_wins, division_losses, division_ties,
                 conference_wins, conference_losses, conference_ties,
                 home_wins, home_losses, away_wins, away_losses,
                 points_for, points_against, current_streak)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
                    ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)
            ON CONFLICT (dynasty_id, team_id, season, season_type) DO UPDATE SET
                wins = excluded.wins,
                losses = excluded.losses,
                ties = excluded.ties,
                division_wins = excluded.division_wins,
                division_losses = excluded.division_losses,
                division_ties = excluded.division_ties,
                conference_wins = excluded.conference_wins,
                conference_losses = excluded.conference_losses,
                conference_ties = excluded.conference_ties,
                home_wins = excluded.home_wins,
                home_losses = excluded.home_losses,
                away_wins = excluded.away_wins,
                away_losses = excluded.away_losses,
                points_for = excluded.points_for,
                points_against = excluded.points_against,
                current_streak = excluded.current_streak
            "#,
        )
        .bind(&standing.dynasty_id)
        .bind(&standing.team_id)
        .bind(standing.season)
        .bind(standing.season_type.to_string())
        .bind(standing.wins)
        .bind(standing.losses)
        .bind(standing.ties)
        .bind(standing.division_wins)
        .bind(standing.division_losses)
        .bind(standing.division_ties)
        .bind(standing.conference_wins)
        .bind(standing.conference_losses)
        .bind(standing.conference_ties)
        .bind(standing.home_wins)
        .bind(standing.home_losses)
        .bind(standing.away_wins)
        .bind(standing.away_losses)
        .bind(standing.points_for)
        .bind(standing.points_against)
        .bind(standing.current_streak)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;
        Ok(())
    }

    async fn find(
        &self,
        dynasty_id: &str,
        team_id: &str,
        season: i32,
        season_type: SeasonType,
    ) -> DomainResult<Option<Standing>> {
        let sql = format!(
            "{} WHERE dynasty_id = ?1 AND team_id = ?2 AND season = ?3 AND season_type = ?4",
            SELECT_COLUMNS
        );
        let row: Option<StandingRow> = sqlx::query_as(&sql)
            .bind(dynasty_id)
            .bind(team_id)
            .bind(season)
            .bind(season_type.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;
        row.map(TryInto::try_into).transpose()
    }

    async fn list(
        &self,
        dynasty_id: &str,
        season: i32,
        season_type: SeasonType,
    ) -> DomainResult<Vec<Standing>> {
        let sql = format!(
            "{} WHERE dynasty_id = ?1 AND season = ?2 AND season_type = ?3",
            SELECT_COLUMNS
        );
        let rows: Vec<StandingRow> = sqlx::query_as(&sql)
            .bind(dynasty_id)
            .bind(season)
            .bind(season_type.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        let mut standings: Vec<Standing> = rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<DomainResult<Vec<_>>>()?;
        standings.sort_by(|a, b| {
            b.win_pct()
                .partial_cmp(&a.win_pct())
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.point_diff().cmp(&a.point_diff()))
                .then_with(|| a.team_id.cmp(&b.team_id))
        });
        Ok(standings)
    }
}
