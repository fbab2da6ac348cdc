use async_trait::async_trait;
use sqlx::SqlitePool;
use std::str::FromStr;

use domain::errors::{DomainError, DomainResult};
use domain::models::{Game, GameType, SeasonType};
use domain::repositories::GameRepository;

#[derive(Debug, Clone, sqlx::FromRow)]
struct GameRow {
    game_id: String,
    dynasty_id: String,
    season: i32,
    week: i32,
    season_type: String,
    game_type: String,
    home_team_id: String,
    away_team_id: String,
    home_score: i32,
    away_score: i32,
    home_touchdowns: i32,
    away_touchdowns: i32,
    total_plays: i32,
    overtime_periods: i32,
}

impl TryFrom<GameRow> for Game {
    type Error = DomainError;

    fn try_from(row: GameRow) -> Result<Self, Self::Error> {
        Ok(Game {
            game_id: row.game_id,
            dynasty_id: row.dynasty_id,
            season: row.season,
            week: row.week,
            season_type: SeasonType::from_str(&row.season_type)?,
            game_type: GameType::from_str(&row.game_type)?,
            home_team_id: row.home_team_id,
            away_team_id: row.away_team_id,
            home_score: row.home_score,
            away_score: row.away_score,
            home_touchdowns: row.home_touchdowns,
            away_touchdowns: row.away_touchdowns,
            total_plays: row.total_plays,
            overtime_periods: row.overtime_periods,
        })
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT game_id, dynasty_id, season, week, season_type, game_type,
           home_team_id, away_team_id, home_score, away_score,
           home_touchdowns, away_touchdowns, total_plays, overtime_periods
    FROM games
"#;

pub struct GameRepo {
    pool: SqlitePool,
}

impl GameRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GameRepository for GameRepo {
    async fn upsert(&self, game: &Game) -> DomainResult<()> {
        sqlx::query(
            r#"
            INSERT INTO games
                (game_id, dynasty_id, season, week, season_type, game_type,
                 home_team_id, away_team_id, home_score, away_score,
                 home_touchdowns, away_touchdowns, total_plays, overtime_periods)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            ON CONFLICT (game_id, dynasty_id) DO UPDATE SET
                season = excluded.season,
                week = excluded.week,
                season_type = excluded.season_type,
                game_type = excluded.game_type,
                home_team_id = excluded.home_team_id,
                away_team_id = excluded.away_team_id,
                home_score = excluded.home_score,
                away_score = excluded.away_score,
                home_touchdowns = excluded.home_touchdowns,
                away_touchdowns = excluded.away_touchdowns,
                total_plays = excluded.total_plays,
                overtime_periods = excluded.overtime_periods
            "#,
        )
        .bind(&game.game_id)
        .bind(&game.dynasty_id)
        .bind(game.season)
        .bind(game.week)
        .bind(game.season_type.to_string())
        .bind(game.game_type.to_string())
        .bind(&game.home_team_id)
        .bind(&game.away_team_id)
        .bind(game.home_score)
        .bind(game.away_score)
        .bind(game.home_touchdowns)
        .bind(game.away_touchdowns)
        .bind(game.total_plays)
        .bind(game.overtime_periods)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;
        Ok(())
    }

    async fn find(&self, game_id: &str, dynasty_id: &str) -> DomainResult<Option<Game>> {
        let sql = format!("{} WHERE game_id = ?1 AND dynasty_id = ?2", SELECT_COLUMNS);
        let row: Option<GameRow> = sqlx::query_as(&sql)
            .bind(game_id)
            .bind(dynasty_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;
        row.map(TryInto::try_into).transpose()
    }

    async fn list(
        &self,
        dynasty_id: &str,
        season: i32,
        season_type: Option<SeasonType>,
    ) -> DomainResult<Vec<Game>> {
        let rows: Vec<GameRow> = match season_type {
            Some(season_type) => {
                let sql = format!(
                    "{} WHERE dynasty_id = ?1 AND season = ?2 AND season_type = ?3 ORDER BY week, game_id",
                    SELECT_COLUMNS
                );
                sqlx::query_as(&sql)
                    .bind(dynasty_id)
                    .bind(season)
                    .bind(season_type.to_string())
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                let sql = format!(
                    "{} WHERE dynasty_id = ?1 AND season = ?2 ORDER BY week, game_id",
                    SELECT_COLUMNS
                );
                sqlx::query_as(&sql)
                    .bind(dynasty_id)
                    .bind(season)
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn list_by_type(
        &self,
        dynasty_id: &str,
        season: i32,
        game_type: GameType,
    ) -> DomainResult<Vec<Game>> {
        let sql = format!(
            "{} WHERE dynasty_id = ?1 AND season = ?2 AND game_type = ?3 ORDER BY game_id",
            SELECT_COLUMNS
        );
        let rows: Vec<GameRow> = sqlx::query_as(&sql)
            .bind(dynasty_id)
            .bind(season)
            .bind(game_type.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn count(
        &self,
        dynasty_id: &str,
        season: i32,
        season_type: SeasonType,
    ) -> DomainResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM games WHERE dynasty_id = ?1 AND season = ?2 AND season_type = ?3",
        )
        .bind(dynasty_id)
        .bind(season)
        .bind(season_type.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;
        Ok(count)
    }
}
