use async_trait::async_trait;

use crate::errors::DomainResult;
use crate::models::{Game, GameType, SeasonType};

#[async_trait]
pub trait GameRepository: Send + Sync {
    /// Writes the materialized result row, replacing any prior row for
    /// the same `(game_id, dynasty_id)`.
    async fn upsert(&self, game: &Game) -> DomainResult<()>;

    async fn find(&self, game_id: &str, dynasty_id: &str) -> DomainResult<Option<Game>>;

    async fn list(
        &self,
        dynasty_id: &str,
        season: i32,
        season_type: Option<SeasonType>,
    ) -> DomainResult<Vec<Game>>;

    async fn list_by_type(
        &self,
        dynasty_id: &str,
        season: i32,
        game_type: GameType,
    ) -> DomainResult<Vec<Game>>;

    async fn count(
        &self,
        dynasty_id: &str,
        season: i32,
        season_type: SeasonType,
    ) -> DomainResult<i64>;
}
