use async_trait::async_trait;

use crate::errors::DomainResult;
use crate::models::{SeasonType, Standing};

#[async_trait]
pub trait StandingRepository: Send + Sync {
    /// Fetches the row, creating a zeroed one lazily on the first game of
    /// that season type.
    async fn get_or_create(
        &self,
        dynasty_id: &str,
        team_id: &str,
        season: i32,
        season_type: SeasonType,
    ) -> DomainResult<Standing>;

    async fn upsert(&self, standing: &Standing) -> DomainResult<()>;

    async fn find(
        &self,
        dynasty_id: &str,
        team_id: &str,
        season: i32,
        season_type: SeasonType,
    ) -> DomainResult<Option<Standing>>;

    /// All rows for a (dynasty, season, season type), sorted by winning
    /// percentage descending, then point differential.
    async fn list(
        &self,
        dynasty_id: &str,
        season: i32,
        season_type: SeasonType,
    ) -> DomainResult<Vec<Standing>>;
}
