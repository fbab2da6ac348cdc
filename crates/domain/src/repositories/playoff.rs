use async_trait::async_trait;

use crate::errors::DomainResult;
use crate::models::{LeagueSeeding, TiebreakerApplication};

#[async_trait]
pub trait PlayoffRepository: Send + Sync {
    /// Persists the computed seeding for audit. Replaces any prior
    /// seeding for the same (dynasty, season).
    async fn save_seeding(
        &self,
        dynasty_id: &str,
        seeding: &LeagueSeeding,
    ) -> DomainResult<()>;

    async fn load_seeding(
        &self,
        dynasty_id: &str,
        season: i32,
    ) -> DomainResult<Option<LeagueSeeding>>;

    async fn save_tiebreakers(
        &self,
        applications: &[TiebreakerApplication],
    ) -> DomainResult<()>;
}
