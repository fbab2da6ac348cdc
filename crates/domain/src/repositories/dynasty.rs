use async_trait::async_trait;

use crate::errors::DomainResult;
use crate::models::{Dynasty, DynastyState};

#[async_trait]
pub trait DynastyRepository: Send + Sync {
    async fn create(&self, dynasty: &Dynasty) -> DomainResult<Dynasty>;

    async fn find_by_id(&self, dynasty_id: &str) -> DomainResult<Option<Dynasty>>;

    async fn update(&self, dynasty: &Dynasty) -> DomainResult<()>;

    /// Deletes the dynasty and cascades to every child row.
    async fn delete(&self, dynasty_id: &str) -> DomainResult<()>;
}

#[async_trait]
pub trait DynastyStateRepository: Send + Sync {
    /// Upserts the cursor row for `(dynasty, season)`. Returns the
    /// existing row unchanged when one is already present, so reloads are
    /// safe.
    async fn initialize(&self, state: &DynastyState) -> DomainResult<DynastyState>;

    /// Loads the cursor, failing `StateMissing` when absent.
    async fn load(&self, dynasty_id: &str, season: i32) -> DomainResult<DynastyState>;

    async fn find(&self, dynasty_id: &str, season: i32) -> DomainResult<Option<DynastyState>>;

    /// Writes the cursor fields (date, phase, week).
    async fn update(&self, state: &DynastyState) -> DomainResult<()>;
}
