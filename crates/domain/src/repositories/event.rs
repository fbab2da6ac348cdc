use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::DomainResult;
use crate::models::{EventType, GameClass, LeagueEvent, SimDate};

/// Dynasty-scoped persistent store of typed events. Every query filters
/// by dynasty id; a query that does not is a bug.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Inserts a new event. Fails `DuplicateGameId` when a row with the
    /// same `(dynasty_id, game_id)` already exists; callers treat that as
    /// idempotent reuse.
    async fn insert(&self, event: &LeagueEvent) -> DomainResult<Uuid>;

    /// Replaces the event's data payload (used to cache results after
    /// execution).
    async fn update(&self, event: &LeagueEvent) -> DomainResult<()>;

    async fn find_by_id(&self, event_id: Uuid) -> DomainResult<Option<LeagueEvent>>;

    async fn find_by_game_id(
        &self,
        game_id: &str,
        dynasty_id: &str,
    ) -> DomainResult<Option<LeagueEvent>>;

    /// All events for a dynasty, optionally narrowed to one type, ordered
    /// by timestamp.
    async fn list_by_dynasty(
        &self,
        dynasty_id: &str,
        event_type: Option<EventType>,
    ) -> DomainResult<Vec<LeagueEvent>>;

    /// All events whose timestamp falls on the given civil date, ordered
    /// by timestamp.
    async fn list_on_date(
        &self,
        dynasty_id: &str,
        date: SimDate,
    ) -> DomainResult<Vec<LeagueEvent>>;

    /// Earliest game date of a class inside `[after, before)`.
    async fn first_game_date(
        &self,
        dynasty_id: &str,
        class: GameClass,
        after: Option<SimDate>,
        before: Option<SimDate>,
    ) -> DomainResult<Option<SimDate>>;

    /// Latest game date of a class inside `[after, before)`.
    async fn last_game_date(
        &self,
        dynasty_id: &str,
        class: GameClass,
        after: Option<SimDate>,
        before: Option<SimDate>,
    ) -> DomainResult<Option<SimDate>>;

    /// Number of game events of a class inside `[after, before)`;
    /// `executed_only` restricts to events that already carry results.
    /// Callers scope the window to one league year so multi-season
    /// dynasties never count a prior season's games.
    async fn count_games(
        &self,
        dynasty_id: &str,
        class: GameClass,
        executed_only: bool,
        after: Option<SimDate>,
        before: Option<SimDate>,
    ) -> DomainResult<i64>;
}
