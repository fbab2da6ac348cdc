use std::collections::HashMap;
use std::sync::Arc;

use domain::errors::DomainResult;
use domain::models::{league_year_window, GameClass, Phase, SimDate};
use domain::repositories::EventRepository;

/// Days between the last regular-season game and the wild card weekend,
/// before snapping to Saturday.
const PLAYOFF_GAP_DAYS: i64 = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum BoundaryOp {
    First,
    Last,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CacheKey {
    op: BoundaryOp,
    class: GameClass,
    season: i32,
}

/// Cached facade over the event store for phase boundary dates. Every
/// lookup is scoped to one dynasty and one league year.
pub struct PhaseBoundaryDetector {
    events: Arc<dyn EventRepository>,
    dynasty_id: String,
    cache: HashMap<CacheKey, Option<SimDate>>,
}

impl PhaseBoundaryDetector {
    pub fn new(events: Arc<dyn EventRepository>, dynasty_id: &str) -> Self {
        Self {
            events,
            dynasty_id: dynasty_id.to_string(),
            cache: HashMap::new(),
        }
    }

    pub async fn first_game_date(
        &mut self,
        class: GameClass,
        season: i32,
    ) -> DomainResult<Option<SimDate>> {
        self.lookup(BoundaryOp::First, class, season).await
    }

    pub async fn last_game_date(
        &mut self,
        class: GameClass,
        season: i32,
    ) -> DomainResult<Option<SimDate>> {
        self.lookup(BoundaryOp::Last, class, season).await
    }

    /// Wild Card Saturday: the last regular-season game date plus two
    /// weeks, adjusted to the following Saturday.
    pub async fn playoff_start_date(&mut self, season: i32) -> DomainResult<Option<SimDate>> {
        let last = self
            .last_game_date(GameClass::RegularSeason, season)
            .await?;
        Ok(last.map(|d| d.add_days(PLAYOFF_GAP_DAYS).following_saturday()))
    }

    /// The last game date of the phase itself. Not "the day before the
    /// next phase's first game": that heuristic drops games played on the
    /// boundary day.
    pub async fn phase_end_date(
        &mut self,
        phase: Phase,
        season: i32,
    ) -> DomainResult<Option<SimDate>> {
        let class = match phase {
            Phase::Preseason => GameClass::Preseason,
            Phase::RegularSeason => GameClass::RegularSeason,
            Phase::Playoffs => GameClass::Playoff,
            Phase::Offseason => return Ok(None),
        };
        self.last_game_date(class, season).await
    }

    /// Drops cached entries, for one season or all of them. Called on any
    /// season advance.
    pub fn invalidate(&mut self, season: Option<i32>) {
        match season {
            Some(season) => self.cache.retain(|key, _| key.season != season),
            None => self.cache.clear(),
        }
    }

    async fn lookup(
        &mut self,
        op: BoundaryOp,
        class: GameClass,
        season: i32,
    ) -> DomainResult<Option<SimDate>> {
        let key = CacheKey { op, class, season };
        if let Some(cached) = self.cache.get(&key) {
            return Ok(*cached);
        }
        let (window_start, window_end) = league_year_window(season);
        let value = match op {
            BoundaryOp::First => {
                self.events
                    .first_game_date(
                        &self.dynasty_id,
                        class,
                        Some(window_start),
                        Some(window_end),
                    )
                    .await?
            }
            BoundaryOp::Last => {
                self.events
                    .last_game_date(
                        &self.dynasty_id,
                        class,
                        Some(window_start),
                        Some(window_end),
                    )
                    .await?
            }
        };
        self.cache.insert(key, value);
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::{EventType, LeagueEvent};
    use mockall::mock;
    use mockall::predicate::*;
    use uuid::Uuid;

    mock! {
        Events {}
        #[async_trait::async_trait]
        impl EventRepository for Events {
            async fn insert(&self, event: &LeagueEvent) -> DomainResult<Uuid>;
            async fn update(&self, event: &LeagueEvent) -> DomainResult<()>;
            async fn find_by_id(&self, event_id: Uuid) -> DomainResult<Option<LeagueEvent>>;
            async fn find_by_game_id(&self, game_id: &str, dynasty_id: &str) -> DomainResult<Option<LeagueEvent>>;
            async fn list_by_dynasty(&self, dynasty_id: &str, event_type: Option<EventType>) -> DomainResult<Vec<LeagueEvent>>;
            async fn list_on_date(&self, dynasty_id: &str, date: SimDate) -> DomainResult<Vec<LeagueEvent>>;
            async fn first_game_date(&self, dynasty_id: &str, class: GameClass, after: Option<SimDate>, before: Option<SimDate>) -> DomainResult<Option<SimDate>>;
            async fn last_game_date(&self, dynasty_id: &str, class: GameClass, after: Option<SimDate>, before: Option<SimDate>) -> DomainResult<Option<SimDate>>;
            async fn count_games(&self, dynasty_id: &str, class: GameClass, executed_only: bool, after: Option<SimDate>, before: Option<SimDate>) -> DomainResult<i64>;
        }
    }

    #[tokio::test]
    async fn test_lookup_is_cached_until_invalidated() {
        let finale = SimDate::new(2026, 1, 4).unwrap();
        let mut events = MockEvents::new();
        // Two live lookups total: the initial miss and the one after
        // invalidation. Everything else must come from the cache.
        events
            .expect_last_game_date()
            .with(eq("d1"), eq(GameClass::RegularSeason), always(), always())
            .times(2)
            .returning(move |_, _, _, _| Ok(Some(finale)));

        let mut detector = PhaseBoundaryDetector::new(Arc::new(events), "d1");

        let first = detector
            .last_game_date(GameClass::RegularSeason, 2025)
            .await
            .unwrap();
        let cached = detector
            .last_game_date(GameClass::RegularSeason, 2025)
            .await
            .unwrap();
        assert_eq!(first, Some(finale));
        assert_eq!(cached, Some(finale));

        // Invalidating another season leaves this one cached.
        detector.invalidate(Some(2024));
        detector
            .last_game_date(GameClass::RegularSeason, 2025)
            .await
            .unwrap();

        detector.invalidate(Some(2025));
        detector
            .last_game_date(GameClass::RegularSeason, 2025)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_playoff_start_snaps_to_saturday() {
        // Last regular-season game Sunday 2026-01-04; +14 days lands on
        // Sunday the 18th, snapping forward to Saturday the 24th.
        let finale = SimDate::new(2026, 1, 4).unwrap();
        let mut events = MockEvents::new();
        events
            .expect_last_game_date()
            .returning(move |_, _, _, _| Ok(Some(finale)));
        let mut detector = PhaseBoundaryDetector::new(Arc::new(events), "d1");

        let start = detector.playoff_start_date(2025).await.unwrap().unwrap();
        assert_eq!(start, SimDate::new(2026, 1, 24).unwrap());
        assert_eq!(start.weekday(), chrono::Weekday::Sat);
    }

    #[tokio::test]
    async fn test_playoff_start_without_games_is_none() {
        let mut events = MockEvents::new();
        events
            .expect_last_game_date()
            .returning(|_, _, _, _| Ok(None));
        let mut detector = PhaseBoundaryDetector::new(Arc::new(events), "d1");
        assert_eq!(detector.playoff_start_date(2025).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_phase_end_date_for_offseason_is_none() {
        let events = MockEvents::new();
        let mut detector = PhaseBoundaryDetector::new(Arc::new(events), "d1");
        assert_eq!(
            detector.phase_end_date(Phase::Offseason, 2025).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_lookups_are_windowed_to_the_league_year() {
        let mut events = MockEvents::new();
        let (window_start, window_end) = league_year_window(2025);
        events
            .expect_first_game_date()
            .with(
                eq("d1"),
                eq(GameClass::Playoff),
                eq(Some(window_start)),
                eq(Some(window_end)),
            )
            .times(1)
            .returning(|_, _, _, _| Ok(None));
        let mut detector = PhaseBoundaryDetector::new(Arc::new(events), "d1");
        assert_eq!(
            detector.first_game_date(GameClass::Playoff, 2025).await.unwrap(),
            None
        );
    }
}
