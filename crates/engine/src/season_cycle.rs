use std::sync::Arc;

use domain::errors::{DomainError, DomainResult};
use domain::models::{
    league_year_window, BracketSet, Conference, Division, Dynasty, DynastyState, GameClass,
    GameType, League, Phase, SeasonType, SimDate, Standing,
};
use domain::services::schedule::REGULAR_SEASON_GAMES;
use domain::services::seeder::{PlayoffSeeder, SeederInputs};
use domain::services::{GameSimulator, InstantSimulator};

use crate::boundary::PhaseBoundaryDetector;
use crate::config::EngineConfig;
use crate::context::Repositories;
use crate::handlers::{DayResult, PhaseHandler};
use crate::offseason::OffseasonController;
use crate::playoffs::PlayoffController;
use crate::preseason::PreseasonController;
use crate::regular_season::RegularSeasonController;
use crate::transactions::{NoopProposalSource, ProposalSource, TransactionService};

/// The controller for the current phase. Only the active phase's
/// controller is ever instantiated.
enum ActiveHandler {
    Preseason(PreseasonController),
    Regular(RegularSeasonController),
    Playoffs(PlayoffController),
    Offseason(OffseasonController),
}

impl ActiveHandler {
    fn as_handler(&mut self) -> &mut dyn PhaseHandler {
        match self {
            ActiveHandler::Preseason(c) => c,
            ActiveHandler::Regular(c) => c,
            ActiveHandler::Playoffs(c) => c,
            ActiveHandler::Offseason(c) => c,
        }
    }
}

/// Top-level orchestrator: routes `advance_day` to the phase handler,
/// runs the daily transaction loop during the regular season, and drives
/// guarded, idempotent phase transitions.
pub struct SeasonCycleController {
    config: EngineConfig,
    repos: Repositories,
    league: Arc<League>,
    simulator: Arc<dyn GameSimulator>,
    proposal_source: Arc<dyn ProposalSource>,
    dynasty_id: String,
    season: i32,
    state: DynastyState,
    boundary: PhaseBoundaryDetector,
    handler: Option<ActiveHandler>,
    transactions: Option<TransactionService>,
}

impl SeasonCycleController {
    /// Opens (or creates) a dynasty save in the given database and wires
    /// the default league, instant simulator, and idle AI manager.
    pub async fn new(
        database_url: &str,
        dynasty_id: &str,
        season: i32,
    ) -> DomainResult<Self> {
        let pool = db::create_pool(database_url)
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;
        db::migrate(&pool).await.map_err(DomainError::from)?;
        let repos = Repositories::sqlite(pool);
        let config = EngineConfig {
            database_url: database_url.to_string(),
            ..EngineConfig::default()
        };
        let start_date = config.season_start(season);
        Self::with_repositories(
            config,
            repos,
            Arc::new(League::nfl()),
            Arc::new(InstantSimulator::new()),
            Arc::new(NoopProposalSource),
            dynasty_id,
            season,
            start_date,
        )
        .await
    }

    /// Dependency-injected constructor used by drivers and tests.
    #[allow(clippy::too_many_arguments)]
    pub async fn with_repositories(
        config: EngineConfig,
        repos: Repositories,
        league: Arc<League>,
        simulator: Arc<dyn GameSimulator>,
        proposal_source: Arc<dyn ProposalSource>,
        dynasty_id: &str,
        season: i32,
        start_date: SimDate,
    ) -> DomainResult<Self> {
        if dynasty_id.trim().is_empty() {
            return Err(DomainError::ConfigurationError(
                "Dynasty id cannot be empty".to_string(),
            ));
        }

        if repos.dynasties.find_by_id(dynasty_id).await?.is_none() {
            repos
                .dynasties
                .create(&Dynasty::new(dynasty_id, dynasty_id, None)?)
                .await?;
        }
        if repos.caps.cap_limit_for(season).await?.is_none() {
            repos
                .caps
                .set_cap_limit(season, config.default_cap_limit)
                .await?;
        }

        // The persisted cursor is authoritative: load it before any
        // controller exists.
        let state = repos
            .states
            .initialize(&DynastyState::new(dynasty_id, season, start_date))
            .await?;
        let boundary = PhaseBoundaryDetector::new(repos.events.clone(), dynasty_id);

        Ok(Self {
            config,
            repos,
            league,
            simulator,
            proposal_source,
            dynasty_id: dynasty_id.to_string(),
            season,
            state,
            boundary,
            handler: None,
            transactions: None,
        })
    }

    pub fn current_phase(&self) -> Phase {
        self.state.current_phase
    }

    pub fn current_date(&self) -> SimDate {
        self.state.current_date
    }

    pub fn season(&self) -> i32 {
        self.season
    }

    /// Simulates one day: phase handler, transaction loop, transition
    /// check.
    pub async fn advance_day(&mut self) -> DomainResult<DayResult> {
        self.ensure_handler().await?;
        let mut result = self
            .handler
            .as_mut()
            .expect("handler ensured")
            .as_handler()
            .advance_day()
            .await?;

        self.state = self.repos.states.load(&self.dynasty_id, self.season).await?;

        if self.state.current_phase == Phase::RegularSeason {
            // Transactions belong to the day just simulated, before the
            // cursor moved.
            let simulated_day = result.current_date.add_days(-1);
            let transactions = self.transaction_service();
            result.transactions_executed = transactions
                .run_daily(Phase::RegularSeason, result.current_week, simulated_day)
                .await?;
        }

        if let Some(next) = self.check_phase_transition().await? {
            result.phase_transition = Some(next);
            result.current_phase = next;
        }
        Ok(result)
    }

    /// Convenience driver: seven day-advances.
    pub async fn advance_week(&mut self) -> DomainResult<Vec<DayResult>> {
        let mut results = Vec::with_capacity(7);
        for _ in 0..7 {
            results.push(self.advance_day().await?);
        }
        Ok(results)
    }

    pub async fn get_current_standings(
        &self,
        conference: Option<Conference>,
        division: Option<Division>,
    ) -> DomainResult<Vec<Standing>> {
        let standings = self
            .repos
            .standings
            .list(&self.dynasty_id, self.season, SeasonType::RegularSeason)
            .await?;
        let mut filtered = Vec::with_capacity(standings.len());
        for standing in standings {
            let team = self.league.team(&standing.team_id)?;
            if conference.map(|c| team.conference == c).unwrap_or(true)
                && division.map(|d| team.division == d).unwrap_or(true)
            {
                filtered.push(standing);
            }
        }
        Ok(filtered)
    }

    /// Current bracket structures when the cycle is in the playoffs.
    pub fn get_playoff_bracket(&self) -> Option<&BracketSet> {
        match &self.handler {
            Some(ActiveHandler::Playoffs(playoffs)) => Some(playoffs.brackets()),
            _ => None,
        }
    }

    pub fn playoff_controller(&self) -> Option<&PlayoffController> {
        match &self.handler {
            Some(ActiveHandler::Playoffs(playoffs)) => Some(playoffs),
            _ => None,
        }
    }

    fn transaction_service(&mut self) -> &TransactionService {
        if self.transactions.is_none() {
            self.transactions = Some(TransactionService::new(
                self.repos.clone(),
                self.league.clone(),
                &self.dynasty_id,
                self.season,
                self.proposal_source.clone(),
                self.config.default_cap_limit,
            ));
        }
        self.transactions.as_ref().expect("just constructed")
    }

    /// Builds the controller for the persisted phase. Controllers for
    /// other phases are never constructed.
    async fn ensure_handler(&mut self) -> DomainResult<()> {
        if self.handler.is_some() {
            return Ok(());
        }
        self.warn_on_reload_mismatch().await?;
        let handler = match self.state.current_phase {
            Phase::Preseason => ActiveHandler::Preseason(
                PreseasonController::new(
                    self.repos.clone(),
                    self.league.clone(),
                    self.simulator.clone(),
                    &self.dynasty_id,
                    self.season,
                    self.state.current_date,
                    self.config.preseason_weeks,
                )
                .await?,
            ),
            Phase::RegularSeason => ActiveHandler::Regular(
                RegularSeasonController::new(
                    self.repos.clone(),
                    self.league.clone(),
                    self.simulator.clone(),
                    &self.dynasty_id,
                    self.season,
                    self.state.current_date,
                )
                .await?,
            ),
            Phase::Playoffs => {
                let wild_card_start = match self
                    .boundary
                    .first_game_date(GameClass::Playoff, self.season)
                    .await?
                {
                    Some(date) => date,
                    None => self
                        .boundary
                        .playoff_start_date(self.season)
                        .await?
                        .ok_or_else(|| {
                            DomainError::StateCorruption(format!(
                                "Dynasty {} is in the playoffs with no schedulable date",
                                self.dynasty_id
                            ))
                        })?,
                };
                ActiveHandler::Playoffs(
                    PlayoffController::new(
                        self.repos.clone(),
                        self.league.clone(),
                        self.simulator.clone(),
                        &self.dynasty_id,
                        self.season,
                        wild_card_start,
                        None,
                    )
                    .await?,
                )
            }
            Phase::Offseason => ActiveHandler::Offseason(
                OffseasonController::new(
                    self.repos.clone(),
                    self.league.clone(),
                    &self.dynasty_id,
                    self.season,
                    self.state.current_date,
                    self.config.default_cap_limit,
                )
                .await?,
            ),
        };
        self.handler = Some(handler);
        Ok(())
    }

    /// Game-event count for one class, scoped to this season's league
    /// year.
    async fn count_class(&self, class: GameClass, executed_only: bool) -> DomainResult<i64> {
        let (window_start, window_end) = league_year_window(self.season);
        self.repos
            .events
            .count_games(
                &self.dynasty_id,
                class,
                executed_only,
                Some(window_start),
                Some(window_end),
            )
            .await
    }

    /// Dynasty State is authoritative on reload. When the event data
    /// clearly disagrees, log and honor the persisted phase anyway.
    async fn warn_on_reload_mismatch(&mut self) -> DomainResult<()> {
        if self.state.current_phase == Phase::RegularSeason {
            let executed = self.count_class(GameClass::RegularSeason, true).await?;
            if executed as usize >= REGULAR_SEASON_GAMES {
                tracing::warn!(
                    dynasty_id = %self.dynasty_id,
                    "Persisted phase is regular_season but all games are played; honoring persisted phase"
                );
            }
        }
        Ok(())
    }

    async fn check_phase_transition(&mut self) -> DomainResult<Option<Phase>> {
        match self.state.current_phase {
            Phase::Preseason => {
                let last = self
                    .boundary
                    .last_game_date(GameClass::Preseason, self.season)
                    .await?;
                let expected = self.count_class(GameClass::Preseason, false).await?;
                let played = self.count_class(GameClass::Preseason, true).await?;
                let past_finale = last
                    .map(|date| self.state.current_date >= date)
                    .unwrap_or(true);
                if past_finale && played == expected {
                    self.transition_to_regular_season().await?;
                    return Ok(Some(Phase::RegularSeason));
                }
            }
            Phase::RegularSeason => {
                let played = self.count_class(GameClass::RegularSeason, true).await?;
                let last = self
                    .boundary
                    .last_game_date(GameClass::RegularSeason, self.season)
                    .await?;
                let past_finale = last
                    .map(|date| self.state.current_date > date)
                    .unwrap_or(false);
                if played as usize >= REGULAR_SEASON_GAMES || past_finale {
                    self.transition_to_playoffs().await?;
                    return Ok(Some(Phase::Playoffs));
                }
            }
            Phase::Playoffs => {
                let super_bowls = self
                    .repos
                    .games
                    .list_by_type(&self.dynasty_id, self.season, GameType::SuperBowl)
                    .await?;
                if super_bowls.iter().any(|g| g.winner_id().is_some()) {
                    self.transition_to_offseason().await?;
                    return Ok(Some(Phase::Offseason));
                }
            }
            Phase::Offseason => {
                if self.state.current_date >= self.config.preseason_start(self.season + 1) {
                    self.transition_to_next_season().await?;
                    return Ok(Some(Phase::Preseason));
                }
            }
        }
        Ok(None)
    }

    async fn transition_to_regular_season(&mut self) -> DomainResult<()> {
        if self.state.current_phase == Phase::RegularSeason {
            return Ok(());
        }
        tracing::info!(dynasty_id = %self.dynasty_id, season = self.season, "Preseason complete");
        self.boundary.invalidate(Some(self.season));

        let start_date = self
            .state
            .current_date
            .max(self.config.season_start(self.season));
        let controller = RegularSeasonController::new(
            self.repos.clone(),
            self.league.clone(),
            self.simulator.clone(),
            &self.dynasty_id,
            self.season,
            start_date,
        )
        .await?;
        self.handler = Some(ActiveHandler::Regular(controller));

        self.state.transition_phase(Phase::RegularSeason)?;
        self.state.current_week = 1;
        self.repos.states.update(&self.state).await?;
        Ok(())
    }

    async fn transition_to_playoffs(&mut self) -> DomainResult<()> {
        if self.state.current_phase == Phase::Playoffs {
            return Ok(());
        }
        tracing::info!(dynasty_id = %self.dynasty_id, season = self.season, "Regular season complete, seeding playoffs");
        self.boundary.invalidate(Some(self.season));

        let standings = self
            .repos
            .standings
            .list(&self.dynasty_id, self.season, SeasonType::RegularSeason)
            .await?;
        let games = self
            .repos
            .games
            .list(&self.dynasty_id, self.season, Some(SeasonType::RegularSeason))
            .await?;
        let inputs = SeederInputs {
            league: &self.league,
            standings: &standings,
            games: &games,
        };
        let (seeding, applications) =
            PlayoffSeeder::seed(&self.dynasty_id, self.season, &inputs)?;
        self.repos
            .playoffs
            .save_seeding(&self.dynasty_id, &seeding)
            .await?;
        self.repos.playoffs.save_tiebreakers(&applications).await?;

        let wild_card_start = self
            .boundary
            .playoff_start_date(self.season)
            .await?
            .ok_or_else(|| {
                DomainError::StateCorruption(
                    "Cannot enter playoffs with no regular season games".to_string(),
                )
            })?;
        let controller = PlayoffController::new(
            self.repos.clone(),
            self.league.clone(),
            self.simulator.clone(),
            &self.dynasty_id,
            self.season,
            wild_card_start,
            Some(seeding),
        )
        .await?;
        self.handler = Some(ActiveHandler::Playoffs(controller));

        self.state.transition_phase(Phase::Playoffs)?;
        self.repos.states.update(&self.state).await?;
        Ok(())
    }

    async fn transition_to_offseason(&mut self) -> DomainResult<()> {
        if self.state.current_phase == Phase::Offseason {
            return Ok(());
        }
        tracing::info!(dynasty_id = %self.dynasty_id, season = self.season, "Super Bowl decided, entering offseason");

        // Roll the owner team's record into career totals.
        if let Some(mut dynasty) = self.repos.dynasties.find_by_id(&self.dynasty_id).await? {
            let wins_losses = match &dynasty.owner_team_id {
                Some(team_id) => self
                    .repos
                    .standings
                    .find(&self.dynasty_id, team_id, self.season, SeasonType::RegularSeason)
                    .await?
                    .map(|s| (s.wins, s.losses, s.ties)),
                None => None,
            };
            let (wins, losses, ties) = wins_losses.unwrap_or((0, 0, 0));
            dynasty.record_season(wins, losses, ties);
            self.repos.dynasties.update(&dynasty).await?;
        }

        let controller = OffseasonController::new(
            self.repos.clone(),
            self.league.clone(),
            &self.dynasty_id,
            self.season,
            self.state.current_date,
            self.config.default_cap_limit,
        )
        .await?;
        self.handler = Some(ActiveHandler::Offseason(controller));

        self.state.transition_phase(Phase::Offseason)?;
        self.repos.states.update(&self.state).await?;
        Ok(())
    }

    async fn transition_to_next_season(&mut self) -> DomainResult<()> {
        let next_season = self.season + 1;
        tracing::info!(
            dynasty_id = %self.dynasty_id,
            season = self.season,
            next_season,
            "League year rollover"
        );
        self.boundary.invalidate(None);

        if self.repos.caps.cap_limit_for(next_season).await?.is_none() {
            self.repos
                .caps
                .set_cap_limit(next_season, self.config.default_cap_limit)
                .await?;
        }

        let mut fresh = DynastyState::new(&self.dynasty_id, next_season, self.state.current_date)
            .with_phase(Phase::Preseason);
        fresh.current_week = 0;
        self.state = self.repos.states.initialize(&fresh).await?;
        self.season = next_season;
        self.handler = None;
        self.transactions = None;
        Ok(())
    }
}
