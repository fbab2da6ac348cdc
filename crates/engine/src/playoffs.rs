use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use domain::errors::{DomainError, DomainResult};
use domain::models::{
    parse_playoff_game_id, playoff_game_id, BracketSet, Calendar, DynastyState, EventType, Game,
    GameClass, GameParams, GameResult, GameType, League, LeagueEvent, LeagueSeeding, Phase,
    PlayoffRound, RoundBracket, SeasonType, SimDate, SimulationMode,
};
use domain::services::bracket::{
    generate_conference_bracket, generate_divisional_bracket, generate_super_bowl_bracket,
    generate_wild_card_bracket,
};
use domain::services::GameSimulator;

use crate::context::Repositories;
use crate::game_runner::execute_game_event;
use crate::handlers::{DayResult, PhaseHandler};

/// Owns the playoff lifecycle: schedules rounds as they unlock, and on
/// reload reconstructs completed games and bracket structures from the
/// event store instead of persisting them.
pub struct PlayoffController {
    repos: Repositories,
    league: Arc<League>,
    simulator: Arc<dyn GameSimulator>,
    dynasty_id: String,
    season: i32,
    wild_card_start: SimDate,
    calendar: Calendar,
    state: DynastyState,
    original_seeding: LeagueSeeding,
    completed_games: HashMap<PlayoffRound, Vec<Game>>,
    brackets: BracketSet,
    current_round: PlayoffRound,
    season_complete: bool,
}

impl PlayoffController {
    pub async fn new(
        repos: Repositories,
        league: Arc<League>,
        simulator: Arc<dyn GameSimulator>,
        dynasty_id: &str,
        season: i32,
        wild_card_start: SimDate,
        initial_seeding: Option<LeagueSeeding>,
    ) -> DomainResult<Self> {
        let existing: Vec<LeagueEvent> = repos
            .events
            .list_by_dynasty(dynasty_id, Some(EventType::Game))
            .await?
            .into_iter()
            .filter(|e| {
                matches!(parse_playoff_game_id(&e.game_id), Some((s, _, _)) if s == season)
            })
            .collect();

        let state = repos
            .states
            .initialize(
                &DynastyState::new(dynasty_id, season, wild_card_start)
                    .with_phase(Phase::Playoffs),
            )
            .await?;
        let mut local_state = state.clone();
        if local_state.current_phase != Phase::Playoffs {
            // The cycle controller persists the transition; keep the local
            // copy coherent for cursor writes.
            local_state.current_phase = Phase::Playoffs;
        }
        let calendar = Calendar::new(local_state.current_date.max(wild_card_start));

        let mut controller = Self {
            repos,
            league,
            simulator,
            dynasty_id: dynasty_id.to_string(),
            season,
            wild_card_start,
            calendar,
            state: local_state,
            original_seeding: LeagueSeeding {
                season,
                seeds: Vec::new(),
            },
            completed_games: HashMap::new(),
            brackets: BracketSet::default(),
            current_round: PlayoffRound::WildCard,
            season_complete: false,
        };

        if existing.is_empty() {
            let seeding = initial_seeding.ok_or_else(|| {
                DomainError::ConfigurationError(
                    "Fresh playoff construction requires initial seeding".to_string(),
                )
            })?;
            controller.original_seeding = seeding;
            let wild_card = generate_wild_card_bracket(&controller.original_seeding)?;
            controller.schedule_round(&wild_card).await?;
            controller.brackets.set(wild_card);
            tracing::info!(dynasty_id, season, "Scheduled wild card round");
        } else {
            controller.original_seeding = match initial_seeding {
                Some(seeding) => seeding,
                None => controller
                    .repos
                    .playoffs
                    .load_seeding(dynasty_id, season)
                    .await?
                    .ok_or_else(|| {
                        DomainError::StateCorruption(format!(
                            "Playoff events exist for ({}, {}) but no seeding is available",
                            dynasty_id, season
                        ))
                    })?,
            };
            controller.reconstruct_results(&existing)?;
            controller.rebuild_bracket_structures()?;
            controller.determine_current_round()?;
            tracing::info!(
                dynasty_id,
                season,
                current_round = %controller.current_round,
                "Reconstructed playoff state from {} events",
                existing.len()
            );
        }

        Ok(controller)
    }

    pub fn current_round(&self) -> PlayoffRound {
        self.current_round
    }

    pub fn brackets(&self) -> &BracketSet {
        &self.brackets
    }

    pub fn completed_games(&self, round: PlayoffRound) -> &[Game] {
        self.completed_games
            .get(&round)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_season_complete(&self) -> bool {
        self.season_complete
    }

    pub fn original_seeding(&self) -> &LeagueSeeding {
        &self.original_seeding
    }

    fn round_complete(&self, round: PlayoffRound) -> bool {
        self.completed_games(round).len() == round.expected_games()
    }

    /// Winners of a completed round, mapped back through the original
    /// seeding by the bracket generators.
    fn round_winners(&self, round: PlayoffRound) -> DomainResult<Vec<String>> {
        self.completed_games(round)
            .iter()
            .map(|game| {
                game.winner_id().map(str::to_string).ok_or_else(|| {
                    DomainError::StateCorruption(format!(
                        "Playoff game {} has no winner",
                        game.game_id
                    ))
                })
            })
            .collect()
    }

    /// Rebuilds `completed_games` from persisted event results. Round
    /// assignment uses the game id pattern, never the opaque event id.
    fn reconstruct_results(&mut self, events: &[LeagueEvent]) -> DomainResult<()> {
        for event in events {
            let Some(results) = event.data.results.clone() else {
                continue;
            };
            let (_, round, _) = parse_playoff_game_id(&event.game_id).ok_or_else(|| {
                DomainError::StateCorruption(format!(
                    "Unparseable playoff game id: {}",
                    event.game_id
                ))
            })?;
            let params = event.game_params()?;
            let result: GameResult = serde_json::from_value(results).map_err(|e| {
                DomainError::StateCorruption(format!(
                    "Playoff event {} has malformed results: {}",
                    event.game_id, e
                ))
            })?;
            let game = Game::from_result(
                &event.game_id,
                &event.dynasty_id,
                self.season,
                round.week(),
                GameType::from(round),
                &params.home_team_id,
                &params.away_team_id,
                &result,
            )?;
            self.completed_games.entry(round).or_default().push(game);
        }
        for games in self.completed_games.values_mut() {
            games.sort_by(|a, b| a.game_id.cmp(&b.game_id));
        }
        Ok(())
    }

    /// Regenerates bracket structures for UI consumption via the pure
    /// generators. Rounds beyond the wild card rebuild only once the
    /// preceding round is fully complete.
    fn rebuild_bracket_structures(&mut self) -> DomainResult<()> {
        self.brackets
            .set(generate_wild_card_bracket(&self.original_seeding)?);
        if !self.round_complete(PlayoffRound::WildCard) {
            return Ok(());
        }
        let wc_winners = self.round_winners(PlayoffRound::WildCard)?;
        self.brackets
            .set(generate_divisional_bracket(&self.original_seeding, &wc_winners)?);
        if !self.round_complete(PlayoffRound::Divisional) {
            return Ok(());
        }
        let div_winners = self.round_winners(PlayoffRound::Divisional)?;
        self.brackets
            .set(generate_conference_bracket(&self.original_seeding, &div_winners)?);
        if !self.round_complete(PlayoffRound::Conference) {
            return Ok(());
        }
        let conf_winners = self.round_winners(PlayoffRound::Conference)?;
        self.brackets
            .set(generate_super_bowl_bracket(&self.original_seeding, &conf_winners)?);
        Ok(())
    }

    /// The earliest round with fewer completed games than expected. A
    /// later round carrying completions while an earlier one is open is
    /// corrupt state; fail loud rather than guess.
    fn determine_current_round(&mut self) -> DomainResult<()> {
        for round in PlayoffRound::all() {
            let done = self.completed_games(round).len();
            if done > round.expected_games() {
                return Err(DomainError::StateCorruption(format!(
                    "Round {} has {} completed games, expected at most {}",
                    round,
                    done,
                    round.expected_games()
                )));
            }
            if done < round.expected_games() {
                if let Some(next) = round.next() {
                    let mut later = Some(next);
                    while let Some(check) = later {
                        if !self.completed_games(check).is_empty() {
                            return Err(DomainError::StateCorruption(format!(
                                "Round {} has completions while {} is incomplete",
                                check, round
                            )));
                        }
                        later = check.next();
                    }
                }
                self.current_round = round;
                return Ok(());
            }
        }
        self.current_round = PlayoffRound::SuperBowl;
        self.season_complete = true;
        Ok(())
    }

    /// Creates the GAME events for one bracket. Existing `(game_id,
    /// dynasty_id)` rows are skipped as idempotent reuse.
    async fn schedule_round(&self, bracket: &RoundBracket) -> DomainResult<usize> {
        let round = bracket.round;
        let start = self.wild_card_start.add_days(round.start_offset_days());
        let mut created = 0;
        for (i, matchup) in bracket.matchups.iter().enumerate() {
            let date = Self::round_game_date(round, start, i);
            let params = GameParams {
                away_team_id: matchup.away_team_id.clone(),
                home_team_id: matchup.home_team_id.clone(),
                week: round.week(),
                season: self.season,
                season_type: SeasonType::Playoffs,
                mode: SimulationMode::Instant,
            };
            let game_id = playoff_game_id(self.season, round, i + 1);
            let event = LeagueEvent::game(&self.dynasty_id, &game_id, date, &params)?;
            match self.repos.events.insert(&event).await {
                Ok(_) => created += 1,
                Err(DomainError::DuplicateGameId(key)) => {
                    tracing::debug!("Playoff event already scheduled: {}", key);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(created)
    }

    /// Saturday/Sunday split within a round weekend.
    fn round_game_date(round: PlayoffRound, start: SimDate, index: usize) -> SimDate {
        match round {
            PlayoffRound::WildCard => {
                if index < 3 {
                    start
                } else {
                    start.add_days(1)
                }
            }
            PlayoffRound::Divisional => {
                if index < 2 {
                    start
                } else {
                    start.add_days(1)
                }
            }
            PlayoffRound::Conference | PlayoffRound::SuperBowl => start.add_days(1),
        }
    }

    /// After a round completes, generate the next bracket from winners
    /// and schedule it.
    async fn unlock_completed_rounds(&mut self) -> DomainResult<()> {
        while self.round_complete(self.current_round) {
            let Some(next) = self.current_round.next() else {
                self.season_complete = true;
                tracing::info!(dynasty_id = %self.dynasty_id, "Super Bowl decided");
                break;
            };
            if self.brackets.get(next).is_none() {
                let winners = self.round_winners(self.current_round)?;
                let bracket = match next {
                    PlayoffRound::Divisional => {
                        generate_divisional_bracket(&self.original_seeding, &winners)?
                    }
                    PlayoffRound::Conference => {
                        generate_conference_bracket(&self.original_seeding, &winners)?
                    }
                    PlayoffRound::SuperBowl => {
                        generate_super_bowl_bracket(&self.original_seeding, &winners)?
                    }
                    PlayoffRound::WildCard => unreachable!("wild card has no predecessor"),
                };
                self.schedule_round(&bracket).await?;
                self.brackets.set(bracket);
                tracing::info!(round = %next, "Scheduled next playoff round");
            }
            self.current_round = next;
        }
        Ok(())
    }
}

#[async_trait]
impl PhaseHandler for PlayoffController {
    fn phase(&self) -> Phase {
        Phase::Playoffs
    }

    async fn advance_day(&mut self) -> DomainResult<DayResult> {
        let today = self.calendar.current_date();
        let events = self.repos.events.list_on_date(&self.dynasty_id, today).await?;

        let mut games_played = 0;
        for mut event in events {
            if event.event_type != EventType::Game || event.is_executed() {
                continue;
            }
            let Some((season, round, _)) = parse_playoff_game_id(&event.game_id) else {
                continue;
            };
            if season != self.season {
                continue;
            }
            if event.game_class() != Some(GameClass::Playoff) {
                continue;
            }
            let game = execute_game_event(
                &self.repos,
                &self.league,
                self.simulator.as_ref(),
                &mut event,
                GameType::from(round),
                true,
            )
            .await?;
            self.completed_games.entry(round).or_default().push(game);
            games_played += 1;
        }

        if games_played > 0 {
            self.unlock_completed_rounds().await?;
        }

        self.calendar.advance(1);
        self.state.advance_to(self.calendar.current_date())?;
        self.state.current_week = self.current_round.week();
        self.repos.states.update(&self.state).await?;

        Ok(DayResult {
            games_played,
            transactions_executed: 0,
            current_phase: Phase::Playoffs,
            current_date: self.state.current_date,
            current_week: self.state.current_week,
            phase_transition: None,
        })
    }
}
