use std::sync::Arc;

use async_trait::async_trait;

use domain::errors::{DomainError, DomainResult};
use domain::models::{
    league_year_window, Calendar, DynastyState, EventType, GameClass, GameType, League, Phase,
    SimDate,
};
use domain::services::schedule::{self, REGULAR_SEASON_GAMES};
use domain::services::GameSimulator;

use crate::context::Repositories;
use crate::game_runner::execute_game_event;
use crate::handlers::{DayResult, PhaseHandler};

/// Owns the 18-week regular season: schedules the 272-game slate once,
/// then resolves each day's games and keeps standings current.
pub struct RegularSeasonController {
    repos: Repositories,
    league: Arc<League>,
    simulator: Arc<dyn GameSimulator>,
    dynasty_id: String,
    calendar: Calendar,
    state: DynastyState,
}

impl RegularSeasonController {
    pub async fn new(
        repos: Repositories,
        league: Arc<League>,
        simulator: Arc<dyn GameSimulator>,
        dynasty_id: &str,
        season: i32,
        start_date: SimDate,
    ) -> DomainResult<Self> {
        let mut state = repos
            .states
            .initialize(&DynastyState::new(dynasty_id, season, start_date))
            .await?;
        // The cycle controller persists phase transitions; the local copy
        // just has to write coherent cursor rows.
        state.current_phase = Phase::RegularSeason;

        let (window_start, window_end) = league_year_window(season);
        let scheduled = repos
            .events
            .count_games(
                dynasty_id,
                GameClass::RegularSeason,
                false,
                Some(window_start),
                Some(window_end),
            )
            .await?;
        if (scheduled as usize) < REGULAR_SEASON_GAMES {
            if scheduled > 0 {
                tracing::warn!(
                    dynasty_id,
                    scheduled,
                    "Partial regular season schedule found, topping up"
                );
            } else {
                tracing::info!(dynasty_id, season, "Generating regular season schedule");
            }
            let events =
                schedule::generate_regular_season(dynasty_id, season, start_date, &league)?;
            for event in events {
                match repos.events.insert(&event).await {
                    Ok(_) => {}
                    Err(DomainError::DuplicateGameId(key)) => {
                        tracing::debug!("Schedule event already present: {}", key);
                    }
                    Err(e) => return Err(e),
                }
            }
        } else {
            tracing::debug!(dynasty_id, season, "Regular season schedule already present");
        }

        let calendar = Calendar::new(state.current_date);
        Ok(Self {
            repos,
            league,
            simulator,
            dynasty_id: dynasty_id.to_string(),
            calendar,
            state,
        })
    }

    pub fn state(&self) -> &DynastyState {
        &self.state
    }
}

#[async_trait]
impl PhaseHandler for RegularSeasonController {
    fn phase(&self) -> Phase {
        Phase::RegularSeason
    }

    async fn advance_day(&mut self) -> DomainResult<DayResult> {
        let today = self.calendar.current_date();
        let events = self.repos.events.list_on_date(&self.dynasty_id, today).await?;

        let mut games_played = 0;
        let mut week = self.state.current_week;
        for mut event in events {
            if event.event_type != EventType::Game
                || event.game_class() != Some(GameClass::RegularSeason)
                || event.is_executed()
            {
                continue;
            }
            let params = event.game_params()?;
            execute_game_event(
                &self.repos,
                &self.league,
                self.simulator.as_ref(),
                &mut event,
                GameType::Regular,
                true,
            )
            .await?;
            games_played += 1;
            week = params.week;
        }

        // The calendar advances exactly once, after every game of the day
        // has been persisted. An error above leaves the cursor untouched.
        self.calendar.advance(1);
        self.state.advance_to(self.calendar.current_date())?;
        self.state.current_week = week;
        self.repos.states.update(&self.state).await?;

        Ok(DayResult {
            games_played,
            transactions_executed: 0,
            current_phase: Phase::RegularSeason,
            current_date: self.state.current_date,
            current_week: week,
            phase_transition: None,
        })
    }
}
