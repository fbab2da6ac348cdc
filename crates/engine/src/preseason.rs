use std::sync::Arc;

use async_trait::async_trait;

use domain::errors::{DomainError, DomainResult};
use domain::models::{
    league_year_window, Calendar, DynastyState, EventType, GameClass, League, Phase, SimDate,
};
use domain::services::schedule::generate_preseason;
use domain::services::GameSimulator;

use crate::context::Repositories;
use crate::game_runner::execute_exhibition_event;
use crate::handlers::{DayResult, PhaseHandler};

/// Preseason handler: exhibition games cache results on their events but
/// never touch the games table or standings.
pub struct PreseasonController {
    repos: Repositories,
    simulator: Arc<dyn GameSimulator>,
    dynasty_id: String,
    calendar: Calendar,
    state: DynastyState,
}

impl PreseasonController {
    pub async fn new(
        repos: Repositories,
        league: Arc<League>,
        simulator: Arc<dyn GameSimulator>,
        dynasty_id: &str,
        season: i32,
        start_date: SimDate,
        weeks: i32,
    ) -> DomainResult<Self> {
        let state = repos
            .states
            .initialize(
                &DynastyState::new(dynasty_id, season, start_date).with_phase(Phase::Preseason),
            )
            .await?;

        let (window_start, window_end) = league_year_window(season);
        let scheduled = repos
            .events
            .count_games(
                dynasty_id,
                GameClass::Preseason,
                false,
                Some(window_start),
                Some(window_end),
            )
            .await?;
        if scheduled == 0 && weeks > 0 {
            tracing::info!(dynasty_id, season, weeks, "Generating preseason slate");
            let events = generate_preseason(dynasty_id, season, start_date, &league, weeks)?;
            for event in events {
                match repos.events.insert(&event).await {
                    Ok(_) => {}
                    Err(DomainError::DuplicateGameId(key)) => {
                        tracing::debug!("Preseason event already present: {}", key);
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        let calendar = Calendar::new(state.current_date);
        Ok(Self {
            repos,
            simulator,
            dynasty_id: dynasty_id.to_string(),
            calendar,
            state,
        })
    }
}

#[async_trait]
impl PhaseHandler for PreseasonController {
    fn phase(&self) -> Phase {
        Phase::Preseason
    }

    async fn advance_day(&mut self) -> DomainResult<DayResult> {
        let today = self.calendar.current_date();
        let events = self.repos.events.list_on_date(&self.dynasty_id, today).await?;

        let mut games_played = 0;
        let mut week = self.state.current_week;
        for mut event in events {
            if event.event_type != EventType::Game
                || event.game_class() != Some(GameClass::Preseason)
                || event.is_executed()
            {
                continue;
            }
            let params = event.game_params()?;
            execute_exhibition_event(&self.repos, self.simulator.as_ref(), &mut event).await?;
            games_played += 1;
            week = params.week;
        }

        self.calendar.advance(1);
        self.state.advance_to(self.calendar.current_date())?;
        self.state.current_week = week;
        self.repos.states.update(&self.state).await?;

        Ok(DayResult {
            games_played,
            transactions_executed: 0,
            current_phase: Phase::Preseason,
            current_date: self.state.current_date,
            current_week: week,
            phase_transition: None,
        })
    }
}
