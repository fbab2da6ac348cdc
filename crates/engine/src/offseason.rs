use std::sync::Arc;

use async_trait::async_trait;

use domain::errors::DomainResult;
use domain::models::{Calendar, DynastyState, EventType, League, Phase, SimDate};

use crate::context::Repositories;
use crate::handlers::{DayResult, PhaseHandler};
use crate::transactions::{NoopProposalSource, TransactionService};

/// Offseason handler: no games, but scheduled transaction events (draft
/// picks, signings, tags) execute on their dates through the same
/// validation path the in-season loop uses.
pub struct OffseasonController {
    repos: Repositories,
    dynasty_id: String,
    calendar: Calendar,
    state: DynastyState,
    transactions: TransactionService,
}

impl OffseasonController {
    pub async fn new(
        repos: Repositories,
        league: Arc<League>,
        dynasty_id: &str,
        season: i32,
        start_date: SimDate,
        default_cap_limit: i64,
    ) -> DomainResult<Self> {
        let state = repos
            .states
            .initialize(
                &DynastyState::new(dynasty_id, season, start_date).with_phase(Phase::Offseason),
            )
            .await?;
        let mut local_state = state.clone();
        local_state.current_phase = Phase::Offseason;

        let transactions = TransactionService::new(
            repos.clone(),
            league,
            dynasty_id,
            season,
            Arc::new(NoopProposalSource),
            default_cap_limit,
        );

        let calendar = Calendar::new(local_state.current_date);
        Ok(Self {
            repos,
            dynasty_id: dynasty_id.to_string(),
            calendar,
            state: local_state,
            transactions,
        })
    }
}

#[async_trait]
impl PhaseHandler for OffseasonController {
    fn phase(&self) -> Phase {
        Phase::Offseason
    }

    async fn advance_day(&mut self) -> DomainResult<DayResult> {
        let today = self.calendar.current_date();
        let events = self.repos.events.list_on_date(&self.dynasty_id, today).await?;

        let mut transactions_executed = 0;
        for mut event in events {
            if event.event_type == EventType::Game || event.is_executed() {
                continue;
            }
            let executed = self
                .transactions
                .execute_scheduled_event(&mut event, Phase::Offseason, 0, today)
                .await?;
            if executed {
                transactions_executed += 1;
            }
        }

        self.calendar.advance(1);
        self.state.advance_to(self.calendar.current_date())?;
        self.state.current_week = 0;
        self.repos.states.update(&self.state).await?;

        Ok(DayResult {
            games_played: 0,
            transactions_executed,
            current_phase: Phase::Offseason,
            current_date: self.state.current_date,
            current_week: 0,
            phase_transition: None,
        })
    }
}
