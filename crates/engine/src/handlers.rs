use async_trait::async_trait;
use serde::Serialize;

use domain::errors::DomainResult;
use domain::models::{Phase, SimDate};

/// What one day of simulation produced. `current_date` is the cursor
/// after the single calendar advance.
#[derive(Debug, Clone, Serialize)]
pub struct DayResult {
    pub games_played: usize,
    pub transactions_executed: usize,
    pub current_phase: Phase,
    pub current_date: SimDate,
    pub current_week: i32,
    pub phase_transition: Option<Phase>,
}

/// One handler per phase. A handler executes everything scheduled for
/// the current date, persists results, advances the calendar exactly
/// once, and persists the cursor before returning.
#[async_trait]
pub trait PhaseHandler: Send {
    fn phase(&self) -> Phase;

    async fn advance_day(&mut self) -> DomainResult<DayResult>;
}
