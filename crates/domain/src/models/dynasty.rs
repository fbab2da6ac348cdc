use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, DomainResult};
use super::date::SimDate;

/// A persistent franchise save. Root of all data isolation: every
/// persistent row carries this dynasty's id, and deletion cascades.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dynasty {
    pub dynasty_id: String,
    pub dynasty_name: String,
    pub owner_team_id: Option<String>,
    pub career_wins: i32,
    pub career_losses: i32,
    pub career_ties: i32,
    pub seasons_played: i32,
    pub created_at: DateTime<Utc>,
}

impl Dynasty {
    pub fn new(
        dynasty_id: &str,
        dynasty_name: &str,
        owner_team_id: Option<String>,
    ) -> DomainResult<Self> {
        if dynasty_id.trim().is_empty() {
            return Err(DomainError::ConfigurationError(
                "Dynasty id cannot be empty".to_string(),
            ));
        }
        if dynasty_name.trim().is_empty() {
            return Err(DomainError::ConfigurationError(
                "Dynasty name cannot be empty".to_string(),
            ));
        }
        Ok(Self {
            dynasty_id: dynasty_id.to_string(),
            dynasty_name: dynasty_name.to_string(),
            owner_team_id,
            career_wins: 0,
            career_losses: 0,
            career_ties: 0,
            seasons_played: 0,
            created_at: Utc::now(),
        })
    }

    pub fn record_season(&mut self, wins: i32, losses: i32, ties: i32) {
        self.career_wins += wins;
        self.career_losses += losses;
        self.career_ties += ties;
        self.seasons_played += 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Preseason,
    RegularSeason,
    Playoffs,
    Offseason,
}

impl Phase {
    /// The phase that legally follows this one. Offseason wraps to the
    /// next season's preseason.
    pub fn next(&self) -> Phase {
        match self {
            Phase::Preseason => Phase::RegularSeason,
            Phase::RegularSeason => Phase::Playoffs,
            Phase::Playoffs => Phase::Offseason,
            Phase::Offseason => Phase::Preseason,
        }
    }

    pub fn can_transition_to(&self, next: Phase) -> bool {
        self.next() == next
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Preseason => write!(f, "preseason"),
            Phase::RegularSeason => write!(f, "regular_season"),
            Phase::Playoffs => write!(f, "playoffs"),
            Phase::Offseason => write!(f, "offseason"),
        }
    }
}

impl std::str::FromStr for Phase {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "preseason" => Ok(Phase::Preseason),
            "regular_season" => Ok(Phase::RegularSeason),
            "playoffs" => Ok(Phase::Playoffs),
            "offseason" => Ok(Phase::Offseason),
            _ => Err(DomainError::ValidationError(format!(
                "Invalid phase: {}",
                s
            ))),
        }
    }
}

/// The time cursor for one (dynasty, season). Written only by the season
/// cycle controller and its phase handlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynastyState {
    pub dynasty_id: String,
    pub season: i32,
    pub current_date: SimDate,
    pub current_phase: Phase,
    pub current_week: i32,
}

impl DynastyState {
    pub fn new(dynasty_id: &str, season: i32, start_date: SimDate) -> Self {
        Self {
            dynasty_id: dynasty_id.to_string(),
            season,
            current_date: start_date,
            current_phase: Phase::RegularSeason,
            current_week: 1,
        }
    }

    pub fn with_phase(mut self, phase: Phase) -> Self {
        self.current_phase = phase;
        self
    }

    /// Moves the cursor forward. The date is monotonically non-decreasing
    /// within a season.
    pub fn advance_to(&mut self, date: SimDate) -> DomainResult<()> {
        if date < self.current_date {
            return Err(DomainError::InvalidState(format!(
                "Cannot move cursor backwards: {} -> {}",
                self.current_date, date
            )));
        }
        self.current_date = date;
        Ok(())
    }

    /// Moves to the next phase, enforcing the legal order. Transitioning
    /// to the phase already current is a no-op (callers guard transitions
    /// idempotently).
    pub fn transition_phase(&mut self, next: Phase) -> DomainResult<()> {
        if next == self.current_phase {
            return Ok(());
        }
        if !self.current_phase.can_transition_to(next) {
            return Err(DomainError::InvalidState(format!(
                "Illegal phase transition: {} -> {}",
                self.current_phase, next
            )));
        }
        self.current_phase = next;
        Ok(())
    }
}
