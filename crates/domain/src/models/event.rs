use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::errors::{DomainError, DomainResult};
use super::date::SimDate;
use super::game::{GameParams, PlayoffRound};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    Game,
    DraftPick,
    UfaSigning,
    FranchiseTag,
    RfaTender,
    PlayerRelease,
    Trade,
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventType::Game => write!(f, "GAME"),
            EventType::DraftPick => write!(f, "DRAFT_PICK"),
            EventType::UfaSigning => write!(f, "UFA_SIGNING"),
            EventType::FranchiseTag => write!(f, "FRANCHISE_TAG"),
            EventType::RfaTender => write!(f, "RFA_TENDER"),
            EventType::PlayerRelease => write!(f, "PLAYER_RELEASE"),
            EventType::Trade => write!(f, "TRADE"),
        }
    }
}

impl std::str::FromStr for EventType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GAME" => Ok(EventType::Game),
            "DRAFT_PICK" => Ok(EventType::DraftPick),
            "UFA_SIGNING" => Ok(EventType::UfaSigning),
            "FRANCHISE_TAG" => Ok(EventType::FranchiseTag),
            "RFA_TENDER" => Ok(EventType::RfaTender),
            "PLAYER_RELEASE" => Ok(EventType::PlayerRelease),
            "TRADE" => Ok(EventType::Trade),
            _ => Err(DomainError::ValidationError(format!(
                "Invalid event type: {}",
                s
            ))),
        }
    }
}

/// Event payload: inputs, outputs (null until executed), and free-form
/// metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventPayload {
    pub parameters: JsonValue,
    pub results: Option<JsonValue>,
    pub metadata: JsonValue,
}

impl EventPayload {
    pub fn new(parameters: JsonValue) -> Self {
        Self {
            parameters,
            results: None,
            metadata: serde_json::json!({}),
        }
    }

    pub fn with_metadata(mut self, metadata: JsonValue) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Scheduling class of a GAME event, detected from the game id prefix.
/// Prefix detection is only ever applied within a result set already
/// filtered by dynasty id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameClass {
    Preseason,
    RegularSeason,
    Playoff,
}

impl GameClass {
    pub fn of(game_id: &str) -> GameClass {
        if game_id.starts_with("playoff_") {
            GameClass::Playoff
        } else if game_id.starts_with("preseason_") {
            GameClass::Preseason
        } else {
            GameClass::RegularSeason
        }
    }

    pub fn matches(&self, game_id: &str) -> bool {
        GameClass::of(game_id) == *self
    }
}

/// Regular season: `game_{YYYYMMDD}_{away}_at_{home}`.
pub fn regular_game_id(date: SimDate, away_team_id: &str, home_team_id: &str) -> String {
    format!("game_{}_{}_at_{}", date.compact(), away_team_id, home_team_id)
}

/// Playoffs: `playoff_{season}_{round}_{n}`.
pub fn playoff_game_id(season: i32, round: PlayoffRound, n: usize) -> String {
    format!("playoff_{}_{}_{}", season, round.label(), n)
}

/// Preseason: `preseason_{season}_{week}_{n}`.
pub fn preseason_game_id(season: i32, week: i32, n: usize) -> String {
    format!("preseason_{}_{}_{}", season, week, n)
}

/// Parses `playoff_{season}_{round}_{n}`. Round detection always works on
/// the game id, never on the opaque event id.
pub fn parse_playoff_game_id(game_id: &str) -> Option<(i32, PlayoffRound, usize)> {
    let rest = game_id.strip_prefix("playoff_")?;
    let (season_str, rest) = rest.split_once('_')?;
    let season: i32 = season_str.parse().ok()?;
    let (round_str, n_str) = rest.rsplit_once('_')?;
    let round: PlayoffRound = round_str.parse().ok()?;
    let n: usize = n_str.parse().ok()?;
    Some((season, round, n))
}

/// A scheduled or executed occurrence on the timeline, uniformly stored
/// regardless of type. `(dynasty_id, game_id)` uniquely identifies a
/// scheduled occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueEvent {
    pub event_id: Uuid,
    pub event_type: EventType,
    pub timestamp_ms: i64,
    pub game_id: String,
    pub dynasty_id: String,
    pub data: EventPayload,
}

impl LeagueEvent {
    pub fn new(
        event_type: EventType,
        timestamp_ms: i64,
        game_id: &str,
        dynasty_id: &str,
        parameters: JsonValue,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            event_type,
            timestamp_ms,
            game_id: game_id.to_string(),
            dynasty_id: dynasty_id.to_string(),
            data: EventPayload::new(parameters),
        }
    }

    /// A scheduled game kicking off at the default slot on `date`.
    pub fn game(
        dynasty_id: &str,
        game_id: &str,
        date: SimDate,
        params: &GameParams,
    ) -> DomainResult<Self> {
        let parameters = serde_json::to_value(params).map_err(|e| {
            DomainError::InternalError(format!("Failed to encode game params: {}", e))
        })?;
        Ok(Self::new(
            EventType::Game,
            date.kickoff_timestamp_ms(),
            game_id,
            dynasty_id,
            parameters,
        ))
    }

    pub fn date(&self) -> SimDate {
        SimDate::from_timestamp_ms(self.timestamp_ms)
    }

    pub fn is_executed(&self) -> bool {
        self.data.results.is_some()
    }

    pub fn game_class(&self) -> Option<GameClass> {
        match self.event_type {
            EventType::Game => Some(GameClass::of(&self.game_id)),
            _ => None,
        }
    }

    pub fn game_params(&self) -> DomainResult<GameParams> {
        serde_json::from_value(self.data.parameters.clone()).map_err(|e| {
            DomainError::StateCorruption(format!(
                "Event {} has malformed game parameters: {}",
                self.game_id, e
            ))
        })
    }

    pub fn set_results(&mut self, results: JsonValue) {
        self.data.results = Some(results);
    }
}
