use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::errors::{DomainError, DomainResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonType {
    RegularSeason,
    Playoffs,
}

impl std::fmt::Display for SeasonType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeasonType::RegularSeason => write!(f, "regular_season"),
            SeasonType::Playoffs => write!(f, "playoffs"),
        }
    }
}

impl std::str::FromStr for SeasonType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "regular_season" => Ok(SeasonType::RegularSeason),
            "playoffs" => Ok(SeasonType::Playoffs),
            _ => Err(DomainError::ValidationError(format!(
                "Invalid season type: {}",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayoffRound {
    WildCard,
    Divisional,
    Conference,
    SuperBowl,
}

impl PlayoffRound {
    pub fn all() -> [PlayoffRound; 4] {
        [
            PlayoffRound::WildCard,
            PlayoffRound::Divisional,
            PlayoffRound::Conference,
            PlayoffRound::SuperBowl,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            PlayoffRound::WildCard => "wild_card",
            PlayoffRound::Divisional => "divisional",
            PlayoffRound::Conference => "conference",
            PlayoffRound::SuperBowl => "super_bowl",
        }
    }

    /// Number of games played in this round.
    pub fn expected_games(&self) -> usize {
        match self {
            PlayoffRound::WildCard => 6,
            PlayoffRound::Divisional => 4,
            PlayoffRound::Conference => 2,
            PlayoffRound::SuperBowl => 1,
        }
    }

    pub fn next(&self) -> Option<PlayoffRound> {
        match self {
            PlayoffRound::WildCard => Some(PlayoffRound::Divisional),
            PlayoffRound::Divisional => Some(PlayoffRound::Conference),
            PlayoffRound::Conference => Some(PlayoffRound::SuperBowl),
            PlayoffRound::SuperBowl => None,
        }
    }

    /// Days between the wild card weekend start and this round's start.
    /// The Super Bowl follows the conference round after two weeks.
    pub fn start_offset_days(&self) -> i64 {
        match self {
            PlayoffRound::WildCard => 0,
            PlayoffRound::Divisional => 7,
            PlayoffRound::Conference => 14,
            PlayoffRound::SuperBowl => 28,
        }
    }

    /// Schedule week number carried on playoff game parameters.
    pub fn week(&self) -> i32 {
        match self {
            PlayoffRound::WildCard => 19,
            PlayoffRound::Divisional => 20,
            PlayoffRound::Conference => 21,
            PlayoffRound::SuperBowl => 22,
        }
    }
}

impl std::fmt::Display for PlayoffRound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for PlayoffRound {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "wild_card" => Ok(PlayoffRound::WildCard),
            "divisional" => Ok(PlayoffRound::Divisional),
            "conference" => Ok(PlayoffRound::Conference),
            "super_bowl" => Ok(PlayoffRound::SuperBowl),
            _ => Err(DomainError::ValidationError(format!(
                "Invalid playoff round: {}",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameType {
    Regular,
    Wildcard,
    Divisional,
    Conference,
    SuperBowl,
}

impl GameType {
    pub fn season_type(&self) -> SeasonType {
        match self {
            GameType::Regular => SeasonType::RegularSeason,
            _ => SeasonType::Playoffs,
        }
    }
}

impl From<PlayoffRound> for GameType {
    fn from(round: PlayoffRound) -> Self {
        match round {
            PlayoffRound::WildCard => GameType::Wildcard,
            PlayoffRound::Divisional => GameType::Divisional,
            PlayoffRound::Conference => GameType::Conference,
            PlayoffRound::SuperBowl => GameType::SuperBowl,
        }
    }
}

impl std::fmt::Display for GameType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameType::Regular => write!(f, "regular"),
            GameType::Wildcard => write!(f, "wildcard"),
            GameType::Divisional => write!(f, "divisional"),
            GameType::Conference => write!(f, "conference"),
            GameType::SuperBowl => write!(f, "super_bowl"),
        }
    }
}

impl std::str::FromStr for GameType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "regular" => Ok(GameType::Regular),
            "wildcard" => Ok(GameType::Wildcard),
            "divisional" => Ok(GameType::Divisional),
            "conference" => Ok(GameType::Conference),
            "super_bowl" => Ok(GameType::SuperBowl),
            _ => Err(DomainError::ValidationError(format!(
                "Invalid game type: {}",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationMode {
    /// Full play-by-play engine (external collaborator).
    Full,
    /// Sampled plausible score, no play engine.
    Instant,
}

/// Inputs handed to the game simulator for one scheduled game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameParams {
    pub away_team_id: String,
    pub home_team_id: String,
    pub week: i32,
    pub season: i32,
    pub season_type: SeasonType,
    pub mode: SimulationMode,
}

/// Outcome produced by a game simulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameResult {
    pub home_score: i32,
    pub away_score: i32,
    pub winner_id: Option<String>,
    pub home_touchdowns: i32,
    pub away_touchdowns: i32,
    pub total_plays: i32,
    pub overtime_periods: i32,
    #[serde(default)]
    pub team_stats: JsonValue,
    #[serde(default)]
    pub player_stats: JsonValue,
}

impl GameResult {
    pub fn is_tie(&self) -> bool {
        self.home_score == self.away_score
    }
}

/// Materialized result of an executed GAME event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub game_id: String,
    pub dynasty_id: String,
    pub season: i32,
    pub week: i32,
    pub season_type: SeasonType,
    pub game_type: GameType,
    pub home_team_id: String,
    pub away_team_id: String,
    pub home_score: i32,
    pub away_score: i32,
    pub home_touchdowns: i32,
    pub away_touchdowns: i32,
    pub total_plays: i32,
    pub overtime_periods: i32,
}

impl Game {
    #[allow(clippy::too_many_arguments)]
    pub fn from_result(
        game_id: &str,
        dynasty_id: &str,
        season: i32,
        week: i32,
        game_type: GameType,
        home_team_id: &str,
        away_team_id: &str,
        result: &GameResult,
    ) -> DomainResult<Self> {
        if result.home_score < 0 || result.away_score < 0 {
            return Err(DomainError::ValidationError(format!(
                "Negative score in {}: {}-{}",
                game_id, result.away_score, result.home_score
            )));
        }
        let season_type = game_type.season_type();
        if season_type == SeasonType::Playoffs && result.is_tie() {
            return Err(DomainError::SimulationError(format!(
                "Playoff game {} ended in a tie {}-{}",
                game_id, result.away_score, result.home_score
            )));
        }
        Ok(Self {
            game_id: game_id.to_string(),
            dynasty_id: dynasty_id.to_string(),
            season,
            week,
            season_type,
            game_type,
            home_team_id: home_team_id.to_string(),
            away_team_id: away_team_id.to_string(),
            home_score: result.home_score,
            away_score: result.away_score,
            home_touchdowns: result.home_touchdowns,
            away_touchdowns: result.away_touchdowns,
            total_plays: result.total_plays,
            overtime_periods: result.overtime_periods,
        })
    }

    pub fn is_tie(&self) -> bool {
        self.home_score == self.away_score
    }

    pub fn winner_id(&self) -> Option<&str> {
        if self.home_score > self.away_score {
            Some(&self.home_team_id)
        } else if self.away_score > self.home_score {
            Some(&self.away_team_id)
        } else {
            None
        }
    }

    pub fn loser_id(&self) -> Option<&str> {
        self.winner_id().map(|winner| {
            if winner == self.home_team_id {
                self.away_team_id.as_str()
            } else {
                self.home_team_id.as_str()
            }
        })
    }

    pub fn involves(&self, team_id: &str) -> bool {
        self.home_team_id == team_id || self.away_team_id == team_id
    }

    pub fn opponent_of(&self, team_id: &str) -> Option<&str> {
        if self.home_team_id == team_id {
            Some(&self.away_team_id)
        } else if self.away_team_id == team_id {
            Some(&self.home_team_id)
        } else {
            None
        }
    }

    pub fn points_for(&self, team_id: &str) -> i32 {
        if self.home_team_id == team_id {
            self.home_score
        } else {
            self.away_score
        }
    }

    pub fn points_against(&self, team_id: &str) -> i32 {
        if self.home_team_id == team_id {
            self.away_score
        } else {
            self.home_score
        }
    }

    pub fn touchdowns_for(&self, team_id: &str) -> i32 {
        if self.home_team_id == team_id {
            self.home_touchdowns
        } else {
            self.away_touchdowns
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result(home: i32, away: i32) -> GameResult {
        GameResult {
            home_score: home,
            away_score: away,
            winner_id: None,
            home_touchdowns: home / 7,
            away_touchdowns: away / 7,
            total_plays: 140,
            overtime_periods: 0,
            team_stats: JsonValue::Null,
            player_stats: JsonValue::Null,
        }
    }

    #[test]
    fn test_playoff_round_progression() {
        assert_eq!(PlayoffRound::WildCard.next(), Some(PlayoffRound::Divisional));
        assert_eq!(PlayoffRound::Conference.next(), Some(PlayoffRound::SuperBowl));
        assert_eq!(PlayoffRound::SuperBowl.next(), None);
        assert_eq!(PlayoffRound::WildCard.expected_games(), 6);
        assert_eq!(PlayoffRound::Divisional.expected_games(), 4);
        assert_eq!(PlayoffRound::Conference.expected_games(), 2);
        assert_eq!(PlayoffRound::SuperBowl.expected_games(), 1);
    }

    #[test]
    fn test_round_label_round_trip() {
        for round in PlayoffRound::all() {
            assert_eq!(round.label().parse::<PlayoffRound>().unwrap(), round);
        }
        assert!("preseason_round".parse::<PlayoffRound>().is_err());
    }

    #[test]
    fn test_game_type_season_type() {
        assert_eq!(GameType::Regular.season_type(), SeasonType::RegularSeason);
        assert_eq!(GameType::Wildcard.season_type(), SeasonType::Playoffs);
        assert_eq!(GameType::from(PlayoffRound::SuperBowl), GameType::SuperBowl);
    }

    #[test]
    fn test_game_from_result() {
        let game = Game::from_result(
            "game_20250905_DAL_at_PHI",
            "d1",
            2025,
            1,
            GameType::Regular,
            "PHI",
            "DAL",
            &sample_result(24, 20),
        )
        .unwrap();
        assert_eq!(game.winner_id(), Some("PHI"));
        assert_eq!(game.loser_id(), Some("DAL"));
        assert_eq!(game.points_for("DAL"), 20);
        assert_eq!(game.points_against("DAL"), 24);
        assert_eq!(game.opponent_of("PHI"), Some("DAL"));
        assert_eq!(game.season_type, SeasonType::RegularSeason);
    }

    #[test]
    fn test_regular_season_tie_allowed() {
        let game = Game::from_result(
            "game_20250905_DAL_at_PHI",
            "d1",
            2025,
            1,
            GameType::Regular,
            "PHI",
            "DAL",
            &sample_result(20, 20),
        )
        .unwrap();
        assert!(game.is_tie());
        assert_eq!(game.winner_id(), None);
    }

    #[test]
    fn test_playoff_tie_rejected() {
        let result = Game::from_result(
            "playoff_2025_wild_card_1",
            "d1",
            2025,
            19,
            GameType::Wildcard,
            "KC",
            "PIT",
            &sample_result(23, 23),
        );
        assert!(matches!(result, Err(DomainError::SimulationError(_))));
    }

    #[test]
    fn test_negative_score_rejected() {
        let result = Game::from_result(
            "game_20250905_DAL_at_PHI",
            "d1",
            2025,
            1,
            GameType::Regular,
            "PHI",
            "DAL",
            &sample_result(-3, 10),
        );
        assert!(matches!(result, Err(DomainError::ValidationError(_))));
    }
}
