use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, DomainResult};
use super::game::{Game, SeasonType};
use super::team::League;

/// One team's record for a (dynasty, season, season_type). Regular season
/// and playoffs are kept as separate rows even for the same team-year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    pub dynasty_id: String,
    pub team_id: String,
    pub season: i32,
    pub season_type: SeasonType,
    pub wins: i32,
    pub losses: i32,
    pub ties: i32,
    pub division_wins: i32,
    pub division_losses: i32,
    pub division_ties: i32,
    pub conference_wins: i32,
    pub conference_losses: i32,
    pub conference_ties: i32,
    pub home_wins: i32,
    pub home_losses: i32,
    pub away_wins: i32,
    pub away_losses: i32,
    pub points_for: i32,
    pub points_against: i32,
    /// Positive for a win streak, negative for a losing streak, zero after
    /// a tie.
    pub current_streak: i32,
}

impl Standing {
    pub fn new(dynasty_id: &str, team_id: &str, season: i32, season_type: SeasonType) -> Self {
        Self {
            dynasty_id: dynasty_id.to_string(),
            team_id: team_id.to_string(),
            season,
            season_type,
            wins: 0,
            losses: 0,
            ties: 0,
            division_wins: 0,
            division_losses: 0,
            division_ties: 0,
            conference_wins: 0,
            conference_losses: 0,
            conference_ties: 0,
            home_wins: 0,
            home_losses: 0,
            away_wins: 0,
            away_losses: 0,
            points_for: 0,
            points_against: 0,
            current_streak: 0,
        }
    }

    pub fn games_played(&self) -> i32 {
        self.wins + self.losses + self.ties
    }

    pub fn win_pct(&self) -> f64 {
        let played = self.games_played();
        if played == 0 {
            return 0.0;
        }
        (self.wins as f64 + 0.5 * self.ties as f64) / played as f64
    }

    pub fn point_diff(&self) -> i32 {
        self.points_for - self.points_against
    }

    pub fn division_pct(&self) -> f64 {
        pct(self.division_wins, self.division_losses, self.division_ties)
    }

    pub fn conference_pct(&self) -> f64 {
        pct(
            self.conference_wins,
            self.conference_losses,
            self.conference_ties,
        )
    }

    /// Applies one completed game. Division vs conference splits are
    /// inferred from league metadata, home vs away from the game row.
    pub fn record_game(&mut self, game: &Game, league: &League) -> DomainResult<()> {
        if !game.involves(&self.team_id) {
            return Err(DomainError::ValidationError(format!(
                "Game {} does not involve team {}",
                game.game_id, self.team_id
            )));
        }
        if game.season_type != self.season_type {
            return Err(DomainError::ValidationError(format!(
                "Game {} is {} but standing row is {}",
                game.game_id, game.season_type, self.season_type
            )));
        }

        let is_home = game.home_team_id == self.team_id;
        let opponent = game.opponent_of(&self.team_id).expect("involves checked");
        let division_game = league.same_division(&self.team_id, opponent)?;
        let conference_game = league.same_conference(&self.team_id, opponent)?;

        self.points_for += game.points_for(&self.team_id);
        self.points_against += game.points_against(&self.team_id);

        match game.winner_id() {
            Some(winner) if winner == self.team_id => {
                self.wins += 1;
                self.current_streak = self.current_streak.max(0) + 1;
                if is_home {
                    self.home_wins += 1;
                } else {
                    self.away_wins += 1;
                }
                if division_game {
                    self.division_wins += 1;
                }
                if conference_game {
                    self.conference_wins += 1;
                }
            }
            Some(_) => {
                self.losses += 1;
                self.current_streak = self.current_streak.min(0) - 1;
                if is_home {
                    self.home_losses += 1;
                } else {
                    self.away_losses += 1;
                }
                if division_game {
                    self.division_losses += 1;
                }
                if conference_game {
                    self.conference_losses += 1;
                }
            }
            None => {
                self.ties += 1;
                self.current_streak = 0;
                if division_game {
                    self.division_ties += 1;
                }
                if conference_game {
                    self.conference_ties += 1;
                }
            }
        }
        Ok(())
    }
}

fn pct(wins: i32, losses: i32, ties: i32) -> f64 {
    let played = wins + losses + ties;
    if played == 0 {
        return 0.0;
    }
    (wins as f64 + 0.5 * ties as f64) / played as f64
}
