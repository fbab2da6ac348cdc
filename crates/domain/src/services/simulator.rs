use rand::Rng;

use crate::errors::{DomainError, DomainResult};
use crate::models::{GameParams, GameResult, SeasonType};

/// External contract invoked to resolve one scheduled game. FULL mode is
/// backed by a play engine supplied by the driver; INSTANT mode samples a
/// plausible score. Playoff results must always carry a winner.
pub trait GameSimulator: Send + Sync {
    fn simulate_game(&self, params: &GameParams) -> DomainResult<GameResult>;
}

/// Final scores common enough to make sampled games look like box scores.
const SCORE_TABLE: [i32; 12] = [13, 16, 17, 20, 21, 23, 24, 27, 30, 31, 34, 37];

/// Score sampler for INSTANT mode. Regular-season ties survive a single
/// overtime at a low rate; playoff games repeat overtime until decided.
#[derive(Debug, Default)]
pub struct InstantSimulator;

impl InstantSimulator {
    pub fn new() -> Self {
        Self
    }
}

impl GameSimulator for InstantSimulator {
    fn simulate_game(&self, params: &GameParams) -> DomainResult<GameResult> {
        if params.home_team_id == params.away_team_id {
            return Err(DomainError::SimulationError(format!(
                "Team {} cannot play itself",
                params.home_team_id
            )));
        }
        let mut rng = rand::thread_rng();

        // Slight home edge: the home sample is drawn with one extra index
        // of headroom.
        let mut home_score = SCORE_TABLE[rng.gen_range(0..SCORE_TABLE.len())];
        let mut away_score = SCORE_TABLE[rng.gen_range(0..SCORE_TABLE.len() - 1)];
        let mut overtime_periods = 0;

        if home_score == away_score {
            match params.season_type {
                SeasonType::Playoffs => {
                    // Sudden death until decided.
                    while home_score == away_score {
                        overtime_periods += 1;
                        let points = if rng.gen_bool(0.5) { 3 } else { 6 };
                        if rng.gen_bool(0.5) {
                            home_score += points;
                        } else {
                            away_score += points;
                        }
                    }
                }
                SeasonType::RegularSeason => {
                    // One overtime period; roughly 30% of them stay scoreless
                    // and the tie stands.
                    overtime_periods = 1;
                    if rng.gen_bool(0.7) {
                        if rng.gen_bool(0.5) {
                            home_score += 3;
                        } else {
                            away_score += 3;
                        }
                    }
                }
            }
        }

        let winner_id = if home_score > away_score {
            Some(params.home_team_id.clone())
        } else if away_score > home_score {
            Some(params.away_team_id.clone())
        } else {
            None
        };

        Ok(GameResult {
            home_score,
            away_score,
            winner_id,
            home_touchdowns: home_score / 7,
            away_touchdowns: away_score / 7,
            total_plays: rng.gen_range(120..=165) + overtime_periods * 12,
            overtime_periods,
            team_stats: serde_json::json!({}),
            player_stats: serde_json::json!({}),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SimulationMode;

    fn params(season_type: SeasonType) -> GameParams {
        GameParams {
            away_team_id: "DAL".to_string(),
            home_team_id: "PHI".to_string(),
            week: 1,
            season: 2025,
            season_type,
            mode: SimulationMode::Instant,
        }
    }

    #[test]
    fn test_playoff_games_never_tie() {
        let sim = InstantSimulator::new();
        for _ in 0..1000 {
            let result = sim.simulate_game(&params(SeasonType::Playoffs)).unwrap();
            assert_ne!(result.home_score, result.away_score);
            assert!(result.winner_id.is_some());
        }
    }

    #[test]
    fn test_regular_season_ties_are_rare_but_possible() {
        let sim = InstantSimulator::new();
        let mut ties = 0;
        for _ in 0..1000 {
            let result = sim.simulate_game(&params(SeasonType::RegularSeason)).unwrap();
            if result.home_score == result.away_score {
                assert!(result.winner_id.is_none());
                ties += 1;
            }
        }
        // Expected tie rate is a few percent; anything past 10% means the
        // overtime resolution is broken.
        assert!(ties < 100, "tie rate too high: {}/1000", ties);
    }

    #[test]
    fn test_scores_are_plausible() {
        let sim = InstantSimulator::new();
        for _ in 0..200 {
            let result = sim.simulate_game(&params(SeasonType::RegularSeason)).unwrap();
            assert!(result.home_score >= 0 && result.home_score <= 50);
            assert!(result.away_score >= 0 && result.away_score <= 50);
            assert!(result.total_plays >= 120);
            assert_eq!(result.home_touchdowns, result.home_score / 7);
        }
    }

    #[test]
    fn test_self_matchup_rejected() {
        let sim = InstantSimulator::new();
        let mut bad = params(SeasonType::RegularSeason);
        bad.away_team_id = "PHI".to_string();
        assert!(matches!(
            sim.simulate_game(&bad),
            Err(DomainError::SimulationError(_))
        ));
    }
}
