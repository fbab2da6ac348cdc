use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, DomainResult};
use super::game::PlayoffRound;
use super::team::Conference;

/// One seeded playoff berth. Derived from final regular-season standings
/// and persisted for audit only; brackets are regenerated, not stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayoffSeed {
    pub conference: Conference,
    pub seed: u8,
    pub team_id: String,
    pub tiebreaker_note: Option<String>,
}

/// Full seeding for one season: seven seeds per conference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeagueSeeding {
    pub season: i32,
    pub seeds: Vec<PlayoffSeed>,
}

impl LeagueSeeding {
    pub fn new(season: i32, seeds: Vec<PlayoffSeed>) -> DomainResult<Self> {
        let seeding = Self { season, seeds };
        seeding.validate()?;
        Ok(seeding)
    }

    fn validate(&self) -> DomainResult<()> {
        for conference in [Conference::AFC, Conference::NFC] {
            let mut seeds: Vec<u8> = self
                .seeds
                .iter()
                .filter(|s| s.conference == conference)
                .map(|s| s.seed)
                .collect();
            seeds.sort_unstable();
            if seeds != (1..=7).collect::<Vec<u8>>() {
                return Err(DomainError::ValidationError(format!(
                    "{} seeding must contain exactly seeds 1-7, got {:?}",
                    conference, seeds
                )));
            }
        }
        Ok(())
    }

    /// Seeds of one conference, ordered 1..7.
    pub fn conference_seeds(&self, conference: Conference) -> Vec<&PlayoffSeed> {
        let mut seeds: Vec<&PlayoffSeed> = self
            .seeds
            .iter()
            .filter(|s| s.conference == conference)
            .collect();
        seeds.sort_by_key(|s| s.seed);
        seeds
    }

    pub fn seed_of(&self, team_id: &str) -> Option<u8> {
        self.seeds
            .iter()
            .find(|s| s.team_id == team_id)
            .map(|s| s.seed)
    }

    pub fn conference_of(&self, team_id: &str) -> Option<Conference> {
        self.seeds
            .iter()
            .find(|s| s.team_id == team_id)
            .map(|s| s.conference)
    }

    pub fn team_at(&self, conference: Conference, seed: u8) -> DomainResult<&str> {
        self.seeds
            .iter()
            .find(|s| s.conference == conference && s.seed == seed)
            .map(|s| s.team_id.as_str())
            .ok_or_else(|| {
                DomainError::StateCorruption(format!(
                    "Seeding is missing {} seed {}",
                    conference, seed
                ))
            })
    }
}

/// One scheduled pairing inside a bracket. Conference is `None` only for
/// the Super Bowl.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matchup {
    pub conference: Option<Conference>,
    pub home_team_id: String,
    pub away_team_id: String,
    pub home_seed: u8,
    pub away_seed: u8,
}

/// In-memory tournament structure for one round. A pure function of
/// seeding plus completed prior rounds; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundBracket {
    pub round: PlayoffRound,
    pub matchups: Vec<Matchup>,
}

/// Bracket structures for every round reached so far, keyed for UI
/// consumption.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketSet {
    pub wild_card: Option<RoundBracket>,
    pub divisional: Option<RoundBracket>,
    pub conference: Option<RoundBracket>,
    pub super_bowl: Option<RoundBracket>,
}

impl BracketSet {
    pub fn get(&self, round: PlayoffRound) -> Option<&RoundBracket> {
        match round {
            PlayoffRound::WildCard => self.wild_card.as_ref(),
            PlayoffRound::Divisional => self.divisional.as_ref(),
            PlayoffRound::Conference => self.conference.as_ref(),
            PlayoffRound::SuperBowl => self.super_bowl.as_ref(),
        }
    }

    pub fn set(&mut self, bracket: RoundBracket) {
        match bracket.round {
            PlayoffRound::WildCard => self.wild_card = Some(bracket),
            PlayoffRound::Divisional => self.divisional = Some(bracket),
            PlayoffRound::Conference => self.conference = Some(bracket),
            PlayoffRound::SuperBowl => self.super_bowl = Some(bracket),
        }
    }
}

/// Audit row recording one applied tiebreaker step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TiebreakerApplication {
    pub dynasty_id: String,
    pub season: i32,
    pub step: String,
    pub teams: Vec<String>,
    pub winner: String,
    pub detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed(conference: Conference, seed: u8, team_id: &str) -> PlayoffSeed {
        PlayoffSeed {
            conference,
            seed,
            team_id: team_id.to_string(),
            tiebreaker_note: None,
        }
    }

    fn sample_seeding() -> LeagueSeeding {
        let afc = ["KC", "BUF", "BAL", "HOU", "PIT", "LAC", "MIA"];
        let nfc = ["PHI", "DET", "SF", "TB", "DAL", "GB", "LAR"];
        let mut seeds = Vec::new();
        for (i, team) in afc.iter().enumerate() {
            seeds.push(seed(Conference::AFC, (i + 1) as u8, team));
        }
        for (i, team) in nfc.iter().enumerate() {
            seeds.push(seed(Conference::NFC, (i + 1) as u8, team));
        }
        LeagueSeeding::new(2025, seeds).unwrap()
    }

    #[test]
    fn test_seeding_lookups() {
        let seeding = sample_seeding();
        assert_eq!(seeding.seed_of("KC"), Some(1));
        assert_eq!(seeding.seed_of("LAR"), Some(7));
        assert_eq!(seeding.seed_of("SEA"), None);
        assert_eq!(seeding.team_at(Conference::NFC, 1).unwrap(), "PHI");
        assert_eq!(seeding.conference_of("BUF"), Some(Conference::AFC));

        let afc = seeding.conference_seeds(Conference::AFC);
        assert_eq!(afc.len(), 7);
        assert_eq!(afc[0].team_id, "KC");
        assert_eq!(afc[6].team_id, "MIA");
    }

    #[test]
    fn test_seeding_requires_seven_per_conference() {
        let mut seeds = sample_seeding().seeds;
        seeds.retain(|s| !(s.conference == Conference::AFC && s.seed == 7));
        assert!(LeagueSeeding::new(2025, seeds.clone()).is_err());

        // Duplicate seed number is also invalid.
        seeds.push(seed(Conference::AFC, 6, "DEN"));
        assert!(LeagueSeeding::new(2025, seeds).is_err());
    }

    #[test]
    fn test_bracket_set_round_slots() {
        let mut set = BracketSet::default();
        assert!(set.get(PlayoffRound::WildCard).is_none());

        set.set(RoundBracket {
            round: PlayoffRound::WildCard,
            matchups: vec![],
        });
        assert!(set.get(PlayoffRound::WildCard).is_some());
        assert!(set.get(PlayoffRound::Divisional).is_none());
    }
}
