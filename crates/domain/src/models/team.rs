use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, DomainResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Conference {
    AFC,
    NFC,
}

impl std::fmt::Display for Conference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Conference::AFC => write!(f, "AFC"),
            Conference::NFC => write!(f, "NFC"),
        }
    }
}

impl std::str::FromStr for Conference {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AFC" => Ok(Conference::AFC),
            "NFC" => Ok(Conference::NFC),
            _ => Err(DomainError::ValidationError(format!(
                "Invalid conference: {}",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Division {
    #[serde(rename = "AFC East")]
    AFCEast,
    #[serde(rename = "AFC North")]
    AFCNorth,
    #[serde(rename = "AFC South")]
    AFCSouth,
    #[serde(rename = "AFC West")]
    AFCWest,
    #[serde(rename = "NFC East")]
    NFCEast,
    #[serde(rename = "NFC North")]
    NFCNorth,
    #[serde(rename = "NFC South")]
    NFCSouth,
    #[serde(rename = "NFC West")]
    NFCWest,
}

impl Division {
    pub fn conference(&self) -> Conference {
        match self {
            Division::AFCEast | Division::AFCNorth | Division::AFCSouth | Division::AFCWest => {
                Conference::AFC
            }
            Division::NFCEast | Division::NFCNorth | Division::NFCSouth | Division::NFCWest => {
                Conference::NFC
            }
        }
    }

    pub fn all() -> [Division; 8] {
        [
            Division::AFCEast,
            Division::AFCNorth,
            Division::AFCSouth,
            Division::AFCWest,
            Division::NFCEast,
            Division::NFCNorth,
            Division::NFCSouth,
            Division::NFCWest,
        ]
    }
}

/// League team. The id is the league abbreviation ("KC", "PHI") and is the
/// team id carried on every persistent row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub city: String,
    pub conference: Conference,
    pub division: Division,
}

impl Team {
    pub fn new(
        id: &str,
        name: &str,
        city: &str,
        division: Division,
    ) -> DomainResult<Self> {
        if id.trim().is_empty() || id.len() > 5 {
            return Err(DomainError::ValidationError(format!(
                "Team id must be 1-5 characters: {:?}",
                id
            )));
        }
        if name.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "Team name cannot be empty".to_string(),
            ));
        }
        Ok(Self {
            id: id.to_string(),
            name: name.to_string(),
            city: city.to_string(),
            conference: division.conference(),
            division,
        })
    }
}

/// Static league metadata: 32 teams in two conferences of four divisions.
/// External team configuration loading is a separate concern; this default
/// league is what the engine runs against.
#[derive(Debug, Clone)]
pub struct League {
    teams: Vec<Team>,
}

impl League {
    pub fn new(teams: Vec<Team>) -> DomainResult<Self> {
        if teams.is_empty() {
            return Err(DomainError::ConfigurationError(
                "League requires at least one team".to_string(),
            ));
        }
        Ok(Self { teams })
    }

    pub fn nfl() -> Self {
        let rows: [(&str, &str, &str, Division); 32] = [
            ("BUF", "Bills", "Buffalo", Division::AFCEast),
            ("MIA", "Dolphins", "Miami", Division::AFCEast),
            ("NE", "Patriots", "New England", Division::AFCEast),
            ("NYJ", "Jets", "New York", Division::AFCEast),
            ("BAL", "Ravens", "Baltimore", Division::AFCNorth),
            ("CIN", "Bengals", "Cincinnati", Division::AFCNorth),
            ("CLE", "Browns", "Cleveland", Division::AFCNorth),
            ("PIT", "Steelers", "Pittsburgh", Division::AFCNorth),
            ("HOU", "Texans", "Houston", Division::AFCSouth),
            ("IND", "Colts", "Indianapolis", Division::AFCSouth),
            ("JAX", "Jaguars", "Jacksonville", Division::AFCSouth),
            ("TEN", "Titans", "Tennessee", Division::AFCSouth),
            ("DEN", "Broncos", "Denver", Division::AFCWest),
            ("KC", "Chiefs", "Kansas City", Division::AFCWest),
            ("LV", "Raiders", "Las Vegas", Division::AFCWest),
            ("LAC", "Chargers", "Los Angeles", Division::AFCWest),
            ("DAL", "Cowboys", "Dallas", Division::NFCEast),
            ("NYG", "Giants", "New York", Division::NFCEast),
            ("PHI", "Eagles", "Philadelphia", Division::NFCEast),
            ("WAS", "Commanders", "Washington", Division::NFCEast),
            ("CHI", "Bears", "Chicago", Division::NFCNorth),
            ("DET", "Lions", "Detroit", Division::NFCNorth),
            ("GB", "Packers", "Green Bay", Division::NFCNorth),
            ("MIN", "Vikings", "Minnesota", Division::NFCNorth),
            ("ATL", "Falcons", "Atlanta", Division::NFCSouth),
            ("CAR", "Panthers", "Carolina", Division::NFCSouth),
            ("NO", "Saints", "New Orleans", Division::NFCSouth),
            ("TB", "Buccaneers", "Tampa Bay", Division::NFCSouth),
            ("ARI", "Cardinals", "Arizona", Division::NFCWest),
            ("LAR", "Rams", "Los Angeles", Division::NFCWest),
            ("SF", "49ers", "San Francisco", Division::NFCWest),
            ("SEA", "Seahawks", "Seattle", Division::NFCWest),
        ];
        let teams = rows
            .iter()
            .map(|(id, name, city, division)| {
                Team::new(id, name, city, *division).expect("builtin team is valid")
            })
            .collect();
        Self { teams }
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn team(&self, team_id: &str) -> DomainResult<&Team> {
        self.teams
            .iter()
            .find(|t| t.id == team_id)
            .ok_or_else(|| DomainError::NotFound(format!("Team {} not in league", team_id)))
    }

    pub fn conference_of(&self, team_id: &str) -> DomainResult<Conference> {
        Ok(self.team(team_id)?.conference)
    }

    pub fn same_division(&self, a: &str, b: &str) -> DomainResult<bool> {
        Ok(self.team(a)?.division == self.team(b)?.division)
    }

    pub fn same_conference(&self, a: &str, b: &str) -> DomainResult<bool> {
        Ok(self.team(a)?.conference == self.team(b)?.conference)
    }

    pub fn conference_teams(&self, conference: Conference) -> Vec<&Team> {
        self.teams
            .iter()
            .filter(|t| t.conference == conference)
            .collect()
    }

    pub fn division_teams(&self, division: Division) -> Vec<&Team> {
        self.teams.iter().filter(|t| t.division == division).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_league_shape() {
        let league = League::nfl();
        assert_eq!(league.teams().len(), 32);
        assert_eq!(league.conference_teams(Conference::AFC).len(), 16);
        assert_eq!(league.conference_teams(Conference::NFC).len(), 16);
        for division in Division::all() {
            assert_eq!(league.division_teams(division).len(), 4);
        }
    }

    #[test]
    fn test_team_lookup_and_metadata() {
        let league = League::nfl();
        let chiefs = league.team("KC").unwrap();
        assert_eq!(chiefs.conference, Conference::AFC);
        assert_eq!(chiefs.division, Division::AFCWest);
        assert!(league.team("XYZ").is_err());

        assert!(league.same_division("KC", "DEN").unwrap());
        assert!(!league.same_division("KC", "BUF").unwrap());
        assert!(league.same_conference("KC", "BUF").unwrap());
        assert!(!league.same_conference("KC", "PHI").unwrap());
    }

    #[test]
    fn test_invalid_team_rejected() {
        assert!(Team::new("", "Nobody", "Nowhere", Division::AFCEast).is_err());
        assert!(Team::new("TOOLONG", "Nobody", "Nowhere", Division::AFCEast).is_err());
    }

    #[test]
    fn test_division_conference_mapping() {
        assert_eq!(Division::AFCWest.conference(), Conference::AFC);
        assert_eq!(Division::NFCEast.conference(), Conference::NFC);
    }
}
