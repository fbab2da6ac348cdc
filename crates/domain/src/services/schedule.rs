use crate::errors::{DomainError, DomainResult};
use crate::models::{
    preseason_game_id, regular_game_id, GameParams, League, LeagueEvent, SeasonType, SimDate,
    SimulationMode,
};

pub const REGULAR_SEASON_WEEKS: i32 = 18;
pub const REGULAR_SEASON_GAMES: usize = 272;
pub const GAMES_PER_TEAM: i32 = 17;

/// First week carrying byes. Four teams sit each week from here through
/// `FIRST_BYE_WEEK + 7`, covering all 32 teams.
const FIRST_BYE_WEEK: i32 = 5;

/// Produces the full 272-game regular-season slate as unexecuted GAME
/// parameter events: 18 weeks, one bye per team, a Thursday opener, the
/// Sunday slate, and a Monday closer every week.
pub fn generate_regular_season(
    dynasty_id: &str,
    season: i32,
    start_date: SimDate,
    league: &League,
) -> DomainResult<Vec<LeagueEvent>> {
    let team_ids: Vec<&str> = league.teams().iter().map(|t| t.id.as_str()).collect();
    if team_ids.len() != 32 {
        return Err(DomainError::ConfigurationError(format!(
            "Regular season schedule requires 32 teams, league has {}",
            team_ids.len()
        )));
    }

    let mut events = Vec::with_capacity(REGULAR_SEASON_GAMES);
    for week in 1..=REGULAR_SEASON_WEEKS {
        let active: Vec<&str> = team_ids
            .iter()
            .enumerate()
            .filter(|(i, _)| bye_week(*i) != week)
            .map(|(_, id)| *id)
            .collect();

        let pairings = round_pairings(&active, week as usize);
        let week_start = start_date.add_days(((week - 1) * 7) as i64);
        let last = pairings.len() - 1;

        for (slot, (home, away)) in pairings.into_iter().enumerate() {
            // Thursday opener, Monday closer, everything else on Sunday.
            let date = match slot {
                0 => week_start,
                s if s == last => week_start.add_days(4),
                _ => week_start.add_days(3),
            };
            let params = GameParams {
                away_team_id: away.to_string(),
                home_team_id: home.to_string(),
                week,
                season,
                season_type: SeasonType::RegularSeason,
                mode: SimulationMode::Instant,
            };
            let game_id = regular_game_id(date, away, home);
            events.push(LeagueEvent::game(dynasty_id, &game_id, date, &params)?);
        }
    }

    debug_assert_eq!(events.len(), REGULAR_SEASON_GAMES);
    Ok(events)
}

/// Preseason slate: `weeks` rounds of 16 games, all on Saturdays.
pub fn generate_preseason(
    dynasty_id: &str,
    season: i32,
    start_date: SimDate,
    league: &League,
    weeks: i32,
) -> DomainResult<Vec<LeagueEvent>> {
    let team_ids: Vec<&str> = league.teams().iter().map(|t| t.id.as_str()).collect();
    if team_ids.len() % 2 != 0 {
        return Err(DomainError::ConfigurationError(format!(
            "Preseason schedule requires an even team count, got {}",
            team_ids.len()
        )));
    }

    let mut events = Vec::new();
    for week in 1..=weeks {
        let date = start_date
            .add_days(((week - 1) * 7) as i64)
            .following_saturday();
        let pairings = round_pairings(&team_ids, week as usize);
        for (slot, (home, away)) in pairings.into_iter().enumerate() {
            let params = GameParams {
                away_team_id: away.to_string(),
                home_team_id: home.to_string(),
                week,
                season,
                season_type: SeasonType::RegularSeason,
                mode: SimulationMode::Instant,
            };
            let game_id = preseason_game_id(season, week, slot + 1);
            events.push(LeagueEvent::game(dynasty_id, &game_id, date, &params)?);
        }
    }
    Ok(events)
}

fn bye_week(team_index: usize) -> i32 {
    FIRST_BYE_WEEK + (team_index / 4) as i32
}

/// Circle-method pairing: the first team stays fixed, the rest rotate by
/// the round number, then the front half meets the reversed back half.
/// Home assignment alternates so teams do not host every week.
fn round_pairings<'a>(teams: &[&'a str], round: usize) -> Vec<(&'a str, &'a str)> {
    let mut order: Vec<&str> = teams.to_vec();
    let rest = order.split_off(1);
    let rotation = round % rest.len();
    let mut rotated = rest.clone();
    rotated.rotate_right(rotation);
    order.extend(rotated);

    let half = order.len() / 2;
    (0..half)
        .map(|i| {
            let a = order[i];
            let b = order[order.len() - 1 - i];
            if (round + i) % 2 == 0 {
                (a, b)
            } else {
                (b, a)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_generates_exactly_272_games() {
        let league = League::nfl();
        let start = SimDate::new(2025, 9, 5).unwrap();
        let events = generate_regular_season("d1", 2025, start, &league).unwrap();
        assert_eq!(events.len(), 272);
    }

    #[test]
    fn test_every_team_plays_seventeen_games() {
        let league = League::nfl();
        let start = SimDate::new(2025, 9, 5).unwrap();
        let events = generate_regular_season("d1", 2025, start, &league).unwrap();

        let mut appearances: HashMap<String, i32> = HashMap::new();
        for event in &events {
            let params = event.game_params().unwrap();
            *appearances.entry(params.home_team_id).or_default() += 1;
            *appearances.entry(params.away_team_id).or_default() += 1;
        }
        assert_eq!(appearances.len(), 32);
        for (team, count) in appearances {
            assert_eq!(count, GAMES_PER_TEAM, "{} played {} games", team, count);
        }
    }

    #[test]
    fn test_single_opener_on_start_date() {
        let league = League::nfl();
        let start = SimDate::new(2025, 9, 5).unwrap();
        let events = generate_regular_season("d1", 2025, start, &league).unwrap();

        let openers: Vec<_> = events.iter().filter(|e| e.date() == start).collect();
        assert_eq!(openers.len(), 1);
        assert_eq!(openers[0].game_params().unwrap().week, 1);
    }

    #[test]
    fn test_week_shape_and_bye_weeks() {
        let league = League::nfl();
        let start = SimDate::new(2025, 9, 5).unwrap();
        let events = generate_regular_season("d1", 2025, start, &league).unwrap();

        let mut per_week: HashMap<i32, usize> = HashMap::new();
        for event in &events {
            *per_week.entry(event.game_params().unwrap().week).or_default() += 1;
        }
        for week in 1..=18 {
            let expected = if (5..=12).contains(&week) { 14 } else { 16 };
            assert_eq!(per_week[&week], expected, "week {}", week);
        }
    }

    #[test]
    fn test_game_ids_unique_and_well_formed() {
        let league = League::nfl();
        let start = SimDate::new(2025, 9, 5).unwrap();
        let events = generate_regular_season("d1", 2025, start, &league).unwrap();

        let mut seen = std::collections::HashSet::new();
        for event in &events {
            assert!(event.game_id.starts_with("game_"), "{}", event.game_id);
            assert!(seen.insert(event.game_id.clone()), "dup {}", event.game_id);
            let params = event.game_params().unwrap();
            assert_ne!(params.home_team_id, params.away_team_id);
        }
    }

    #[test]
    fn test_events_span_eighteen_weeks() {
        let league = League::nfl();
        let start = SimDate::new(2025, 9, 5).unwrap();
        let events = generate_regular_season("d1", 2025, start, &league).unwrap();

        let last_date = events.iter().map(|e| e.date()).max().unwrap();
        // Week 18's Monday closer: 17 weeks + 4 days out.
        assert_eq!(last_date, start.add_days(17 * 7 + 4));
    }

    #[test]
    fn test_preseason_shape() {
        let league = League::nfl();
        let start = SimDate::new(2025, 8, 7).unwrap();
        let events = generate_preseason("d1", 2025, start, &league, 3).unwrap();
        assert_eq!(events.len(), 48);
        assert!(events.iter().all(|e| e.game_id.starts_with("preseason_")));
        assert!(events
            .iter()
            .all(|e| e.date().weekday() == chrono::Weekday::Sat));
    }
}
