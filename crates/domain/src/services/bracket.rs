use crate::errors::{DomainError, DomainResult};
use crate::models::{Conference, LeagueSeeding, Matchup, PlayoffRound, RoundBracket};

/// Bracket generators are pure functions of seeding plus prior-round
/// winners. They never touch the database; schedulers do. A generator
/// failure means the persisted tournament state is corrupt, and callers
/// treat it as fatal.

/// Wild card round: seeds 2v7, 3v6, 4v5 in each conference; the one seed
/// has a bye. AFC matchups come first.
pub fn generate_wild_card_bracket(seeding: &LeagueSeeding) -> DomainResult<RoundBracket> {
    let mut matchups = Vec::with_capacity(6);
    for conference in [Conference::AFC, Conference::NFC] {
        for (home_seed, away_seed) in [(2u8, 7u8), (3, 6), (4, 5)] {
            matchups.push(Matchup {
                conference: Some(conference),
                home_team_id: seeding.team_at(conference, home_seed)?.to_string(),
                away_team_id: seeding.team_at(conference, away_seed)?.to_string(),
                home_seed,
                away_seed,
            });
        }
    }
    Ok(RoundBracket {
        round: PlayoffRound::WildCard,
        matchups,
    })
}

/// Divisional round: the one seed returns, and remaining teams reseed so
/// the highest hosts the lowest.
pub fn generate_divisional_bracket(
    seeding: &LeagueSeeding,
    wild_card_winners: &[String],
) -> DomainResult<RoundBracket> {
    let mut matchups = Vec::with_capacity(4);
    for conference in [Conference::AFC, Conference::NFC] {
        let mut remaining = vec![(1u8, seeding.team_at(conference, 1)?.to_string())];
        remaining.extend(conference_winners(seeding, conference, wild_card_winners)?);
        if remaining.len() != 4 {
            return Err(DomainError::StateCorruption(format!(
                "{} divisional round needs 4 teams, got {}",
                conference,
                remaining.len()
            )));
        }
        remaining.sort_by_key(|(seed, _)| *seed);
        for (high, low) in [(0usize, 3usize), (1, 2)] {
            matchups.push(Matchup {
                conference: Some(conference),
                home_team_id: remaining[high].1.clone(),
                away_team_id: remaining[low].1.clone(),
                home_seed: remaining[high].0,
                away_seed: remaining[low].0,
            });
        }
    }
    Ok(RoundBracket {
        round: PlayoffRound::Divisional,
        matchups,
    })
}

/// Conference championships: the two divisional winners per conference,
/// higher seed hosting.
pub fn generate_conference_bracket(
    seeding: &LeagueSeeding,
    divisional_winners: &[String],
) -> DomainResult<RoundBracket> {
    let mut matchups = Vec::with_capacity(2);
    for conference in [Conference::AFC, Conference::NFC] {
        let mut remaining = conference_winners(seeding, conference, divisional_winners)?;
        if remaining.len() != 2 {
            return Err(DomainError::StateCorruption(format!(
                "{} championship needs 2 teams, got {}",
                conference,
                remaining.len()
            )));
        }
        remaining.sort_by_key(|(seed, _)| *seed);
        matchups.push(Matchup {
            conference: Some(conference),
            home_team_id: remaining[0].1.clone(),
            away_team_id: remaining[1].1.clone(),
            home_seed: remaining[0].0,
            away_seed: remaining[1].0,
        });
    }
    Ok(RoundBracket {
        round: PlayoffRound::Conference,
        matchups,
    })
}

/// Super Bowl: the two conference champions on a neutral field; the AFC
/// champion is listed as the home side.
pub fn generate_super_bowl_bracket(
    seeding: &LeagueSeeding,
    conference_winners_list: &[String],
) -> DomainResult<RoundBracket> {
    let afc = conference_winners(seeding, Conference::AFC, conference_winners_list)?;
    let nfc = conference_winners(seeding, Conference::NFC, conference_winners_list)?;
    if afc.len() != 1 || nfc.len() != 1 {
        return Err(DomainError::StateCorruption(format!(
            "Super Bowl needs one champion per conference, got {} AFC / {} NFC",
            afc.len(),
            nfc.len()
        )));
    }
    Ok(RoundBracket {
        round: PlayoffRound::SuperBowl,
        matchups: vec![Matchup {
            conference: None,
            home_team_id: afc[0].1.clone(),
            away_team_id: nfc[0].1.clone(),
            home_seed: afc[0].0,
            away_seed: nfc[0].0,
        }],
    })
}

/// Filters winner team ids down to one conference, attaching their
/// original seeds. An unseeded winner means corrupt state.
fn conference_winners(
    seeding: &LeagueSeeding,
    conference: Conference,
    winners: &[String],
) -> DomainResult<Vec<(u8, String)>> {
    let mut result = Vec::new();
    for team_id in winners {
        let seed = seeding.seed_of(team_id).ok_or_else(|| {
            DomainError::StateCorruption(format!(
                "Winner {} is not in the playoff seeding",
                team_id
            ))
        })?;
        if seeding.conference_of(team_id) == Some(conference) {
            result.push((seed, team_id.clone()));
        }
    }
    Ok(result)
}
