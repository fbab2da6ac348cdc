mod common;

use std::sync::Arc;

use common::{memory_repositories, HomeWinsSimulator};
use domain::errors::DomainError;
use domain::models::{
    playoff_game_id, Conference, Dynasty, GameClass, GameParams, GameResult, LeagueEvent,
    LeagueSeeding, Matchup, PlayoffRound, PlayoffSeed, SeasonType, SimDate, SimulationMode,
};
use domain::models::League;
use domain::services::bracket::{generate_divisional_bracket, generate_wild_card_bracket};
use engine::{PlayoffController, Repositories};

fn sample_seeding() -> LeagueSeeding {
    let afc = ["KC", "BUF", "BAL", "HOU", "PIT", "LAC", "MIA"];
    let nfc = ["PHI", "DET", "SF", "TB", "DAL", "GB", "LAR"];
    let mut seeds = Vec::new();
    for (conference, teams) in [(Conference::AFC, afc), (Conference::NFC, nfc)] {
        for (i, team) in teams.iter().enumerate() {
            seeds.push(PlayoffSeed {
                conference,
                seed: (i + 1) as u8,
                team_id: team.to_string(),
                tiebreaker_note: None,
            });
        }
    }
    LeagueSeeding::new(2025, seeds).unwrap()
}

fn wild_card_saturday() -> SimDate {
    SimDate::new(2026, 1, 24).unwrap()
}

async fn seeded_repositories() -> Repositories {
    let repos = memory_repositories().await;
    repos
        .dynasties
        .create(&Dynasty::new("d1", "d1", None).unwrap())
        .await
        .unwrap();
    repos
        .playoffs
        .save_seeding("d1", &sample_seeding())
        .await
        .unwrap();
    repos
}

/// Builds a playoff GAME event for one matchup; completed events carry a
/// home-team win.
fn playoff_event(
    round: PlayoffRound,
    n: usize,
    matchup: &Matchup,
    date: SimDate,
    completed: bool,
) -> LeagueEvent {
    let params = GameParams {
        away_team_id: matchup.away_team_id.clone(),
        home_team_id: matchup.home_team_id.clone(),
        week: round.week(),
        season: 2025,
        season_type: SeasonType::Playoffs,
        mode: SimulationMode::Instant,
    };
    let game_id = playoff_game_id(2025, round, n);
    let mut event = LeagueEvent::game("d1", &game_id, date, &params).unwrap();
    if completed {
        let result = GameResult {
            home_score: 27,
            away_score: 17,
            winner_id: Some(matchup.home_team_id.clone()),
            home_touchdowns: 3,
            away_touchdowns: 2,
            total_plays: 140,
            overtime_periods: 0,
            team_stats: serde_json::json!({}),
            player_stats: serde_json::json!({}),
        };
        event.set_results(serde_json::to_value(result).unwrap());
    }
    event
}

async fn new_playoff_controller(
    repos: &Repositories,
    initial_seeding: Option<LeagueSeeding>,
) -> Result<PlayoffController, DomainError> {
    PlayoffController::new(
        repos.clone(),
        Arc::new(League::nfl()),
        Arc::new(HomeWinsSimulator),
        "d1",
        2025,
        wild_card_saturday(),
        initial_seeding,
    )
    .await
}

/// S3: fresh construction schedules exactly the six wild card games.
#[tokio::test]
async fn fresh_construction_schedules_wild_card_round() {
    let repos = seeded_repositories().await;
    let controller = new_playoff_controller(&repos, Some(sample_seeding()))
        .await
        .unwrap();

    assert_eq!(controller.current_round(), PlayoffRound::WildCard);
    assert!(controller.brackets().wild_card.is_some());

    let events = repos
        .events
        .count_games("d1", GameClass::Playoff, false, None, None)
        .await
        .unwrap();
    assert_eq!(events, 6);

    let wc1 = repos
        .events
        .find_by_game_id("playoff_2025_wild_card_1", "d1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(wc1.game_params().unwrap().week, 19);
}

/// Playoff idempotence: constructing twice produces no duplicates.
#[tokio::test]
async fn reconstruction_creates_no_duplicate_events() {
    let repos = seeded_repositories().await;
    let _first = new_playoff_controller(&repos, Some(sample_seeding()))
        .await
        .unwrap();
    let _second = new_playoff_controller(&repos, Some(sample_seeding()))
        .await
        .unwrap();

    let events = repos
        .events
        .count_games("d1", GameClass::Playoff, false, None, None)
        .await
        .unwrap();
    assert_eq!(events, 6);
}

/// S4: reload mid-divisional reconstructs rounds, brackets, and the
/// current round from persisted events.
#[tokio::test]
async fn reload_mid_divisional_reconstructs_state() {
    let repos = seeded_repositories().await;
    let seeding = sample_seeding();
    let wc_start = wild_card_saturday();

    let wild_card = generate_wild_card_bracket(&seeding).unwrap();
    for (i, matchup) in wild_card.matchups.iter().enumerate() {
        let event = playoff_event(PlayoffRound::WildCard, i + 1, matchup, wc_start, true);
        repos.events.insert(&event).await.unwrap();
    }

    let wc_winners: Vec<String> = wild_card
        .matchups
        .iter()
        .map(|m| m.home_team_id.clone())
        .collect();
    let divisional = generate_divisional_bracket(&seeding, &wc_winners).unwrap();
    for (i, matchup) in divisional.matchups.iter().enumerate() {
        let event = playoff_event(
            PlayoffRound::Divisional,
            i + 1,
            matchup,
            wc_start.add_days(7),
            i < 2,
        );
        repos.events.insert(&event).await.unwrap();
    }

    // Seeding comes from the store, not the caller.
    let controller = new_playoff_controller(&repos, None).await.unwrap();

    assert_eq!(controller.current_round(), PlayoffRound::Divisional);
    assert_eq!(controller.completed_games(PlayoffRound::WildCard).len(), 6);
    assert_eq!(controller.completed_games(PlayoffRound::Divisional).len(), 2);

    let brackets = controller.brackets();
    assert!(brackets.wild_card.is_some());
    assert!(brackets.divisional.is_some());
    assert!(brackets.conference.is_none());
    assert!(brackets.super_bowl.is_none());
}

/// Completions in a later round while an earlier one is open are corrupt
/// state, surfaced loudly.
#[tokio::test]
async fn gap_in_round_completion_is_corrupt() {
    let repos = seeded_repositories().await;
    let seeding = sample_seeding();
    let wc_start = wild_card_saturday();

    let wild_card = generate_wild_card_bracket(&seeding).unwrap();
    // Only five of six wild card games completed.
    for (i, matchup) in wild_card.matchups.iter().enumerate() {
        let event = playoff_event(PlayoffRound::WildCard, i + 1, matchup, wc_start, i < 5);
        repos.events.insert(&event).await.unwrap();
    }
    // Yet a divisional completion exists.
    let rogue = Matchup {
        conference: Some(Conference::AFC),
        home_team_id: "KC".to_string(),
        away_team_id: "HOU".to_string(),
        home_seed: 1,
        away_seed: 4,
    };
    let event = playoff_event(
        PlayoffRound::Divisional,
        1,
        &rogue,
        wc_start.add_days(7),
        true,
    );
    repos.events.insert(&event).await.unwrap();

    let result = new_playoff_controller(&repos, None).await;
    assert!(matches!(result, Err(DomainError::StateCorruption(_))));
}

/// Playoff events with no recoverable seeding cannot be reconstructed.
#[tokio::test]
async fn reload_without_seeding_is_corrupt() {
    let repos = memory_repositories().await;
    repos
        .dynasties
        .create(&Dynasty::new("d1", "d1", None).unwrap())
        .await
        .unwrap();

    let seeding = sample_seeding();
    let wild_card = generate_wild_card_bracket(&seeding).unwrap();
    let event = playoff_event(
        PlayoffRound::WildCard,
        1,
        &wild_card.matchups[0],
        wild_card_saturday(),
        false,
    );
    repos.events.insert(&event).await.unwrap();

    let result = new_playoff_controller(&repos, None).await;
    assert!(matches!(result, Err(DomainError::StateCorruption(_))));
}

/// Fresh construction without seeding is a configuration error.
#[tokio::test]
async fn fresh_construction_requires_seeding() {
    let repos = seeded_repositories().await;
    // Note: seeding exists in the store, but a fresh bracket (no events)
    // must be handed its seeding explicitly.
    let result = new_playoff_controller(&repos, None).await;
    assert!(matches!(result, Err(DomainError::ConfigurationError(_))));
}

/// Driving day-by-day from the wild card weekend completes the
/// tournament and schedules each round as the prior one finishes.
#[tokio::test]
async fn playoffs_run_to_super_bowl() {
    let repos = seeded_repositories().await;
    let mut controller = new_playoff_controller(&repos, Some(sample_seeding()))
        .await
        .unwrap();

    use engine::PhaseHandler;
    let mut days = 0;
    while !controller.is_season_complete() && days < 45 {
        controller.advance_day().await.unwrap();
        days += 1;
    }

    assert!(controller.is_season_complete());
    assert_eq!(controller.current_round(), PlayoffRound::SuperBowl);
    assert_eq!(controller.completed_games(PlayoffRound::WildCard).len(), 6);
    assert_eq!(controller.completed_games(PlayoffRound::Divisional).len(), 4);
    assert_eq!(controller.completed_games(PlayoffRound::Conference).len(), 2);
    assert_eq!(controller.completed_games(PlayoffRound::SuperBowl).len(), 1);

    let playoff_games = repos
        .games
        .list("d1", 2025, Some(SeasonType::Playoffs))
        .await
        .unwrap();
    assert_eq!(playoff_games.len(), 13);
    assert!(playoff_games.iter().all(|g| g.winner_id().is_some()));
}
