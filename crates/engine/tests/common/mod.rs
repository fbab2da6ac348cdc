#![allow(dead_code)]

use std::sync::Arc;

use domain::errors::DomainResult;
use domain::models::{GameParams, GameResult, League, SimDate};
use domain::services::GameSimulator;
use engine::{EngineConfig, NoopProposalSource, Repositories, SeasonCycleController};

/// Test log output, honoring RUST_LOG. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Fresh repositories over a single-connection in-memory database.
pub async fn memory_repositories() -> Repositories {
    let pool = db::create_memory_pool().await.expect("memory pool");
    db::migrate(&pool).await.expect("schema");
    Repositories::sqlite(pool)
}

/// Deterministic simulator: the home side always wins 27-17.
pub struct HomeWinsSimulator;

impl GameSimulator for HomeWinsSimulator {
    fn simulate_game(&self, params: &GameParams) -> DomainResult<GameResult> {
        Ok(GameResult {
            home_score: 27,
            away_score: 17,
            winner_id: Some(params.home_team_id.clone()),
            home_touchdowns: 3,
            away_touchdowns: 2,
            total_plays: 140,
            overtime_periods: 0,
            team_stats: serde_json::json!({}),
            player_stats: serde_json::json!({}),
        })
    }
}

pub async fn controller_with(
    repos: Repositories,
    dynasty_id: &str,
    season: i32,
    start_date: SimDate,
) -> SeasonCycleController {
    SeasonCycleController::with_repositories(
        EngineConfig::default(),
        repos,
        Arc::new(League::nfl()),
        Arc::new(HomeWinsSimulator),
        Arc::new(NoopProposalSource),
        dynasty_id,
        season,
        start_date,
    )
    .await
    .expect("controller")
}
