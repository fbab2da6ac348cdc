use domain::errors::{DomainError, DomainResult};
use domain::models::{Game, GameType, League, LeagueEvent};
use domain::services::GameSimulator;

use crate::context::Repositories;

/// Executes one scheduled GAME event: simulate, validate, cache the
/// result on the event row, materialize the games row, and update both
/// standings. A simulation failure propagates before any write, so an
/// aborted day leaves the event unexecuted.
pub(crate) async fn execute_game_event(
    repos: &Repositories,
    league: &League,
    simulator: &dyn GameSimulator,
    event: &mut LeagueEvent,
    game_type: GameType,
    update_standings: bool,
) -> DomainResult<Game> {
    let params = event.game_params()?;
    let result = simulator.simulate_game(&params)?;

    let game = Game::from_result(
        &event.game_id,
        &event.dynasty_id,
        params.season,
        params.week,
        game_type,
        &params.home_team_id,
        &params.away_team_id,
        &result,
    )?;

    let results_json = serde_json::to_value(&result).map_err(|e| {
        DomainError::InternalError(format!("Failed to encode game result: {}", e))
    })?;
    event.set_results(results_json);
    repos.events.update(event).await?;
    repos.games.upsert(&game).await?;

    if update_standings {
        for team_id in [&game.home_team_id, &game.away_team_id] {
            let mut standing = repos
                .standings
                .get_or_create(&game.dynasty_id, team_id, game.season, game.season_type)
                .await?;
            standing.record_game(&game, league)?;
            repos.standings.upsert(&standing).await?;
        }
    }

    tracing::debug!(
        game_id = %game.game_id,
        "{} {} - {} {}",
        game.away_team_id,
        game.away_score,
        game.home_score,
        game.home_team_id
    );
    Ok(game)
}

/// Simulates a preseason event: results are cached on the event but no
/// games row or standings are written.
pub(crate) async fn execute_exhibition_event(
    repos: &Repositories,
    simulator: &dyn GameSimulator,
    event: &mut LeagueEvent,
) -> DomainResult<()> {
    let params = event.game_params()?;
    let result = simulator.simulate_game(&params)?;
    let results_json = serde_json::to_value(&result).map_err(|e| {
        DomainError::InternalError(format!("Failed to encode game result: {}", e))
    })?;
    event.set_results(results_json);
    repos.events.update(event).await?;
    Ok(())
}
