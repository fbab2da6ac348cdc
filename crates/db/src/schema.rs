use sqlx::SqlitePool;

use crate::errors::DbResult;

/// Bootstraps the full schema. Every statement is idempotent, so running
/// this on an existing database is a no-op. All child tables cascade on
/// dynasty delete.
pub async fn migrate(pool: &SqlitePool) -> DbResult<()> {
    for statement in STATEMENTS {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS dynasties (
        dynasty_id TEXT PRIMARY KEY,
        dynasty_name TEXT NOT NULL,
        owner_team_id TEXT,
        career_wins INTEGER NOT NULL DEFAULT 0,
        career_losses INTEGER NOT NULL DEFAULT 0,
        career_ties INTEGER NOT NULL DEFAULT 0,
        seasons_played INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS dynasty_state (
        dynasty_id TEXT NOT NULL REFERENCES dynasties(dynasty_id) ON DELETE CASCADE,
        season INTEGER NOT NULL,
        "current_date" TEXT NOT NULL,
        current_phase TEXT NOT NULL,
        current_week INTEGER NOT NULL,
        PRIMARY KEY (dynasty_id, season)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS events (
        event_id TEXT PRIMARY KEY,
        event_type TEXT NOT NULL,
        timestamp_ms INTEGER NOT NULL,
        game_id TEXT NOT NULL,
        dynasty_id TEXT NOT NULL REFERENCES dynasties(dynasty_id) ON DELETE CASCADE,
        data TEXT NOT NULL,
        UNIQUE (dynasty_id, game_id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_events_dynasty ON events(dynasty_id)",
    "CREATE INDEX IF NOT EXISTS idx_events_dynasty_type ON events(dynasty_id, event_type)",
    "CREATE INDEX IF NOT EXISTS idx_events_timestamp ON events(timestamp_ms)",
    "CREATE INDEX IF NOT EXISTS idx_events_game_id ON events(game_id)",
    r#"
    CREATE TABLE IF NOT EXISTS games (
        game_id TEXT NOT NULL,
        dynasty_id TEXT NOT NULL REFERENCES dynasties(dynasty_id) ON DELETE CASCADE,
        season INTEGER NOT NULL,
        week INTEGER NOT NULL,
        season_type TEXT NOT NULL,
        game_type TEXT NOT NULL,
        home_team_id TEXT NOT NULL,
        away_team_id TEXT NOT NULL,
        home_score INTEGER NOT NULL,
        away_score INTEGER NOT NULL,
        home_touchdowns INTEGER NOT NULL DEFAULT 0,
        away_touchdowns INTEGER NOT NULL DEFAULT 0,
        total_plays INTEGER NOT NULL DEFAULT 0,
        overtime_periods INTEGER NOT NULL DEFAULT 0,
        PRIMARY KEY (game_id, dynasty_id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_games_dynasty_season ON games(dynasty_id, season, season_type)",
    r#"
    CREATE TABLE IF NOT EXISTS standings (
        dynasty_id TEXT NOT NULL REFERENCES dynasties(dynasty_id) ON DELETE CASCADE,
        team_id TEXT NOT NULL,
        season INTEGER NOT NULL,
        season_type TEXT NOT NULL,
        wins INTEGER NOT NULL DEFAULT 0,
        losses INTEGER NOT NULL DEFAULT 0,
        ties INTEGER NOT NULL DEFAULT 0,
        division_wins INTEGER NOT NULL DEFAULT 0,
        division_losses INTEGER NOT NULL DEFAULT 0,
        division_ties INTEGER NOT NULL DEFAULT 0,
        conference_wins INTEGER NOT NULL DEFAULT 0,
        conference_losses INTEGER NOT NULL DEFAULT 0,
        conference_ties INTEGER NOT NULL DEFAULT 0,
        home_wins INTEGER NOT NULL DEFAULT 0,
        home_losses INTEGER NOT NULL DEFAULT 0,
        away_wins INTEGER NOT NULL DEFAULT 0,
        away_losses INTEGER NOT NULL DEFAULT 0,
        points_for INTEGER NOT NULL DEFAULT 0,
        points_against INTEGER NOT NULL DEFAULT 0,
        current_streak INTEGER NOT NULL DEFAULT 0,
        UNIQUE (dynasty_id, team_id, season, season_type)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS playoff_seedings (
        dynasty_id TEXT NOT NULL REFERENCES dynasties(dynasty_id) ON DELETE CASCADE,
        season INTEGER NOT NULL,
        conference TEXT NOT NULL,
        seed INTEGER NOT NULL,
        team_id TEXT NOT NULL,
        tiebreaker_note TEXT,
        UNIQUE (dynasty_id, season, conference, seed)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS tiebreaker_applications (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        dynasty_id TEXT NOT NULL REFERENCES dynasties(dynasty_id) ON DELETE CASCADE,
        season INTEGER NOT NULL,
        step TEXT NOT NULL,
        teams TEXT NOT NULL,
        winner TEXT NOT NULL,
        detail TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS player_contracts (
        contract_id TEXT PRIMARY KEY,
        player_id TEXT NOT NULL,
        team_id TEXT NOT NULL,
        dynasty_id TEXT NOT NULL REFERENCES dynasties(dynasty_id) ON DELETE CASCADE,
        start_year INTEGER NOT NULL,
        end_year INTEGER NOT NULL,
        contract_type TEXT NOT NULL,
        total_value INTEGER NOT NULL,
        signing_bonus INTEGER NOT NULL,
        is_active INTEGER NOT NULL DEFAULT 1,
        signed_date TEXT NOT NULL,
        voided_date TEXT
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_contracts_dynasty_team ON player_contracts(dynasty_id, team_id)",
    "CREATE INDEX IF NOT EXISTS idx_contracts_dynasty_player ON player_contracts(dynasty_id, player_id)",
    r#"
    CREATE TABLE IF NOT EXISTS contract_year_details (
        contract_id TEXT NOT NULL REFERENCES player_contracts(contract_id) ON DELETE CASCADE,
        year INTEGER NOT NULL,
        base_salary INTEGER NOT NULL,
        roster_bonus INTEGER NOT NULL DEFAULT 0,
        workout_bonus INTEGER NOT NULL DEFAULT 0,
        option_bonus_proration INTEGER NOT NULL DEFAULT 0,
        ltbe_incentives INTEGER NOT NULL DEFAULT 0,
        guaranteed INTEGER NOT NULL DEFAULT 0,
        UNIQUE (contract_id, year)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS team_salary_cap (
        dynasty_id TEXT NOT NULL REFERENCES dynasties(dynasty_id) ON DELETE CASCADE,
        team_id TEXT NOT NULL,
        season INTEGER NOT NULL,
        cap_limit INTEGER NOT NULL,
        carryover INTEGER NOT NULL DEFAULT 0,
        active_contracts_total INTEGER NOT NULL DEFAULT 0,
        dead_money_total INTEGER NOT NULL DEFAULT 0,
        ltbe_total INTEGER NOT NULL DEFAULT 0,
        nltbe_credit INTEGER NOT NULL DEFAULT 0,
        practice_squad_total INTEGER NOT NULL DEFAULT 0,
        top_51_active INTEGER NOT NULL DEFAULT 0,
        top_51_total INTEGER NOT NULL DEFAULT 0,
        UNIQUE (dynasty_id, team_id, season)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS dead_money (
        id TEXT PRIMARY KEY,
        dynasty_id TEXT NOT NULL REFERENCES dynasties(dynasty_id) ON DELETE CASCADE,
        team_id TEXT NOT NULL,
        player_id TEXT NOT NULL,
        contract_id TEXT NOT NULL,
        season INTEGER NOT NULL,
        amount INTEGER NOT NULL,
        june_1 INTEGER NOT NULL DEFAULT 0,
        created_date TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS franchise_tags (
        id TEXT PRIMARY KEY,
        dynasty_id TEXT NOT NULL REFERENCES dynasties(dynasty_id) ON DELETE CASCADE,
        team_id TEXT NOT NULL,
        player_id TEXT NOT NULL,
        season INTEGER NOT NULL,
        tag_salary INTEGER NOT NULL,
        applied_date TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS rfa_tenders (
        id TEXT PRIMARY KEY,
        dynasty_id TEXT NOT NULL REFERENCES dynasties(dynasty_id) ON DELETE CASCADE,
        team_id TEXT NOT NULL,
        player_id TEXT NOT NULL,
        season INTEGER NOT NULL,
        tender_amount INTEGER NOT NULL,
        applied_date TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS cap_transactions (
        id TEXT PRIMARY KEY,
        dynasty_id TEXT NOT NULL REFERENCES dynasties(dynasty_id) ON DELETE CASCADE,
        team_id TEXT NOT NULL,
        season INTEGER NOT NULL,
        kind TEXT NOT NULL,
        player_id TEXT,
        cap_delta INTEGER NOT NULL,
        description TEXT NOT NULL,
        date TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS league_salary_cap_history (
        season INTEGER PRIMARY KEY,
        cap_limit INTEGER NOT NULL
    )
    "#,
];
