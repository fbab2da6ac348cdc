use chrono::Weekday;
use serde::Deserialize;

use domain::models::SimDate;

/// Default league cap limit when the history table has no row for a
/// season.
const DEFAULT_CAP_LIMIT: i64 = 255_000_000;

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    pub database_url: String,
    #[serde(default = "default_cap_limit")]
    pub default_cap_limit: i64,
    /// Preseason rounds scheduled when a season rolls over. Zero skips
    /// straight to the regular season.
    #[serde(default = "default_preseason_weeks")]
    pub preseason_weeks: i32,
}

fn default_cap_limit() -> i64 {
    DEFAULT_CAP_LIMIT
}

fn default_preseason_weeks() -> i32 {
    3
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite:franchise.db".to_string(),
            default_cap_limit: default_cap_limit(),
            preseason_weeks: default_preseason_weeks(),
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:franchise.db".to_string());
        let default_cap_limit = std::env::var("SALARY_CAP_LIMIT")
            .ok()
            .map(|v| v.parse())
            .transpose()?
            .unwrap_or_else(default_cap_limit);
        let preseason_weeks = std::env::var("PRESEASON_WEEKS")
            .ok()
            .map(|v| v.parse())
            .transpose()?
            .unwrap_or_else(default_preseason_weeks);

        Ok(Self {
            database_url,
            default_cap_limit,
            preseason_weeks,
        })
    }

    /// Opening day: the first Thursday of September of the season year.
    pub fn season_start(&self, season: i32) -> SimDate {
        let mut date = SimDate::new(season, 9, 1).expect("valid season start");
        while date.weekday() != Weekday::Thu {
            date = date.add_days(1);
        }
        date
    }

    /// Start-of-preseason milestone: August 1 of the season year. Reaching
    /// it during the offseason rolls the cycle into the next season.
    pub fn preseason_start(&self, season: i32) -> SimDate {
        SimDate::new(season, 8, 1).expect("valid preseason start")
    }
}
