pub mod boundary;
pub mod config;
pub mod context;
mod game_runner;
pub mod handlers;
pub mod offseason;
pub mod playoffs;
pub mod preseason;
pub mod regular_season;
pub mod season_cycle;
pub mod transactions;

pub use boundary::PhaseBoundaryDetector;
pub use config::EngineConfig;
pub use context::Repositories;
pub use handlers::{DayResult, PhaseHandler};
pub use offseason::OffseasonController;
pub use playoffs::PlayoffController;
pub use preseason::PreseasonController;
pub use regular_season::RegularSeasonController;
pub use season_cycle::SeasonCycleController;
pub use transactions::{NoopProposalSource, ProposalSource, TransactionService};
