pub mod cap_repo;
pub mod contract_repo;
pub mod dynasty_repo;
pub mod event_repo;
pub mod game_repo;
pub mod playoff_repo;
pub mod standing_repo;
pub mod state_repo;

pub use cap_repo::CapRepo;
pub use contract_repo::ContractRepo;
pub use dynasty_repo::DynastyRepo;
pub use event_repo::EventRepo;
pub use game_repo::GameRepo;
pub use playoff_repo::PlayoffRepo;
pub use standing_repo::StandingRepo;
pub use state_repo::DynastyStateRepo;
