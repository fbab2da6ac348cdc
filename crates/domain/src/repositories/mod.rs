pub mod contract;
pub mod dynasty;
pub mod event;
pub mod game;
pub mod playoff;
pub mod standing;

pub use contract::{CapRepository, ContractRepository};
pub use dynasty::{DynastyRepository, DynastyStateRepository};
pub use event::EventRepository;
pub use game::GameRepository;
pub use playoff::PlayoffRepository;
pub use standing::StandingRepository;
