use std::sync::Arc;

use sqlx::SqlitePool;

use db::repositories::{
    CapRepo, ContractRepo, DynastyRepo, DynastyStateRepo, EventRepo, GameRepo, PlayoffRepo,
    StandingRepo,
};
use domain::repositories::{
    CapRepository, ContractRepository, DynastyRepository, DynastyStateRepository,
    EventRepository, GameRepository, PlayoffRepository, StandingRepository,
};

/// Repository bundle shared by every controller. Controllers read and
/// write persistent state only through these traits, never with direct
/// SQL, so tests can inject mocks.
#[derive(Clone)]
pub struct Repositories {
    pub events: Arc<dyn EventRepository>,
    pub dynasties: Arc<dyn DynastyRepository>,
    pub states: Arc<dyn DynastyStateRepository>,
    pub games: Arc<dyn GameRepository>,
    pub standings: Arc<dyn StandingRepository>,
    pub playoffs: Arc<dyn PlayoffRepository>,
    pub contracts: Arc<dyn ContractRepository>,
    pub caps: Arc<dyn CapRepository>,
}

impl Repositories {
    /// All repositories backed by one SQLite pool.
    pub fn sqlite(pool: SqlitePool) -> Self {
        Self {
            events: Arc::new(EventRepo::new(pool.clone())),
            dynasties: Arc::new(DynastyRepo::new(pool.clone())),
            states: Arc::new(DynastyStateRepo::new(pool.clone())),
            games: Arc::new(GameRepo::new(pool.clone())),
            standings: Arc::new(StandingRepo::new(pool.clone())),
            playoffs: Arc::new(PlayoffRepo::new(pool.clone())),
            contracts: Arc::new(ContractRepo::new(pool.clone())),
            caps: Arc::new(CapRepo::new(pool)),
        }
    }
}
