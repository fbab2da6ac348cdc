pub mod cap;
pub mod contract;
pub mod date;
pub mod dynasty;
pub mod event;
pub mod game;
pub mod playoff;
pub mod standing;
pub mod team;

pub use cap::{
    CapTransaction, DeadMoney, DeadMoneyCharge, FranchiseTagRow, RfaTenderRow, TeamCap,
    TransactionKind, TransactionProposal,
};
pub use contract::{Contract, ContractType, ContractYear, MAX_PRORATION_YEARS};
pub use date::{league_year_window, Calendar, SimDate};
pub use dynasty::{Dynasty, DynastyState, Phase};
pub use event::{
    parse_playoff_game_id, playoff_game_id, preseason_game_id, regular_game_id, EventPayload,
    EventType, GameClass, LeagueEvent,
};
pub use game::{
    Game, GameParams, GameResult, GameType, PlayoffRound, SeasonType, SimulationMode,
};
pub use playoff::{
    BracketSet, LeagueSeeding, Matchup, PlayoffSeed, RoundBracket, TiebreakerApplication,
};
pub use standing::Standing;
pub use team::{Conference, Division, League, Team};
