use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::DomainResult;
use crate::models::{
    CapTransaction, Contract, DeadMoney, FranchiseTagRow, RfaTenderRow, TeamCap,
};

#[async_trait]
pub trait ContractRepository: Send + Sync {
    async fn insert(&self, contract: &Contract) -> DomainResult<()>;

    async fn find_by_id(&self, contract_id: Uuid) -> DomainResult<Option<Contract>>;

    /// The player's current active contract within a dynasty, if any.
    async fn find_active_by_player(
        &self,
        dynasty_id: &str,
        player_id: Uuid,
    ) -> DomainResult<Option<Contract>>;

    async fn list_active_by_team(
        &self,
        dynasty_id: &str,
        team_id: &str,
    ) -> DomainResult<Vec<Contract>>;

    /// Rewrites the contract row and its year details.
    async fn update(&self, contract: &Contract) -> DomainResult<()>;
}

#[async_trait]
pub trait CapRepository: Send + Sync {
    /// Fetches the cap sheet, creating one at the league limit for that
    /// season when absent.
    async fn get_or_create(
        &self,
        dynasty_id: &str,
        team_id: &str,
        season: i32,
        default_limit: i64,
    ) -> DomainResult<TeamCap>;

    async fn update(&self, cap: &TeamCap) -> DomainResult<()>;

    async fn insert_dead_money(&self, dead_money: &DeadMoney) -> DomainResult<()>;

    async fn list_dead_money(
        &self,
        dynasty_id: &str,
        team_id: &str,
        season: i32,
    ) -> DomainResult<Vec<DeadMoney>>;

    async fn insert_franchise_tag(&self, tag: &FranchiseTagRow) -> DomainResult<()>;

    async fn insert_rfa_tender(&self, tender: &RfaTenderRow) -> DomainResult<()>;

    async fn list_rfa_tenders(
        &self,
        dynasty_id: &str,
        team_id: &str,
        season: i32,
    ) -> DomainResult<Vec<RfaTenderRow>>;

    async fn log_transaction(&self, transaction: &CapTransaction) -> DomainResult<()>;

    async fn list_transactions(
        &self,
        dynasty_id: &str,
        team_id: &str,
        season: i32,
    ) -> DomainResult<Vec<CapTransaction>>;

    /// League-wide cap limit history.
    async fn cap_limit_for(&self, season: i32) -> DomainResult<Option<i64>>;

    async fn set_cap_limit(&self, season: i32, cap_limit: i64) -> DomainResult<()>;
}
