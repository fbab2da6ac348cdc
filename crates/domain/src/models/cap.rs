use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::DomainError;
use super::contract::Contract;
use super::date::SimDate;
use super::event::EventType;

/// One team's cap sheet for a (dynasty, team, season).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamCap {
    pub team_id: String,
    pub season: i32,
    pub dynasty_id: String,
    pub cap_limit: i64,
    pub carryover: i64,
    pub active_contracts_total: i64,
    pub dead_money_total: i64,
    pub ltbe_total: i64,
    /// NLTBE incentives earned the prior year, credited back this year.
    pub nltbe_credit: i64,
    pub practice_squad_total: i64,
    /// During the offseason only the 51 largest cap hits count.
    pub top_51_active: bool,
    pub top_51_total: i64,
}

impl TeamCap {
    pub fn new(dynasty_id: &str, team_id: &str, season: i32, cap_limit: i64) -> Self {
        Self {
            team_id: team_id.to_string(),
            season,
            dynasty_id: dynasty_id.to_string(),
            cap_limit,
            carryover: 0,
            active_contracts_total: 0,
            dead_money_total: 0,
            ltbe_total: 0,
            nltbe_credit: 0,
            practice_squad_total: 0,
            top_51_active: false,
            top_51_total: 0,
        }
    }

    /// Available space. The charged-contract base depends on whether the
    /// top-51 rule is in force.
    pub fn cap_space(&self) -> i64 {
        let contracts_base = if self.top_51_active {
            self.top_51_total
        } else {
            self.active_contracts_total
        };
        self.cap_limit + self.carryover + self.nltbe_credit
            - contracts_base
            - self.dead_money_total
            - self.ltbe_total
            - self.practice_squad_total
    }
}

/// Dead money split across the release year and, under a June 1
/// designation, the following year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadMoneyCharge {
    pub current_year: i64,
    pub next_year: i64,
}

impl DeadMoneyCharge {
    pub fn total(&self) -> i64 {
        self.current_year + self.next_year
    }
}

/// Persisted dead money row created on release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadMoney {
    pub id: Uuid,
    pub dynasty_id: String,
    pub team_id: String,
    pub player_id: Uuid,
    pub contract_id: Uuid,
    pub season: i32,
    pub amount: i64,
    pub june_1: bool,
    pub created_date: SimDate,
}

impl DeadMoney {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        contract: &Contract,
        season: i32,
        amount: i64,
        june_1: bool,
        created_date: SimDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            dynasty_id: contract.dynasty_id.clone(),
            team_id: contract.team_id.clone(),
            player_id: contract.player_id,
            contract_id: contract.contract_id,
            season,
            amount,
            june_1,
            created_date,
        }
    }
}

/// Persisted franchise tag application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FranchiseTagRow {
    pub id: Uuid,
    pub dynasty_id: String,
    pub team_id: String,
    pub player_id: Uuid,
    pub season: i32,
    pub tag_salary: i64,
    pub applied_date: SimDate,
}

/// Persisted restricted-free-agent qualifying offer. The tender amount
/// counts against the cap as a hold until the player signs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RfaTenderRow {
    pub id: Uuid,
    pub dynasty_id: String,
    pub team_id: String,
    pub player_id: Uuid,
    pub season: i32,
    pub tender_amount: i64,
    pub applied_date: SimDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    UfaSigning,
    FranchiseTag,
    RfaTender,
    PlayerRelease,
    Trade,
    DraftPick,
}

impl TransactionKind {
    pub fn event_type(&self) -> EventType {
        match self {
            TransactionKind::UfaSigning => EventType::UfaSigning,
            TransactionKind::FranchiseTag => EventType::FranchiseTag,
            TransactionKind::RfaTender => EventType::RfaTender,
            TransactionKind::PlayerRelease => EventType::PlayerRelease,
            TransactionKind::Trade => EventType::Trade,
            TransactionKind::DraftPick => EventType::DraftPick,
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionKind::UfaSigning => write!(f, "ufa_signing"),
            TransactionKind::FranchiseTag => write!(f, "franchise_tag"),
            TransactionKind::RfaTender => write!(f, "rfa_tender"),
            TransactionKind::PlayerRelease => write!(f, "player_release"),
            TransactionKind::Trade => write!(f, "trade"),
            TransactionKind::DraftPick => write!(f, "draft_pick"),
        }
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ufa_signing" => Ok(TransactionKind::UfaSigning),
            "franchise_tag" => Ok(TransactionKind::FranchiseTag),
            "rfa_tender" => Ok(TransactionKind::RfaTender),
            "player_release" => Ok(TransactionKind::PlayerRelease),
            "trade" => Ok(TransactionKind::Trade),
            "draft_pick" => Ok(TransactionKind::DraftPick),
            _ => Err(DomainError::ValidationError(format!(
                "Invalid transaction kind: {}",
                s
            ))),
        }
    }
}

/// A proposed roster move, produced by an AI manager and validated before
/// execution. Fields beyond `kind`/`team_id`/`player_id` apply only to
/// the kinds that need them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionProposal {
    pub kind: TransactionKind,
    pub team_id: String,
    pub player_id: Uuid,
    pub partner_team_id: Option<String>,
    /// Contract to sign (UFA signings).
    pub contract: Option<Contract>,
    /// Contract leaving this team (trades).
    pub outgoing_contract_id: Option<Uuid>,
    /// Contract arriving from the partner (trades).
    pub incoming_contract_id: Option<Uuid>,
    pub june_1_designation: bool,
    /// Average of the top five salaries at the player's position, supplied
    /// by the proposer for tag pricing.
    pub tag_top5_average: Option<i64>,
    /// Qualifying offer amount for an RFA tender.
    pub tender_amount: Option<i64>,
    pub note: String,
}

impl TransactionProposal {
    pub fn release(team_id: &str, player_id: Uuid, june_1: bool) -> Self {
        Self {
            kind: TransactionKind::PlayerRelease,
            team_id: team_id.to_string(),
            player_id,
            partner_team_id: None,
            contract: None,
            outgoing_contract_id: None,
            incoming_contract_id: None,
            june_1_designation: june_1,
            tag_top5_average: None,
            tender_amount: None,
            note: String::new(),
        }
    }

    pub fn signing(team_id: &str, contract: Contract) -> Self {
        Self {
            kind: TransactionKind::UfaSigning,
            team_id: team_id.to_string(),
            player_id: contract.player_id,
            partner_team_id: None,
            contract: Some(contract),
            outgoing_contract_id: None,
            incoming_contract_id: None,
            june_1_designation: false,
            tag_top5_average: None,
            tender_amount: None,
            note: String::new(),
        }
    }

    pub fn tag(team_id: &str, player_id: Uuid, top5_average: i64) -> Self {
        Self {
            kind: TransactionKind::FranchiseTag,
            team_id: team_id.to_string(),
            player_id,
            partner_team_id: None,
            contract: None,
            outgoing_contract_id: None,
            incoming_contract_id: None,
            june_1_designation: false,
            tag_top5_average: Some(top5_average),
            tender_amount: None,
            note: String::new(),
        }
    }

    pub fn tender(team_id: &str, player_id: Uuid, tender_amount: i64) -> Self {
        Self {
            kind: TransactionKind::RfaTender,
            team_id: team_id.to_string(),
            player_id,
            partner_team_id: None,
            contract: None,
            outgoing_contract_id: None,
            incoming_contract_id: None,
            june_1_designation: false,
            tag_top5_average: None,
            tender_amount: Some(tender_amount),
            note: String::new(),
        }
    }

    pub fn trade(
        team_id: &str,
        partner_team_id: &str,
        outgoing_contract_id: Uuid,
        incoming_contract_id: Uuid,
        player_id: Uuid,
    ) -> Self {
        Self {
            kind: TransactionKind::Trade,
            team_id: team_id.to_string(),
            player_id,
            partner_team_id: Some(partner_team_id.to_string()),
            contract: None,
            outgoing_contract_id: Some(outgoing_contract_id),
            incoming_contract_id: Some(incoming_contract_id),
            june_1_designation: false,
            tag_top5_average: None,
            tender_amount: None,
            note: String::new(),
        }
    }
}

/// Ledger line for every executed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapTransaction {
    pub id: Uuid,
    pub dynasty_id: String,
    pub team_id: String,
    pub season: i32,
    pub kind: TransactionKind,
    pub player_id: Option<Uuid>,
    /// Net change to cap space caused by this transaction.
    pub cap_delta: i64,
    pub description: String,
    pub date: SimDate,
}

impl CapTransaction {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        dynasty_id: &str,
        team_id: &str,
        season: i32,
        kind: TransactionKind,
        player_id: Option<Uuid>,
        cap_delta: i64,
        description: &str,
        date: SimDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            dynasty_id: dynasty_id.to_string(),
            team_id: team_id.to_string(),
            season,
            kind,
            player_id,
            cap_delta,
            description: description.to_string(),
            date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cap_space_uses_active_total_in_season() {
        let mut cap = TeamCap::new("d1", "KC", 2025, 255_000_000);
        cap.carryover = 5_000_000;
        cap.active_contracts_total = 230_000_000;
        cap.top_51_total = 210_000_000;
        cap.dead_money_total = 10_000_000;
        cap.top_51_active = false;
        assert_eq!(cap.cap_space(), 20_000_000);
    }

    #[test]
    fn test_cap_space_uses_top_51_in_offseason() {
        let mut cap = TeamCap::new("d1", "KC", 2025, 255_000_000);
        cap.active_contracts_total = 230_000_000;
        cap.top_51_total = 210_000_000;
        cap.top_51_active = true;
        assert_eq!(cap.cap_space(), 45_000_000);
    }

    #[test]
    fn test_nltbe_credit_increases_space() {
        let mut cap = TeamCap::new("d1", "KC", 2025, 255_000_000);
        cap.active_contracts_total = 255_000_000;
        assert_eq!(cap.cap_space(), 0);
        cap.nltbe_credit = 2_000_000;
        assert_eq!(cap.cap_space(), 2_000_000);
    }

    #[test]
    fn test_transaction_kind_round_trip() {
        for kind in [
            TransactionKind::UfaSigning,
            TransactionKind::FranchiseTag,
            TransactionKind::RfaTender,
            TransactionKind::PlayerRelease,
            TransactionKind::Trade,
            TransactionKind::DraftPick,
        ] {
            assert_eq!(kind.to_string().parse::<TransactionKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_kind_maps_to_event_type() {
        assert_eq!(
            TransactionKind::PlayerRelease.event_type(),
            EventType::PlayerRelease
        );
        assert_eq!(TransactionKind::Trade.event_type(), EventType::Trade);
        assert_eq!(TransactionKind::RfaTender.event_type(), EventType::RfaTender);
    }

    #[test]
    fn test_tender_proposal_carries_amount() {
        let player_id = Uuid::new_v4();
        let proposal = TransactionProposal::tender("KC", player_id, 3_200_000);
        assert_eq!(proposal.kind, TransactionKind::RfaTender);
        assert_eq!(proposal.tender_amount, Some(3_200_000));
        assert!(proposal.contract.is_none());
    }

    #[test]
    fn test_dead_money_charge_total() {
        let charge = DeadMoneyCharge {
            current_year: 4_000_000,
            next_year: 6_000_000,
        };
        assert_eq!(charge.total(), 10_000_000);
    }
}
