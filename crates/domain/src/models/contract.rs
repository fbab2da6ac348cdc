use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{DomainError, DomainResult};
use super::date::SimDate;

/// Signing bonuses prorate over at most five league years.
pub const MAX_PRORATION_YEARS: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractType {
    Rookie,
    Veteran,
    Extension,
    FranchiseTag,
}

impl std::fmt::Display for ContractType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContractType::Rookie => write!(f, "rookie"),
            ContractType::Veteran => write!(f, "veteran"),
            ContractType::Extension => write!(f, "extension"),
            ContractType::FranchiseTag => write!(f, "franchise_tag"),
        }
    }
}

impl std::str::FromStr for ContractType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rookie" => Ok(ContractType::Rookie),
            "veteran" => Ok(ContractType::Veteran),
            "extension" => Ok(ContractType::Extension),
            "franchise_tag" => Ok(ContractType::FranchiseTag),
            _ => Err(DomainError::ValidationError(format!(
                "Invalid contract type: {}",
                s
            ))),
        }
    }
}

/// Per-year detail owned by a contract. Signing bonus proration is
/// computed from the parent contract, not stored here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractYear {
    pub year: i32,
    pub base_salary: i64,
    pub roster_bonus: i64,
    pub workout_bonus: i64,
    pub option_bonus_proration: i64,
    pub ltbe_incentives: i64,
    pub guaranteed: bool,
}

impl ContractYear {
    pub fn new(year: i32, base_salary: i64) -> Self {
        Self {
            year,
            base_salary,
            roster_bonus: 0,
            workout_bonus: 0,
            option_bonus_proration: 0,
            ltbe_incentives: 0,
            guaranteed: false,
        }
    }

    pub fn guaranteed(mut self) -> Self {
        self.guaranteed = true;
        self
    }

    /// Cash paid this year excluding signing bonus.
    pub fn cash(&self) -> i64 {
        self.base_salary + self.roster_bonus + self.workout_bonus
    }
}

/// A player contract and its year-by-year cap obligations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    pub contract_id: Uuid,
    pub player_id: Uuid,
    pub team_id: String,
    pub dynasty_id: String,
    pub start_year: i32,
    pub end_year: i32,
    pub contract_type: ContractType,
    pub total_value: i64,
    pub signing_bonus: i64,
    pub years: Vec<ContractYear>,
    pub is_active: bool,
    pub signed_date: SimDate,
    pub voided_date: Option<SimDate>,
}

impl Contract {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        player_id: Uuid,
        team_id: &str,
        dynasty_id: &str,
        start_year: i32,
        end_year: i32,
        contract_type: ContractType,
        signing_bonus: i64,
        years: Vec<ContractYear>,
        signed_date: SimDate,
    ) -> DomainResult<Self> {
        if end_year < start_year {
            return Err(DomainError::ValidationError(format!(
                "Contract years inverted: {}-{}",
                start_year, end_year
            )));
        }
        if signing_bonus < 0 {
            return Err(DomainError::ValidationError(
                "Signing bonus cannot be negative".to_string(),
            ));
        }
        let expected: Vec<i32> = (start_year..=end_year).collect();
        let actual: Vec<i32> = years.iter().map(|y| y.year).collect();
        if actual != expected {
            return Err(DomainError::ValidationError(format!(
                "Contract year details must cover {:?}, got {:?}",
                expected, actual
            )));
        }
        let total_value = signing_bonus + years.iter().map(|y| y.cash()).sum::<i64>();
        Ok(Self {
            contract_id: Uuid::new_v4(),
            player_id,
            team_id: team_id.to_string(),
            dynasty_id: dynasty_id.to_string(),
            start_year,
            end_year,
            contract_type,
            total_value,
            signing_bonus,
            years,
            is_active: true,
            signed_date,
            voided_date: None,
        })
    }

    pub fn length(&self) -> i32 {
        self.end_year - self.start_year + 1
    }

    pub fn covers(&self, year: i32) -> bool {
        year >= self.start_year && year <= self.end_year
    }

    pub fn year_detail(&self, year: i32) -> Option<&ContractYear> {
        self.years.iter().find(|y| y.year == year)
    }

    /// Number of league years the signing bonus prorates over.
    pub fn proration_years(&self) -> i32 {
        self.length().min(MAX_PRORATION_YEARS)
    }

    fn last_proration_year(&self) -> i32 {
        self.start_year + self.proration_years() - 1
    }

    /// Signing bonus charge for one year. Integer remainder lands in the
    /// final proration year so the per-year charges sum to the bonus.
    pub fn proration_for(&self, year: i32) -> i64 {
        if year < self.start_year || year > self.last_proration_year() {
            return 0;
        }
        let years = self.proration_years() as i64;
        let annual = self.signing_bonus / years;
        if year == self.last_proration_year() {
            annual + self.signing_bonus % years
        } else {
            annual
        }
    }

    /// Proration still unaccounted for from `from_year` onward.
    pub fn remaining_proration(&self, from_year: i32) -> i64 {
        (from_year..=self.last_proration_year())
            .map(|y| self.proration_for(y))
            .sum()
    }

    /// Fully-guaranteed base salary in years strictly after `year`.
    pub fn guaranteed_salary_after(&self, year: i32) -> i64 {
        self.years
            .iter()
            .filter(|y| y.year > year && y.guaranteed)
            .map(|y| y.base_salary)
            .sum()
    }

    /// Annual charge against the cap: base salary, all bonuses, signing
    /// bonus proration, option proration, and LTBE incentives.
    pub fn cap_hit(&self, year: i32) -> i64 {
        match self.year_detail(year) {
            Some(detail) => {
                detail.base_salary
                    + detail.roster_bonus
                    + detail.workout_bonus
                    + detail.option_bonus_proration
                    + detail.ltbe_incentives
                    + self.proration_for(year)
            }
            None => 0,
        }
    }

    /// Total obligation check: every year's cap hit plus proration beyond
    /// the contract equals cash plus bonus.
    pub fn total_obligation(&self) -> i64 {
        (self.start_year..=self.end_year)
            .map(|y| self.cap_hit(y))
            .sum()
    }

    pub fn void(&mut self, date: SimDate) {
        self.is_active = false;
        self.voided_date = Some(date);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn four_year_deal() -> Contract {
        // 4 years, $40M total: $8M signing bonus + $8M/year base.
        let years = (2026..=2029)
            .map(|y| ContractYear::new(y, 8_000_000))
            .collect();
        Contract::new(
            Uuid::new_v4(),
            "KC",
            "d1",
            2026,
            2029,
            ContractType::Veteran,
            8_000_000,
            years,
            SimDate::new(2026, 3, 12).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_contract_validation() {
        let years = vec![ContractYear::new(2026, 1_000_000)];
        assert!(Contract::new(
            Uuid::new_v4(),
            "KC",
            "d1",
            2026,
            2025,
            ContractType::Veteran,
            0,
            years.clone(),
            SimDate::new(2026, 3, 12).unwrap(),
        )
        .is_err());

        // Year details must cover every contract year.
        assert!(Contract::new(
            Uuid::new_v4(),
            "KC",
            "d1",
            2026,
            2027,
            ContractType::Veteran,
            0,
            years,
            SimDate::new(2026, 3, 12).unwrap(),
        )
        .is_err());
    }

    #[test]
    fn test_proration_spread() {
        let contract = four_year_deal();
        assert_eq!(contract.proration_years(), 4);
        assert_eq!(contract.proration_for(2026), 2_000_000);
        assert_eq!(contract.proration_for(2029), 2_000_000);
        assert_eq!(contract.proration_for(2030), 0);
        assert_eq!(contract.remaining_proration(2026), 8_000_000);
        assert_eq!(contract.remaining_proration(2028), 4_000_000);
    }

    #[test]
    fn test_proration_capped_at_five_years() {
        let years = (2026..=2032)
            .map(|y| ContractYear::new(y, 5_000_000))
            .collect();
        let contract = Contract::new(
            Uuid::new_v4(),
            "KC",
            "d1",
            2026,
            2032,
            ContractType::Veteran,
            10_000_000,
            years,
            SimDate::new(2026, 3, 12).unwrap(),
        )
        .unwrap();
        assert_eq!(contract.proration_years(), 5);
        assert_eq!(contract.proration_for(2030), 2_000_000);
        assert_eq!(contract.proration_for(2031), 0);
    }

    #[test]
    fn test_proration_remainder_lands_in_final_year() {
        let years = (2026..=2028)
            .map(|y| ContractYear::new(y, 3_000_000))
            .collect();
        let contract = Contract::new(
            Uuid::new_v4(),
            "KC",
            "d1",
            2026,
            2028,
            ContractType::Veteran,
            10_000_000,
            years,
            SimDate::new(2026, 3, 12).unwrap(),
        )
        .unwrap();
        assert_eq!(contract.proration_for(2026), 3_333_333);
        assert_eq!(contract.proration_for(2028), 3_333_334);
        assert_eq!(contract.remaining_proration(2026), 10_000_000);
    }

    #[test]
    fn test_cap_hit_and_total_obligation() {
        let contract = four_year_deal();
        assert_eq!(contract.cap_hit(2026), 10_000_000);
        assert_eq!(contract.cap_hit(2031), 0);
        assert_eq!(contract.total_value, 40_000_000);
        assert_eq!(contract.total_obligation(), 40_000_000);
    }

    #[test]
    fn test_guaranteed_salary_after() {
        let mut years: Vec<ContractYear> = (2026..=2029)
            .map(|y| ContractYear::new(y, 8_000_000))
            .collect();
        years[1] = years[1].clone().guaranteed();
        years[2] = years[2].clone().guaranteed();
        let contract = Contract::new(
            Uuid::new_v4(),
            "KC",
            "d1",
            2026,
            2029,
            ContractType::Veteran,
            8_000_000,
            years,
            SimDate::new(2026, 3, 12).unwrap(),
        )
        .unwrap();
        assert_eq!(contract.guaranteed_salary_after(2026), 16_000_000);
        assert_eq!(contract.guaranteed_salary_after(2028), 0);
    }

    #[test]
    fn test_void() {
        let mut contract = four_year_deal();
        assert!(contract.is_active);
        contract.void(SimDate::new(2027, 3, 15).unwrap());
        assert!(!contract.is_active);
        assert!(contract.voided_date.is_some());
    }
}
