use crate::errors::{DomainError, DomainResult};
use crate::models::{Contract, DeadMoneyCharge, TeamCap};

/// Annual cap charge for one contract year.
pub fn contract_cap_hit(contract: &Contract, year: i32) -> i64 {
    contract.cap_hit(year)
}

/// Dead money created by releasing `contract` during `release_year`.
///
/// Without a June 1 designation, every remaining year of signing bonus
/// proration accelerates into the release year. With the designation the
/// charge splits: the release year keeps only its own proration (plus any
/// fully-guaranteed future salary), and the acceleration of the remaining
/// years lands in the following year.
pub fn dead_money(contract: &Contract, release_year: i32, june_1: bool) -> DeadMoneyCharge {
    let guaranteed = contract.guaranteed_salary_after(release_year);
    if june_1 {
        DeadMoneyCharge {
            current_year: contract.proration_for(release_year) + guaranteed,
            next_year: contract.remaining_proration(release_year + 1),
        }
    } else {
        DeadMoneyCharge {
            current_year: contract.remaining_proration(release_year) + guaranteed,
            next_year: 0,
        }
    }
}

/// Available cap space for a team's cap sheet.
pub fn team_cap_space(cap: &TeamCap) -> i64 {
    cap.cap_space()
}

/// Franchise tag salary: the greater of the top-five position average and
/// 120% of the player's prior salary.
pub fn franchise_tag_salary(top5_position_average: i64, prior_salary: i64) -> i64 {
    top5_position_average.max(prior_salary + prior_salary / 5)
}

/// Rejects a signing or incoming trade that would leave the team over the
/// cap.
pub fn validate_cap_room(cap: &TeamCap, additional_hit: i64, what: &str) -> DomainResult<()> {
    let space_after = cap.cap_space() - additional_hit;
    if space_after < 0 {
        return Err(DomainError::CapViolation(format!(
            "{} would put {} {} over the cap (space {}, hit {})",
            what,
            cap.team_id,
            -space_after,
            cap.cap_space(),
            additional_hit
        )));
    }
    Ok(())
}
