use crate::errors::{DomainError, DomainResult};
use crate::models::{Phase, SimDate, TransactionKind};

/// Legal timing windows for roster transactions in one league year.
/// Season `N` offseason windows fall in calendar year `N + 1`.
#[derive(Debug, Clone)]
pub struct TransactionWindows {
    pub season: i32,
    pub tag_start: SimDate,
    pub tag_end: SimDate,
    pub free_agency_start: SimDate,
    pub free_agency_end: SimDate,
    pub draft_start: SimDate,
    pub draft_end: SimDate,
    pub trade_deadline_week: i32,
}

impl TransactionWindows {
    /// Nominal league-year windows for a season.
    pub fn for_season(season: i32) -> Self {
        let next = season + 1;
        Self {
            season,
            tag_start: SimDate::new(next, 2, 18).expect("valid tag window start"),
            tag_end: SimDate::new(next, 3, 4).expect("valid tag window end"),
            free_agency_start: SimDate::new(next, 3, 12).expect("valid FA start"),
            free_agency_end: SimDate::new(next, 7, 31).expect("valid FA end"),
            draft_start: SimDate::new(next, 4, 23).expect("valid draft start"),
            draft_end: SimDate::new(next, 4, 25).expect("valid draft end"),
            trade_deadline_week: 8,
        }
    }

    /// Gate applied before any transaction executes. Releases are always
    /// legal; everything else is bound to its window.
    pub fn validate(
        &self,
        kind: TransactionKind,
        phase: Phase,
        week: i32,
        date: SimDate,
    ) -> DomainResult<()> {
        match kind {
            TransactionKind::PlayerRelease => Ok(()),
            TransactionKind::Trade => {
                let in_season_window =
                    phase == Phase::RegularSeason && week <= self.trade_deadline_week;
                let offseason_window = phase == Phase::Offseason
                    && date >= self.free_agency_start
                    && date <= self.draft_end;
                if in_season_window || offseason_window {
                    Ok(())
                } else {
                    Err(DomainError::ValidationError(format!(
                        "Trades are closed in {} week {} ({})",
                        phase, week, date
                    )))
                }
            }
            TransactionKind::UfaSigning => {
                if phase == Phase::Offseason
                    && date >= self.free_agency_start
                    && date <= self.free_agency_end
                {
                    Ok(())
                } else {
                    Err(DomainError::ValidationError(format!(
                        "Free agency is closed on {} ({})",
                        date, phase
                    )))
                }
            }
            TransactionKind::FranchiseTag => {
                if phase == Phase::Offseason && date >= self.tag_start && date <= self.tag_end {
                    Ok(())
                } else {
                    Err(DomainError::ValidationError(format!(
                        "Franchise tag window is closed on {} ({})",
                        date, phase
                    )))
                }
            }
            TransactionKind::RfaTender => {
                // Qualifying offers share the designation window with tags.
                if phase == Phase::Offseason && date >= self.tag_start && date <= self.tag_end {
                    Ok(())
                } else {
                    Err(DomainError::ValidationError(format!(
                        "RFA tender window is closed on {} ({})",
                        date, phase
                    )))
                }
            }
            TransactionKind::DraftPick => {
                if phase == Phase::Offseason
                    && date >= self.draft_start
                    && date <= self.draft_end
                {
                    Ok(())
                } else {
                    Err(DomainError::ValidationError(format!(
                        "Draft picks can only execute during the draft ({})",
                        date
                    )))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn windows() -> TransactionWindows {
        TransactionWindows::for_season(2025)
    }

    #[test]
    fn test_release_always_legal() {
        let w = windows();
        for (phase, week, date) in [
            (Phase::RegularSeason, 12, SimDate::new(2025, 11, 20).unwrap()),
            (Phase::Playoffs, 20, SimDate::new(2026, 1, 17).unwrap()),
            (Phase::Offseason, 0, SimDate::new(2026, 6, 1).unwrap()),
        ] {
            assert!(w
                .validate(TransactionKind::PlayerRelease, phase, week, date)
                .is_ok());
        }
    }

    #[test]
    fn test_trade_deadline() {
        let w = windows();
        let mid_october = SimDate::new(2025, 10, 20).unwrap();
        assert!(w
            .validate(TransactionKind::Trade, Phase::RegularSeason, 8, mid_october)
            .is_ok());
        assert!(w
            .validate(TransactionKind::Trade, Phase::RegularSeason, 9, mid_october)
            .is_err());
        assert!(w
            .validate(
                TransactionKind::Trade,
                Phase::Playoffs,
                20,
                SimDate::new(2026, 1, 17).unwrap()
            )
            .is_err());
    }

    #[test]
    fn test_offseason_trade_window() {
        let w = windows();
        assert!(w
            .validate(
                TransactionKind::Trade,
                Phase::Offseason,
                0,
                SimDate::new(2026, 3, 20).unwrap()
            )
            .is_ok());
        // Before the league year opens.
        assert!(w
            .validate(
                TransactionKind::Trade,
                Phase::Offseason,
                0,
                SimDate::new(2026, 2, 20).unwrap()
            )
            .is_err());
    }

    #[test]
    fn test_free_agency_window() {
        let w = windows();
        assert!(w
            .validate(
                TransactionKind::UfaSigning,
                Phase::Offseason,
                0,
                SimDate::new(2026, 3, 12).unwrap()
            )
            .is_ok());
        assert!(w
            .validate(
                TransactionKind::UfaSigning,
                Phase::Offseason,
                0,
                SimDate::new(2026, 8, 1).unwrap()
            )
            .is_err());
        // Never during the regular season.
        assert!(w
            .validate(
                TransactionKind::UfaSigning,
                Phase::RegularSeason,
                3,
                SimDate::new(2025, 9, 25).unwrap()
            )
            .is_err());
    }

    #[test]
    fn test_rfa_tender_shares_tag_window() {
        let w = windows();
        assert!(w
            .validate(
                TransactionKind::RfaTender,
                Phase::Offseason,
                0,
                SimDate::new(2026, 2, 25).unwrap()
            )
            .is_ok());
        // Closed once free agency opens.
        assert!(w
            .validate(
                TransactionKind::RfaTender,
                Phase::Offseason,
                0,
                SimDate::new(2026, 3, 12).unwrap()
            )
            .is_err());
        assert!(w
            .validate(
                TransactionKind::RfaTender,
                Phase::RegularSeason,
                4,
                SimDate::new(2025, 10, 1).unwrap()
            )
            .is_err());
    }

    #[test]
    fn test_tag_and_draft_windows() {
        let w = windows();
        assert!(w
            .validate(
                TransactionKind::FranchiseTag,
                Phase::Offseason,
                0,
                SimDate::new(2026, 3, 1).unwrap()
            )
            .is_ok());
        assert!(w
            .validate(
                TransactionKind::FranchiseTag,
                Phase::Offseason,
                0,
                SimDate::new(2026, 3, 5).unwrap()
            )
            .is_err());
        assert!(w
            .validate(
                TransactionKind::DraftPick,
                Phase::Offseason,
                0,
                SimDate::new(2026, 4, 24).unwrap()
            )
            .is_ok());
        assert!(w
            .validate(
                TransactionKind::DraftPick,
                Phase::Offseason,
                0,
                SimDate::new(2026, 5, 1).unwrap()
            )
            .is_err());
    }
}
