use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use uuid::Uuid;

use domain::errors::{DomainError, DomainResult};
use domain::models::{
    CapTransaction, Contract, ContractType, ContractYear, DeadMoney, FranchiseTagRow, League,
    LeagueEvent, Phase, RfaTenderRow, SimDate, TransactionKind, TransactionProposal,
};
use domain::services::cap_math::{
    dead_money, franchise_tag_salary, validate_cap_room,
};
use domain::services::TransactionWindows;

use crate::context::Repositories;

/// Produces roster-move proposals for one team on one day. The AI
/// manager behind this trait is an external collaborator.
#[async_trait]
pub trait ProposalSource: Send + Sync {
    async fn proposals(
        &self,
        dynasty_id: &str,
        team_id: &str,
        season: i32,
        week: i32,
        date: SimDate,
    ) -> DomainResult<Vec<TransactionProposal>>;
}

/// Default source: no AI manager wired, no proposals.
pub struct NoopProposalSource;

#[async_trait]
impl ProposalSource for NoopProposalSource {
    async fn proposals(
        &self,
        _dynasty_id: &str,
        _team_id: &str,
        _season: i32,
        _week: i32,
        _date: SimDate,
    ) -> DomainResult<Vec<TransactionProposal>> {
        Ok(Vec::new())
    }
}

/// Daily transaction evaluation loop. Validates timing windows and cap
/// room, dedups proposals touching the same player within a day, and
/// executes survivors as typed events plus contract/cap/ledger rows.
pub struct TransactionService {
    repos: Repositories,
    league: Arc<League>,
    windows: TransactionWindows,
    source: Arc<dyn ProposalSource>,
    dynasty_id: String,
    season: i32,
    default_cap_limit: i64,
}

impl TransactionService {
    pub fn new(
        repos: Repositories,
        league: Arc<League>,
        dynasty_id: &str,
        season: i32,
        source: Arc<dyn ProposalSource>,
        default_cap_limit: i64,
    ) -> Self {
        Self {
            repos,
            league,
            windows: TransactionWindows::for_season(season),
            source,
            dynasty_id: dynasty_id.to_string(),
            season,
            default_cap_limit,
        }
    }

    /// Runs the AI evaluation loop for every team. Only active during the
    /// regular season; rejected proposals are logged and skipped, never
    /// fatal.
    pub async fn run_daily(
        &self,
        phase: Phase,
        week: i32,
        date: SimDate,
    ) -> DomainResult<usize> {
        if phase != Phase::RegularSeason {
            return Ok(0);
        }

        let mut handled_players: HashSet<Uuid> = HashSet::new();
        let mut executed = 0;
        for team in self.league.teams() {
            let proposals = self
                .source
                .proposals(&self.dynasty_id, &team.id, self.season, week, date)
                .await?;
            for proposal in proposals {
                if proposal.team_id != team.id {
                    tracing::warn!(
                        team_id = %team.id,
                        proposal_team = %proposal.team_id,
                        "Proposal attributed to the wrong team, skipping"
                    );
                    continue;
                }
                if !handled_players.insert(proposal.player_id) {
                    tracing::debug!(
                        player_id = %proposal.player_id,
                        "Player already involved in a transaction today, deduped"
                    );
                    continue;
                }
                match self.execute(&proposal, phase, week, date).await {
                    Ok(()) => executed += 1,
                    Err(DomainError::CapViolation(msg)) => {
                        tracing::info!("Transaction rejected: {}", msg);
                    }
                    Err(DomainError::ValidationError(msg)) => {
                        tracing::debug!("Transaction blocked: {}", msg);
                    }
                    Err(DomainError::NotFound(msg)) => {
                        tracing::debug!("Transaction target missing: {}", msg);
                    }
                    Err(e) => return Err(e),
                }
            }
        }
        Ok(executed)
    }

    /// Validates and executes one proposal, recording a typed event.
    pub async fn execute(
        &self,
        proposal: &TransactionProposal,
        phase: Phase,
        week: i32,
        date: SimDate,
    ) -> DomainResult<()> {
        let outcome = self.apply(proposal, phase, week, date).await?;

        let game_id = format!(
            "{}_{}_{}",
            proposal.kind, proposal.player_id, date
        );
        let parameters = serde_json::to_value(proposal).map_err(|e| {
            DomainError::InternalError(format!("Failed to encode proposal: {}", e))
        })?;
        let mut event = LeagueEvent::new(
            proposal.kind.event_type(),
            date.kickoff_timestamp_ms(),
            &game_id,
            &self.dynasty_id,
            parameters,
        );
        event.set_results(outcome);
        match self.repos.events.insert(&event).await {
            Ok(_) => Ok(()),
            Err(DomainError::DuplicateGameId(key)) => {
                tracing::debug!("Transaction event already recorded: {}", key);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Executes a transaction event already sitting on the calendar
    /// (offseason drafts, scheduled signings) and caches its outcome.
    pub async fn execute_scheduled_event(
        &self,
        event: &mut LeagueEvent,
        phase: Phase,
        week: i32,
        date: SimDate,
    ) -> DomainResult<bool> {
        let proposal: TransactionProposal =
            match serde_json::from_value(event.data.parameters.clone()) {
                Ok(p) => p,
                Err(e) => {
                    tracing::warn!(
                        game_id = %event.game_id,
                        "Scheduled transaction has malformed parameters: {}",
                        e
                    );
                    return Ok(false);
                }
            };
        match self.apply(&proposal, phase, week, date).await {
            Ok(outcome) => {
                event.set_results(outcome);
                self.repos.events.update(event).await?;
                Ok(true)
            }
            Err(DomainError::CapViolation(msg)) | Err(DomainError::ValidationError(msg)) => {
                tracing::info!(game_id = %event.game_id, "Scheduled transaction rejected: {}", msg);
                event.set_results(json!({ "rejected": msg }));
                self.repos.events.update(event).await?;
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Applies state changes for one proposal and returns the outcome
    /// payload. The timing gate runs first; pure cap math decides the
    /// rest.
    async fn apply(
        &self,
        proposal: &TransactionProposal,
        phase: Phase,
        week: i32,
        date: SimDate,
    ) -> DomainResult<serde_json::Value> {
        self.windows.validate(proposal.kind, phase, week, date)?;
        match proposal.kind {
            TransactionKind::PlayerRelease => self.apply_release(proposal, phase, date).await,
            TransactionKind::UfaSigning => self.apply_signing(proposal, date).await,
            TransactionKind::FranchiseTag => self.apply_tag(proposal, phase, date).await,
            TransactionKind::RfaTender => self.apply_tender(proposal, phase, date).await,
            TransactionKind::Trade => self.apply_trade(proposal, phase, date).await,
            TransactionKind::DraftPick => Ok(json!({ "executed": true })),
        }
    }

    /// Cap year charged by a move: offseason moves hit the upcoming
    /// league year.
    fn cap_year(&self, phase: Phase) -> i32 {
        if phase == Phase::Offseason {
            self.season + 1
        } else {
            self.season
        }
    }

    async fn apply_release(
        &self,
        proposal: &TransactionProposal,
        phase: Phase,
        date: SimDate,
    ) -> DomainResult<serde_json::Value> {
        let mut contract = self
            .repos
            .contracts
            .find_active_by_player(&self.dynasty_id, proposal.player_id)
            .await?
            .ok_or_else(|| {
                DomainError::NotFound(format!(
                    "No active contract for player {}",
                    proposal.player_id
                ))
            })?;
        if contract.team_id != proposal.team_id {
            return Err(DomainError::ValidationError(format!(
                "Player {} is under contract with {}, not {}",
                proposal.player_id, contract.team_id, proposal.team_id
            )));
        }

        let year = self.cap_year(phase);
        let removed_hit = contract.cap_hit(year);
        let charge = dead_money(&contract, year, proposal.june_1_designation);

        contract.void(date);
        self.repos.contracts.update(&contract).await?;

        let mut cap = self
            .repos
            .caps
            .get_or_create(&self.dynasty_id, &proposal.team_id, year, self.default_cap_limit)
            .await?;
        cap.active_contracts_total -= removed_hit;
        if cap.top_51_active {
            cap.top_51_total -= removed_hit;
        }
        cap.dead_money_total += charge.current_year;
        self.repos.caps.update(&cap).await?;

        self.repos
            .caps
            .insert_dead_money(&DeadMoney::new(
                &contract,
                year,
                charge.current_year,
                proposal.june_1_designation,
                date,
            ))
            .await?;
        if charge.next_year > 0 {
            self.repos
                .caps
                .insert_dead_money(&DeadMoney::new(
                    &contract,
                    year + 1,
                    charge.next_year,
                    proposal.june_1_designation,
                    date,
                ))
                .await?;
            let mut next_cap = self
                .repos
                .caps
                .get_or_create(&self.dynasty_id, &proposal.team_id, year + 1, self.default_cap_limit)
                .await?;
            next_cap.dead_money_total += charge.next_year;
            self.repos.caps.update(&next_cap).await?;
        }

        self.log(
            &proposal.team_id,
            year,
            TransactionKind::PlayerRelease,
            Some(proposal.player_id),
            removed_hit - charge.current_year,
            &format!(
                "Released player {} (dead money {} now, {} next)",
                proposal.player_id, charge.current_year, charge.next_year
            ),
            date,
        )
        .await?;

        Ok(json!({
            "released_contract_id": contract.contract_id,
            "removed_cap_hit": removed_hit,
            "dead_money_current_year": charge.current_year,
            "dead_money_next_year": charge.next_year,
            "june_1_designation": proposal.june_1_designation,
        }))
    }

    async fn apply_signing(
        &self,
        proposal: &TransactionProposal,
        date: SimDate,
    ) -> DomainResult<serde_json::Value> {
        let contract = proposal.contract.as_ref().ok_or_else(|| {
            DomainError::ValidationError("Signing proposal carries no contract".to_string())
        })?;
        if contract.team_id != proposal.team_id || contract.dynasty_id != self.dynasty_id {
            return Err(DomainError::ValidationError(
                "Signing contract does not match the proposing team".to_string(),
            ));
        }
        if self
            .repos
            .contracts
            .find_active_by_player(&self.dynasty_id, contract.player_id)
            .await?
            .is_some()
        {
            return Err(DomainError::ValidationError(format!(
                "Player {} already has an active contract",
                contract.player_id
            )));
        }

        let year = contract.start_year;
        let first_hit = contract.cap_hit(year);
        let mut cap = self
            .repos
            .caps
            .get_or_create(&self.dynasty_id, &proposal.team_id, year, self.default_cap_limit)
            .await?;
        validate_cap_room(&cap, first_hit, "Signing")?;

        self.repos.contracts.insert(contract).await?;
        cap.active_contracts_total += first_hit;
        if cap.top_51_active {
            // Assume a new deal lands among the 51 largest hits.
            cap.top_51_total += first_hit;
        }
        self.repos.caps.update(&cap).await?;

        self.log(
            &proposal.team_id,
            year,
            TransactionKind::UfaSigning,
            Some(contract.player_id),
            -first_hit,
            &format!(
                "Signed player {} through {} (year-one hit {})",
                contract.player_id, contract.end_year, first_hit
            ),
            date,
        )
        .await?;

        Ok(json!({
            "contract_id": contract.contract_id,
            "first_year_cap_hit": first_hit,
        }))
    }

    async fn apply_tag(
        &self,
        proposal: &TransactionProposal,
        phase: Phase,
        date: SimDate,
    ) -> DomainResult<serde_json::Value> {
        let top5_average = proposal.tag_top5_average.ok_or_else(|| {
            DomainError::ValidationError(
                "Franchise tag proposal carries no top-5 position average".to_string(),
            )
        })?;
        let prior = self
            .repos
            .contracts
            .find_active_by_player(&self.dynasty_id, proposal.player_id)
            .await?
            .ok_or_else(|| {
                DomainError::NotFound(format!(
                    "No expiring contract for player {}",
                    proposal.player_id
                ))
            })?;
        if prior.team_id != proposal.team_id {
            return Err(DomainError::ValidationError(format!(
                "Only {} can tag player {}",
                prior.team_id, proposal.player_id
            )));
        }

        let prior_salary = prior
            .year_detail(prior.end_year)
            .map(|y| y.base_salary)
            .unwrap_or(0);
        let tag_salary = franchise_tag_salary(top5_average, prior_salary);
        let year = self.cap_year(phase);

        let mut cap = self
            .repos
            .caps
            .get_or_create(&self.dynasty_id, &proposal.team_id, year, self.default_cap_limit)
            .await?;
        validate_cap_room(&cap, tag_salary, "Franchise tag")?;

        let tag_contract = Contract::new(
            proposal.player_id,
            &proposal.team_id,
            &self.dynasty_id,
            year,
            year,
            ContractType::FranchiseTag,
            0,
            vec![ContractYear::new(year, tag_salary).guaranteed()],
            date,
        )?;
        self.repos.contracts.insert(&tag_contract).await?;
        self.repos
            .caps
            .insert_franchise_tag(&FranchiseTagRow {
                id: Uuid::new_v4(),
                dynasty_id: self.dynasty_id.clone(),
                team_id: proposal.team_id.clone(),
                player_id: proposal.player_id,
                season: year,
                tag_salary,
                applied_date: date,
            })
            .await?;

        cap.active_contracts_total += tag_salary;
        if cap.top_51_active {
            cap.top_51_total += tag_salary;
        }
        self.repos.caps.update(&cap).await?;

        self.log(
            &proposal.team_id,
            year,
            TransactionKind::FranchiseTag,
            Some(proposal.player_id),
            -tag_salary,
            &format!("Tagged player {} at {}", proposal.player_id, tag_salary),
            date,
        )
        .await?;

        Ok(json!({
            "tag_contract_id": tag_contract.contract_id,
            "tag_salary": tag_salary,
        }))
    }

    /// Places a qualifying offer on a restricted free agent. The tender
    /// amount becomes a cap hold; no contract exists until the player
    /// signs it.
    async fn apply_tender(
        &self,
        proposal: &TransactionProposal,
        phase: Phase,
        date: SimDate,
    ) -> DomainResult<serde_json::Value> {
        let tender_amount = proposal.tender_amount.ok_or_else(|| {
            DomainError::ValidationError(
                "RFA tender proposal carries no tender amount".to_string(),
            )
        })?;
        if tender_amount <= 0 {
            return Err(DomainError::ValidationError(format!(
                "RFA tender amount must be positive, got {}",
                tender_amount
            )));
        }
        let expiring = self
            .repos
            .contracts
            .find_active_by_player(&self.dynasty_id, proposal.player_id)
            .await?
            .ok_or_else(|| {
                DomainError::NotFound(format!(
                    "No expiring contract for player {}",
                    proposal.player_id
                ))
            })?;
        if expiring.team_id != proposal.team_id {
            return Err(DomainError::ValidationError(format!(
                "Only {} can tender player {}",
                expiring.team_id, proposal.player_id
            )));
        }

        let year = self.cap_year(phase);
        let mut cap = self
            .repos
            .caps
            .get_or_create(&self.dynasty_id, &proposal.team_id, year, self.default_cap_limit)
            .await?;
        validate_cap_room(&cap, tender_amount, "RFA tender")?;

        let tender = RfaTenderRow {
            id: Uuid::new_v4(),
            dynasty_id: self.dynasty_id.clone(),
            team_id: proposal.team_id.clone(),
            player_id: proposal.player_id,
            season: year,
            tender_amount,
            applied_date: date,
        };
        self.repos.caps.insert_rfa_tender(&tender).await?;

        cap.active_contracts_total += tender_amount;
        if cap.top_51_active {
            cap.top_51_total += tender_amount;
        }
        self.repos.caps.update(&cap).await?;

        self.log(
            &proposal.team_id,
            year,
            TransactionKind::RfaTender,
            Some(proposal.player_id),
            -tender_amount,
            &format!(
                "Tendered player {} at {}",
                proposal.player_id, tender_amount
            ),
            date,
        )
        .await?;

        Ok(json!({
            "tender_id": tender.id,
            "tender_amount": tender_amount,
        }))
    }

    async fn apply_trade(
        &self,
        proposal: &TransactionProposal,
        phase: Phase,
        date: SimDate,
    ) -> DomainResult<serde_json::Value> {
        let partner_team_id = proposal.partner_team_id.as_deref().ok_or_else(|| {
            DomainError::ValidationError("Trade proposal names no partner team".to_string())
        })?;
        let outgoing_id = proposal.outgoing_contract_id.ok_or_else(|| {
            DomainError::ValidationError("Trade proposal names no outgoing contract".to_string())
        })?;
        let incoming_id = proposal.incoming_contract_id.ok_or_else(|| {
            DomainError::ValidationError("Trade proposal names no incoming contract".to_string())
        })?;
        self.league.team(&proposal.team_id)?;
        self.league.team(partner_team_id)?;

        let mut outgoing = self
            .repos
            .contracts
            .find_by_id(outgoing_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Contract {}", outgoing_id)))?;
        let mut incoming = self
            .repos
            .contracts
            .find_by_id(incoming_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Contract {}", incoming_id)))?;

        if !outgoing.is_active || !incoming.is_active {
            return Err(DomainError::ValidationError(
                "Traded contracts must be active".to_string(),
            ));
        }
        if outgoing.team_id != proposal.team_id || incoming.team_id != partner_team_id {
            return Err(DomainError::ValidationError(
                "Traded contracts are not owned by the named teams".to_string(),
            ));
        }

        let year = self.cap_year(phase);
        let out_hit = outgoing.cap_hit(year);
        let in_hit = incoming.cap_hit(year);

        // Both teams must clear the cap after the swap.
        let mut team_cap = self
            .repos
            .caps
            .get_or_create(&self.dynasty_id, &proposal.team_id, year, self.default_cap_limit)
            .await?;
        let mut partner_cap = self
            .repos
            .caps
            .get_or_create(&self.dynasty_id, partner_team_id, year, self.default_cap_limit)
            .await?;
        validate_cap_room(&team_cap, in_hit - out_hit, "Trade")?;
        validate_cap_room(&partner_cap, out_hit - in_hit, "Trade")?;

        outgoing.team_id = partner_team_id.to_string();
        incoming.team_id = proposal.team_id.clone();
        self.repos.contracts.update(&outgoing).await?;
        self.repos.contracts.update(&incoming).await?;

        team_cap.active_contracts_total += in_hit - out_hit;
        partner_cap.active_contracts_total += out_hit - in_hit;
        if team_cap.top_51_active {
            team_cap.top_51_total += in_hit - out_hit;
        }
        if partner_cap.top_51_active {
            partner_cap.top_51_total += out_hit - in_hit;
        }
        self.repos.caps.update(&team_cap).await?;
        self.repos.caps.update(&partner_cap).await?;

        self.log(
            &proposal.team_id,
            year,
            TransactionKind::Trade,
            Some(incoming.player_id),
            out_hit - in_hit,
            &format!(
                "Trade with {}: sent contract {}, received {}",
                partner_team_id, outgoing_id, incoming_id
            ),
            date,
        )
        .await?;
        self.log(
            partner_team_id,
            year,
            TransactionKind::Trade,
            Some(outgoing.player_id),
            in_hit - out_hit,
            &format!(
                "Trade with {}: sent contract {}, received {}",
                proposal.team_id, incoming_id, outgoing_id
            ),
            date,
        )
        .await?;

        Ok(json!({
            "outgoing_contract_id": outgoing_id,
            "incoming_contract_id": incoming_id,
            "team_cap_delta": out_hit - in_hit,
            "partner_cap_delta": in_hit - out_hit,
        }))
    }

    #[allow(clippy::too_many_arguments)]
    async fn log(
        &self,
        team_id: &str,
        season: i32,
        kind: TransactionKind,
        player_id: Option<Uuid>,
        cap_delta: i64,
        description: &str,
        date: SimDate,
    ) -> DomainResult<()> {
        self.repos
            .caps
            .log_transaction(&CapTransaction::new(
                &self.dynasty_id,
                team_id,
                season,
                kind,
                player_id,
                cap_delta,
                description,
                date,
            ))
            .await
    }
}
