use async_trait::async_trait;
use sqlx::SqlitePool;
use std::str::FromStr;
use uuid::Uuid;

use domain::errors::{DomainError, DomainResult};
use domain::models::{
    CapTransaction, DeadMoney, FranchiseTagRow, RfaTenderRow, SimDate, TeamCap, TransactionKind,
};
use domain::repositories::CapRepository;

#[derive(Debug, Clone, sqlx::FromRow)]
struct TeamCapRow {
    dynasty_id: String,
    team_id: String,
    season: i32,
    cap_limit: i64,
    carryover: i64,
    active_contracts_total: i64,
    dead_money_total: i64,
    ltbe_total: i64,
    nltbe_credit: i64,
    practice_squad_total: i64,
    top_51_active: bool,
    top_51_total: i64,
}

impl From<TeamCapRow> for TeamCap {
    fn from(row: TeamCapRow) -> Self {
        TeamCap {
            team_id: row.team_id,
            season: row.season,
            dynasty_id: row.dynasty_id,
            cap_limit: row.cap_limit,
            carryover: row.carryover,
            active_contracts_total: row.active_contracts_total,
            dead_money_total: row.dead_money_total,
            ltbe_total: row.ltbe_total,
            nltbe_credit: row.nltbe_credit,
            practice_squad_total: row.practice_squad_total,
            top_51_active: row.top_51_active,
            top_51_total: row.top_51_total,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct DeadMoneyRow {
    id: String,
    dynasty_id: String,
    team_id: String,
    player_id: String,
    contract_id: String,
    season: i32,
    amount: i64,
    june_1: bool,
    created_date: String,
}

impl TryFrom<DeadMoneyRow> for DeadMoney {
    type Error = DomainError;

    fn try_from(row: DeadMoneyRow) -> Result<Self, Self::Error> {
        Ok(DeadMoney {
            id: Uuid::parse_str(&row.id)
                .map_err(|e| DomainError::InternalError(format!("Bad dead money id: {}", e)))?,
            dynasty_id: row.dynasty_id,
            team_id: row.team_id,
            player_id: Uuid::parse_str(&row.player_id)
                .map_err(|e| DomainError::InternalError(format!("Bad player id: {}", e)))?,
            contract_id: Uuid::parse_str(&row.contract_id)
                .map_err(|e| DomainError::InternalError(format!("Bad contract id: {}", e)))?,
            season: row.season,
            amount: row.amount,
            june_1: row.june_1,
            created_date: SimDate::from_str(&row.created_date)?,
        })
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct RfaTenderDbRow {
    id: String,
    dynasty_id: String,
    team_id: String,
    player_id: String,
    season: i32,
    tender_amount: i64,
    applied_date: String,
}

impl TryFrom<RfaTenderDbRow> for RfaTenderRow {
    type Error = DomainError;

    fn try_from(row: RfaTenderDbRow) -> Result<Self, Self::Error> {
        Ok(RfaTenderRow {
            id: Uuid::parse_str(&row.id)
                .map_err(|e| DomainError::InternalError(format!("Bad tender id: {}", e)))?,
            dynasty_id: row.dynasty_id,
            team_id: row.team_id,
            player_id: Uuid::parse_str(&row.player_id)
                .map_err(|e| DomainError::InternalError(format!("Bad player id: {}", e)))?,
            season: row.season,
            tender_amount: row.tender_amount,
            applied_date: SimDate::from_str(&row.applied_date)?,
        })
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct CapTransactionRow {
    id: String,
    dynasty_id: String,
    team_id: String,
    season: i32,
    kind: String,
    player_id: Option<String>,
    cap_delta: i64,
    description: String,
    date: String,
}

impl TryFrom<CapTransactionRow> for CapTransaction {
    type Error = DomainError;

    fn try_from(row: CapTransactionRow) -> Result<Self, Self::Error> {
        Ok(CapTransaction {
            id: Uuid::parse_str(&row.id)
                .map_err(|e| DomainError::InternalError(format!("Bad transaction id: {}", e)))?,
            dynasty_id: row.dynasty_id,
            team_id: row.team_id,
            season: row.season,
            kind: TransactionKind::from_str(&row.kind)?,
            player_id: row
                .player_id
                .as_deref()
                .map(Uuid::parse_str)
                .transpose()
                .map_err(|e| DomainError::InternalError(format!("Bad player id: {}", e)))?,
            cap_delta: row.cap_delta,
            description: row.description,
            date: SimDate::from_str(&row.date)?,
        })
    }
}

pub struct CapRepo {
    pool: SqlitePool,
}

impl CapRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CapRepository for CapRepo {
    async fn get_or_create(
        &self,
        dynasty_id: &str,
        team_id: &str,
        season: i32,
        default_limit: i64,
    ) -> DomainResult<TeamCap> {
        // The league history table overrides the caller's default.
        let limit = self.cap_limit_for(season).await?.unwrap_or(default_limit);

        sqlx::query(
            r#"
            INSERT INTO team_salary_cap (dynasty_id, team_id, season, cap_limit)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (dynasty_id, team_id, season) DO NOTHING
            "#,
        )
        .bind(dynasty_id)
        .bind(team_id)
        .bind(season)
        .bind(limit)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        let row: TeamCapRow = sqlx::query_as(
            r#"
            SELECT dynasty_id, team_id, season, cap_limit, carryover,
                   active_contracts_total, dead_money_total, ltbe_total,
                   nltbe_credit, practice_squad_total, top_51_active, top_51_total
            FROM team_salary_cap
            WHERE dynasty_id = ?1 AND team_id = ?2 AND season = ?3
            "#,
        )
        .bind(dynasty_id)
        .bind(team_id)
        .bind(season)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        Ok(row.into())
    }

    async fn update(&self, cap: &TeamCap) -> DomainResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE team_salary_cap
            SET cap_limit = ?4, carryover = ?5, active_contracts_total = ?6,
                dead_money_total = ?7, ltbe_total = ?8, nltbe_credit = ?9,
                practice_squad_total = ?10, top_51_active = ?11, top_51_total = ?12
            WHERE dynasty_id = ?1 AND team_id = ?2 AND season = ?3
            "#,
        )
        .bind(&cap.dynasty_id)
        .bind(&cap.team_id)
        .bind(cap.season)
        .bind(cap.cap_limit)
        .bind(cap.carryover)
        .bind(cap.active_contracts_total)
        .bind(cap.dead_money_total)
        .bind(cap.ltbe_total)
        .bind(cap.nltbe_credit)
        .bind(cap.practice_squad_total)
        .bind(cap.top_51_active)
        .bind(cap.top_51_total)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound(format!(
                "Cap sheet ({}, {}, {})",
                cap.dynasty_id, cap.team_id, cap.season
            )));
        }
        Ok(())
    }

    async fn insert_dead_money(&self, dead_money: &DeadMoney) -> DomainResult<()> {
        sqlx::query(
            r#"
            INSERT INTO dead_money
                (id, dynasty_id, team_id, player_id, contract_id, season, amount, june_1, created_date)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(dead_money.id.to_string())
        .bind(&dead_money.dynasty_id)
        .bind(&dead_money.team_id)
        .bind(dead_money.player_id.to_string())
        .bind(dead_money.contract_id.to_string())
        .bind(dead_money.season)
        .bind(dead_money.amount)
        .bind(dead_money.june_1)
        .bind(dead_money.created_date.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;
        Ok(())
    }

    async fn list_dead_money(
        &self,
        dynasty_id: &str,
        team_id: &str,
        season: i32,
    ) -> DomainResult<Vec<DeadMoney>> {
        let rows: Vec<DeadMoneyRow> = sqlx::query_as(
            r#"
            SELECT id, dynasty_id, team_id, player_id, contract_id, season, amount, june_1, created_date
            FROM dead_money
            WHERE dynasty_id = ?1 AND team_id = ?2 AND season = ?3
            ORDER BY created_date
            "#,
        )
        .bind(dynasty_id)
        .bind(team_id)
        .bind(season)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn insert_franchise_tag(&self, tag: &FranchiseTagRow) -> DomainResult<()> {
        sqlx::query(
            r#"
            INSERT INTO franchise_tags
                (id, dynasty_id, team_id, player_id, season, tag_salary, applied_date)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(tag.id.to_string())
        .bind(&tag.dynasty_id)
        .bind(&tag.team_id)
        .bind(tag.player_id.to_string())
        .bind(tag.season)
        .bind(tag.tag_salary)
        .bind(tag.applied_date.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;
        Ok(())
    }

    async fn insert_rfa_tender(&self, tender: &RfaTenderRow) -> DomainResult<()> {
        sqlx::query(
            r#"
            INSERT INTO rfa_tenders
                (id, dynasty_id, team_id, player_id, season, tender_amount, applied_date)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(tender.id.to_string())
        .bind(&tender.dynasty_id)
        .bind(&tender.team_id)
        .bind(tender.player_id.to_string())
        .bind(tender.season)
        .bind(tender.tender_amount)
        .bind(tender.applied_date.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;
        Ok(())
    }

    async fn list_rfa_tenders(
        &self,
        dynasty_id: &str,
        team_id: &str,
        season: i32,
    ) -> DomainResult<Vec<RfaTenderRow>> {
        let rows: Vec<RfaTenderDbRow> = sqlx::query_as(
            r#"
            SELECT id, dynasty_id, team_id, player_id, season, tender_amount, applied_date
            FROM rfa_tenders
            WHERE dynasty_id = ?1 AND team_id = ?2 AND season = ?3
            ORDER BY applied_date
            "#,
        )
        .bind(dynasty_id)
        .bind(team_id)
        .bind(season)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn log_transaction(&self, transaction: &CapTransaction) -> DomainResult<()> {
        sqlx::query(
            r#"
            INSERT INTO cap_transactions
                (id, dynasty_id, team_id, season, kind, player_id, cap_delta, description, date)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(transaction.id.to_string())
        .bind(&transaction.dynasty_id)
        .bind(&transaction.team_id)
        .bind(transaction.season)
        .bind(transaction.kind.to_string())
        .bind(transaction.player_id.map(|id| id.to_string()))
        .bind(transaction.cap_delta)
        .bind(&transaction.description)
        .bind(transaction.date.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;
        Ok(())
    }

    async fn list_transactions(
        &self,
        dynasty_id: &str,
        team_id: &str,
        season: i32,
    ) -> DomainResult<Vec<CapTransaction>> {
        let rows: Vec<CapTransactionRow> = sqlx::query_as(
            r#"
            SELECT id, dynasty_id, team_id, season, kind, player_id, cap_delta, description, date
            FROM cap_transactions
            WHERE dynasty_id = ?1 AND team_id = ?2 AND season = ?3
            ORDER BY date
            "#,
        )
        .bind(dynasty_id)
        .bind(team_id)
        .bind(season)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn cap_limit_for(&self, season: i32) -> DomainResult<Option<i64>> {
        let limit: Option<i64> = sqlx::query_scalar(
            "SELECT cap_limit FROM league_salary_cap_history WHERE season = ?1",
        )
        .bind(season)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;
        Ok(limit)
    }

    async fn set_cap_limit(&self, season: i32, cap_limit: i64) -> DomainResult<()> {
        sqlx::query(
            r#"
            INSERT INTO league_salary_cap_history (season, cap_limit)
            VALUES (?1, ?2)
            ON CONFLICT (season) DO UPDATE SET cap_limit = excluded.cap_limit
            "#,
        )
        .bind(season)
        .bind(cap_limit)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::create_memory_pool;
    use crate::schema::migrate;

    async fn setup() -> CapRepo {
        let pool = create_memory_pool().await.unwrap();
        migrate(&pool).await.unwrap();
        sqlx::query(
            "INSERT INTO dynasties (dynasty_id, dynasty_name, created_at) VALUES ('d1', 'd1', '2025-01-01')",
        )
        .execute(&pool)
        .await
        .unwrap();
        CapRepo::new(pool)
    }

    #[tokio::test]
    async fn test_get_or_create_uses_history_limit() {
        let repo = setup().await;
        repo.set_cap_limit(2025, 255_000_000).await.unwrap();

        let cap = repo
            .get_or_create("d1", "KC", 2025, 200_000_000)
            .await
            .unwrap();
        assert_eq!(cap.cap_limit, 255_000_000);

        // No history for 2026: the default applies.
        let next = repo
            .get_or_create("d1", "KC", 2026, 200_000_000)
            .await
            .unwrap();
        assert_eq!(next.cap_limit, 200_000_000);
    }

    #[tokio::test]
    async fn test_update_round_trip() {
        let repo = setup().await;
        let mut cap = repo
            .get_or_create("d1", "KC", 2025, 255_000_000)
            .await
            .unwrap();
        cap.active_contracts_total = 230_000_000;
        cap.dead_money_total = 12_000_000;
        cap.top_51_active = true;
        cap.top_51_total = 210_000_000;
        repo.update(&cap).await.unwrap();

        let reloaded = repo
            .get_or_create("d1", "KC", 2025, 255_000_000)
            .await
            .unwrap();
        assert_eq!(reloaded, cap);
        assert_eq!(reloaded.cap_space(), 255_000_000 - 210_000_000 - 12_000_000);
    }

    #[tokio::test]
    async fn test_rfa_tenders_round_trip() {
        let repo = setup().await;
        let tender = RfaTenderRow {
            id: Uuid::new_v4(),
            dynasty_id: "d1".to_string(),
            team_id: "KC".to_string(),
            player_id: Uuid::new_v4(),
            season: 2026,
            tender_amount: 3_200_000,
            applied_date: SimDate::new(2026, 2, 25).unwrap(),
        };
        repo.insert_rfa_tender(&tender).await.unwrap();

        let listed = repo.list_rfa_tenders("d1", "KC", 2026).await.unwrap();
        assert_eq!(listed, vec![tender]);
        assert!(repo.list_rfa_tenders("d1", "KC", 2025).await.unwrap().is_empty());
        assert!(repo.list_rfa_tenders("d2", "KC", 2026).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dead_money_and_transactions_scoped() {
        let repo = setup().await;
        let contract = {
            use domain::models::{Contract, ContractType, ContractYear};
            let years = (2025..=2026)
                .map(|y| ContractYear::new(y, 5_000_000))
                .collect();
            Contract::new(
                Uuid::new_v4(),
                "KC",
                "d1",
                2025,
                2026,
                ContractType::Veteran,
                4_000_000,
                years,
                SimDate::new(2025, 3, 12).unwrap(),
            )
            .unwrap()
        };

        let dm = DeadMoney::new(
            &contract,
            2025,
            4_000_000,
            false,
            SimDate::new(2025, 10, 1).unwrap(),
        );
        repo.insert_dead_money(&dm).await.unwrap();
        let listed = repo.list_dead_money("d1", "KC", 2025).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].amount, 4_000_000);
        assert!(repo.list_dead_money("d1", "KC", 2026).await.unwrap().is_empty());

        let tx = CapTransaction::new(
            "d1",
            "KC",
            2025,
            TransactionKind::PlayerRelease,
            Some(contract.player_id),
            1_000_000,
            "released",
            SimDate::new(2025, 10, 1).unwrap(),
        );
        repo.log_transaction(&tx).await.unwrap();
        let logged = repo.list_transactions("d1", "KC", 2025).await.unwrap();
        assert_eq!(logged.len(), 1);
        assert_eq!(logged[0].kind, TransactionKind::PlayerRelease);
    }
}
