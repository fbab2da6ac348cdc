use async_trait::async_trait;
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::str::FromStr;
use uuid::Uuid;

use domain::errors::{DomainError, DomainResult};
use domain::models::{Contract, ContractType, ContractYear, SimDate};
use domain::repositories::ContractRepository;

#[derive(Debug, Clone, sqlx::FromRow)]
struct ContractRow {
    contract_id: String,
    player_id: String,
    team_id: String,
    dynasty_id: String,
    start_year: i32,
    end_year: i32,
    contract_type: String,
    total_value: i64,
    signing_bonus: i64,
    is_active: bool,
    signed_date: String,
    voided_date: Option<String>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct YearRow {
    year: i32,
    base_salary: i64,
    roster_bonus: i64,
    workout_bonus: i64,
    option_bonus_proration: i64,
    ltbe_incentives: i64,
    guaranteed: bool,
}

impl From<YearRow> for ContractYear {
    fn from(row: YearRow) -> Self {
        ContractYear {
            year: row.year,
            base_salary: row.base_salary,
            roster_bonus: row.roster_bonus,
            workout_bonus: row.workout_bonus,
            option_bonus_proration: row.option_bonus_proration,
            ltbe_incentives: row.ltbe_incentives,
            guaranteed: row.guaranteed,
        }
    }
}

fn assemble(row: ContractRow, years: Vec<ContractYear>) -> DomainResult<Contract> {
    Ok(Contract {
        contract_id: Uuid::parse_str(&row.contract_id)
            .map_err(|e| DomainError::InternalError(format!("Bad contract id: {}", e)))?,
        player_id: Uuid::parse_str(&row.player_id)
            .map_err(|e| DomainError::InternalError(format!("Bad player id: {}", e)))?,
        team_id: row.team_id,
        dynasty_id: row.dynasty_id,
        start_year: row.start_year,
        end_year: row.end_year,
        contract_type: ContractType::from_str(&row.contract_type)?,
        total_value: row.total_value,
        signing_bonus: row.signing_bonus,
        years,
        is_active: row.is_active,
        signed_date: SimDate::from_str(&row.signed_date)?,
        voided_date: row.voided_date.as_deref().map(SimDate::from_str).transpose()?,
    })
}

const SELECT_COLUMNS: &str = r#"
    SELECT contract_id, player_id, team_id, dynasty_id, start_year, end_year,
           contract_type, total_value, signing_bonus, is_active, signed_date, voided_date
    FROM player_contracts
"#;

pub struct ContractRepo {
    pool: SqlitePool,
}

impl ContractRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn load_years(&self, contract_id: Uuid) -> DomainResult<Vec<ContractYear>> {
        let rows: Vec<YearRow> = sqlx::query_as(
            r#"
            SELECT year, base_salary, roster_bonus, workout_bonus,
                   option_bonus_proration, ltbe_incentives, guaranteed
            FROM contract_year_details
            WHERE contract_id = ?1
            ORDER BY year
            "#,
        )
        .bind(contract_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn insert_years(
        tx: &mut Transaction<'_, Sqlite>,
        contract: &Contract,
    ) -> DomainResult<()> {
        for year in &contract.years {
            sqlx::query(
                r#"
                INSERT INTO contract_year_details
                    (contract_id, year, base_salary, roster_bonus, workout_bonus,
                     option_bonus_proration, ltbe_incentives, guaranteed)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(contract.contract_id.to_string())
            .bind(year.year)
            .bind(year.base_salary)
            .bind(year.roster_bonus)
            .bind(year.workout_bonus)
            .bind(year.option_bonus_proration)
            .bind(year.ltbe_incentives)
            .bind(year.guaranteed)
            .execute(&mut **tx)
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;
        }
        Ok(())
    }
}

#[async_trait]
impl ContractRepository for ContractRepo {
    async fn insert(&self, contract: &Contract) -> DomainResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO player_contracts
                (contract_id, player_id, team_id, dynasty_id, start_year, end_year,
                 contract_type, total_value, signing_bonus, is_active, signed_date, voided_date)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(contract.contract_id.to_string())
        .bind(contract.player_id.to_string())
        .bind(&contract.team_id)
        .bind(&contract.dynasty_id)
        .bind(contract.start_year)
        .bind(contract.end_year)
        .bind(contract.contract_type.to_string())
        .bind(contract.total_value)
        .bind(contract.signing_bonus)
        .bind(contract.is_active)
        .bind(contract.signed_date.to_string())
        .bind(contract.voided_date.map(|d| d.to_string()))
        .execute(&mut *tx)
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        Self::insert_years(&mut tx, contract).await?;

        tx.commit()
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))
    }

    async fn find_by_id(&self, contract_id: Uuid) -> DomainResult<Option<Contract>> {
        let sql = format!("{} WHERE contract_id = ?1", SELECT_COLUMNS);
        let row: Option<ContractRow> = sqlx::query_as(&sql)
            .bind(contract_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        match row {
            Some(row) => {
                let years = self.load_years(contract_id).await?;
                Ok(Some(assemble(row, years)?))
            }
            None => Ok(None),
        }
    }

    async fn find_active_by_player(
        &self,
        dynasty_id: &str,
        player_id: Uuid,
    ) -> DomainResult<Option<Contract>> {
        let sql = format!(
            "{} WHERE dynasty_id = ?1 AND player_id = ?2 AND is_active = 1",
            SELECT_COLUMNS
        );
        let row: Option<ContractRow> = sqlx::query_as(&sql)
            .bind(dynasty_id)
            .bind(player_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        match row {
            Some(row) => {
                let id = Uuid::parse_str(&row.contract_id)
                    .map_err(|e| DomainError::InternalError(format!("Bad contract id: {}", e)))?;
                let years = self.load_years(id).await?;
                Ok(Some(assemble(row, years)?))
            }
            None => Ok(None),
        }
    }

    async fn list_active_by_team(
        &self,
        dynasty_id: &str,
        team_id: &str,
    ) -> DomainResult<Vec<Contract>> {
        let sql = format!(
            "{} WHERE dynasty_id = ?1 AND team_id = ?2 AND is_active = 1 ORDER BY contract_id",
            SELECT_COLUMNS
        );
        let rows: Vec<ContractRow> = sqlx::query_as(&sql)
            .bind(dynasty_id)
            .bind(team_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        let mut contracts = Vec::with_capacity(rows.len());
        for row in rows {
            let id = Uuid::parse_str(&row.contract_id)
                .map_err(|e| DomainError::InternalError(format!("Bad contract id: {}", e)))?;
            let years = self.load_years(id).await?;
            contracts.push(assemble(row, years)?);
        }
        Ok(contracts)
    }

    async fn update(&self, contract: &Contract) -> DomainResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        let result = sqlx::query(
            r#"
            UPDATE player_contracts
            SET team_id = ?2, start_year = ?3, end_year = ?4, contract_type = ?5,
                total_value = ?6, signing_bonus = ?7, is_active = ?8,
                signed_date = ?9, voided_date = ?10
            WHERE contract_id = ?1
            "#,
        )
        .bind(contract.contract_id.to_string())
        .bind(&contract.team_id)
        .bind(contract.start_year)
        .bind(contract.end_year)
        .bind(contract.contract_type.to_string())
        .bind(contract.total_value)
        .bind(contract.signing_bonus)
        .bind(contract.is_active)
        .bind(contract.signed_date.to_string())
        .bind(contract.voided_date.map(|d| d.to_string()))
        .execute(&mut *tx)
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound(format!(
                "Contract {}",
                contract.contract_id
            )));
        }

        sqlx::query("DELETE FROM contract_year_details WHERE contract_id = ?1")
            .bind(contract.contract_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;
        Self::insert_years(&mut tx, contract).await?;

        tx.commit()
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::create_memory_pool;
    use crate::schema::migrate;

    async fn setup() -> ContractRepo {
        let pool = create_memory_pool().await.unwrap();
        migrate(&pool).await.unwrap();
        sqlx::query(
            "INSERT INTO dynasties (dynasty_id, dynasty_name, created_at) VALUES ('d1', 'd1', '2025-01-01')",
        )
        .execute(&pool)
        .await
        .unwrap();
        ContractRepo::new(pool)
    }

    fn sample_contract(player_id: Uuid, team_id: &str) -> Contract {
        let years = (2025..=2028)
            .map(|y| ContractYear::new(y, 8_000_000))
            .collect();
        Contract::new(
            player_id,
            team_id,
            "d1",
            2025,
            2028,
            ContractType::Veteran,
            8_000_000,
            years,
            SimDate::new(2025, 3, 12).unwrap(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_find_round_trip() {
        let repo = setup().await;
        let player_id = Uuid::new_v4();
        let contract = sample_contract(player_id, "KC");
        repo.insert(&contract).await.unwrap();

        let found = repo.find_by_id(contract.contract_id).await.unwrap().unwrap();
        assert_eq!(found, contract);
        assert_eq!(found.years.len(), 4);
        assert_eq!(found.cap_hit(2025), 10_000_000);
    }

    #[tokio::test]
    async fn test_find_active_by_player() {
        let repo = setup().await;
        let player_id = Uuid::new_v4();
        let mut contract = sample_contract(player_id, "KC");
        repo.insert(&contract).await.unwrap();

        let active = repo
            .find_active_by_player("d1", player_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(active.contract_id, contract.contract_id);

        // Voided contracts are no longer active.
        contract.void(SimDate::new(2026, 3, 15).unwrap());
        repo.update(&contract).await.unwrap();
        assert!(repo
            .find_active_by_player("d1", player_id)
            .await
            .unwrap()
            .is_none());

        // And never visible from another dynasty.
        assert!(repo
            .find_active_by_player("d2", player_id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_list_active_by_team_and_trade_move() {
        let repo = setup().await;
        let contract_a = sample_contract(Uuid::new_v4(), "KC");
        let contract_b = sample_contract(Uuid::new_v4(), "KC");
        repo.insert(&contract_a).await.unwrap();
        repo.insert(&contract_b).await.unwrap();

        assert_eq!(repo.list_active_by_team("d1", "KC").await.unwrap().len(), 2);

        // Moving a contract to another team reflects in both lists.
        let mut traded = contract_b.clone();
        traded.team_id = "DEN".to_string();
        repo.update(&traded).await.unwrap();

        assert_eq!(repo.list_active_by_team("d1", "KC").await.unwrap().len(), 1);
        assert_eq!(repo.list_active_by_team("d1", "DEN").await.unwrap().len(), 1);
    }
}
