//! Budget operations

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{parse_timestamp, Database};
use crate::budgets::{Budget, BudgetPeriod, BudgetType};
use crate::error::Result;

const BUDGET_COLUMNS: &str = "id, user_id, name, type, period, start_date, end_date, \
                              rollover_enabled, created_at, updated_at";

fn enum_column<T: std::str::FromStr<Err = String>>(row: &Row, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    raw.parse().map_err(|e: String| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            e.into(),
        )
    })
}

/// Fixed-width so stored timestamps sort lexically
fn timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Map a `budgets` row; categories are filled in separately
fn row_to_budget(row: &Row) -> rusqlite::Result<Budget> {
    let budget_type: BudgetType = enum_column(row, 3)?;
    let period: BudgetPeriod = enum_column(row, 4)?;
    let start_date: String = row.get(5)?;
    let end_date: String = row.get(6)?;
    let created_at: String = row.get(8)?;
    let updated_at: String = row.get(9)?;

    Ok(Budget {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        budget_type,
        period,
        categories: BTreeMap::new(),
        start_date: parse_timestamp(&start_date)?,
        end_date: parse_timestamp(&end_date)?,
        rollover_enabled: row.get(7)?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

fn load_categories(conn: &Connection, budget_id: &str) -> Result<BTreeMap<String, f64>> {
    let mut stmt = conn.prepare("SELECT name, amount FROM budget_categories WHERE budget_id = ?")?;
    let categories = stmt
        .query_map(params![budget_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
        })?
        .collect::<std::result::Result<BTreeMap<_, _>, _>>()?;
    Ok(categories)
}

fn write_categories(
    conn: &Connection,
    budget_id: &str,
    categories: &BTreeMap<String, f64>,
) -> Result<()> {
    conn.execute(
        "DELETE FROM budget_categories WHERE budget_id = ?",
        params![budget_id],
    )?;
    let mut stmt =
        conn.prepare("INSERT INTO budget_categories (budget_id, name, amount) VALUES (?, ?, ?)")?;
    for (name, amount) in categories {
        stmt.execute(params![budget_id, name, amount])?;
    }
    Ok(())
}

impl Database {
    /// Insert a budget and its categories
    pub fn insert_budget(&self, budget: &Budget) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        tx.execute(
            r#"
            INSERT INTO budgets (id, user_id, name, type, period, start_date, end_date,
                                 rollover_enabled, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                budget.id,
                budget.user_id,
                budget.name,
                budget.budget_type.as_str(),
                budget.period.as_str(),
                timestamp(&budget.start_date),
                timestamp(&budget.end_date),
                budget.rollover_enabled,
                timestamp(&budget.created_at),
                timestamp(&budget.updated_at),
            ],
        )?;
        write_categories(&tx, &budget.id, &budget.categories)?;

        tx.commit()?;
        Ok(())
    }

    /// Get a budget by ID
    pub fn get_budget(&self, id: &str) -> Result<Option<Budget>> {
        let conn = self.conn()?;

        let budget = conn
            .query_row(
                &format!("SELECT {} FROM budgets WHERE id = ?", BUDGET_COLUMNS),
                params![id],
                row_to_budget,
            )
            .optional()?;

        match budget {
            Some(mut budget) => {
                budget.categories = load_categories(&conn, &budget.id)?;
                Ok(Some(budget))
            }
            None => Ok(None),
        }
    }

    /// List a user's budgets, newest first
    pub fn list_budgets(
        &self,
        user_id: &str,
        budget_type: Option<BudgetType>,
    ) -> Result<Vec<Budget>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {} FROM budgets
            WHERE user_id = ?1 AND (?2 IS NULL OR type = ?2)
            ORDER BY created_at DESC, rowid DESC
            "#,
            BUDGET_COLUMNS
        ))?;

        let mut budgets = stmt
            .query_map(
                params![user_id, budget_type.map(|t| t.as_str())],
                row_to_budget,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        for budget in &mut budgets {
            budget.categories = load_categories(&conn, &budget.id)?;
        }

        Ok(budgets)
    }

    /// Replace a budget's fields and categories; returns false if it doesn't exist
    pub fn update_budget(&self, budget: &Budget) -> Result<bool> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let updated = tx.execute(
            r#"
            UPDATE budgets
            SET name = ?, type = ?, period = ?, start_date = ?, end_date = ?,
                rollover_enabled = ?, updated_at = ?
            WHERE id = ?
            "#,
            params![
                budget.name,
                budget.budget_type.as_str(),
                budget.period.as_str(),
                timestamp(&budget.start_date),
                timestamp(&budget.end_date),
                budget.rollover_enabled,
                timestamp(&budget.updated_at),
                budget.id,
            ],
        )?;

        if updated == 0 {
            return Ok(false);
        }

        write_categories(&tx, &budget.id, &budget.categories)?;
        tx.commit()?;
        Ok(true)
    }

    /// Delete a budget (categories cascade); returns false if it didn't exist
    pub fn delete_budget(&self, id: &str) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM budgets WHERE id = ?", params![id])?;
        Ok(deleted > 0)
    }

    /// Number of category rows stored for a budget
    pub fn count_budget_categories(&self, budget_id: &str) -> Result<i64> {
        let conn = self.conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM budget_categories WHERE budget_id = ?",
            params![budget_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
