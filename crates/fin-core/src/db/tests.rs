//! Database tests

use super::*;
use crate::budgets::{Budget, BudgetPeriod, BudgetType};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rusqlite::params;
    use std::collections::BTreeMap;

    fn sample_budget(id: &str, user_id: &str, budget_type: BudgetType) -> Budget {
        let start = Utc.with_ymd_and_hms(2025, 11, 1, 0, 0, 0).unwrap();
        Budget {
            id: id.to_string(),
            user_id: user_id.to_string(),
            name: format!("Budget {}", id),
            budget_type,
            period: BudgetPeriod::Monthly,
            categories: BTreeMap::from([
                ("Groceries".to_string(), 600.0),
                ("Restaurants".to_string(), 200.0),
                ("Transportation".to_string(), 150.5),
            ]),
            start_date: start,
            end_date: start + Duration::days(30),
            rollover_enabled: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_in_memory_db() {
        let db = Database::in_memory().unwrap();
        assert!(db.list_budgets("nobody", None).unwrap().is_empty());
        assert!(db.list_audit_log(10).unwrap().is_empty());
    }

    #[test]
    fn test_schema_tables_exist() {
        let db = Database::in_memory().unwrap();
        let conn = db.conn().unwrap();

        for table in ["budgets", "budget_categories", "audit_log"] {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
                    params![table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "missing table {}", table);
        }
    }

    #[test]
    fn test_foreign_keys_enabled_on_every_connection() {
        let db = Database::in_memory().unwrap();
        let a = db.conn().unwrap();
        let b = db.conn().unwrap();
        for conn in [&a, &b] {
            let enabled: i64 = conn
                .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
                .unwrap();
            assert_eq!(enabled, 1);
        }
    }

    #[test]
    fn test_budget_roundtrip() {
        let db = Database::in_memory().unwrap();
        let budget = sample_budget("bud_aaaaaaaaaaaa", "user_1", BudgetType::Personal);

        db.insert_budget(&budget).unwrap();
        let fetched = db.get_budget(&budget.id).unwrap().unwrap();
        assert_eq!(fetched, budget);

        assert!(db.get_budget("bud_missing").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_budget_id_rejected() {
        let db = Database::in_memory().unwrap();
        let budget = sample_budget("bud_aaaaaaaaaaaa", "user_1", BudgetType::Personal);

        db.insert_budget(&budget).unwrap();
        assert!(db.insert_budget(&budget).is_err());
        // Failed insert must not leave partial category rows behind
        assert_eq!(db.count_budget_categories(&budget.id).unwrap(), 3);
    }

    #[test]
    fn test_list_budgets_filters() {
        let db = Database::in_memory().unwrap();
        db.insert_budget(&sample_budget("bud_000000000001", "user_1", BudgetType::Personal))
            .unwrap();
        db.insert_budget(&sample_budget("bud_000000000002", "user_1", BudgetType::Business))
            .unwrap();
        db.insert_budget(&sample_budget("bud_000000000003", "user_2", BudgetType::Personal))
            .unwrap();

        let all = db.list_budgets("user_1", None).unwrap();
        assert_eq!(all.len(), 2);
        // Newest first
        assert_eq!(all[0].id, "bud_000000000002");
        assert_eq!(all[0].categories.len(), 3);

        let business = db.list_budgets("user_1", Some(BudgetType::Business)).unwrap();
        assert_eq!(business.len(), 1);
        assert_eq!(business[0].budget_type, BudgetType::Business);

        assert!(db
            .list_budgets("user_2", Some(BudgetType::Business))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_update_replaces_categories() {
        let db = Database::in_memory().unwrap();
        let mut budget = sample_budget("bud_aaaaaaaaaaaa", "user_1", BudgetType::Personal);
        db.insert_budget(&budget).unwrap();

        budget.name = "Renamed".to_string();
        budget.categories = BTreeMap::from([("Rent".to_string(), 1800.0)]);
        budget.rollover_enabled = true;
        assert!(db.update_budget(&budget).unwrap());

        let fetched = db.get_budget(&budget.id).unwrap().unwrap();
        assert_eq!(fetched.name, "Renamed");
        assert!(fetched.rollover_enabled);
        assert_eq!(fetched.categories.len(), 1);
        assert_eq!(fetched.categories["Rent"], 1800.0);

        let ghost = sample_budget("bud_bbbbbbbbbbbb", "user_1", BudgetType::Personal);
        assert!(!db.update_budget(&ghost).unwrap());
    }

    #[test]
    fn test_delete_cascades_categories() {
        let db = Database::in_memory().unwrap();
        let budget = sample_budget("bud_aaaaaaaaaaaa", "user_1", BudgetType::Personal);
        db.insert_budget(&budget).unwrap();
        assert_eq!(db.count_budget_categories(&budget.id).unwrap(), 3);

        assert!(db.delete_budget(&budget.id).unwrap());
        assert_eq!(db.count_budget_categories(&budget.id).unwrap(), 0);
        assert!(!db.delete_budget(&budget.id).unwrap());
    }

    #[test]
    fn test_audit_log() {
        let db = Database::in_memory().unwrap();

        let id = db
            .log_audit(
                "alice@example.com",
                "credit_score_accessed",
                Some("credit_score"),
                Some("user_1"),
                Some("bureau=experian"),
            )
            .unwrap();
        assert!(id > 0);

        db.log_audit("bob@example.com", "budget_created", Some("budget"), Some("bud_1"), None)
            .unwrap();
        db.log_audit("alice@example.com", "credit_score_accessed", None, None, None)
            .unwrap();

        let entries = db.list_audit_log(10).unwrap();
        assert_eq!(entries.len(), 3);
        // Same-second entries fall back to insertion order, newest first
        assert_eq!(entries[0].entity_id, None);
        assert_eq!(entries[2].user_email, "alice@example.com");
        assert_eq!(entries[2].details.as_deref(), Some("bureau=experian"));

        let limited = db.list_audit_log(1).unwrap();
        assert_eq!(limited.len(), 1);

        let credit = db.list_audit_by_action("credit_score_accessed", 10).unwrap();
        assert_eq!(credit.len(), 2);
        assert!(credit.iter().all(|e| e.action == "credit_score_accessed"));
    }

    #[test]
    fn test_encrypted_db_requires_key() {
        let path = std::env::temp_dir().join(format!("fin_enc_test_{}.db", std::process::id()));
        let path = path.to_string_lossy().to_string();
        let _ = std::fs::remove_file(&path);

        {
            let db = Database::new_with_key(&path, Some("correct horse")).unwrap();
            let budget = sample_budget("bud_aaaaaaaaaaaa", "user_1", BudgetType::Personal);
            db.insert_budget(&budget).unwrap();
        }

        let reopened = Database::new_with_key(&path, Some("correct horse")).unwrap();
        assert!(reopened.get_budget("bud_aaaaaaaaaaaa").unwrap().is_some());

        assert!(Database::new_with_key(&path, Some("wrong")).is_err());

        let _ = std::fs::remove_file(&path);
    }
}
