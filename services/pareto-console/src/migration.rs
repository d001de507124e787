//! One-shot schema fix for the `tenants` table.
//!
//! The console only renders the SQL; an operator runs it with their own
//! database client. Every statement is safe to run more than once.

use std::fmt::Write as _;

pub const TENANTS_TABLE: &str = "tenants";

/// A column the tenants table must have
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnAddition {
    pub table: &'static str,
    pub column: &'static str,
    pub sql_type: &'static str,
    pub default: &'static str,
}

impl ColumnAddition {
    /// `ALTER TABLE ... ADD COLUMN IF NOT EXISTS ...;`
    pub fn to_sql(&self) -> String {
        format!(
            "ALTER TABLE {} ADD COLUMN IF NOT EXISTS {} {} DEFAULT {};",
            self.table, self.column, self.sql_type, self.default
        )
    }
}

pub static TENANT_TIMESTAMPS: [ColumnAddition; 2] = [
    ColumnAddition {
        table: TENANTS_TABLE,
        column: "created_at",
        sql_type: "TIMESTAMP",
        default: "CURRENT_TIMESTAMP",
    },
    ColumnAddition {
        table: TENANTS_TABLE,
        column: "updated_at",
        sql_type: "TIMESTAMP",
        default: "CURRENT_TIMESTAMP",
    },
];

/// Query listing the table's columns after the migration ran
pub fn schema_query(table: &str) -> String {
    format!(
        "SELECT column_name, data_type, column_default \
         FROM information_schema.columns \
         WHERE table_name = '{table}' \
         ORDER BY ordinal_position;"
    )
}

/// Columns still missing given the ones a database already has.
///
/// Applying the migration and asking again yields nothing, which is what
/// makes a second run a no-op.
pub fn pending(existing: &[&str]) -> Vec<&'static ColumnAddition> {
    TENANT_TIMESTAMPS
        .iter()
        .filter(|addition| {
            !existing
                .iter()
                .any(|column| column.eq_ignore_ascii_case(addition.column))
        })
        .collect()
}

/// Full script: one transaction with both column additions, then the
/// verification query
pub fn render() -> String {
    let mut script = String::new();
    let _ = writeln!(
        script,
        "-- Add missing timestamp columns to {TENANTS_TABLE}"
    );
    script.push_str("BEGIN;\n");
    for addition in &TENANT_TIMESTAMPS {
        script.push_str(&addition.to_sql());
        script.push('\n');
    }
    script.push_str("COMMIT;\n\n");
    script.push_str(&schema_query(TENANTS_TABLE));
    script.push('\n');
    script
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statements_are_idempotent() {
        for addition in &TENANT_TIMESTAMPS {
            assert!(addition.to_sql().contains("ADD COLUMN IF NOT EXISTS"));
        }
        assert_eq!(
            TENANT_TIMESTAMPS[0].to_sql(),
            "ALTER TABLE tenants ADD COLUMN IF NOT EXISTS created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP;"
        );
    }

    #[test]
    fn second_run_has_nothing_pending() {
        let before = ["id", "company_name", "is_active"];
        let first: Vec<&str> = pending(&before).iter().map(|a| a.column).collect();
        assert_eq!(first, ["created_at", "updated_at"]);

        let after = ["id", "company_name", "is_active", "created_at", "updated_at"];
        assert!(pending(&after).is_empty());
    }

    #[test]
    fn partially_migrated_table_gets_the_rest() {
        let existing = ["id", "CREATED_AT"];
        let left: Vec<&str> = pending(&existing).iter().map(|a| a.column).collect();
        assert_eq!(left, ["updated_at"]);
    }

    #[test]
    fn script_wraps_statements_in_a_transaction() {
        let script = render();
        let begin = script.find("BEGIN;").unwrap();
        let commit = script.find("COMMIT;").unwrap();
        let created = script.find("created_at").unwrap();
        assert!(begin < created && created < commit);
        assert!(script.contains("information_schema.columns"));
        assert!(script.contains("table_name = 'tenants'"));
        assert_eq!(script.matches("ALTER TABLE").count(), 2);
    }
}
