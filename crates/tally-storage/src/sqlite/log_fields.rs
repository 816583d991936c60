//! User-defined daily-log fields for [`SqliteStore`].

use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::{debug, info};

use tally_core::daily_log::LogField;
use tally_core::enums::FieldType;
use tally_core::validation::validate_field_name;

use crate::error::{Result, StorageError};
use crate::sqlite::convert::parse_enum;
use crate::sqlite::store::SqliteStore;

const FIELD_COLUMNS: &str = "id, user, name, type, display_order, is_active";

fn scan_field(row: &Row<'_>) -> rusqlite::Result<LogField> {
    let field_type: String = row.get(3)?;
    Ok(LogField {
        id: row.get(0)?,
        user: row.get(1)?,
        name: row.get(2)?,
        field_type: parse_enum(3, &field_type)?,
        display_order: row.get(4)?,
        is_active: row.get(5)?,
    })
}

fn field_order_on_conn(conn: &Connection, user: &str, id: i64) -> Result<i64> {
    conn.query_row(
        "SELECT display_order FROM log_fields WHERE id = ?1 AND user = ?2 AND is_active = 1",
        params![id, user],
        |row| row.get(0),
    )
    .optional()?
    .ok_or_else(|| StorageError::not_found("log field", id))
}

impl SqliteStore {
    /// Active fields ordered for display.
    pub fn get_log_fields_impl(&self, user: &str) -> Result<Vec<LogField>> {
        let conn = self.lock_conn()?;
        let sql = format!(
            "SELECT {FIELD_COLUMNS} FROM log_fields
             WHERE user = ?1 AND is_active = 1
             ORDER BY display_order, id"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![user], scan_field)?;
        let mut fields = Vec::new();
        for row in rows {
            fields.push(row?);
        }
        Ok(fields)
    }

    /// Adds a field at the end of the active list.
    pub fn create_log_field_impl(
        &self,
        user: &str,
        name: &str,
        field_type: FieldType,
    ) -> Result<LogField> {
        let name = validate_field_name(name)?;
        let conn = self.lock_conn()?;
        let sql = format!(
            "INSERT INTO log_fields (user, name, type, display_order, is_active)
             VALUES (
                 ?1, ?2, ?3,
                 (SELECT COALESCE(MAX(display_order) + 1, 0)
                    FROM log_fields WHERE user = ?1 AND is_active = 1),
                 1)
             RETURNING {FIELD_COLUMNS}"
        );
        let field = conn.query_row(&sql, params![user, name, field_type.as_str()], scan_field)?;
        info!(id = field.id, user, order = field.display_order, "created log field");
        Ok(field)
    }

    /// Hides a field from active views; existing entries stay.
    pub fn deactivate_log_field_impl(&self, user: &str, id: i64) -> Result<()> {
        let conn = self.lock_conn()?;
        let affected = conn.execute(
            "UPDATE log_fields SET is_active = 0 WHERE id = ?1 AND user = ?2 AND is_active = 1",
            params![id, user],
        )?;
        if affected == 0 {
            return Err(StorageError::not_found("log field", id));
        }
        info!(id, user, "deactivated log field");
        Ok(())
    }

    /// Swaps the display order of two active fields in one transaction.
    pub fn swap_log_field_order_impl(&self, user: &str, first: i64, second: i64) -> Result<()> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;
        let first_order = field_order_on_conn(&tx, user, first)?;
        let second_order = field_order_on_conn(&tx, user, second)?;
        tx.execute(
            "UPDATE log_fields SET display_order = ?1 WHERE id = ?2",
            params![second_order, first],
        )?;
        tx.execute(
            "UPDATE log_fields SET display_order = ?1 WHERE id = ?2",
            params![first_order, second],
        )?;
        tx.commit()?;
        debug!(first, second, "swapped log field order");
        Ok(())
    }
}
