use std::path::Path;

use rusqlite::{Connection, OptionalExtension, params};

use cstats_core::DescriptionTable;

use crate::error::{Result, StoreError};
use crate::schema;

/// SQLite-backed physical-description table.
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    // --- Metadata ---

    pub fn get_metadata(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM metadata WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    pub fn set_metadata(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    // --- Descriptions ---

    pub fn put_description(&self, bmi: u32, text: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO descriptions (bmi, physical_characteristics) VALUES (?1, ?2)",
            params![bmi, text],
        )?;
        Ok(())
    }

    /// Replace the whole table in one transaction.
    pub fn replace_descriptions(&self, rows: &[(u32, String)]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM descriptions", [])?;
        for (bmi, text) in rows {
            tx.execute(
                "INSERT OR REPLACE INTO descriptions (bmi, physical_characteristics) VALUES (?1, ?2)",
                params![bmi, text],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Raw rows in ascending BMI order.
    pub fn rows(&self) -> Result<Vec<(u32, String)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT bmi, physical_characteristics FROM descriptions ORDER BY bmi")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(bmi, text)| {
                u32::try_from(bmi)
                    .map(|bmi| (bmi, text))
                    .map_err(|_| StoreError::InvalidData(format!("BMI key {bmi} out of range")))
            })
            .collect()
    }

    pub fn description_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM descriptions", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Parse every row's template into an in-memory table.
    pub fn load_table(&self) -> Result<DescriptionTable> {
        let rows = self.rows()?;
        DescriptionTable::from_rows(rows).map_err(|(bmi, source)| StoreError::Row { bmi, source })
    }
}
