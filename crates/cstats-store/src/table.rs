//! Loading the physical-description lookup table from disk.
//!
//! `.toml` files hold `[[rows]]` entries; anything else is opened as a
//! SQLite database with a `descriptions` table.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use cstats_core::DescriptionTable;

use crate::error::{Result, StoreError};
use crate::store::Store;

#[derive(Debug, Deserialize)]
struct TomlTable {
    #[serde(default)]
    rows: Vec<TomlRow>,
}

#[derive(Debug, Deserialize)]
struct TomlRow {
    bmi: u32,
    description: String,
}

pub fn is_toml(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("toml"))
}

pub fn parse_toml_rows(content: &str, path: &Path) -> Result<Vec<(u32, String)>> {
    let table: TomlTable = toml::from_str(content).map_err(|source| StoreError::Toml {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(table
        .rows
        .into_iter()
        .map(|row| (row.bmi, row.description))
        .collect())
}

pub fn read_toml_rows(path: &Path) -> Result<Vec<(u32, String)>> {
    let content = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_toml_rows(&content, path)
}

/// Raw rows from either format.
pub fn read_rows(path: &Path) -> Result<Vec<(u32, String)>> {
    if is_toml(path) {
        read_toml_rows(path)
    } else {
        if !path.exists() {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
            });
        }
        Store::open(path)?.rows()
    }
}

/// Load and validate the lookup table at `path`.
pub fn load_table(path: &Path) -> Result<DescriptionTable> {
    let rows = read_rows(path)?;
    let table =
        DescriptionTable::from_rows(rows).map_err(|(bmi, source)| StoreError::Row { bmi, source })?;
    tracing::info!(
        "loaded {} description rows from {}",
        table.len(),
        path.display()
    );
    Ok(table)
}

/// Copy the rows of a TOML table into a SQLite database, replacing its
/// contents. Templates are validated first so a bad file changes nothing.
pub fn import_toml(toml_path: &Path, db_path: &Path) -> Result<usize> {
    let rows = read_toml_rows(toml_path)?;
    DescriptionTable::from_rows(rows.iter().map(|(b, t)| (*b, t.as_str())))
        .map_err(|(bmi, source)| StoreError::Row { bmi, source })?;

    let store = Store::open(db_path)?;
    store.replace_descriptions(&rows)?;
    store.set_metadata("imported_from", &toml_path.display().to_string())?;
    tracing::info!(
        "imported {} rows from {} into {}",
        rows.len(),
        toml_path.display(),
        db_path.display()
    );
    Ok(rows.len())
}
