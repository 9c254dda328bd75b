//! Disk-facing collaborators for `cstats-core`: the physical-description
//! lookup table and the TOML configuration file.

pub mod config;
pub mod error;
pub mod schema;
pub mod store;
pub mod table;

pub use config::{Config, default_base_dir, default_config_path};
pub use error::{Result, StoreError};
pub use store::Store;
pub use table::{import_toml, load_table};
