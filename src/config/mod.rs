//! Runtime settings.
//!
//! Settings come from an optional TOML file and `KRAKEN__*` environment
//! variables, falling back to struct defaults.

mod load;
mod schema;

pub use load::{default_config_path, resolve_config_path};
pub use schema::*;
