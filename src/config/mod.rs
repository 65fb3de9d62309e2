//! Operator-facing patch definitions: TOML schema, loading, and
//! disk-facing application.

mod applicator;
mod loader;
mod schema;

pub use applicator::{apply_files, check_files, preview, ApplicationError, PatchResult};
pub use loader::{load_from_path, load_from_str, ConfigError, Origin};
pub use schema::{
    FileDefinition, Metadata, PatchConfig, ReplacementDefinition, ValidationError, ValidationIssue,
};
