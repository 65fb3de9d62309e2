//! Config Patcher: structure-preserving configuration file patching
//!
//! Patches values inside structured configuration files owned by
//! third-party server software while leaving every other byte of the
//! file untouched: key order, whitespace, comments, quoting style and
//! unrelated keys survive bit-for-bit.
//!
//! # Architecture
//!
//! All updates compile down to a single primitive: [`Edit`], a byte-span
//! replacement against the original buffer. A positional scanner walks
//! the raw bytes once, recording the exact span of every value together
//! with its key-path; selectors are matched positionally against those
//! paths, matched spans become edits, and the compositor splices them
//! into a fresh buffer in one forward pass. No document tree is ever
//! built or re-serialized — that is precisely what loses formatting.
//!
//! # Example
//!
//! ```
//! use config_patcher::{ConfigurationFile, Format, ReplaceValue, Replacement, Selector};
//!
//! let file = ConfigurationFile::new(
//!     "server.json",
//!     Format::Json,
//!     vec![Replacement::new(
//!         Selector::parse("ServerName")?,
//!         ReplaceValue::string("Updated Server Name"),
//!     )],
//! );
//!
//! let patched = file.update_json_preserving_structure(
//!     br#"{"ServerName":"old","MaxPlayers":10}"#,
//! )?;
//! assert_eq!(patched, br#"{"ServerName":"Updated Server Name","MaxPlayers":10}"#);
//! # Ok::<(), config_patcher::PatchError>(())
//! ```

pub mod config;
pub mod edit;
pub mod json;
pub mod patch;
pub mod properties;
pub mod selector;
pub mod value;

// Re-exports
pub use config::{
    apply_files, check_files, load_from_path, load_from_str, ApplicationError, ConfigError,
    FileDefinition, PatchConfig, PatchResult,
};
pub use edit::{apply_edits, atomic_write, Edit, EditError, Span};
pub use patch::{ConfigurationFile, Format, PatchError, Replacement, ValueObservation};
pub use selector::{PathPart, Segment, Selector};
pub use value::{ReplaceValue, ValueKind};
