use crate::patch::{ConfigurationFile, Format, PatchError, Replacement};
use crate::selector::Selector;
use crate::value::{ReplaceValue, ValueKind};
use serde::Deserialize;
use std::fmt;

/// An operator-authored patch definition file.
///
/// ```toml
/// [meta]
/// name = "hytale-server"
///
/// [[file]]
/// path = "config/server.json"
/// format = "json"
///
///   [[file.replace]]
///   match = "ServerName"
///   kind = "string"
///   value = "Updated Server Name"
/// ```
#[derive(Debug, Deserialize, Default, Clone)]
pub struct PatchConfig {
    #[serde(default)]
    pub meta: Metadata,
    #[serde(default, rename = "file")]
    pub files: Vec<FileDefinition>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FileDefinition {
    /// Target file, relative to the root directory passed at apply time
    pub path: String,
    pub format: Format,
    #[serde(default, rename = "replace")]
    pub replacements: Vec<ReplacementDefinition>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReplacementDefinition {
    #[serde(rename = "match")]
    pub selector: String,
    pub kind: ValueKind,
    pub value: String,
}

impl PatchConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.files.is_empty() {
            issues.push(ValidationIssue::EmptyFileList);
        }

        for file in &self.files {
            if file.path.trim().is_empty() {
                issues.push(ValidationIssue::MissingField {
                    file: file.path.clone(),
                    field: "path",
                });
            }
            for replacement in &file.replacements {
                if let Err(error) = Selector::parse(&replacement.selector) {
                    issues.push(ValidationIssue::InvalidReplacement {
                        file: file.path.clone(),
                        selector: replacement.selector.clone(),
                        message: error.to_string(),
                    });
                    continue;
                }
                if let Err(error) = replacement.replace_value() {
                    issues.push(ValidationIssue::InvalidReplacement {
                        file: file.path.clone(),
                        selector: replacement.selector.clone(),
                        message: error.to_string(),
                    });
                }
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

impl FileDefinition {
    /// Build the engine-side patch request from this definition.
    pub fn to_configuration_file(&self) -> Result<ConfigurationFile, PatchError> {
        let mut replacements = Vec::with_capacity(self.replacements.len());
        for definition in &self.replacements {
            let selector = Selector::parse(&definition.selector)?;
            let value = definition.replace_value()?;
            replacements.push(Replacement::new(selector, value));
        }
        Ok(ConfigurationFile::new(&self.path, self.format, replacements))
    }
}

impl ReplacementDefinition {
    pub fn replace_value(&self) -> Result<ReplaceValue, PatchError> {
        match self.kind {
            ValueKind::Boolean => match self.value.as_str() {
                "true" => Ok(ReplaceValue::boolean(true)),
                "false" => Ok(ReplaceValue::boolean(false)),
                other => Err(PatchError::InvalidLiteral {
                    kind: ValueKind::Boolean,
                    value: other.to_string(),
                }),
            },
            ValueKind::String => Ok(ReplaceValue::string(self.value.as_str())),
            ValueKind::Numeric => ReplaceValue::numeric(self.value.as_str()),
            ValueKind::Raw => Ok(ReplaceValue::raw(self.value.as_bytes().to_vec())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone)]
pub enum ValidationIssue {
    EmptyFileList,
    MissingField { file: String, field: &'static str },
    InvalidReplacement {
        file: String,
        selector: String,
        message: String,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::EmptyFileList => write!(f, "patch config lists no files"),
            ValidationIssue::MissingField { file, field } => {
                write!(f, "file '{file}' missing required field '{field}'")
            }
            ValidationIssue::InvalidReplacement {
                file,
                selector,
                message,
            } => {
                write!(f, "file '{file}', replacement '{selector}': {message}")
            }
        }
    }
}
