//! Parsing conversation documents from text and from disk.

use std::fmt::Display;
use std::fs;
use std::path::Path;

use parley_conversation::domain::definition::ConversationDefinition;
use parley_core::error::DomainError;
use tracing::{debug, info};

use crate::domain::document::ConversationDocument;

/// Serialization format of a conversation document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Picks the format from a file extension. Returns `None` for files that
    /// are not conversation documents.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// Parses and validates one conversation document.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the source is malformed or the
/// definition it describes is invalid.
pub fn parse_definition(
    source: &str,
    format: DocumentFormat,
) -> Result<ConversationDefinition, DomainError> {
    let malformed =
        |e: &dyn Display| DomainError::Validation(format!("malformed conversation document: {e}"));
    let document: ConversationDocument = match format {
        DocumentFormat::Json => serde_json::from_str(source).map_err(|e| malformed(&e))?,
        DocumentFormat::Yaml => serde_yaml::from_str(source).map_err(|e| malformed(&e))?,
    };
    document
        .into_definition()
        .map_err(|e| DomainError::Validation(e.to_string()))
}

/// Loads every `*.json`, `*.yaml` and `*.yml` document in `dir`, in file
/// name order. Other files are skipped.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the directory or a file cannot
/// be read, or `DomainError::Validation` naming the first invalid document.
pub fn load_dir(dir: &Path) -> Result<Vec<ConversationDefinition>, DomainError> {
    let entries = fs::read_dir(dir).map_err(|e| {
        DomainError::Infrastructure(format!("cannot read {}: {e}", dir.display()))
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| {
            DomainError::Infrastructure(format!("cannot read {}: {e}", dir.display()))
        })?;
        paths.push(entry.path());
    }
    paths.sort();

    let mut definitions = Vec::new();
    for path in paths {
        let Some(format) = DocumentFormat::from_path(&path) else {
            debug!(path = %path.display(), "skipping non-document file");
            continue;
        };
        let source = fs::read_to_string(&path).map_err(|e| {
            DomainError::Infrastructure(format!("cannot read {}: {e}", path.display()))
        })?;
        let definition = parse_definition(&source, format).map_err(|e| match e {
            DomainError::Validation(message) => {
                DomainError::Validation(format!("{}: {message}", path.display()))
            }
            other => other,
        })?;
        debug!(
            path = %path.display(),
            npc_id = definition.npc_id,
            states = definition.states.len(),
            "loaded conversation"
        );
        definitions.push(definition);
    }

    info!(dir = %dir.display(), count = definitions.len(), "loaded conversation documents");
    Ok(definitions)
}
