use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use serde::Deserialize;
use std::io::Write;
use thiserror::Error;
use uuid::Uuid;

use super::types::{Ledger, Participant};
use crate::scoring::{validate_rubric, RubricConfig};

/// Why a backup could not be restored. The ledger is left untouched.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("invalid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("backup contains no participants list")]
    MissingParticipants,

    #[error("backup rubric is invalid: {}", .0.join("; "))]
    InvalidRubric(Vec<String>),

    #[error("backup lists participant id '{0}' more than once")]
    DuplicateId(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    /// Rubric and participants both replaced
    Replaced { participants: usize },
    /// Participants replaced, current rubric kept
    ParticipantsOnly { participants: usize },
}

#[derive(Deserialize)]
struct BackupPayload {
    #[serde(default)]
    config: Option<RubricConfig>,
    #[serde(default, alias = "delegates")]
    participants: Option<Vec<Participant>>,
}

/// Serialize `{config, participants}` as pretty JSON.
pub fn export_backup(ledger: &Ledger) -> Result<String> {
    serde_json::to_string_pretty(ledger).context("Failed to serialize backup")
}

/// Restore from backup text.
///
/// `{config, participants}` replaces both; `{participants}` alone keeps the
/// current rubric. Participants without an id get a fresh one.
pub fn import_backup(ledger: &mut Ledger, text: &str) -> Result<ImportOutcome, ImportError> {
    let payload: BackupPayload = serde_json::from_str(text)?;

    let mut participants = payload.participants.ok_or(ImportError::MissingParticipants)?;

    if let Some(ref config) = payload.config {
        validate_rubric(config).map_err(ImportError::InvalidRubric)?;
    }

    let mut seen = HashSet::new();
    for participant in &mut participants {
        if participant.id.trim().is_empty() {
            participant.id = Uuid::new_v4().to_string();
        }
        if !seen.insert(participant.id.clone()) {
            return Err(ImportError::DuplicateId(participant.id.clone()));
        }
        participant.award = participant.award.trim().to_string();
    }

    let count = participants.len();
    ledger.participants = participants;
    match payload.config {
        Some(config) => {
            ledger.config = config;
            Ok(ImportOutcome::Replaced { participants: count })
        }
        None => Ok(ImportOutcome::ParticipantsOnly { participants: count }),
    }
}

/// Default backup file name for a committee: whitespace runs become `_`.
pub fn backup_file_name(committee: &str) -> String {
    format!("{}_backup.json", crate::export::file_stem(committee))
}

pub fn write_backup_file(path: &Path, ledger: &Ledger) -> Result<()> {
    let text = export_backup(ledger)?;
    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    file.write_all(text.as_bytes())
        .with_context(|| format!("Failed to write backup to {}", path.display()))?;
    file.commit().context("Failed to save backup")?;
    Ok(())
}

pub fn read_backup_file(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .with_context(|| format!("Failed to read backup file at {}", path.display()))
}
