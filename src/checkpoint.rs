/*!
 * Durable checkpoint state for resumable runs.
 *
 * After every batch the full translation state is written to a JSON file via
 * an atomic temp-file-then-rename, so a crash never leaves a half-written
 * checkpoint. On startup a compatible checkpoint (same run signature, same
 * item count) is adopted as the starting state; anything else starts fresh.
 */

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::file_utils::FileManager;

/// Checkpoint schema version.
pub const CHECKPOINT_VERSION: u32 = 1;

/// Fingerprint of run configuration. Two runs are resumable-compatible only
/// if their signatures are structurally equal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunSignature {
    /// Absolute input path
    pub input: String,
    /// Absolute output path
    pub output: String,
    /// Model identifier, empty when not set
    pub model: String,
    /// Batch character budget
    pub max_batch_chars: usize,
    /// Number of candidate text nodes
    pub total_nodes: usize,
    /// Number of planned translation items
    pub total_items: usize,
}

/// Persisted source of truth for resume.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointState {
    /// Schema version
    pub version: u32,
    /// ISO-8601 timestamp of the last save
    pub updated_at: String,
    /// Fingerprint of the run this state belongs to
    pub run_sig: RunSignature,
    /// Number of items with a translation
    pub processed_items: usize,
    /// Per-item translation, indexed by item id; None means pending
    pub translated_by_item: Vec<Option<String>>,
}

impl CheckpointState {
    /// Build a fresh state snapshot for the given translations.
    pub fn new(run_sig: RunSignature, translated_by_item: Vec<Option<String>>) -> Self {
        let processed_items = translated_by_item.iter().filter(|t| t.is_some()).count();
        Self {
            version: CHECKPOINT_VERSION,
            updated_at: now_iso(),
            run_sig,
            processed_items,
            translated_by_item,
        }
    }
}

/// Current UTC time as an ISO-8601 string.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Load a checkpoint if one exists at `path`.
pub fn load(path: &Path) -> Result<Option<CheckpointState>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read checkpoint: {:?}", path))?;
    let state = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse checkpoint: {:?}", path))?;
    Ok(Some(state))
}

/// Save a checkpoint atomically.
pub fn save(path: &Path, state: &CheckpointState) -> Result<()> {
    let json = serde_json::to_string_pretty(state).context("Failed to serialize checkpoint")?;
    FileManager::write_atomic(path, json.as_bytes())
}

/// Apply the resume policy: adopt a prior checkpoint's translation state when
/// its signature structurally equals the current run's and its item count
/// matches; otherwise log the reason and return None so the run starts fresh.
pub fn try_resume(
    path: &Path,
    run_sig: &RunSignature,
    total_items: usize,
) -> Option<Vec<Option<String>>> {
    let prev = match load(path) {
        Ok(Some(prev)) => prev,
        Ok(None) => return None,
        Err(err) => {
            warn!("checkpoint at {:?} is unreadable ({:#}); starting fresh", path, err);
            return None;
        }
    };

    if prev.run_sig != *run_sig {
        info!("checkpoint found but incompatible with current run config; starting fresh");
        return None;
    }
    if prev.translated_by_item.len() != total_items {
        info!(
            "checkpoint item count {} does not match current plan {}; starting fresh",
            prev.translated_by_item.len(),
            total_items
        );
        return None;
    }

    Some(prev.translated_by_item)
}
