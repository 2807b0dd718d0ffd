/*!
 * Main run driver.
 *
 * Orchestrates the run: parse the document, plan items and batches, adopt a
 * compatible checkpoint, translate batch by batch, and finalize the output.
 * The state is checkpointed and a partial snapshot is written after every
 * batch, not only at the end — that per-batch discipline is the resilience
 * guarantee. Interruption is observed cooperatively at the top of the batch
 * loop and still performs one checkpoint before propagating.
 */

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use log::{info, warn};

use crate::app_config::{Config, ProviderKind};
use crate::checkpoint::{self, CheckpointState, RunSignature};
use crate::document::XmlDocument;
use crate::errors::AppError;
use crate::file_utils::FileManager;
use crate::planner::{self, TranslationItem};
use crate::providers::agent::AgentProvider;
use crate::providers::api::ApiProvider;
use crate::providers::TranslationProvider;
use crate::reassembly;
use crate::translator::BatchTranslator;

/// Application controller driving one translation run
pub struct Controller {
    config: Config,
    translator: BatchTranslator,
    progress_log: PathBuf,
}

impl Controller {
    /// Create a controller with the backend selected by the configuration.
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        let provider: Arc<dyn TranslationProvider> = match config.provider {
            ProviderKind::Api => Arc::new(
                ApiProvider::from_env(config.model.clone())
                    .map_err(|e| AppError::Config(e.to_string()))?,
            ),
            ProviderKind::Agent => Arc::new(AgentProvider::new(config.model.clone())),
        };
        Ok(Self::with_provider(config, provider))
    }

    /// Create a controller over an explicit provider. Used by tests to inject
    /// a mock backend.
    pub fn with_provider(config: Config, provider: Arc<dyn TranslationProvider>) -> Self {
        let progress_log = config.progress_log_path();
        Self {
            config,
            translator: BatchTranslator::new(provider),
            progress_log,
        }
    }

    /// Run the full pipeline, wiring Ctrl-C to the cooperative interrupt flag.
    pub async fn run(&self) -> Result<()> {
        let interrupted = Arc::new(AtomicBool::new(false));
        let flag = interrupted.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupt received, will checkpoint at the next batch boundary");
                flag.store(true, Ordering::SeqCst);
            }
        });
        self.run_with_interrupt(interrupted).await
    }

    /// Run the full pipeline with an externally controlled interrupt flag.
    pub async fn run_with_interrupt(&self, interrupted: Arc<AtomicBool>) -> Result<()> {
        let started = Instant::now();

        // PLAN
        let raw = FileManager::read_bytes(&self.config.input)?;
        let doc = XmlDocument::parse(&raw)
            .map_err(|e| AppError::Document(format!("{:#}", e)))?;
        let originals = doc.collect_text_nodes();
        let total_nodes = originals.len();
        self.log(&format!(
            "collected text nodes: {} (encoding={})",
            total_nodes,
            doc.encoding().label()
        ))?;

        let items = planner::plan_items(&originals, self.config.max_batch_chars);
        let batches = planner::build_batches(&items, self.config.max_batch_chars);
        let node_item_ids = planner::build_node_item_ids(&items, total_nodes);
        let total_items = items.len();
        let total_batches = batches.len();
        self.log(&format!(
            "planned translation items: {} (node splits included), batches: {}, max_batch_chars={}",
            total_items, total_batches, self.config.max_batch_chars
        ))?;

        let run_sig = self.run_signature(total_nodes, total_items);
        let state_path = self.config.state_path();
        let partial_path = reassembly::partial_output_path(&self.config.output);

        // RESUME?
        let mut translated_by_item: Vec<Option<String>> = vec![None; total_items];
        if self.config.resume {
            if let Some(prev) = checkpoint::try_resume(&state_path, &run_sig, total_items) {
                let done = prev.iter().filter(|t| t.is_some()).count();
                self.log(&format!(
                    "resumed from checkpoint: {}/{} items done",
                    done, total_items
                ))?;
                translated_by_item = prev;
            }
        }

        // ITERATE_BATCHES
        for (batch_idx, batch) in batches.iter().enumerate() {
            if interrupted.load(Ordering::SeqCst) {
                self.checkpoint(&doc, &originals, &node_item_ids, &translated_by_item, &run_sig, &state_path, &partial_path)?;
                self.log("interrupted: checkpoint and partial output saved")?;
                return Err(AppError::Interrupted.into());
            }

            let pending: Vec<&TranslationItem> = batch
                .iter()
                .map(|&item_id| &items[item_id])
                .filter(|item| translated_by_item[item.item_id].is_none())
                .collect();
            if pending.is_empty() {
                continue;
            }
            let batch_texts: Vec<String> = pending.iter().map(|item| item.text.clone()).collect();

            let processed = count_done(&translated_by_item);
            let batch_chars: usize = batch_texts.iter().map(|t| t.chars().count()).sum();
            let elapsed = started.elapsed().as_secs_f64();
            let avg_per_item = if processed > 0 { elapsed / processed as f64 } else { 0.0 };
            let remaining = total_items.saturating_sub(processed);
            let eta = avg_per_item * remaining as f64;
            let pct = percent(processed, total_items);
            self.log(&format!(
                "[batch {}/{}] {:5.1}% | items={} | chars={} | elapsed={} | eta={}",
                batch_idx + 1,
                total_batches,
                pct,
                batch_texts.len(),
                batch_chars,
                format_seconds(elapsed),
                format_seconds(eta)
            ))?;

            let batch_started = Instant::now();
            let outputs = self
                .translator
                .translate(&batch_texts)
                .await
                .map_err(AppError::Translation)
                .with_context(|| {
                    format!(
                        "batch {}/{} failed ({} items, {} chars); progress up to the previous batch is checkpointed",
                        batch_idx + 1,
                        total_batches,
                        batch_texts.len(),
                        batch_chars
                    )
                })?;
            for (item, out_text) in pending.iter().zip(outputs) {
                translated_by_item[item.item_id] = Some(out_text.trim().to_string());
            }

            let processed = count_done(&translated_by_item);
            let total_elapsed = started.elapsed().as_secs_f64();
            let avg_done = if processed > 0 { total_elapsed / processed as f64 } else { 0.0 };
            let eta_done = avg_done * total_items.saturating_sub(processed) as f64;
            self.log(&format!(
                "  -> batch done {}/{} ({:5.1}%) | batch_time={} | elapsed={} | eta={}",
                processed,
                total_items,
                percent(processed, total_items),
                format_seconds(batch_started.elapsed().as_secs_f64()),
                format_seconds(total_elapsed),
                format_seconds(eta_done)
            ))?;

            self.checkpoint(&doc, &originals, &node_item_ids, &translated_by_item, &run_sig, &state_path, &partial_path)?;
        }

        // FINALIZE
        let merged = reassembly::merged_node_texts(&originals, &node_item_ids, &translated_by_item);
        reassembly::write_snapshot(&doc, &merged, &self.config.output)?;
        self.log(&format!("written: {}", self.config.output.display()))?;
        self.log(&format!(
            "total elapsed: {}",
            format_seconds(started.elapsed().as_secs_f64())
        ))?;
        Ok(())
    }

    fn run_signature(&self, total_nodes: usize, total_items: usize) -> RunSignature {
        RunSignature {
            input: FileManager::absolute_path(&self.config.input).display().to_string(),
            output: FileManager::absolute_path(&self.config.output).display().to_string(),
            model: self.config.model.clone().unwrap_or_default(),
            max_batch_chars: self.config.max_batch_chars,
            total_nodes,
            total_items,
        }
    }

    /// Persist state and write the partial snapshot. Called after every batch
    /// and once more when an interrupt is observed.
    #[allow(clippy::too_many_arguments)]
    fn checkpoint(
        &self,
        doc: &XmlDocument,
        originals: &[String],
        node_item_ids: &[Vec<usize>],
        translated_by_item: &[Option<String>],
        run_sig: &RunSignature,
        state_path: &std::path::Path,
        partial_path: &std::path::Path,
    ) -> Result<()> {
        let state = CheckpointState::new(run_sig.clone(), translated_by_item.to_vec());
        checkpoint::save(state_path, &state)?;
        let merged = reassembly::merged_node_texts(originals, node_item_ids, translated_by_item);
        reassembly::write_snapshot(doc, &merged, partial_path)?;
        Ok(())
    }

    /// Log a progress line to stderr and the progress log file.
    fn log(&self, message: &str) -> Result<()> {
        info!("{}", message);
        FileManager::append_to_log_file(&self.progress_log, message)
    }
}

fn count_done(translated_by_item: &[Option<String>]) -> usize {
    translated_by_item.iter().filter(|t| t.is_some()).count()
}

fn percent(done: usize, total: usize) -> f64 {
    if total > 0 {
        done as f64 / total as f64 * 100.0
    } else {
        100.0
    }
}

/// Format a duration in seconds as mm:ss, or hh:mm:ss above one hour.
pub fn format_seconds(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}
