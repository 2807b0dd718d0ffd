/*!
 * Batch translation with bounded bisection retry.
 *
 * A batch goes to the provider as one ordered list of strings. When the
 * response has the wrong number of elements (the service occasionally drops
 * or merges strings) the batch is split in half and each half is retried
 * independently, isolating the faulty subset without re-sending translations
 * that already came back aligned. The retry control flow is an explicit work
 * stack of (range, depth) tasks, so the depth limit and termination condition
 * are auditable in isolation.
 */

use std::ops::Range;
use std::sync::Arc;

use log::warn;
use once_cell::sync::OnceCell;

use crate::errors::{ProviderError, TranslationError};
use crate::providers::TranslationProvider;

/// Maximum bisection levels, counting the initial whole-batch attempt.
pub const MAX_BISECTION_DEPTH: usize = 6;

/// Default system instruction given to every backend.
pub const DEFAULT_SYSTEM_INSTRUCTION: &str =
    "You are a careful professional translator. Translate the given source texts \
     faithfully and naturally into the target language, preserving meaning and register.";

static SYSTEM_INSTRUCTION: OnceCell<String> = OnceCell::new();

/// Override the process-wide system instruction. Only the first call before
/// any read takes effect; the value is immutable afterward.
pub fn set_system_instruction(instruction: String) {
    let _ = SYSTEM_INSTRUCTION.set(instruction);
}

/// The process-wide system instruction.
pub fn system_instruction() -> &'static str {
    SYSTEM_INSTRUCTION
        .get()
        .map(String::as_str)
        .unwrap_or(DEFAULT_SYSTEM_INSTRUCTION)
}

/// Batch translator wrapping a provider with the bisection retry policy.
pub struct BatchTranslator {
    provider: Arc<dyn TranslationProvider>,
}

impl BatchTranslator {
    /// Create a new batch translator over the given provider.
    pub fn new(provider: Arc<dyn TranslationProvider>) -> Self {
        Self { provider }
    }

    /// Backend name for logging.
    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Translate `texts`, returning translations in input order.
    ///
    /// Transport failures fail the attempt immediately. Wrong-shaped or
    /// wrong-length responses bisect the range and retry each half, down to
    /// single items and at most `MAX_BISECTION_DEPTH` levels.
    pub async fn translate(&self, texts: &[String]) -> Result<Vec<String>, TranslationError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut slots: Vec<Option<String>> = vec![None; texts.len()];
        let mut work: Vec<(Range<usize>, usize)> = vec![(0..texts.len(), 0)];

        while let Some((range, depth)) = work.pop() {
            if depth >= MAX_BISECTION_DEPTH {
                return Err(TranslationError::DepthExceeded {
                    max_depth: MAX_BISECTION_DEPTH,
                    len: range.len(),
                });
            }

            let slice = &texts[range.clone()];
            match self.provider.translate_batch(slice).await {
                Ok(translated) if translated.len() == slice.len() => {
                    for (slot, text) in slots[range].iter_mut().zip(translated) {
                        *slot = Some(text);
                    }
                }
                Ok(translated) => {
                    if slice.len() == 1 {
                        return Err(TranslationError::LengthMismatch {
                            expected: 1,
                            actual: translated.len(),
                        });
                    }
                    warn!(
                        "length mismatch ({}/{}) for items {}..{}, retry split batch: {} + {}",
                        translated.len(),
                        slice.len(),
                        range.start,
                        range.end,
                        slice.len() / 2,
                        slice.len() - slice.len() / 2
                    );
                    push_halves(&mut work, range, depth);
                }
                Err(err) if err.is_protocol() && slice.len() > 1 => {
                    warn!(
                        "protocol error for items {}..{} ({}), retry split batch",
                        range.start, range.end, err
                    );
                    push_halves(&mut work, range, depth);
                }
                Err(err) => return Err(TranslationError::Provider(err)),
            }
        }

        slots
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| {
                TranslationError::Provider(ProviderError::ParseError(
                    "bisection left untranslated slots".to_string(),
                ))
            })
    }
}

/// Queue both halves of a range, left half on top so ranges complete in order.
fn push_halves(work: &mut Vec<(Range<usize>, usize)>, range: Range<usize>, depth: usize) {
    let mid = range.start + range.len() / 2;
    work.push((mid..range.end, depth + 1));
    work.push((range.start..mid, depth + 1));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_systemInstruction_withoutOverride_shouldUseDefault() {
        assert!(!system_instruction().is_empty());
    }

    #[test]
    fn test_pushHalves_shouldSplitRangeInOrder() {
        let mut work = Vec::new();
        push_halves(&mut work, 0..5, 0);
        assert_eq!(work.pop(), Some((0..2, 1)));
        assert_eq!(work.pop(), Some((2..5, 1)));
    }
}
