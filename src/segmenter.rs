/*!
 * Text segmentation under a character budget.
 *
 * Long text is split into pieces that each fit within a character budget,
 * preferring sentence boundaries, then word boundaries. A sentence with no
 * usable space before the budget gets a forced hard cut, so segmentation
 * always terminates.
 */

use once_cell::sync::Lazy;
use regex::Regex;

/// Sentence chunks: a run of non-terminator characters followed by any number
/// of terminators. Covers Latin punctuation plus the danda and double danda
/// section markers used in Indic texts.
static SENTENCE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^.!?;:।॥\n]+[.!?;:।॥\n]*").expect("sentence pattern is valid"));

/// Budgeted lengths count Unicode scalar values, not bytes.
fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Split `text` into ordered pieces of at most `max_chars` characters.
///
/// Whitespace-only input yields no pieces. Text already within the budget is
/// returned as a single trimmed piece. Pieces produced by a forced hard cut in
/// the no-space case are the only ones allowed to be exactly `max_chars` with
/// no boundary preference.
pub fn segment(text: &str, max_chars: usize) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }
    if char_len(text) <= max_chars {
        return vec![text.to_string()];
    }

    let mut sentences: Vec<&str> = SENTENCE_PATTERN
        .find_iter(text)
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .collect();
    if sentences.is_empty() {
        sentences.push(text);
    }

    let mut pieces = Vec::new();
    let mut current = String::new();
    for sentence in sentences {
        let sentence_len = char_len(sentence);
        if sentence_len > max_chars {
            if !current.is_empty() {
                pieces.push(std::mem::take(&mut current));
            }
            pieces.extend(split_overlong_sentence(sentence, max_chars));
            continue;
        }

        if current.is_empty() {
            current = sentence.to_string();
        } else if char_len(&current) + 1 + sentence_len <= max_chars {
            current.push(' ');
            current.push_str(sentence);
        } else {
            pieces.push(std::mem::take(&mut current));
            current = sentence.to_string();
        }
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

/// Split a single sentence longer than the budget on word boundaries:
/// repeatedly cut at the last space at-or-before `max_chars`. If no space
/// exists in the second half of the window, hard-cut at exactly `max_chars`.
fn split_overlong_sentence(sentence: &str, max_chars: usize) -> Vec<String> {
    let mut parts = Vec::new();
    let mut rest: Vec<char> = sentence.trim().chars().collect();

    while rest.len() > max_chars {
        let window_end = max_chars.min(rest.len() - 1);
        let cut = match rest[..=window_end].iter().rposition(|c| *c == ' ') {
            Some(i) if i >= max_chars / 2 => i,
            _ => max_chars,
        };

        let piece: String = rest[..cut].iter().collect::<String>().trim().to_string();
        if !piece.is_empty() {
            parts.push(piece);
        }
        let tail: String = rest[cut..].iter().collect::<String>().trim().to_string();
        rest = tail.chars().collect();
    }

    if !rest.is_empty() {
        parts.push(rest.into_iter().collect());
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_withShortText_shouldReturnSingleTrimmedPiece() {
        let pieces = segment("  Namo tassa bhagavato.  ", 100);
        assert_eq!(pieces, vec!["Namo tassa bhagavato.".to_string()]);
    }

    #[test]
    fn test_segment_withWhitespaceOnly_shouldReturnEmpty() {
        assert!(segment("   \n\t ", 100).is_empty());
        assert!(segment("", 100).is_empty());
    }

    #[test]
    fn test_segment_withSentences_shouldPackGreedily() {
        let text = "One two three. Four five six. Seven eight nine.";
        let pieces = segment(text, 31);
        // First two sentences fit together (14 + 1 + 14 = 29), the third starts a new piece.
        assert_eq!(
            pieces,
            vec![
                "One two three. Four five six.".to_string(),
                "Seven eight nine.".to_string(),
            ]
        );
    }

    #[test]
    fn test_segment_withBudget_shouldNeverExceedItOnWordSplits() {
        let text = "alpha beta gamma delta epsilon zeta eta theta iota kappa lambda mu";
        for budget in [10usize, 15, 20, 30] {
            for piece in segment(text, budget) {
                assert!(
                    piece.chars().count() <= budget,
                    "piece {:?} exceeds budget {}",
                    piece,
                    budget
                );
            }
        }
    }

    #[test]
    fn test_segment_withNoSpaces_shouldHardCutAtBudget() {
        let text = "a".repeat(25);
        let pieces = segment(&text, 10);
        assert_eq!(pieces.len(), 3);
        assert_eq!(pieces[0].chars().count(), 10);
        assert_eq!(pieces[1].chars().count(), 10);
        assert_eq!(pieces[2].chars().count(), 5);
    }

    #[test]
    fn test_segment_withIndicTerminators_shouldSplitOnDanda() {
        let text = "namo tassa bhagavato। arahato sammasambuddhassa॥";
        let pieces = segment(text, 30);
        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces[0], "namo tassa bhagavato।");
    }

    #[test]
    fn test_segment_shouldReproduceTextModuloWhitespace() {
        let text = "The quick brown fox. Jumps over the lazy dog! And runs; away: now.";
        let pieces = segment(text, 20);
        let rejoined: String = pieces.join(" ");
        let normalize = |s: &str| s.split_whitespace().collect::<Vec<_>>().join(" ");
        assert_eq!(normalize(&rejoined), normalize(text));
    }

    #[test]
    fn test_splitOverlongSentence_withLateSpace_shouldCutAtSpace() {
        // Space at index 8 is within the second half of a 10-char window.
        let pieces = split_overlong_sentence("abcdefgh ijklmnop", 10);
        assert_eq!(pieces, vec!["abcdefgh".to_string(), "ijklmnop".to_string()]);
    }

    #[test]
    fn test_splitOverlongSentence_withEarlySpaceOnly_shouldForceHardCut() {
        // The only space sits before half the budget, so the cut is forced at
        // the full budget instead.
        let pieces = split_overlong_sentence("ab cdefghijklmnop", 12);
        assert_eq!(pieces, vec!["ab cdefghijk".to_string(), "lmnop".to_string()]);
    }
}
