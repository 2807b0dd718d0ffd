/*!
 * Translation work planning.
 *
 * Turns the document's candidate text nodes into flat translation items (one
 * per segmented piece) and groups items into request batches under the
 * character budget. Also builds the node-to-items index the reassembler needs.
 */

use serde::{Deserialize, Serialize};

use crate::segmenter;

/// One unit of translation work, immutable after planning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TranslationItem {
    /// Globally unique sequential id, stable for the run (0-based, planning order)
    pub item_id: usize,
    /// Index of the owning document node in traversal order
    pub node_idx: usize,
    /// Order of this piece within its node
    pub piece_idx: usize,
    /// Source text fragment
    pub text: String,
}

/// Build translation items from the candidate node texts, preserving node
/// traversal order and piece order within each node. Item ids are assigned
/// after all items are produced.
pub fn plan_items(node_texts: &[String], max_chars: usize) -> Vec<TranslationItem> {
    let mut items = Vec::new();
    for (node_idx, text) in node_texts.iter().enumerate() {
        let mut pieces = segmenter::segment(text, max_chars);
        if pieces.is_empty() {
            pieces.push(text.clone());
        }
        for (piece_idx, piece) in pieces.into_iter().enumerate() {
            items.push(TranslationItem {
                item_id: 0,
                node_idx,
                piece_idx,
                text: piece,
            });
        }
    }
    for (item_id, item) in items.iter_mut().enumerate() {
        item.item_id = item_id;
    }
    items
}

/// Greedily accumulate items into batches of at most `max_chars` combined
/// characters. A new batch starts only when the current one is non-empty, so
/// a single oversized item still gets its own batch and is never dropped.
/// Batches hold item ids; the items themselves stay in planning order.
pub fn build_batches(items: &[TranslationItem], max_chars: usize) -> Vec<Vec<usize>> {
    let mut batches = Vec::new();
    let mut current: Vec<usize> = Vec::new();
    let mut current_chars = 0usize;

    for item in items {
        let text_len = item.text.chars().count();
        if !current.is_empty() && current_chars + text_len > max_chars {
            batches.push(std::mem::take(&mut current));
            current_chars = 0;
        }
        current.push(item.item_id);
        current_chars += text_len;
    }
    if !current.is_empty() {
        batches.push(current);
    }
    batches
}

/// Map each node index to the ordered list of item ids belonging to it.
/// Required for reassembly; partitions item ids exactly.
pub fn build_node_item_ids(items: &[TranslationItem], total_nodes: usize) -> Vec<Vec<usize>> {
    let mut node_item_ids = vec![Vec::new(); total_nodes];
    for item in items {
        node_item_ids[item.node_idx].push(item.item_id);
    }
    node_item_ids
}
