/*!
 * Writing translated text back into the document.
 *
 * A node is rewritten only when every one of its pieces has a translation;
 * pieces are joined in piece order with single spaces and trimmed. Nodes with
 * pending items keep their original text, so a snapshot never contains a
 * half-translated node. Snapshots go to a distinct `.partial` path that never
 * shadows the final output.
 */

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::document::XmlDocument;
use crate::file_utils::FileManager;

/// The in-progress snapshot path for an output path: `<output>.partial`.
pub fn partial_output_path(output: &Path) -> PathBuf {
    let mut name = output.as_os_str().to_os_string();
    name.push(".partial");
    PathBuf::from(name)
}

/// Compute the text every node should carry given the current translation
/// state: nodes without items keep their original text, fully translated
/// nodes get their pieces joined in order, and nodes with any pending piece
/// fall back to the original.
pub fn merged_node_texts(
    originals: &[String],
    node_item_ids: &[Vec<usize>],
    translated_by_item: &[Option<String>],
) -> Vec<String> {
    originals
        .iter()
        .enumerate()
        .map(|(node_idx, original)| {
            let item_ids = &node_item_ids[node_idx];
            if item_ids.is_empty() {
                return original.clone();
            }

            let mut pieces = Vec::with_capacity(item_ids.len());
            for &item_id in item_ids {
                match &translated_by_item[item_id] {
                    Some(text) => pieces.push(text.trim()),
                    None => return original.clone(),
                }
            }

            let merged = pieces
                .into_iter()
                .filter(|p| !p.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
                .trim()
                .to_string();
            if merged.is_empty() {
                original.clone()
            } else {
                merged
            }
        })
        .collect()
}

/// Render the document with the given node texts and write it to `path` in
/// the document's original encoding. The source tree is left untouched.
pub fn write_snapshot(doc: &XmlDocument, node_texts: &[String], path: &Path) -> Result<()> {
    let rendered = doc.with_text_nodes(node_texts)?;
    FileManager::write_bytes(path, &rendered.serialize()?)
}
