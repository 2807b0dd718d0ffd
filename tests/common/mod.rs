/*!
 * Common test utilities for the doctran test suite
 */

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tempfile::TempDir;

use doctran::app_config::{Config, ProviderKind};
use doctran::document::DocumentEncoding;

/// Sample document: two translatable leaves, a skip-listed page break, a
/// numeric leaf and a whitespace leaf that must all survive unchanged.
pub const SAMPLE_XML: &str = "<?xml version=\"1.0\"?>\n\
<doc><p>Namo tassa</p><pb n=\"3\"/><p>42</p><p>   </p><p>bhagavato arahato</p></doc>";

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given bytes in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &[u8]) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Encode text as UTF-16LE with a leading BOM
pub fn utf16le_bytes(text: &str) -> Vec<u8> {
    DocumentEncoding::Utf16Le.encode(text)
}

/// A run configuration with defaults suitable for tests
pub fn run_config(input: PathBuf, output: PathBuf) -> Config {
    Config {
        input,
        output,
        model: None,
        max_batch_chars: 5000,
        state_file: None,
        log_file: None,
        resume: true,
        provider: ProviderKind::Api,
    }
}
