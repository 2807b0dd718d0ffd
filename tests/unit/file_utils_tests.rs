/*!
 * Unit tests for file system utilities
 */

use anyhow::Result;

use crate::common;
use doctran::file_utils::FileManager;

#[test]
fn test_fileExists_withRealAndMissingFiles_shouldDetectBoth() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let path = common::create_test_file(dir.path(), "present.txt", b"content")?;

    assert!(FileManager::file_exists(&path));
    assert!(!FileManager::file_exists(dir.path().join("missing.txt")));
    // A directory is not a file.
    assert!(!FileManager::file_exists(dir.path()));
    Ok(())
}

#[test]
fn test_writeAtomic_shouldReplaceExistingContent() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let path = dir.path().join("state.json");

    FileManager::write_atomic(&path, b"first")?;
    FileManager::write_atomic(&path, b"second")?;

    assert_eq!(FileManager::read_bytes(&path)?, b"second");
    Ok(())
}

#[test]
fn test_writeAtomic_withMissingParent_shouldCreateDirectories() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let path = dir.path().join("nested").join("deep").join("out.bin");

    FileManager::write_atomic(&path, b"payload")?;

    assert_eq!(FileManager::read_bytes(&path)?, b"payload");
    Ok(())
}

#[test]
fn test_appendToLogFile_shouldTimestampEachLine() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let path = dir.path().join("progress.log");

    FileManager::append_to_log_file(&path, "first message")?;
    FileManager::append_to_log_file(&path, "second message")?;

    let content = String::from_utf8(FileManager::read_bytes(&path)?)?;
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with('['));
    assert!(lines[0].ends_with("first message"));
    assert!(lines[1].ends_with("second message"));
    Ok(())
}

#[test]
fn test_absolutePath_withRelativePath_shouldResolveAgainstCwd() {
    let resolved = FileManager::absolute_path("some/relative.xml");
    assert!(resolved.is_absolute());
    assert!(resolved.ends_with("some/relative.xml"));
}

#[test]
fn test_absolutePath_withAbsolutePath_shouldBeUnchanged() {
    let path = std::path::Path::new("/tmp/already/absolute.xml");
    assert_eq!(FileManager::absolute_path(path), path);
}
