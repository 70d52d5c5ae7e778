use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Create a temporary texts directory
pub fn create_test_texts_dir() -> TempDir {
    tempfile::tempdir().unwrap()
}

/// Create a file under the texts directory, creating parent folders as needed
pub fn create_test_file(texts_dir: &TempDir, relative: &str, content: &str) -> PathBuf {
    let file_path = texts_dir.path().join(relative);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&file_path, content).unwrap();
    file_path
}
