use relative_path::RelativePath;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::delta::{Delta, Op};

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("Text not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed text document {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid texts directory: {0}")]
    InvalidTextsDir(String),
}

/// Stored texts are either a delta object or a bare op array
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredText {
    Delta(Delta),
    Ops(Vec<Op>),
}

/// Read a text document and return its content
pub fn read_text(relative_path: &RelativePath, texts_root: &Path) -> Result<Delta, ContentError> {
    let absolute_path = relative_path.to_path(texts_root);
    if !absolute_path.exists() {
        return Err(ContentError::NotFound(absolute_path));
    }
    let raw = fs::read_to_string(&absolute_path)?;
    let stored = serde_json::from_str(&raw).map_err(|source| ContentError::Json {
        path: absolute_path,
        source,
    })?;
    Ok(match stored {
        StoredText::Delta(delta) => delta,
        StoredText::Ops(ops) => Delta { ops },
    })
}

/// Write a text document as pretty-printed JSON
pub fn write_text(
    relative_path: &RelativePath,
    texts_root: &Path,
    content: &Delta,
) -> Result<(), ContentError> {
    let absolute_path = relative_path.to_path(texts_root);

    if let Some(parent) = absolute_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(content).map_err(|source| ContentError::Json {
        path: absolute_path.clone(),
        source,
    })?;
    fs::write(&absolute_path, json)?;
    Ok(())
}

/// Scan for text documents (`*.json`) in the texts directory
pub fn scan_texts(texts_root: &Path) -> Result<Vec<PathBuf>, ContentError> {
    validate_texts_dir(texts_root)?;

    let mut files = Vec::new();
    scan_directory_recursive(texts_root, &mut files)?;
    files.sort();
    Ok(files)
}

fn scan_directory_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), ContentError> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();

        if path.is_dir() {
            scan_directory_recursive(&path, files)?;
        } else if let Some(ext) = path.extension()
            && ext == "json"
        {
            files.push(path);
        }
    }

    Ok(())
}

pub fn validate_texts_dir(path: &Path) -> Result<(), ContentError> {
    if !path.exists() || !path.is_dir() {
        return Err(ContentError::InvalidTextsDir(format!(
            "{} is not a directory",
            path.display()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delta::Embed;
    use crate::tests::{create_test_file, create_test_texts_dir};

    #[test]
    fn test_scan_finds_json_texts() {
        // Given a texts directory with documents and other files
        let texts_dir = create_test_texts_dir();
        create_test_file(&texts_dir, "GEN/1.json", "[]");
        create_test_file(&texts_dir, "EXO/1.json", "[]");
        create_test_file(&texts_dir, "notes.md", "# not a text");

        // When scanning
        let files = scan_texts(texts_dir.path()).unwrap();

        // Then only the json documents are found, sorted
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("EXO/1.json"));
        assert!(files[1].ends_with("GEN/1.json"));
    }

    #[test]
    fn test_scan_invalid_directory() {
        let result = scan_texts(Path::new("/this/path/does/not/exist"));
        assert!(matches!(result, Err(ContentError::InvalidTextsDir(_))));
    }

    #[test]
    fn test_read_bare_op_array() {
        let texts_dir = create_test_texts_dir();
        create_test_file(
            &texts_dir,
            "GEN/1.json",
            r#"[{"insert":{"chapter":{"number":"1","style":"c"}}},{"insert":"In the beginning"}]"#,
        );

        let delta = read_text(RelativePath::new("GEN/1.json"), texts_dir.path()).unwrap();
        assert_eq!(delta.ops.len(), 2);
        assert_eq!(delta.text(), "In the beginning");
    }

    #[test]
    fn test_write_then_read_delta_object() {
        let texts_dir = create_test_texts_dir();
        let mut content = Delta::new();
        content.insert_embed(Embed::verse("1"), None).insert("Hello", None);

        write_text(RelativePath::new("nested/dir/JHN.json"), texts_dir.path(), &content).unwrap();
        let read = read_text(RelativePath::new("nested/dir/JHN.json"), texts_dir.path()).unwrap();
        assert_eq!(read, content);
    }

    #[test]
    fn test_read_missing_text() {
        let texts_dir = create_test_texts_dir();
        let result = read_text(RelativePath::new("missing.json"), texts_dir.path());
        assert!(matches!(result, Err(ContentError::NotFound(_))));
    }

    #[test]
    fn test_malformed_embed_is_reported() {
        let texts_dir = create_test_texts_dir();
        create_test_file(
            &texts_dir,
            "bad.json",
            r#"[{"insert":{"verse":{},"chapter":{}}}]"#,
        );

        let result = read_text(RelativePath::new("bad.json"), texts_dir.path());
        let error = result.unwrap_err();
        assert!(matches!(error, ContentError::Json { .. }));
        assert!(error.to_string().contains("bad.json"));
    }
}
