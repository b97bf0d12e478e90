//! Plain-text document discovery
//!
//! Extracting text from richer formats (PDF and friends) is an external
//! concern; the loader only walks a directory for files that are already
//! plain text and hands them to the indexer.

use std::fs;
use std::path::Path;

use log::warn;
use walkdir::WalkDir;

use askdocs_core::{Error, Result};

const TEXT_EXTENSIONS: [&str; 2] = ["txt", "md"];

/// A raw document ready for chunking
#[derive(Debug, Clone)]
pub struct Document {
    pub name: String,
    pub text: String,
}

/// Recursively collect the plain-text documents under `dir`.
///
/// Files that cannot be read are skipped with a warning; a missing or
/// unreadable root directory is an error.
pub fn load_documents(dir: impl AsRef<Path>) -> Result<Vec<Document>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(Error::InvalidInput(format!(
            "{} is not a directory",
            dir.display()
        )));
    }

    let mut documents = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let is_text = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| TEXT_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
            .unwrap_or(false);
        if !is_text {
            continue;
        }

        match fs::read_to_string(path) {
            Ok(text) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                documents.push(Document { name, text });
            }
            Err(e) => warn!("skipping {}: {}", path.display(), e),
        }
    }
    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_only_text_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "alpha document").unwrap();
        std::fs::write(dir.path().join("b.md"), "# beta document").unwrap();
        std::fs::write(dir.path().join("c.pdf"), b"%PDF-1.4").unwrap();

        let docs = load_documents(dir.path()).unwrap();
        let mut names: Vec<&str> = docs.iter().map(|d| d.name.as_str()).collect();
        names.sort();
        assert_eq!(names, vec!["a.txt", "b.md"]);
    }

    #[test]
    fn walks_nested_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub").join("deep.txt"), "nested").unwrap();

        let docs = load_documents(dir.path()).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].name, "deep.txt");
        assert_eq!(docs[0].text, "nested");
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(load_documents(&missing).is_err());
    }
}
