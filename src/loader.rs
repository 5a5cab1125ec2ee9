//! This module provides the `SourceLoader` struct, responsible for reading specifications
//! and tapes from inline arguments, files, or piped input.

use crate::types::PenroseError;
use std::fs;
use std::io::Read;
use std::path::Path;

/// `SourceLoader` is a utility struct for loading the text inputs of a run.
///
/// Loaded text has trailing whitespace trimmed, so files ending in a newline are accepted.
pub struct SourceLoader;

impl SourceLoader {
    /// Resolves an input given either inline or as a file. The file takes precedence.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(String))` with the input text.
    /// * `Ok(None)` if neither source was given.
    /// * `Err(PenroseError::FileError)` if the file cannot be read.
    pub fn load(inline: Option<&str>, file: Option<&Path>) -> Result<Option<String>, PenroseError> {
        match (file, inline) {
            (Some(path), _) => Self::load_file(path).map(Some),
            (None, Some(text)) => Ok(Some(text.trim_end().to_string())),
            (None, None) => Ok(None),
        }
    }

    /// Loads an input from the specified file path.
    pub fn load_file(path: &Path) -> Result<String, PenroseError> {
        let content = fs::read_to_string(path).map_err(|e| {
            PenroseError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        Ok(content.trim_end().to_string())
    }

    /// Loads an input from a reader, typically piped stdin.
    pub fn load_reader<R: Read>(mut reader: R) -> Result<String, PenroseError> {
        let mut content = String::new();
        reader
            .read_to_string(&mut content)
            .map_err(|e| PenroseError::FileError(format!("Failed to read input: {}", e)))?;

        Ok(content.trim_end().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_load_file_trims_newline() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("un_plus_1.tm");

        let mut file = File::create(&file_path).unwrap();
        file.write_all(b"101011010111101010\n").unwrap();

        let content = SourceLoader::load_file(&file_path).unwrap();
        assert_eq!(content, "101011010111101010");
    }

    #[test]
    fn test_file_takes_precedence() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("tape.txt");
        fs::write(&file_path, "111").unwrap();

        let content = SourceLoader::load(Some("0"), Some(&file_path)).unwrap();
        assert_eq!(content.as_deref(), Some("111"));
    }

    #[test]
    fn test_load_inline() {
        let content = SourceLoader::load(Some("1011"), None).unwrap();
        assert_eq!(content.as_deref(), Some("1011"));
        assert_eq!(SourceLoader::load(None, None).unwrap(), None);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("missing.tm");

        let result = SourceLoader::load(None, Some(&file_path));
        match result {
            Err(PenroseError::FileError(message)) => {
                assert!(message.contains("Failed to read file"));
                assert!(message.contains("missing.tm"));
            }
            other => panic!("Expected a file error, but got {:?}", other),
        }
    }

    #[test]
    fn test_load_reader() {
        let content = SourceLoader::load_reader("110\r\n".as_bytes()).unwrap();
        assert_eq!(content, "110");
    }
}
