//! This module provides the `DefinitionLoader` struct, responsible for loading machine
//! definitions from files, strings and directories in either supported format.

use crate::definition::Definition;
use crate::parser::parse;
use crate::types::{TuringMachineError, MAX_DEFINITION_SIZE};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The on-disk formats a definition can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// The line-oriented `.tm` format.
    Text,
    /// The JSON document format.
    Json,
}

impl Format {
    /// Picks the format from a file extension (`tm` or `json`).
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "tm" => Some(Format::Text),
            "json" => Some(Format::Json),
            _ => None,
        }
    }
}

/// `DefinitionLoader` is a utility struct for loading machine definitions.
pub struct DefinitionLoader;

impl DefinitionLoader {
    /// Loads a single definition from the specified file path.
    ///
    /// The format is picked from the file extension. Definitions without a `name`
    /// are named after the file stem.
    ///
    /// # Returns
    ///
    /// * `Ok(Definition)` if the file is successfully read and parsed.
    /// * `Err(TuringMachineError::FileError)` if the file cannot be read or has an unknown extension.
    /// * Any error of [`DefinitionLoader::load_from_str`] otherwise.
    pub fn load(path: &Path) -> Result<Definition, TuringMachineError> {
        let format = Format::from_path(path).ok_or_else(|| {
            TuringMachineError::FileError(format!(
                "Unsupported definition file {} (expected .tm or .json)",
                path.display()
            ))
        })?;

        let content = fs::read_to_string(path).map_err(|e| {
            TuringMachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        let mut definition = Self::load_from_str(&content, format)?;
        if definition.name.is_none() {
            definition.name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned());
        }

        debug!(
            path = %path.display(),
            states = definition.machine.states().len(),
            transitions = definition.machine.table().len(),
            "loaded definition"
        );

        Ok(definition)
    }

    /// Loads a single definition from string content in the given format.
    ///
    /// # Returns
    ///
    /// * `Ok(Definition)` if the content is successfully parsed.
    /// * `Err(TuringMachineError::DefinitionError)` if the content exceeds [`MAX_DEFINITION_SIZE`].
    /// * The parse, document or configuration error of the format otherwise.
    pub fn load_from_str(content: &str, format: Format) -> Result<Definition, TuringMachineError> {
        if content.len() > MAX_DEFINITION_SIZE {
            return Err(TuringMachineError::DefinitionError(format!(
                "Definition is {} bytes, the limit is {}",
                content.len(),
                MAX_DEFINITION_SIZE
            )));
        }

        match format {
            Format::Text => parse(content),
            Format::Json => Definition::from_json(content),
        }
    }

    /// Loads all definition files (`.tm` and `.json`) from a given directory.
    ///
    /// Directories and files with other extensions are skipped. Each file yields its own
    /// result, so one broken definition does not hide the others.
    pub fn load_all(directory: &Path) -> Vec<Result<(PathBuf, Definition), TuringMachineError>> {
        if !directory.exists() {
            return vec![Err(TuringMachineError::FileError(format!(
                "Directory {} does not exist",
                directory.display()
            )))];
        }

        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(TuringMachineError::FileError(format!(
                    "Failed to read directory {}: {}",
                    directory.display(),
                    e
                )))]
            }
        };

        let mut paths: Vec<PathBuf> = Vec::new();
        let mut results = Vec::new();

        for entry in entries {
            match entry {
                Ok(entry) => paths.push(entry.path()),
                Err(e) => results.push(Err(TuringMachineError::FileError(format!(
                    "Failed to read directory entry: {}",
                    e
                )))),
            }
        }

        // Sort for a stable order across platforms
        paths.sort();

        results.extend(
            paths
                .into_iter()
                .filter(|path| !path.is_dir() && Format::from_path(path).is_some())
                .map(|path| match Self::load(&path) {
                    Ok(definition) => Ok((path, definition)),
                    Err(e) => Err(TuringMachineError::FileError(format!(
                        "Failed to load definition from {}: {}",
                        path.display(),
                        e
                    ))),
                }),
        );

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    const TEXT_DEFINITION: &str =
        "states: q0, qf\ninitial: q0\nfinal: qf\nrules:\n  q0, _, a -> qf, _, b, R";
    const JSON_DEFINITION: &str = r#"{
  "name": "Json Machine",
  "q_states": { "q_list": ["q0"], "initial": "q0", "final": ["q0"] },
  "simulation_strings": ["a"]
}"#;

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_text_definition() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "flip.tm", TEXT_DEFINITION);

        let definition = DefinitionLoader::load(&path).unwrap();

        assert_eq!(definition.name.as_deref(), Some("flip"));
        assert_eq!(definition.machine.table().len(), 1);
        assert_eq!(definition.machine.run("a", 10).unwrap().final_tape, "b_");
    }

    #[test]
    fn test_load_json_definition() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "machine.json", JSON_DEFINITION);

        let definition = DefinitionLoader::load(&path).unwrap();

        assert_eq!(definition.name.as_deref(), Some("Json Machine"));
        assert_eq!(definition.simulation_strings, vec!["a"]);
    }

    #[test]
    fn test_load_unsupported_extension() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "machine.yaml", "q_states: {}");

        let result = DefinitionLoader::load(&path);
        assert!(matches!(result, Err(TuringMachineError::FileError(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let result = DefinitionLoader::load(&dir.path().join("missing.tm"));

        match result {
            Err(TuringMachineError::FileError(msg)) => assert!(msg.contains("Failed to read file")),
            _ => panic!("Expected a FileError"),
        }
    }

    #[test]
    fn test_load_oversized_definition() {
        let content = "#".repeat(MAX_DEFINITION_SIZE + 1);
        let result = DefinitionLoader::load_from_str(&content, Format::Text);

        assert!(matches!(result, Err(TuringMachineError::DefinitionError(_))));
    }

    #[test]
    fn test_load_all_from_directory() {
        let dir = tempdir().unwrap();

        write_file(dir.path(), "valid.tm", TEXT_DEFINITION);
        write_file(dir.path(), "valid.json", JSON_DEFINITION);
        write_file(dir.path(), "invalid.tm", "This is not a valid definition");
        write_file(dir.path(), "ignored.txt", "This file should be ignored");

        let results = DefinitionLoader::load_all(dir.path());

        // We should have 3 results: 2 successes and 1 error
        assert_eq!(results.len(), 3);

        let success_count = results.iter().filter(|r| r.is_ok()).count();
        let error_count = results.iter().filter(|r| r.is_err()).count();

        assert_eq!(success_count, 2);
        assert_eq!(error_count, 1);
    }

    #[test]
    fn test_load_all_missing_directory() {
        let dir = tempdir().unwrap();
        let results = DefinitionLoader::load_all(&dir.path().join("nope"));

        assert_eq!(results.len(), 1);
        assert!(results[0].is_err());
    }
}
