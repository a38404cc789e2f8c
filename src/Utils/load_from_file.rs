use crate::Chemistry::atom_registry::ElementRecord;
use crate::Chemistry::errors::ChemError;
use log::{error, info, warn};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Parses a document for element data under the "ELEMENTS" header.
/// The section is a JSON array of records `{"symbol": .., "atomic_number": .., "atomic_mass": ..}`
/// and runs until the next all-uppercase header line or the end of the file.
pub fn load_element_section(file_name: &str) -> Result<Vec<ElementRecord>, ChemError> {
    let path = Path::new(file_name);
    if !path.exists() {
        return Err(ChemError::ElementTable(format!(
            "File '{}' does not exist",
            file_name
        )));
    }

    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let lines: Vec<String> = reader.lines().collect::<Result<_, _>>()?;

    let start_index = lines
        .iter()
        .position(|line| line.trim().to_uppercase() == "ELEMENTS")
        .map(|i| i + 1)
        .ok_or_else(|| {
            ChemError::ElementTable(format!("No 'ELEMENTS' header found in file '{}'", file_name))
        })?;

    let end_index = lines[start_index..]
        .iter()
        .position(|line| {
            let trimmed = line.trim();
            !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_uppercase() || c == '_')
        })
        .map(|offset| start_index + offset)
        .unwrap_or(lines.len());

    let section = lines[start_index..end_index].join("\n");

    match serde_json::from_str::<Vec<ElementRecord>>(&section) {
        Ok(records) => {
            info!("Successfully parsed element data from file '{}'", file_name);
            Ok(records)
        }
        Err(e) => {
            let error_line = e.line();
            let error_column = e.column();
            // serde_json counts lines from 1 inside the section
            let actual_line = start_index + error_line.saturating_sub(1);
            error!(
                "Error parsing element data at line {}, column {} (line {} in file): {}",
                error_line,
                error_column,
                actual_line + 1,
                e
            );
            if let Some(problem_line) = lines.get(actual_line) {
                error!("Problematic line: {}", problem_line);
                if error_column >= 1 && error_column <= problem_line.len() {
                    error!("{}^", " ".repeat(error_column - 1));
                }
            }
            Err(ChemError::Json(e))
        }
    }
}

/// Loads the element section and reports suspicious content.
/// Duplicates are only reported here; rejecting them is up to the registry.
pub fn load_elements_from_file(file_name: &str) -> Result<Vec<ElementRecord>, ChemError> {
    let records = load_element_section(file_name)?;

    if records.is_empty() {
        warn!("Loaded element table from '{}' is empty", file_name);
    }
    let mut seen = HashSet::new();
    for record in &records {
        if !seen.insert(record.symbol.as_str()) {
            warn!(
                "Element '{}' appears more than once in '{}'",
                record.symbol, file_name
            );
        }
    }
    info!(
        "Loaded {} element records from file '{}'",
        records.len(),
        file_name
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_document(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_elements_section() {
        let file = write_document(
            "comment line\nELEMENTS\n[\n  {\"symbol\": \"H\", \"atomic_number\": 1, \"atomic_mass\": 1.008},\n  {\"symbol\": \"O\", \"atomic_number\": 8, \"atomic_mass\": 15.999}\n]\nEND\n",
        );
        let records = load_elements_from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(
            records,
            vec![
                ElementRecord::new("H", 1, 1.008),
                ElementRecord::new("O", 8, 15.999)
            ]
        );
    }

    #[test]
    fn test_missing_header() {
        let file = write_document("[]\n");
        let result = load_elements_from_file(file.path().to_str().unwrap());
        assert!(matches!(result, Err(ChemError::ElementTable(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = load_elements_from_file("definitely_not_here_elements.txt");
        assert!(matches!(result, Err(ChemError::ElementTable(_))));
    }

    #[test]
    fn test_malformed_json() {
        let file = write_document("ELEMENTS\n[{\"symbol\": \"H\", \"atomic_number\": }]\n");
        let result = load_elements_from_file(file.path().to_str().unwrap());
        assert!(matches!(result, Err(ChemError::Json(_))));
    }

    #[test]
    fn test_duplicates_are_loaded_not_rejected() {
        let file = write_document(
            "ELEMENTS\n[{\"symbol\": \"H\", \"atomic_number\": 1, \"atomic_mass\": 1.0}, {\"symbol\": \"H\", \"atomic_number\": 1, \"atomic_mass\": 1.0}]\n",
        );
        let records = load_elements_from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(records.len(), 2);
    }
}
