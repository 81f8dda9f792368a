//! Check the predicate syntax of Arlington grammar files

use std::{fs, path::PathBuf};

use tracing::info;

use super::CliError;
use crate::{PredicateProcessor, RowReport, TsvGrammar};

/// Options for the validate command
#[derive(Debug, Clone, Default)]
pub struct ValidateOptions {
    /// TSV grammar files
    pub paths: Vec<PathBuf>,
}

/// Outcome of validating a set of grammar files
#[derive(Debug, Default)]
pub struct ValidateSummary {
    pub files: usize,
    pub rows: usize,
    /// Failing rows, with the grammar they belong to
    pub failures: Vec<(String, RowReport)>,
}

impl ValidateSummary {
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Loads every grammar file and checks each row's cells.
pub fn execute_validate(options: &ValidateOptions) -> Result<ValidateSummary, CliError> {
    let mut summary = ValidateSummary::default();

    for path in &options.paths {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let text = fs::read_to_string(path)?;
        let grammar = TsvGrammar::from_tsv(name, &text).map_err(|source| CliError::Grammar {
            path: path.display().to_string(),
            source,
        })?;

        let processor = PredicateProcessor::new(&grammar.rows);
        for key_idx in 0..grammar.rows.len() {
            let report = processor.validate_row_syntax(key_idx);
            if !report.is_ok() {
                summary.failures.push((grammar.name.clone(), report));
            }
        }
        info!(grammar = %grammar.name, rows = grammar.rows.len(), "validated grammar file");
        summary.files += 1;
        summary.rows += grammar.rows.len();
    }
    Ok(summary)
}
