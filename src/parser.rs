use crate::{errors::UsanError, models::*, Result};
use csv::ReaderBuilder;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

pub struct DatasetParser;

impl DatasetParser {
    /// Parse the JSON Lines trial corpus. Intervention names are lower-cased.
    pub fn parse_trials<P: AsRef<Path>>(file_path: P) -> Result<Vec<TrialRecord>> {
        let file = File::open(file_path)?;
        Self::read_trials(BufReader::new(file))
    }

    pub fn read_trials<R: BufRead>(reader: R) -> Result<Vec<TrialRecord>> {
        let mut trials = Vec::new();

        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let mut trial: TrialRecord = serde_json::from_str(&line)
                .map_err(|e| UsanError::malformed("trials", i + 1, e.to_string()))?;
            trial.intervention_name = trial.intervention_name.to_lowercase();
            trial.validate("trials", i + 1)?;
            trials.push(trial);
        }

        validate_unique_trials(&trials, "trials")?;
        log::info!("Loaded {} trial records", trials.len());
        Ok(trials)
    }

    /// Parse the vocabulary CSV: canonical name in the first column,
    /// pipe-delimited alt labels in the second.
    pub fn parse_vocabulary<P: AsRef<Path>>(file_path: P) -> Result<Vec<VocabularyEntry>> {
        let file = File::open(file_path)?;
        Self::read_vocabulary(file)
    }

    pub fn read_vocabulary<R: Read>(reader: R) -> Result<Vec<VocabularyEntry>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let mut vocabulary = Vec::new();
        for (i, result) in reader.records().enumerate() {
            let record = result?;
            let canonical_name = record.get(0).ok_or_else(|| {
                UsanError::malformed("vocabulary", i + 1, "missing canonical name")
            })?;
            let alt_labels = record.get(1).unwrap_or("");

            let entry = VocabularyEntry::new(canonical_name.trim(), alt_labels);
            entry.validate("vocabulary", i + 1)?;
            vocabulary.push(entry);
        }

        log::info!("Loaded {} vocabulary entries", vocabulary.len());
        Ok(vocabulary)
    }

    /// Parse the stem table. Rows whose field count disagrees with the
    /// header are reported and skipped.
    pub fn parse_stems<P: AsRef<Path>>(file_path: P) -> Result<Vec<StemRule>> {
        let file = File::open(file_path)?;
        Self::read_stems(file)
    }

    pub fn read_stems<R: Read>(reader: R) -> Result<Vec<StemRule>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        let column = |name: &str| headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name));

        let stem_idx = column("stem")
            .ok_or_else(|| UsanError::ParseError("Missing stem column".to_string()))?;
        let definition_idx = column("definition")
            .ok_or_else(|| UsanError::ParseError("Missing definition column".to_string()))?;
        let name_idx = column("name");

        let mut stems = Vec::new();
        for (i, result) in reader.records().enumerate() {
            let record = result?;
            if record.len() != headers.len() {
                log::warn!(
                    "Skipping stem row {} ({} fields, expected {}): {:?}",
                    i + 1,
                    record.len(),
                    headers.len(),
                    record
                );
                continue;
            }

            stems.push(StemRule {
                stem: record.get(stem_idx).unwrap_or("").trim().to_string(),
                class_name: name_idx
                    .and_then(|idx| record.get(idx))
                    .unwrap_or("")
                    .trim()
                    .to_string(),
                definition: record.get(definition_idx).unwrap_or("").trim().to_string(),
            });
        }

        log::info!("Loaded {} stem rules", stems.len());
        Ok(stems)
    }
}
