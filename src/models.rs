use crate::{errors::UsanError, stopwords, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InterventionType {
    Drug,
    Other(String),
}

impl From<String> for InterventionType {
    fn from(value: String) -> Self {
        if value == "Drug" {
            InterventionType::Drug
        } else {
            InterventionType::Other(value)
        }
    }
}

impl From<InterventionType> for String {
    fn from(value: InterventionType) -> Self {
        match value {
            InterventionType::Drug => "Drug".to_string(),
            InterventionType::Other(other) => other,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialRecord {
    #[serde(rename = "nct_id")]
    pub trial_id: String,
    pub intervention_type: InterventionType,
    pub intervention_name: String,
}

/// A canonical drug and every lower-cased label it may be found under.
/// The canonical name itself is always the last alt label.
#[derive(Debug, Clone, PartialEq)]
pub struct VocabularyEntry {
    pub canonical_name: String,
    pub alt_labels: Vec<String>,
}

impl VocabularyEntry {
    pub fn new(canonical_name: &str, alt_label_list: &str) -> Self {
        let mut alt_labels: Vec<String> = alt_label_list
            .split('|')
            .map(|label| label.trim().to_lowercase())
            .filter(|label| !label.is_empty())
            .collect();
        alt_labels.push(canonical_name.to_lowercase());

        Self {
            canonical_name: canonical_name.to_string(),
            alt_labels,
        }
    }

    /// Pipe-joined label text searched by the substring policies.
    pub fn label_text(&self) -> String {
        self.alt_labels.join("|")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StemRule {
    pub stem: String,
    #[serde(default, rename = "name")]
    pub class_name: String,
    pub definition: String,
}

impl StemRule {
    pub fn stripped_stem(&self) -> &str {
        self.stem.trim().trim_matches('-')
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedDrugs {
    pub nct_id: String,
    pub drugs: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeType {
    Class,
    Subclass,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsanCode {
    pub description: String,
    #[serde(rename = "type")]
    pub code_type: CodeType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrugClassification {
    pub drug: String,
    pub usan_codes: Vec<UsanCode>,
}

/// A class or subclass description together with the trials of one drug that carries it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialsByUsan {
    pub description: String,
    #[serde(rename = "type")]
    pub code_type: CodeType,
    pub trials: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassPairCount {
    pub description_1: String,
    pub description_2: String,
    pub trial_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchPolicy {
    /// Substring search keeping the last matching vocabulary entry.
    #[default]
    SubstringLast,
    SubstringFirst,
    /// Token must equal one of the entry's alt labels.
    Exact,
}

#[derive(Debug, Clone)]
pub struct MatcherConfig {
    pub stopwords: HashSet<String>,
    pub match_policy: MatchPolicy,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            stopwords: stopwords::default_stopwords(),
            match_policy: MatchPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnresolvedStemPolicy {
    /// Leave the stem out of the drug's codes and keep going.
    #[default]
    Drop,
    /// Abort the classification stage.
    Fail,
}

#[derive(Debug, Clone, Default)]
pub struct ClassifierConfig {
    pub unresolved_policy: UnresolvedStemPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssociationMode {
    /// Drug name is searched inside the trial's rendered drug list.
    #[default]
    RenderedSubstring,
    ExactMembership,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    MatchDrugNames = 1,
    ClassifyStems = 2,
    AssociateTrials = 3,
    AggregatePairs = 4,
}

impl Stage {
    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Stage::MatchDrugNames),
            2 => Some(Stage::ClassifyStems),
            3 => Some(Stage::AssociateTrials),
            4 => Some(Stage::AggregatePairs),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub matcher: MatcherConfig,
    pub classifier: ClassifierConfig,
    pub association_mode: AssociationMode,
    pub output_dir: PathBuf,
    pub start_stage: Stage,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            matcher: MatcherConfig::default(),
            classifier: ClassifierConfig::default(),
            association_mode: AssociationMode::default(),
            output_dir: PathBuf::from("./output"),
            start_stage: Stage::MatchDrugNames,
        }
    }
}

/// Record counts from each stage that ran, for the run report.
#[derive(Debug, Clone, Default)]
pub struct PipelineSummary {
    pub matched_trials: Option<usize>,
    pub classified_drugs: Option<usize>,
    pub usan_records: Option<usize>,
    pub class_pairs: Vec<ClassPairCount>,
}

/// Checked at each stage boundary before any record is processed.
pub trait Validate {
    fn validate(&self, source_name: &str, record: usize) -> Result<()>;
}

pub fn validate_all<T: Validate>(records: &[T], source_name: &str) -> Result<()> {
    records
        .iter()
        .enumerate()
        .try_for_each(|(i, record)| record.validate(source_name, i + 1))
}

fn require_non_empty(value: &str, field: &str, source_name: &str, record: usize) -> Result<()> {
    if value.trim().is_empty() {
        return Err(UsanError::malformed(source_name, record, format!("empty {}", field)));
    }
    Ok(())
}

impl Validate for TrialRecord {
    fn validate(&self, source_name: &str, record: usize) -> Result<()> {
        require_non_empty(&self.trial_id, "nct_id", source_name, record)
    }
}

impl Validate for VocabularyEntry {
    fn validate(&self, source_name: &str, record: usize) -> Result<()> {
        require_non_empty(&self.canonical_name, "canonical name", source_name, record)
    }
}

impl Validate for MatchedDrugs {
    fn validate(&self, source_name: &str, record: usize) -> Result<()> {
        require_non_empty(&self.nct_id, "nct_id", source_name, record)?;
        if self.drugs.is_empty() {
            return Err(UsanError::malformed(source_name, record, "trial without drugs"));
        }
        self.drugs
            .iter()
            .try_for_each(|drug| require_non_empty(drug, "drug name", source_name, record))
    }
}

impl Validate for DrugClassification {
    fn validate(&self, source_name: &str, record: usize) -> Result<()> {
        require_non_empty(&self.drug, "drug", source_name, record)?;
        self.usan_codes.iter().try_for_each(|code| {
            require_non_empty(&code.description, "description", source_name, record)
        })
    }
}

impl Validate for TrialsByUsan {
    fn validate(&self, source_name: &str, record: usize) -> Result<()> {
        require_non_empty(&self.description, "description", source_name, record)?;
        self.trials
            .iter()
            .try_for_each(|trial| require_non_empty(trial, "trial id", source_name, record))
    }
}

/// Trial ids must be unique across the corpus.
pub fn validate_unique_trials(trials: &[TrialRecord], source_name: &str) -> Result<()> {
    let mut seen = HashSet::new();
    for (i, trial) in trials.iter().enumerate() {
        if !seen.insert(trial.trial_id.as_str()) {
            return Err(UsanError::malformed(
                source_name,
                i + 1,
                format!("duplicate nct_id {}", trial.trial_id),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocabulary_entry_appends_canonical_name() {
        let entry = VocabularyEntry::new("Aspirin", "ASA|Acetylsalicylic Acid");
        assert_eq!(entry.alt_labels, vec!["asa", "acetylsalicylic acid", "aspirin"]);
        assert_eq!(entry.label_text(), "asa|acetylsalicylic acid|aspirin");
    }

    #[test]
    fn test_empty_alt_labels_keep_canonical_name() {
        let entry = VocabularyEntry::new("Heparin", "");
        assert_eq!(entry.alt_labels, vec!["heparin"]);
    }

    #[test]
    fn test_stem_stripping() {
        let rule = StemRule {
            stem: "-vir-".to_string(),
            class_name: String::new(),
            definition: "antiviral".to_string(),
        };
        assert_eq!(rule.stripped_stem(), "vir");
    }

    #[test]
    fn test_code_type_serialization() {
        let code = UsanCode {
            description: "anticoagulant".to_string(),
            code_type: CodeType::Subclass,
        };
        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, r#"{"description":"anticoagulant","type":"subclass"}"#);
    }

    #[test]
    fn test_duplicate_trial_ids_rejected() {
        let trial = TrialRecord {
            trial_id: "NCT001".to_string(),
            intervention_type: InterventionType::Drug,
            intervention_name: "aspirin".to_string(),
        };
        let result = validate_unique_trials(&[trial.clone(), trial], "trials");
        assert!(matches!(result, Err(UsanError::MalformedInput { record: 2, .. })));
    }
}
