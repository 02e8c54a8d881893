use crate::{models::*, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

pub const MATCHED_DRUG_NAMES_FILE: &str = "matched_drug_names.json";
pub const DRUGS_USAN_FILE: &str = "drugs_usan.json";
pub const TRIALS_BY_USAN_FILE: &str = "trials_by_usan.json";
pub const USAN_PAIRS_FILE: &str = "counts_of_usan_pairs.json";
pub const USAN_PAIRS_CSV_FILE: &str = "counts_of_usan_pairs.csv";
pub const REPORT_FILE: &str = "pipeline_report.txt";

pub struct OutputManager;

impl OutputManager {
    pub fn save_matched_drugs(matched: &[MatchedDrugs], output_dir: &Path) -> Result<()> {
        Self::save_json(matched, &output_dir.join(MATCHED_DRUG_NAMES_FILE))
    }

    pub fn load_matched_drugs(output_dir: &Path) -> Result<Vec<MatchedDrugs>> {
        let matched: Vec<MatchedDrugs> =
            Self::load_json(&output_dir.join(MATCHED_DRUG_NAMES_FILE))?;
        validate_all(&matched, MATCHED_DRUG_NAMES_FILE)?;
        Ok(matched)
    }

    pub fn save_drug_classifications(
        classifications: &[DrugClassification],
        output_dir: &Path,
    ) -> Result<()> {
        Self::save_json(classifications, &output_dir.join(DRUGS_USAN_FILE))
    }

    pub fn load_drug_classifications(output_dir: &Path) -> Result<Vec<DrugClassification>> {
        let classifications: Vec<DrugClassification> =
            Self::load_json(&output_dir.join(DRUGS_USAN_FILE))?;
        validate_all(&classifications, DRUGS_USAN_FILE)?;
        Ok(classifications)
    }

    pub fn save_trials_by_usan(records: &[TrialsByUsan], output_dir: &Path) -> Result<()> {
        Self::save_json(records, &output_dir.join(TRIALS_BY_USAN_FILE))
    }

    pub fn load_trials_by_usan(output_dir: &Path) -> Result<Vec<TrialsByUsan>> {
        let records: Vec<TrialsByUsan> = Self::load_json(&output_dir.join(TRIALS_BY_USAN_FILE))?;
        validate_all(&records, TRIALS_BY_USAN_FILE)?;
        Ok(records)
    }

    /// Pair counts go out both as JSON and as a CSV table.
    pub fn save_pair_counts(pairs: &[ClassPairCount], output_dir: &Path) -> Result<()> {
        Self::save_json(pairs, &output_dir.join(USAN_PAIRS_FILE))?;

        let mut writer = csv::Writer::from_path(output_dir.join(USAN_PAIRS_CSV_FILE))?;
        for pair in pairs {
            writer.serialize(pair)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn generate_report(
        summary: &PipelineSummary,
        config: &PipelineConfig,
        output_dir: &Path,
    ) -> Result<()> {
        let file_path = output_dir.join(REPORT_FILE);
        let mut file = File::create(file_path)?;

        writeln!(file, "USAN CLASS ANALYSIS OF CLINICAL TRIALS")?;
        writeln!(file, "======================================")?;
        writeln!(file, "Generated: {}", chrono::Utc::now().to_rfc3339())?;
        writeln!(file)?;

        writeln!(file, "Configuration:")?;
        writeln!(file, "- Start stage: {:?}", config.start_stage)?;
        writeln!(file, "- Match policy: {:?}", config.matcher.match_policy)?;
        writeln!(file, "- Stop-words: {}", config.matcher.stopwords.len())?;
        writeln!(file, "- Unresolved stems: {:?}", config.classifier.unresolved_policy)?;
        writeln!(file, "- Trial association: {:?}", config.association_mode)?;
        writeln!(file)?;

        writeln!(file, "Stage Results:")?;
        let count = |n: Option<usize>| n.map_or("skipped".to_string(), |v| v.to_string());
        writeln!(file, "- Trials with matched drugs: {}", count(summary.matched_trials))?;
        writeln!(file, "- Drugs with USAN stems: {}", count(summary.classified_drugs))?;
        writeln!(file, "- USAN records with trials: {}", count(summary.usan_records))?;
        writeln!(file, "- Distinct class pairs: {}", summary.class_pairs.len())?;
        writeln!(file)?;

        writeln!(file, "Most Frequent Class Pairs:")?;
        for pair in summary.class_pairs.iter().take(10) {
            writeln!(
                file,
                "- {} + {}: {} trials",
                pair.description_1, pair.description_2, pair.trial_count
            )?;
        }

        log::info!("Report saved to: {}", output_dir.join(REPORT_FILE).display());
        Ok(())
    }

    fn save_json<T: Serialize + ?Sized>(value: &T, file_path: &Path) -> Result<()> {
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json_string = serde_json::to_string_pretty(value)?;
        fs::write(file_path, json_string)?;
        log::info!("Saved {}", file_path.display());
        Ok(())
    }

    fn load_json<T: DeserializeOwned>(file_path: &Path) -> Result<T> {
        let contents = fs::read_to_string(file_path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}
