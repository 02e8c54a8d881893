use crate::{
    aggregator::PairAggregator,
    associator::TrialAssociator,
    classifier::StemClassifier,
    errors::UsanError,
    matcher::NameMatcher,
    models::*,
    output::OutputManager,
    parser::DatasetParser,
    Result,
};
use std::path::{Path, PathBuf};

/// Locations of the three source datasets. Only those needed by the
/// stages that actually run have to be present.
#[derive(Debug, Clone, Default)]
pub struct PipelineInputs {
    pub trials: Option<PathBuf>,
    pub vocabulary: Option<PathBuf>,
    pub stems: Option<PathBuf>,
}

pub struct Pipeline;

impl Pipeline {
    /// Run every stage from `config.start_stage` onwards. Each stage after the
    /// first reads its input back from the previous stage's artifact.
    pub fn run(inputs: &PipelineInputs, config: &PipelineConfig) -> Result<PipelineSummary> {
        let output_dir = config.output_dir.as_path();
        std::fs::create_dir_all(output_dir)?;
        log::info!(
            "Running pipeline from {:?} into {}",
            config.start_stage,
            output_dir.display()
        );

        let mut summary = PipelineSummary::default();

        if config.start_stage <= Stage::MatchDrugNames {
            summary.matched_trials = Some(Self::run_match_stage(inputs, config)?);
        }
        if config.start_stage <= Stage::ClassifyStems {
            summary.classified_drugs = Some(Self::run_classify_stage(inputs, config)?);
        }
        if config.start_stage <= Stage::AssociateTrials {
            summary.usan_records = Some(Self::run_associate_stage(config)?);
        }
        summary.class_pairs = Self::run_aggregate_stage(output_dir)?;

        OutputManager::generate_report(&summary, config, output_dir)?;
        Ok(summary)
    }

    fn run_match_stage(inputs: &PipelineInputs, config: &PipelineConfig) -> Result<usize> {
        let trials_path = Self::require(&inputs.trials, "trials file")?;
        let vocabulary_path = Self::require(&inputs.vocabulary, "vocabulary file")?;
        let trials = DatasetParser::parse_trials(trials_path)?;
        let vocabulary = DatasetParser::parse_vocabulary(vocabulary_path)?;

        let matched = NameMatcher::match_drug_names(&trials, &vocabulary, &config.matcher)?;
        OutputManager::save_matched_drugs(&matched, &config.output_dir)?;
        Ok(matched.len())
    }

    fn run_classify_stage(inputs: &PipelineInputs, config: &PipelineConfig) -> Result<usize> {
        let stems = DatasetParser::parse_stems(Self::require(&inputs.stems, "stems file")?)?;
        let matched = OutputManager::load_matched_drugs(&config.output_dir)?;

        let classifications = StemClassifier::classify_drugs(&matched, &stems, &config.classifier)?;
        OutputManager::save_drug_classifications(&classifications, &config.output_dir)?;
        Ok(classifications.len())
    }

    fn run_associate_stage(config: &PipelineConfig) -> Result<usize> {
        let matched = OutputManager::load_matched_drugs(&config.output_dir)?;
        let classifications = OutputManager::load_drug_classifications(&config.output_dir)?;

        let records =
            TrialAssociator::associate_trials(&matched, &classifications, config.association_mode)?;
        OutputManager::save_trials_by_usan(&records, &config.output_dir)?;
        Ok(records.len())
    }

    fn run_aggregate_stage(output_dir: &Path) -> Result<Vec<ClassPairCount>> {
        let records = OutputManager::load_trials_by_usan(output_dir)?;

        let pairs = PairAggregator::aggregate_pairs(&records)?;
        OutputManager::save_pair_counts(&pairs, output_dir)?;
        Ok(pairs)
    }

    fn require<'a>(path: &'a Option<PathBuf>, what: &str) -> Result<&'a Path> {
        path.as_deref()
            .ok_or_else(|| UsanError::MissingInput(format!("{} is required", what)))
    }
}
