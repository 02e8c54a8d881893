use crate::{models::*, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

const VOCABULARY: &[(&str, &str)] = &[
    ("heparin", "unfractionated heparin|heparin sodium"),
    ("enoxaparin", "lovenox|enoxaparin sodium"),
    ("warfarin", "coumadin|jantoven"),
    ("clopidogrel", "plavix"),
    ("ticagrelor", "brilinta"),
    ("atorvastatin", "lipitor"),
    ("simvastatin", "zocor"),
    ("metoprolol", "lopressor|toprol"),
    ("propranolol", "inderal"),
    ("rituximab", "rituxan"),
    ("aspirin", "acetylsalicylic acid|asa"),
];

/// (stem, definition, class name)
const STEMS: &[(&str, &str, &str)] = &[
    ("-parin", "heparin derivatives", "-parin"),
    ("-arin", "anticoagulants (warfarin type)", ""),
    ("-grel", "platelet aggregation inhibitors", "-grel"),
    ("-vastatin", "HMG-CoA reductase inhibitors", "-vastatin"),
    ("-olol", "beta-blockers", "-olol"),
    ("-mab", "monoclonal antibodies", ""),
    ("-ximab", "chimeric monoclonal antibodies", ""),
];

const FILLER: &[&str] = &["500mg", "tablet", "oral", "iv", "and", "plus", "placebo"];
const OTHER_TYPES: &[&str] = &["Device", "Behavioral", "Procedure"];

/// Paths of a generated trials/vocabulary/stems triple.
#[derive(Debug, Clone)]
pub struct ExampleFiles {
    pub trials: PathBuf,
    pub vocabulary: PathBuf,
    pub stems: PathBuf,
}

pub struct ExampleDataGenerator;

impl ExampleDataGenerator {
    pub fn generate_dataset<P: AsRef<Path>>(
        output_dir: P,
        n_trials: usize,
    ) -> Result<ExampleFiles> {
        let output_dir = output_dir.as_ref();
        fs::create_dir_all(output_dir)?;
        let mut rng = StdRng::seed_from_u64(42); // Reproducible results

        let files = ExampleFiles {
            trials: output_dir.join("clinical_trials.jsonl"),
            vocabulary: output_dir.join("drugs.csv"),
            stems: output_dir.join("usan_stems.csv"),
        };

        Self::write_vocabulary(&files.vocabulary)?;
        Self::write_stems(&files.stems)?;

        let mut file = File::create(&files.trials)?;
        for trial_number in 1..=n_trials {
            let trial = Self::generate_trial(&mut rng, trial_number);
            writeln!(file, "{}", serde_json::to_string(&trial)?)?;
        }

        log::info!("Generated example dataset with {} trials", n_trials);
        Ok(files)
    }

    fn generate_trial(rng: &mut StdRng, trial_number: usize) -> TrialRecord {
        let intervention_type = if rng.gen_bool(0.8) {
            InterventionType::Drug
        } else {
            let other = OTHER_TYPES[rng.gen_range(0..OTHER_TYPES.len())];
            InterventionType::Other(other.to_string())
        };

        let n_drugs = rng.gen_range(1..=3);
        let mut words: Vec<String> = VOCABULARY
            .choose_multiple(rng, n_drugs)
            .map(|(name, alt_labels)| {
                if rng.gen_bool(0.5) {
                    name.to_string()
                } else {
                    alt_labels.split('|').next().unwrap_or(*name).to_string()
                }
            })
            .collect();
        for _ in 0..rng.gen_range(0..3) {
            words.push(FILLER[rng.gen_range(0..FILLER.len())].to_string());
        }
        words.shuffle(rng);

        TrialRecord {
            trial_id: format!("NCT{:08}", trial_number),
            intervention_type,
            intervention_name: words.join(" "),
        }
    }

    fn write_vocabulary(path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(["itemLabel", "altLabel_list"])?;
        for (name, alt_labels) in VOCABULARY {
            writer.write_record([*name, *alt_labels])?;
        }
        writer.flush()?;
        Ok(())
    }

    fn write_stems(path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(["stem", "definition", "name"])?;
        for (stem, definition, name) in STEMS {
            writer.write_record([*stem, *definition, *name])?;
        }
        writer.flush()?;
        Ok(())
    }
}
