use anyhow::Context;
use clap::{Arg, ArgMatches, Command};
use usan_analysis::{
    example_data::ExampleDataGenerator,
    models::*,
    stopwords,
    Pipeline, PipelineInputs,
};
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let matches = Command::new("USAN Trial Analysis")
        .version("0.1")
        .about("Classifies clinical-trial drugs by USAN stem and counts co-occurring classes")
        .arg(
            Arg::new("trials")
                .short('t')
                .long("trials")
                .value_name("FILE")
                .help("Clinical trials in JSON Lines format"),
        )
        .arg(
            Arg::new("vocabulary")
                .short('d')
                .long("vocabulary")
                .value_name("FILE")
                .help("Drug vocabulary CSV (canonical name, pipe-delimited alt labels)"),
        )
        .arg(
            Arg::new("stems")
                .short('s')
                .long("stems")
                .value_name("FILE")
                .help("USAN stem table CSV"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("DIR")
                .help("Output directory for stage artifacts")
                .default_value("./output"),
        )
        .arg(
            Arg::new("stopwords")
                .long("stopwords")
                .value_name("FILE")
                .help("Replace the built-in stop-word list (one word per line)"),
        )
        .arg(
            Arg::new("match-policy")
                .long("match-policy")
                .value_name("POLICY")
                .help("Vocabulary match policy")
                .value_parser(["substring-last", "substring-first", "exact"])
                .default_value("substring-last"),
        )
        .arg(
            Arg::new("unresolved-stems")
                .long("unresolved-stems")
                .value_name("POLICY")
                .help("What to do when a stem has no description")
                .value_parser(["drop", "fail"])
                .default_value("drop"),
        )
        .arg(
            Arg::new("association")
                .long("association")
                .value_name("MODE")
                .help("How drugs are looked up in a trial's drug list")
                .value_parser(["substring", "exact"])
                .default_value("substring"),
        )
        .arg(
            Arg::new("from-stage")
                .long("from-stage")
                .value_name("STAGE")
                .help("Restart from stage 1-4 using artifacts already in the output directory")
                .value_parser(clap::value_parser!(u8).range(1..=4))
                .default_value("1"),
        )
        .arg(
            Arg::new("generate-example")
                .long("generate-example")
                .help("Generate an example dataset in the output directory and analyse it")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("trials-count")
                .short('n')
                .long("trials-count")
                .value_name("NUMBER")
                .help("Number of trials for the example dataset")
                .value_parser(clap::value_parser!(usize))
                .default_value("50"),
        )
        .get_matches();

    let config = create_pipeline_config(&matches)?;

    let inputs = if matches.get_flag("generate-example") {
        let n_trials = *matches.get_one::<usize>("trials-count").unwrap_or(&50);
        let files = ExampleDataGenerator::generate_dataset(config.output_dir.join("data"), n_trials)
            .context("failed to generate example dataset")?;
        println!("Generated example dataset: {}", files.trials.display());
        PipelineInputs {
            trials: Some(files.trials),
            vocabulary: Some(files.vocabulary),
            stems: Some(files.stems),
        }
    } else {
        PipelineInputs {
            trials: matches.get_one::<String>("trials").map(PathBuf::from),
            vocabulary: matches.get_one::<String>("vocabulary").map(PathBuf::from),
            stems: matches.get_one::<String>("stems").map(PathBuf::from),
        }
    };

    println!("Output directory: {}", config.output_dir.display());
    let start_time = std::time::Instant::now();

    let summary = Pipeline::run(&inputs, &config).context("pipeline failed")?;

    println!("Pipeline completed in {:.2} seconds", start_time.elapsed().as_secs_f64());
    print_summary(&summary);
    Ok(())
}

fn create_pipeline_config(matches: &ArgMatches) -> anyhow::Result<PipelineConfig> {
    let stopwords = match matches.get_one::<String>("stopwords") {
        Some(path) => stopwords::load_stopwords(path)
            .with_context(|| format!("failed to read stop-words from {}", path))?,
        None => stopwords::default_stopwords(),
    };

    let match_policy = match matches.get_one::<String>("match-policy").map(String::as_str) {
        Some("substring-first") => MatchPolicy::SubstringFirst,
        Some("exact") => MatchPolicy::Exact,
        _ => MatchPolicy::SubstringLast,
    };

    let unresolved_policy = match matches
        .get_one::<String>("unresolved-stems")
        .map(String::as_str)
    {
        Some("fail") => UnresolvedStemPolicy::Fail,
        _ => UnresolvedStemPolicy::Drop,
    };

    let association_mode = match matches.get_one::<String>("association").map(String::as_str) {
        Some("exact") => AssociationMode::ExactMembership,
        _ => AssociationMode::RenderedSubstring,
    };

    let start_stage = matches
        .get_one::<u8>("from-stage")
        .copied()
        .and_then(Stage::from_number)
        .unwrap_or(Stage::MatchDrugNames);

    let output_dir = matches
        .get_one::<String>("output")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("./output"));

    Ok(PipelineConfig {
        matcher: MatcherConfig {
            stopwords,
            match_policy,
        },
        classifier: ClassifierConfig { unresolved_policy },
        association_mode,
        output_dir,
        start_stage,
    })
}

fn print_summary(summary: &PipelineSummary) {
    println!("\n=== PIPELINE SUMMARY ===");
    if let Some(n) = summary.matched_trials {
        println!("Trials with matched drugs: {}", n);
    }
    if let Some(n) = summary.classified_drugs {
        println!("Drugs with USAN stems: {}", n);
    }
    if let Some(n) = summary.usan_records {
        println!("USAN records: {}", n);
    }
    println!("Distinct class pairs: {}", summary.class_pairs.len());

    for pair in summary.class_pairs.iter().take(5) {
        println!("  {} + {}: {}", pair.description_1, pair.description_2, pair.trial_count);
    }
}
