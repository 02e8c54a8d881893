use crate::{models::*, Result};
use rayon::prelude::*;

pub struct NameMatcher;

impl NameMatcher {
    /// Resolve every drug trial's intervention name to canonical vocabulary names.
    /// Trials that are not drug trials, or where no token matched, are left out.
    pub fn match_drug_names(
        trials: &[TrialRecord],
        vocabulary: &[VocabularyEntry],
        config: &MatcherConfig,
    ) -> Result<Vec<MatchedDrugs>> {
        validate_all(trials, "trials")?;
        validate_all(vocabulary, "vocabulary")?;

        log::info!(
            "Matching {} trials against {} vocabulary entries ({:?})",
            trials.len(),
            vocabulary.len(),
            config.match_policy
        );

        let label_texts: Vec<String> = vocabulary.iter().map(|entry| entry.label_text()).collect();

        let matched: Vec<MatchedDrugs> = trials
            .par_iter()
            .filter(|trial| trial.intervention_type == InterventionType::Drug)
            .filter_map(|trial| {
                let drugs = Self::match_intervention(
                    &trial.intervention_name,
                    vocabulary,
                    &label_texts,
                    config,
                );
                if drugs.is_empty() {
                    None
                } else {
                    Some(MatchedDrugs {
                        nct_id: trial.trial_id.clone(),
                        drugs,
                    })
                }
            })
            .collect();

        log::info!("Matched drugs for {} trials", matched.len());
        Ok(matched)
    }

    /// Canonical names for each non-stop-word token, in token order, duplicates kept.
    pub fn match_intervention(
        intervention_name: &str,
        vocabulary: &[VocabularyEntry],
        label_texts: &[String],
        config: &MatcherConfig,
    ) -> Vec<String> {
        let lowered = intervention_name.to_lowercase();

        lowered
            .split_whitespace()
            .filter(|token| !config.stopwords.contains(*token))
            .filter_map(|token| {
                let found = Self::lookup_token(token, vocabulary, label_texts, config.match_policy);
                if found.is_none() {
                    log::debug!("No vocabulary match for token '{}'", token);
                }
                found.map(str::to_string)
            })
            .collect()
    }

    pub fn lookup_token<'a>(
        token: &str,
        vocabulary: &'a [VocabularyEntry],
        label_texts: &[String],
        policy: MatchPolicy,
    ) -> Option<&'a str> {
        if token.is_empty() {
            return None;
        }

        let mut candidates = vocabulary
            .iter()
            .zip(label_texts)
            .filter(|(entry, text)| match policy {
                MatchPolicy::SubstringLast | MatchPolicy::SubstringFirst => text.contains(token),
                MatchPolicy::Exact => entry.alt_labels.iter().any(|label| label == token),
            });

        let chosen = match policy {
            MatchPolicy::SubstringFirst => candidates.next(),
            MatchPolicy::SubstringLast | MatchPolicy::Exact => candidates.last(),
        };

        chosen.map(|(entry, _)| entry.canonical_name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn trial(id: &str, kind: &str, name: &str) -> TrialRecord {
        TrialRecord {
            trial_id: id.to_string(),
            intervention_type: InterventionType::from(kind.to_string()),
            intervention_name: name.to_string(),
        }
    }

    fn config(stopwords: &[&str], match_policy: MatchPolicy) -> MatcherConfig {
        MatcherConfig {
            stopwords: stopwords.iter().map(|w| w.to_string()).collect::<HashSet<_>>(),
            match_policy,
        }
    }

    #[test]
    fn test_single_drug_match() {
        let trials = vec![trial("NCT001", "Drug", "aspirin 100mg tablet")];
        let vocabulary = vec![VocabularyEntry::new("Aspirin", "aspirin|acetylsalicylic acid")];

        let matched = NameMatcher::match_drug_names(
            &trials,
            &vocabulary,
            &config(&["100mg", "tablet"], MatchPolicy::SubstringLast),
        )
        .unwrap();

        assert_eq!(
            matched,
            vec![MatchedDrugs {
                nct_id: "NCT001".to_string(),
                drugs: vec!["Aspirin".to_string()],
            }]
        );
    }

    #[test]
    fn test_last_vocabulary_entry_wins() {
        let vocabulary = vec![
            VocabularyEntry::new("Aspirin", "aspirin"),
            VocabularyEntry::new("Aspirin/Dipyridamole", "aspirin and dipyridamole"),
        ];
        let trials = vec![trial("NCT001", "Drug", "aspirin")];

        let last_config = config(&[], MatchPolicy::SubstringLast);
        let last = NameMatcher::match_drug_names(&trials, &vocabulary, &last_config).unwrap();
        assert_eq!(last[0].drugs, vec!["Aspirin/Dipyridamole"]);

        let first_config = config(&[], MatchPolicy::SubstringFirst);
        let first = NameMatcher::match_drug_names(&trials, &vocabulary, &first_config).unwrap();
        assert_eq!(first[0].drugs, vec!["Aspirin"]);
    }

    #[test]
    fn test_exact_policy_requires_whole_label() {
        let vocabulary = vec![VocabularyEntry::new("Heparin", "unfractionated heparin")];
        let label_texts: Vec<String> = vocabulary.iter().map(|e| e.label_text()).collect();

        assert_eq!(
            NameMatcher::lookup_token("hep", &vocabulary, &label_texts, MatchPolicy::Exact),
            None
        );
        assert_eq!(
            NameMatcher::lookup_token("heparin", &vocabulary, &label_texts, MatchPolicy::Exact),
            Some("Heparin")
        );
        assert_eq!(
            NameMatcher::lookup_token("hep", &vocabulary, &label_texts, MatchPolicy::SubstringLast),
            Some("Heparin")
        );
    }

    #[test]
    fn test_non_drug_and_unmatched_trials_are_omitted() {
        let vocabulary = vec![VocabularyEntry::new("Aspirin", "aspirin")];
        let trials = vec![
            trial("NCT001", "Device", "aspirin coated stent"),
            trial("NCT002", "Drug", "placebo"),
            trial("NCT003", "Drug", "aspirin"),
        ];

        let matched =
            NameMatcher::match_drug_names(&trials, &vocabulary, &MatcherConfig::default()).unwrap();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].nct_id, "NCT003");
    }

    #[test]
    fn test_repeated_matches_are_kept() {
        let vocabulary = vec![VocabularyEntry::new("Warfarin", "coumadin|warfarin sodium")];
        let trials = vec![trial("NCT001", "Drug", "warfarin  coumadin")];

        let substring_config = config(&[], MatchPolicy::SubstringLast);
        let matched =
            NameMatcher::match_drug_names(&trials, &vocabulary, &substring_config).unwrap();
        assert_eq!(matched[0].drugs, vec!["Warfarin", "Warfarin"]);
    }
}
