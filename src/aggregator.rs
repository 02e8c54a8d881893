use crate::{models::*, Result};
use itertools::Itertools;
use std::collections::{BTreeMap, BTreeSet, HashMap};

pub struct PairAggregator;

impl PairAggregator {
    /// Count, for every unordered pair of class descriptions, the number of
    /// distinct trials in which both occur. Subclass records are ignored.
    ///
    /// Rows are sorted by count, descending; equal counts keep the order in
    /// which the pair was first seen while walking trials by ascending id.
    pub fn aggregate_pairs(records: &[TrialsByUsan]) -> Result<Vec<ClassPairCount>> {
        validate_all(records, "trials by usan")?;

        let by_trial = Self::class_descriptions_by_trial(records);
        log::info!("Aggregating class pairs across {} trials", by_trial.len());

        let mut positions: HashMap<(&str, &str), usize> = HashMap::new();
        let mut pair_counts: Vec<ClassPairCount> = Vec::new();

        for descriptions in by_trial.values() {
            for (first, second) in descriptions.iter().tuple_combinations() {
                match positions.get(&(*first, *second)) {
                    Some(&idx) => pair_counts[idx].trial_count += 1,
                    None => {
                        positions.insert((*first, *second), pair_counts.len());
                        pair_counts.push(ClassPairCount {
                            description_1: first.to_string(),
                            description_2: second.to_string(),
                            trial_count: 1,
                        });
                    }
                }
            }
        }

        pair_counts.sort_by(|a, b| b.trial_count.cmp(&a.trial_count));

        log::info!("Found {} distinct class pairs", pair_counts.len());
        Ok(pair_counts)
    }

    /// One sorted, de-duplicated description set per trial id.
    fn class_descriptions_by_trial(records: &[TrialsByUsan]) -> BTreeMap<&str, BTreeSet<&str>> {
        let mut by_trial: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();

        for record in records.iter().filter(|r| r.code_type == CodeType::Class) {
            for trial in &record.trials {
                by_trial
                    .entry(trial.as_str())
                    .or_default()
                    .insert(record.description.as_str());
            }
        }

        by_trial
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(description: &str, code_type: CodeType, trials: &[&str]) -> TrialsByUsan {
        TrialsByUsan {
            description: description.to_string(),
            code_type,
            trials: trials.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn test_two_trials_one_pair() {
        let records = vec![
            record("antiplatelet", CodeType::Class, &["NCT001", "NCT002"]),
            record("anticoagulant", CodeType::Class, &["NCT001", "NCT002"]),
        ];

        let pairs = PairAggregator::aggregate_pairs(&records).unwrap();
        assert_eq!(
            pairs,
            vec![ClassPairCount {
                description_1: "anticoagulant".to_string(),
                description_2: "antiplatelet".to_string(),
                trial_count: 2,
            }]
        );
    }

    #[test]
    fn test_duplicate_descriptions_count_once_per_trial() {
        let records = vec![
            record("anticoagulant", CodeType::Class, &["NCT001"]),
            record("anticoagulant", CodeType::Class, &["NCT001", "NCT002"]),
            record("antiplatelet", CodeType::Class, &["NCT001"]),
            record("antiplatelet", CodeType::Class, &["NCT001"]),
        ];

        let pairs = PairAggregator::aggregate_pairs(&records).unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].trial_count, 1);
    }

    #[test]
    fn test_subclasses_are_not_paired() {
        let records = vec![
            record("anticoagulant", CodeType::Class, &["NCT001"]),
            record("heparin derivative", CodeType::Subclass, &["NCT001"]),
        ];

        assert!(PairAggregator::aggregate_pairs(&records).unwrap().is_empty());
    }

    #[test]
    fn test_sorted_by_count_with_stable_ties() {
        let records = vec![
            record("c", CodeType::Class, &["NCT001", "NCT002", "NCT003"]),
            record("a", CodeType::Class, &["NCT001", "NCT003"]),
            record("b", CodeType::Class, &["NCT001", "NCT002"]),
        ];

        let pairs = PairAggregator::aggregate_pairs(&records).unwrap();
        let summary: Vec<(&str, &str, usize)> = pairs
            .iter()
            .map(|p| (p.description_1.as_str(), p.description_2.as_str(), p.trial_count))
            .collect();

        // NCT001 yields (a,b) (a,c) (b,c); NCT002 adds (b,c); NCT003 adds (a,c).
        assert_eq!(summary, vec![("a", "c", 2), ("b", "c", 2), ("a", "b", 1)]);
    }

    #[test]
    fn test_repeated_runs_are_identical() {
        let records = vec![
            record("x", CodeType::Class, &["NCT002", "NCT001"]),
            record("y", CodeType::Class, &["NCT001"]),
            record("z", CodeType::Class, &["NCT002", "NCT001"]),
        ];

        let first = PairAggregator::aggregate_pairs(&records).unwrap();
        let second = PairAggregator::aggregate_pairs(&records).unwrap();
        assert_eq!(first, second);
    }
}
