use crate::{errors::UsanError, models::*, Result};
use std::collections::HashSet;

/// Outcome of resolving one matched stem to a description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StemResolution {
    Class(String),
    Subclass(String),
    Unresolved,
}

impl StemResolution {
    pub fn into_code(self) -> Option<UsanCode> {
        match self {
            StemResolution::Class(description) => Some(UsanCode {
                description,
                code_type: CodeType::Class,
            }),
            StemResolution::Subclass(description) => Some(UsanCode {
                description,
                code_type: CodeType::Subclass,
            }),
            StemResolution::Unresolved => None,
        }
    }
}

type StemResolver = fn(&[StemRule], &str) -> Option<StemResolution>;

/// Tried in order; the first resolver that finds a row wins.
const RESOLVERS: [StemResolver; 3] = [
    StemClassifier::class_by_name_suffix,
    StemClassifier::class_by_name_prefix,
    StemClassifier::subclass_by_stem_suffix,
];

pub struct StemClassifier;

impl StemClassifier {
    pub fn classify_drugs(
        matched: &[MatchedDrugs],
        stem_rules: &[StemRule],
        config: &ClassifierConfig,
    ) -> Result<Vec<DrugClassification>> {
        validate_all(matched, "matched drug names")?;

        let drugs = Self::distinct_drugs(matched);
        let stems = Self::match_stems(stem_rules);
        log::info!("Classifying {} distinct drugs against {} stems", drugs.len(), stems.len());

        let mut classifications = Vec::new();
        for drug in drugs {
            let matched_stems: Vec<&str> = stems
                .iter()
                .copied()
                .filter(|stem| drug.contains(*stem))
                .collect();
            if matched_stems.is_empty() {
                continue;
            }

            let mut usan_codes = Vec::with_capacity(matched_stems.len());
            for stem in matched_stems {
                match Self::resolve_stem(stem_rules, stem).into_code() {
                    Some(code) => usan_codes.push(code),
                    None => match config.unresolved_policy {
                        UnresolvedStemPolicy::Fail => {
                            return Err(UsanError::ExhaustedFallback {
                                drug: drug.to_string(),
                                stem: stem.to_string(),
                            });
                        }
                        UnresolvedStemPolicy::Drop => {
                            log::warn!("Dropping unresolved stem '{}' for drug '{}'", stem, drug);
                        }
                    },
                }
            }

            if !usan_codes.is_empty() {
                classifications.push(DrugClassification {
                    drug: drug.to_string(),
                    usan_codes,
                });
            }
        }

        log::info!("Classified {} drugs", classifications.len());
        Ok(classifications)
    }

    pub fn resolve_stem(stem_rules: &[StemRule], stem: &str) -> StemResolution {
        RESOLVERS
            .iter()
            .find_map(|resolver| resolver(stem_rules, stem))
            .unwrap_or(StemResolution::Unresolved)
    }

    fn class_by_name_suffix(stem_rules: &[StemRule], stem: &str) -> Option<StemResolution> {
        stem_rules
            .iter()
            .find(|rule| rule.class_name.ends_with(stem))
            .map(|rule| StemResolution::Class(rule.definition.clone()))
    }

    fn class_by_name_prefix(stem_rules: &[StemRule], stem: &str) -> Option<StemResolution> {
        stem_rules
            .iter()
            .find(|rule| rule.class_name.starts_with(stem))
            .map(|rule| StemResolution::Class(rule.definition.clone()))
    }

    fn subclass_by_stem_suffix(stem_rules: &[StemRule], stem: &str) -> Option<StemResolution> {
        stem_rules
            .iter()
            .find(|rule| rule.stem.ends_with(stem))
            .map(|rule| StemResolution::Subclass(rule.definition.clone()))
    }

    /// Distinct drug names in order of first appearance.
    fn distinct_drugs(matched: &[MatchedDrugs]) -> Vec<&str> {
        let mut seen = HashSet::new();
        matched
            .iter()
            .flat_map(|trial| trial.drugs.iter())
            .map(String::as_str)
            .filter(|drug| seen.insert(*drug))
            .collect()
    }

    /// Hyphen-stripped, non-empty stems in table order, first occurrence kept.
    fn match_stems(stem_rules: &[StemRule]) -> Vec<&str> {
        let mut seen = HashSet::new();
        stem_rules
            .iter()
            .map(StemRule::stripped_stem)
            .filter(|stem| !stem.is_empty() && seen.insert(*stem))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(stem: &str, class_name: &str, definition: &str) -> StemRule {
        StemRule {
            stem: stem.to_string(),
            class_name: class_name.to_string(),
            definition: definition.to_string(),
        }
    }

    fn matched(id: &str, drugs: &[&str]) -> MatchedDrugs {
        MatchedDrugs {
            nct_id: id.to_string(),
            drugs: drugs.iter().map(|d| d.to_string()).collect(),
        }
    }

    #[test]
    fn test_class_preferred_over_subclass() {
        let rules = vec![
            rule("-parin", "", "heparin derivatives"),
            rule("-arin", "-parin", "anticoagulants"),
        ];
        assert_eq!(
            StemClassifier::resolve_stem(&rules, "parin"),
            StemResolution::Class("anticoagulants".to_string())
        );
    }

    #[test]
    fn test_prefix_lookup_before_subclass() {
        let rules = vec![
            rule("-vir-", "", "antiviral"),
            rule("vir-", "vir-", "antiviral class"),
        ];
        assert_eq!(
            StemClassifier::resolve_stem(&rules, "vir"),
            StemResolution::Class("antiviral class".to_string())
        );
    }

    #[test]
    fn test_subclass_fallback() {
        let rules = vec![rule("-olol", "", "beta-blockers")];
        assert_eq!(
            StemClassifier::resolve_stem(&rules, "olol"),
            StemResolution::Subclass("beta-blockers".to_string())
        );
    }

    #[test]
    fn test_infix_stem_can_exhaust_fallback() {
        let rules = vec![rule("-ast-", "", "anti-asthmatics")];
        assert_eq!(StemClassifier::resolve_stem(&rules, "ast"), StemResolution::Unresolved);
    }

    #[test]
    fn test_classify_multiple_stems_and_dedup_drugs() {
        let trials = vec![
            matched("NCT001", &["propranolol", "heparin"]),
            matched("NCT002", &["propranolol"]),
        ];
        let rules = vec![
            rule("-olol", "", "beta-blockers"),
            rule("pr-", "pr-", "prefix group"),
            rule("-olol", "", "duplicate row"),
        ];

        let result =
            StemClassifier::classify_drugs(&trials, &rules, &ClassifierConfig::default()).unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].drug, "propranolol");
        assert_eq!(
            result[0].usan_codes,
            vec![
                UsanCode {
                    description: "beta-blockers".to_string(),
                    code_type: CodeType::Subclass,
                },
                UsanCode {
                    description: "prefix group".to_string(),
                    code_type: CodeType::Class,
                },
            ]
        );
    }

    #[test]
    fn test_unresolved_policy() {
        let trials = vec![matched("NCT001", &["fastinib"])];
        let rules = vec![rule("-ast-", "", "anti-asthmatics")];

        let dropped =
            StemClassifier::classify_drugs(&trials, &rules, &ClassifierConfig::default()).unwrap();
        assert!(dropped.is_empty());

        let strict = ClassifierConfig {
            unresolved_policy: UnresolvedStemPolicy::Fail,
        };
        let result = StemClassifier::classify_drugs(&trials, &rules, &strict);
        assert!(matches!(result, Err(UsanError::ExhaustedFallback { .. })));
    }
}
