use crate::{models::*, Result};

pub struct TrialAssociator;

impl TrialAssociator {
    /// Attach to every class/subclass record the trials that mention its drug.
    ///
    /// With `AssociationMode::RenderedSubstring` a drug is searched inside the
    /// JSON text of each trial's drug list, so a name that is a substring of
    /// another drug's name also picks up that drug's trials.
    pub fn associate_trials(
        matched: &[MatchedDrugs],
        classifications: &[DrugClassification],
        mode: AssociationMode,
    ) -> Result<Vec<TrialsByUsan>> {
        validate_all(matched, "matched drug names")?;
        validate_all(classifications, "drug classifications")?;

        let rendered: Vec<(&MatchedDrugs, String)> = matched
            .iter()
            .map(|trial| -> Result<(&MatchedDrugs, String)> {
                Ok((trial, serde_json::to_string(&trial.drugs)?))
            })
            .collect::<Result<_>>()?;

        let mut records = Vec::new();
        for classification in classifications {
            let needle = Self::render_name(&classification.drug)?;
            let trials = Self::trials_for_drug(&classification.drug, &needle, &rendered, mode);
            if trials.is_empty() {
                log::debug!("No trials reference drug '{}'", classification.drug);
            }

            records.extend(classification.usan_codes.iter().map(|code| TrialsByUsan {
                description: code.description.clone(),
                code_type: code.code_type,
                trials: trials.clone(),
            }));
        }

        log::info!(
            "Associated trials with {} USAN records from {} drugs",
            records.len(),
            classifications.len()
        );
        Ok(records)
    }

    /// The drug name escaped the way it appears inside a rendered drug list.
    fn render_name(drug: &str) -> Result<String> {
        let quoted = serde_json::to_string(drug)?;
        Ok(quoted[1..quoted.len() - 1].to_string())
    }

    fn trials_for_drug(
        drug: &str,
        rendered_drug: &str,
        rendered: &[(&MatchedDrugs, String)],
        mode: AssociationMode,
    ) -> Vec<String> {
        rendered
            .iter()
            .filter(|(trial, text)| match mode {
                AssociationMode::RenderedSubstring => text.contains(rendered_drug),
                AssociationMode::ExactMembership => trial.drugs.iter().any(|d| d == drug),
            })
            .map(|(trial, _)| trial.nct_id.clone())
            .collect()
    }
}
