use crate::Result;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Trial-protocol boilerplate that never names a drug on its own.
const DEFAULT_STOPWORDS: &[&str] = &[
    "(seizure", "prevention)", "stimulating", "hormone", "(control)", "-", "target",
    "controlled", "infusion", "system", "(limited)", "placebo", "sugar", "pill", "4%",
    "gel", "application", "with", "sham", "microneedle", "device", "microneedle-facilitated",
    "vein", "soak", "treated", "lactated", "ringers", "solution",
    "hormone-related", "protein", "and", "2nd", "phase", "toxin", "type-a", "leaves", "5%",
    "hydrochloride", "continuation", "omission", "1000mg", "2000mg", "250", "mg", "500mg",
    "50", "iv", "oral", "antiplatelet", "regimen", "modification", "or", "methyl", "recombinant",
    "human", "erythropoietin", "cd", "2", "administration", "withdrawal", "of", "high-dose",
    "regimens", "use", "0.03%", "topical", "observational", "antifungal", "therapy", "tissue",
    "plasminogen", "activator", "normal", "saline", "adoptive", "immunotherapy", "single",
    "bolus", "a", "treatment", "m,", "reduced", "nicotine", "content", "cigarettes", "usual",
    "patch", "plus", "gum/lozenge", "acid", "100", "200", "cream", "0.3", "%", "without", "active",
    "substance", "15%", "inactivated", "trivalent", "influenza", "vaccine", "orally", "everyday",
    "hpv", "therapy.", "(identical", "volume", "saline)", "0.9%", "sodium",
    "chloride", "injectable", "1", "gram", "grams", "target-controlled", "anticoagulant", "by",
    "physician", "criteria", "spray", "nasal", "95%", "pure", "capsules", "200mg", "tablet",
    "group", "adjuvant", "perioperative", "(1-36)", "fumarate", "disoproxil", "citrate", "s-1",
];

pub fn default_stopwords() -> HashSet<String> {
    DEFAULT_STOPWORDS.iter().map(|word| word.to_string()).collect()
}

/// Reads one stop-word per line; blank lines and `#` comments are ignored.
pub fn load_stopwords<P: AsRef<Path>>(path: P) -> Result<HashSet<String>> {
    let contents = fs::read_to_string(path)?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_lowercase)
        .collect())
}
