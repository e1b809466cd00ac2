//! Ordinal scales for academic and English levels.
//!
//! Each scale maps a lower-cased label to a rank. Source data is Portuguese;
//! English names are accepted as aliases of the same rank.

use serde::{Deserialize, Serialize};

/// Categorical comparison result. Serialized with the labels the categorical
/// classifier was trained on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchOutcome {
    #[serde(rename = "compatível")]
    Compatible,
    #[serde(rename = "insuficiente")]
    Insufficient,
    #[serde(rename = "indefinido")]
    Undetermined,
}

impl MatchOutcome {
    pub fn label(self) -> &'static str {
        match self {
            MatchOutcome::Compatible => "compatível",
            MatchOutcome::Insufficient => "insuficiente",
            MatchOutcome::Undetermined => "indefinido",
        }
    }
}

/// Score when the attained level meets the requirement.
pub const SCORE_MEETS: f64 = 1.0;
/// Score when the attained level is exactly one rank short.
pub const SCORE_ONE_BELOW: f64 = 0.8;
/// Score for anything further below.
pub const SCORE_BELOW: f64 = 0.5;

#[derive(Debug)]
pub struct Scale {
    pub name: &'static str,
    entries: &'static [(&'static str, u8)],
    max_rank: u8,
}

pub static ACADEMIC: Scale = Scale {
    name: "academic",
    entries: &[
        ("sem escolaridade", 0),
        ("no schooling", 0),
        ("ensino fundamental", 1),
        ("primary", 1),
        ("ensino médio", 2),
        ("secondary", 2),
        ("técnico", 3),
        ("tecnólogo", 3),
        ("technical", 3),
        ("superior", 4),
        ("ensino superior", 4),
        ("higher education", 4),
        ("pós-graduação", 5),
        ("postgraduate", 5),
        ("mestrado", 6),
        ("master's", 6),
        ("doutorado", 7),
        ("doctorate", 7),
    ],
    max_rank: 7,
};

pub static ENGLISH: Scale = Scale {
    name: "english",
    entries: &[
        ("nenhum", 0),
        ("none", 0),
        ("básico", 1),
        ("basic", 1),
        ("intermediário", 2),
        ("intermediate", 2),
        ("avançado", 3),
        ("advanced", 3),
        ("fluente", 4),
        ("fluent", 4),
        ("nativo", 5),
        ("native", 5),
    ],
    max_rank: 5,
};

impl Scale {
    /// Looks up a label, ignoring case and surrounding whitespace.
    pub fn rank(&self, label: &str) -> Option<u8> {
        let key = label.trim().to_lowercase();
        self.entries
            .iter()
            .find(|(name, _)| *name == key)
            .map(|&(_, rank)| rank)
    }

    /// Rank substituted for unrecognized labels in continuous mode.
    pub fn mid_rank(&self) -> u8 {
        self.max_rank / 2
    }

    /// Categorical mode: unknown labels on either side are undetermined.
    pub fn compare(&self, required: &str, attained: &str) -> MatchOutcome {
        match (self.rank(required), self.rank(attained)) {
            (Some(req), Some(att)) if att >= req => MatchOutcome::Compatible,
            (Some(_), Some(_)) => MatchOutcome::Insufficient,
            _ => MatchOutcome::Undetermined,
        }
    }

    /// Continuous mode: unknown labels fall back to the mid-scale rank.
    pub fn score(&self, required: &str, attained: &str) -> f64 {
        let req = self.rank(required).unwrap_or_else(|| self.mid_rank());
        let att = self.rank(attained).unwrap_or_else(|| self.mid_rank());

        if att >= req {
            SCORE_MEETS
        } else if att + 1 == req {
            SCORE_ONE_BELOW
        } else {
            SCORE_BELOW
        }
    }

    /// Labels in rank order, one per rank (first alias wins).
    pub fn levels(&self) -> Vec<&'static str> {
        (0..=self.max_rank)
            .filter_map(|rank| {
                self.entries
                    .iter()
                    .find(|(_, r)| *r == rank)
                    .map(|(name, _)| *name)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_technical_labels_share_one_rank() {
        assert_eq!(ACADEMIC.rank("Técnico"), ACADEMIC.rank("tecnólogo"));
        assert_eq!(
            ACADEMIC.compare("tecnólogo", "técnico"),
            MatchOutcome::Compatible
        );
        assert_eq!(
            ACADEMIC.compare("superior", "tecnólogo"),
            MatchOutcome::Insufficient
        );
        assert_eq!(ACADEMIC.score("tecnólogo", "técnico"), SCORE_MEETS);
    }

    #[test]
    fn test_higher_education_vs_postgraduate() {
        assert_eq!(
            ACADEMIC.compare("higher education", "postgraduate"),
            MatchOutcome::Compatible
        );
        assert_eq!(ACADEMIC.score("higher education", "postgraduate"), 1.0);
        assert_eq!(
            ACADEMIC.compare("Superior", "Pós-Graduação"),
            MatchOutcome::Compatible
        );
    }

    #[test]
    fn test_lookup_ignores_case_and_whitespace() {
        assert_eq!(ENGLISH.rank("  Avançado "), Some(3));
        assert_eq!(ENGLISH.rank("FLUENT"), Some(4));
        assert_eq!(ACADEMIC.rank("Mestrado"), Some(6));
    }

    #[test]
    fn test_insufficient_when_below() {
        assert_eq!(
            ENGLISH.compare("fluente", "básico"),
            MatchOutcome::Insufficient
        );
    }

    #[test]
    fn test_unknown_label_is_undetermined() {
        assert_eq!(
            ACADEMIC.compare("Ensino Superior Completo", "mestrado"),
            MatchOutcome::Undetermined
        );
        assert_eq!(ENGLISH.compare("", "fluente"), MatchOutcome::Undetermined);
        assert_eq!(ENGLISH.compare("básico", ""), MatchOutcome::Undetermined);
    }

    #[test]
    fn test_none_rank_is_known_not_undetermined() {
        // rank 0 is a real level, distinct from "unknown"
        assert_eq!(ENGLISH.compare("nenhum", "nenhum"), MatchOutcome::Compatible);
        assert_eq!(ENGLISH.compare("básico", "nenhum"), MatchOutcome::Insufficient);
    }

    #[test]
    fn test_continuous_steps() {
        assert_eq!(ENGLISH.score("avançado", "avançado"), SCORE_MEETS);
        assert_eq!(ENGLISH.score("avançado", "intermediário"), SCORE_ONE_BELOW);
        assert_eq!(ENGLISH.score("avançado", "básico"), SCORE_BELOW);
        assert_eq!(ACADEMIC.score("doutorado", "ensino médio"), SCORE_BELOW);
    }

    #[test]
    fn test_continuous_unknown_defaults_to_mid_rank() {
        // academic mid rank is 3 (technical)
        assert_eq!(ACADEMIC.score("??", "técnico"), SCORE_MEETS);
        assert_eq!(ACADEMIC.score("superior", "??"), SCORE_ONE_BELOW);
        assert_eq!(ACADEMIC.score("mestrado", "??"), SCORE_BELOW);
        // english mid rank is 2 (intermediate)
        assert_eq!(ENGLISH.score("", ""), SCORE_MEETS);
        assert_eq!(ENGLISH.score("avançado", "n/a"), SCORE_ONE_BELOW);
    }

    #[test]
    fn test_comparators_are_monotonic_in_attained_level() {
        for scale in [&ACADEMIC, &ENGLISH] {
            let levels = scale.levels();
            for required in &levels {
                let mut last_score = 0.0;
                let mut seen_compatible = false;
                for attained in &levels {
                    let score = scale.score(required, attained);
                    assert!(
                        score >= last_score,
                        "{} score dropped at {required}/{attained}",
                        scale.name
                    );
                    last_score = score;

                    let outcome = scale.compare(required, attained);
                    if seen_compatible {
                        assert_eq!(outcome, MatchOutcome::Compatible);
                    }
                    seen_compatible |= outcome == MatchOutcome::Compatible;
                }
                assert!(seen_compatible);
            }
        }
    }

    #[test]
    fn test_levels_cover_every_rank() {
        assert_eq!(ACADEMIC.levels().len(), 8);
        assert_eq!(ENGLISH.levels().len(), 6);
    }

    #[test]
    fn test_outcome_labels_match_serde() {
        for outcome in [
            MatchOutcome::Compatible,
            MatchOutcome::Insufficient,
            MatchOutcome::Undetermined,
        ] {
            let json = serde_json::to_value(outcome).unwrap();
            assert_eq!(json, serde_json::Value::from(outcome.label()));
        }
    }
}
