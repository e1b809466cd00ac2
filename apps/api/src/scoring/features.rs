//! Feature Derivation Engine: turns a (job, candidate) pair into the
//! single-row record a classifier consumes.
//!
//! Two feature shapes exist, one per trained classifier. Each is a fixed,
//! ordered column schema; the classifier is schema-sensitive so the column
//! sets below must not drift.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::{Candidate, JobPosting};
use crate::scoring::hierarchy::{ACADEMIC, ENGLISH};

/// Replacement for empty or "nan" text values.
pub const UNSPECIFIED: &str = "não_informado";

/// Default for continuous scores when an input is absent.
pub const NEUTRAL_SCORE: f64 = 0.5;

/// Upper bound of the high-value technology bonus.
const TECH_BONUS_CAP: f64 = 0.3;
const TECH_BONUS_STEP: f64 = 0.1;

/// Tokens that earn a bonus when both sides mention them (ranking mode).
pub const HIGH_VALUE_TECH: &[&str] = &[
    "python", "java", "javascript", "typescript", "react", "angular", "vue", "node",
    "nodejs", "sql", "postgresql", "mysql", "oracle", "mongodb", "aws", "azure", "gcp",
    "docker", "kubernetes", "spring", "django", "flask", ".net", "c#", "golang", "scala",
    "spark", "kafka", "linux", "sap",
];

/// Words that mark a field of practice as technology work.
pub const TECH_AREA_KEYWORDS: &[&str] = &[
    "ti", "it", "tecnologia", "technology", "desenvolvimento", "development", "sistemas",
    "software", "dados", "data", "infraestrutura", "infrastructure", "engenharia",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureMode {
    /// Hierarchies as compatible/insufficient/undetermined labels.
    #[default]
    Categorical,
    /// Hierarchies as continuous scores, plus contract-type flags.
    Ranking,
}

impl FeatureMode {
    pub fn schema(self) -> &'static [Column] {
        match self {
            FeatureMode::Categorical => CATEGORICAL_SCHEMA,
            FeatureMode::Ranking => RANKING_SCHEMA,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FeatureMode::Categorical => "categorical",
            FeatureMode::Ranking => "ranking",
        }
    }
}

impl fmt::Display for FeatureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeatureMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "categorical" => Ok(FeatureMode::Categorical),
            "ranking" => Ok(FeatureMode::Ranking),
            other => Err(format!("unknown feature mode '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    TechMatchScore,
    TechSuccessScore,
    AcademicMatch,
    AcademicScore,
    EnglishMatch,
    EnglishScore,
    IsClt,
    IsPj,
    IsTechArea,
    ProfessionalLevel,
    JobAreas,
    CandidateArea,
    CombinedText,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Score,
    Flag,
    Text,
}

pub const CATEGORICAL_SCHEMA: &[Column] = &[
    Column::TechMatchScore,
    Column::ProfessionalLevel,
    Column::JobAreas,
    Column::CandidateArea,
    Column::AcademicMatch,
    Column::EnglishMatch,
    Column::IsTechArea,
    Column::CombinedText,
];

pub const RANKING_SCHEMA: &[Column] = &[
    Column::TechSuccessScore,
    Column::AcademicScore,
    Column::EnglishScore,
    Column::IsClt,
    Column::IsPj,
    Column::IsTechArea,
    Column::ProfessionalLevel,
    Column::JobAreas,
    Column::CandidateArea,
    Column::CombinedText,
];

impl Column {
    /// Column name as the classifier knows it.
    pub fn name(self) -> &'static str {
        match self {
            Column::TechMatchScore => "tech_match_score",
            Column::TechSuccessScore => "tech_success_score",
            Column::AcademicMatch => "academic_match",
            Column::AcademicScore => "academic_score",
            Column::EnglishMatch => "english_match",
            Column::EnglishScore => "english_score",
            Column::IsClt => "is_clt",
            Column::IsPj => "is_pj",
            Column::IsTechArea => "is_tech_area",
            Column::ProfessionalLevel => "nivel_profissional",
            Column::JobAreas => "areas_atuacao",
            Column::CandidateArea => "area_de_atuacao",
            Column::CombinedText => "combined_text",
        }
    }

    pub fn kind(self) -> ColumnKind {
        match self {
            Column::TechMatchScore
            | Column::TechSuccessScore
            | Column::AcademicScore
            | Column::EnglishScore => ColumnKind::Score,
            Column::IsClt | Column::IsPj | Column::IsTechArea => ColumnKind::Flag,
            Column::AcademicMatch
            | Column::EnglishMatch
            | Column::ProfessionalLevel
            | Column::JobAreas
            | Column::CandidateArea
            | Column::CombinedText => ColumnKind::Text,
        }
    }

    /// Sentinel substituted when the computed value is empty or "nan".
    pub fn sentinel(self) -> FeatureValue {
        match self {
            Column::TechMatchScore => FeatureValue::Number(0.0),
            Column::TechSuccessScore | Column::AcademicScore | Column::EnglishScore => {
                FeatureValue::Number(NEUTRAL_SCORE)
            }
            Column::IsClt | Column::IsPj | Column::IsTechArea => FeatureValue::Flag(0),
            _ => FeatureValue::Text(UNSPECIFIED.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Number(f64),
    Flag(u8),
    Text(String),
}

impl FeatureValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FeatureValue::Number(n) => Some(*n),
            FeatureValue::Flag(f) => Some(f64::from(*f)),
            FeatureValue::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FeatureValue::Text(s) => Some(s),
            _ => None,
        }
    }

    fn is_blank(&self) -> bool {
        match self {
            FeatureValue::Number(n) => n.is_nan(),
            FeatureValue::Flag(_) => false,
            FeatureValue::Text(s) => is_blank_text(s),
        }
    }
}

#[derive(Debug, Error)]
pub enum FeatureError {
    #[error("{0} record has an empty identifier")]
    MissingIdentifier(&'static str),
}

#[derive(Debug, Error, PartialEq)]
pub enum FeatureInputError {
    #[error("Missing required field(s): {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("Field '{column}' must be {expected}")]
    InvalidType {
        column: &'static str,
        expected: &'static str,
    },
}

/// A fully populated feature row. Values are stored in schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct CompatibilityFeatureSet {
    mode: FeatureMode,
    values: Vec<FeatureValue>,
}

impl CompatibilityFeatureSet {
    fn from_values(mode: FeatureMode, values: Vec<FeatureValue>) -> Self {
        let values = mode
            .schema()
            .iter()
            .zip(values)
            .map(|(&column, value)| {
                if value.is_blank() {
                    column.sentinel()
                } else {
                    value
                }
            })
            .collect();
        Self { mode, values }
    }

    pub fn mode(&self) -> FeatureMode {
        self.mode
    }

    pub fn columns(&self) -> &'static [Column] {
        self.mode.schema()
    }

    pub fn get(&self, column: Column) -> Option<&FeatureValue> {
        self.columns()
            .iter()
            .position(|&c| c == column)
            .map(|i| &self.values[i])
    }

    pub fn number(&self, column: Column) -> Option<f64> {
        self.get(column).and_then(FeatureValue::as_f64)
    }

    pub fn text(&self, column: Column) -> Option<&str> {
        self.get(column).and_then(FeatureValue::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Column, &FeatureValue)> {
        self.columns().iter().copied().zip(self.values.iter())
    }

    /// Builds a feature row from a request body. Every schema column must be
    /// present; extra keys are ignored.
    pub fn from_json(
        mode: FeatureMode,
        body: &Map<String, Value>,
    ) -> Result<Self, FeatureInputError> {
        let missing: Vec<&'static str> = mode
            .schema()
            .iter()
            .map(|c| c.name())
            .filter(|name| !body.contains_key(*name))
            .collect();
        if !missing.is_empty() {
            return Err(FeatureInputError::Missing(missing));
        }

        let mut values = Vec::with_capacity(mode.schema().len());
        for &column in mode.schema() {
            let raw = &body[column.name()];
            let value = match column.kind() {
                ColumnKind::Score => raw.as_f64().map(FeatureValue::Number).ok_or(
                    FeatureInputError::InvalidType {
                        column: column.name(),
                        expected: "a number",
                    },
                )?,
                ColumnKind::Flag => match raw {
                    Value::Bool(b) => FeatureValue::Flag(u8::from(*b)),
                    Value::Number(n) if n.as_u64() == Some(0) || n.as_u64() == Some(1) => {
                        FeatureValue::Flag(n.as_u64().unwrap_or_default() as u8)
                    }
                    _ => {
                        return Err(FeatureInputError::InvalidType {
                            column: column.name(),
                            expected: "0, 1 or a boolean",
                        })
                    }
                },
                ColumnKind::Text => match raw {
                    Value::String(s) => FeatureValue::Text(s.clone()),
                    Value::Null => FeatureValue::Text(String::new()),
                    _ => {
                        return Err(FeatureInputError::InvalidType {
                            column: column.name(),
                            expected: "a string",
                        })
                    }
                },
            };
            values.push(value);
        }

        Ok(Self::from_values(mode, values))
    }
}

impl Serialize for CompatibilityFeatureSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (column, value) in self.iter() {
            map.serialize_entry(column.name(), value)?;
        }
        map.end()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Derivation
// ────────────────────────────────────────────────────────────────────────────

/// Derives the feature row for one (job, candidate) pair in `mode`.
pub fn derive_features(
    job: &JobPosting,
    candidate: &Candidate,
    mode: FeatureMode,
) -> Result<CompatibilityFeatureSet, FeatureError> {
    if job.id.trim().is_empty() {
        return Err(FeatureError::MissingIdentifier("job"));
    }
    if candidate.id.trim().is_empty() {
        return Err(FeatureError::MissingIdentifier("candidate"));
    }

    let values = mode
        .schema()
        .iter()
        .map(|&column| column_value(column, job, candidate, mode))
        .collect();

    Ok(CompatibilityFeatureSet::from_values(mode, values))
}

fn column_value(
    column: Column,
    job: &JobPosting,
    candidate: &Candidate,
    mode: FeatureMode,
) -> FeatureValue {
    match column {
        Column::TechMatchScore => FeatureValue::Number(tech_match_score(
            &job.required_competencies,
            &candidate.technical_competencies,
        )),
        Column::TechSuccessScore => FeatureValue::Number(tech_success_score(
            &job.required_competencies,
            &candidate.technical_competencies,
        )),
        Column::AcademicMatch => FeatureValue::Text(
            ACADEMIC
                .compare(&job.academic_level, &candidate.academic_level)
                .label()
                .to_string(),
        ),
        Column::AcademicScore => {
            FeatureValue::Number(ACADEMIC.score(&job.academic_level, &candidate.academic_level))
        }
        Column::EnglishMatch => FeatureValue::Text(
            ENGLISH
                .compare(&job.english_level, &candidate.english_level)
                .label()
                .to_string(),
        ),
        Column::EnglishScore => {
            FeatureValue::Number(ENGLISH.score(&job.english_level, &candidate.english_level))
        }
        Column::IsClt => flag(job.contract_type.to_lowercase().contains("clt")),
        Column::IsPj => flag(job.contract_type.to_lowercase().contains("pj")),
        Column::IsTechArea => flag(
            is_tech_area(&job.fields_of_practice) || is_tech_area(&candidate.field_of_practice),
        ),
        Column::ProfessionalLevel => FeatureValue::Text(clean(&job.professional_level)),
        Column::JobAreas => FeatureValue::Text(clean(&job.fields_of_practice)),
        Column::CandidateArea => FeatureValue::Text(clean(&candidate.field_of_practice)),
        Column::CombinedText => FeatureValue::Text(combined_text(job, candidate, mode)),
    }
}

fn flag(value: bool) -> FeatureValue {
    FeatureValue::Flag(u8::from(value))
}

fn clean(text: &str) -> String {
    text.trim().to_lowercase()
}

fn is_blank_text(text: &str) -> bool {
    let text = text.trim();
    text.is_empty() || text.eq_ignore_ascii_case("nan")
}

fn tokens(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Share of distinct required tokens the candidate also lists.
/// `None` when either side has no usable text.
fn overlap_ratio(required: &str, attained: &str) -> Option<(f64, HashSet<String>, HashSet<String>)> {
    if is_blank_text(required) || is_blank_text(attained) {
        return None;
    }
    let required = tokens(required);
    let attained = tokens(attained);
    if required.is_empty() {
        return None;
    }
    let shared = required.intersection(&attained).count();
    let ratio = shared as f64 / required.len() as f64;
    Some((ratio, required, attained))
}

/// Categorical-mode technical overlap; 0.0 when either text is empty.
pub fn tech_match_score(required: &str, attained: &str) -> f64 {
    overlap_ratio(required, attained)
        .map(|(ratio, _, _)| ratio)
        .unwrap_or(0.0)
}

/// Ranking-mode technical overlap with a bonus for shared high-value
/// technologies; 0.5 when either text is empty.
pub fn tech_success_score(required: &str, attained: &str) -> f64 {
    let Some((ratio, required, attained)) = overlap_ratio(required, attained) else {
        return NEUTRAL_SCORE;
    };
    let shared_high_value = HIGH_VALUE_TECH
        .iter()
        .filter(|tech| required.contains(**tech) && attained.contains(**tech))
        .count();
    let bonus = (TECH_BONUS_STEP * shared_high_value as f64).min(TECH_BONUS_CAP);
    (ratio + bonus).min(1.0)
}

/// True when `field` names a technology domain. Matched on whole words.
pub fn is_tech_area(field: &str) -> bool {
    field
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| TECH_AREA_KEYWORDS.contains(&word))
}

fn combined_text(job: &JobPosting, candidate: &Candidate, mode: FeatureMode) -> String {
    let lead = match mode {
        FeatureMode::Categorical => job.main_activities.as_str(),
        FeatureMode::Ranking => job.title.as_str(),
    };
    [
        lead,
        job.required_competencies.as_str(),
        candidate.technical_competencies.as_str(),
        candidate.field_of_practice.as_str(),
    ]
    .join(" ")
    .to_lowercase()
    .trim()
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_job() -> JobPosting {
        JobPosting {
            id: "V001".to_string(),
            title: "Desenvolvedor Python".to_string(),
            client: "Empresa Teste".to_string(),
            contract_type: "CLT Full".to_string(),
            professional_level: " Sênior ".to_string(),
            academic_level: "Superior".to_string(),
            english_level: "Avançado".to_string(),
            fields_of_practice: "TI - Desenvolvimento".to_string(),
            required_competencies: "Python Flask Django PostgreSQL".to_string(),
            main_activities: "Desenvolvimento de aplicações web".to_string(),
            city: "São Paulo".to_string(),
            ..JobPosting::default()
        }
    }

    fn sample_candidate() -> Candidate {
        Candidate {
            id: "C001".to_string(),
            name: "João Silva".to_string(),
            academic_level: "Pós-Graduação".to_string(),
            english_level: "Intermediário".to_string(),
            technical_competencies: "Python Django PostgreSQL Docker".to_string(),
            field_of_practice: "Desenvolvimento".to_string(),
            ..Candidate::default()
        }
    }

    #[test]
    fn test_tech_match_score_ratio() {
        // 3 of 4 required tokens present
        assert_eq!(
            tech_match_score("Python Flask Django PostgreSQL", "python django postgresql docker"),
            0.75
        );
    }

    #[test]
    fn test_tech_match_counts_distinct_required_tokens() {
        assert_eq!(tech_match_score("python python java", "python"), 0.5);
    }

    #[test]
    fn test_empty_competencies_use_defaults() {
        for (req, att) in [("", "python"), ("python", ""), ("nan", "python"), ("  ", "  ")] {
            assert_eq!(tech_match_score(req, att), 0.0);
            assert_eq!(tech_success_score(req, att), NEUTRAL_SCORE);
        }
    }

    #[test]
    fn test_tech_success_bonus_is_capped() {
        // 4/4 shared already → capped at 1.0
        assert_eq!(tech_success_score("python java aws docker", "python java aws docker"), 1.0);
        // 1/4 shared, one high-value token → 0.25 + 0.1
        let score = tech_success_score("python cobol rpg natural", "python");
        assert!((score - 0.35).abs() < 1e-9, "score was {score}");
        // bonus never exceeds 0.3
        let score = tech_success_score(
            "python java aws docker a b c d e f g h i j k l m n o p",
            "python java aws docker",
        );
        assert!((score - (0.2 + 0.3)).abs() < 1e-9, "score was {score}");
    }

    #[test]
    fn test_is_tech_area_matches_whole_words() {
        assert!(is_tech_area("TI - Desenvolvimento"));
        assert!(is_tech_area("Gestão e Alocação de Recursos de TI"));
        assert!(!is_tech_area("Atividades Administrativas"));
        assert!(!is_tech_area(""));
    }

    #[test]
    fn test_categorical_schema_and_values() {
        let features =
            derive_features(&sample_job(), &sample_candidate(), FeatureMode::Categorical).unwrap();

        let names: Vec<_> = features.iter().map(|(c, _)| c.name()).collect();
        assert_eq!(
            names,
            vec![
                "tech_match_score",
                "nivel_profissional",
                "areas_atuacao",
                "area_de_atuacao",
                "academic_match",
                "english_match",
                "is_tech_area",
                "combined_text",
            ]
        );
        assert_eq!(features.number(Column::TechMatchScore), Some(0.75));
        assert_eq!(features.text(Column::ProfessionalLevel), Some("sênior"));
        assert_eq!(features.text(Column::AcademicMatch), Some("compatível"));
        assert_eq!(features.text(Column::EnglishMatch), Some("insuficiente"));
        assert_eq!(features.number(Column::IsTechArea), Some(1.0));
        assert_eq!(
            features.text(Column::CombinedText),
            Some(
                "desenvolvimento de aplicações web python flask django postgresql \
                 python django postgresql docker desenvolvimento"
            )
        );
        assert!(features.get(Column::IsClt).is_none());
    }

    #[test]
    fn test_ranking_schema_and_values() {
        let features =
            derive_features(&sample_job(), &sample_candidate(), FeatureMode::Ranking).unwrap();

        assert_eq!(features.columns(), RANKING_SCHEMA);
        // 0.75 overlap + 3 shared high-value tokens (python, django, postgresql) capped to 1.0
        assert_eq!(features.number(Column::TechSuccessScore), Some(1.0));
        assert_eq!(features.number(Column::AcademicScore), Some(1.0));
        assert_eq!(features.number(Column::EnglishScore), Some(0.8));
        assert_eq!(features.number(Column::IsClt), Some(1.0));
        assert_eq!(features.number(Column::IsPj), Some(0.0));
        assert!(features
            .text(Column::CombinedText)
            .unwrap()
            .starts_with("desenvolvedor python"));
    }

    #[test]
    fn test_empty_inputs_map_to_sentinels() {
        let job = JobPosting {
            id: "1".to_string(),
            professional_level: "nan".to_string(),
            ..JobPosting::default()
        };
        let candidate = Candidate {
            id: "2".to_string(),
            ..Candidate::default()
        };

        let features = derive_features(&job, &candidate, FeatureMode::Categorical).unwrap();
        assert_eq!(features.number(Column::TechMatchScore), Some(0.0));
        assert_eq!(features.text(Column::ProfessionalLevel), Some(UNSPECIFIED));
        assert_eq!(features.text(Column::JobAreas), Some(UNSPECIFIED));
        assert_eq!(features.text(Column::CandidateArea), Some(UNSPECIFIED));
        assert_eq!(features.text(Column::CombinedText), Some(UNSPECIFIED));
        assert_eq!(features.text(Column::AcademicMatch), Some("indefinido"));

        let features = derive_features(&job, &candidate, FeatureMode::Ranking).unwrap();
        assert_eq!(features.number(Column::TechSuccessScore), Some(NEUTRAL_SCORE));
        assert_eq!(features.number(Column::IsPj), Some(0.0));
        for (column, value) in features.iter() {
            assert!(!value.is_blank(), "{} left blank", column.name());
        }
    }

    #[test]
    fn test_missing_identifier_is_an_error() {
        let candidate = Candidate {
            id: String::new(),
            ..sample_candidate()
        };
        let err = derive_features(&sample_job(), &candidate, FeatureMode::Categorical)
            .unwrap_err();
        assert!(matches!(err, FeatureError::MissingIdentifier("candidate")));
    }

    #[test]
    fn test_serializes_as_named_row() {
        let features =
            derive_features(&sample_job(), &sample_candidate(), FeatureMode::Categorical).unwrap();
        let json = serde_json::to_value(&features).unwrap();
        assert_eq!(json["tech_match_score"], json!(0.75));
        assert_eq!(json["academic_match"], json!("compatível"));
        assert_eq!(json["is_tech_area"], json!(1));
    }

    #[test]
    fn test_from_json_reports_every_missing_field() {
        let body = json!({ "tech_match_score": 0.5, "nivel_profissional": "sênior" });
        let err = CompatibilityFeatureSet::from_json(
            FeatureMode::Categorical,
            body.as_object().unwrap(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            FeatureInputError::Missing(vec![
                "areas_atuacao",
                "area_de_atuacao",
                "academic_match",
                "english_match",
                "is_tech_area",
                "combined_text",
            ])
        );
    }

    #[test]
    fn test_from_json_round_trips_a_derived_row() {
        let derived =
            derive_features(&sample_job(), &sample_candidate(), FeatureMode::Ranking).unwrap();
        let body = serde_json::to_value(&derived).unwrap();
        let parsed =
            CompatibilityFeatureSet::from_json(FeatureMode::Ranking, body.as_object().unwrap())
                .unwrap();
        assert_eq!(parsed, derived);
    }

    #[test]
    fn test_from_json_rejects_wrong_types() {
        let mut body = serde_json::to_value(
            derive_features(&sample_job(), &sample_candidate(), FeatureMode::Categorical).unwrap(),
        )
        .unwrap();
        body["tech_match_score"] = json!("high");
        let err = CompatibilityFeatureSet::from_json(
            FeatureMode::Categorical,
            body.as_object().unwrap(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            FeatureInputError::InvalidType {
                column: "tech_match_score",
                ..
            }
        ));
    }

    #[test]
    fn test_feature_mode_parses() {
        assert_eq!("Ranking".parse::<FeatureMode>(), Ok(FeatureMode::Ranking));
        assert_eq!(
            "categorical".parse::<FeatureMode>(),
            Ok(FeatureMode::Categorical)
        );
        assert!("other".parse::<FeatureMode>().is_err());
    }
}
