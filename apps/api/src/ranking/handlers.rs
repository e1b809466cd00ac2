//! Axum route handlers for candidate ranking and ad-hoc prediction.

use axum::{
    extract::{Path, State},
    Json,
};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::AppError;
use crate::models::{Candidate, JobPosting};
use crate::ranking::{rank, RankedCandidate};
use crate::scoring::classifier::{positive_probability, to_match_score};
use crate::scoring::features::{Column, ColumnKind, FeatureValue};
use crate::scoring::hierarchy::{ACADEMIC, ENGLISH};
use crate::scoring::{derive_features, Classifier, CompatibilityFeatureSet, FeatureMode};
use crate::state::AppState;

/// Longest competencies text shown in a job detail before it is cut.
pub const PREVIEW_CHARS: usize = 500;

/// Fields `POST /api/v1/predict/auto` cannot do without.
pub const AUTO_REQUIRED_FIELDS: &[&str] = &["nivel_profissional", "areas_atuacao", "area_de_atuacao"];

const AD_HOC_ID: &str = "adhoc";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct JobDetail {
    pub id: String,
    pub title: String,
    pub client: String,
    pub professional_level: String,
    pub fields_of_practice: String,
    pub city: String,
    pub contract_type: String,
    pub required_competencies: String,
}

impl From<&JobPosting> for JobDetail {
    fn from(job: &JobPosting) -> Self {
        Self {
            id: job.id.clone(),
            title: job.title.clone(),
            client: job.client.clone(),
            professional_level: job.professional_level.clone(),
            fields_of_practice: job.fields_of_practice.clone(),
            city: job.city.clone(),
            contract_type: job.contract_type.clone(),
            required_competencies: preview(&job.required_competencies),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct JobDetailResponse {
    pub job: JobDetail,
    pub candidates: Vec<RankedCandidate>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct Probability {
    pub not_hired: f64,
    pub hired: f64,
}

#[derive(Debug, Serialize)]
pub struct Explanation {
    pub tech_compatibility: String,
    pub academic_match: Option<FeatureValue>,
    pub english_match: Option<FeatureValue>,
}

#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub prediction: u8,
    pub prediction_text: &'static str,
    pub probability: Probability,
    pub match_score: f64,
    pub model_type: &'static str,
    pub feature_mode: FeatureMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features_calculated: Option<CompatibilityFeatureSet>,
    pub explanation: Explanation,
}

/// Raw job and candidate fields for `POST /api/v1/predict/auto`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AutoPredictRequest {
    pub titulo_vaga: String,
    pub tipo_contratacao: String,
    pub nivel_profissional: String,
    pub areas_atuacao: String,
    pub competencias_tecnicas_requeridas: String,
    pub principais_atividades: String,
    pub nivel_academico_requerido: String,
    pub nivel_ingles_requerido: String,
    pub area_de_atuacao: String,
    pub conhecimentos_tecnicos: String,
    pub nivel_academico: String,
    pub nivel_ingles: String,
}

impl AutoPredictRequest {
    fn into_pair(self) -> (JobPosting, Candidate) {
        let job = JobPosting {
            id: AD_HOC_ID.to_string(),
            title: self.titulo_vaga,
            contract_type: self.tipo_contratacao,
            professional_level: self.nivel_profissional,
            fields_of_practice: self.areas_atuacao,
            required_competencies: self.competencias_tecnicas_requeridas,
            main_activities: self.principais_atividades,
            academic_level: self.nivel_academico_requerido,
            english_level: self.nivel_ingles_requerido,
            ..JobPosting::default()
        };
        let candidate = Candidate {
            id: AD_HOC_ID.to_string(),
            field_of_practice: self.area_de_atuacao,
            technical_competencies: self.conhecimentos_tecnicos,
            academic_level: self.nivel_academico,
            english_level: self.nivel_ingles,
            ..Candidate::default()
        };
        (job, candidate)
    }
}

#[derive(Debug, Serialize)]
pub struct ColumnInfo {
    pub name: &'static str,
    pub kind: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ModelInfoResponse {
    pub model_loaded: bool,
    pub backend: Option<&'static str>,
    pub feature_mode: Option<FeatureMode>,
    pub columns: Vec<ColumnInfo>,
    pub academic_levels: Vec<&'static str>,
    pub english_levels: Vec<&'static str>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/jobs/:id
///
/// Job detail with every candidate ranked against it, best first.
pub async fn handle_job_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<JobDetailResponse>, AppError> {
    let classifier = state.classifier()?;

    let job = state
        .data
        .find_job(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job '{id}' not found")))?;
    let candidates = state.data.list_candidates().await?;

    let detail = JobDetail::from(&job);
    let mode = classifier.feature_mode();
    let ranked = tokio::task::spawn_blocking(move || {
        rank(&job, &candidates, mode, classifier.as_ref())
    })
    .await
    .context("Ranking task failed")?;

    Ok(Json(JobDetailResponse {
        job: detail,
        candidates: ranked,
    }))
}

/// POST /api/v1/predict
///
/// Scores a caller-supplied feature row. Every column of the classifier's
/// schema must be present.
pub async fn handle_predict(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<PredictionResponse>, AppError> {
    let classifier = state.classifier()?;
    let body = as_object(&body)?;

    let features = CompatibilityFeatureSet::from_json(classifier.feature_mode(), body)
        .map_err(|e| AppError::Validation(e.to_string()))?;

    Ok(Json(predict(classifier.as_ref(), features, "manual", false)?))
}

/// POST /api/v1/predict/auto
///
/// Derives the feature row from raw job and candidate fields, then scores it.
pub async fn handle_predict_auto(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<PredictionResponse>, AppError> {
    let classifier = state.classifier()?;
    let object = as_object(&body)?;

    let missing: Vec<&str> = AUTO_REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| !object.contains_key(*field))
        .collect();
    if !missing.is_empty() {
        return Err(AppError::Validation(format!(
            "Missing required field(s): {}",
            missing.join(", ")
        )));
    }

    let request: AutoPredictRequest =
        serde_json::from_value(body).map_err(|e| AppError::Validation(e.to_string()))?;
    let (job, candidate) = request.into_pair();

    let features = derive_features(&job, &candidate, classifier.feature_mode())
        .map_err(|e| AppError::Validation(e.to_string()))?;

    Ok(Json(predict(classifier.as_ref(), features, "auto", true)?))
}

/// GET /api/v1/model
pub async fn handle_model_info(State(state): State<AppState>) -> Json<ModelInfoResponse> {
    let info = match &state.classifier {
        Some(classifier) => ModelInfoResponse {
            model_loaded: true,
            backend: Some(classifier.name()),
            feature_mode: Some(classifier.feature_mode()),
            columns: classifier
                .feature_mode()
                .schema()
                .iter()
                .map(|&column| ColumnInfo {
                    name: column.name(),
                    kind: kind_name(column.kind()),
                })
                .collect(),
            academic_levels: ACADEMIC.levels(),
            english_levels: ENGLISH.levels(),
        },
        None => ModelInfoResponse {
            model_loaded: false,
            backend: None,
            feature_mode: None,
            columns: Vec::new(),
            academic_levels: ACADEMIC.levels(),
            english_levels: ENGLISH.levels(),
        },
    };
    Json(info)
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn as_object(body: &Value) -> Result<&Map<String, Value>, AppError> {
    body.as_object()
        .ok_or_else(|| AppError::Validation("Request body must be a JSON object".to_string()))
}

fn predict(
    classifier: &dyn Classifier,
    features: CompatibilityFeatureSet,
    model_type: &'static str,
    echo_features: bool,
) -> Result<PredictionResponse, AppError> {
    let probabilities = classifier
        .predict_proba(&features)
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let prediction = classifier
        .predict(&features)
        .map_err(|e| AppError::Validation(e.to_string()))?;

    Ok(PredictionResponse {
        prediction,
        prediction_text: if prediction == 1 {
            "CONTRATADO"
        } else {
            "NÃO CONTRATADO"
        },
        probability: Probability {
            not_hired: probabilities.first().copied().unwrap_or(0.0),
            hired: probabilities.get(1).copied().unwrap_or(0.0),
        },
        match_score: to_match_score(positive_probability(&probabilities)),
        model_type,
        feature_mode: features.mode(),
        explanation: explain(&features),
        features_calculated: echo_features.then_some(features),
    })
}

fn explain(features: &CompatibilityFeatureSet) -> Explanation {
    let tech = features
        .number(Column::TechMatchScore)
        .or_else(|| features.number(Column::TechSuccessScore))
        .unwrap_or_default();
    Explanation {
        tech_compatibility: format!("{:.1}%", tech * 100.0),
        academic_match: features
            .get(Column::AcademicMatch)
            .or_else(|| features.get(Column::AcademicScore))
            .cloned(),
        english_match: features
            .get(Column::EnglishMatch)
            .or_else(|| features.get(Column::EnglishScore))
            .cloned(),
    }
}

fn kind_name(kind: ColumnKind) -> &'static str {
    match kind {
        ColumnKind::Score => "score",
        ColumnKind::Flag => "flag",
        ColumnKind::Text => "text",
    }
}

/// First `PREVIEW_CHARS` characters, with `...` appended when cut.
pub fn preview(text: &str) -> String {
    if text.chars().count() <= PREVIEW_CHARS {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(PREVIEW_CHARS).collect();
    cut.push_str("...");
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::HeuristicClassifier;

    #[test]
    fn test_preview_keeps_short_text() {
        assert_eq!(preview("python, sql"), "python, sql");
        let exact = "a".repeat(PREVIEW_CHARS);
        assert_eq!(preview(&exact), exact);
    }

    #[test]
    fn test_preview_cuts_long_text_on_char_boundary() {
        let long = "ç".repeat(PREVIEW_CHARS + 10);
        let cut = preview(&long);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), PREVIEW_CHARS + 3);
    }

    #[test]
    fn test_auto_request_maps_fields() {
        let body = serde_json::json!({
            "nivel_profissional": "Sênior",
            "areas_atuacao": "TI - Desenvolvimento",
            "area_de_atuacao": "TI",
            "conhecimentos_tecnicos": "python",
            "nivel_academico_requerido": "Ensino Superior Completo",
        });
        let request: AutoPredictRequest = serde_json::from_value(body).unwrap();
        let (job, candidate) = request.into_pair();
        assert_eq!(job.id, AD_HOC_ID);
        assert_eq!(job.professional_level, "Sênior");
        assert_eq!(job.academic_level, "Ensino Superior Completo");
        assert_eq!(candidate.field_of_practice, "TI");
        assert_eq!(candidate.technical_competencies, "python");
    }

    #[test]
    fn test_predict_response_is_consistent() {
        let classifier = HeuristicClassifier::new(FeatureMode::Categorical);
        let job = JobPosting {
            id: "V1".to_string(),
            required_competencies: "python sql".to_string(),
            ..JobPosting::default()
        };
        let candidate = Candidate {
            id: "C1".to_string(),
            technical_competencies: "python sql".to_string(),
            ..Candidate::default()
        };
        let features = derive_features(&job, &candidate, FeatureMode::Categorical).unwrap();
        let response = predict(&classifier, features, "auto", true).unwrap();

        let sum = response.probability.hired + response.probability.not_hired;
        assert!((sum - 1.0).abs() < 1e-9);
        assert_eq!(response.match_score, to_match_score(response.probability.hired));
        assert_eq!(response.prediction, u8::from(response.probability.hired > 0.5));
        assert_eq!(response.explanation.tech_compatibility, "100.0%");
        assert!(response.features_calculated.is_some());
    }
}
