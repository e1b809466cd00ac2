//! Record Normalizer: flattens nested snapshot records into typed models.
//!
//! Missing sections and fields become empty strings. A record with the wrong
//! shape is skipped with a warning and counted; a batch never aborts.

mod raw;

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{Application, Candidate, JobPosting};

use raw::{RawCandidate, RawJob, RawProspect, RawProspectGroup};

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("record has an empty identifier")]
    EmptyIdentifier,

    #[error("record is not an object")]
    NotAnObject,

    #[error("malformed record: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Outcome of normalizing a batch: the records that survived and how many
/// were skipped as malformed.
#[derive(Debug, Clone, Default)]
pub struct Normalized<T> {
    pub records: Vec<T>,
    pub skipped: usize,
}

fn check_object(value: &Value) -> Result<(), NormalizeError> {
    if value.is_object() {
        Ok(())
    } else {
        Err(NormalizeError::NotAnObject)
    }
}

fn check_id(id: &str) -> Result<String, NormalizeError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(NormalizeError::EmptyIdentifier);
    }
    Ok(id.to_string())
}

/// Normalizes one raw job record keyed by `id`.
pub fn normalize_job(id: &str, value: &Value) -> Result<JobPosting, NormalizeError> {
    let id = check_id(id)?;
    check_object(value)?;
    let raw = RawJob::deserialize(value)?;
    let basics = raw.informacoes_basicas.unwrap_or_default();
    let profile = raw.perfil_vaga.unwrap_or_default();

    Ok(JobPosting {
        id,
        title: basics.titulo_vaga,
        client: basics.cliente,
        contract_type: basics.tipo_contratacao,
        professional_level: profile.nivel_profissional,
        academic_level: profile.nivel_academico,
        english_level: profile.nivel_ingles,
        fields_of_practice: profile.areas_atuacao,
        required_competencies: profile.competencia_tecnicas_e_comportamentais,
        main_activities: profile.principais_atividades,
        country: profile.pais,
        state: profile.estado,
        city: profile.cidade,
        requested_on: basics.data_requisicao,
    })
}

/// Normalizes one raw candidate record keyed by `id`.
pub fn normalize_candidate(id: &str, value: &Value) -> Result<Candidate, NormalizeError> {
    let id = check_id(id)?;
    check_object(value)?;
    let raw = RawCandidate::deserialize(value)?;
    let basics = raw.infos_basicas.unwrap_or_default();
    let personal = raw.informacoes_pessoais.unwrap_or_default();
    let education = raw.formacao.unwrap_or_default();
    let professional = raw.informacoes_profissionais.unwrap_or_default();

    Ok(Candidate {
        id,
        name: basics.nome,
        email: basics.email,
        phone: basics.telefone,
        birth_date: personal.data_nascimento,
        marital_status: personal.estado_civil,
        disability: personal.pcd,
        academic_level: education.nivel_academico,
        education_field: education.area_formacao,
        english_level: professional.nivel_ingles,
        technical_competencies: professional.conhecimentos_tecnicos,
        field_of_practice: professional.area_de_atuacao,
    })
}

fn normalize_prospect(job_id: &str, value: &Value) -> Result<Application, NormalizeError> {
    check_object(value)?;
    let raw = RawProspect::deserialize(value)?;
    let candidate_id = check_id(&raw.codigo)?;
    let status = raw.situacao_candidato.trim().to_string();

    Ok(Application {
        job_id: job_id.to_string(),
        candidate_id,
        candidate_name: raw.nome,
        hired: Application::is_hired_status(&status),
        status,
        applied_on: raw.data_candidatura,
        comment: raw.comentario,
        recruiter: raw.recrutador,
    })
}

fn normalize_batch<T>(
    raw: &Map<String, Value>,
    entity: &'static str,
    normalize: impl Fn(&str, &Value) -> Result<T, NormalizeError>,
) -> Normalized<T> {
    let mut out = Normalized {
        records: Vec::with_capacity(raw.len()),
        skipped: 0,
    };

    for (id, value) in raw {
        match normalize(id, value) {
            Ok(record) => out.records.push(record),
            Err(e) => {
                warn!(entity, id = %id, error = %e, "Skipping malformed record");
                out.skipped += 1;
            }
        }
    }

    debug!(
        entity,
        normalized = out.records.len(),
        skipped = out.skipped,
        "Normalized batch"
    );
    out
}

/// Normalizes a whole job collection keyed by job id.
pub fn normalize_jobs(raw: &Map<String, Value>) -> Normalized<JobPosting> {
    normalize_batch(raw, "job", normalize_job)
}

/// Normalizes a whole candidate collection keyed by candidate id.
pub fn normalize_candidates(raw: &Map<String, Value>) -> Normalized<Candidate> {
    normalize_batch(raw, "candidate", normalize_candidate)
}

/// Flattens prospect groups (keyed by job id) into applications.
///
/// A malformed group counts as one skip; a malformed prospect inside a valid
/// group counts as one skip and its siblings are kept.
pub fn normalize_applications(raw: &Map<String, Value>) -> Normalized<Application> {
    let mut out = Normalized::default();

    for (job_id, value) in raw {
        let group = check_id(job_id).and_then(|job_id| {
            check_object(value)?;
            RawProspectGroup::deserialize(value)
                .map(|group| (job_id, group))
                .map_err(NormalizeError::from)
        });
        let (job_id, group) = match group {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(entity = "prospects", id = %job_id, error = %e, "Skipping malformed record");
                out.skipped += 1;
                continue;
            }
        };

        for prospect in group.prospects.unwrap_or_default() {
            match normalize_prospect(&job_id, &prospect) {
                Ok(application) => out.records.push(application),
                Err(e) => {
                    warn!(
                        entity = "application",
                        job_id = %job_id,
                        title = %group.titulo,
                        error = %e,
                        "Skipping malformed record"
                    );
                    out.skipped += 1;
                }
            }
        }
    }

    debug!(
        entity = "application",
        normalized = out.records.len(),
        skipped = out.skipped,
        "Normalized batch"
    );
    out
}
