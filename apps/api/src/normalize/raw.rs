//! Raw source shapes for the JSON snapshot files.
//!
//! Every section is optional and every field defaults to the empty string.
//! Scalars are accepted as text; nested arrays/objects where text is expected
//! make the whole record malformed.

use serde::de::Error as _;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Array(_) => Err(D::Error::custom("expected text, found an array")),
        Value::Object(_) => Err(D::Error::custom("expected text, found an object")),
    }
}

/// A nested section: an object, or null/absent. Anything else is malformed.
fn section<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        object @ Value::Object(_) => T::deserialize(object).map(Some).map_err(D::Error::custom),
        _ => Err(D::Error::custom("expected a section object")),
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawJob {
    #[serde(deserialize_with = "section")]
    pub informacoes_basicas: Option<RawJobBasics>,
    #[serde(deserialize_with = "section")]
    pub perfil_vaga: Option<RawJobProfile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawJobBasics {
    // Source key carries the typo.
    #[serde(rename = "data_requicisao", deserialize_with = "text")]
    pub data_requisicao: String,
    #[serde(deserialize_with = "text")]
    pub titulo_vaga: String,
    #[serde(deserialize_with = "text")]
    pub cliente: String,
    #[serde(deserialize_with = "text")]
    pub tipo_contratacao: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawJobProfile {
    #[serde(deserialize_with = "text")]
    pub pais: String,
    #[serde(deserialize_with = "text")]
    pub estado: String,
    #[serde(deserialize_with = "text")]
    pub cidade: String,
    #[serde(rename = "nivel profissional", deserialize_with = "text")]
    pub nivel_profissional: String,
    #[serde(deserialize_with = "text")]
    pub nivel_academico: String,
    #[serde(deserialize_with = "text")]
    pub nivel_ingles: String,
    #[serde(deserialize_with = "text")]
    pub areas_atuacao: String,
    #[serde(deserialize_with = "text")]
    pub competencia_tecnicas_e_comportamentais: String,
    #[serde(deserialize_with = "text")]
    pub principais_atividades: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawCandidate {
    #[serde(deserialize_with = "section")]
    pub infos_basicas: Option<RawCandidateBasics>,
    #[serde(deserialize_with = "section")]
    pub informacoes_pessoais: Option<RawCandidatePersonal>,
    #[serde(alias = "formacao_academica", deserialize_with = "section")]
    pub formacao: Option<RawCandidateEducation>,
    #[serde(deserialize_with = "section")]
    pub informacoes_profissionais: Option<RawCandidateProfessional>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawCandidateBasics {
    #[serde(deserialize_with = "text")]
    pub nome: String,
    #[serde(deserialize_with = "text")]
    pub email: String,
    #[serde(deserialize_with = "text")]
    pub telefone: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawCandidatePersonal {
    #[serde(deserialize_with = "text")]
    pub data_nascimento: String,
    #[serde(deserialize_with = "text")]
    pub estado_civil: String,
    #[serde(deserialize_with = "text")]
    pub pcd: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawCandidateEducation {
    #[serde(deserialize_with = "text")]
    pub nivel_academico: String,
    #[serde(deserialize_with = "text")]
    pub area_formacao: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawCandidateProfessional {
    #[serde(deserialize_with = "text")]
    pub nivel_ingles: String,
    #[serde(deserialize_with = "text")]
    pub conhecimentos_tecnicos: String,
    #[serde(alias = "area_atuacao", deserialize_with = "text")]
    pub area_de_atuacao: String,
}

/// Applications grouped under one job id. Individual prospects stay as raw
/// values so one bad entry does not sink its siblings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawProspectGroup {
    #[serde(deserialize_with = "text")]
    pub titulo: String,
    pub prospects: Option<Vec<Value>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawProspect {
    #[serde(deserialize_with = "text")]
    pub codigo: String,
    #[serde(deserialize_with = "text")]
    pub nome: String,
    #[serde(deserialize_with = "text")]
    pub situacao_candidato: String,
    #[serde(deserialize_with = "text")]
    pub data_candidatura: String,
    #[serde(deserialize_with = "text")]
    pub comentario: String,
    #[serde(deserialize_with = "text")]
    pub recrutador: String,
}
