use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A normalized job posting. Column names follow the `vagas` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct JobPosting {
    #[sqlx(rename = "id_vaga")]
    pub id: String,
    #[sqlx(rename = "titulo_vaga")]
    pub title: String,
    #[sqlx(rename = "cliente")]
    pub client: String,
    #[sqlx(rename = "tipo_contratacao")]
    pub contract_type: String,
    #[sqlx(rename = "nivel_profissional")]
    pub professional_level: String,
    #[sqlx(rename = "nivel_academico")]
    pub academic_level: String,
    #[sqlx(rename = "nivel_ingles")]
    pub english_level: String,
    #[sqlx(rename = "areas_atuacao")]
    pub fields_of_practice: String,
    #[sqlx(rename = "competencias_tecnicas_requeridas")]
    pub required_competencies: String,
    #[sqlx(rename = "principais_atividades")]
    pub main_activities: String,
    #[sqlx(rename = "pais")]
    pub country: String,
    #[sqlx(rename = "estado")]
    pub state: String,
    #[sqlx(rename = "cidade")]
    pub city: String,
    /// Not stored in the relational table; only populated from the snapshot.
    #[sqlx(default)]
    pub requested_on: String,
}
