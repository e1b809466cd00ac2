use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A normalized candidate. Column names follow the `candidatos` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Candidate {
    #[sqlx(rename = "codigo_candidato")]
    pub id: String,
    #[sqlx(rename = "nome")]
    pub name: String,
    pub email: String,
    #[sqlx(rename = "telefone")]
    pub phone: String,
    #[sqlx(rename = "data_nascimento")]
    pub birth_date: String,
    #[sqlx(rename = "estado_civil")]
    pub marital_status: String,
    #[sqlx(rename = "pcd")]
    pub disability: String,
    #[sqlx(rename = "nivel_academico")]
    pub academic_level: String,
    #[sqlx(rename = "area_formacao")]
    pub education_field: String,
    #[sqlx(rename = "nivel_ingles")]
    pub english_level: String,
    #[sqlx(rename = "conhecimentos_tecnicos")]
    pub technical_competencies: String,
    #[sqlx(rename = "area_de_atuacao")]
    pub field_of_practice: String,
}
