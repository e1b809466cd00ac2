//! Primary store: reads against the `vagas`, `candidatos` and `prospects`
//! tables. Schema creation and bulk loading happen outside this service.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;

use crate::models::{Candidate, JobPosting};
use crate::search::{JobSummary, Pagination, SearchPage, SearchQuery};
use crate::store::{BackendKind, JobStore, StoreStats};

const JOB_COLUMNS: &str = r#"
    id_vaga,
    COALESCE(titulo_vaga, '') AS titulo_vaga,
    COALESCE(cliente, '') AS cliente,
    COALESCE(tipo_contratacao, '') AS tipo_contratacao,
    COALESCE(nivel_profissional, '') AS nivel_profissional,
    COALESCE(nivel_academico, '') AS nivel_academico,
    COALESCE(nivel_ingles, '') AS nivel_ingles,
    COALESCE(areas_atuacao, '') AS areas_atuacao,
    COALESCE(competencias_tecnicas_requeridas, '') AS competencias_tecnicas_requeridas,
    COALESCE(principais_atividades, '') AS principais_atividades,
    COALESCE(pais, '') AS pais,
    COALESCE(estado, '') AS estado,
    COALESCE(cidade, '') AS cidade
"#;

const CANDIDATE_COLUMNS: &str = r#"
    codigo_candidato,
    COALESCE(nome, '') AS nome,
    COALESCE(email, '') AS email,
    COALESCE(telefone, '') AS telefone,
    COALESCE(data_nascimento, '') AS data_nascimento,
    COALESCE(estado_civil, '') AS estado_civil,
    COALESCE(pcd, '') AS pcd,
    COALESCE(nivel_academico, '') AS nivel_academico,
    COALESCE(area_formacao, '') AS area_formacao,
    COALESCE(nivel_ingles, '') AS nivel_ingles,
    COALESCE(conhecimentos_tecnicos, '') AS conhecimentos_tecnicos,
    COALESCE(area_de_atuacao, '') AS area_de_atuacao
"#;

// $1 = raw term, $2 = escaped ILIKE pattern, $3 = level.
// Eligibility is "at least one application row", same as the snapshot path.
const ELIGIBLE_JOBS_CTE: &str = r#"
    WITH eligible AS (
        SELECT
            v.id_vaga AS id,
            COALESCE(v.titulo_vaga, '') AS title,
            COALESCE(v.cliente, '') AS client,
            COALESCE(v.nivel_profissional, '') AS level,
            COALESCE(v.areas_atuacao, '') AS fields_of_practice,
            COALESCE(v.cidade, '') AS city,
            COUNT(p.id_vaga) AS total_candidates,
            COALESCE(SUM(p.contratado), 0)::BIGINT AS total_hired
        FROM vagas v
        LEFT JOIN prospects p ON p.id_vaga = v.id_vaga
        WHERE ($1 = ''
               OR v.titulo_vaga ILIKE $2 ESCAPE '\'
               OR v.cliente ILIKE $2 ESCAPE '\'
               OR v.areas_atuacao ILIKE $2 ESCAPE '\')
          AND ($3 = '' OR LOWER(v.nivel_profissional) = LOWER($3))
        GROUP BY v.id_vaga
        HAVING COUNT(p.id_vaga) > 0
    )
"#;

const JOBS_WITH_APPLICATIONS_SQL: &str = r#"
    SELECT COUNT(*)
    FROM vagas v
    WHERE EXISTS (SELECT 1 FROM prospects p WHERE p.id_vaga = v.id_vaga)
"#;

/// Wraps `term` as a substring ILIKE pattern, escaping wildcard characters.
pub fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobStore for PgStore {
    fn kind(&self) -> BackendKind {
        BackendKind::Primary
    }

    async fn search_jobs(&self, query: &SearchQuery) -> Result<SearchPage> {
        let term = query.term.trim();
        let level = query.level.trim();
        let pattern = like_pattern(term);

        let total: i64 = sqlx::query_scalar(&format!(
            "{ELIGIBLE_JOBS_CTE} SELECT COUNT(*) FROM eligible"
        ))
        .bind(term)
        .bind(&pattern)
        .bind(level)
        .fetch_one(&self.pool)
        .await?;

        let pagination = Pagination::new(query.page, query.per_page, total);

        let items = sqlx::query_as::<_, JobSummary>(&format!(
            "{ELIGIBLE_JOBS_CTE} SELECT * FROM eligible ORDER BY title, id LIMIT $4 OFFSET $5"
        ))
        .bind(term)
        .bind(&pattern)
        .bind(level)
        .bind(pagination.per_page)
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await?;

        let distinct_levels: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT nivel_profissional
            FROM vagas
            WHERE nivel_profissional IS NOT NULL AND TRIM(nivel_profissional) <> ''
            ORDER BY nivel_profissional
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(SearchPage::new(items, pagination, distinct_levels))
    }

    async fn find_job(&self, id: &str) -> Result<Option<JobPosting>> {
        Ok(sqlx::query_as::<_, JobPosting>(&format!(
            "SELECT {JOB_COLUMNS} FROM vagas WHERE id_vaga = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn list_candidates(&self) -> Result<Vec<Candidate>> {
        Ok(sqlx::query_as::<_, Candidate>(&format!(
            "SELECT {CANDIDATE_COLUMNS} FROM candidatos ORDER BY codigo_candidato"
        ))
        .fetch_all(&self.pool)
        .await?)
    }

    async fn stats(&self) -> Result<StoreStats> {
        let total_jobs: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM vagas")
            .fetch_one(&self.pool)
            .await?;
        let jobs_with_applications: i64 = sqlx::query_scalar(JOBS_WITH_APPLICATIONS_SQL)
            .fetch_one(&self.pool)
            .await?;
        let total_candidates: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM candidatos")
            .fetch_one(&self.pool)
            .await?;

        Ok(StoreStats {
            total_jobs,
            jobs_with_applications,
            total_candidates,
        })
    }
}
