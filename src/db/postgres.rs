// src/db/postgres.rs

use std::time::Duration;

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, types::Json, PgPool, Postgres};

use super::remote::{is_valid_identifier, text_value, Filter, Record, RemoteError, RemoteStore};

/// Conexão direta com o Postgres do Supabase (via DATABASE_URL).
/// As linhas trafegam como JSONB (`to_jsonb` / `jsonb_populate_record`), então
/// o mesmo cliente serve para qualquer tabela.
#[derive(Clone, Debug)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, RemoteError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(database_url)
            .await?;

        tracing::info!("✅ Conexão direta com o Postgres estabelecida com sucesso!");
        Ok(Self { pool })
    }
}

/// Valida e coloca aspas num identificador SQL.
fn ident(name: &str) -> Result<String, RemoteError> {
    if !is_valid_identifier(name) {
        return Err(RemoteError::Schema(format!("identificador inválido: '{}'", name)));
    }
    Ok(format!("\"{}\"", name))
}

/// Converte erros do sqlx na taxonomia do cliente remoto.
fn classify(e: sqlx::Error) -> RemoteError {
    if let sqlx::Error::Database(db_err) = &e {
        if let Some(code) = db_err.code() {
            if let Some(classified) = RemoteError::from_code(&code, db_err.message()) {
                return classified;
            }
        }
    }
    RemoteError::Database(e)
}

/// Monta `WHERE` a partir do filtro. Coluna e valor vão como parâmetros,
/// comparados pela forma textual (`->>`), igual ao `eq.` do PostgREST.
/// Retorna o SQL e os parâmetros, numerados a partir de `first_param`.
fn where_clause(filter: &Filter, first_param: usize) -> (String, Vec<Option<String>>) {
    if filter.is_empty() {
        return ("TRUE".to_string(), Vec::new());
    }

    let mut parts = Vec::new();
    let mut binds = Vec::new();
    let mut n = first_param;
    for (column, value) in filter.predicates() {
        match text_value(value) {
            Some(text) => {
                parts.push(format!("(to_jsonb(alvo) ->> ${}) = ${}", n, n + 1));
                binds.push(Some(column.clone()));
                binds.push(Some(text));
                n += 2;
            }
            None => {
                parts.push(format!("(to_jsonb(alvo) ->> ${}) IS NULL", n));
                binds.push(Some(column.clone()));
                n += 1;
            }
        }
    }
    (parts.join(" AND "), binds)
}

fn bind_all<'q>(
    mut query: sqlx::query::QueryScalar<'q, Postgres, Json<Record>, sqlx::postgres::PgArguments>,
    binds: Vec<Option<String>>,
) -> sqlx::query::QueryScalar<'q, Postgres, Json<Record>, sqlx::postgres::PgArguments> {
    for bind in binds {
        query = query.bind(bind);
    }
    query
}

#[async_trait]
impl RemoteStore for PostgresStore {
    async fn select(&self, table: &str, filter: &Filter) -> Result<Vec<Record>, RemoteError> {
        let (condition, binds) = where_clause(filter, 1);
        let sql = format!(
            "SELECT to_jsonb(alvo) FROM {} AS alvo WHERE {}",
            ident(table)?,
            condition
        );

        let rows = bind_all(sqlx::query_scalar::<_, Json<Record>>(&sql), binds)
            .fetch_all(&self.pool)
            .await
            .map_err(classify)?;

        Ok(rows.into_iter().map(|Json(r)| r).collect())
    }

    async fn insert(&self, table: &str, record: Record) -> Result<Record, RemoteError> {
        let table_ident = ident(table)?;

        let sql = if record.is_empty() {
            format!(
                "INSERT INTO {} AS alvo DEFAULT VALUES RETURNING to_jsonb(alvo)",
                table_ident
            )
        } else {
            let columns = record
                .keys()
                .map(|c| ident(c))
                .collect::<Result<Vec<_>, _>>()?;
            let source = columns
                .iter()
                .map(|c| format!("r.{}", c))
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "INSERT INTO {t} AS alvo ({cols}) SELECT {src} FROM jsonb_populate_record(NULL::{t}, $1) AS r RETURNING to_jsonb(alvo)",
                t = table_ident,
                cols = columns.join(", "),
                src = source,
            )
        };

        let mut query = sqlx::query_scalar::<_, Json<Record>>(&sql);
        if !record.is_empty() {
            query = query.bind(Json(record));
        }

        let Json(created) = query.fetch_one(&self.pool).await.map_err(classify)?;
        Ok(created)
    }

    async fn update(
        &self,
        table: &str,
        filter: &Filter,
        fields: Record,
    ) -> Result<Vec<Record>, RemoteError> {
        if fields.is_empty() {
            return self.select(table, filter).await;
        }

        let table_ident = ident(table)?;
        let assignments = fields
            .keys()
            .map(|c| ident(c).map(|c| format!("{c} = r.{c}")))
            .collect::<Result<Vec<_>, _>>()?;

        let (condition, binds) = where_clause(filter, 2);
        let sql = format!(
            "UPDATE {t} AS alvo SET {set} FROM jsonb_populate_record(NULL::{t}, $1) AS r WHERE {cond} RETURNING to_jsonb(alvo)",
            t = table_ident,
            set = assignments.join(", "),
            cond = condition,
        );

        let query = sqlx::query_scalar::<_, Json<Record>>(&sql).bind(Json(fields));
        let rows = bind_all(query, binds)
            .fetch_all(&self.pool)
            .await
            .map_err(classify)?;

        Ok(rows.into_iter().map(|Json(r)| r).collect())
    }

    async fn delete(&self, table: &str, filter: &Filter) -> Result<Vec<Record>, RemoteError> {
        let (condition, binds) = where_clause(filter, 1);
        let sql = format!(
            "DELETE FROM {} AS alvo WHERE {} RETURNING to_jsonb(alvo)",
            ident(table)?,
            condition
        );

        let rows = bind_all(sqlx::query_scalar::<_, Json<Record>>(&sql), binds)
            .fetch_all(&self.pool)
            .await
            .map_err(classify)?;

        Ok(rows.into_iter().map(|Json(r)| r).collect())
    }

    async fn missing_columns(
        &self,
        table: &str,
        columns: &[String],
    ) -> Result<Vec<String>, RemoteError> {
        let existing: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT column_name::text
            FROM information_schema.columns
            WHERE table_schema = 'public' AND table_name = $1
            "#,
        )
        .bind(table)
        .fetch_all(&self.pool)
        .await
        .map_err(classify)?;

        if existing.is_empty() {
            return Err(RemoteError::Schema(format!("tabela '{}' não existe", table)));
        }

        Ok(columns
            .iter()
            .filter(|c| !existing.contains(c))
            .cloned()
            .collect())
    }
}
