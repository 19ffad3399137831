// src/handlers/entities.rs
//
// CRUD administrativo genérico: o mesmo conjunto de rotas para cada entidade,
// sempre passando pelo adaptador da fachada.

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::{
    common::error::AppError,
    config::AppState,
    db::{Filter, Record},
    entities::{Entity, Identifier},
};

// Gerados pelo servidor; nunca aceitos no corpo
const GENERATED: [&str; 3] = ["id", "created_at", "updated_at"];

pub fn routes<T>() -> Router<AppState>
where
    T: Entity + Serialize,
{
    Router::new()
        .route("/", get(list::<T>).post(create::<T>))
        .route(
            "/{id}",
            get(get_one::<T>).patch(update::<T>).delete(remove::<T>),
        )
}

// GET /api/admin/{entidade}?coluna=valor
async fn list<T>(
    State(app_state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<T>>, AppError>
where
    T: Entity + Serialize,
{
    if let Some(unknown) = params.keys().find(|k| !T::COLUMNS.contains(&k.as_str())) {
        return Err(AppError::Validation(format!("Filtro desconhecido: '{}'.", unknown)));
    }

    let rows = T::adapter(&app_state.entities)
        .filter(&Filter::from_pairs(params))
        .await?;
    Ok(Json(rows))
}

async fn get_one<T>(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<T>, AppError>
where
    T: Entity + Serialize,
{
    let adapter = T::adapter(&app_state.entities);
    let row = adapter
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} '{}'", adapter.table(), id)))?;
    Ok(Json(row))
}

async fn create<T>(
    State(app_state): State<AppState>,
    Json(fields): Json<Record>,
) -> Result<impl IntoResponse, AppError>
where
    T: Entity + Serialize,
{
    let fields = writable_fields::<T>(fields)?;
    let row = T::adapter(&app_state.entities).create(&fields).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

async fn update<T>(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    Json(fields): Json<Record>,
) -> Result<Json<T>, AppError>
where
    T: Entity + Serialize,
{
    let fields = writable_fields::<T>(fields)?;
    if fields.is_empty() {
        return Err(AppError::Validation("Nenhum campo para atualizar.".to_string()));
    }

    let row = T::adapter(&app_state.entities)
        .update(&Identifier::Id(id), &fields)
        .await?;
    Ok(Json(row))
}

async fn remove<T>(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError>
where
    T: Entity + Serialize,
{
    T::adapter(&app_state.entities).delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Só colunas conhecidas da entidade, sem os campos gerados.
fn writable_fields<T: Entity>(mut fields: Record) -> Result<Record, AppError> {
    for generated in GENERATED {
        fields.remove(generated);
    }
    if let Some(unknown) = fields.keys().find(|k| !T::COLUMNS.contains(&k.as_str())) {
        return Err(AppError::Validation(format!("Campo desconhecido: '{}'.", unknown)));
    }
    Ok(fields)
}
