// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Joke endpoints
//!
//! `GET /api/joke?type=…` dispatches to an external provider or the local store
//! depending on the requested [`JokeSource`]. The remaining routes map one verb
//! and path onto one [`JokeStore`](joke_store::JokeStore) operation each.

use std::{collections::BTreeMap, time::Instant};

use api_client::ProviderJoke;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use external_apis::RegistryError;
use joke_store::{Joke, JokeId, JokeUpdate, NewJoke, StoreResult};
use serde::{Deserialize, Serialize};
use shared_types::JokeSource;
use tracing::{debug, info, warn};
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::{ErrorBody, ServerError},
    extractors::{JsonExtractor, QueryExtractor},
    metrics,
    state::ServerState,
};

/// Message returned for `type=Propio` while the store is empty
pub const NO_JOKES_YET: &str = "Aún no hay chistes, cree uno!";
/// Message returned when no joke has the requested rating
pub const NO_JOKES_WITH_RATING: &str = "No hay chistes con este puntaje";
/// Message returned after a successful delete
pub const JOKE_DELETED: &str = "Chiste eliminado";

/// Routes served under `/api`
pub fn joke_routes() -> Router<ServerState> {
    Router::new()
        .route("/joke", get(get_joke).post(create_joke))
        .route("/joke/count", get(count_jokes))
        .route("/joke/rating", get(jokes_by_rating))
        .route(
            "/joke/{id}",
            get(get_joke_by_id).put(update_joke).delete(delete_joke),
        )
        .route("/jokes", get(list_jokes))
}

/// Query parameters of the joke dispatcher
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct JokeTypeQuery {
    /// Joke type: `Chuck`, `Dad Joke` or `Propio`
    #[serde(rename = "type")]
    #[param(example = "Chuck")]
    pub joke_type: Option<String>,
}

/// Query parameters of the rating filter
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RatingQuery {
    /// Rating to match exactly
    #[param(example = "4.5")]
    pub rating: Option<String>,
}

/// A joke tagged with the source that produced it
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "source")]
pub enum JokePayload {
    /// Chuck Norris fact
    #[serde(rename = "Chuck")]
    Chuck(ProviderJoke),
    /// Dad joke
    #[serde(rename = "Dad Joke")]
    DadJoke(ProviderJoke),
    /// Locally stored joke
    #[serde(rename = "Propio")]
    Own(Joke),
}

impl JokePayload {
    /// Source the payload is tagged with
    pub fn source(&self) -> JokeSource {
        match self {
            Self::Chuck(_) => JokeSource::Chuck,
            Self::DadJoke(_) => JokeSource::DadJoke,
            Self::Own(_) => JokeSource::Own,
        }
    }

    /// Tag a provider joke, refusing one that came back under another source
    fn from_provider(requested: JokeSource, joke: ProviderJoke) -> Result<Self, ServerError> {
        match (requested, joke.source) {
            (JokeSource::Chuck, JokeSource::Chuck) => Ok(Self::Chuck(joke)),
            (JokeSource::DadJoke, JokeSource::DadJoke) => Ok(Self::DadJoke(joke)),
            (requested, served) => {
                warn!(
                    requested = requested.label(),
                    served = served.label(),
                    "provider returned a joke of another source"
                );
                Err(ServerError::Internal {
                    message: format!(
                        "expected a {requested} joke from the provider but got a {served} joke"
                    ),
                })
            }
        }
    }
}

/// Response of a successful delete
#[derive(Debug, Serialize, ToSchema)]
pub struct DeletedJoke {
    /// Confirmation message
    #[schema(example = "Chiste eliminado")]
    pub message: String,
    /// The joke that was removed
    pub joke: Joke,
}

fn parse_source(query: &JokeTypeQuery) -> Result<JokeSource, ServerError> {
    let raw = query
        .joke_type
        .as_deref()
        .ok_or_else(|| ServerError::InvalidParameter {
            message: "missing required query parameter 'type'. Supported types are: Chuck, Dad Joke, Propio".to_string(),
        })?;

    raw.parse().map_err(|e: shared_types::JokeSourceParseError| {
        ServerError::InvalidParameter {
            message: e.to_string(),
        }
    })
}

/// Ids that do not parse cannot exist in the store
fn parse_id(raw: &str) -> Result<JokeId, ServerError> {
    raw.parse().map_err(|_| {
        debug!(id = raw, "unparsable joke id");
        ServerError::joke_not_found()
    })
}

fn parse_rating(query: &RatingQuery) -> Result<f64, ServerError> {
    let raw = query
        .rating
        .as_deref()
        .ok_or_else(|| ServerError::InvalidParameter {
            message: "missing required query parameter 'rating'".to_string(),
        })?;

    match raw.trim().parse::<f64>() {
        Ok(rating) if rating.is_finite() => Ok(rating),
        _ => Err(ServerError::InvalidParameter {
            message: format!("rating must be a number, got '{raw}'"),
        }),
    }
}

/// Count a store operation outcome and hand the result back
fn observed<T>(operation: &str, result: StoreResult<T>) -> StoreResult<T> {
    metrics::record_store_operation(operation, result.is_ok());
    result
}

async fn fetch_external(state: &ServerState, source: JokeSource) -> Result<JokePayload, ServerError> {
    let start = Instant::now();
    let result = state.providers().fetch_joke(source).await;

    let outcome = match &result {
        Ok(_) => "ok",
        Err(RegistryError::Disabled { .. }) => "disabled",
        Err(e) if e.is_timeout() => "timeout",
        Err(_) => "error",
    };
    metrics::observe_provider_duration(source, outcome, start.elapsed().as_secs_f64());

    JokePayload::from_provider(source, result?)
}

/// Get a joke of the requested type
///
/// # Errors
///
/// `InvalidParameter` for a missing or unknown type, `NotFound` when no local joke
/// exists yet, and the provider errors for external types.
#[utoipa::path(
    get,
    path = "/api/joke",
    tag = "jokes",
    summary = "Obtiene un chiste",
    description = "Returns one joke from the Chuck Norris API, the Dad Joke API or the local store, depending on `type`.",
    params(JokeTypeQuery),
    responses(
        (status = 200, description = "Chiste obtenido", body = JokePayload),
        (status = 400, description = "Tipo de chiste no soportado", body = ErrorBody),
        (status = 404, description = "Aún no hay chistes", body = ErrorBody),
        (status = 502, description = "El proveedor externo falló", body = ErrorBody),
        (status = 503, description = "Proveedor deshabilitado", body = ErrorBody),
        (status = 504, description = "El proveedor externo no respondió a tiempo", body = ErrorBody)
    )
)]
pub async fn get_joke(
    State(state): State<ServerState>,
    QueryExtractor(query): QueryExtractor<JokeTypeQuery>,
) -> Result<Json<JokePayload>, ServerError> {
    let source = parse_source(&query)?;
    debug!(source = source.label(), "joke requested");

    let payload = match source {
        JokeSource::Chuck | JokeSource::DadJoke => fetch_external(&state, source).await?,
        JokeSource::Own => {
            let joke = observed("random", state.store().random().await)?.ok_or_else(|| {
                ServerError::NotFound {
                    message: NO_JOKES_YET.to_string(),
                }
            })?;
            JokePayload::Own(joke)
        }
    };

    metrics::inc_jokes_served(payload.source());
    Ok(Json(payload))
}

/// Create a local joke
///
/// # Errors
///
/// Every failure, validation or storage, is reported as a bad request.
#[utoipa::path(
    post,
    path = "/api/joke",
    tag = "jokes",
    summary = "Crea un chiste",
    request_body = NewJoke,
    responses(
        (status = 201, description = "Chiste creado exitosamente", body = Joke),
        (status = 400, description = "Error al crear el chiste", body = ErrorBody)
    )
)]
pub async fn create_joke(
    State(state): State<ServerState>,
    JsonExtractor(new_joke): JsonExtractor<NewJoke>,
) -> Result<(StatusCode, Json<Joke>), ServerError> {
    let joke = observed("create", state.store().create(new_joke).await)
        .map_err(|e| ServerError::rejected("Error al crear el chiste", &e))?;

    info!(id = %joke.id, "joke created");
    Ok((StatusCode::CREATED, Json(joke)))
}

/// Get a local joke by id
///
/// # Errors
///
/// `NotFound` for unknown or unparsable ids, `Internal` on store failure.
#[utoipa::path(
    get,
    path = "/api/joke/{id}",
    tag = "jokes",
    summary = "Obtiene un chiste por su id",
    params(("id" = String, Path, description = "Joke id")),
    responses(
        (status = 200, description = "Chiste encontrado", body = Joke),
        (status = 404, description = "Chiste no encontrado", body = ErrorBody),
        (status = 500, description = "Error en el almacenamiento", body = ErrorBody)
    )
)]
pub async fn get_joke_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Joke>, ServerError> {
    let id = parse_id(&id)?;
    let joke = observed("get", state.store().get(&id).await)?;
    Ok(Json(joke))
}

/// Update a local joke
///
/// # Errors
///
/// `NotFound` for unknown ids, a 400 error for invalid bodies, `Internal` on store failure.
#[utoipa::path(
    put,
    path = "/api/joke/{id}",
    tag = "jokes",
    summary = "Actualiza un chiste",
    params(("id" = String, Path, description = "Joke id")),
    request_body = JokeUpdate,
    responses(
        (status = 200, description = "Chiste actualizado exitosamente", body = Joke),
        (status = 400, description = "Datos inválidos", body = ErrorBody),
        (status = 404, description = "Chiste no encontrado", body = ErrorBody),
        (status = 500, description = "Error en el almacenamiento", body = ErrorBody)
    )
)]
pub async fn update_joke(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    JsonExtractor(update): JsonExtractor<JokeUpdate>,
) -> Result<Json<Joke>, ServerError> {
    let id = parse_id(&id)?;
    let joke = observed("update", state.store().update(&id, update).await)?;

    info!(%id, "joke updated");
    Ok(Json(joke))
}

/// Delete a local joke
///
/// # Errors
///
/// `NotFound` for unknown ids, `Internal` on store failure.
#[utoipa::path(
    delete,
    path = "/api/joke/{id}",
    tag = "jokes",
    summary = "Elimina un chiste",
    params(("id" = String, Path, description = "Joke id")),
    responses(
        (status = 200, description = "Chiste eliminado exitosamente", body = DeletedJoke),
        (status = 404, description = "Chiste no encontrado", body = ErrorBody),
        (status = 500, description = "Error en el almacenamiento", body = ErrorBody)
    )
)]
pub async fn delete_joke(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<DeletedJoke>, ServerError> {
    let id = parse_id(&id)?;
    let joke = observed("delete", state.store().delete(&id).await)?;

    info!(%id, "joke deleted");
    Ok(Json(DeletedJoke {
        message: JOKE_DELETED.to_string(),
        joke,
    }))
}

/// Count local jokes per category
///
/// # Errors
///
/// Store failures are reported as a bad request.
#[utoipa::path(
    get,
    path = "/api/joke/count",
    tag = "jokes",
    summary = "Cuenta los chistes por categoría",
    description = "Jokes without a category are counted under `uncategorized`.",
    responses(
        (status = 200, description = "Conteo de chistes", body = BTreeMap<String, usize>),
        (status = 400, description = "Error al obtener el conteo de chistes", body = ErrorBody)
    )
)]
pub async fn count_jokes(
    State(state): State<ServerState>,
) -> Result<Json<BTreeMap<String, usize>>, ServerError> {
    let counts = observed("count", state.store().count_by_category().await)
        .map_err(|e| ServerError::rejected("Error al obtener el conteo de chistes", &e))?;
    Ok(Json(counts))
}

/// List local jokes with the given rating
///
/// # Errors
///
/// `InvalidParameter` for a missing or non-numeric rating, `NotFound` when nothing
/// matches, `Internal` on store failure.
#[utoipa::path(
    get,
    path = "/api/joke/rating",
    tag = "jokes",
    summary = "Obtiene chistes por puntaje",
    params(RatingQuery),
    responses(
        (status = 200, description = "Chistes con el puntaje indicado", body = Vec<Joke>),
        (status = 400, description = "Puntaje inválido", body = ErrorBody),
        (status = 404, description = "No hay chistes con este puntaje", body = ErrorBody),
        (status = 500, description = "Error en el almacenamiento", body = ErrorBody)
    )
)]
pub async fn jokes_by_rating(
    State(state): State<ServerState>,
    QueryExtractor(query): QueryExtractor<RatingQuery>,
) -> Result<Json<Vec<Joke>>, ServerError> {
    let rating = parse_rating(&query)?;
    let jokes = observed("find_by_rating", state.store().find_by_rating(rating).await)?;

    if jokes.is_empty() {
        return Err(ServerError::NotFound {
            message: NO_JOKES_WITH_RATING.to_string(),
        });
    }
    Ok(Json(jokes))
}

/// List every local joke, oldest first
///
/// # Errors
///
/// `Internal` on store failure.
#[utoipa::path(
    get,
    path = "/api/jokes",
    tag = "jokes",
    summary = "Lista todos los chistes",
    responses(
        (status = 200, description = "Chistes almacenados", body = Vec<Joke>),
        (status = 500, description = "Error en el almacenamiento", body = ErrorBody)
    )
)]
pub async fn list_jokes(State(state): State<ServerState>) -> Result<Json<Vec<Joke>>, ServerError> {
    let jokes = observed("list", state.store().list().await)?;
    Ok(Json(jokes))
}
