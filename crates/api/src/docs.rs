// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! `OpenAPI` document aggregated from the handler annotations

use api_client::ProviderJoke;
use joke_store::{Joke, JokeId, JokeUpdate, NewJoke};
use shared_types::JokeSource;
use utoipa::OpenApi;

use crate::{
    config::Environment,
    error::ErrorBody,
    routes::{handlers, jokes},
    state::{HealthCheck, HealthStatus, StoreHealth},
};

/// `OpenAPI` description of every public route
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Jokes API",
        description = "Chistes de Chuck Norris, Dad Jokes y chistes propios",
    ),
    paths(
        handlers::health_handler,
        jokes::get_joke,
        jokes::create_joke,
        jokes::get_joke_by_id,
        jokes::update_joke,
        jokes::delete_joke,
        jokes::count_jokes,
        jokes::jokes_by_rating,
        jokes::list_jokes,
    ),
    components(schemas(
        Joke,
        JokeId,
        NewJoke,
        JokeUpdate,
        ProviderJoke,
        JokeSource,
        jokes::JokePayload,
        jokes::DeletedJoke,
        ErrorBody,
        HealthCheck,
        HealthStatus,
        StoreHealth,
        Environment,
    )),
    tags(
        (name = "jokes", description = "Chistes"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;
