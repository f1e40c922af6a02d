// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Server implementation module
//!
//! This module provides the main server struct and implementation for the jokes API
//! server, including wiring of the providers and the joke store, router configuration,
//! and coordinated graceful shutdown using `CancellationToken`.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    BoxError, Router, error_handling::HandleErrorLayer, http::HeaderName,
    middleware as axum_middleware,
};
use external_apis::{
    ChuckNorrisClient, ChuckNorrisConfig, DadJokeClient, DadJokeConfig, ProviderRegistry,
};
use hyper::Request;
use joke_store::{InMemoryJokeStore, JokeStore, JsonFileJokeStore};
use tokio::{net::TcpListener, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tower::{
    ServiceBuilder,
    timeout::{TimeoutLayer, error::Elapsed},
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{error, info, info_span, warn};

use crate::{
    config::{ProviderConfig, ServerConfig, StoreBackend},
    error::{ServerError, ServerResult},
    metrics::http_metrics_middleware,
    middleware::RateLimiter,
    routes::create_routes,
    state::ServerState,
};

// Server constants
const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");
const DEFAULT_GRACEFUL_SHUTDOWN_TIMEOUT_SECONDS: u64 = 30;
const DEFAULT_FORCE_SHUTDOWN_TIMEOUT_SECONDS: u64 = 5;

/// Configuration for server shutdown behavior
#[derive(Debug, Clone)]
pub struct ShutdownConfig {
    /// Maximum time to wait for graceful shutdown before forcing termination
    pub graceful_timeout: Duration,
    /// Maximum time to wait for all tasks to complete after graceful shutdown
    pub force_timeout: Duration,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            graceful_timeout: Duration::from_secs(DEFAULT_GRACEFUL_SHUTDOWN_TIMEOUT_SECONDS),
            force_timeout: Duration::from_secs(DEFAULT_FORCE_SHUTDOWN_TIMEOUT_SECONDS),
        }
    }
}

/// Main server struct
#[derive(Debug)]
pub struct Server {
    /// Server configuration
    config: ServerConfig,
    /// Application router
    router: Router,
    /// Server state
    state: ServerState,
    /// Cancellation token for coordinated shutdown
    cancellation_token: CancellationToken,
    /// Configuration for coordinated shutdown
    graceful_shutdown_config: ShutdownConfig,
}

impl Server {
    /// Create a new server, building the providers and the joke store from configuration
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Config` if a provider cannot be configured or the
    /// file store cannot be loaded.
    pub async fn new(config: ServerConfig, shutdown_config: ShutdownConfig) -> ServerResult<Self> {
        let providers = Self::create_provider_registry(&config)?;
        let store = Self::create_store(&config).await?;
        Self::with_dependencies(config, shutdown_config, Arc::new(providers), store)
    }

    /// Create the provider registry from server configuration
    fn create_provider_registry(config: &ServerConfig) -> ServerResult<ProviderRegistry> {
        let chuck_norris = &config.external_apis.chuck_norris;
        let chuck_norris_client = if chuck_norris.enabled {
            let client = ChuckNorrisClient::new(chuck_norris_config(chuck_norris)?)
                .map_err(|e| provider_config_error("chuck_norris", &e.to_string()))?;
            Some(client)
        } else {
            info!("Chuck Norris provider disabled");
            None
        };

        let dad_joke = &config.external_apis.dad_joke;
        let dad_joke_client = if dad_joke.enabled {
            let client = DadJokeClient::new(dad_joke_config(dad_joke)?)
                .map_err(|e| provider_config_error("dad_joke", &e.to_string()))?;
            Some(client)
        } else {
            info!("Dad Joke provider disabled");
            None
        };

        Ok(ProviderRegistry::with_clients(
            chuck_norris_client,
            dad_joke_client,
        ))
    }

    /// Open the configured joke store backend
    async fn create_store(config: &ServerConfig) -> ServerResult<Arc<dyn JokeStore>> {
        let store: Arc<dyn JokeStore> = match config.store.backend {
            StoreBackend::Memory => Arc::new(InMemoryJokeStore::new()),
            StoreBackend::File => {
                let store = JsonFileJokeStore::open(config.store.path.clone())
                    .await
                    .map_err(|e| ServerError::Config {
                        message: format!(
                            "failed to open joke store at {}: {e}",
                            config.store.path.display()
                        ),
                    })?;
                Arc::new(store)
            }
        };

        info!(backend = store.backend(), "joke store ready");
        Ok(store)
    }

    /// Create server with injected providers and store
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Config` if the configuration is invalid.
    pub fn with_dependencies(
        config: ServerConfig,
        graceful_shutdown_config: ShutdownConfig,
        providers: Arc<ProviderRegistry>,
        store: Arc<dyn JokeStore>,
    ) -> ServerResult<Self> {
        let cancellation_token = CancellationToken::new();
        let state = ServerState::new(
            config.clone(),
            providers,
            store,
            cancellation_token.child_token(),
        );
        let router = Self::create_router(state.clone());

        Ok(Self {
            config,
            router,
            state,
            cancellation_token,
            graceful_shutdown_config,
        })
    }

    /// Create application router with middleware
    fn create_router(state: ServerState) -> Router {
        let timeout_duration = state.config().timeout_seconds.value();
        let timeout_seconds = state.config().timeout_seconds.as_secs();

        let rate_limiter = RateLimiter::new(state.config().rate_limiting.clone());

        let middleware = ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(REQUEST_ID_HEADER, MakeRequestUuid))
            .layer(
                TraceLayer::new_for_http().make_span_with(|req: &Request<_>| {
                    if let Some(request_id) = req.headers().get(REQUEST_ID_HEADER) {
                        info_span!("http_request", ?request_id, method = %req.method(), uri = %req.uri())
                    } else {
                        error!("failed to extract id from request");
                        info_span!("http_request", request_id = "unknown")
                    }
                }),
            )
            .layer(PropagateRequestIdLayer::new(REQUEST_ID_HEADER))
            .layer(CorsLayer::permissive())
            .layer(HandleErrorLayer::new(move |err: BoxError| async move {
                if err.is::<Elapsed>() {
                    warn!(timeout_seconds, "request timed out");
                    ServerError::Timeout { timeout_seconds }
                } else {
                    ServerError::Internal {
                        message: err.to_string(),
                    }
                }
            }))
            .layer(TimeoutLayer::new(timeout_duration));

        create_routes(rate_limiter)
            .route_layer(axum_middleware::from_fn(http_metrics_middleware))
            .layer(middleware)
            .with_state(state)
    }

    /// Bind the configured address
    async fn bind(&self) -> ServerResult<(TcpListener, SocketAddr)> {
        let addr = self.config.socket_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind {
                address: addr,
                source,
            })?;

        let actual_addr = listener
            .local_addr()
            .map_err(|source| ServerError::Startup { source })?;

        Ok((listener, actual_addr))
    }

    /// Run the server with coordinated graceful shutdown
    ///
    /// Once the cancellation token fires, open connections get
    /// `graceful_timeout` to finish before the server task is aborted.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Bind` if unable to bind to the configured address,
    /// `ServerError::Shutdown` if serving fails, or `ServerError::Timeout` if the
    /// aborted server task does not stop within `force_timeout`.
    pub async fn run(self) -> ServerResult<()> {
        let (listener, actual_addr) = self.bind().await?;

        info!(
            address = %actual_addr,
            environment = %self.config.environment,
            store = self.state.store().backend(),
            providers = ?self.state.providers().get_client_names(),
            "jokes API server starting",
        );

        let Self {
            router,
            cancellation_token,
            graceful_shutdown_config,
            ..
        } = self;

        let shutdown_token = cancellation_token.clone();
        tokio::spawn(async move {
            info!("spawning the graceful shutdown task");
            Self::shutdown_signal_handler(shutdown_token).await;
        });

        let serve_token = cancellation_token.clone();
        let server = tokio::spawn(async move {
            axum::serve(
                listener,
                router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .with_graceful_shutdown(async move {
                serve_token.cancelled().await;
                info!("jokes API server shutting down");
            })
            .await
        });

        drain(server, &cancellation_token, &graceful_shutdown_config).await
    }

    /// Handle shutdown signals and trigger coordinated cancellation
    ///
    /// This function listens for SIGINT (Ctrl+C) and SIGTERM signals,
    /// and cancels the provided cancellation token when received.
    async fn shutdown_signal_handler(cancellation_token: CancellationToken) {
        let signal_received = async {
            #[cfg(unix)]
            #[allow(clippy::expect_used)]
            {
                use tokio::signal::unix::{SignalKind, signal};

                let mut sigterm =
                    signal(SignalKind::terminate()).expect("Failed to register SIGTERM handler");
                let mut sigint =
                    signal(SignalKind::interrupt()).expect("Failed to register SIGINT handler");

                tokio::select! {
                    _ = sigterm.recv() => {
                        warn!("Received SIGTERM signal, initiating coordinated shutdown");
                        "SIGTERM"
                    },
                    _ = sigint.recv() => {
                        warn!("Received SIGINT signal, initiating coordinated shutdown");
                        "SIGINT"
                    },
                }
            }

            #[cfg(not(unix))]
            #[allow(clippy::expect_used)]
            {
                tokio::signal::ctrl_c()
                    .await
                    .expect("Failed to install CTRL+C signal handler");
                warn!("Received CTRL+C signal, initiating coordinated shutdown");
                "CTRL+C"
            }
        };

        tokio::select! {
            signal_name = signal_received => {
                warn!("Shutdown signal {} received, cancelling all operations...", signal_name);
                cancellation_token.cancel();
            },
            () = cancellation_token.cancelled() => {
                warn!("Cancellation token already cancelled, shutdown signal handler exiting");
            }
        }
    }

    /// Returns a clone of the cancellation token for coordinated shutdown
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation_token.clone()
    }

    /// Initiates graceful shutdown by cancelling the server's cancellation token
    pub fn shutdown(&self) {
        info!("programmatic shutdown requested");
        self.cancellation_token.cancel();
    }

    /// Run server for testing, returns the bound address
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Bind` if unable to bind to the configured address.
    pub async fn run_for_testing(self) -> ServerResult<(SocketAddr, CancellationToken)> {
        let (listener, actual_addr) = self.bind().await?;

        let token = self.cancellation_token.child_token();
        let task = token.child_token();
        tokio::spawn(async move {
            let _ = axum::serve(
                listener,
                self.router
                    .into_make_service_with_connect_info::<SocketAddr>(),
            )
            .with_graceful_shutdown(async move { task.cancelled().await })
            .await;
        });

        Ok((actual_addr, token))
    }

    /// Get server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get server state for testing
    pub fn state(&self) -> &ServerState {
        &self.state
    }
}

/// Wait for the server task, bounding the drain that follows cancellation
async fn drain(
    mut server: JoinHandle<std::io::Result<()>>,
    cancellation_token: &CancellationToken,
    shutdown_config: &ShutdownConfig,
) -> ServerResult<()> {
    let finished = tokio::select! {
        result = &mut server => Some(result),
        () = cancellation_token.cancelled() => None,
    };

    let result = if let Some(result) = finished {
        result
    } else if let Ok(result) =
        tokio::time::timeout(shutdown_config.graceful_timeout, &mut server).await
    {
        result
    } else {
        warn!(
            graceful_timeout = ?shutdown_config.graceful_timeout,
            "graceful shutdown timed out, aborting open connections"
        );
        server.abort();
        tokio::time::timeout(shutdown_config.force_timeout, server)
            .await
            .map_err(|_| ServerError::Timeout {
                timeout_seconds: shutdown_config.force_timeout.as_secs(),
            })?
    };

    match result {
        Ok(Ok(())) => {
            info!("jokes API server shut down gracefully");
            Ok(())
        }
        Ok(Err(source)) => {
            error!(error = ?source, "Server error during shutdown");
            Err(ServerError::Shutdown { source })
        }
        Err(join_error) if join_error.is_cancelled() => {
            warn!("jokes API server stopped after forced shutdown");
            Ok(())
        }
        Err(join_error) => Err(join_error.into()),
    }
}

fn chuck_norris_config(provider: &ProviderConfig) -> ServerResult<ChuckNorrisConfig> {
    ChuckNorrisConfig::new(
        provider.base_url.as_str(),
        provider.timeout_seconds.as_secs(),
        provider.health_check_timeout_seconds.as_secs(),
    )
    .map_err(|message| provider_config_error("chuck_norris", &message))
}

fn dad_joke_config(provider: &ProviderConfig) -> ServerResult<DadJokeConfig> {
    DadJokeConfig::new(
        provider.base_url.as_str(),
        provider.timeout_seconds.as_secs(),
        provider.health_check_timeout_seconds.as_secs(),
    )
    .map_err(|message| provider_config_error("dad_joke", &message))
}

fn provider_config_error(provider: &str, message: &str) -> ServerError {
    ServerError::Config {
        message: format!("invalid {provider} provider configuration: {message}"),
    }
}
