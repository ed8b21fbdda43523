use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use sea_orm::DatabaseConnection;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::config::Config;
use crate::controllers::AppState;
use crate::error::AerodeskError;
use crate::module::{AuthModule, Module};
use crate::openapi::ApiDoc;
use crate::rbac::RbacService;
use crate::seeders::DatabaseSeeder;

const OPENAPI_JSON_PATH: &str = "/api-docs/openapi.json";

/// The AeroDesk application: configuration, database and mounted modules.
pub struct App {
    pub config: Config,
    pub db: DatabaseConnection,
    pub rbac: RbacService,
    modules: Vec<Box<dyn Module>>,
}

impl App {
    /// Load configuration from the environment, connect and migrate.
    pub async fn new() -> Result<Self, AerodeskError> {
        let config = Config::from_env()?;
        Self::with_config(config).await
    }

    /// Connect with the given config and run pending migrations.
    pub async fn with_config(config: Config) -> Result<Self, AerodeskError> {
        let app = Self::connect(config).await?;
        app.run_migrations().await?;
        Ok(app)
    }

    /// Connect without touching the schema.
    pub async fn connect(config: Config) -> Result<Self, AerodeskError> {
        let db = crate::db::connect(&config).await?;
        let rbac = RbacService::with_cache_ttl(config.rbac_cache_ttl());
        let auth = AuthModule::with_prefix(config.api_prefix.clone());

        Ok(App {
            config,
            db,
            rbac,
            modules: vec![Box::new(auth)],
        })
    }

    /// Mount an additional feature module.
    pub fn mount_module(mut self, module: impl Module + 'static) -> Self {
        self.modules.push(Box::new(module));
        self
    }

    /// Run every mounted module's migrations.
    pub async fn run_migrations(&self) -> Result<(), AerodeskError> {
        tracing::info!("Running pending database migrations...");
        for module in &self.modules {
            module.migrate(&self.db).await?;
            tracing::debug!(module = module.name(), "module migrated");
        }
        tracing::info!("Migrations complete.");
        Ok(())
    }

    /// Seed roles and permissions.
    pub async fn seed(&self) -> Result<(), AerodeskError> {
        DatabaseSeeder::default().run(&self.db, &self.rbac).await
    }

    pub fn state(&self) -> AppState {
        AppState {
            db: self.db.clone(),
            config: Arc::new(self.config.clone()),
            rbac: self.rbac.clone(),
        }
    }

    /// The merged OpenAPI document of every mounted module.
    pub fn openapi(&self) -> utoipa::openapi::OpenApi {
        let mut doc = ApiDoc::openapi();
        for spec in self.modules.iter().filter_map(|m| m.openapi_spec()) {
            doc.merge(spec);
        }
        doc
    }

    /// Build the Axum router.
    pub fn router(&self) -> Router {
        let state = self.state();
        let is_dev = self.config.is_dev();

        let mut app_routes: Router<AppState> = Router::new();
        for module in &self.modules {
            app_routes = app_routes.merge(module.routes(&state));
        }

        let openapi_spec = self.openapi();
        let mut router = app_routes
            .with_state(state.clone())
            .route(
                OPENAPI_JSON_PATH,
                get(move || {
                    let spec = openapi_spec.clone();
                    async move { axum::Json(spec) }
                }),
            )
            .layer(axum::Extension(state.config))
            .layer(CorsLayer::permissive());

        // Only add tracing/request-id middleware in development mode.
        if is_dev {
            use tower_http::LatencyUnit;
            use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse};

            let x_request_id = axum::http::HeaderName::from_static("x-request-id");
            router = router
                .layer(SetRequestIdLayer::new(
                    x_request_id.clone(),
                    MakeRequestUuid,
                ))
                .layer(PropagateRequestIdLayer::new(x_request_id))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(tracing::Level::INFO))
                        .on_request(DefaultOnRequest::new().level(tracing::Level::INFO))
                        .on_response(
                            DefaultOnResponse::new()
                                .level(tracing::Level::INFO)
                                .latency_unit(LatencyUnit::Millis),
                        ),
                );
        }

        router
    }

    /// Serve until Ctrl+C.
    pub async fn run(self) -> Result<(), AerodeskError> {
        let addr = self.config.server_addr();
        let router = self.router();

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| AerodeskError::Internal(format!("Failed to bind {addr}: {e}")))?;

        tracing::info!(
            prefix = %self.config.api_prefix,
            docs = OPENAPI_JSON_PATH,
            "AeroDesk server running on http://{}",
            addr
        );

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| AerodeskError::Internal(format!("Server error: {e}")))
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl+C");
    }
    tracing::info!("Shutting down AeroDesk server...");
}
