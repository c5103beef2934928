/// Application state and router builder
///
/// Builds the shared state (pool, config, services — all constructed
/// once, dependencies injected) and the Axum router. The route tree
/// splits into a public group (health, register, login, refresh) and an
/// authenticated group behind the access-token middleware, which accepts
/// the bearer header or the HTTP-only cookie and re-checks ban status on
/// every request.

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use crewdesk_shared::auth::middleware::create_auth_middleware;
use crewdesk_shared::auth::rbac::AccessControl;
use crewdesk_shared::auth::session::SessionStore;
use crewdesk_shared::auth::tokens::TokenManager;
use crewdesk_shared::events::{NoopPublisher, PgNotifier};
use crewdesk_shared::services::{AuthService, ProjectService, TaskService, WorkspaceService};
use sqlx::PgPool;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::config::Config;

/// Shared application state
///
/// Cloned per request via Axum's `State` extractor; the services are
/// cheap clones over the same pool.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Token manager (shared with the auth middleware)
    pub tokens: TokenManager,

    /// Role resolver, for read-path checks in handlers
    pub access: AccessControl,

    /// Authentication flows
    pub auth: AuthService,

    /// Workspace flows
    pub workspaces: WorkspaceService,

    /// Project flows
    pub projects: ProjectService,

    /// Task flows
    pub tasks: TaskService,
}

impl AppState {
    /// Wires up every service from the pool and configuration
    pub fn new(db: PgPool, config: Config) -> Self {
        let tokens = TokenManager::new(
            &config.auth.access_token_secret,
            &config.auth.refresh_token_secret,
        );
        let sessions = SessionStore::new(db.clone(), config.auth.session_hash_pepper.clone());
        let access = AccessControl::new(db.clone());

        let auth = AuthService::new(db.clone(), tokens.clone(), sessions);
        let workspaces = WorkspaceService::new(db.clone(), access.clone());
        let projects = ProjectService::new(db.clone(), access.clone());
        let tasks = TaskService::new(
            db.clone(),
            access.clone(),
            Arc::new(PgNotifier),
            Arc::new(NoopPublisher),
        );

        Self {
            db,
            config: Arc::new(config),
            tokens,
            access,
            auth,
            workspaces,
            projects,
            tasks,
        }
    }
}

/// Builds the complete Axum router
///
/// # Routes
///
/// ```text
/// /
/// ├── /health                                  # public
/// └── /v1/
///     ├── /auth/
///     │   ├── POST /register                   # public
///     │   ├── POST /login                      # public
///     │   ├── POST /refresh                    # public (refresh token in body)
///     │   ├── POST /logout                     # public (idempotent)
///     │   ├── POST /logout-all                 # authenticated
///     │   └── PUT  /password                   # authenticated
///     ├── /workspaces/                         # authenticated
///     │   ├── POST /                           # create workspace
///     │   ├── GET  /                           # list own workspaces
///     │   ├── POST /:id/members                # add member
///     │   ├── PUT  /:id/members/:user_id       # update member role
///     │   ├── DELETE /:id/members/:user_id     # remove member
///     │   └── POST /:id/projects               # create project
///     ├── /projects/                           # authenticated
///     │   ├── POST /:id/members                # add member
///     │   ├── PUT  /:id/members/:user_id       # update member role
///     │   ├── POST /:id/tasks                  # create task
///     │   └── GET  /:id/tasks                  # list tasks
///     └── /tasks/
///         └── PUT  /:id                        # update task
/// ```
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Public auth endpoints: the credential is in the request body.
    let public_auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh))
        .route("/logout", post(routes::auth::logout));

    let auth_layer = middleware::from_fn(create_auth_middleware(
        state.db.clone(),
        state.tokens.clone(),
    ));

    let protected_auth_routes = Router::new()
        .route("/logout-all", post(routes::auth::logout_all))
        .route("/password", put(routes::auth::change_password))
        .layer(auth_layer.clone());

    let workspace_routes = Router::new()
        .route("/", post(routes::workspaces::create_workspace))
        .route("/", get(routes::workspaces::list_workspaces))
        .route("/:workspace_id/members", post(routes::workspaces::add_member))
        .route(
            "/:workspace_id/members/:user_id",
            put(routes::workspaces::update_member_role)
                .delete(routes::workspaces::remove_member),
        )
        .route(
            "/:workspace_id/projects",
            post(routes::projects::create_project).get(routes::projects::list_projects),
        )
        .layer(auth_layer.clone());

    let project_routes = Router::new()
        .route("/:project_id/members", post(routes::projects::add_member))
        .route(
            "/:project_id/members/:user_id",
            put(routes::projects::update_member_role),
        )
        .route(
            "/:project_id/tasks",
            post(routes::tasks::create_task).get(routes::tasks::list_tasks),
        )
        .layer(auth_layer.clone());

    let task_routes = Router::new()
        .route("/:task_id", put(routes::tasks::update_task))
        .layer(auth_layer);

    let v1_routes = Router::new()
        .nest("/auth", public_auth_routes.merge(protected_auth_routes))
        .nest("/workspaces", workspace_routes)
        .nest("/projects", project_routes)
        .nest("/tasks", task_routes);

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}
