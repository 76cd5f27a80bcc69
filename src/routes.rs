// routes.rs - Router assembly and shared handler state

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{get, patch, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::auth::{AuthError, TokenIssuer};
use crate::config::{AdmissionConfig, AppConfig};
use crate::database::Store;
use crate::handlers::{protected, public};
use crate::media::{MediaStorage, BYTES_PER_MB, MEDIA_URL_PREFIX};
use crate::middleware::jwt_auth_middleware;

/// Everything a handler needs, cloned per request
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub tokens: TokenIssuer,
    pub media: MediaStorage,
    pub admission: Arc<AdmissionConfig>,
    pub bcrypt_cost: u32,
}

impl AppState {
    pub fn new(config: &AppConfig, store: Arc<dyn Store>) -> Result<Self, AuthError> {
        Ok(Self {
            store,
            tokens: TokenIssuer::from_config(&config.security)?,
            media: MediaStorage::new(&config.media),
            admission: Arc::new(config.admission.clone()),
            bcrypt_cost: config.security.bcrypt_cost,
        })
    }
}

pub fn app(state: AppState, config: &AppConfig) -> Router {
    let media_dir = ServeDir::new(state.media.root());
    let media_path = format!("/{}", MEDIA_URL_PREFIX);

    let router = Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .merge(public_routes())
        // Protected
        .merge(protected_routes(state.clone()))
        // Uploaded files
        .nest_service(&media_path, media_dir)
        // Global middleware
        .layer(DefaultBodyLimit::max(config.media.max_request_mb * BYTES_PER_MB))
        .layer(cors_layer(&config.security.cors_origins));

    let router = if config.server.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    };

    router.with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        // Accounts and tokens
        .route("/users/register", post(public::register_post))
        .route("/users/login", post(public::login_post))
        // Catalog reads
        .route("/country", get(public::country_list))
        .route("/country/:id", get(public::country_get))
        .route("/country/:id/university", get(public::country_universities))
        .route("/university", get(public::university_list))
        .route("/university/:id", get(public::university_get))
        .route("/university/:id/course", get(public::university_courses))
        .route("/course", get(public::course_list))
        .route("/course/:id", get(public::course_get))
        // Student self-service
        .route("/student/admission-application", post(public::student_application_post))
        .route(
            "/student/application-documents/:id/upload",
            post(public::student_documents_upload),
        )
}

fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Catalog management
        .route("/country", post(protected::country_post))
        .route(
            "/country/:id",
            patch(protected::country_patch).delete(protected::country_delete),
        )
        .route("/university", post(protected::university_post))
        .route(
            "/university/:id",
            patch(protected::university_patch).delete(protected::university_delete),
        )
        .route("/university/:id/upload-image", post(protected::university_image_upload))
        .route("/course", post(protected::course_post))
        .route(
            "/course/:id",
            patch(protected::course_patch).delete(protected::course_delete),
        )
        .route("/course/:id/upload-image", post(protected::course_image_upload))
        // Agent applications
        .route(
            "/agent/admission-application",
            get(protected::agent_application_list).post(protected::agent_application_post),
        )
        .route(
            "/agent/admission-application/:id",
            get(protected::agent_application_get)
                .patch(protected::agent_application_patch)
                .delete(protected::agent_application_delete),
        )
        .route(
            "/agent/application-documents/:id/upload",
            post(protected::agent_documents_upload),
        )
        .route("/agent/commission/:id", patch(protected::commission_patch))
        // Student application review
        .route(
            "/student/admission-application",
            get(protected::student_application_list),
        )
        .route(
            "/student/admission-application/:id",
            get(protected::student_application_get)
                .patch(protected::student_application_patch)
                .delete(protected::student_application_delete),
        )
        // Users and profiles
        .route("/users/me", get(protected::me_get))
        .route("/users/admin/register", post(protected::admin_register_post))
        .route("/users/admin/:id", axum::routing::delete(protected::admin_delete))
        .route("/users/agents", get(protected::agent_list))
        .route(
            "/users/agents/:id",
            get(protected::agent_get)
                .patch(protected::agent_patch)
                .delete(protected::agent_delete),
        )
        .route("/users/:id", axum::routing::delete(protected::user_delete))
        .route(
            "/users/:id/profile",
            get(protected::profile_get)
                .post(protected::profile_post)
                .patch(protected::profile_patch)
                .delete(protected::profile_delete),
        )
        .route(
            "/users/:id/profile/upload-file",
            post(protected::profile_file_upload).delete(protected::profile_file_delete),
        )
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(Any)
        .allow_headers(Any)
}
