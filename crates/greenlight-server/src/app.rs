//! The application: shared state plus request dispatch.

use std::sync::Arc;

use bytes::Bytes;
use http::{Request, Response};

use greenlight_config::GreenlightConfig;
use greenlight_data::MovieStore;
use greenlight_extract::ExtractionContext;

use crate::errors::ApiError;
use crate::handlers;
use crate::routes::{Endpoint, RouteOutcome, Router};

/// Everything a handler may depend on.
///
/// `handle` is transport-agnostic: it takes a request whose body has already
/// been collected, so it can be driven directly from tests.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
///
/// use bytes::Bytes;
/// use greenlight_config::GreenlightConfig;
/// use greenlight_data::InMemoryMovieStore;
/// use greenlight_server::Application;
/// use http::{Request, StatusCode};
///
/// # tokio_test::block_on(async {
/// let app = Application::new(GreenlightConfig::default(), Arc::new(InMemoryMovieStore::new()));
///
/// let req = Request::get("/v1/healthcheck").body(Bytes::new()).unwrap();
/// let res = app.handle(req).await;
/// assert_eq!(res.status(), StatusCode::OK);
/// # });
/// ```
pub struct Application {
    config: Arc<GreenlightConfig>,
    movies: Arc<dyn MovieStore>,
    router: Router,
}

impl Application {
    /// Creates an application serving the Greenlight routes.
    #[must_use]
    pub fn new(config: GreenlightConfig, movies: Arc<dyn MovieStore>) -> Self {
        Self {
            config: Arc::new(config),
            movies,
            router: Router::greenlight(),
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &GreenlightConfig {
        &self.config
    }

    /// Returns the movie store.
    #[must_use]
    pub fn movies(&self) -> &dyn MovieStore {
        self.movies.as_ref()
    }

    /// Routes and handles one request. Every failure becomes a JSON
    /// `{"error": ...}` response.
    pub async fn handle(&self, req: Request<Bytes>) -> Response<Bytes> {
        let (parts, body) = req.into_parts();

        let (endpoint, params) = match self.router.match_route(&parts.method, parts.uri.path()) {
            RouteOutcome::Matched { endpoint, params } => (endpoint, params),
            RouteOutcome::MethodNotAllowed { allowed } => {
                return ApiError::MethodNotAllowed {
                    method: parts.method,
                    allowed,
                }
                .into_response();
            }
            RouteOutcome::NotFound => return ApiError::NotFound.into_response(),
        };

        let ctx = ExtractionContext::new(parts.method, parts.uri, parts.headers, body, params);
        self.dispatch(endpoint, &ctx)
            .await
            .unwrap_or_else(ApiError::into_response)
    }

    async fn dispatch(
        &self,
        endpoint: Endpoint,
        ctx: &ExtractionContext,
    ) -> Result<Response<Bytes>, ApiError> {
        match endpoint {
            Endpoint::Healthcheck => handlers::healthcheck(self),
            Endpoint::CreateMovie => handlers::create_movie(self, ctx).await,
            Endpoint::ShowMovie => handlers::show_movie(self, ctx).await,
            Endpoint::UpdateMovie => handlers::update_movie(self, ctx).await,
            Endpoint::DeleteMovie => handlers::delete_movie(self, ctx).await,
        }
    }
}

impl std::fmt::Debug for Application {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Application")
            .field("config", &self.config)
            .field("router", &self.router)
            .finish_non_exhaustive()
    }
}
