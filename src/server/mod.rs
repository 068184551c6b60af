//! HTTP adapter
//! - route.rs: path templates with `{name}` captures
//! - router.rs: badge routes and the composition root
//!
//! Besides the badge routes, `GET /health` answers `OK` and `GET /routes`
//! lists every route template as JSON.

pub mod route;
pub mod router;

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use http::header::{CACHE_CONTROL, CONTENT_TYPE};
use http::{HeaderValue, Method, Request, Response, StatusCode, Uri};
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::service::Service;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as HttpConnBuilder;
use hyper_util::server::graceful::GracefulShutdown;
use tokio::net::TcpListener;
use tracing::{Instrument, error, info, warn};

use crate::context::{REQUEST_ID_HEADER, RequestContext};
use crate::error::BadgeError;

pub use route::RouteTemplate;
pub use router::Router;

const HEALTH_PATH: &str = "/health";
const ROUTES_PATH: &str = "/routes";
const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// hyper service answering every connection from one shared [`Router`]
#[derive(Clone)]
pub struct BadgeService {
    router: Arc<Router>,
}

impl BadgeService {
    pub fn new(router: Router) -> Self {
        Self {
            router: Arc::new(router),
        }
    }
}

impl Service<Request<Incoming>> for BadgeService {
    type Response = Response<Full<Bytes>>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: Request<Incoming>) -> Self::Future {
        let router = Arc::clone(&self.router);
        Box::pin(async move {
            let request_id = req
                .headers()
                .get(REQUEST_ID_HEADER)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string);
            Ok(respond(&router, req.method(), req.uri(), request_id).await)
        })
    }
}

/// Answers one call; every response carries the request id header
pub async fn respond(
    router: &Router,
    method: &Method,
    uri: &Uri,
    request_id: Option<String>,
) -> Response<Full<Bytes>> {
    let ctx = request_id
        .map(RequestContext::with_request_id)
        .unwrap_or_default();
    let span = ctx.span();

    let mut response = async {
        info!(%method, %uri, "Handling request");
        let response = match (method, uri.path()) {
            (&Method::GET, HEALTH_PATH) => text_response(StatusCode::OK, "OK"),
            (&Method::GET, ROUTES_PATH) => routes_response(router),
            (&Method::GET, path) => match router.render(&ctx, path, uri.query()).await {
                Ok((markup, content_type)) => badge_response(markup, content_type),
                Err(e) => error_response(&e),
            },
            _ => text_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed"),
        };
        info!(status = response.status().as_u16(), "Request finished");
        response
    }
    .instrument(span)
    .await;

    if let Ok(value) = HeaderValue::from_str(ctx.request_id()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

fn badge_response(markup: String, content_type: &'static str) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(markup)));
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    response
}

fn text_response(status: StatusCode, body: &str) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(body.to_string())));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(TEXT_CONTENT_TYPE));
    response
}

/// Domain errors keep their message; internal ones are logged and answered generically
fn error_response(e: &BadgeError) -> Response<Full<Bytes>> {
    match e {
        BadgeError::Internal(detail) => {
            error!(kind = e.kind(), "Internal error: {}", detail);
            text_response(e.status(), "Internal server error")
        }
        _ => {
            warn!(kind = e.kind(), status = e.status().as_u16(), "{}", e.message());
            text_response(e.status(), e.message())
        }
    }
}

fn routes_response(router: &Router) -> Response<Full<Bytes>> {
    let routes: Vec<&str> = router
        .templates()
        .chain([HEALTH_PATH, ROUTES_PATH])
        .collect();
    let body = serde_json::json!({ "routes": routes }).to_string();

    let mut response = Response::new(Full::new(Bytes::from(body)));
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

/// Runs the accept loop until ctrl-c, then drains open connections
pub async fn serve(listener: TcpListener, service: BadgeService) -> anyhow::Result<()> {
    let graceful = GracefulShutdown::new();
    let http = HttpConnBuilder::new(TokioExecutor::new());

    let shutdown = async {
        tokio::signal::ctrl_c().await.ok();
        info!("Received shutdown signal, draining connections");
    };
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = listener.accept() => {
                let (stream, peer_addr) = match result {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!(error = %e, "Failed to accept connection");
                        continue;
                    }
                };

                let conn = http.serve_connection(TokioIo::new(stream), service.clone());
                let conn = graceful.watch(conn.into_owned());

                tokio::spawn(async move {
                    if let Err(e) = conn.await {
                        error!(peer_addr = %peer_addr, error = %e, "Connection error");
                    }
                });
            }

            () = &mut shutdown => {
                break;
            }
        }
    }

    graceful.shutdown().await;
    info!("All connections drained");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CacheBackend, Config};
    use http_body_util::BodyExt;

    fn router() -> Router {
        let mut config = Config::default();
        config.http.https_only = false;
        config.cache.backend = CacheBackend::Disabled;
        Router::from_config(&config).unwrap()
    }

    async fn get(uri: &str, request_id: Option<&str>) -> Response<Full<Bytes>> {
        let uri: Uri = uri.parse().unwrap();
        respond(&router(), &Method::GET, &uri, request_id.map(String::from)).await
    }

    async fn body(response: Response<Full<Bytes>>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn badge_is_served_as_svg() {
        let response = get("/badge/ok?color=red", None).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "image/svg+xml");
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
        assert!(body(response).await.contains("#ff0000"));
    }

    #[tokio::test]
    async fn errors_are_plain_text_with_mapped_status() {
        let response = get("/custom/backend/doesnotexist", None).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[CONTENT_TYPE], TEXT_CONTENT_TYPE);
        assert_eq!(body(response).await, "Unknown backend: doesnotexist");
    }

    #[tokio::test]
    async fn non_numeric_cache_seconds_is_bad_request() {
        let response = get("/badge/ok?cacheSeconds=abc", None).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn health_answers_ok_and_echoes_request_id() {
        let response = get("/health", Some("req-42")).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[REQUEST_ID_HEADER], "req-42");
        assert_eq!(body(response).await, "OK");
    }

    #[tokio::test]
    async fn routes_lists_templates() {
        let response = get("/routes", None).await;

        let json: serde_json::Value = serde_json::from_str(&body(response).await).unwrap();
        let routes = json["routes"].as_array().unwrap();
        assert!(routes.iter().any(|r| r == "/registry/vpre/{packageName}"));
        assert!(routes.iter().any(|r| r == "/health"));
    }

    #[tokio::test]
    async fn non_get_is_rejected() {
        let uri: Uri = "/badge/ok".parse().unwrap();

        let response = respond(&router(), &Method::POST, &uri, None).await;

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn internal_errors_hide_detail() {
        let response = error_response(&BadgeError::Internal("db path /secret".to_string()));

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
