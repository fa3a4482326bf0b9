//! # MedChat HTTP Server Implementation
//!
//! File: cli/src/commands/srv/server_logic.rs
//!
//! ## Overview
//!
//! Builds and runs the axum application behind `medchat srv`:
//!
//! | method | path            | handler                                   |
//! |--------|-----------------|-------------------------------------------|
//! | POST   | `/api/chat`     | `handlers::chat`                          |
//! | POST   | `/api/v1/chat`  | `handlers::chat` (widget path)            |
//! | GET    | `/`             | redirect to the base path (site only)     |
//! | GET    | `<base_path>*`  | `ServeDir` over the site directory        |
//!
//! Every request passes through a `TraceLayer`; a permissive `CorsLayer` is
//! added unless CORS is disabled, so the in-page widget can call the API from
//! the documentation site's origin.
//!
//! ## Startup
//!
//! 1. Find a free port, starting at the configured one (up to 10 tries).
//! 2. Build the router with `create_app`.
//! 3. Print the URLs and serve until Ctrl+C / SIGTERM.
//!
use super::config::ServerConfig;
use super::handlers::{self, AppState};
use super::utils;
use crate::core::error::{MedchatError, Result};
use anyhow::Context;
use axum::routing::{get, post};
use axum::Router;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{error, info, warn, Level};

const MAX_PORT_ATTEMPTS: u8 = 10;

/// # Run HTTP Server (`run_server`)
///
/// Binds, prints connection details, and serves until a shutdown signal.
///
/// ## Errors
///
/// - No free port within `MAX_PORT_ATTEMPTS` of the configured one.
/// - The listener cannot be bound.
/// - axum reports a fatal serving error.
pub async fn run_server(config: ServerConfig) -> Result<()> {
    let addr = find_available_port(config.host, config.port, MAX_PORT_ATTEMPTS).await?;
    let app = create_app(&config);

    println!("\n=================================================================");
    println!("💬 Chat API:          http://localhost:{}/api/chat", addr.port());
    match &config.site_dir {
        Some(dir) => {
            utils::log_site_summary(dir);
            println!("📂 Serving site from: {}", dir.display());
            println!(
                "🌐 Site URL:          http://localhost:{}{}",
                addr.port(),
                config.base_path
            );
        }
        None => println!("📂 No site directory; serving the chat API only."),
    }
    if let Some(ip) = utils::local_network_ip().filter(|_| addr.ip().is_unspecified()) {
        println!("🔗 Network URL:       http://{}:{}", ip, addr.port());
    }
    println!("⚙️  Binding to address: {}", addr);
    println!("⏱️  Reply delay:       {} ms", config.reply_delay.as_millis());
    println!("🔒 CORS enabled:      {}", config.enable_cors);
    println!("=================================================================\n");

    info!("Starting server on {}", addr);
    println!("Server starting! Press Ctrl+C to stop.");

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind TCP listener to address {}", addr))?;

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    println!("\nServer shutdown complete.");
    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, initiating graceful shutdown..."),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
                info!("Received SIGTERM, initiating graceful shutdown...");
            }
            Err(e) => {
                error!(
                    "Failed to install SIGTERM handler: {}. Shutdown on SIGTERM might not work.",
                    e
                );
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// # Find Available Port (`find_available_port`)
///
/// Tries `start_port`, then each following port, until one binds or
/// `max_attempts` ports have been tried. The probe listener is dropped
/// before returning.
async fn find_available_port(
    req_host: IpAddr,
    start_port: u16,
    max_attempts: u8,
) -> Result<SocketAddr> {
    let mut current_port = start_port;

    for attempt in 0..max_attempts {
        let addr = SocketAddr::new(req_host, current_port);
        match TcpListener::bind(addr).await {
            Ok(listener) => {
                drop(listener);
                if attempt > 0 {
                    info!(
                        "Port {} was unavailable, using port {} instead.",
                        start_port, current_port
                    );
                }
                return Ok(addr);
            }
            Err(e) => {
                warn!(
                    "Attempt {}: Port {} on host {} is unavailable ({}). Trying next port...",
                    attempt + 1,
                    current_port,
                    req_host,
                    e
                );
                current_port = current_port.checked_add(1).ok_or_else(|| {
                    MedchatError::Server(format!("Ran out of ports after {}", start_port))
                })?;
            }
        }
    }

    Err(MedchatError::Server(format!(
        "Could not find an available port on host {} starting from port {} after trying {} ports.",
        req_host, start_port, max_attempts
    ))
    .into())
}

/// # Create Axum Application (`create_app`)
///
/// Builds the router described in the module docs from `config`.
pub fn create_app(config: &ServerConfig) -> Router {
    let state = Arc::new(AppState {
        rules: Arc::clone(&config.rules),
        reply_delay: config.reply_delay,
        base_path: config.base_path.clone(),
    });

    let cors_layer = if config.enable_cors {
        info!("CORS middleware enabled (permissive).");
        CorsLayer::permissive()
    } else {
        info!("CORS middleware disabled.");
        CorsLayer::new()
    };

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::default().include_headers(true))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let mut app = Router::new()
        .route("/api/chat", post(handlers::chat))
        .route("/api/v1/chat", post(handlers::chat));

    if let Some(site_dir) = &config.site_dir {
        let serve_dir = ServeDir::new(site_dir);
        // axum does not nest at "/", so a root base path becomes the fallback.
        let prefix = config.base_path.trim_end_matches('/');
        if prefix.is_empty() {
            app = app.fallback_service(serve_dir);
        } else {
            app = app
                .route("/", get(handlers::root))
                .nest_service(prefix, serve_dir);
        }
    }

    app.with_state(state).layer(
        ServiceBuilder::new()
            .layer(trace_layer)
            .layer(cors_layer),
    )
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::wire::ChatResponse;
    use crate::responder::{replies, RuleSet};
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use std::net::Ipv4Addr;
    use std::time::{Duration, Instant};
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn test_config() -> ServerConfig {
        ServerConfig {
            reply_delay: Duration::ZERO,
            ..ServerConfig::default()
        }
    }

    fn chat_request(path: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn reply_of(app: Router, path: &str, body: &str) -> (StatusCode, Option<String>) {
        let response = app.oneshot(chat_request(path, body)).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let reply = serde_json::from_slice::<ChatResponse>(&bytes)
            .ok()
            .map(|r| r.response);
        (status, reply)
    }

    #[tokio::test]
    async fn test_find_available_port_start_is_free() -> Result<()> {
        let host = Ipv4Addr::LOCALHOST.into();
        let start_port = 50100;
        let addr = find_available_port(host, start_port, 5).await?;
        assert_eq!(addr.port(), start_port);
        assert_eq!(addr.ip(), host);
        Ok(())
    }

    #[tokio::test]
    async fn test_find_available_port_start_occupied() -> Result<()> {
        let host = Ipv4Addr::LOCALHOST.into();
        let start_port = 51100;
        let _listener = TcpListener::bind(SocketAddr::new(host, start_port)).await?;

        let addr = find_available_port(host, start_port, 5).await?;
        assert!(addr.port() > start_port);
        assert!(addr.port() < start_port + 5);
        Ok(())
    }

    #[tokio::test]
    async fn test_chat_endpoint_replies() {
        let app = create_app(&test_config());
        let (status, reply) = reply_of(app, "/api/chat", r#"{"message": "hello"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reply.as_deref(), Some(replies::GREETING));
    }

    #[tokio::test]
    async fn test_widget_endpoint_accepts_query() {
        let app = create_app(&test_config());
        let (status, reply) =
            reply_of(app, "/api/v1/chat", r#"{"query": "I have a headache"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reply.as_deref(), Some(replies::HEADACHE));
    }

    #[tokio::test]
    async fn test_chat_endpoint_default_reply() {
        let app = create_app(&test_config());
        let (_, reply) = reply_of(app, "/api/chat", r#"{"message": "xyz123"}"#).await;
        assert_eq!(reply.as_deref(), Some(replies::DEFAULT));
    }

    #[tokio::test]
    async fn test_chat_endpoint_rejects_bad_bodies() {
        let app = create_app(&test_config());
        let (status, reply) = reply_of(app.clone(), "/api/chat", r#"{"text": "hi"}"#).await;
        assert!(status.is_client_error());
        assert!(reply.is_none());

        let (status, _) = reply_of(app, "/api/chat", "not json").await;
        assert!(status.is_client_error());
    }

    #[tokio::test]
    async fn test_chat_endpoint_uses_configured_rules() {
        let rules = RuleSet::new(
            vec![crate::responder::Rule::new("sleep", ["insomnia"], "Rest well.")],
            "Consult a doctor.",
        )
        .unwrap();
        let config = ServerConfig {
            rules: Arc::new(rules),
            ..test_config()
        };
        let app = create_app(&config);
        let (_, reply) = reply_of(app.clone(), "/api/chat", r#"{"message": "Insomnia"}"#).await;
        assert_eq!(reply.as_deref(), Some("Rest well."));
        let (_, reply) = reply_of(app, "/api/chat", r#"{"message": "hello"}"#).await;
        assert_eq!(reply.as_deref(), Some("Consult a doctor."));
    }

    #[tokio::test]
    async fn test_chat_endpoint_waits_for_delay() {
        let config = ServerConfig {
            reply_delay: Duration::from_millis(100),
            ..ServerConfig::default()
        };
        let app = create_app(&config);
        let started = Instant::now();
        let (status, _) = reply_of(app, "/api/chat", r#"{"message": "bye"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert!(started.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_site_served_under_base_path() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let chapter = temp_dir
            .path()
            .join("docs")
            .join("chapter-1-introduction-to-physical-ai");
        std::fs::create_dir_all(&chapter)?;
        std::fs::write(temp_dir.path().join("index.html"), "<h1>Textbook</h1>")?;
        std::fs::write(chapter.join("index.html"), "<h1>Chapter 1</h1>")?;

        let config = ServerConfig {
            site_dir: Some(temp_dir.path().to_path_buf()),
            ..test_config()
        };
        let app = create_app(&config);

        let response = app
            .clone()
            .oneshot(Request::get("/ai-book/").body(Body::empty())?)
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await?;
        assert_eq!(&body[..], b"<h1>Textbook</h1>");

        let response = app
            .clone()
            .oneshot(
                Request::get("/ai-book/docs/chapter-1-introduction-to-physical-ai/index.html")
                    .body(Body::empty())?,
            )
            .await?;
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(Request::get("/").body(Body::empty())?)
            .await?;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers()[header::LOCATION], "/ai-book/");

        let response = app
            .oneshot(Request::get("/ai-book/missing.html").body(Body::empty())?)
            .await?;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        Ok(())
    }

    #[tokio::test]
    async fn test_site_at_root_base_path() -> Result<()> {
        let temp_dir = TempDir::new()?;
        std::fs::write(temp_dir.path().join("index.html"), "root")?;
        let config = ServerConfig {
            site_dir: Some(temp_dir.path().to_path_buf()),
            base_path: "/".into(),
            ..test_config()
        };
        let app = create_app(&config);

        let response = app
            .clone()
            .oneshot(Request::get("/").body(Body::empty())?)
            .await?;
        assert_eq!(response.status(), StatusCode::OK);

        // The API still wins over the fallback.
        let (status, reply) = reply_of(app, "/api/chat", r#"{"message": "thanks"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reply.as_deref(), Some(replies::THANKS));
        Ok(())
    }

    #[tokio::test]
    async fn test_no_site_means_no_root_route() -> Result<()> {
        let app = create_app(&test_config());
        let response = app
            .oneshot(Request::get("/").body(Body::empty())?)
            .await?;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        Ok(())
    }

    #[tokio::test]
    async fn test_cors_header_present_when_enabled() -> Result<()> {
        let app = create_app(&test_config());
        let mut request = chat_request("/api/chat", r#"{"message": "hi"}"#);
        request
            .headers_mut()
            .insert(header::ORIGIN, "http://localhost:8000".parse()?);
        let response = app.oneshot(request).await?;
        assert!(response
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
        Ok(())
    }
}
