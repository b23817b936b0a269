//! Development server for the generated data files, with live reload

use anyhow::Result;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::broadcast;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::commands::generate;
use crate::content::ContentKind;
use crate::Site;

/// Server state
struct ServerState {
    site: Site,
    reload_tx: broadcast::Sender<()>,
    live_reload: bool,
}

/// Start the development server
pub async fn start(site: &Site, ip: &str, port: u16, watch: bool, open: bool) -> Result<()> {
    // Create broadcast channel for live reload notifications
    let (reload_tx, _) = broadcast::channel::<()>(16);

    let state = Arc::new(ServerState {
        site: site.clone(),
        reload_tx: reload_tx.clone(),
        live_reload: watch,
    });

    let app = router(state);
    let addr = bind_address(ip, port)?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    if watch {
        println!("Live reload enabled at {}/__livereload", url);
    }
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&format!("{}/sitemap.xml", url)) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    if watch {
        let site = site.clone();
        tokio::spawn(async move {
            if let Err(e) = generate::watch(&site, Some(reload_tx)).await {
                tracing::error!("File watcher error: {}", e);
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: Arc<ServerState>) -> Router {
    let files = ServeDir::new(&state.site.public_dir).append_index_html_on_directories(true);

    Router::new()
        .route("/__livereload", get(livereload_handler))
        .route("/__status", get(status_handler))
        .fallback_service(files)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Parse the listen address, mapping "localhost" to the loopback address
fn bind_address(ip: &str, port: u16) -> Result<SocketAddr> {
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    Ok(format!("{}:{}", bind_ip, port).parse()?)
}

/// Site summary: title, URL and where each collection is served
async fn status_handler(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    let config = &state.site.config;
    let collections: serde_json::Map<String, serde_json::Value> = ContentKind::ALL
        .iter()
        .map(|kind| {
            (
                kind.name().to_string(),
                serde_json::json!({
                    "index": format!("/data/{}/index.json", kind.name()),
                    "prefix": config.collection(*kind).path_prefix,
                }),
            )
        })
        .collect();

    Json(serde_json::json!({
        "title": config.title,
        "url": config.url,
        "liveReload": state.live_reload,
        "collections": collections,
    }))
}

/// WebSocket handler for live reload
async fn livereload_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    let reload_rx = state.reload_tx.subscribe();
    ws.on_upgrade(move |socket| handle_livereload_socket(socket, reload_rx))
}

/// Handle WebSocket connection for live reload
async fn handle_livereload_socket(mut socket: WebSocket, mut reload_rx: broadcast::Receiver<()>) {
    tracing::debug!("Live reload client connected");

    loop {
        tokio::select! {
            result = reload_rx.recv() => {
                match result {
                    Ok(_) => {
                        if socket.send(Message::Text("reload".to_string())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
        }
    }

    tracing::debug!("Live reload client disconnected");
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}
