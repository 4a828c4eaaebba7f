//! Web server for the earthquake list.
//!
//! Serves the same rows as the terminal output as a single HTML page:
//! - Axum for HTTP
//! - every page view is a fresh load cycle (no caching)
//! - badge colors come from the palette

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use chrono::Local;

use crate::client::EarthquakeSource;
use crate::loader::EarthquakeLoader;
use crate::models::Earthquake;
use crate::presenter::{EarthquakeAdapter, Palette, RowFields};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    /// Feed to load on every request; `None` serves an empty list
    pub url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            url: None,
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    source: Arc<dyn EarthquakeSource>,
    palette: Palette,
    config: ServerConfig,
}

impl AppState {
    pub fn new(source: Arc<dyn EarthquakeSource>, palette: Palette, config: ServerConfig) -> Self {
        Self {
            source,
            palette,
            config,
        }
    }

    fn loader(&self) -> EarthquakeLoader<dyn EarthquakeSource> {
        EarthquakeLoader::new(Arc::clone(&self.source), self.config.url.clone())
    }
}

/// Create the Axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/earthquakes", get(earthquakes_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Start the web server.
pub async fn run_server(state: AppState) -> anyhow::Result<()> {
    let addr = format!("{}:{}", state.config.host, state.config.port);
    let app = create_router(state);

    tracing::info!("quakereport UI starting at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Route Handlers
// ============================================================================

/// Main page handler - loads the feed and renders every row.
async fn index_handler(State(state): State<AppState>) -> Html<String> {
    let body = match state.loader().load().await {
        Ok(quakes) if quakes.is_empty() => {
            "<div class='empty-state'><p>No earthquakes found</p></div>".to_string()
        }
        Ok(quakes) => {
            let adapter = EarthquakeAdapter::new(quakes, state.palette.clone(), Local);
            render_list(&adapter)
        }
        Err(e) => {
            tracing::warn!("feed load failed: {}", e);
            format!(
                "<div class='error'>Failed to load earthquakes: {}</div>",
                escape_html(&e.to_string())
            )
        }
    };

    Html(format!("{PAGE_HEAD}{body}{PAGE_TAIL}"))
}

/// JSON handler - the raw records of a fresh load.
async fn earthquakes_handler(State(state): State<AppState>) -> Response {
    match state.loader().load().await {
        Ok(quakes) => Json::<Vec<Earthquake>>(quakes).into_response(),
        Err(e) => {
            tracing::warn!("feed load failed: {}", e);
            (StatusCode::BAD_GATEWAY, e.to_string()).into_response()
        }
    }
}

/// Health check endpoint.
async fn health_handler() -> &'static str {
    "OK"
}

// ============================================================================
// Rendering
// ============================================================================

fn render_list(adapter: &EarthquakeAdapter<Local>) -> String {
    let mut html = String::from("<ul class='quakes'>\n");
    let mut row = RowFields::default();

    for position in 0..adapter.len() {
        // Reuse one row resource for the whole list
        let Some(quake) = adapter.get(position) else {
            break;
        };
        let Some(bound) = adapter.get_view(position, Some(row)) else {
            break;
        };
        html.push_str(&format_row_html(&bound, quake.url()));
        row = bound;
    }

    html.push_str("</ul>\n");
    html
}

/// Format one bound row as a list item.
fn format_row_html(row: &RowFields, url: &str) -> String {
    format!(
        r#"<li class="quake">
  <a href="{url}">
    <span class="mag" style="background-color:{color}">{mag}</span>
    <span class="where">
      <span class="location-offset">{offset}</span>
      <span class="location">{location}</span>
    </span>
    <span class="when">
      <span class="date">{date}</span>
      <span class="time">{time}</span>
    </span>
  </a>
</li>
"#,
        url = escape_html(url),
        color = row.badge_color,
        mag = escape_html(&row.magnitude),
        offset = escape_html(&row.location_offset),
        location = escape_html(&row.location),
        date = escape_html(&row.date),
        time = escape_html(&row.time),
    )
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// ============================================================================
// HTML Template (embedded for single-binary deployment)
// ============================================================================

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Quake Report</title>
    <style>
        body { font-family: sans-serif; margin: 0; background: #fafafa; }
        h1 { margin: 0; padding: 16px; font-size: 20px; background: #455a64; color: #fff; }
        ul.quakes { list-style: none; margin: 0; padding: 0; }
        li.quake a { display: flex; align-items: center; padding: 16px; color: inherit;
                     text-decoration: none; border-bottom: 1px solid #e0e0e0; }
        .mag { width: 36px; height: 36px; border-radius: 50%; color: #fff; font-size: 16px;
               display: flex; align-items: center; justify-content: center; flex: none; }
        .where { display: flex; flex-direction: column; flex: 1; margin-left: 16px; }
        .location-offset { font-size: 12px; color: #7b868a; text-transform: uppercase; }
        .location { font-size: 16px; color: #2b3d4d; }
        .when { display: flex; flex-direction: column; align-items: flex-end; margin-left: 16px;
                font-size: 12px; color: #7b868a; }
        .empty-state, .error { padding: 32px; text-align: center; color: #7b868a; }
        .error { color: #c03823; }
    </style>
</head>
<body>
<h1>Earthquakes</h1>
"#;

const PAGE_TAIL: &str = "</body>\n</html>\n";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::QuakeError;

    struct StaticSource(Result<Vec<Earthquake>, u16>);

    impl EarthquakeSource for StaticSource {
        fn fetch_earthquakes(&self, _url: &str) -> Result<Vec<Earthquake>, QuakeError> {
            match &self.0 {
                Ok(quakes) => Ok(quakes.clone()),
                Err(status) => Err(QuakeError::Api {
                    status: *status,
                    message: "unavailable".into(),
                }),
            }
        }
    }

    fn state(source: StaticSource, url: Option<&str>) -> AppState {
        AppState::new(
            Arc::new(source),
            Palette::default(),
            ServerConfig {
                url: url.map(String::from),
                ..ServerConfig::default()
            },
        )
    }

    #[tokio::test]
    async fn test_index_renders_rows() {
        let source = StaticSource(Ok(vec![Earthquake::new(
            6.14,
            "86km NE of Rincon, Puerto Rico",
            1_454_371_200_000,
            "https://example.test/e?a=1&b=2",
        )]));

        let Html(page) = index_handler(State(state(source, Some("http://feed.test")))).await;

        assert!(page.contains(r#"<span class="mag" style="background-color:#FC6644">6.1</span>"#));
        assert!(page.contains(r#"<span class="location-offset">86km NE of</span>"#));
        assert!(page.contains(r#"<span class="location">Rincon, Puerto Rico</span>"#));
        assert!(page.contains("https://example.test/e?a=1&amp;b=2"));
    }

    #[tokio::test]
    async fn test_index_without_url_is_empty_state() {
        let source = StaticSource(Ok(vec![Earthquake::new(5.0, "x", 0, "")]));

        let Html(page) = index_handler(State(state(source, None))).await;

        assert!(page.contains("No earthquakes found"));
        assert!(!page.contains("class=\"quake\""));
    }

    #[tokio::test]
    async fn test_index_shows_error_state() {
        let source = StaticSource(Err(503));

        let Html(page) = index_handler(State(state(source, Some("http://feed.test")))).await;

        assert!(page.contains("class='error'"));
        assert!(page.contains("HTTP 503"));
    }

    #[tokio::test]
    async fn test_json_endpoint_status() {
        let ok = earthquakes_handler(State(state(
            StaticSource(Ok(Vec::new())),
            Some("http://feed.test"),
        )))
        .await;
        assert_eq!(ok.status(), StatusCode::OK);

        let failed = earthquakes_handler(State(state(
            StaticSource(Err(500)),
            Some("http://feed.test"),
        )))
        .await;
        assert_eq!(failed.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<a href='x'>&</a>"), "&lt;a href=&#39;x&#39;&gt;&amp;&lt;/a&gt;");
    }

    #[tokio::test]
    async fn test_health() {
        assert_eq!(health_handler().await, "OK");
    }
}
