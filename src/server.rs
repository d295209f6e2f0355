// HTTP front end: dashboard page, LED page and a small JSON API over the cached board snapshot.

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpResponse, HttpServer};
use log::{debug, error, info, warn};
use serde::Serialize;
use std::fmt::Write as _;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time;

use crate::bitmap::PixelGrid;
use crate::board::{Board, BoardSnapshot, WebSnapshot};
use crate::models::Arrival;
use crate::palette;

const REFRESH_INTERVAL_SECS: u64 = 30;

#[derive(Clone)]
struct AppState {
    board: Arc<Board>,
    snapshot: Arc<Mutex<BoardSnapshot>>,
}

#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    error: Option<String>,
    timestamp: i64,
}

impl<T: Serialize> ApiResponse<T> {
    fn success(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }

    fn error(message: String) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message),
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

impl AppState {
    fn current(&self) -> Result<BoardSnapshot, String> {
        self.snapshot
            .lock()
            .map(|s| s.clone())
            .map_err(|e| format!("Failed to lock snapshot: {}", e))
    }
}

// ============================================================================
// Pages
// ============================================================================

async fn dashboard_page(state: web::Data<AppState>) -> HttpResponse {
    match state.current() {
        Ok(snapshot) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(render_dashboard_html(&snapshot.web)),
        Err(e) => internal_error(e),
    }
}

async fn led_page(state: web::Data<AppState>) -> HttpResponse {
    match state.current() {
        Ok(snapshot) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(render_led_html(&snapshot.grid)),
        Err(e) => internal_error(e),
    }
}

// ============================================================================
// API
// ============================================================================

async fn get_arrivals(state: web::Data<AppState>) -> HttpResponse {
    match state.current() {
        Ok(snapshot) => {
            debug!("Arrivals requested: {} rail lines", snapshot.web.rail.len());
            HttpResponse::Ok().json(ApiResponse::success(snapshot.web))
        }
        Err(e) => internal_error(e),
    }
}

async fn get_led(state: web::Data<AppState>) -> HttpResponse {
    match state.current() {
        Ok(snapshot) => HttpResponse::Ok().json(ApiResponse::success(snapshot.grid)),
        Err(e) => internal_error(e),
    }
}

async fn get_snapshot(state: web::Data<AppState>) -> HttpResponse {
    match state.current() {
        Ok(snapshot) => HttpResponse::Ok().json(ApiResponse::success(snapshot)),
        Err(e) => internal_error(e),
    }
}

async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let refreshed_at = state.current().ok().map(|s| s.refreshed_at.to_rfc3339());
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "refreshed_at": refreshed_at,
    }))
}

async fn force_refresh(state: web::Data<AppState>) -> HttpResponse {
    info!("🔄 Manual refresh requested...");

    match refresh(&state.board, &state.snapshot).await {
        Ok(()) => HttpResponse::Ok().json(ApiResponse::success("Board refreshed")),
        Err(e) => internal_error(e),
    }
}

fn internal_error(message: String) -> HttpResponse {
    error!("❌ {}", message);
    HttpResponse::InternalServerError().json(ApiResponse::<String>::error(message))
}

// ============================================================================
// Background Task
// ============================================================================

// Upstream calls are blocking, so they run off the async workers.
async fn refresh(board: &Arc<Board>, snapshot: &Arc<Mutex<BoardSnapshot>>) -> Result<(), String> {
    let board = board.clone();
    let fresh = tokio::task::spawn_blocking(move || board.snapshot())
        .await
        .map_err(|e| format!("Refresh task panicked: {}", e))?;

    let mut guard = snapshot.lock().map_err(|e| format!("Failed to lock snapshot: {}", e))?;
    *guard = fresh;
    Ok(())
}

async fn board_refresh_task(board: Arc<Board>, snapshot: Arc<Mutex<BoardSnapshot>>) {
    let mut interval = time::interval(Duration::from_secs(REFRESH_INTERVAL_SECS));
    // the first tick fires immediately and the snapshot is already fresh
    interval.tick().await;

    loop {
        interval.tick().await;
        debug!("🔄 Auto-refreshing board...");

        if let Err(e) = refresh(&board, &snapshot).await {
            warn!("⚠️  Auto-refresh failed: {}", e);
        }
    }
}

// ============================================================================
// HTML
// ============================================================================

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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

fn arrival_item(out: &mut String, heading: &str, arrival: &Arrival) {
    let _ = writeln!(
        out,
        "<li>{} <span class=\"time\">{}</span></li>",
        escape_html(heading),
        arrival.display_time()
    );
}

pub fn render_dashboard_html(web: &WebSnapshot) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><meta http-equiv=\"refresh\" content=\"30\">");
    out.push_str("<title>Loop Departures</title></head><body>\n");

    out.push_str("<h2>CTA Departures</h2>\n");
    if web.rail.is_empty() {
        out.push_str("<p>No CTA data available</p>\n");
    }
    for (line, trains) in &web.rail {
        let _ = writeln!(out, "<h3>{} Line</h3>\n<ul>", escape_html(line));
        for train in trains {
            let heading = format!(
                "{} ({})",
                train.destination.as_deref().unwrap_or_default(),
                train.location.as_deref().unwrap_or_default()
            );
            arrival_item(&mut out, &heading, train);
        }
        out.push_str("</ul>\n");
    }

    out.push_str("<h2>Metra Electric</h2>\n");
    if web.commuter.is_empty() {
        out.push_str("<p>No Metra data available</p>\n");
    } else {
        out.push_str("<ul>\n");
        for train in &web.commuter {
            let heading = format!("Train {}", train.train.as_deref().unwrap_or_default());
            arrival_item(&mut out, &heading, train);
        }
        out.push_str("</ul>\n");
    }

    out.push_str("<h2>Bus</h2>\n");
    if web.bus.is_empty() {
        out.push_str("<p>No bus data available</p>\n");
    } else {
        out.push_str("<ul>\n");
        for bus in &web.bus {
            let heading = format!(
                "#{} {} ({})",
                bus.label,
                bus.destination.as_deref().unwrap_or_default(),
                bus.location.as_deref().unwrap_or_default()
            );
            arrival_item(&mut out, &heading, bus);
        }
        out.push_str("</ul>\n");
    }

    out.push_str("</body></html>\n");
    out
}

pub fn render_led_html(grid: &PixelGrid) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><meta http-equiv=\"refresh\" content=\"30\">");
    out.push_str("<title>LED Board</title><style>body{background:#000}");
    out.push_str("table{border-spacing:2px}td{width:12px;height:12px;border-radius:50%}</style></head><body>\n<table>\n");

    for row in grid.rows() {
        out.push_str("<tr>");
        for &pixel in row {
            let _ = write!(out, "<td style=\"background:{}\"></td>", palette::hex(pixel));
        }
        out.push_str("</tr>\n");
    }

    out.push_str("</table>\n</body></html>\n");
    out
}

// ============================================================================
// Server Setup
// ============================================================================

pub async fn run_server(board: Arc<Board>, initial: BoardSnapshot) -> std::io::Result<()> {
    let bind_addr = board.config().bind_addr.clone();
    let app_state = AppState {
        board,
        snapshot: Arc::new(Mutex::new(initial)),
    };

    let refresh_board = app_state.board.clone();
    let refresh_snapshot = app_state.snapshot.clone();
    tokio::spawn(async move {
        board_refresh_task(refresh_board, refresh_snapshot).await;
    });

    info!("🌐 Server running on: http://{}", bind_addr);
    info!("   GET  /               - Departures page");
    info!("   GET  /led            - LED board page");
    info!("   GET  /api/arrivals   - Departures (JSON)");
    info!("   GET  /api/led        - LED grid (JSON)");
    info!("   GET  /api/snapshot   - Full snapshot (JSON)");
    info!("   POST /api/refresh    - Force refresh");
    info!("   GET  /health         - Health check");
    info!("🔄 Auto-refresh: every {} seconds", REFRESH_INTERVAL_SECS);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .route("/", web::get().to(dashboard_page))
            .route("/led", web::get().to(led_page))
            .route("/health", web::get().to(health_check))
            .service(
                web::scope("/api")
                    .route("/arrivals", web::get().to(get_arrivals))
                    .route("/led", web::get().to(get_led))
                    .route("/snapshot", web::get().to(get_snapshot))
                    .route("/refresh", web::post().to(force_refresh)),
            )
    })
    .bind(bind_addr.as_str())?
    .run()
    .await
}
