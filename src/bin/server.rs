use axum::{
    Json, Router,
    http::StatusCode,
    routing::{get, post},
};
use cut_optimizer::catalog::{CatalogFile, FinishRow, StockRow};
use cut_optimizer::solver::{Backend, SolverOptions};
use cut_optimizer::types::{Pattern, Plan};
use serde::{Deserialize, Serialize};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

#[derive(Deserialize, Serialize)]
struct OptimizeRequest {
    stocks: Vec<StockRow>,
    #[serde(alias = "finishes")]
    finish: Vec<FinishRow>,
    #[serde(default)]
    solver: Backend,
    #[serde(default)]
    options: SolverOptions,
}

#[derive(Serialize)]
struct OptimizeResponse {
    patterns: Vec<Pattern>,
    counts: Vec<u32>,
    cost: f64,
    units: u64,
    waste_percent: f64,
}

impl From<Plan> for OptimizeResponse {
    fn from(plan: Plan) -> Self {
        let waste_percent = plan.waste_percent();
        let units = plan.selection.units();
        Self {
            patterns: plan.patterns,
            counts: plan.selection.counts,
            cost: plan.selection.cost,
            units,
            waste_percent,
        }
    }
}

fn error_response(e: cut_optimizer::Error) -> (StatusCode, String) {
    if e.is_input_error() {
        (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
    } else {
        tracing::error!(error = %e, "optimization failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    }
}

async fn optimize(
    Json(req): Json<OptimizeRequest>,
) -> Result<Json<OptimizeResponse>, (StatusCode, String)> {
    tracing::info!(
        body = serde_json::to_string(&req).unwrap_or_default(),
        "POST /optimize"
    );

    let (stocks, finishes) = CatalogFile {
        stocks: req.stocks,
        finish: req.finish,
    }
    .into_catalogs()
    .map_err(error_response)?;
    let solver = req.solver.solver().map_err(error_response)?;
    let options = req.options;

    // The solve blocks for its whole duration.
    let plan = tokio::task::spawn_blocking(move || {
        cut_optimizer::optimize(stocks, finishes, solver.as_ref(), &options)
    })
    .await
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
    .map_err(error_response)?;

    Ok(Json(plan.into()))
}

#[tokio::main]
async fn main() {
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("development.log")
        .expect("failed to open development.log");

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_target(false)
        .with_ansi(false)
        .with_max_level(Level::INFO)
        .init();

    let _sentry = std::env::var("SENTRY_DSN").ok().map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    let port = std::env::var("PORT").unwrap_or_else(|_| "3001".to_string());
    let addr = format!("0.0.0.0:{port}");

    let app = Router::new()
        .route("/up", get(|| async { "ok" }))
        .route("/optimize", post(optimize))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    eprintln!("Listening on {addr}");
    axum::serve(listener, app).await.unwrap();
}
