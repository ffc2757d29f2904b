use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::aggregator::{AggregateResult, SentimentAggregator, SourceReading};
use crate::anomaly::{self, Anomaly};
use crate::confidence::Confidence;
use crate::config::{HotReloadAggregator, ServiceConfig};
use crate::history::{HistoryEntry, ScoreHistory};
use crate::mood::{classify, MoodLabel, Tier};
use crate::source::Source;
use crate::trend::{self, Momentum, Trend};

#[derive(Clone)]
pub struct AppState {
    aggregator: Arc<HotReloadAggregator>,
    history: Arc<ScoreHistory>,
}

impl AppState {
    pub fn new(aggregator: HotReloadAggregator, history: ScoreHistory) -> Self {
        Self {
            aggregator: Arc::new(aggregator),
            history: Arc::new(history),
        }
    }

    /// Weights from `$MOODMETER_WEIGHTS_PATH` / `config/weights.*` / seed,
    /// history capacity from `$MOODMETER_HISTORY_CAP`.
    pub fn from_env() -> anyhow::Result<Self> {
        let svc = ServiceConfig::from_env();
        let aggregator = HotReloadAggregator::from_env()?;
        Ok(Self::new(
            aggregator,
            ScoreHistory::with_capacity(svc.history_capacity),
        ))
    }

    /// In-memory state with the dashboard blend, no config file.
    pub fn with_defaults() -> Self {
        Self::new(
            HotReloadAggregator::fixed(SentimentAggregator::dashboard_default()),
            ScoreHistory::with_capacity(ServiceConfig::default().history_capacity),
        )
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/classify", get(classify_score))
        .route("/aggregate", post(aggregate))
        .route("/weights", get(current_weights))
        .route("/admin/reload-weights", post(admin_reload_weights))
        .route("/debug/history", get(debug_history))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Deserialize)]
struct ClassifyQuery {
    score: f64,
}

#[derive(Serialize)]
struct ClassifyResp {
    score: f64,
    label: MoodLabel,
    tier: Tier,
}

async fn classify_score(Query(q): Query<ClassifyQuery>) -> Json<ClassifyResp> {
    let mood = classify(q.score);
    Json(ClassifyResp {
        score: q.score,
        label: mood.label,
        tier: mood.tier,
    })
}

#[derive(Serialize)]
struct AggregateResp {
    result: AggregateResult,
    confidence: Confidence,
    trend: Trend,
    momentum: Momentum,
    anomaly: Anomaly,
    reversal: bool,
}

async fn aggregate(
    State(state): State<AppState>,
    Json(readings): Json<Vec<SourceReading>>,
) -> Json<AggregateResp> {
    let agg = state.aggregator.current();
    let result = agg.aggregate(&readings);
    let confidence = agg.confidence(&readings);

    let overall = f64::from(result.overall);
    let mut scores = state.history.record(&result);
    let anomaly = anomaly::detect(overall, &scores, &result.components);
    let reversal = trend::is_reversal(&scores, overall);

    scores.push(overall);
    let trend = trend::detect_trend(&scores);
    let momentum = trend::detect_momentum(&scores);

    metrics::counter!("moodmeter_aggregations_total").increment(1);
    metrics::gauge!("moodmeter_overall_score").set(overall);
    if anomaly.is_anomaly {
        metrics::counter!("moodmeter_anomalies_total").increment(1);
        warn!(overall, reasons = ?anomaly.reasons, "sentiment anomaly");
    }

    Json(AggregateResp {
        result,
        confidence,
        trend,
        momentum,
        anomaly,
        reversal,
    })
}

#[derive(Serialize)]
struct WeightOut {
    source: Source,
    weight: f64,
}

#[derive(Serialize)]
struct WeightsResp {
    weights: Vec<WeightOut>,
    reliability: BTreeMap<Source, f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
}

fn weights_resp(agg: &SentimentAggregator, path: Option<String>) -> WeightsResp {
    WeightsResp {
        weights: agg
            .weights()
            .iter()
            .map(|(source, weight)| WeightOut {
                source: source.clone(),
                weight: *weight,
            })
            .collect(),
        reliability: agg.reliability().clone(),
        path,
    }
}

fn path_string(state: &AppState) -> Option<String> {
    state.aggregator.path().map(|p| p.display().to_string())
}

async fn current_weights(State(state): State<AppState>) -> Json<WeightsResp> {
    let agg = state.aggregator.current();
    Json(weights_resp(&agg, path_string(&state)))
}

async fn admin_reload_weights(State(state): State<AppState>) -> Response {
    if state.aggregator.path().is_none() {
        return (StatusCode::CONFLICT, "no weights file configured").into_response();
    }
    match state.aggregator.reload() {
        Ok(agg) => {
            info!("weights reloaded via admin endpoint");
            Json(weights_resp(&agg, path_string(&state))).into_response()
        }
        Err(e) => {
            warn!(error = %format!("{e:#}"), "admin weights reload rejected");
            (StatusCode::UNPROCESSABLE_ENTITY, format!("{e:#}")).into_response()
        }
    }
}

#[derive(Deserialize)]
struct HistoryQuery {
    limit: Option<usize>,
}

async fn debug_history(
    State(state): State<AppState>,
    Query(q): Query<HistoryQuery>,
) -> Json<Vec<HistoryEntry>> {
    Json(state.history.snapshot_last_n(q.limit.unwrap_or(10)))
}
