//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use super::AppState;
use super::types::{ChartQuery, ErrorResponse, SeriesQuery, StateResponse, StepRecord};
use crate::sim::aggregate::{ChartData, SecondaryView};

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(error: String) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse { error }))
}

/// Returns the scenario inputs and cost report.
///
/// `GET /state` → 200 + `StateResponse` JSON
pub async fn get_state(State(state): State<Arc<AppState>>) -> Json<StateResponse> {
    Json(StateResponse {
        config: state.run.config.clone(),
        datacenter: state.run.datacenter,
        cases: state.run.cases.clone(),
        report: state.report.clone(),
    })
}

/// Returns per-step records, optionally filtered by case and step range.
///
/// `GET /series` → 200 + `Vec<StepRecord>` JSON, all cases in order
/// `GET /series?case=Classic&from=N&to=M` → one case, inclusive range
/// `GET /series?from=10&to=5` or an unknown case → 400 + `ErrorResponse`
pub async fn get_series(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SeriesQuery>,
) -> impl IntoResponse {
    let from = query.from.unwrap_or(0);
    let to = query.to.unwrap_or(usize::MAX);

    if from > to {
        return Err(bad_request(format!(
            "`from` ({from}) must be <= `to` ({to})"
        )));
    }

    let run = &state.run;
    let cases: Vec<usize> = match &query.case {
        Some(name) => match run.series.iter().position(|s| &s.name == name) {
            Some(c) => vec![c],
            None => {
                let known: Vec<&str> = run.series.iter().map(|s| s.name.as_str()).collect();
                return Err(bad_request(format!(
                    "unknown case \"{name}\", available: {}",
                    known.join(", ")
                )));
            }
        },
        None => (0..run.series.len()).collect(),
    };

    let last = run.aligned.len().saturating_sub(1);
    let records: Vec<StepRecord> = cases
        .into_iter()
        .flat_map(|c| (from..=to.min(last)).map(move |i| (c, i)))
        .map(|(c, i)| StepRecord::from_run(run, c, i))
        .collect();

    Ok(Json(records))
}

/// Returns the chart series for one secondary view.
///
/// `GET /chart?view=cooling-costs` → 200 + `ChartData` JSON
/// `GET /chart?view=pie` → 400 + `ErrorResponse`
pub async fn get_chart(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ChartQuery>,
) -> Result<Json<ChartData>, ApiError> {
    let view = match query.view.as_deref() {
        Some(text) => text
            .parse::<SecondaryView>()
            .map_err(|e| bad_request(e.to_string()))?,
        None => SecondaryView::default(),
    };
    Ok(Json(ChartData::build(&state.run, view)))
}
