use axum::{
    extract::{Path, State},
    response::IntoResponse,
};

use crate::care::{self, warning::WarningReport};
use crate::db::AlertCreate;
use crate::error::VerdraError;
use crate::server::respond;
use crate::server::router::VerdraState;
use crate::server::routes::plants::fetch_plant;

/// Run the early-warning pass over the recent reading window, persist the
/// resulting alerts and the full report.
pub async fn evaluate_warnings(
    State(state): State<VerdraState>,
    Path(plant_id): Path<i64>,
) -> Result<impl IntoResponse, VerdraError> {
    let plant = fetch_plant(&state, plant_id).await?;

    // Window + 1: newest becomes the value under test, the rest its baseline.
    let mut records = state
        .db
        .recent_readings(plant_id, i64::from(state.warning_window) + 1)
        .await?;
    let latest = records
        .first()
        .map(|r| r.to_reading())
        .ok_or(VerdraError::NoSensorData(plant_id))?;

    // Newest-first from the store; the analysis wants oldest-first history
    // without the latest element.
    records.remove(0);
    records.reverse();
    let history: Vec<_> = records.iter().map(|r| r.to_reading()).collect();

    let report: WarningReport =
        care::evaluate_warnings(&history, &latest, plant.species_kind());

    if !report.alerts.is_empty() {
        let creates = report
            .alerts
            .iter()
            .map(|draft| AlertCreate {
                plant_id,
                category: draft.category.clone(),
                severity: draft.severity.as_str().to_string(),
                title: draft.title.clone(),
                message: draft.message.clone(),
            })
            .collect();
        state.db.insert_alerts(creates).await?;
    }

    state
        .db
        .insert_assessment(
            plant_id,
            "warning".to_string(),
            serde_json::to_string(&report)?,
        )
        .await?;

    Ok(respond::ok(report))
}

pub async fn open_alerts(
    State(state): State<VerdraState>,
    Path(plant_id): Path<i64>,
) -> Result<impl IntoResponse, VerdraError> {
    fetch_plant(&state, plant_id).await?;

    let alerts = state.db.open_alerts(plant_id).await?;
    Ok(respond::ok(alerts))
}

pub async fn acknowledge_alert(
    State(state): State<VerdraState>,
    Path(alert_id): Path<i64>,
) -> Result<impl IntoResponse, VerdraError> {
    if !state.db.acknowledge_alert(alert_id).await? {
        return Err(VerdraError::AlertNotFound(alert_id));
    }
    Ok(respond::ok(serde_json::json!({ "acknowledged": alert_id })))
}
