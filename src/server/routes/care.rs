use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use chrono::Datelike;
use serde::Deserialize;

use crate::care::{self, Season, SensorReading};
use crate::error::VerdraError;
use crate::server::respond;
use crate::server::router::VerdraState;
use crate::server::routes::plants::fetch_plant;
use crate::server::routes::sensors::ReadingIngestRequest;

#[derive(Debug, Default, Deserialize)]
pub struct PredictRequest {
    /// Override reading; when absent the latest stored reading is used.
    #[serde(default)]
    pub reading: Option<ReadingIngestRequest>,
    /// Override season; when absent it is derived from the reading timestamp.
    #[serde(default)]
    pub season: Option<String>,
}

/// Resolve the reading to analyze: request override first, stored latest
/// otherwise. Returns 404 when neither exists.
async fn resolve_reading(
    state: &VerdraState,
    plant_id: i64,
    override_reading: Option<ReadingIngestRequest>,
) -> Result<SensorReading, VerdraError> {
    match override_reading {
        Some(req) => {
            req.validate()?;
            let create = req.into_create();
            Ok(SensorReading {
                soil_moisture: create.soil_moisture,
                temperature: create.temperature,
                humidity: create.humidity,
                light_level: create.light_level,
                soil_ph: create.soil_ph,
                recorded_at: create.recorded_at,
            })
        }
        None => {
            let record = state
                .db
                .latest_reading(plant_id)
                .await?
                .ok_or(VerdraError::NoSensorData(plant_id))?;
            Ok(record.to_reading())
        }
    }
}

pub async fn predict_watering(
    State(state): State<VerdraState>,
    Path(plant_id): Path<i64>,
    body: Option<Json<PredictRequest>>,
) -> Result<impl IntoResponse, VerdraError> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let plant = fetch_plant(&state, plant_id).await?;

    let reading = resolve_reading(&state, plant_id, req.reading).await?;
    let species = plant.species_kind();
    let soil = plant.soil_kind();
    let season = match req.season.as_deref() {
        Some(name) => Some(
            name.parse::<Season>()
                .map_err(|e| VerdraError::validation("season", e.to_string()))?,
        ),
        None => Some(Season::from_month(reading.recorded_at.month())),
    };

    if let Some(cached) = state
        .assessments
        .get(plant_id, &reading, species, soil, season)
    {
        return Ok(respond::ok(cached));
    }

    let assessment = care::assess_watering(&reading, species, soil, season);
    state.assessments.insert(
        plant_id,
        &reading,
        species,
        soil,
        season,
        assessment.clone(),
    );

    state
        .db
        .insert_assessment(
            plant_id,
            "watering".to_string(),
            serde_json::to_string(&assessment)?,
        )
        .await?;

    Ok(respond::ok(assessment))
}

#[derive(Debug, Default, Deserialize)]
pub struct HealthAnalyzeRequest {
    #[serde(default)]
    pub reading: Option<ReadingIngestRequest>,
}

pub async fn analyze_health(
    State(state): State<VerdraState>,
    Path(plant_id): Path<i64>,
    body: Option<Json<HealthAnalyzeRequest>>,
) -> Result<impl IntoResponse, VerdraError> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let plant = fetch_plant(&state, plant_id).await?;

    let reading = resolve_reading(&state, plant_id, req.reading).await?;
    let report = care::analyze_health(&reading, plant.species_kind());

    state
        .db
        .insert_assessment(
            plant_id,
            "health".to_string(),
            serde_json::to_string(&report)?,
        )
        .await?;

    Ok(respond::ok(report))
}

#[derive(Debug, Deserialize)]
pub struct AssessmentHistoryQuery {
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default = "default_history_limit")]
    pub limit: i64,
}

fn default_history_limit() -> i64 {
    20
}

pub async fn assessment_history(
    State(state): State<VerdraState>,
    Path(plant_id): Path<i64>,
    Query(query): Query<AssessmentHistoryQuery>,
) -> Result<impl IntoResponse, VerdraError> {
    if let Some(kind) = query.kind.as_deref() {
        if !matches!(kind, "watering" | "health" | "warning") {
            return Err(VerdraError::validation(
                "kind",
                "must be `watering`, `health` or `warning`",
            ));
        }
    }

    fetch_plant(&state, plant_id).await?;

    let limit = query.limit.clamp(1, 100);
    let history = state
        .db
        .assessment_history(plant_id, query.kind, limit)
        .await?;

    Ok(respond::ok(history))
}
