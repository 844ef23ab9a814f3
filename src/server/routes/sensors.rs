use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use crate::db::{ReadingCreate, WateringCreate};
use crate::error::VerdraError;
use crate::server::respond;
use crate::server::router::VerdraState;
use crate::server::routes::plants::fetch_plant;

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ReadingIngestRequest {
    pub soil_moisture: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub light_level: f64,
    #[serde(default)]
    pub soil_ph: Option<f64>,
    /// Defaults to ingest time when the device doesn't timestamp.
    #[serde(default)]
    pub recorded_at: Option<DateTime<Utc>>,
}

impl ReadingIngestRequest {
    pub(in crate::server) fn validate(&self) -> Result<(), VerdraError> {
        check_range("soil_moisture", self.soil_moisture, 0.0, 100.0)?;
        check_range("temperature", self.temperature, -40.0, 60.0)?;
        check_range("humidity", self.humidity, 0.0, 100.0)?;
        check_range("light_level", self.light_level, 0.0, 100.0)?;
        if let Some(ph) = self.soil_ph {
            check_range("soil_ph", ph, 0.0, 14.0)?;
        }
        Ok(())
    }

    pub(in crate::server) fn into_create(self) -> ReadingCreate {
        ReadingCreate {
            soil_moisture: self.soil_moisture,
            temperature: self.temperature,
            humidity: self.humidity,
            light_level: self.light_level,
            soil_ph: self.soil_ph,
            recorded_at: self.recorded_at.unwrap_or_else(Utc::now),
        }
    }
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), VerdraError> {
    if !value.is_finite() || value < min || value > max {
        return Err(VerdraError::validation(
            field,
            format!("must be within [{min}, {max}]"),
        ));
    }
    Ok(())
}

pub async fn ingest_reading(
    State(state): State<VerdraState>,
    Path(plant_id): Path<i64>,
    Json(req): Json<ReadingIngestRequest>,
) -> Result<impl IntoResponse, VerdraError> {
    req.validate()?;
    fetch_plant(&state, plant_id).await?;

    let create = req.into_create();
    let recorded_at = create.recorded_at;
    let id = state.db.insert_reading(plant_id, create).await?;

    Ok(respond::ok(json!({
        "id": id,
        "plant_id": plant_id,
        "recorded_at": recorded_at,
    })))
}

pub async fn latest_reading(
    State(state): State<VerdraState>,
    Path(plant_id): Path<i64>,
) -> Result<impl IntoResponse, VerdraError> {
    fetch_plant(&state, plant_id).await?;

    let reading = state
        .db
        .latest_reading(plant_id)
        .await?
        .ok_or(VerdraError::NoSensorData(plant_id))?;

    Ok(respond::ok(reading))
}

#[derive(Debug, Deserialize)]
pub struct WateringLogRequest {
    pub amount_ml: i64,
    #[serde(default)]
    pub duration_secs: Option<i64>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub occurred_at: Option<DateTime<Utc>>,
}

pub async fn log_watering(
    State(state): State<VerdraState>,
    Path(plant_id): Path<i64>,
    Json(req): Json<WateringLogRequest>,
) -> Result<impl IntoResponse, VerdraError> {
    if !(1..=10_000).contains(&req.amount_ml) {
        return Err(VerdraError::validation(
            "amount_ml",
            "must be within [1, 10000]",
        ));
    }
    let method = req.method.unwrap_or_else(|| "manual".to_string());
    if !matches!(method.as_str(), "manual" | "automatic") {
        return Err(VerdraError::validation(
            "method",
            "must be `manual` or `automatic`",
        ));
    }

    fetch_plant(&state, plant_id).await?;

    let id = state
        .db
        .insert_watering(
            plant_id,
            WateringCreate {
                amount_ml: req.amount_ml,
                duration_secs: req.duration_secs,
                method,
                occurred_at: req.occurred_at.unwrap_or_else(Utc::now),
            },
        )
        .await?;

    Ok(respond::ok(json!({ "id": id, "plant_id": plant_id })))
}

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    10
}

pub async fn recent_waterings(
    State(state): State<VerdraState>,
    Path(plant_id): Path<i64>,
    Query(query): Query<RecentQuery>,
) -> Result<impl IntoResponse, VerdraError> {
    fetch_plant(&state, plant_id).await?;

    let limit = query.limit.clamp(1, 100);
    let events = state.db.recent_waterings(plant_id, limit).await?;
    Ok(respond::ok(events))
}
