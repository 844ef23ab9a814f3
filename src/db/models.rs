//! Rust structs mirroring DB rows, plus the create payloads the actor accepts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::care::{SensorReading, SoilKind, SpeciesKind};

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PlantRecord {
    pub id: i64,
    pub name: String,
    pub species: String,
    pub soil: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PlantRecord {
    /// Species column parsed lax: unknown names read as `other`.
    pub fn species_kind(&self) -> SpeciesKind {
        self.species.parse().unwrap_or(SpeciesKind::Other)
    }

    /// Soil column parsed strictly: unknown names read as no soil info.
    pub fn soil_kind(&self) -> Option<SoilKind> {
        self.soil.as_deref().and_then(|s| s.parse().ok())
    }
}

#[derive(Debug, Clone)]
pub struct PlantCreate {
    pub name: String,
    pub species: String,
    pub soil: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SensorReadingRecord {
    pub id: i64,
    pub plant_id: i64,
    pub soil_moisture: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub light_level: f64,
    pub soil_ph: Option<f64>,
    pub recorded_at: DateTime<Utc>,
}

impl SensorReadingRecord {
    pub fn to_reading(&self) -> SensorReading {
        SensorReading {
            soil_moisture: self.soil_moisture,
            temperature: self.temperature,
            humidity: self.humidity,
            light_level: self.light_level,
            soil_ph: self.soil_ph,
            recorded_at: self.recorded_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReadingCreate {
    pub soil_moisture: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub light_level: f64,
    pub soil_ph: Option<f64>,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct WateringEventRecord {
    pub id: i64,
    pub plant_id: i64,
    pub amount_ml: i64,
    pub duration_secs: Option<i64>,
    pub method: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct WateringCreate {
    pub amount_ml: i64,
    pub duration_secs: Option<i64>,
    pub method: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ChatMessageRecord {
    pub id: i64,
    pub session_id: String,
    pub plant_id: Option<i64>,
    pub role: String,
    pub content: String,
    pub source: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ChatMessageCreate {
    pub session_id: String,
    pub plant_id: Option<i64>,
    pub role: String,
    pub content: String,
    pub source: Option<String>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AssessmentRecord {
    pub id: i64,
    pub plant_id: i64,
    pub kind: String,
    /// JSON-serialized rule-engine output.
    pub payload: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AlertRecord {
    pub id: i64,
    pub plant_id: i64,
    pub category: String,
    pub severity: String,
    pub title: String,
    pub message: String,
    pub acknowledged: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct AlertCreate {
    pub plant_id: i64,
    pub category: String,
    pub severity: String,
    pub title: String,
    pub message: String,
}
