//! Rule-based plant-care engine.
//!
//! Deterministic threshold arithmetic over sensor readings; no trained model.
//! Layout:
//! - `profiles.rs`: species/soil/season lookup tables
//! - `watering.rs`: watering prediction
//! - `health.rs`: health scoring
//! - `warning.rs`: risk / anomaly / trend analysis
//! - `cache.rs`: TTL cache for watering assessments

pub mod cache;
pub mod health;
pub mod profiles;
pub mod warning;
pub mod watering;

pub use cache::AssessmentCache;
pub use health::{HealthReport, HealthStatus, MetricBand, analyze_health};
pub use profiles::{Season, SoilKind, SpeciesKind, SpeciesProfile};
pub use warning::{Severity, WarningReport, evaluate_warnings};
pub use watering::{Urgency, WaterDose, WateringAssessment, assess_watering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One sensor measurement for a plant.
///
/// Moisture, humidity and light are percentages (0-100); temperature is °C.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub soil_moisture: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub light_level: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub soil_ph: Option<f64>,
    pub recorded_at: DateTime<Utc>,
}

/// Round to two decimal places, matching the precision the API reports.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
