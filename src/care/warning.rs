//! Early-warning analysis: risk rules, statistical anomalies and trends over
//! a window of recent readings.

use serde::{Deserialize, Serialize};

use super::SensorReading;
use super::profiles::{SpeciesKind, species_profile};
use super::round2;

/// Minimum window before anomaly statistics are meaningful.
const ANOMALY_MIN_WINDOW: usize = 4;
/// |z| above this flags a statistical anomaly.
const ANOMALY_Z_THRESHOLD: f64 = 2.5;
/// |slope| (units per step) below this counts as stable.
const TREND_STABLE_EPSILON: f64 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    SoilMoisture,
    Temperature,
    Humidity,
    LightLevel,
}

impl MetricKind {
    pub const ALL: [MetricKind; 4] = [
        MetricKind::SoilMoisture,
        MetricKind::Temperature,
        MetricKind::Humidity,
        MetricKind::LightLevel,
    ];

    fn extract(self, reading: &SensorReading) -> f64 {
        match self {
            MetricKind::SoilMoisture => reading.soil_moisture,
            MetricKind::Temperature => reading.temperature,
            MetricKind::Humidity => reading.humidity,
            MetricKind::LightLevel => reading.light_level,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskKind {
    WaterStress,
    HeatStress,
    ColdStress,
    FungalRisk,
    Overwatering,
}

impl RiskKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RiskKind::WaterStress => "water_stress",
            RiskKind::HeatStress => "heat_stress",
            RiskKind::ColdStress => "cold_stress",
            RiskKind::FungalRisk => "fungal_risk",
            RiskKind::Overwatering => "overwatering",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn from_level(level: f64) -> Self {
        if level >= 0.8 {
            Severity::Critical
        } else if level >= 0.6 {
            Severity::High
        } else if level >= 0.4 {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Risk {
    pub kind: RiskKind,
    /// Normalized risk level in [0, 1].
    pub level: f64,
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub metric: MetricKind,
    pub value: f64,
    pub window_mean: f64,
    pub z_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Rising,
    Falling,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trend {
    pub metric: MetricKind,
    /// Least-squares slope in metric units per reading step.
    pub slope: f64,
    pub direction: TrendDirection,
    /// One-step-ahead linear prediction.
    pub prediction: f64,
}

/// Alert candidate produced by a warning pass; persisted by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertDraft {
    pub category: String,
    pub severity: Severity,
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarningReport {
    pub risks: Vec<Risk>,
    pub anomalies: Vec<Anomaly>,
    pub trends: Vec<Trend>,
    pub alerts: Vec<AlertDraft>,
}

/// Run the full early-warning pass.
///
/// `history` is the recent window oldest-first, excluding `latest`; the
/// anomaly baseline must not contain the value under test. The pass still
/// works on an empty window (trend/anomaly sections are then empty).
pub fn evaluate_warnings(
    history: &[SensorReading],
    latest: &SensorReading,
    species: SpeciesKind,
) -> WarningReport {
    let trends = analyze_trends(history);
    let anomalies = detect_anomalies(history, latest);
    let risks = analyze_risks(latest, species, &trends);

    let mut alerts = Vec::new();
    for risk in risks.iter().filter(|r| r.level >= 0.4) {
        alerts.push(AlertDraft {
            category: risk.kind.as_str().to_string(),
            severity: risk.severity,
            title: risk_title(risk.kind).to_string(),
            message: risk.message.clone(),
        });
    }
    for anomaly in &anomalies {
        alerts.push(AlertDraft {
            category: "statistical_anomaly".to_string(),
            severity: Severity::Medium,
            title: format!("Unusual {:?} reading", anomaly.metric),
            message: format!(
                "Latest value {:.1} deviates from the recent mean {:.1} (z = {:.2})",
                anomaly.value, anomaly.window_mean, anomaly.z_score
            ),
        });
    }
    alerts.sort_by(|a, b| b.severity.cmp(&a.severity));

    WarningReport {
        risks,
        anomalies,
        trends,
        alerts,
    }
}

fn risk_title(kind: RiskKind) -> &'static str {
    match kind {
        RiskKind::WaterStress => "Water stress risk",
        RiskKind::HeatStress => "Heat stress risk",
        RiskKind::ColdStress => "Cold stress risk",
        RiskKind::FungalRisk => "Fungal disease risk",
        RiskKind::Overwatering => "Overwatering risk",
    }
}

fn analyze_risks(reading: &SensorReading, species: SpeciesKind, trends: &[Trend]) -> Vec<Risk> {
    let profile = species_profile(species);
    let mut risks = Vec::new();

    let moisture_falling = trends
        .iter()
        .find(|t| t.metric == MetricKind::SoilMoisture)
        .map(|t| t.direction == TrendDirection::Falling)
        // No trend data: assume the pessimistic case so dry soil still alerts.
        .unwrap_or(true);

    let stress_floor = profile.thresholds.critical + 5.0;
    if reading.soil_moisture < stress_floor && moisture_falling {
        let level = ((stress_floor - reading.soil_moisture) / stress_floor).clamp(0.0, 1.0);
        // Dry soil that keeps drying is urgent even when the gap is small.
        let level = level.max(0.4);
        risks.push(Risk {
            kind: RiskKind::WaterStress,
            level: round2(level),
            severity: Severity::from_level(level),
            message: format!(
                "Soil moisture {:.1}% is near the critical threshold and falling",
                reading.soil_moisture
            ),
        });
    }

    let heat_onset = profile.optimal_temperature.max + 5.0;
    if reading.temperature >= heat_onset {
        let level = ((reading.temperature - profile.optimal_temperature.max) / 15.0).clamp(0.0, 1.0);
        risks.push(Risk {
            kind: RiskKind::HeatStress,
            level: round2(level),
            severity: Severity::from_level(level),
            message: format!(
                "Temperature {:.1}°C is well above the comfortable maximum {:.1}°C",
                reading.temperature, profile.optimal_temperature.max
            ),
        });
    }

    let cold_onset = profile.optimal_temperature.min - 5.0;
    if reading.temperature <= cold_onset {
        let level = ((profile.optimal_temperature.min - reading.temperature) / 15.0).clamp(0.0, 1.0);
        risks.push(Risk {
            kind: RiskKind::ColdStress,
            level: round2(level),
            severity: Severity::from_level(level),
            message: format!(
                "Temperature {:.1}°C is well below the comfortable minimum {:.1}°C",
                reading.temperature, profile.optimal_temperature.min
            ),
        });
    }

    if reading.humidity > 80.0 && (15.0..=28.0).contains(&reading.temperature) {
        // Warm, saturated air is the classic fungal window.
        let level = (0.3 + (reading.humidity - 80.0) / 20.0 * 0.7).clamp(0.0, 1.0);
        risks.push(Risk {
            kind: RiskKind::FungalRisk,
            level: round2(level),
            severity: Severity::from_level(level),
            message: format!(
                "Humidity {:.1}% with mild temperature favors fungal growth",
                reading.humidity
            ),
        });
    }

    if reading.soil_moisture > profile.thresholds.wet {
        let level = ((reading.soil_moisture - profile.thresholds.wet)
            / (100.0 - profile.thresholds.wet))
            .clamp(0.0, 1.0)
            .max(0.4);
        risks.push(Risk {
            kind: RiskKind::Overwatering,
            level: round2(level),
            severity: Severity::from_level(level),
            message: format!(
                "Soil moisture {:.1}% exceeds the wet threshold {:.1}%",
                reading.soil_moisture, profile.thresholds.wet
            ),
        });
    }

    risks.sort_by(|a, b| b.level.total_cmp(&a.level));
    risks
}

fn detect_anomalies(history: &[SensorReading], latest: &SensorReading) -> Vec<Anomaly> {
    if history.len() < ANOMALY_MIN_WINDOW {
        return Vec::new();
    }

    let mut anomalies = Vec::new();
    for metric in MetricKind::ALL {
        let values: Vec<f64> = history.iter().map(|r| metric.extract(r)).collect();
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let variance =
            values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
        let std_dev = variance.sqrt();
        if std_dev == 0.0 {
            continue;
        }

        let value = metric.extract(latest);
        let z = (value - mean) / std_dev;
        if z.abs() > ANOMALY_Z_THRESHOLD {
            anomalies.push(Anomaly {
                metric,
                value,
                window_mean: round2(mean),
                z_score: round2(z),
            });
        }
    }
    anomalies
}

fn analyze_trends(history: &[SensorReading]) -> Vec<Trend> {
    if history.len() < 2 {
        return Vec::new();
    }

    let n = history.len() as f64;
    let mut trends = Vec::new();

    for metric in MetricKind::ALL {
        let values: Vec<f64> = history.iter().map(|r| metric.extract(r)).collect();

        // Least squares over x = 0..n-1.
        let x_mean = (n - 1.0) / 2.0;
        let y_mean = values.iter().sum::<f64>() / n;
        let mut sxy = 0.0;
        let mut sxx = 0.0;
        for (i, y) in values.iter().enumerate() {
            let dx = i as f64 - x_mean;
            sxy += dx * (y - y_mean);
            sxx += dx * dx;
        }
        let slope = if sxx == 0.0 { 0.0 } else { sxy / sxx };

        let direction = if slope > TREND_STABLE_EPSILON {
            TrendDirection::Rising
        } else if slope < -TREND_STABLE_EPSILON {
            TrendDirection::Falling
        } else {
            TrendDirection::Stable
        };

        trends.push(Trend {
            metric,
            slope: round2(slope),
            direction,
            prediction: round2(y_mean + slope * (n - x_mean)),
        });
    }

    trends
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn reading(moisture: f64, temperature: f64, humidity: f64, light: f64) -> SensorReading {
        SensorReading {
            soil_moisture: moisture,
            temperature,
            humidity,
            light_level: light,
            soil_ph: None,
            recorded_at: Utc::now(),
        }
    }

    fn series(moistures: &[f64]) -> Vec<SensorReading> {
        let start = Utc::now() - Duration::hours(moistures.len() as i64);
        moistures
            .iter()
            .enumerate()
            .map(|(i, &m)| SensorReading {
                soil_moisture: m,
                temperature: 24.0,
                humidity: 55.0,
                light_level: 50.0,
                soil_ph: None,
                recorded_at: start + Duration::hours(i as i64),
            })
            .collect()
    }

    #[test]
    fn falling_dry_soil_raises_water_stress_alert() {
        let history = series(&[40.0, 34.0, 28.0, 22.0, 16.0]);
        let latest = reading(12.0, 24.0, 55.0, 50.0);

        let report = evaluate_warnings(&history, &latest, SpeciesKind::Other);

        let stress = report
            .risks
            .iter()
            .find(|r| r.kind == RiskKind::WaterStress)
            .expect("expected water stress risk");
        assert!(stress.level >= 0.4);
        assert!(
            report
                .alerts
                .iter()
                .any(|a| a.category == "water_stress")
        );

        let moisture_trend = report
            .trends
            .iter()
            .find(|t| t.metric == MetricKind::SoilMoisture)
            .unwrap();
        assert_eq!(moisture_trend.direction, TrendDirection::Falling);
        assert!(moisture_trend.slope < -5.0);
    }

    #[test]
    fn rising_moisture_suppresses_water_stress() {
        // Same dry neighborhood, but recovering after a watering.
        let history = series(&[10.0, 12.0, 14.0, 16.0, 18.0]);
        let latest = reading(19.0, 24.0, 55.0, 50.0);

        let report = evaluate_warnings(&history, &latest, SpeciesKind::Other);
        assert!(!report.risks.iter().any(|r| r.kind == RiskKind::WaterStress));
    }

    #[test]
    fn warm_saturated_air_flags_fungal_risk() {
        let latest = reading(50.0, 22.0, 92.0, 40.0);
        let report = evaluate_warnings(&[], &latest, SpeciesKind::Tomato);

        let fungal = report
            .risks
            .iter()
            .find(|r| r.kind == RiskKind::FungalRisk)
            .expect("expected fungal risk");
        assert!(fungal.level > 0.6);
        assert!(fungal.severity >= Severity::High);
    }

    #[test]
    fn outlier_reading_detected_as_anomaly() {
        let history = series(&[50.0, 51.0, 49.0, 50.0, 52.0, 50.0]);
        let spike = reading(95.0, 24.0, 55.0, 50.0);

        let report = evaluate_warnings(&history, &spike, SpeciesKind::Other);
        assert!(
            report
                .anomalies
                .iter()
                .any(|a| a.metric == MetricKind::SoilMoisture)
        );
        assert!(
            report
                .alerts
                .iter()
                .any(|a| a.category == "statistical_anomaly")
        );
    }

    #[test]
    fn short_windows_skip_statistics() {
        let history = series(&[40.0, 38.0]);
        let latest = reading(37.0, 24.0, 55.0, 50.0);

        let report = evaluate_warnings(&history, &latest, SpeciesKind::Other);
        assert!(report.anomalies.is_empty());
        // Two points are still enough for a slope.
        assert_eq!(report.trends.len(), 4);
    }

    #[test]
    fn alerts_sort_most_severe_first() {
        // Hot, bone dry and falling: multiple alerts expected.
        let history = series(&[25.0, 20.0, 15.0, 10.0, 6.0]);
        let latest = reading(4.0, 41.0, 55.0, 50.0);

        let report = evaluate_warnings(&history, &latest, SpeciesKind::Other);
        assert!(report.alerts.len() >= 2);
        for pair in report.alerts.windows(2) {
            assert!(pair[0].severity >= pair[1].severity);
        }
    }
}
