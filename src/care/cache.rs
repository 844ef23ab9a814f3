//! TTL cache for watering assessments.
//!
//! Keyed by plant id plus a fingerprint of the rounded rule inputs, so a
//! repeated prediction over unchanged sensor state is served from memory.
//! The cache is an optimization only: hits and misses return identical
//! results because the engine is pure.

use std::hash::{Hash, Hasher};
use std::time::Duration;

use ahash::AHasher;
use moka::sync::Cache;

use super::SensorReading;
use super::profiles::{Season, SoilKind, SpeciesKind};
use super::watering::WateringAssessment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct AssessmentKey {
    plant_id: i64,
    fingerprint: u64,
}

#[derive(Clone)]
pub struct AssessmentCache {
    inner: Cache<AssessmentKey, WateringAssessment>,
}

impl AssessmentCache {
    pub fn new(ttl: Duration, max_capacity: u64) -> Self {
        Self {
            inner: Cache::builder()
                .time_to_live(ttl)
                .max_capacity(max_capacity)
                .build(),
        }
    }

    pub fn get(
        &self,
        plant_id: i64,
        reading: &SensorReading,
        species: SpeciesKind,
        soil: Option<SoilKind>,
        season: Option<Season>,
    ) -> Option<WateringAssessment> {
        self.inner
            .get(&key(plant_id, reading, species, soil, season))
    }

    pub fn insert(
        &self,
        plant_id: i64,
        reading: &SensorReading,
        species: SpeciesKind,
        soil: Option<SoilKind>,
        season: Option<Season>,
        assessment: WateringAssessment,
    ) {
        self.inner
            .insert(key(plant_id, reading, species, soil, season), assessment);
    }

    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }
}

fn key(
    plant_id: i64,
    reading: &SensorReading,
    species: SpeciesKind,
    soil: Option<SoilKind>,
    season: Option<Season>,
) -> AssessmentKey {
    let mut hasher = AHasher::default();
    // Tenth-of-a-unit resolution; sub-noise sensor jitter maps to one entry.
    ((reading.soil_moisture * 10.0).round() as i64).hash(&mut hasher);
    ((reading.temperature * 10.0).round() as i64).hash(&mut hasher);
    ((reading.humidity * 10.0).round() as i64).hash(&mut hasher);
    ((reading.light_level * 10.0).round() as i64).hash(&mut hasher);
    species.hash(&mut hasher);
    soil.hash(&mut hasher);
    season.hash(&mut hasher);

    AssessmentKey {
        plant_id,
        fingerprint: hasher.finish(),
    }
}
