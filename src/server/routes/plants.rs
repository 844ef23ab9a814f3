use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::Deserialize;

use crate::care::{SoilKind, SpeciesKind};
use crate::db::{PlantCreate, PlantRecord};
use crate::error::VerdraError;
use crate::server::respond;
use crate::server::router::VerdraState;

#[derive(Debug, Deserialize)]
pub struct PlantCreateRequest {
    pub name: String,
    /// Parsed lax; unknown species are stored as `other`.
    #[serde(default)]
    pub species: Option<String>,
    /// Parsed strictly; a typo here would silently disable soil scaling.
    #[serde(default)]
    pub soil: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

pub async fn create_plant(
    State(state): State<VerdraState>,
    Json(req): Json<PlantCreateRequest>,
) -> Result<impl IntoResponse, VerdraError> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(VerdraError::validation("name", "must be non-empty"));
    }

    let species = req
        .species
        .as_deref()
        .map(|s| {
            s.parse::<SpeciesKind>()
                .unwrap_or(SpeciesKind::Other)
                .to_string()
        })
        .unwrap_or_else(|| SpeciesKind::Other.to_string());

    if let Some(soil) = req.soil.as_deref() {
        soil.parse::<SoilKind>()
            .map_err(|e| VerdraError::validation("soil", e.to_string()))?;
    }

    let id = state
        .db
        .create_plant(PlantCreate {
            name: name.to_string(),
            species,
            soil: req.soil.map(|s| s.trim().to_ascii_lowercase()),
            location: req.location,
            notes: req.notes,
        })
        .await?;

    let plant = state
        .db
        .get_plant(id)
        .await?
        .ok_or(VerdraError::PlantNotFound(id))?;

    Ok(respond::ok(plant))
}

pub async fn get_plant(
    State(state): State<VerdraState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, VerdraError> {
    let plant = fetch_plant(&state, id).await?;
    Ok(respond::ok(plant))
}

pub async fn list_plants(
    State(state): State<VerdraState>,
) -> Result<impl IntoResponse, VerdraError> {
    let plants = state.db.list_plants().await?;
    Ok(respond::ok(plants))
}

/// Shared plant lookup returning 404 for unknown ids.
pub(in crate::server) async fn fetch_plant(
    state: &VerdraState,
    id: i64,
) -> Result<PlantRecord, VerdraError> {
    state
        .db
        .get_plant(id)
        .await?
        .ok_or(VerdraError::PlantNotFound(id))
}
