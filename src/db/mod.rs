//! Database module: models and schema for persistent storage.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `actor.rs`: the owning actor and its RPC handle

pub mod actor;
pub mod models;
pub mod schema;

pub use models::{
    AlertCreate, AlertRecord, AssessmentRecord, ChatMessageCreate, ChatMessageRecord, PlantCreate,
    PlantRecord, ReadingCreate, SensorReadingRecord, WateringCreate, WateringEventRecord,
};
pub use schema::SQLITE_INIT;

pub use actor::{DbActorHandle, spawn};
