pub mod alerts;
pub mod care;
pub mod chat;
pub mod plants;
pub mod sensors;
pub mod service;
