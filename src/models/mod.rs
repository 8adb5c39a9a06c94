//! Core data models for the Holidaze booking client.
//!
//! These entities mirror the JSON shapes of the Noroff v2 Holidaze API.
//! They serialize with `camelCase` field names via `serde` so they can be
//! sent and received without an intermediate DTO layer.

pub mod booking;
pub mod profile;
pub mod session;
pub mod venue;
