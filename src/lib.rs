//! Holidaze booking core: availability checks, a persisted session store and
//! a typed client for the Noroff Holidaze API, driven by a small CLI.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

#[cfg(test)]
mod test_support;
