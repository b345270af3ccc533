//! Shared request parameters and response views for the Certward API.

pub mod params;
pub mod views;
