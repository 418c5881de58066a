//! Database and configuration models.

pub mod bill;
pub mod config;
