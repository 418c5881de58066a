//! Data shapes exchanged with templates and the bill store API.

pub mod api;
pub mod bill;
pub mod main;
