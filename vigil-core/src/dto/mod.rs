//! Wire shapes of the monitoring API

pub mod auth;
pub mod events;
