//! Vigil Core
//!
//! Core types for watching job and file processing events on the
//! monitoring API.
//!
//! This crate contains:
//! - Domain types: entity kinds, entities and their events, queries, predicates
//! - DTOs: wire shapes for the token and events endpoints, plus response parsing

pub mod domain;
pub mod dto;
pub mod error;

pub use error::ParseError;
