//! Domain types

pub mod auth;
pub mod entity;
pub mod predicate;
pub mod query;
