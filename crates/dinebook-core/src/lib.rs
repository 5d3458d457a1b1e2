//! Core types and trait definitions for the dinebook restaurant directory.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! storage backend, the origin gateway and the sync layer all depend on it.

pub mod error;
pub mod gateway;
pub mod query;
pub mod restaurant;
pub mod review;
pub mod store;
pub mod wire;

pub use error::{Error, Result};
