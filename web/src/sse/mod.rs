//! SSE HTTP handler for the web layer.
//!
//! This module contains only the Axum handler for the tenant event stream.
//! The core SSE infrastructure (Manager, ConnectionRegistry) lives in the
//! `sse` crate to avoid circular dependencies.

pub mod handler;
