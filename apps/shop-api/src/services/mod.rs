//! Service layer.
//!
//! Handlers parse and validate requests, services do the work against the
//! database.

pub mod auth_service;
pub mod order_service;
