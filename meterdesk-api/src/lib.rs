//! # Meterdesk API Server Library
//!
//! Core functionality for the Meterdesk API server.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `cookies`: Refresh-token cookie handling
//! - `error`: Error handling and HTTP response mapping
//! - `response`: Success response envelope
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod cookies;
pub mod error;
pub mod middleware;
pub mod response;
pub mod routes;
