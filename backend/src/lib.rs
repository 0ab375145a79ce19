//! # Slotbook
//!
//! Scheduling backend for a single host's public booking page.
//!
//! A host publishes event types (meeting kinds with a fixed duration), keeps
//! weekly availability with per-date overrides, and invitees book free slots.
//! The crate resolves a day's bookable window, cuts it into slots, keeps
//! confirmed bookings from overlapping and manages the booking lifecycle
//! (create, cancel, reschedule).
//!
//! ## Architecture
//!
//! - [`models`]: domain types (event types, availability, bookings, slots, IDs)
//! - [`scheduling`]: pure slot resolution, generation and conflict checks
//! - [`db`]: repository traits with in-memory and PostgreSQL backends
//! - [`services`]: booking lifecycle and host-side management
//! - [`config`]: service configuration
//! - [`http`]: Axum-based REST API

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod config;
pub mod db;
pub mod models;
pub mod scheduling;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
