//! Bookrate - restaurant booking and rating backend
//!
//! Users and restaurants register and log in for bearer tokens; bookings and
//! ratings are managed over a JSON HTTP API backed by SQLite.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
