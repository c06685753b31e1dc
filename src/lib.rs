//! sitetrack: construction project tracking
//!
//! Keeps projects, procurement logs and submittal logs in a small
//! workspace-local JSON store, and derives drop-dead dates, delivery status
//! and schedule risk for ordered materials.

pub mod cli;
pub mod core;
pub mod entities;
