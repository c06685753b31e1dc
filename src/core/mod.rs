//! Core module - fundamental types and utilities

pub mod config;
pub mod dashboard;
pub mod entity;
pub mod fields;
pub mod identity;
pub mod schedule;
pub mod store;
pub mod validation;
pub mod workspace;

pub use config::Config;
pub use entity::LineItem;
pub use identity::{IdParseError, ItemId, ItemKind};
pub use schedule::{DeliveryStatus, RiskTier};
pub use store::{Store, StoreError};
pub use validation::ValidationErrors;
pub use workspace::{Workspace, WorkspaceError};
