//! Entity type definitions
//!
//! - [`Project`] - Construction project with budget, schedule and progress
//! - [`ProcurementItem`] - Material package with lead time and delivery status
//! - [`SubmittalItem`] - Shop drawing / product data routed for design review

pub mod procurement;
pub mod project;
pub mod submittal;

pub use procurement::{Comment, ProcurementItem};
pub use project::{Project, ProjectArea, ProjectDocument, ProjectStatus, TeamMember};
pub use submittal::{SubmittalItem, SubmittalStatus};
