//! Project dashboard metrics

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::core::schedule::RiskTier;
use crate::entities::{ProcurementItem, Project, ProjectStatus, SubmittalItem};

/// A delayed procurement item as shown on the dashboard
#[derive(Debug, Clone, Serialize)]
pub struct DelayedItem {
    pub id: String,
    pub specifications: String,
    pub title_product: String,
    pub vendor_partner: String,
    pub required_onsite_date: Option<NaiveDate>,
    pub drop_dead_date: Option<NaiveDate>,
    pub order_date: Option<NaiveDate>,
    pub risk: RiskTier,
    pub comment_count: usize,
    pub last_comment: Option<String>,
}

/// Summary of one project's procurement and submittal logs
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub project: String,
    pub project_status: ProjectStatus,
    pub progress: u8,
    pub total_projects: usize,
    pub total_procurements: usize,
    pub total_submittals: usize,
    pub delayed_items: usize,
    /// Risk tier counts over every procurement item of the project
    pub risk_counts: BTreeMap<String, usize>,
    pub delayed: Vec<DelayedItem>,
}

/// Build the dashboard for `project`.
///
/// Item collections may contain other projects' rows; only rows whose
/// project name equals `project.name` are counted.
pub fn summarize(
    project: &Project,
    procurements: &[ProcurementItem],
    submittals: &[SubmittalItem],
) -> DashboardSummary {
    let project_procurements: Vec<&ProcurementItem> = procurements
        .iter()
        .filter(|item| item.project_name == project.name)
        .collect();
    let total_submittals = submittals
        .iter()
        .filter(|item| item.project_name == project.name)
        .count();

    let mut risk_counts = BTreeMap::new();
    for item in &project_procurements {
        *risk_counts.entry(item.risk_tier().to_string()).or_insert(0) += 1;
    }

    let delayed: Vec<DelayedItem> = project_procurements
        .iter()
        .filter(|item| item.is_delayed())
        .map(|item| DelayedItem {
            id: item.id.to_string(),
            specifications: item.specifications.clone(),
            title_product: item.title_product.clone(),
            vendor_partner: item.vendor_partner.clone(),
            required_onsite_date: item.required_onsite_date,
            drop_dead_date: item.drop_dead_date,
            order_date: item.order_date,
            risk: item.risk_tier(),
            comment_count: item.comments.len(),
            last_comment: item.comments.last().map(|c| c.text.clone()),
        })
        .collect();

    DashboardSummary {
        project: project.name.clone(),
        project_status: project.status,
        progress: project.progress,
        total_projects: 1,
        total_procurements: project_procurements.len(),
        total_submittals,
        delayed_items: delayed.len(),
        risk_counts,
        delayed,
    }
}
