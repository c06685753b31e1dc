//! Input validation for records entered by users
//!
//! Every check reports per-field problems instead of stopping at the first
//! one, so the CLI can show the whole list inline. Nothing is written when
//! validation fails.

use chrono::NaiveDate;
use miette::Diagnostic;
use thiserror::Error;

use crate::entities::project::format_budget;
use crate::entities::{
    ProcurementItem, Project, ProjectArea, ProjectDocument, ProjectStatus, SubmittalItem,
    TeamMember,
};

pub const MIN_BUDGET: u64 = 1_000;
pub const MAX_BUDGET: u64 = 1_000_000_000;
pub const MAX_PROJECT_NAME_LENGTH: usize = 100;
pub const MAX_TEAM_MEMBERS: usize = 20;
pub const MAX_AREAS: usize = 50;
pub const MAX_AREA_NAME_LENGTH: usize = 50;
pub const MAX_SPEC_ID_LENGTH: usize = 8;

/// A single failed check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// All failed checks for one record
#[derive(Debug, Error, Diagnostic)]
#[error("{}", summarize(.errors))]
#[diagnostic(
    code(sitetrack::validation),
    help("fix the fields listed above and run the command again")
)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

fn summarize(errors: &[FieldError]) -> String {
    let lines: Vec<String> = errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect();
    format!("validation failed\n  {}", lines.join("\n  "))
}

impl ValidationErrors {
    pub fn has(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }
}

#[derive(Default)]
struct Collector {
    errors: Vec<FieldError>,
}

impl Collector {
    fn check(&mut self, field: &'static str, result: Option<String>) {
        if let Some(message) = result {
            self.errors.push(FieldError { field, message });
        }
    }

    fn require(&mut self, field: &'static str, label: &str, value: &str) {
        if value.trim().is_empty() {
            self.errors.push(FieldError {
                field,
                message: format!("{} is required", label),
            });
        }
    }

    fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors {
                errors: self.errors,
            })
        }
    }
}

/// Keep only digits, truncated to the maximum specification id length
pub fn sanitize_spec_id(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_digit())
        .take(MAX_SPEC_ID_LENGTH)
        .collect()
}

/// Parse a budget typed as `$1,250,000`, `1250000`, etc.
pub fn parse_budget(value: &str) -> Result<u64, String> {
    let digits: String = value.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return Err("Budget must be a valid number".to_string());
    }
    digits
        .parse()
        .map_err(|_| "Budget must be a valid number".to_string())
}

/// Check a project name against length and case-insensitive uniqueness.
///
/// `editing` is the index in `existing` of the record being edited, which is
/// allowed to keep its own name.
pub fn validate_project_name(name: &str, existing: &[Project], editing: Option<usize>) -> Option<String> {
    if name.trim().is_empty() {
        return Some("Project name is required".to_string());
    }
    if name.chars().count() > MAX_PROJECT_NAME_LENGTH {
        return Some(format!(
            "Project name must be at most {} characters",
            MAX_PROJECT_NAME_LENGTH
        ));
    }
    let duplicate = existing
        .iter()
        .enumerate()
        .any(|(i, p)| Some(i) != editing && p.same_name(name));
    if duplicate {
        return Some("Project name already exists".to_string());
    }
    None
}

pub fn validate_budget(budget: Option<u64>) -> Option<String> {
    let Some(budget) = budget else {
        return Some("Budget is required".to_string());
    };
    if budget < MIN_BUDGET {
        return Some(format!(
            "Budget must be at least {}",
            format_budget(Some(MIN_BUDGET))
        ));
    }
    if budget > MAX_BUDGET {
        return Some(format!(
            "Budget cannot exceed {}",
            format_budget(Some(MAX_BUDGET))
        ));
    }
    None
}

pub fn validate_end_date(end_date: Option<NaiveDate>, is_new: bool, today: NaiveDate) -> Option<String> {
    let Some(end_date) = end_date else {
        return Some("Target end date is required".to_string());
    };
    if is_new && end_date < today {
        return Some("Target end date cannot be in the past for new projects".to_string());
    }
    None
}

pub fn validate_progress(progress: u8, status: ProjectStatus) -> Option<String> {
    if progress > 100 {
        return Some("Progress must be between 0 and 100".to_string());
    }
    match status {
        ProjectStatus::Completed if progress != 100 => {
            Some("Completed projects must have 100% progress".to_string())
        }
        ProjectStatus::NotStarted if progress != 0 => {
            Some("Not started projects must have 0% progress".to_string())
        }
        _ => None,
    }
}

/// Validate a whole project record before it is saved
pub fn validate_project(
    project: &Project,
    existing: &[Project],
    editing: Option<usize>,
    today: NaiveDate,
) -> Result<(), ValidationErrors> {
    let mut c = Collector::default();
    c.check("name", validate_project_name(&project.name, existing, editing));
    c.check("budget", validate_budget(project.budget));
    c.check("end_date", validate_end_date(project.end_date, editing.is_none(), today));
    c.check("progress", validate_progress(project.progress, project.status));
    c.finish()
}

pub fn validate_team_member(member: &TeamMember, existing: &[TeamMember]) -> Result<(), ValidationErrors> {
    let mut c = Collector::default();
    if existing.len() >= MAX_TEAM_MEMBERS {
        c.check(
            "team",
            Some(format!("Maximum {} team members allowed", MAX_TEAM_MEMBERS)),
        );
    }
    c.require("name", "Name", &member.name);
    c.require("role", "Role", &member.role);
    if existing
        .iter()
        .any(|m| m.name.to_lowercase() == member.name.to_lowercase())
    {
        c.check("name", Some("Team member already exists".to_string()));
    }
    c.finish()
}

pub fn validate_document(doc: &ProjectDocument, existing: &[ProjectDocument]) -> Result<(), ValidationErrors> {
    let mut c = Collector::default();
    c.require("name", "Document name", &doc.name);
    c.require("type", "Document type", &doc.doc_type);
    if existing
        .iter()
        .any(|d| d.name.to_lowercase() == doc.name.to_lowercase())
    {
        c.check("name", Some("Document already exists".to_string()));
    }
    c.finish()
}

pub fn validate_area(area: &ProjectArea, existing: &[ProjectArea]) -> Result<(), ValidationErrors> {
    let mut c = Collector::default();
    if existing.len() >= MAX_AREAS {
        c.check(
            "area",
            Some(format!("Maximum {} areas allowed per project", MAX_AREAS)),
        );
    }
    c.require("name", "Area name", &area.name);
    if area.name.chars().count() > MAX_AREA_NAME_LENGTH {
        c.check(
            "name",
            Some(format!(
                "Area name must be at most {} characters",
                MAX_AREA_NAME_LENGTH
            )),
        );
    }
    if existing
        .iter()
        .any(|a| a.name.to_lowercase() == area.name.to_lowercase())
    {
        c.check("name", Some("Area name already exists".to_string()));
    }
    c.finish()
}

fn require_line_fields(c: &mut Collector, spec: &str, title: &str, material: &str, vendor: &str) {
    c.require("specifications", "Specifications", spec);
    c.require("title_product", "Title/Product", title);
    c.require("material_id", "Material ID", material);
    c.require("vendor_partner", "Vendor/Partner", vendor);
}

pub fn validate_procurement(item: &ProcurementItem) -> Result<(), ValidationErrors> {
    let mut c = Collector::default();
    c.require("project", "Project", &item.project_name);
    require_line_fields(
        &mut c,
        &item.specifications,
        &item.title_product,
        &item.material_id,
        &item.vendor_partner,
    );
    c.finish()
}

pub fn validate_submittal(item: &SubmittalItem) -> Result<(), ValidationErrors> {
    let mut c = Collector::default();
    c.require("project", "Project", &item.project_name);
    require_line_fields(
        &mut c,
        &item.specifications,
        &item.title_product,
        &item.material_id,
        &item.vendor_partner,
    );
    c.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    fn valid_project() -> Project {
        let mut p = Project::new("Harbor Tower");
        p.budget = Some(2_500_000);
        p.end_date = NaiveDate::from_ymd_opt(2026, 6, 1);
        p
    }

    #[test]
    fn test_sanitize_spec_id() {
        assert_eq!(sanitize_spec_id("08 41 13"), "084113");
        assert_eq!(sanitize_spec_id("123456789"), "12345678");
        assert_eq!(sanitize_spec_id("abc"), "");
    }

    #[test]
    fn test_parse_budget() {
        assert_eq!(parse_budget("$1,250,000"), Ok(1_250_000));
        assert_eq!(parse_budget("5000"), Ok(5000));
        assert!(parse_budget("lots").is_err());
    }

    #[test]
    fn test_valid_project_passes() {
        assert!(validate_project(&valid_project(), &[], None, today()).is_ok());
    }

    #[test]
    fn test_project_name_rules() {
        let existing = vec![valid_project()];
        assert_eq!(
            validate_project_name("  ", &existing, None).as_deref(),
            Some("Project name is required")
        );
        assert_eq!(
            validate_project_name("HARBOR TOWER", &existing, None).as_deref(),
            Some("Project name already exists")
        );
        assert!(validate_project_name("Harbor Tower", &existing, Some(0)).is_none());
        assert!(validate_project_name(&"x".repeat(100), &existing, None).is_none());
        assert!(validate_project_name(&"x".repeat(101), &existing, None).is_some());
    }

    #[test]
    fn test_budget_bounds() {
        assert!(validate_budget(None).is_some());
        assert!(validate_budget(Some(999)).is_some());
        assert!(validate_budget(Some(1_000)).is_none());
        assert!(validate_budget(Some(1_000_000_000)).is_none());
        assert_eq!(
            validate_budget(Some(1_000_000_001)).as_deref(),
            Some("Budget cannot exceed $1,000,000,000")
        );
    }

    #[test]
    fn test_end_date_not_in_past_for_new() {
        let past = NaiveDate::from_ymd_opt(2024, 12, 31);
        assert!(validate_end_date(past, true, today()).is_some());
        assert!(validate_end_date(past, false, today()).is_none());
        assert!(validate_end_date(Some(today()), true, today()).is_none());
        assert!(validate_end_date(None, false, today()).is_some());
    }

    #[test]
    fn test_progress_consistency_with_status() {
        assert!(validate_progress(101, ProjectStatus::InProgress).is_some());
        assert!(validate_progress(90, ProjectStatus::Completed).is_some());
        assert!(validate_progress(100, ProjectStatus::Completed).is_none());
        assert!(validate_progress(10, ProjectStatus::NotStarted).is_some());
        assert!(validate_progress(0, ProjectStatus::NotStarted).is_none());
        assert!(validate_progress(55, ProjectStatus::OnHold).is_none());
    }

    #[test]
    fn test_project_collects_all_errors() {
        let mut p = Project::new("");
        p.status = ProjectStatus::Completed;
        p.progress = 40;
        let err = validate_project(&p, &[], None, today()).unwrap_err();
        assert!(err.has("name"));
        assert!(err.has("budget"));
        assert!(err.has("end_date"));
        assert!(err.has("progress"));
        assert!(err.to_string().contains("Completed projects must have 100% progress"));
    }

    #[test]
    fn test_team_member_rules() {
        let member = TeamMember {
            name: "Lee".to_string(),
            role: "Superintendent".to_string(),
        };
        assert!(validate_team_member(&member, &[]).is_ok());

        let err = validate_team_member(&member, std::slice::from_ref(&member)).unwrap_err();
        assert!(err.to_string().contains("Team member already exists"));

        let blank = TeamMember {
            name: "Kim".to_string(),
            role: String::new(),
        };
        assert!(validate_team_member(&blank, &[]).unwrap_err().has("role"));

        let full: Vec<TeamMember> = (0..MAX_TEAM_MEMBERS)
            .map(|i| TeamMember {
                name: format!("Member {}", i),
                role: "Crew".to_string(),
            })
            .collect();
        assert!(validate_team_member(&blank, &full).unwrap_err().has("team"));
    }

    #[test]
    fn test_document_rules() {
        let doc = ProjectDocument {
            name: "Geotech".to_string(),
            doc_type: "Report".to_string(),
        };
        assert!(validate_document(&doc, &[]).is_ok());
        let dup = ProjectDocument {
            name: "GEOTECH".to_string(),
            doc_type: "PDF".to_string(),
        };
        assert!(validate_document(&dup, std::slice::from_ref(&doc)).is_err());
    }

    #[test]
    fn test_area_rules() {
        let area = ProjectArea::new("Level 2", "East wing");
        assert!(validate_area(&area, &[]).is_ok());

        let dup = ProjectArea::new("level 2", "");
        let err = validate_area(&dup, std::slice::from_ref(&area)).unwrap_err();
        assert!(err.to_string().contains("Area name already exists"));

        assert!(validate_area(&ProjectArea::new(" ", ""), &[]).unwrap_err().has("name"));
        assert!(validate_area(&ProjectArea::new("x".repeat(50), ""), &[]).is_ok());
        assert!(validate_area(&ProjectArea::new("x".repeat(51), ""), &[]).is_err());

        let full: Vec<ProjectArea> = (0..MAX_AREAS)
            .map(|i| ProjectArea::new(format!("Zone {}", i), ""))
            .collect();
        let err = validate_area(&ProjectArea::new("Roof", ""), &full).unwrap_err();
        assert!(err.to_string().contains("Maximum 50 areas allowed per project"));
    }

    #[test]
    fn test_line_item_required_fields() {
        let mut item = ProcurementItem::new("Harbor Tower");
        let err = validate_procurement(&item).unwrap_err();
        assert_eq!(err.errors.len(), 4);

        item.specifications = "08410".to_string();
        item.title_product = "Curtain wall".to_string();
        item.material_id = "CW-1".to_string();
        item.vendor_partner = "Glazing Co".to_string();
        assert!(validate_procurement(&item).is_ok());

        let sub = SubmittalItem::new("");
        let err = validate_submittal(&sub).unwrap_err();
        assert!(err.has("project"));
        assert!(err.has("vendor_partner"));
    }
}
