//! Project record, team members, documents and areas

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::fields::{display_or_empty, empty_as_default, empty_as_none, loose_text};

/// Project delivery status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectStatus {
    #[default]
    #[serde(rename = "Not Started")]
    NotStarted,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "On Hold")]
    OnHold,
    Completed,
    Delayed,
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectStatus::NotStarted => write!(f, "Not Started"),
            ProjectStatus::InProgress => write!(f, "In Progress"),
            ProjectStatus::OnHold => write!(f, "On Hold"),
            ProjectStatus::Completed => write!(f, "Completed"),
            ProjectStatus::Delayed => write!(f, "Delayed"),
        }
    }
}

impl std::str::FromStr for ProjectStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['_', '-'], " ").trim() {
            "not started" | "notstarted" => Ok(ProjectStatus::NotStarted),
            "in progress" | "inprogress" => Ok(ProjectStatus::InProgress),
            "on hold" | "onhold" => Ok(ProjectStatus::OnHold),
            "completed" => Ok(ProjectStatus::Completed),
            "delayed" => Ok(ProjectStatus::Delayed),
            _ => Err(format!(
                "Invalid project status: {}. Use not-started, in-progress, on-hold, completed, or delayed",
                s
            )),
        }
    }
}

/// Progress ranges used when filtering project lists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressBucket {
    /// Below 25%
    Starting,
    /// 25% up to 50%
    Early,
    /// 50% up to 75%
    Advanced,
    /// 75% and above
    Finishing,
}

impl ProgressBucket {
    /// Map the 1-4 filter levels used on the command line
    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            1 => Some(ProgressBucket::Starting),
            2 => Some(ProgressBucket::Early),
            3 => Some(ProgressBucket::Advanced),
            4 => Some(ProgressBucket::Finishing),
            _ => None,
        }
    }

    pub fn contains(&self, progress: u8) -> bool {
        match self {
            ProgressBucket::Starting => progress < 25,
            ProgressBucket::Early => (25..50).contains(&progress),
            ProgressBucket::Advanced => (50..75).contains(&progress),
            ProgressBucket::Finishing => progress >= 75,
        }
    }
}

/// A construction project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Unique (case-insensitive) project name
    #[serde(default, deserialize_with = "loose_text")]
    pub name: String,

    /// Budget in whole dollars
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub budget: Option<u64>,

    /// Target end date
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        serialize_with = "display_or_empty"
    )]
    pub end_date: Option<NaiveDate>,

    /// Unrecognised stored statuses read as Not Started
    #[serde(default, deserialize_with = "empty_as_default")]
    pub status: ProjectStatus,

    /// Percent complete, 0-100
    #[serde(default, deserialize_with = "empty_as_default")]
    pub progress: u8,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            budget: None,
            end_date: None,
            status: ProjectStatus::default(),
            progress: 0,
        }
    }

    /// Case-insensitive name comparison used for uniqueness checks
    pub fn same_name(&self, other: &str) -> bool {
        self.name.to_lowercase() == other.to_lowercase()
    }

    /// Whether a free-text search matches the name or the budget digits
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.name.to_lowercase().contains(&term)
            || self
                .budget
                .is_some_and(|b| b.to_string().contains(&term))
    }
}

/// Project team member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    #[serde(default, deserialize_with = "loose_text")]
    pub name: String,
    #[serde(default, deserialize_with = "loose_text")]
    pub role: String,
}

/// Document registered against a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDocument {
    #[serde(default, deserialize_with = "loose_text")]
    pub name: String,
    #[serde(rename = "type", default, deserialize_with = "loose_text")]
    pub doc_type: String,
}

/// A named part of the site (floor, wing, zone) used to break a project down
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectArea {
    #[serde(default, deserialize_with = "loose_text")]
    pub name: String,

    #[serde(default, deserialize_with = "loose_text")]
    pub description: String,

    /// Creation time in milliseconds since the Unix epoch
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,

    /// Fields sitetrack does not manage, such as key plans and material lists
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ProjectArea {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            id: u64::try_from(chrono::Utc::now().timestamp_millis()).ok(),
            extra: serde_json::Map::new(),
        }
    }
}

/// Pick the project commands should operate on.
///
/// An explicitly requested name must exist. Otherwise the stored active
/// project is used if it still exists, falling back to the first project.
pub fn select_project<'a>(
    projects: &'a [Project],
    requested: Option<&str>,
    active: Option<&str>,
) -> Option<&'a Project> {
    if let Some(name) = requested {
        return projects.iter().find(|p| p.same_name(name));
    }
    active
        .and_then(|name| projects.iter().find(|p| p.name == name))
        .or_else(|| projects.first())
}

/// Format whole dollars with thousands separators, e.g. `$1,250,000`
pub fn format_budget(budget: Option<u64>) -> String {
    let Some(value) = budget else {
        return String::new();
    };

    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    out.push('$');
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
