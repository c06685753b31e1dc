//! Shared helper functions for CLI commands
//!
//! This module contains utility functions that are used across multiple
//! command modules to avoid code duplication.

use chrono::NaiveDate;
use clap::ValueEnum;
use miette::{IntoDiagnostic, Result};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::entity::LineItem;
use crate::core::identity::ItemId;
use crate::core::store::{self, Store};
use crate::core::{Config, Workspace};
use crate::entities::project::{select_project, Project};

/// Truncate a string to max_len characters, adding "..." if truncated
///
/// Useful for table columns that need fixed-width output.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Format an optional date for display, `-` when absent
pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Parse a calendar date given as `YYYY-MM-DD` or `MM/DD/YYYY`
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%m/%d/%Y"))
        .map_err(|_| format!("Invalid date '{}'. Use YYYY-MM-DD", s))
}

/// A date argument that can also clear a field
///
/// An empty string, `none` or `-` means "no date".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateValue(pub Option<NaiveDate>);

impl std::str::FromStr for DateValue {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" | "-" => Ok(DateValue(None)),
            _ => parse_date(s).map(|d| DateValue(Some(d))),
        }
    }
}

/// A non-date edit argument that can also clear a field (`none` or `-`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clearable<T>(pub Option<T>);

impl<T> std::str::FromStr for Clearable<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" | "-" => Ok(Clearable(None)),
            _ => s
                .trim()
                .parse()
                .map(|v| Clearable(Some(v)))
                .map_err(|e: T::Err| e.to_string()),
        }
    }
}

/// Everything a command needs to touch the workspace
pub struct Context {
    pub workspace: Workspace,
    pub store: Store,
    pub config: Config,
    format: OutputFormat,
    pub quiet: bool,
}

impl Context {
    /// Locate the workspace and load configuration
    pub fn open(global: &GlobalOpts) -> Result<Self> {
        let workspace =
            Workspace::open(global.workspace.as_deref()).map_err(|e| miette::miette!("{}", e))?;
        let config = Config::load(Some(&workspace));
        let store = workspace.store();
        tracing::debug!(
            root = %workspace.root().display(),
            data = %store.dir().display(),
            "opened workspace"
        );

        Ok(Self {
            workspace,
            store,
            config,
            format: global.format,
            quiet: global.quiet,
        })
    }

    /// Resolve the output format: explicit flag, then configured default,
    /// then `fallback`
    pub fn format_or(&self, fallback: OutputFormat) -> OutputFormat {
        resolve_format(self.format, self.config.default_format.as_deref(), fallback)
    }

    pub fn projects(&self) -> Vec<Project> {
        self.store.load_collection(store::PROJECTS)
    }

    pub fn active_project_name(&self) -> Option<String> {
        self.store.load_value(store::ACTIVE_PROJECT)
    }

    /// Pick the project a command operates on
    pub fn project(&self, requested: Option<&str>) -> Result<Project> {
        let projects = self.projects();
        if projects.is_empty() {
            return Err(miette::miette!(
                help = "create one with `sitetrack project new`",
                "no projects in this workspace"
            ));
        }

        let active = self.active_project_name();
        select_project(&projects, requested, active.as_deref())
            .cloned()
            .ok_or_else(|| miette::miette!("No project named '{}'", requested.unwrap_or_default()))
    }

    /// Load a line-item log.
    ///
    /// Records stored without an id of their kind are given one while
    /// decoding. Those ids are written back straight away so the id a list
    /// prints can be used by the next command.
    pub fn load<T: LineItem>(&self) -> Vec<T> {
        let documents = self.store.load_documents(T::STORE_KEY);
        let unassigned = documents
            .iter()
            .filter(|doc| {
                doc.get("id")
                    .and_then(|id| id.as_str())
                    .and_then(|id| ItemId::parse_of_kind(id, T::KIND))
                    .is_none()
            })
            .count();
        let items: Vec<T> = self.store.decode_collection(T::STORE_KEY, documents);

        if unassigned > 0 {
            match self.store.save_collection(T::STORE_KEY, &items) {
                Ok(()) => {
                    tracing::info!(key = T::STORE_KEY, count = unassigned, "assigned ids to stored records")
                }
                Err(e) => {
                    tracing::warn!(key = T::STORE_KEY, error = %e, "could not save assigned ids")
                }
            }
        }
        items
    }

    pub fn save<T: LineItem>(&self, items: &[T]) -> Result<()> {
        self.store.save_collection(T::STORE_KEY, items).into_diagnostic()
    }
}

/// Resolve an output format against a configured default
pub fn resolve_format(
    flag: OutputFormat,
    configured: Option<&str>,
    fallback: OutputFormat,
) -> OutputFormat {
    if flag != OutputFormat::Auto {
        return flag;
    }
    match configured.and_then(|s| OutputFormat::from_str(s, true).ok()) {
        Some(OutputFormat::Auto) | None => fallback,
        Some(f) => f,
    }
}

/// Find the index in `items` of the row `reference` points at.
///
/// A reference is a 1-based row number within the project (`3` or
/// `PRC@3`), a full id, or a unique tail of an id as printed in list output.
pub fn resolve_item<T: LineItem>(items: &[T], project: &str, reference: &str) -> Result<usize> {
    let reference = reference.trim();
    let in_project: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.project_name() == project)
        .map(|(i, _)| i)
        .collect();

    let row_number = reference
        .split_once('@')
        .filter(|(prefix, _)| prefix.eq_ignore_ascii_case(T::KIND.as_str()))
        .map(|(_, n)| n)
        .unwrap_or(reference);
    if let Ok(n) = row_number.parse::<usize>() {
        return n
            .checked_sub(1)
            .and_then(|i| in_project.get(i).copied())
            .ok_or_else(|| {
                miette::miette!(
                    "No {} row {} in project '{}' ({} rows)",
                    T::KIND.as_str(),
                    n,
                    project,
                    in_project.len()
                )
            });
    }

    let needle = reference.to_uppercase();
    let matches: Vec<usize> = in_project
        .into_iter()
        .filter(|&i| {
            let id = items[i].id().to_string();
            id == needle || id.ends_with(&needle) || items[i].id().short() == needle
        })
        .collect();

    match matches.as_slice() {
        [index] => Ok(*index),
        [] => Err(miette::miette!(
            "No {} item matching '{}' in project '{}'",
            T::KIND.as_str(),
            reference,
            project
        )),
        _ => Err(miette::miette!(
            help = format!(
                "candidates: {}",
                matches
                    .iter()
                    .map(|&i| items[i].title())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            "'{}' matches {} items; use more of the id",
            reference,
            matches.len()
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::ProcurementItem;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hi", 2), "hi");
        assert_eq!(truncate_str("béton armé coulé", 8), "béton...");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(NaiveDate::from_ymd_opt(2025, 6, 16)), "2025-06-16");
        assert_eq!(format_date(None), "-");
    }

    #[test]
    fn test_date_value() {
        let parsed: DateValue = "2025-06-30".parse().unwrap();
        assert_eq!(parsed.0, NaiveDate::from_ymd_opt(2025, 6, 30));
        let us: DateValue = "06/30/2025".parse().unwrap();
        assert_eq!(us.0, NaiveDate::from_ymd_opt(2025, 6, 30));
        assert_eq!("none".parse::<DateValue>().unwrap().0, None);
        assert_eq!("".parse::<DateValue>().unwrap().0, None);
        assert!("30th June".parse::<DateValue>().is_err());
    }

    #[test]
    fn test_clearable() {
        assert_eq!("4".parse::<Clearable<u32>>().unwrap().0, Some(4));
        assert_eq!("none".parse::<Clearable<u32>>().unwrap().0, None);
        assert!("four".parse::<Clearable<u32>>().is_err());
    }

    #[test]
    fn test_resolve_format() {
        assert_eq!(
            resolve_format(OutputFormat::Json, Some("csv"), OutputFormat::Tsv),
            OutputFormat::Json
        );
        assert_eq!(
            resolve_format(OutputFormat::Auto, Some("csv"), OutputFormat::Tsv),
            OutputFormat::Csv
        );
        assert_eq!(
            resolve_format(OutputFormat::Auto, Some("bogus"), OutputFormat::Tsv),
            OutputFormat::Tsv
        );
        assert_eq!(
            resolve_format(OutputFormat::Auto, None, OutputFormat::Yaml),
            OutputFormat::Yaml
        );
    }

    fn rows() -> Vec<ProcurementItem> {
        vec![
            ProcurementItem::new("Harbor Tower"),
            ProcurementItem::new("Depot"),
            ProcurementItem::new("Harbor Tower"),
        ]
    }

    #[test]
    fn test_resolve_by_row_number() {
        let items = rows();
        assert_eq!(resolve_item(&items, "Harbor Tower", "1").unwrap(), 0);
        assert_eq!(resolve_item(&items, "Harbor Tower", "2").unwrap(), 2);
        assert_eq!(resolve_item(&items, "Harbor Tower", "PRC@2").unwrap(), 2);
        assert_eq!(resolve_item(&items, "Depot", "1").unwrap(), 1);
        assert!(resolve_item(&items, "Harbor Tower", "3").is_err());
        assert!(resolve_item(&items, "Harbor Tower", "0").is_err());
    }

    #[test]
    fn test_resolve_by_id() {
        let items = rows();
        let full = items[2].id.to_string();
        assert_eq!(resolve_item(&items, "Harbor Tower", &full).unwrap(), 2);
        assert_eq!(
            resolve_item(&items, "Harbor Tower", &items[2].id.short().to_lowercase()).unwrap(),
            2
        );
        // Ids from another project are not visible
        assert!(resolve_item(&items, "Harbor Tower", &items[1].id.to_string()).is_err());
    }
}
