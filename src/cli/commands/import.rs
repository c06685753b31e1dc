//! `sitetrack import` command - Import a material list from CSV
//!
//! Each data row becomes one procurement item and one submittal for the
//! target project, so both logs start from the same material list. Rows
//! missing a required value are skipped and reported; they reach neither log.

use console::style;
use csv::{ReaderBuilder, StringRecord};
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::PathBuf;

use crate::cli::helpers::Context;
use crate::cli::GlobalOpts;
use crate::core::validation::{sanitize_spec_id, validate_procurement};
use crate::entities::{ProcurementItem, SubmittalItem};

/// Column headers a material list must carry (matched case-insensitively)
pub const REQUIRED_HEADERS: [&str; 4] =
    ["Specifications", "Title/Product", "Material ID", "Vendor/Partner"];

#[derive(clap::Args, Debug)]
pub struct ImportArgs {
    /// CSV file to import
    pub file: Option<PathBuf>,

    /// Project (default: active project)
    #[arg(long, short = 'P')]
    pub project: Option<String>,

    /// Print a CSV header template and exit
    #[arg(long)]
    pub template: bool,

    /// Validate the CSV without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

/// A data row left out of the import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    /// 1-based CSV line number
    pub line: usize,
    pub reason: String,
}

/// Rows read from a material list
#[derive(Debug, Default)]
pub struct MaterialList {
    pub procurements: Vec<ProcurementItem>,
    pub submittals: Vec<SubmittalItem>,
    /// Rows missing a required value
    pub skipped: Vec<SkippedRow>,
}

pub fn run(args: ImportArgs, global: &GlobalOpts) -> Result<()> {
    if args.template {
        println!("{}", REQUIRED_HEADERS.join(","));
        return Ok(());
    }

    let file_path = args.file.clone().ok_or_else(|| {
        miette::miette!("CSV file required. Usage: sitetrack import materials.csv")
    })?;
    if !file_path.exists() {
        return Err(miette::miette!("File not found: {}", file_path.display()));
    }

    let ctx = Context::open(global)?;
    let project = ctx.project(args.project.as_deref())?;

    if !ctx.quiet {
        println!(
            "{} Importing material list {} into {}{}",
            style("→").blue(),
            style(file_path.display()).yellow(),
            style(&project.name).cyan(),
            if args.dry_run {
                style(" (dry run)").dim().to_string()
            } else {
                String::new()
            }
        );
    }

    let file = File::open(&file_path).into_diagnostic()?;
    let list = read_material_list(BufReader::new(file), &project.name)?;

    for row in &list.skipped {
        eprintln!(
            "{} Row {} skipped: {}",
            style("!").yellow(),
            row.line,
            row.reason
        );
    }

    if !args.dry_run {
        let mut procurements: Vec<ProcurementItem> = ctx.load();
        procurements.extend(list.procurements.iter().cloned());
        ctx.save(&procurements)?;

        let mut submittals: Vec<SubmittalItem> = ctx.load();
        submittals.extend(list.submittals.iter().cloned());
        ctx.save(&submittals)?;
    }
    tracing::info!(
        project = %project.name,
        rows = list.procurements.len(),
        skipped = list.skipped.len(),
        dry_run = args.dry_run,
        "imported material list"
    );

    if !ctx.quiet {
        println!();
        println!("{}", style("─".repeat(50)).dim());
        println!("{}", style("Import Summary").bold());
        println!("{}", style("─".repeat(50)).dim());
        println!(
            "  Rows processed:     {}",
            style(list.procurements.len() + list.skipped.len()).cyan()
        );
        println!(
            "  Procurement items:  {}",
            style(list.procurements.len()).green()
        );
        println!("  Submittals:         {}", style(list.submittals.len()).green());
        if !list.skipped.is_empty() {
            println!(
                "  Skipped rows:       {}",
                style(list.skipped.len()).yellow()
            );
        }
        if args.dry_run {
            println!();
            println!("{}", style("Dry run: nothing was written.").dim());
        }
    }
    Ok(())
}

/// Column positions of the required headers
fn locate_columns(headers: &StringRecord) -> Result<[usize; 4]> {
    let lowered: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
    let mut positions = [0usize; 4];
    let mut missing = Vec::new();

    for (slot, wanted) in positions.iter_mut().zip(REQUIRED_HEADERS) {
        match lowered.iter().position(|h| *h == wanted.to_lowercase()) {
            Some(index) => *slot = index,
            None => missing.push(wanted),
        }
    }

    if missing.is_empty() {
        Ok(positions)
    } else {
        Err(miette::miette!(
            help = format!("the header row must contain: {}", REQUIRED_HEADERS.join(", ")),
            "Missing required columns: {}",
            missing.join(", ")
        ))
    }
}

/// Parse a material list into procurement and submittal rows for `project`
pub fn read_material_list<R: Read>(reader: R, project: &str) -> Result<MaterialList> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers().into_diagnostic()?.clone();
    let [spec_idx, title_idx, material_idx, vendor_idx] = locate_columns(&headers)?;

    let mut list = MaterialList::default();
    for (row_idx, result) in rdr.records().enumerate() {
        let row_num = row_idx + 2;
        let record = result
            .map_err(|e| miette::miette!("CSV parse error at row {}: {}", row_num, e))?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        let field = |i: usize| record.get(i).unwrap_or_default().to_string();

        let mut procurement = ProcurementItem::new(project);
        procurement.specifications = sanitize_spec_id(&field(spec_idx));
        procurement.title_product = field(title_idx);
        procurement.material_id = field(material_idx);
        procurement.vendor_partner = field(vendor_idx);

        if let Err(e) = validate_procurement(&procurement) {
            let reason = e
                .errors
                .iter()
                .map(|f| f.message.clone())
                .collect::<Vec<_>>()
                .join("; ");
            list.skipped.push(SkippedRow {
                line: row_num,
                reason,
            });
            continue;
        }

        let mut submittal = SubmittalItem::new(project);
        submittal.specifications = procurement.specifications.clone();
        submittal.title_product = procurement.title_product.clone();
        submittal.material_id = procurement.material_id.clone();
        submittal.vendor_partner = procurement.vendor_partner.clone();

        list.procurements.push(procurement);
        list.submittals.push(submittal);
    }

    if list.procurements.is_empty() {
        if !list.skipped.is_empty() {
            let lines: Vec<String> = list.skipped.iter().map(|r| r.line.to_string()).collect();
            return Err(miette::miette!(
                help = format!("fill in {} on every row", REQUIRED_HEADERS.join(", ")),
                "No complete rows to import (incomplete rows: {})",
                lines.join(", ")
            ));
        }
        return Err(miette::miette!("No data found: the material list has no rows"));
    }
    Ok(list)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_rows_into_both_logs() {
        let csv = "Specifications,Title/Product,Material ID,Vendor/Partner\n\
                   05 12 00,Structural steel,STL-1,Ironworks\n\
                   08410,Curtain wall,CW-1,Glazing Co\n";
        let list = read_material_list(csv.as_bytes(), "Harbor Tower").unwrap();

        assert_eq!(list.procurements.len(), 2);
        assert_eq!(list.submittals.len(), 2);
        assert_eq!(list.procurements[0].specifications, "051200");
        assert_eq!(list.procurements[1].vendor_partner, "Glazing Co");
        assert_eq!(list.submittals[1].title_product, "Curtain wall");
        assert!(list.procurements.iter().all(|p| p.project_name == "Harbor Tower"));
        assert!(list.skipped.is_empty());
    }

    #[test]
    fn test_headers_are_case_insensitive_and_reorderable() {
        let csv = "vendor/partner,MATERIAL ID,notes,title/product,specifications\n\
                   Ironworks,STL-1,ignored,Structural steel,051200\n";
        let list = read_material_list(csv.as_bytes(), "Depot").unwrap();
        assert_eq!(list.procurements[0].material_id, "STL-1");
        assert_eq!(list.procurements[0].title_product, "Structural steel");
    }

    #[test]
    fn test_missing_header_is_an_error() {
        let csv = "Specifications,Title/Product,Vendor/Partner\n051200,Steel,Ironworks\n";
        let err = read_material_list(csv.as_bytes(), "Depot").unwrap_err();
        assert!(err.to_string().contains("Material ID"));
    }

    #[test]
    fn test_header_only_is_an_error() {
        let csv = "Specifications,Title/Product,Material ID,Vendor/Partner\n";
        let err = read_material_list(csv.as_bytes(), "Depot").unwrap_err();
        assert!(err.to_string().contains("No data found"));
    }

    #[test]
    fn test_incomplete_and_blank_rows() {
        let csv = "Specifications,Title/Product,Material ID,Vendor/Partner\n\
                   051200,Steel,,Ironworks\n\
                   ,,,\n\
                   08410,Curtain wall,CW-1,Glazing Co\n";
        let list = read_material_list(csv.as_bytes(), "Depot").unwrap();
        assert_eq!(list.procurements.len(), 1);
        assert_eq!(list.submittals.len(), 1);
        assert_eq!(list.procurements[0].title_product, "Curtain wall");
        assert_eq!(list.skipped.len(), 1);
        assert_eq!(list.skipped[0].line, 2);
        assert!(list.skipped[0].reason.contains("Material ID is required"));
    }

    #[test]
    fn test_only_incomplete_rows_is_an_error() {
        let csv = "Specifications,Title/Product,Material ID,Vendor/Partner
                   051200,Steel,,Ironworks
                   ,Glass,GL-1,
";
        let err = read_material_list(csv.as_bytes(), "Depot").unwrap_err();
        assert!(err.to_string().contains("No complete rows to import"));
        assert!(err.to_string().contains("2, 3"));
    }
}
