//! `sitetrack dashboard` command - Project dashboard

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::Context;
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::dashboard::{self, DashboardSummary};
use crate::entities::{ProcurementItem, SubmittalItem};

#[derive(clap::Args, Debug)]
pub struct DashboardArgs {
    /// Project (default: active project)
    #[arg(long, short = 'P')]
    pub project: Option<String>,
}

pub fn run(args: DashboardArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::open(global)?;
    let project = ctx.project(args.project.as_deref())?;
    let procurements: Vec<ProcurementItem> = ctx.load();
    let submittals: Vec<SubmittalItem> = ctx.load();

    let summary = dashboard::summarize(&project, &procurements, &submittals);
    tracing::debug!(
        project = %summary.project,
        delayed = summary.delayed_items,
        "built dashboard"
    );

    match ctx.format_or(OutputFormat::Auto) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&summary).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&summary).into_diagnostic()?);
        }
        OutputFormat::Id => {
            for item in &summary.delayed {
                println!("{}", item.id);
            }
        }
        format => print_dashboard(&summary, format, ctx.quiet)?,
    }
    Ok(())
}

fn print_dashboard(summary: &DashboardSummary, format: OutputFormat, quiet: bool) -> Result<()> {
    let width = 68;

    println!(
        "{}",
        style(format!("{} Dashboard", summary.project)).bold().underlined()
    );
    println!("{}", "═".repeat(width));
    println!();

    let overview = vec![
        format!("Projects:     {}", summary.total_projects),
        format!("Procurement:  {}", summary.total_procurements),
        format!("Submittals:   {}", summary.total_submittals),
        format!("Delayed:      {}", summary.delayed_items),
        format!("Status:       {}", summary.project_status),
        format!("Progress:     {}%", summary.progress),
    ];
    let count = |tier: &str| summary.risk_counts.get(tier).copied().unwrap_or(0);
    let mut risk = vec![
        format!("High:       {}", count("high")),
        format!("Medium:     {}", count("medium")),
        format!("Low:        {}", count("low")),
        format!("Unknown:    {}", count("unknown")),
    ];
    if count("high") > 0 {
        risk[0] = format!("High:       {} {}", count("high"), style("⚠").red());
    }
    print_two_columns("OVERVIEW", &overview, "SCHEDULE RISK", &risk);

    println!();
    if summary.delayed.is_empty() {
        println!("{}", style("No delayed procurement items.").green());
    } else {
        println!("{}", style("DELAYED ITEMS").bold());
        let columns = [
            ColumnDef::new("title", "TITLE/PRODUCT", 28),
            ColumnDef::new("vendor", "VENDOR", 18),
            ColumnDef::new("drop_dead", "DROP-DEAD", 10),
            ColumnDef::new("order", "ORDERED", 10),
            ColumnDef::new("risk", "RISK", 7),
            ColumnDef::new("comments", "NOTES", 5),
            ColumnDef::new("last", "LATEST COMMENT", 30),
        ];
        let rows: Vec<TableRow> = summary
            .delayed
            .iter()
            .enumerate()
            .map(|(n, item)| {
                TableRow::new((n + 1).to_string(), item.id.clone())
                    .cell("title", CellValue::Text(item.title_product.clone()))
                    .cell("vendor", CellValue::Text(item.vendor_partner.clone()))
                    .cell("drop_dead", CellValue::Date(item.drop_dead_date))
                    .cell("order", CellValue::Date(item.order_date))
                    .cell("risk", CellValue::Risk(item.risk))
                    .cell("comments", CellValue::Count(item.comment_count))
                    .cell(
                        "last",
                        CellValue::Text(item.last_comment.clone().unwrap_or_default()),
                    )
            })
            .collect();
        TableFormatter::new(&columns, "delayed item")
            .quiet(true)
            .output(&rows, format)?;
    }

    if !quiet {
        println!();
        println!("{}", "═".repeat(width));
        let health = match (summary.delayed_items, count("high")) {
            (0, _) => style("On Track").green().bold(),
            (_, 0) => style("Watch").yellow().bold(),
            _ => style("At Risk").red().bold(),
        };
        println!("Schedule Health: {}", health);
    }
    Ok(())
}

fn print_two_columns(title1: &str, lines1: &[String], title2: &str, lines2: &[String]) {
    let col_width = 32;

    println!("{:<col_width$} {}", style(title1).bold(), style(title2).bold());
    println!("{:-<col_width$} {:-<col_width$}", "", "");

    let max_lines = lines1.len().max(lines2.len());
    for i in 0..max_lines {
        let l1 = lines1.get(i).map(|s| s.as_str()).unwrap_or("");
        let l2 = lines2.get(i).map(|s| s.as_str()).unwrap_or("");
        println!("  {:<30} {}", l1, l2);
    }
}
