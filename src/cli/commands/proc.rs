//! `sitetrack proc` command - Procurement log

use chrono::NaiveDate;
use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{format_date, parse_date, resolve_item, Clearable, Context, DateValue};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::schedule::{DeliveryStatus, RiskTier};
use crate::core::validation::{sanitize_spec_id, validate_procurement};
use crate::entities::ProcurementItem;

#[derive(Subcommand, Debug)]
pub enum ProcCommands {
    /// Add a procurement item
    New(NewArgs),

    /// List procurement items with filtering
    List(ListArgs),

    /// Show an item's details and comments
    Show(ItemArgs),

    /// Edit an item; drop-dead date and status are re-derived
    Edit(EditArgs),

    /// Delete an item
    Delete(ItemArgs),

    /// Add a comment to an item
    Comment(CommentArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Project (default: active project)
    #[arg(long, short = 'P')]
    pub project: Option<String>,

    /// Specification section (digits only, up to 8)
    #[arg(long)]
    pub spec: String,

    /// Product title
    #[arg(long, short = 't')]
    pub title: String,

    /// Material id
    #[arg(long, short = 'm')]
    pub material: String,

    /// Vendor or partner
    #[arg(long)]
    pub vendor: String,

    /// Required on-site date (YYYY-MM-DD)
    #[arg(long, short = 'r', value_parser = parse_date)]
    pub required: Option<NaiveDate>,

    /// Lead time in weeks
    #[arg(long, short = 'l')]
    pub lead_weeks: Option<u32>,

    /// Order date (YYYY-MM-DD)
    #[arg(long, short = 'o', value_parser = parse_date)]
    pub order: Option<NaiveDate>,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Project (default: active project)
    #[arg(long, short = 'P')]
    pub project: Option<String>,

    /// Filter by delivery status (delayed, on-time, early)
    #[arg(long, short = 's')]
    pub status: Option<DeliveryStatus>,

    /// Filter by risk tier (low, medium, high, unknown)
    #[arg(long)]
    pub risk: Option<RiskTier>,

    /// Search in title, material id and vendor
    #[arg(long)]
    pub search: Option<String>,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct ItemArgs {
    /// Row number (3 or PRC@3) or item id
    pub item: String,

    /// Project (default: active project)
    #[arg(long, short = 'P')]
    pub project: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Row number (3 or PRC@3) or item id
    pub item: String,

    /// Project (default: active project)
    #[arg(long, short = 'P')]
    pub project: Option<String>,

    #[arg(long)]
    pub spec: Option<String>,

    #[arg(long, short = 't')]
    pub title: Option<String>,

    #[arg(long, short = 'm')]
    pub material: Option<String>,

    #[arg(long)]
    pub vendor: Option<String>,

    /// Required on-site date (`none` clears)
    #[arg(long, short = 'r')]
    pub required: Option<DateValue>,

    /// Lead time in weeks (`none` clears)
    #[arg(long, short = 'l')]
    pub lead_weeks: Option<Clearable<u32>>,

    /// Order date (`none` clears)
    #[arg(long, short = 'o')]
    pub order: Option<DateValue>,
}

#[derive(clap::Args, Debug)]
pub struct CommentArgs {
    /// Row number (3 or PRC@3) or item id
    pub item: String,

    /// Comment text
    pub text: String,

    /// Project (default: active project)
    #[arg(long, short = 'P')]
    pub project: Option<String>,

    /// Comment author (default: configured author)
    #[arg(long)]
    pub author: Option<String>,
}

/// Run a procurement subcommand
pub fn run(cmd: ProcCommands, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::open(global)?;
    match cmd {
        ProcCommands::New(args) => run_new(&ctx, args),
        ProcCommands::List(args) => run_list(&ctx, args),
        ProcCommands::Show(args) => run_show(&ctx, args),
        ProcCommands::Edit(args) => run_edit(&ctx, args),
        ProcCommands::Delete(args) => run_delete(&ctx, args),
        ProcCommands::Comment(args) => run_comment(&ctx, args),
    }
}

/// Row reference of `index` within its project, as printed by `list`
fn row_ref(items: &[ProcurementItem], index: usize) -> String {
    let project = &items[index].project_name;
    let n = items[..=index]
        .iter()
        .filter(|i| &i.project_name == project)
        .count();
    format!("PRC@{}", n)
}

fn print_schedule(item: &ProcurementItem) {
    let status = match item.status {
        Some(DeliveryStatus::Delayed) => style("Delayed".to_string()).red().bold(),
        Some(s) => style(s.to_string()).green(),
        None => style("-".to_string()).dim(),
    };
    println!(
        "   Drop-dead: {} | Status: {} | Risk: {}",
        style(format_date(item.drop_dead_date)).yellow(),
        status,
        item.risk_tier()
    );
}

fn run_new(ctx: &Context, args: NewArgs) -> Result<()> {
    let project = ctx.project(args.project.as_deref())?;
    let mut items: Vec<ProcurementItem> = ctx.load();

    let mut item = ProcurementItem::new(&project.name);
    item.specifications = sanitize_spec_id(&args.spec);
    item.title_product = args.title.trim().to_string();
    item.material_id = args.material.trim().to_string();
    item.vendor_partner = args.vendor.trim().to_string();
    item.required_onsite_date = args.required;
    item.lead_time = args.lead_weeks;
    item.order_date = args.order;
    item.recompute();
    validate_procurement(&item)?;

    items.push(item);
    ctx.save(&items)?;
    let index = items.len() - 1;
    let item = &items[index];
    tracing::info!(id = %item.id, project = %project.name, "added procurement item");

    if !ctx.quiet {
        println!(
            "{} Added {} {} to {}",
            style("✓").green(),
            style(row_ref(&items, index)).cyan(),
            style(&item.title_product).yellow(),
            project.name
        );
        print_schedule(item);
    }
    Ok(())
}

fn run_list(ctx: &Context, args: ListArgs) -> Result<()> {
    let project = ctx.project(args.project.as_deref())?;
    let items: Vec<ProcurementItem> = ctx.load();

    // Row numbers count every item of the project, before filtering
    let rows: Vec<(usize, &ProcurementItem)> = items
        .iter()
        .filter(|i| i.project_name == project.name)
        .enumerate()
        .map(|(n, i)| (n + 1, i))
        .filter(|(_, i)| args.status.map_or(true, |s| i.status == Some(s)))
        .filter(|(_, i)| args.risk.map_or(true, |r| i.risk_tier() == r))
        .filter(|(_, i)| {
            args.search.as_deref().map_or(true, |term| {
                let term = term.to_lowercase();
                [&i.title_product, &i.material_id, &i.vendor_partner]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&term))
            })
        })
        .collect();

    if args.count {
        println!("{}", rows.len());
        return Ok(());
    }

    match ctx.format_or(OutputFormat::Tsv) {
        OutputFormat::Json => {
            let selected: Vec<&ProcurementItem> = rows.iter().map(|(_, i)| *i).collect();
            println!("{}", serde_json::to_string_pretty(&selected).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            let selected: Vec<&ProcurementItem> = rows.iter().map(|(_, i)| *i).collect();
            print!("{}", serde_yml::to_string(&selected).into_diagnostic()?);
        }
        format => {
            if rows.is_empty() {
                if !ctx.quiet {
                    println!("No procurement items found for {}.", project.name);
                }
                return Ok(());
            }

            let columns = [
                ColumnDef::new("id", "ID", 12),
                ColumnDef::new("spec", "SPEC", 8),
                ColumnDef::new("title", "TITLE/PRODUCT", 28),
                ColumnDef::new("vendor", "VENDOR", 18),
                ColumnDef::new("required", "REQUIRED", 10),
                ColumnDef::new("lead", "LEAD", 4),
                ColumnDef::new("drop_dead", "DROP-DEAD", 10),
                ColumnDef::new("order", "ORDERED", 10),
                ColumnDef::new("status", "STATUS", 8),
                ColumnDef::new("risk", "RISK", 7),
                ColumnDef::new("comments", "NOTES", 5),
            ];
            let table: Vec<TableRow> = rows
                .iter()
                .map(|(n, i)| {
                    TableRow::new(format!("PRC@{}", n), i.id.to_string())
                        .cell("id", CellValue::Id(i.id.short()))
                        .cell("spec", CellValue::Text(i.specifications.clone()))
                        .cell("title", CellValue::Text(i.title_product.clone()))
                        .cell("vendor", CellValue::Text(i.vendor_partner.clone()))
                        .cell("required", CellValue::Date(i.required_onsite_date))
                        .cell("lead", CellValue::Number(i.lead_time))
                        .cell("drop_dead", CellValue::Date(i.drop_dead_date))
                        .cell("order", CellValue::Date(i.order_date))
                        .cell("status", CellValue::Delivery(i.status))
                        .cell("risk", CellValue::Risk(i.risk_tier()))
                        .cell("comments", CellValue::Count(i.comments.len()))
                })
                .collect();

            TableFormatter::new(&columns, "procurement item")
                .quiet(ctx.quiet)
                .output(&table, format)?;
        }
    }
    Ok(())
}

fn run_show(ctx: &Context, args: ItemArgs) -> Result<()> {
    let project = ctx.project(args.project.as_deref())?;
    let items: Vec<ProcurementItem> = ctx.load();
    let index = resolve_item(&items, &project.name, &args.item)?;
    let item = &items[index];

    match ctx.format_or(OutputFormat::Auto) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(item).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(item).into_diagnostic()?);
        }
        OutputFormat::Id => println!("{}", item.id),
        _ => {
            println!("{}", style("─".repeat(60)).dim());
            println!(
                "{}: {} ({})",
                style("ID").bold(),
                style(item.id.to_string()).cyan(),
                row_ref(&items, index)
            );
            println!("{}: {}", style("Project").bold(), item.project_name);
            println!(
                "{}: {}",
                style("Title/Product").bold(),
                style(&item.title_product).yellow()
            );
            println!("{}: {}", style("Specifications").bold(), item.specifications);
            println!("{}: {}", style("Material ID").bold(), item.material_id);
            println!("{}: {}", style("Vendor/Partner").bold(), item.vendor_partner);
            println!("{}", style("─".repeat(60)).dim());
            println!(
                "{}: {}",
                style("Required on site").bold(),
                format_date(item.required_onsite_date)
            );
            println!(
                "{}: {}",
                style("Lead time").bold(),
                item.lead_time
                    .map(|w| format!("{} week(s)", w))
                    .unwrap_or_else(|| "-".to_string())
            );
            println!(
                "{}: {}",
                style("Order date").bold(),
                format_date(item.order_date)
            );
            print_schedule(item);

            if !item.comments.is_empty() {
                println!();
                println!("{} ({}):", style("Comments").bold(), item.comments.len());
                for comment in &item.comments {
                    println!(
                        "  • {} {}",
                        style(format!(
                            "[{} {}]",
                            comment
                                .timestamp
                                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                                .unwrap_or_else(|| "undated".to_string()),
                            comment.author
                        ))
                        .dim(),
                        comment.text
                    );
                }
            }
        }
    }
    Ok(())
}

fn run_edit(ctx: &Context, args: EditArgs) -> Result<()> {
    let project = ctx.project(args.project.as_deref())?;
    let mut items: Vec<ProcurementItem> = ctx.load();
    let index = resolve_item(&items, &project.name, &args.item)?;

    let mut item = items[index].clone();
    if let Some(spec) = args.spec {
        item.specifications = sanitize_spec_id(&spec);
    }
    if let Some(title) = args.title {
        item.title_product = title.trim().to_string();
    }
    if let Some(material) = args.material {
        item.material_id = material.trim().to_string();
    }
    if let Some(vendor) = args.vendor {
        item.vendor_partner = vendor.trim().to_string();
    }
    if let Some(DateValue(required)) = args.required {
        item.required_onsite_date = required;
    }
    if let Some(Clearable(weeks)) = args.lead_weeks {
        item.lead_time = weeks;
    }
    if let Some(DateValue(order)) = args.order {
        item.order_date = order;
    }
    item.recompute();
    validate_procurement(&item)?;

    items[index] = item;
    ctx.save(&items)?;
    let item = &items[index];
    tracing::info!(id = %item.id, "updated procurement item");

    if !ctx.quiet {
        println!(
            "{} Updated {} {}",
            style("✓").green(),
            style(row_ref(&items, index)).cyan(),
            style(&item.title_product).yellow()
        );
        print_schedule(item);
    }
    Ok(())
}

fn run_delete(ctx: &Context, args: ItemArgs) -> Result<()> {
    let project = ctx.project(args.project.as_deref())?;
    let mut items: Vec<ProcurementItem> = ctx.load();
    let index = resolve_item(&items, &project.name, &args.item)?;

    let removed = items.remove(index);
    ctx.save(&items)?;
    tracing::info!(id = %removed.id, "deleted procurement item");

    if !ctx.quiet {
        println!(
            "{} Deleted {} {}",
            style("✓").green(),
            style(removed.id.short()).cyan(),
            removed.title_product
        );
    }
    Ok(())
}

fn run_comment(ctx: &Context, args: CommentArgs) -> Result<()> {
    let text = args.text.trim();
    if text.is_empty() {
        return Err(miette::miette!("Comment text is required"));
    }

    let project = ctx.project(args.project.as_deref())?;
    let mut items: Vec<ProcurementItem> = ctx.load();
    let index = resolve_item(&items, &project.name, &args.item)?;

    let author = args.author.unwrap_or_else(|| ctx.config.author());
    items[index].add_comment(text, &author);
    ctx.save(&items)?;
    tracing::debug!(id = %items[index].id, %author, "added comment");

    if !ctx.quiet {
        println!(
            "{} Comment added to {} by {}",
            style("✓").green(),
            style(row_ref(&items, index)).cyan(),
            author
        );
    }
    Ok(())
}
