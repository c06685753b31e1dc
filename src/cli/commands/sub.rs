//! `sitetrack sub` command - Submittal log

use chrono::NaiveDate;
use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{format_date, parse_date, resolve_item, Clearable, Context, DateValue};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::validation::{sanitize_spec_id, validate_submittal};
use crate::entities::{SubmittalItem, SubmittalStatus};

#[derive(Subcommand, Debug)]
pub enum SubCommands {
    /// Add a submittal
    New(NewArgs),

    /// List submittals with filtering
    List(ListArgs),

    /// Show a submittal's details
    Show(ItemArgs),

    /// Edit a submittal
    Edit(EditArgs),

    /// Delete a submittal
    Delete(ItemArgs),
}

/// Review workflow dates, shared by `new` and `edit`
#[derive(clap::Args, Debug)]
pub struct WorkflowDates {
    /// Date received from the subcontractor
    #[arg(long)]
    pub received: Option<DateValue>,

    /// Date sent to design for review
    #[arg(long)]
    pub sent_design: Option<DateValue>,

    /// Review due date
    #[arg(long)]
    pub due: Option<DateValue>,

    /// Date the review came back
    #[arg(long)]
    pub review_received: Option<DateValue>,

    /// Date issued back to the subcontractor
    #[arg(long)]
    pub issued_sub: Option<DateValue>,
}

impl WorkflowDates {
    fn apply(&self, item: &mut SubmittalItem) {
        let fields = [
            (self.received, &mut item.date_received),
            (self.sent_design, &mut item.date_sent_design),
            (self.due, &mut item.due_date),
            (self.review_received, &mut item.date_review_received),
            (self.issued_sub, &mut item.date_issued_sub),
        ];
        for (value, field) in fields {
            if let Some(DateValue(date)) = value {
                *field = date;
            }
        }
    }
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

    /// Person responsible for the submittal
    #[arg(long)]
    pub manager: Option<String>,

    /// Submittal status (ean, nen, rr, closeout, for-record, pending)
    #[arg(long, short = 's')]
    pub status: Option<SubmittalStatus>,

    #[command(flatten)]
    pub dates: WorkflowDates,

    /// Free-text notes
    #[arg(long)]
    pub comments: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Project (default: active project)
    #[arg(long, short = 'P')]
    pub project: Option<String>,

    /// Filter by submittal status
    #[arg(long, short = 's')]
    pub status: Option<SubmittalStatus>,

    /// Search in title, material id, vendor and manager
    #[arg(long)]
    pub search: Option<String>,

    /// Show only submittals due on or before this date
    #[arg(long, value_parser = parse_date)]
    pub due_by: Option<NaiveDate>,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct ItemArgs {
    /// Row number (3 or SUB@3) or submittal id
    pub item: String,

    /// Project (default: active project)
    #[arg(long, short = 'P')]
    pub project: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Row number (3 or SUB@3) or submittal id
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

    #[arg(long)]
    pub manager: Option<String>,

    /// Submittal status (`none` clears)
    #[arg(long, short = 's')]
    pub status: Option<Clearable<SubmittalStatus>>,

    #[command(flatten)]
    pub dates: WorkflowDates,

    #[arg(long)]
    pub comments: Option<String>,
}

/// Run a submittal subcommand
pub fn run(cmd: SubCommands, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::open(global)?;
    match cmd {
        SubCommands::New(args) => run_new(&ctx, args),
        SubCommands::List(args) => run_list(&ctx, args),
        SubCommands::Show(args) => run_show(&ctx, args),
        SubCommands::Edit(args) => run_edit(&ctx, args),
        SubCommands::Delete(args) => run_delete(&ctx, args),
    }
}

fn row_ref(items: &[SubmittalItem], index: usize) -> String {
    let project = &items[index].project_name;
    let n = items[..=index]
        .iter()
        .filter(|i| &i.project_name == project)
        .count();
    format!("SUB@{}", n)
}

fn run_new(ctx: &Context, args: NewArgs) -> Result<()> {
    let project = ctx.project(args.project.as_deref())?;
    let mut items: Vec<SubmittalItem> = ctx.load();

    let mut item = SubmittalItem::new(&project.name);
    item.specifications = sanitize_spec_id(&args.spec);
    item.title_product = args.title.trim().to_string();
    item.material_id = args.material.trim().to_string();
    item.vendor_partner = args.vendor.trim().to_string();
    item.submittal_manager = args.manager.unwrap_or_default().trim().to_string();
    item.submittal_status = args.status;
    item.comments = args.comments.unwrap_or_default();
    args.dates.apply(&mut item);
    validate_submittal(&item)?;

    items.push(item);
    ctx.save(&items)?;
    let index = items.len() - 1;
    tracing::info!(id = %items[index].id, project = %project.name, "added submittal");

    if !ctx.quiet {
        println!(
            "{} Added {} {} to {}",
            style("✓").green(),
            style(row_ref(&items, index)).cyan(),
            style(&items[index].title_product).yellow(),
            project.name
        );
    }
    Ok(())
}

fn run_list(ctx: &Context, args: ListArgs) -> Result<()> {
    let project = ctx.project(args.project.as_deref())?;
    let items: Vec<SubmittalItem> = ctx.load();

    let rows: Vec<(usize, &SubmittalItem)> = items
        .iter()
        .filter(|i| i.project_name == project.name)
        .enumerate()
        .map(|(n, i)| (n + 1, i))
        .filter(|(_, i)| args.status.map_or(true, |s| i.submittal_status == Some(s)))
        .filter(|(_, i)| {
            args.due_by
                .map_or(true, |limit| i.due_date.is_some_and(|due| due <= limit))
        })
        .filter(|(_, i)| {
            args.search.as_deref().map_or(true, |term| {
                let term = term.to_lowercase();
                [
                    &i.title_product,
                    &i.material_id,
                    &i.vendor_partner,
                    &i.submittal_manager,
                ]
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
            let selected: Vec<&SubmittalItem> = rows.iter().map(|(_, i)| *i).collect();
            println!("{}", serde_json::to_string_pretty(&selected).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            let selected: Vec<&SubmittalItem> = rows.iter().map(|(_, i)| *i).collect();
            print!("{}", serde_yml::to_string(&selected).into_diagnostic()?);
        }
        format => {
            if rows.is_empty() {
                if !ctx.quiet {
                    println!("No submittals found for {}.", project.name);
                }
                return Ok(());
            }

            let columns = [
                ColumnDef::new("id", "ID", 12),
                ColumnDef::new("spec", "SPEC", 8),
                ColumnDef::new("title", "TITLE/PRODUCT", 28),
                ColumnDef::new("vendor", "VENDOR", 18),
                ColumnDef::new("manager", "MANAGER", 14),
                ColumnDef::new("status", "STATUS", 10),
                ColumnDef::new("received", "RECEIVED", 10),
                ColumnDef::new("due", "DUE", 10),
                ColumnDef::new("issued", "ISSUED", 10),
            ];
            let table: Vec<TableRow> = rows
                .iter()
                .map(|(n, i)| {
                    TableRow::new(format!("SUB@{}", n), i.id.to_string())
                        .cell("id", CellValue::Id(i.id.short()))
                        .cell("spec", CellValue::Text(i.specifications.clone()))
                        .cell("title", CellValue::Text(i.title_product.clone()))
                        .cell("vendor", CellValue::Text(i.vendor_partner.clone()))
                        .cell("manager", CellValue::Text(i.submittal_manager.clone()))
                        .cell("status", CellValue::Submittal(i.submittal_status))
                        .cell("received", CellValue::Date(i.date_received))
                        .cell("due", CellValue::Date(i.due_date))
                        .cell("issued", CellValue::Date(i.date_issued_sub))
                })
                .collect();

            TableFormatter::new(&columns, "submittal")
                .quiet(ctx.quiet)
                .output(&table, format)?;
        }
    }
    Ok(())
}

fn run_show(ctx: &Context, args: ItemArgs) -> Result<()> {
    let project = ctx.project(args.project.as_deref())?;
    let items: Vec<SubmittalItem> = ctx.load();
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
            let or_dash = |s: &str| if s.is_empty() { "-".to_string() } else { s.to_string() };

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
            println!("{}: {}", style("Manager").bold(), or_dash(&item.submittal_manager));
            println!(
                "{}: {}",
                style("Status").bold(),
                item.submittal_status
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "-".to_string())
            );
            println!("{}", style("─".repeat(60)).dim());
            println!("{}: {}", style("Received").bold(), format_date(item.date_received));
            println!("{}: {}", style("Sent to design").bold(), format_date(item.date_sent_design));
            println!("{}: {}", style("Due").bold(), format_date(item.due_date));
            println!(
                "{}: {}",
                style("Review received").bold(),
                format_date(item.date_review_received)
            );
            println!("{}: {}", style("Issued to sub").bold(), format_date(item.date_issued_sub));

            if !item.comments.trim().is_empty() {
                println!();
                println!("{}", style("Comments:").bold());
                println!("{}", item.comments);
            }
        }
    }
    Ok(())
}

fn run_edit(ctx: &Context, args: EditArgs) -> Result<()> {
    let project = ctx.project(args.project.as_deref())?;
    let mut items: Vec<SubmittalItem> = ctx.load();
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
    if let Some(manager) = args.manager {
        item.submittal_manager = manager.trim().to_string();
    }
    if let Some(Clearable(status)) = args.status {
        item.submittal_status = status;
    }
    if let Some(comments) = args.comments {
        item.comments = comments;
    }
    args.dates.apply(&mut item);
    validate_submittal(&item)?;

    items[index] = item;
    ctx.save(&items)?;
    tracing::info!(id = %items[index].id, "updated submittal");

    if !ctx.quiet {
        println!(
            "{} Updated {} {}",
            style("✓").green(),
            style(row_ref(&items, index)).cyan(),
            style(&items[index].title_product).yellow()
        );
    }
    Ok(())
}

fn run_delete(ctx: &Context, args: ItemArgs) -> Result<()> {
    let project = ctx.project(args.project.as_deref())?;
    let mut items: Vec<SubmittalItem> = ctx.load();
    let index = resolve_item(&items, &project.name, &args.item)?;

    let removed = items.remove(index);
    ctx.save(&items)?;
    tracing::info!(id = %removed.id, "deleted submittal");

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
