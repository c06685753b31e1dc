//! `sitetrack project` command - Projects, team members, documents and areas

use chrono::{Local, NaiveDate};
use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::cli::helpers::{format_date, parse_date, Context};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::store;
use crate::core::validation::{self, parse_budget};
use crate::entities::project::{format_budget, ProgressBucket};
use crate::entities::{
    ProcurementItem, Project, ProjectArea, ProjectDocument, ProjectStatus, SubmittalItem,
    TeamMember,
};

/// Records stored per project name
type PerProject<T> = BTreeMap<String, Vec<T>>;

#[derive(Subcommand, Debug)]
pub enum ProjectCommands {
    /// Create a new project
    New(NewArgs),

    /// List projects with filtering
    List(ListArgs),

    /// Show a project's details (default: active project)
    Show(ShowArgs),

    /// Edit a project's fields
    Edit(EditArgs),

    /// Delete a project
    Delete(DeleteArgs),

    /// Select the project other commands default to
    Use(UseArgs),

    /// Manage the project team
    #[command(subcommand)]
    Team(TeamCommands),

    /// Manage project documents
    #[command(subcommand)]
    Doc(DocCommands),

    /// Manage project areas (floors, wings, zones)
    #[command(subcommand)]
    Area(AreaCommands),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Project name (unique, case-insensitive)
    pub name: String,

    /// Budget in dollars (e.g. 2500000 or $2,500,000)
    #[arg(long, short = 'b', value_parser = parse_budget)]
    pub budget: Option<u64>,

    /// Target end date (YYYY-MM-DD)
    #[arg(long, short = 'e', value_parser = parse_date)]
    pub end_date: Option<NaiveDate>,

    /// Project status
    #[arg(long, short = 's', default_value = "not-started")]
    pub status: ProjectStatus,

    /// Percent complete (0-100)
    #[arg(long, short = 'p', default_value_t = 0)]
    pub progress: u8,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Search in name and budget
    #[arg(long)]
    pub search: Option<String>,

    /// Filter by status
    #[arg(long, short = 's')]
    pub status: Option<ProjectStatus>,

    /// Filter by progress range: 1 (<25%), 2 (25-49%), 3 (50-74%), 4 (75%+)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=4))]
    pub progress: Option<u8>,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Project name (default: active project)
    pub name: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Project to edit
    pub name: String,

    /// Rename the project
    #[arg(long)]
    pub rename: Option<String>,

    #[arg(long, short = 'b', value_parser = parse_budget)]
    pub budget: Option<u64>,

    #[arg(long, short = 'e', value_parser = parse_date)]
    pub end_date: Option<NaiveDate>,

    #[arg(long, short = 's')]
    pub status: Option<ProjectStatus>,

    #[arg(long, short = 'p')]
    pub progress: Option<u8>,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Project to delete
    pub name: String,
}

#[derive(clap::Args, Debug)]
pub struct UseArgs {
    /// Project to make active (omit to print the active project)
    pub name: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum TeamCommands {
    /// Add a team member
    Add(TeamAddArgs),
    /// List team members
    List(ScopeArgs),
    /// Remove a team member by name
    Remove(RemoveArgs),
}

#[derive(Subcommand, Debug)]
pub enum DocCommands {
    /// Register a document
    Add(DocAddArgs),
    /// List documents
    List(ScopeArgs),
    /// Remove a document by name
    Remove(RemoveArgs),
}

#[derive(Subcommand, Debug)]
pub enum AreaCommands {
    /// Add an area
    Add(AreaAddArgs),
    /// List areas
    List(ScopeArgs),
    /// Remove an area by name
    Remove(RemoveArgs),
}

#[derive(clap::Args, Debug)]
pub struct ScopeArgs {
    /// Project (default: active project)
    #[arg(long, short = 'P')]
    pub project: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct TeamAddArgs {
    #[arg(long, short = 'n')]
    pub name: String,

    #[arg(long, short = 'r')]
    pub role: String,

    #[command(flatten)]
    pub scope: ScopeArgs,
}

#[derive(clap::Args, Debug)]
pub struct DocAddArgs {
    #[arg(long, short = 'n')]
    pub name: String,

    /// Document type (e.g. Drawing, Contract, Permit)
    #[arg(long = "type", short = 't')]
    pub doc_type: String,

    #[command(flatten)]
    pub scope: ScopeArgs,
}

#[derive(clap::Args, Debug)]
pub struct AreaAddArgs {
    #[arg(long, short = 'n')]
    pub name: String,

    #[arg(long, short = 'd', default_value = "")]
    pub description: String,

    #[command(flatten)]
    pub scope: ScopeArgs,
}

#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    pub name: String,

    #[command(flatten)]
    pub scope: ScopeArgs,
}

/// Run a project subcommand
pub fn run(cmd: ProjectCommands, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::open(global)?;
    match cmd {
        ProjectCommands::New(args) => run_new(&ctx, args),
        ProjectCommands::List(args) => run_list(&ctx, args),
        ProjectCommands::Show(args) => run_show(&ctx, args),
        ProjectCommands::Edit(args) => run_edit(&ctx, args),
        ProjectCommands::Delete(args) => run_delete(&ctx, args),
        ProjectCommands::Use(args) => run_use(&ctx, args),
        ProjectCommands::Team(cmd) => run_team(&ctx, cmd),
        ProjectCommands::Doc(cmd) => run_doc(&ctx, cmd),
        ProjectCommands::Area(cmd) => run_area(&ctx, cmd),
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn run_new(ctx: &Context, args: NewArgs) -> Result<()> {
    let mut projects = ctx.projects();

    let project = Project {
        name: args.name.trim().to_string(),
        budget: args.budget,
        end_date: args.end_date,
        status: args.status,
        progress: args.progress,
    };
    validation::validate_project(&project, &projects, None, today())?;

    projects.push(project.clone());
    ctx.store
        .save_collection(store::PROJECTS, &projects)
        .into_diagnostic()?;

    // The first project becomes the default target for other commands
    let has_active = ctx
        .active_project_name()
        .is_some_and(|name| projects.iter().any(|p| p.name == name));
    if !has_active {
        ctx.store
            .save_value(store::ACTIVE_PROJECT, &project.name)
            .into_diagnostic()?;
    }
    tracing::info!(project = %project.name, "created project");

    if !ctx.quiet {
        println!(
            "{} Created project {}",
            style("✓").green(),
            style(&project.name).cyan()
        );
        println!(
            "   Budget: {} | Due: {} | {}",
            style(format_budget(project.budget)).yellow(),
            format_date(project.end_date),
            project.status
        );
    }
    Ok(())
}

fn run_list(ctx: &Context, args: ListArgs) -> Result<()> {
    let bucket = args.progress.and_then(ProgressBucket::from_level);
    let projects: Vec<Project> = ctx
        .projects()
        .into_iter()
        .filter(|p| args.search.as_deref().map_or(true, |term| p.matches_search(term)))
        .filter(|p| args.status.map_or(true, |status| p.status == status))
        .filter(|p| bucket.map_or(true, |b| b.contains(p.progress)))
        .collect();

    if args.count {
        println!("{}", projects.len());
        return Ok(());
    }

    match ctx.format_or(OutputFormat::Tsv) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&projects).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&projects).into_diagnostic()?);
        }
        format => {
            if projects.is_empty() {
                if !ctx.quiet {
                    println!("No projects found.");
                }
                return Ok(());
            }

            let active = ctx.active_project_name();
            let columns = [
                ColumnDef::new("name", "NAME", 32),
                ColumnDef::new("budget", "BUDGET", 16),
                ColumnDef::new("end_date", "END DATE", 10),
                ColumnDef::new("status", "STATUS", 12),
                ColumnDef::new("progress", "PROGRESS", 8),
            ];
            let rows: Vec<TableRow> = projects
                .iter()
                .enumerate()
                .map(|(i, p)| {
                    let marker = if active.as_deref() == Some(p.name.as_str()) {
                        format!("{}*", i + 1)
                    } else {
                        (i + 1).to_string()
                    };
                    TableRow::new(marker, p.name.clone())
                        .cell("name", CellValue::Text(p.name.clone()))
                        .cell("budget", CellValue::Budget(p.budget))
                        .cell("end_date", CellValue::Date(p.end_date))
                        .cell("status", CellValue::ProjectStatus(p.status))
                        .cell("progress", CellValue::Percent(p.progress))
                })
                .collect();

            TableFormatter::new(&columns, "project")
                .quiet(ctx.quiet)
                .output(&rows, format)?;
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct ProjectDetails<'a> {
    #[serde(flatten)]
    project: &'a Project,
    active: bool,
    team: &'a [TeamMember],
    documents: &'a [ProjectDocument],
    areas: &'a [ProjectArea],
}

fn run_show(ctx: &Context, args: ShowArgs) -> Result<()> {
    let project = ctx.project(args.name.as_deref())?;
    let team_map: PerProject<TeamMember> = ctx.store.load_value(store::TEAM_MEMBERS).unwrap_or_default();
    let doc_map: PerProject<ProjectDocument> = ctx.store.load_value(store::DOCUMENTS).unwrap_or_default();
    let team = team_map.get(&project.name).map(Vec::as_slice).unwrap_or_default();
    let documents = doc_map.get(&project.name).map(Vec::as_slice).unwrap_or_default();
    let area_map: PerProject<ProjectArea> = ctx.store.load_value(store::AREAS).unwrap_or_default();
    let areas = area_map.get(&project.name).map(Vec::as_slice).unwrap_or_default();

    let details = ProjectDetails {
        project: &project,
        active: ctx.active_project_name().as_deref() == Some(project.name.as_str()),
        team,
        documents,
        areas,
    };

    match ctx.format_or(OutputFormat::Auto) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&details).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&details).into_diagnostic()?);
        }
        OutputFormat::Id => println!("{}", project.name),
        _ => {
            println!("{}", style("─".repeat(60)).dim());
            println!("{}: {}", style("Project").bold(), style(&project.name).cyan());
            println!("{}: {}", style("Budget").bold(), format_budget(project.budget));
            println!("{}: {}", style("End date").bold(), format_date(project.end_date));
            println!("{}: {}", style("Status").bold(), project.status);
            println!("{}: {}%", style("Progress").bold(), project.progress);
            if details.active {
                println!("{}", style("(active project)").dim());
            }
            println!("{}", style("─".repeat(60)).dim());

            if !team.is_empty() {
                println!();
                println!("{} ({}):", style("Team").bold(), team.len());
                for member in team {
                    println!("  • {} - {}", member.name, style(&member.role).dim());
                }
            }

            if !documents.is_empty() {
                println!();
                println!("{} ({}):", style("Documents").bold(), documents.len());
                for doc in documents {
                    println!("  • {} [{}]", doc.name, style(&doc.doc_type).dim());
                }
            }

            if !areas.is_empty() {
                println!();
                println!("{} ({}):", style("Areas").bold(), areas.len());
                for area in areas {
                    if area.description.trim().is_empty() {
                        println!("  • {}", area.name);
                    } else {
                        println!("  • {} - {}", area.name, style(&area.description).dim());
                    }
                }
            }
        }
    }
    Ok(())
}

fn find_index(projects: &[Project], name: &str) -> Result<usize> {
    projects
        .iter()
        .position(|p| p.same_name(name))
        .ok_or_else(|| miette::miette!("No project named '{}'", name))
}

fn run_edit(ctx: &Context, args: EditArgs) -> Result<()> {
    let mut projects = ctx.projects();
    let index = find_index(&projects, &args.name)?;
    let old_name = projects[index].name.clone();

    let mut updated = projects[index].clone();
    if let Some(name) = args.rename {
        updated.name = name.trim().to_string();
    }
    if let Some(budget) = args.budget {
        updated.budget = Some(budget);
    }
    if let Some(end_date) = args.end_date {
        updated.end_date = Some(end_date);
    }
    if let Some(status) = args.status {
        updated.status = status;
    }
    if let Some(progress) = args.progress {
        updated.progress = progress;
    }

    validation::validate_project(&updated, &projects, Some(index), today())?;

    let renamed = updated.name != old_name;
    projects[index] = updated.clone();
    ctx.store
        .save_collection(store::PROJECTS, &projects)
        .into_diagnostic()?;

    if renamed {
        rename_references(ctx, &old_name, &updated.name)?;
    }
    tracing::info!(project = %updated.name, renamed, "updated project");

    if !ctx.quiet {
        println!(
            "{} Updated project {}",
            style("✓").green(),
            style(&updated.name).cyan()
        );
    }
    Ok(())
}

/// Carry a rename over to every record that points at the project by name
fn rename_references(ctx: &Context, old: &str, new: &str) -> Result<()> {
    let mut procurements: Vec<ProcurementItem> = ctx.load();
    let mut moved = 0;
    for item in procurements.iter_mut().filter(|i| i.project_name == old) {
        item.project_name = new.to_string();
        moved += 1;
    }
    ctx.save(&procurements)?;

    let mut submittals: Vec<SubmittalItem> = ctx.load();
    for item in submittals.iter_mut().filter(|i| i.project_name == old) {
        item.project_name = new.to_string();
        moved += 1;
    }
    ctx.save(&submittals)?;

    rekey::<TeamMember>(ctx, store::TEAM_MEMBERS, old, new)?;
    rekey::<ProjectDocument>(ctx, store::DOCUMENTS, old, new)?;
    rekey::<ProjectArea>(ctx, store::AREAS, old, new)?;

    if ctx.active_project_name().as_deref() == Some(old) {
        ctx.store
            .save_value(store::ACTIVE_PROJECT, new)
            .into_diagnostic()?;
    }
    tracing::debug!(%old, %new, items = moved, "moved project references");
    Ok(())
}

fn rekey<T>(ctx: &Context, key: &str, old: &str, new: &str) -> Result<()>
where
    T: Serialize + serde::de::DeserializeOwned,
{
    let mut map: PerProject<T> = ctx.store.load_value(key).unwrap_or_default();
    if let Some(entries) = map.remove(old) {
        map.insert(new.to_string(), entries);
        ctx.store.save_value(key, &map).into_diagnostic()?;
    }
    Ok(())
}

fn run_delete(ctx: &Context, args: DeleteArgs) -> Result<()> {
    let mut projects = ctx.projects();
    let index = find_index(&projects, &args.name)?;
    let removed = projects.remove(index);
    ctx.store
        .save_collection(store::PROJECTS, &projects)
        .into_diagnostic()?;

    if ctx.active_project_name().as_deref() == Some(removed.name.as_str()) {
        ctx.store.remove(store::ACTIVE_PROJECT).into_diagnostic()?;
    }
    tracing::info!(project = %removed.name, "deleted project");

    if !ctx.quiet {
        println!(
            "{} Deleted project {}",
            style("✓").green(),
            style(&removed.name).cyan()
        );
    }
    Ok(())
}

fn run_use(ctx: &Context, args: UseArgs) -> Result<()> {
    let Some(name) = args.name else {
        let project = ctx.project(None)?;
        println!("{}", project.name);
        return Ok(());
    };

    let project = ctx.project(Some(&name))?;
    ctx.store
        .save_value(store::ACTIVE_PROJECT, &project.name)
        .into_diagnostic()?;

    if !ctx.quiet {
        println!(
            "{} Active project is now {}",
            style("✓").green(),
            style(&project.name).cyan()
        );
    }
    Ok(())
}

fn run_team(ctx: &Context, cmd: TeamCommands) -> Result<()> {
    let (scope, action) = match &cmd {
        TeamCommands::Add(args) => (&args.scope, "add"),
        TeamCommands::List(scope) => (scope, "list"),
        TeamCommands::Remove(args) => (&args.scope, "remove"),
    };
    let project = ctx.project(scope.project.as_deref())?;
    let mut map: PerProject<TeamMember> = ctx.store.load_value(store::TEAM_MEMBERS).unwrap_or_default();
    tracing::debug!(project = %project.name, action, "team command");

    match cmd {
        TeamCommands::Add(args) => {
            let member = TeamMember {
                name: args.name.trim().to_string(),
                role: args.role.trim().to_string(),
            };
            let members = map.entry(project.name.clone()).or_default();
            validation::validate_team_member(&member, members)?;
            members.push(member.clone());
            ctx.store.save_value(store::TEAM_MEMBERS, &map).into_diagnostic()?;
            if !ctx.quiet {
                println!(
                    "{} Added {} ({}) to {}",
                    style("✓").green(),
                    style(&member.name).cyan(),
                    member.role,
                    project.name
                );
            }
        }
        TeamCommands::List(_) => {
            let members = map.get(&project.name).map(Vec::as_slice).unwrap_or_default();
            let role = ColumnDef::new("role", "ROLE", 24);
            print_named_list(ctx, members, "team member", role, |m| (m.name.clone(), m.role.clone()))?;
        }
        TeamCommands::Remove(args) => {
            let members = map.entry(project.name.clone()).or_default();
            let before = members.len();
            members.retain(|m| !m.name.eq_ignore_ascii_case(args.name.trim()));
            if members.len() == before {
                return Err(miette::miette!(
                    "No team member named '{}' on {}",
                    args.name,
                    project.name
                ));
            }
            ctx.store.save_value(store::TEAM_MEMBERS, &map).into_diagnostic()?;
            if !ctx.quiet {
                println!("{} Removed {}", style("✓").green(), style(&args.name).cyan());
            }
        }
    }
    Ok(())
}

fn run_doc(ctx: &Context, cmd: DocCommands) -> Result<()> {
    let scope = match &cmd {
        DocCommands::Add(args) => &args.scope,
        DocCommands::List(scope) => scope,
        DocCommands::Remove(args) => &args.scope,
    };
    let project = ctx.project(scope.project.as_deref())?;
    let mut map: PerProject<ProjectDocument> = ctx.store.load_value(store::DOCUMENTS).unwrap_or_default();

    match cmd {
        DocCommands::Add(args) => {
            let doc = ProjectDocument {
                name: args.name.trim().to_string(),
                doc_type: args.doc_type.trim().to_string(),
            };
            let docs = map.entry(project.name.clone()).or_default();
            validation::validate_document(&doc, docs)?;
            docs.push(doc.clone());
            ctx.store.save_value(store::DOCUMENTS, &map).into_diagnostic()?;
            if !ctx.quiet {
                println!(
                    "{} Registered {} [{}] on {}",
                    style("✓").green(),
                    style(&doc.name).cyan(),
                    doc.doc_type,
                    project.name
                );
            }
        }
        DocCommands::List(_) => {
            let docs = map.get(&project.name).map(Vec::as_slice).unwrap_or_default();
            let doc_type = ColumnDef::new("type", "TYPE", 24);
            print_named_list(ctx, docs, "document", doc_type, |d| (d.name.clone(), d.doc_type.clone()))?;
        }
        DocCommands::Remove(args) => {
            let docs = map.entry(project.name.clone()).or_default();
            let before = docs.len();
            docs.retain(|d| !d.name.eq_ignore_ascii_case(args.name.trim()));
            if docs.len() == before {
                return Err(miette::miette!(
                    "No document named '{}' on {}",
                    args.name,
                    project.name
                ));
            }
            ctx.store.save_value(store::DOCUMENTS, &map).into_diagnostic()?;
            if !ctx.quiet {
                println!("{} Removed {}", style("✓").green(), style(&args.name).cyan());
            }
        }
    }
    Ok(())
}

fn run_area(ctx: &Context, cmd: AreaCommands) -> Result<()> {
    let scope = match &cmd {
        AreaCommands::Add(args) => &args.scope,
        AreaCommands::List(scope) => scope,
        AreaCommands::Remove(args) => &args.scope,
    };
    let project = ctx.project(scope.project.as_deref())?;
    let mut map: PerProject<ProjectArea> = ctx.store.load_value(store::AREAS).unwrap_or_default();

    match cmd {
        AreaCommands::Add(args) => {
            let area = ProjectArea::new(args.name.trim(), args.description.trim());
            let areas = map.entry(project.name.clone()).or_default();
            validation::validate_area(&area, areas)?;
            areas.push(area.clone());
            ctx.store.save_value(store::AREAS, &map).into_diagnostic()?;
            tracing::info!(project = %project.name, area = %area.name, "added area");
            if !ctx.quiet {
                println!(
                    "{} Added area {} to {}",
                    style("✓").green(),
                    style(&area.name).cyan(),
                    project.name
                );
            }
        }
        AreaCommands::List(_) => {
            let areas = map.get(&project.name).map(Vec::as_slice).unwrap_or_default();
            let description = ColumnDef::new("description", "DESCRIPTION", 40);
            print_named_list(ctx, areas, "area", description, |a| {
                (a.name.clone(), a.description.clone())
            })?;
        }
        AreaCommands::Remove(args) => {
            let areas = map.entry(project.name.clone()).or_default();
            let before = areas.len();
            areas.retain(|a| !a.name.eq_ignore_ascii_case(args.name.trim()));
            if areas.len() == before {
                return Err(miette::miette!(
                    "No area named '{}' on {}",
                    args.name,
                    project.name
                ));
            }
            ctx.store.save_value(store::AREAS, &map).into_diagnostic()?;
            if !ctx.quiet {
                println!("{} Removed {}", style("✓").green(), style(&args.name).cyan());
            }
        }
    }
    Ok(())
}

/// Two-column listing shared by team members, documents and areas
fn print_named_list<T, F>(
    ctx: &Context,
    entries: &[T],
    noun: &'static str,
    detail: ColumnDef,
    split: F,
) -> Result<()>
where
    T: Serialize,
    F: Fn(&T) -> (String, String),
{
    match ctx.format_or(OutputFormat::Tsv) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(entries).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&entries).into_diagnostic()?);
        }
        format => {
            if entries.is_empty() {
                if !ctx.quiet {
                    println!("No {}s found.", noun);
                }
                return Ok(());
            }
            let detail_key = detail.key;
            let columns = [ColumnDef::new("name", "NAME", 32), detail];
            let rows: Vec<TableRow> = entries
                .iter()
                .enumerate()
                .map(|(i, entry)| {
                    let (name, value) = split(entry);
                    TableRow::new((i + 1).to_string(), name.clone())
                        .cell("name", CellValue::Text(name))
                        .cell(detail_key, CellValue::Text(value))
                })
                .collect();
            TableFormatter::new(&columns, noun)
                .quiet(ctx.quiet)
                .output(&rows, format)?;
        }
    }
    Ok(())
}
