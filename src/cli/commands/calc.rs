//! `sitetrack calc` command - Date-risk calculator
//!
//! Works without a workspace: it only runs the schedule arithmetic the
//! procurement log uses.

use chrono::NaiveDate;
use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::helpers::{format_date, parse_date, resolve_format};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::schedule::{self, DeliveryStatus, RiskTier};

#[derive(clap::Args, Debug)]
pub struct CalcArgs {
    /// Required on-site date (YYYY-MM-DD)
    #[arg(long, short = 'r', value_parser = parse_date)]
    pub required: NaiveDate,

    /// Lead time in weeks
    #[arg(long, short = 'l')]
    pub lead_weeks: u32,

    /// Planned or actual order date (YYYY-MM-DD)
    #[arg(long, short = 'o', value_parser = parse_date)]
    pub order: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
struct Calculation {
    required_onsite_date: NaiveDate,
    lead_time_weeks: u32,
    drop_dead_date: Option<NaiveDate>,
    order_date: Option<NaiveDate>,
    status: Option<DeliveryStatus>,
    risk: RiskTier,
}

fn calculate(args: &CalcArgs) -> Calculation {
    let drop_dead = schedule::drop_dead_date(Some(args.required), Some(args.lead_weeks));
    Calculation {
        required_onsite_date: args.required,
        lead_time_weeks: args.lead_weeks,
        drop_dead_date: drop_dead,
        order_date: args.order,
        status: schedule::delivery_status(args.order, drop_dead),
        risk: schedule::risk_tier(Some(args.required), args.order),
    }
}

pub fn run(args: CalcArgs, global: &GlobalOpts) -> Result<()> {
    let calc = calculate(&args);

    match resolve_format(global.format, None, OutputFormat::Auto) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&calc).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&calc).into_diagnostic()?);
        }
        _ => {
            if calc.drop_dead_date.is_none() {
                return Err(miette::miette!(
                    "Lead time of {} weeks reaches before the earliest supported date",
                    args.lead_weeks
                ));
            }
            println!(
                "{}: {}",
                style("Drop-dead date").bold(),
                style(format_date(calc.drop_dead_date)).yellow()
            );
            if let Some(order) = calc.order_date {
                let status = match calc.status {
                    Some(DeliveryStatus::Delayed) => style("Delayed".to_string()).red().bold(),
                    Some(s) => style(s.to_string()).green(),
                    None => style("-".to_string()).dim(),
                };
                println!("{}: {}", style("Order date").bold(), order);
                println!("{}: {}", style("Status").bold(), status);
                println!("{}: {}", style("Risk").bold(), calc.risk);
            } else if !global.quiet {
                println!(
                    "{}",
                    style("Add --order to check a planned order date.").dim()
                );
            }
        }
    }
    Ok(())
}
