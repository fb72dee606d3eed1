use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use planos::config::{
    config_dir, ensure_config_dir, ledger_store, load_config, load_payment_plans,
    resolve_plan, CONFIG_TEMPLATE, PLANS_TEMPLATE,
};
use planos::error::{PlanError, Result};
use planos::ledger::{
    due_reminders, format_money, summarize, LedgerKey, LedgerStore, PaymentPlan, PlanSummary,
    Reconciler, StoredRecord, ToggleOutcome,
};
use planos::report::{build_report, status_label, write_report_json};

#[derive(Parser)]
#[command(name = "planos")]
#[command(version, about = "Payment plan ledger for session-based practices", long_about = None)]
struct Cli {
    /// Path to config directory (default: ~/.planos or XDG config)
    #[arg(short = 'C', long, global = true)]
    config_dir: Option<PathBuf>,

    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config directory with template files
    Init,

    /// List payment plans with their progress
    Plans,

    /// Show the periods of a plan and their payment status
    Periods {
        /// Analysis id or index from 'plans' (e.g., 1 or example-analysis)
        plan: String,
    },

    /// Flip a period between paid and pending
    Toggle {
        /// Analysis id or index from 'plans'
        plan: String,

        /// 1-based period number
        period: u32,
    },

    /// Mark a period as paid
    Pay {
        /// Analysis id or index from 'plans'
        plan: String,

        /// 1-based period number
        period: u32,
    },

    /// Mark a period as pending
    Unpay {
        /// Analysis id or index from 'plans'
        plan: String,

        /// 1-based period number
        period: u32,
    },

    /// List pending periods that are due soon
    Reminders {
        /// Days ahead to look (default: [reminders] days_ahead)
        #[arg(long)]
        days: Option<u32>,

        /// Reference date (YYYY-MM-DD, default: today)
        #[arg(long)]
        today: Option<String>,

        /// Include pending periods already past due
        #[arg(long)]
        overdue: bool,
    },

    /// Summarize a plan and optionally export the report as JSON
    Report {
        /// Analysis id or index from 'plans'
        plan: String,

        /// Write report data to this JSON file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show config and ledger status
    Status,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    // Determine config directory
    let cfg_dir = match cli.config_dir {
        Some(p) => p,
        None => config_dir()?,
    };
    debug!(config_dir = %cfg_dir.display(), "resolved config directory");

    match cli.command {
        Commands::Init => cmd_init(&cfg_dir),
        Commands::Plans => cmd_plans(&cfg_dir),
        Commands::Periods { plan } => cmd_periods(&cfg_dir, &plan),
        Commands::Toggle { plan, period } => cmd_set_status(&cfg_dir, &plan, period, None),
        Commands::Pay { plan, period } => cmd_set_status(&cfg_dir, &plan, period, Some(true)),
        Commands::Unpay { plan, period } => cmd_set_status(&cfg_dir, &plan, period, Some(false)),
        Commands::Reminders {
            days,
            today,
            overdue,
        } => cmd_reminders(&cfg_dir, days, today, overdue),
        Commands::Report { plan, output } => cmd_report(&cfg_dir, &plan, output),
        Commands::Status => cmd_status(&cfg_dir),
    }
}

/// Initialize config directory with template files
fn cmd_init(cfg_dir: &Path) -> Result<()> {
    use std::fs;

    if cfg_dir.exists() {
        return Err(PlanError::AlreadyInitialized(cfg_dir.to_path_buf()));
    }

    fs::create_dir_all(cfg_dir)?;
    fs::write(cfg_dir.join("config.toml"), CONFIG_TEMPLATE)?;
    fs::write(cfg_dir.join("plans.toml"), PLANS_TEMPLATE)?;

    println!("Initialized planos config at: {}", cfg_dir.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Edit your practice details:  $EDITOR {}/config.toml",
        cfg_dir.display()
    );
    println!(
        "  2. Add your payment plans:      $EDITOR {}/plans.toml",
        cfg_dir.display()
    );
    println!();
    println!("Then record a payment:");
    println!("  planos pay <plan> <period>");

    Ok(())
}

// Table row structs for tabled
#[derive(Tabled)]
struct PlanRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "CLIENT")]
    client: String,
    #[tabled(rename = "KIND")]
    kind: String,
    #[tabled(rename = "TOTAL")]
    total: String,
    #[tabled(rename = "PAID")]
    paid: String,
    #[tabled(rename = "PROGRESS")]
    progress: String,
}

#[derive(Tabled)]
struct PeriodRow {
    #[tabled(rename = "#")]
    index: u32,
    #[tabled(rename = "DUE DATE")]
    due_date: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "AMOUNT")]
    amount: String,
    #[tabled(rename = "LEDGER ID")]
    ledger_id: String,
}

#[derive(Tabled)]
struct ReminderRow {
    #[tabled(rename = "PLAN")]
    plan: String,
    #[tabled(rename = "CLIENT")]
    client: String,
    #[tabled(rename = "#")]
    period: u32,
    #[tabled(rename = "DUE DATE")]
    due_date: String,
    #[tabled(rename = "AMOUNT")]
    amount: String,
    #[tabled(rename = "WHEN")]
    when: String,
}

/// Append TOTAL / PAID / OUTSTANDING rows under the column at `value_col`.
/// Columns left of it merge into one label cell, columns right of it are closed off.
fn add_financial_footer(table: &str, value_col: usize, rows: &[(&str, String)]) -> String {
    let lines: Vec<&str> = table.lines().collect();
    if lines.len() < 4 || rows.is_empty() {
        return table.to_string();
    }

    // Parse the top border to discover column widths
    let top = lines[0];
    let Some(inner) = top.strip_prefix('╭').and_then(|s| s.strip_suffix('╮')) else {
        return table.to_string();
    };

    let widths: Vec<usize> = inner.split('┬').map(|p| p.chars().count()).collect();
    if value_col == 0 || value_col >= widths.len() {
        return table.to_string();
    }

    // +1 per merged column border
    let left_width = widths[..value_col].iter().sum::<usize>() + value_col - 1;
    let value_width = widths[value_col];
    let last_col = widths.len() - 1;

    // Strip the original bottom border and start building
    let mut out = lines[..lines.len() - 1].join("\n");
    out.push('\n');

    let mut separator = String::from("├");
    for (i, width) in widths.iter().enumerate() {
        if i > 0 {
            let joint = if i == value_col || i == value_col + 1 {
                '┼'
            } else {
                '┴'
            };
            separator.push(joint);
        }
        separator.push_str(&"─".repeat(*width));
    }
    separator.push(if value_col == last_col { '┤' } else { '╯' });
    out.push_str(&separator);
    out.push('\n');

    for (idx, (label, value)) in rows.iter().enumerate() {
        out.push_str(&format!(
            "│ {:>left$} │ {:>value$} │\n",
            label,
            value,
            left = left_width - 2,
            value = value_width - 2
        ));
        if idx < rows.len() - 1 {
            out.push_str(&format!(
                "├{}┼{}┤\n",
                "─".repeat(left_width),
                "─".repeat(value_width)
            ));
        }
    }

    out.push_str(&format!(
        "╰{}┴{}╯",
        "─".repeat(left_width),
        "─".repeat(value_width)
    ));

    out
}

fn footer_rows(total: f64, paid: f64, currency_symbol: &str) -> Vec<(&'static str, String)> {
    vec![
        ("TOTAL", format_money(total, currency_symbol)),
        ("(-) PAID", format_money(paid, currency_symbol)),
        ("(=) OUTSTANDING", format_money(total - paid, currency_symbol)),
    ]
}

fn format_progress(summary: &PlanSummary) -> String {
    format!(
        "{}/{} ({:.0}%)",
        summary.paid_count, summary.period_count, summary.percent_complete
    )
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| PlanError::InvalidDate(value.to_string()))
}

/// List payment plans with their progress
fn cmd_plans(cfg_dir: &Path) -> Result<()> {
    ensure_config_dir(cfg_dir)?;

    let config = load_config(cfg_dir)?;
    let plans = load_payment_plans(cfg_dir)?;
    let symbol = &config.ledger.currency_symbol;

    if plans.is_empty() {
        println!("No plans configured.");
        println!("Add plans to: {}/plans.toml", cfg_dir.display());
        return Ok(());
    }

    let reconciler = Reconciler::new(
        ledger_store(cfg_dir, &config),
        config.schedule.weekly_rule()?,
    );
    let records = reconciler.store().load_all();

    let mut shown_total = 0.0;
    let mut shown_paid = 0.0;
    let rows: Vec<PlanRow> = plans
        .iter()
        .enumerate()
        .map(|(idx, plan)| {
            let periods = reconciler.build_periods_from(plan, &records);
            let summary = summarize(&periods, plan.period_count, plan.period_value);
            shown_total += summary.total_value;
            shown_paid += summary.paid_value;

            let progress = match plan.validate() {
                Ok(()) => format_progress(&summary),
                Err(_) => "INVALID".to_string(),
            };

            PlanRow {
                index: idx + 1,
                id: plan.analysis_id.clone(),
                client: plan.client_name.clone(),
                kind: plan.kind.to_string(),
                total: format_money(summary.total_value, symbol),
                paid: format_money(summary.paid_value, symbol),
                progress,
            }
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    let table = add_financial_footer(&table, 4, &footer_rows(shown_total, shown_paid, symbol));
    println!("{table}");

    println!();
    println!("Total: {} plans", plans.len());
    println!(
        "Use index number or id with periods/toggle/pay/unpay/report (e.g., 'planos periods 1')"
    );

    Ok(())
}

/// Show the periods of a plan
fn cmd_periods(cfg_dir: &Path, plan_ref: &str) -> Result<()> {
    ensure_config_dir(cfg_dir)?;

    let config = load_config(cfg_dir)?;
    let plans = load_payment_plans(cfg_dir)?;
    let plan = resolve_plan(&plans, plan_ref)?;
    let symbol = &config.ledger.currency_symbol;

    let reconciler = Reconciler::new(
        ledger_store(cfg_dir, &config),
        config.schedule.weekly_rule()?,
    );
    let periods = reconciler.build_periods(&plan);
    if periods.is_empty() {
        // Surface the reason an otherwise empty schedule came back empty
        plan.validate()?;
        println!("Plan {} has no periods.", plan.analysis_id);
        return Ok(());
    }

    let summary = summarize(&periods, plan.period_count, plan.period_value);
    let rows: Vec<PeriodRow> = periods
        .iter()
        .map(|p| PeriodRow {
            index: p.period_index,
            due_date: p.due_date.to_string(),
            status: status_label(p.is_paid).to_string(),
            amount: format_money(plan.period_value, symbol),
            ledger_id: p.ledger_id.clone().unwrap_or_else(|| "-".to_string()),
        })
        .collect();

    println!(
        "{} - {} ({}, {} periods of {})",
        plan.analysis_id,
        plan.client_name,
        plan.kind,
        plan.period_count,
        format_money(plan.period_value, symbol)
    );

    let table = Table::new(rows).with(Style::rounded()).to_string();
    let table = add_financial_footer(
        &table,
        3,
        &footer_rows(summary.total_value, summary.paid_value, symbol),
    );
    println!("{table}");
    println!("Progress: {}", format_progress(&summary));

    Ok(())
}

/// Toggle a period, or move it to an explicit state when `paid` is given
fn cmd_set_status(cfg_dir: &Path, plan_ref: &str, period: u32, paid: Option<bool>) -> Result<()> {
    ensure_config_dir(cfg_dir)?;

    let config = load_config(cfg_dir)?;
    let plans = load_payment_plans(cfg_dir)?;
    let plan = resolve_plan(&plans, plan_ref)?;
    let symbol = &config.ledger.currency_symbol;

    let reconciler = Reconciler::new(
        ledger_store(cfg_dir, &config),
        config.schedule.weekly_rule()?,
    );
    let outcome = match paid {
        Some(paid) => reconciler.set_period_status(&plan, period, paid)?,
        None => reconciler.toggle_period(&plan, period)?,
    };

    print_outcome(&plan, period, &outcome);

    let periods = reconciler.build_periods(&plan);
    let summary = summarize(&periods, plan.period_count, plan.period_value);
    println!(
        "  Progress: {} - {} of {}",
        format_progress(&summary),
        format_money(summary.paid_value, symbol),
        format_money(summary.total_value, symbol)
    );

    Ok(())
}

fn print_outcome(plan: &PaymentPlan, period: u32, outcome: &ToggleOutcome) {
    let state = if outcome.is_paid { "paid" } else { "pending" };
    if outcome.changed {
        println!(
            "Marked period {} of {} as {}",
            period, plan.analysis_id, state
        );
    } else {
        println!(
            "Period {} of {} is already {}",
            period, plan.analysis_id, state
        );
    }
    if let Some(id) = &outcome.ledger_id {
        println!("  Ledger: {}{}", id, if outcome.created { " (new)" } else { "" });
    }
}

/// List pending periods that are due soon
fn cmd_reminders(
    cfg_dir: &Path,
    days: Option<u32>,
    today: Option<String>,
    overdue: bool,
) -> Result<()> {
    ensure_config_dir(cfg_dir)?;

    let config = load_config(cfg_dir)?;
    let plans = load_payment_plans(cfg_dir)?;
    let symbol = &config.ledger.currency_symbol;

    let today = match today {
        Some(s) => parse_date(&s)?,
        None => chrono::Local::now().date_naive(),
    };
    let mut window = config.reminders.window();
    if let Some(days) = days {
        window.days_ahead = days;
    }
    window.include_overdue |= overdue;

    let reconciler = Reconciler::new(
        ledger_store(cfg_dir, &config),
        config.schedule.weekly_rule()?,
    );
    let records = reconciler.store().load_all();

    let mut reminders: Vec<_> = plans
        .iter()
        .flat_map(|plan| {
            let periods = reconciler.build_periods_from(plan, &records);
            due_reminders(plan, &periods, today, window)
        })
        .collect();
    reminders.sort_by(|a, b| {
        a.due_date
            .cmp(&b.due_date)
            .then_with(|| a.analysis_id.cmp(&b.analysis_id))
    });

    if reminders.is_empty() {
        println!(
            "No pending payments due within {} days of {}.",
            window.days_ahead, today
        );
        return Ok(());
    }

    let total: f64 = reminders.iter().map(|r| r.amount).sum();
    let rows: Vec<ReminderRow> = reminders
        .iter()
        .map(|r| ReminderRow {
            plan: r.analysis_id.clone(),
            client: r.client_name.clone(),
            period: r.period_index,
            due_date: r.due_date.to_string(),
            amount: format_money(r.amount, symbol),
            when: match r.days_until {
                0 => "today".to_string(),
                1 => "tomorrow".to_string(),
                d if d < 0 => format!("overdue {} days", -d),
                d => format!("in {d} days"),
            },
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");
    println!();
    println!(
        "{} pending payments, {} due",
        reminders.len(),
        format_money(total, symbol)
    );

    Ok(())
}

/// Summarize a plan and optionally write the report JSON
fn cmd_report(cfg_dir: &Path, plan_ref: &str, output: Option<PathBuf>) -> Result<()> {
    ensure_config_dir(cfg_dir)?;

    let config = load_config(cfg_dir)?;
    let plans = load_payment_plans(cfg_dir)?;
    let plan = resolve_plan(&plans, plan_ref)?;
    plan.validate()?;
    let symbol = &config.ledger.currency_symbol;

    let reconciler = Reconciler::new(
        ledger_store(cfg_dir, &config),
        config.schedule.weekly_rule()?,
    );
    let periods = reconciler.build_periods(&plan);
    let today = chrono::Local::now().date_naive();
    let report = build_report(&plan, &periods, &config.practice, symbol, today);

    println!("Report for {} ({})", plan.analysis_id, plan.client_name);
    println!("  Periods:     {}", report.summary.period_count);
    println!("  Paid:        {}", report.summary.paid_count);
    println!("  Total:       {}", format_money(report.summary.total_value, symbol));
    println!("  Paid value:  {}", format_money(report.summary.paid_value, symbol));
    println!(
        "  Outstanding: {}",
        format_money(report.summary.outstanding_value, symbol)
    );
    println!("  Complete:    {:.1}%", report.summary.percent_complete);

    if let Some(path) = output {
        write_report_json(&report, &path)?;
        println!("  Saved:       {}", path.display());
    }

    Ok(())
}

/// Show config and ledger status
fn cmd_status(cfg_dir: &Path) -> Result<()> {
    ensure_config_dir(cfg_dir)?;

    let config = load_config(cfg_dir)?;
    let plans = load_payment_plans(cfg_dir)?;
    let store = ledger_store(cfg_dir, &config);
    let records = store.load_all();
    let symbol = &config.ledger.currency_symbol;

    let reconciler = Reconciler::new(&store, config.schedule.weekly_rule()?);
    let (total, paid) = plans.iter().fold((0.0, 0.0), |(total, paid), plan| {
        let periods = reconciler.build_periods_from(plan, &records);
        let summary = summarize(&periods, plan.period_count, plan.period_value);
        (total + summary.total_value, paid + summary.paid_value)
    });

    // Records whose id does not point at a configured plan
    let known: BTreeSet<&str> = plans.iter().map(|p| p.analysis_id.as_str()).collect();
    let unreadable = records
        .iter()
        .filter(|r| matches!(r, StoredRecord::Opaque(_)))
        .count();
    let orphaned = records
        .iter()
        .filter_map(|r| r.id().and_then(LedgerKey::parse))
        .filter(|key| !known.contains(key.analysis_id.as_str()))
        .count();

    println!("Planos Status");
    println!("{}", "-".repeat(50));
    println!("Config directory: {}", cfg_dir.display());
    println!("Practice:         {}", config.practice.name);
    println!("Plans:            {}", plans.len());
    println!("Ledger:           {}", store.path().display());
    println!("Records:          {}", records.len());
    if unreadable > 0 {
        println!("Unreadable:       {}", unreadable);
    }
    if orphaned > 0 {
        println!("Orphaned:         {}", orphaned);
    }
    println!("Total:            {}", format_money(total, symbol));
    println!("Paid:             {}", format_money(paid, symbol));
    println!("Outstanding:      {}", format_money(total - paid, symbol));

    Ok(())
}
