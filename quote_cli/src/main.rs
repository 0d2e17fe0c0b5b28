//! # Cotiza CLI Application
//!
//! Prices the jobs in a shop snapshot and prints their breakdowns, or, when
//! no snapshot is given, prices one quote typed at the prompt against the
//! default catalog.

mod logging;

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use serde_json::json;
use tracing::{info, warn};

use quote_core::catalog::{default_machines, default_materials};
use quote_core::currency::{format_amount, parse_rate_response, LocalizedBreakdown};
use quote_core::errors::{QuoteError, QuoteResult};
use quote_core::job::Job;
use quote_core::presentation::{summary_rows, tariff_description, RowKind};
use quote_core::pricing::{calculate_with_trace, CostCalculation};
use quote_core::settings::ShopSettings;
use quote_core::summary::PortfolioSummary;
use quote_core::units::Hours;
use quote_core::ShopSnapshot;

#[derive(Parser, Debug)]
#[command(name = "quote_cli", version, about = "Price 3D print quotes")]
struct Args {
    /// Shop snapshot (JSON). Without one, a single quote is read from the prompt
    snapshot: Option<PathBuf>,

    /// Only price the job with this id
    #[arg(long)]
    job: Option<String>,

    /// Local currency code; overrides the snapshot's local currency
    #[arg(long)]
    currency: Option<String>,

    /// Local currency units per unit of base currency
    #[arg(long, env = "COTIZA_EXCHANGE_RATE")]
    rate: Option<f64>,

    /// Exchange-rate provider response (JSON) to read the local rate from
    #[arg(long, conflicts_with = "rate")]
    rate_file: Option<PathBuf>,

    /// Print breakdowns as JSON instead of tables
    #[arg(long)]
    json: bool,

    /// Show the step-by-step calculation trace
    #[arg(long)]
    trace: bool,

    /// Print portfolio totals over accepted jobs
    #[arg(long)]
    summary: bool,
}

/// Local currency and the rate to reach it from base currency
struct LocalCurrency {
    code: String,
    rate: f64,
}

impl LocalCurrency {
    fn convert(&self, calc: &CostCalculation) -> Option<LocalizedBreakdown> {
        let breakdown = calc.breakdown.as_ref()?;
        LocalizedBreakdown::convert(breakdown, Some(self.rate), self.code.as_str())
    }
}

fn prompt_f64(prompt: &str, default: f64) -> f64 {
    print!("{}", prompt);
    if io::stdout().flush().is_err() {
        return default;
    }

    let mut input = String::new();
    if io::stdin().lock().read_line(&mut input).is_err() {
        return default;
    }

    input.trim().parse().unwrap_or(default)
}

fn read_file(path: &Path, field: &str) -> QuoteResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| QuoteError::invalid_input(field, path.display().to_string(), e.to_string()))
}

fn money(amount: f64, settings: &ShopSettings) -> String {
    let prefs = &settings.currency;
    format_amount(amount, &prefs.base_code, prefs.effective_decimal_places(), prefs.display)
}

/// Work out which local currency to show, if any.
fn resolve_local(args: &Args, settings: &ShopSettings) -> QuoteResult<Option<LocalCurrency>> {
    let code = args
        .currency
        .clone()
        .or_else(|| settings.currency.local_code.clone());
    let Some(code) = code else {
        if args.rate.is_some() || args.rate_file.is_some() {
            warn!("exchange rate given but no local currency is set, pass --currency to use it");
        }
        return Ok(None);
    };

    let rate = match (&args.rate_file, args.rate) {
        (Some(path), _) => {
            let rate = parse_rate_response(&read_file(path, "rate_file")?, &code)?;
            if !rate.base.eq_ignore_ascii_case(&settings.currency.base_code) {
                warn!(
                    rate_base = %rate.base,
                    shop_base = %settings.currency.base_code,
                    "exchange rate is quoted against a different base currency"
                );
            }
            info!(code = %rate.code, date = ?rate.date, rate = rate.rate, "exchange rate loaded");
            rate.rate
        }
        (None, Some(rate)) => rate,
        (None, None) => return Ok(None),
    };

    if !(rate.is_finite() && rate > 0.0) {
        warn!(rate, "exchange rate unusable, local figures omitted");
        return Ok(None);
    }
    Ok(Some(LocalCurrency { code, rate }))
}

fn print_breakdown(
    job: &Job,
    calc: &CostCalculation,
    settings: &ShopSettings,
    local: Option<&LocalCurrency>,
    show_trace: bool,
) {
    println!("═══════════════════════════════════════");
    println!("  {} ({})", job.name, job.status);
    println!("═══════════════════════════════════════");

    let (h, m, s) = Hours(job.print_hours).to_hms();
    println!("  Print time: {}h {:02}m {:02}s", h, m, s);

    match &calc.breakdown {
        Some(b) => {
            println!("  {}", tariff_description(job.tariff, settings));
            if b.unresolved_parts > 0 {
                println!("  {} part(s) skipped: material not in catalog", b.unresolved_parts);
            }
            println!();
            for row in summary_rows(b) {
                if row.kind != RowKind::Line {
                    println!("  ---------------------------------");
                }
                println!("  {:<24} {:>14}", row.label, row.formatted(settings));
            }
            if b.is_loss() {
                println!();
                println!("  [WARN] Manual price is below cost");
            }

            if let Some(converted) = local.and_then(|l| l.convert(calc)) {
                println!(
                    "  {:<24} {:>14}",
                    "Total (local)",
                    format_amount(
                        converted.total,
                        &converted.currency_code,
                        settings.currency.effective_decimal_places(),
                        settings.currency.display
                    )
                );
            }
        }
        None => match &calc.failure {
            Some(e) if e.is_incomplete_quote() => println!("  Incomplete quote: {}", e),
            Some(e) => println!("  Cannot price: {}", e),
            None => println!("  Incomplete quote: cannot be priced yet"),
        },
    }

    if show_trace {
        println!();
        println!("  Trace:");
        for line in &calc.trace {
            println!("    {}", line);
        }
    }
    println!();
}

fn print_json(job: &Job, calc: &CostCalculation, local: Option<&LocalCurrency>, show_trace: bool) {
    let mut output = json!({
        "job_id": job.id,
        "name": job.name,
        "breakdown": calc.breakdown,
        "failure": calc.failure,
        "local": local.and_then(|l| l.convert(calc)),
    });
    if show_trace {
        output["trace"] = json!(calc.trace);
    }
    match serde_json::to_string_pretty(&output) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("Error: {}", e),
    }
}

fn print_summary(summary: &PortfolioSummary, settings: &ShopSettings, as_json: bool) {
    if as_json {
        let output = json!({
            "summary": summary,
            "priced": summary.priced(),
            "margin_on_revenue": summary.margin_on_revenue(),
        });
        if let Ok(text) = serde_json::to_string_pretty(&output) {
            println!("{}", text);
        }
        return;
    }
    println!("═══════════════════════════════════════");
    println!("  PORTFOLIO");
    println!("═══════════════════════════════════════");
    println!("  Revenue:  {:>14}", money(summary.revenue, settings));
    println!("  Cost:     {:>14}", money(summary.cost, settings));
    println!("  Profit:   {:>14}", money(summary.profit, settings));
    if let Some(margin) = summary.margin_on_revenue() {
        println!("  Margin:   {:>13.1}%", margin);
    }
    println!();
    println!(
        "  Accepted: {} ({} priced)  Draft: {}  Canceled: {}",
        summary.accepted,
        summary.priced(),
        summary.draft,
        summary.canceled
    );
    if summary.uncomputable > 0 {
        println!("  {} accepted job(s) could not be priced", summary.uncomputable);
    }
}

fn run_snapshot(path: &Path, args: &Args) -> QuoteResult<()> {
    let snapshot = ShopSnapshot::from_json(&read_file(path, "snapshot")?)?;
    let local = resolve_local(args, &snapshot.settings)?;

    for record in &snapshot.migration_notes {
        for note in &record.notes {
            if note.is_ambiguous() {
                warn!(record = %record.record_id, "{}", note);
            } else {
                info!(record = %record.record_id, "{}", note);
            }
        }
    }
    if !snapshot.skipped.is_empty() && !args.json {
        println!("{} record(s) could not be read and were left out:", snapshot.skipped.len());
        for record in &snapshot.skipped {
            let id = record.record_id.as_deref().unwrap_or("<no id>");
            println!("  {}[{}] {}: {}", record.collection, record.index, id, record.error);
        }
        println!();
    }

    let jobs: Vec<&Job> = match &args.job {
        Some(id) => vec![snapshot
            .job(id)
            .ok_or_else(|| QuoteError::invalid_input("job", id.as_str(), "no job with this id in the snapshot"))?],
        None if args.summary => Vec::new(),
        None => snapshot.jobs.iter().collect(),
    };

    for job in jobs {
        let calc = snapshot.quote(job);
        if args.json {
            print_json(job, &calc, local.as_ref(), args.trace);
        } else {
            print_breakdown(job, &calc, &snapshot.settings, local.as_ref(), args.trace);
        }
    }

    if args.summary {
        print_summary(&snapshot.summary(), &snapshot.settings, args.json);
    }
    Ok(())
}

fn run_demo(args: &Args) -> QuoteResult<()> {
    println!("Cotiza CLI - 3D Print Quote Calculator");
    println!("======================================");
    println!();
    println!("No snapshot given. Pricing a quote on the default catalog...");
    println!();

    let grams = prompt_f64("PLA used (g) [100.0]: ", 100.0);
    let print_h = prompt_f64("Print time, hours [2]: ", 2.0);
    let print_m = prompt_f64("Print time, minutes [0]: ", 0.0);
    let labor_h = prompt_f64("Labor time, hours [1]: ", 1.0);
    let labor_m = prompt_f64("Labor time, minutes [0]: ", 0.0);
    let margin = prompt_f64("Profit margin (%) [50.0]: ", 50.0);
    println!();

    let settings = ShopSettings {
        profit_margin_percent: margin,
        ..ShopSettings::default()
    };
    let local = resolve_local(args, &settings)?;
    let job = Job::new("CLI demo", "ender3_default")
        .with_part("pla_default_black", grams)
        .with_print_hours(Hours::from_hms(print_h, print_m, 0.0).value())
        .with_labor_hours(Hours::from_hms(labor_h, labor_m, 0.0).value());

    let calc = calculate_with_trace(&job, &default_materials(), &default_machines(), &settings);
    if args.json {
        print_json(&job, &calc, local.as_ref(), args.trace);
    } else {
        print_breakdown(&job, &calc, &settings, local.as_ref(), args.trace);
    }
    Ok(())
}

fn main() -> ExitCode {
    logging::init();
    let args = Args::parse();

    let result = match &args.snapshot {
        Some(path) => run_snapshot(path, &args),
        None => run_demo(&args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            if let Ok(json) = serde_json::to_string_pretty(&e) {
                eprintln!();
                eprintln!("Error JSON:");
                eprintln!("{}", json);
            }
            ExitCode::FAILURE
        }
    }
}
