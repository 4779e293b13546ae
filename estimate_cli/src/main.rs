//! # Roofline CLI
//!
//! Runs the estimate engine from the terminal.
//!
//! ```text
//! estimate_cli                          prompt for a single-pitch roof
//! estimate_cli input.json               resolve an EstimateInput JSON file
//! estimate_cli job.est                  open a saved estimate
//! estimate_cli input.json --save job.est --address "12 Elm St" [--customer "Pat Doe"]
//! ```
//!
//! Logging goes to stderr and is controlled with `RUST_LOG`
//! (e.g. `RUST_LOG=estimate_core=debug`).

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use clap::Parser;
use estimate_core::estimate::{Estimate, EstimateInput, ResolvedEstimate};
use estimate_core::file_io::{load_estimate_with_lock_check, save_estimate};
use estimate_core::labor::LaborConfiguration;
use estimate_core::measurements::MeasurementSet;
use estimate_core::{EstimateError, EstimateResult};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "estimate_cli")]
#[command(about = "Roofline - roofing estimate calculator", long_about = None)]
struct Args {
    /// EstimateInput JSON file or saved .est file; prompts when omitted
    source: Option<PathBuf>,

    /// Save the estimate to this .est file
    #[arg(long = "save", value_name = "PATH")]
    save_to: Option<PathBuf>,

    /// Customer name stored with the estimate
    #[arg(long)]
    customer: Option<String>,

    /// Job site address; required to save
    #[arg(long)]
    address: Option<String>,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();
}

fn prompt_f64(prompt: &str, default: f64) -> f64 {
    prompt_string(prompt)
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn prompt_string(prompt: &str) -> Option<String> {
    print!("{}", prompt);
    io::stdout().flush().ok()?;
    let mut input = String::new();
    io::stdin().lock().read_line(&mut input).ok()?;
    let trimmed = input.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn prompt_input() -> EstimateInput {
    println!("Roofline CLI - Roofing Estimate Calculator");
    println!("==========================================");
    println!();

    let area = prompt_f64("Enter roof area (sq ft) [2000]: ", 2000.0);
    let pitch = prompt_string("Enter pitch [6:12]: ").unwrap_or_else(|| "6:12".to_string());
    let package = prompt_string("Package (GAF 1, GAF 2, GAF 3, 3MG Standard, 3MG Select) [none]: ");
    let labor_rate = prompt_f64("Labor rate per square [85]: ", 85.0);
    let margin = prompt_f64("Profit margin % [25]: ", 25.0);

    EstimateInput {
        measurements: Some(MeasurementSet::single_pitch(pitch, area)),
        package,
        labor: LaborConfiguration {
            labor_rate,
            ..Default::default()
        },
        profit_margin_percent: margin,
        ..Default::default()
    }
}

fn read_input(path: &Path) -> EstimateResult<EstimateInput> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| EstimateError::file_error("read", path.display().to_string(), e.to_string()))?;
    Ok(serde_json::from_str(&contents)?)
}

fn load(args: &Args) -> EstimateResult<Estimate> {
    let Some(source) = &args.source else {
        let mut estimate = Estimate::default();
        estimate.input = prompt_input();
        return Ok(estimate);
    };

    if source.extension().is_some_and(|e| e == "est") {
        let (estimate, lock) = load_estimate_with_lock_check(source)?;
        if let Some(lock) = lock {
            println!(
                "Note: open by {} on {} since {} (read-only)",
                lock.user_id, lock.machine, lock.locked_at
            );
        }
        return Ok(estimate);
    }

    let mut estimate = Estimate::default();
    estimate.input = read_input(source)?;
    Ok(estimate)
}

fn run(args: Args) -> EstimateResult<()> {
    let mut estimate = load(&args)?;
    if let Some(customer) = &args.customer {
        estimate.meta.customer_name = customer.clone();
    }
    if let Some(address) = &args.address {
        estimate.meta.customer_address = address.clone();
    }

    let resolved = estimate.resolve();
    print_summary(&resolved);

    println!();
    println!("JSON Output:");
    println!("{}", serde_json::to_string_pretty(&resolved)?);

    if let Some(path) = &args.save_to {
        save_estimate(&estimate, path)?;
        info!(path = %path.display(), "estimate saved");
        println!();
        println!("Saved to {}", path.display());
    }
    Ok(())
}

fn print_summary(resolved: &ResolvedEstimate) {
    println!();
    println!("═══════════════════════════════════════");
    println!("  ESTIMATE SUMMARY");
    println!("═══════════════════════════════════════");
    println!();
    println!("Roof:     {:?}", resolved.roof_type);
    println!("Package:  {}", resolved.package.as_deref().unwrap_or("none"));
    println!();
    println!("Materials:");
    if resolved.selected_materials.is_empty() {
        println!("  (none)");
    }
    for entry in resolved.selected_materials.iter() {
        println!(
            "  {:>5} {:<8} {:<44} ${:>10.2}{}",
            entry.quantity,
            entry.material.unit.display_name(),
            entry.material.name,
            entry.line_cost(),
            if entry.is_mandatory { "" } else { "  (added)" }
        );
    }
    for addon in &resolved.addons {
        println!("  {:<59} ${:>10.2}", addon.description, addon.amount);
    }
    println!();
    println!("Labor:");
    for line in &resolved.labor.lines {
        println!(
            "  {:<44} {:>6} x {:>8.2} ${:>10.2}",
            line.description, line.quantity, line.rate, line.amount
        );
    }

    let pricing = &resolved.pricing;
    println!();
    println!("═══════════════════════════════════════");
    println!("  Materials:  ${:>12.2}", pricing.total_material_cost());
    println!("  Labor:      ${:>12.2}", pricing.labor_cost);
    println!("  Subtotal:   ${:>12.2}", pricing.subtotal);
    println!(
        "  Profit:     ${:>12.2} ({}%)",
        pricing.profit_amount, pricing.profit_margin_percent
    );
    println!("  TOTAL:      ${:>12.2}", pricing.total_price);
    println!("═══════════════════════════════════════");
}

fn main() {
    let args = Args::parse();
    init_logging();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        if let Ok(json) = serde_json::to_string_pretty(&e) {
            eprintln!();
            eprintln!("Error JSON:");
            eprintln!("{}", json);
        }
        std::process::exit(1);
    }
}
