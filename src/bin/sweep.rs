//! Answers "what can I bake with this bag?": solves every donut recipe in
//! both directions against one inventory and writes a CSV summary.

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rayon::prelude::*;

use donutimizer::{solve, Direction, Donut, Inventory, Mix, Outcome, CATALOG, DONUTS};

#[derive(Parser)]
#[command(
    name = "sweep",
    about = "Evaluate every donut recipe against one inventory",
    version
)]
struct Args {
    /// Path to the berry inventory file
    #[arg(short, long, default_value = "inventory.toml")]
    inventory: PathBuf,

    /// Where to write the CSV summary
    #[arg(short, long, default_value = "donuts.csv")]
    out: PathBuf,

    /// Enable verbose logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt().with_env_filter(log_level).init();

    let inventory = Inventory::load(&args.inventory)?;

    // Recipes are independent, so solve them in parallel and write in order.
    let rows: Vec<String> = DONUTS
        .par_iter()
        .map(|donut| summarize(donut, &inventory))
        .collect::<Result<Vec<_>>>()?
        .into_iter()
        .flatten()
        .collect();

    let mut file = File::create(&args.out)
        .with_context(|| format!("unable to create {}", args.out.display()))?;
    writeln!(
        file,
        "donut,direction,craftable,slots,calories,level_boost,weight,berries"
    )?;
    for row in &rows {
        writeln!(file, "{row}")?;
    }

    println!("Wrote {} rows to {}.", rows.len(), args.out.display());
    Ok(())
}

/// One economy row and one luxury row for a single donut.
fn summarize(donut: &Donut, inventory: &Inventory) -> Result<Vec<String>> {
    let mut rows = Vec::with_capacity(2);
    for (label, direction) in [
        ("economy", Direction::Minimize),
        ("luxury", Direction::Maximize),
    ] {
        let outcome = solve(&CATALOG, inventory, &donut.targets, direction)
            .with_context(|| format!("{label} solve failed for {}", donut.name))?;
        rows.push(match outcome {
            Outcome::Mix(mix) => format!(
                "{},{},yes,{},{},{},{},{}",
                donut.name,
                label,
                mix.slots(),
                mix.calories(),
                mix.level_boost(),
                mix.position_weight(),
                format_mix(&mix),
            ),
            Outcome::Infeasible => format!("{},{},no,,,,,", donut.name, label),
        });
    }
    Ok(rows)
}

// Berry names carry no commas, so the joined list is CSV-safe as-is.
fn format_mix(mix: &Mix) -> String {
    mix.picks
        .iter()
        .map(|pick| format!("{}x {}", pick.count, pick.berry.name))
        .collect::<Vec<_>>()
        .join(" + ")
}
