use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;

use donutimizer::{
    find_donut, solve, Direction, Donut, Flavor, FlavorProfile, Inventory, Outcome, CATALOG,
    DONUTS, SLOT_CAP,
};

#[derive(Parser)]
#[command(
    name = "donutimizer",
    about = "Berry mix planner for the donut-crafting minigame",
    version
)]
struct Args {
    /// Donut to plan, by name or an unambiguous part of one; shows an
    /// interactive menu when omitted
    recipe: Option<String>,

    /// Path to the berry inventory file
    #[arg(short, long, default_value = "inventory.toml")]
    inventory: PathBuf,

    /// Show each picked berry's flavor values next to its count
    #[arg(long)]
    stats: bool,

    /// Print the known donuts and their flavor targets, then exit
    #[arg(long, conflicts_with = "recipe")]
    list: bool,

    /// Write a starter inventory file with every berry at zero, then exit
    #[arg(long, conflicts_with = "recipe")]
    init: bool,

    /// Enable verbose logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt().with_env_filter(log_level).init();

    if args.list {
        print_donuts();
        return Ok(());
    }
    if args.init {
        return write_template(&args.inventory);
    }

    match &args.recipe {
        Some(query) => run_once(query, &args),
        None => run_interactive(&args),
    }
}

fn run_once(query: &str, args: &Args) -> Result<()> {
    let donut = lookup_donut(query)?;
    let inventory = Inventory::load(&args.inventory)?;
    plan(donut, &inventory, args.stats)
}

fn run_interactive(args: &Args) -> Result<()> {
    println!("=== Donut Mixer ===");
    println!(
        "Edit {} between rounds; it is re-read before every solve.",
        args.inventory.display()
    );
    println!();

    loop {
        for (index, donut) in DONUTS.iter().enumerate() {
            println!("  {}. {}", index + 1, donut.name);
        }
        print!("Pick a donut (number or name, q to quit): ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break; // EOF
        }
        let input = input.trim();
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("q") || input.eq_ignore_ascii_case("quit") {
            break;
        }

        let donut = match select_donut(input) {
            Some(donut) => donut,
            None => {
                eprintln!("Unknown donut '{input}'.");
                eprintln!("Try a number from the menu or a unique part of a name.");
                continue;
            }
        };

        // Re-read the bag every round so edits between solves are picked up.
        let inventory = match Inventory::load(&args.inventory) {
            Ok(inventory) => inventory,
            Err(error) => {
                eprintln!("{error}");
                eprintln!("Fix the inventory file and try again.");
                continue;
            }
        };

        println!();
        plan(donut, &inventory, args.stats)?;
        println!();
    }
    Ok(())
}

/// Menu input is a 1-based index or a name fragment.
fn select_donut(input: &str) -> Option<&'static Donut> {
    if let Ok(number) = input.parse::<usize>() {
        return (1..=DONUTS.len())
            .contains(&number)
            .then(|| &DONUTS[number - 1]);
    }
    find_donut(input)
}

fn lookup_donut(query: &str) -> Result<&'static Donut> {
    find_donut(query).with_context(|| {
        let names: Vec<&str> = DONUTS.iter().map(|donut| donut.name).collect();
        format!(
            "unknown donut '{}'. Valid donuts are: {}",
            query.trim(),
            names.join(", ")
        )
    })
}

/// Solves one donut in both directions and prints the two mixes.
fn plan(donut: &Donut, inventory: &Inventory, stats: bool) -> Result<()> {
    println!("=== {} ===", donut.name);
    println!("Target: {}", format_profile(&donut.targets));
    println!();

    let economy = solve(&CATALOG, inventory, &donut.targets, Direction::Minimize)
        .context("economy solve failed")?;
    let luxury = solve(&CATALOG, inventory, &donut.targets, Direction::Maximize)
        .context("luxury solve failed")?;

    render("Economy Recipe", "uses common berries", &economy, stats);
    println!();
    render("Luxury Recipe", "uses rare berries", &luxury, stats);
    Ok(())
}

fn render(title: &str, caption: &str, outcome: &Outcome, stats: bool) {
    println!("--- {title} ({caption}) ---");
    match outcome {
        Outcome::Mix(mix) if mix.is_empty() => println!("No berries needed."),
        Outcome::Mix(mix) => {
            for pick in &mix.picks {
                if stats {
                    println!(
                        "  {:>2}x {:<12}  {}",
                        pick.count,
                        pick.berry.name,
                        format_profile(&pick.berry.flavors)
                    );
                } else {
                    println!("  {:>2}x {}", pick.count, pick.berry.name);
                }
            }
            println!(
                "Slots: {}/{} | Calories: {} | Lv. Boost: +{}",
                mix.slots(),
                SLOT_CAP,
                mix.calories(),
                mix.level_boost()
            );
        }
        Outcome::Infeasible => println!("Not possible with current inventory."),
    }
}

fn format_profile(profile: &FlavorProfile) -> String {
    Flavor::ALL
        .iter()
        .map(|&flavor| format!("{flavor} {}", profile[flavor]))
        .collect::<Vec<_>>()
        .join(" | ")
}

fn print_donuts() {
    println!("Known donuts:");
    for (index, donut) in DONUTS.iter().enumerate() {
        println!("  {}. {}", index + 1, donut.name);
        println!("     {}", format_profile(&donut.targets));
    }
}

fn write_template(path: &Path) -> Result<()> {
    if path.exists() {
        bail!("{} already exists; refusing to overwrite it", path.display());
    }

    let mut contents = String::from(
        "# Berry inventory for donutimizer.\n\
         # Set each berry to the quantity in your bag; missing entries count as zero.\n\n\
         [berries]\n",
    );
    for berry in &CATALOG {
        contents.push_str(&format!("\"{}\" = 0\n", berry.name));
    }
    fs::write(path, contents).with_context(|| format!("unable to write {}", path.display()))?;

    println!("Wrote starter inventory to {}.", path.display());
    Ok(())
}
