//! Hex Shape Packer
//!
//! Packs a list of polyhex shapes from a catalog onto a hexagonal board and
//! prints the first packing found, optionally pausing after every placement.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use hexpack::catalog::{self, Catalog};
use hexpack::config::{self, ShapeEntry, SolveConfig};
use hexpack::geometry::normalize;
use hexpack::persistence::{self, SolveReport};
use hexpack::{format_board, solve_with, Board, NoopObserver, Placement, StepObserver};

/// Packs polyhex shapes onto a hexagonal board.
#[derive(Parser)]
#[command(name = "hexpack")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Pack shapes onto a board and print the result.
    Solve(SolveArgs),
    /// List catalog categories, or the shapes in one category.
    List {
        /// Catalog directory holding filelist.json.
        #[arg(long, default_value = "shapes", env = "HEXPACK_CATALOG")]
        catalog: PathBuf,
        category: Option<String>,
    },
    /// Print a saved solve report.
    Show {
        /// Report directory or solution.json file.
        report: PathBuf,
    },
    /// Normalize a shape file so its minimum q and r are zero.
    Normalize {
        shape: PathBuf,
        /// Write the result here instead of printing it.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(clap::Args)]
struct SolveArgs {
    /// TOML solve file; flags below override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(long)]
    rows: Option<usize>,
    #[arg(long)]
    cols: Option<usize>,
    /// Catalog directory holding filelist.json.
    #[arg(long, env = "HEXPACK_CATALOG")]
    catalog: Option<PathBuf>,
    /// Pause after every placement until Enter is pressed.
    #[arg(long)]
    step: bool,
    /// Directory to write solution.txt and solution.json into.
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Shapes to pack, in order; replaces the config's list.
    shapes: Vec<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Solve(args) => run_solve(args),
        Command::List { catalog, category } => run_list(&catalog, category.as_deref()),
        Command::Show { report } => run_show(&report),
        Command::Normalize { shape, output } => run_normalize(&shape, output.as_deref()),
    }
}

/// Merges the config file and command line flags.
fn resolve_config(args: SolveArgs) -> Result<SolveConfig> {
    let mut config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => SolveConfig::default(),
    };

    if let Some(rows) = args.rows {
        config.rows = rows;
    }
    if let Some(cols) = args.cols {
        config.cols = cols;
    }
    if let Some(catalog) = args.catalog {
        config.catalog = catalog;
    }
    if args.output.is_some() {
        config.output = args.output;
    }
    config.step |= args.step;
    if !args.shapes.is_empty() {
        config.shapes = args
            .shapes
            .into_iter()
            .map(|name| ShapeEntry { name, color: None })
            .collect();
    }

    if config.shapes.is_empty() {
        bail!("no shapes to pack; list them on the command line or in a config file");
    }
    Ok(config)
}

/// Prints the board after each placement and waits for Enter.
struct InteractiveStepper {
    owners: Vec<String>,
    step: usize,
}

impl StepObserver for InteractiveStepper {
    fn on_step(&mut self, board: &Board, placement: &Placement) {
        self.step += 1;
        let owners: Vec<&str> = self.owners.iter().map(String::as_str).collect();
        println!(
            "Step {}: {} rotated {} at {:?}",
            self.step, placement.shape, placement.rotation, placement.offset
        );
        print!("{}", format_board(board, &owners));
        print!("[Enter] next step ");
        // a closed stdin just means we stop pausing
        let _ = io::stdout().flush();
        let _ = io::stdin().lock().read_line(&mut String::new());
    }
}

/// Loads the catalog, solves, prints and optionally saves the result.
fn run_solve(args: SolveArgs) -> Result<()> {
    let config = resolve_config(args)?;

    let catalog = Catalog::load(&config.catalog)
        .with_context(|| format!("loading catalog from {}", config.catalog.display()))?;

    let request = config.to_request(&catalog)?;
    let result = if config.step {
        let mut stepper = InteractiveStepper {
            owners: request.names().into_iter().map(String::from).collect(),
            step: 0,
        };
        solve_with(&request, &mut stepper)?
    } else {
        solve_with(&request, &mut NoopObserver)?
    };

    if result.outcome.is_solved() {
        println!("Solved after {} placements:", result.stats.placements);
    } else {
        println!("No packing exists for these shapes on this board");
    }
    for (i, name) in request.names().iter().enumerate() {
        println!("  {}: {name}", i + 1);
    }
    print!("{}", format_board(&result.board, &request.names()));

    if let Some(dir) = &config.output {
        let report = SolveReport::new(&request, &result);
        persistence::save(dir, &report)
            .with_context(|| format!("saving report to {}", dir.display()))?;
        println!("Wrote {} and {}", persistence::REPORT_TXT, persistence::REPORT_JSON);
    }
    Ok(())
}

/// Lists categories, or the shapes of one category with their cell counts.
fn run_list(base: &Path, category: Option<&str>) -> Result<()> {
    let catalog = Catalog::load(base)
        .with_context(|| format!("loading catalog from {}", base.display()))?;

    match category {
        None => {
            for name in catalog.categories() {
                let count = catalog.shapes_in(name).map_or(0, <[String]>::len);
                println!("{name} ({count} shapes)");
            }
        }
        Some(category) => {
            let Some(names) = catalog.shapes_in(category) else {
                bail!("no category named {category:?}");
            };
            for name in names {
                let cells = catalog.get(name).map_or(0, |cells| cells.len());
                println!("{name} ({cells} cells)");
            }
        }
    }

    let report = catalog.report();
    if !report.is_clean() {
        eprintln!(
            "{} duplicate names, {} unreadable shapes",
            report.duplicates.len(),
            report.failures.len()
        );
    }
    Ok(())
}

/// Prints a saved report.
fn run_show(path: &Path) -> Result<()> {
    let report = persistence::load(path)?;
    let status = if report.solved { "Solved" } else { "Unsatisfiable" };
    println!("{status}: {}x{} board", report.rows, report.cols);
    for placement in &report.placements {
        println!(
            "  {} rotated {} at {:?}",
            placement.shape, placement.rotation, placement.offset
        );
    }
    print!("{}", report.format());
    Ok(())
}

/// Normalizes a shape file, printing or writing the result.
fn run_normalize(path: &Path, output: Option<&Path>) -> Result<()> {
    let cells = normalize(&catalog::load_shape(path)?);
    match output {
        Some(output) => catalog::save_shape(output, &cells)?,
        None => print!("{}", catalog::format_shape(&cells)),
    }
    Ok(())
}
