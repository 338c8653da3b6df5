//! Prodchain - Command Line Interface
//!
//! This is the main entry point for the production chain resolver.
//! Run with `--help` to see all available options.

use clap::Parser;
use std::error::Error;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use prodchain::{
    catalog::Catalog,
    display::{format_chain, format_dot, format_ledger, format_totals},
    error::ResolveError,
    resolver::{ResolveOptions, Resolver},
};

/// Command-line arguments for prodchain.
#[derive(Parser, Debug)]
#[command(name = "prodchain")]
#[command(author, version, about = "Compute the production chain needed to sustain an output rate", long_about = None)]
struct Args {
    /// Item to produce (quote names containing spaces)
    item: String,

    /// Target items per minute (defaults to one building's output)
    rate: Option<f64>,

    /// Show and cost the alternate recipes of every input
    #[arg(short, long)]
    alternates: bool,

    /// Also print the ledger before netting
    #[arg(short, long)]
    resources: bool,

    /// Round building counts up to whole numbers and reuse the surplus
    #[arg(short, long)]
    overproduce: bool,

    /// With --overproduce, do not charge demand against earlier surplus
    #[arg(long)]
    no_reuse: bool,

    /// Print aggregate totals instead of the tree
    #[arg(short, long, conflicts_with = "dot")]
    total: bool,

    /// Print a Graphviz digraph instead of the tree
    #[arg(short, long)]
    dot: bool,

    /// Recipe table to use instead of the built-in one (CSV)
    #[arg(long)]
    recipes: Option<PathBuf>,

    /// Log every expansion step to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let catalog = match &args.recipes {
        Some(path) => Catalog::from_path(path)?,
        None => Catalog::builtin()?,
    };

    let options = ResolveOptions {
        overproduce: args.overproduce,
        reuse_surplus: !args.no_reuse,
        alternates: args.alternates,
    };
    let resolver = Resolver::new(&catalog, options);

    if let Err(e) = run(&args, &resolver) {
        match &e {
            ResolveError::NotFound { query } => match catalog.suggest(query) {
                Some(best) => eprintln!("Recipe '{}' not found! Did you mean '{}'?", query, best),
                None => eprintln!("Recipe '{}' not found!", query),
            },
            _ => eprintln!("Error: {}", e),
        }
        std::process::exit(1);
    }

    Ok(())
}

fn run(args: &Args, resolver: &Resolver) -> Result<(), ResolveError> {
    let catalog = resolver.catalog();
    let root = catalog.default_recipe(&args.item)?;
    let requested = args.rate.filter(|rate| *rate != 0.0);

    if args.dot {
        let graph = resolver.graph(&args.item, requested.unwrap_or(root.output.rate))?;
        print!("{}", format_dot(&graph));
        return Ok(());
    }

    if args.total {
        let totals = resolver.total_recipe(root, requested.unwrap_or(root.output.rate))?;
        print!("{}", format_totals(&totals));
        return Ok(());
    }

    // Every root alternate gets its own ledger.
    for (index, recipe) in catalog.alternates(&args.item).enumerate() {
        if index > 0 {
            println!("\n\nALTERNATE:");
        }
        let mut resolution = resolver.resolve_recipe(recipe, requested.unwrap_or(recipe.output.rate))?;
        println!("{}", format_chain(&resolution.tree));
        if args.resources {
            println!("{}", format_ledger(&resolution.ledger));
        }
        resolution.ledger.net();
        print!("{}", format_ledger(&resolution.ledger));
    }

    Ok(())
}
