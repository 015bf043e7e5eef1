//! Command line front end for the table-driven cellular automaton

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::{info, warn};
use std::path::PathBuf;
use std::time::Instant;
use tabular_ca::{
    automaton::{create_example_files, Engine, RuleFileCatalog, RuleTable},
    config::{CliOverrides, OutputFormat, Settings},
    session::Session,
    utils::{ColorOutput, GridFormatter},
};

#[derive(Parser)]
#[command(name = "tabular_ca")]
#[command(about = "Cellular automaton simulator driven by transition function tables")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone)]
struct SimulationArgs {
    /// Optional grid size followed by a .tab and/or .cas file
    inputs: Vec<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "config/default.yaml")]
    config: PathBuf,

    /// Square grid size (overrides config)
    #[arg(long)]
    size: Option<usize>,

    /// Grid rows (overrides size)
    #[arg(long)]
    rows: Option<usize>,

    /// Grid columns (overrides size)
    #[arg(long)]
    cols: Option<usize>,

    /// Transition function file (overrides config)
    #[arg(short, long)]
    rules: Option<PathBuf>,

    /// Initial state file (overrides config)
    #[arg(short, long)]
    state: Option<PathBuf>,

    /// Working directory holding .tab and default files (overrides config)
    #[arg(short, long)]
    dir: Option<PathBuf>,

    /// Output format (overrides config)
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the automaton for a number of generations and print the result
    Run {
        #[command(flatten)]
        args: SimulationArgs,

        /// Number of generations (overrides config)
        #[arg(short = 'n', long)]
        steps: Option<usize>,

        /// Print every generation, not only the last
        #[arg(long)]
        show_evolution: bool,
    },

    /// Control the automaton with line commands read from stdin
    Interactive {
        #[command(flatten)]
        args: SimulationArgs,
    },

    /// Show the header and rule count of a transition function file
    Inspect {
        /// The .tab file
        file: PathBuf,

        /// Configuration file path (for the palette bound)
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,
    },

    /// List the transition function files of a directory
    Catalog {
        /// Directory to scan
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },

    /// Create an example configuration, state and rule files
    Setup {
        /// Directory to create files in
        #[arg(short, long, default_value = ".")]
        directory: PathBuf,

        /// Force overwrite existing files
        #[arg(short, long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            args,
            steps,
            show_evolution,
        } => run_command(args, steps, show_evolution),
        Commands::Interactive { args } => interactive_command(args),
        Commands::Inspect { file, config } => inspect_command(file, config),
        Commands::Catalog { dir } => catalog_command(dir),
        Commands::Setup { directory, force } => setup_command(directory, force),
    }
}

/// Load the configuration file and apply command line overrides
fn load_settings(args: &SimulationArgs, steps: Option<usize>) -> Result<Settings> {
    let mut settings = if args.config.exists() {
        Settings::from_file(&args.config)
            .with_context(|| format!("Failed to load config from {}", args.config.display()))?
    } else {
        info!("Config file {} not found, using defaults", args.config.display());
        Settings::default()
    };

    let mut cli_overrides = CliOverrides {
        size: args.size,
        rows: args.rows,
        cols: args.cols,
        directory: args.dir.clone(),
        rule_file: args.rules.clone(),
        state_file: args.state.clone(),
        steps,
        format: args.format,
    };
    for ignored in cli_overrides.absorb_positional(&args.inputs) {
        warn!("Ignoring unknown argument: {}", ignored);
    }
    settings.merge_with_cli(&cli_overrides);

    settings.validate().context("Configuration validation failed")?;
    Ok(settings)
}

fn run_command(args: SimulationArgs, steps: Option<usize>, show_evolution: bool) -> Result<()> {
    let settings = load_settings(&args, steps)?;
    let format = settings.output.format;
    let mut engine = Engine::bootstrap(&settings)?;

    let start_time = Instant::now();
    if show_evolution {
        println!("{}", GridFormatter::render(&engine, format)?);
        for _ in 0..settings.simulation.steps {
            engine.step();
            println!("{}", GridFormatter::render(&engine, format)?);
        }
    } else {
        engine.steps(settings.simulation.steps);
        println!("{}", GridFormatter::render(&engine, format)?);
    }

    info!(
        "{} generations in {:.3}s",
        settings.simulation.steps,
        start_time.elapsed().as_secs_f64()
    );
    Ok(())
}

fn interactive_command(args: SimulationArgs) -> Result<()> {
    let settings = load_settings(&args, None)?;
    let engine = Engine::bootstrap(&settings)?;
    let mut session = Session::new(engine, &settings);

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    session.run(stdin.lock(), &mut stdout)
}

fn inspect_command(file: PathBuf, config: PathBuf) -> Result<()> {
    let settings = Settings::load_or_default(&config)?;
    let table = RuleTable::load(&file, settings.palette.max_states())
        .with_context(|| format!("Invalid transition function file: {}", file.display()))?;

    println!("{}", ColorOutput::info(&format!("Transition function: {}", file.display())));
    println!("  States: {}", table.states());
    println!("  Neighbourhood: {} cells", table.neighborhood().size());
    println!("  Rules read: {}", table.rules_read());
    println!("  Distinct configurations: {}", table.len());

    Ok(())
}

fn catalog_command(dir: PathBuf) -> Result<()> {
    let catalog = RuleFileCatalog::discover(&dir, usize::MAX)?;

    if catalog.is_empty() {
        println!("{}", ColorOutput::warning(&format!("No .tab files in {}", dir.display())));
        return Ok(());
    }

    for (i, name) in catalog.files().iter().enumerate() {
        if i == catalog.index() {
            println!("{}", ColorOutput::success(&format!("* {}", name)));
        } else {
            println!("  {}", name);
        }
    }

    Ok(())
}

fn setup_command(directory: PathBuf, force: bool) -> Result<()> {
    println!("{}", ColorOutput::info("Setting up example files..."));

    let config_path = directory.join("config/default.yaml");
    if !config_path.exists() || force {
        Settings::default()
            .to_file(&config_path)
            .context("Failed to create default configuration")?;
        println!("Created: {}", config_path.display());
    } else {
        println!("Skipped: {} (already exists)", config_path.display());
    }

    create_example_files(&directory).context("Failed to create example files")?;
    println!("Created example .cas and .tab files in: {}", directory.display());

    println!("\n{}", ColorOutput::success("Setup complete!"));
    println!("\nNext steps:");
    println!("1. Run: tabular_ca run --dir {} -n 4", directory.display());
    println!("2. Or:  tabular_ca interactive --dir {}", directory.display());

    Ok(())
}
