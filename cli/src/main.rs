use std::fs;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use partial_copy_core::{SelectionMode, SelectionTree};
use partial_copy_model::{CopyEngine, EngineConfig, Instance, SchemaRegistry, SchemaSelector};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Output format for copied instances.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "partial-copy")]
#[command(about = "Schema-checked selections and partial copies of object graphs")]
struct Cli {
    /// Log selection decisions and builder events.
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate a schema bundle.
    Validate(ValidateArgs),
    /// List the classes of a schema bundle with their properties.
    Describe(DescribeArgs),
    /// Build a selection tree from dotted paths, checked against a class.
    Select(SelectArgs),
    /// Copy an instance document, optionally filtered by a selection.
    Copy(CopyArgs),
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Schema bundle (.json, .yaml or .yml).
    schema: PathBuf,
}

#[derive(Debug, Args)]
struct DescribeArgs {
    /// Schema bundle (.json, .yaml or .yml).
    schema: PathBuf,
    /// Only describe this class.
    #[arg(long)]
    class: Option<String>,
}

#[derive(Debug, Args)]
struct SelectArgs {
    /// Schema bundle (.json, .yaml or .yml).
    schema: PathBuf,
    /// Class the paths start from.
    #[arg(long)]
    class: String,
    /// Dotted property path; repeat for several.
    #[arg(long = "path", required = true)]
    paths: Vec<String>,
    /// Record exclude mode on the built tree.
    #[arg(long)]
    exclude: bool,
}

#[derive(Debug, Args)]
struct CopyArgs {
    /// Schema bundle (.json, .yaml or .yml).
    schema: PathBuf,
    /// Instance document to copy.
    #[arg(long)]
    input: PathBuf,
    /// Comma-separated paths to copy; everything else is left out.
    #[arg(long, conflicts_with_all = ["except", "preset"])]
    only: Option<String>,
    /// Comma-separated paths to leave out.
    #[arg(long, conflicts_with = "preset")]
    except: Option<String>,
    /// Named selection from the engine configuration.
    #[arg(long, requires = "config")]
    preset: Option<String>,
    /// Engine configuration (YAML).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Skip unknown properties in selections instead of failing.
    #[arg(long)]
    lenient: bool,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,
    /// Write the copy here instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Validate(args) => run_validate(args),
        Command::Describe(args) => run_describe(args),
        Command::Select(args) => run_select(args),
        Command::Copy(args) => run_copy(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_registry(path: &Path) -> Result<SchemaRegistry, String> {
    SchemaRegistry::load(path)
        .map_err(|err| format!("Failed to load schema '{}': {err}", path.display()))
}

fn run_validate(args: ValidateArgs) -> Result<(), String> {
    let registry = load_registry(&args.schema)?;
    println!(
        "Validated {} class(es), bundle version {}.",
        registry.len(),
        registry.version()
    );
    Ok(())
}

fn run_describe(args: DescribeArgs) -> Result<(), String> {
    let registry = load_registry(&args.schema)?;
    let classes: Vec<&str> = match &args.class {
        Some(class) => vec![class.as_str()],
        None => registry.class_names().collect(),
    };

    for name in classes {
        let class = registry.require(name).map_err(|e| e.to_string())?;
        let mut header = class.name.clone();
        if let Some(superclass) = &class.superclass {
            header.push_str(&format!(" : {superclass}"));
        }
        if !class.partial_copy {
            header.push_str(" (full copy only)");
        }
        println!("{header}");
        for property in registry.all_properties(name).map_err(|e| e.to_string())? {
            let many = if property.collection { "[]" } else { "" };
            let inherited = if class.declares(&property.name) {
                ""
            } else {
                " (inherited)"
            };
            println!(
                "  {}: {}{many}{inherited}",
                property.name, property.element_type
            );
        }
    }
    Ok(())
}

fn run_select(args: SelectArgs) -> Result<(), String> {
    let registry = load_registry(&args.schema)?;
    let mode = if args.exclude {
        SelectionMode::Exclude
    } else {
        SelectionMode::Include
    };
    let root =
        SchemaSelector::root_with_mode(&registry, &args.class, mode).map_err(|e| e.to_string())?;
    for path in &args.paths {
        root.path(path)
            .map_err(|err| format!("Invalid path '{path}': {err}"))?;
    }

    let tree = root.build();
    println!("{mode} {tree}");
    for path in tree.paths() {
        println!("  {path}");
    }
    Ok(())
}

fn run_copy(args: CopyArgs) -> Result<(), String> {
    let registry = load_registry(&args.schema)?;
    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path)
            .map_err(|err| format!("Failed to load config '{}': {err}", path.display()))?,
        None => EngineConfig::default(),
    };
    if args.lenient {
        config.strict_selection = false;
    }
    let engine = CopyEngine::from_config(&registry, &config);
    let instance = load_instance(&args.input)?;

    let copy = match (&args.only, &args.except, &args.preset) {
        (Some(paths), _, _) => engine.copy_only(&instance, &split_paths(paths, SelectionMode::Include)),
        (None, Some(paths), _) => {
            engine.copy_except(&instance, &split_paths(paths, SelectionMode::Exclude))
        }
        (None, None, Some(preset)) => engine.copy_preset(&instance, preset),
        (None, None, None) => engine.create_copy(&instance),
    }
    .map_err(|e| e.to_string())?;
    info!(class = copy.class(), fields = copy.field_names().count(), "copy finished");

    let raw = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&copy).map_err(|e| e.to_string())?,
        OutputFormat::Yaml => serde_yaml::to_string(&copy).map_err(|e| e.to_string())?,
    };
    match &args.output {
        Some(path) => fs::write(path, raw)
            .map_err(|err| format!("Failed to write '{}': {err}", path.display()))?,
        None => println!("{raw}"),
    }
    Ok(())
}

fn split_paths(raw: &str, mode: SelectionMode) -> SelectionTree {
    SelectionTree::from_paths(mode, raw.split(',').filter(|p| !p.trim().is_empty()))
}

fn load_instance(path: &Path) -> Result<Instance, String> {
    let file = fs::File::open(path)
        .map_err(|err| format!("Failed to read '{}': {err}", path.display()))?;
    let reader = BufReader::new(file);
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml" | "yml") => serde_yaml::from_reader(reader).map_err(|e| e.to_string()),
        _ => serde_json::from_reader(reader).map_err(|e| e.to_string()),
    }
}
