use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use uql_config::ModelConfig;
use uql_core::{Document, FieldType, Model, SchemaLookup, Uql, Value};
use uql_mongo::MongoTranspiler;
use uql_postgres::PostgresTranspiler;

/// Backend a query is transpiled for.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Target {
    Postgres,
    Mongo,
}

/// Statement kind to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Operation {
    Select,
    Count,
    Insert,
    Update,
    Remove,
}

impl Operation {
    fn needs_query(self) -> bool {
        !matches!(self, Self::Insert)
    }

    fn needs_data(self) -> bool {
        matches!(self, Self::Insert | Self::Update)
    }
}

#[derive(Debug, Parser)]
#[command(name = "uql")]
#[command(about = "Transpile universal queries to SQL or document-store queries")]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Transpile a query read from a file or stdin.
    Transpile(TranspileArgs),
    /// Validate one or more model files.
    Validate(ValidateArgs),
    /// List the field types a model may declare.
    Types,
}

#[derive(Debug, Args)]
struct TranspileArgs {
    /// Model file (YAML or JSON).
    #[arg(long)]
    model: PathBuf,
    /// Backend to transpile for.
    #[arg(long, default_value = "postgres")]
    target: Target,
    /// Statement to produce.
    #[arg(long, default_value = "select")]
    op: Operation,
    /// Query JSON file (`{"where": ..., "order": ...}`). Read from stdin when omitted.
    #[arg(long)]
    query: Option<PathBuf>,
    /// Data JSON file for insert and update.
    #[arg(long)]
    data: Option<PathBuf>,
    /// Table to target instead of the first one in the model.
    #[arg(long)]
    table: Option<String>,
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Model files to check.
    #[arg(long = "model", required = true, num_args = 1..)]
    models: Vec<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Transpile(args) => run_transpile(args),
        Command::Validate(args) => run_validate(args),
        Command::Types => run_types(),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

/// Logs go to stderr so transpiled output on stdout stays clean.
fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_transpile(args: TranspileArgs) -> Result<(), String> {
    let config = ModelConfig::load(&args.model)
        .map_err(|err| format!("Failed to load model '{}': {err}", args.model.display()))?;
    let model = config
        .build()
        .map_err(|err| format!("Model '{}': {err}", args.model.display()))?;
    let model = match &args.table {
        Some(table) => model
            .targeting(table)
            .ok_or_else(|| format!("Model has no table '{table}'"))?,
        None => model,
    };

    let uql = if args.op.needs_query() {
        read_query(args.query.as_deref())?
    } else {
        Uql::new()
    };
    let data = if args.op.needs_data() {
        let path = args
            .data
            .as_deref()
            .ok_or("--data is required for insert and update")?;
        read_data(path)?
    } else {
        Document::new()
    };
    debug!(table = model.table_name(), op = ?args.op, "transpiling");

    match args.target {
        Target::Postgres => transpile_postgres(&config, &model, args.op, &uql, &data),
        Target::Mongo => transpile_mongo(&model, args.op, &uql, &data),
    }
}

fn transpile_postgres(
    config: &ModelConfig,
    model: &Model,
    op: Operation,
    uql: &Uql,
    data: &Document,
) -> Result<(), String> {
    let transpiler = PostgresTranspiler::new(model).with_unknown_fields(config.unknown_fields());
    let sql = match op {
        Operation::Select => transpiler.select(uql).map(Some),
        Operation::Count => transpiler.count(uql).map(Some),
        Operation::Insert => transpiler.insert(data),
        Operation::Update => transpiler.update(uql, data),
        Operation::Remove => transpiler.remove(uql).map(Some),
    }
    .map_err(|err| err.to_string())?;

    match sql {
        Some(sql) => println!("{sql}"),
        None => info!("no known fields in data, nothing to write"),
    }
    Ok(())
}

fn transpile_mongo(model: &Model, op: Operation, uql: &Uql, data: &Document) -> Result<(), String> {
    let transpiler = MongoTranspiler::new().with_primary_key(model.primary_key());
    let mongo_err = |err: uql_mongo::MongoError| err.to_string();
    match op {
        Operation::Select => print_json(&transpiler.select(uql).map_err(mongo_err)?),
        Operation::Count => print_json(&transpiler.count(uql).map_err(mongo_err)?),
        Operation::Insert => print_json(&transpiler.insert(data)),
        Operation::Update => print_json(&transpiler.update(uql, data).map_err(mongo_err)?),
        Operation::Remove => print_json(&transpiler.remove(uql).map_err(mongo_err)?),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let raw = serde_json::to_string_pretty(value)
        .map_err(|err| format!("Failed to serialize output: {err}"))?;
    println!("{raw}");
    Ok(())
}

fn read_query(path: Option<&Path>) -> Result<Uql, String> {
    let raw = match path {
        Some(path) => read_file(path)?,
        None => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .map_err(|err| format!("Failed to read query from stdin: {err}"))?;
            raw
        }
    };
    if raw.trim().is_empty() {
        return Ok(Uql::new());
    }
    serde_json::from_str(&raw).map_err(|err| format!("Invalid query JSON: {err}"))
}

fn read_data(path: &Path) -> Result<Document, String> {
    let raw = read_file(path)?;
    let value: Value =
        serde_json::from_str(&raw).map_err(|err| format!("Invalid data JSON: {err}"))?;
    value
        .into_document()
        .ok_or_else(|| format!("Data in '{}' must be a JSON object", path.display()))
}

fn read_file(path: &Path) -> Result<String, String> {
    fs::read_to_string(path).map_err(|err| format!("Failed to read '{}': {err}", path.display()))
}

fn run_validate(args: ValidateArgs) -> Result<(), String> {
    let mut invalid = 0usize;
    let mut tables = 0usize;

    for path in &args.models {
        let config = ModelConfig::load(path)
            .map_err(|err| format!("Failed to load model '{}': {err}", path.display()))?;
        let errors = config.validate();
        if errors.is_empty() {
            tables += config.tables.len();
            continue;
        }
        invalid += 1;
        for err in &errors {
            eprintln!("{}: {err}", path.display());
        }
    }

    if invalid > 0 {
        return Err(format!("{invalid} invalid model file(s)"));
    }
    println!(
        "Validated {} model file(s) with {tables} table(s).",
        args.models.len()
    );
    Ok(())
}

fn run_types() -> Result<(), String> {
    for ty in FieldType::ALL {
        println!("{ty}");
    }
    Ok(())
}
