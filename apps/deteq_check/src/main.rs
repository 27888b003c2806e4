use clap::Parser;
use tracing::{Level, debug, error, info, warn};

use deteq_log::{LogConfig, init_logging, parse_level};
use deteq_schema::{DefinitionPack, Validatable};

mod config;
mod dry_run;

const VERSION: &str = "0.1.0";

/// Detection Equipment definition checker
#[derive(Parser, Debug)]
#[command(name = "deteq_check")]
#[command(version = VERSION)]
#[command(about = "Verify a Detection Equipment definition pack and dry-run its registration", long_about = None)]
struct Args {
    /// Definition pack to check (JSON); the bundled definitions when omitted
    #[arg(short, long, env = "DETEQ_PACK")]
    pack: Option<String>,

    /// Item catalog used to resolve magazine items (JSON)
    #[arg(short, long, env = "DETEQ_ITEMS")]
    items: Option<String>,

    /// Name the definitions are registered under
    #[arg(long, default_value = "deteq_check")]
    mod_name: String,

    /// Print the definition pack JSON Schema and exit
    #[arg(long)]
    schema: bool,

    /// Exit with an error if any definition is invalid
    #[arg(long)]
    strict: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Also write logs to this file
    #[arg(long, env = "DETEQ_LOG_FILE")]
    log_file: Option<String>,
}

fn main() {
    let args = Args::parse();

    if args.schema {
        match DefinitionPack::schema_json() {
            Ok(schema) => println!("{}", schema),
            Err(e) => {
                eprintln!("Failed to generate schema: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    let log_level = parse_level(&args.log_level).unwrap_or_else(|| {
        eprintln!("Warning: Invalid log level '{}', using INFO", args.log_level);
        Level::INFO
    });

    let mut log_config = LogConfig::new("deteq_check").with_level(log_level);
    if let Some(path) = &args.log_file {
        log_config = log_config.with_log_file(path);
    }

    if let Err(e) = init_logging(log_config) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    info!("Detection Equipment definition checker v{}", VERSION);
    debug!("Settings:");
    debug!("  Pack: {}", args.pack.as_deref().unwrap_or("<bundled>"));
    debug!("  Items: {}", args.items.as_deref().unwrap_or("<none>"));
    debug!("  Mod name: {}", args.mod_name);

    let mut pack = match config::load_pack(args.pack.as_deref()) {
        Ok(pack) => pack,
        Err(e) => {
            error!("Failed to load pack: {}", e);
            std::process::exit(1);
        }
    };

    let catalog = match config::load_catalog(args.items.as_deref()) {
        Ok(catalog) => catalog,
        Err(e) => {
            error!("Failed to load item catalog: {}", e);
            std::process::exit(1);
        }
    };

    let total = pack.len();
    let findings = pack.retain_valid(catalog.as_ref());
    let mut invalid = 0;
    for finding in &findings {
        if finding.verification.is_valid {
            info!("{} \"{}\" [{}]: valid", finding.kind, finding.name, finding.id);
        } else {
            invalid += 1;
            warn!("{} \"{}\" [{}]: invalid", finding.kind, finding.name, finding.id);
        }
        for line in finding.verification.lines() {
            info!("    {}", line);
        }
    }
    info!(
        "Verified {} definitions: {} valid, {} invalid (load priority {})",
        total,
        total - invalid,
        invalid,
        pack.load_priority
    );

    match dry_run::run(&args.mod_name, pack, catalog) {
        Ok(report) => {
            for (kind, count) in &report.stored {
                info!("Registered {} {}", count, kind);
            }
            if report.summary.is_none() {
                warn!("Definition API never became ready");
            }
        }
        Err(e) => {
            error!("Dry run failed: {}", e);
            std::process::exit(1);
        }
    }

    if args.strict && invalid > 0 {
        error!("{} invalid definitions", invalid);
        std::process::exit(1);
    }
}
