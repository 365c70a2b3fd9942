//! Treemirror CLI entrypoint.
//!
//! This is the main entrypoint for the treemirror command-line tool.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use treemirror::cli::{Cli, Commands, OutputFormatter};
use treemirror::config::{
    find_config_file, ConfigParser, ConfigValidator, MirrorConfig, CONFIG_FILE_NAME,
};
use treemirror::error::{ConfigError, MirrorError, Result};
use treemirror::planner::{DeadlineGuard, DirectoryDiffer, SyncExecutor, SyncPlan};
use treemirror::store::{LocalPlanStore, PlanStore};

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Default plans directory name, relative to the configuration file.
const PLANS_DIR: &str = ".treemirror";

/// Main entrypoint.
fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    // Run async runtime
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initializes the logging system.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Main async entry point.
async fn run(cli: Cli) -> Result<ExitCode> {
    let formatter = OutputFormatter::new(cli.output);

    match cli.command {
        Commands::Init { path, force } => cmd_init(&path, force),
        Commands::Validate { warnings } => cmd_validate(cli.config.as_ref(), warnings),
        Commands::Plan {
            source,
            backup,
            detailed,
        } => cmd_plan(cli.config.as_ref(), source, backup, detailed, &formatter).await,
        Commands::Apply {
            plan,
            deadline_minutes,
        } => cmd_apply(cli.config.as_ref(), plan, deadline_minutes, &formatter).await,
        Commands::Sync {
            source,
            backup,
            deadline_minutes,
        } => cmd_sync(cli.config.as_ref(), source, backup, deadline_minutes, &formatter).await,
        Commands::Report { plan } => cmd_report(cli.config.as_ref(), plan, &formatter).await,
    }
}

/// Initialize a new project.
fn cmd_init(path: &PathBuf, force: bool) -> Result<ExitCode> {
    info!("Initializing new treemirror project in: {}", path.display());

    let config_path = path.join(CONFIG_FILE_NAME);
    let gitignore_path = path.join(".gitignore");

    // Check if files exist
    if !force && config_path.exists() {
        eprintln!("Configuration file already exists: {}", config_path.display());
        eprintln!("Use --force to overwrite.");
        return Ok(ExitCode::SUCCESS);
    }

    // Create directory if needed
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }

    // Write config template
    let config_template = include_str!("../templates/treemirror.yaml");
    std::fs::write(&config_path, config_template)?;
    eprintln!("Created: {}", config_path.display());

    // Write/update .gitignore so plan documents stay out of version control
    if gitignore_path.exists() {
        let existing = std::fs::read_to_string(&gitignore_path)?;
        if !existing.contains(PLANS_DIR) {
            let mut file = std::fs::OpenOptions::new()
                .append(true)
                .open(&gitignore_path)?;
            writeln!(file, "\n# Treemirror")?;
            writeln!(file, "{PLANS_DIR}/")?;
            eprintln!("Updated: {}", gitignore_path.display());
        }
    } else {
        std::fs::write(&gitignore_path, format!("{PLANS_DIR}/\n"))?;
        eprintln!("Created: {}", gitignore_path.display());
    }

    eprintln!("\nProject initialized successfully!");
    eprintln!("Next steps:");
    eprintln!("  1. Edit {CONFIG_FILE_NAME} with your source and backup roots");
    eprintln!("  2. Run 'treemirror validate' to check your configuration");
    eprintln!("  3. Run 'treemirror plan' to see what would change");
    eprintln!("  4. Run 'treemirror sync' to mirror the source onto the backup");

    Ok(ExitCode::SUCCESS)
}

/// Validate configuration.
fn cmd_validate(config_path: Option<&PathBuf>, show_warnings: bool) -> Result<ExitCode> {
    let config_file = resolve_config_path(config_path)?;
    info!("Validating configuration: {}", config_file.display());

    let parser = ConfigParser::new();
    let config = parser.load_with_env(&config_file)?;

    let validator = ConfigValidator::new();
    let result = validator.validate(&config);

    if result.is_valid() {
        eprintln!("Configuration is valid!");
        if show_warnings && !result.warnings.is_empty() {
            eprintln!("\nWarnings:");
            for warning in &result.warnings {
                eprintln!("  - {warning}");
            }
        }
    } else {
        eprintln!("Configuration is invalid:");
        for error in &result.errors {
            eprintln!("  - {error}");
        }
        return Ok(ExitCode::FAILURE);
    }

    // Show summary
    eprintln!("\nConfiguration summary:");
    eprintln!("  Source: {}", config.source_root.display());
    eprintln!("  Backup: {}", config.backup_root.display());
    eprintln!("  Deadline: {} minutes", config.sync.deadline_minutes);
    eprintln!("  Ignored names: {}", config.sync.ignore_names.join(", "));

    Ok(ExitCode::SUCCESS)
}

/// Compute and persist a sync plan.
async fn cmd_plan(
    config_path: Option<&PathBuf>,
    source: Option<PathBuf>,
    backup: Option<PathBuf>,
    detailed: bool,
    formatter: &OutputFormatter,
) -> Result<ExitCode> {
    let (config, plans_dir) = load_mirror_config(config_path, source, backup)?;

    let store = LocalPlanStore::new(&plans_dir);
    let mut plan = compute_plan(&config)?;
    store.write_plan(&mut plan).await?;

    let output = formatter.format_plan(&plan, detailed);
    eprintln!("{output}");
    eprintln!("Plan saved to: {}", store.plan_path().display());

    Ok(ExitCode::SUCCESS)
}

/// Execute a persisted sync plan.
async fn cmd_apply(
    config_path: Option<&PathBuf>,
    plan_file: Option<PathBuf>,
    deadline_minutes: Option<u64>,
    formatter: &OutputFormatter,
) -> Result<ExitCode> {
    let (config, plans_dir) = load_optional_config(config_path)?;

    let store = match plan_file {
        Some(path) => LocalPlanStore::with_plan_path(path),
        None => LocalPlanStore::open_latest(&plans_dir).await?,
    };

    let minutes = deadline_minutes
        .or_else(|| config.as_ref().map(|c| c.sync.deadline_minutes))
        .unwrap_or(60);
    let guard = deadline_guard(minutes);

    let executor = SyncExecutor::new(&store);
    let report = executor.execute(&guard).await?;

    let output = formatter.format_report(&report);
    eprintln!("{output}");

    Ok(if report.failed > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Compute, persist, and execute a plan in one run.
async fn cmd_sync(
    config_path: Option<&PathBuf>,
    source: Option<PathBuf>,
    backup: Option<PathBuf>,
    deadline_minutes: Option<u64>,
    formatter: &OutputFormatter,
) -> Result<ExitCode> {
    let (config, plans_dir) = load_mirror_config(config_path, source, backup)?;

    let store = LocalPlanStore::new(&plans_dir);
    let mut plan = compute_plan(&config)?;
    store.write_plan(&mut plan).await?;

    if plan.is_empty() {
        eprintln!("No changes to apply.");
        return Ok(ExitCode::SUCCESS);
    }

    let guard = deadline_guard(deadline_minutes.unwrap_or(config.sync.deadline_minutes));
    let executor = SyncExecutor::new(&store);
    let report = executor.execute(&guard).await?;

    let output = formatter.format_report(&report);
    eprintln!("{output}");

    Ok(if report.failed > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Show per-action outcomes of a persisted plan.
async fn cmd_report(
    config_path: Option<&PathBuf>,
    plan_file: Option<PathBuf>,
    formatter: &OutputFormatter,
) -> Result<ExitCode> {
    let (_config, plans_dir) = load_optional_config(config_path)?;

    let store = match plan_file {
        Some(path) => LocalPlanStore::with_plan_path(path),
        None => LocalPlanStore::open_latest(&plans_dir).await?,
    };

    let plan = store.read_plan().await?;
    let output = formatter.format_outcomes(&plan);
    eprintln!("{output}");

    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Resolves the configuration file path.
fn resolve_config_path(config_path: Option<&PathBuf>) -> Result<PathBuf> {
    config_path.map_or_else(|| find_config_file("."), |path| Ok(path.clone()))
}

/// Loads configuration for planning commands, applying CLI root overrides
/// and validating the result.
///
/// When no configuration file exists, both roots must be given on the
/// command line.
fn load_mirror_config(
    config_path: Option<&PathBuf>,
    source: Option<PathBuf>,
    backup: Option<PathBuf>,
) -> Result<(MirrorConfig, PathBuf)> {
    let (mut config, plans_dir) = match resolve_config_path(config_path) {
        Ok(config_file) => {
            debug!("Loading configuration from: {}", config_file.display());
            let parser = ConfigParser::new();
            let config = parser.load_with_env(&config_file)?;
            let plans_dir = plans_dir_for(&config, config_file.parent());
            (config, plans_dir)
        }
        Err(e) => match (&source, &backup) {
            (Some(s), Some(b)) => {
                let config = MirrorConfig::new(s.clone(), b.clone());
                let plans_dir = plans_dir_for(&config, None);
                (config, plans_dir)
            }
            _ => return Err(e),
        },
    };

    if let Some(s) = source {
        config.source_root = s;
    }
    if let Some(b) = backup {
        config.backup_root = b;
    }

    let validator = ConfigValidator::new();
    let result = validator.validate(&config);
    if !result.is_valid() {
        for error in &result.errors {
            eprintln!("  - {error}");
        }
        return Err(MirrorError::Config(ConfigError::validation_general(
            "configuration is invalid",
        )));
    }

    Ok((config, plans_dir))
}

/// Loads configuration if one can be found; execution-side commands can
/// run from a plan document alone.
fn load_optional_config(
    config_path: Option<&PathBuf>,
) -> Result<(Option<MirrorConfig>, PathBuf)> {
    match resolve_config_path(config_path) {
        Ok(config_file) => {
            let parser = ConfigParser::new();
            let config = parser.load_with_env(&config_file)?;
            let plans_dir = plans_dir_for(&config, config_file.parent());
            Ok((Some(config), plans_dir))
        }
        Err(_) => Ok((None, PathBuf::from(PLANS_DIR))),
    }
}

/// Resolves the plans directory for a configuration.
fn plans_dir_for(config: &MirrorConfig, config_parent: Option<&Path>) -> PathBuf {
    config.store.path.clone().unwrap_or_else(|| {
        config_parent
            .unwrap_or_else(|| Path::new("."))
            .join(PLANS_DIR)
    })
}

/// Computes the sync plan for a validated configuration.
fn compute_plan(config: &MirrorConfig) -> Result<SyncPlan> {
    // A missing backup root is valid configuration; create it so the
    // differ sees an empty tree.
    if !config.backup_root.exists() {
        info!("Creating backup root: {}", config.backup_root.display());
        std::fs::create_dir_all(&config.backup_root)?;
    }

    let differ = DirectoryDiffer::new().with_ignore_names(config.sync.ignore_names.clone());
    differ.compute_plan(&config.source_root, &config.backup_root)
}

/// Builds a deadline guard from a minutes budget, capped at one year so
/// the cutoff arithmetic cannot overflow.
fn deadline_guard(minutes: u64) -> DeadlineGuard {
    const ONE_YEAR_MINUTES: i64 = 60 * 24 * 365;
    let minutes = i64::try_from(minutes)
        .unwrap_or(ONE_YEAR_MINUTES)
        .min(ONE_YEAR_MINUTES);
    DeadlineGuard::after_minutes(minutes)
}
