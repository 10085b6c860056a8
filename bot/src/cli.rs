use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

use crate::admin::{self, Admin, Format};
use crate::config::Config;

const CONFIG_DIR: &str = "RatBot";
const CONFIG: &str = "config.yml";
const DATABASE: &str = "ratbot.sql";
const LOG: &str = "ratbot.log";

argwerk::define! {
    /// RatBot administration
    ///
    /// Inspects and changes guild prefixes and quorum rules in the bot's
    /// database. Run with `--help` for a list of commands.
    #[usage = "ratbot [options] <command> [args...]"]
    struct Args {
        help: bool,
        trace: bool,
        json: bool,
        root: Option<PathBuf>,
        config: Option<PathBuf>,
        database: Option<PathBuf>,
        log: Vec<String>,
        command: Vec<String>,
    }
    /// Show this help.
    ["--help" | "-h"] => {
        println!("{}", HELP);
        println!("{}", admin::USAGE);
        help = true;
    }
    /// If we should enable tracing in all logs.
    ["--trace"] => {
        trace = true;
    }
    /// Output results as JSON.
    ["--json"] => {
        json = true;
    }
    /// Configuration directory to use.
    ["--root", #[os] path] => {
        root = Some(PathBuf::from(path));
    }
    /// Configuration file to use.
    ["--config", #[os] path] => {
        config = Some(PathBuf::from(path));
    }
    /// Database to use, instead of the one in the configuration.
    ["--database", #[os] path] => {
        database = Some(PathBuf::from(path));
    }
    /// Additionally enable logging for the specified modules. Example: --log ratbot_db=trace
    ["--log", spec] => {
        log.push(spec);
    }
    /// The command to run, followed by its arguments.
    [#[rest] args] => {
        command = args;
    }
}

/// Configure logging.
///
/// Logs go to a daily rotated file in the root directory and to stderr,
/// leaving stdout to command output.
fn setup_logs(root: &Path, trace: bool, modules: &[String]) -> Result<impl Drop> {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{fmt, EnvFilter, Registry};

    // Crates to enable logging for, by default.
    const CRATES: [&str; 4] = ["ratbot", "ratbot_common", "ratbot_db", "panic"];

    let mut env_filter = EnvFilter::from_default_env();

    let level = if trace { "trace" } else { "info" };

    for name in CRATES {
        env_filter = env_filter.add_directive(format!("{name}={level}").parse()?);
    }

    for module in modules {
        env_filter = env_filter.add_directive(module.parse()?);
    }

    let file_appender = tracing_appender::rolling::daily(root, LOG);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let subscriber = Registry::default()
        .with(env_filter)
        .with(
            fmt::Layer::default()
                .with_writer(non_blocking)
                .with_ansi(false),
        )
        .with(fmt::Layer::default().with_writer(std::io::stderr));

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(guard)
}

/// Entrypoint.
pub fn main() -> Result<()> {
    let args = Args::args()?;

    if args.help {
        return Ok(());
    }

    let root = match &args.root {
        Some(root) => root.clone(),
        None => dirs::config_dir()
            .ok_or_else(|| anyhow!("no standard configuration directory available"))?
            .join(CONFIG_DIR),
    };

    if !root.is_dir() {
        std::fs::create_dir_all(&root)
            .with_context(|| anyhow!("failed to create root: {}", root.display()))?;
    }

    let _guard = setup_logs(&root, args.trace, &args.log).context("failed to setup logs")?;

    crate::panic_logger::panic_logger();

    let config_path = match &args.config {
        Some(config) => config.clone(),
        None => root.join(CONFIG),
    };

    let config = Config::load(&config_path)?;

    let database_path = match &args.database {
        Some(database) => database.clone(),
        None => config.database_path(&root, DATABASE),
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(try_main(&args, &config, &database_path))
}

async fn try_main(args: &Args, config: &Config, database_path: &Path) -> Result<()> {
    tracing::info!("Starting RatBot {}", crate::VERSION);

    if args.command.is_empty() {
        println!("{}", admin::USAGE);
        return Ok(());
    }

    let db = db::Database::open(database_path)
        .with_context(|| anyhow!("failed to open database: {}", database_path.display()))?;

    let prefixes = db::Prefixes::new(db.clone(), config.prefix.clone());

    if !config.warm.is_empty() {
        prefixes.warm(config.warm.iter().copied()).await;
    }

    let quorum_scopes = db::QuorumScopes::new(db);
    let admin = Admin::new(prefixes, quorum_scopes);

    let format = if args.json { Format::Json } else { Format::Text };
    let output = admin.run(&args.command, format).await?;

    if !output.is_empty() {
        println!("{}", output);
    }

    Ok(())
}
