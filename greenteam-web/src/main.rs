//! Green Team CLI - coordinator and specialists for urban sustainability questions.

#![allow(clippy::print_stdout)] // CLI program intentionally uses stdout

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use greenteam::prelude::*;
use greenteam_web::config::{
    self, API_KEY_ENV, AppConfig, CONFIG_ENV, ConfigError, IssueLevel, MODEL_ENV,
};
use greenteam_web::server::agent_summaries;
use greenteam_web::{AppError, AppResult, AppState};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Green Team - a coordinator and four specialists for green tech questions
#[derive(Parser)]
#[command(name = "greenteam")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file path
    #[arg(short, long, env = "GREENTEAM_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the web form
    Serve(ServeArgs),

    /// Run one prompt from the terminal
    Ask(AskArgs),

    /// List the team
    Agents(AgentsArgs),

    /// Show configuration and environment status
    Status,

    /// Manage configuration
    Config(ConfigArgs),
}

/// Arguments for the serve command
#[derive(Args)]
struct ServeArgs {
    /// Listen address (overrides config)
    #[arg(short, long)]
    bind: Option<SocketAddr>,

    /// Model to use (overrides config)
    #[arg(short, long)]
    model: Option<String>,
}

/// Arguments for the ask command
#[derive(Args)]
struct AskArgs {
    /// Prompt text. Defaults to the route's pre-filled prompt.
    prompt: Option<String>,

    /// Ask one specialist by display name instead of the coordinator
    #[arg(short, long)]
    specialist: Option<String>,

    /// City to focus on
    #[arg(long, default_value = "")]
    city: String,

    /// Lookback window in months
    #[arg(long, default_value_t = greenteam::prompt::DEFAULT_MONTHS,
          value_parser = clap::value_parser!(u8).range(1..=12))]
    months: u8,

    /// CSV file to attach
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Model to use (overrides config)
    #[arg(short, long)]
    model: Option<String>,

    /// Print the reply as JSON
    #[arg(long)]
    json: bool,
}

/// Arguments for the agents command
#[derive(Args)]
struct AgentsArgs {
    /// Print as JSON
    #[arg(long)]
    json: bool,
}

/// Arguments for the config command
#[derive(Args)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Show configuration file path
    Path,
    /// Create a default configuration file
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
    /// Validate configuration
    Validate,
}

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("failed to create tokio runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match rt.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Initialize logging with the given verbosity level.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "greenteam={level},greenteam_web={level},tower_http={level},{}",
            if verbosity >= 2 { "debug" } else { "warn" }
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbosity >= 2)
        .init();
}

/// Main async entry point.
async fn run(cli: Cli) -> AppResult<()> {
    let config_file = cli.config.unwrap_or_else(config::config_path);

    match cli.command {
        Commands::Serve(args) => cmd_serve(args, &config_file).await,
        Commands::Ask(args) => cmd_ask(args, &config_file).await,
        Commands::Agents(args) => cmd_agents(&args, &config_file).await,
        Commands::Status => cmd_status(&config_file).await,
        Commands::Config(args) => cmd_config(args, &config_file).await,
    }
}

/// Load the file (or defaults) and merge the environment.
async fn load(config_file: &Path) -> AppResult<AppConfig> {
    Ok(config::load_config_from(config_file).await?.with_env())
}

/// Serve the web form.
async fn cmd_serve(args: ServeArgs, config_file: &Path) -> AppResult<()> {
    let mut config = load(config_file).await?;
    if let Some(model) = args.model {
        config.agents.model = model;
    }

    let mut errors = 0;
    for issue in config.validate() {
        match issue.level {
            IssueLevel::Error => {
                errors += 1;
                tracing::error!("{issue}");
            }
            IssueLevel::Warning => tracing::warn!("{issue}"),
        }
    }
    if errors > 0 {
        return Err(ConfigError::InvalidValue(format!(
            "{errors} error(s) in {}",
            config_file.display()
        ))
        .into());
    }

    let addr = match args.bind {
        Some(addr) => addr,
        None => config.bind_addr()?,
    };

    let state = AppState::from_settings(&config.dispatch_settings());
    println!("Green Team on http://{addr} (Ctrl+C to stop)");
    greenteam_web::serve(Arc::new(state), addr).await
}

/// Run one prompt through the same dispatch path as the form.
async fn cmd_ask(args: AskArgs, config_file: &Path) -> AppResult<()> {
    let mut config = load(config_file).await?;
    if let Some(model) = args.model {
        config.agents.model = model;
    }

    let route = match args.specialist.as_deref() {
        Some(name) => Route::Specialist(name.parse()?),
        None => Route::Coordinator,
    };
    let prompt = args
        .prompt
        .unwrap_or_else(|| default_prompt(&route).to_owned());

    let mut form = RequestForm::new(route, prompt)
        .city(args.city)
        .months(args.months);
    if let Some(path) = args.csv {
        let bytes = tokio::fs::read(&path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        form = form.upload(Upload::new(file_name, bytes));
    }

    let dispatcher = Dispatcher::connect(&config.dispatch_settings())?;
    let outcome = dispatcher.dispatch(form).await?;
    let reply = &outcome.reply;

    if args.json {
        println!("{}", serde_json::to_string_pretty(reply).map_err(greenteam::Error::from)?);
        return Ok(());
    }

    println!("{}", reply.display_text());
    if reply.show_tool_calls && !reply.tool_calls.is_empty() {
        println!();
        println!("Delegations:");
        for record in &reply.tool_calls {
            let task = record
                .arguments
                .get("task")
                .and_then(serde_json::Value::as_str)
                .unwrap_or_default();
            let status = if record.success { "ok" } else { "failed" };
            println!("  {} [{status}] {task}", record.name);
        }
    }
    println!();
    println!("[{} | {} tokens]", reply.agent_name, reply.usage.total_tokens);

    Ok(())
}

/// List the team.
async fn cmd_agents(args: &AgentsArgs, config_file: &Path) -> AppResult<()> {
    let config = load(config_file).await?;
    let summaries = agent_summaries(&AgentRegistry::unconnected(&config.agents.model));

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summaries).map_err(greenteam::Error::from)?
        );
        return Ok(());
    }

    for agent in summaries {
        println!("{}", agent.name);
        println!("  Role:  {}", agent.role);
        println!("  Model: {}", agent.model);
        if !agent.tools.is_empty() {
            let tools: Vec<&str> = agent.tools.iter().map(ToolKind::label).collect();
            println!("  Tools: {}", tools.join(", "));
        }
        if !agent.members.is_empty() {
            println!("  Team:  {}", agent.members.join(", "));
        }
        println!();
    }

    Ok(())
}

/// Show status.
async fn cmd_status(config_file: &Path) -> AppResult<()> {
    println!("Green Team Status\n");

    println!("Configuration:");
    println!("  Path:   {}", config_file.display());
    println!(
        "  Exists: {}",
        if config_file.exists() { "yes" } else { "no" }
    );

    match load(config_file).await {
        Ok(config) => {
            let valid = if config.is_valid() { "yes" } else { "no" };
            println!("  Valid:  {valid}");
            println!();
            println!("Agents:");
            println!("  Model:     {}", config.agents.model);
            println!("  Max steps: {}", config.agents.max_steps);
            println!("  Timeout:   {}s", config.agents.timeout_secs);
            println!(
                "  API key:   {}",
                if config.api_key().is_some() { "configured" } else { "missing" }
            );
            println!();
            println!("Server:");
            println!("  Bind: {}", config.server.bind);
            println!();
            println!("Uploads:");
            println!("  Dir:    {}", config.uploads.dir.display());
            println!(
                "  Naming: {}",
                config.uploads.file_name.as_deref().unwrap_or("unique per upload")
            );
        }
        Err(e) => println!("  Valid:  no ({e})"),
    }

    println!();
    println!("Environment:");
    print_env_status(API_KEY_ENV);
    print_env_status(MODEL_ENV);
    print_env_status(CONFIG_ENV);
    print_env_status("RUST_LOG");

    Ok(())
}

fn print_env_status(name: &str) {
    let state = if std::env::var(name).is_ok_and(|v| !v.is_empty()) {
        "set"
    } else {
        "not set"
    };
    println!("  {name:<18} {state}");
}

/// Configuration management.
async fn cmd_config(args: ConfigArgs, config_file: &Path) -> AppResult<()> {
    match args.command {
        ConfigCommands::Path => {
            println!("{}", config_file.display());
        }
        ConfigCommands::Show => {
            let config = load(config_file).await?.redacted();
            let content = toml::to_string_pretty(&config).map_err(ConfigError::from)?;
            println!("# {} (with environment applied)", config_file.display());
            println!("{content}");
        }
        ConfigCommands::Init { force } => {
            if config::init_config_at(config_file, force).await? {
                println!("Configuration created: {}", config_file.display());
                println!();
                println!("Next steps:");
                println!("  1. export {API_KEY_ENV}=<key>  (or put it in .env)");
                println!("  2. greenteam serve");
            } else {
                println!("Configuration already exists at: {}", config_file.display());
                println!("Use --force to overwrite.");
            }
        }
        ConfigCommands::Validate => {
            let config = load(config_file).await?;
            let issues = config.validate();
            if issues.is_empty() {
                println!("Configuration is valid");
            }
            for issue in &issues {
                println!("{issue}");
            }
            if !config.is_valid() {
                return Err(AppError::Config(ConfigError::InvalidValue(format!(
                    "{} is invalid",
                    config_file.display()
                ))));
            }
        }
    }

    Ok(())
}
