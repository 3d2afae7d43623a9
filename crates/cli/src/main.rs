mod activate_commands;
mod check_commands;
mod sources_commands;

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    process::ExitCode,
};

use {
    clap::{Parser, Subcommand, error::ErrorKind},
    skillcue_config::SkillcueConfig,
    tracing::{error, warn},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

/// Set by the host assistant to the root of the session's project.
const PROJECT_DIR_ENV: &str = "CLAUDE_PROJECT_DIR";

const CONFIG_ENV: &str = "SKILLCUE_CONFIG";

/// Subcommands that are run by hand rather than by the host.
const TOOL_COMMANDS: &[&str] = &["check", "sources"];

#[derive(Parser)]
#[command(name = "skillcue", about = "skillcue — prompt-driven skill activation", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error). Logs go to stderr.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file (overrides discovery of skillcue.{toml,yaml,json}).
    #[arg(long, global = true, env = "SKILLCUE_CONFIG")]
    config: Option<PathBuf>,

    /// Project directory (overrides the payload's cwd and $CLAUDE_PROJECT_DIR).
    #[arg(long, global = true)]
    project_dir: Option<PathBuf>,
}

impl Cli {
    /// The plain hook invocation, used when the host passes arguments this
    /// binary does not understand.
    fn hook_default() -> Self {
        Self {
            command: None,
            log_level: "warn".into(),
            json_logs: false,
            config: std::env::var_os(CONFIG_ENV).map(PathBuf::from),
            project_dir: None,
        }
    }
}

/// Parse arguments. On the hook path a usage error falls back to the plain
/// hook invocation and is returned alongside it; `check`, `sources`, help and
/// version keep clap's behavior.
fn parse_cli<I, T>(args: I) -> Result<(Cli, Option<clap::Error>), clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    match Cli::try_parse_from(args.clone()) {
        Ok(cli) => Ok((cli, None)),
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => Err(e),
        Err(e)
            if args
                .iter()
                .skip(1)
                .any(|a| a.to_str().is_some_and(|a| TOOL_COMMANDS.contains(&a))) =>
        {
            Err(e)
        },
        Err(e) => Ok((Cli::hook_default(), Some(e))),
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Read a hook payload from stdin and print matching skills (default).
    Activate {
        /// Use this prompt instead of reading a payload from stdin.
        #[arg(long)]
        prompt: Option<String>,
    },
    /// Validate the rule document.
    Check {
        /// Rule file to check instead of the first one found.
        #[arg(long)]
        rules: Option<PathBuf>,
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// List discovered skill content files.
    Sources {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

/// Load config from `--config` or the standard locations, then apply env
/// overrides.
fn load_config(path: Option<&Path>) -> anyhow::Result<SkillcueConfig> {
    let config = match path {
        Some(path) => skillcue_config::load_config(path)?,
        None => skillcue_config::discover_and_load(),
    };
    Ok(skillcue_config::apply_env_overrides(config))
}

/// Resolve the project directory: explicit flag, then the payload's `cwd`,
/// then `$CLAUDE_PROJECT_DIR`, then the process working directory.
fn project_dir(flag: Option<PathBuf>, payload_cwd: Option<&Path>) -> PathBuf {
    flag.or_else(|| payload_cwd.map(Path::to_path_buf))
        .or_else(|| std::env::var_os(PROJECT_DIR_ENV).map(PathBuf::from))
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

async fn run(cli: Cli) -> ExitCode {
    match cli.command {
        None => {
            activate_commands::handle_activate(cli.config.as_deref(), cli.project_dir, None).await
        },
        Some(Commands::Activate { prompt }) => {
            activate_commands::handle_activate(cli.config.as_deref(), cli.project_dir, prompt)
                .await
        },
        Some(Commands::Check { rules, json }) => {
            let result = load_config(cli.config.as_deref()).and_then(|config| {
                check_commands::handle_check(&config, cli.project_dir, rules, json)
            });
            result.unwrap_or_else(|e| {
                eprintln!("skillcue: {e:#}");
                ExitCode::FAILURE
            })
        },
        Some(Commands::Sources { json }) => {
            let config = match load_config(cli.config.as_deref()) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("skillcue: {e:#}");
                    return ExitCode::FAILURE;
                },
            };
            match sources_commands::handle_sources(&config, cli.project_dir, json).await {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    eprintln!("skillcue: {e:#}");
                    ExitCode::FAILURE
                },
            }
        },
    }
}

fn main() -> ExitCode {
    let (cli, ignored) = match parse_cli(std::env::args_os()) {
        Ok(parsed) => parsed,
        Err(e) => e.exit(),
    };
    init_telemetry(&cli);
    if let Some(e) = ignored {
        warn!(kind = ?e.kind(), "ignoring unrecognised arguments, running the hook");
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "failed to start async runtime");
            // Never fail the host's hook over our own startup.
            return if cli.command.is_none() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            };
        },
    };

    let code = runtime.block_on(run(cli));
    // A stdin read abandoned at its timeout still holds a blocking thread;
    // don't wait for it on the way out.
    runtime.shutdown_background();
    code
}
