//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use staffdesk_core::app::AppContext;
use staffdesk_core::config::{self, Config};
use staffdesk_core::logging;

mod commands;

#[derive(Parser)]
#[command(name = "staffdesk")]
#[command(version)]
#[command(about = "Command-line client for the staffdesk HR admin backend")]
struct Cli {
    /// Override the API base URL for this invocation
    #[arg(long, global = true, env = "STAFFDESK_API_URL", value_name = "URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Log in and store the session tokens
    Login {
        #[arg(long)]
        email: String,

        #[arg(long, env = "STAFFDESK_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the stored session
    Logout,

    /// Show the logged-in account
    Whoami,

    /// Manage companies
    Companies {
        #[command(subcommand)]
        command: EntityCommands,
    },

    /// Manage departments
    Departments {
        #[command(subcommand)]
        command: EntityCommands,
    },

    /// Manage employees
    Employees {
        #[command(subcommand)]
        command: EntityCommands,
    },

    /// List employee status values
    StatusChoices,

    /// Show dashboard statistics
    Dashboard,

    /// Show or toggle the color theme preference
    Theme {
        #[command(subcommand)]
        command: ThemeCommands,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
pub(crate) enum EntityCommands {
    /// List one page
    List {
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// List every record (unpaged)
    All,
    /// Show one record
    Show { id: i64 },
    /// Create a record from a JSON draft
    Add {
        #[arg(long, value_name = "JSON")]
        json: String,
    },
    /// Update a record; the JSON is merged over the current values
    Update {
        id: i64,
        #[arg(long, value_name = "JSON")]
        json: String,
    },
    /// Delete a record
    Delete { id: i64 },
}

#[derive(clap::Subcommand)]
enum ThemeCommands {
    /// Print the current theme
    Show,
    /// Switch between dark and light
    Toggle,
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Print the config file path
    Path,
    /// Create a default config file
    Init,
    /// Save the API base URL to the config file
    SetUrl { url: String },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let mut config = Config::load().context("load config")?;
    if let Some(url) = cli.api_url.as_deref() {
        config.api_base_url = url.to_string();
    }

    let _log_guard = logging::init(&config::paths::logs_dir(), config.log_filter.as_deref())
        .context("init logging")?;

    let connect = |config: Config| -> Result<AppContext> {
        AppContext::init(config, &config::paths::staffdesk_home()).context("init client")
    };

    match cli.command {
        Commands::Login { email, password } => {
            commands::auth::login(&connect(config)?, &email, &password).await
        }
        Commands::Logout => commands::auth::logout(&connect(config)?),
        Commands::Whoami => commands::auth::whoami(&connect(config)?).await,

        Commands::Companies { command } => {
            let app = connect(config)?;
            commands::entities::run(&app, app.company_list(), command).await
        }
        Commands::Departments { command } => {
            let app = connect(config)?;
            commands::entities::run(&app, app.department_list(), command).await
        }
        Commands::Employees { command } => {
            let app = connect(config)?;
            commands::entities::run(&app, app.employee_list(), command).await
        }

        Commands::StatusChoices => commands::reference::status_choices(&connect(config)?).await,
        Commands::Dashboard => commands::reference::dashboard(&connect(config)?).await,

        Commands::Theme { command } => match command {
            ThemeCommands::Show => commands::theme::show(&connect(config)?),
            ThemeCommands::Toggle => commands::theme::toggle(&connect(config)?),
        },

        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
            ConfigCommands::SetUrl { url } => commands::config::set_url(&url),
        },
    }
}
