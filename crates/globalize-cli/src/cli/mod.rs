//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use globalize_core::config;
use globalize_core::logging;

mod commands;

#[derive(Parser)]
#[command(name = "globalize")]
#[command(version)]
#[command(about = "Explore, filter and bookmark countries")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// List countries matching the saved search and region filter
    Countries {
        /// Search by country name (saved for next time; pass "" to clear)
        #[arg(short, long)]
        search: Option<String>,

        /// Filter by region: All, Africa, Americas, Asia, Europe, Oceania, Antarctic
        #[arg(short, long)]
        region: Option<String>,

        /// Page to show (20 countries per page)
        #[arg(short, long, default_value_t = 1)]
        page: usize,

        /// Reset search and region before listing
        #[arg(long, conflicts_with_all = ["search", "region"])]
        clear: bool,

        /// Print the page as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show details, photos and favorite status for a country
    Show {
        /// Three-letter country code (e.g. FRA)
        #[arg(value_name = "CODE")]
        code: String,
    },

    /// List the featured popular countries
    Popular {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Suggest countries whose name starts with a prefix
    Suggest {
        #[arg(value_name = "PREFIX")]
        prefix: String,
    },

    /// Convert an amount of a country's currency
    Convert {
        /// Three-letter country code (e.g. JPN)
        #[arg(value_name = "CODE")]
        code: String,

        /// Amount in the country's currency
        #[arg(short, long, default_value_t = 1.0)]
        amount: f64,

        /// Target currency code
        #[arg(short, long, default_value = "USD")]
        to: String,
    },

    /// Manage favorite countries
    Favorites {
        #[command(subcommand)]
        command: FavoritesCommands,
    },

    /// Log in to your account
    Login {
        #[arg(short, long)]
        email: String,

        /// Password (prompted on stdin when omitted)
        #[arg(long, env = "GLOBALIZE_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Create an account
    Register {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: String,

        /// Password (prompted on stdin when omitted)
        #[arg(long, env = "GLOBALIZE_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        /// Ask the server for a long-lived session
        #[arg(long)]
        remember_me: bool,
    },

    /// Log out and forget the cached session
    Logout,

    /// Show who is logged in
    Whoami,

    /// Show or update your profile
    Profile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        country: Option<String>,
    },

    /// Show or change the color theme (light, dark, toggle)
    Theme {
        #[arg(value_name = "THEME")]
        value: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum FavoritesCommands {
    /// List saved favorites (requires login)
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add or remove a country (requires login)
    Toggle {
        #[arg(value_name = "CODE")]
        code: String,
    },
    /// Check whether a country is a favorite
    Check {
        #[arg(value_name = "CODE")]
        code: String,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
    /// Save the Unsplash access key used for country photos
    SetPhotoKey {
        #[arg(value_name = "KEY")]
        key: String,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    logging::init();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    // config commands must work even when the file is broken
    if let Commands::Config { command } = &cli.command {
        return match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
            ConfigCommands::SetPhotoKey { key } => commands::config::set_photo_key(key),
        };
    }

    let config = config::Config::load().context("load config")?;

    match cli.command {
        Commands::Countries {
            search,
            region,
            page,
            clear,
            json,
        } => {
            commands::countries::list(
                &config,
                commands::countries::ListOptions {
                    search: search.as_deref(),
                    region: region.as_deref(),
                    page,
                    clear,
                    json,
                },
            )
            .await
        }
        Commands::Show { code } => commands::countries::show(&config, &code).await,
        Commands::Popular { json } => commands::countries::popular(&config, json).await,
        Commands::Suggest { prefix } => commands::countries::suggest(&config, &prefix).await,
        Commands::Convert { code, amount, to } => {
            commands::convert::run(&config, &code, amount, &to).await
        }

        Commands::Favorites { command } => match command {
            FavoritesCommands::List { json } => commands::favorites::list(&config, json).await,
            FavoritesCommands::Toggle { code } => {
                commands::favorites::toggle(&config, &code).await
            }
            FavoritesCommands::Check { code } => commands::favorites::check(&code),
        },

        Commands::Login { email, password } => {
            commands::auth::login(&config, &email, password).await
        }
        Commands::Register {
            name,
            email,
            password,
            remember_me,
        } => commands::auth::register(&config, &name, &email, password, remember_me).await,
        Commands::Logout => commands::auth::logout(&config).await,
        Commands::Whoami => commands::auth::whoami(&config).await,
        Commands::Profile {
            name,
            email,
            address,
            country,
        } => {
            commands::auth::profile(
                &config,
                commands::auth::ProfileEdits {
                    name,
                    email,
                    address,
                    country,
                },
            )
            .await
        }

        Commands::Theme { value } => commands::theme::run(value.as_deref()),

        // handled before config load
        Commands::Config { .. } => Ok(()),
    }
}
