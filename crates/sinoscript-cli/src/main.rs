use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use sinoscript_application::Portal;
use sinoscript_core::prompt::{AlwaysConfirm, ConfirmationPrompt};
use sinoscript_infrastructure::ConfigService;

mod commands;
mod logging;
mod prompt;

use commands::form::{DetailArgs, SelectAuthorArgs, SelectTextArgs};

#[derive(Parser)]
#[command(name = "sinoscript")]
#[command(about = "SinoScript portal - add and edit catalogue texts and authors", long_about = None)]
struct Cli {
    /// Config file (defaults to the platform config dir, or SINOSCRIPT_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Answer yes to every confirmation
    #[arg(short, long, global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in to the hosted catalogue
    Login {
        email: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Sign out
    Logout,
    /// Manage draft sessions
    Sessions {
        #[command(subcommand)]
        action: SessionsAction,
    },
    /// Show the active session and location
    Show,
    /// Step 1: choose region, text and text action
    SelectText(SelectTextArgs),
    /// Step 2: text details
    TextInfo(DetailArgs),
    /// Step 3: choose author and author action
    SelectAuthor(SelectAuthorArgs),
    /// Step 4: author details
    AuthorInfo(DetailArgs),
}

#[derive(Subcommand)]
enum SessionsAction {
    /// List draft sessions
    List,
    /// Start a new draft session
    New,
    /// Continue a draft session
    Resume { id: String },
    /// Rename a draft session
    Rename { id: String, name: String },
    /// Delete a draft session
    Delete { id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_service = match &cli.config {
        Some(path) => ConfigService::new(path),
        None => ConfigService::from_default_location()?,
    };
    let config = config_service.get_config().with_context(|| {
        format!(
            "Failed to load config from {}",
            config_service.path().display()
        )
    })?;
    let _log_guard = logging::init(&config.logging);
    tracing::debug!("[Cli] Config: {}", config_service.path().display());

    let mut portal = Portal::open(&config).context("Failed to open the local store")?;
    if !portal.is_online() {
        tracing::info!("[Cli] No remote configured, using the offline catalogue");
    }
    let prompt: Box<dyn ConfirmationPrompt> = if cli.yes {
        Box::new(AlwaysConfirm)
    } else {
        Box::new(prompt::StdinPrompt)
    };
    let prompt = prompt.as_ref();

    match cli.command {
        Commands::Login { email, password } => {
            commands::auth::login(&portal, &email, password).await?
        }
        Commands::Logout => commands::auth::logout(&portal).await?,
        Commands::Sessions { action } => match action {
            SessionsAction::List => commands::sessions::list(&mut portal).await?,
            SessionsAction::New => commands::sessions::new(&mut portal, prompt).await?,
            SessionsAction::Resume { id } => {
                commands::sessions::resume(&mut portal, prompt, &id).await?
            }
            SessionsAction::Rename { id, name } => {
                commands::sessions::rename(&mut portal, prompt, &id, &name).await?
            }
            SessionsAction::Delete { id } => {
                commands::sessions::delete(&mut portal, prompt, &id).await?
            }
        },
        Commands::Show => commands::show::show(&mut portal)?,
        Commands::SelectText(args) => commands::form::select_text(&mut portal, prompt, args).await?,
        Commands::TextInfo(args) => {
            commands::form::detail(&mut portal, prompt, commands::form::Detail::Text, args).await?
        }
        Commands::SelectAuthor(args) => {
            commands::form::select_author(&mut portal, prompt, args).await?
        }
        Commands::AuthorInfo(args) => {
            commands::form::detail(&mut portal, prompt, commands::form::Detail::Author, args)
                .await?
        }
    }

    Ok(())
}
