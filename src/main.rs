//! Context Bridge CLI - move page content and conversations between AI chats
//!
//! The application logic is contained in lib.rs, and this file is responsible
//! for parsing arguments and handling top-level errors.

use std::path::Path;
use std::sync::Arc;

use clap::{CommandFactory, Parser, Subcommand};
use colored::Colorize;
use context_bridge::bridge;
use context_bridge::host::{DryRunHost, Host, SystemHost};
use context_bridge::{
    extract, page, ActionId, BridgeMessage, Config, DispatchOutcome, DispatchRequest, Dispatcher,
    ExtractRequest, Page, SettingsStore, StaticPage,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "context-bridge")]
#[command(author, version, about = "Send page content and conversations to AI chat services", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print what would be shared from a page
    Extract {
        /// Page URL to fetch, or path to a saved HTML file
        source: String,
        /// Page URL when SOURCE is a file (used for platform detection)
        #[arg(long)]
        url: Option<String>,
        /// Text the user selected; takes precedence over the page
        #[arg(long)]
        selection: Option<String>,
        /// Extract the conversation transcript instead of a page excerpt
        #[arg(long = "continue")]
        continuation: bool,
    },
    /// Trigger an action on a page and dispatch it
    Send {
        /// Action tag, e.g. openInChatGPT or continueInClaude
        action: ActionId,
        /// Page URL to fetch, or path to a saved HTML file
        source: String,
        /// Page URL when SOURCE is a file
        #[arg(long)]
        url: Option<String>,
        /// Text the user selected
        #[arg(long)]
        selection: Option<String>,
        /// Print the effect instead of performing it
        #[arg(long)]
        dry_run: bool,
    },
    /// Dispatch a raw bridge message (JSON)
    Dispatch {
        /// Message JSON; read from stdin when absent
        #[arg(long)]
        message: Option<String>,
        /// Print the effect instead of performing it
        #[arg(long)]
        dry_run: bool,
    },
    /// Show whether the bridge would be active on a URL
    Check {
        url: String,
    },
    /// List every action tag
    Actions,
    /// View or change persisted settings
    Settings {
        #[command(subcommand)]
        command: Option<SettingsCommand>,
    },
    /// Generate shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
enum SettingsCommand {
    /// Show current settings
    Show,
    /// Enable the bridge
    Enable,
    /// Disable the bridge everywhere
    Disable,
    /// Add a regex exclusion pattern
    Add { pattern: String },
    /// Remove the exclusion pattern at INDEX (as listed by `show`)
    Remove { index: usize },
    /// Hide the bridge on every page of this URL's site
    Hide { url: String },
    /// Set the drawer offset
    Drawer { position: f64 },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Extract {
            source,
            url,
            selection,
            continuation,
        } => {
            let mut page = load_page(&source, url, &config).await?;
            let request = if continuation {
                ExtractRequest::continuation(selection)
            } else {
                ExtractRequest::share(selection)
            };
            println!("{}", extract(&mut page, &request).await);
        }
        Commands::Send {
            action,
            source,
            url,
            selection,
            dry_run,
        } => {
            let mut page = load_page(&source, url, &config).await?;
            let store = SettingsStore::open(config.settings_path())?;
            if !store.snapshot()?.should_inject(page.url()) {
                eprintln!(
                    "{} bridge is disabled or excluded on {}",
                    "Skipped:".yellow(),
                    page.url()
                );
                return Ok(());
            }

            let message = bridge::trigger(action, &mut page, selection).await?;
            run_dispatch(message, dry_run, &config).await;
        }
        Commands::Dispatch { message, dry_run } => {
            let raw = match message {
                Some(raw) => raw,
                None => std::io::read_to_string(std::io::stdin())?,
            };
            let message: BridgeMessage = serde_json::from_str(&raw)?;
            run_dispatch(message, dry_run, &config).await;
        }
        Commands::Check { url } => {
            let store = SettingsStore::open(config.settings_path())?;
            if store.snapshot()?.should_inject(&url) {
                println!("{} {}", "active".green(), url);
            } else {
                println!("{} {}", "hidden".red(), url);
            }
        }
        Commands::Actions => {
            for action in ActionId::all() {
                println!("{action}");
            }
        }
        Commands::Settings { command } => {
            let store = SettingsStore::open(config.settings_path())?;
            run_settings(&store, command.unwrap_or(SettingsCommand::Show))?;
        }
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "context-bridge",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}

/// Fetch `source` if it is a URL, otherwise read it as an HTML file.
async fn load_page(source: &str, url: Option<String>, config: &Config) -> anyhow::Result<StaticPage> {
    if source.starts_with("http://") || source.starts_with("https://") {
        return Ok(page::fetch(source, &config.fetch).await?);
    }

    let path = Path::new(source);
    let html = std::fs::read_to_string(path)?;
    let url = match url {
        Some(url) => url,
        None => format!("file://{}", std::fs::canonicalize(path)?.display()),
    };
    Ok(StaticPage::new(url, html))
}

async fn run_dispatch(message: BridgeMessage, dry_run: bool, config: &Config) {
    let host: Arc<dyn Host> = if dry_run {
        Arc::new(DryRunHost::verbose())
    } else {
        Arc::new(SystemHost::new(config.settings_path()))
    };
    let dispatcher = Dispatcher::new(host);
    let outcome = dispatcher.dispatch(&DispatchRequest::from(message)).await;
    print_outcome(&outcome);
}

fn print_outcome(outcome: &DispatchOutcome) {
    match outcome {
        DispatchOutcome::TabOpened { url } => eprintln!("{} {}", "Opened".green(), url),
        DispatchOutcome::Copied { opened } => {
            eprintln!("{}", "Copied to clipboard".green());
            if let Some(url) = opened {
                eprintln!("Paste it into {}", url);
            }
        }
        DispatchOutcome::CopyFailed { reason, opened } => {
            eprintln!("{} {}", "Copy failed:".red(), reason);
            if let Some(url) = opened {
                eprintln!("Opened {} anyway", url);
            }
        }
        DispatchOutcome::SettingsOpened => {}
        DispatchOutcome::HostFailed { reason } => eprintln!("{} {}", "Failed:".red(), reason),
    }
}

fn run_settings(store: &SettingsStore, command: SettingsCommand) -> anyhow::Result<()> {
    match command {
        SettingsCommand::Show => {
            let settings = store.snapshot()?;
            let status = if settings.extension_enabled {
                "Active".green()
            } else {
                "Inactive".red()
            };
            println!("Status: {}", status);
            println!("Drawer position: {}", settings.drawer_position);
            if settings.excluded_sites.is_empty() {
                println!("No excluded sites");
            } else {
                println!("Excluded sites:");
                for (index, pattern) in settings.excluded_sites.iter().enumerate() {
                    println!("  [{}] {}", index, pattern);
                }
            }
        }
        SettingsCommand::Enable => store.set_enabled(true)?,
        SettingsCommand::Disable => store.set_enabled(false)?,
        SettingsCommand::Add { pattern } => {
            if store.add_pattern(&pattern)? {
                println!("{} {}", "Added".green(), pattern.trim());
            } else {
                println!("Already excluded: {}", pattern.trim());
            }
        }
        SettingsCommand::Remove { index } => match store.remove_pattern(index)? {
            Some(pattern) => println!("{} {}", "Removed".green(), pattern),
            None => println!("No pattern at index {}", index),
        },
        SettingsCommand::Hide { url } => {
            let pattern = store.hide_on_site(&url)?;
            println!("{} {}", "Added!".green(), pattern);
        }
        SettingsCommand::Drawer { position } => store.set_drawer_position(position)?,
    }
    Ok(())
}
