//! API key commands and the terminal key selector

use super::load_config;
use anyhow::Result;
use artpack_gen::{ArtpackConfig, CredentialStore, KeySelection, KeySelector, BILLING_DOCS_URL};
use async_trait::async_trait;
use clap::Subcommand;
use std::io::{IsTerminal, Write};

#[derive(Subcommand)]
pub enum KeyCommands {
    /// Show whether a Gemini API key is available
    Status,

    /// Enter a Gemini API key and store it in ~/.artpack/config.toml
    Select,
}

/// Reads a key from the terminal. Without a terminal there is nothing to
/// select with, so callers get the billing docs link instead.
pub struct CliKeySelector {
    credentials: CredentialStore,
}

impl CliKeySelector {
    pub fn new(credentials: CredentialStore) -> Self {
        Self { credentials }
    }
}

/// Apply what the user typed; blank input cancels
fn apply_entered_key(credentials: &CredentialStore, input: &str) -> KeySelection {
    if input.trim().is_empty() {
        return KeySelection::Cancelled;
    }
    credentials.select_key(input);
    KeySelection::Selected
}

#[async_trait]
impl KeySelector for CliKeySelector {
    async fn has_selected_api_key(&self) -> bool {
        self.credentials.has_selected_key()
    }

    async fn open_select_key(&self) -> KeySelection {
        if !std::io::stdin().is_terminal() {
            return KeySelection::Unavailable {
                docs_url: BILLING_DOCS_URL,
            };
        }

        eprintln!("A paid Gemini API key is required. Billing: {}", BILLING_DOCS_URL);
        eprint!("Enter Gemini API key (blank to cancel): ");
        let _ = std::io::stderr().flush();

        let line = tokio::task::spawn_blocking(|| {
            let mut input = String::new();
            std::io::stdin().read_line(&mut input).map(|_| input)
        })
        .await;

        match line {
            Ok(Ok(input)) => apply_entered_key(&self.credentials, &input),
            _ => KeySelection::Cancelled,
        }
    }
}

/// Show the first and last four characters only
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

pub async fn run(cmd: KeyCommands) -> Result<()> {
    match cmd {
        KeyCommands::Status => run_status().await,
        KeyCommands::Select => run_select().await,
    }
}

async fn run_status() -> Result<()> {
    let config = load_config();
    let credentials = CredentialStore::with_key(config.api_key("gemini"));
    let selector = CliKeySelector::new(credentials.clone());

    if selector.has_selected_api_key().await {
        let key = credentials.current().unwrap_or_default();
        println!("Gemini API key: {}", mask_key(&key));
    } else {
        println!("No Gemini API key selected.");
        println!("  Set GEMINI_API_KEY, run `artpack key select`, or see {}", BILLING_DOCS_URL);
    }
    Ok(())
}

async fn run_select() -> Result<()> {
    let credentials = CredentialStore::new();
    let selector = CliKeySelector::new(credentials.clone());

    match selector.open_select_key().await {
        KeySelection::Selected => {
            let key = credentials.current().unwrap_or_default();
            let path = ArtpackConfig::save_global_api_key("gemini", &key)?;
            println!("Gemini API key {} saved to {}", mask_key(&key), path.display());
        }
        KeySelection::Cancelled => println!("No key selected."),
        KeySelection::Unavailable { docs_url } => {
            println!("Key selection needs an interactive terminal.");
            println!("  Set GEMINI_API_KEY instead. Billing setup: {}", docs_url);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key("AIzaSyExampleKey1234"), "AIza...1234");
        assert_eq!(mask_key("short"), "*****");
    }

    #[test]
    fn test_entered_key_applied() {
        let credentials = CredentialStore::new();
        assert_eq!(
            apply_entered_key(&credentials, "  \n"),
            KeySelection::Cancelled
        );
        assert!(!credentials.has_selected_key());

        assert_eq!(
            apply_entered_key(&credentials, "my-key\n"),
            KeySelection::Selected
        );
        assert_eq!(credentials.current().as_deref(), Some("my-key"));
    }
}
