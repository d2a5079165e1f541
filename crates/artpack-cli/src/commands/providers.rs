//! Provider listing

use super::load_config;
use anyhow::Result;
use artpack_gen::providers::{available_providers, create_provider};
use artpack_gen::{CredentialStore, ProviderStatus};

pub fn run() -> Result<()> {
    let config = load_config();
    let credentials = CredentialStore::new();

    println!("Providers (default: {}):", config.default_provider());
    for name in available_providers() {
        let status = match create_provider(name, &config, &credentials) {
            Ok(provider) => match provider.health_check() {
                ProviderStatus::Available => "available".to_string(),
                ProviderStatus::NoApiKey => "no API key".to_string(),
            },
            Err(e) => e.to_string(),
        };
        println!("  {:<8} {}", name, status);
    }
    Ok(())
}
