//! Interactive `configure` command

use std::path::Path;

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Password};
use eyre::{Context, Result};
use tracing::{debug, info};

use crate::config::Config;
use crate::util::mask_sensitive_string;

/// Values collected by the prompts; blank answers keep the existing value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Answers {
    pub account_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub vantage_api_key: String,
}

impl Answers {
    /// Merge answers into `config`
    pub fn apply(self, mut config: Config) -> Config {
        debug!(
            account_id = %self.account_id,
            client_secret = ?mask_sensitive_string(Some(self.client_secret.as_str())),
            "Answers::apply: called"
        );
        let general = &mut config.general;
        replace_if_given(&mut general.account_id, self.account_id);
        replace_if_given(&mut general.client_id, self.client_id);
        replace_if_given(&mut general.client_secret, self.client_secret);
        replace_if_given(&mut general.vantage_api_key, self.vantage_api_key);
        config
    }
}

fn replace_if_given(slot: &mut Option<String>, answer: String) {
    let answer = answer.trim();
    if !answer.is_empty() {
        *slot = Some(answer.to_string());
    }
}

fn prompt_text(theme: &ColorfulTheme, prompt: &str, current: Option<&str>) -> Result<String> {
    let mut input = Input::<String>::with_theme(theme).with_prompt(prompt).allow_empty(true);
    if let Some(current) = current {
        input = input.default(current.to_string()).show_default(true);
    }
    input.interact_text().context("Failed to read input")
}

fn prompt_secret(theme: &ColorfulTheme, prompt: &str, current: Option<&str>) -> Result<String> {
    let prompt = match mask_sensitive_string(current) {
        Some(masked) => format!("{} [{}]", prompt, masked),
        None => prompt.to_string(),
    };
    Password::with_theme(theme)
        .with_prompt(prompt)
        .allow_empty_password(true)
        .interact()
        .context("Failed to read secret")
}

/// Prompt for account and credentials, then write the config file
pub fn configure(path: &Path, existing: Config) -> Result<()> {
    debug!(?path, "configure: called");
    let theme = ColorfulTheme::default();
    let general = &existing.general;

    println!("Account ID and client credentials are listed at https://console.vanta.ge/account.");
    let account_id = prompt_text(&theme, "Account ID", general.account_id.as_deref())?;
    let client_id = prompt_text(&theme, "Client ID", general.client_id.as_deref())?;
    let client_secret = prompt_secret(&theme, "Client Secret", general.client_secret.as_deref())?;

    println!("Vantage API keys are managed at https://console.vanta.ge/api-keys.");
    let vantage_api_key = prompt_secret(&theme, "Vantage API key", general.vantage_api_key.as_deref())?;

    let answers = Answers {
        account_id,
        client_id,
        client_secret,
        vantage_api_key,
    };
    let config = answers.apply(existing);
    config.save(path)?;

    info!(path = %path.display(), "configure: saved");
    println!("Configuration saved to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_apply_sets_given_values() {
        let answers = Answers {
            account_id: "acct1".to_string(),
            client_id: " client ".to_string(),
            client_secret: "secret".to_string(),
            vantage_api_key: String::new(),
        };
        let config = answers.apply(Config::default());

        assert_eq!(config.general.account_id.as_deref(), Some("acct1"));
        assert_eq!(config.general.client_id.as_deref(), Some("client"));
        assert_eq!(config.general.client_secret.as_deref(), Some("secret"));
        assert!(config.general.vantage_api_key.is_none());
    }

    #[test]
    fn test_apply_keeps_existing_on_blank() {
        let mut existing = Config::default();
        existing.general.vantage_api_key = Some("vk-existing".to_string());
        existing.general.output_type = Some("csv".to_string());

        let config = Answers::default().apply(existing.clone());
        assert_eq!(config, existing);
    }

    #[test]
    fn test_applied_config_round_trips_through_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");

        let answers = Answers {
            account_id: "acct1".to_string(),
            ..Default::default()
        };
        answers.apply(Config::default()).save(&path).unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded.general.account_id.as_deref(), Some("acct1"));
    }
}
