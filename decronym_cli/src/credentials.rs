//! Credentials for authenticated sources, from the environment or a prompt

use crate::terminal;
use async_trait::async_trait;
use decronym_core::{CredentialSource, Credentials, SecureString};
use dialoguer::{Input, Password};
use std::env;
use tokio::sync::Mutex;

pub const USERNAME_VAR: &str = "DECRONYM_USERNAME";
pub const PASSWORD_VAR: &str = "DECRONYM_PASSWORD";

/// Reads `DECRONYM_USERNAME`/`DECRONYM_PASSWORD`, falling back to asking on
/// the terminal when one is attached
#[derive(Debug, Default)]
pub struct PromptCredentials {
    // Only one prompt on screen at a time
    prompt_lock: Mutex<()>,
}

impl PromptCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    fn from_env() -> Option<Credentials> {
        let username = env::var(USERNAME_VAR).ok().filter(|u| !u.is_empty())?;
        let password = env::var(PASSWORD_VAR).ok()?;
        Some(Credentials::new(username, SecureString::new(password)))
    }

    fn prompt(location: &str) -> Option<Credentials> {
        eprintln!("Credentials required for {location}");
        let username: String = Input::new()
            .with_prompt("Username")
            .interact_text()
            .ok()?;
        let password = Password::new().with_prompt("Password").interact().ok()?;
        Some(Credentials::new(username, SecureString::new(password)))
    }
}

#[async_trait]
impl CredentialSource for PromptCredentials {
    async fn credentials(&self, location: &str) -> Option<Credentials> {
        if let Some(credentials) = Self::from_env() {
            return Some(credentials);
        }
        if !terminal::is_interactive() {
            log::debug!("No credentials for {location} and no terminal to ask on");
            return None;
        }

        let _guard = self.prompt_lock.lock().await;
        let location = location.to_string();
        tokio::task::spawn_blocking(move || Self::prompt(&location))
            .await
            .ok()
            .flatten()
    }
}
