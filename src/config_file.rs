use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, path::PathBuf};
use tokio::fs;

use crate::args::Arguments;
use crate::grant::Grant;

#[derive(Deserialize, Serialize, Clone, Debug, Default)]
pub struct Profile {
    /// Authentication Grant
    pub grant: Option<Grant>,

    /// Azure AD tenant
    pub tenant_id: Option<String>,

    /// OAuth 2.0 Client Identifier <https://www.rfc-editor.org/rfc/rfc6749#section-2.2>
    pub client_id: Option<String>,

    /// OAuth 2.0 Client Secret <https://www.rfc-editor.org/rfc/rfc6749#section-2.3.1>
    pub client_secret: Option<String>,

    /// Token state file
    pub token_file: Option<PathBuf>,

    /// Business Central API host override
    pub api_url: Option<String>,

    /// Identity platform host override
    pub login_url: Option<String>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default)]
pub struct Config {
    #[serde(default)]
    pub profile: HashMap<String, Profile>,
}

pub struct ConfigFile {
    file_path: PathBuf,
}

impl ConfigFile {
    pub fn new() -> Result<ConfigFile> {
        let mut file_path = home::home_dir().context("Couldn't access $HOME_DIR")?;
        file_path.push(".business-central/config.toml");

        Ok(ConfigFile { file_path })
    }

    pub fn from(file_path: PathBuf) -> ConfigFile {
        ConfigFile { file_path }
    }

    async fn read(&self) -> Config {
        log::debug!("Reading the config file");
        let text = fs::read_to_string(&self.file_path)
            .await
            .unwrap_or_default();

        toml::from_str::<Config>(&text).unwrap_or_else(|e| {
            log::warn!(
                "Cannot parse config file {}. Error: {:?}",
                &self.file_path.to_string_lossy(),
                anyhow!(e)
            );

            Config::default()
        })
    }

    /// Fills every option of `args` that is still unset from `profile`.
    pub async fn apply_profile(&self, name: &str, args: &mut Arguments) -> Result<()> {
        let config = self.read().await;

        let profile = config
            .profile
            .get(name)
            .with_context(|| format!("The given profile `{}` doesn't exist", name))?;

        log::debug!("Applying profile `{}`", name);

        fill(&mut args.grant, &profile.grant);
        fill(&mut args.tenant_id, &profile.tenant_id);
        fill(&mut args.client_id, &profile.client_id);
        fill(&mut args.client_secret, &profile.client_secret);
        fill(&mut args.token_file, &profile.token_file);
        fill(&mut args.api_url, &profile.api_url);
        fill(&mut args.login_url, &profile.login_url);

        Ok(())
    }
}

fn fill<T: Clone>(target: &mut Option<T>, value: &Option<T>) {
    if target.is_none() {
        *target = value.to_owned();
    }
}
