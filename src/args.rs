use crate::config_file::ConfigFile;
use crate::grant::Grant;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::path::PathBuf;

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// GET an API endpoint and print the JSON response
    Get {
        /// Path relative to the tenant's API base, e.g. `Production/api/v2.0/companies`
        endpoint: String,

        /// Query string, e.g. `$top=10&$filter=number eq '1000'`
        #[arg(long)]
        query: Option<String>,
    },
    /// POST JSON to an API endpoint and print the JSON response
    Post {
        /// Path relative to the tenant's API base
        endpoint: String,

        /// JSON request body. Defaults to `{}`
        #[arg(long)]
        data: Option<String>,
    },
    /// Print a valid access token, acquiring or refreshing it when needed
    Token,
    /// Print the URL the user signs in at. Authorization Code Grant only
    AuthorizeUrl {
        /// Redirect URI registered for your application
        #[arg(long, env = "BC_REDIRECT_URI")]
        redirect_uri: String,

        /// CSRF state. A random one is generated when omitted
        #[arg(long)]
        state: Option<String>,
    },
    /// Exchange an authorization code for a token. Authorization Code Grant only
    Exchange {
        /// Code delivered to the redirect URI
        #[arg(long)]
        code: String,

        /// Redirect URI used in the authorize request
        #[arg(long, env = "BC_REDIRECT_URI")]
        redirect_uri: String,
    },
    /// Exchange the stored refresh token for a new token. Authorization Code Grant only
    Refresh,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Get { .. } => "get",
            Command::Post { .. } => "post",
            Command::Token => "token",
            Command::AuthorizeUrl { .. } => "authorize-url",
            Command::Exchange { .. } => "exchange",
            Command::Refresh => "refresh",
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Command,

    /// Profile from `~/.business-central/config.toml` filling options not given otherwise
    #[arg(long, env = "BC_PROFILE")]
    pub profile: Option<String>,

    /// Authentication Grant [default: client-credentials]
    #[arg(long, value_enum, env = "BC_GRANT")]
    pub grant: Option<Grant>,

    /// Azure AD tenant the Business Central environment lives in
    #[arg(long, env = "BC_TENANT_ID")]
    pub tenant_id: Option<String>,

    /// OAuth 2.0 Client Identifier <https://www.rfc-editor.org/rfc/rfc6749#section-2.2>
    #[arg(long, env = "BC_CLIENT_ID")]
    pub client_id: Option<String>,

    /// OAuth 2.0 Client Secret. Please use `--client-secret-stdin`, because it's not get stored in a shell history. <https://www.rfc-editor.org/rfc/rfc6749#section-2.3.1>
    #[arg(long, env = "BC_CLIENT_SECRET")]
    pub client_secret: Option<String>,

    /// Prompt for the OAuth 2.0 Client Secret
    #[arg(long, default_value_t = false, conflicts_with = "client_secret")]
    pub client_secret_stdin: bool,

    /// Token state file [default: ~/.business-central.json]
    #[arg(long, env = "BC_TOKEN_FILE")]
    pub token_file: Option<PathBuf>,

    /// Business Central API host override
    #[arg(long, env = "BC_API_URL")]
    pub api_url: Option<String>,

    /// Identity platform host override
    #[arg(long, env = "BC_LOGIN_URL")]
    pub login_url: Option<String>,

    /// Enable debug logs
    #[arg(short, long, default_value_t = false)]
    pub debug: bool,
}

pub struct Args;

impl Args {
    pub async fn parse() -> Result<Arguments> {
        if dotenv().is_ok() {
            log::debug!("Loaded variables from .env");
        }

        let mut args = Arguments::parse();

        if let Some(profile) = args.profile.to_owned() {
            ConfigFile::new()?
                .apply_profile(&profile, &mut args)
                .await?;
        }

        if args.client_secret_stdin {
            args.client_secret = Some(
                rpassword::prompt_password("Client secret: ")
                    .context("Failed to read the client secret")?,
            );
        }

        Ok(args)
    }
}
