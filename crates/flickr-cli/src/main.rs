// ============================================================================
// flickr-rss — turn a Flickr photostream into an RSS 2.0 feed
// ============================================================================
// Usage:
//   flickr-rss generate <USER> [--count N] [-o FILE]   Public photos of a user
//   flickr-rss generate --ff [--count N] [-o FILE]     Friends & family photos
//   flickr-rss auth [--save-creds FILE]                Obtain an OAuth token
//   flickr-rss version                                 Print the version
// ============================================================================

mod credentials;
mod errors;

use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use flickr_core::feed::{self, CONTACTS_FEED_SUBJECT};
use flickr_core::{
    resolve_user, ClientConfig, Credentials, FeedDocument, FlickrError, FlickrOAuth, HttpTransport,
    PhotoSource, ReqwestTransport,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::credentials::CredentialFlags;
use crate::errors::FileIoError;

/// Flickr photostream to RSS converter
#[derive(Parser)]
#[command(name = "flickr-rss", version, about = "Generate RSS feeds from Flickr photostreams")]
struct Cli {
    /// Flickr API key (env: FLICKR_API_KEY)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Flickr API secret (env: FLICKR_API_SECRET)
    #[arg(long, global = true)]
    api_secret: Option<String>,

    /// OAuth access token (env: FLICKR_OAUTH_TOKEN)
    #[arg(long, global = true)]
    oauth_token: Option<String>,

    /// OAuth access token secret (env: FLICKR_OAUTH_TOKEN_SECRET)
    #[arg(long, global = true)]
    oauth_token_secret: Option<String>,

    /// YAML credentials file written by `auth --save-creds`
    #[arg(short = 'c', long, global = true)]
    creds_file: Option<PathBuf>,

    /// Write the feed here instead of stdout
    #[arg(short = 'o', long, global = true)]
    output: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an RSS feed
    Generate {
        /// Username, numeric user ID, or profile URL
        user: Option<String>,

        /// Friends & family feed (requires OAuth credentials)
        #[arg(long)]
        ff: bool,

        /// Number of photos to include
        #[arg(long, default_value_t = 20)]
        count: usize,
    },

    /// Run the OAuth flow and obtain an access token
    Auth {
        /// Save the resulting credentials to this YAML file
        #[arg(long)]
        save_creds: Option<PathBuf>,
    },

    /// Print version information
    Version,
}

impl Cli {
    fn credential_flags(&self) -> CredentialFlags {
        CredentialFlags {
            api_key: self.api_key.clone(),
            api_secret: self.api_secret.clone(),
            oauth_token: self.oauth_token.clone(),
            oauth_token_secret: self.oauth_token_secret.clone(),
            creds_file: self.creds_file.clone(),
        }
    }
}

/// Which photos a `generate` run covers
#[derive(Debug, PartialEq, Eq)]
enum FeedTarget {
    Contacts,
    User(String),
}

fn init_logging(verbose: bool) {
    let default_directives = if verbose {
        "warn,flickr_core=debug,flickr_rss=debug"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(errors::exit_code(&e))
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let flags = cli.credential_flags();

    match cli.command {
        Commands::Generate { user, ff, count } => {
            let target = plan_generate(user, ff, count)?;
            let creds = credentials::load(&flags)?;
            cmd_generate(&creds, target, count, cli.output.as_deref()).await
        }
        Commands::Auth { save_creds } => {
            let creds = credentials::load(&flags)?;
            cmd_auth(&creds, save_creds.as_deref()).await
        }
        Commands::Version => {
            println!("flickr-rss {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn plan_generate(user: Option<String>, ff: bool, count: usize) -> Result<FeedTarget, FlickrError> {
    if count == 0 {
        return Err(FlickrError::Usage("--count must be at least 1".to_string()));
    }
    if ff {
        return Ok(FeedTarget::Contacts);
    }

    match user.map(|u| u.trim().to_string()) {
        Some(user) if !user.is_empty() => Ok(FeedTarget::User(user)),
        _ => Err(FlickrError::Usage(
            "a username, user ID, or profile URL is required (or use --ff)".to_string(),
        )),
    }
}

fn transport(config: &ClientConfig) -> Result<Arc<dyn HttpTransport>> {
    Ok(Arc::new(ReqwestTransport::new(config)?))
}

// ============================================================================
// generate
// ============================================================================

async fn cmd_generate(
    creds: &Credentials,
    target: FeedTarget,
    count: usize,
    output: Option<&Path>,
) -> Result<()> {
    creds.validate()?;
    if target == FeedTarget::Contacts && !creds.has_oauth() {
        return Err(FlickrError::Usage(
            "OAuth token and token secret are required for the friends & family feed; \
             run `flickr-rss auth` first"
                .to_string(),
        )
        .into());
    }

    let config = ClientConfig::default();
    let source = PhotoSource::new(creds, config.endpoints.clone(), transport(&config)?)?;

    let doc = match target {
        FeedTarget::Contacts => {
            info!("Fetching friends & family photos");
            let photos = source.fetch_contacts_photos(count).await?;
            info!("Found {} photos from friends & family", photos.len());
            feed::build(&photos, CONTACTS_FEED_SUBJECT)
        }
        FeedTarget::User(input) => {
            info!("Looking up user: {}", input);
            let user = resolve_user(&source, &input).await?;
            let photos = source.fetch_user_photos(&user.user_id, count).await?;
            info!("Found {} photos", photos.len());
            feed::build(&photos, &user.display_name)
        }
    };

    match output {
        Some(path) => {
            let file = File::create(path).map_err(|e| FileIoError {
                action: "create",
                path: path.to_path_buf(),
                source: e,
            })?;
            write_feed(&doc, BufWriter::new(file), path)?;
            info!("Wrote RSS feed to {}", path.display());
        }
        None => write_feed(&doc, io::stdout().lock(), Path::new("<stdout>"))?,
    }
    Ok(())
}

fn write_feed<W: Write>(doc: &FeedDocument, mut w: W, path: &Path) -> Result<()> {
    feed::serialize(doc, &mut w).map_err(|e| FileIoError {
        action: "write feed to",
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(())
}

// ============================================================================
// auth
// ============================================================================

async fn cmd_auth(creds: &Credentials, save_creds: Option<&Path>) -> Result<()> {
    if creds.consumer_key.is_empty() || creds.consumer_secret.is_empty() {
        return Err(FlickrError::Usage(
            "--api-key and --api-secret are required for authentication".to_string(),
        )
        .into());
    }

    let config = ClientConfig::default();
    let mut oauth = FlickrOAuth::new(creds, config.endpoints.clone(), transport(&config)?)?;

    println!("Step 1: Getting request token...");
    oauth.obtain_request_token().await?;

    let url = oauth.authorization_url()?;
    println!(
        "\nStep 2: Please visit this URL to authorize the application:\n{}\n",
        url
    );
    let verifier = prompt_verifier(&mut io::stdin().lock(), &mut io::stdout())?;

    println!("\nStep 3: Getting access token...");
    let authorized = oauth.exchange_verifier(&verifier).await?;
    println!("Authentication successful!");

    match save_creds {
        Some(path) => {
            credentials::save(&authorized, path)?;
            println!("Credentials saved to: {}", path.display());
        }
        None => {
            println!("\nCredentials (save these for future use):");
            println!("API Key: {}", authorized.consumer_key);
            println!("API Secret: {}", authorized.consumer_secret);
            if let Some((token, secret)) = authorized.access_token_pair() {
                println!("OAuth Token: {}", token);
                println!("OAuth Token Secret: {}", secret);
            }
        }
    }
    Ok(())
}

/// Ask for the verification code shown after authorizing
fn prompt_verifier<R: BufRead, W: Write>(input: &mut R, prompt: &mut W) -> Result<String> {
    write!(prompt, "After authorizing, enter the verification code: ")?;
    prompt.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}
