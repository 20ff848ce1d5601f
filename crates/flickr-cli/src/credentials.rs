// ============================================================================
// Credential loading: flags > YAML credentials file > environment
// ============================================================================

use std::path::{Path, PathBuf};

use anyhow::Result;
use flickr_core::Credentials;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::FileIoError;

pub const ENV_API_KEY: &str = "FLICKR_API_KEY";
pub const ENV_API_SECRET: &str = "FLICKR_API_SECRET";
pub const ENV_OAUTH_TOKEN: &str = "FLICKR_OAUTH_TOKEN";
pub const ENV_OAUTH_TOKEN_SECRET: &str = "FLICKR_OAUTH_TOKEN_SECRET";

/// On-disk layout of a credentials file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialFile {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_secret: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub oauth_token: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub oauth_token_secret: String,
}

impl From<&Credentials> for CredentialFile {
    fn from(creds: &Credentials) -> Self {
        Self {
            api_key: creds.consumer_key.clone(),
            api_secret: creds.consumer_secret.clone(),
            oauth_token: creds.access_token.clone().unwrap_or_default(),
            oauth_token_secret: creds.access_token_secret.clone().unwrap_or_default(),
        }
    }
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct CredentialFlags {
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub oauth_token: Option<String>,
    pub oauth_token_secret: Option<String>,
    pub creds_file: Option<PathBuf>,
}

/// Merge flags, the optional credentials file, and the environment
pub fn load(flags: &CredentialFlags) -> Result<Credentials> {
    let file = match &flags.creds_file {
        Some(path) => Some(read_file(path)?),
        None => None,
    };

    let pick = |flag: &Option<String>, from_file: Option<&String>, env: &str| -> Option<String> {
        flag.clone()
            .filter(|v| !v.is_empty())
            .or_else(|| from_file.filter(|v| !v.is_empty()).cloned())
            .or_else(|| std::env::var(env).ok().filter(|v| !v.is_empty()))
    };

    let creds = Credentials {
        consumer_key: pick(&flags.api_key, file.as_ref().map(|f| &f.api_key), ENV_API_KEY)
            .unwrap_or_default(),
        consumer_secret: pick(&flags.api_secret, file.as_ref().map(|f| &f.api_secret), ENV_API_SECRET)
            .unwrap_or_default(),
        access_token: pick(
            &flags.oauth_token,
            file.as_ref().map(|f| &f.oauth_token),
            ENV_OAUTH_TOKEN,
        ),
        access_token_secret: pick(
            &flags.oauth_token_secret,
            file.as_ref().map(|f| &f.oauth_token_secret),
            ENV_OAUTH_TOKEN_SECRET,
        ),
    };

    debug!(
        "Loaded credentials (api key present: {}, oauth: {})",
        !creds.consumer_key.is_empty(),
        creds.has_oauth()
    );
    Ok(creds)
}

fn read_file(path: &Path) -> Result<CredentialFile> {
    let data = std::fs::read_to_string(path).map_err(|e| FileIoError {
        action: "read credentials file",
        path: path.to_path_buf(),
        source: e,
    })?;

    let file: CredentialFile = serde_yaml::from_str(&data).map_err(|e| {
        flickr_core::FlickrError::Input(format!(
            "failed to parse credentials file {}: {}",
            path.display(),
            e
        ))
    })?;
    Ok(file)
}

/// Write credentials as YAML, readable only by the owner on unix
pub fn save(creds: &Credentials, path: &Path) -> Result<()> {
    let yaml = serde_yaml::to_string(&CredentialFile::from(creds))?;

    let io_err = |e| FileIoError {
        action: "write credentials file",
        path: path.to_path_buf(),
        source: e,
    };

    #[cfg(unix)]
    {
        use std::io::Write;
        use std::os::unix::fs::OpenOptionsExt;

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .map_err(io_err)?;
        file.write_all(yaml.as_bytes()).map_err(io_err)?;
    }

    #[cfg(not(unix))]
    std::fs::write(path, yaml).map_err(io_err)?;

    Ok(())
}
