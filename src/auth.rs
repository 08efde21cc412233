// Copyright 2025 Webmobix Solutions AG
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUTHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! OAuth2 credential provider for the Google Sheets API.
//!
//! Handles client-secret discovery, token caching, the one-time interactive
//! consent flow, and the non-interactive authenticator used by
//! [`GoogleSheetService`](crate::service::GoogleSheetService) on every
//! connection.

use anyhow::{Context, Result};
use google_sheets4::hyper_rustls;
use google_sheets4::yup_oauth2::{
    self, ApplicationSecret, InstalledFlowAuthenticator, InstalledFlowReturnMethod,
};
use hyper_util::client::legacy::connect::HttpConnector;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Scopes required for Google Sheets API access, including drive for
/// spreadsheet creation.
const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/spreadsheets",
    "https://www.googleapis.com/auth/drive",
];

/// Hidden directory holding client secrets and cached tokens.
const CACHE_DIR_NAME: &str = ".sheetpipe";

/// Cached authentication token data
#[derive(Debug, Serialize, Deserialize)]
struct TokenCache {
    access_token: String,
    refresh_token: Option<String>,
    expires_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Google Cloud Console client secret file format
#[derive(Debug, Serialize, Deserialize)]
struct GoogleClientSecretFile {
    installed: ApplicationSecret,
}

/// Google OAuth2 authentication manager.
///
/// Construct one, run [`authenticate`](AuthManager::authenticate) once to
/// obtain tokens interactively, then hand the manager to
/// [`GoogleSheetService`](crate::service::GoogleSheetService), which uses
/// the cached tokens without ever launching a browser.
pub struct AuthManager {
    /// Optional path to cache authentication tokens
    auth_cache_path: Option<PathBuf>,
    /// Path to client secrets JSON file
    client_secret_path: Option<PathBuf>,
}

impl AuthManager {
    /// Creates a new authentication manager.
    ///
    /// # Arguments
    ///
    /// * `auth_cache_path` - Optional path to store cached tokens
    pub fn new(auth_cache_path: Option<PathBuf>) -> Self {
        Self {
            auth_cache_path,
            client_secret_path: None,
        }
    }

    /// Creates a new authentication manager with custom client secret path.
    ///
    /// # Arguments
    ///
    /// * `auth_cache_path` - Optional path to store cached tokens
    /// * `client_secret_path` - Path to Google OAuth2 client secrets JSON file
    pub fn with_client_secret(
        auth_cache_path: Option<PathBuf>,
        client_secret_path: PathBuf,
    ) -> Self {
        Self {
            auth_cache_path,
            client_secret_path: Some(client_secret_path),
        }
    }

    /// Performs the complete OAuth2 authentication flow.
    ///
    /// Checks the token cache first and returns immediately when an
    /// unexpired token is stored there. Otherwise launches the
    /// browser-based consent flow and persists the resulting tokens for
    /// later non-interactive use.
    ///
    /// # Errors
    ///
    /// * If the OAuth2 flow or token exchange fails
    /// * If file I/O operations fail
    pub async fn authenticate(&self) -> Result<()> {
        if self.get_cached_auth()?.is_some() {
            info!("✅ Using cached authentication token");
            return Ok(());
        }

        info!("🔑 Starting OAuth2 authentication flow");

        let client_secret = self
            .load_client_secret()
            .await
            .context("Failed to load client secret")?;

        let auth = InstalledFlowAuthenticator::builder(
            client_secret,
            InstalledFlowReturnMethod::HTTPRedirect,
        )
        .persist_tokens_to_disk(
            self.auth_cache_path
                .clone()
                .unwrap_or_else(|| std::env::temp_dir().join("sheetpipe_tokens.json")),
        )
        .build()
        .await
        .context("Failed to create authenticator")?;

        let _token = auth
            .token(SCOPES)
            .await
            .context("Failed to obtain access token")?;

        info!("✅ Authentication successful");
        Ok(())
    }

    /// Builds a non-interactive authenticator from previously cached
    /// tokens. Never launches a browser: callers must have run
    /// [`authenticate`](AuthManager::authenticate) (or supplied tokens)
    /// beforehand.
    ///
    /// # Errors
    ///
    /// * If no usable token cache can be located
    /// * If the stored tokens are invalid or expired beyond refresh
    pub(crate) async fn build_authenticator(
        &self,
    ) -> Result<yup_oauth2::authenticator::Authenticator<hyper_rustls::HttpsConnector<HttpConnector>>>
    {
        let token_path = Self::resolve_token_path(self.auth_cache_path.clone())?;

        let client_secret = self
            .load_client_secret()
            .await
            .context("Failed to load client secret for Google Sheets API")?;

        let auth = InstalledFlowAuthenticator::builder(
            client_secret,
            InstalledFlowReturnMethod::HTTPRedirect,
        )
        .persist_tokens_to_disk(token_path)
        .build()
        .await
        .context("Failed to build non-interactive authenticator")?;

        // Probe the required scopes so a dead token cache fails here rather
        // than mid-operation.
        auth.token(SCOPES).await.context(
            "Failed to get token without interactive auth. \
            The stored tokens are invalid or expired; please authenticate again.",
        )?;

        debug!("🔍 Obtained token without interactive auth");
        Ok(auth)
    }

    /// Resolves a usable token cache path, validating discovered files.
    ///
    /// Search order:
    /// 1. `token_override` (if provided)
    /// 2. Local tokens: `./.sheetpipe/tokens.json`
    /// 3. Home tokens:  `~/.sheetpipe/tokens.json`
    ///
    /// # Errors
    ///
    /// Returns an error with remediation tips when no valid tokens can be found.
    pub fn resolve_token_path(token_override: Option<PathBuf>) -> Result<PathBuf> {
        if let Some(path) = token_override {
            Self::validate_token_file(&path)?;
            info!("🔐 Using authentication tokens at: {}", path.display());
            return Ok(path);
        }

        match Self::find_existing_token()? {
            Some(path) => {
                info!("🔐 Using authentication tokens at: {}", path.display());
                Ok(path)
            }
            None => anyhow::bail!(
                "❌ No authentication tokens found.\n\n\
                Please authenticate first by calling AuthManager::authenticate(), \
                or place existing tokens at ./{CACHE_DIR_NAME}/tokens.json or \
                ~/{CACHE_DIR_NAME}/tokens.json, then retry."
            ),
        }
    }

    /// Finds existing authentication tokens using search precedence.
    ///
    /// Search order:
    /// 1. Local hidden subfolder (./.sheetpipe/tokens.json)
    /// 2. Home hidden subfolder (~/.sheetpipe/tokens.json)
    /// 3. None if neither found
    pub fn find_existing_token() -> Result<Option<PathBuf>> {
        let local_path = PathBuf::from(format!("./{CACHE_DIR_NAME}/tokens.json"));
        if local_path.exists() {
            Self::validate_token_file(&local_path)?;
            debug!("🔐 Found local token cache");
            return Ok(Some(local_path));
        }

        if let Ok(home_dir) = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE")) {
            let home_path = PathBuf::from(home_dir)
                .join(CACHE_DIR_NAME)
                .join("tokens.json");
            if home_path.exists() {
                Self::validate_token_file(&home_path)?;
                debug!("🔐 Found home token cache");
                return Ok(Some(home_path));
            }
        }

        Ok(None)
    }

    /// Checks that a token file exists and contains parseable JSON.
    fn validate_token_file(path: &Path) -> Result<()> {
        if !path.exists() {
            anyhow::bail!("Token file not found: {}", path.display());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read token file: {}", path.display()))?;

        if content.trim().is_empty() {
            anyhow::bail!("Token file is empty: {}", path.display());
        }

        serde_json::from_str::<serde_json::Value>(&content)
            .with_context(|| format!("Token file is not valid JSON: {}", path.display()))?;

        Ok(())
    }

    /// Retrieves cached authentication tokens if available.
    ///
    /// # Returns
    ///
    /// `Ok(Some(token))` if valid cached token exists,
    /// `Ok(None)` if no cache, token expired, or the file is in another
    /// format (yup_oauth2 persists its own storage layout there),
    /// `Err` if file reading fails.
    pub fn get_cached_auth(&self) -> Result<Option<String>> {
        let cache_path = match &self.auth_cache_path {
            Some(path) => path.clone(),
            None => return Ok(None),
        };

        if !cache_path.exists() {
            return Ok(None);
        }

        let cache_content =
            fs::read_to_string(&cache_path).context("Failed to read auth cache file")?;

        let Ok(token_cache) = serde_json::from_str::<TokenCache>(&cache_content) else {
            return Ok(None);
        };

        // Check if token is expired
        if let Some(expires_at) = token_cache.expires_at
            && expires_at <= chrono::Utc::now()
        {
            debug!("🔄 Cached token expired, will refresh");
            return Ok(None);
        }

        Ok(Some(token_cache.access_token))
    }

    /// Finds client secret file using search precedence.
    ///
    /// Search order:
    /// 1. Custom path (if provided to AuthManager)
    /// 2. Local directory (./.sheetpipe/client_secret.json)
    /// 3. Home directory (~/.sheetpipe/client_secret.json)
    /// 4. Fail if none found
    fn find_client_secret_file(&self) -> Result<PathBuf> {
        if let Some(path) = &self.client_secret_path {
            if path.exists() {
                return Ok(path.clone());
            } else {
                anyhow::bail!("Custom client secret file not found: {:?}", path);
            }
        }

        let local_path = PathBuf::from(format!("./{CACHE_DIR_NAME}/client_secret.json"));
        if local_path.exists() {
            debug!("🔑 Found local client_secret.json");
            return Ok(local_path);
        }

        if let Ok(home_dir) = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE")) {
            let home_path = PathBuf::from(home_dir)
                .join(CACHE_DIR_NAME)
                .join("client_secret.json");
            if home_path.exists() {
                debug!("🔑 Found home client_secret.json");
                return Ok(home_path);
            }
        }

        anyhow::bail!(
            "❌ No client_secret.json file found.\n\n\
            Please create a Google Cloud OAuth2 application and place the downloaded\n\
            client_secret.json file in one of these locations:\n\
            • Local directory:  ./{CACHE_DIR_NAME}/client_secret.json\n\
            • Home directory:   ~/{CACHE_DIR_NAME}/client_secret.json"
        )
    }

    /// Loads client secret configuration from the found file.
    ///
    /// # Errors
    ///
    /// * If client secret file cannot be found or read
    /// * If client secret JSON is malformed
    pub async fn load_client_secret(&self) -> Result<ApplicationSecret> {
        let secret_path = self.find_client_secret_file()?;

        let secret_json = fs::read_to_string(&secret_path)
            .with_context(|| format!("Failed to read client secret from {:?}", secret_path))?;

        // First try to parse as Google Cloud Console format (with "installed" wrapper)
        if let Ok(google_format) = serde_json::from_str::<GoogleClientSecretFile>(&secret_json) {
            return Ok(google_format.installed);
        }

        // Fallback to direct ApplicationSecret format
        let secret: ApplicationSecret = serde_json::from_str(&secret_json).with_context(|| {
            format!(
                "Failed to parse client secret JSON from {:?}. Expected the Google Cloud \
                Console format with 'installed' wrapper or a direct ApplicationSecret.",
                secret_path
            )
        })?;

        Ok(secret)
    }
}
