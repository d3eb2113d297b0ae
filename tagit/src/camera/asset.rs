//! Reachability check for the tracking engine's marker asset.
//!
//! A plain HTTP GET. Any network failure or non-2xx status is a deployment
//! problem surfaced to the user; it is never retried automatically.

use std::time::Duration;

use tracing::debug;

use crate::error::ScanError;
use crate::BoxFuture;

/// Default timeout for the reachability GET.
pub const DEFAULT_ASSET_TIMEOUT_SECS: u64 = 10;

/// Trait for asset reachability checks.
///
/// This abstraction allows the camera manager to be tested without network
/// access.
pub trait AssetProbe: Send + Sync {
    /// Check that `url` can be fetched.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::AssetUnreachable`] on network failure or a
    /// non-2xx response.
    fn check<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<(), ScanError>>;
}

/// Real asset probe using reqwest.
pub struct ReqwestAssetProbe {
    client: reqwest::Client,
}

impl ReqwestAssetProbe {
    /// Creates a probe with a custom timeout.
    pub fn with_timeout(timeout_secs: u64) -> Result<Self, ScanError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ScanError::AssetUnreachable {
                url: String::new(),
                reason: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self { client })
    }
}

impl AssetProbe for ReqwestAssetProbe {
    fn check<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<(), ScanError>> {
        Box::pin(async move {
            let fail = |reason: String| ScanError::AssetUnreachable {
                url: url.to_string(),
                reason,
            };

            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| fail(format!("request failed: {}", e)))?;

            let status = response.status();
            debug!(url, status = status.as_u16(), "Asset reachability check");

            if !status.is_success() {
                return Err(fail(format!("HTTP {}", status)));
            }
            Ok(())
        })
    }
}

/// Join the configured asset base with a level's asset path.
///
/// An empty base leaves the path untouched; absolute URLs in `path` win.
pub fn asset_url(base: &str, path: &str) -> String {
    if base.is_empty() || path.contains("://") {
        return path.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_url_joins_single_slash() {
        assert_eq!(
            asset_url("https://cards.example.org/", "/level-1.mind"),
            "https://cards.example.org/level-1.mind"
        );
        assert_eq!(
            asset_url("https://cards.example.org/assets", "level-2.mind"),
            "https://cards.example.org/assets/level-2.mind"
        );
    }

    #[test]
    fn test_asset_url_passthrough() {
        assert_eq!(asset_url("", "level-1.mind"), "level-1.mind");
        assert_eq!(
            asset_url("https://a.example", "https://b.example/x.mind"),
            "https://b.example/x.mind"
        );
    }

    #[test]
    fn test_reqwest_probe_builds() {
        assert!(ReqwestAssetProbe::with_timeout(1).is_ok());
    }
}
