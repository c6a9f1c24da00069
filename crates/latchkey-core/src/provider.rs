//! Access code provider capability.
//!
//! The provider is the external system that physically issues and revokes
//! door codes. The core consumes it only through [`AccessCodeProvider`];
//! every listed code is guaranteed to carry a window and a label, so
//! callers never probe for partially populated records.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::window::TimeWindow;

/// An access code as listed by the provider.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProviderCode {
    /// The provider's identifier for this code.
    pub access_code_id: String,

    /// The window during which the code is valid.
    #[serde(flatten)]
    pub window: TimeWindow,

    /// Human-readable label recorded on the device's own audit log.
    #[schema(example = "Scheduled access for Ada Lovelace")]
    pub label: String,
}

/// Result of a successful code issuance.
#[derive(Debug, Clone)]
pub struct IssuedCode {
    /// The provider's identifier for the new code.
    pub access_code_id: String,

    /// The secret code itself, echoed back by the provider.
    pub code: String,
}

/// Infrastructure fault from the access code provider.
///
/// The core surfaces these without retrying; retry policy belongs to the
/// caller. A provider-side timeout is indistinguishable from any other
/// request failure at this layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The request could not be completed.
    #[error("access code provider request failed: {0}")]
    RequestFailed(String),

    /// The provider understood but refused the request.
    #[error("access code provider rejected the request: {0}")]
    Rejected(String),

    /// No code with the given identifier exists at the provider.
    #[error("access code not found at provider: {0}")]
    CodeNotFound(String),
}

/// External capability that issues and revokes physical access codes.
#[async_trait]
pub trait AccessCodeProvider: Send + Sync {
    /// List all codes currently issued for a device.
    async fn list_codes(&self, device_id: &str) -> Result<Vec<ProviderCode>, ProviderError>;

    /// Issue `code` on `device_id` for `window`, labelled for traceability.
    async fn issue_code(
        &self,
        device_id: &str,
        window: TimeWindow,
        code: &str,
        label: &str,
    ) -> Result<IssuedCode, ProviderError>;

    /// Revoke a previously issued code.
    async fn revoke_code(&self, access_code_id: &str) -> Result<(), ProviderError>;
}

#[cfg(feature = "memory-provider")]
pub use memory::MemoryProvider;

#[cfg(feature = "memory-provider")]
mod memory {
    use std::sync::atomic::{AtomicBool, Ordering};

    use dashmap::DashMap;
    use uuid::Uuid;

    use super::{AccessCodeProvider, IssuedCode, ProviderCode, ProviderError};
    use crate::window::TimeWindow;
    use async_trait::async_trait;

    #[derive(Debug, Clone)]
    struct StoredCode {
        access_code_id: String,
        code: String,
        window: TimeWindow,
        label: String,
    }

    /// In-memory provider for standalone deployments and tests.
    ///
    /// Stores issued codes per device and supports failure injection so
    /// orchestrator error paths can be exercised without a real vendor.
    #[derive(Debug, Default)]
    pub struct MemoryProvider {
        codes: DashMap<String, Vec<StoredCode>>,
        fail_issue: AtomicBool,
        fail_revoke: AtomicBool,
    }

    impl MemoryProvider {
        /// Create an empty provider.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Make subsequent `issue_code` calls fail.
        pub fn fail_next_issues(&self, fail: bool) {
            self.fail_issue.store(fail, Ordering::SeqCst);
        }

        /// Make subsequent `revoke_code` calls fail.
        pub fn fail_next_revokes(&self, fail: bool) {
            self.fail_revoke.store(fail, Ordering::SeqCst);
        }

        /// Number of codes currently issued for a device.
        #[must_use]
        pub fn issued_count(&self, device_id: &str) -> usize {
            self.codes.get(device_id).map_or(0, |codes| codes.len())
        }
    }

    #[async_trait]
    impl AccessCodeProvider for MemoryProvider {
        async fn list_codes(&self, device_id: &str) -> Result<Vec<ProviderCode>, ProviderError> {
            let codes = self
                .codes
                .get(device_id)
                .map(|entry| {
                    entry
                        .iter()
                        .map(|stored| ProviderCode {
                            access_code_id: stored.access_code_id.clone(),
                            window: stored.window,
                            label: stored.label.clone(),
                        })
                        .collect()
                })
                .unwrap_or_default();
            Ok(codes)
        }

        async fn issue_code(
            &self,
            device_id: &str,
            window: TimeWindow,
            code: &str,
            label: &str,
        ) -> Result<IssuedCode, ProviderError> {
            if self.fail_issue.load(Ordering::SeqCst) {
                return Err(ProviderError::RequestFailed(
                    "injected issue failure".to_owned(),
                ));
            }

            let stored = StoredCode {
                access_code_id: format!("ac_{}", Uuid::new_v4().simple()),
                code: code.to_owned(),
                window,
                label: label.to_owned(),
            };
            let issued = IssuedCode {
                access_code_id: stored.access_code_id.clone(),
                code: stored.code.clone(),
            };
            self.codes
                .entry(device_id.to_owned())
                .or_default()
                .push(stored);
            Ok(issued)
        }

        async fn revoke_code(&self, access_code_id: &str) -> Result<(), ProviderError> {
            if self.fail_revoke.load(Ordering::SeqCst) {
                return Err(ProviderError::RequestFailed(
                    "injected revoke failure".to_owned(),
                ));
            }

            for mut entry in self.codes.iter_mut() {
                if let Some(index) = entry
                    .iter()
                    .position(|stored| stored.access_code_id == access_code_id)
                {
                    entry.remove(index);
                    return Ok(());
                }
            }
            Err(ProviderError::CodeNotFound(access_code_id.to_owned()))
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use chrono::{TimeZone, Utc};

        fn window(start_h: u32, end_h: u32) -> TimeWindow {
            TimeWindow::new(
                Utc.with_ymd_and_hms(2025, 6, 1, start_h, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2025, 6, 1, end_h, 0, 0).unwrap(),
            )
            .unwrap()
        }

        #[tokio::test]
        async fn test_issue_then_list() {
            let provider = MemoryProvider::new();
            let issued = provider
                .issue_code("device-1", window(10, 12), "123456", "Scheduled access for Ada")
                .await
                .unwrap();
            assert_eq!(issued.code, "123456");

            let codes = provider.list_codes("device-1").await.unwrap();
            assert_eq!(codes.len(), 1);
            assert_eq!(codes[0].access_code_id, issued.access_code_id);
            assert_eq!(codes[0].label, "Scheduled access for Ada");
        }

        #[tokio::test]
        async fn test_list_unknown_device_is_empty() {
            let provider = MemoryProvider::new();
            assert!(provider.list_codes("nope").await.unwrap().is_empty());
        }

        #[tokio::test]
        async fn test_revoke_removes_code() {
            let provider = MemoryProvider::new();
            let issued = provider
                .issue_code("device-1", window(10, 12), "123456", "label")
                .await
                .unwrap();
            provider.revoke_code(&issued.access_code_id).await.unwrap();
            assert_eq!(provider.issued_count("device-1"), 0);
        }

        #[tokio::test]
        async fn test_revoke_unknown_code() {
            let provider = MemoryProvider::new();
            assert_eq!(
                provider.revoke_code("ac_missing").await,
                Err(ProviderError::CodeNotFound("ac_missing".to_owned()))
            );
        }

        #[tokio::test]
        async fn test_failure_injection() {
            let provider = MemoryProvider::new();
            provider.fail_next_issues(true);
            assert!(provider
                .issue_code("device-1", window(10, 12), "123456", "label")
                .await
                .is_err());
            assert_eq!(provider.issued_count("device-1"), 0);

            provider.fail_next_issues(false);
            assert!(provider
                .issue_code("device-1", window(10, 12), "123456", "label")
                .await
                .is_ok());
        }
    }
}
