//! Notification sink capability.
//!
//! The core emits structured notices about issued codes and upcoming
//! expiries; how a sink turns them into email or SMS is its own concern,
//! and delivery success or failure is never observed by the core.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::window::TimeWindow;

/// Where a notice should be delivered.
#[derive(Debug, Clone, Serialize)]
pub struct Contact {
    /// Recipient email address.
    pub email: String,

    /// Recipient phone number, when known.
    pub phone: Option<String>,
}

/// A structured notification record.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    /// An access code was issued for the recipient.
    CodeIssued {
        /// Delivery target.
        contact: Contact,
        /// The secret code.
        code: String,
        /// Validity window.
        window: TimeWindow,
    },

    /// A held access code expires soon.
    ExpiryReminder {
        /// Delivery target.
        contact: Contact,
        /// The secret code.
        code: String,
        /// When the code stops working.
        ends_at: DateTime<Utc>,
    },
}

/// Fire-and-forget delivery of notices.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver a notice. Failures are the sink's business; the core
    /// neither retries nor rolls back on them.
    async fn deliver(&self, notice: Notice);
}

/// Sink that records notices in the log instead of delivering them.
///
/// The secret code is logged only at the sink boundary, never upstream.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    async fn deliver(&self, notice: Notice) {
        match notice {
            Notice::CodeIssued {
                contact, window, ..
            } => {
                info!(
                    recipient = %contact.email,
                    starts_at = %window.start(),
                    ends_at = %window.end(),
                    "access code issued"
                );
            }
            Notice::ExpiryReminder {
                contact, ends_at, ..
            } => {
                info!(
                    recipient = %contact.email,
                    ends_at = %ends_at,
                    "access code expiring soon"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_notice_serializes_with_kind_tag() {
        let window = TimeWindow::new(
            Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
        )
        .unwrap();
        let notice = Notice::CodeIssued {
            contact: Contact {
                email: "ada@example.com".to_owned(),
                phone: None,
            },
            code: "123456".to_owned(),
            window,
        };
        let json = serde_json::to_value(&notice).unwrap();
        assert_eq!(json["kind"], "code_issued");
        assert_eq!(json["contact"]["email"], "ada@example.com");
    }

    #[tokio::test]
    async fn test_log_sink_accepts_notices() {
        let sink = LogSink;
        sink.deliver(Notice::ExpiryReminder {
            contact: Contact {
                email: "ada@example.com".to_owned(),
                phone: Some("+14155550123".to_owned()),
            },
            code: "123456".to_owned(),
            ends_at: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
        })
        .await;
    }
}
