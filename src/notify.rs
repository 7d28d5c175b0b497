//! Report notifications
//!
//! A notifier delivers a short summary of a report, with attachments, to the
//! configured recipients. The bundled implementation posts JSON to a webhook.

use crate::config::NotificationConfig;
use crate::error::ApiError;
use crate::report::Report;
use clap::ValueEnum;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

const NOTIFY_HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const NOTIFY_HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// When to send a notification after change detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotifyMode {
    /// Always notify
    All,
    /// Notify only when the report has diffs
    ErrorOnly,
}

impl NotifyMode {
    pub fn should_notify(self, report: &Report) -> bool {
        match self {
            NotifyMode::All => true,
            NotifyMode::ErrorOnly => report.has_diffs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub send_to: Vec<String>,
    pub subject: String,
    pub body: String,
    pub attachments: Vec<Attachment>,
}

impl Notification {
    /// Summarize `report` for `path`
    pub fn for_report(report: &Report, path: &str, send_to: Vec<String>) -> Self {
        Self {
            send_to,
            subject: subject(report, path),
            body: body(report),
            attachments: Vec::new(),
        }
    }

    pub fn attach(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.attachments.push(Attachment {
            name: name.into(),
            content: content.into(),
        });
        self
    }
}

pub fn subject(report: &Report, path: &str) -> String {
    if report.has_diffs() {
        format!("Changes detected in {}", path)
    } else {
        format!("No changes detected in {}", path)
    }
}

fn body(report: &Report) -> String {
    let mut body = format!(
        "Fixity report for {} created {}\n",
        report.base_path,
        crate::types::format_timestamp(&report.created_at)
    );
    if !report.has_diffs() {
        body.push_str("No changes detected.\n");
        return body;
    }
    for diff in &report.diffs {
        body.push_str(&format!(
            "{}: {} new dirs, {} missing dirs, {} new files, {} missing files, {} fixity mismatches\n",
            diff.logical_path,
            diff.directories_missing_from_baseline.len(),
            diff.directories_missing_from_observed.len(),
            diff.files_missing_from_baseline.len(),
            diff.files_missing_from_observed.len(),
            diff.fixity_mismatch.len(),
        ));
    }
    body
}

pub trait Notifier {
    fn send(&self, notification: &Notification) -> Result<(), ApiError>;
}

/// Posts notifications as JSON to an HTTP endpoint
pub struct WebhookNotifier {
    endpoint: String,
    client: Client,
}

impl WebhookNotifier {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .connect_timeout(NOTIFY_HTTP_CONNECT_TIMEOUT)
            .timeout(NOTIFY_HTTP_REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ApiError::NotificationError(format!("Failed to build client: {}", e)))?;
        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }

    /// Build from configuration; `None` when no endpoint is configured
    pub fn from_config(config: &NotificationConfig) -> Result<Option<Self>, ApiError> {
        match &config.endpoint {
            Some(endpoint) => Self::new(endpoint.clone()).map(Some),
            None => Ok(None),
        }
    }

    async fn post(&self, notification: &Notification) -> Result<(), ApiError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(notification)
            .send()
            .await
            .map_err(map_http_error)?;
        response.error_for_status().map_err(map_http_error)?;
        Ok(())
    }
}

impl Notifier for WebhookNotifier {
    fn send(&self, notification: &Notification) -> Result<(), ApiError> {
        debug!(endpoint = %self.endpoint, subject = %notification.subject, "Sending notification");
        let rt = tokio::runtime::Runtime::new().map_err(|e| {
            ApiError::NotificationError(format!("Failed to create runtime: {}", e))
        })?;
        rt.block_on(self.post(notification))?;
        info!(
            recipients = notification.send_to.len(),
            subject = %notification.subject,
            "Notification sent"
        );
        Ok(())
    }
}

fn map_http_error(error: reqwest::Error) -> ApiError {
    if let Some(status) = error.status() {
        ApiError::NotificationError(format!("Endpoint returned {}: {}", status, error))
    } else if error.is_timeout() {
        ApiError::NotificationError(format!("Request timeout: {}", error))
    } else if error.is_connect() {
        ApiError::NotificationError(format!("Connection error: {}", error))
    } else {
        ApiError::NotificationError(format!("HTTP error: {}", error))
    }
}
