//! Contact form relay (`POST /api/contact`).
//!
//! A submission is validated, rendered into an HTML email and handed to a
//! [`Mailer`]. Validation runs in this order and stops at the first failure:
//!
//! 1. `name`, `email` and `message` are all non-empty
//! 2. `email` looks like an address (`x@y.z`)
//! 3. the hidden honeypot field is empty
//! 4. the form was open for at least `min_submission_seconds`, measured from
//!    the client-supplied load `timestamp` (milliseconds since the epoch)
//!
//! Bots get the same "Spam detected." answer for both spam checks; the reason
//! only goes to the log.
//!
//! There is no SMTP client in the crate. [`OutboxMailer`] drops each accepted
//! message into a directory as JSON, for whatever sends mail on the host.

use crate::api::ApiResponse;
use crate::config::ContactConfig;
use chrono::{DateTime, Utc};
use maud::html;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Error, Debug)]
pub enum ContactError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Why a submission was turned away. `Display` is the user-facing message.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Rejection {
    #[error("All fields are required.")]
    MissingFields,
    #[error("Invalid email address.")]
    InvalidEmail,
    #[error("Spam detected.")]
    Honeypot,
    #[error("Spam detected.")]
    TooFast { elapsed_seconds: f64 },
    /// The load timestamp is too far from now to subtract.
    #[error("Spam detected.")]
    ImplausibleTimestamp { loaded_ms: i64 },
}

/// The JSON body posted by the contact form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactSubmission {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
    /// Honeypot: hidden from people, filled in by naive bots.
    #[serde(default)]
    pub hp_field: Option<String>,
    /// When the form was loaded, in milliseconds since the epoch.
    #[serde(default)]
    pub timestamp: Option<i64>,
}

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));

/// Check a submission against the relay's rules.
pub fn validate(
    submission: &ContactSubmission,
    now: DateTime<Utc>,
    min_submission_seconds: u64,
) -> Result<(), Rejection> {
    let ContactSubmission {
        name,
        email,
        message,
        hp_field,
        timestamp,
    } = submission;

    if name.trim().is_empty() || email.trim().is_empty() || message.trim().is_empty() {
        return Err(Rejection::MissingFields);
    }
    if !EMAIL.is_match(email.trim()) {
        return Err(Rejection::InvalidEmail);
    }
    if hp_field.as_deref().is_some_and(|v| !v.is_empty()) {
        return Err(Rejection::Honeypot);
    }
    // A zero timestamp means the client never set one.
    if let Some(loaded_ms) = timestamp.filter(|&t| t != 0) {
        let elapsed_ms = now
            .timestamp_millis()
            .checked_sub(loaded_ms)
            .ok_or(Rejection::ImplausibleTimestamp { loaded_ms })?;
        let elapsed_seconds = elapsed_ms as f64 / 1000.0;
        if elapsed_seconds < min_submission_seconds as f64 {
            return Err(Rejection::TooFast { elapsed_seconds });
        }
    }
    Ok(())
}

/// An outgoing email.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub reply_to: String,
    pub subject: String,
    pub html: String,
}

impl EmailMessage {
    /// The notification sent to the site owner for a valid submission.
    pub fn for_submission(
        submission: &ContactSubmission,
        config: &ContactConfig,
        site_name: &str,
    ) -> Self {
        Self {
            from: config.from_email.clone(),
            to: config.to_email.clone(),
            reply_to: submission.email.trim().to_string(),
            subject: format!("[{site_name}] New Message from {}", submission.name.trim()),
            html: render_email_html(submission),
        }
    }
}

/// HTML body of the notification. Everything is escaped; line breaks in the
/// message become `<br>`.
pub fn render_email_html(submission: &ContactSubmission) -> String {
    html! {
        p { strong { "Name:" } " " (submission.name) }
        p { strong { "Email:" } " " (submission.email) }
        p { strong { "Message:" } }
        p {
            @for (i, line) in submission.message.lines().enumerate() {
                @if i > 0 { br; }
                (line)
            }
        }
    }
    .into_string()
}

/// Delivers email.
pub trait Mailer {
    fn send(&self, message: &EmailMessage) -> Result<(), ContactError>;
}

/// Writes each message as a JSON file into a directory.
#[derive(Debug, Clone)]
pub struct OutboxMailer {
    dir: PathBuf,
}

static OUTBOX_SEQUENCE: AtomicU64 = AtomicU64::new(0);

impl OutboxMailer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Mailer for OutboxMailer {
    fn send(&self, message: &EmailMessage) -> Result<(), ContactError> {
        fs::create_dir_all(&self.dir)?;
        let sequence = OUTBOX_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        let name = format!(
            "{}-{}-{sequence}.json",
            Utc::now().format("%Y%m%dT%H%M%S%.6f"),
            std::process::id()
        );
        let path = self.dir.join(name);
        let mut file = OpenOptions::new().write(true).create_new(true).open(&path)?;
        file.write_all(serde_json::to_string_pretty(message)?.as_bytes())?;
        info!(path = %path.display(), "queued contact message");
        Ok(())
    }
}

/// `POST /api/contact`.
pub fn contact_endpoint(
    body: &str,
    now: DateTime<Utc>,
    config: &ContactConfig,
    site_name: &str,
    mailer: &dyn Mailer,
) -> ApiResponse {
    let submission: ContactSubmission = match serde_json::from_str(body) {
        Ok(submission) => submission,
        Err(e) => {
            warn!(error = %e, "unreadable contact submission");
            return ApiResponse::with_status(400, json!({ "message": "Invalid request body." }));
        }
    };

    if let Err(rejection) = validate(&submission, now, config.min_submission_seconds) {
        match &rejection {
            Rejection::Honeypot => warn!("honeypot triggered, bot detected"),
            Rejection::TooFast { elapsed_seconds } => {
                warn!(elapsed_seconds, "submission too fast, likely a bot")
            }
            Rejection::ImplausibleTimestamp { loaded_ms } => {
                warn!(loaded_ms, "implausible form timestamp, likely a bot")
            }
            _ => {}
        }
        return ApiResponse::with_status(400, json!({ "message": rejection.to_string() }));
    }

    let message = EmailMessage::for_submission(&submission, config, site_name);
    match mailer.send(&message) {
        Ok(()) => ApiResponse::ok(json!({ "message": "Message sent successfully!" })),
        Err(e) => {
            error!(error = %e, "error sending email");
            ApiResponse::with_status(500, json!({ "message": "Failed to send message." }))
        }
    }
}
