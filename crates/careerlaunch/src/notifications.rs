//! Outbound notifications.
//!
//! Services publish a [`Notification`] once their mutation is stored. The
//! production publisher pushes onto an unbounded channel drained by a
//! [`NotificationWorker`], so a slow or failing mail channel never blocks or
//! fails the request that produced the message.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use crate::applications::domain::{ApplicationId, ApplicationStatus, InterviewInfo};
use crate::catalog::domain::JobId;
use crate::config::NotificationConfig;
use crate::identity::{UserAccount, UserId};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recipient {
    pub user_id: UserId,
    pub name: String,
    pub email: String,
}

impl From<&UserAccount> for Recipient {
    fn from(account: &UserAccount) -> Self {
        Self {
            user_id: account.id.clone(),
            name: account.name.clone(),
            email: account.email.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobMatch {
    pub job_id: JobId,
    pub title: String,
    pub company: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    ApplicationStatusChanged {
        recipient: Recipient,
        application_id: ApplicationId,
        job_title: String,
        company: Option<String>,
        status: ApplicationStatus,
    },
    InterviewScheduled {
        recipient: Recipient,
        application_id: ApplicationId,
        job_title: String,
        company: Option<String>,
        interview: InterviewInfo,
    },
    JobMatches {
        recipient: Recipient,
        matches: Vec<JobMatch>,
    },
}

impl Notification {
    pub fn recipient(&self) -> &Recipient {
        match self {
            Notification::ApplicationStatusChanged { recipient, .. }
            | Notification::InterviewScheduled { recipient, .. }
            | Notification::JobMatches { recipient, .. } => recipient,
        }
    }

    pub const fn kind(&self) -> &'static str {
        match self {
            Notification::ApplicationStatusChanged { .. } => "application_status_changed",
            Notification::InterviewScheduled { .. } => "interview_scheduled",
            Notification::JobMatches { .. } => "job_matches",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification channel closed")]
    ChannelClosed,
    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// Abstraction over the outbound notification queue.
pub trait NotificationPublisher: Send + Sync {
    fn publish(&self, notification: Notification) -> Result<(), NotificationError>;
}

/// Publish without surfacing failures to the caller.
pub fn notify<N>(publisher: &N, notification: Notification)
where
    N: NotificationPublisher + ?Sized,
{
    let kind = notification.kind();
    if let Err(error) = publisher.publish(notification) {
        tracing::warn!(kind, %error, "failed to queue notification");
    }
}

/// Publisher backed by an unbounded tokio channel.
#[derive(Debug, Clone)]
pub struct ChannelPublisher {
    sender: UnboundedSender<Notification>,
}

impl ChannelPublisher {
    pub fn channel() -> (Self, UnboundedReceiver<Notification>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl NotificationPublisher for ChannelPublisher {
    fn publish(&self, notification: Notification) -> Result<(), NotificationError> {
        self.sender
            .send(notification)
            .map_err(|_| NotificationError::ChannelClosed)
    }
}

/// Rendered message handed to a [`Mailer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl OutboundEmail {
    pub fn render(notification: &Notification, config: &NotificationConfig) -> Self {
        let recipient = notification.recipient();
        let dashboard = format!("{}/dashboard", config.frontend_url.trim_end_matches('/'));

        let (subject, body) = match notification {
            Notification::ApplicationStatusChanged {
                job_title,
                company,
                status,
                ..
            } => (
                format!("Application Update: {}", at_company(job_title, company)),
                format!(
                    "Hi {},\n\nYour application for {} is now {}.\n\nTrack it at {dashboard}",
                    recipient.name,
                    at_company(job_title, company),
                    status.label().replace('_', " "),
                ),
            ),
            Notification::InterviewScheduled {
                job_title,
                company,
                interview,
                ..
            } => {
                let when = interview
                    .scheduled_date
                    .map(|date| date.format("%A, %B %-d, %Y at %H:%M UTC").to_string())
                    .unwrap_or_else(|| "a time to be confirmed".to_string());
                let format = interview
                    .format
                    .map(|format| format.label())
                    .unwrap_or("scheduled");
                (
                    format!("Interview Scheduled: {}", at_company(job_title, company)),
                    format!(
                        "Hi {},\n\nYou have been selected for a {format} interview for {} on {when}.\n\nDetails at {dashboard}",
                        recipient.name,
                        at_company(job_title, company),
                    ),
                )
            }
            Notification::JobMatches { matches, .. } => {
                let lines: Vec<String> = matches
                    .iter()
                    .map(|entry| format!("- {}", at_company(&entry.title, &entry.company)))
                    .collect();
                (
                    format!("New Job Matches Found - {} opportunities", matches.len()),
                    format!(
                        "Hi {},\n\nThese openings match your profile:\n{}\n\nBrowse them at {}/jobs",
                        recipient.name,
                        lines.join("\n"),
                        config.frontend_url.trim_end_matches('/'),
                    ),
                )
            }
        };

        Self {
            from: config.from_address.clone(),
            to: recipient.email.clone(),
            subject,
            body,
        }
    }
}

fn at_company(title: &str, company: &Option<String>) -> String {
    match company {
        Some(company) => format!("{title} at {company}"),
        None => title.to_string(),
    }
}

/// Delivery channel for rendered notifications.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn deliver(&self, email: &OutboundEmail) -> Result<(), NotificationError>;
}

/// Mailer that records deliveries in the log stream.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn deliver(&self, email: &OutboundEmail) -> Result<(), NotificationError> {
        tracing::info!(to = %email.to, subject = %email.subject, "email dispatched");
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerSummary {
    pub delivered: usize,
    pub failed: usize,
}

/// Drains the notification channel until every sender is dropped.
pub struct NotificationWorker<M> {
    receiver: UnboundedReceiver<Notification>,
    mailer: Arc<M>,
    config: NotificationConfig,
}

impl<M> NotificationWorker<M>
where
    M: Mailer + 'static,
{
    pub fn new(
        receiver: UnboundedReceiver<Notification>,
        mailer: Arc<M>,
        config: NotificationConfig,
    ) -> Self {
        Self {
            receiver,
            mailer,
            config,
        }
    }

    pub async fn run(mut self) -> WorkerSummary {
        let mut summary = WorkerSummary::default();
        while let Some(notification) = self.receiver.recv().await {
            let email = OutboundEmail::render(&notification, &self.config);
            match self.mailer.deliver(&email).await {
                Ok(()) => summary.delivered += 1,
                Err(error) => {
                    summary.failed += 1;
                    tracing::warn!(kind = notification.kind(), to = %email.to, %error, "notification delivery failed");
                }
            }
        }
        tracing::debug!(
            delivered = summary.delivered,
            failed = summary.failed,
            "notification worker stopped"
        );
        summary
    }

    pub fn spawn(self) -> JoinHandle<WorkerSummary> {
        tokio::spawn(self.run())
    }
}
