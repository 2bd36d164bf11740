//! Best-effort mail notifications for feedback.
//!
//! Sending never fails a request: errors are logged and reported as
//! "not sent". The SMTP transport is built from an explicit [`MailConfig`].

use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use super::Feedback;
use crate::config::MailConfig;
use crate::library::IconError;
use crate::log;
use crate::utils::date::DateTimeUtc;

/// A plaintext mail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Something that can deliver a [`Mail`].
pub trait Mailer: Send + Sync {
    fn send(&self, mail: &Mail) -> Result<(), IconError>;
}

/// STARTTLS SMTP relay with username/password login.
pub struct SmtpMailer {
    config: MailConfig,
}

impl SmtpMailer {
    pub fn new(config: MailConfig) -> Self {
        Self { config }
    }
}

fn mail_err(err: impl std::fmt::Display) -> IconError {
    IconError::Mail(err.to_string())
}

impl Mailer for SmtpMailer {
    fn send(&self, mail: &Mail) -> Result<(), IconError> {
        let config = &self.config;
        let from: Mailbox = config.from.parse().map_err(mail_err)?;
        let to: Mailbox = mail.to.parse().map_err(mail_err)?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(&mail.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(mail.body.clone())
            .map_err(mail_err)?;

        let transport = SmtpTransport::starttls_relay(&config.smtp_server)
            .map_err(mail_err)?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        transport.send(&message).map_err(mail_err)?;
        Ok(())
    }
}

/// Sends feedback mails when mail is configured, and does nothing otherwise.
pub struct Notifier {
    mailer: Option<Box<dyn Mailer>>,
    admin: String,
}

impl Notifier {
    /// SMTP notifier, or a silent one when the config is disabled or incomplete.
    pub fn from_config(config: &MailConfig) -> Self {
        let mailer = config
            .is_usable()
            .then(|| Box::new(SmtpMailer::new(config.clone())) as Box<dyn Mailer>);
        if mailer.is_none() {
            crate::debug!("mail"; "notifications disabled or configuration incomplete");
        }
        Self {
            mailer,
            admin: config.to.clone(),
        }
    }

    #[cfg(test)]
    pub fn with_mailer(mailer: Box<dyn Mailer>, admin: impl Into<String>) -> Self {
        Self {
            mailer: Some(mailer),
            admin: admin.into(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.mailer.is_some()
    }

    fn deliver(&self, mail: Mail) -> bool {
        let Some(mailer) = &self.mailer else {
            return false;
        };
        match mailer.send(&mail) {
            Ok(()) => {
                log!("mail"; "sent \"{}\" to {}", mail.subject, mail.to);
                true
            }
            Err(err) => {
                log!("mail"; "failed to send \"{}\": {}", mail.subject, err.message());
                false
            }
        }
    }

    /// Tell the admin about a new submission.
    pub fn feedback_received(&self, feedback: &Feedback, now: DateTimeUtc) -> bool {
        let from = feedback.email.as_deref().unwrap_or("anonymous");
        self.deliver(Mail {
            to: self.admin.clone(),
            subject: format!(
                "New Feedback Submission - {} (ID: {})",
                feedback.kind, feedback.id
            ),
            body: format!(
                "New feedback has been submitted to the Icon Manager application.\n\n\
                 Feedback Details:\n\
                 - ID: {}\n\
                 - Type: {}\n\
                 - From: {}\n\
                 - Timestamp: {}\n\
                 - Message: {}\n\n\
                 You can view and manage this feedback through the admin interface.\n",
                feedback.id,
                feedback.kind,
                from,
                now.to_display(),
                feedback.message
            ),
        })
    }

    /// Mail a response to the submitter. `false` when there is no address.
    pub fn feedback_response(&self, feedback: &Feedback, response: &str) -> bool {
        let Some(to) = &feedback.email else {
            return false;
        };
        self.deliver(Mail {
            to: to.clone(),
            subject: format!("Re: your {} feedback (ID: {})", feedback.kind, feedback.id),
            body: format!(
                "{}\n\n---\nYou wrote:\n{}\n",
                response.trim(),
                feedback.message
            ),
        })
    }
}
