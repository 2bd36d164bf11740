//! User feedback: flat-file storage and mail notifications.

pub mod notify;
pub mod store;

pub use notify::{Mail, Mailer, Notifier, SmtpMailer};
pub use store::{Feedback, FeedbackStore, STATUS_NEW};

/// Status set once the submitter has been answered.
pub const STATUS_RESPONDED: &str = "responded";
