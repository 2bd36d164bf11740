//! `[mail]` section configuration.
//!
//! Outbound SMTP used for feedback notifications. Disabled unless
//! `enabled = true` and every credential is set.
//!
//! # Example
//!
//! ```toml
//! [mail]
//! enabled = true
//! smtp_server = "smtp.gmail.com"
//! smtp_port = 587
//! username = "bot@example.com"
//! password = "app-password"
//! from = "bot@example.com"
//! to = "team@example.com"
//! ```
//!
//! The `EMAIL_*` and `ENABLE_EMAIL_NOTIFICATIONS` environment variables
//! override these values.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub enabled: bool,
    pub smtp_server: String,
    pub smtp_port: u16,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub from: String,
    /// Recipient of new-feedback notifications.
    pub to: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_server: "smtp.gmail.com".into(),
            smtp_port: 587,
            username: String::new(),
            password: String::new(),
            from: String::new(),
            to: String::new(),
        }
    }
}

impl MailConfig {
    /// Enabled with every credential present.
    pub fn is_usable(&self) -> bool {
        self.enabled
            && [&self.username, &self.password, &self.from, &self.to]
                .iter()
                .all(|v| !v.is_empty())
    }
}

// Keep the password out of debug logs.
impl fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailConfig")
            .field("enabled", &self.enabled)
            .field("smtp_server", &self.smtp_server)
            .field("smtp_port", &self.smtp_port)
            .field("username", &self.username)
            .field("from", &self.from)
            .field("to", &self.to)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_mail_defaults() {
        let config = test_parse_config("");
        assert!(!config.mail.enabled);
        assert_eq!(config.mail.smtp_server, "smtp.gmail.com");
        assert_eq!(config.mail.smtp_port, 587);
        assert!(!config.mail.is_usable());
    }

    #[test]
    fn test_mail_requires_all_credentials() {
        let config = test_parse_config(
            "[mail]\nenabled = true\nusername = \"u\"\npassword = \"p\"\nfrom = \"a@b.c\"",
        );
        assert!(!config.mail.is_usable());

        let config = test_parse_config(
            "[mail]\nenabled = true\nusername = \"u\"\npassword = \"p\"\nfrom = \"a@b.c\"\nto = \"d@e.f\"",
        );
        assert!(config.mail.is_usable());
    }

    #[test]
    fn test_mail_debug_hides_password() {
        let config = MailConfig {
            password: "hunter2".into(),
            ..Default::default()
        };
        assert!(!format!("{config:?}").contains("hunter2"));
    }
}
