//! Configuration section definitions.

mod library;
mod mail;
mod serve;

pub use library::LibraryConfig;
pub use mail::MailConfig;
pub use serve::ServeConfig;
