//! Slack-facing pieces: permalink resolution, wire types, API client.

mod client;
mod types;
mod url;

pub use self::client::SlackClient;
pub use self::types::{Attachment, Message};
pub use self::url::{InvalidUrlError, ThreadIdentifier, parse_thread_url};
