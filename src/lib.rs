//! Slack Thread Archiver library.
//!
//! A tool that resolves a Slack thread permalink, fetches the full reply
//! list, downloads image attachments, renders a markdown transcript, and
//! packs everything into a self-contained local bundle with a zip archive.

pub mod archive;
pub mod bundle;
pub mod config;
pub mod media;
pub mod pipeline;
pub mod render;
pub mod slack;
pub mod source;
