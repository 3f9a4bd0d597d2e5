//! SakhiChat core library — chat widget controller, chat server, and provider client
//! shared by the CLI and desktop applications.

pub mod config;
pub mod init;
pub mod llm;
pub mod protocol;
pub mod server;
pub mod widget;
