//! chess.com API client and archive types

mod client;
mod types;

pub use client::{ChessComClient, DownloadedMonth};
pub use types::*;
