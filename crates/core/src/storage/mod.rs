//! SQLite storage for analyzed games, so a batch can resume where it stopped

mod db;
mod models;

pub use db::Database;
pub use models::*;
