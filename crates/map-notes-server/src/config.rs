use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use map_notes_core::MAX_NOTES;

/// Map Notes server: notes API and the embedded web client
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "MAP_NOTES_BIND", default_value = "0.0.0.0:3000")]
    pub bind: SocketAddr,

    /// JSON snapshot of the note table. Notes are kept in memory only when
    /// unset.
    #[arg(long, env = "MAP_NOTES_DATA_FILE")]
    pub data_file: Option<PathBuf>,

    /// Maximum number of notes returned by `GET /notes`
    #[arg(long, env = "MAP_NOTES_LIST_LIMIT", default_value_t = MAX_NOTES)]
    pub list_limit: usize,
}

impl Config {
    pub fn list_limit(&self) -> usize {
        self.list_limit.clamp(1, MAX_NOTES)
    }
}
