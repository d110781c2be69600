use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "eventgen",
    about = "Emit one JSON event per second on stdout, with a progress line on stderr",
    version = env!("GIT_DESCRIBE"),
    after_help = "Events: {\"eventId\":<n>,\"message\":\"<label> <n>\"} on stdout, \"WROTE <n>\" on stderr.\n\nEvents are one second apart; only interval_ms in a --config file changes that.\n\nStop with Ctrl+C or SIGTERM."
)]
pub struct Cli {
    /// Prefix for every event message (empty when omitted)
    #[arg(allow_hyphen_values = true)]
    pub label: Option<String>,

    /// Path to config file
    #[arg(short, long, help = "Path to eventgen.yaml config file (default: no file, one event per second)")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// The label to stamp into messages; a missing label is the empty string.
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or_default()
    }
}
