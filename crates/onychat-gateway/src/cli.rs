use clap::{Parser, Subcommand};

/// Onychat relay gateway.
#[derive(Debug, Parser)]
#[command(name = "onychat-gateway", version, about)]
pub struct Cli {
    /// Path to onychat.toml (overrides ONYCHAT_CONFIG).
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP + WebSocket server (default).
    Serve,
    /// Mint a bearer token for an identity using the configured secret.
    Token {
        identity: String,
        /// Lifetime in seconds; defaults to auth.token_ttl_secs.
        #[arg(long)]
        ttl_secs: Option<u64>,
    },
}
