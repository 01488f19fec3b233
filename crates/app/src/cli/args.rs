pub use clap::Parser;

use url::Url;

#[derive(Parser, Debug)]
#[command(name = "stowage")]
#[command(about = "Administrative web front end for MinIO clusters")]
pub struct Args {
    /// Admin panel to talk to, for commands that query a running instance
    #[arg(long, global = true, env = "STOWAGE_REMOTE", default_value = "http://localhost:8080")]
    pub remote: Url,

    #[command(subcommand)]
    pub command: crate::Command,
}
