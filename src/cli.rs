//! Command line interface for the `classicwire` probe binary.
//!
//! Connects to a server, runs the tick loop for a while and prints what was
//! negotiated. Also used by the build script to render the man page.

use std::time::Duration;

use clap::Parser;

/// Command line arguments for the `classicwire` binary.
#[derive(Debug, Parser)]
#[command(
    name = "classicwire",
    version,
    about = "Connect to a classic server and report what it negotiates"
)]
pub struct Cli {
    /// Server host name or address.
    pub host: String,

    /// Server port.
    #[arg(short, long, default_value_t = 25565)]
    pub port: u16,

    /// Player name sent at login.
    #[arg(short, long, default_value = "Probe")]
    pub username: String,

    /// Verification key sent at login.
    #[arg(short, long, default_value = "")]
    pub mppass: String,

    /// Seconds to stay connected.
    #[arg(short, long, default_value_t = 10)]
    pub duration: u64,

    /// Do not advertise extension support.
    #[arg(long)]
    pub vanilla: bool,
}

impl Cli {
    /// Time to stay connected.
    #[must_use]
    pub fn duration(&self) -> Duration { Duration::from_secs(self.duration) }
}
