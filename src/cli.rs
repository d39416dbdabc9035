use clap::Parser;

use crate::config::Profile;

/// Bundle ESLint into an embeddable initializer and build the host binary
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Build the host binary with the release profile (default: debug)
    #[arg(long, default_value_t = false)]
    pub release: bool,
}

impl Cli {
    pub fn profile(&self) -> Profile {
        Profile::from_release_flag(self.release)
    }
}
