// CLI module for k8cache
// Author: kelexine (https://github.com/kelexine)

use clap::Parser;
use std::path::PathBuf;

/// k8cache - Identity-scoped client cache for multi-cluster Kubernetes proxying
#[derive(Parser, Debug)]
#[command(name = "k8cache", version, about, long_about = None)]
pub struct Args {
    /// Config file to load instead of ~/.k8cache/config.toml
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    pub print_config: bool,
}
