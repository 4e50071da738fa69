use std::net::IpAddr;
use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(version, name = "guardpost")]
pub struct Args {
    #[arg(long, value_name = "ADDR", default_value = "127.0.0.1")]
    pub host: IpAddr,
    #[arg(short('p'), long, value_name = "PORT", default_value_t = 3000)]
    pub api_port: u16,
    /// Defaults to the platform data directory
    #[arg(long, value_name = "PATH")]
    pub data_dir: Option<PathBuf>,
    /// Defaults to 'user_rules.txt' inside the data directory
    #[arg(long, value_name = "PATH")]
    pub rules_path: Option<PathBuf>,
    #[arg(long, default_value_t = false)]
    pub disable_filtering: bool,
    #[arg(long, default_value_t = false)]
    pub disable_querylog: bool,
    #[arg(long, value_name = "HOURS", default_value_t = 24 * 7, value_parser = clap::value_parser!(u32).range(1..=24 * 365))]
    pub querylog_retention_hours: u32,
    #[arg(long, default_value_t = false)]
    pub anonymize_clients: bool,
}
