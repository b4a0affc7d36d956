use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use lumpy_core::FetchConfig;

use crate::ServeOptions;

/// Save web articles and read them later
#[derive(Parser, Debug, Clone)]
#[command(name = "lumpy-server", version, about, long_about = None)]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "LUMPY_BIND", default_value = "127.0.0.1:4001", value_name = "ADDR")]
    pub bind: SocketAddr,

    /// PostgreSQL connection string; articles are kept in memory when unset
    #[arg(long, env = "DATABASE_URL", value_name = "URL", hide_env_values = true)]
    pub database_url: Option<String>,

    /// Timeout for fetching an article, in seconds
    #[arg(long, env = "LUMPY_FETCH_TIMEOUT", default_value_t = 10, value_name = "SECS")]
    pub fetch_timeout: u64,

    /// Timeout for a whole API request, in seconds
    #[arg(long, env = "LUMPY_REQUEST_TIMEOUT", default_value_t = 30, value_name = "SECS")]
    pub request_timeout: u64,

    /// Directory of static files (the reader UI) served outside `/api`
    #[arg(long, env = "LUMPY_STATIC_DIR", value_name = "DIR")]
    pub static_dir: Option<PathBuf>,
}

impl Config {
    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig { timeout: self.fetch_timeout, ..Default::default() }
    }

    pub fn serve_options(&self) -> ServeOptions {
        ServeOptions {
            request_timeout: Duration::from_secs(self.request_timeout),
            static_dir: self.static_dir.clone(),
        }
    }
}
