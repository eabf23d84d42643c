//! Startup configuration.
//!
//! Everything the server needs is parsed once in `main` and handed to
//! [`crate::state::AppState`]; nothing is read from globals afterwards.

use clap::{Args, Parser};
use std::path::PathBuf;

pub const USERS_FILE: &str = "users.json";
pub const ITEMS_FILE: &str = "items.json";
pub const CLI_SESSION_FILE: &str = ".session";

/// Where the JSON stores and uploaded images live. Shared by the server and
/// the `wardrobe` CLI so both operate on the same wardrobe.
#[derive(Debug, Clone, Args)]
pub struct StoragePaths {
    /// Directory holding users.json and items.json
    #[arg(long, env = "WARDROBE_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Directory uploaded images are written to
    #[arg(long, env = "WARDROBE_UPLOAD_DIR", default_value = "static/uploads")]
    pub upload_dir: PathBuf,
}

impl StoragePaths {
    pub fn users_file(&self) -> PathBuf {
        self.data_dir.join(USERS_FILE)
    }

    pub fn items_file(&self) -> PathBuf {
        self.data_dir.join(ITEMS_FILE)
    }

    pub fn cli_session_file(&self) -> PathBuf {
        self.data_dir.join(CLI_SESSION_FILE)
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "server")]
#[command(about = "Wardrobe catalog and outfit randomizer web service", long_about = None)]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "WARDROBE_BIND", default_value = "127.0.0.1:3000")]
    pub bind: String,

    #[command(flatten)]
    pub storage: StoragePaths,

    /// bcrypt work factor for new password hashes
    #[arg(long, env = "WARDROBE_BCRYPT_COST", default_value_t = bcrypt::DEFAULT_COST)]
    pub bcrypt_cost: u32,

    /// Largest accepted request body, in bytes
    #[arg(long, env = "WARDROBE_MAX_UPLOAD_BYTES", default_value_t = 10 * 1024 * 1024)]
    pub max_upload_bytes: usize,

    /// Mark the session cookie Secure (serve over HTTPS)
    #[arg(long, env = "WARDROBE_SECURE_COOKIES")]
    pub secure_cookies: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_arguments() {
        let cfg = ServerConfig::try_parse_from(["server"]).unwrap();
        assert_eq!(cfg.bind, "127.0.0.1:3000");
        assert_eq!(cfg.storage.data_dir, PathBuf::from("data"));
        assert_eq!(cfg.bcrypt_cost, bcrypt::DEFAULT_COST);
        assert!(!cfg.secure_cookies);
    }

    #[test]
    fn store_files_live_in_data_dir() {
        let cfg = ServerConfig::try_parse_from([
            "server",
            "--data-dir",
            "/tmp/wardrobe",
            "--upload-dir",
            "/tmp/wardrobe/img",
        ])
        .unwrap();
        assert_eq!(
            cfg.storage.users_file(),
            PathBuf::from("/tmp/wardrobe/users.json")
        );
        assert_eq!(
            cfg.storage.items_file(),
            PathBuf::from("/tmp/wardrobe/items.json")
        );
        assert_eq!(cfg.storage.upload_dir, PathBuf::from("/tmp/wardrobe/img"));
    }
}
