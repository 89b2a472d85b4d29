//! Process configuration, read once from the environment at startup.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use anyhow::Context;

use shopfront_auth::AccessRules;

const DEV_JWT_SECRET: &str = "dev-secret";
const IMAGES_SUBDIR: &str = "images";

#[derive(Clone)]
pub struct AppConfig {
    pub port: u16,
    /// JSON document backing the store.
    pub db_path: PathBuf,
    /// Served as static files at the root of the site.
    pub static_dir: PathBuf,
    /// Where uploaded images are written.
    pub images_dir: PathBuf,
    /// Largest accepted request body, uploads included.
    pub max_body_bytes: usize,
    pub jwt_secret: String,
    pub access_rules: AccessRules,
}

impl AppConfig {
    pub const DEFAULT_PORT: u16 = 4000;
    pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source (the environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("PORT must be a port number, got '{raw}'"))?,
            None => Self::DEFAULT_PORT,
        };

        let access_rules = match lookup("ACCESS_RULES") {
            Some(raw) => raw.parse().context("invalid ACCESS_RULES")?,
            None => AccessRules::default(),
        };

        let max_body_bytes = match lookup("MAX_BODY_BYTES") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("MAX_BODY_BYTES must be a byte count, got '{raw}'"))?,
            None => Self::DEFAULT_MAX_BODY_BYTES,
        };

        let static_dir = lookup("STATIC_DIR").map_or_else(|| PathBuf::from("public"), PathBuf::from);
        let images_dir =
            lookup("IMAGES_DIR").map_or_else(|| static_dir.join(IMAGES_SUBDIR), PathBuf::from);

        let jwt_secret = lookup("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            DEV_JWT_SECRET.to_string()
        });

        Ok(Self {
            port,
            db_path: lookup("DB_PATH").map_or_else(|| PathBuf::from("db.json"), PathBuf::from),
            static_dir,
            images_dir,
            max_body_bytes,
            jwt_secret,
            access_rules,
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }
}

impl core::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("db_path", &self.db_path)
            .field("static_dir", &self.static_dir)
            .field("images_dir", &self.images_dir)
            .field("max_body_bytes", &self.max_body_bytes)
            .field("jwt_secret", &"<redacted>")
            .field("access_rules", &self.access_rules.to_string())
            .finish()
    }
}
