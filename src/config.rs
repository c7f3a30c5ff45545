//! Server configuration from environment variables, overridden by CLI flags.
//!
//! | flag                     | env                         | default                 |
//! |--------------------------|-----------------------------|-------------------------|
//! | `--http-port N`          | `STUDYNEST_HTTP_PORT`, `PORT` | 5000                  |
//! | `--secret S`             | `ACCESS_TOKEN_SECRET`       | required                |
//! | `--production [bool]`    | `STUDYNEST_PRODUCTION`      | false                   |
//! | `--allowed-origin URL`   | `STUDYNEST_ALLOWED_ORIGINS` | `http://localhost:5173` |
//! | `--data-file PATH`       | `STUDYNEST_DATA_FILE`       | none (memory only)      |

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{bail, Result};

pub const DEFAULT_HTTP_PORT: u16 = 5000;
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:5173";

pub const USAGE: &str = "studyNest Server\n\nUSAGE:\n  studynest [--http-port N] [--secret S] [--production [bool]] [--allowed-origin URL]... [--data-file PATH]\n\nOPTIONS:\n  --http-port N         HTTP port (env: STUDYNEST_HTTP_PORT or PORT, default 5000)\n  --secret S            Session signing secret (env: ACCESS_TOKEN_SECRET, required)\n  --production [bool]   Production cookies: Secure, SameSite=None (env: STUDYNEST_PRODUCTION)\n  --allowed-origin URL  CORS origin allowed with credentials; repeatable (env: STUDYNEST_ALLOWED_ORIGINS, comma separated)\n  --data-file PATH      Persist documents to a JSON snapshot (env: STUDYNEST_DATA_FILE)\n";

#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub http_port: u16,
    pub token_secret: String,
    pub production: bool,
    pub allowed_origins: Vec<String>,
    pub data_file: Option<PathBuf>,
}

// Keep the secret out of logs
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("http_port", &self.http_port)
            .field("token_secret", &"<redacted>")
            .field("production", &self.production)
            .field("allowed_origins", &self.allowed_origins)
            .field("data_file", &self.data_file)
            .finish()
    }
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn arg_value(args: &[String], flag: &str) -> Option<String> {
    let i = args.iter().position(|a| a == flag)?;
    args.get(i + 1).filter(|v| !v.starts_with("--")).cloned()
}

fn arg_values(args: &[String], flag: &str) -> Vec<String> {
    args.windows(2).filter(|w| w[0] == flag).map(|w| w[1].clone()).collect()
}

fn parse_production_arg(args: &[String]) -> Option<bool> {
    let i = args.iter().position(|a| a == "--production")?;
    // Presence enables; an explicit boolean may follow
    match args.get(i + 1) {
        Some(next) if !next.starts_with('-') => Some(parse_bool(next).unwrap_or(true)),
        _ => Some(true),
    }
}

fn split_origins(s: &str) -> Vec<String> {
    s.split(',').map(|o| o.trim()).filter(|o| !o.is_empty()).map(|o| o.to_string()).collect()
}

pub fn wants_help(args: &[String]) -> bool { args.iter().any(|a| a == "--help" || a == "-h") }

impl Config {
    /// Build from the process environment and command line.
    pub fn from_env_and_args() -> Result<Self> {
        let env: HashMap<String, String> = std::env::vars().collect();
        let args: Vec<String> = std::env::args().collect();
        Self::from_sources(&env, &args)
    }

    /// Build from explicit sources. CLI arguments override environment values.
    pub fn from_sources(env: &HashMap<String, String>, args: &[String]) -> Result<Self> {
        let port_text = arg_value(args, "--http-port")
            .or_else(|| env.get("STUDYNEST_HTTP_PORT").cloned())
            .or_else(|| env.get("PORT").cloned());
        let http_port = match port_text {
            Some(p) => match p.parse::<u16>() {
                Ok(port) => port,
                Err(_) => bail!("invalid HTTP port: {p:?}"),
            },
            None => DEFAULT_HTTP_PORT,
        };

        let token_secret = arg_value(args, "--secret")
            .or_else(|| env.get("ACCESS_TOKEN_SECRET").cloned())
            .unwrap_or_default();
        if token_secret.trim().is_empty() {
            bail!("a session signing secret is required (ACCESS_TOKEN_SECRET or --secret)");
        }

        let production = parse_production_arg(args)
            .or_else(|| env.get("STUDYNEST_PRODUCTION").and_then(|v| parse_bool(v)))
            .unwrap_or(false);

        let mut allowed_origins = arg_values(args, "--allowed-origin");
        if allowed_origins.is_empty() {
            allowed_origins = env.get("STUDYNEST_ALLOWED_ORIGINS").map(|s| split_origins(s)).unwrap_or_default();
        }
        if allowed_origins.is_empty() {
            allowed_origins.push(DEFAULT_ALLOWED_ORIGIN.to_string());
        }

        let data_file = arg_value(args, "--data-file")
            .or_else(|| env.get("STUDYNEST_DATA_FILE").cloned())
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self { http_port, token_secret, production, allowed_origins, data_file })
    }
}
