use std::fmt::Display;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use tracing::{info, warn};

const DEFAULT_DB_PATH: &str = ".civic/events.db";
const DEFAULT_PORT: u16 = 4830;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServeConfig {
    pub db_path: String,
    pub bind: IpAddr,
    pub port: u16,
    pub seed_demo: bool,
    pub allowed_origins: Vec<String>,
}

impl ServeConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            db_path: lookup("CIVIC_DB_PATH")
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_DB_PATH.to_string()),
            bind: parse_or(&lookup, "CIVIC_BIND", IpAddr::V4(Ipv4Addr::LOCALHOST)),
            port: parse_or(&lookup, "CIVIC_PORT", DEFAULT_PORT),
            seed_demo: lookup("CIVIC_SEED_DEMO")
                .is_none_or(|value| parse_flag("CIVIC_SEED_DEMO", &value)),
            allowed_origins: lookup("CIVIC_ALLOWED_ORIGINS")
                .map(|value| {
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|origin| !origin.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        }
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    let Some(raw) = lookup(key) else {
        info!("{key} not set, using default: {default}");
        return default;
    };
    raw.trim().parse().unwrap_or_else(|err| {
        warn!("invalid {key} value {raw:?}: {err}; using default: {default}");
        default
    })
}

fn parse_flag(key: &str, value: &str) -> bool {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        other => {
            warn!("invalid {key} value {other:?}; using default: true");
            true
        }
    }
}
