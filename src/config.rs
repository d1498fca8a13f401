use std::env;
use std::fmt::Display;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use dotenvy::dotenv;

use crate::attendance::{AbsenceMode, LateCutoff};

#[derive(Clone)]
pub struct Config {
    pub server_addr: String,
    /// `mysql://...`, or `memory:` for a throwaway in-process store.
    pub database_url: String,
    pub jwt_secret: String,
    pub access_token_ttl: usize,

    // Fixed administrator credential pair
    pub admin_username: String,
    pub admin_password: String,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,

    // Attendance rules
    pub late_cutoff: LateCutoff,
    pub absence_mode: AbsenceMode,

    pub employee_cache_ttl: u64,
    pub log_dir: String,
}

type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

fn required(lookup: Lookup, key: &str) -> Result<String> {
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .with_context(|| format!("{key} must be set"))
}

fn parsed<T>(lookup: Lookup, key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = lookup(key).unwrap_or_else(|| default.to_string());
    raw.trim()
        .parse()
        .map_err(|e| anyhow!("invalid {key} value `{raw}`: {e}"))
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(&|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: Lookup) -> Result<Self> {
        // No default cutoff: the deployment has to state it.
        let late_cutoff = required(lookup, "LATE_CUTOFF")?
            .parse::<LateCutoff>()
            .map_err(|e| anyhow!("invalid LATE_CUTOFF: {e}"))?;

        Ok(Self {
            server_addr: required(lookup, "SERVER_ADDR")?,
            database_url: required(lookup, "DATABASE_URL")?,
            jwt_secret: required(lookup, "JWT_SECRET")?,
            access_token_ttl: parsed(lookup, "ACCESS_TOKEN_TTL", "86400")?, // default 24h

            admin_username: required(lookup, "ADMIN_USERNAME")?,
            admin_password: required(lookup, "ADMIN_PASSWORD")?,

            rate_login_per_min: parsed(lookup, "RATE_LOGIN_PER_MIN", "60")?,
            rate_protected_per_min: parsed(lookup, "RATE_PROTECTED_PER_MIN", "1000")?,

            api_prefix: lookup("API_PREFIX").unwrap_or_else(|| "/api".to_string()),

            late_cutoff,
            absence_mode: parsed(lookup, "ABSENCE_MODE", "delete")?,

            employee_cache_ttl: parsed(lookup, "EMPLOYEE_CACHE_TTL", "3600")?,
            log_dir: lookup("LOG_DIR").unwrap_or_else(|| "logs".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("SERVER_ADDR", "127.0.0.1:8080"),
            ("DATABASE_URL", "memory:"),
            ("JWT_SECRET", "secret"),
            ("ADMIN_USERNAME", "admin@academy.com"),
            ("ADMIN_PASSWORD", "0786"),
            ("LATE_CUTOFF", "10:00"),
        ])
    }

    fn load(vars: &HashMap<&'static str, &'static str>) -> Result<Config> {
        Config::from_lookup(&|key| vars.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn defaults_fill_optional_values() {
        let config = load(&base()).unwrap();
        assert_eq!(config.access_token_ttl, 86400);
        assert_eq!(config.api_prefix, "/api");
        assert_eq!(config.absence_mode, AbsenceMode::Delete);
        assert_eq!(config.late_cutoff.to_string(), "10:00");
        assert_eq!(config.log_dir, "logs");
    }

    #[test]
    fn cutoff_is_required() {
        let mut vars = base();
        vars.remove("LATE_CUTOFF");
        let err = load(&vars).err().unwrap();
        assert!(err.to_string().contains("LATE_CUTOFF"));
    }

    #[test]
    fn bad_values_name_the_variable() {
        let mut vars = base();
        vars.insert("ABSENCE_MODE", "archive");
        assert!(load(&vars).err().unwrap().to_string().contains("ABSENCE_MODE"));

        let mut vars = base();
        vars.insert("LATE_CUTOFF", "quarter past nine");
        assert!(load(&vars).err().unwrap().to_string().contains("LATE_CUTOFF"));

        let mut vars = base();
        vars.insert("RATE_LOGIN_PER_MIN", "lots");
        assert!(load(&vars).err().unwrap().to_string().contains("RATE_LOGIN_PER_MIN"));
    }

    #[test]
    fn flag_mode_parses() {
        let mut vars = base();
        vars.insert("ABSENCE_MODE", "flag");
        assert_eq!(load(&vars).unwrap().absence_mode, AbsenceMode::Flag);
    }
}
