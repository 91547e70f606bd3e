use std::{net::SocketAddr, str::FromStr};

use anyhow::Context;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub addr: SocketAddr,
    pub session_idle_minutes: i64,
    pub admin_users: Vec<String>,
    pub password_memory_kib: u32,
    pub password_iterations: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            session_idle_minutes: 30,
            admin_users: Vec::new(),
            password_memory_kib: argon2::Params::DEFAULT_M_COST,
            password_iterations: argon2::Params::DEFAULT_T_COST,
        }
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(value) => value.trim().parse().with_context(|| format!("{key}={value:?}")),
        None => Ok(default),
    }
}

impl Config {
    /// Reads the process environment, after loading `.env` if there is one.
    pub fn from_env() -> anyhow::Result<Config> {
        dotenv::dotenv().ok();
        Config::from_lookup(|key| dotenv::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Config> {
        let default = Config::default();
        let admin_users = lookup("ADMIN_USERS")
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default();

        let config = Config {
            addr: parse_var(&lookup, "SKILLSPROUT_ADDR", default.addr)?,
            session_idle_minutes: parse_var(&lookup, "SESSION_IDLE_MINUTES", default.session_idle_minutes)?,
            admin_users,
            password_memory_kib: parse_var(&lookup, "PASSWORD_MEMORY_KIB", default.password_memory_kib)?,
            password_iterations: parse_var(&lookup, "PASSWORD_ITERATIONS", default.password_iterations)?,
        };
        anyhow::ensure!(config.session_idle_minutes > 0, "SESSION_IDLE_MINUTES must be positive");
        Ok(config)
    }

    pub fn is_admin(&self, username: &str) -> bool {
        self.admin_users.iter().any(|admin| admin == username)
    }
}
