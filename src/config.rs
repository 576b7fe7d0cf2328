//! Configuration from the environment

use std::env::var;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use anyhow::Result;

use crate::notes::DEFAULT_MAX_NOTE_SIZE;

const DEFAULT_ADDRESS: &str = "0.0.0.0:3000";
const DEFAULT_STORE_TIMEOUT_SECONDS: u64 = 10;

/// Runtime configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Ceiling for contents and file of a note combined, in bytes
    pub max_note_size: usize,

    /// Deadline for every single store call
    pub store_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_note_size: DEFAULT_MAX_NOTE_SIZE,
            store_timeout: Duration::from_secs(DEFAULT_STORE_TIMEOUT_SECONDS),
        }
    }
}

impl Config {
    /// Read the configuration from the environment
    ///
    /// - `MAX_NOTE_SIZE`: in bytes
    /// - `STORE_TIMEOUT`: in seconds
    ///
    /// # Errors
    ///
    /// Will return `Err` when a value is set but can not be parsed
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let max_note_size = match env_var("MAX_NOTE_SIZE") {
            Some(value) => value
                .parse::<usize>()
                .context("`MAX_NOTE_SIZE` should be a number of bytes")?,
            None => defaults.max_note_size,
        };

        let store_timeout = match env_var("STORE_TIMEOUT") {
            Some(value) => value
                .parse::<u64>()
                .map(Duration::from_secs)
                .context("`STORE_TIMEOUT` should be a number of seconds")?,
            None => defaults.store_timeout,
        };

        Ok(Self {
            max_note_size,
            store_timeout,
        })
    }
}

/// Address to listen on
///
/// `ADDRESS` for the full address, `PORT` to only override the port
///
/// # Errors
///
/// Will return `Err` when either is set but invalid
pub fn address() -> Result<SocketAddr> {
    let mut address = env_var("ADDRESS")
        .unwrap_or_else(|| String::from(DEFAULT_ADDRESS))
        .parse::<SocketAddr>()
        .context("`ADDRESS` should be a socket address")?;

    if let Some(port) = env_var("PORT") {
        let port = port.parse::<u16>().context("`PORT` should be a port number")?;

        address.set_port(port);
    }

    Ok(address)
}

/// Get the value of ENV var
///
/// Only when:
/// - It is set
/// - It is not empty
fn env_var(var_name: &'static str) -> Option<String> {
    var(var_name).ok().filter(|value| !value.is_empty())
}
