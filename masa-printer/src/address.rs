//! Printer address forms
//!
//! A printer can be reached three ways:
//! - `tcp://host:port` raw TCP (port 9100 by default)
//! - `\\host\SHARE` Windows shared printer, written like a file
//! - `printer:NAME` local print spooler queue

use crate::error::{PrintError, PrintResult};
use std::fmt;
use std::str::FromStr;

const DEFAULT_PORT: u16 = 9100;

/// One concrete way of reaching a printer
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PrinterAddress {
    Tcp { host: String, port: u16 },
    Share { host: String, share: String },
    Spooler { name: String },
}

impl PrinterAddress {
    pub fn tcp(host: impl Into<String>, port: u16) -> Self {
        PrinterAddress::Tcp {
            host: host.into(),
            port,
        }
    }

    pub fn share(host: impl Into<String>, share: impl Into<String>) -> Self {
        PrinterAddress::Share {
            host: host.into(),
            share: share.into(),
        }
    }

    pub fn spooler(name: impl Into<String>) -> Self {
        PrinterAddress::Spooler { name: name.into() }
    }

    /// Short scheme name for logs and diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            PrinterAddress::Tcp { .. } => "tcp",
            PrinterAddress::Share { .. } => "share",
            PrinterAddress::Spooler { .. } => "spooler",
        }
    }

    /// UNC path of a share address
    pub fn unc_path(&self) -> Option<String> {
        match self {
            PrinterAddress::Share { host, share } => Some(format!(r"\\{}\{}", host, share)),
            _ => None,
        }
    }

    /// Parse an address string
    ///
    /// Accepts `tcp://host[:port]`, `\\host\SHARE` (or `//host/SHARE`),
    /// `printer:NAME`, and a bare `host[:port]` which is read as TCP.
    pub fn parse(input: &str) -> PrintResult<Self> {
        let s = input.trim();
        if s.is_empty() {
            return Err(PrintError::InvalidConfig("empty printer address".into()));
        }

        if let Some(name) = s.strip_prefix("printer:") {
            let name = name.trim();
            if name.is_empty() {
                return Err(PrintError::InvalidConfig(format!(
                    "missing spooler name: {}",
                    input
                )));
            }
            return Ok(Self::spooler(name));
        }

        if let Some(rest) = s.strip_prefix(r"\\").or_else(|| s.strip_prefix("//")) {
            let (host, share) = rest
                .split_once(['\\', '/'])
                .ok_or_else(|| PrintError::InvalidConfig(format!("missing share: {}", input)))?;
            if host.is_empty() || share.is_empty() {
                return Err(PrintError::InvalidConfig(format!(
                    "invalid share path: {}",
                    input
                )));
            }
            return Ok(Self::share(host, share));
        }

        let hostport = s.strip_prefix("tcp://").unwrap_or(s);
        let (host, port) = match hostport.rsplit_once(':') {
            Some((host, port)) => {
                let port = port
                    .parse::<u16>()
                    .map_err(|_| PrintError::InvalidConfig(format!("invalid port: {}", input)))?;
                (host, port)
            }
            None => (hostport, DEFAULT_PORT),
        };
        if host.is_empty() || host.contains(['/', '\\']) {
            return Err(PrintError::InvalidConfig(format!(
                "invalid host: {}",
                input
            )));
        }
        Ok(Self::tcp(host, if port == 0 { DEFAULT_PORT } else { port }))
    }
}

impl fmt::Display for PrinterAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrinterAddress::Tcp { host, port } => write!(f, "tcp://{}:{}", host, port),
            PrinterAddress::Share { host, share } => write!(f, r"\\{}\{}", host, share),
            PrinterAddress::Spooler { name } => write!(f, "printer:{}", name),
        }
    }
}

impl FromStr for PrinterAddress {
    type Err = PrintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
