//! Transport seam between the print engine and real printers
//!
//! The engine only talks to a [`PrinterLink`]; production uses
//! [`LocalLink`], tests plug in an in-memory printer.

use std::time::Duration;

use async_trait::async_trait;
use masa_printer::{PrintError, PrinterAddress};

#[async_trait]
pub trait PrinterLink: Send + Sync {
    /// Reachability check, must finish within `timeout`
    async fn probe(&self, address: &PrinterAddress, timeout: Duration) -> Result<(), PrintError>;

    /// One transmission attempt: open, write, close
    async fn send(&self, address: &PrinterAddress, data: &[u8]) -> Result<(), PrintError>;
}

/// Link backed by the OS: TCP sockets, shares and the print spooler
#[derive(Debug, Clone)]
pub struct LocalLink {
    connect_timeout: Duration,
    write_timeout: Duration,
}

impl LocalLink {
    pub fn new(connect_timeout: Duration, write_timeout: Duration) -> Self {
        Self {
            connect_timeout,
            write_timeout,
        }
    }
}

#[async_trait]
impl PrinterLink for LocalLink {
    async fn probe(&self, address: &PrinterAddress, timeout: Duration) -> Result<(), PrintError> {
        address.probe(timeout).await
    }

    async fn send(&self, address: &PrinterAddress, data: &[u8]) -> Result<(), PrintError> {
        address
            .print(data, self.connect_timeout, self.write_timeout)
            .await
    }
}
