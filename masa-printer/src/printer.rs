//! Printer adapters for sending ESC/POS data
//!
//! Supports:
//! - Network printers (raw TCP, port 9100)
//! - Shared printers and device paths, written like a file
//! - Windows spooler queues (via Win32 API)

use crate::address::PrinterAddress;
use crate::error::{PrintError, PrintResult};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{debug, info, instrument};

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(3);
const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(10);

/// Trait for printer adapters
#[allow(async_fn_in_trait)]
pub trait Printer {
    /// Send raw ESC/POS data to the printer
    async fn print(&self, data: &[u8]) -> PrintResult<()>;

    /// Check reachability without printing anything
    async fn probe(&self) -> PrintResult<()>;

    /// Check if the printer is online/reachable
    async fn is_online(&self) -> bool {
        self.probe().await.is_ok()
    }
}

/// Network printer (raw TCP)
///
/// Most thermal printers accept raw ESC/POS on port 9100. The host may be
/// a name (`localhost`), it is resolved at connect time.
#[derive(Debug, Clone)]
pub struct NetworkPrinter {
    host: String,
    port: u16,
    connect_timeout: Duration,
    write_timeout: Duration,
}

impl NetworkPrinter {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }

    /// Set connection timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the bound on writing a whole job
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    async fn connect(&self) -> PrintResult<TcpStream> {
        tokio::time::timeout(
            self.connect_timeout,
            TcpStream::connect((self.host.as_str(), self.port)),
        )
        .await
        .map_err(|_| PrintError::Timeout(format!("Connection timeout: {}", self.endpoint())))?
        .map_err(|e| PrintError::Connection(format!("{}: {}", self.endpoint(), e)))
    }
}

impl Printer for NetworkPrinter {
    #[instrument(skip(self, data), fields(addr = %self.endpoint(), data_len = data.len()))]
    async fn print(&self, data: &[u8]) -> PrintResult<()> {
        let mut stream = self.connect().await?;
        debug!("Connected, sending {} bytes", data.len());

        tokio::time::timeout(self.write_timeout, async {
            stream.write_all(data).await?;
            stream.flush().await?;
            stream.shutdown().await
        })
        .await
        .map_err(|_| PrintError::Timeout(format!("Write timeout: {}", self.endpoint())))??;

        info!("Print job sent");
        Ok(())
    }

    #[instrument(skip(self), fields(addr = %self.endpoint()))]
    async fn probe(&self) -> PrintResult<()> {
        match self.connect().await {
            Ok(_) => {
                debug!("Printer online");
                Ok(())
            }
            Err(e) => {
                debug!(error = %e, "Printer offline");
                Err(e)
            }
        }
    }
}

/// Printer reached through a file path
///
/// On Windows this is a UNC share (`\\host\SHARE`); elsewhere it can be a
/// device node such as `/dev/usb/lp0`.
#[derive(Debug, Clone)]
pub struct SharePrinter {
    path: PathBuf,
    timeout: Duration,
}

impl SharePrinter {
    /// Windows shared printer `\\host\share`
    pub fn unc(host: &str, share: &str) -> Self {
        Self::from_path(format!(r"\\{}\{}", host, share))
    }

    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn open(&self) -> PrintResult<tokio::fs::File> {
        tokio::time::timeout(
            self.timeout,
            tokio::fs::OpenOptions::new().write(true).open(&self.path),
        )
        .await
        .map_err(|_| PrintError::Timeout(format!("Open timeout: {}", self.path.display())))?
        .map_err(|e| PrintError::Offline(format!("{}: {}", self.path.display(), e)))
    }
}

impl Printer for SharePrinter {
    #[instrument(skip(self, data), fields(path = %self.path.display(), data_len = data.len()))]
    async fn print(&self, data: &[u8]) -> PrintResult<()> {
        let mut file = self.open().await?;

        tokio::time::timeout(self.timeout, async {
            file.write_all(data).await?;
            file.flush().await
        })
        .await
        .map_err(|_| PrintError::Timeout(format!("Write timeout: {}", self.path.display())))??;

        info!("Print job written to share");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn probe(&self) -> PrintResult<()> {
        self.open().await.map(|_| ())
    }
}

/// Print spooler queue, addressed by printer name
#[derive(Debug, Clone)]
pub struct SpoolerPrinter {
    name: String,
}

impl SpoolerPrinter {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(not(windows))]
impl Printer for SpoolerPrinter {
    async fn print(&self, _data: &[u8]) -> PrintResult<()> {
        Err(PrintError::Unsupported(format!("printer:{}", self.name)))
    }

    async fn probe(&self) -> PrintResult<()> {
        Err(PrintError::Unsupported(format!("printer:{}", self.name)))
    }
}

#[cfg(windows)]
impl Printer for SpoolerPrinter {
    #[instrument(skip(self, data), fields(printer = %self.name, data_len = data.len()))]
    async fn print(&self, data: &[u8]) -> PrintResult<()> {
        let name = self.name.clone();
        let data = data.to_vec();

        tokio::task::spawn_blocking(move || spooler::write_raw(&name, &data))
            .await
            .map_err(|e| PrintError::Spooler(format!("Task join failed: {}", e)))??;

        info!("Print job handed to spooler");
        Ok(())
    }

    #[instrument(skip(self), fields(printer = %self.name))]
    async fn probe(&self) -> PrintResult<()> {
        let name = self.name.clone();
        let installed = tokio::task::spawn_blocking(spooler::list)
            .await
            .map_err(|e| PrintError::Spooler(format!("Task join failed: {}", e)))??;

        if installed.iter().any(|p| p.eq_ignore_ascii_case(&name)) {
            Ok(())
        } else {
            tracing::warn!(installed = installed.len(), "Spooler queue not found");
            Err(PrintError::Offline(format!("printer:{} not installed", name)))
        }
    }
}

#[cfg(windows)]
mod spooler {
    use crate::error::{PrintError, PrintResult};
    use windows::Win32::Graphics::Printing::{
        ClosePrinter, DOC_INFO_1W, EndDocPrinter, EndPagePrinter, EnumPrintersW, OpenPrinterW,
        PRINTER_ENUM_CONNECTIONS, PRINTER_ENUM_LOCAL, PRINTER_HANDLE, PRINTER_INFO_4W,
        StartDocPrinterW, StartPagePrinter, WritePrinter,
    };
    use windows::core::{PCWSTR, PWSTR};

    fn to_wide(s: &str) -> Vec<u16> {
        s.encode_utf16().chain(std::iter::once(0)).collect()
    }

    /// Names of local and connected printer queues
    pub(super) fn list() -> PrintResult<Vec<String>> {
        let flags = PRINTER_ENUM_LOCAL | PRINTER_ENUM_CONNECTIONS;
        let mut needed: u32 = 0;
        let mut returned: u32 = 0;

        unsafe {
            let _ = EnumPrintersW(flags, None, 4, None, &mut needed, &mut returned);
            if needed == 0 {
                return Ok(Vec::new());
            }

            let mut buf: Vec<u8> = vec![0; needed as usize];
            EnumPrintersW(
                flags,
                None,
                4,
                Some(buf.as_mut_slice()),
                &mut needed,
                &mut returned,
            )
            .map_err(|e| PrintError::Spooler(format!("EnumPrintersW failed: {}", e)))?;

            let infos =
                std::slice::from_raw_parts(buf.as_ptr() as *const PRINTER_INFO_4W, returned as usize);
            Ok(infos
                .iter()
                .filter(|info| !info.pPrinterName.is_null())
                .filter_map(|info| PWSTR(info.pPrinterName.0).to_string().ok())
                .collect())
        }
    }

    /// Send a RAW document to the named queue
    pub(super) fn write_raw(name: &str, data: &[u8]) -> PrintResult<()> {
        let name_w = to_wide(name);
        let doc_name_w = to_wide("Masa Ticket");
        let datatype_w = to_wide("RAW");

        unsafe {
            let mut handle = PRINTER_HANDLE::default();
            OpenPrinterW(PCWSTR::from_raw(name_w.as_ptr()), &mut handle, None)
                .map_err(|_| PrintError::Offline(format!("printer:{}", name)))?;

            let doc_info = DOC_INFO_1W {
                pDocName: PWSTR(doc_name_w.as_ptr() as *mut _),
                pOutputFile: PWSTR::null(),
                pDatatype: PWSTR(datatype_w.as_ptr() as *mut _),
            };

            if StartDocPrinterW(handle, 1, &doc_info as *const DOC_INFO_1W) == 0 {
                let _ = ClosePrinter(handle);
                return Err(PrintError::Spooler("StartDocPrinter failed".into()));
            }
            if !StartPagePrinter(handle).as_bool() {
                let _ = EndDocPrinter(handle);
                let _ = ClosePrinter(handle);
                return Err(PrintError::Spooler("StartPagePrinter failed".into()));
            }

            let mut written: u32 = 0;
            let ok = WritePrinter(
                handle,
                data.as_ptr() as *const core::ffi::c_void,
                data.len() as u32,
                &mut written,
            );

            let _ = EndPagePrinter(handle);
            let _ = EndDocPrinter(handle);
            let _ = ClosePrinter(handle);

            if !ok.as_bool() {
                return Err(PrintError::Spooler("WritePrinter failed".into()));
            }
            if written as usize != data.len() {
                return Err(PrintError::Spooler(format!(
                    "Incomplete write: {}/{} bytes",
                    written,
                    data.len()
                )));
            }
            Ok(())
        }
    }
}

impl PrinterAddress {
    /// Send a job to this address with the given timeouts
    pub async fn print(
        &self,
        data: &[u8],
        connect_timeout: Duration,
        write_timeout: Duration,
    ) -> PrintResult<()> {
        match self {
            PrinterAddress::Tcp { host, port } => {
                NetworkPrinter::new(host.as_str(), *port)
                    .with_timeout(connect_timeout)
                    .with_write_timeout(write_timeout)
                    .print(data)
                    .await
            }
            PrinterAddress::Share { host, share } => {
                SharePrinter::unc(host, share)
                    .with_timeout(write_timeout)
                    .print(data)
                    .await
            }
            PrinterAddress::Spooler { name } => SpoolerPrinter::new(name.as_str()).print(data).await,
        }
    }

    /// Reachability check bounded by `timeout`
    pub async fn probe(&self, timeout: Duration) -> PrintResult<()> {
        let result = match self {
            PrinterAddress::Tcp { host, port } => {
                NetworkPrinter::new(host.as_str(), *port)
                    .with_timeout(timeout)
                    .probe()
                    .await
            }
            PrinterAddress::Share { host, share } => {
                SharePrinter::unc(host, share)
                    .with_timeout(timeout)
                    .probe()
                    .await
            }
            PrinterAddress::Spooler { name } => {
                tokio::time::timeout(timeout, SpoolerPrinter::new(name.as_str()).probe())
                    .await
                    .map_err(|_| PrintError::Timeout(format!("printer:{}", name)))?
            }
        };
        if let Err(e) = &result {
            debug!(address = %self, error = %e, "Probe failed");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_network_printer_sends_bytes() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            socket.read_to_end(&mut received).await.unwrap();
            received
        });

        let printer = NetworkPrinter::new("127.0.0.1", port);
        printer.print(b"\x1B@MASA 7\n").await.unwrap();

        assert_eq!(server.await.unwrap(), b"\x1B@MASA 7\n");
    }

    #[tokio::test]
    async fn test_network_printer_resolves_localhost() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let printer = NetworkPrinter::new("localhost", port);
        assert!(printer.is_online().await);
    }

    #[tokio::test]
    async fn test_network_printer_offline() {
        // Bind then drop to get a port nobody listens on
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };

        let printer =
            NetworkPrinter::new("127.0.0.1", port).with_timeout(Duration::from_millis(300));
        let err = printer.probe().await.unwrap_err();
        assert!(err.is_connect_failure() || matches!(err, PrintError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_share_printer_writes_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let printer = SharePrinter::from_path(file.path());

        assert!(printer.is_online().await);
        printer.print(b"PAKET 4\n").await.unwrap();

        assert_eq!(std::fs::read(file.path()).unwrap(), b"PAKET 4\n");
    }

    #[tokio::test]
    async fn test_share_printer_missing_path_is_offline() {
        let dir = tempfile::tempdir().unwrap();
        let printer = SharePrinter::from_path(dir.path().join("NOPE"));

        let err = printer.probe().await.unwrap_err();
        assert!(matches!(err, PrintError::Offline(_)));
    }

    #[test]
    fn test_unc_path() {
        let printer = SharePrinter::unc("localhost", "IZGARA");
        assert_eq!(printer.path(), Path::new(r"\\localhost\IZGARA"));
    }

    #[cfg(not(windows))]
    #[tokio::test]
    async fn test_spooler_unsupported_off_windows() {
        let addr = PrinterAddress::spooler("BAR");
        let err = addr.probe(Duration::from_millis(100)).await.unwrap_err();
        assert!(matches!(err, PrintError::Unsupported(_)));
    }
}
