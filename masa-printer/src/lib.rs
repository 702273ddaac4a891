//! Kitchen printer transport for the masa print bridge
//!
//! Knows how to turn lines of text into ESC/POS bytes for CP857 or GBK
//! printers and how to get those bytes to a printer, whichever form its
//! address takes:
//!
//! | Address | Transport |
//! |---------|-----------|
//! | `tcp://10.0.0.5:9100` | raw socket, [`NetworkPrinter`] |
//! | `\\host\SHARE` | shared printer / device path, [`SharePrinter`] |
//! | `printer:NAME` | Windows spooler, [`SpoolerPrinter`] |
//!
//! Bitmaps go out as `GS v 0` rasters ([`Raster`]); decoding PNG/JPEG input
//! needs the default `image` feature.
//!
//! Ticket layout, station routing and retries live in the bridge itself.
//!
//! ```ignore
//! use masa_printer::{CodePage, EscPosBuilder, PrinterAddress};
//!
//! let mut b = EscPosBuilder::with_code_page(48, CodePage::Cp857);
//! b.center().bold().size(true, true).line("MASA 7");
//! b.reset_size().bold_off().left().sep_single();
//! b.line("2x Adana Kebap").cut_feed(4);
//!
//! let address: PrinterAddress = "tcp://192.168.1.100:9100".parse()?;
//! let timeout = std::time::Duration::from_secs(3);
//! address.print(&b.build(), timeout, timeout).await?;
//! ```

mod address;
mod encoding;
mod error;
mod escpos;
mod printer;
mod raster;

pub use address::PrinterAddress;
pub use encoding::{CodePage, encode_cp857, encode_gbk, encode_text, text_width};
pub use error::{PrintError, PrintResult};
pub use escpos::EscPosBuilder;
pub use printer::{NetworkPrinter, Printer, SharePrinter, SpoolerPrinter};
pub use raster::{DOTS_PER_COLUMN, Raster};
