//! ESC/POS byte stream builder

use crate::encoding::{CodePage, encode_text};
use crate::raster::Raster;

const ESC: u8 = 0x1B;
const GS: u8 = 0x1D;

/// Accumulates an ESC/POS job for one ticket
///
/// The stream starts with `ESC @` plus the code page selection; text is
/// encoded for that code page as it is appended. Paper width is in
/// characters (32 on 58mm rolls, 48 on 80mm).
pub struct EscPosBuilder {
    buf: Vec<u8>,
    width: usize,
    code_page: CodePage,
}

impl EscPosBuilder {
    pub fn new(width: usize) -> Self {
        Self::with_code_page(width, CodePage::Cp857)
    }

    pub fn with_code_page(width: usize, code_page: CodePage) -> Self {
        let mut buf = Vec::with_capacity(1024);
        buf.extend_from_slice(&[ESC, b'@']);
        buf.extend_from_slice(code_page.select_command());
        Self {
            buf,
            width,
            code_page,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn code_page(&self) -> CodePage {
        self.code_page
    }

    fn cmd(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    pub fn text(&mut self, s: &str) -> &mut Self {
        let encoded = encode_text(s, self.code_page);
        self.cmd(&encoded)
    }

    pub fn line(&mut self, s: &str) -> &mut Self {
        self.text(s).cmd(b"\n")
    }

    /// ESC a 0
    pub fn left(&mut self) -> &mut Self {
        self.cmd(&[ESC, b'a', 0])
    }

    /// ESC a 1
    pub fn center(&mut self) -> &mut Self {
        self.cmd(&[ESC, b'a', 1])
    }

    pub fn bold(&mut self) -> &mut Self {
        self.cmd(&[ESC, b'E', 1])
    }

    pub fn bold_off(&mut self) -> &mut Self {
        self.cmd(&[ESC, b'E', 0])
    }

    /// GS ! n. Width factor lives in the high nibble, height in the low one.
    pub fn size(&mut self, double_width: bool, double_height: bool) -> &mut Self {
        let n = (u8::from(double_width) << 4) | u8::from(double_height);
        self.cmd(&[GS, b'!', n])
    }

    pub fn reset_size(&mut self) -> &mut Self {
        self.size(false, false)
    }

    /// Full-width run of `-`
    pub fn sep_single(&mut self) -> &mut Self {
        let rule = "-".repeat(self.width);
        self.line(&rule)
    }

    /// GS v 0, one block per band of rows
    pub fn raster(&mut self, image: &Raster) -> &mut Self {
        let width_bytes = (image.width_bytes() as u16).to_le_bytes();
        for (rows, band) in image.bands() {
            self.cmd(&[GS, b'v', b'0', 0]);
            self.cmd(&width_bytes);
            self.cmd(&rows.to_le_bytes());
            self.cmd(band);
        }
        self
    }

    /// GS V 66 n: feed `lines` and cut
    pub fn cut_feed(&mut self, lines: u8) -> &mut Self {
        self.cmd(&[GS, b'V', 66, lines])
    }

    pub fn build(self) -> Vec<u8> {
        self.buf
    }
}
