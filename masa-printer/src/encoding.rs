//! Code page encoding for thermal printers
//!
//! Turkish kitchen printers run code page 857 (`ESC t 13`), Chinese ones
//! run GBK (`FS &` + `FS C 1`). Text is encoded at the moment it is written
//! into the builder, so ESC/POS command bytes are never touched.
//!
//! On a CP857 printer, runs of characters that CP857 cannot represent
//! (e.g. a Chinese secondary item name) are sent in Chinese mode:
//! `FS &` + GBK bytes + `FS .`. Characters neither table knows print as `?`.

/// Printer character table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CodePage {
    /// DOS Turkish (ESC t 13)
    #[default]
    Cp857,
    /// Simplified Chinese (FS & + FS C 1)
    Gbk,
}

impl CodePage {
    /// Command bytes selecting this code page, sent after `ESC @`
    pub fn select_command(&self) -> &'static [u8] {
        match self {
            CodePage::Cp857 => &[0x1B, 0x74, 13],
            CodePage::Gbk => &[0x1C, 0x26, 0x1C, 0x43, 0x01],
        }
    }
}

const FS_CHINESE_ON: [u8; 2] = [0x1C, 0x26];
const FS_CHINESE_OFF: [u8; 2] = [0x1C, 0x2E];

/// Map a non-ASCII character to its CP857 byte
fn cp857_byte(c: char) -> Option<u8> {
    let b = match c {
        'Ç' => 0x80,
        'ü' => 0x81,
        'é' => 0x82,
        'â' => 0x83,
        'ä' => 0x84,
        'à' => 0x85,
        'ç' => 0x87,
        'ê' => 0x88,
        'î' => 0x8C,
        'ı' => 0x8D,
        'Ä' => 0x8E,
        'É' => 0x90,
        'ô' => 0x93,
        'ö' => 0x94,
        'û' => 0x96,
        'İ' => 0x98,
        'Ö' => 0x99,
        'Ü' => 0x9A,
        'Ş' => 0x9E,
        'ş' => 0x9F,
        'Ğ' => 0xA6,
        'ğ' => 0xA7,
        _ => return None,
    };
    Some(b)
}

fn cp857_char(c: char) -> Option<u8> {
    if c.is_ascii() {
        Some(c as u8)
    } else {
        cp857_byte(c)
    }
}

/// Closest ASCII letter for Turkish characters, used on GBK printers
fn fold_turkish(c: char) -> Option<char> {
    let folded = match c {
        'ç' => 'c',
        'Ç' => 'C',
        'ğ' => 'g',
        'Ğ' => 'G',
        'ı' => 'i',
        'İ' => 'I',
        'ö' => 'o',
        'Ö' => 'O',
        'ş' => 's',
        'Ş' => 'S',
        'ü' => 'u',
        'Ü' => 'U',
        'â' => 'a',
        'î' => 'i',
        'û' => 'u',
        _ => return None,
    };
    Some(folded)
}

/// GBK bytes for a single character, `None` when GBK cannot represent it
fn gbk_char(c: char) -> Option<Vec<u8>> {
    let mut tmp = [0u8; 4];
    let (bytes, _, had_errors) = encoding_rs::GBK.encode(c.encode_utf8(&mut tmp));
    if had_errors {
        None
    } else {
        Some(bytes.into_owned())
    }
}

/// Encode text for a CP857 printer
///
/// Only the CP857 table is used; anything else becomes `?`.
pub fn encode_cp857(s: &str) -> Vec<u8> {
    s.chars().map(|c| cp857_char(c).unwrap_or(b'?')).collect()
}

/// Encode text for a GBK printer
///
/// Turkish letters are folded to ASCII, unknown characters become `?`.
pub fn encode_gbk(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len() * 2);
    for c in s.chars() {
        let c = fold_turkish(c).unwrap_or(c);
        match gbk_char(c) {
            Some(bytes) => out.extend_from_slice(&bytes),
            None => out.push(b'?'),
        }
    }
    out
}

/// Encode text for the given code page
///
/// On CP857, runs outside the Turkish table switch to Chinese mode for the
/// duration of the run.
pub fn encode_text(s: &str, code_page: CodePage) -> Vec<u8> {
    match code_page {
        CodePage::Gbk => encode_gbk(s),
        CodePage::Cp857 => encode_cp857_mixed(s),
    }
}

fn encode_cp857_mixed(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len());
    let mut chinese = false;

    for c in s.chars() {
        if let Some(b) = cp857_char(c) {
            if chinese {
                out.extend_from_slice(&FS_CHINESE_OFF);
                chinese = false;
            }
            out.push(b);
            continue;
        }
        match gbk_char(c) {
            Some(bytes) => {
                if !chinese {
                    out.extend_from_slice(&FS_CHINESE_ON);
                    chinese = true;
                }
                out.extend_from_slice(&bytes);
            }
            None => {
                if chinese {
                    out.extend_from_slice(&FS_CHINESE_OFF);
                    chinese = false;
                }
                out.push(b'?');
            }
        }
    }

    if chinese {
        out.extend_from_slice(&FS_CHINESE_OFF);
    }
    out
}

/// Printed column width of a string on the given code page
///
/// Chinese characters take two columns, everything else one.
pub fn text_width(s: &str, code_page: CodePage) -> usize {
    s.chars()
        .map(|c| match (code_page, cp857_char(c)) {
            (CodePage::Cp857, Some(_)) => 1,
            _ if c.is_ascii() || fold_turkish(c).is_some() => 1,
            _ => gbk_char(c).map_or(1, |b| b.len()),
        })
        .sum()
}
