//! Kitchen ticket composition
//!
//! [`TicketComposer`] lays out a [`Ticket`] from routed items; it does no
//! I/O. [`encode_escpos`] turns a ticket into printer bytes for one code page,
//! [`encode_image`] does the same for a bitmap.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use masa_printer::{CodePage, EscPosBuilder, Raster, text_width};
use shared::models::PrinterLanguage;

use super::types::{
    Align, FontConfig, LineKind, LineStyle, TableRef, Ticket, TicketContext, TicketItem, TicketLine,
};

const TIMESTAMP_FORMAT: &str = "%d.%m.%Y %H:%M";
const FEED_LINES: u8 = 4;
const INDENT: &str = "   ";

/// Fixed strings per ticket language
struct Labels {
    table: &'static str,
    packet: &'static str,
    time: &'static str,
    order: &'static str,
    note: &'static str,
    footer: &'static str,
}

const TR: Labels = Labels {
    table: "MASA",
    packet: "PAKET",
    time: "Tarih",
    order: "Siparis No",
    note: "NOT",
    footer: "AFIYET OLSUN!",
};

const ZH: Labels = Labels {
    table: "桌号",
    packet: "外卖",
    time: "时间",
    order: "单号",
    note: "备注",
    footer: "请享用!",
};

fn labels(language: PrinterLanguage) -> &'static Labels {
    match language {
        PrinterLanguage::Tr => &TR,
        PrinterLanguage::Zh => &ZH,
    }
}

/// Code page a printer of the given language runs
pub fn code_page_for(language: PrinterLanguage) -> CodePage {
    match language {
        PrinterLanguage::Tr => CodePage::Cp857,
        PrinterLanguage::Zh => CodePage::Gbk,
    }
}

#[derive(Debug, Clone)]
pub struct TicketComposer {
    width: usize,
    timezone: Tz,
}

impl TicketComposer {
    pub fn new(width: usize, timezone: Tz) -> Self {
        Self { width, timezone }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Lay out one station ticket
    ///
    /// `font` only changes the style of the table line, the station label and
    /// the item lines. Item names and notes wrap at the paper width.
    pub fn compose(
        &self,
        station_label: &str,
        items: &[TicketItem],
        ctx: &TicketContext,
        font: FontConfig,
        language: PrinterLanguage,
    ) -> Ticket {
        let mut ticket = self.layout(station_label, items, ctx, font, language);
        finish(&mut ticket);
        ticket
    }

    fn layout(
        &self,
        station_label: &str,
        items: &[TicketItem],
        ctx: &TicketContext,
        font: FontConfig,
        language: PrinterLanguage,
    ) -> Ticket {
        let l = labels(language);
        let code_page = code_page_for(language);
        let mut ticket = Ticket {
            lines: Vec::with_capacity(8 + items.len() * 3),
            feed_lines: FEED_LINES,
        };

        self.header(&mut ticket, station_label, ctx, font, l);

        for item in items {
            let (main, secondary) = match (language, item.secondary_name.as_deref()) {
                (PrinterLanguage::Zh, Some(zh)) => (zh, Some(item.name.as_str())),
                (_, secondary) => (item.name.as_str(), secondary),
            };

            let item_style = LineStyle {
                bold: font.bold,
                double_height: font.double_height,
                ..LineStyle::default()
            };
            let qty = format!("{}x ", item.quantity);
            for text in wrap(&qty, INDENT, main, self.width, code_page) {
                push(&mut ticket, LineKind::Item, text, item_style);
            }
            if let Some(secondary) = secondary {
                push(
                    &mut ticket,
                    LineKind::SecondaryName,
                    format!("{INDENT}{secondary}"),
                    LineStyle::default(),
                );
            }
            if !item.variations.is_empty() {
                push(
                    &mut ticket,
                    LineKind::Variation,
                    format!("{INDENT}> {}", item.variations.join(", ")),
                    LineStyle::default(),
                );
            }
            if let Some(notes) = &item.notes {
                let lead = format!("{INDENT}{}: ", l.note);
                for text in wrap(&lead, INDENT, notes, self.width, code_page) {
                    push(
                        &mut ticket,
                        LineKind::Note,
                        text,
                        LineStyle {
                            bold: true,
                            ..LineStyle::default()
                        },
                    );
                }
            }
        }

        self.divider(&mut ticket);
        push(
            &mut ticket,
            LineKind::Footer,
            l.footer.to_string(),
            LineStyle {
                align: Align::Center,
                bold: true,
                ..LineStyle::default()
            },
        );
        ticket
    }

    /// Sample ticket for checking font settings on a real printer
    ///
    /// Same layout as [`compose`](Self::compose) plus a trailer naming the
    /// font settings used.
    pub fn calibration(
        &self,
        station_label: &str,
        font: FontConfig,
        size_name: &str,
        language: PrinterLanguage,
        now: DateTime<Utc>,
    ) -> Ticket {
        let ctx = TicketContext {
            table_ref: TableRef::Table(5),
            order_ref: "TEST".to_string(),
            timestamp: now,
        };
        let items = calibration_items();
        let mut ticket = self.layout(station_label, &items, &ctx, font, language);

        let yes_no = |v: bool| if v { "EVET" } else { "HAYIR" };
        for text in [
            "---".to_string(),
            format!("[{}]", size_name),
            format!("doubleH: {}", yes_no(font.double_height)),
            format!("doubleW: {}", yes_no(font.double_width)),
            format!("bold: {}", yes_no(font.bold)),
        ] {
            push(
                &mut ticket,
                LineKind::Info,
                text,
                LineStyle {
                    align: Align::Center,
                    ..LineStyle::default()
                },
            );
        }
        finish(&mut ticket);
        ticket
    }

    fn header(
        &self,
        ticket: &mut Ticket,
        station_label: &str,
        ctx: &TicketContext,
        font: FontConfig,
        l: &Labels,
    ) {
        let table = match ctx.table_ref {
            TableRef::Table(n) => format!("{} {}", l.table, n),
            TableRef::Packet(n) => format!("{} {}", l.packet, n),
        };
        push(
            ticket,
            LineKind::TableRef,
            table,
            LineStyle {
                align: Align::Center,
                bold: font.bold,
                double_height: font.double_height,
                double_width: font.double_width,
            },
        );
        push(
            ticket,
            LineKind::StationLabel,
            format!("[ {} ]", station_label),
            LineStyle {
                align: Align::Center,
                bold: font.bold,
                ..LineStyle::default()
            },
        );

        let local = ctx.timestamp.with_timezone(&self.timezone);
        push(
            ticket,
            LineKind::Timestamp,
            format!("{}: {}", l.time, local.format(TIMESTAMP_FORMAT)),
            LineStyle::default(),
        );
        push(
            ticket,
            LineKind::OrderRef,
            format!("{}: {}", l.order, ctx.order_ref),
            LineStyle::default(),
        );
        self.divider(ticket);
    }

    fn divider(&self, ticket: &mut Ticket) {
        push(
            ticket,
            LineKind::Divider,
            "-".repeat(self.width),
            LineStyle::default(),
        );
    }
}

fn push(ticket: &mut Ticket, kind: LineKind, text: String, style: LineStyle) {
    ticket.lines.push(TicketLine { kind, text, style });
}

fn finish(ticket: &mut Ticket) {
    push(ticket, LineKind::Cut, String::new(), LineStyle::default());
}

/// Greedy word wrap measured in printed columns
///
/// The first line starts with `lead`, continuation lines with `hang`. A
/// single word wider than the paper gets a line of its own.
fn wrap(lead: &str, hang: &str, body: &str, width: usize, code_page: CodePage) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = lead.to_string();
    let mut start = text_width(lead, code_page);
    let mut used = start;

    for word in body.split_whitespace() {
        let w = text_width(word, code_page);
        if used > start && used + 1 + w > width {
            lines.push(std::mem::replace(&mut line, hang.to_string()));
            start = text_width(hang, code_page);
            used = start;
        }
        if used > start {
            line.push(' ');
            used += 1;
        }
        line.push_str(word);
        used += w;
    }
    lines.push(line);
    lines
}

fn calibration_items() -> Vec<TicketItem> {
    let item = |quantity, name: &str, variations: &[&str], notes: Option<&str>| TicketItem {
        menu_item_id: format!("test-{}", name.to_lowercase().replace(' ', "-")),
        quantity,
        name: name.to_string(),
        secondary_name: None,
        variations: variations.iter().map(|v| v.to_string()).collect(),
        notes: notes.map(str::to_string),
    };
    vec![
        item(2, "Adana Kebap", &["Az acılı", "Büyük porsiyon"], Some("Acısız olsun")),
        item(1, "Lahmacun", &[], None),
        item(3, "Ayran", &[], None),
    ]
}

/// Serialize a ticket to ESC/POS
pub fn encode_escpos(ticket: &Ticket, width: usize, code_page: CodePage) -> Vec<u8> {
    let mut b = EscPosBuilder::with_code_page(width, code_page);

    for line in &ticket.lines {
        match line.kind {
            LineKind::Divider => {
                b.left().sep_single();
                continue;
            }
            LineKind::Cut => {
                b.left().cut_feed(ticket.feed_lines);
                continue;
            }
            _ => {}
        }

        match line.style.align {
            Align::Left => b.left(),
            Align::Center => b.center(),
        };
        let sized = line.style.double_height || line.style.double_width;
        if line.style.bold {
            b.bold();
        }
        if sized {
            b.size(line.style.double_width, line.style.double_height);
        }
        b.line(&line.text);
        if sized {
            b.reset_size();
        }
        if line.style.bold {
            b.bold_off();
        }
    }

    b.build()
}

/// Serialize a bitmap job: centered raster, feed and cut
pub fn encode_image(raster: &Raster, width: usize, code_page: CodePage) -> Vec<u8> {
    let mut b = EscPosBuilder::with_code_page(width, code_page);
    b.center().raster(raster).left().cut_feed(FEED_LINES);
    b.build()
}
