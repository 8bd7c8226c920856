//! Append-only PDF 1.4 writer.
//!
//! Objects are serialized in the order they are produced and handed to the
//! sink in chunks of at least `CHUNK_SIZE` bytes (the tail may be shorter).
//! Object numbers 1..=5 are fixed (catalog, page tree, two fonts, info);
//! page and content-stream objects follow. The page tree is written last,
//! once the page count is known. Content streams are left uncompressed.

use std::io::Write;

use crate::cancel::CancelFlag;
use crate::error::RenderError;

/// US Letter, in points
pub const PAGE_WIDTH: f32 = 612.0;
pub const PAGE_HEIGHT: f32 = 792.0;

pub const CHUNK_SIZE: usize = 4096;

const CATALOG_ID: u32 = 1;
const PAGES_ID: u32 = 2;
const FONT_REGULAR_ID: u32 = 3;
const FONT_BOLD_ID: u32 = 4;
const INFO_ID: u32 = 5;
const FIRST_FREE_ID: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

impl Font {
    pub(crate) fn resource(&self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }

    fn base_font(&self) -> &'static str {
        match self {
            Font::Regular => "Helvetica",
            Font::Bold => "Helvetica-Bold",
        }
    }
}

// Helvetica advance widths (1/1000 em) for ' '..='~'
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333,
    389, 584, 278, 333, 278, 278, 556, 556, 556, 556,
    556, 556, 556, 556, 556, 556, 278, 278, 584, 584,
    584, 556, 1015, 667, 667, 722, 722, 667, 611, 778,
    722, 278, 500, 667, 556, 833, 722, 778, 667, 778,
    722, 667, 611, 722, 667, 944, 667, 667, 611, 278,
    278, 278, 469, 556, 333, 556, 556, 500, 556, 556,
    278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500,
    500, 334, 260, 334, 584,
];

/// Approximate rendered width of `text` in points. Bold text is measured
/// with the regular metrics.
pub fn text_width(text: &str, size: f32) -> f32 {
    let units: u32 = text
        .chars()
        .map(|c| {
            let code = c as u32;
            match code {
                32..=126 => HELVETICA_WIDTHS[(code - 32) as usize] as u32,
                _ => 556,
            }
        })
        .sum();
    units as f32 * size / 1000.0
}

/// Encode `text` as a PDF literal string, parentheses included.
/// Latin-1 characters pass through (octal-escaped above ASCII); anything
/// else becomes `?`.
pub fn literal_string(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() + 2);
    out.push(b'(');
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push(b'\\');
                out.push(c as u8);
            }
            ' '..='~' => out.push(c as u8),
            '\u{a0}'..='\u{ff}' => out.extend_from_slice(format!("\\{:03o}", c as u32).as_bytes()),
            _ => out.push(b'?'),
        }
    }
    out.push(b')');
    out
}

pub struct PdfWriter<W: Write> {
    sink: W,
    pending: Vec<u8>,
    /// Bytes already handed to the sink
    flushed: usize,
    /// offsets[id - 1] = byte offset of object `id`
    offsets: Vec<Option<usize>>,
    page_ids: Vec<u32>,
    next_id: u32,
    cancel: CancelFlag,
}

impl<W: Write> PdfWriter<W> {
    pub fn new(sink: W, cancel: CancelFlag) -> Self {
        Self {
            sink,
            pending: Vec::with_capacity(CHUNK_SIZE * 2),
            flushed: 0,
            offsets: vec![None; (FIRST_FREE_ID - 1) as usize],
            page_ids: Vec::new(),
            next_id: FIRST_FREE_ID,
            cancel,
        }
    }

    fn position(&self) -> usize {
        self.flushed + self.pending.len()
    }

    fn allocate(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.offsets.push(None);
        id
    }

    fn emit_chunk(&mut self) -> Result<(), RenderError> {
        if self.cancel.is_cancelled() {
            return Err(RenderError::Cancelled);
        }
        if self.pending.is_empty() {
            return Ok(());
        }
        self.sink.write_all(&self.pending)?;
        self.flushed += self.pending.len();
        self.pending.clear();
        Ok(())
    }

    fn maybe_emit(&mut self) -> Result<(), RenderError> {
        if self.pending.len() >= CHUNK_SIZE {
            self.emit_chunk()?;
        }
        Ok(())
    }

    fn write_object(&mut self, id: u32, body: &[u8]) -> Result<(), RenderError> {
        self.offsets[(id - 1) as usize] = Some(self.position());
        self.pending.extend_from_slice(format!("{id} 0 obj\n").as_bytes());
        self.pending.extend_from_slice(body);
        self.pending.extend_from_slice(b"\nendobj\n");
        self.maybe_emit()
    }

    /// Header and font resources.
    pub fn begin(&mut self) -> Result<(), RenderError> {
        self.pending.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");
        for (id, font) in [(FONT_REGULAR_ID, Font::Regular), (FONT_BOLD_ID, Font::Bold)] {
            let body = format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                font.base_font()
            );
            self.write_object(id, body.as_bytes())?;
        }
        Ok(())
    }

    /// Append one finished page with the given content stream.
    pub fn add_page(&mut self, content: &[u8]) -> Result<(), RenderError> {
        let content_id = self.allocate();
        let page_id = self.allocate();

        let mut stream = format!("<< /Length {} >>\nstream\n", content.len()).into_bytes();
        stream.extend_from_slice(content);
        stream.extend_from_slice(b"\nendstream");
        self.write_object(content_id, &stream)?;

        let page = format!(
            "<< /Type /Page /Parent {PAGES_ID} 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] \
             /Resources << /Font << /{} {FONT_REGULAR_ID} 0 R /{} {FONT_BOLD_ID} 0 R >> >> \
             /Contents {content_id} 0 R >>",
            Font::Regular.resource(),
            Font::Bold.resource(),
        );
        self.write_object(page_id, page.as_bytes())?;
        self.page_ids.push(page_id);
        Ok(())
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Write page tree, info, catalog, cross-reference table and trailer,
    /// then hand back the sink.
    pub fn finish(mut self, info: &[(&str, &str)]) -> Result<W, RenderError> {
        let kids: Vec<String> = self.page_ids.iter().map(|id| format!("{id} 0 R")).collect();
        let pages = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            self.page_ids.len()
        );
        self.write_object(PAGES_ID, pages.as_bytes())?;

        let mut info_body = b"<<".to_vec();
        for (key, value) in info {
            info_body.extend_from_slice(format!(" /{key} ").as_bytes());
            info_body.extend_from_slice(&literal_string(value));
        }
        info_body.extend_from_slice(b" >>");
        self.write_object(INFO_ID, &info_body)?;

        let catalog = format!("<< /Type /Catalog /Pages {PAGES_ID} 0 R >>");
        self.write_object(CATALOG_ID, catalog.as_bytes())?;

        let xref_at = self.position();
        let size = self.offsets.len() + 1;
        let mut xref = format!("xref\n0 {size}\n0000000000 65535 f \n");
        for offset in &self.offsets {
            // every allocated id is written before finish; a gap would be a bug
            xref.push_str(&format!("{:010} 00000 n \n", offset.unwrap_or_default()));
        }
        xref.push_str(&format!(
            "trailer\n<< /Size {size} /Root {CATALOG_ID} 0 R /Info {INFO_ID} 0 R >>\nstartxref\n{xref_at}\n%%EOF\n"
        ));
        self.pending.extend_from_slice(xref.as_bytes());

        self.emit_chunk()?;
        self.sink.flush()?;
        Ok(self.sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_string_escapes() {
        assert_eq!(literal_string("a(b)c\\"), b"(a\\(b\\)c\\\\)".to_vec());
        assert_eq!(literal_string("caf\u{e9}"), b"(caf\\351)".to_vec());
        assert_eq!(literal_string("\u{1F4B8}"), b"(?)".to_vec());
    }

    #[test]
    fn test_text_width() {
        // "Hi": H=722, i=222
        assert!((text_width("Hi", 10.0) - 9.44).abs() < 1e-4);
        assert_eq!(text_width("", 12.0), 0.0);
    }

    #[test]
    fn test_minimal_document_structure() {
        let mut pdf = PdfWriter::new(Vec::new(), CancelFlag::new());
        pdf.begin().unwrap();
        pdf.add_page(b"BT /F1 12 Tf 50 700 Td (hello) Tj ET").unwrap();
        assert_eq!(pdf.page_count(), 1);
        let bytes = pdf.finish(&[("Title", "T")]).unwrap();
        let text = String::from_utf8_lossy(&bytes);

        assert!(bytes.starts_with(b"%PDF-1.4\n"));
        assert!(text.ends_with("%%EOF\n"));
        assert!(text.contains("/Count 1"));
        assert!(text.contains("xref\n0 8\n"));

        // startxref points at the xref keyword
        let start: usize = text
            .rsplit("startxref\n")
            .next()
            .and_then(|tail| tail.lines().next())
            .and_then(|n| n.parse().ok())
            .unwrap();
        assert_eq!(&bytes[start..start + 4], b"xref");

        // object 6 (first content stream) offset is recorded correctly
        let entry = text.split("0000000000 65535 f \n").nth(1).unwrap();
        let sixth: usize = entry.lines().nth(5).unwrap()[..10].parse().unwrap();
        assert!(bytes[sixth..].starts_with(b"6 0 obj"));
    }
}
