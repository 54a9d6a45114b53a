use super::image::SheetImage;
use super::objects::{Dictionary, Object, ObjectId};
use crate::error::Result;
use std::collections::BTreeMap;
use std::io::Write;

const CATALOG_ID: ObjectId = ObjectId::new(1, 0);
const PAGES_ID: ObjectId = ObjectId::new(2, 0);
const PAGE_ID: ObjectId = ObjectId::new(3, 0);
const CONTENT_ID: ObjectId = ObjectId::new(4, 0);
const IMAGE_ID: ObjectId = ObjectId::new(5, 0);
const INFO_ID: ObjectId = ObjectId::new(6, 0);

/// Resource name of the sheet image on its page
const IMAGE_NAME: &str = "Im1";

/// Document information dictionary entries
#[derive(Debug, Clone, Default)]
pub struct DocumentInfo {
    pub title: Option<String>,
    pub producer: Option<String>,
}

/// Writes a one-page PDF whose page is covered by a single image
pub struct PdfWriter<W: Write> {
    writer: W,
    xref_positions: BTreeMap<ObjectId, u64>,
    current_position: u64,
}

impl<W: Write> PdfWriter<W> {
    pub fn new_with_writer(writer: W) -> Self {
        Self {
            writer,
            xref_positions: BTreeMap::new(),
            current_position: 0,
        }
    }

    /// Write the page. `page_size` is (width, height) in points.
    pub fn write_image_page(
        &mut self,
        image: &SheetImage,
        page_size: (f64, f64),
        info: &DocumentInfo,
    ) -> Result<()> {
        self.write_header()?;
        self.write_catalog()?;
        self.write_pages()?;
        self.write_page(page_size)?;
        self.write_page_content(page_size)?;
        self.write_object(IMAGE_ID, image.to_pdf_object())?;
        self.write_info(info)?;

        let xref_position = self.current_position;
        self.write_xref()?;
        self.write_trailer(xref_position)?;

        self.writer.flush()?;
        Ok(())
    }

    fn write_header(&mut self) -> Result<()> {
        self.write_bytes(b"%PDF-1.7\n")?;
        // Binary comment to ensure file is treated as binary
        self.write_bytes(&[b'%', 0xE2, 0xE3, 0xCF, 0xD3, b'\n'])?;
        Ok(())
    }

    fn write_catalog(&mut self) -> Result<()> {
        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::name("Catalog"));
        catalog.set("Pages", PAGES_ID);
        self.write_object(CATALOG_ID, catalog.into())
    }

    fn write_pages(&mut self) -> Result<()> {
        let mut pages = Dictionary::new();
        pages.set("Type", Object::name("Pages"));
        pages.set("Count", 1u32);
        pages.set("Kids", vec![Object::Reference(PAGE_ID)]);
        self.write_object(PAGES_ID, pages.into())
    }

    fn write_page(&mut self, (width, height): (f64, f64)) -> Result<()> {
        let mut xobjects = Dictionary::new();
        xobjects.set(IMAGE_NAME, IMAGE_ID);

        let mut resources = Dictionary::new();
        resources.set("XObject", xobjects);

        let mut page = Dictionary::new();
        page.set("Type", Object::name("Page"));
        page.set("Parent", PAGES_ID);
        page.set(
            "MediaBox",
            vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(width),
                Object::Real(height),
            ],
        );
        page.set("Contents", CONTENT_ID);
        page.set("Resources", resources);
        self.write_object(PAGE_ID, page.into())
    }

    fn write_page_content(&mut self, (width, height): (f64, f64)) -> Result<()> {
        // Scale the unit-square image to the full page
        let content = format!(
            "q\n{} 0 0 {} 0 0 cm\n/{IMAGE_NAME} Do\nQ\n",
            format_real(width),
            format_real(height)
        );
        self.write_object(
            CONTENT_ID,
            Object::Stream(Dictionary::new(), content.into_bytes()),
        )
    }

    fn write_info(&mut self, info: &DocumentInfo) -> Result<()> {
        let mut dict = Dictionary::new();
        if let Some(ref title) = info.title {
            dict.set("Title", Object::String(title.clone()));
        }
        if let Some(ref producer) = info.producer {
            dict.set("Producer", Object::String(producer.clone()));
        }
        self.write_object(INFO_ID, dict.into())
    }

    fn write_object(&mut self, id: ObjectId, object: Object) -> Result<()> {
        self.xref_positions.insert(id, self.current_position);

        let header = format!("{} {} obj\n", id.number(), id.generation());
        self.write_bytes(header.as_bytes())?;
        self.write_object_value(&object)?;
        self.write_bytes(b"\nendobj\n")?;
        Ok(())
    }

    fn write_object_value(&mut self, object: &Object) -> Result<()> {
        match object {
            Object::Integer(i) => self.write_bytes(i.to_string().as_bytes())?,
            Object::Real(f) => self.write_bytes(format_real(*f).as_bytes())?,
            Object::String(s) if s.is_ascii() => {
                self.write_bytes(b"(")?;
                self.write_bytes(escape_string(s).as_bytes())?;
                self.write_bytes(b")")?;
            }
            Object::String(s) => {
                self.write_bytes(utf16_hex_string(s).as_bytes())?;
            }
            Object::Name(n) => {
                self.write_bytes(b"/")?;
                self.write_bytes(n.as_bytes())?;
            }
            Object::Array(arr) => {
                self.write_bytes(b"[")?;
                for (i, obj) in arr.iter().enumerate() {
                    if i > 0 {
                        self.write_bytes(b" ")?;
                    }
                    self.write_object_value(obj)?;
                }
                self.write_bytes(b"]")?;
            }
            Object::Dictionary(dict) => {
                self.write_bytes(b"<<")?;
                for (key, value) in dict.entries() {
                    self.write_bytes(b"\n/")?;
                    self.write_bytes(key.as_bytes())?;
                    self.write_bytes(b" ")?;
                    self.write_object_value(value)?;
                }
                self.write_bytes(b"\n>>")?;
            }
            Object::Stream(dict, data) => {
                let mut dict = dict.clone();
                dict.set("Length", data.len() as i64);
                self.write_object_value(&Object::Dictionary(dict))?;
                self.write_bytes(b"\nstream\n")?;
                self.write_bytes(data)?;
                self.write_bytes(b"\nendstream")?;
            }
            Object::Reference(id) => {
                self.write_bytes(id.to_string().as_bytes())?;
            }
        }
        Ok(())
    }

    fn write_xref(&mut self) -> Result<()> {
        let max_obj_num = self
            .xref_positions
            .keys()
            .map(|id| id.number())
            .max()
            .unwrap_or(0);

        self.write_bytes(format!("xref\n0 {}\n", max_obj_num + 1).as_bytes())?;
        self.write_bytes(b"0000000000 65535 f \n")?;

        for obj_num in 1..=max_obj_num {
            let entry = match self.xref_positions.get(&ObjectId::new(obj_num, 0)) {
                Some(position) => format!("{position:010} 00000 n \n"),
                None => "0000000000 00000 f \n".to_string(),
            };
            self.write_bytes(entry.as_bytes())?;
        }
        Ok(())
    }

    fn write_trailer(&mut self, xref_position: u64) -> Result<()> {
        let size = self
            .xref_positions
            .keys()
            .map(|id| id.number())
            .max()
            .unwrap_or(0)
            + 1;

        let mut trailer = Dictionary::new();
        trailer.set("Size", size);
        trailer.set("Root", CATALOG_ID);
        trailer.set("Info", INFO_ID);

        self.write_bytes(b"trailer\n")?;
        self.write_object_value(&Object::Dictionary(trailer))?;
        self.write_bytes(format!("\nstartxref\n{xref_position}\n%%EOF\n").as_bytes())?;
        Ok(())
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.writer.write_all(data)?;
        self.current_position += data.len() as u64;
        Ok(())
    }
}

/// Shortest decimal form with at most six fractional digits
fn format_real(value: f64) -> String {
    let formatted = format!("{value:.6}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

fn escape_string(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '(' | ')' | '\\' => {
                escaped.push('\\');
                escaped.push(c);
            }
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Text string outside ASCII: UTF-16BE with a byte order mark, hex encoded
fn utf16_hex_string(s: &str) -> String {
    let mut hex = String::with_capacity(6 + s.len() * 4);
    hex.push_str("<FEFF");
    for unit in s.encode_utf16() {
        hex.push_str(&format!("{unit:04X}"));
    }
    hex.push('>');
    hex
}
