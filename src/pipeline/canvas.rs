//! Minimal PDF construction over `lopdf`.
//!
//! The two native converters need exactly two page shapes: a single page
//! sized to an image, and letter-sized pages of monospace text. Building
//! those directly on `lopdf`'s object graph keeps the dependency surface
//! small and the output predictable: there is no layout engine here, only
//! the object dictionaries the PDF spec requires.
//!
//! Coordinates and sizes are kept integral (PDF accepts integers wherever
//! reals are allowed); at 10 pt body text, sub-point positioning buys
//! nothing.

use crate::error::ConvertError;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use std::path::Path;

/// An image payload ready for embedding as a PDF image XObject.
pub struct EncodedImage {
    pub width: u32,
    pub height: u32,
    /// `DeviceRGB` or `DeviceGray`.
    pub color_space: &'static str,
    /// `Some("DCTDecode")` for JPEG passthrough; `None` for raw samples,
    /// which get flate-compressed at save time.
    pub filter: Option<&'static str>,
    pub data: Vec<u8>,
}

/// Geometry for one run of text pages.
#[derive(Debug, Clone, Copy)]
pub struct TextGeometry {
    pub page_width: i64,
    pub page_height: i64,
    pub margin: i64,
    pub font_size: i64,
    pub line_height: i64,
}

impl TextGeometry {
    /// How many lines fit on one page: the first line sits at the top
    /// margin, and lines keep going while the cursor stays at or above the
    /// bottom margin.
    pub fn lines_per_page(&self) -> usize {
        let usable = self.page_height - 2 * self.margin;
        if usable < 0 || self.line_height <= 0 {
            return 1;
        }
        (usable / self.line_height) as usize + 1
    }
}

/// Incrementally assembled PDF document.
pub struct PdfBuilder {
    doc: Document,
    pages_id: ObjectId,
    kids: Vec<Object>,
    font_id: Option<ObjectId>,
}

impl PdfBuilder {
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        PdfBuilder {
            doc,
            pages_id,
            kids: Vec::new(),
            font_id: None,
        }
    }

    /// Append one page sized exactly to the image, with the image drawn
    /// across the full page.
    pub fn add_image_page(&mut self, image: EncodedImage) -> Result<(), ConvertError> {
        let (w, h) = (image.width as i64, image.height as i64);

        let mut xobject = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => w,
            "Height" => h,
            "ColorSpace" => image.color_space,
            "BitsPerComponent" => 8,
        };
        if let Some(filter) = image.filter {
            xobject.set("Filter", filter);
        }
        let image_id = self.doc.add_object(Stream::new(xobject, image.data));

        // Scale the unit image square up to the page, then paint it.
        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![w.into(), 0.into(), 0.into(), h.into(), 0.into(), 0.into()],
                ),
                Operation::new("Do", vec!["Im0".into()]),
                Operation::new("Q", vec![]),
            ],
        };
        let content_id = self.add_content(content)?;

        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![0.into(), 0.into(), w.into(), h.into()],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! { "Im0" => image_id },
            },
        });
        self.kids.push(page_id.into());
        Ok(())
    }

    /// Append one page of text lines, top to bottom from the top margin.
    ///
    /// `lines` must already fit the page; pagination is the caller's job
    /// (see [`TextGeometry::lines_per_page`]).
    pub fn add_text_page(
        &mut self,
        geometry: TextGeometry,
        lines: &[String],
    ) -> Result<(), ConvertError> {
        let font_id = self.courier_font_id();

        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), geometry.font_size.into()]),
            Operation::new(
                "Td",
                vec![
                    geometry.margin.into(),
                    (geometry.page_height - geometry.margin).into(),
                ],
            ),
        ];
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                operations.push(Operation::new(
                    "Td",
                    vec![0.into(), (-geometry.line_height).into()],
                ));
            }
            operations.push(Operation::new(
                "Tj",
                vec![Object::String(
                    encode_text(line),
                    lopdf::StringFormat::Literal,
                )],
            ));
        }
        operations.push(Operation::new("ET", vec![]));

        let content_id = self.add_content(Content { operations })?;

        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![
                0.into(),
                0.into(),
                geometry.page_width.into(),
                geometry.page_height.into(),
            ],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
        });
        self.kids.push(page_id.into());
        Ok(())
    }

    /// Number of pages appended so far.
    pub fn page_count(&self) -> usize {
        self.kids.len()
    }

    /// Finish the document and write it to `path`.
    ///
    /// Assembles the page tree and catalog, flate-compresses unfiltered
    /// streams, and saves.
    pub fn save(mut self, path: &Path) -> Result<(), ConvertError> {
        let count = self.kids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => self.kids,
                "Count" => count,
            }),
        );
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);
        self.doc.compress();
        self.doc
            .save(path)
            .map_err(|e| ConvertError::OutputWrite {
                path: path.to_path_buf(),
                source: std::io::Error::other(e.to_string()),
            })?;
        Ok(())
    }

    fn courier_font_id(&mut self) -> ObjectId {
        if let Some(id) = self.font_id {
            return id;
        }
        let id = self.doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
            "Encoding" => "WinAnsiEncoding",
        });
        self.font_id = Some(id);
        id
    }

    fn add_content(&mut self, content: Content) -> Result<ObjectId, ConvertError> {
        let encoded = content
            .encode()
            .map_err(|e| ConvertError::conversion(format!("content stream encoding: {e}")))?;
        Ok(self.doc.add_object(Stream::new(dictionary! {}, encoded)))
    }
}

impl Default for PdfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Map a line to the single-byte encoding of the base-14 fonts.
///
/// Characters above U+00FF have no slot in WinAnsi and become `?`; tabs
/// have no glyph at all and expand to spaces. This extends the converter's
/// replace-don't-fail posture from the byte level to the glyph level.
fn encode_text(line: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(line.len());
    for c in line.chars() {
        match c {
            '\t' => out.extend_from_slice(b"    "),
            c if (c as u32) <= 0xFF => out.push(c as u32 as u8),
            _ => out.push(b'?'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn letter() -> TextGeometry {
        TextGeometry {
            page_width: 612,
            page_height: 792,
            margin: 72,
            font_size: 10,
            line_height: 14,
        }
    }

    #[test]
    fn letter_page_fits_forty_seven_lines() {
        // (792 - 144) / 14 = 46 full advances below the first line.
        assert_eq!(letter().lines_per_page(), 47);
    }

    #[test]
    fn degenerate_geometry_still_fits_one_line() {
        let g = TextGeometry {
            page_width: 100,
            page_height: 20,
            margin: 40,
            font_size: 10,
            line_height: 14,
        };
        assert_eq!(g.lines_per_page(), 1);
    }

    #[test]
    fn encode_text_replaces_unencodable_chars() {
        assert_eq!(encode_text("abc"), b"abc");
        assert_eq!(encode_text("caf\u{e9}"), b"caf\xe9");
        assert_eq!(encode_text("\u{4e16}\u{754c}"), b"??");
        assert_eq!(encode_text("a\tb"), b"a    b");
    }

    #[test]
    fn saved_document_reloads_with_expected_page_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("two_pages.pdf");

        let mut builder = PdfBuilder::new();
        builder
            .add_text_page(letter(), &["first page".to_string()])
            .unwrap();
        builder
            .add_text_page(letter(), &["second page".to_string()])
            .unwrap();
        assert_eq!(builder.page_count(), 2);
        builder.save(&path).unwrap();

        let doc = Document::load(&path).expect("output must be a loadable PDF");
        assert_eq!(doc.get_pages().len(), 2);
    }

    #[test]
    fn image_page_media_box_matches_pixel_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("img.pdf");

        let mut builder = PdfBuilder::new();
        builder
            .add_image_page(EncodedImage {
                width: 30,
                height: 20,
                color_space: "DeviceRGB",
                filter: None,
                data: vec![0u8; 30 * 20 * 3],
            })
            .unwrap();
        builder.save(&path).unwrap();

        let doc = Document::load(&path).unwrap();
        let (_, page_id) = doc.get_pages().into_iter().next().unwrap();
        let page = doc.get_dictionary(page_id).unwrap();
        let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
        assert_eq!(media_box[2].as_i64().unwrap(), 30);
        assert_eq!(media_box[3].as_i64().unwrap(), 20);
    }
}
