// src/render/pdf_surface.rs
//
// lopdf-backed drawing surface.
//
// ARCHITECTURE:
// - Builds the object graph in memory; nothing touches disk until `save`
// - One shared Resources dictionary (fonts + image XObjects) for all pages
// - Standard Type1 Helvetica faces with WinAnsiEncoding; no font embedding
//
// CRITICAL RULES:
// - `save` writes to a sibling temp file and renames it into place, so an
//   interrupted write never leaves a truncated document behind
// - Each distinct image path becomes exactly one XObject

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::{ColorType, DynamicImage, ImageFormat, ImageReader};
use log::debug;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};

use crate::error::{AppError, AppResult};
use crate::render::surface::{DrawingSurface, FontStyle, Rect};

const REGULAR_FONT: &str = "F1";
const BOLD_FONT: &str = "F2";

struct PageBuilder {
    width: f32,
    height: f32,
    operations: Vec<Operation>,
    annotations: Vec<ObjectId>,
}

struct ImageXObject {
    name: String,
    width: u32,
    height: u32,
}

pub struct PdfSurface {
    document: Document,
    pages_id: ObjectId,
    resources_id: ObjectId,
    page_ids: Vec<ObjectId>,
    current: Option<PageBuilder>,
    fonts: Vec<(String, ObjectId)>,
    images: HashMap<PathBuf, ImageXObject>,
    xobjects: Vec<(String, ObjectId)>,
}

impl PdfSurface {
    pub fn new() -> Self {
        let mut document = Document::with_version("1.5");
        let pages_id = document.new_object_id();
        let resources_id = document.new_object_id();

        let fonts = [(REGULAR_FONT, "Helvetica"), (BOLD_FONT, "Helvetica-Bold")]
            .iter()
            .map(|(key, base_font)| {
                let id = document.add_object(dictionary! {
                    "Type" => "Font",
                    "Subtype" => "Type1",
                    "BaseFont" => *base_font,
                    "Encoding" => "WinAnsiEncoding",
                });
                (key.to_string(), id)
            })
            .collect();

        Self {
            document,
            pages_id,
            resources_id,
            page_ids: Vec::new(),
            current: None,
            fonts,
            images: HashMap::new(),
            xobjects: Vec::new(),
        }
    }

    fn page(&mut self) -> AppResult<&mut PageBuilder> {
        self.current
            .as_mut()
            .ok_or_else(|| AppError::Other("Drawing before begin_page".to_string()))
    }

    fn flush_page(&mut self) -> AppResult<()> {
        let Some(page) = self.current.take() else {
            return Ok(());
        };

        let content = Content {
            operations: page.operations,
        };
        let content_id = self
            .document
            .add_object(Stream::new(dictionary! {}, content.encode()?));

        let mut page_dict = dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![0.into(), 0.into(), page.width.into(), page.height.into()],
            "Contents" => content_id,
            "Resources" => self.resources_id,
        };
        if !page.annotations.is_empty() {
            let annots: Vec<Object> = page.annotations.iter().map(|id| Object::Reference(*id)).collect();
            page_dict.set("Annots", annots);
        }
        let page_id = self.document.add_object(page_dict);
        self.page_ids.push(page_id);
        Ok(())
    }

    fn image_xobject(&mut self, path: &Path) -> AppResult<(String, u32, u32)> {
        if let Some(image) = self.images.get(path) {
            return Ok((image.name.clone(), image.width, image.height));
        }

        let stream = load_image_stream(path)?;
        let width = stream.dict.get(b"Width")?.as_i64()? as u32;
        let height = stream.dict.get(b"Height")?.as_i64()? as u32;
        let id = self.document.add_object(stream);
        let name = format!("Im{}", self.xobjects.len() + 1);
        self.xobjects.push((name.clone(), id));
        self.images.insert(
            path.to_path_buf(),
            ImageXObject {
                name: name.clone(),
                width,
                height,
            },
        );
        debug!("Embedded image {} as {}", path.display(), name);
        Ok((name, width, height))
    }

    fn finalize(&mut self) -> AppResult<()> {
        self.flush_page()?;

        let mut font_dict = lopdf::Dictionary::new();
        for (key, id) in &self.fonts {
            font_dict.set(key.as_bytes().to_vec(), *id);
        }
        let mut xobject_dict = lopdf::Dictionary::new();
        for (key, id) in &self.xobjects {
            xobject_dict.set(key.as_bytes().to_vec(), *id);
        }
        self.document.objects.insert(
            self.resources_id,
            Object::Dictionary(dictionary! {
                "Font" => font_dict,
                "XObject" => xobject_dict,
            }),
        );

        let kids: Vec<Object> = self.page_ids.iter().map(|id| Object::Reference(*id)).collect();
        self.document.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => self.page_ids.len() as i64,
            }),
        );

        let catalog_id = self.document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.document.trailer.set("Root", catalog_id);
        self.document.compress();
        Ok(())
    }

    /// Serializes the finished document.
    pub fn write_to<W: Write>(mut self, writer: &mut W) -> AppResult<()> {
        self.finalize()?;
        self.document.save_to(writer)?;
        Ok(())
    }

    /// Finalizes the document and commits it to `path`.
    pub fn save(self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let partial = path.with_extension("pdf.part");
        {
            let mut writer = BufWriter::new(File::create(&partial)?);
            self.write_to(&mut writer)?;
            writer.flush()?;
        }
        fs::rename(&partial, path)?;
        Ok(())
    }

    fn page_height(&self) -> f32 {
        self.current.as_ref().map(|page| page.height).unwrap_or(0.0)
    }
}

impl Default for PdfSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawingSurface for PdfSurface {
    fn begin_page(&mut self, width: f32, height: f32) -> AppResult<()> {
        self.flush_page()?;
        self.current = Some(PageBuilder {
            width,
            height,
            operations: Vec::new(),
            annotations: Vec::new(),
        });
        Ok(())
    }

    fn draw_text(&mut self, x: f32, y: f32, size: f32, style: FontStyle, text: &str) -> AppResult<()> {
        if text.trim().is_empty() {
            return Ok(());
        }
        let font = match style {
            FontStyle::Regular => REGULAR_FONT,
            FontStyle::Bold => BOLD_FONT,
        };
        let pdf_y = self.page_height() - y;
        let page = self.page()?;
        page.operations.push(Operation::new("BT", vec![]));
        page.operations.push(Operation::new("Tf", vec![font.into(), size.into()]));
        page.operations.push(Operation::new("Td", vec![x.into(), pdf_y.into()]));
        page.operations.push(Operation::new(
            "Tj",
            vec![Object::String(to_win_ansi(text), StringFormat::Literal)],
        ));
        page.operations.push(Operation::new("ET", vec![]));
        Ok(())
    }

    fn draw_image(&mut self, path: &Path, frame: Rect) -> AppResult<()> {
        self.page()?;
        let (name, width, height) = self.image_xobject(path)?;
        let fitted = frame.fit(width as f32, height as f32);
        let pdf_y = self.page_height() - fitted.y - fitted.height;

        let page = self.page()?;
        page.operations.push(Operation::new("q", vec![]));
        page.operations.push(Operation::new(
            "cm",
            vec![
                fitted.width.into(),
                0.into(),
                0.into(),
                fitted.height.into(),
                fitted.x.into(),
                pdf_y.into(),
            ],
        ));
        page.operations.push(Operation::new("Do", vec![Object::Name(name.into_bytes())]));
        page.operations.push(Operation::new("Q", vec![]));
        Ok(())
    }

    fn draw_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, width: f32) -> AppResult<()> {
        let height = self.page_height();
        let page = self.page()?;
        page.operations.push(Operation::new("w", vec![width.into()]));
        page.operations.push(Operation::new("m", vec![x1.into(), (height - y1).into()]));
        page.operations.push(Operation::new("l", vec![x2.into(), (height - y2).into()]));
        page.operations.push(Operation::new("S", vec![]));
        Ok(())
    }

    fn annotate(&mut self, frame: Rect, title: &str, contents: &str) -> AppResult<()> {
        let height = self.page_height();
        self.page()?;
        let rect = vec![
            frame.x.into(),
            (height - frame.y - frame.height).into(),
            (frame.x + frame.width).into(),
            (height - frame.y).into(),
        ];
        let annotation = self.document.add_object(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Text",
            "Rect" => rect,
            "T" => text_string(title),
            "Contents" => text_string(contents),
            "Name" => "Comment",
            "Open" => false,
        });
        self.page()?.annotations.push(annotation);
        Ok(())
    }

    fn page_count(&self) -> usize {
        self.page_ids.len() + usize::from(self.current.is_some())
    }
}

/// Builds an image XObject stream: JPEG RGB files pass through untouched,
/// everything else is decoded to RGB with alpha composited over white.
fn load_image_stream(path: &Path) -> AppResult<Stream> {
    let reader = ImageReader::open(path)?.with_guessed_format()?;
    let format = reader.format();
    let image = reader.decode()?;
    let (width, height) = (image.width(), image.height());

    if format == Some(ImageFormat::Jpeg) && image.color() == ColorType::Rgb8 {
        let mut stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width as i64,
                "Height" => height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            fs::read(path)?,
        );
        stream.allows_compression = false;
        return Ok(stream);
    }

    Ok(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        },
        flatten_on_white(&image),
    ))
}

fn flatten_on_white(image: &DynamicImage) -> Vec<u8> {
    let rgba = image.to_rgba8();
    let mut rgb = Vec::with_capacity(rgba.width() as usize * rgba.height() as usize * 3);
    for pixel in rgba.pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = u16::from(a);
        for channel in [r, g, b] {
            let blended = (u16::from(channel) * alpha + 255 * (255 - alpha)) / 255;
            rgb.push(blended as u8);
        }
    }
    rgb
}

/// Encodes `text` for a WinAnsiEncoding font; unmappable characters become '?'.
pub fn to_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' => c as u8,
            '\u{a0}'..='\u{ff}' => c as u32 as u8,
            '€' => 0x80,
            '‚' => 0x82,
            '„' => 0x84,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '™' => 0x99,
            'Œ' => 0x8C,
            'œ' => 0x9C,
            _ => b'?',
        })
        .collect()
}

/// PDF text string: literal for ASCII, UTF-16BE with BOM otherwise.
fn text_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::String(text.as_bytes().to_vec(), StringFormat::Literal);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn render(surface: PdfSurface) -> Document {
        let mut bytes = Vec::new();
        surface.write_to(&mut bytes).unwrap();
        Document::load_mem(&bytes).unwrap()
    }

    #[test]
    fn test_win_ansi_encoding() {
        assert_eq!(to_win_ansi("Price: 2.00€"), b"Price: 2.00\x80".to_vec());
        assert_eq!(to_win_ansi("è"), vec![0xE8]);
        assert_eq!(to_win_ansi("•"), vec![0x95]);
        assert_eq!(to_win_ansi("\u{4e00}"), b"?".to_vec());
    }

    #[test]
    fn test_pages_have_their_own_height() {
        let mut surface = PdfSurface::new();
        surface.begin_page(612.0, 526.0).unwrap();
        surface.draw_text(50.0, 20.0, 16.0, FontStyle::Bold, "Anger").unwrap();
        surface.begin_page(612.0, 816.0).unwrap();
        surface.draw_line(30.0, 776.0, 582.0, 776.0, 1.0).unwrap();
        assert_eq!(surface.page_count(), 2);

        let doc = render(surface);
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 2);

        let second = doc.get_object(pages[&2]).unwrap().as_dict().unwrap();
        let media_box = second.get(b"MediaBox").unwrap().as_array().unwrap();
        assert_eq!(media_box[3].as_float().unwrap(), 816.0);
    }

    #[test]
    fn test_drawing_without_page_fails() {
        let mut surface = PdfSurface::new();
        let result = surface.draw_text(0.0, 0.0, 12.0, FontStyle::Regular, "x");
        assert!(result.is_err());
    }

    #[test]
    fn test_annotation_attached_to_page() {
        let mut surface = PdfSurface::new();
        surface.begin_page(612.0, 400.0).unwrap();
        surface
            .annotate(
                Rect::new(270.0, 300.0, 30.0, 10.0),
                "flying",
                "This creature can't be blocked except by creatures with flying or reach.",
            )
            .unwrap();

        let doc = render(surface);
        let page_id = doc.get_pages()[&1];
        let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
        let annots = page.get(b"Annots").unwrap().as_array().unwrap();
        assert_eq!(annots.len(), 1);

        let annot = doc
            .get_object(annots[0].as_reference().unwrap())
            .unwrap()
            .as_dict()
            .unwrap();
        assert_eq!(annot.get(b"Subtype").unwrap().as_name().unwrap(), b"Text");
    }

    #[test]
    fn test_images_are_deduplicated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("symbol.png");
        let mut img = RgbaImage::new(4, 4);
        for pixel in img.pixels_mut() {
            *pixel = Rgba([200, 0, 0, 128]);
        }
        img.save(&path).unwrap();

        let mut surface = PdfSurface::new();
        surface.begin_page(612.0, 400.0).unwrap();
        surface.draw_image(&path, Rect::new(270.0, 100.0, 15.0, 15.0)).unwrap();
        surface.draw_image(&path, Rect::new(287.0, 100.0, 15.0, 15.0)).unwrap();
        assert_eq!(surface.xobjects.len(), 1);

        render(surface);
    }

    #[test]
    fn test_unreadable_image_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.jpg");
        fs::write(&path, b"not an image").unwrap();

        let mut surface = PdfSurface::new();
        surface.begin_page(612.0, 400.0).unwrap();
        assert!(surface.draw_image(&path, Rect::new(0.0, 0.0, 10.0, 10.0)).is_err());
        assert!(surface
            .draw_image(&dir.path().join("absent.jpg"), Rect::new(0.0, 0.0, 10.0, 10.0))
            .is_err());
    }

    #[test]
    fn test_flatten_on_white() {
        let mut img = RgbaImage::new(1, 1);
        img.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
        assert_eq!(flatten_on_white(&DynamicImage::ImageRgba8(img)), vec![255, 255, 255]);
    }

    #[test]
    fn test_save_commits_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lists").join("deck.pdf");

        let mut surface = PdfSurface::new();
        surface.begin_page(612.0, 300.0).unwrap();
        surface.draw_text(50.0, 50.0, 20.0, FontStyle::Bold, "Summary").unwrap();
        surface.save(&path).unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("pdf.part").exists());
        assert!(fs::read(&path).unwrap().starts_with(b"%PDF-1.5"));
    }
}
