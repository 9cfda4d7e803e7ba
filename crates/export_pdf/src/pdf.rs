//! printpdf backend for [`Canvas`]

use std::io::BufWriter;

use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, Color, ColorBits, ColorSpace, Image, ImageTransform, ImageXObject,
    IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference, Point,
    Polygon, Px,
};

use crate::canvas::{Canvas, Rgb};
use crate::error::ExportError;
use crate::geometry::PageGeometry;
use crate::images::DecodedImage;
use crate::measure::FontStyle;

const LAYER_NAME: &str = "Content";

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    mono: IndirectFontRef,
}

impl Fonts {
    fn get(&self, style: FontStyle) -> &IndirectFontRef {
        match style {
            FontStyle::Regular => &self.regular,
            FontStyle::Bold => &self.bold,
            FontStyle::Mono => &self.mono,
        }
    }
}

pub struct PdfCanvas {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    fonts: Fonts,
    width: f32,
    height: f32,
    pages: usize,
}

impl PdfCanvas {
    pub fn new(title: &str, geometry: &PageGeometry) -> Result<Self, ExportError> {
        let (doc, page, layer) = PdfDocument::new(
            title,
            Mm(geometry.width),
            Mm(geometry.height),
            LAYER_NAME,
        );
        let layer = doc.get_page(page).get_layer(layer);

        let builtin = |font: BuiltinFont| {
            doc.add_builtin_font(font)
                .map_err(|e| ExportError::Font(e.to_string()))
        };
        let fonts = Fonts {
            regular: builtin(BuiltinFont::Helvetica)?,
            bold: builtin(BuiltinFont::HelveticaBold)?,
            mono: builtin(BuiltinFont::Courier)?,
        };

        Ok(Self {
            doc,
            layer,
            fonts,
            width: geometry.width,
            height: geometry.height,
            pages: 1,
        })
    }

    pub fn page_count(&self) -> usize {
        self.pages
    }

    /// Serializes the document
    pub fn finish(self) -> Result<Vec<u8>, ExportError> {
        let mut writer = BufWriter::new(Vec::<u8>::new());
        self.doc
            .save(&mut writer)
            .map_err(|e| ExportError::Pdf(e.to_string()))?;
        writer
            .into_inner()
            .map_err(|e| ExportError::Pdf(e.to_string()))
    }

    /// Converts a top-down y into PDF space
    fn flip(&self, y: f32) -> Mm {
        Mm(self.height - y)
    }

    fn point(&self, x: f32, y: f32) -> Point {
        Point::new(Mm(x), self.flip(y))
    }
}

fn pdf_color(color: Rgb) -> Color {
    let (r, g, b) = color.unit();
    Color::Rgb(printpdf::Rgb::new(r, g, b, None))
}

impl Canvas for PdfCanvas {
    fn page_size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, size: f32, style: FontStyle, color: Rgb) {
        self.layer.set_fill_color(pdf_color(color));
        self.layer
            .use_text(text, size, Mm(x), self.flip(y), self.fonts.get(style));
    }

    fn draw_line(&mut self, from: (f32, f32), to: (f32, f32), thickness: f32, color: Rgb) {
        self.layer.set_outline_color(pdf_color(color));
        self.layer.set_outline_thickness(thickness);
        self.layer.add_line(Line {
            points: vec![
                (self.point(from.0, from.1), false),
                (self.point(to.0, to.1), false),
            ],
            is_closed: false,
        });
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgb) {
        self.layer.set_fill_color(pdf_color(color));
        let ring = vec![
            (self.point(x, y), false),
            (self.point(x + width, y), false),
            (self.point(x + width, y + height), false),
            (self.point(x, y + height), false),
        ];
        self.layer.add_polygon(Polygon {
            rings: vec![ring],
            mode: PaintMode::Fill,
            winding_order: WindingOrder::NonZero,
        });
    }

    fn draw_image(&mut self, image: &DecodedImage, x: f32, y: f32, width: f32, height: f32) {
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        let xobject = Image::from(ImageXObject {
            width: Px(image.width_px as usize),
            height: Px(image.height_px as usize),
            color_space: ColorSpace::Rgb,
            bits_per_component: ColorBits::Bit8,
            interpolate: true,
            image_data: image.rgb.clone(),
            image_filter: None,
            clipping_bbox: None,
            smask: None,
        });

        // At this dpi the image's natural width equals `width` millimetres;
        // the vertical scale corrects any difference in aspect ratio.
        let dpi = image.width_px as f32 / (width / 25.4);
        let natural_height = image.height_px as f32 / dpi * 25.4;
        xobject.add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(x)),
                translate_y: Some(self.flip(y + height)),
                dpi: Some(dpi),
                scale_y: Some(height / natural_height),
                ..Default::default()
            },
        );
    }

    fn new_page(&mut self) {
        let (page, layer) = self
            .doc
            .add_page(Mm(self.width), Mm(self.height), LAYER_NAME);
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.pages += 1;
    }
}
