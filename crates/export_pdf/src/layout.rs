//! Pagination and layout
//!
//! [`LayoutEngine`] walks a document top to bottom, keeping a cursor `y` and
//! the current page number. Before every block it measures the block's
//! height and, if the block would cross the footer band, closes the page
//! (footer), opens a new one (header) and resets the cursor. Item tables
//! repeat their column header after a break.
//!
//! All figures come from [`DocumentPricing`], so the export always agrees
//! with the live preview. The engine reads no clock and no randomness: the
//! same inputs always produce the same pages.

use std::fmt::Write as _;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, warn};

use core_kernel::{format_amount, Currency};
use domain_document::item::{DESCRIPTION, MARKUP, QUANTITY, TOTAL, UNIT_PRICE, VAT};
use domain_document::{
    ColumnRegistry, Company, CostCategory, DataType, DocumentState, Item, ItemValue, MarkupType,
    Subcategory, ThirdPartyTicket,
};
use domain_pricing::{calculate_payment_plan, financed_balance, vat_applies, DocumentPricing};

use crate::canvas::{Canvas, Rgb};
use crate::geometry::{PageGeometry, PT_TO_MM};
use crate::images::{decode_data_url, fit, DecodedImage};
use crate::measure::{line_height, text_width, truncate_to_width, wrap_text, FontStyle};
use crate::numbering::footer_text;
use crate::receipt::{receipt_lines, RECEIPT_WIDTH};
use crate::table::{column_slots, ColumnSlot};

const TITLE_SIZE: f32 = 14.0;
const HEADING_SIZE: f32 = 11.0;
const BODY_SIZE: f32 = 9.0;
const SMALL_SIZE: f32 = 7.5;

/// Horizontal padding inside table cells
const CELL_PAD: f32 = 1.5;
/// Vertical padding above and below row text
const ROW_PAD: f32 = 1.2;
/// Space after each block
const BLOCK_GAP: f32 = 4.0;

const LOGO_MAX: (f32, f32) = (28.0, 20.0);
const COUPON_IMAGE_MAX: f32 = 30.0;
const SIGNATURE_HEIGHT: f32 = 18.0;
const TOTALS_WIDTH: f32 = 75.0;

const DEFAULT_DATE_FORMAT: &str = "%d/%m/%Y";
pub const IMAGE_LOAD_FAILED: &str = "Image could not be loaded";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockKind {
    Client,
    Title,
    CategoryTitle,
    SubcategoryHeader,
    ItemRow,
    CategoryTotals,
    Terms,
    Coupon,
    GrandTotals,
    PaymentPlan,
    Signatures,
    TicketAnnex,
}

/// A block and the page it landed on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacedBlock {
    pub page: u32,
    pub kind: BlockKind,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RenderSummary {
    pub pages: u32,
    pub blocks: Vec<PlacedBlock>,
    /// Optional elements left out, e.g. images that failed to decode
    pub warnings: Vec<String>,
}

impl RenderSummary {
    /// Blocks placed on a given page, in order
    pub fn blocks_on(&self, page: u32) -> impl Iterator<Item = &PlacedBlock> {
        self.blocks.iter().filter(move |b| b.page == page)
    }

    pub fn page_of(&self, kind: BlockKind) -> Option<u32> {
        self.blocks.iter().find(|b| b.kind == kind).map(|b| b.page)
    }
}

/// Column layout of one category's item table
#[derive(Debug, Clone)]
struct TableLayout {
    slots: Vec<ColumnSlot>,
    labels: Vec<Vec<String>>,
    numeric: Vec<bool>,
    header_height: f32,
}

pub struct LayoutEngine<'a, C: Canvas> {
    canvas: &'a mut C,
    geometry: PageGeometry,
    document: &'a DocumentState,
    company: &'a Company,
    registry: &'a ColumnRegistry,
    pricing: DocumentPricing,
    accent: Rgb,
    logo: Option<DecodedImage>,
    y: f32,
    page: u32,
    page_has_content: bool,
    table: Option<TableLayout>,
    blocks: Vec<PlacedBlock>,
    warnings: Vec<String>,
}

impl<'a, C: Canvas> LayoutEngine<'a, C> {
    pub fn new(
        canvas: &'a mut C,
        document: &'a DocumentState,
        company: &'a Company,
        registry: &'a ColumnRegistry,
    ) -> Self {
        let (width, height) = canvas.page_size();
        let geometry = PageGeometry {
            width,
            height,
            ..PageGeometry::letter()
        };
        let accent = Rgb::parse_hex(&document.layout.accent_color).unwrap_or(Rgb::BLACK);

        let mut engine = Self {
            canvas,
            geometry,
            document,
            company,
            registry,
            pricing: DocumentPricing::compute(document),
            accent,
            logo: None,
            y: geometry.content_top(),
            page: 1,
            page_has_content: false,
            table: None,
            blocks: Vec::new(),
            warnings: Vec::new(),
        };
        if document.layout.show_logo {
            if let Some(url) = company.logo.as_deref() {
                engine.logo = engine.load_image("Logo", url);
            }
        }
        engine
    }

    /// Lays out the whole document and returns where everything went
    pub fn render(mut self) -> RenderSummary {
        let document = self.document;

        self.draw_header();
        self.client_block();
        self.title_block();
        for category in &document.categories {
            self.category_block(category);
        }
        self.terms_block();
        self.coupon_block();
        self.grand_totals_block();
        self.payment_plan_block();
        self.signatures_block();

        for (index, ticket) in document.third_party_tickets.iter().enumerate() {
            self.annex_block(index + 1, ticket);
        }
        self.draw_footer();

        debug!(
            document_id = %document.id,
            pages = self.page,
            blocks = self.blocks.len(),
            warnings = self.warnings.len(),
            "Document laid out"
        );
        RenderSummary {
            pages: self.page,
            blocks: self.blocks,
            warnings: self.warnings,
        }
    }

    // Pagination

    /// Breaks the page if `height` does not fit below the cursor. Callers
    /// split blocks taller than [`Self::fits_on_a_page`] before asking.
    fn ensure_space(&mut self, height: f32) {
        if self.page_has_content && self.y + height > self.geometry.content_bottom() {
            self.continue_on_new_page();
        }
    }

    /// Whether a block of `height` fits on an empty page, below a repeated
    /// table header if a table is open
    fn fits_on_a_page(&self, height: f32) -> bool {
        let header = self.table.as_ref().map_or(0.0, |t| t.header_height);
        height + header <= self.geometry.content_height()
    }

    /// New page, with the open table's column header repeated
    fn continue_on_new_page(&mut self) {
        self.break_page();
        if let Some(table) = self.table.take() {
            self.draw_column_header(&table);
            self.table = Some(table);
        }
    }

    /// Draws left-aligned lines one at a time, breaking the page between
    /// lines as needed
    fn flow_lines(&mut self, lines: &[String], size: f32, style: FontStyle, color: Rgb) {
        let x = self.geometry.left();
        for line in lines {
            self.ensure_space(line_height(size));
            self.advance(line_height(size));
            self.canvas.draw_text(line, x, self.y, size, style, color);
            self.page_has_content = true;
        }
    }

    fn break_page(&mut self) {
        self.draw_footer();
        self.canvas.new_page();
        self.page += 1;
        self.y = self.geometry.content_top();
        self.page_has_content = false;
        self.draw_header();
    }

    fn place(&mut self, kind: BlockKind, label: impl Into<String>) {
        self.page_has_content = true;
        self.blocks.push(PlacedBlock {
            page: self.page,
            kind,
            label: label.into(),
        });
    }

    // Header and footer

    fn draw_header(&mut self) {
        let g = self.geometry;
        let document = self.document;
        let company = self.company;
        let top = g.margin;

        let mut text_x = g.left();
        if let Some(logo) = self.logo.as_ref() {
            let (w, h) = fit(logo, LOGO_MAX.0, LOGO_MAX.1);
            self.canvas.draw_image(logo, g.left(), top, w, h);
            text_x += w + 4.0;
        }

        // Right column: document type, folio, dates
        let right = g.right();
        let mut right_y = top + TITLE_SIZE * PT_TO_MM;
        let label = document.doc_type.label().to_uppercase();
        self.text_right(&label, right, right_y, TITLE_SIZE, FontStyle::Bold, self.accent);
        let mut right_lines = vec![
            format!("No. {}", document.doc_number),
            format!("Date: {}", self.date(document.issue_date)),
        ];
        if let Some(valid_until) = document.valid_until {
            right_lines.push(format!("Valid until: {}", self.date(valid_until)));
        }
        let right_width = right_lines
            .iter()
            .map(|l| text_width(l, BODY_SIZE, FontStyle::Regular))
            .fold(text_width(&label, TITLE_SIZE, FontStyle::Bold), f32::max);
        for line in &right_lines {
            right_y += line_height(BODY_SIZE);
            self.text_right(line, right, right_y, BODY_SIZE, FontStyle::Regular, Rgb::BLACK);
        }

        // Left column: company identity
        let max_width = (right - right_width - 6.0 - text_x).max(20.0);
        let mut y = top + HEADING_SIZE * PT_TO_MM;
        let name = truncate_to_width(&company.name, max_width, 12.0, FontStyle::Bold);
        self.canvas
            .draw_text(&name, text_x, y, 12.0, FontStyle::Bold, Rgb::BLACK);

        let contact: Vec<&str> = [&company.phone, &company.email, &company.website]
            .into_iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();
        let mut details = Vec::new();
        if !company.legal_name.trim().is_empty() && company.legal_name != company.name {
            details.push(company.legal_name.trim().to_string());
        }
        if !company.address.trim().is_empty() {
            details.push(company.address.trim().to_string());
        }
        if !contact.is_empty() {
            details.push(contact.join(" | "));
        }
        if !company.tax_id.trim().is_empty() {
            details.push(format!("Tax ID: {}", company.tax_id.trim()));
        }
        for detail in details {
            y += line_height(SMALL_SIZE);
            let line = truncate_to_width(&detail, max_width, SMALL_SIZE, FontStyle::Regular);
            self.canvas
                .draw_text(&line, text_x, y, SMALL_SIZE, FontStyle::Regular, Rgb::GREY);
        }

        let rule_y = top + g.header_band - 3.0;
        if let Some(note) = document.layout.header_note.as_deref().filter(|n| !n.trim().is_empty()) {
            let note = truncate_to_width(note.trim(), g.usable_width(), SMALL_SIZE, FontStyle::Regular);
            self.canvas
                .draw_text(&note, g.left(), rule_y - 1.5, SMALL_SIZE, FontStyle::Regular, Rgb::GREY);
        }
        self.canvas
            .draw_line((g.left(), rule_y), (right, rule_y), 0.6, self.accent);
    }

    fn draw_footer(&mut self) {
        let g = self.geometry;
        let footer = footer_text(&self.document.layout, self.page);
        let rule_y = g.content_bottom() + 3.0;
        let baseline = g.height - g.margin - 2.0;

        self.canvas
            .draw_line((g.left(), rule_y), (g.right(), rule_y), 0.3, Rgb::RULE);
        if !footer.left.is_empty() {
            let left = truncate_to_width(&footer.left, g.usable_width() * 0.8, SMALL_SIZE, FontStyle::Regular);
            self.canvas
                .draw_text(&left, g.left(), baseline, SMALL_SIZE, FontStyle::Regular, Rgb::GREY);
        }
        if let Some(number) = footer.right {
            self.text_right(&number, g.right(), baseline, SMALL_SIZE, FontStyle::Regular, Rgb::GREY);
        }
    }

    // Body blocks

    fn client_block(&mut self) {
        let document = self.document;
        let client = &document.client;
        if client.is_empty() {
            return;
        }
        let width = self.geometry.usable_width();
        let lines: Vec<String> = client
            .display_lines()
            .iter()
            .flat_map(|l| wrap_text(l, width, BODY_SIZE, FontStyle::Regular))
            .collect();
        let height = line_height(HEADING_SIZE) + lines.len() as f32 * line_height(BODY_SIZE) + BLOCK_GAP;
        if self.fits_on_a_page(height) {
            self.ensure_space(height);
        } else {
            self.ensure_space(line_height(HEADING_SIZE) + line_height(BODY_SIZE));
        }

        let x = self.geometry.left();
        self.advance(line_height(HEADING_SIZE));
        self.canvas
            .draw_text("Client", x, self.y, HEADING_SIZE, FontStyle::Bold, self.accent);
        self.page_has_content = true;
        self.flow_lines(&lines, BODY_SIZE, FontStyle::Regular, Rgb::BLACK);
        self.y += BLOCK_GAP;
        self.place(BlockKind::Client, client.name.clone());
    }

    fn title_block(&mut self) {
        let document = self.document;
        let width = self.geometry.usable_width();
        let title = wrap_nonempty(&document.title, width, TITLE_SIZE, FontStyle::Bold);
        let description = wrap_nonempty(&document.description, width, BODY_SIZE, FontStyle::Regular);
        if title.is_empty() && description.is_empty() {
            return;
        }
        let height = title.len() as f32 * line_height(TITLE_SIZE)
            + description.len() as f32 * line_height(BODY_SIZE)
            + BLOCK_GAP;
        if self.fits_on_a_page(height) {
            self.ensure_space(height);
        }

        // Once the block fits, no line below triggers a break
        self.flow_lines(&title, TITLE_SIZE, FontStyle::Bold, Rgb::BLACK);
        self.flow_lines(&description, BODY_SIZE, FontStyle::Regular, Rgb::BLACK);
        self.y += BLOCK_GAP;
        self.place(BlockKind::Title, document.title.clone());
    }

    fn category_block(&mut self, category: &CostCategory) {
        let table = self.table_layout(category);

        let title_height = line_height(HEADING_SIZE) + 1.5;
        self.ensure_space(title_height);
        let x = self.geometry.left();
        self.advance(line_height(HEADING_SIZE));
        self.canvas
            .draw_text(&category.name, x, self.y, HEADING_SIZE, FontStyle::Bold, self.accent);
        if let Some(note) = self.markup_note(category) {
            let right = self.geometry.right();
            self.text_right(&note, right, self.y, SMALL_SIZE, FontStyle::Regular, Rgb::GREY);
        }
        self.y += 1.5;
        self.place(BlockKind::CategoryTitle, category.name.clone());

        for subcategory in &category.subcategories {
            self.subcategory_block(category, subcategory, &table);
        }
        self.category_totals(category);
    }

    fn subcategory_block(&mut self, category: &CostCategory, subcategory: &Subcategory, table: &TableLayout) {
        let title_height = line_height(BODY_SIZE) + 1.0;
        self.ensure_space(title_height + table.header_height);

        let x = self.geometry.left();
        self.advance(line_height(BODY_SIZE));
        self.canvas
            .draw_text(&subcategory.name, x, self.y, BODY_SIZE, FontStyle::Bold, Rgb::BLACK);
        self.y += 1.0;
        self.draw_column_header(table);
        self.place(BlockKind::SubcategoryHeader, subcategory.name.clone());

        self.table = Some(table.clone());
        for item in &subcategory.items {
            self.item_row(category, item, table);
        }
        self.table = None;
    }

    fn table_layout(&self, category: &CostCategory) -> TableLayout {
        let keys = category.visible_column_keys(self.registry);
        let slots = column_slots(&keys, self.geometry.usable_width());
        let labels: Vec<Vec<String>> = slots
            .iter()
            .map(|slot| {
                let label = self
                    .registry
                    .get(&slot.key)
                    .map(|d| d.label.clone())
                    .unwrap_or_else(|| slot.key.clone());
                wrap_text(&label, cell_width(slot), SMALL_SIZE, FontStyle::Bold)
            })
            .collect();
        let numeric = slots.iter().map(|slot| self.is_numeric(&slot.key)).collect();
        let header_height = row_height(&labels, SMALL_SIZE);
        TableLayout {
            slots,
            labels,
            numeric,
            header_height,
        }
    }

    fn draw_column_header(&mut self, table: &TableLayout) {
        let x = self.geometry.left();
        let top = self.y;
        self.canvas
            .fill_rect(x, top, self.geometry.usable_width(), table.header_height, Rgb::SHADE);
        self.draw_cells(top, &table.slots, &table.labels, &table.numeric, SMALL_SIZE, FontStyle::Bold);
        self.y = top + table.header_height;
    }

    fn item_row(&mut self, category: &CostCategory, item: &Item, table: &TableLayout) {
        let cells: Vec<Vec<String>> = table
            .slots
            .iter()
            .map(|slot| {
                let text = self.cell_text(category, item, &slot.key);
                wrap_text(&text, cell_width(slot), BODY_SIZE, FontStyle::Regular)
            })
            .collect();
        let label = item.text(DESCRIPTION);
        let height = row_height(&cells, BODY_SIZE);
        if self.fits_on_a_page(height) {
            self.ensure_space(height);
            self.draw_row(&cells, table);
            self.place(BlockKind::ItemRow, label);
        } else {
            self.split_row(&cells, table, label);
        }
    }

    /// Draws a row taller than a page in segments, continuing each cell on
    /// the next page below a repeated column header
    fn split_row(&mut self, cells: &[Vec<String>], table: &TableLayout, label: String) {
        let line = line_height(BODY_SIZE);
        let total = cells.iter().map(Vec::len).max().unwrap_or(1).max(1);
        let mut label = Some(label);
        let mut start = 0;
        while start < total {
            let room = self.geometry.content_bottom() - self.y - 2.0 * ROW_PAD;
            let fitting = (room / line).floor().max(0.0) as usize;
            if fitting == 0 && self.page_has_content {
                self.continue_on_new_page();
                continue;
            }
            let end = (start + fitting.max(1)).min(total);
            let segment: Vec<Vec<String>> = cells
                .iter()
                .map(|lines| lines[start.min(lines.len())..end.min(lines.len())].to_vec())
                .collect();
            self.draw_row(&segment, table);
            if let Some(label) = label.take() {
                self.place(BlockKind::ItemRow, label);
            }
            self.page_has_content = true;
            start = end;
        }
    }

    fn draw_row(&mut self, cells: &[Vec<String>], table: &TableLayout) {
        let top = self.y;
        self.draw_cells(top, &table.slots, cells, &table.numeric, BODY_SIZE, FontStyle::Regular);
        self.y = top + row_height(cells, BODY_SIZE);
        let (left, right) = (self.geometry.left(), self.geometry.right());
        self.canvas
            .draw_line((left, self.y), (right, self.y), 0.2, Rgb::RULE);
    }

    fn draw_cells(
        &mut self,
        top: f32,
        slots: &[ColumnSlot],
        cells: &[Vec<String>],
        numeric: &[bool],
        size: f32,
        style: FontStyle,
    ) {
        let left = self.geometry.left();
        for ((slot, lines), &right_aligned) in slots.iter().zip(cells).zip(numeric) {
            for (i, line) in lines.iter().enumerate() {
                let baseline = top + ROW_PAD + i as f32 * line_height(size) + size * PT_TO_MM;
                let x = if right_aligned {
                    left + slot.x + slot.width - CELL_PAD - text_width(line, size, style)
                } else {
                    left + slot.x + CELL_PAD
                };
                self.canvas.draw_text(line, x, baseline, size, style, Rgb::BLACK);
            }
        }
    }

    fn category_totals(&mut self, category: &CostCategory) {
        let currency = self.document.currency;
        let Some(pricing) = self.pricing.category(category.id).cloned() else {
            return;
        };
        let mut rows = vec![("Subtotal".to_string(), pricing.raw_subtotal, false)];
        if category.markup_type != MarkupType::None && !pricing.markup.is_zero() {
            rows.push(("Markup".to_string(), pricing.markup, false));
        }
        if vat_applies(self.document, category) {
            rows.push((self.vat_label(), pricing.vat, false));
        }
        rows.push((format!("Total {}", category.name), pricing.total, true));

        self.totals_rows(&rows, currency);
        self.place(BlockKind::CategoryTotals, category.name.clone());
    }

    fn terms_block(&mut self) {
        let document = self.document;
        let terms = document.terms.trim();
        if terms.is_empty() {
            return;
        }
        let width = self.geometry.usable_width();
        let x = self.geometry.left();
        let paragraphs: Vec<Vec<String>> = terms
            .split("\n\n")
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|p| wrap_text(p, width, BODY_SIZE, FontStyle::Regular))
            .collect();

        let first = paragraphs.first().map_or(0, |p| p.len().min(3));
        self.ensure_space(line_height(HEADING_SIZE) + first as f32 * line_height(BODY_SIZE));
        self.advance(line_height(HEADING_SIZE));
        self.canvas
            .draw_text("Terms and conditions", x, self.y, HEADING_SIZE, FontStyle::Bold, self.accent);
        self.place(BlockKind::Terms, "heading");

        for (index, lines) in paragraphs.iter().enumerate() {
            let height = lines.len() as f32 * line_height(BODY_SIZE) + 1.5;
            if self.fits_on_a_page(height) {
                self.ensure_space(height);
            }
            self.flow_lines(lines, BODY_SIZE, FontStyle::Regular, Rgb::BLACK);
            self.y += 1.5;
            self.place(BlockKind::Terms, format!("paragraph {}", index + 1));
        }
        self.y += BLOCK_GAP;
    }

    fn coupon_block(&mut self) {
        let document = self.document;
        let Some(coupon) = document.coupon.as_ref().filter(|c| c.enabled) else {
            return;
        };
        let image = coupon
            .image
            .as_deref()
            .and_then(|url| self.load_image("Coupon image", url));

        let pad = 3.0;
        let image_space = if image.is_some() { COUPON_IMAGE_MAX + pad } else { 0.0 };
        let inner_width = self.geometry.usable_width() - image_space - 2.0 * pad;

        let mut lines: Vec<(String, f32, FontStyle, Rgb)> = Vec::new();
        for line in wrap_nonempty(&coupon.title, inner_width, HEADING_SIZE, FontStyle::Bold) {
            lines.push((line, HEADING_SIZE, FontStyle::Bold, Rgb::BLACK));
        }
        for line in wrap_nonempty(&coupon.discount_label, inner_width, TITLE_SIZE, FontStyle::Bold) {
            lines.push((line, TITLE_SIZE, FontStyle::Bold, self.accent));
        }
        for line in wrap_nonempty(&coupon.description, inner_width, BODY_SIZE, FontStyle::Regular) {
            lines.push((line, BODY_SIZE, FontStyle::Regular, Rgb::BLACK));
        }
        if !coupon.code.trim().is_empty() {
            lines.push((format!("Code: {}", coupon.code.trim()), 10.0, FontStyle::Mono, Rgb::BLACK));
        }
        if let Some(valid_until) = coupon.valid_until {
            lines.push((format!("Valid until {}", self.date(valid_until)), SMALL_SIZE, FontStyle::Regular, Rgb::GREY));
        }

        let text_height: f32 = lines.iter().map(|(_, size, _, _)| line_height(*size)).sum();
        let image_size = image
            .as_ref()
            .map(|img| fit(img, COUPON_IMAGE_MAX, COUPON_IMAGE_MAX))
            .unwrap_or((0.0, 0.0));
        let height = text_height.max(image_size.1) + 2.0 * pad;
        self.ensure_space(height + BLOCK_GAP);

        let (left, right) = (self.geometry.left(), self.geometry.right());
        let top = self.y;
        let bottom = top + height;
        for (from, to) in [
            ((left, top), (right, top)),
            ((right, top), (right, bottom)),
            ((right, bottom), (left, bottom)),
            ((left, bottom), (left, top)),
        ] {
            self.canvas.draw_line(from, to, 0.5, self.accent);
        }
        if let Some(img) = image.as_ref() {
            self.canvas
                .draw_image(img, left + pad, top + pad, image_size.0, image_size.1);
        }

        let x = left + pad + image_space;
        let mut y = top + pad;
        for (line, size, style, color) in &lines {
            y += line_height(*size);
            self.canvas.draw_text(line, x, y, *size, *style, *color);
        }
        self.y = bottom + BLOCK_GAP;
        self.place(BlockKind::Coupon, coupon.title.clone());
    }

    fn grand_totals_block(&mut self) {
        let totals = self.pricing.totals;
        let mut rows = vec![("Subtotal".to_string(), totals.subtotal, false)];
        if self.document.show_vat {
            rows.push((self.vat_label(), totals.tax, false));
        }
        rows.push((format!("Total {}", self.document.currency.code()), totals.total, true));

        self.totals_rows(&rows, self.document.currency);
        self.place(BlockKind::GrandTotals, "totals");
    }

    fn payment_plan_block(&mut self) {
        let document = self.document;
        let Some(plan) = document.payment_plan.as_ref().filter(|p| p.enabled) else {
            return;
        };
        let total = self.pricing.totals.total;
        let options = calculate_payment_plan(total, plan);
        if options.is_empty() {
            return;
        }
        let currency = self.document.currency;
        let row = line_height(BODY_SIZE);
        let height = line_height(HEADING_SIZE) + row * (options.len() as f32 + 2.0) + BLOCK_GAP;
        self.ensure_space(height);

        let (left, width) = (self.geometry.left(), self.geometry.usable_width());
        self.advance(line_height(HEADING_SIZE));
        self.canvas
            .draw_text("Payment plan", left, self.y, HEADING_SIZE, FontStyle::Bold, self.accent);

        let summary = format!(
            "Down payment: {}    Amount financed: {}",
            format_amount(plan.down_payment, currency),
            format_amount(financed_balance(total, plan), currency)
        );
        self.advance(row);
        self.canvas
            .draw_text(&summary, left, self.y, BODY_SIZE, FontStyle::Regular, Rgb::GREY);

        let column = width / 4.0;
        let period = plan.payment_period;
        let header = [
            "Term".to_string(),
            format!("{} payment", period.adjective()),
            "Total".to_string(),
            "Annual rate".to_string(),
        ];
        self.advance(row);
        self.table_line(&header, left, column, FontStyle::Bold);
        for option in &options {
            let cells = [
                format!("{} {}", option.term, period.unit_label(option.term)),
                format_amount(option.monthly_payment, currency),
                format_amount(option.total_payment, currency),
                format!("{}%", option.annual_rate.round_dp(2).normalize()),
            ];
            self.advance(row);
            self.table_line(&cells, left, column, FontStyle::Regular);
        }
        self.y += BLOCK_GAP;
        self.place(BlockKind::PaymentPlan, format!("{} options", options.len()));
    }

    fn table_line(&mut self, cells: &[String; 4], left: f32, column: f32, style: FontStyle) {
        for (i, cell) in cells.iter().enumerate() {
            if i == 0 {
                self.canvas.draw_text(cell, left, self.y, BODY_SIZE, style, Rgb::BLACK);
            } else {
                let right = left + column * (i + 1) as f32;
                self.text_right(cell, right, self.y, BODY_SIZE, style, Rgb::BLACK);
            }
        }
    }

    fn signatures_block(&mut self) {
        let document = self.document;
        let company = self.company;
        let signatures = &document.signatures;
        if !signatures.show_signatures {
            return;
        }
        let company_image = signatures
            .company_signature_image
            .as_deref()
            .or(company.signature.as_deref())
            .and_then(|url| self.load_image("Company signature", url));

        let height = SIGNATURE_HEIGHT + 2.0 + line_height(SMALL_SIZE) + line_height(BODY_SIZE) + BLOCK_GAP;
        self.ensure_space(height + 6.0);
        self.y += 6.0;

        let gap = 12.0;
        let width = (self.geometry.usable_width() - gap) / 2.0;
        let top = self.y;
        let line_y = top + SIGNATURE_HEIGHT;
        let columns = [
            (self.geometry.left(), &signatures.client_signature_label, &signatures.client_name, None),
            (
                self.geometry.left() + width + gap,
                &signatures.company_signature_label,
                &signatures.company_signer,
                company_image.as_ref(),
            ),
        ];
        for (x, label, name, image) in columns {
            if let Some(img) = image {
                let (w, h) = fit(img, width, SIGNATURE_HEIGHT - 1.0);
                self.canvas.draw_image(img, x + (width - w) / 2.0, line_y - 1.0 - h, w, h);
            }
            self.canvas.draw_line((x, line_y), (x + width, line_y), 0.4, Rgb::BLACK);
            let label_y = line_y + 2.0 + SMALL_SIZE * PT_TO_MM;
            self.canvas
                .draw_text(label, x, label_y, SMALL_SIZE, FontStyle::Regular, Rgb::GREY);
            if !name.trim().is_empty() {
                let name = truncate_to_width(name.trim(), width, BODY_SIZE, FontStyle::Bold);
                self.canvas.draw_text(
                    &name,
                    x,
                    label_y + line_height(BODY_SIZE),
                    BODY_SIZE,
                    FontStyle::Bold,
                    Rgb::BLACK,
                );
            }
        }
        self.y = top + height;
        self.place(BlockKind::Signatures, "signatures");
    }

    /// Each annex starts on a fresh page
    fn annex_block(&mut self, number: usize, ticket: &ThirdPartyTicket) {
        self.break_page();
        let left = self.geometry.left();
        let title = format!("Annex {}: {}", number, ticket.file_name);
        let title = truncate_to_width(&title, self.geometry.usable_width(), HEADING_SIZE, FontStyle::Bold);
        self.advance(line_height(HEADING_SIZE));
        self.canvas
            .draw_text(&title, left, self.y, HEADING_SIZE, FontStyle::Bold, self.accent);
        self.y += 3.0;
        self.place(BlockKind::TicketAnnex, ticket.file_name.clone());

        if let Some(receipt) = ticket.interpreted.as_ref() {
            let lines = receipt_lines(receipt, RECEIPT_WIDTH, self.document.currency);
            let block_width = text_width(&"0".repeat(RECEIPT_WIDTH), BODY_SIZE, FontStyle::Mono);
            let x = left + ((self.geometry.usable_width() - block_width) / 2.0).max(0.0);
            for line in &lines {
                self.ensure_space(line_height(BODY_SIZE));
                self.advance(line_height(BODY_SIZE));
                self.canvas
                    .draw_text(line, x, self.y, BODY_SIZE, FontStyle::Mono, Rgb::BLACK);
            }
            return;
        }

        match self.load_image(&format!("Annex {}", number), &ticket.image) {
            Some(image) => {
                let max_height = self.geometry.content_bottom() - self.y;
                let (w, h) = fit(&image, self.geometry.usable_width(), max_height);
                let x = left + (self.geometry.usable_width() - w) / 2.0;
                self.canvas.draw_image(&image, x, self.y, w, h);
                self.y += h;
            }
            None => {
                self.advance(line_height(BODY_SIZE));
                self.canvas
                    .draw_text(IMAGE_LOAD_FAILED, left, self.y, BODY_SIZE, FontStyle::Regular, Rgb::ERROR);
            }
        }
    }

    // Helpers

    /// Moves the cursor down to the next baseline
    fn advance(&mut self, height: f32) {
        self.y += height;
    }

    fn totals_rows(&mut self, rows: &[(String, Decimal, bool)], currency: Currency) {
        let row = line_height(BODY_SIZE);
        self.ensure_space(row * rows.len() as f32 + BLOCK_GAP);
        let right = self.geometry.right();
        let label_x = right - TOTALS_WIDTH;
        for (label, amount, bold) in rows {
            let style = if *bold { FontStyle::Bold } else { FontStyle::Regular };
            self.advance(row);
            self.canvas
                .draw_text(label, label_x, self.y, BODY_SIZE, style, Rgb::BLACK);
            self.text_right(&format_amount(*amount, currency), right, self.y, BODY_SIZE, style, Rgb::BLACK);
        }
        self.y += BLOCK_GAP;
    }

    fn text_right(&mut self, text: &str, right: f32, y: f32, size: f32, style: FontStyle, color: Rgb) {
        let x = right - text_width(text, size, style);
        self.canvas.draw_text(text, x, y, size, style, color);
    }

    fn cell_text(&self, category: &CostCategory, item: &Item, key: &str) -> String {
        let currency = self.document.currency;
        if let Some(figures) = self.pricing.item(category.id, item.id) {
            match key {
                TOTAL => return format_amount(figures.total(), currency),
                MARKUP => return format_amount(figures.markup, currency),
                VAT => return format_amount(figures.vat, currency),
                _ => {}
            }
        }
        if key == UNIT_PRICE {
            return format_amount(item.unit_price(), currency);
        }

        let data_type = self.registry.get(key).map(|d| d.data_type);
        match (data_type, item.get(key)) {
            (_, None) => String::new(),
            (Some(DataType::Image), Some(value)) if !value.is_blank() => "(image)".to_string(),
            (Some(DataType::Image), Some(_)) => String::new(),
            (_, Some(ItemValue::Date(date))) => self.date(*date),
            (_, Some(value)) => value.to_string(),
        }
    }

    fn is_numeric(&self, key: &str) -> bool {
        matches!(key, QUANTITY | UNIT_PRICE | TOTAL | MARKUP | VAT)
            || self
                .registry
                .get(key)
                .is_some_and(|d| d.data_type == DataType::Number)
    }

    fn markup_note(&self, category: &CostCategory) -> Option<String> {
        match category.markup_type {
            MarkupType::None => None,
            MarkupType::Percentage => Some(format!("Markup {}%", category.markup_value.normalize())),
            MarkupType::Fixed => Some(format!(
                "Markup {}",
                format_amount(category.markup_value, self.document.currency)
            )),
        }
    }

    fn vat_label(&self) -> String {
        format!("VAT ({}%)", self.document.vat_rate.normalize())
    }

    fn date(&self, date: NaiveDate) -> String {
        format_date(date, &self.document.layout.date_format)
    }

    /// Decodes an optional image, recording a warning instead of failing
    fn load_image(&mut self, what: &str, data_url: &str) -> Option<DecodedImage> {
        match decode_data_url(data_url) {
            Ok(image) => Some(image),
            Err(error) => {
                warn!(image = what, error = %error, "Image skipped, it could not be decoded");
                self.warnings.push(format!("{} could not be loaded: {}", what, error));
                None
            }
        }
    }
}

fn cell_width(slot: &ColumnSlot) -> f32 {
    (slot.width - 2.0 * CELL_PAD).max(1.0)
}

/// Height of a row whose cells wrap to the given lines
fn row_height(cells: &[Vec<String>], size: f32) -> f32 {
    let lines = cells.iter().map(Vec::len).max().unwrap_or(1).max(1);
    lines as f32 * line_height(size) + 2.0 * ROW_PAD
}

fn wrap_nonempty(text: &str, width: f32, size: f32, style: FontStyle) -> Vec<String> {
    if text.trim().is_empty() {
        Vec::new()
    } else {
        wrap_text(text.trim(), width, size, style)
    }
}

/// Formats a date with a user-supplied strftime pattern, falling back to
/// day/month/year when the pattern is invalid for a date
pub fn format_date(date: NaiveDate, pattern: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", date.format(pattern)).is_err() {
        return date.format(DEFAULT_DATE_FORMAT).to_string();
    }
    out
}
