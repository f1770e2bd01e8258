use std::path::{Path, PathBuf};

use quotedesk_catalog::pricing::percent_label;
use quotedesk_quotation::{LineItem, Quotation};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Image, Workbook, Worksheet};

use crate::currency::currency_num_format;
use crate::error::{ExportError, ExportWarning};

pub const SHEET_NAME: &str = "Quotation";

const COL_SL_NO: u16 = 0;
const COL_IMAGE: u16 = 1;
const COL_PRODUCT: u16 = 2;
const COL_QTY: u16 = 3;
const COL_UNIT_PRICE: u16 = 4;
const COL_AMOUNT: u16 = 5;
const LAST_COL: u16 = COL_AMOUNT;

const HEADERS: [&str; 6] = ["SL.NO", "IMAGE", "PRODUCT", "QTY", "UNIT PRICE", "AMOUNT"];
const COLUMN_WIDTHS: [f64; 6] = [8.0, 16.0, 42.0, 8.0, 15.0, 17.0];

const BRAND_ROW_HEIGHT: f64 = 60.0;
const IMAGE_ROW_HEIGHT: f64 = 62.0;

const TITLE_ROW: u32 = 3;
const META_FIRST_ROW: u32 = 5;
pub const TABLE_HEADER_ROW: u32 = 12;

/// Branding and formatting applied to every exported quotation.
#[derive(Debug, Clone)]
pub struct ExportTemplate {
    pub company_name: String,
    pub company_address: Option<String>,
    pub logo_path: PathBuf,
    /// Relative product image paths are resolved against this directory.
    pub image_dir: Option<PathBuf>,
    pub currency_symbol: String,
}

#[derive(Debug)]
pub struct ExportOutput {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub warnings: Vec<ExportWarning>,
}

struct Formats {
    company: Format,
    address: Format,
    title: Format,
    label: Format,
    value: Format,
    header: Format,
    cell: Format,
    product: Format,
    money: Format,
    total_label: Format,
    total_money: Format,
}

impl Formats {
    fn new(symbol: &str) -> Self {
        let num_format = currency_num_format(symbol);
        let bordered = Format::new()
            .set_border(FormatBorder::Thin)
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter);

        Self {
            company: Format::new()
                .set_bold()
                .set_font_size(18)
                .set_align(FormatAlign::Left)
                .set_align(FormatAlign::VerticalCenter),
            address: Format::new().set_text_wrap().set_align(FormatAlign::Left),
            title: Format::new()
                .set_bold()
                .set_font_size(16)
                .set_align(FormatAlign::Center)
                .set_border_bottom(FormatBorder::Medium),
            label: Format::new().set_bold(),
            value: Format::new().set_align(FormatAlign::Left),
            header: bordered
                .clone()
                .set_bold()
                .set_background_color(Color::RGB(0xD9E1F2)),
            cell: bordered.clone(),
            product: bordered.clone().set_text_wrap(),
            money: bordered.clone().set_num_format(&num_format),
            total_label: bordered
                .clone()
                .set_bold()
                .set_align(FormatAlign::Right),
            total_money: bordered.set_bold().set_num_format(&num_format),
        }
    }
}

/// Renders persisted quotations into xlsx documents.
pub struct WorkbookExporter {
    template: ExportTemplate,
}

impl WorkbookExporter {
    pub fn new(template: ExportTemplate) -> Self {
        Self { template }
    }

    pub fn template(&self) -> &ExportTemplate {
        &self.template
    }

    pub fn file_name(quotation: &Quotation) -> String {
        format!("quotation_{}.xlsx", quotation.reference)
    }

    pub fn export(&self, quotation: &Quotation) -> Result<ExportOutput, ExportError> {
        if quotation.items.is_empty() {
            return Err(ExportError::NoLineItems(quotation.reference.clone()));
        }
        let logo = self.load_logo()?;
        let formats = Formats::new(&self.template.currency_symbol);

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(SHEET_NAME)?;
        for (col, width) in COLUMN_WIDTHS.iter().enumerate() {
            worksheet.set_column_width(col as u16, *width)?;
        }

        self.write_branding(worksheet, &formats, &logo)?;
        write_metadata(worksheet, &formats, quotation)?;

        for (col, header) in HEADERS.iter().enumerate() {
            worksheet.write_string_with_format(TABLE_HEADER_ROW, col as u16, *header, &formats.header)?;
        }

        let mut warnings = Vec::new();
        let mut row = TABLE_HEADER_ROW + 1;
        for (index, item) in quotation.items.iter().enumerate() {
            let line = index + 1;
            self.write_line(worksheet, &formats, row, line, item, &mut warnings)?;
            row += 1;
        }

        let gst_label = format!("GST ({})", percent_label(quotation.gst_rate));
        let totals = [
            ("SUBTOTAL", quotation.subtotal, &formats.money),
            (gst_label.as_str(), quotation.gst_amount, &formats.money),
            ("TOTAL", quotation.grand_total, &formats.total_money),
        ];
        for (label, amount, format) in totals {
            worksheet.merge_range(row, COL_SL_NO, row, COL_UNIT_PRICE, label, &formats.total_label)?;
            worksheet.write_number_with_format(row, COL_AMOUNT, to_cell(amount), format)?;
            row += 1;
        }

        let bytes = workbook.save_to_buffer()?;

        tracing::info!(
            reference = %quotation.reference,
            lines = quotation.items.len(),
            warnings = warnings.len(),
            size = bytes.len(),
            "Quotation exported"
        );

        Ok(ExportOutput {
            file_name: Self::file_name(quotation),
            bytes,
            warnings,
        })
    }

    fn load_logo(&self) -> Result<Image, ExportError> {
        let path = &self.template.logo_path;
        let logo_error = |reason: String| ExportError::Logo {
            path: path.display().to_string(),
            reason,
        };

        let bytes = std::fs::read(path).map_err(|e| logo_error(e.to_string()))?;
        Image::new_from_buffer(&bytes).map_err(|e| logo_error(e.to_string()))
    }

    fn write_branding(
        &self,
        worksheet: &mut Worksheet,
        formats: &Formats,
        logo: &Image,
    ) -> Result<(), ExportError> {
        worksheet.set_row_height(0, BRAND_ROW_HEIGHT)?;
        worksheet.insert_image_fit_to_cell(0, COL_SL_NO, logo, true)?;
        worksheet.merge_range(0, COL_IMAGE, 0, LAST_COL, &self.template.company_name, &formats.company)?;

        let address = self.template.company_address.as_deref().unwrap_or_default();
        worksheet.merge_range(1, COL_IMAGE, 1, LAST_COL, address, &formats.address)?;
        worksheet.merge_range(TITLE_ROW, COL_SL_NO, TITLE_ROW, LAST_COL, "QUOTATION", &formats.title)?;
        Ok(())
    }

    fn write_line(
        &self,
        worksheet: &mut Worksheet,
        formats: &Formats,
        row: u32,
        line: usize,
        item: &LineItem,
        warnings: &mut Vec<ExportWarning>,
    ) -> Result<(), ExportError> {
        worksheet.set_row_height(row, IMAGE_ROW_HEIGHT)?;
        worksheet.write_number_with_format(row, COL_SL_NO, line as f64, &formats.cell)?;
        worksheet.write_blank(row, COL_IMAGE, &formats.cell)?;

        if let Some(image_path) = item.image_path.as_deref() {
            match self.load_image(image_path) {
                Ok(image) => {
                    worksheet.insert_image_fit_to_cell(row, COL_IMAGE, &image, true)?;
                }
                Err(reason) => {
                    tracing::warn!(line, image_path, %reason, "Product image skipped");
                    warnings.push(ExportWarning {
                        line,
                        image_path: image_path.to_string(),
                        reason,
                    });
                }
            }
        }

        let product = match item.description.as_deref() {
            Some(description) => format!("{}\n{}", item.product_name, description),
            None => item.product_name.clone(),
        };
        worksheet.write_string_with_format(row, COL_PRODUCT, product, &formats.product)?;
        worksheet.write_number_with_format(row, COL_QTY, item.quantity as f64, &formats.cell)?;
        worksheet.write_number_with_format(row, COL_UNIT_PRICE, to_cell(item.unit_price), &formats.money)?;
        worksheet.write_number_with_format(row, COL_AMOUNT, to_cell(item.line_amount), &formats.money)?;
        Ok(())
    }

    fn load_image(&self, image_path: &str) -> Result<Image, String> {
        let path = self.resolve_image(image_path);
        let bytes = std::fs::read(&path).map_err(|e| format!("{}: {}", path.display(), e))?;
        Image::new_from_buffer(&bytes).map_err(|e| e.to_string())
    }

    fn resolve_image(&self, image_path: &str) -> PathBuf {
        let path = Path::new(image_path);
        match &self.template.image_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }
}

fn write_metadata(
    worksheet: &mut Worksheet,
    formats: &Formats,
    quotation: &Quotation,
) -> Result<(), ExportError> {
    let rows = [
        ("Reference", quotation.reference.clone()),
        ("SL.NO", quotation.sl_no.to_string()),
        ("Date", quotation.created_at.format("%d-%m-%Y").to_string()),
        ("Customer", quotation.customer.name.clone()),
        ("Contact", quotation.customer.contact.clone()),
        (
            "Address",
            quotation.customer.address.clone().unwrap_or_default(),
        ),
    ];

    for (offset, (label, value)) in rows.iter().enumerate() {
        let row = META_FIRST_ROW + offset as u32;
        worksheet.write_string_with_format(row, COL_SL_NO, *label, &formats.label)?;
        worksheet.merge_range(row, COL_IMAGE, row, COL_PRODUCT, value, &formats.value)?;
    }
    Ok(())
}

fn to_cell(amount: Decimal) -> f64 {
    amount.to_f64().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
    use chrono::{TimeZone, Utc};
    use quotedesk_quotation::CustomerInfo;
    use std::io::Cursor;
    use std::str::FromStr;
    use tempfile::TempDir;

    // 1x1 transparent PNG
    const PNG: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
        0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0xDA, 0x63, 0x64,
        0x60, 0xF8, 0x5F, 0x0F, 0x00, 0x02, 0x87, 0x01, 0x80, 0xEB, 0x47, 0xBA, 0x92, 0x00, 0x00,
        0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ];

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn template(dir: &TempDir) -> ExportTemplate {
        std::fs::write(dir.path().join("logo.png"), PNG).unwrap();
        std::fs::write(dir.path().join("spot.png"), PNG).unwrap();
        ExportTemplate {
            company_name: "Brightline Lighting".to_string(),
            company_address: Some("12 MG Road, Bengaluru".to_string()),
            logo_path: dir.path().join("logo.png"),
            image_dir: Some(dir.path().to_path_buf()),
            currency_symbol: "₹".to_string(),
        }
    }

    fn item(id: i64, name: &str, qty: i64, price: &str, amount: &str, image: Option<&str>) -> LineItem {
        LineItem {
            product_id: id,
            product_name: name.to_string(),
            description: Some("Watt: 12".to_string()),
            image_path: image.map(str::to_string),
            quantity: qty,
            unit_price: dec(price),
            line_amount: dec(amount),
        }
    }

    fn quotation(items: Vec<LineItem>) -> Quotation {
        Quotation {
            id: uuid::Uuid::new_v4(),
            sl_no: 42,
            reference: Quotation::reference_for(42),
            customer: CustomerInfo::new("Acme Interiors", "98450 00000").with_address("Indiranagar"),
            items,
            subtotal: dec("450.00"),
            gst_rate: dec("0.18"),
            gst_amount: dec("81.00"),
            grand_total: dec("531.00"),
            created_by: "meera".to_string(),
            created_at: Utc.with_ymd_and_hms(2026, 3, 14, 10, 30, 0).unwrap(),
        }
    }

    fn two_lines(second_image: &str) -> Vec<LineItem> {
        vec![
            item(1, "Widget A", 2, "100.00", "200.00", Some("spot.png")),
            item(2, "Widget B", 1, "250.00", "250.00", Some(second_image)),
        ]
    }

    fn read_back(bytes: &[u8]) -> Range<Data> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec())).unwrap();
        workbook.worksheet_range(SHEET_NAME).unwrap()
    }

    fn text(range: &Range<Data>, row: u32, col: u16) -> String {
        range
            .get_value((row, col as u32))
            .map(|d| d.to_string())
            .unwrap_or_default()
    }

    fn number(range: &Range<Data>, row: u32, col: u16) -> f64 {
        match range.get_value((row, col as u32)) {
            Some(Data::Float(f)) => *f,
            Some(Data::Int(i)) => *i as f64,
            other => panic!("expected a number at ({}, {}), got {:?}", row, col, other),
        }
    }

    #[test]
    fn test_export_layout_and_totals() {
        let dir = TempDir::new().unwrap();
        let exporter = WorkbookExporter::new(template(&dir));

        let output = exporter.export(&quotation(two_lines("spot.png"))).unwrap();
        assert!(output.warnings.is_empty());
        assert_eq!(output.file_name, "quotation_QT-00042.xlsx");

        let range = read_back(&output.bytes);
        assert_eq!(text(&range, 0, COL_IMAGE), "Brightline Lighting");
        assert_eq!(text(&range, TITLE_ROW, COL_SL_NO), "QUOTATION");
        assert_eq!(text(&range, META_FIRST_ROW, COL_IMAGE), "QT-00042");
        assert_eq!(text(&range, META_FIRST_ROW + 2, COL_IMAGE), "14-03-2026");
        assert_eq!(text(&range, META_FIRST_ROW + 3, COL_IMAGE), "Acme Interiors");

        for (col, header) in HEADERS.iter().enumerate() {
            assert_eq!(text(&range, TABLE_HEADER_ROW, col as u16), *header);
        }

        let first = TABLE_HEADER_ROW + 1;
        assert_eq!(number(&range, first, COL_SL_NO), 1.0);
        assert_eq!(text(&range, first, COL_PRODUCT), "Widget A\nWatt: 12");
        assert_eq!(number(&range, first, COL_QTY), 2.0);
        assert_eq!(number(&range, first, COL_UNIT_PRICE), 100.0);
        assert_eq!(number(&range, first, COL_AMOUNT), 200.0);
        assert_eq!(number(&range, first + 1, COL_AMOUNT), 250.0);

        let subtotal_row = first + 2;
        assert_eq!(text(&range, subtotal_row, COL_SL_NO), "SUBTOTAL");
        assert_eq!(number(&range, subtotal_row, COL_AMOUNT), 450.0);
        assert_eq!(text(&range, subtotal_row + 1, COL_SL_NO), "GST (18%)");
        assert_eq!(number(&range, subtotal_row + 1, COL_AMOUNT), 81.0);
        assert_eq!(text(&range, subtotal_row + 2, COL_SL_NO), "TOTAL");
        assert_eq!(number(&range, subtotal_row + 2, COL_AMOUNT), 531.0);
    }

    #[test]
    fn test_missing_image_is_a_warning() {
        let dir = TempDir::new().unwrap();
        let exporter = WorkbookExporter::new(template(&dir));

        let output = exporter.export(&quotation(two_lines("gone.png"))).unwrap();

        assert_eq!(output.warnings.len(), 1);
        assert_eq!(output.warnings[0].line, 2);
        assert_eq!(output.warnings[0].image_path, "gone.png");

        let range = read_back(&output.bytes);
        let total_row = TABLE_HEADER_ROW + 1 + 2 + 2;
        assert_eq!(number(&range, total_row, COL_AMOUNT), 531.0);
    }

    #[test]
    fn test_corrupt_image_is_a_warning() {
        let dir = TempDir::new().unwrap();
        let template = template(&dir);
        std::fs::write(dir.path().join("broken.png"), b"not an image").unwrap();

        let output = WorkbookExporter::new(template)
            .export(&quotation(two_lines("broken.png")))
            .unwrap();
        assert_eq!(output.warnings.len(), 1);
        assert!(!output.bytes.is_empty());
    }

    #[test]
    fn test_zero_items_is_fatal() {
        let dir = TempDir::new().unwrap();
        let exporter = WorkbookExporter::new(template(&dir));

        let err = exporter.export(&quotation(vec![])).unwrap_err();
        assert!(matches!(err, ExportError::NoLineItems(ref r) if r == "QT-00042"));
    }

    #[test]
    fn test_missing_logo_is_fatal() {
        let dir = TempDir::new().unwrap();
        let mut template = template(&dir);
        template.logo_path = dir.path().join("no-logo.png");

        let err = WorkbookExporter::new(template)
            .export(&quotation(two_lines("spot.png")))
            .unwrap_err();
        assert!(matches!(err, ExportError::Logo { .. }));
    }

    #[test]
    fn test_corrupt_logo_is_fatal() {
        let dir = TempDir::new().unwrap();
        let template = template(&dir);
        std::fs::write(dir.path().join("logo.png"), b"not an image").unwrap();

        let err = WorkbookExporter::new(template)
            .export(&quotation(two_lines("spot.png")))
            .unwrap_err();
        assert!(matches!(err, ExportError::Logo { ref path, .. } if path.ends_with("logo.png")));
    }

    #[test]
    fn test_reexport_gives_identical_totals() {
        let dir = TempDir::new().unwrap();
        let exporter = WorkbookExporter::new(template(&dir));
        let quotation = quotation(two_lines("spot.png"));

        let first = read_back(&exporter.export(&quotation).unwrap().bytes);
        let second = read_back(&exporter.export(&quotation).unwrap().bytes);

        let subtotal_row = TABLE_HEADER_ROW + 3;
        for row in subtotal_row..subtotal_row + 3 {
            assert_eq!(number(&first, row, COL_AMOUNT), number(&second, row, COL_AMOUNT));
        }
    }
}
