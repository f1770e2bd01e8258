use calamine::{open_workbook_auto_from_rs, Data, Reader};
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Cursor;
use std::str::FromStr;

use quotedesk_core::CoreError;

use crate::product::{NewProduct, ProductAttributes};
use crate::repository::ProductRepository;

/// A spreadsheet row that was skipped. The rest of the file still imports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("row {row}: {message}")]
pub struct ImportError {
    /// 1-based row number as shown by spreadsheet software.
    pub row: usize,
    pub message: String,
}

/// Problems with the file as a whole. Nothing is imported.
#[derive(Debug, thiserror::Error)]
pub enum CatalogImportError {
    #[error("Spreadsheet could not be read: {0}")]
    Unreadable(String),

    #[error("Spreadsheet has no data")]
    Empty,

    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<&'static str>),

    #[error(transparent)]
    Store(#[from] CoreError),
}

/// Parsed rows ready to persist, plus the rows that were rejected.
#[derive(Debug, Clone, Default)]
pub struct CatalogImport {
    pub products: Vec<NewProduct>,
    pub errors: Vec<ImportError>,
}

/// What the caller reports back once valid rows are persisted.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: usize,
    pub errors: Vec<ImportError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Name,
    Price,
    Image,
    BodyColour,
    Watt,
    Size,
    BeamAngle,
    CutOut,
}

const ALIASES: &[(Field, &[&str])] = &[
    (Field::Name, &["NAME", "MODEL", "MODULE", "PRODUCT"]),
    (Field::Price, &["PRICE", "UNIT PRICE", "RATE"]),
    (Field::Image, &["IMAGE", "PICTURE", "IMAGE FILENAME", "PHOTO"]),
    (Field::BodyColour, &["BODY COLOUR", "BODY COLOR", "BODY CLOLOR"]),
    (Field::Watt, &["WATT", "WATTAGE"]),
    (Field::Size, &["SIZE"]),
    (Field::BeamAngle, &["BEAM ANGLE"]),
    (Field::CutOut, &["CUT OUT", "CUTOUT", "CUT-OUT"]),
];

#[derive(Debug, Default)]
struct ColumnMap {
    columns: Vec<(Field, usize)>,
}

impl ColumnMap {
    fn from_header(header: &[Data]) -> Result<Self, CatalogImportError> {
        let mut map = ColumnMap::default();
        for (index, cell) in header.iter().enumerate() {
            let Some(label) = cell_text(cell) else { continue };
            let label = normalize_header(&label);
            let field = ALIASES
                .iter()
                .find(|(_, names)| names.contains(&label.as_str()))
                .map(|(field, _)| *field);
            if let Some(field) = field {
                if map.index(field).is_none() {
                    map.columns.push((field, index));
                }
            }
        }

        let mut missing = Vec::new();
        if map.index(Field::Name).is_none() {
            missing.push("name");
        }
        if map.index(Field::Price).is_none() {
            missing.push("price");
        }
        if !missing.is_empty() {
            return Err(CatalogImportError::MissingColumns(missing));
        }
        Ok(map)
    }

    fn index(&self, field: Field) -> Option<usize> {
        self.columns
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, i)| *i)
    }

    fn text(&self, row: &[Data], field: Field) -> Option<String> {
        self.index(field)
            .and_then(|i| row.get(i))
            .and_then(cell_text)
    }

    fn cell<'a>(&self, row: &'a [Data], field: Field) -> Option<&'a Data> {
        self.index(field).and_then(|i| row.get(i))
    }
}

/// Reads the first worksheet of an xlsx/xls/ods file into catalog rows.
pub fn parse_catalog(bytes: &[u8]) -> Result<CatalogImport, CatalogImportError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| CatalogImportError::Unreadable(e.to_string()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(CatalogImportError::Empty)?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| CatalogImportError::Unreadable(e.to_string()))?;

    let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);
    let mut rows = range.rows();
    let header = rows.next().ok_or(CatalogImportError::Empty)?;
    let columns = ColumnMap::from_header(header)?;

    let mut import = CatalogImport::default();
    for (offset, row) in rows.enumerate() {
        // header is first_row, data starts one below; +1 more for 1-based numbering
        let row_number = first_row + offset + 2;
        if row.iter().all(|c| cell_text(c).is_none()) {
            continue;
        }

        match parse_row(&columns, row) {
            Ok(product) => import.products.push(product),
            Err(message) => import.errors.push(ImportError {
                row: row_number,
                message,
            }),
        }
    }

    tracing::debug!(
        sheet = %sheet_name,
        valid = import.products.len(),
        rejected = import.errors.len(),
        "Parsed catalog spreadsheet"
    );

    Ok(import)
}

/// Parses the spreadsheet and stores every valid row in one batch.
/// Rejected rows come back in the report; they never block the valid ones.
pub async fn import_catalog(
    repo: &dyn ProductRepository,
    bytes: &[u8],
) -> Result<ImportReport, CatalogImportError> {
    let import = parse_catalog(bytes)?;
    save_catalog(repo, import).await
}

/// Persist the valid rows of an already parsed catalog in one batch.
pub async fn save_catalog(
    repo: &dyn ProductRepository,
    import: CatalogImport,
) -> Result<ImportReport, CatalogImportError> {
    for error in &import.errors {
        tracing::warn!(row = error.row, message = %error.message, "Catalog row rejected");
    }

    let created = if import.products.is_empty() {
        Vec::new()
    } else {
        repo.create_products(&import.products).await?
    };

    tracing::info!(
        imported = created.len(),
        rejected = import.errors.len(),
        "Catalog import finished"
    );

    Ok(ImportReport {
        imported: created.len(),
        errors: import.errors,
    })
}

fn parse_row(columns: &ColumnMap, row: &[Data]) -> Result<NewProduct, String> {
    let name = columns
        .text(row, Field::Name)
        .ok_or_else(|| "product name is missing".to_string())?;

    let price = match columns.cell(row, Field::Price) {
        Some(cell) => parse_price(cell)?,
        None => return Err("price is missing".to_string()),
    };

    let product = NewProduct {
        name,
        unit_price: price,
        image_path: columns.text(row, Field::Image),
        attributes: ProductAttributes {
            body_colour: columns.text(row, Field::BodyColour),
            watt: columns.text(row, Field::Watt),
            size: columns.text(row, Field::Size),
            beam_angle: columns.text(row, Field::BeamAngle),
            cut_out: columns.text(row, Field::CutOut),
        },
    }
    .normalized();

    product.validate().map_err(|e| {
        e.issues
            .iter()
            .map(|i| format!("{} {}", i.field, i.message))
            .collect::<Vec<_>>()
            .join("; ")
    })?;

    Ok(product)
}

fn parse_price(cell: &Data) -> Result<Decimal, String> {
    match cell {
        Data::Int(i) => Ok(Decimal::from(*i)),
        Data::Float(f) => Decimal::from_str(&f.to_string())
            .map_err(|_| format!("price '{}' is not a number", f)),
        Data::String(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '-'))
                .collect();
            if cleaned.is_empty() {
                if s.trim().is_empty() {
                    return Err("price is missing".to_string());
                }
                return Err(format!("price '{}' is not a number", s.trim()));
            }
            Decimal::from_str(&cleaned).map_err(|_| format!("price '{}' is not a number", s.trim()))
        }
        Data::Empty => Err("price is missing".to_string()),
        other => Err(format!("price '{}' is not a number", other)),
    }
}

/// Cell contents as trimmed text; whole floats lose their `.0`.
fn cell_text(cell: &Data) -> Option<String> {
    let text = match cell {
        Data::Empty => return None,
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string().trim().to_string(),
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn normalize_header(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}
