use chrono::{DateTime, Utc};
use quotedesk_core::ValidationError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub type ProductId = i64;

/// Descriptive attributes from the supplier sheet. All optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductAttributes {
    pub body_colour: Option<String>,
    pub watt: Option<String>,
    pub size: Option<String>,
    pub beam_angle: Option<String>,
    pub cut_out: Option<String>,
}

impl ProductAttributes {
    /// Human-readable one-liner, e.g. `Body colour: Black | Watt: 12`.
    pub fn summary(&self) -> Option<String> {
        let labelled = [
            ("Body colour", &self.body_colour),
            ("Watt", &self.watt),
            ("Size", &self.size),
            ("Beam angle", &self.beam_angle),
            ("Cut out", &self.cut_out),
        ];

        let parts: Vec<String> = labelled
            .iter()
            .filter_map(|(label, value)| {
                value
                    .as_deref()
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(|v| format!("{}: {}", label, v))
            })
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" | "))
        }
    }

    fn normalized(self) -> Self {
        Self {
            body_colour: non_blank(self.body_colour),
            watt: non_blank(self.watt),
            size: non_blank(self.size),
            beam_angle: non_blank(self.beam_angle),
            cut_out: non_blank(self.cut_out),
        }
    }
}

/// A catalog entry as stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub unit_price: Decimal,
    pub image_path: Option<String>,
    #[serde(flatten)]
    pub attributes: ProductAttributes,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating or replacing a catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub unit_price: Decimal,
    #[serde(default)]
    pub image_path: Option<String>,
    #[serde(flatten, default)]
    pub attributes: ProductAttributes,
}

impl NewProduct {
    pub fn new(name: impl Into<String>, unit_price: Decimal) -> Self {
        Self {
            name: name.into(),
            unit_price,
            image_path: None,
            attributes: ProductAttributes::default(),
        }
    }

    pub fn with_image(mut self, image_path: impl Into<String>) -> Self {
        self.image_path = Some(image_path.into());
        self
    }

    pub fn with_attributes(mut self, attributes: ProductAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Trims text fields and turns blank optionals into `None`.
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            unit_price: self.unit_price,
            image_path: non_blank(self.image_path),
            attributes: self.attributes.normalized(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut err = ValidationError::new();
        if self.name.trim().is_empty() {
            err.push("name", "must not be blank");
        }
        if self.unit_price < Decimal::ZERO {
            err.push("unit_price", "must not be negative");
        }
        err.into_result()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_blank_name_and_negative_price() {
        let product = NewProduct::new("   ", Decimal::new(-1, 2));
        let err = product.validate().unwrap_err();

        let fields: Vec<&str> = err.issues.iter().map(|i| i.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "unit_price"]);
    }

    #[test]
    fn test_zero_price_is_allowed() {
        assert!(NewProduct::new("Sample", Decimal::ZERO).validate().is_ok());
    }

    #[test]
    fn test_normalized_drops_blank_optionals() {
        let product = NewProduct::new("  COB-12 ", Decimal::new(1250, 0))
            .with_image("  ")
            .with_attributes(ProductAttributes {
                body_colour: Some(" Black ".to_string()),
                watt: Some("".to_string()),
                ..Default::default()
            })
            .normalized();

        assert_eq!(product.name, "COB-12");
        assert_eq!(product.image_path, None);
        assert_eq!(product.attributes.body_colour.as_deref(), Some("Black"));
        assert_eq!(product.attributes.watt, None);
    }

    #[test]
    fn test_attribute_summary() {
        let attributes = ProductAttributes {
            body_colour: Some("White".to_string()),
            watt: Some("12".to_string()),
            cut_out: Some("75mm".to_string()),
            ..Default::default()
        };
        assert_eq!(
            attributes.summary().as_deref(),
            Some("Body colour: White | Watt: 12 | Cut out: 75mm")
        );
        assert_eq!(ProductAttributes::default().summary(), None);
    }
}
