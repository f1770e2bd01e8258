use quotedesk_core::ValidationError;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::product::{Product, ProductId};

/// 18%, the rate the business quotes at unless configured otherwise.
pub const DEFAULT_GST_RATE: Decimal = Decimal::from_parts(18, 0, 0, false, 2);

/// Round half-up to whole paise/cents.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `0.18` -> `18%`, `0.125` -> `12.5%`.
pub fn percent_label(rate: Decimal) -> String {
    format!("{}%", (rate * Decimal::ONE_HUNDRED).normalize())
}

/// Priced form of one selected product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LineAmount {
    pub product_id: ProductId,
    pub quantity: i64,
    pub unit_price: Decimal,
    pub line_amount: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Totals {
    pub lines: Vec<LineAmount>,
    pub subtotal: Decimal,
    pub gst_rate: Decimal,
    pub gst_amount: Decimal,
    pub grand_total: Decimal,
}

/// Stateless quotation arithmetic. GST applies once, to the subtotal.
#[derive(Debug, Clone)]
pub struct PricingCalculator {
    gst_rate: Decimal,
}

impl Default for PricingCalculator {
    fn default() -> Self {
        Self {
            gst_rate: DEFAULT_GST_RATE,
        }
    }
}

impl PricingCalculator {
    pub fn new(gst_rate: Decimal) -> Result<Self, ValidationError> {
        if gst_rate < Decimal::ZERO || gst_rate > Decimal::ONE {
            return Err(ValidationError::single(
                "gst_rate",
                format!("must be between 0 and 1, got {}", gst_rate),
            ));
        }
        Ok(Self { gst_rate })
    }

    pub fn gst_rate(&self) -> Decimal {
        self.gst_rate
    }

    pub fn gst_percent_label(&self) -> String {
        percent_label(self.gst_rate)
    }

    /// Price `(product, quantity)` pairs. Every bad line is reported, not just the first.
    pub fn compute(&self, lines: &[(Product, i64)]) -> Result<Totals, ValidationError> {
        let mut err = ValidationError::new();
        for (index, (product, quantity)) in lines.iter().enumerate() {
            if *quantity < 1 {
                err.push(
                    format!("items[{}].quantity", index),
                    format!("must be at least 1, got {}", quantity),
                );
            }
            if product.unit_price < Decimal::ZERO {
                err.push(
                    format!("items[{}].unit_price", index),
                    format!("'{}' has a negative unit price", product.name),
                );
            }
        }
        err.into_result()?;

        let mut err = ValidationError::new();
        let mut priced = Vec::with_capacity(lines.len());
        for (index, (product, quantity)) in lines.iter().enumerate() {
            match product.unit_price.checked_mul(Decimal::from(*quantity)) {
                Some(amount) => priced.push(LineAmount {
                    product_id: product.id,
                    quantity: *quantity,
                    unit_price: product.unit_price,
                    line_amount: round_money(amount),
                }),
                None => err.push(
                    format!("items[{}].quantity", index),
                    "line amount exceeds the supported range",
                ),
            }
        }
        err.into_result()?;

        let subtotal = priced
            .iter()
            .try_fold(Decimal::ZERO, |acc, line| acc.checked_add(line.line_amount))
            .map(round_money)
            .ok_or_else(|| out_of_range("subtotal"))?;
        let gst_amount = subtotal
            .checked_mul(self.gst_rate)
            .map(round_money)
            .ok_or_else(|| out_of_range("gst_amount"))?;
        let grand_total = subtotal
            .checked_add(gst_amount)
            .ok_or_else(|| out_of_range("grand_total"))?;

        Ok(Totals {
            lines: priced,
            subtotal,
            gst_rate: self.gst_rate,
            gst_amount,
            grand_total,
        })
    }
}

fn out_of_range(field: &str) -> ValidationError {
    ValidationError::single(field, "exceeds the supported range")
}
