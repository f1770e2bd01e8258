use std::sync::Arc;

use quotedesk_catalog::{PricingCalculator, Product, ProductRepository};
use quotedesk_core::{CoreError, CoreResult, Identity, ValidationError};

use crate::models::{CustomerInfo, Quotation, QuotationDraft, QuotationSummary, Selection};
use crate::repository::QuotationRepository;

/// Turns a customer and a product selection into a priced, persisted quotation.
pub struct QuotationBuilder {
    calculator: PricingCalculator,
    products: Arc<dyn ProductRepository>,
    quotations: Arc<dyn QuotationRepository>,
}

impl QuotationBuilder {
    pub fn new(
        calculator: PricingCalculator,
        products: Arc<dyn ProductRepository>,
        quotations: Arc<dyn QuotationRepository>,
    ) -> Self {
        Self {
            calculator,
            products,
            quotations,
        }
    }

    pub fn calculator(&self) -> &PricingCalculator {
        &self.calculator
    }

    /// Validates and prices without touching storage.
    pub fn draft(
        &self,
        customer: &CustomerInfo,
        lines: &[(Product, i64)],
    ) -> Result<QuotationDraft, ValidationError> {
        let mut err = ValidationError::new();
        if let Err(customer_err) = customer.validate() {
            err.extend(customer_err);
        }
        if lines.is_empty() {
            err.push("items", "at least one line item is required");
        }

        match self.calculator.compute(lines) {
            Ok(totals) => {
                err.into_result()?;
                Ok(QuotationDraft::from_totals(customer.clone(), lines, totals))
            }
            Err(line_err) => {
                err.extend(line_err);
                Err(err)
            }
        }
    }

    /// Looks up each selected product, then drafts. Unknown ids are validation issues.
    pub async fn preview(
        &self,
        customer: &CustomerInfo,
        selections: &[Selection],
    ) -> CoreResult<QuotationDraft> {
        let lines = self.resolve(customer, selections).await?;
        Ok(self.draft(customer, &lines)?)
    }

    /// Persists already-resolved lines.
    pub async fn build(
        &self,
        identity: &Identity,
        customer: &CustomerInfo,
        lines: &[(Product, i64)],
    ) -> CoreResult<Quotation> {
        let draft = self.draft(customer, lines)?;
        self.persist(identity, draft).await
    }

    /// `preview` followed by persist.
    pub async fn create(
        &self,
        identity: &Identity,
        customer: &CustomerInfo,
        selections: &[Selection],
    ) -> CoreResult<Quotation> {
        let draft = self.preview(customer, selections).await?;
        self.persist(identity, draft).await
    }

    pub async fn get(&self, sl_no: i64) -> CoreResult<Quotation> {
        self.quotations
            .get_quotation(sl_no)
            .await?
            .ok_or_else(|| CoreError::not_found("Quotation", sl_no))
    }

    pub async fn list(&self) -> CoreResult<Vec<QuotationSummary>> {
        self.quotations.list_quotations().await
    }

    pub async fn count(&self) -> CoreResult<i64> {
        self.quotations.count_quotations().await
    }

    pub async fn delete(&self, identity: &Identity, sl_no: i64) -> CoreResult<()> {
        identity.require_admin()?;
        self.quotations.delete_quotation(sl_no).await?;
        tracing::info!(sl_no, deleted_by = %identity.username, "Quotation deleted");
        Ok(())
    }

    async fn persist(&self, identity: &Identity, draft: QuotationDraft) -> CoreResult<Quotation> {
        let quotation = self
            .quotations
            .insert_quotation(&draft, &identity.username)
            .await?;

        tracing::info!(
            sl_no = quotation.sl_no,
            reference = %quotation.reference,
            items = quotation.items.len(),
            grand_total = %quotation.grand_total,
            created_by = %quotation.created_by,
            "Quotation saved"
        );
        Ok(quotation)
    }

    async fn resolve(
        &self,
        customer: &CustomerInfo,
        selections: &[Selection],
    ) -> CoreResult<Vec<(Product, i64)>> {
        let mut lines = Vec::with_capacity(selections.len());
        let mut unknown = ValidationError::new();
        for (index, selection) in selections.iter().enumerate() {
            match self.products.get_product(selection.product_id).await? {
                Some(product) => lines.push((product, selection.quantity)),
                None => unknown.push(
                    format!("items[{}].product_id", index),
                    format!("product {} does not exist", selection.product_id),
                ),
            }
        }

        if unknown.is_empty() {
            return Ok(lines);
        }

        // Indices in `lines` no longer match the request, so report the rest here.
        let mut err = customer.validate().err().unwrap_or_default();
        for (index, selection) in selections.iter().enumerate() {
            if selection.quantity < 1 {
                err.push(
                    format!("items[{}].quantity", index),
                    format!("must be at least 1, got {}", selection.quantity),
                );
            }
        }
        err.extend(unknown);
        Err(err.into())
    }
}
