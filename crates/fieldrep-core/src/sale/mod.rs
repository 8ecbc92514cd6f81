//! Sale line items and sale drafts.
//!
//! Quantities and prices usually arrive as raw text from input fields.
//! Text that does not parse as a non-negative number counts as zero, so a
//! half-typed field yields a zero total rather than an error. A product or
//! sum too large for [`Decimal`] is treated the same way.

use fieldrep_store::models::{EntityId, Person, deserialize_id};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Parse user-entered numeric text. Empty, malformed or negative input is
/// zero.
pub fn parse_amount(input: &str) -> Decimal {
    match input.trim().parse::<Decimal>() {
        Ok(value) if value.is_sign_negative() => Decimal::ZERO,
        Ok(value) => value,
        Err(_) => Decimal::ZERO,
    }
}

/// `quantity × unit_price` from raw input text.
pub fn line_total(quantity: &str, unit_price: &str) -> Decimal {
    multiply(parse_amount(quantity), parse_amount(unit_price))
}

/// Zero when the product does not fit in a [`Decimal`].
fn multiply(quantity: Decimal, unit_price: Decimal) -> Decimal {
    quantity.checked_mul(unit_price).unwrap_or(Decimal::ZERO)
}

/// One product on a sale. `line_total` always equals
/// `quantity × unit_price` (zero if that overflows); every setter
/// recomputes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleLineItem {
    product_id: EntityId,
    quantity: Decimal,
    unit_price: Decimal,
    line_total: Decimal,
}

impl SaleLineItem {
    pub fn new(product_id: EntityId, quantity: Decimal, unit_price: Decimal) -> Self {
        let mut item = Self {
            product_id,
            quantity: Decimal::ZERO,
            unit_price: Decimal::ZERO,
            line_total: Decimal::ZERO,
        };
        item.set_quantity(quantity);
        item.set_unit_price(unit_price);
        item
    }

    /// Build from raw input text.
    pub fn from_input(product_id: EntityId, quantity: &str, unit_price: &str) -> Self {
        Self::new(product_id, parse_amount(quantity), parse_amount(unit_price))
    }

    pub fn product_id(&self) -> EntityId {
        self.product_id
    }

    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    pub fn line_total(&self) -> Decimal {
        self.line_total
    }

    pub fn set_quantity(&mut self, quantity: Decimal) {
        self.quantity = quantity.max(Decimal::ZERO);
        self.recompute();
    }

    pub fn set_unit_price(&mut self, unit_price: Decimal) {
        self.unit_price = unit_price.max(Decimal::ZERO);
        self.recompute();
    }

    pub fn set_quantity_input(&mut self, input: &str) {
        self.set_quantity(parse_amount(input));
    }

    pub fn set_unit_price_input(&mut self, input: &str) {
        self.set_unit_price(parse_amount(input));
    }

    fn recompute(&mut self) {
        self.line_total = multiply(self.quantity, self.unit_price);
    }
}

/// Why a sale draft cannot be submitted yet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaleError {
    #[error("choose a doctor or chemist for this sale")]
    NoTarget,

    #[error("add at least one product")]
    NoItems,

    #[error("product {0} has a zero quantity")]
    ZeroQuantity(EntityId),
}

/// A sale being composed for one doctor or chemist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaleDraft {
    target: Option<Person>,
    items: Vec<SaleLineItem>,
}

impl SaleDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target(&self) -> Option<&Person> {
        self.target.as_ref()
    }

    pub fn set_target(&mut self, person: impl Into<Person>) {
        self.target = Some(person.into());
    }

    pub fn items(&self) -> &[SaleLineItem] {
        &self.items
    }

    /// Add a line, replacing any existing line for the same product.
    pub fn upsert_item(&mut self, item: SaleLineItem) {
        match self
            .items
            .iter_mut()
            .find(|existing| existing.product_id == item.product_id)
        {
            Some(existing) => *existing = item,
            None => self.items.push(item),
        }
    }

    /// Returns the removed line, if there was one.
    pub fn remove_item(&mut self, product_id: EntityId) -> Option<SaleLineItem> {
        let index = self.items.iter().position(|i| i.product_id == product_id)?;
        Some(self.items.remove(index))
    }

    /// Sum of line totals, or zero if the sum overflows.
    pub fn total(&self) -> Decimal {
        self.items
            .iter()
            .try_fold(Decimal::ZERO, |sum, item| sum.checked_add(item.line_total))
            .unwrap_or(Decimal::ZERO)
    }

    pub fn to_submission(&self) -> Result<SaleSubmission, SaleError> {
        let target = self.target.as_ref().ok_or(SaleError::NoTarget)?;
        if self.items.is_empty() {
            return Err(SaleError::NoItems);
        }
        if let Some(item) = self.items.iter().find(|i| i.quantity.is_zero()) {
            return Err(SaleError::ZeroQuantity(item.product_id));
        }

        let (doctor_company_id, chemist_company_id) = match target {
            Person::Doctor(d) => (Some(d.profile.id), None),
            Person::Chemist(c) => (None, Some(c.profile.id)),
        };

        Ok(SaleSubmission {
            doctor_company_id,
            chemist_company_id,
            items: self.items.clone(),
            total: self.total(),
        })
    }
}

/// `CreateSaleInput` as sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleSubmission {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor_company_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chemist_company_id: Option<EntityId>,
    pub items: Vec<SaleLineItem>,
    pub total: Decimal,
}

/// What the backend returns for a created sale.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedSale {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: EntityId,
    #[serde(default)]
    pub total: Decimal,
}
