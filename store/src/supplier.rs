use std::fmt;

use assoc::ChainedList;
use chrono::NaiveDate;

use crate::error::{Error, Result};
use crate::product::Product;

/// A supplier and the products it has sold to the store
#[derive(Debug, Clone)]
pub struct Supplier {
    document: u32,
    name: String,
    products: ChainedList<Product>,
}

impl Supplier {
    /// Creates a supplier with no products
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSupplier`] if `name` has fewer than two words.
    pub fn new(document: u32, name: &str) -> Result<Self> {
        let name = name.trim();
        if name.split_whitespace().count() < 2 {
            return Err(Error::InvalidSupplier(name.to_string()));
        }

        Ok(Self {
            document,
            name: name.to_string(),
            products: ChainedList::new(),
        })
    }

    /// Returns `true` if `name` would be accepted by [`Supplier::new`]
    pub fn is_valid_name(name: &str) -> bool {
        name.split_whitespace().count() >= 2
    }

    pub fn document(&self) -> u32 {
        self.document
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn products(&self) -> &ChainedList<Product> {
        &self.products
    }

    pub fn add_product(&mut self, product: Product) {
        self.products.push_back(product);
    }

    /// Returns an adapter that displays this supplier with its products priced on the given day
    pub fn report(&self, today: NaiveDate) -> Report<'_> {
        Report {supplier: self, today}
    }
}

impl PartialEq for Supplier {
    fn eq(&self, other: &Self) -> bool {
        self.document == other.document
    }
}

impl Eq for Supplier {}

/// Displays a supplier followed by every product it sold
#[derive(Debug)]
pub struct Report<'a> {
    supplier: &'a Supplier,
    today: NaiveDate,
}

impl<'a> fmt::Display for Report<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Report {supplier, today} = self;
        writeln!(f, "Supplier: {}", supplier.name)?;
        writeln!(f, "Document: {}", supplier.document)?;
        writeln!(f, "Products sold:")?;
        for product in &supplier.products {
            writeln!(f, "{}", product.priced(*today))?;
        }
        Ok(())
    }
}
