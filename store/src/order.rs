use std::fmt;

use assoc::ChainedList;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::product::{DATE_FORMAT, Product, round_money};

/// Fraction taken off the total of an order paid in cash
pub const CASH_DISCOUNT: Decimal = Decimal::from_parts(15, 0, 0, false, 2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Payment {
    Cash,
    Installments,
}

impl Payment {
    /// Returns the payment method with the given code: `1` for cash, `2` for installments
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Payment::Cash),
            2 => Some(Payment::Installments),
            _ => None,
        }
    }

    pub fn discount(self) -> Decimal {
        match self {
            Payment::Cash => CASH_DISCOUNT,
            Payment::Installments => Decimal::ZERO,
        }
    }
}

/// A customer order: the products bought on one day, in the order they were added
#[derive(Debug, Clone)]
pub struct Order {
    id: u32,
    date: NaiveDate,
    payment: Payment,
    items: ChainedList<Product>,
}

impl Order {
    pub fn new(id: u32, date: NaiveDate, payment: Payment) -> Self {
        Self {
            id,
            date,
            payment,
            items: ChainedList::new(),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn payment(&self) -> Payment {
        self.payment
    }

    pub fn items(&self) -> &ChainedList<Product> {
        &self.items
    }

    /// Returns the number of products in the order, counting repeats
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Appends a product to the end of the order
    pub fn add_product(&mut self, product: Product) {
        self.items.push_back(product);
    }

    /// Returns the amount due for this order, rounded to cents
    ///
    /// Products are priced on the order's date. Cash payments receive [`CASH_DISCOUNT`].
    pub fn final_value(&self) -> Decimal {
        let date = self.date;
        let total: Decimal = self.items.reduce_to_total(|product| product.sale_price(date));
        round_money(total * (Decimal::ONE - self.payment.discount()))
    }

    /// Counts how many items of this order share the description of `product`
    pub fn repetitions(&self, product: &Product) -> usize {
        self.items.count_matching(|item| item.description() == product.description())
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Order number: {:02}", self.id)?;
        writeln!(f, "Order date: {}", self.date.format(DATE_FORMAT))?;
        writeln!(f, "Order with {} products.", self.items.len())?;
        writeln!(f, "Products in order:")?;
        for product in &self.items {
            writeln!(f, "{}", product.priced(self.date))?;
        }

        match self.payment {
            Payment::Cash => {
                let percent = round_money(CASH_DISCOUNT * Decimal::ONE_HUNDRED);
                writeln!(f, "Paid in cash. Discount: {:.2}%", percent)?;
            },
            Payment::Installments => writeln!(f, "Paid in installments.")?,
        }
        writeln!(f, "Order total: $ {:.2}", self.final_value())
    }
}
