use std::fmt;

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{Error, Result};

/// Date format used in data files and printed output
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Profit margin used when none is given
pub const DEFAULT_MARGIN: Decimal = Decimal::from_parts(2, 0, 0, false, 1);

/// Perishable products this many days (or fewer) from their best-before date are sold at a discount
pub const CLEARANCE_DAYS: i64 = 7;

/// Fraction taken off the sale price of a perishable product close to its best-before date
pub const CLEARANCE_DISCOUNT: Decimal = Decimal::from_parts(25, 0, 0, false, 2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProductId(pub u32);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductKind {
    NonPerishable,
    Perishable {
        best_before: NaiveDate,
    },
}

impl ProductKind {
    /// The numeric code of this kind in data files
    pub fn code(&self) -> u8 {
        match self {
            ProductKind::NonPerishable => 1,
            ProductKind::Perishable {..} => 2,
        }
    }
}

/// A product in the store's catalog
///
/// Two products are equal when they have the same id.
#[derive(Debug, Clone)]
pub struct Product {
    id: ProductId,
    description: String,
    cost: Decimal,
    margin: Decimal,
    kind: ProductKind,
}

impl PartialEq for Product {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Product {}

impl Product {
    /// Creates a product after validating its data
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidProduct`] if the description has fewer than three characters, the
    /// cost or margin is not positive, or a perishable product is already past its best-before
    /// date on `today`.
    pub fn new(
        id: ProductId,
        description: &str,
        cost: Decimal,
        margin: Decimal,
        kind: ProductKind,
        today: NaiveDate,
    ) -> Result<Self> {
        let description = description.trim();
        if description.chars().count() < 3 {
            return Err(Error::InvalidProduct("description needs at least three characters"));
        }
        if cost <= Decimal::ZERO {
            return Err(Error::InvalidProduct("cost must be positive"));
        }
        if margin <= Decimal::ZERO {
            return Err(Error::InvalidProduct("margin must be positive"));
        }
        if let ProductKind::Perishable {best_before} = kind {
            if best_before < today {
                return Err(Error::InvalidProduct("best-before date is in the past"));
            }
        }

        Ok(Self {
            id,
            description: description.to_string(),
            cost,
            margin,
            kind,
        })
    }

    /// Parses a data file line of the form `kind;description;cost;margin[;dd/mm/yyyy]`
    ///
    /// Kind `1` is a non-perishable product and kind `2` a perishable one, which requires the
    /// best-before date. Numbers may use either a decimal point or a decimal comma.
    ///
    /// # Errors
    ///
    /// Every failure, including a product that fails validation, is reported as
    /// [`Error::Parse`] carrying `line_number`.
    pub fn from_line(line: &str, line_number: usize, id: ProductId, today: NaiveDate) -> Result<Self> {
        let parse_error = |reason: String| Error::Parse {line: line_number, reason};

        let fields: Vec<&str> = line.split(';').map(str::trim).collect();
        let kind_code = fields[0];
        let expected_fields = match kind_code {
            "1" => 4,
            "2" => 5,
            _ => return Err(parse_error(format!("unknown product kind {:?}", kind_code))),
        };
        if fields.len() != expected_fields {
            return Err(parse_error(format!("expected {} fields, found {}", expected_fields, fields.len())));
        }

        let cost = parse_decimal(fields[2]).ok_or_else(|| parse_error(format!("invalid cost {:?}", fields[2])))?;
        let margin = parse_decimal(fields[3]).ok_or_else(|| parse_error(format!("invalid margin {:?}", fields[3])))?;
        let kind = if expected_fields == 5 {
            let best_before = NaiveDate::parse_from_str(fields[4], DATE_FORMAT)
                .map_err(|err| parse_error(format!("invalid best-before date {:?}: {}", fields[4], err)))?;
            ProductKind::Perishable {best_before}
        } else {
            ProductKind::NonPerishable
        };

        Self::new(id, fields[1], cost, margin, kind, today)
            .map_err(|err| parse_error(err.to_string()))
    }

    /// Formats this product as a data file line that [`Product::from_line`] reads back
    pub fn to_line(&self) -> String {
        let mut line = format!(
            "{};{};{};{}",
            self.kind.code(),
            self.description,
            self.cost.normalize(),
            self.margin.normalize(),
        );
        if let ProductKind::Perishable {best_before} = self.kind {
            line.push(';');
            line.push_str(&best_before.format(DATE_FORMAT).to_string());
        }
        line
    }

    pub fn id(&self) -> ProductId {
        self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn cost(&self) -> Decimal {
        self.cost
    }

    pub fn margin(&self) -> Decimal {
        self.margin
    }

    pub fn kind(&self) -> ProductKind {
        self.kind
    }

    /// Returns the price this product sells for on the given day
    ///
    /// The price is the cost plus the margin. A perishable product within
    /// [`CLEARANCE_DAYS`] of its best-before date is discounted by [`CLEARANCE_DISCOUNT`].
    pub fn sale_price(&self, today: NaiveDate) -> Decimal {
        let price = self.cost * (Decimal::ONE + self.margin);
        match self.kind {
            ProductKind::Perishable {best_before} if (best_before - today).num_days() <= CLEARANCE_DAYS => {
                price * (Decimal::ONE - CLEARANCE_DISCOUNT)
            },
            _ => price,
        }
    }

    /// Returns an adapter that displays this product with its sale price on the given day
    pub fn priced(&self, today: NaiveDate) -> Priced<'_> {
        Priced {product: self, today}
    }
}

/// Displays a product with its sale price
#[derive(Debug)]
pub struct Priced<'a> {
    product: &'a Product,
    today: NaiveDate,
}

impl<'a> fmt::Display for Priced<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Priced {product, today} = self;
        write!(f, "ID: {} NAME: {}: $ {:.2}", product.id, product.description, round_money(product.sale_price(*today)))?;
        if let ProductKind::Perishable {best_before} = product.kind {
            write!(f, " (best before {})", best_before.format(DATE_FORMAT))?;
        }
        Ok(())
    }
}

/// Rounds to cents, with halves rounded away from zero
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    text.replace(',', ".").parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn dec(text: &str) -> Decimal {
        text.parse().unwrap()
    }

    #[test]
    fn constants() {
        assert_eq!(DEFAULT_MARGIN, dec("0.2"));
        assert_eq!(CLEARANCE_DISCOUNT, dec("0.25"));
    }

    #[test]
    fn parse_non_perishable() {
        let today = date(2024, 3, 1);
        let product = Product::from_line("1;Rice 5kg;20,00;0.5", 1, ProductId(10_000), today).unwrap();

        assert_eq!(product.id(), ProductId(10_000));
        assert_eq!(product.description(), "Rice 5kg");
        assert_eq!(product.cost(), dec("20"));
        assert_eq!(product.margin(), dec("0.5"));
        assert_eq!(product.kind(), ProductKind::NonPerishable);
        assert_eq!(product.sale_price(today), dec("30"));
    }

    #[test]
    fn parse_perishable() {
        let today = date(2024, 3, 1);
        let product = Product::from_line("2;Milk;4.00;0.25;31/03/2024", 7, ProductId(10_001), today).unwrap();

        assert_eq!(product.kind(), ProductKind::Perishable {best_before: date(2024, 3, 31)});
        assert_eq!(product.sale_price(today), dec("5"));
    }

    #[test]
    fn clearance_discount_applies_within_a_week() {
        let product = Product::new(
            ProductId(1),
            "Yogurt",
            dec("10"),
            dec("0.2"),
            ProductKind::Perishable {best_before: date(2024, 3, 10)},
            date(2024, 3, 1),
        ).unwrap();

        // 9 days left: full price
        assert_eq!(product.sale_price(date(2024, 3, 1)), dec("12"));
        // 7 days left: discounted
        assert_eq!(product.sale_price(date(2024, 3, 3)), dec("9"));
        // Last day: discounted
        assert_eq!(product.sale_price(date(2024, 3, 10)), dec("9"));
    }

    #[test]
    fn validation() {
        let today = date(2024, 3, 1);
        let make = |description: &str, cost: &str, margin: &str, kind| {
            Product::new(ProductId(1), description, dec(cost), dec(margin), kind, today)
        };

        assert!(make("Tea", "1", "0.1", ProductKind::NonPerishable).is_ok());
        assert!(matches!(make("Te", "1", "0.1", ProductKind::NonPerishable), Err(Error::InvalidProduct(_))));
        assert!(matches!(make("  Te  ", "1", "0.1", ProductKind::NonPerishable), Err(Error::InvalidProduct(_))));
        assert!(matches!(make("Tea", "0", "0.1", ProductKind::NonPerishable), Err(Error::InvalidProduct(_))));
        assert!(matches!(make("Tea", "1", "-0.1", ProductKind::NonPerishable), Err(Error::InvalidProduct(_))));

        let expired = ProductKind::Perishable {best_before: date(2024, 2, 29)};
        assert!(matches!(make("Fish", "1", "0.1", expired), Err(Error::InvalidProduct(_))));
        let last_day = ProductKind::Perishable {best_before: today};
        assert!(make("Fish", "1", "0.1", last_day).is_ok());
    }

    #[test]
    fn malformed_lines_report_their_line_number() {
        let today = date(2024, 3, 1);
        let cases = &[
            "3;Tea;1;0.1",
            "1;Tea;1",
            "1;Tea;abc;0.1",
            "1;Tea;1;x",
            "2;Milk;1;0.1",
            "2;Milk;1;0.1;2024-03-31",
            "1;T;1;0.1",
            "",
        ];

        for &line in cases {
            match Product::from_line(line, 12, ProductId(1), today) {
                Err(Error::Parse {line: 12, ..}) => {},
                other => panic!("expected a parse error for {:?}, got {:?}", line, other),
            }
        }
    }

    #[test]
    fn line_round_trip() {
        let today = date(2024, 3, 1);
        for &line in &["1;Rice 5kg;20.5;0.35", "2;Milk;4;0.25;31/03/2024"] {
            let product = Product::from_line(line, 1, ProductId(1), today).unwrap();
            assert_eq!(product.to_line(), line);
        }
    }

    #[test]
    fn priced_display() {
        let today = date(2024, 3, 1);
        let product = Product::from_line("1;Coffee;10;0.333", 1, ProductId(10_004), today).unwrap();
        assert_eq!(product.priced(today).to_string(), "ID: 10004 NAME: Coffee: $ 13.33");

        let product = Product::from_line("2;Cheese;8;0.5;05/03/2024", 1, ProductId(10_005), today).unwrap();
        assert_eq!(product.priced(today).to_string(), "ID: 10005 NAME: Cheese: $ 9.00 (best before 05/03/2024)");
    }

    #[test]
    fn equality_is_by_id() {
        let today = date(2024, 3, 1);
        let a = Product::from_line("1;Coffee;10;0.3", 1, ProductId(1), today).unwrap();
        let b = Product::from_line("1;Sugar;2;0.1", 2, ProductId(1), today).unwrap();
        let c = Product::from_line("1;Coffee;10;0.3", 3, ProductId(2), today).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
