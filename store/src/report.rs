//! Text reports about a single product
//!
//! The writers take any `io::Write`, so reports can go to a file or to the terminal.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::info;

use crate::error::Result;
use crate::order::Order;
use crate::product::Product;
use crate::supplier::Supplier;

const RULE: &str = "==================================================";
const SEPARATOR: &str = "--------------------------------------------------";

/// Writes every order that contains `product`
pub fn write_orders_report<W: Write>(mut out: W, product: &Product, orders: &[&Order], today: NaiveDate) -> Result<()> {
    writeln!(out, "ORDERS REPORT FOR PRODUCT")?;
    writeln!(out, "Product: {}", product.priced(today))?;
    writeln!(out, "Orders recorded: {}", orders.len())?;
    writeln!(out, "{}", RULE)?;

    for (number, order) in orders.iter().enumerate() {
        writeln!(out, "Order #{}", number + 1)?;
        write!(out, "{}", order)?;
        writeln!(out, "Times this product appears in the order: {}", order.repetitions(product))?;
        writeln!(out, "{}", SEPARATOR)?;
    }

    Ok(())
}

/// Writes every supplier that sold `product`
pub fn write_suppliers_report<W: Write>(mut out: W, product: &Product, suppliers: &[&Supplier], today: NaiveDate) -> Result<()> {
    writeln!(out, "SUPPLIERS REPORT FOR PRODUCT")?;
    writeln!(out, "Product: {}", product.priced(today))?;
    writeln!(out, "{}", RULE)?;

    for supplier in suppliers {
        writeln!(out, "Supplier: {} | Doc: {}", supplier.name(), supplier.document())?;
    }

    Ok(())
}

pub fn orders_report_name(product: &Product) -> String {
    format!("orders_product_{}.txt", product.id())
}

pub fn suppliers_report_name(product: &Product) -> String {
    format!("suppliers_product_{}.txt", product.id())
}

/// Creates `dir/name` and fills it with `write`, returning the path of the new report
pub fn write_report_file<F>(dir: &Path, name: &str, write: F) -> Result<PathBuf>
    where F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    let path = dir.join(name);
    let mut out = BufWriter::new(File::create(&path)?);
    write(&mut out)?;
    out.flush()?;

    info!(path = %path.display(), "wrote report");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::order::Payment;
    use crate::product::{ProductId, ProductKind};

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn product(id: u32, description: &str) -> Product {
        Product::new(ProductId(id), description, "10".parse().unwrap(), "0.5".parse().unwrap(), ProductKind::NonPerishable, date(2024, 1, 1)).unwrap()
    }

    #[test]
    fn orders_report_contents() {
        let today = date(2024, 1, 5);
        let pasta = product(10_000, "Pasta");

        let mut first = Order::new(3, today, Payment::Installments);
        first.add_product(pasta.clone());
        first.add_product(pasta.clone());
        let mut second = Order::new(9, today, Payment::Cash);
        second.add_product(pasta.clone());

        let mut out = Vec::new();
        write_orders_report(&mut out, &pasta, &[&first, &second], today).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("ORDERS REPORT FOR PRODUCT\nProduct: ID: 10000 NAME: Pasta: $ 15.00\nOrders recorded: 2\n"));
        assert!(text.contains("Order #1\nOrder number: 03\n"));
        assert!(text.contains("Order #2\nOrder number: 09\n"));
        assert!(text.contains("Order total: $ 30.00\nTimes this product appears in the order: 2\n"));
        assert!(text.contains("Order total: $ 12.75\nTimes this product appears in the order: 1\n"));
        assert_eq!(text.matches(SEPARATOR).count(), 2);
    }

    #[test]
    fn suppliers_report_contents() {
        let today = date(2024, 1, 5);
        let pasta = product(10_000, "Pasta");
        let acme = Supplier::new(10_001, "Acme Foods").unwrap();
        let north = Supplier::new(10_004, "North Star").unwrap();

        let mut out = Vec::new();
        write_suppliers_report(&mut out, &pasta, &[&acme, &north], today).unwrap();
        let text = String::from_utf8(out).unwrap();

        let expected = format!("\
SUPPLIERS REPORT FOR PRODUCT
Product: ID: 10000 NAME: Pasta: $ 15.00
{}
Supplier: Acme Foods | Doc: 10001
Supplier: North Star | Doc: 10004
", RULE);
        assert_eq!(text, expected);
    }

    #[test]
    fn report_names() {
        let pasta = product(10_000, "Pasta");
        assert_eq!(orders_report_name(&pasta), "orders_product_10000.txt");
        assert_eq!(suppliers_report_name(&pasta), "suppliers_product_10000.txt");
    }

    #[test]
    fn report_file_is_written() {
        let dir = std::env::temp_dir().join(format!("store-report-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let pasta = product(10_000, "Pasta");
        let path = write_report_file(&dir, &suppliers_report_name(&pasta), |out| {
            write_suppliers_report(out, &pasta, &[], date(2024, 1, 5))
        }).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("SUPPLIERS REPORT FOR PRODUCT\n"));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
