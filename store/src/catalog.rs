//! Loading and saving the store's flat text data files
//!
//! Both file kinds start with a line holding the number of records that follow. Blank lines are
//! skipped everywhere.

use std::cmp::Ordering;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use assoc::{AvlMap, Comparator, OrderedMap};
use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::product::{Product, ProductId};
use crate::sequence::IdSequence;
use crate::supplier::Supplier;

/// Orders strings by comparing their lowercase forms
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CaseInsensitive;

impl Comparator<String> for CaseInsensitive {
    fn compare(&self, a: &String, b: &String) -> Ordering {
        let a = a.chars().flat_map(char::to_lowercase);
        let b = b.chars().flat_map(char::to_lowercase);
        a.cmp(b)
    }
}

pub type ProductsById = AvlMap<ProductId, Product>;
pub type ProductsByName = AvlMap<String, Product, CaseInsensitive>;

/// Reads a product file, assigning ids from `ids` in file order
///
/// An empty input yields an empty catalog. Lines after the declared number of products are
/// ignored with a warning.
///
/// # Errors
///
/// Returns [`Error::Parse`] with the offending line number if the count line or any product line
/// is malformed, or if the input ends before the declared number of products. `ids` is only
/// advanced when the whole file loads.
pub fn load_products<R: BufRead>(reader: R, ids: &mut IdSequence, today: NaiveDate) -> Result<ProductsById> {
    let mut lines = numbered_lines(reader);
    let mut products = ProductsById::new();

    let (count_line, count) = match read_count(&mut lines)? {
        Some(header) => header,
        None => {
            warn!("product file is empty");
            return Ok(products);
        },
    };

    let mut next_ids = ids.clone();
    let mut last_line = count_line;
    for _ in 0..count {
        let (line_number, line) = next_non_blank(&mut lines)?.ok_or_else(|| Error::Parse {
            line: last_line + 1,
            reason: format!("expected {} products, found {}", count, products.len()),
        })?;

        let id = ProductId(next_ids.next_id());
        let product = Product::from_line(&line, line_number, id, today)?;
        products.insert(id, product)?;
        last_line = line_number;
    }

    if let Some((line_number, _)) = next_non_blank(&mut lines)? {
        warn!(line = line_number, declared = count, "ignoring lines after the declared number of products");
    }

    *ids = next_ids;
    info!(count = products.len(), "loaded products");
    Ok(products)
}

/// Opens and reads a product file. See [`load_products`].
pub fn load_products_file(path: &Path, ids: &mut IdSequence, today: NaiveDate) -> Result<ProductsById> {
    debug!(path = %path.display(), "opening product file");
    let file = File::open(path)?;
    load_products(BufReader::new(file), ids, today)
}

/// Builds a copy of the catalog keyed by description, ignoring case
///
/// When descriptions collide, the product with the lowest id is kept.
pub fn index_by_name(by_id: &ProductsById) -> ProductsByName {
    OrderedMap::rekey_from(by_id, |product| product.description().to_string(), CaseInsensitive)
}

/// Looks up a product by its description, ignoring case
pub fn find_by_name<'a>(by_name: &'a ProductsByName, name: &str) -> Option<&'a Product> {
    by_name.get(&name.trim().to_string())
}

/// Writes products in the format read by [`load_products`], in the map's order
pub fn save_products<K, C, B, W: Write>(products: &OrderedMap<K, Product, C, B>, writer: W) -> Result<()> {
    let mut writer = BufWriter::new(writer);
    writeln!(writer, "{}", products.len())?;
    for product in products.values() {
        writeln!(writer, "{}", product.to_line())?;
    }
    writer.flush()?;
    Ok(())
}

/// Creates (or truncates) a file and saves products to it. See [`save_products`].
pub fn save_products_file<K, C, B>(products: &OrderedMap<K, Product, C, B>, path: &Path) -> Result<()> {
    save_products(products, File::create(path)?)?;
    info!(path = %path.display(), count = products.len(), "saved products");
    Ok(())
}

/// Reads a supplier file, giving each valid supplier the next document number from `ids`
///
/// Names with fewer than two words are skipped with a warning and do not consume a document
/// number.
///
/// # Errors
///
/// Returns [`Error::Parse`] if the count line is malformed or the input ends before the declared
/// number of suppliers.
pub fn load_suppliers<R: BufRead>(reader: R, ids: &mut IdSequence) -> Result<Vec<Supplier>> {
    let mut lines = numbered_lines(reader);
    let mut suppliers = Vec::new();

    let (count_line, count) = match read_count(&mut lines)? {
        Some(header) => header,
        None => {
            warn!("supplier file is empty");
            return Ok(suppliers);
        },
    };

    let mut next_ids = ids.clone();
    let mut last_line = count_line;
    let mut skipped = 0;
    for read in 0..count {
        let (line_number, name) = next_non_blank(&mut lines)?.ok_or_else(|| Error::Parse {
            line: last_line + 1,
            reason: format!("expected {} suppliers, found {}", count, read),
        })?;
        last_line = line_number;

        if !Supplier::is_valid_name(&name) {
            skipped += 1;
            warn!(line = line_number, name = %name.trim(), "skipping supplier without at least two names");
            continue;
        }

        suppliers.push(Supplier::new(next_ids.next_id(), &name)?);
    }

    *ids = next_ids;
    info!(count = suppliers.len(), skipped, "loaded suppliers");
    Ok(suppliers)
}

/// Opens and reads a supplier file. See [`load_suppliers`].
pub fn load_suppliers_file(path: &Path, ids: &mut IdSequence) -> Result<Vec<Supplier>> {
    debug!(path = %path.display(), "opening supplier file");
    let file = File::open(path)?;
    load_suppliers(BufReader::new(file), ids)
}

fn numbered_lines<R: BufRead>(reader: R) -> impl Iterator<Item=(usize, io::Result<String>)> {
    reader.lines().enumerate().map(|(index, line)| (index + 1, line))
}

fn next_non_blank<I>(lines: &mut I) -> Result<Option<(usize, String)>>
    where I: Iterator<Item=(usize, io::Result<String>)>,
{
    for (line_number, line) in lines {
        let line = line?;
        if !line.trim().is_empty() {
            return Ok(Some((line_number, line)));
        }
    }

    Ok(None)
}

/// Reads the record count that opens a data file
fn read_count<I>(lines: &mut I) -> Result<Option<(usize, usize)>>
    where I: Iterator<Item=(usize, io::Result<String>)>,
{
    let (line_number, line) = match next_non_blank(lines)? {
        Some(header) => header,
        None => return Ok(None),
    };

    let count = line.trim().parse().map_err(|_| Error::Parse {
        line: line_number,
        reason: format!("invalid record count {:?}", line.trim()),
    })?;
    Ok(Some((line_number, count)))
}
