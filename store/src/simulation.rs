//! Seeded generation of customer orders and supplier catalogs
//!
//! Both simulations draw from a caller-provided `StdRng`, so a fixed seed always produces the same
//! orders and the same supplier assignments.

use assoc::{AvlMap, ChainedList, HashMap};
use chrono::NaiveDate;
use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{debug, info};

use crate::catalog::ProductsById;
use crate::error::{Error, Result};
use crate::order::{Order, Payment};
use crate::product::ProductId;
use crate::sequence::IdSequence;
use crate::supplier::Supplier;

/// Largest number of products drawn for one order
pub const MAX_ITEMS_PER_ORDER: usize = 8;
/// Largest number of products drawn for one supplier
pub const MAX_PRODUCTS_PER_SUPPLIER: usize = 6;

/// Maps each product to the ids of the records that refer to it, in the order they were recorded
pub type ProductIndex = HashMap<ProductId, ChainedList<u32>>;

/// Every order placed, plus the orders each product appears in
#[derive(Debug)]
pub struct OrderBook {
    orders: AvlMap<u32, Order>,
    by_product: ProductIndex,
}

impl OrderBook {
    /// Creates an empty order book whose product index uses `buckets` buckets
    ///
    /// # Errors
    ///
    /// Returns an error if `buckets` is zero.
    pub fn new(buckets: usize) -> Result<Self> {
        Ok(Self {
            orders: AvlMap::new(),
            by_product: HashMap::with_buckets(buckets)?,
        })
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn orders(&self) -> &AvlMap<u32, Order> {
        &self.orders
    }

    pub fn index(&self) -> &ProductIndex {
        &self.by_product
    }

    pub fn get(&self, id: u32) -> Option<&Order> {
        self.orders.get(&id)
    }

    /// Stores an order and indexes it under each distinct product it contains
    ///
    /// # Errors
    ///
    /// Returns [`assoc::Error::DuplicateKey`] if an order with the same id was already recorded.
    pub fn record(&mut self, order: Order) -> Result<()> {
        if self.orders.contains_key(&order.id()) {
            return Err(assoc::Error::DuplicateKey.into());
        }

        for product in order.items() {
            append_to_index(&mut self.by_product, product.id(), order.id())?;
        }
        self.orders.insert(order.id(), order)?;
        Ok(())
    }

    /// Returns the orders containing the given product, oldest first
    pub fn orders_of(&self, product: ProductId) -> Vec<&Order> {
        self.by_product.get(&product)
            .map(|ids| ids.iter().filter_map(|id| self.orders.get(id)).collect())
            .unwrap_or_default()
    }
}

/// Every supplier, plus the suppliers each product was bought from
#[derive(Debug)]
pub struct SupplierBook {
    suppliers: AvlMap<u32, Supplier>,
    by_product: ProductIndex,
}

impl SupplierBook {
    /// Creates an empty supplier book whose product index uses `buckets` buckets
    ///
    /// # Errors
    ///
    /// Returns an error if `buckets` is zero.
    pub fn new(buckets: usize) -> Result<Self> {
        Ok(Self {
            suppliers: AvlMap::new(),
            by_product: HashMap::with_buckets(buckets)?,
        })
    }

    pub fn len(&self) -> usize {
        self.suppliers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suppliers.is_empty()
    }

    pub fn suppliers(&self) -> &AvlMap<u32, Supplier> {
        &self.suppliers
    }

    pub fn index(&self) -> &ProductIndex {
        &self.by_product
    }

    /// Looks up a supplier by document number
    ///
    /// # Errors
    ///
    /// Returns [`assoc::Error::NotFound`] if no supplier has that document number.
    pub fn search(&self, document: u32) -> Result<&Supplier> {
        Ok(self.suppliers.search(&document)?)
    }

    /// Stores a supplier and indexes it under each distinct product it sold
    ///
    /// # Errors
    ///
    /// Returns [`assoc::Error::DuplicateKey`] if a supplier with the same document was already
    /// recorded.
    pub fn record(&mut self, supplier: Supplier) -> Result<()> {
        if self.suppliers.contains_key(&supplier.document()) {
            return Err(assoc::Error::DuplicateKey.into());
        }

        for product in supplier.products() {
            append_to_index(&mut self.by_product, product.id(), supplier.document())?;
        }
        self.suppliers.insert(supplier.document(), supplier)?;
        Ok(())
    }

    /// Returns the suppliers of the given product, in the order they were recorded
    pub fn suppliers_of(&self, product: ProductId) -> Vec<&Supplier> {
        self.by_product.get(&product)
            .map(|ids| ids.iter().filter_map(|id| self.suppliers.get(id)).collect())
            .unwrap_or_default()
    }
}

/// Appends `owner` to the list of `product`, creating the list on first use
///
/// Consecutive records from the same owner are stored once.
fn append_to_index(index: &mut ProductIndex, product: ProductId, owner: u32) -> Result<()> {
    match index.get_mut(&product) {
        Some(owners) => {
            if owners.last() != Some(&owner) {
                owners.push_back(owner);
            }
        },

        None => {
            index.insert(product, assoc::chained_list![owner])?;
        },
    }

    Ok(())
}

/// Generates `count` random orders dated `date` and records them in `book`
///
/// Each order is paid in cash or in installments with equal chance and holds between one and
/// [`MAX_ITEMS_PER_ORDER`] products drawn uniformly (with repetition) from `catalog`.
///
/// # Errors
///
/// Returns [`Error::EmptyCatalog`] if `catalog` has no products. Nothing is generated in that case.
pub fn simulate_orders(
    catalog: &ProductsById,
    count: usize,
    date: NaiveDate,
    ids: &mut IdSequence,
    rng: &mut StdRng,
    book: &mut OrderBook,
) -> Result<()> {
    let product_ids: Vec<ProductId> = catalog.keys().copied().collect();
    if product_ids.is_empty() {
        return Err(Error::EmptyCatalog);
    }

    let mut items = 0;
    for _ in 0..count {
        let payment = if rng.gen_range(1..=2) == 1 { Payment::Cash } else { Payment::Installments };
        let mut order = Order::new(ids.next_id(), date, payment);

        for _ in 0..rng.gen_range(1..=MAX_ITEMS_PER_ORDER) {
            let product = product_ids.choose(rng)
                .and_then(|id| catalog.get(id))
                .ok_or(Error::EmptyCatalog)?;
            order.add_product(product.clone());
        }

        items += order.len();
        debug!(order = order.id(), items = order.len(), "generated order");
        book.record(order)?;
    }

    info!(orders = count, items, "simulated orders");
    Ok(())
}

/// Gives each supplier between one and [`MAX_PRODUCTS_PER_SUPPLIER`] random products from
/// `catalog` and records them in `book`
///
/// # Errors
///
/// Returns [`Error::EmptyCatalog`] if `catalog` has no products.
pub fn assign_suppliers(
    catalog: &ProductsById,
    suppliers: Vec<Supplier>,
    rng: &mut StdRng,
    book: &mut SupplierBook,
) -> Result<()> {
    let product_ids: Vec<ProductId> = catalog.keys().copied().collect();
    if product_ids.is_empty() {
        return Err(Error::EmptyCatalog);
    }

    let count = suppliers.len();
    for mut supplier in suppliers {
        for _ in 0..rng.gen_range(1..=MAX_PRODUCTS_PER_SUPPLIER) {
            let product = product_ids.choose(rng)
                .and_then(|id| catalog.get(id))
                .ok_or(Error::EmptyCatalog)?;
            supplier.add_product(product.clone());
        }

        book.record(supplier)?;
    }

    info!(suppliers = count, "assigned products to suppliers");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::SeedableRng;

    use crate::catalog::load_products;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn catalog() -> ProductsById {
        let input = "5\n1;Rice;20;0.5\n1;Beans;8;0.4\n1;Coffee;12;0.3\n1;Sugar;4;0.2\n1;Flour;6;0.25\n";
        let mut ids = IdSequence::products();
        load_products(input.as_bytes(), &mut ids, date(2024, 3, 1)).unwrap()
    }

    fn simulate(seed: u64, count: usize) -> OrderBook {
        let catalog = catalog();
        let mut book = OrderBook::new(7).unwrap();
        let mut ids = IdSequence::orders();
        let mut rng = StdRng::seed_from_u64(seed);
        simulate_orders(&catalog, count, date(2024, 3, 2), &mut ids, &mut rng, &mut book).unwrap();
        book
    }

    fn order_lines(book: &OrderBook) -> Vec<(u32, Payment, Vec<ProductId>)> {
        book.orders().values()
            .map(|order| (order.id(), order.payment(), order.items().iter().map(|p| p.id()).collect()))
            .collect()
    }

    #[test]
    fn orders_are_deterministic_for_a_seed() {
        let a = simulate(42, 50);
        let b = simulate(42, 50);
        assert_eq!(order_lines(&a), order_lines(&b));
    }

    #[test]
    fn order_shape() {
        let book = simulate(7, 200);
        assert_eq!(book.len(), 200);

        let ids: Vec<_> = book.orders().keys().copied().collect();
        assert_eq!(ids, (1..=200).collect::<Vec<u32>>());

        for order in book.orders().values() {
            assert!(!order.is_empty());
            assert!(order.len() <= MAX_ITEMS_PER_ORDER);
            assert_eq!(order.date(), date(2024, 3, 2));
        }

        // Both payment methods show up over 200 draws
        assert!(book.orders().values().any(|order| order.payment() == Payment::Cash));
        assert!(book.orders().values().any(|order| order.payment() == Payment::Installments));
    }

    #[test]
    fn index_lists_each_order_once_per_product() {
        let book = simulate(3, 300);

        for id in 10_000..10_005 {
            let product = ProductId(id);
            let orders = book.orders_of(product);
            let expected: Vec<u32> = book.orders().values()
                .filter(|order| order.items().iter().any(|item| item.id() == product))
                .map(Order::id)
                .collect();
            let found: Vec<u32> = orders.iter().map(|order| order.id()).collect();
            assert_eq!(found, expected);
        }

        assert!(book.orders_of(ProductId(99)).is_empty());
    }

    #[test]
    fn empty_catalog_generates_nothing() {
        let mut book = OrderBook::new(3).unwrap();
        let mut ids = IdSequence::orders();
        let mut rng = StdRng::seed_from_u64(1);
        let result = simulate_orders(&ProductsById::new(), 10, date(2024, 3, 2), &mut ids, &mut rng, &mut book);
        assert!(matches!(result, Err(Error::EmptyCatalog)));
        assert!(book.is_empty());
        assert_eq!(ids.peek(), 1);
    }

    #[test]
    fn duplicate_orders_are_rejected() {
        let mut book = OrderBook::new(3).unwrap();
        book.record(Order::new(1, date(2024, 3, 2), Payment::Cash)).unwrap();
        let result = book.record(Order::new(1, date(2024, 3, 2), Payment::Cash));
        assert!(matches!(result, Err(Error::Container(assoc::Error::DuplicateKey))));
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn zero_buckets_is_a_configuration_error() {
        assert!(matches!(OrderBook::new(0), Err(Error::Container(assoc::Error::InvalidConfiguration(_)))));
        assert!(matches!(SupplierBook::new(0), Err(Error::Container(assoc::Error::InvalidConfiguration(_)))));
    }

    #[test]
    fn suppliers_are_indexed_by_product() {
        let catalog = catalog();
        let suppliers = vec![
            Supplier::new(10_001, "Acme Foods").unwrap(),
            Supplier::new(10_002, "Green Valley").unwrap(),
            Supplier::new(10_003, "North Star").unwrap(),
        ];
        let mut book = SupplierBook::new(4).unwrap();
        let mut rng = StdRng::seed_from_u64(123);
        assign_suppliers(&catalog, suppliers, &mut rng, &mut book).unwrap();

        assert_eq!(book.len(), 3);
        for supplier in book.suppliers().values() {
            assert!(!supplier.products().is_empty());
            assert!(supplier.products().len() <= MAX_PRODUCTS_PER_SUPPLIER);

            for product in supplier.products() {
                let documents: Vec<u32> = book.suppliers_of(product.id()).iter().map(|s| s.document()).collect();
                assert!(documents.contains(&supplier.document()));
            }
        }

        assert_eq!(book.search(10_002).unwrap().name(), "Green Valley");
        assert!(matches!(book.search(1), Err(Error::Container(assoc::Error::NotFound))));
    }
}
