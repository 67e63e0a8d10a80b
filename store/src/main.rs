use std::io::{self, BufRead, Write};
use std::process;
use std::str::FromStr;

use chrono::{Local, NaiveDate};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use store::catalog::{self, ProductsById, ProductsByName};
use store::report;
use store::simulation::{self, OrderBook, SupplierBook};
use store::{Error, IdSequence, Product, ProductId, StoreConfig};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    if let Err(err) = run() {
        error!(%err, "store exited with an error");
        process::exit(1);
    }
}

fn run() -> store::Result<()> {
    let config = StoreConfig::from_env()?;
    let app = App::load(config, Local::now().date_naive())?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    app.run_menu(&mut stdin.lock(), &mut stdout.lock())
}

struct App {
    config: StoreConfig,
    today: NaiveDate,
    by_id: ProductsById,
    by_name: ProductsByName,
    orders: OrderBook,
    suppliers: SupplierBook,
}

impl App {
    fn load(config: StoreConfig, today: NaiveDate) -> store::Result<Self> {
        let mut product_ids = IdSequence::products();
        let by_id = catalog::load_products_file(&config.products_file, &mut product_ids, today)?;
        if by_id.is_empty() {
            return Err(Error::EmptyCatalog);
        }
        let by_name = catalog::index_by_name(&by_id);

        let mut rng = StdRng::seed_from_u64(config.seed);

        let mut orders = OrderBook::new(config.order_buckets(by_id.len()))?;
        let mut order_ids = IdSequence::orders();
        simulation::simulate_orders(&by_id, config.orders, today, &mut order_ids, &mut rng, &mut orders)?;

        let mut supplier_ids = IdSequence::suppliers();
        let loaded = match catalog::load_suppliers_file(&config.suppliers_file, &mut supplier_ids) {
            Ok(loaded) => loaded,
            Err(Error::Io(err)) if err.kind() == io::ErrorKind::NotFound => {
                warn!(path = %config.suppliers_file.display(), "supplier file not found, continuing without suppliers");
                Vec::new()
            },
            Err(err) => return Err(err),
        };
        let mut suppliers = SupplierBook::new(config.supplier_buckets(by_id.len()))?;
        simulation::assign_suppliers(&by_id, loaded, &mut rng, &mut suppliers)?;

        info!(products = by_id.len(), orders = orders.len(), suppliers = suppliers.len(), "store ready");

        Ok(Self {config, today, by_id, by_name, orders, suppliers})
    }

    fn run_menu<R: BufRead, W: Write>(&self, input: &mut R, out: &mut W) -> store::Result<()> {
        loop {
            write_menu(out)?;
            let option: u8 = match read_value(input, out, "Enter an option: ")? {
                Some(option) => option,
                None => return Ok(()),
            };

            match option {
                1 => self.show_product_by_id(input, out)?,
                2 => self.show_product_by_name(input, out)?,
                3 => self.list_products(out)?,
                4 => self.orders_report(input, out)?,
                5 => self.show_supplier(input, out)?,
                6 => self.suppliers_report(input, out)?,
                7 => self.save_catalog(out)?,
                0 => {
                    writeln!(out, "Goodbye.")?;
                    return Ok(());
                },
                _ => writeln!(out, "Invalid option!")?,
            }
            writeln!(out)?;
        }
    }

    fn show_product_by_id<R: BufRead, W: Write>(&self, input: &mut R, out: &mut W) -> store::Result<()> {
        if let Some(product) = self.select_product(input, out)? {
            writeln!(out, "Product details:\n{}", product.priced(self.today))?;
        }
        Ok(())
    }

    fn show_product_by_name<R: BufRead, W: Write>(&self, input: &mut R, out: &mut W) -> store::Result<()> {
        write!(out, "Enter the product name: ")?;
        out.flush()?;
        let name = match read_line(input)? {
            Some(name) => name,
            None => return Ok(()),
        };

        match catalog::find_by_name(&self.by_name, &name) {
            Some(product) => writeln!(out, "Product details:\n{}", product.priced(self.today))?,
            None => writeln!(out, "Product not found.")?,
        }
        Ok(())
    }

    fn list_products<W: Write>(&self, out: &mut W) -> store::Result<()> {
        writeln!(out, "PRODUCTS BY NAME")?;
        for product in self.by_name.values() {
            writeln!(out, "{}", product.priced(self.today))?;
        }
        Ok(())
    }

    fn orders_report<R: BufRead, W: Write>(&self, input: &mut R, out: &mut W) -> store::Result<()> {
        let product = match self.select_product(input, out)? {
            Some(product) => product,
            None => return Ok(()),
        };

        let orders = self.orders.orders_of(product.id());
        if orders.is_empty() {
            writeln!(out, "This product has no orders.")?;
            return Ok(());
        }

        let written = report::write_report_file(&self.config.report_dir, &report::orders_report_name(product), |file| {
            report::write_orders_report(file, product, &orders, self.today)
        });
        report_outcome(out, written)
    }

    fn show_supplier<R: BufRead, W: Write>(&self, input: &mut R, out: &mut W) -> store::Result<()> {
        let document: u32 = match read_value(input, out, "Enter the supplier document: ")? {
            Some(document) => document,
            None => return Ok(()),
        };

        match self.suppliers.search(document) {
            Ok(supplier) => write!(out, "{}", supplier.report(self.today))?,
            Err(_) => writeln!(out, "No supplier has document {}.", document)?,
        }
        Ok(())
    }

    fn suppliers_report<R: BufRead, W: Write>(&self, input: &mut R, out: &mut W) -> store::Result<()> {
        let product = match self.select_product(input, out)? {
            Some(product) => product,
            None => return Ok(()),
        };

        let suppliers = self.suppliers.suppliers_of(product.id());
        if suppliers.is_empty() {
            writeln!(out, "No supplier sells this product.")?;
            return Ok(());
        }

        let written = report::write_report_file(&self.config.report_dir, &report::suppliers_report_name(product), |file| {
            report::write_suppliers_report(file, product, &suppliers, self.today)
        });
        report_outcome(out, written)
    }

    fn save_catalog<W: Write>(&self, out: &mut W) -> store::Result<()> {
        let path = self.config.report_dir.join("products_saved.txt");
        match catalog::save_products_file(&self.by_id, &path) {
            Ok(()) => writeln!(out, "Catalog saved to {}", path.display())?,
            Err(err) => {
                error!(%err, path = %path.display(), "could not save the catalog");
                writeln!(out, "Could not save the catalog: {}", err)?;
            },
        }
        Ok(())
    }

    /// Asks for a product id until one is entered, then looks it up
    fn select_product<R: BufRead, W: Write>(&self, input: &mut R, out: &mut W) -> store::Result<Option<&Product>> {
        let id: u32 = match read_value(input, out, "Enter the product id: ")? {
            Some(id) => id,
            None => return Ok(None),
        };

        let product = self.by_id.get(&ProductId(id));
        if product.is_none() {
            writeln!(out, "Product not found.")?;
        }
        Ok(product)
    }
}

fn write_menu<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "STORE")?;
    writeln!(out, "=====")?;
    writeln!(out, "1 - Show a product by id")?;
    writeln!(out, "2 - Show a product by name")?;
    writeln!(out, "3 - List all products by name")?;
    writeln!(out, "4 - Write the orders report for a product")?;
    writeln!(out, "5 - Show a supplier")?;
    writeln!(out, "6 - Write the suppliers report for a product")?;
    writeln!(out, "7 - Save the catalog")?;
    writeln!(out, "0 - Exit")
}

fn report_outcome<W: Write>(out: &mut W, written: store::Result<std::path::PathBuf>) -> store::Result<()> {
    match written {
        Ok(path) => writeln!(out, "Report written to {}", path.display())?,
        Err(err) => {
            error!(%err, "could not write the report");
            writeln!(out, "Could not write the report: {}", err)?;
        },
    }
    Ok(())
}

/// Reads one line without its line ending, or `None` at the end of input
fn read_line<R: BufRead>(input: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Prompts until a line parses as `T`, or returns `None` at the end of input
fn read_value<R, W, T>(input: &mut R, out: &mut W, prompt: &str) -> io::Result<Option<T>>
    where R: BufRead,
          W: Write,
          T: FromStr,
{
    loop {
        write!(out, "{}", prompt)?;
        out.flush()?;

        let line = match read_line(input)? {
            Some(line) => line,
            None => return Ok(None),
        };
        match line.parse() {
            Ok(value) => return Ok(Some(value)),
            Err(_) => writeln!(out, "Invalid input {:?}, please try again.", line)?,
        }
    }
}
