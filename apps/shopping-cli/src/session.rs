//! # Cart Session
//!
//! Executes cart actions against one `CartStore` and renders the results.
//! The same `Action` comes from a clap subcommand or from a script line.
//!
//! ## Script Format
//! ```text
//! # comments and blank lines are skipped
//! increase 42
//! set 7 3
//! decrease 42
//! delete 7
//! show 2          # page number, 1-based
//! show            # the current page
//! summary
//! products 1
//! ```
//!
//! Page numbers are 1-based here; the store itself is 0-based. A session
//! remembers the last page shown, and steps back a page when a removal
//! empties the last one.

use std::cell::Cell;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use serde::Serialize;
use shopping_core::{
    CartError, CartItem, CartStore, CartSummary, InMemoryCatalog, PageInfo, ProductCatalog,
    ProductId, Quantity, ValidationError, CATALOG_PAGE_SIZE,
};
use tracing::{debug, info};

use crate::error::{CliError, CliResult};

// =============================================================================
// Actions
// =============================================================================

/// One thing the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Increase(ProductId),
    Decrease(ProductId),
    Set(ProductId, Quantity),
    Delete(ProductId),
    /// `page: None` shows the session's current page.
    Show { page: Option<usize>, json: bool },
    Summary { json: bool },
    Products { page: usize },
}

impl Action {
    /// True when rendering the action needs product titles or prices.
    pub fn needs_catalog(&self) -> bool {
        matches!(
            self,
            Action::Show { .. } | Action::Summary { .. } | Action::Products { .. }
        )
    }

    /// Parses one script line. Blank lines and comments give `None`.
    pub fn parse_line(line: &str) -> Result<Option<Action>, String> {
        let line = line.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            return Ok(None);
        }

        let mut words = line.split_whitespace();
        let command = words.next().unwrap_or_default().to_lowercase();
        let args: Vec<&str> = words.collect();

        let product = |i: usize| -> Result<ProductId, String> {
            let raw = args.get(i).ok_or("missing product id")?;
            raw.parse::<i64>()
                .map(ProductId::new)
                .map_err(|_| format!("invalid product id '{raw}'"))
        };
        let page = |i: usize| -> Result<usize, String> {
            match args.get(i) {
                Some(raw) => raw.parse().map_err(|_| format!("invalid page '{raw}'")),
                None => Ok(1),
            }
        };
        let expect_args = |n: usize| -> Result<(), String> {
            if args.len() > n {
                Err(format!("'{command}' takes at most {n} argument(s)"))
            } else {
                Ok(())
            }
        };

        let action = match command.as_str() {
            "increase" | "inc" | "+" => {
                expect_args(1)?;
                Action::Increase(product(0)?)
            }
            "decrease" | "dec" | "-" => {
                expect_args(1)?;
                Action::Decrease(product(0)?)
            }
            "set" => {
                expect_args(2)?;
                let raw = args.get(1).ok_or("missing quantity")?;
                let count: u32 = raw
                    .parse()
                    .map_err(|_| format!("invalid quantity '{raw}'"))?;
                let quantity = Quantity::new(count).map_err(|e| e.to_string())?;
                Action::Set(product(0)?, quantity)
            }
            "delete" | "rm" => {
                expect_args(1)?;
                Action::Delete(product(0)?)
            }
            "show" => {
                expect_args(1)?;
                let page = match args.first() {
                    Some(_) => Some(page(0)?),
                    None => None,
                };
                Action::Show { page, json: false }
            }
            "summary" => {
                expect_args(0)?;
                Action::Summary { json: false }
            }
            "products" => {
                expect_args(1)?;
                Action::Products { page: page(0)? }
            }
            other => return Err(format!("unknown command '{other}'")),
        };

        Ok(Some(action))
    }
}

/// Converts a 1-based page number to the store's 0-based index.
fn page_index(page: usize) -> CliResult<usize> {
    page.checked_sub(1).ok_or_else(|| {
        CartError::InvalidArgument(ValidationError::OutOfRange {
            field: "page".into(),
            min: 1,
            max: i64::MAX,
        })
        .into()
    })
}

// =============================================================================
// Views
// =============================================================================

/// JSON shape of `show --json`.
#[derive(Debug, Serialize)]
struct CartPageView {
    page: usize,
    page_count: usize,
    page_size: usize,
    total_count: usize,
    total_quantity: u64,
    items: Vec<CartItem>,
}

// =============================================================================
// Session
// =============================================================================

/// A cart store plus what is needed to present it.
pub struct Session {
    store: Box<dyn CartStore>,
    catalog: InMemoryCatalog,
    page_size: usize,
    /// 0-based page a bare `show` displays.
    current_page: Cell<usize>,
}

impl Session {
    pub fn new(store: Box<dyn CartStore>, catalog: InMemoryCatalog, page_size: usize) -> Self {
        Session {
            store,
            catalog,
            page_size,
            current_page: Cell::new(0),
        }
    }

    /// Runs one action and writes its output.
    pub fn execute(&self, action: &Action, out: &mut dyn Write) -> CliResult<()> {
        debug!(?action, "Executing");

        match *action {
            Action::Increase(product_id) => {
                self.mutate(product_id, out, |s| s.increase_quantity(product_id))
            }
            Action::Decrease(product_id) => {
                self.mutate(product_id, out, |s| s.decrease_quantity(product_id))
            }
            Action::Set(product_id, quantity) => {
                self.mutate(product_id, out, |s| s.set_quantity(product_id, quantity))
            }
            Action::Delete(product_id) => {
                self.mutate(product_id, out, |s| s.delete_cart_item(product_id))
            }
            Action::Show { page, json } => self.show(page, json, out),
            Action::Summary { json } => self.summary(json, out),
            Action::Products { page } => self.products(page, out),
        }
    }

    /// Runs every line of a script file, stopping at the first error.
    ///
    /// Returns the number of actions executed.
    pub fn run_script(&self, path: &Path, out: &mut dyn Write) -> CliResult<usize> {
        let file = std::fs::File::open(path)?;
        let mut executed = 0;

        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            let action = Action::parse_line(&line).map_err(|message| CliError::Script {
                path: path.to_path_buf(),
                line: index + 1,
                message,
            })?;

            if let Some(action) = action {
                self.execute(&action, out)?;
                executed += 1;
            }
        }

        info!(executed, ?path, "Script finished");
        Ok(executed)
    }

    fn title(&self, product_id: ProductId) -> String {
        self.catalog
            .find_product(product_id)
            .map(|p| p.title)
            .unwrap_or_else(|_| format!("product {product_id}"))
    }

    /// Applies a mutation, keeps the current page in range, and reports the
    /// product's line.
    fn mutate<F>(&self, product_id: ProductId, out: &mut dyn Write, f: F) -> CliResult<()>
    where
        F: FnOnce(&dyn CartStore) -> Result<(), CartError>,
    {
        let before = self.store.total_count()?;
        f(self.store.as_ref())?;

        if self.store.total_count()? < before {
            let info = PageInfo::new(self.current_page.get(), self.page_size, before)?;
            let next = info.after_removal();
            if next.page != info.page {
                debug!(page = next.page + 1, "Last page emptied, stepping back");
            }
            self.current_page.set(next.page);
        }

        self.report_line(product_id, out)
    }

    fn report_line(&self, product_id: ProductId, out: &mut dyn Write) -> CliResult<()> {
        match self.store.find_or_none(product_id)? {
            Some(item) => writeln!(out, "product {}: quantity {}", product_id, item.quantity)?,
            None => writeln!(out, "product {}: removed", product_id)?,
        }
        Ok(())
    }

    fn show(&self, page: Option<usize>, json: bool, out: &mut dyn Write) -> CliResult<()> {
        let index = match page {
            Some(page) => page_index(page)?,
            None => self.current_page.get(),
        };
        self.current_page.set(index);
        let page = index + 1;

        let items = self.store.find_range(index, self.page_size)?;
        let info = PageInfo::new(index, self.page_size, self.store.total_count()?)?;
        let total_quantity = self.store.total_quantity()?;

        if json {
            let view = CartPageView {
                page,
                page_count: info.page_count(),
                page_size: info.page_size,
                total_count: info.total,
                total_quantity,
                items,
            };
            writeln!(out, "{}", serde_json::to_string_pretty(&view)?)?;
            return Ok(());
        }

        if info.total == 0 {
            writeln!(out, "Cart is empty")?;
            return Ok(());
        }

        if info.is_paged() {
            writeln!(
                out,
                "Cart page {} of {} ({} lines, {} items)",
                page,
                info.page_count(),
                info.total,
                total_quantity
            )?;
        } else {
            writeln!(out, "Cart ({} lines, {} items)", info.total, total_quantity)?;
        }
        for item in &items {
            writeln!(
                out,
                "  [{}] {} x{}",
                item.id,
                self.title(item.product_id),
                item.quantity
            )?;
        }
        if info.has_previous() {
            writeln!(out, "  ... previous: page {}", page - 1)?;
        }
        if info.has_next() {
            writeln!(out, "  ... more on page {}", page + 1)?;
        }
        Ok(())
    }

    fn summary(&self, json: bool, out: &mut dyn Write) -> CliResult<()> {
        let summary = CartSummary::compute(self.store.as_ref(), &self.catalog)?;

        if json {
            writeln!(out, "{}", serde_json::to_string_pretty(&summary)?)?;
            return Ok(());
        }

        for line in &summary.lines {
            writeln!(
                out,
                "  {:<32} {:>4} x {:>8} = {:>9}",
                line.product.title,
                line.item.quantity.to_string(),
                line.product.price.to_string(),
                line.line_total.to_string()
            )?;
        }
        writeln!(
            out,
            "{} lines, {} items, subtotal {}",
            summary.item_count, summary.total_quantity, summary.subtotal
        )?;
        Ok(())
    }

    fn products(&self, page: usize, out: &mut dyn Write) -> CliResult<()> {
        let index = page_index(page)?;
        let products = self.catalog.find_range(index, CATALOG_PAGE_SIZE)?;
        let info = PageInfo::new(index, CATALOG_PAGE_SIZE, self.catalog.len())?;

        if info.total == 0 {
            writeln!(out, "Catalog is empty (run `seed`, passing the same --db if you use one)")?;
            return Ok(());
        }

        writeln!(out, "Products page {} of {}", page, info.page_count())?;
        for product in &products {
            writeln!(
                out,
                "  {:>6}  {:<32} {:>9}",
                product.id.to_string(),
                product.title,
                product.price.to_string()
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopping_core::{InMemoryCartStore, Money, Product};

    fn catalog() -> InMemoryCatalog {
        (1..=30)
            .map(|i| {
                Product::new(
                    ProductId::new(i),
                    format!("Item {i}"),
                    "",
                    Money::from_minor(100 * i),
                )
            })
            .collect()
    }

    fn session() -> Session {
        Session::new(Box::new(InMemoryCartStore::new()), catalog(), 5)
    }

    fn run(session: &Session, action: Action) -> String {
        let mut out = Vec::new();
        session.execute(&action, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_parse_line() {
        assert_eq!(
            Action::parse_line("increase 4").unwrap(),
            Some(Action::Increase(ProductId::new(4)))
        );
        assert_eq!(
            Action::parse_line("  set 2 3  # three of them").unwrap(),
            Some(Action::Set(ProductId::new(2), Quantity::new(3).unwrap()))
        );
        assert_eq!(
            Action::parse_line("show").unwrap(),
            Some(Action::Show {
                page: None,
                json: false
            })
        );
        assert_eq!(Action::parse_line("# nothing").unwrap(), None);
        assert_eq!(Action::parse_line("   ").unwrap(), None);
    }

    #[test]
    fn test_parse_line_errors() {
        assert!(Action::parse_line("add 1").unwrap_err().contains("unknown command"));
        assert!(Action::parse_line("increase").unwrap_err().contains("missing"));
        assert!(Action::parse_line("increase x").unwrap_err().contains("invalid"));
        assert!(Action::parse_line("set 1 0").unwrap_err().contains("positive"));
        assert!(Action::parse_line("delete 1 2").unwrap_err().contains("at most"));
    }

    #[test]
    fn test_mutations_report_line() {
        let session = session();
        assert_eq!(
            run(&session, Action::Increase(ProductId::new(1))),
            "product 1: quantity 1\n"
        );
        assert_eq!(
            run(&session, Action::Decrease(ProductId::new(1))),
            "product 1: removed\n"
        );
    }

    #[test]
    fn test_decrease_absent_is_error() {
        let session = session();
        let mut out = Vec::new();
        let err = session
            .execute(&Action::Decrease(ProductId::new(9)), &mut out)
            .unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_show_pages() {
        let session = session();
        for id in 1..=7 {
            run(&session, Action::Increase(ProductId::new(id)));
        }

        let first = run(&session, Action::Show { page: Some(1), json: false });
        assert!(first.starts_with("Cart page 1 of 2 (7 lines, 7 items)"));
        assert!(first.contains("Item 5"));
        assert!(!first.contains("Item 6"));
        assert!(first.contains("more on page 2"));

        let second = run(&session, Action::Show { page: Some(2), json: false });
        assert!(second.contains("previous: page 1"));
        assert!(!second.contains("more on page"));
        assert!(second.contains("Item 6"));
        assert!(second.contains("Item 7"));
    }

    #[test]
    fn test_show_json() {
        let session = session();
        run(&session, Action::Set(ProductId::new(3), Quantity::new(2).unwrap()));

        let output = run(&session, Action::Show { page: Some(1), json: true });
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["total_count"], 1);
        assert_eq!(json["total_quantity"], 2);
        assert_eq!(json["items"][0]["product_id"], 3);
    }

    #[test]
    fn test_page_zero_rejected() {
        let session = session();
        let mut out = Vec::new();
        let err = session
            .execute(&Action::Show { page: Some(0), json: false }, &mut out)
            .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_summary() {
        let session = session();
        run(&session, Action::Set(ProductId::new(2), Quantity::new(3).unwrap()));
        run(&session, Action::Increase(ProductId::new(10)));

        let output = run(&session, Action::Summary { json: false });
        assert!(output.contains("2 lines, 4 items, subtotal 16.00"));
    }

    #[test]
    fn test_products_page() {
        let session = session();
        let output = run(&session, Action::Products { page: 2 });
        assert!(output.starts_with("Products page 2 of 2"));
        assert!(output.contains("Item 21"));
        assert!(!output.contains("Item 20 "));
    }

    #[test]
    fn test_run_script() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.txt");
        std::fs::write(
            &path,
            "# build a cart\nincrease 1\nincrease 1\nincrease 2\ndecrease 1\ndecrease 1\nshow\n",
        )
        .unwrap();

        let session = session();
        let mut out = Vec::new();
        assert_eq!(session.run_script(&path, &mut out).unwrap(), 6);

        let output = String::from_utf8(out).unwrap();
        assert!(output.ends_with("Cart (1 lines, 1 items)\n  [2] Item 2 x1\n"));
    }

    #[test]
    fn test_script_error_has_line_number() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.txt");
        std::fs::write(&path, "increase 1\n\nfrobnicate 2\n").unwrap();

        let mut out = Vec::new();
        let err = session().run_script(&path, &mut out).unwrap_err();
        assert!(matches!(err, CliError::Script { line: 3, .. }));
    }

    #[test]
    fn test_removal_steps_back_from_emptied_last_page() {
        let session = session();
        for id in 1..=6 {
            run(&session, Action::Increase(ProductId::new(id)));
        }

        let last = run(&session, Action::Show { page: Some(2), json: false });
        assert!(last.contains("Item 6"));

        // Page 2 still holds a line after a decrease that keeps it.
        run(&session, Action::Increase(ProductId::new(6)));
        run(&session, Action::Decrease(ProductId::new(6)));
        let still_last = run(&session, Action::Show { page: None, json: false });
        assert!(still_last.starts_with("Cart page 2 of 2"));

        run(&session, Action::Delete(ProductId::new(6)));
        let current = run(&session, Action::Show { page: None, json: false });
        assert!(current.starts_with("Cart (5 lines, 5 items)"));
        assert!(current.contains("Item 1"));
        assert!(!current.contains("previous"));
    }

    #[test]
    fn test_removal_before_current_page_keeps_it() {
        let session = session();
        for id in 1..=12 {
            run(&session, Action::Increase(ProductId::new(id)));
        }
        run(&session, Action::Show { page: Some(2), json: false });

        run(&session, Action::Delete(ProductId::new(1)));
        let current = run(&session, Action::Show { page: None, json: false });
        assert!(current.starts_with("Cart page 2 of 3 (11 lines, 11 items)"));
    }
}
