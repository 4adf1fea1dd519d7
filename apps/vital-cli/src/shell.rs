//! # Checkout Shell
//!
//! Line-oriented dispatch loop over the cart. One command is read, run to
//! completion, and its result printed before the next prompt.
//!
//! ## Loop
//! ```text
//! ┌──────────┐   parse    ┌──────────────┐   mutate   ┌───────────┐
//! │  input   │──────────► │ ShellCommand │──────────► │ CartStore │
//! └──────────┘            └──────────────┘            └─────┬─────┘
//!      ▲                                                    │ watch
//!      │            ┌─────────────────────────────┐         ▼
//!      └────────────│ output: result, then totals │◄── observer
//!                   └─────────────────────────────┘
//! ```
//!
//! The totals line is printed only when the cart actually changed, so
//! read-only commands stay quiet.

use std::io;
use std::str::FromStr;

use chrono::Local;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::watch;
use tracing::{debug, warn};

use vital_client::ApiClient;
use vital_core::bill::RandomInvoiceNumbers;
use vital_core::totals::compute_totals;
use vital_core::{
    normalize_price, CartLedger, CustomerInfo, Facility, InvoiceNumberSource, NewInventoryItem,
    PaymentInfo, PaymentMethod, ValidationError,
};

use crate::commands::cart::{add_to_cart, clear_cart, get_cart, remove_from_cart, update_cart_item};
use crate::commands::checkout::{prepare_bill, record_sale, CheckoutForm};
use crate::commands::inventory::{create_item, delete_item, facility_stats, Catalog};
use crate::error::UserError;
use crate::render;
use crate::state::{BillingConfig, CartStore};

// =============================================================================
// Commands
// =============================================================================

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Items(Option<String>),
    Add(String),
    Qty(String, i64),
    Remove(String),
    Clear,
    Cart,
    Checkout,
    NewItem,
    DeleteItem(String),
    Stats,
    Help,
    Quit,
}

impl FromStr for ShellCommand {
    type Err = UserError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let verb = words.next().unwrap_or_default().to_ascii_lowercase();
        let args: Vec<&str> = words.collect();

        let command = match (verb.as_str(), args.as_slice()) {
            ("items" | "ls", []) => ShellCommand::Items(None),
            ("items" | "ls", query) => ShellCommand::Items(Some(query.join(" "))),
            ("add", [id]) => ShellCommand::Add(id.to_string()),
            ("qty", [id, quantity]) => {
                let quantity = quantity.parse::<i64>().map_err(|_| {
                    UserError::invalid_command(format!("Not a quantity: '{quantity}'"))
                })?;
                ShellCommand::Qty(id.to_string(), quantity)
            }
            ("rm" | "remove", [id]) => ShellCommand::Remove(id.to_string()),
            ("clear", []) => ShellCommand::Clear,
            ("cart", []) => ShellCommand::Cart,
            ("checkout", []) => ShellCommand::Checkout,
            ("new-item", []) => ShellCommand::NewItem,
            ("delete-item", [id]) => ShellCommand::DeleteItem(id.to_string()),
            ("stats", []) => ShellCommand::Stats,
            ("help" | "?", []) => ShellCommand::Help,
            ("quit" | "exit", []) => ShellCommand::Quit,
            _ => {
                return Err(UserError::invalid_command(format!(
                    "Unknown command '{}'. Type `help` for a list.",
                    line.trim()
                )))
            }
        };
        Ok(command)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Why a step stopped: something to tell the operator, or a broken terminal.
#[derive(Debug)]
enum StepError {
    User(UserError),
    Io(io::Error),
}

impl From<UserError> for StepError {
    fn from(err: UserError) -> Self {
        StepError::User(err)
    }
}

impl From<ValidationError> for StepError {
    fn from(err: ValidationError) -> Self {
        StepError::User(err.into())
    }
}

impl From<io::Error> for StepError {
    fn from(err: io::Error) -> Self {
        StepError::Io(err)
    }
}

type StepResult<T> = Result<T, StepError>;

// =============================================================================
// Shell
// =============================================================================

/// The interactive checkout desk.
///
/// Without a backend (`with_backend` never called) cart and checkout still
/// work from the loaded catalog; commands that need the backend say so.
pub struct Shell<'a, R, W> {
    input: R,
    output: W,
    cart: CartStore,
    observer: watch::Receiver<CartLedger>,
    catalog: Catalog,
    billing: &'a BillingConfig,
    api: Option<&'a ApiClient>,
    facility: Option<Facility>,
    invoices: Box<dyn InvoiceNumberSource>,
}

impl<'a, R, W> Shell<'a, R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(input: R, output: W, catalog: Catalog, billing: &'a BillingConfig) -> Self {
        let cart = CartStore::new();
        let observer = cart.subscribe();
        Shell {
            input,
            output,
            cart,
            observer,
            catalog,
            billing,
            api: None,
            facility: None,
            invoices: Box::new(RandomInvoiceNumbers::new()),
        }
    }

    /// Connects the shell to the backend, selling for `facility`.
    pub fn with_backend(mut self, api: &'a ApiClient, facility: Facility) -> Self {
        self.api = Some(api);
        self.facility = Some(facility);
        self
    }

    pub fn with_invoice_numbers(mut self, numbers: Box<dyn InvoiceNumberSource>) -> Self {
        self.invoices = numbers;
        self
    }

    pub fn cart(&self) -> &CartStore {
        &self.cart
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Runs until `quit` or end of input.
    pub async fn run(&mut self) -> io::Result<()> {
        self.banner().await?;

        loop {
            self.write("> ").await?;
            let Some(line) = self.read_line().await? else {
                break;
            };
            if line.trim().is_empty() {
                continue;
            }

            let flow = match self.step(&line).await {
                Ok(flow) => flow,
                Err(StepError::User(err)) => {
                    debug!(code = ?err.code, message = %err.message, "Command failed");
                    self.write(&format!("error: {err}\n")).await?;
                    Flow::Continue
                }
                Err(StepError::Io(err)) => return Err(err),
            };

            self.observe().await?;
            if flow == Flow::Quit {
                break;
            }
        }

        self.output.flush().await
    }

    async fn step(&mut self, line: &str) -> StepResult<Flow> {
        let command = line.parse::<ShellCommand>()?;
        debug!(?command, "Dispatching");

        match command {
            ShellCommand::Items(query) => {
                let text = {
                    let hits = self.catalog.search(query.as_deref().unwrap_or_default())?;
                    render::items_table(&hits)
                };
                self.write(&text).await?;
            }
            ShellCommand::Add(id) => add_to_cart(&self.cart, &self.catalog, &id)?,
            ShellCommand::Qty(id, quantity) => update_cart_item(&self.cart, &id, quantity)?,
            ShellCommand::Remove(id) => remove_from_cart(&self.cart, &id)?,
            ShellCommand::Clear => clear_cart(&self.cart),
            ShellCommand::Cart => {
                let text = render::cart_table(&get_cart(&self.cart, self.billing));
                self.write(&text).await?;
            }
            ShellCommand::Checkout => self.checkout().await?,
            ShellCommand::NewItem => self.new_item().await?,
            ShellCommand::DeleteItem(id) => self.delete_item(&id).await?,
            ShellCommand::Stats => {
                let (api, facility_id) = self.backend()?;
                let stats = facility_stats(api, &facility_id).await?;
                self.write(&render::stats_block(&stats)).await?;
            }
            ShellCommand::Help => self.write(render::HELP).await?,
            ShellCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    // =========================================================================
    // Multi-step commands
    // =========================================================================

    /// Collects customer and payment details, prints the bill, records the
    /// sale when connected, then empties the cart.
    ///
    /// A failed recording keeps the cart so the sale can be retried.
    async fn checkout(&mut self) -> StepResult<()> {
        if self.cart.with_cart(CartLedger::is_empty) {
            return Err(ValidationError::EmptyCart.into());
        }

        let customer = CustomerInfo {
            name: self.ask("Customer name").await?,
            email: self.ask("Customer email").await?,
            phone: self.ask("Customer phone").await?,
            address: self.ask("Customer address").await?,
        };

        let method = self.ask("Payment method [cash/online]").await?;
        let method = if method.trim().is_empty() {
            PaymentMethod::Cash
        } else {
            method.parse::<PaymentMethod>().map_err(UserError::validation)?
        };
        let payment = match method {
            PaymentMethod::Cash => PaymentInfo::cash(),
            PaymentMethod::Online => PaymentInfo::online(self.ask("Transaction ID").await?),
        };

        let form = CheckoutForm { customer, payment };
        let ledger = self.cart.snapshot();
        let bill = prepare_bill(
            &ledger,
            &form,
            self.billing,
            &Local::now(),
            &mut *self.invoices,
        )?;
        self.write(&format!("\n{bill}\n\n")).await?;

        if let Ok((api, facility_id)) = self.backend() {
            let transaction = record_sale(api, &bill, &facility_id).await?;
            self.write(&format!("Recorded as transaction #{}\n", transaction.id))
                .await?;
        } else {
            warn!(invoice = %bill.invoice_number, "Offline: sale not recorded");
            self.write("Offline: sale not recorded.\n").await?;
        }

        clear_cart(&self.cart);
        Ok(())
    }

    async fn new_item(&mut self) -> StepResult<()> {
        let (api, facility_id) = self.backend()?;

        let name = self.ask("Name").await?;
        let quantity = self.ask("Quantity").await?;
        let quantity = quantity
            .trim()
            .parse::<u32>()
            .map_err(|_| UserError::validation("Quantity must be a whole number"))?;
        let category = self.ask("Category").await?;
        let description = self.ask("Description").await?;
        let price = normalize_price(Some(&Value::String(self.ask("Price").await?)));

        let draft = NewInventoryItem {
            name,
            quantity,
            category,
            description,
            price,
            hospital: facility_id.clone(),
        };
        let created = create_item(api, &facility_id, draft).await?;
        self.write(&format!("Created item #{} {}\n", created.id, created.name))
            .await?;
        self.catalog.insert(created);
        Ok(())
    }

    /// Deletes on the backend, then drops the item from the catalog and cart.
    async fn delete_item(&mut self, id: &str) -> StepResult<()> {
        let (api, _) = self.backend()?;
        delete_item(api, id).await?;

        self.catalog.remove(id);
        self.cart.update(|ledger| ledger.remove(id));
        self.write(&format!("Deleted item #{id}\n")).await?;
        Ok(())
    }

    // =========================================================================
    // Plumbing
    // =========================================================================

    fn backend(&self) -> Result<(&'a ApiClient, String), UserError> {
        match (self.api, &self.facility) {
            (Some(api), Some(facility)) => Ok((api, facility.id.clone())),
            _ => Err(UserError::invalid_command(
                "Not connected to the inventory service",
            )),
        }
    }

    async fn banner(&mut self) -> io::Result<()> {
        let header = match &self.facility {
            Some(facility) => format!(
                "VitalConnect checkout: {} ({} items)\n",
                facility.name,
                self.catalog.len()
            ),
            None => format!("VitalConnect checkout (offline, {} items)\n", self.catalog.len()),
        };
        self.write(&header).await?;
        self.write("Type `help` for commands.\n").await
    }

    /// Prints the totals line if the cart changed since the last look.
    async fn observe(&mut self) -> io::Result<()> {
        if !self.observer.has_changed().unwrap_or(false) {
            return Ok(());
        }
        let totals = {
            let ledger = self.observer.borrow_and_update();
            compute_totals(&ledger, self.billing.tax_rate)
        };
        self.write(&format!("{}\n", render::totals_line(&totals)))
            .await
    }

    /// Prompts for one answer. End of input cancels the command.
    async fn ask(&mut self, label: &str) -> StepResult<String> {
        self.write(&format!("{label}: ")).await?;
        match self.read_line().await? {
            Some(answer) => Ok(answer.trim().to_string()),
            None => Err(UserError::invalid_command("Cancelled").into()),
        }
    }

    async fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line).await? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    async fn write(&mut self, text: &str) -> io::Result<()> {
        self.output.write_all(text.as_bytes()).await?;
        self.output.flush().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::inventory::tests::catalog;
    use crate::testing::{facility, serve};
    use vital_core::bill::SequentialInvoiceNumbers;

    async fn session(script: &str) -> (String, CartLedger) {
        let billing = BillingConfig::default();
        let mut shell = Shell::new(script.as_bytes(), Vec::new(), catalog(), &billing)
            .with_invoice_numbers(Box::new(SequentialInvoiceNumbers::starting_at(7)));
        shell.run().await.unwrap();

        let cart = shell.cart().snapshot();
        let output = String::from_utf8(shell.into_output()).unwrap();
        (output, cart)
    }

    /// Runs `script` against a backend answering with `replies`.
    async fn connected(
        script: &str,
        replies: Vec<(&'static str, &'static str)>,
    ) -> (String, CartLedger, Vec<String>) {
        let (config, server) = serve(replies).await;
        let api = ApiClient::new(&config);
        let billing = BillingConfig::default();

        let mut shell = Shell::new(script.as_bytes(), Vec::new(), catalog(), &billing)
            .with_backend(&api, facility(3, "Mercy Clinic"))
            .with_invoice_numbers(Box::new(SequentialInvoiceNumbers::starting_at(7)));
        shell.run().await.unwrap();

        let cart = shell.cart().snapshot();
        let output = String::from_utf8(shell.into_output()).unwrap();
        (output, cart, server.await.unwrap())
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!("items".parse::<ShellCommand>().unwrap(), ShellCommand::Items(None));
        assert_eq!(
            "items surgical gloves".parse::<ShellCommand>().unwrap(),
            ShellCommand::Items(Some("surgical gloves".into()))
        );
        assert_eq!(
            "QTY 1 -2".parse::<ShellCommand>().unwrap(),
            ShellCommand::Qty("1".into(), -2)
        );
        assert_eq!("exit".parse::<ShellCommand>().unwrap(), ShellCommand::Quit);
        assert!("qty 1 many".parse::<ShellCommand>().is_err());
        assert!("add".parse::<ShellCommand>().is_err());
        assert!("sell 1".parse::<ShellCommand>().is_err());
    }

    #[tokio::test]
    async fn test_cart_and_offline_checkout() {
        let script = "add 1\nadd 1\nadd 2\nqty 1 1\ncheckout\nAda\n\n\n\ncash\nquit\n";
        let (output, cart) = session(script).await;

        assert!(output.contains("VitalConnect checkout (offline, 3 items)"));
        assert!(output.contains("Cart: 1 line(s), 2 unit(s) | Subtotal $21.00"));
        assert!(output.contains("Invoice #0007"));
        assert!(output.contains("  Ada\n"));
        assert!(output.contains("$13.75"));
        assert!(output.contains("Offline: sale not recorded."));
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_errors_do_not_end_the_loop() {
        let (output, cart) = session("add 99\nsell 1\nadd 1\n").await;

        assert!(output.contains("error: Item not found: 99"));
        assert!(output.contains("error: Unknown command 'sell 1'"));
        assert_eq!(cart.size(), 1);
    }

    #[tokio::test]
    async fn test_checkout_rejects_missing_customer() {
        let (output, cart) = session("add 2\ncheckout\n\n\n\n\n\nquit\n").await;

        assert!(output.contains("error: Customer name is required"));
        assert!(!output.contains("Invoice #"));
        assert_eq!(cart.size(), 1);
    }

    #[tokio::test]
    async fn test_checkout_on_empty_cart() {
        let (output, _) = session("checkout\n").await;
        assert!(output.contains("error: Cart is empty"));
    }

    #[tokio::test]
    async fn test_read_only_commands_print_no_totals() {
        let (output, _) = session("items gauze\ncart\nhelp\n").await;

        assert!(output.contains("Gauze Roll"));
        assert!(!output.contains("Surgical Gloves"));
        assert!(output.contains("Cart is empty."));
        assert!(!output.contains("Cart: "));
    }

    #[tokio::test]
    async fn test_backend_commands_need_connection() {
        let (output, _) = session("stats\nnew-item\ndelete-item 1\n").await;
        assert_eq!(
            output.matches("error: Not connected to the inventory service").count(),
            3
        );
    }

    #[tokio::test]
    async fn test_oversize_quantity_keeps_line() {
        let (output, cart) = session("add 1\nqty 1 9999999999\n").await;

        assert!(output.contains("error: Quantity must be at most 4294967295"));
        assert_eq!(cart.get("1").unwrap().selected_quantity, 1);
    }

    #[tokio::test]
    async fn test_recorded_sale_clears_cart() {
        let (output, cart, requests) = connected(
            "add 1\ncheckout\nAda\n\n\n\ncash\nquit\n",
            vec![(
                "201 Created",
                r#"{"id": 41, "hospital": 3, "customer_name": "Ada", "payment_method": "cash", "total_amount": "10.50", "items": []}"#,
            )],
        )
        .await;

        assert!(output.contains("VitalConnect checkout: Mercy Clinic (3 items)"));
        assert!(output.contains("Invoice #0007"));
        assert!(output.contains("Recorded as transaction #41"));
        assert!(cart.is_empty());

        assert!(requests[0].starts_with("POST /api/transactions/ "));
        assert!(requests[0].contains(r#""hospital":"3""#));
        assert!(requests[0].contains(r#""customer_name":"Ada""#));
        assert!(requests[0].contains(r#""total_amount":"10.50""#));
    }

    #[tokio::test]
    async fn test_rejected_sale_keeps_cart() {
        let (output, cart, requests) = connected(
            "add 1\nadd 2\ncheckout\nAda\n\n\n\ncash\nquit\n",
            vec![("400 Bad Request", r#"{"quantity": ["Not enough stock"]}"#)],
        )
        .await;

        assert!(output.contains("Invoice #0007"));
        assert!(output.contains("error: The inventory service rejected the request (400)"));
        assert!(!output.contains("Recorded as transaction"));
        assert_eq!(cart.size(), 2);
        assert_eq!(requests.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_item_drops_catalog_entry_and_cart_line() {
        let (output, cart, requests) = connected(
            "add 1\nadd 2\ndelete-item 1\nitems\nquit\n",
            vec![("204 No Content", "")],
        )
        .await;

        assert!(output.contains("Deleted item #1"));
        assert!(!output.contains("Surgical Gloves"));
        assert!(output.contains("Gauze Roll"));
        assert!(cart.get("1").is_none());
        assert_eq!(cart.size(), 1);
        assert!(requests[0].starts_with("DELETE /api/inventory/1/ "));
    }

    #[tokio::test]
    async fn test_new_item_joins_catalog() {
        let (output, _, requests) = connected(
            "new-item\nSyringe\n20\nSupplies\n10 ml\n0.35\nitems syringe\nquit\n",
            vec![(
                "201 Created",
                r#"{"id": 9, "name": "Syringe", "quantity": 20, "category": "Supplies", "price": "0.35", "hospital": 3}"#,
            )],
        )
        .await;

        assert!(output.contains("Created item #9 Syringe"));
        assert!(output.contains("$0.35"));
        assert!(requests[0].starts_with("POST /api/inventory/ "));
        assert!(requests[0].contains(r#""hospital":"3""#));
        assert!(requests[0].contains(r#""price":"0.35""#));
    }
}
