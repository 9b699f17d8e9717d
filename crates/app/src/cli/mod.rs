use clap::{Parser, Subcommand};
use grocer::money;
use grocer_app::context::AppContext;
use rusty_money::iso::Currency;

mod customers;
mod orders;
mod products;
mod sales;
mod stock;
mod table;

#[derive(Debug, Parser)]
#[command(name = "grocer-admin", about = "Grocer store administration", long_about = None)]
pub(crate) struct Cli {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true, global = true)]
    database_url: Option<String>,

    /// ISO currency code used to read and print amounts
    #[arg(long, env = "CURRENCY", default_value = "USD", global = true)]
    currency: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Sales for today and the last seven days
    Sales,
    Stock(stock::StockCommand),
    Orders(orders::OrdersCommand),
    Customers(customers::CustomersCommand),
    Products(products::ProductsCommand),
}

/// What every subcommand needs.
pub(crate) struct Console {
    pub(crate) context: AppContext,
    pub(crate) currency: &'static Currency,
}

impl Console {
    pub(crate) fn money(&self, amount: u64) -> String {
        money::format_minor(amount, self.currency)
    }
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        let database_url = self
            .database_url
            .ok_or_else(|| "DATABASE_URL is not set".to_string())?;

        let currency = money::currency(&self.currency).map_err(|error| error.to_string())?;

        let context = AppContext::from_database_url(&database_url)
            .await
            .map_err(|error| format!("failed to connect to database: {error}"))?;

        let console = Console { context, currency };

        match self.command {
            Commands::Sales => sales::run(&console).await,
            Commands::Stock(command) => stock::run(&console, command).await,
            Commands::Orders(command) => orders::run(&console, command).await,
            Commands::Customers(command) => customers::run(&console, command).await,
            Commands::Products(command) => products::run(&console, command).await,
        }
    }
}
