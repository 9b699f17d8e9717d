use clap::{Args, Subcommand};
use grocer::products::ProductId;
use grocer_app::domain::products::ProductsService;

use super::{Console, table};

#[derive(Debug, Args)]
pub(crate) struct StockCommand {
    #[command(subcommand)]
    command: StockSubcommand,
}

#[derive(Debug, Subcommand)]
enum StockSubcommand {
    /// List products at or below a stock level
    Low {
        #[arg(long, default_value_t = 10)]
        threshold: u32,
    },

    /// Set the stock level of a product
    Set {
        product: ProductId,
        quantity: u32,

        /// Note stored in the inventory log
        #[arg(long)]
        reason: Option<String>,
    },
}

pub(crate) async fn run(console: &Console, command: StockCommand) -> Result<(), String> {
    let products = &console.context.products;

    match command.command {
        StockSubcommand::Low { threshold } => {
            let low = products
                .low_stock_products(threshold)
                .await
                .map_err(|error| format!("failed to load stock levels: {error}"))?;

            if low.is_empty() {
                println!("no products at or below {threshold} units");

                return Ok(());
            }

            let rows = low.into_iter().map(|product| {
                [
                    product.id.to_string(),
                    product.name,
                    product.category,
                    product.stock.to_string(),
                ]
            });

            println!("{}", table::render(["Id", "Name", "Category", "Stock"], rows));
        }
        StockSubcommand::Set {
            product,
            quantity,
            reason,
        } => {
            let entry = products
                .set_stock(product, quantity, reason)
                .await
                .map_err(|error| format!("failed to set stock for product {product}: {error}"))?;

            println!(
                "product {product}: {} -> {} ({})",
                entry.previous_stock, entry.new_stock, entry.action
            );
        }
    }

    Ok(())
}
