use clap::{Args, Subcommand};
use grocer_app::domain::customers::CustomersService;
use jiff::{Timestamp, ToSpan};

use super::{Console, table};

const ACTIVE_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Args)]
pub(crate) struct CustomersCommand {
    #[command(subcommand)]
    command: CustomersSubcommand,
}

#[derive(Debug, Subcommand)]
enum CustomersSubcommand {
    /// Customer counts and top spenders
    Stats,
}

pub(crate) async fn run(console: &Console, command: CustomersCommand) -> Result<(), String> {
    match command.command {
        CustomersSubcommand::Stats => stats(console).await,
    }
}

async fn stats(console: &Console) -> Result<(), String> {
    let active_since = Timestamp::now()
        .checked_sub((ACTIVE_WINDOW_DAYS * 24).hours())
        .map_err(|error| format!("failed to compute activity window: {error}"))?;

    let stats = console
        .context
        .customers
        .customer_stats(active_since)
        .await
        .map_err(|error| format!("failed to load customer stats: {error}"))?;

    println!("customers: {}", stats.total);
    println!("active (last {ACTIVE_WINDOW_DAYS} days): {}", stats.active);

    if stats.top_customers.is_empty() {
        return Ok(());
    }

    let rows = stats.top_customers.into_iter().map(|customer| {
        [
            customer.id.to_string(),
            customer.name,
            customer.order_count.to_string(),
            console.money(customer.total_spent),
        ]
    });

    println!("{}", table::render(["Id", "Name", "Orders", "Spent"], rows));

    Ok(())
}
