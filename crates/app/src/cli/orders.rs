use clap::{Args, Subcommand};
use grocer::orders::{OrderId, OrderStatus};
use grocer_app::domain::orders::OrdersService;

use super::{Console, table};

#[derive(Debug, Args)]
pub(crate) struct OrdersCommand {
    #[command(subcommand)]
    command: OrdersSubcommand,
}

#[derive(Debug, Subcommand)]
enum OrdersSubcommand {
    /// Most recent orders across all customers
    Recent {
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },

    /// One order with its lines
    Show { order: OrderId },

    /// Move an order to a new status
    Status { order: OrderId, status: OrderStatus },
}

pub(crate) async fn run(console: &Console, command: OrdersCommand) -> Result<(), String> {
    match command.command {
        OrdersSubcommand::Recent { limit } => recent(console, limit).await,
        OrdersSubcommand::Show { order } => show(console, order).await,
        OrdersSubcommand::Status { order, status } => set_status(console, order, status).await,
    }
}

async fn recent(console: &Console, limit: u32) -> Result<(), String> {
    let orders = console
        .context
        .orders
        .recent_orders(limit)
        .await
        .map_err(|error| format!("failed to load orders: {error}"))?;

    if orders.is_empty() {
        println!("no orders yet");

        return Ok(());
    }

    let rows = orders.into_iter().map(|recent| {
        let order = recent.order;

        [
            order.id.to_string(),
            recent.customer_name,
            order.fulfillment.label().to_string(),
            console.money(order.total),
            order.status.to_string(),
            order.created_at.strftime("%Y-%m-%d %H:%M").to_string(),
        ]
    });

    println!(
        "{}",
        table::render(["Id", "Customer", "Type", "Total", "Status", "Placed"], rows)
    );

    Ok(())
}

async fn show(console: &Console, id: OrderId) -> Result<(), String> {
    let order = console
        .context
        .orders
        .get_order(id.clone())
        .await
        .map_err(|error| format!("failed to load order {id}: {error}"))?;

    println!("order: {}", order.id);
    println!("customer: {}", order.customer_id);
    println!("status: {}", order.status);
    println!("type: {}", order.fulfillment.label());
    println!("phone: {}", order.phone);

    if let Some(address) = &order.delivery_address {
        println!("address: {address}");
    }

    println!("placed: {}", order.created_at);

    let rows = order.items.iter().map(|(product, line)| {
        [
            product.to_string(),
            line.name.clone(),
            line.quantity.to_string(),
            console.money(line.unit_price),
            console.money(line.unit_price.saturating_mul(u64::from(line.quantity))),
        ]
    });

    println!(
        "{}",
        table::render(["Product", "Name", "Qty", "Price", "Subtotal"], rows)
    );

    println!("subtotal: {}", console.money(order.subtotal));
    println!("delivery fee: {}", console.money(order.delivery_fee));
    println!("total: {}", console.money(order.total));

    Ok(())
}

async fn set_status(console: &Console, id: OrderId, status: OrderStatus) -> Result<(), String> {
    let orders = &console.context.orders;

    let current = orders
        .get_order(id.clone())
        .await
        .map_err(|error| format!("failed to load order {id}: {error}"))?;

    let updated = orders
        .update_status(id.clone(), current.status, status)
        .await
        .map_err(|error| format!("failed to update order {id}: {error}"))?;

    println!("order {}: {} -> {}", updated.id, current.status, updated.status);

    Ok(())
}
