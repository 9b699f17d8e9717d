use clap::{Args, Subcommand};
use grocer::{money, products::ProductId};
use grocer_app::domain::products::{ProductsService, data::NewProduct};
use rust_decimal::Decimal;

use super::{Console, table};

#[derive(Debug, Args)]
pub(crate) struct ProductsCommand {
    #[command(subcommand)]
    command: ProductsSubcommand,
}

#[derive(Debug, Subcommand)]
enum ProductsSubcommand {
    /// Best selling products
    Popular {
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },

    /// Add a product to the catalog
    Add(AddProductArgs),

    /// Remove a product from the catalog
    Delete {
        product: ProductId,

        /// Required to actually delete
        #[arg(long)]
        confirm: bool,
    },
}

#[derive(Debug, Args)]
struct AddProductArgs {
    #[arg(long)]
    name: String,

    #[arg(long)]
    category: String,

    /// Unit price in major units, e.g. 3.50
    #[arg(long)]
    price: Decimal,

    #[arg(long, default_value_t = 0)]
    stock: u32,

    #[arg(long)]
    description: Option<String>,

    #[arg(long)]
    image_url: Option<String>,
}

pub(crate) async fn run(console: &Console, command: ProductsCommand) -> Result<(), String> {
    match command.command {
        ProductsSubcommand::Popular { limit } => popular(console, limit).await,
        ProductsSubcommand::Add(args) => add(console, args).await,
        ProductsSubcommand::Delete { product, confirm } => delete(console, product, confirm).await,
    }
}

async fn popular(console: &Console, limit: u32) -> Result<(), String> {
    let popular = console
        .context
        .products
        .popular_products(limit)
        .await
        .map_err(|error| format!("failed to load popular products: {error}"))?;

    if popular.is_empty() {
        println!("no sales yet");

        return Ok(());
    }

    let rows = popular.into_iter().map(|entry| {
        [
            entry.product.id.to_string(),
            entry.product.name,
            entry.order_count.to_string(),
            entry.units_sold.to_string(),
            console.money(entry.product.price),
        ]
    });

    println!(
        "{}",
        table::render(["Id", "Name", "Orders", "Units", "Price"], rows)
    );

    Ok(())
}

async fn add(console: &Console, args: AddProductArgs) -> Result<(), String> {
    if args.name.trim().is_empty() {
        return Err("product name cannot be empty".to_string());
    }

    let price = money::to_minor_units(args.price, console.currency)
        .map_err(|error| format!("invalid price: {error}"))?;

    let product = console
        .context
        .products
        .create_product(NewProduct {
            name: args.name.trim().to_string(),
            category: args.category.trim().to_string(),
            price,
            stock: args.stock,
            description: args.description,
            image_url: args.image_url,
        })
        .await
        .map_err(|error| format!("failed to create product: {error}"))?;

    println!("product_id: {}", product.id);
    println!("name: {}", product.name);
    println!("price: {}", console.money(product.price));
    println!("stock: {}", product.stock);

    Ok(())
}

async fn delete(console: &Console, product: ProductId, confirm: bool) -> Result<(), String> {
    if !confirm {
        return Err(format!("refusing to delete product {product} without --confirm"));
    }

    console
        .context
        .products
        .delete_product(product)
        .await
        .map_err(|error| format!("failed to delete product {product}: {error}"))?;

    println!("deleted product {product}");

    Ok(())
}
