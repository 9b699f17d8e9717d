use grocer_app::domain::orders::{OrdersService, records::SalesSummary};
use jiff::{Timestamp, ToSpan, Zoned};

use super::{Console, table};

pub(crate) async fn run(console: &Console) -> Result<(), String> {
    let now = Zoned::now();
    let start_of_day = now
        .start_of_day()
        .map_err(|error| format!("failed to compute start of day: {error}"))?;
    let week_ago = now
        .checked_sub(7.days())
        .map_err(|error| format!("failed to compute report window: {error}"))?;

    let until = Timestamp::now();

    let today = summary(console, start_of_day.timestamp(), until).await?;
    let week = summary(console, week_ago.timestamp(), until).await?;

    let rows = [("Today", today), ("Last 7 days", week)].map(|(period, totals)| {
        [
            period.to_string(),
            totals.order_count.to_string(),
            console.money(totals.revenue),
            console.money(totals.average),
        ]
    });

    println!("{}", table::render(["Period", "Orders", "Revenue", "Average"], rows));

    Ok(())
}

async fn summary(console: &Console, from: Timestamp, to: Timestamp) -> Result<SalesSummary, String> {
    console
        .context
        .orders
        .sales_summary(from, to)
        .await
        .map_err(|error| format!("failed to load sales: {error}"))
}
