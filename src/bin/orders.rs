//! Order portal for restaurant staff.
//!
//! Usage:
//!   cargo run --bin orders                       # List orders for the restaurant
//!   cargo run --bin orders -- list [STATUS]      # Only orders in STATUS
//!   cargo run --bin orders -- set ID STATUS      # e.g. `set 42 served`, `set 42 cancel`
//!   cargo run --bin orders -- place ID[xQTY]...  # e.g. `place dal naanx3`
//!
//! Required environment variables:
//! - MENU_API_BASE (listing and status updates only)
//!
//! Optional:
//! - RESTAURANT_NUMBER (defaults to 12345)
//! - TABLE_NUMBER (attached to placed orders)

use anyhow::{bail, Context, Result};
use menu_browser::catalog::{self, CatalogSource};
use menu_browser::config::Config;
use menu_browser::orders::{OrderClient, OrderRequest, OrderStatus};
use tracing::info;

/// `dal` or `naanx3` into an id and a quantity.
fn parse_selection(arg: &str) -> Result<(&str, u32)> {
    let is_qty = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    match arg.rsplit_once('x') {
        Some((id, qty)) if !id.is_empty() && is_qty(qty) => {
            let qty = qty
                .parse()
                .with_context(|| format!("Invalid quantity in '{}'", arg))?;
            Ok((id, qty))
        }
        _ => Ok((arg, 1)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("menu_browser=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;
    let client = OrderClient::from_config(&config)?;
    let args: Vec<String> = std::env::args().skip(1).collect();

    match args.first().map(String::as_str) {
        None | Some("list") => {
            let wanted: Option<OrderStatus> = args
                .get(1)
                .map(|s| s.parse().map_err(anyhow::Error::msg))
                .transpose()?;

            let orders = client.list_orders().await?;
            let shown: Vec<_> = orders
                .iter()
                .filter(|order| wanted.map_or(true, |status| order.status == status))
                .collect();

            info!("{} of {} orders shown", shown.len(), orders.len());
            if shown.is_empty() {
                println!("No orders yet.");
            }
            for order in shown {
                println!("{}", order);
            }
        }
        Some("set") => {
            let (Some(id), Some(status)) = (args.get(1), args.get(2)) else {
                bail!("Usage: orders set ID STATUS");
            };
            let status: OrderStatus = status.parse().map_err(anyhow::Error::msg)?;
            client.update_status(id, status).await?;
            println!("Order #{} is now {}", id, status);
        }
        Some("place") => {
            let selection = args[1..]
                .iter()
                .map(|arg| parse_selection(arg))
                .collect::<Result<Vec<_>>>()?;

            let catalog = catalog::load(&CatalogSource::from_config(&config)).await?;
            let request = OrderRequest::from_selection(
                &catalog,
                &selection,
                config.language,
                &config.restaurant_number,
                config.table_number.as_deref(),
            )?;

            let placed = client.place_order(&request).await?;
            println!(
                "Order placed{}: {} (total ₹{})",
                if placed.local { " locally" } else { "" },
                placed.order_id.as_deref().unwrap_or("no id returned"),
                request.total
            );
        }
        Some(other) => bail!("Unknown command '{}'. Expected list, set or place", other),
    }

    Ok(())
}
