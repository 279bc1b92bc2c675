//! Order history commands.

use scentbox_core::OrderId;
use scentbox_storefront::api::Order;
use scentbox_storefront::{AppError, Storefront};

use super::OrderCommand;
use super::cart::print_totals;
use crate::output::{Table, field};

pub async fn run(storefront: &Storefront, command: OrderCommand) -> Result<(), AppError> {
    let api = storefront.api();
    match command {
        OrderCommand::List => order_table(&api.list_orders().await?),
        OrderCommand::Show { id } => print_order(&api.get_order(&OrderId::new(id)).await?),
        OrderCommand::Cancel { id } => {
            let order = api.cancel_order(&OrderId::new(id)).await?;
            println!("Order {} is now {}.", order.display_number(), order.status);
        }
    }
    Ok(())
}

pub fn order_table(orders: &[Order]) {
    let mut table = Table::new(["ORDER", "DATE", "STATUS", "PAYMENT", "TOTAL"]);
    for order in orders {
        table.row([
            order.display_number().to_string(),
            order
                .created_at
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            order.status.to_string(),
            format!("{} ({})", order.payment_method.label(), order.payment_status),
            order.totals.total.to_string(),
        ]);
    }
    table.print_or("No orders yet.");
}

pub fn print_order(order: &Order) {
    field("Order", order.display_number());
    field("Status", order.status);
    field(
        "Payment",
        format!("{} ({})", order.payment_method.label(), order.payment_status),
    );
    if let Some(date) = order.created_at {
        field("Placed", date.format("%Y-%m-%d %H:%M"));
    }
    if let Some(address) = &order.shipping_address {
        field(
            "Ship to",
            format!("{}, {} {}", address.full_name, address.city, address.postal_code),
        );
    }

    if !order.items.is_empty() {
        println!();
        let mut table = Table::new(["ITEM", "QTY", "PRICE"]);
        for item in &order.items {
            table.row([item.name.clone(), item.quantity.to_string(), item.price.to_string()]);
        }
        table.print_or("");
    }
    println!();
    print_totals(&order.totals);
}
