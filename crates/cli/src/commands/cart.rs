//! Cart commands.

use scentbox_core::{Money, OrderTotals, ProductId};
use scentbox_storefront::cart_store::SyncOutcome;
use scentbox_storefront::{AppError, Storefront};

use super::CartCommand;
use crate::output::{Table, field};

pub async fn run(storefront: &mut Storefront, command: CartCommand) -> Result<(), AppError> {
    match command {
        CartCommand::Show => show(storefront),
        CartCommand::Add { product_id, qty } => {
            let id = ProductId::new(product_id);
            let outcome = storefront.add_to_cart(&id, qty).await?;
            let quantity = storefront.cart().get(&id).map_or(0, |item| item.quantity);
            println!("{id}: {quantity} in cart.");
            report_sync(&outcome);
        }
        CartCommand::Update { product_id, qty } => {
            let id = ProductId::new(product_id);
            let outcome = storefront.cart_mut().update_quantity(&id, qty).await;
            storefront.save_local_cart()?;
            match storefront.cart().get(&id) {
                Some(item) => println!("{id}: {} in cart.", item.quantity),
                None => println!("{id} is not in the cart."),
            }
            report_sync(&outcome);
        }
        CartCommand::Remove { product_id } => {
            let id = ProductId::new(product_id);
            let outcome = storefront.cart_mut().remove(&id).await;
            storefront.save_local_cart()?;
            println!("{id} removed.");
            report_sync(&outcome);
        }
        CartCommand::Sync => {
            let diff = storefront.cart_mut().reconcile().await?;
            storefront.save_local_cart()?;
            if diff.is_empty() {
                println!("Cart is up to date.");
            } else {
                for id in &diff.local_only {
                    println!("{id}: dropped (not in the store's cart)");
                }
                for id in &diff.server_only {
                    println!("{id}: added from the store's cart");
                }
                for mismatch in &diff.quantity_mismatch {
                    println!(
                        "{}: quantity {} -> {}",
                        mismatch.product_id, mismatch.local, mismatch.server
                    );
                }
            }
            show(storefront);
        }
    }
    Ok(())
}

fn show(storefront: &Storefront) {
    let cart = storefront.cart();
    if cart.is_empty() {
        println!("Your cart is empty.");
        return;
    }

    let mut table = Table::new(["ID", "NAME", "QTY", "PRICE", "TOTAL"]);
    for item in cart.items() {
        table.row([
            item.product_id.to_string(),
            item.name.clone(),
            item.quantity.to_string(),
            item.unit_price.to_string(),
            item.line_total().to_string(),
        ]);
    }
    table.print_or("");
    println!();
    print_totals(&cart.totals(&storefront.config().pricing, None));
}

pub fn print_totals(totals: &OrderTotals) {
    field("Subtotal", totals.subtotal);
    if totals.shipping_cost == Money::ZERO {
        field("Shipping", "Free");
    } else {
        field("Shipping", totals.shipping_cost);
    }
    field("Tax", totals.tax_amount);
    if totals.discount_amount > Money::ZERO {
        field("Discount", format!("-{}", totals.discount_amount));
    }
    field("Total", totals.total);
}

fn report_sync(outcome: &SyncOutcome) {
    if let SyncOutcome::Failed(e) = outcome {
        println!("Saved locally, but the store could not be updated ({e}).");
        println!("Run `sb cart sync` to reload the store's copy.");
    }
}
