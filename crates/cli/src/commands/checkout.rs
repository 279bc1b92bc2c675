//! Checkout command.

use scentbox_core::{AddressId, CheckoutStep};
use scentbox_storefront::api::SavedAddress;
use scentbox_storefront::checkout::{Confirmation, ExternalPaymentReference};
use scentbox_storefront::{AppError, Storefront};

use super::CheckoutArgs;
use super::cart::print_totals;
use crate::output::field;

pub async fn run(storefront: &mut Storefront, args: CheckoutArgs) -> Result<(), AppError> {
    if storefront.cart().is_empty() {
        println!("Your cart is empty.");
        return Ok(());
    }

    let new_address = args.address.to_form();
    let saved = if new_address.is_some() {
        None
    } else {
        pick_saved_address(storefront, args.address_id.map(AddressId::new)).await?
    };

    let mut flow = storefront.checkout();
    storefront.begin_checkout(&mut flow, saved.as_ref())?;

    if flow.step() == CheckoutStep::AddressCollection {
        let Some(form) = new_address else {
            return Err(AppError::Validation(
                "No usable saved address. Pass --full-name, --line1, --city, --state, \
                 --postal-code and --phone, or save one with `sb addresses add`."
                    .to_string(),
            ));
        };
        flow.submit_address(&form)?;
    }

    if let Some(address) = flow.address() {
        field("Ship to", address.one_line());
    }

    let confirmation = if args.card {
        let gateway = ExternalPaymentReference::new(args.payment_ref.unwrap_or_default());
        storefront.pay_by_card(&mut flow, &gateway).await?
    } else {
        storefront.place_cod_order(&mut flow).await?
    };

    print_confirmation(&confirmation);
    Ok(())
}

/// The requested saved address, or the default one.
async fn pick_saved_address(
    storefront: &Storefront,
    id: Option<AddressId>,
) -> Result<Option<SavedAddress>, AppError> {
    let addresses = storefront.api().list_addresses().await?;
    match id {
        Some(id) => addresses
            .into_iter()
            .find(|a| a.id == id)
            .map(Some)
            .ok_or_else(|| AppError::Validation(format!("No saved address with id {id}"))),
        None => Ok(addresses
            .iter()
            .find(|a| a.is_default)
            .or_else(|| addresses.first())
            .cloned()),
    }
}

fn print_confirmation(confirmation: &Confirmation) {
    let order = &confirmation.order;
    println!();
    println!("Order placed!");
    field("Order", order.display_number());
    field("Status", order.status);
    field(
        "Payment",
        format!("{} ({})", order.payment_method.label(), order.payment_status),
    );
    println!();
    print_totals(&order.totals);

    if let Some(mismatch) = &confirmation.mismatch {
        println!();
        println!("Note: the store's totals differ from the estimate shown earlier ({mismatch}).");
        println!("The amounts above are the ones charged.");
    }
}
