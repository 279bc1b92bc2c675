//! Saved address commands.

use scentbox_core::AddressId;
use scentbox_storefront::api::{AddressInput, SavedAddress};
use scentbox_storefront::checkout::CheckoutError;
use scentbox_storefront::{AppError, Storefront};

use super::AddressCommand;
use crate::output::Table;

pub async fn run(storefront: &Storefront, command: AddressCommand) -> Result<(), AppError> {
    let api = storefront.api();
    match command {
        AddressCommand::List => {
            address_table(&api.list_addresses().await?);
        }
        AddressCommand::Add { address, default } => {
            let form = address.to_form().unwrap_or_default();
            if let Err(errors) = form.validate() {
                return Err(CheckoutError::InvalidAddress(errors).into());
            }
            let saved = api
                .create_address(&AddressInput {
                    address: form,
                    is_default: default,
                })
                .await?;
            println!("Saved address {}.", saved.id);
        }
        AddressCommand::Delete { id } => {
            api.delete_address(&AddressId::new(id)).await?;
            println!("Address deleted.");
        }
    }
    Ok(())
}

fn address_table(addresses: &[SavedAddress]) {
    let mut table = Table::new(["ID", "", "ADDRESS"]);
    for saved in addresses {
        let line = saved.validated().map_or_else(
            || format!("{}, {} (incomplete)", saved.address.full_name, saved.address.city),
            |address| address.one_line(),
        );
        table.row([
            saved.id.to_string(),
            if saved.is_default { "*" } else { "" }.to_string(),
            line,
        ]);
    }
    table.print_or("No saved addresses.");
}
