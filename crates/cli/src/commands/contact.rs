//! Contact form.

use scentbox_storefront::api::ContactRequest;
use scentbox_storefront::{AppError, Storefront};

use super::ContactArgs;

pub async fn run(storefront: &Storefront, args: ContactArgs) -> Result<(), AppError> {
    let request = ContactRequest {
        name: args.name,
        email: args.email,
        subject: args.subject,
        message: args.message,
    };
    request.validate().map_err(AppError::Validation)?;
    storefront.api().submit_contact(&request).await?;
    println!("Thanks! We'll get back to you soon.");
    Ok(())
}
