//! Sign-in commands.

use scentbox_storefront::api::ApiError;
use scentbox_storefront::{AppError, Storefront};
use secrecy::SecretString;

use crate::output::field;

pub async fn login(
    storefront: &mut Storefront,
    email: &str,
    password: String,
) -> Result<(), AppError> {
    let user = storefront
        .login(email, &SecretString::from(password))
        .await?;
    println!("Signed in as {} <{}>", user.name, user.email);
    print_cart_summary(storefront);
    Ok(())
}

pub async fn register(
    storefront: &mut Storefront,
    name: &str,
    email: &str,
    password: String,
) -> Result<(), AppError> {
    let user = storefront
        .register(name, email, &SecretString::from(password))
        .await?;
    println!("Welcome, {}! Your account is ready.", user.name);
    Ok(())
}

pub async fn logout(storefront: &mut Storefront) -> Result<(), AppError> {
    storefront.logout().await?;
    println!("Signed out.");
    Ok(())
}

pub async fn whoami(storefront: &Storefront) -> Result<(), AppError> {
    let user = storefront
        .current_user()
        .await
        .ok_or(ApiError::Unauthenticated)?;
    field("Name", &user.name);
    field("Email", &user.email);
    field("Role", user.role);
    if let Some(phone) = &user.phone {
        field("Phone", phone);
    }
    Ok(())
}

fn print_cart_summary(storefront: &Storefront) {
    let count = storefront.cart().item_count();
    if count > 0 {
        println!("Your cart has {count} item(s).");
    }
}
