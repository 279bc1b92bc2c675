//! Store administration commands.
//!
//! # Usage
//!
//! ```bash
//! sb admin dashboard
//! sb admin set-role 65f0c2a1 admin
//! sb admin orders --status pending
//! sb admin set-order-status 65f0d9e4 shipped
//! sb admin create-product --name "Santal Blanc" --price 2400 --stock 12
//! sb admin upload-image ./bottle.webp
//! ```

use scentbox_admin::{AdminClient, ProductInput};
use scentbox_core::{BrandId, CategoryId, MessageId, Money, OrderId, ProductId, UserId};
use scentbox_storefront::api::{ApiError, ContactMessage, User};
use scentbox_storefront::{AppError, Storefront};

use super::AdminCommand;
use super::catalog::product_table;
use super::orders::order_table;
use crate::output::{Table, field};

pub async fn run(storefront: &Storefront, command: AdminCommand) -> Result<(), AppError> {
    let user = storefront
        .current_user()
        .await
        .ok_or(ApiError::Unauthenticated)?;
    let admin = AdminClient::new(storefront.api().clone(), user).await?;

    match command {
        AdminCommand::Dashboard => {
            let stats = admin.dashboard().await?;
            field("Users", stats.total_users);
            field("Products", stats.total_products);
            field("Orders", stats.total_orders);
            field("Revenue", stats.total_revenue);
            if !stats.recent_orders.is_empty() {
                println!("\nRecent orders");
                order_table(&stats.recent_orders);
            }
            if !stats.low_stock_products.is_empty() {
                println!("\nLow stock");
                product_table(&stats.low_stock_products);
            }
        }
        AdminCommand::Users => user_table(&admin.list_users().await?),
        AdminCommand::SetRole { user_id, role } => {
            let user = admin.set_user_role(&UserId::new(user_id), role).await?;
            println!("{} is now {}.", user.email, user.role);
        }
        AdminCommand::DeleteUser { user_id } => {
            admin.delete_user(&UserId::new(user_id)).await?;
            println!("User deleted.");
        }
        AdminCommand::Orders { status } => order_table(&admin.list_orders(status).await?),
        AdminCommand::SetOrderStatus { order_id, status } => {
            let order = admin
                .update_order_status(&OrderId::new(order_id), status)
                .await?;
            println!("Order {} is now {}.", order.display_number(), order.status);
        }
        AdminCommand::Products => product_table(&admin.list_products().await?),
        AdminCommand::CreateProduct {
            name,
            price,
            stock,
            description,
            brand,
            category,
            images,
            featured,
            size_ml,
            gender,
        } => {
            let input = ProductInput {
                name,
                brand: brand.map(BrandId::new),
                category: category.map(CategoryId::new),
                description,
                price: Money::from_major(price),
                original_price: None,
                stock,
                images,
                featured,
                size_ml,
                gender,
            };
            let product = admin.create_product(&input).await?;
            println!("Created product {} ({}).", product.name, product.id);
        }
        AdminCommand::DeleteProduct { product_id } => {
            admin.delete_product(&ProductId::new(product_id)).await?;
            println!("Product deleted.");
        }
        AdminCommand::UploadImage { path } => {
            let url = admin.upload_image(&path).await?;
            println!("{url}");
        }
        AdminCommand::Messages => message_table(&admin.list_messages().await?),
        AdminCommand::DeleteMessage { message_id } => {
            admin.delete_message(&MessageId::new(message_id)).await?;
            println!("Message deleted.");
        }
    }
    Ok(())
}

fn user_table(users: &[User]) {
    let mut table = Table::new(["ID", "NAME", "EMAIL", "ROLE"]);
    for user in users {
        table.row([
            user.id.to_string(),
            user.name.clone(),
            user.email.clone(),
            user.role.to_string(),
        ]);
    }
    table.print_or("No users.");
}

fn message_table(messages: &[ContactMessage]) {
    let mut table = Table::new(["ID", "DATE", "FROM", "SUBJECT"]);
    for message in messages {
        table.row([
            message.id.to_string(),
            message
                .created_at
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            format!("{} <{}>", message.name, message.email),
            message.subject.clone().unwrap_or_else(|| "-".to_string()),
        ]);
    }
    table.print_or("No messages.");
}
