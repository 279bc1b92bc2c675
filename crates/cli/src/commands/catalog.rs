//! Catalog browsing.

use scentbox_core::{Money, ProductId};
use scentbox_storefront::api::{Product, ProductQuery};
use scentbox_storefront::{AppError, Storefront};

use super::ProductCommand;
use crate::output::{Table, field};

pub async fn products(storefront: &Storefront, command: ProductCommand) -> Result<(), AppError> {
    let api = storefront.api();
    match command {
        ProductCommand::List {
            search,
            category,
            brand,
            gender,
            min_price,
            max_price,
            sort,
            page,
            limit,
        } => {
            let query = ProductQuery {
                search,
                category,
                brand,
                gender,
                min_price: min_price.map(Money::from_major),
                max_price: max_price.map(Money::from_major),
                sort,
                page,
                limit,
            };
            let page = api.list_products(&query).await?;
            product_table(&page.products);
            if page.pages > 1 {
                println!("Page {} of {} ({} products)", page.page, page.pages, page.total);
            }
        }
        ProductCommand::Show { id } => {
            let product = api.get_product(&ProductId::new(id)).await?;
            print_product(&product);
        }
        ProductCommand::Featured => {
            product_table(&api.featured_products().await?);
        }
    }
    Ok(())
}

pub async fn categories(storefront: &Storefront) -> Result<(), AppError> {
    let mut table = Table::new(["ID", "NAME", "SLUG"]);
    for category in storefront.api().categories().await? {
        table.row([category.id.to_string(), category.name, category.slug]);
    }
    table.print_or("No categories.");
    Ok(())
}

pub async fn brands(storefront: &Storefront) -> Result<(), AppError> {
    let mut table = Table::new(["ID", "NAME", "SLUG"]);
    for brand in storefront.api().brands().await? {
        table.row([brand.id.to_string(), brand.name, brand.slug]);
    }
    table.print_or("No brands.");
    Ok(())
}

pub fn product_table(products: &[Product]) {
    let mut table = Table::new(["ID", "NAME", "BRAND", "PRICE", "STOCK"]);
    for product in products {
        table.row([
            product.id.to_string(),
            product.name.clone(),
            product.brand_name().unwrap_or("-").to_string(),
            product.price.to_string(),
            if product.in_stock() {
                product.stock.to_string()
            } else {
                "out".to_string()
            },
        ]);
    }
    table.print_or("No products found.");
}

fn print_product(product: &Product) {
    field("ID", &product.id);
    field("Name", &product.name);
    if let Some(brand) = product.brand_name() {
        field("Brand", brand);
    }
    if let Some(category) = product.category_name() {
        field("Category", category);
    }
    match product.original_price {
        Some(original) if original > product.price => {
            field("Price", format!("{} (was {original})", product.price));
        }
        _ => field("Price", product.price),
    }
    if let Some(size) = product.size_ml {
        field("Size", format!("{size} ml"));
    }
    if let Some(gender) = &product.gender {
        field("For", gender);
    }
    field(
        "Stock",
        if product.in_stock() {
            product.stock.to_string()
        } else {
            "out of stock".to_string()
        },
    );
    if let Some(rating) = product.rating {
        field("Rating", format!("{rating} ({} reviews)", product.num_reviews));
    }
    if !product.description.is_empty() {
        println!();
        println!("{}", product.description);
    }
}
