//! Admin request and response types.

use scentbox_core::{BrandId, CategoryId, Money, OrderStatus, UserRole};
use scentbox_storefront::api::{Order, Product};
use serde::{Deserialize, Serialize};

use crate::AdminError;

/// Store-wide figures for the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    #[serde(default, alias = "usersCount")]
    pub total_users: u64,
    #[serde(default, alias = "productsCount")]
    pub total_products: u64,
    #[serde(default, alias = "ordersCount")]
    pub total_orders: u64,
    #[serde(default, alias = "revenue")]
    pub total_revenue: Money,
    #[serde(default)]
    pub recent_orders: Vec<Order>,
    #[serde(default, alias = "lowStock")]
    pub low_stock_products: Vec<Product>,
}

/// Body for `PUT /admin/users/:id/role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UserRoleUpdate {
    pub role: UserRole,
}

/// Body for `PUT /admin/orders/:id/status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
}

/// A product as submitted from the admin panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<BrandId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryId>,
    pub description: String,
    pub price: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Money>,
    pub stock: i64,
    pub images: Vec<String>,
    pub featured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_ml: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
}

impl ProductInput {
    /// Check the fields the backend would otherwise reject.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Validation` naming the first bad field.
    pub fn validate(&self) -> Result<(), AdminError> {
        if self.name.trim().is_empty() {
            return Err(AdminError::Validation("name is required".to_string()));
        }
        if self.price.is_negative() {
            return Err(AdminError::Validation(
                "price cannot be negative".to_string(),
            ));
        }
        if self.original_price.is_some_and(Money::is_negative) {
            return Err(AdminError::Validation(
                "original price cannot be negative".to_string(),
            ));
        }
        if self.stock < 0 {
            return Err(AdminError::Validation(
                "stock cannot be negative".to_string(),
            ));
        }
        Ok(())
    }
}

impl From<&Product> for ProductInput {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            brand: product.brand_id(),
            category: product.category_id(),
            description: product.description.clone(),
            price: product.price,
            original_price: product.original_price,
            stock: i64::from(product.stock),
            images: product.images.clone(),
            featured: product.featured,
            size_ml: product.size_ml,
            gender: product.gender.clone(),
        }
    }
}

/// Response of `POST /upload/product-image`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadedImage {
    #[serde(alias = "imageUrl", alias = "image", alias = "path")]
    pub url: String,
}
