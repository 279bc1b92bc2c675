//! Cache types for catalog responses.

use super::types::{Brand, Category, Product, ProductPage};

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Products(ProductPage),
    Featured(Vec<Product>),
    Categories(Vec<Category>),
    Brands(Vec<Brand>),
}
