//! Catalog reads: products, categories and brands.
//!
//! All public and cached. Searches skip the cache.

use scentbox_core::ProductId;
use tracing::{debug, instrument};

use super::cache::CacheValue;
use super::client::{Access, ApiClient, ApiPath};
use super::types::{Brand, Category, Product, ProductPage, ProductQuery};
use super::ApiError;

impl ApiClient {
    /// List products matching `query`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self, query: &ProductQuery) -> Result<ProductPage, ApiError> {
        let cache_key = query.cache_key();
        let cacheable = query.search.is_none();

        // Check cache (only for queries without a search term)
        if cacheable && let Some(CacheValue::Products(page)) = self.cached(&cache_key).await {
            debug!("Cache hit for products");
            return Ok(page);
        }

        let page: ProductPage = self
            .get_with_query("/products", &query.pairs(), Access::Public)
            .await?;

        if cacheable {
            self.cache(cache_key, CacheValue::Products(page.clone())).await;
        }

        Ok(page)
    }

    /// Get a product by id.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the product does not exist, or an
    /// error if the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: &ProductId) -> Result<Product, ApiError> {
        let cache_key = format!("product:{id}");

        if let Some(CacheValue::Product(product)) = self.cached(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let product: Product = self
            .get(ApiPath::new("/products").id(id), Access::Public)
            .await?;

        self.cache(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Featured products for the home page.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn featured_products(&self) -> Result<Vec<Product>, ApiError> {
        const KEY: &str = "products:featured";

        if let Some(CacheValue::Featured(products)) = self.cached(KEY).await {
            debug!("Cache hit for featured products");
            return Ok(products);
        }

        let page: ProductPage = self.get("/products/featured", Access::Public).await?;
        self.cache(KEY.to_string(), CacheValue::Featured(page.products.clone()))
            .await;

        Ok(page.products)
    }

    /// All categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        const KEY: &str = "categories";

        if let Some(CacheValue::Categories(categories)) = self.cached(KEY).await {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let categories: Vec<Category> = self.get("/categories", Access::Public).await?;
        self.cache(KEY.to_string(), CacheValue::Categories(categories.clone()))
            .await;

        Ok(categories)
    }

    /// All brands.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn brands(&self) -> Result<Vec<Brand>, ApiError> {
        const KEY: &str = "brands";

        if let Some(CacheValue::Brands(brands)) = self.cached(KEY).await {
            debug!("Cache hit for brands");
            return Ok(brands);
        }

        let brands: Vec<Brand> = self.get("/brands", Access::Public).await?;
        self.cache(KEY.to_string(), CacheValue::Brands(brands.clone()))
            .await;

        Ok(brands)
    }

    /// Drop the cached copy of one product, e.g. after an admin edit.
    pub async fn invalidate_product(&self, id: &ProductId) {
        self.invalidate(&format!("product:{id}")).await;
    }
}
