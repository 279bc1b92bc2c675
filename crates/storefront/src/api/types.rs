//! Wire types for the store REST API.
//!
//! Field names are camelCase on the wire. Document ids arrive as either
//! `_id` or `id`; references to other documents arrive either populated or
//! as a bare id.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use scentbox_core::{
    AddressForm, AddressId, BrandId, Cart, CategoryId, LineItem, MessageId, Money, OrderId,
    OrderStatus, OrderTotals, PaymentIntentId, PaymentMethod, PaymentStatus, ProductId,
    ProductSnapshot, ShippingAddress, UserId, UserRole,
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

// =============================================================================
// Catalog
// =============================================================================

/// A reference that is either populated or just an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Related<T> {
    Populated(T),
    Id(String),
}

/// Product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(alias = "_id")]
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Perfume house.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    #[serde(alias = "_id")]
    pub id: BrandId,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(alias = "_id")]
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub brand: Option<Related<Brand>>,
    #[serde(default)]
    pub category: Option<Related<Category>>,
    #[serde(default)]
    pub description: String,
    pub price: Money,
    #[serde(default)]
    pub original_price: Option<Money>,
    #[serde(default, alias = "countInStock")]
    pub stock: u32,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default, alias = "isFeatured")]
    pub featured: bool,
    #[serde(default)]
    pub rating: Option<Decimal>,
    #[serde(default)]
    pub num_reviews: u32,
    #[serde(default, alias = "size")]
    pub size_ml: Option<u32>,
    #[serde(default)]
    pub gender: Option<String>,
}

impl Product {
    /// Brand name, when the brand was populated.
    #[must_use]
    pub fn brand_name(&self) -> Option<&str> {
        match &self.brand {
            Some(Related::Populated(brand)) => Some(&brand.name),
            _ => None,
        }
    }

    /// Category name, when the category was populated.
    #[must_use]
    pub fn category_name(&self) -> Option<&str> {
        match &self.category {
            Some(Related::Populated(category)) => Some(&category.name),
            _ => None,
        }
    }

    /// Brand id, populated or not.
    #[must_use]
    pub fn brand_id(&self) -> Option<BrandId> {
        self.brand.as_ref().map(|brand| match brand {
            Related::Populated(brand) => brand.id.clone(),
            Related::Id(id) => BrandId::new(id.as_str()),
        })
    }

    /// Category id, populated or not.
    #[must_use]
    pub fn category_id(&self) -> Option<CategoryId> {
        self.category.as_ref().map(|category| match category {
            Related::Populated(category) => category.id.clone(),
            Related::Id(id) => CategoryId::new(id.as_str()),
        })
    }

    /// Whether any stock is left.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// The facts the cart keeps about this product.
    #[must_use]
    pub fn snapshot(&self) -> ProductSnapshot {
        ProductSnapshot {
            product_id: self.id.clone(),
            name: self.name.clone(),
            unit_price: self.price,
            stock_limit: self.stock,
            brand: self.brand_name().map(str::to_owned),
            image: self.images.first().cloned(),
        }
    }
}

/// Filters for the product listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub gender: Option<String>,
    pub min_price: Option<Money>,
    pub max_price: Option<Money>,
    pub sort: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ProductQuery {
    /// Query-string pairs, in a stable order.
    #[must_use]
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        let mut push = |key: &'static str, value: Option<String>| {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                pairs.push((key, value));
            }
        };
        push("search", self.search.clone());
        push("category", self.category.clone());
        push("brand", self.brand.clone());
        push("gender", self.gender.clone());
        push("minPrice", self.min_price.map(|p| p.amount().to_string()));
        push("maxPrice", self.max_price.map(|p| p.amount().to_string()));
        push("sort", self.sort.clone());
        push("page", self.page.map(|p| p.to_string()));
        push("limit", self.limit.map(|l| l.to_string()));
        pairs
    }

    /// Cache key for this listing.
    #[must_use]
    pub fn cache_key(&self) -> String {
        let query: Vec<String> = self
            .pairs()
            .into_iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        format!("products?{}", query.join("&"))
    }
}

/// One page of the product listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ProductListing")]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub page: u32,
    pub pages: u32,
    pub total: u64,
}

/// The listing arrives either paginated or as a plain array.
#[derive(Deserialize)]
#[serde(untagged)]
enum ProductListing {
    Paged {
        products: Vec<Product>,
        #[serde(default = "first_page")]
        page: u32,
        #[serde(default = "first_page")]
        pages: u32,
        #[serde(default)]
        total: Option<u64>,
    },
    Plain(Vec<Product>),
}

const fn first_page() -> u32 {
    1
}

impl From<ProductListing> for ProductPage {
    fn from(listing: ProductListing) -> Self {
        match listing {
            ProductListing::Paged {
                products,
                page,
                pages,
                total,
            } => {
                let total = total.unwrap_or(products.len() as u64);
                Self {
                    products,
                    page,
                    pages,
                    total,
                }
            }
            ProductListing::Plain(products) => Self {
                total: products.len() as u64,
                products,
                page: 1,
                pages: 1,
            },
        }
    }
}

// =============================================================================
// Accounts
// =============================================================================

/// A store account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(alias = "_id")]
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    /// Whether the account may use the admin endpoints.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Login/register response.
#[derive(Debug, Clone)]
pub struct AuthResponse {
    pub token: SecretString,
    pub user: User,
}

/// Some backends nest the user, others return its fields beside the token.
#[derive(Deserialize)]
#[serde(untagged)]
enum AuthResponseWire {
    Nested {
        token: String,
        user: User,
    },
    Flat {
        token: String,
        #[serde(flatten)]
        user: User,
    },
}

impl<'de> Deserialize<'de> for AuthResponse {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (token, user) = match AuthResponseWire::deserialize(deserializer)? {
            AuthResponseWire::Nested { token, user } | AuthResponseWire::Flat { token, user } => {
                (token, user)
            }
        };
        Ok(Self {
            token: SecretString::from(token),
            user,
        })
    }
}

#[derive(Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Serialize)]
pub(crate) struct RegisterRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

// =============================================================================
// Cart
// =============================================================================

/// A product reference that may have been populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductRef {
    Populated(Box<Product>),
    Id(ProductId),
}

impl ProductRef {
    /// The referenced product's id.
    #[must_use]
    pub fn id(&self) -> &ProductId {
        match self {
            Self::Populated(product) => &product.id,
            Self::Id(id) => id,
        }
    }
}

/// The server's copy of the cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCart {
    #[serde(default, alias = "cartItems")]
    pub items: Vec<RemoteCartItem>,
}

/// One line of the server cart.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCartItem {
    pub product: ProductRef,
    pub quantity: u32,
    #[serde(default)]
    pub price: Option<Money>,
}

impl RemoteCart {
    /// Convert into a local cart.
    ///
    /// Lines whose product was not populated keep the id as their name and
    /// are capped at their current quantity, since the stock is unknown.
    #[must_use]
    pub fn into_cart(self) -> Cart {
        Cart::from_items(self.items.into_iter().map(|item| match item.product {
            ProductRef::Populated(product) => {
                let snapshot = product.snapshot();
                LineItem {
                    product_id: snapshot.product_id,
                    name: snapshot.name,
                    unit_price: snapshot.unit_price,
                    quantity: item.quantity,
                    stock_limit: snapshot.stock_limit,
                    brand: snapshot.brand,
                    image: snapshot.image,
                }
            }
            ProductRef::Id(product_id) => LineItem {
                name: product_id.to_string(),
                product_id,
                unit_price: item.price.unwrap_or(Money::ZERO),
                quantity: item.quantity,
                stock_limit: item.quantity,
                brand: None,
                image: None,
            },
        }))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AddToCartRequest<'a> {
    pub product_id: &'a ProductId,
    pub quantity: u32,
}

#[derive(Serialize)]
pub(crate) struct UpdateCartRequest {
    pub quantity: u32,
}

// =============================================================================
// Addresses
// =============================================================================

/// An address stored on the account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedAddress {
    #[serde(alias = "_id")]
    pub id: AddressId,
    #[serde(flatten)]
    pub address: AddressForm,
    #[serde(default)]
    pub is_default: bool,
}

impl SavedAddress {
    /// The address, if it still passes validation.
    #[must_use]
    pub fn validated(&self) -> Option<ShippingAddress> {
        self.address.validate().ok()
    }
}

/// Body for creating or updating an address.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressInput {
    #[serde(flatten)]
    pub address: AddressForm,
    pub is_default: bool,
}

// =============================================================================
// Orders
// =============================================================================

/// One line of a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product: ProductRef,
    pub name: String,
    pub quantity: u32,
    pub price: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// A placed order. The client only ever holds a read-only copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(alias = "_id")]
    pub id: OrderId,
    #[serde(default)]
    pub order_number: Option<String>,
    #[serde(default, alias = "orderStatus")]
    pub status: OrderStatus,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    #[serde(default, alias = "orderItems")]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub shipping_address: Option<AddressForm>,
    #[serde(flatten)]
    pub totals: OrderTotals,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Order number for display, falling back to the id.
    #[must_use]
    pub fn display_number(&self) -> &str {
        self.order_number.as_deref().unwrap_or_else(|| self.id.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderItemInput {
    pub product: ProductId,
    pub name: String,
    pub quantity: u32,
    pub price: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Body for `POST /orders`.
///
/// The totals are the client preview. The server recomputes its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub(crate) items: Vec<OrderItemInput>,
    pub shipping_address: AddressForm,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_id: Option<AddressId>,
    pub payment_method: PaymentMethod,
    pub items_price: Money,
    pub shipping_price: Money,
    pub tax_price: Money,
    pub discount_price: Money,
    pub total_price: Money,
}

impl OrderRequest {
    /// Build an order request from the cart contents.
    #[must_use]
    pub fn new(
        cart: &Cart,
        address: &ShippingAddress,
        address_id: Option<&AddressId>,
        payment_method: PaymentMethod,
        preview: &OrderTotals,
    ) -> Self {
        Self {
            items: cart
                .items()
                .iter()
                .map(|item| OrderItemInput {
                    product: item.product_id.clone(),
                    name: item.name.clone(),
                    quantity: item.quantity,
                    price: item.unit_price,
                    image: item.image.clone(),
                })
                .collect(),
            shipping_address: address.clone().into(),
            address_id: address_id.cloned(),
            payment_method,
            items_price: preview.subtotal,
            shipping_price: preview.shipping_cost,
            tax_price: preview.tax_amount,
            discount_price: preview.discount_amount,
            total_price: preview.total,
        }
    }

    /// Number of order lines.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.items.len()
    }
}

// =============================================================================
// Payment
// =============================================================================

/// Public payment gateway settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentConfig {
    #[serde(alias = "key")]
    pub publishable_key: String,
    #[serde(default)]
    pub currency: Option<String>,
}

/// A pending charge created on the gateway.
#[derive(Debug, Clone)]
pub struct PaymentIntent {
    pub id: PaymentIntentId,
    pub client_secret: SecretString,
    pub amount: Option<Money>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaymentIntentWire {
    #[serde(alias = "id")]
    payment_intent_id: PaymentIntentId,
    client_secret: String,
    #[serde(default)]
    amount: Option<Money>,
}

impl<'de> Deserialize<'de> for PaymentIntent {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = PaymentIntentWire::deserialize(deserializer)?;
        Ok(Self {
            id: wire.payment_intent_id,
            client_secret: SecretString::from(wire.client_secret),
            amount: wire.amount,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PaymentIntentRequest<'a> {
    pub order_id: &'a OrderId,
    pub amount: Money,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ConfirmPaymentRequest<'a> {
    pub order_id: &'a OrderId,
    pub payment_intent_id: &'a PaymentIntentId,
}

// =============================================================================
// Contact
// =============================================================================

/// A message sent through the contact form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    #[serde(alias = "_id")]
    pub id: MessageId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub subject: Option<String>,
    pub message: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body for `POST /contact`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub message: String,
}
