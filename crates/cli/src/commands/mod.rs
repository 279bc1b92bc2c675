//! Subcommand arguments and handlers.

pub mod account;
pub mod addresses;
pub mod admin;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod contact;
pub mod orders;

use clap::{Args, Subcommand};
use scentbox_core::{AddressForm, OrderStatus, UserRole};

#[derive(Subcommand)]
pub enum ProductCommand {
    /// Search and filter the catalog
    List {
        #[arg(short, long)]
        search: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        brand: Option<String>,
        #[arg(long)]
        gender: Option<String>,
        /// Minimum price in rupees
        #[arg(long)]
        min_price: Option<i64>,
        /// Maximum price in rupees
        #[arg(long)]
        max_price: Option<i64>,
        /// e.g. `price_asc`, `price_desc`, `newest`, `rating`
        #[arg(long)]
        sort: Option<String>,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Show one product
    Show { id: String },
    /// Featured products
    Featured,
}

#[derive(Subcommand)]
pub enum CartCommand {
    /// Show the cart and its totals
    Show,
    /// Add a product
    Add {
        product_id: String,
        #[arg(short, long, default_value_t = 1)]
        qty: u32,
    },
    /// Set a line's quantity (0 removes it)
    Update {
        product_id: String,
        #[arg(allow_negative_numbers = true)]
        qty: i64,
    },
    /// Remove a line
    Remove { product_id: String },
    /// Replace the local cart with the server's
    Sync,
}

/// Shipping address fields.
#[derive(Args, Debug, Default)]
pub struct AddressArgs {
    #[arg(long)]
    pub full_name: Option<String>,
    #[arg(long)]
    pub line1: Option<String>,
    #[arg(long)]
    pub line2: Option<String>,
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long)]
    pub state: Option<String>,
    /// Six-digit PIN code
    #[arg(long)]
    pub postal_code: Option<String>,
    /// Ten-digit mobile number
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub country: Option<String>,
}

impl AddressArgs {
    /// The address form, or `None` if no field was given.
    pub fn to_form(&self) -> Option<AddressForm> {
        let given = [
            &self.full_name,
            &self.line1,
            &self.city,
            &self.state,
            &self.postal_code,
            &self.phone,
        ]
        .iter()
        .any(|f| f.is_some());
        if !given {
            return None;
        }

        Some(AddressForm {
            full_name: self.full_name.clone().unwrap_or_default(),
            line1: self.line1.clone().unwrap_or_default(),
            line2: self.line2.clone(),
            city: self.city.clone().unwrap_or_default(),
            state: self.state.clone().unwrap_or_default(),
            postal_code: self.postal_code.clone().unwrap_or_default(),
            phone: self.phone.clone().unwrap_or_default(),
            country: self.country.clone(),
        })
    }
}

#[derive(Subcommand)]
pub enum AddressCommand {
    /// Saved addresses
    List,
    /// Save a new address
    Add {
        #[command(flatten)]
        address: AddressArgs,
        /// Make this the default address
        #[arg(long)]
        default: bool,
    },
    /// Delete a saved address
    Delete { id: String },
}

#[derive(Args)]
#[command(group = clap::ArgGroup::new("method").required(true).args(["cod", "card"]))]
pub struct CheckoutArgs {
    /// Pay cash on delivery
    #[arg(long)]
    pub cod: bool,
    /// Pay by card
    #[arg(long, requires = "payment_ref")]
    pub card: bool,
    /// Gateway reference of the completed card payment
    #[arg(long)]
    pub payment_ref: Option<String>,
    /// Ship to this saved address (default: the default address)
    #[arg(long, conflicts_with = "full_name")]
    pub address_id: Option<String>,
    #[command(flatten)]
    pub address: AddressArgs,
}

#[derive(Subcommand)]
pub enum OrderCommand {
    /// Your orders
    List,
    /// One order in detail
    Show { id: String },
    /// Cancel an order that has not shipped
    Cancel { id: String },
}

#[derive(Args)]
pub struct ContactArgs {
    #[arg(short, long)]
    pub name: String,
    #[arg(short, long)]
    pub email: String,
    #[arg(short, long)]
    pub subject: Option<String>,
    #[arg(short, long)]
    pub message: String,
}

#[derive(Subcommand)]
pub enum AdminCommand {
    /// Store-wide statistics
    Dashboard,
    /// All accounts
    Users,
    /// Change an account's role
    SetRole {
        user_id: String,
        /// `user` or `admin`
        role: UserRole,
    },
    /// Delete an account
    DeleteUser { user_id: String },
    /// All orders
    Orders {
        #[arg(long)]
        status: Option<OrderStatus>,
    },
    /// Move an order to a new status
    SetOrderStatus { order_id: String, status: OrderStatus },
    /// All products
    Products,
    /// Create a product
    CreateProduct {
        #[arg(long)]
        name: String,
        /// Price in rupees
        #[arg(long)]
        price: i64,
        #[arg(long, allow_negative_numbers = true)]
        stock: i64,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        brand: Option<String>,
        #[arg(long)]
        category: Option<String>,
        /// Image URL (repeatable)
        #[arg(long = "image")]
        images: Vec<String>,
        #[arg(long)]
        featured: bool,
        #[arg(long)]
        size_ml: Option<u32>,
        #[arg(long)]
        gender: Option<String>,
    },
    /// Delete a product
    DeleteProduct { product_id: String },
    /// Upload a product image and print its URL
    UploadImage { path: std::path::PathBuf },
    /// Contact form messages
    Messages,
    /// Delete a contact form message
    DeleteMessage { message_id: String },
}
