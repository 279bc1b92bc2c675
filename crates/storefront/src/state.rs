//! The storefront object shared by every front end.

use std::sync::Arc;

use scentbox_core::{ProductId, ShippingAddress};
use secrecy::SecretString;
use tracing::{info, warn};

use crate::api::{ApiClient, SavedAddress, User};
use crate::cart_store::{CartStore, SyncOutcome, read_cart_file, write_cart_file};
use crate::checkout::{CheckoutFlow, Confirmation, PaymentGateway};
use crate::config::StorefrontConfig;
use crate::error::Result;
use crate::session::{FileTokenStore, SessionError, SessionManager, TokenStore};

/// Owns the API client, the session and the cart.
///
/// There is exactly one writer: every mutation takes `&mut self`.
#[derive(Debug)]
pub struct Storefront {
    config: StorefrontConfig,
    api: ApiClient,
    session: SessionManager,
    cart: CartStore<ApiClient>,
}

impl Storefront {
    /// Create a storefront with an empty cart and no session.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: StorefrontConfig, store: Arc<dyn TokenStore>) -> Result<Self> {
        let api = ApiClient::with_token_store(&config, Arc::clone(&store))?;
        Ok(Self {
            session: SessionManager::new(api.clone(), store),
            cart: CartStore::new(api.clone()),
            api,
            config,
        })
    }

    /// Open the storefront from its session directory: restore the saved
    /// session and the locally saved cart.
    ///
    /// An expired session is dropped along with the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the session or cart files cannot be read, or the
    /// session check fails for a reason other than expiry or being offline.
    pub async fn open(config: StorefrontConfig) -> Result<Self> {
        let store: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new(config.session_file()));
        let saved_cart = read_cart_file(&config.cart_file())?;

        let mut storefront = Self::new(config, store)?;
        match storefront.session.restore().await {
            Ok(Some(user)) => {
                info!(user_id = %user.id, "Session restored");
                storefront.cart = CartStore::with_cart(storefront.api.clone(), saved_cart);
            }
            Ok(None) => {}
            Err(SessionError::Expired) => {
                warn!("Stored session expired, signing out");
                storefront.save_local_cart()?;
            }
            Err(e) => return Err(e.into()),
        }
        Ok(storefront)
    }

    pub const fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    pub const fn cart(&self) -> &CartStore<ApiClient> {
        &self.cart
    }

    pub const fn cart_mut(&mut self) -> &mut CartStore<ApiClient> {
        &mut self.cart
    }

    /// The signed-in user, if any.
    pub async fn current_user(&self) -> Option<&User> {
        self.session.current_user().await
    }

    /// Sign in and adopt the server cart.
    ///
    /// # Errors
    ///
    /// Returns the session error if sign-in fails. A failure to load the
    /// cart afterwards is logged, not returned.
    pub async fn login(&mut self, email: &str, password: &SecretString) -> Result<User> {
        let user = self.session.login(email, password).await?;
        self.load_server_cart().await;
        Ok(user)
    }

    /// Create an account, sign in and adopt the (empty) server cart.
    ///
    /// # Errors
    ///
    /// Returns the session error if registration fails.
    pub async fn register(
        &mut self,
        name: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<User> {
        let user = self.session.register(name, email, password).await?;
        self.load_server_cart().await;
        Ok(user)
    }

    /// Sign out and forget the local cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the session or cart file cannot be removed.
    pub async fn logout(&mut self) -> Result<()> {
        self.session.logout().await?;
        self.cart.on_logout();
        self.save_local_cart()
    }

    /// Add a product by id, looking up its current price and stock.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no session, the product cannot be
    /// fetched, or the cart rejects it.
    pub async fn add_to_cart(&mut self, product_id: &ProductId, quantity: u32) -> Result<SyncOutcome> {
        let product = self.api.get_product(product_id).await?;
        let outcome = self.cart.add(&product.snapshot(), quantity).await?;
        self.save_local_cart()?;
        Ok(outcome)
    }

    /// Start a checkout attempt against the backend.
    #[must_use]
    pub fn checkout(&self) -> CheckoutFlow<ApiClient> {
        CheckoutFlow::new(self.api.clone(), self.config.pricing)
    }

    /// Begin `flow` with the current cart and an optional saved address.
    ///
    /// # Errors
    ///
    /// Returns a transition error if `flow` already started.
    pub fn begin_checkout(
        &self,
        flow: &mut CheckoutFlow<ApiClient>,
        saved: Option<&SavedAddress>,
    ) -> Result<Option<ShippingAddress>> {
        flow.begin(self.cart.cart(), saved)?;
        Ok(flow.address().cloned())
    }

    /// Place a cash-on-delivery order for the cart.
    ///
    /// # Errors
    ///
    /// Returns the checkout error; the cart is kept on failure.
    pub async fn place_cod_order(
        &mut self,
        flow: &mut CheckoutFlow<ApiClient>,
    ) -> Result<Confirmation> {
        let confirmation = flow.place_cod_order(self.cart.cart_mut()).await?;
        self.save_local_cart()?;
        Ok(confirmation)
    }

    /// Pay for the cart by card.
    ///
    /// # Errors
    ///
    /// Returns the checkout error; the cart is kept on failure.
    pub async fn pay_by_card<G: PaymentGateway>(
        &mut self,
        flow: &mut CheckoutFlow<ApiClient>,
        gateway: &G,
    ) -> Result<Confirmation> {
        let confirmation = flow.pay_by_card(self.cart.cart_mut(), gateway).await?;
        self.save_local_cart()?;
        Ok(confirmation)
    }

    /// Persist the cart to the session directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_local_cart(&self) -> Result<()> {
        write_cart_file(&self.config.cart_file(), self.cart.cart())?;
        Ok(())
    }

    async fn load_server_cart(&mut self) {
        if let Err(e) = self.cart.load().await {
            warn!(error = %e, "Could not load server cart");
        }
        if let Err(e) = self.save_local_cart() {
            warn!(error = %e, "Could not save cart");
        }
    }
}
