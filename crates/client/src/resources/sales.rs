//! Sale records, plus the lookups a sale form needs.

use salesdesk_core::{
    NewSale, Page, PageRequest, Product, ProductFilter, Sale, SaleFilter, SaleId, SaleUpdate,
    User, UserFilter,
};
use tracing::{debug, instrument, warn};

use super::Collection;
use super::products::ProductsClient;
use super::users::UsersClient;
use crate::error::ClientError;
use crate::http::{HttpClient, QueryParams, Transport};
use crate::store::KeyValueStore;

const SALES: Collection = Collection {
    path: "/v1/sales",
    plural: "sales",
    singular: "sale",
};

/// Page size used when loading dropdown choices.
const CHOICES_PAGE_SIZE: u32 = 100;

/// Choices for the user and product pickers on a sale form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormOptions {
    pub users: Vec<User>,
    pub products: Vec<Product>,
}

/// Everything needed to edit one sale.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleEditContext {
    pub sale: Sale,
    pub options: FormOptions,
}

/// Client for `/v1/sales`.
pub struct SalesClient<K, T> {
    http: HttpClient<K, T>,
}

impl<K, T> Clone for SalesClient<K, T> {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
        }
    }
}

impl<K: KeyValueStore, T: Transport> SalesClient<K, T> {
    #[must_use]
    pub const fn new(http: HttpClient<K, T>) -> Self {
        Self { http }
    }

    /// List sales matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns the mapped status, transport or decode error.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: &SaleFilter,
        page: &PageRequest,
    ) -> Result<Page<Sale>, ClientError> {
        let params = QueryParams::new().with(filter.pairs()).with(page.pairs());
        SALES.list(&self.http, &params).await
    }

    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] for an unknown id, or another mapped error.
    #[instrument(skip(self))]
    pub async fn get(&self, id: SaleId) -> Result<Sale, ClientError> {
        SALES.get(&self.http, id).await
    }

    /// Record a sale. The server computes the total.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::LocalValidation`] for a non-positive quantity,
    /// otherwise the mapped server error.
    #[instrument(skip(self, sale), fields(product_id = %sale.product_id, quantity = sale.quantity))]
    pub async fn create(&self, sale: &NewSale) -> Result<Sale, ClientError> {
        if sale.quantity <= 0 {
            return Err(ClientError::LocalValidation(
                "quantity must be greater than zero".to_string(),
            ));
        }
        SALES.create(&self.http, &sale.to_wire()).await
    }

    /// Send only the fields of `update` that differ from `current`.
    ///
    /// With nothing to change no request is made and `current` is returned.
    ///
    /// # Errors
    ///
    /// Returns the mapped status, transport or decode error.
    #[instrument(skip(self, current, update), fields(id = %current.id))]
    pub async fn update(&self, current: &Sale, update: &SaleUpdate) -> Result<Sale, ClientError> {
        let diff = current.diff(update);
        if diff.is_empty() {
            debug!("Sale unchanged, skipping update");
            return Ok(current.clone());
        }
        SALES.update(&self.http, current.id, &diff.to_wire()).await
    }

    /// # Errors
    ///
    /// Returns the mapped status or transport error.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: SaleId) -> Result<(), ClientError> {
        SALES.delete(&self.http, id).await
    }

    // =========================================================================
    // Form support
    // =========================================================================

    /// Users for the seller picker. Any failure yields an empty list.
    #[instrument(skip(self))]
    pub async fn list_all_users(&self) -> Vec<User> {
        let users = UsersClient::new(self.http.clone());
        match users
            .list(&UserFilter::default(), &choices_page())
            .await
        {
            Ok(page) => page.items,
            Err(e) => {
                warn!(error = %e, "Could not load users for sale form");
                Vec::new()
            }
        }
    }

    /// Products for the product picker. Any failure yields an empty list.
    #[instrument(skip(self))]
    pub async fn list_all_products(&self) -> Vec<Product> {
        let products = ProductsClient::new(self.http.clone());
        match products
            .list(&ProductFilter::default(), &choices_page())
            .await
        {
            Ok(page) => page.items,
            Err(e) => {
                warn!(error = %e, "Could not load products for sale form");
                Vec::new()
            }
        }
    }

    /// Load both picker lists concurrently.
    pub async fn form_options(&self) -> FormOptions {
        let (users, products) = tokio::join!(self.list_all_users(), self.list_all_products());
        FormOptions { users, products }
    }

    /// Load a sale and the form choices concurrently.
    ///
    /// # Errors
    ///
    /// Fails if the sale cannot be loaded; the choice lists never fail.
    #[instrument(skip(self))]
    pub async fn edit_context(&self, id: SaleId) -> Result<SaleEditContext, ClientError> {
        let (sale, options) = tokio::join!(self.get(id), self.form_options());
        Ok(SaleEditContext {
            sale: sale?,
            options,
        })
    }
}

fn choices_page() -> PageRequest {
    PageRequest {
        page_size: Some(CHOICES_PAGE_SIZE),
        ..PageRequest::default()
    }
}
