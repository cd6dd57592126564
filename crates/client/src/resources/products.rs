//! Product catalog.

use salesdesk_core::{NewProduct, Page, PageRequest, Product, ProductFilter, ProductId, ProductUpdate};
use tracing::{debug, instrument};

use super::Collection;
use crate::error::ClientError;
use crate::http::{HttpClient, QueryParams, Transport};
use crate::store::KeyValueStore;

const PRODUCTS: Collection = Collection {
    path: "/v1/products",
    plural: "products",
    singular: "product",
};

/// Client for `/v1/products`.
pub struct ProductsClient<K, T> {
    http: HttpClient<K, T>,
}

impl<K, T> Clone for ProductsClient<K, T> {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
        }
    }
}

impl<K: KeyValueStore, T: Transport> ProductsClient<K, T> {
    #[must_use]
    pub const fn new(http: HttpClient<K, T>) -> Self {
        Self { http }
    }

    /// List products matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns the mapped status, transport or decode error.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: &ProductFilter,
        page: &PageRequest,
    ) -> Result<Page<Product>, ClientError> {
        let params = QueryParams::new().with(filter.pairs()).with(page.pairs());
        PRODUCTS.list(&self.http, &params).await
    }

    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] for an unknown id, or another mapped error.
    #[instrument(skip(self))]
    pub async fn get(&self, id: ProductId) -> Result<Product, ClientError> {
        PRODUCTS.get(&self.http, id).await
    }

    /// # Errors
    ///
    /// Returns [`ClientError::LocalValidation`] for a blank name, otherwise
    /// the mapped server error.
    #[instrument(skip(self, product), fields(name = %product.name))]
    pub async fn create(&self, product: &NewProduct) -> Result<Product, ClientError> {
        if product.name.trim().is_empty() {
            return Err(ClientError::LocalValidation(
                "name must be provided".to_string(),
            ));
        }
        PRODUCTS.create(&self.http, &product.to_wire()).await
    }

    /// Send only the fields of `update` that differ from `current`.
    ///
    /// With nothing to change no request is made and `current` is returned.
    ///
    /// # Errors
    ///
    /// Returns the mapped status, transport or decode error.
    #[instrument(skip(self, current, update), fields(id = %current.id))]
    pub async fn update(
        &self,
        current: &Product,
        update: &ProductUpdate,
    ) -> Result<Product, ClientError> {
        let diff = current.diff(update);
        if diff.is_empty() {
            debug!("Product unchanged, skipping update");
            return Ok(current.clone());
        }
        PRODUCTS.update(&self.http, current.id, &diff.to_wire()).await
    }

    /// # Errors
    ///
    /// Returns the mapped status or transport error.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: ProductId) -> Result<(), ClientError> {
        PRODUCTS.delete(&self.http, id).await
    }
}
