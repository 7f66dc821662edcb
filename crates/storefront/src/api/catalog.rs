//! Product catalog reads, cached for 5 minutes.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use candleworks_core::ProductId;

use super::{ApiClient, ApiError, parse_json};

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub image: String,
}

/// A product review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub product: String,
    pub rating: u8,
    pub comment: String,
    pub author: String,
}

/// Cached catalog responses.
#[derive(Debug, Clone)]
pub(crate) enum CacheValue {
    Products(Arc<Vec<Product>>),
    Reviews(Arc<Vec<Review>>),
}

const PRODUCTS_KEY: &str = "products";
const REVIEWS_KEY: &str = "reviews";

impl ApiClient {
    /// Fetch the product catalog (`GET /products/`), cached for 5 minutes.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure, a non-success status, or a
    /// malformed body. Cached entries never error.
    pub async fn products(&self) -> Result<Arc<Vec<Product>>, ApiError> {
        if let Some(CacheValue::Products(products)) =
            self.catalog_cache().get(PRODUCTS_KEY).await
        {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let response = self.get("products/").await?;
        let products: Arc<Vec<Product>> = Arc::new(parse_json(response).await?);
        self.catalog_cache()
            .insert(PRODUCTS_KEY.to_string(), CacheValue::Products(products.clone()))
            .await;
        Ok(products)
    }

    /// Fetch product reviews (`GET /reviews/`), cached for 5 minutes.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure, a non-success status, or a
    /// malformed body. Cached entries never error.
    pub async fn reviews(&self) -> Result<Arc<Vec<Review>>, ApiError> {
        if let Some(CacheValue::Reviews(reviews)) = self.catalog_cache().get(REVIEWS_KEY).await {
            debug!("Cache hit for reviews");
            return Ok(reviews);
        }

        let response = self.get("reviews/").await?;
        let reviews: Arc<Vec<Review>> = Arc::new(parse_json(response).await?);
        self.catalog_cache()
            .insert(REVIEWS_KEY.to_string(), CacheValue::Reviews(reviews.clone()))
            .await;
        Ok(reviews)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_deserialize() {
        let json = r#"{"id": 1, "name": "Lavender Bliss", "price": "25", "image": "/images/i1.jpg"}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, ProductId::new(1));
        assert_eq!(product.price, Decimal::new(25, 0));
    }
}
