use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{ProductError, ProductResult};
use crate::models::{NewProduct, Product, ProductChanges};

/// Persistence for product rows.
///
/// Listing order is `created_at` descending, ties broken by `id` descending.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn create(&self, input: NewProduct) -> ProductResult<Product>;

    async fn get_by_id(&self, id: Uuid) -> ProductResult<Option<Product>>;

    /// One page (1-based) plus the total number of products
    async fn list(&self, page: u64, per_page: u64) -> ProductResult<(Vec<Product>, u64)>;

    /// Fails with [`ProductError::NotFound`] when the row is gone
    async fn update(&self, id: Uuid, changes: ProductChanges) -> ProductResult<Product>;

    /// `false` when there was no such row
    async fn delete(&self, id: Uuid) -> ProductResult<bool>;

    /// Number of rows whose `image` is `name`
    async fn count_by_image(&self, name: &str) -> ProductResult<u64>;
}

/// Row offset of `page` (1-based), or `None` when the page starts at or past
/// the end of `total` rows or the offset does not fit in a `u64`
pub fn page_offset(page: u64, per_page: u64, total: u64) -> Option<u64> {
    page.saturating_sub(1)
        .checked_mul(per_page)
        .filter(|offset| *offset < total)
}

/// In-memory implementation for tests and local runs
#[derive(Clone, Default)]
pub struct InMemoryProductRepository {
    products: Arc<RwLock<HashMap<Uuid, Product>>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create(&self, input: NewProduct) -> ProductResult<Product> {
        let product = Product::new(input);
        self.products
            .write()
            .await
            .insert(product.id, product.clone());

        tracing::info!(product_id = %product.id, "Created product");
        Ok(product)
    }

    async fn get_by_id(&self, id: Uuid) -> ProductResult<Option<Product>> {
        Ok(self.products.read().await.get(&id).cloned())
    }

    async fn list(&self, page: u64, per_page: u64) -> ProductResult<(Vec<Product>, u64)> {
        let products = self.products.read().await;

        let mut all: Vec<&Product> = products.values().collect();
        all.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        let total = products.len() as u64;
        let Some(offset) = page_offset(page, per_page, total) else {
            return Ok((Vec::new(), total));
        };

        let data = all
            .into_iter()
            .skip(offset as usize)
            .take(per_page as usize)
            .cloned()
            .collect();

        Ok((data, total))
    }

    async fn update(&self, id: Uuid, changes: ProductChanges) -> ProductResult<Product> {
        let mut products = self.products.write().await;
        let product = products.get_mut(&id).ok_or(ProductError::NotFound(id))?;

        product.apply_changes(changes);

        tracing::info!(product_id = %id, "Updated product");
        Ok(product.clone())
    }

    async fn delete(&self, id: Uuid) -> ProductResult<bool> {
        let removed = self.products.write().await.remove(&id).is_some();
        if removed {
            tracing::info!(product_id = %id, "Deleted product");
        }
        Ok(removed)
    }

    async fn count_by_image(&self, name: &str) -> ProductResult<u64> {
        let products = self.products.read().await;
        Ok(products.values().filter(|p| p.image == name).count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProductFields;

    fn new_product(title: &str) -> NewProduct {
        NewProduct {
            image: format!("{}.png", title.to_lowercase()),
            fields: ProductFields {
                title: title.to_string(),
                description: "A sturdy piece".to_string(),
                price: 10.0,
                stock: 1,
            },
        }
    }

    #[tokio::test]
    async fn test_list_is_newest_first_and_paged() {
        let repo = InMemoryProductRepository::new();
        for i in 0..12 {
            repo.create(new_product(&format!("Item{i:02}"))).await.unwrap();
        }

        let (first, total) = repo.list(1, 10).await.unwrap();
        assert_eq!(total, 12);
        assert_eq!(first.len(), 10);
        assert_eq!(first[0].title, "Item11");

        let (second, _) = repo.list(2, 10).await.unwrap();
        assert_eq!(second.len(), 2);
        assert_eq!(second[1].title, "Item00");

        let (beyond, total) = repo.list(3, 10).await.unwrap();
        assert!(beyond.is_empty());
        assert_eq!(total, 12);
    }

    #[tokio::test]
    async fn test_list_huge_page_is_empty() {
        let repo = InMemoryProductRepository::new();
        repo.create(new_product("Chair")).await.unwrap();

        let (data, total) = repo.list(u64::MAX, 10).await.unwrap();
        assert!(data.is_empty());
        assert_eq!(total, 1);
    }

    #[test]
    fn test_page_offset() {
        assert_eq!(page_offset(1, 10, 12), Some(0));
        assert_eq!(page_offset(2, 10, 12), Some(10));
        assert_eq!(page_offset(3, 10, 12), None);
        assert_eq!(page_offset(1, 10, 0), None);
        assert_eq!(page_offset(i64::MAX as u64, 10, 12), None);
        assert_eq!(page_offset(u64::MAX, 10, u64::MAX), None);
    }

    #[tokio::test]
    async fn test_count_by_image() {
        let repo = InMemoryProductRepository::new();
        repo.create(new_product("Chair")).await.unwrap();
        repo.create(new_product("Chair")).await.unwrap();
        repo.create(new_product("Table")).await.unwrap();

        assert_eq!(repo.count_by_image("chair.png").await.unwrap(), 2);
        assert_eq!(repo.count_by_image("table.png").await.unwrap(), 1);
        assert_eq!(repo.count_by_image("lamp.png").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let repo = InMemoryProductRepository::new();
        let changes = ProductChanges {
            fields: new_product("Chair").fields,
            image: None,
        };

        let err = repo.update(Uuid::now_v7(), changes).await.unwrap_err();
        assert!(matches!(err, ProductError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_reports_whether_row_existed() {
        let repo = InMemoryProductRepository::new();
        let product = repo.create(new_product("Chair")).await.unwrap();

        assert!(repo.delete(product.id).await.unwrap());
        assert!(!repo.delete(product.id).await.unwrap());
        assert!(repo.get_by_id(product.id).await.unwrap().is_none());
    }
}
