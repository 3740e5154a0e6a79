//! Product Service - orchestrates validation, image storage and persistence

use std::sync::Arc;
use storage::{BlobStorage, StorageError};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::error::{ProductError, ProductResult};
use crate::image::image_key;
use crate::models::{NewProduct, PER_PAGE, Product, ProductChanges, ProductForm, ProductPage};
use crate::repository::ProductRepository;
use crate::validation::{ValidatedImage, image_required, validate_create, validate_update};

/// Key looked up by [`ProductService::check_storage`]
const STORAGE_CHECK_KEY: &str = "products/.ready";

/// Product operations over a repository and a blob store.
///
/// The image blob is always written or removed before the row changes, so a
/// storage failure leaves the row as it was. A crash between the two steps
/// can leave an orphaned blob.
///
/// Blobs are named by content hash, so products uploaded with the same file
/// share one blob. It is only removed once no other row references it.
pub struct ProductService<R: ProductRepository, S: BlobStorage> {
    repository: Arc<R>,
    storage: Arc<S>,
}

impl<R: ProductRepository, S: BlobStorage> Clone for ProductService<R, S> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            storage: Arc::clone(&self.storage),
        }
    }
}

impl<R: ProductRepository, S: BlobStorage> ProductService<R, S> {
    pub fn new(repository: R, storage: S) -> Self {
        Self {
            repository: Arc::new(repository),
            storage: Arc::new(storage),
        }
    }

    /// Page `page` (1-based, values below 1 mean 1) of up to 10 products
    #[instrument(skip(self))]
    pub async fn list_products(&self, page: u64) -> ProductResult<ProductPage> {
        let page = page.max(1);
        let (data, total) = self.repository.list(page, PER_PAGE).await?;
        Ok(ProductPage::new(data, total, page, PER_PAGE))
    }

    /// Validate, store the image under its content hash, then insert the row
    #[instrument(skip(self, form), fields(image = tracing::field::Empty))]
    pub async fn create_product(&self, form: ProductForm) -> ProductResult<Product> {
        let validated = validate_create(form)?;
        let image = validated.image.ok_or_else(image_required)?;

        let name = self.store_image(&image).await?;
        tracing::Span::current().record("image", name.as_str());

        self.repository
            .create(NewProduct {
                image: name,
                fields: validated.fields,
            })
            .await
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: Uuid) -> ProductResult<Product> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(ProductError::NotFound(id))
    }

    /// Replace the text fields and, when a new file is given, the image.
    ///
    /// Existence is checked before validation, so an unknown id is reported
    /// as not found even with an invalid form.
    #[instrument(skip(self, form))]
    pub async fn update_product(&self, id: Uuid, form: ProductForm) -> ProductResult<Product> {
        let existing = self.get_product(id).await?;
        let validated = validate_update(form)?;

        let image = match validated.image {
            Some(image) => {
                if image.stored_name() != existing.image {
                    self.remove_image(&existing.image).await?;
                }
                Some(self.store_image(&image).await?)
            }
            None => None,
        };

        self.repository
            .update(
                id,
                ProductChanges {
                    fields: validated.fields,
                    image,
                },
            )
            .await
    }

    /// Remove the image blob, then the row
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: Uuid) -> ProductResult<()> {
        let existing = self.get_product(id).await?;
        self.remove_image(&existing.image).await?;

        if !self.repository.delete(id).await? {
            return Err(ProductError::NotFound(id));
        }
        Ok(())
    }

    /// The product together with its image bytes
    #[instrument(skip(self))]
    pub async fn get_product_image(&self, id: Uuid) -> ProductResult<(Product, Vec<u8>)> {
        let product = self.get_product(id).await?;

        match self.storage.get(&image_key(&product.image)).await {
            Ok(bytes) => Ok((product, bytes)),
            Err(StorageError::NotFound(_)) => Err(ProductError::ImageNotFound {
                id,
                image: product.image,
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Readiness check: the blob store answers a lookup without error
    pub async fn check_storage(&self) -> ProductResult<()> {
        self.storage.exists(STORAGE_CHECK_KEY).await?;
        Ok(())
    }

    async fn store_image(&self, image: &ValidatedImage) -> ProductResult<String> {
        let name = image.stored_name();
        self.storage.put(&image_key(&name), &image.bytes).await?;
        debug!(image = %name, size = image.bytes.len(), "Stored product image");
        Ok(name)
    }

    /// Delete a stored image unless another product still uses it.
    /// A blob that is already gone is not an error.
    async fn remove_image(&self, name: &str) -> ProductResult<()> {
        let references = self.repository.count_by_image(name).await?;
        if references > 1 {
            debug!(image = %name, references, "Product image still shared, keeping blob");
            return Ok(());
        }

        match self.storage.delete(&image_key(name)).await {
            Ok(()) => {
                debug!(image = %name, "Removed product image");
                Ok(())
            }
            Err(StorageError::NotFound(key)) => {
                debug!(%key, "Product image already absent");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ImageUpload;
    use crate::repository::MockProductRepository;
    use async_trait::async_trait;
    use chrono::Utc;
    use mockall::predicate::eq;
    use storage::{InMemoryBlobStorage, StorageResult};

    /// Blob store whose writes and deletes fail with an I/O error
    struct FailingStorage;

    #[async_trait]
    impl BlobStorage for FailingStorage {
        async fn put(&self, _key: &str, _bytes: &[u8]) -> StorageResult<()> {
            Err(std::io::Error::other("disk full").into())
        }

        async fn get(&self, key: &str) -> StorageResult<Vec<u8>> {
            Err(StorageError::NotFound(key.to_string()))
        }

        async fn delete(&self, _key: &str) -> StorageResult<()> {
            Err(std::io::Error::other("read-only file system").into())
        }

        async fn exists(&self, _key: &str) -> StorageResult<bool> {
            Err(std::io::Error::other("permission denied").into())
        }
    }

    fn png() -> Vec<u8> {
        let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        bytes.resize(10 * 1024, 1);
        bytes
    }

    fn form(image: Option<Vec<u8>>) -> ProductForm {
        ProductForm {
            title: Some("Chair".into()),
            description: Some("A nice chair".into()),
            price: Some("49.99".into()),
            stock: Some("10".into()),
            image: image.map(|bytes| ImageUpload {
                file_name: Some("chair.png".into()),
                content_type: Some("image/png".into()),
                bytes,
            }),
        }
    }

    fn stored(id: Uuid, image: &str) -> Product {
        Product {
            id,
            image: image.to_string(),
            title: "Chair".into(),
            description: "A nice chair".into(),
            price: 49.99,
            stock: 10,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn echo_update(mock: &mut MockProductRepository, current: Product) {
        mock.expect_update().returning(move |_, changes| {
            let mut product = current.clone();
            product.apply_changes(changes);
            Ok(product)
        });
    }

    #[tokio::test]
    async fn test_list_products_clamps_page_and_builds_metadata() {
        let mut mock_repo = MockProductRepository::new();
        mock_repo
            .expect_list()
            .with(eq(1), eq(PER_PAGE))
            .returning(|_, _| Ok((vec![], 21)));

        let service = ProductService::new(mock_repo, InMemoryBlobStorage::new());
        let page = service.list_products(0).await.unwrap();

        assert_eq!(page.page, 1);
        assert_eq!(page.per_page, 10);
        assert_eq!(page.total, 21);
        assert_eq!(page.last_page, 3);
    }

    #[tokio::test]
    async fn test_create_stores_blob_under_content_hash() {
        let mut mock_repo = MockProductRepository::new();
        mock_repo
            .expect_create()
            .times(1)
            .returning(|input| Ok(Product::new(input)));

        let storage = InMemoryBlobStorage::new();
        let service = ProductService::new(mock_repo, storage.clone());

        let bytes = png();
        let product = service.create_product(form(Some(bytes.clone()))).await.unwrap();

        let expected = crate::image::content_hash_name(&bytes, "png");
        assert_eq!(product.image, expected);
        assert_eq!(storage.get(&format!("products/{expected}")).await.unwrap(), bytes);
    }

    #[tokio::test]
    async fn test_create_invalid_form_touches_nothing() {
        let mut mock_repo = MockProductRepository::new();
        mock_repo.expect_create().never();

        let storage = InMemoryBlobStorage::new();
        let service = ProductService::new(mock_repo, storage.clone());

        let err = service.create_product(form(None)).await.unwrap_err();
        assert!(matches!(err, ProductError::Validation(_)));
        assert!(storage.is_empty().await);
    }

    #[tokio::test]
    async fn test_create_storage_failure_writes_no_row() {
        let mut mock_repo = MockProductRepository::new();
        mock_repo.expect_create().never();

        let service = ProductService::new(mock_repo, FailingStorage);
        let err = service.create_product(form(Some(png()))).await.unwrap_err();

        assert!(matches!(err, ProductError::Storage(StorageError::Io(_))));
    }

    #[tokio::test]
    async fn test_get_product_not_found() {
        let mut mock_repo = MockProductRepository::new();
        mock_repo.expect_get_by_id().returning(|_| Ok(None));

        let service = ProductService::new(mock_repo, InMemoryBlobStorage::new());
        let id = Uuid::now_v7();

        let err = service.get_product(id).await.unwrap_err();
        assert!(matches!(err, ProductError::NotFound(missing) if missing == id));
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found_before_validation() {
        let mut mock_repo = MockProductRepository::new();
        mock_repo.expect_get_by_id().returning(|_| Ok(None));
        mock_repo.expect_update().never();

        let service = ProductService::new(mock_repo, InMemoryBlobStorage::new());
        let err = service
            .update_product(Uuid::now_v7(), ProductForm::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ProductError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_without_image_keeps_blob() {
        let id = Uuid::now_v7();
        let current = stored(id, "old.png");

        let mut mock_repo = MockProductRepository::new();
        let found = current.clone();
        mock_repo
            .expect_get_by_id()
            .with(eq(id))
            .returning(move |_| Ok(Some(found.clone())));
        echo_update(&mut mock_repo, current);

        let storage = InMemoryBlobStorage::new();
        storage.put("products/old.png", b"old").await.unwrap();
        let service = ProductService::new(mock_repo, storage.clone());

        let mut changes = form(None);
        changes.price = Some("39.99".into());
        let product = service.update_product(id, changes).await.unwrap();

        assert_eq!(product.image, "old.png");
        assert_eq!(product.price, 39.99);
        assert_eq!(storage.keys().await, vec!["products/old.png"]);
    }

    #[tokio::test]
    async fn test_update_with_image_replaces_blob() {
        let id = Uuid::now_v7();
        let current = stored(id, "old.png");

        let mut mock_repo = MockProductRepository::new();
        let found = current.clone();
        mock_repo
            .expect_get_by_id()
            .returning(move |_| Ok(Some(found.clone())));
        mock_repo.expect_count_by_image().returning(|_| Ok(1));
        echo_update(&mut mock_repo, current);

        let storage = InMemoryBlobStorage::new();
        storage.put("products/old.png", b"old").await.unwrap();
        let service = ProductService::new(mock_repo, storage.clone());

        let product = service.update_product(id, form(Some(png()))).await.unwrap();

        assert_ne!(product.image, "old.png");
        assert_eq!(storage.keys().await, vec![format!("products/{}", product.image)]);
    }

    #[tokio::test]
    async fn test_update_with_image_tolerates_missing_old_blob() {
        let id = Uuid::now_v7();
        let current = stored(id, "gone.png");

        let mut mock_repo = MockProductRepository::new();
        let found = current.clone();
        mock_repo
            .expect_get_by_id()
            .returning(move |_| Ok(Some(found.clone())));
        mock_repo.expect_count_by_image().returning(|_| Ok(1));
        echo_update(&mut mock_repo, current);

        let storage = InMemoryBlobStorage::new();
        let service = ProductService::new(mock_repo, storage.clone());

        let product = service.update_product(id, form(Some(png()))).await.unwrap();
        assert_eq!(storage.len().await, 1);
        assert!(product.image.ends_with(".png"));
    }

    #[tokio::test]
    async fn test_delete_removes_blob_then_row() {
        let id = Uuid::now_v7();
        let found = stored(id, "abc.png");

        let mut mock_repo = MockProductRepository::new();
        mock_repo
            .expect_get_by_id()
            .returning(move |_| Ok(Some(found.clone())));
        mock_repo.expect_count_by_image().returning(|_| Ok(1));
        mock_repo
            .expect_delete()
            .with(eq(id))
            .times(1)
            .returning(|_| Ok(true));

        let storage = InMemoryBlobStorage::new();
        storage.put("products/abc.png", b"png").await.unwrap();
        let service = ProductService::new(mock_repo, storage.clone());

        service.delete_product(id).await.unwrap();
        assert!(storage.is_empty().await);
    }

    #[tokio::test]
    async fn test_delete_storage_failure_keeps_row() {
        let id = Uuid::now_v7();
        let found = stored(id, "abc.png");

        let mut mock_repo = MockProductRepository::new();
        mock_repo
            .expect_get_by_id()
            .returning(move |_| Ok(Some(found.clone())));
        mock_repo.expect_count_by_image().returning(|_| Ok(1));
        mock_repo.expect_delete().never();

        let service = ProductService::new(mock_repo, FailingStorage);
        let err = service.delete_product(id).await.unwrap_err();

        assert!(matches!(err, ProductError::Storage(StorageError::Io(_))));
    }

    #[tokio::test]
    async fn test_delete_keeps_blob_shared_with_another_product() {
        let id = Uuid::now_v7();
        let found = stored(id, "abc.png");

        let mut mock_repo = MockProductRepository::new();
        mock_repo
            .expect_get_by_id()
            .returning(move |_| Ok(Some(found.clone())));
        mock_repo
            .expect_count_by_image()
            .withf(|name| name == "abc.png")
            .returning(|_| Ok(2));
        mock_repo.expect_delete().times(1).returning(|_| Ok(true));

        let storage = InMemoryBlobStorage::new();
        storage.put("products/abc.png", b"png").await.unwrap();
        let service = ProductService::new(mock_repo, storage.clone());

        service.delete_product(id).await.unwrap();
        assert_eq!(storage.keys().await, vec!["products/abc.png"]);
    }

    #[tokio::test]
    async fn test_update_with_same_image_keeps_blob() {
        let bytes = png();
        let name = crate::image::content_hash_name(&bytes, "png");
        let id = Uuid::now_v7();
        let current = stored(id, &name);

        let mut mock_repo = MockProductRepository::new();
        let found = current.clone();
        mock_repo
            .expect_get_by_id()
            .returning(move |_| Ok(Some(found.clone())));
        mock_repo.expect_count_by_image().never();
        echo_update(&mut mock_repo, current);

        let storage = InMemoryBlobStorage::new();
        storage.put(&image_key(&name), &bytes).await.unwrap();
        let service = ProductService::new(mock_repo, storage.clone());

        let product = service.update_product(id, form(Some(bytes.clone()))).await.unwrap();

        assert_eq!(product.image, name);
        assert_eq!(storage.get(&image_key(&name)).await.unwrap(), bytes);
    }

    #[tokio::test]
    async fn test_shared_image_survives_until_last_product_is_deleted() {
        let service = ProductService::new(
            crate::repository::InMemoryProductRepository::new(),
            InMemoryBlobStorage::new(),
        );

        let first = service.create_product(form(Some(png()))).await.unwrap();
        let second = service.create_product(form(Some(png()))).await.unwrap();
        assert_eq!(first.image, second.image);

        service.delete_product(first.id).await.unwrap();
        let (_, bytes) = service.get_product_image(second.id).await.unwrap();
        assert_eq!(bytes, png());

        service.delete_product(second.id).await.unwrap();
        assert!(service.storage.is_empty().await);
    }

    #[tokio::test]
    async fn test_get_product_image_missing_blob() {
        let id = Uuid::now_v7();
        let found = stored(id, "abc.png");

        let mut mock_repo = MockProductRepository::new();
        mock_repo
            .expect_get_by_id()
            .returning(move |_| Ok(Some(found.clone())));

        let service = ProductService::new(mock_repo, InMemoryBlobStorage::new());
        let err = service.get_product_image(id).await.unwrap_err();

        assert!(matches!(err, ProductError::ImageNotFound { image, .. } if image == "abc.png"));
    }

    #[tokio::test]
    async fn test_check_storage() {
        let ok = ProductService::new(MockProductRepository::new(), InMemoryBlobStorage::new());
        assert!(ok.check_storage().await.is_ok());

        let failing = ProductService::new(MockProductRepository::new(), FailingStorage);
        assert!(failing.check_storage().await.is_err());
    }
}
