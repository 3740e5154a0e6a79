use async_trait::async_trait;
use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder,
};
use uuid::Uuid;

use crate::{
    entity,
    error::{ProductError, ProductResult},
    models::{NewProduct, Product, ProductChanges},
    repository::{ProductRepository, page_offset},
};

/// [`ProductRepository`] backed by the `products` table
#[derive(Clone)]
pub struct PgProductRepository {
    db: DatabaseConnection,
}

impl PgProductRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn create(&self, input: NewProduct) -> ProductResult<Product> {
        let active_model: entity::ActiveModel = input.into();
        let model = active_model.insert(&self.db).await?;

        tracing::info!(product_id = %model.id, "Created product");
        Ok(model.into())
    }

    async fn get_by_id(&self, id: Uuid) -> ProductResult<Option<Product>> {
        let model = entity::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn list(&self, page: u64, per_page: u64) -> ProductResult<(Vec<Product>, u64)> {
        let paginator = entity::Entity::find()
            .order_by_desc(entity::Column::CreatedAt)
            .order_by_desc(entity::Column::Id)
            .paginate(&self.db, per_page);

        let total = paginator.num_items().await?;
        if page_offset(page, per_page, total).is_none() {
            return Ok((Vec::new(), total));
        }
        let models = paginator.fetch_page(page - 1).await?;

        Ok((models.into_iter().map(Into::into).collect(), total))
    }

    async fn update(&self, id: Uuid, changes: ProductChanges) -> ProductResult<Product> {
        let model = entity::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(ProductError::NotFound(id))?;

        let mut active_model = model.into_active_model();
        active_model.title = Set(changes.fields.title);
        active_model.description = Set(changes.fields.description);
        active_model.price = Set(changes.fields.price);
        active_model.stock = Set(changes.fields.stock);
        if let Some(image) = changes.image {
            active_model.image = Set(image);
        }
        active_model.updated_at = Set(Utc::now().into());

        let updated = active_model.update(&self.db).await?;

        tracing::info!(product_id = %id, "Updated product");
        Ok(updated.into())
    }

    async fn delete(&self, id: Uuid) -> ProductResult<bool> {
        let result = entity::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected > 0 {
            tracing::info!(product_id = %id, "Deleted product");
        }
        Ok(result.rows_affected > 0)
    }

    async fn count_by_image(&self, name: &str) -> ProductResult<u64> {
        let count = entity::Entity::find()
            .filter(entity::Column::Image.eq(name))
            .count(&self.db)
            .await?;
        Ok(count)
    }
}
