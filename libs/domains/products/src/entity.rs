use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;

use crate::models::{NewProduct, Product};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub image: String,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub price: f64,
    pub stock: i32,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Product {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            image: model.image,
            title: model.title,
            description: model.description,
            price: model.price,
            stock: model.stock,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

impl From<NewProduct> for ActiveModel {
    fn from(input: NewProduct) -> Self {
        let product = Product::new(input);

        ActiveModel {
            id: Set(product.id),
            image: Set(product.image),
            title: Set(product.title),
            description: Set(product.description),
            price: Set(product.price),
            stock: Set(product.stock),
            created_at: Set(product.created_at.into()),
            updated_at: Set(product.updated_at.into()),
        }
    }
}
