use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Products shown per listing page
pub const PER_PAGE: u64 = 10;

/// A catalog product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    /// Stored image name: hex SHA-256 of the file plus its extension
    #[schema(example = "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08.png")]
    pub image: String,
    #[schema(example = "Chair")]
    pub title: String,
    #[schema(example = "A nice chair")]
    pub description: String,
    #[schema(example = 49.99)]
    pub price: f64,
    #[schema(example = 10)]
    pub stock: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(input: NewProduct) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            image: input.image,
            title: input.fields.title,
            description: input.fields.description,
            price: input.fields.price,
            stock: input.fields.stock,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the editable fields and, if given, the image name
    pub fn apply_changes(&mut self, changes: ProductChanges) {
        self.title = changes.fields.title;
        self.description = changes.fields.description;
        self.price = changes.fields.price;
        self.stock = changes.fields.stock;
        if let Some(image) = changes.image {
            self.image = image;
        }
        self.updated_at = Utc::now();
    }
}

/// Validated text fields of a product
#[derive(Debug, Clone, PartialEq)]
pub struct ProductFields {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub stock: i32,
}

/// Repository input for a new row
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub image: String,
    pub fields: ProductFields,
}

/// Repository input for an update; `image` is `None` when unchanged
#[derive(Debug, Clone, PartialEq)]
pub struct ProductChanges {
    pub fields: ProductFields,
    pub image: Option<String>,
}

/// A file part taken from a multipart body
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Raw create/update form, before validation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub stock: Option<String>,
    pub image: Option<ImageUpload>,
}

/// One page of products, newest first
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductPage {
    pub data: Vec<Product>,
    /// Number of products across all pages
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    /// Last page holding products; 1 when there are none
    pub last_page: u64,
}

impl ProductPage {
    pub fn new(data: Vec<Product>, total: u64, page: u64, per_page: u64) -> Self {
        Self {
            data,
            total,
            page,
            per_page,
            last_page: total.div_ceil(per_page).max(1),
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// 1-based page number; missing, invalid or < 1 means 1
    #[param(example = 1)]
    pub page: Option<String>,
}

impl PageQuery {
    pub fn page(&self) -> u64 {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse::<i64>().ok())
            .filter(|p| *p >= 1)
            .map_or(1, |p| p as u64)
    }
}

/// Multipart body accepted by create and update (documentation only)
#[allow(dead_code)]
#[derive(ToSchema)]
pub struct ProductUpload {
    #[schema(min_length = 5, example = "Chair")]
    title: String,
    #[schema(min_length = 10, example = "A nice chair")]
    description: String,
    #[schema(minimum = 0, example = 49.99)]
    price: f64,
    #[schema(minimum = 0, example = 10)]
    stock: i32,
    /// PNG or JPEG, at most 2048 KiB; optional on update
    #[schema(value_type = String, format = Binary)]
    image: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(title: &str) -> ProductFields {
        ProductFields {
            title: title.to_string(),
            description: "A nice chair".to_string(),
            price: 49.99,
            stock: 10,
        }
    }

    #[test]
    fn test_apply_changes_keeps_image_without_new_one() {
        let mut product = Product::new(NewProduct {
            image: "old.png".into(),
            fields: fields("Chair"),
        });
        let created = product.created_at;

        product.apply_changes(ProductChanges {
            fields: ProductFields {
                price: 39.99,
                ..fields("Chair")
            },
            image: None,
        });

        assert_eq!(product.image, "old.png");
        assert_eq!(product.price, 39.99);
        assert_eq!(product.created_at, created);
        assert!(product.updated_at >= created);
    }

    #[test]
    fn test_apply_changes_replaces_image() {
        let mut product = Product::new(NewProduct {
            image: "old.png".into(),
            fields: fields("Chair"),
        });
        product.apply_changes(ProductChanges {
            fields: fields("Stool"),
            image: Some("new.jpg".into()),
        });

        assert_eq!(product.image, "new.jpg");
        assert_eq!(product.title, "Stool");
    }

    #[test]
    fn test_product_page_last_page() {
        assert_eq!(ProductPage::new(vec![], 0, 1, 10).last_page, 1);
        assert_eq!(ProductPage::new(vec![], 10, 1, 10).last_page, 1);
        assert_eq!(ProductPage::new(vec![], 11, 1, 10).last_page, 2);
    }

    #[test]
    fn test_page_query_normalizes() {
        let query = |p: Option<&str>| PageQuery {
            page: p.map(str::to_string),
        };
        assert_eq!(query(None).page(), 1);
        assert_eq!(query(Some("3")).page(), 3);
        assert_eq!(query(Some("0")).page(), 1);
        assert_eq!(query(Some("-2")).page(), 1);
        assert_eq!(query(Some("abc")).page(), 1);
    }
}
