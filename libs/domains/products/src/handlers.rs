//! HTTP handlers for the products API

use axum::{
    Json, Router,
    extract::{
        DefaultBodyLimit, Multipart, Query, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{
    UuidPath,
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, DatabaseUnavailableResponse,
        InternalServerErrorResponse, NotFoundResponse,
    },
};
use std::sync::Arc;
use storage::BlobStorage;
use utoipa::OpenApi;

use crate::error::{ProductError, ProductResult};
use crate::image::content_type_for;
use crate::models::{ImageUpload, PageQuery, Product, ProductForm, ProductPage, ProductUpload};
use crate::repository::ProductRepository;
use crate::service::ProductService;
use crate::validation::IMAGE_MAX_BYTES;

/// Where the app mounts [`router`], below `/api`
pub const MOUNT_PATH: &str = "/products";

/// Room for the largest accepted image plus the text fields and multipart framing
pub const BODY_LIMIT_BYTES: usize = IMAGE_MAX_BYTES + 1024 * 1024;

type SharedService<R, S> = Arc<ProductService<R, S>>;

#[derive(OpenApi)]
#[openapi(
    paths(
        list_products,
        create_product,
        get_product,
        get_product_image,
        update_product,
        delete_product,
    ),
    components(
        schemas(Product, ProductPage, ProductUpload),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            InternalServerErrorResponse,
            DatabaseUnavailableResponse
        )
    ),
    tags(
        (name = "Products", description = "Product catalog with image uploads")
    )
)]
pub struct ApiDoc;

/// Products router; nest it at `/api` + [`MOUNT_PATH`]
pub fn router<R, S>(service: ProductService<R, S>) -> Router
where
    R: ProductRepository + 'static,
    S: BlobStorage + 'static,
{
    let shared_service = Arc::new(service);

    Router::new()
        .route(
            "/",
            get(list_products::<R, S>).post(create_product::<R, S>),
        )
        .route(
            "/{id}",
            get(get_product::<R, S>)
                .put(update_product::<R, S>)
                .post(update_product::<R, S>)
                .delete(delete_product::<R, S>),
        )
        .route("/{id}/image", get(get_product_image::<R, S>))
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .with_state(shared_service)
}

fn multipart_error(e: MultipartError) -> ProductError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ProductError::PayloadTooLarge(e.body_text())
    } else {
        ProductError::InvalidForm(e.body_text())
    }
}

/// Collect the known fields of a multipart body; unknown fields are ignored
async fn read_form(
    multipart: Result<Multipart, MultipartRejection>,
) -> ProductResult<ProductForm> {
    let mut multipart = multipart.map_err(|e| ProductError::InvalidForm(e.body_text()))?;
    let mut form = ProductForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(multipart_error)?;
                form.image = Some(ImageUpload {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            "title" | "description" | "price" | "stock" => {
                let value = Some(field.text().await.map_err(multipart_error)?);
                match name.as_str() {
                    "title" => form.title = value,
                    "description" => form.description = value,
                    "price" => form.price = value,
                    _ => form.stock = value,
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

/// List products, newest first, 10 per page
#[utoipa::path(
    get,
    path = "",
    tag = "Products",
    params(PageQuery),
    responses(
        (status = 200, description = "One page of products", body = ProductPage),
        (status = 500, response = InternalServerErrorResponse),
        (status = 503, response = DatabaseUnavailableResponse)
    )
)]
async fn list_products<R: ProductRepository, S: BlobStorage>(
    State(service): State<SharedService<R, S>>,
    Query(query): Query<PageQuery>,
) -> ProductResult<Json<ProductPage>> {
    let page = service.list_products(query.page()).await?;
    Ok(Json(page))
}

/// Create a product from a multipart form with its image
#[utoipa::path(
    post,
    path = "",
    tag = "Products",
    request_body(content = ProductUpload, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Product created", body = Product,
            headers(("Location" = String, description = "URL of the new product"))),
        (status = 400, response = BadRequestValidationResponse),
        (status = 413, description = "Request body too large"),
        (status = 500, response = InternalServerErrorResponse),
        (status = 503, response = DatabaseUnavailableResponse)
    )
)]
async fn create_product<R: ProductRepository, S: BlobStorage>(
    State(service): State<SharedService<R, S>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ProductResult<impl IntoResponse> {
    let form = read_form(multipart).await?;
    let product = service.create_product(form).await?;

    let location = format!("/api{}/{}", MOUNT_PATH, product.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(product),
    ))
}

/// Get a product by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product found", body = Product),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse),
        (status = 503, response = DatabaseUnavailableResponse)
    )
)]
async fn get_product<R: ProductRepository, S: BlobStorage>(
    State(service): State<SharedService<R, S>>,
    UuidPath(id): UuidPath,
) -> ProductResult<Json<Product>> {
    let product = service.get_product(id).await?;
    Ok(Json(product))
}

/// Serve a product's image
#[utoipa::path(
    get,
    path = "/{id}/image",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Image bytes, served with the stored format's content type"),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse),
        (status = 503, response = DatabaseUnavailableResponse)
    )
)]
async fn get_product_image<R: ProductRepository, S: BlobStorage>(
    State(service): State<SharedService<R, S>>,
    UuidPath(id): UuidPath,
) -> ProductResult<impl IntoResponse> {
    let (product, bytes) = service.get_product_image(id).await?;

    // Names are content hashes, so a name always maps to the same bytes
    Ok((
        [
            (header::CONTENT_TYPE, content_type_for(&product.image)),
            (header::CACHE_CONTROL, "public, max-age=31536000, immutable"),
        ],
        bytes,
    ))
}

/// Update a product; the image part is optional.
///
/// Also reachable with `POST` for HTML forms.
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body(content = ProductUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Product updated", body = Product),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 413, description = "Request body too large"),
        (status = 500, response = InternalServerErrorResponse),
        (status = 503, response = DatabaseUnavailableResponse)
    )
)]
async fn update_product<R: ProductRepository, S: BlobStorage>(
    State(service): State<SharedService<R, S>>,
    UuidPath(id): UuidPath,
    multipart: Result<Multipart, MultipartRejection>,
) -> ProductResult<Json<Product>> {
    let form = read_form(multipart).await?;
    let product = service.update_product(id, form).await?;
    Ok(Json(product))
}

/// Delete a product and its image
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse),
        (status = 503, response = DatabaseUnavailableResponse)
    )
)]
async fn delete_product<R: ProductRepository, S: BlobStorage>(
    State(service): State<SharedService<R, S>>,
    UuidPath(id): UuidPath,
) -> ProductResult<StatusCode> {
    service.delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
