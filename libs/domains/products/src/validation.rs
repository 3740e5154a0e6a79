//! Field rules for the create and update forms.
//!
//! | field       | rules                                        |
//! |-------------|----------------------------------------------|
//! | image       | required (create only), image, mimes, max    |
//! | title       | required, length >= 5                        |
//! | description | required, length >= 10                       |
//! | price       | required, numeric, >= 0                      |
//! | stock       | required, whole number, >= 0                 |
//!
//! Every violation is collected; blank text and empty files count as missing.

use std::borrow::Cow;
use validator::{ValidationError, ValidationErrors};

use crate::image::{ImageFormat, content_hash_name};
use crate::models::{ImageUpload, ProductFields, ProductForm};

pub const TITLE_MIN_CHARS: u64 = 5;
pub const DESCRIPTION_MIN_CHARS: u64 = 10;
/// Largest accepted image, in kilobytes
pub const IMAGE_MAX_KB: usize = 2048;
pub const IMAGE_MAX_BYTES: usize = IMAGE_MAX_KB * 1024;

/// An uploaded image that passed every rule
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedImage {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
    pub extension: String,
}

impl ValidatedImage {
    /// Content-derived name the image is stored under
    pub fn stored_name(&self) -> String {
        content_hash_name(&self.bytes, &self.extension)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedProduct {
    pub fields: ProductFields,
    /// Always present after [`validate_create`]
    pub image: Option<ValidatedImage>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    Create,
    Update,
}

pub fn validate_create(form: ProductForm) -> Result<ValidatedProduct, ValidationErrors> {
    validate(form, Mode::Create)
}

/// Same rules as [`validate_create`] except that the image may be omitted
pub fn validate_update(form: ProductForm) -> Result<ValidatedProduct, ValidationErrors> {
    validate(form, Mode::Update)
}

/// The error [`validate_create`] reports when no image was uploaded
pub fn image_required() -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.add("image", required("image"));
    errors
}

fn validate(form: ProductForm, mode: Mode) -> Result<ValidatedProduct, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let image = check_image(form.image, mode, &mut errors);
    let title = check_min_chars("title", form.title, TITLE_MIN_CHARS, &mut errors);
    let description =
        check_min_chars("description", form.description, DESCRIPTION_MIN_CHARS, &mut errors);
    let price = check_price(form.price, &mut errors);
    let stock = check_stock(form.stock, &mut errors);

    match (title, description, price, stock) {
        (Some(title), Some(description), Some(price), Some(stock)) if errors.is_empty() => {
            Ok(ValidatedProduct {
                fields: ProductFields {
                    title,
                    description,
                    price,
                    stock,
                },
                image,
            })
        }
        _ => Err(errors),
    }
}

fn error(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

fn required(field: &'static str) -> ValidationError {
    error("required", format!("The {field} field is required."))
}

/// Trimmed value, or `None` when missing or blank
fn present(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn check_min_chars(
    field: &'static str,
    value: Option<String>,
    min: u64,
    errors: &mut ValidationErrors,
) -> Option<String> {
    let Some(value) = present(value) else {
        errors.add(field, required(field));
        return None;
    };

    if (value.chars().count() as u64) < min {
        let mut e = error("length", format!("The {field} must be at least {min} characters."));
        e.add_param(Cow::Borrowed("min"), &min);
        e.add_param(Cow::Borrowed("value"), &value);
        errors.add(field, e);
        return None;
    }
    Some(value)
}

fn below_zero(field: &'static str, value: &impl serde::Serialize) -> ValidationError {
    let mut e = error("range", format!("The {field} must be at least 0."));
    e.add_param(Cow::Borrowed("min"), &0);
    e.add_param(Cow::Borrowed("value"), value);
    e
}

fn check_price(value: Option<String>, errors: &mut ValidationErrors) -> Option<f64> {
    let Some(raw) = present(value) else {
        errors.add("price", required("price"));
        return None;
    };

    match raw.parse::<f64>() {
        Ok(price) if price.is_finite() => {
            if price < 0.0 {
                errors.add("price", below_zero("price", &price));
                return None;
            }
            Some(price)
        }
        _ => {
            let mut e = error("numeric", "The price must be a number.");
            e.add_param(Cow::Borrowed("value"), &raw);
            errors.add("price", e);
            None
        }
    }
}

fn check_stock(value: Option<String>, errors: &mut ValidationErrors) -> Option<i32> {
    let Some(raw) = present(value) else {
        errors.add("stock", required("stock"));
        return None;
    };

    match parse_whole(&raw) {
        Some(stock) if stock < 0 => {
            errors.add("stock", below_zero("stock", &stock));
            None
        }
        Some(stock) => Some(stock),
        None => {
            let mut e = error("numeric", "The stock must be a whole number.");
            e.add_param(Cow::Borrowed("value"), &raw);
            errors.add("stock", e);
            None
        }
    }
}

/// An `i32`, also written as an integral decimal such as `10.0` or `1e3`
fn parse_whole(raw: &str) -> Option<i32> {
    if let Ok(value) = raw.parse::<i32>() {
        return Some(value);
    }
    let value = raw.parse::<f64>().ok()?;
    let in_range = (f64::from(i32::MIN)..=f64::from(i32::MAX)).contains(&value);
    (value.fract() == 0.0 && in_range).then_some(value as i32)
}

fn check_image(
    upload: Option<ImageUpload>,
    mode: Mode,
    errors: &mut ValidationErrors,
) -> Option<ValidatedImage> {
    let Some(upload) = upload.filter(|u| !u.bytes.is_empty()) else {
        if mode == Mode::Create {
            errors.add("image", required("image"));
        }
        return None;
    };

    let mut valid = true;
    let format = ImageFormat::sniff(&upload.bytes);

    if format.is_none() {
        errors.add("image", error("image", "The image must be an image."));
        valid = false;
    }

    if !format.is_some_and(|f| f.is_allowed_upload()) {
        let mut e = error("mimes", "The image must be a file of type: jpeg, jpg, png.");
        e.add_param(Cow::Borrowed("values"), &["jpeg", "jpg", "png"]);
        errors.add("image", e);
        valid = false;
    }

    if upload.bytes.len() > IMAGE_MAX_BYTES {
        let mut e = error(
            "max",
            format!("The image must not be greater than {IMAGE_MAX_KB} kilobytes."),
        );
        e.add_param(Cow::Borrowed("max"), &IMAGE_MAX_KB);
        e.add_param(Cow::Borrowed("size"), &upload.bytes.len().div_ceil(1024));
        errors.add("image", e);
        valid = false;
    }

    let format = format.filter(|_| valid)?;
    Some(ValidatedImage {
        extension: format.extension_for(upload.file_name.as_deref()),
        format,
        bytes: upload.bytes,
    })
}
