//! Form validation for the checkout and product forms.
//!
//! Validation never fails the request: handlers re-render the form with the
//! collected [`FormErrors`].

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::models::{CustomerDetails, NewProduct};
use crate::types::{Email, Price};

const MAX_NAME_LENGTH: usize = 100;
const MAX_PHONE_LENGTH: usize = 30;
const MAX_PRODUCT_NAME_LENGTH: usize = 100;
const MAX_CATEGORY_LENGTH: usize = 50;

const REQUIRED: &str = "This field is required.";

/// Errors collected while validating a form.
///
/// Field errors are keyed by input name; non-field errors apply to the whole
/// form (for example an empty basket at checkout).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    fields: BTreeMap<&'static str, String>,
    non_field: Vec<String>,
}

impl FormErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error for `field`, keeping the first one reported.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.entry(field).or_insert_with(|| message.into());
    }

    /// Record an error that is not tied to a single field.
    pub fn add_non_field(&mut self, message: impl Into<String>) {
        self.non_field.push(message.into());
    }

    /// The error for `field`, if any.
    #[must_use]
    pub fn field(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    #[must_use]
    pub fn non_field(&self) -> &[String] {
        &self.non_field
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.non_field.is_empty()
    }
}

/// Trim `value` and check it is present and at most `max` characters.
fn required_text(
    errors: &mut FormErrors,
    field: &'static str,
    value: &str,
    max: usize,
) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, REQUIRED);
        return None;
    }
    if value.chars().count() > max {
        errors.add(
            field,
            format!("Ensure this value has at most {max} characters."),
        );
        return None;
    }
    Some(value.to_owned())
}

/// Customer fields posted from the basket page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
}

impl CheckoutForm {
    /// Validate every field.
    ///
    /// # Errors
    ///
    /// Returns the field errors if any field is missing or malformed.
    pub fn validate(&self) -> Result<CustomerDetails, FormErrors> {
        let mut errors = FormErrors::new();

        let first_name = required_text(&mut errors, "first_name", &self.first_name, MAX_NAME_LENGTH);
        let last_name = required_text(&mut errors, "last_name", &self.last_name, MAX_NAME_LENGTH);
        let phone = required_text(&mut errors, "phone", &self.phone, MAX_PHONE_LENGTH)
            .filter(|phone| {
                let ok = is_valid_phone(phone);
                if !ok {
                    errors.add("phone", "Enter a valid phone number.");
                }
                ok
            });
        let email = if self.email.trim().is_empty() {
            errors.add("email", REQUIRED);
            None
        } else {
            Email::parse(&self.email)
                .map_err(|_| errors.add("email", "Enter a valid email address."))
                .ok()
        };

        match (first_name, last_name, phone, email) {
            (Some(first_name), Some(last_name), Some(phone), Some(email)) if errors.is_empty() => {
                Ok(CustomerDetails {
                    first_name,
                    last_name,
                    phone,
                    email,
                })
            }
            _ => Err(errors),
        }
    }
}

/// Digits plus the usual separators, with at least one digit.
fn is_valid_phone(phone: &str) -> bool {
    phone.chars().any(|c| c.is_ascii_digit())
        && phone
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')'))
}

/// Text fields of the product form. The photo arrives separately as a file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub price: String,
}

impl ProductForm {
    /// Validate the text fields. The returned product has no photo.
    ///
    /// # Errors
    ///
    /// Returns the field errors if any field is missing or malformed.
    pub fn validate(&self) -> Result<NewProduct, FormErrors> {
        let mut errors = FormErrors::new();

        let name = required_text(&mut errors, "name", &self.name, MAX_PRODUCT_NAME_LENGTH);
        let category = required_text(&mut errors, "category", &self.category, MAX_CATEGORY_LENGTH);
        let price = if self.price.trim().is_empty() {
            errors.add("price", REQUIRED);
            None
        } else {
            Price::parse(&self.price)
                .map_err(|e| errors.add("price", format!("Enter a valid price: {e}.")))
                .ok()
        };

        match (name, category, price) {
            (Some(name), Some(category), Some(price)) if errors.is_empty() => Ok(NewProduct {
                name,
                category,
                price,
                photo: None,
            }),
            _ => Err(errors),
        }
    }
}
