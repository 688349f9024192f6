//! Input validation for API requests.
//!
//! This module provides validation functions for API request data,
//! ensuring all inputs meet the required format and constraints.
//!
//! For collecting multiple validation errors and returning them as an ApiError,
//! use the `ValidationErrorBuilder` from the `error` module.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for validating email addresses (pragmatic, not RFC-complete)
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?)+$"
    ).unwrap();
}

/// Validate an email address
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email is too long (max 254 characters)".to_string());
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err("Invalid email address".to_string());
    }

    Ok(())
}

/// Validate a password at signup
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.len() < 6 {
        return Err("Password must be at least 6 characters".to_string());
    }

    if password.len() > 128 {
        return Err("Password is too long (max 128 characters)".to_string());
    }

    Ok(())
}

/// Validate a person or product name
pub fn validate_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Name is required".to_string());
    }

    if name.len() > 200 {
        return Err("Name is too long (max 200 characters)".to_string());
    }

    Ok(())
}

/// Validate a product description
pub fn validate_description(description: &str) -> Result<(), String> {
    if description.trim().is_empty() {
        return Err("Description is required".to_string());
    }

    if description.len() > 5000 {
        return Err("Description is too long (max 5000 characters)".to_string());
    }

    Ok(())
}

/// Validate a product category. Free-form: the UI offers a fixed option set
/// but the server does not enforce it.
pub fn validate_category(category: &str) -> Result<(), String> {
    if category.trim().is_empty() {
        return Err("Category is required".to_string());
    }

    if category.len() > 100 {
        return Err("Category is too long (max 100 characters)".to_string());
    }

    Ok(())
}

/// Validate a product price
pub fn validate_price(price: f64) -> Result<(), String> {
    if !price.is_finite() {
        return Err("Price must be a number".to_string());
    }

    if price < 0.0 {
        return Err("Price must be non-negative".to_string());
    }

    Ok(())
}

/// Validate a product rating
pub fn validate_rating(rating: f64) -> Result<(), String> {
    if !rating.is_finite() {
        return Err("Rating must be a number".to_string());
    }

    if !(0.0..=5.0).contains(&rating) {
        return Err("Rating must be between 0 and 5".to_string());
    }

    Ok(())
}
