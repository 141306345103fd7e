use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Name is required")]
    NameRequired,
    #[error("Phone number is required")]
    PhoneRequired,
    #[error("Please enter a valid UK mobile number")]
    InvalidPhone,
    #[error("Email is required for invoice generation")]
    EmailRequired,
    #[error("Please enter a valid email address")]
    InvalidEmail,
}

fn re_uk_mobile() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"^((\+44|0044|0)7\d{9})$").expect("invalid regex"))
}

fn re_email() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("invalid regex")
    })
}

pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::NameRequired);
    }
    Ok(())
}

/// UK mobile numbers only: `07…`, `+447…` or `00447…`.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if phone.trim().is_empty() {
        return Err(ValidationError::PhoneRequired);
    }
    if !re_uk_mobile().is_match(phone) {
        return Err(ValidationError::InvalidPhone);
    }
    Ok(())
}

/// Email is optional unless `required` (an invoice was requested).
pub fn validate_email(email: &str, required: bool) -> Result<(), ValidationError> {
    let email = email.trim();
    if email.is_empty() {
        return if required { Err(ValidationError::EmailRequired) } else { Ok(()) };
    }
    if !re_email().is_match(email) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}
