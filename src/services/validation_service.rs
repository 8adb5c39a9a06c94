//! Local form validation, run before any request is sent.

use thiserror::Error;

use crate::models::{
    profile::Registration,
    venue::{Location, Media, Venue, VenueDraft, VenueMeta},
};

/// Only addresses in this domain may register.
pub const ALLOWED_EMAIL_DOMAIN: &str = "@stud.noroff.no";
pub const MIN_PASSWORD_LEN: usize = 8;

const UNKNOWN_CITY: &str = "Unknown city";
const UNKNOWN_COUNTRY: &str = "Unknown country";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Display name is required.")]
    NameRequired,
    #[error("Display name can only contain letters, numbers and underscores (_).")]
    NameCharacters,
    #[error("Email must be a @stud.noroff.no address.")]
    EmailDomain,
    #[error("Password must be at least 8 characters long.")]
    PasswordTooShort,
    #[error("Name and description are required.")]
    VenueTextRequired,
    #[error("Max guests must be a positive whole number.")]
    MaxGuests,
    #[error("Price must be a positive number.")]
    Price,
}

/// Check a registration against the account rules of the API.
pub fn validate_registration(registration: &Registration) -> Result<(), ValidationError> {
    if registration.name.trim().is_empty() {
        return Err(ValidationError::NameRequired);
    }
    if !registration
        .name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(ValidationError::NameCharacters);
    }
    if !registration.email.ends_with(ALLOWED_EMAIL_DOMAIN) {
        return Err(ValidationError::EmailDomain);
    }
    if registration.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(())
}

/// Raw venue form input, as typed by a manager.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VenueForm {
    pub name: String,
    pub description: String,
    pub price: String,
    pub max_guests: String,
    /// Comma-separated image URLs.
    pub media_urls: String,
    pub city: String,
    pub country: String,
    pub meta: VenueMeta,
}

impl VenueForm {
    /// Prefill the form from an existing venue, as the edit screen does.
    pub fn from_venue(venue: &Venue) -> Self {
        Self {
            name: venue.name.clone(),
            description: venue.description.clone(),
            price: venue.price.to_string(),
            max_guests: venue.max_guests.to_string(),
            media_urls: venue
                .media
                .iter()
                .map(|media| media.url.as_str())
                .collect::<Vec<_>>()
                .join(","),
            city: venue.location.city.clone().unwrap_or_default(),
            country: venue.location.country.clone().unwrap_or_default(),
            meta: venue.meta,
        }
    }

    /// Validate the form and turn it into a request payload.
    pub fn into_draft(self) -> Result<VenueDraft, ValidationError> {
        let name = self.name.trim().to_string();
        let description = self.description.trim().to_string();
        if name.is_empty() || description.is_empty() {
            return Err(ValidationError::VenueTextRequired);
        }

        let max_guests = self
            .max_guests
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|guests| *guests > 0)
            .ok_or(ValidationError::MaxGuests)?;
        let price = self
            .price
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|price| price.is_finite() && *price > 0.0)
            .ok_or(ValidationError::Price)?;

        let media = self
            .media_urls
            .split(',')
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .enumerate()
            .map(|(index, url)| Media {
                url: url.to_string(),
                alt: format!("{} image {}", name, index + 1),
            })
            .collect();

        let location = Location {
            address: Some(String::new()),
            city: Some(non_blank_or(&self.city, UNKNOWN_CITY)),
            country: Some(non_blank_or(&self.country, UNKNOWN_COUNTRY)),
            ..Location::default()
        };

        Ok(VenueDraft {
            name,
            description,
            price,
            max_guests,
            media,
            meta: self.meta,
            location,
        })
    }
}

fn non_blank_or(value: &str, fallback: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}
