//! Property (listing) domain model.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{RoostError, RoostResult};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PropertyType {
    House,
    Apartment,
    Villa,
}

impl PropertyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::House => "House",
            PropertyType::Apartment => "Apartment",
            PropertyType::Villa => "Villa",
        }
    }
}

impl FromStr for PropertyType {
    type Err = RoostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "House" => Ok(PropertyType::House),
            "Apartment" => Ok(PropertyType::Apartment),
            "Villa" => Ok(PropertyType::Villa),
            other => Err(RoostError::validation(format!(
                "unknown property type: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub address: String,
    pub city: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn validate(&self) -> RoostResult<()> {
        for (field, value) in [
            ("address", &self.address),
            ("city", &self.city),
            ("country", &self.country),
        ] {
            if value.trim().is_empty() {
                return Err(RoostError::validation(format!(
                    "location.{field} must not be empty"
                )));
            }
        }
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(RoostError::validation(format!(
                "latitude {} out of range",
                self.latitude
            )));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(RoostError::validation(format!(
                "longitude {} out of range",
                self.longitude
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    pub id: Uuid,
    pub host_id: Uuid,
    pub property_type: PropertyType,
    pub location: Location,
    pub price_per_night: Decimal,
    pub amenities: Vec<String>,
    pub bedrooms: u32,
    pub bathrooms: u32,
    /// Public URLs returned by object storage.
    pub images: Vec<String>,
    /// Gates creation of new bookings only.
    pub is_available: bool,
    pub max_guests: u32,
    /// Mean of non-deleted review ratings; `None` until the first review.
    pub average_rating: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Host-supplied listing fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyFields {
    pub property_type: PropertyType,
    pub location: Location,
    pub price_per_night: Decimal,
    pub amenities: Vec<String>,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub max_guests: u32,
}

impl PropertyFields {
    pub fn validate(&self) -> RoostResult<()> {
        validate_price(self.price_per_night)?;
        validate_max_guests(self.max_guests)?;
        self.location.validate()
    }
}

fn validate_price(price: Decimal) -> RoostResult<()> {
    if price <= Decimal::ZERO {
        return Err(RoostError::validation(format!(
            "price per night must be positive, got {price}"
        )));
    }
    Ok(())
}

fn validate_max_guests(max_guests: u32) -> RoostResult<()> {
    if max_guests == 0 {
        return Err(RoostError::validation("max guests must be at least 1"));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProperty {
    pub host_id: Uuid,
    pub fields: PropertyFields,
    pub images: Vec<String>,
}

/// Fields that can be updated on an existing property.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateProperty {
    pub property_type: Option<PropertyType>,
    pub location: Option<Location>,
    pub price_per_night: Option<Decimal>,
    pub amenities: Option<Vec<String>>,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<u32>,
    pub max_guests: Option<u32>,
    pub is_available: Option<bool>,
    /// Full replacement list; the registry computes the merged value.
    pub images: Option<Vec<String>>,
}

impl UpdateProperty {
    pub fn validate(&self) -> RoostResult<()> {
        if let Some(price) = self.price_per_night {
            validate_price(price)?;
        }
        if let Some(max_guests) = self.max_guests {
            validate_max_guests(max_guests)?;
        }
        if let Some(location) = &self.location {
            location.validate()?;
        }
        Ok(())
    }
}

/// Listing filter. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct PropertyFilter {
    pub host_id: Option<Uuid>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub property_type: Option<PropertyType>,
    pub is_available: Option<bool>,
    /// Minimum guest capacity.
    pub min_guests: Option<u32>,
    /// Maximum nightly price, inclusive.
    pub max_price: Option<Decimal>,
}

impl PropertyFilter {
    pub fn matches(&self, property: &Property) -> bool {
        self.host_id.is_none_or(|h| property.host_id == h)
            && self
                .city
                .as_deref()
                .is_none_or(|c| property.location.city.eq_ignore_ascii_case(c))
            && self
                .country
                .as_deref()
                .is_none_or(|c| property.location.country.eq_ignore_ascii_case(c))
            && self
                .property_type
                .is_none_or(|t| property.property_type == t)
            && self.is_available.is_none_or(|a| property.is_available == a)
            && self.min_guests.is_none_or(|g| property.max_guests >= g)
            && self.max_price.is_none_or(|p| property.price_per_night <= p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location() -> Location {
        Location {
            address: "1 Harbour St".into(),
            city: "Lisbon".into(),
            country: "Portugal".into(),
            latitude: 38.72,
            longitude: -9.14,
        }
    }

    fn fields() -> PropertyFields {
        PropertyFields {
            property_type: PropertyType::Apartment,
            location: location(),
            price_per_night: Decimal::new(150, 0),
            amenities: vec!["wifi".into()],
            bedrooms: 2,
            bathrooms: 1,
            max_guests: 4,
        }
    }

    #[test]
    fn valid_fields_pass() {
        assert!(fields().validate().is_ok());
    }

    #[test]
    fn non_positive_price_rejected() {
        let mut f = fields();
        f.price_per_night = Decimal::ZERO;
        assert!(matches!(f.validate(), Err(RoostError::Validation { .. })));
    }

    #[test]
    fn zero_max_guests_rejected() {
        let mut f = fields();
        f.max_guests = 0;
        assert!(f.validate().is_err());
    }

    #[test]
    fn latitude_out_of_range_rejected() {
        let mut f = fields();
        f.location.latitude = 91.0;
        assert!(f.validate().is_err());
    }

    #[test]
    fn filter_matches_city_case_insensitively() {
        let now = Utc::now();
        let f = fields();
        let property = Property {
            id: Uuid::new_v4(),
            host_id: Uuid::new_v4(),
            property_type: f.property_type,
            location: f.location,
            price_per_night: f.price_per_night,
            amenities: f.amenities,
            bedrooms: f.bedrooms,
            bathrooms: f.bathrooms,
            images: vec![],
            is_available: true,
            max_guests: f.max_guests,
            average_rating: None,
            created_at: now,
            updated_at: now,
        };

        let filter = PropertyFilter {
            city: Some("lisbon".into()),
            max_price: Some(Decimal::new(150, 0)),
            ..Default::default()
        };
        assert!(filter.matches(&property));

        let too_big = PropertyFilter {
            min_guests: Some(5),
            ..Default::default()
        };
        assert!(!too_big.matches(&property));
    }
}
