//! SurrealDB implementation of [`PropertyRepository`].

use std::str::FromStr;

use chrono::{DateTime, Utc};
use roost_core::error::RoostResult;
use roost_core::models::property::{
    CreateProperty, Location, Property, PropertyFilter, PropertyType, UpdateProperty,
};
use roost_core::repository::PropertyRepository;
use rust_decimal::Decimal;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::{DbError, parse_uuid};

#[derive(Debug, SurrealValue)]
struct PropertyRow {
    host_id: String,
    property_type: String,
    address: String,
    city: String,
    country: String,
    latitude: f64,
    longitude: f64,
    price_per_night: String,
    amenities: Vec<String>,
    bedrooms: u32,
    bathrooms: u32,
    images: Vec<String>,
    is_available: bool,
    max_guests: u32,
    average_rating: Option<f64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct PropertyRowWithId {
    record_id: String,
    host_id: String,
    property_type: String,
    address: String,
    city: String,
    country: String,
    latitude: f64,
    longitude: f64,
    price_per_night: String,
    amenities: Vec<String>,
    bedrooms: u32,
    bathrooms: u32,
    images: Vec<String>,
    is_available: bool,
    max_guests: u32,
    average_rating: Option<f64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PropertyRow {
    fn into_property(self, id: Uuid) -> Result<Property, DbError> {
        let host_id = parse_uuid("property", "host", &self.host_id)?;
        let property_type = PropertyType::from_str(&self.property_type)
            .map_err(|e| DbError::decode("property", e))?;
        let price_per_night = Decimal::from_str(&self.price_per_night)
            .map_err(|e| DbError::decode("property", format!("invalid price: {e}")))?;
        Ok(Property {
            id,
            host_id,
            property_type,
            location: Location {
                address: self.address,
                city: self.city,
                country: self.country,
                latitude: self.latitude,
                longitude: self.longitude,
            },
            price_per_night,
            amenities: self.amenities,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            images: self.images,
            is_available: self.is_available,
            max_guests: self.max_guests,
            average_rating: self.average_rating,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl PropertyRowWithId {
    fn try_into_property(self) -> Result<Property, DbError> {
        let id = parse_uuid("property", "record", &self.record_id)?;
        PropertyRow {
            host_id: self.host_id,
            property_type: self.property_type,
            address: self.address,
            city: self.city,
            country: self.country,
            latitude: self.latitude,
            longitude: self.longitude,
            price_per_night: self.price_per_night,
            amenities: self.amenities,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            images: self.images,
            is_available: self.is_available,
            max_guests: self.max_guests,
            average_rating: self.average_rating,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_property(id)
    }
}

/// SurrealDB implementation of the Property repository.
#[derive(Clone)]
pub struct SurrealPropertyRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealPropertyRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> PropertyRepository for SurrealPropertyRepository<C> {
    async fn create(&self, input: CreateProperty) -> RoostResult<Property> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let fields = input.fields;

        let result = self
            .db
            .query(
                "CREATE type::record('property', $id) SET \
                 host_id = $host_id, \
                 property_type = $property_type, \
                 address = $address, city = $city, country = $country, \
                 latitude = $latitude, longitude = $longitude, \
                 price_per_night = $price_per_night, \
                 amenities = $amenities, \
                 bedrooms = $bedrooms, bathrooms = $bathrooms, \
                 images = $images, \
                 is_available = true, \
                 max_guests = $max_guests, \
                 average_rating = NONE",
            )
            .bind(("id", id_str.clone()))
            .bind(("host_id", input.host_id.to_string()))
            .bind(("property_type", fields.property_type.as_str().to_string()))
            .bind(("address", fields.location.address))
            .bind(("city", fields.location.city))
            .bind(("country", fields.location.country))
            .bind(("latitude", fields.location.latitude))
            .bind(("longitude", fields.location.longitude))
            .bind(("price_per_night", fields.price_per_night.to_string()))
            .bind(("amenities", fields.amenities))
            .bind(("bedrooms", fields.bedrooms))
            .bind(("bathrooms", fields.bathrooms))
            .bind(("images", input.images))
            .bind(("max_guests", fields.max_guests))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<PropertyRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "property".into(),
            id: id_str,
        })?;

        Ok(row.into_property(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> RoostResult<Property> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('property', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PropertyRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "property".into(),
            id: id_str,
        })?;

        Ok(row.into_property(id)?)
    }

    async fn update(&self, id: Uuid, input: UpdateProperty) -> RoostResult<Property> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.property_type.is_some() {
            sets.push("property_type = $property_type");
        }
        if input.location.is_some() {
            sets.push(
                "address = $address, city = $city, country = $country, \
                 latitude = $latitude, longitude = $longitude",
            );
        }
        if input.price_per_night.is_some() {
            sets.push("price_per_night = $price_per_night");
        }
        if input.amenities.is_some() {
            sets.push("amenities = $amenities");
        }
        if input.bedrooms.is_some() {
            sets.push("bedrooms = $bedrooms");
        }
        if input.bathrooms.is_some() {
            sets.push("bathrooms = $bathrooms");
        }
        if input.max_guests.is_some() {
            sets.push("max_guests = $max_guests");
        }
        if input.is_available.is_some() {
            sets.push("is_available = $is_available");
        }
        if input.images.is_some() {
            sets.push("images = $images");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('property', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(property_type) = input.property_type {
            builder = builder.bind(("property_type", property_type.as_str().to_string()));
        }
        if let Some(location) = input.location {
            builder = builder
                .bind(("address", location.address))
                .bind(("city", location.city))
                .bind(("country", location.country))
                .bind(("latitude", location.latitude))
                .bind(("longitude", location.longitude));
        }
        if let Some(price) = input.price_per_night {
            builder = builder.bind(("price_per_night", price.to_string()));
        }
        if let Some(amenities) = input.amenities {
            builder = builder.bind(("amenities", amenities));
        }
        if let Some(bedrooms) = input.bedrooms {
            builder = builder.bind(("bedrooms", bedrooms));
        }
        if let Some(bathrooms) = input.bathrooms {
            builder = builder.bind(("bathrooms", bathrooms));
        }
        if let Some(max_guests) = input.max_guests {
            builder = builder.bind(("max_guests", max_guests));
        }
        if let Some(is_available) = input.is_available {
            builder = builder.bind(("is_available", is_available));
        }
        if let Some(images) = input.images {
            builder = builder.bind(("images", images));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<PropertyRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "property".into(),
            id: id_str,
        })?;

        Ok(row.into_property(id)?)
    }

    async fn delete(&self, id: Uuid) -> RoostResult<()> {
        self.db
            .query("DELETE type::record('property', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(())
    }

    async fn list(&self, filter: PropertyFilter) -> RoostResult<Vec<Property>> {
        // Exact-match predicates run in the database; case-insensitive
        // and decimal comparisons are applied by `PropertyFilter::matches`.
        let mut conditions = Vec::new();
        if filter.host_id.is_some() {
            conditions.push("host_id = $host_id");
        }
        if filter.property_type.is_some() {
            conditions.push("property_type = $property_type");
        }
        if filter.is_available.is_some() {
            conditions.push("is_available = $is_available");
        }
        if filter.min_guests.is_some() {
            conditions.push("max_guests >= $min_guests");
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        let query = format!(
            "SELECT meta::id(id) AS record_id, * FROM property {where_clause} \
             ORDER BY created_at ASC"
        );

        let mut builder = self.db.query(&query);
        if let Some(host_id) = filter.host_id {
            builder = builder.bind(("host_id", host_id.to_string()));
        }
        if let Some(property_type) = filter.property_type {
            builder = builder.bind(("property_type", property_type.as_str().to_string()));
        }
        if let Some(is_available) = filter.is_available {
            builder = builder.bind(("is_available", is_available));
        }
        if let Some(min_guests) = filter.min_guests {
            builder = builder.bind(("min_guests", min_guests));
        }

        let mut result = builder.await.map_err(DbError::from)?;
        let rows: Vec<PropertyRowWithId> = result.take(0).map_err(DbError::from)?;

        let properties = rows
            .into_iter()
            .map(|row| row.try_into_property())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(properties
            .into_iter()
            .filter(|p| filter.matches(p))
            .collect())
    }

    async fn set_rating(&self, id: Uuid, rating: Option<f64>) -> RoostResult<()> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "UPDATE type::record('property', $id) SET \
                 average_rating = $rating, updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind(("rating", rating))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<PropertyRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::NotFound {
                entity: "property".into(),
                id: id_str,
            }
            .into());
        }

        Ok(())
    }
}
