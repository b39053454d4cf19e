//! Property registry: listing management and image upload.

use roost_core::error::{RoostError, RoostResult};
use roost_core::models::property::{
    CreateProperty, Property, PropertyFields, PropertyFilter, UpdateProperty,
};
use roost_core::ports::{LocalFile, ObjectStorage};
use roost_core::repository::PropertyRepository;
use tracing::info;
use uuid::Uuid;

pub struct PropertyRegistry<P: PropertyRepository, S: ObjectStorage> {
    property_repo: P,
    storage: S,
}

impl<P: PropertyRepository, S: ObjectStorage> PropertyRegistry<P, S> {
    pub fn new(property_repo: P, storage: S) -> Self {
        Self {
            property_repo,
            storage,
        }
    }

    /// Validate, upload images and persist a new available listing.
    pub async fn create_property(
        &self,
        host_id: Uuid,
        fields: PropertyFields,
        images: &[LocalFile],
    ) -> RoostResult<Property> {
        fields.validate()?;
        let images = self.upload_all(images).await?;

        let property = self
            .property_repo
            .create(CreateProperty {
                host_id,
                fields,
                images,
            })
            .await?;

        info!(property_id = %property.id, host_id = %host_id, "Property created");
        Ok(property)
    }

    /// Apply a host's changes. Newly uploaded images are appended to the
    /// existing list (or to `patch.images` when it replaces it).
    pub async fn update_property(
        &self,
        property_id: Uuid,
        host_id: Uuid,
        mut patch: UpdateProperty,
        new_images: &[LocalFile],
    ) -> RoostResult<Property> {
        let existing = self.owned_property(property_id, host_id).await?;
        patch.validate()?;

        if !new_images.is_empty() {
            let uploaded = self.upload_all(new_images).await?;
            let mut images = patch.images.take().unwrap_or(existing.images);
            images.extend(uploaded);
            patch.images = Some(images);
        }

        let property = self.property_repo.update(property_id, patch).await?;
        info!(property_id = %property_id, host_id = %host_id, "Property updated");
        Ok(property)
    }

    /// Hard delete. Bookings and reviews of the property are kept.
    pub async fn delete_property(&self, property_id: Uuid, host_id: Uuid) -> RoostResult<()> {
        self.owned_property(property_id, host_id).await?;
        self.property_repo.delete(property_id).await?;
        info!(property_id = %property_id, host_id = %host_id, "Property deleted");
        Ok(())
    }

    pub async fn get_property(&self, property_id: Uuid) -> RoostResult<Property> {
        self.property_repo.get_by_id(property_id).await
    }

    pub async fn list_properties(&self, filter: PropertyFilter) -> RoostResult<Vec<Property>> {
        self.property_repo.list(filter).await
    }

    /// Overwrite the derived aggregate rating.
    pub async fn apply_rating(&self, property_id: Uuid, rating: Option<f64>) -> RoostResult<()> {
        self.property_repo.set_rating(property_id, rating).await
    }

    async fn owned_property(&self, property_id: Uuid, host_id: Uuid) -> RoostResult<Property> {
        let property = self.property_repo.get_by_id(property_id).await?;
        if property.host_id != host_id {
            return Err(RoostError::denied(
                "only the owning host can modify this property",
            ));
        }
        Ok(property)
    }

    async fn upload_all(&self, files: &[LocalFile]) -> RoostResult<Vec<String>> {
        let mut urls = Vec::with_capacity(files.len());
        for file in files {
            let url = self.storage.store(file).await.map_err(|e| match e {
                RoostError::ExternalService { .. } => e,
                other => RoostError::external("object_storage", other),
            })?;
            urls.push(url);
        }
        Ok(urls)
    }
}
