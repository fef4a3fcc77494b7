//! Cupcake create/read/update/delete on top of a [`CupcakeStore`].

use super::changes::{detect_changes, Change};
use super::normalize::{normalize, normalize_all};
use crate::error::{AppError, StoreError};
use crate::model::{Cupcake, Field, FieldInput, FieldValue, Fields, DEFAULT_IMAGE};
use crate::response::Outcome;
use crate::store::{CupcakeDraft, CupcakeStore};
use serde_json::Value;
use std::sync::Arc;

#[derive(Clone)]
pub struct CupcakeService {
    store: Arc<dyn CupcakeStore>,
    default_image: Arc<str>,
}

impl CupcakeService {
    pub fn new(store: Arc<dyn CupcakeStore>) -> Self {
        CupcakeService {
            store,
            default_image: Arc::from(DEFAULT_IMAGE),
        }
    }

    /// Image stored when a create request leaves it out.
    pub fn with_default_image(mut self, image: impl Into<String>) -> Self {
        self.default_image = Arc::from(image.into());
        self
    }

    pub fn store(&self) -> &dyn CupcakeStore {
        self.store.as_ref()
    }

    pub async fn list(&self) -> Result<Vec<Cupcake>, AppError> {
        self.store.list().await.map_err(read_failed)
    }

    pub async fn count(&self) -> Result<i64, AppError> {
        self.store.count().await.map_err(read_failed)
    }

    pub async fn read(&self, id: i32) -> Result<Cupcake, AppError> {
        self.store
            .get(id)
            .await
            .map_err(read_failed)?
            .ok_or_else(|| AppError::NotFound(format!("Cupcake id={} was not found", id)))
    }

    /// Normalize `input` and insert a new cupcake. Omitted fields count as blank;
    /// a missing image takes the default.
    pub async fn create(&self, input: &FieldInput) -> Outcome {
        Outcome::created(self.try_create(input).await)
    }

    /// Replace all four mutable fields of cupcake `id`. Every field must be
    /// supplied even when unchanged; values equal to the stored ones make the
    /// call a no-op that returns the current record.
    pub async fn update(&self, id: i32, input: &FieldInput) -> Outcome {
        Outcome::updated(self.try_update(id, input).await)
    }

    /// Remove cupcake `id`, returning the record as it was before removal.
    pub async fn delete(&self, id: i32) -> Outcome {
        Outcome::deleted(self.try_delete(id).await)
    }

    async fn try_create(&self, input: &FieldInput) -> Result<Cupcake, AppError> {
        let fields = normalize_all(input);
        let missing: Vec<&str> = Field::REQUIRED
            .iter()
            .filter(|f| fields.get(*f).map_or(true, FieldValue::is_missing))
            .map(|f| f.as_str())
            .collect();
        if !missing.is_empty() {
            tracing::warn!(missing = ?missing, "create rejected");
            return Err(AppError::Validation(format!(
                "An error occurred. Non-blank values required for flavor, size, and rating. Missing: {}.",
                missing.join(", ")
            )));
        }

        let draft = CupcakeDraft::from_fields(&fields, &self.default_image).map_err(create_failed)?;
        let cupcake = self.store.insert(&draft).await.map_err(create_failed)?;
        tracing::info!(id = cupcake.id, flavor = %cupcake.flavor, "cupcake created");
        Ok(cupcake)
    }

    async fn try_update(&self, id: i32, input: &FieldInput) -> Result<Cupcake, AppError> {
        let current = self
            .store
            .get(id)
            .await
            .map_err(read_failed)?
            .ok_or_else(|| update_not_found(id))?;

        for field in Field::MUTABLE {
            if matches!(input.get(field), None | Some(Value::Null)) {
                tracing::warn!(id, field = %field, "update rejected");
                return Err(AppError::Validation(format!(
                    "Update Error: All fields require a value. {} had a value of null. No updates occurred.",
                    field
                )));
            }
        }

        let mut proposed = normalize(input);
        proposed.insert(Field::Id, FieldValue::Integer(id.into()));

        match detect_changes(&current.fields(), &proposed) {
            Change::Invalid(message) => {
                tracing::warn!(id, %message, "update rejected");
                Err(AppError::Validation(format!("Update Error: {}", message)))
            }
            Change::NoChange => {
                tracing::debug!(id, "update is a no-op");
                Ok(current)
            }
            Change::Changed => self.apply(&current, &proposed).await,
        }
    }

    async fn apply(&self, current: &Cupcake, proposed: &Fields) -> Result<Cupcake, AppError> {
        // Message is built from the snapshot taken at lookup, not from the failed write.
        let failed = |err: StoreError| {
            tracing::warn!(id = current.id, error = %err, "update failed");
            let message = format!(
                "Update Error: An error occurred while updating {}: {}. No updates occurred.",
                current.id, current.flavor
            );
            match err {
                StoreError::Unavailable(_) => AppError::Unavailable(message),
                _ => AppError::Persistence(message),
            }
        };
        let draft = CupcakeDraft::from_fields(proposed, &self.default_image).map_err(failed)?;
        let updated = self
            .store
            .update(current.id, &draft)
            .await
            .map_err(failed)?
            .ok_or_else(|| update_not_found(current.id))?;
        tracing::info!(id = updated.id, "cupcake updated");
        Ok(updated)
    }

    async fn try_delete(&self, id: i32) -> Result<Cupcake, AppError> {
        let snapshot = self
            .store
            .get(id)
            .await
            .map_err(read_failed)?
            .ok_or_else(|| delete_not_found(id))?;
        match self.store.delete(id).await {
            Ok(Some(_)) => {
                tracing::info!(id, "cupcake deleted");
                Ok(snapshot)
            }
            Ok(None) => Err(delete_not_found(id)),
            Err(err) => {
                tracing::warn!(id, error = %err, "delete failed");
                let described = serde_json::to_string(&snapshot).unwrap_or_else(|_| format!("id={}", id));
                let message = format!("An error occurred while deleting {}. No delete occurred. ", described);
                Err(match err {
                    StoreError::Unavailable(_) => AppError::Unavailable(message),
                    _ => AppError::Persistence(message),
                })
            }
        }
    }
}

fn read_failed(err: StoreError) -> AppError {
    tracing::error!(error = %err, "store read failed");
    err.into()
}

fn create_failed(err: StoreError) -> AppError {
    tracing::warn!(error = %err, "create failed");
    match err {
        StoreError::Unavailable(_) => AppError::Unavailable("An error occurred.".into()),
        _ => AppError::Persistence("An error occurred.".into()),
    }
}

fn update_not_found(id: i32) -> AppError {
    AppError::NotFound(format!(
        "Update Error: Cupcake id={} was not found. No updates occurred.",
        id
    ))
}

fn delete_not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Cupcake id={} was not found. No delete occurred. ", id))
}
