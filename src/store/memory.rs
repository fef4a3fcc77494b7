//! In-process store. Writers serialize on one lock, so each call is atomic.

use super::{CupcakeDraft, CupcakeStore};
use crate::error::StoreError;
use crate::model::Cupcake;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct MemoryCupcakeStore {
    table: RwLock<Table>,
}

#[derive(Default)]
struct Table {
    last_id: i32,
    rows: BTreeMap<i32, Cupcake>,
}

impl MemoryCupcakeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn row(id: i32, draft: &CupcakeDraft) -> Cupcake {
    Cupcake {
        id,
        flavor: draft.flavor.clone(),
        size: draft.size.clone(),
        rating: draft.rating,
        image: draft.image.clone(),
    }
}

#[async_trait]
impl CupcakeStore for MemoryCupcakeStore {
    async fn list(&self) -> Result<Vec<Cupcake>, StoreError> {
        Ok(self.table.read().await.rows.values().cloned().collect())
    }

    async fn get(&self, id: i32) -> Result<Option<Cupcake>, StoreError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn count(&self) -> Result<i64, StoreError> {
        Ok(self.table.read().await.rows.len() as i64)
    }

    async fn insert(&self, draft: &CupcakeDraft) -> Result<Cupcake, StoreError> {
        let mut table = self.table.write().await;
        table.last_id += 1;
        let cupcake = row(table.last_id, draft);
        table.rows.insert(cupcake.id, cupcake.clone());
        Ok(cupcake)
    }

    async fn update(&self, id: i32, draft: &CupcakeDraft) -> Result<Option<Cupcake>, StoreError> {
        let mut table = self.table.write().await;
        Ok(table.rows.get_mut(&id).map(|existing| {
            *existing = row(id, draft);
            existing.clone()
        }))
    }

    async fn delete(&self, id: i32) -> Result<Option<Cupcake>, StoreError> {
        Ok(self.table.write().await.rows.remove(&id))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
