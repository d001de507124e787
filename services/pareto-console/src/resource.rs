//! Generic list/save/delete controller shared by every entity screen

use pareto_model::{filter, ListQuery, Portal, Resource};

use crate::api::ApiClient;
use crate::error::Result;

/// Last-loaded rows of one entity plus the operations that change them.
///
/// A failed save or delete leaves `rows` exactly as it was. Row order is
/// the server's.
#[derive(Debug, Clone)]
pub struct ResourceController<R: Resource> {
    portal: Portal,
    rows: Vec<R>,
    query: ListQuery,
    loaded: bool,
}

impl<R: Resource> ResourceController<R> {
    pub fn new(portal: Portal) -> Self {
        Self {
            portal,
            rows: Vec::new(),
            query: ListQuery::new(),
            loaded: false,
        }
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn find(&self, id: i64) -> Option<&R> {
        self.rows.iter().find(|row| row.id() == id)
    }

    /// Rows matching a free-text search box, in server order
    pub fn search(&self, query: &str) -> Vec<&R> {
        filter::search(&self.rows, query)
    }

    /// Fetch the list, replacing the cached rows on success
    pub async fn load(&mut self, api: &ApiClient, token: &str, query: ListQuery) -> Result<&[R]> {
        let rows = api.list::<R>(self.portal, token, &query).await?;
        tracing::debug!("Loaded {} {} rows", rows.len(), R::LABEL);
        self.rows = rows;
        self.query = query;
        self.loaded = true;
        Ok(&self.rows)
    }

    /// Install rows fetched through an entity-specific endpoint
    pub fn set_rows(&mut self, rows: Vec<R>) {
        self.rows = rows;
        self.loaded = true;
    }

    /// Re-run the last load with the same filters
    pub async fn reload(&mut self, api: &ApiClient, token: &str) -> Result<&[R]> {
        let query = self.query.clone();
        self.load(api, token, query).await
    }

    /// Fetch one record without touching the cached rows
    pub async fn get(&self, api: &ApiClient, token: &str, id: i64) -> Result<R> {
        Ok(api.fetch::<R>(self.portal, token, id).await?)
    }

    /// Create (`id == None`) or update a record. The draft is validated
    /// before any request is made.
    pub async fn save(
        &mut self,
        api: &ApiClient,
        token: &str,
        id: Option<i64>,
        draft: &R::Draft,
    ) -> Result<R> {
        R::validate(draft, id.is_none())?;
        let saved = match id {
            None => api.create::<R>(self.portal, token, draft).await?,
            Some(id) => api.update::<R>(self.portal, token, id, draft).await?,
        };

        match self.rows.iter_mut().find(|row| row.id() == saved.id()) {
            Some(row) => *row = saved.clone(),
            None => self.rows.push(saved.clone()),
        }
        tracing::info!("Saved {} {}", R::LABEL, saved.id());
        Ok(saved)
    }

    /// Delete a record; the cached row goes only once the server agrees
    pub async fn delete(&mut self, api: &ApiClient, token: &str, id: i64) -> Result<()> {
        api.remove::<R>(self.portal, token, id).await?;
        self.rows.retain(|row| row.id() != id);
        tracing::info!("Deleted {} {}", R::LABEL, id);
        Ok(())
    }
}
