use async_trait::async_trait;

use crate::database::manager::DatabaseError;
use crate::database::models::{Funnel, FunnelQuery, FunnelSlice, NewFunnel, NewPage, NewUser, Page, User};

/// Capability interface over the relational store.
///
/// Handlers only ever talk to this trait, so the Postgres client can be
/// swapped for the in-memory store without touching request logic.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Short name for health output ("postgres", "memory").
    fn backend_name(&self) -> &'static str;

    async fn ping(&self) -> Result<(), DatabaseError>;

    /// Insert-or-update keyed on `id`. Never creates a second row for the same id.
    async fn upsert_user(&self, user: &NewUser) -> Result<User, DatabaseError>;

    async fn insert_funnel(&self, funnel: &NewFunnel) -> Result<Funnel, DatabaseError>;

    async fn insert_page(&self, page: &NewPage) -> Result<Page, DatabaseError>;

    /// Owner's funnels, newest first, each with its pages, plus the total count.
    async fn list_funnels(&self, query: &FunnelQuery) -> Result<FunnelSlice, DatabaseError>;
}
