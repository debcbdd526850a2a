use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Funnel, FunnelQuery, FunnelSlice, FunnelWithPages, NewFunnel, NewPage, NewUser, Page, User,
};
use crate::database::repository::DataStore;
use crate::services::PermissionChecker;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    // Insertion order is creation order
    funnels: Vec<Funnel>,
    pages: Vec<Page>,
    members: HashMap<(Uuid, Uuid), String>,
}

/// Process-local [`DataStore`] for development without Postgres, and for tests.
///
/// Individual write paths can be switched to fail, to exercise error handling.
#[derive(Default)]
pub struct MemoryDataStore {
    tables: RwLock<Tables>,
    fail_user_upserts: AtomicBool,
    fail_page_inserts: AtomicBool,
    fail_reads: AtomicBool,
}

impl MemoryDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_user_upserts(&self, fail: bool) {
        self.fail_user_upserts.store(fail, Ordering::SeqCst);
    }

    pub fn fail_page_inserts(&self, fail: bool) {
        self.fail_page_inserts.store(fail, Ordering::SeqCst);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Record a workspace membership. `role` is stored verbatim.
    pub async fn add_member(&self, workspace_id: Uuid, user_id: Uuid, role: &str) {
        let mut tables = self.tables.write().await;
        tables.members.insert((workspace_id, user_id), role.to_string());
    }

    pub async fn users(&self) -> Vec<User> {
        self.tables.read().await.users.values().cloned().collect()
    }

    pub async fn funnels(&self) -> Vec<Funnel> {
        self.tables.read().await.funnels.clone()
    }

    pub async fn pages(&self) -> Vec<Page> {
        self.tables.read().await.pages.clone()
    }

    fn injected(flag: &AtomicBool, what: &str) -> Result<(), DatabaseError> {
        if flag.load(Ordering::SeqCst) {
            return Err(DatabaseError::QueryError(format!("injected failure: {}", what)));
        }
        Ok(())
    }
}

#[async_trait]
impl DataStore for MemoryDataStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Self::injected(&self.fail_reads, "ping")
    }

    async fn upsert_user(&self, user: &NewUser) -> Result<User, DatabaseError> {
        Self::injected(&self.fail_user_upserts, "upsert users")?;

        let now = Utc::now();
        let mut tables = self.tables.write().await;
        let row = tables
            .users
            .entry(user.id)
            .and_modify(|existing| {
                existing.email = user.email.clone();
                existing.updated_at = now;
            })
            .or_insert_with(|| User {
                id: user.id,
                email: user.email.clone(),
                created_at: now,
                updated_at: now,
            });
        Ok(row.clone())
    }

    async fn insert_funnel(&self, funnel: &NewFunnel) -> Result<Funnel, DatabaseError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&funnel.user_id) {
            return Err(DatabaseError::QueryError(format!(
                "funnels.user_id {} violates foreign key users.id",
                funnel.user_id
            )));
        }

        let row = Funnel {
            id: Uuid::new_v4(),
            user_id: funnel.user_id,
            name: funnel.name.clone(),
            published: false,
            created_at: Utc::now(),
        };
        tables.funnels.push(row.clone());
        Ok(row)
    }

    async fn insert_page(&self, page: &NewPage) -> Result<Page, DatabaseError> {
        Self::injected(&self.fail_page_inserts, "insert pages")?;

        let mut tables = self.tables.write().await;
        if !tables.funnels.iter().any(|f| f.id == page.funnel_id) {
            return Err(DatabaseError::QueryError(format!(
                "pages.funnel_id {} violates foreign key funnels.id",
                page.funnel_id
            )));
        }

        let row = Page {
            id: Uuid::new_v4(),
            funnel_id: page.funnel_id,
            name: page.name.clone(),
            slug: page.slug.clone(),
            created_at: Utc::now(),
        };
        tables.pages.push(row.clone());
        Ok(row)
    }

    async fn list_funnels(&self, query: &FunnelQuery) -> Result<FunnelSlice, DatabaseError> {
        Self::injected(&self.fail_reads, "select funnels")?;

        let tables = self.tables.read().await;

        // Newest first; walking backwards keeps same-timestamp rows newest first too
        let mut owned: Vec<&Funnel> = tables
            .funnels
            .iter()
            .rev()
            .filter(|f| f.user_id == query.owner)
            .filter(|f| query.published.map_or(true, |p| f.published == p))
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = owned.len() as i64;
        let funnels = owned
            .into_iter()
            .skip(usize::try_from(query.offset.max(0)).unwrap_or(usize::MAX))
            .take(usize::try_from(query.limit.max(0)).unwrap_or(usize::MAX))
            .map(|funnel| FunnelWithPages {
                funnel: funnel.clone(),
                pages: tables.pages.iter().filter(|p| p.funnel_id == funnel.id).cloned().collect(),
            })
            .collect();

        Ok(FunnelSlice { funnels, total })
    }
}

#[async_trait]
impl PermissionChecker for MemoryDataStore {
    async fn workspace_role(&self, workspace_id: Uuid, user_id: Uuid) -> Result<Option<String>, DatabaseError> {
        Self::injected(&self.fail_reads, "select workspace_members")?;
        Ok(self.tables.read().await.members.get(&(workspace_id, user_id)).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(email: &str) -> NewUser {
        NewUser {
            id: Uuid::new_v4(),
            email: Some(email.to_string()),
        }
    }

    #[tokio::test]
    async fn upsert_overwrites_instead_of_duplicating() {
        let store = MemoryDataStore::new();
        let mut u = user("old@example.com");
        store.upsert_user(&u).await.unwrap();
        u.email = Some("new@example.com".to_string());
        let row = store.upsert_user(&u).await.unwrap();

        assert_eq!(row.email.as_deref(), Some("new@example.com"));
        assert_eq!(store.users().await.len(), 1);
    }

    #[tokio::test]
    async fn funnel_requires_existing_user() {
        let store = MemoryDataStore::new();
        let orphan = NewFunnel {
            user_id: Uuid::new_v4(),
            name: "Orphan".to_string(),
        };
        assert!(store.insert_funnel(&orphan).await.is_err());
    }

    #[tokio::test]
    async fn lists_only_owned_funnels_newest_first() {
        let store = MemoryDataStore::new();
        let (a, b) = (user("a@example.com"), user("b@example.com"));
        store.upsert_user(&a).await.unwrap();
        store.upsert_user(&b).await.unwrap();

        for name in ["first", "second", "third"] {
            store
                .insert_funnel(&NewFunnel { user_id: a.id, name: name.to_string() })
                .await
                .unwrap();
        }
        store
            .insert_funnel(&NewFunnel { user_id: b.id, name: "not mine".to_string() })
            .await
            .unwrap();

        let slice = store
            .list_funnels(&FunnelQuery { owner: a.id, published: None, limit: 2, offset: 0 })
            .await
            .unwrap();
        let names: Vec<_> = slice.funnels.iter().map(|f| f.funnel.name.as_str()).collect();
        assert_eq!(slice.total, 3);
        assert_eq!(names, vec!["third", "second"]);

        let published_only = store
            .list_funnels(&FunnelQuery { owner: a.id, published: Some(true), limit: 10, offset: 0 })
            .await
            .unwrap();
        assert_eq!(published_only.total, 0);
    }

    #[tokio::test]
    async fn page_failures_can_be_injected() {
        let store = MemoryDataStore::new();
        let u = user("p@example.com");
        store.upsert_user(&u).await.unwrap();
        let funnel = store
            .insert_funnel(&NewFunnel { user_id: u.id, name: "F".to_string() })
            .await
            .unwrap();

        store.fail_page_inserts(true);
        assert!(store.insert_page(&NewPage::default_for(funnel.id)).await.is_err());
        store.fail_page_inserts(false);
        assert!(store.insert_page(&NewPage::default_for(funnel.id)).await.is_ok());
        assert_eq!(store.pages().await.len(), 1);
    }
}
