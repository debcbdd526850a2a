use async_trait::async_trait;
use sqlx::{types::Json, PgPool, Row};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Funnel, FunnelQuery, FunnelSlice, FunnelWithPages, NewFunnel, NewPage, NewUser, Page, User,
    WorkspaceMember,
};
use crate::database::repository::DataStore;
use crate::services::PermissionChecker;

/// [`DataStore`] backed by a Postgres pool.
#[derive(Clone)]
pub struct PgDataStore {
    pool: PgPool,
}

impl PgDataStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DataStore for PgDataStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn upsert_user(&self, user: &NewUser) -> Result<User, DatabaseError> {
        let row = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email)
            VALUES ($1, $2)
            ON CONFLICT (id) DO UPDATE
                SET email = EXCLUDED.email,
                    updated_at = now()
            RETURNING id, email, created_at, updated_at
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn insert_funnel(&self, funnel: &NewFunnel) -> Result<Funnel, DatabaseError> {
        let row = sqlx::query_as::<_, Funnel>(
            r#"
            INSERT INTO funnels (id, user_id, name, published)
            VALUES ($1, $2, $3, false)
            RETURNING id, user_id, name, published, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(funnel.user_id)
        .bind(&funnel.name)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn insert_page(&self, page: &NewPage) -> Result<Page, DatabaseError> {
        let row = sqlx::query_as::<_, Page>(
            r#"
            INSERT INTO pages (id, funnel_id, name, slug)
            VALUES ($1, $2, $3, $4)
            RETURNING id, funnel_id, name, slug, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(page.funnel_id)
        .bind(&page.name)
        .bind(&page.slug)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn list_funnels(&self, query: &FunnelQuery) -> Result<FunnelSlice, DatabaseError> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM funnels
            WHERE user_id = $1
              AND ($2::boolean IS NULL OR published = $2)
            "#,
        )
        .bind(query.owner)
        .bind(query.published)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query(
            r#"
            SELECT f.id, f.user_id, f.name, f.published, f.created_at,
                   COALESCE(
                       (SELECT json_agg(p ORDER BY p.created_at)
                        FROM (SELECT id, funnel_id, name, slug, created_at FROM pages) p
                        WHERE p.funnel_id = f.id),
                       '[]'::json
                   ) AS pages
            FROM funnels f
            WHERE f.user_id = $1
              AND ($2::boolean IS NULL OR f.published = $2)
            ORDER BY f.created_at DESC, f.id
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(query.owner)
        .bind(query.published)
        .bind(query.limit)
        .bind(query.offset)
        .fetch_all(&self.pool)
        .await?;

        let mut funnels = Vec::with_capacity(rows.len());
        for row in rows {
            let Json(pages): Json<Vec<Page>> = row.try_get("pages")?;
            funnels.push(FunnelWithPages {
                funnel: Funnel {
                    id: row.try_get("id")?,
                    user_id: row.try_get("user_id")?,
                    name: row.try_get("name")?,
                    published: row.try_get("published")?,
                    created_at: row.try_get("created_at")?,
                },
                pages,
            });
        }

        Ok(FunnelSlice { funnels, total })
    }
}

#[async_trait]
impl PermissionChecker for PgDataStore {
    async fn workspace_role(&self, workspace_id: Uuid, user_id: Uuid) -> Result<Option<String>, DatabaseError> {
        let member = sqlx::query_as::<_, WorkspaceMember>(
            r#"
            SELECT workspace_id, user_id, role
            FROM workspace_members
            WHERE workspace_id = $1 AND user_id = $2
            "#,
        )
        .bind(workspace_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(member.map(|m| m.role))
    }
}
