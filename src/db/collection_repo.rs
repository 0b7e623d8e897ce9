// src/db/collection_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{error::AppError, pagination::PageParams},
    models::collection::{
        CollectionRequest, CollectionRequestWithCreator, CollectionStatus, NewCollectionRequest,
    },
};

#[async_trait]
pub trait CollectionStore: Send + Sync {
    async fn insert(&self, new: NewCollectionRequest) -> Result<CollectionRequest, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<CollectionRequest>, AppError>;

    /// Compare-and-set do status, como em `DonationStore::transition_status`.
    async fn transition_status(
        &self,
        id: Uuid,
        from: CollectionStatus,
        to: CollectionStatus,
    ) -> Result<Option<CollectionRequest>, AppError>;

    /// Pedidos de um muazzin, ordenados por updated_at DESC
    async fn list_by_creator(
        &self,
        creator: Uuid,
        status: Option<CollectionStatus>,
        page: PageParams,
    ) -> Result<Vec<CollectionRequest>, AppError>;

    /// Todos os pedidos + e-mail do criador, ordenados por created_at DESC
    async fn list_with_creator(
        &self,
        status: Option<CollectionStatus>,
        page: PageParams,
    ) -> Result<Vec<CollectionRequestWithCreator>, AppError>;

    /// `None` soma todos os pedidos, independente do status
    async fn sum_quantity(&self, status: Option<CollectionStatus>) -> Result<i64, AppError>;

    async fn count_by_status(&self, status: CollectionStatus) -> Result<i64, AppError>;
}

#[derive(Clone)]
pub struct CollectionRepository {
    pool: PgPool,
}

impl CollectionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CollectionStore for CollectionRepository {
    async fn insert(&self, new: NewCollectionRequest) -> Result<CollectionRequest, AppError> {
        let request = sqlx::query_as::<_, CollectionRequest>(
            r#"
            INSERT INTO collection_requests (quantity, target_date, status, created_by)
            VALUES ($1, $2, 'pending', $3)
            RETURNING id, quantity, target_date, status, created_by, created_at, updated_at
            "#,
        )
            .bind(new.quantity)
            .bind(new.target_date)
            .bind(new.created_by)
            .fetch_one(&self.pool)
            .await?;

        Ok(request)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<CollectionRequest>, AppError> {
        let request = sqlx::query_as::<_, CollectionRequest>(
            r#"
            SELECT id, quantity, target_date, status, created_by, created_at, updated_at
            FROM collection_requests
            WHERE id = $1
            "#,
        )
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(request)
    }

    async fn transition_status(
        &self,
        id: Uuid,
        from: CollectionStatus,
        to: CollectionStatus,
    ) -> Result<Option<CollectionRequest>, AppError> {
        let request = sqlx::query_as::<_, CollectionRequest>(
            r#"
            UPDATE collection_requests
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING id, quantity, target_date, status, created_by, created_at, updated_at
            "#,
        )
            .bind(id)
            .bind(from)
            .bind(to)
            .fetch_optional(&self.pool)
            .await?;

        Ok(request)
    }

    async fn list_by_creator(
        &self,
        creator: Uuid,
        status: Option<CollectionStatus>,
        page: PageParams,
    ) -> Result<Vec<CollectionRequest>, AppError> {
        let requests = sqlx::query_as::<_, CollectionRequest>(
            r#"
            SELECT id, quantity, target_date, status, created_by, created_at, updated_at
            FROM collection_requests
            WHERE created_by = $1
              AND ($2::collection_status IS NULL OR status = $2)
            ORDER BY updated_at DESC, id DESC
            LIMIT $3 OFFSET $4
            "#,
        )
            .bind(creator)
            .bind(status)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(requests)
    }

    async fn list_with_creator(
        &self,
        status: Option<CollectionStatus>,
        page: PageParams,
    ) -> Result<Vec<CollectionRequestWithCreator>, AppError> {
        // LEFT JOIN: o pedido continua visível mesmo se o perfil do criador sumir
        let requests = sqlx::query_as::<_, CollectionRequestWithCreator>(
            r#"
            SELECT
                c.id, c.quantity, c.target_date, c.status, c.created_by,
                c.created_at, c.updated_at,
                p.email AS creator_email
            FROM collection_requests c
            LEFT JOIN profiles p ON p.id = c.created_by
            WHERE ($1::collection_status IS NULL OR c.status = $1)
            ORDER BY c.created_at DESC, c.id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
            .bind(status)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(requests)
    }

    async fn sum_quantity(&self, status: Option<CollectionStatus>) -> Result<i64, AppError> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(quantity), 0)::BIGINT
            FROM collection_requests
            WHERE ($1::collection_status IS NULL OR status = $1)
            "#,
        )
            .bind(status)
            .fetch_one(&self.pool)
            .await?;

        Ok(total)
    }

    async fn count_by_status(&self, status: CollectionStatus) -> Result<i64, AppError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM collection_requests WHERE status = $1")
                .bind(status)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}
