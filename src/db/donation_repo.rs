// src/db/donation_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{error::AppError, pagination::PageParams},
    models::donation::{Donation, DonationStatus, NewDonation},
};

// Tudo o que os serviços precisam da tabela 'donations'
#[async_trait]
pub trait DonationStore: Send + Sync {
    async fn insert(&self, new: NewDonation) -> Result<Donation, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Donation>, AppError>;

    /// Escreve `to` somente se o status atual ainda for `from`.
    /// `None` = nenhuma linha bateu (não existe ou outro revisor chegou antes).
    async fn transition_status(
        &self,
        id: Uuid,
        from: DonationStatus,
        to: DonationStatus,
        reviewer: Uuid,
    ) -> Result<Option<Donation>, AppError>;

    /// Mais recentes primeiro (updated_at DESC, id DESC)
    async fn list(
        &self,
        status: Option<DonationStatus>,
        page: PageParams,
    ) -> Result<Vec<Donation>, AppError>;

    async fn sum_quantity(&self, status: DonationStatus) -> Result<i64, AppError>;

    async fn count_by_status(&self, status: DonationStatus) -> Result<i64, AppError>;
}

#[derive(Clone)]
pub struct DonationRepository {
    pool: PgPool,
}

impl DonationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DonationStore for DonationRepository {
    async fn insert(&self, new: NewDonation) -> Result<Donation, AppError> {
        let donation = sqlx::query_as::<_, Donation>(
            r#"
            INSERT INTO donations (quantity, proof_url, status)
            VALUES ($1, $2, 'pending')
            RETURNING id, quantity, proof_url, status, reviewed_by, created_at, updated_at
            "#,
        )
            .bind(new.quantity)
            .bind(&new.proof_url)
            .fetch_one(&self.pool)
            .await?;

        Ok(donation)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Donation>, AppError> {
        let donation = sqlx::query_as::<_, Donation>(
            r#"
            SELECT id, quantity, proof_url, status, reviewed_by, created_at, updated_at
            FROM donations
            WHERE id = $1
            "#,
        )
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(donation)
    }

    async fn transition_status(
        &self,
        id: Uuid,
        from: DonationStatus,
        to: DonationStatus,
        reviewer: Uuid,
    ) -> Result<Option<Donation>, AppError> {
        // Compare-and-set: o WHERE no status esperado evita o "último a escrever vence"
        let donation = sqlx::query_as::<_, Donation>(
            r#"
            UPDATE donations
            SET status = $3, reviewed_by = $4, updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING id, quantity, proof_url, status, reviewed_by, created_at, updated_at
            "#,
        )
            .bind(id)
            .bind(from)
            .bind(to)
            .bind(reviewer)
            .fetch_optional(&self.pool)
            .await?;

        Ok(donation)
    }

    async fn list(
        &self,
        status: Option<DonationStatus>,
        page: PageParams,
    ) -> Result<Vec<Donation>, AppError> {
        let donations = sqlx::query_as::<_, Donation>(
            r#"
            SELECT id, quantity, proof_url, status, reviewed_by, created_at, updated_at
            FROM donations
            WHERE ($1::donation_status IS NULL OR status = $1)
            ORDER BY updated_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
            .bind(status)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(donations)
    }

    async fn sum_quantity(&self, status: DonationStatus) -> Result<i64, AppError> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(quantity), 0)::BIGINT FROM donations WHERE status = $1",
        )
            .bind(status)
            .fetch_one(&self.pool)
            .await?;

        Ok(total)
    }

    async fn count_by_status(&self, status: DonationStatus) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM donations WHERE status = $1")
            .bind(status)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
