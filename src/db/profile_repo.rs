// src/db/profile_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::identity_repo::map_unique_email,
    models::profile::{NewProfile, Profile},
};

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn insert(&self, new: NewProfile) -> Result<Profile, AppError>;

    /// Recoloca um perfil removido mantendo o `created_at` original
    async fn restore(&self, profile: Profile) -> Result<Profile, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Profile>, AppError>;

    async fn list(&self) -> Result<Vec<Profile>, AppError>;

    /// Devolve o perfil removido (necessário para recriá-lo se a exclusão da identidade falhar)
    async fn delete(&self, id: Uuid) -> Result<Option<Profile>, AppError>;
}

#[derive(Clone)]
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for ProfileRepository {
    async fn insert(&self, new: NewProfile) -> Result<Profile, AppError> {
        sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (id, email, role)
            VALUES ($1, $2, $3)
            RETURNING id, email, role, created_at
            "#,
        )
            .bind(new.id)
            .bind(&new.email)
            .bind(new.role)
            .fetch_one(&self.pool)
            .await
            .map_err(map_unique_email)
    }

    async fn restore(&self, profile: Profile) -> Result<Profile, AppError> {
        sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (id, email, role, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, role, created_at
            "#,
        )
            .bind(profile.id)
            .bind(&profile.email)
            .bind(profile.role)
            .bind(profile.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(map_unique_email)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Profile>, AppError> {
        let profile = sqlx::query_as::<_, Profile>(
            "SELECT id, email, role, created_at FROM profiles WHERE id = $1",
        )
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(profile)
    }

    async fn list(&self) -> Result<Vec<Profile>, AppError> {
        let profiles = sqlx::query_as::<_, Profile>(
            "SELECT id, email, role, created_at FROM profiles ORDER BY created_at DESC",
        )
            .fetch_all(&self.pool)
            .await?;

        Ok(profiles)
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Profile>, AppError> {
        let profile = sqlx::query_as::<_, Profile>(
            "DELETE FROM profiles WHERE id = $1 RETURNING id, email, role, created_at",
        )
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(profile)
    }
}
