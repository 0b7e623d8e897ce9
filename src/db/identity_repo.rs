// src/db/identity_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{Identity, IdentityUpdate},
};

// Provedor de identidade: guarda e-mail, senha e o estado do convite.
// Os tokens de convite chegam aqui só como hash SHA-256.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn invite_user_by_email(&self, email: &str, token_hash: &str) -> Result<Identity, AppError>;

    /// Identidade já confirmada (usada para o super admin inicial)
    async fn create_confirmed_user(&self, email: &str, password_hash: &str) -> Result<Identity, AppError>;

    /// Troca o hash do convite e renova `invite_sent_at`
    async fn reissue_invite(&self, id: Uuid, token_hash: &str) -> Result<Option<Identity>, AppError>;

    async fn get_user(&self, id: Uuid) -> Result<Option<Identity>, AppError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, AppError>;

    async fn find_by_invite_token_hash(&self, token_hash: &str) -> Result<Option<Identity>, AppError>;

    async fn list_users(&self) -> Result<Vec<Identity>, AppError>;

    async fn update_user(&self, id: Uuid, update: IdentityUpdate) -> Result<Option<Identity>, AppError>;

    /// `false` se a identidade não existia
    async fn delete_user(&self, id: Uuid) -> Result<bool, AppError>;
}

const IDENTITY_COLUMNS: &str = r#"
    id, email, password_hash, invite_token_hash, invite_sent_at,
    email_confirmed_at, last_sign_in_at, created_at, updated_at
"#;

// Violação de UNIQUE no e-mail vira erro de domínio, o resto sobe como erro de banco
pub(crate) fn map_unique_email(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::EmailAlreadyExists;
        }
    }
    e.into()
}

#[derive(Clone)]
pub struct IdentityRepository {
    pool: PgPool,
}

impl IdentityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityProvider for IdentityRepository {
    async fn invite_user_by_email(&self, email: &str, token_hash: &str) -> Result<Identity, AppError> {
        let sql = format!(
            "INSERT INTO auth_identities (email, invite_token_hash, invite_sent_at)
             VALUES ($1, $2, NOW())
             RETURNING {IDENTITY_COLUMNS}"
        );

        sqlx::query_as::<_, Identity>(&sql)
            .bind(email)
            .bind(token_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(map_unique_email)
    }

    async fn create_confirmed_user(&self, email: &str, password_hash: &str) -> Result<Identity, AppError> {
        let sql = format!(
            "INSERT INTO auth_identities (email, password_hash, email_confirmed_at)
             VALUES ($1, $2, NOW())
             RETURNING {IDENTITY_COLUMNS}"
        );

        sqlx::query_as::<_, Identity>(&sql)
            .bind(email)
            .bind(password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(map_unique_email)
    }

    async fn reissue_invite(&self, id: Uuid, token_hash: &str) -> Result<Option<Identity>, AppError> {
        let sql = format!(
            "UPDATE auth_identities
             SET invite_token_hash = $2, invite_sent_at = NOW(), updated_at = NOW()
             WHERE id = $1
             RETURNING {IDENTITY_COLUMNS}"
        );

        let identity = sqlx::query_as::<_, Identity>(&sql)
            .bind(id)
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .await?;

        Ok(identity)
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<Identity>, AppError> {
        let sql = format!("SELECT {IDENTITY_COLUMNS} FROM auth_identities WHERE id = $1");

        let identity = sqlx::query_as::<_, Identity>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(identity)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, AppError> {
        let sql = format!("SELECT {IDENTITY_COLUMNS} FROM auth_identities WHERE email = $1");

        let identity = sqlx::query_as::<_, Identity>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(identity)
    }

    async fn find_by_invite_token_hash(&self, token_hash: &str) -> Result<Option<Identity>, AppError> {
        let sql = format!("SELECT {IDENTITY_COLUMNS} FROM auth_identities WHERE invite_token_hash = $1");

        let identity = sqlx::query_as::<_, Identity>(&sql)
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .await?;

        Ok(identity)
    }

    async fn list_users(&self) -> Result<Vec<Identity>, AppError> {
        let sql = format!("SELECT {IDENTITY_COLUMNS} FROM auth_identities ORDER BY created_at DESC");

        let identities = sqlx::query_as::<_, Identity>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(identities)
    }

    async fn update_user(&self, id: Uuid, update: IdentityUpdate) -> Result<Option<Identity>, AppError> {
        // Campos ausentes no update mantêm o valor atual
        let sql = format!(
            "UPDATE auth_identities
             SET password_hash = COALESCE($2, password_hash),
                 email_confirmed_at = CASE WHEN $3 THEN COALESCE(email_confirmed_at, NOW())
                                           ELSE email_confirmed_at END,
                 invite_token_hash = CASE WHEN $4 THEN NULL ELSE invite_token_hash END,
                 last_sign_in_at = COALESCE($5, last_sign_in_at),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {IDENTITY_COLUMNS}"
        );

        let identity = sqlx::query_as::<_, Identity>(&sql)
            .bind(id)
            .bind(update.password_hash)
            .bind(update.confirm_email)
            .bind(update.clear_invite)
            .bind(update.signed_in_at)
            .fetch_optional(&self.pool)
            .await?;

        Ok(identity)
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM auth_identities WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
