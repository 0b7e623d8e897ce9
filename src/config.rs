// src/config.rs

use std::{env, net::SocketAddr, str::FromStr, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::i18n::I18nStore,
    db::{
        CollectionRepository, CollectionStore, DonationRepository, DonationStore,
        IdentityProvider, IdentityRepository, ProfileRepository, ProfileStore,
    },
    services::{AdminService, AuthService, CollectionService, DashboardService, DonationService},
    storage::{LocalObjectStorage, ObjectStorage},
};

const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

// Configuração lida do ambiente (.env em desenvolvimento)
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub storage_signing_secret: String,
    pub bind_addr: SocketAddr,
    pub site_url: String,
    pub public_base_url: String,
    pub storage_root: String,
    pub db_max_connections: u32,
    pub session_ttl_days: i64,
    pub invite_ttl_hours: i64,
    pub max_upload_bytes: usize,
    pub bcrypt_cost: u32,
    pub bootstrap_admin: Option<(String, String)>,
}

fn required(name: &str) -> anyhow::Result<String> {
    env::var(name).with_context(|| format!("{name} deve ser definida"))
}

fn optional_or<T: FromStr>(name: &str, default: T) -> anyhow::Result<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{name} inválida ({raw}): {e}")),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr = optional_or("BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 3000)))?;
        let site_url = env::var("SITE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
        let public_base_url = env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{}", bind_addr.port()));

        let bootstrap_admin = match (env::var("BOOTSTRAP_ADMIN_EMAIL"), env::var("BOOTSTRAP_ADMIN_PASSWORD")) {
            (Ok(email), Ok(password)) => Some((email, password)),
            _ => None,
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            storage_signing_secret: required("STORAGE_SIGNING_SECRET")?,
            bind_addr,
            site_url,
            public_base_url,
            storage_root: env::var("STORAGE_ROOT").unwrap_or_else(|_| "./storage".to_string()),
            db_max_connections: optional_or("DB_MAX_CONNECTIONS", 5)?,
            session_ttl_days: optional_or("SESSION_TTL_DAYS", 7)?,
            invite_ttl_hours: optional_or("INVITE_TTL_HOURS", 24)?,
            max_upload_bytes: optional_or("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            bcrypt_cost: optional_or("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            bootstrap_admin,
        })
    }

    pub async fn connect(&self) -> anyhow::Result<PgPool> {
        let pool = PgPoolOptions::new()
            .max_connections(self.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&self.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");
        Ok(pool)
    }
}

/// Implementações concretas dos colaboradores externos.
#[derive(Clone)]
pub struct Stores {
    pub identities: Arc<dyn IdentityProvider>,
    pub profiles: Arc<dyn ProfileStore>,
    pub donations: Arc<dyn DonationStore>,
    pub collections: Arc<dyn CollectionStore>,
    pub storage: Arc<dyn ObjectStorage>,
}

impl Stores {
    pub async fn postgres(config: &Config, pool: PgPool) -> anyhow::Result<Self> {
        let storage = LocalObjectStorage::new(
            &config.storage_root,
            &config.public_base_url,
            &config.storage_signing_secret,
        )
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))?;

        Ok(Self {
            identities: Arc::new(IdentityRepository::new(pool.clone())),
            profiles: Arc::new(ProfileRepository::new(pool.clone())),
            donations: Arc::new(DonationRepository::new(pool.clone())),
            collections: Arc::new(CollectionRepository::new(pool)),
            storage: Arc::new(storage),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub i18n_store: Arc<I18nStore>,
    pub storage: Arc<dyn ObjectStorage>,
    pub auth_service: AuthService,
    pub donation_service: DonationService,
    pub collection_service: CollectionService,
    pub admin_service: AdminService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    // --- Monta o gráfico de dependências ---
    pub fn new(config: Config, stores: Stores) -> anyhow::Result<Self> {
        let i18n_store = I18nStore::embedded()?;

        let auth_service = AuthService::new(
            stores.identities.clone(),
            stores.profiles.clone(),
            config.jwt_secret.clone(),
            chrono::Duration::days(config.session_ttl_days),
            chrono::Duration::hours(config.invite_ttl_hours),
            config.bcrypt_cost,
        );
        let donation_service = DonationService::new(stores.donations.clone(), stores.storage.clone());
        let collection_service = CollectionService::new(stores.collections.clone());
        let admin_service = AdminService::new(
            stores.identities,
            stores.profiles,
            &config.site_url,
            config.bcrypt_cost,
        );
        let dashboard_service = DashboardService::new(stores.donations, stores.collections);

        Ok(Self {
            config: Arc::new(config),
            i18n_store: Arc::new(i18n_store),
            storage: stores.storage,
            auth_service,
            donation_service,
            collection_service,
            admin_service,
            dashboard_service,
        })
    }
}
