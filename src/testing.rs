// src/testing.rs
//
// Implementações em memória das stores e do storage, usadas pelos testes dos
// serviços e do router. Cada fake tem chaves para forçar falhas.

use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::{
    common::{error::AppError, pagination::PageParams},
    config::{AppState, Config, Stores},
    db::{CollectionStore, DonationStore, IdentityProvider, ProfileStore},
    models::{
        auth::{AccessContext, Identity, IdentityUpdate},
        collection::{
            CollectionRequest, CollectionRequestWithCreator, CollectionStatus, NewCollectionRequest,
        },
        donation::{Donation, DonationStatus, NewDonation},
        profile::{NewProfile, Profile, UserRole},
    },
    services::{
        auth::normalize_email, AdminService, AuthService, CollectionService, DashboardService,
        DonationService,
    },
    storage::{ObjectStorage, SignedUrl},
};

// Custo mínimo aceito pelo bcrypt; deixa os testes rápidos
pub const TEST_BCRYPT_COST: u32 = 4;

fn db_down() -> AppError {
    AppError::DatabaseError(sqlx::Error::PoolTimedOut)
}

fn paginate<T>(rows: Vec<T>, page: PageParams) -> Vec<T> {
    rows.into_iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .collect()
}

// --- Identidades ---

#[derive(Default)]
pub struct FakeIdentityProvider {
    rows: Mutex<HashMap<Uuid, Identity>>,
    fail_writes: AtomicBool,
}

impl FakeIdentityProvider {
    pub fn fail_writes(&self, on: bool) {
        self.fail_writes.store(on, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    fn check_writes(&self) -> Result<(), AppError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(db_down());
        }
        Ok(())
    }

    fn create(&self, email: &str, password_hash: Option<&str>, token_hash: Option<&str>) -> Result<Identity, AppError> {
        self.check_writes()?;
        let mut rows = self.rows.lock().unwrap();
        if rows.values().any(|i| i.email == email) {
            return Err(AppError::EmailAlreadyExists);
        }

        let now = Utc::now();
        let identity = Identity {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.map(str::to_string),
            invite_token_hash: token_hash.map(str::to_string),
            invite_sent_at: token_hash.map(|_| now),
            email_confirmed_at: password_hash.map(|_| now),
            last_sign_in_at: None,
            created_at: now,
            updated_at: now,
        };
        rows.insert(identity.id, identity.clone());
        Ok(identity)
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    async fn invite_user_by_email(&self, email: &str, token_hash: &str) -> Result<Identity, AppError> {
        self.create(email, None, Some(token_hash))
    }

    async fn create_confirmed_user(&self, email: &str, password_hash: &str) -> Result<Identity, AppError> {
        self.create(email, Some(password_hash), None)
    }

    async fn reissue_invite(&self, id: Uuid, token_hash: &str) -> Result<Option<Identity>, AppError> {
        self.check_writes()?;
        let mut rows = self.rows.lock().unwrap();
        Ok(rows.get_mut(&id).map(|identity| {
            identity.invite_token_hash = Some(token_hash.to_string());
            identity.invite_sent_at = Some(Utc::now());
            identity.clone()
        }))
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<Identity>, AppError> {
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, AppError> {
        Ok(self.rows.lock().unwrap().values().find(|i| i.email == email).cloned())
    }

    async fn find_by_invite_token_hash(&self, token_hash: &str) -> Result<Option<Identity>, AppError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .find(|i| i.invite_token_hash.as_deref() == Some(token_hash))
            .cloned())
    }

    async fn list_users(&self) -> Result<Vec<Identity>, AppError> {
        Ok(self.rows.lock().unwrap().values().cloned().collect())
    }

    async fn update_user(&self, id: Uuid, update: IdentityUpdate) -> Result<Option<Identity>, AppError> {
        self.check_writes()?;
        let mut rows = self.rows.lock().unwrap();
        let Some(identity) = rows.get_mut(&id) else {
            return Ok(None);
        };

        let now = Utc::now();
        if let Some(hash) = update.password_hash {
            identity.password_hash = Some(hash);
        }
        if update.confirm_email && identity.email_confirmed_at.is_none() {
            identity.email_confirmed_at = Some(now);
        }
        if update.clear_invite {
            identity.invite_token_hash = None;
        }
        if let Some(at) = update.signed_in_at {
            identity.last_sign_in_at = Some(at);
        }
        identity.updated_at = now;
        Ok(Some(identity.clone()))
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, AppError> {
        self.check_writes()?;
        Ok(self.rows.lock().unwrap().remove(&id).is_some())
    }
}

// --- Perfis ---

#[derive(Default)]
pub struct FakeProfileStore {
    rows: Mutex<HashMap<Uuid, Profile>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl FakeProfileStore {
    pub fn fail_reads(&self, on: bool) {
        self.fail_reads.store(on, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, on: bool) {
        self.fail_writes.store(on, Ordering::SeqCst);
    }

    fn email_of(&self, id: Uuid) -> Option<String> {
        self.rows.lock().unwrap().get(&id).map(|p| p.email.clone())
    }

    fn check(&self, flag: &AtomicBool) -> Result<(), AppError> {
        if flag.load(Ordering::SeqCst) {
            return Err(db_down());
        }
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for FakeProfileStore {
    async fn insert(&self, new: NewProfile) -> Result<Profile, AppError> {
        self.restore(Profile {
            id: new.id,
            email: new.email,
            role: new.role,
            created_at: Utc::now(),
        })
        .await
    }

    async fn restore(&self, profile: Profile) -> Result<Profile, AppError> {
        self.check(&self.fail_writes)?;
        let mut rows = self.rows.lock().unwrap();
        if rows.contains_key(&profile.id) || rows.values().any(|p| p.email == profile.email) {
            return Err(AppError::EmailAlreadyExists);
        }
        rows.insert(profile.id, profile.clone());
        Ok(profile)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Profile>, AppError> {
        self.check(&self.fail_reads)?;
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Profile>, AppError> {
        self.check(&self.fail_reads)?;
        let mut profiles: Vec<Profile> = self.rows.lock().unwrap().values().cloned().collect();
        profiles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(profiles)
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Profile>, AppError> {
        self.check(&self.fail_writes)?;
        Ok(self.rows.lock().unwrap().remove(&id))
    }
}

// --- Doações ---

#[derive(Default)]
pub struct FakeDonationStore {
    rows: Mutex<Vec<Donation>>,
    fail_writes: AtomicBool,
    // Status gravado "por outro revisor" logo antes da próxima escrita
    race_next: Mutex<Option<DonationStatus>>,
}

impl FakeDonationStore {
    pub fn fail_writes(&self, on: bool) {
        self.fail_writes.store(on, Ordering::SeqCst);
    }

    pub fn race_next_transition(&self, status: DonationStatus) {
        *self.race_next.lock().unwrap() = Some(status);
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl DonationStore for FakeDonationStore {
    async fn insert(&self, new: NewDonation) -> Result<Donation, AppError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(db_down());
        }
        let now = Utc::now();
        let donation = Donation {
            id: Uuid::new_v4(),
            quantity: new.quantity,
            proof_url: new.proof_url,
            status: DonationStatus::Pending,
            reviewed_by: None,
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().unwrap().push(donation.clone());
        Ok(donation)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Donation>, AppError> {
        Ok(self.rows.lock().unwrap().iter().find(|d| d.id == id).cloned())
    }

    async fn transition_status(
        &self,
        id: Uuid,
        from: DonationStatus,
        to: DonationStatus,
        reviewer: Uuid,
    ) -> Result<Option<Donation>, AppError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(db_down());
        }
        let raced = self.race_next.lock().unwrap().take();
        let mut rows = self.rows.lock().unwrap();
        let Some(row) = rows.iter_mut().find(|d| d.id == id) else {
            return Ok(None);
        };
        if let Some(status) = raced {
            row.status = status;
        }
        if row.status != from {
            return Ok(None);
        }

        row.status = to;
        row.reviewed_by = Some(reviewer);
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }

    async fn list(&self, status: Option<DonationStatus>, page: PageParams) -> Result<Vec<Donation>, AppError> {
        let mut rows: Vec<Donation> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|d| status.is_none_or(|s| d.status == s))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));
        Ok(paginate(rows, page))
    }

    async fn sum_quantity(&self, status: DonationStatus) -> Result<i64, AppError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.status == status)
            .map(|d| i64::from(d.quantity))
            .sum())
    }

    async fn count_by_status(&self, status: DonationStatus) -> Result<i64, AppError> {
        Ok(self.rows.lock().unwrap().iter().filter(|d| d.status == status).count() as i64)
    }
}

// --- Pedidos de coleta ---

pub struct FakeCollectionStore {
    rows: Mutex<Vec<CollectionRequest>>,
    profiles: Arc<FakeProfileStore>,
}

impl FakeCollectionStore {
    pub fn new(profiles: Arc<FakeProfileStore>) -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            profiles,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    // Atalho para montar cenários sem passar pelas regras de transição
    pub fn force_status(&self, id: Uuid, status: CollectionStatus) {
        if let Some(row) = self.rows.lock().unwrap().iter_mut().find(|r| r.id == id) {
            row.status = status;
        }
    }

    fn filtered(&self, status: Option<CollectionStatus>) -> Vec<CollectionRequest> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| status.is_none_or(|s| r.status == s))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl CollectionStore for FakeCollectionStore {
    async fn insert(&self, new: NewCollectionRequest) -> Result<CollectionRequest, AppError> {
        let now = Utc::now();
        let request = CollectionRequest {
            id: Uuid::new_v4(),
            quantity: new.quantity,
            target_date: new.target_date,
            status: CollectionStatus::Pending,
            created_by: new.created_by,
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().unwrap().push(request.clone());
        Ok(request)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<CollectionRequest>, AppError> {
        Ok(self.rows.lock().unwrap().iter().find(|r| r.id == id).cloned())
    }

    async fn transition_status(
        &self,
        id: Uuid,
        from: CollectionStatus,
        to: CollectionStatus,
    ) -> Result<Option<CollectionRequest>, AppError> {
        let mut rows = self.rows.lock().unwrap();
        Ok(rows
            .iter_mut()
            .find(|r| r.id == id && r.status == from)
            .map(|row| {
                row.status = to;
                row.updated_at = Utc::now();
                row.clone()
            }))
    }

    async fn list_by_creator(
        &self,
        creator: Uuid,
        status: Option<CollectionStatus>,
        page: PageParams,
    ) -> Result<Vec<CollectionRequest>, AppError> {
        let mut rows: Vec<CollectionRequest> = self
            .filtered(status)
            .into_iter()
            .filter(|r| r.created_by == creator)
            .collect();
        rows.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));
        Ok(paginate(rows, page))
    }

    async fn list_with_creator(
        &self,
        status: Option<CollectionStatus>,
        page: PageParams,
    ) -> Result<Vec<CollectionRequestWithCreator>, AppError> {
        let mut rows = self.filtered(status);
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(paginate(rows, page)
            .into_iter()
            .map(|request| CollectionRequestWithCreator {
                creator_email: self.profiles.email_of(request.created_by),
                request,
            })
            .collect())
    }

    async fn sum_quantity(&self, status: Option<CollectionStatus>) -> Result<i64, AppError> {
        Ok(self.filtered(status).iter().map(|r| i64::from(r.quantity)).sum())
    }

    async fn count_by_status(&self, status: CollectionStatus) -> Result<i64, AppError> {
        Ok(self.filtered(Some(status)).len() as i64)
    }
}

// --- Storage ---

#[derive(Default)]
pub struct FakeObjectStorage {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    fail_removes: AtomicBool,
    sign_calls: AtomicUsize,
}

impl FakeObjectStorage {
    pub fn fail_removes(&self, on: bool) {
        self.fail_removes.store(on, Ordering::SeqCst);
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.objects.lock().unwrap().contains_key(path)
    }

    pub fn sign_calls(&self) -> usize {
        self.sign_calls.load(Ordering::SeqCst)
    }

    fn token(path: &str, expires: i64) -> String {
        format!("fake-{path}-{expires}")
    }
}

#[async_trait]
impl ObjectStorage for FakeObjectStorage {
    async fn upload(&self, path: &str, bytes: &[u8], _content_type: Option<&str>) -> Result<(), AppError> {
        let mut objects = self.objects.lock().unwrap();
        if objects.contains_key(path) {
            return Err(AppError::StorageError(format!("{path} já existe")));
        }
        objects.insert(path.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn remove(&self, paths: &[String]) -> Result<(), AppError> {
        if self.fail_removes.load(Ordering::SeqCst) {
            return Err(AppError::StorageError("storage indisponível".into()));
        }
        let mut objects = self.objects.lock().unwrap();
        for path in paths {
            objects.remove(path);
        }
        Ok(())
    }

    async fn create_signed_urls(&self, paths: &[String], expires_in_secs: i64) -> Result<Vec<SignedUrl>, AppError> {
        self.sign_calls.fetch_add(1, Ordering::SeqCst);
        let expires = Utc::now().timestamp() + expires_in_secs;
        let objects = self.objects.lock().unwrap();

        Ok(paths
            .iter()
            .map(|path| SignedUrl {
                path: path.clone(),
                signed_url: objects.contains_key(path).then(|| {
                    format!(
                        "http://localhost:3000/api/storage/receipts/{path}?expires={expires}&token={}",
                        Self::token(path, expires)
                    )
                }),
            })
            .collect())
    }

    async fn download(&self, path: &str) -> Result<Option<Vec<u8>>, AppError> {
        Ok(self.objects.lock().unwrap().get(path).cloned())
    }

    fn verify(&self, path: &str, expires: i64, token: &str) -> bool {
        expires >= Utc::now().timestamp() && token == Self::token(path, expires)
    }
}

// --- Montagem ---

#[derive(Clone)]
pub struct Fakes {
    pub identities: Arc<FakeIdentityProvider>,
    pub profiles: Arc<FakeProfileStore>,
    pub donations: Arc<FakeDonationStore>,
    pub collections: Arc<FakeCollectionStore>,
    pub storage: Arc<FakeObjectStorage>,
}

impl Default for Fakes {
    fn default() -> Self {
        let profiles = Arc::new(FakeProfileStore::default());
        Self {
            identities: Arc::new(FakeIdentityProvider::default()),
            collections: Arc::new(FakeCollectionStore::new(profiles.clone())),
            profiles,
            donations: Arc::new(FakeDonationStore::default()),
            storage: Arc::new(FakeObjectStorage::default()),
        }
    }
}

impl Fakes {
    /// Identidade confirmada com senha, sem perfil.
    pub async fn identity_with_password(&self, email: &str, password: &str) -> Identity {
        let hash = bcrypt::hash(password, TEST_BCRYPT_COST).unwrap();
        self.identities
            .create_confirmed_user(&normalize_email(email), &hash)
            .await
            .unwrap()
    }

    /// Identidade confirmada + perfil com o papel dado.
    pub async fn user(&self, email: &str, role: UserRole) -> Identity {
        let identity = self
            .identities
            .create_confirmed_user(&normalize_email(email), "sem-login")
            .await
            .unwrap();
        self.profiles
            .insert(NewProfile {
                id: identity.id,
                email: identity.email.clone(),
                role,
            })
            .await
            .unwrap();
        identity
    }

    pub async fn ctx_for(&self, email: &str, role: UserRole) -> AccessContext {
        let identity = self.user(email, role).await;
        AccessContext::authenticated(identity.id, identity.email, role)
    }

    pub async fn ctx(&self, role: UserRole) -> AccessContext {
        self.ctx_for(&format!("{role}-{}@test.org", Uuid::new_v4()), role).await
    }

    pub fn stores(&self) -> Stores {
        Stores {
            identities: self.identities.clone(),
            profiles: self.profiles.clone(),
            donations: self.donations.clone(),
            collections: self.collections.clone(),
            storage: self.storage.clone(),
        }
    }
}

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://unused".into(),
        jwt_secret: "segredo-jwt-de-teste".into(),
        storage_signing_secret: "segredo-storage-de-teste".into(),
        bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
        site_url: "http://localhost:3000".into(),
        public_base_url: "http://localhost:3000".into(),
        storage_root: "./storage".into(),
        db_max_connections: 1,
        session_ttl_days: 7,
        invite_ttl_hours: 24,
        max_upload_bytes: 1024 * 1024,
        bcrypt_cost: TEST_BCRYPT_COST,
        bootstrap_admin: None,
    }
}

pub fn app_state(fakes: &Fakes) -> AppState {
    AppState::new(test_config(), fakes.stores()).unwrap()
}

pub fn auth_service(fakes: &Fakes) -> AuthService {
    app_state(fakes).auth_service
}

pub fn donation_service(fakes: &Fakes) -> DonationService {
    DonationService::new(fakes.donations.clone(), fakes.storage.clone())
}

pub fn collection_service(fakes: &Fakes) -> CollectionService {
    CollectionService::new(fakes.collections.clone())
}

pub fn admin_service(fakes: &Fakes) -> AdminService {
    app_state(fakes).admin_service
}

pub fn dashboard_service(fakes: &Fakes) -> DashboardService {
    DashboardService::new(fakes.donations.clone(), fakes.collections.clone())
}
