// src/storage/local.rs

use std::{
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tokio::{
    fs,
    io::{AsyncWrite, AsyncWriteExt},
};

use super::{is_valid_key, ObjectStorage, SignedUrl};
use crate::common::error::AppError;

type HmacSha256 = Hmac<Sha256>;

pub const BUCKET: &str = "receipts";

// Bucket em disco: `{root}/receipts/{chave}`. As URLs apontam para a rota
// `/api/storage/receipts/{chave}` deste mesmo serviço.
#[derive(Clone)]
pub struct LocalObjectStorage {
    bucket_dir: PathBuf,
    public_base_url: String,
    signing_secret: String,
}

impl LocalObjectStorage {
    pub async fn new(
        root: impl AsRef<Path>,
        public_base_url: &str,
        signing_secret: &str,
    ) -> Result<Self, AppError> {
        let bucket_dir = root.as_ref().join(BUCKET);
        fs::create_dir_all(&bucket_dir)
            .await
            .map_err(|e| AppError::StorageError(format!("Falha ao criar o bucket: {e}")))?;

        Ok(Self {
            bucket_dir,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            signing_secret: signing_secret.to_string(),
        })
    }

    fn object_path(&self, key: &str) -> Result<PathBuf, AppError> {
        if !is_valid_key(key) {
            return Err(AppError::StorageError(format!("Chave inválida: {key}")));
        }
        Ok(self.bucket_dir.join(key))
    }

    fn mac(&self, key: &str, expires: i64) -> Result<HmacSha256, AppError> {
        let mut mac = HmacSha256::new_from_slice(self.signing_secret.as_bytes())
            .map_err(|e| AppError::StorageError(e.to_string()))?;
        mac.update(format!("{BUCKET}/{key}:{expires}").as_bytes());
        Ok(mac)
    }

    fn sign(&self, key: &str, expires: i64) -> Result<String, AppError> {
        Ok(hex::encode(self.mac(key, expires)?.finalize().into_bytes()))
    }
}

// Escrita interrompida não deixa arquivo parcial sob a chave nova
async fn write_or_discard<W>(writer: &mut W, object: &Path, bytes: &[u8]) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let written = async {
        writer.write_all(bytes).await?;
        writer.flush().await
    }
    .await;

    if let Err(e) = written {
        if let Err(remove_err) = fs::remove_file(object).await {
            tracing::error!(
                target: "reconciliation",
                object = %object.display(),
                error = %e,
                rollback_error = %remove_err,
                "Arquivo parcial não removido"
            );
        }
        return Err(e);
    }
    Ok(())
}

#[async_trait]
impl ObjectStorage for LocalObjectStorage {
    async fn upload(&self, path: &str, bytes: &[u8], content_type: Option<&str>) -> Result<(), AppError> {
        let target = self.object_path(path)?;

        // create_new = sem upsert
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
            .await
            .map_err(|e| AppError::StorageError(format!("Falha no upload de {path}: {e}")))?;

        write_or_discard(&mut file, &target, bytes)
            .await
            .map_err(|e| AppError::StorageError(format!("Falha no upload de {path}: {e}")))?;

        tracing::debug!(path, content_type, size = bytes.len(), "Objeto gravado");
        Ok(())
    }

    async fn remove(&self, paths: &[String]) -> Result<(), AppError> {
        for path in paths {
            let target = self.object_path(path)?;
            match fs::remove_file(&target).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(AppError::StorageError(format!("Falha ao remover {path}: {e}")));
                }
            }
        }
        Ok(())
    }

    async fn create_signed_urls(&self, paths: &[String], expires_in_secs: i64) -> Result<Vec<SignedUrl>, AppError> {
        let expires = Utc::now().timestamp() + expires_in_secs;
        let mut signed = Vec::with_capacity(paths.len());

        for path in paths {
            let exists = match self.object_path(path) {
                Ok(target) => fs::try_exists(&target).await.unwrap_or(false),
                Err(_) => false,
            };

            let signed_url = if exists {
                let token = self.sign(path, expires)?;
                Some(format!(
                    "{}/api/storage/{BUCKET}/{path}?expires={expires}&token={token}",
                    self.public_base_url
                ))
            } else {
                None
            };

            signed.push(SignedUrl { path: path.clone(), signed_url });
        }

        Ok(signed)
    }

    async fn download(&self, path: &str) -> Result<Option<Vec<u8>>, AppError> {
        let target = self.object_path(path)?;
        match fs::read(&target).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::StorageError(format!("Falha ao ler {path}: {e}"))),
        }
    }

    fn verify(&self, path: &str, expires: i64, token: &str) -> bool {
        if !is_valid_key(path) || expires < Utc::now().timestamp() {
            return false;
        }
        let Ok(signature) = hex::decode(token) else {
            return false;
        };
        // verify_slice compara em tempo constante
        self.mac(path, expires)
            .map(|mac| mac.verify_slice(&signature).is_ok())
            .unwrap_or(false)
    }
}
