// src/storage.rs
//
// Armazenamento dos comprovantes (bucket "receipts"). O banco guarda só a chave
// do objeto; o acesso de leitura é sempre por URL assinada com validade.

pub mod local;

pub use local::LocalObjectStorage;

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::common::error::AppError;

/// Validade das URLs assinadas devolvidas na listagem de doações (1 hora)
pub const SIGNED_URL_TTL_SECS: i64 = 3600;

const FALLBACK_EXTENSION: &str = "bin";
const MAX_EXTENSION_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedUrl {
    pub path: String,
    /// `None` quando o caminho não pôde ser assinado (objeto ausente ou chave inválida)
    pub signed_url: Option<String>,
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Sem upsert: falha se já existir um objeto com essa chave.
    async fn upload(&self, path: &str, bytes: &[u8], content_type: Option<&str>) -> Result<(), AppError>;

    /// Objetos inexistentes são ignorados.
    async fn remove(&self, paths: &[String]) -> Result<(), AppError>;

    /// Uma chamada para N caminhos, na mesma ordem da entrada.
    async fn create_signed_urls(&self, paths: &[String], expires_in_secs: i64) -> Result<Vec<SignedUrl>, AppError>;

    async fn download(&self, path: &str) -> Result<Option<Vec<u8>>, AppError>;

    fn verify(&self, path: &str, expires: i64, token: &str) -> bool;
}

/// Chave nova para um comprovante: `{uuid}.{ext}`, extensão higienizada ou `bin`.
pub fn object_key(file_name: Option<&str>) -> String {
    let extension = file_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| {
            !ext.is_empty()
                && ext.len() <= MAX_EXTENSION_LEN
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .unwrap_or_else(|| FALLBACK_EXTENSION.to_string());

    format!("{}.{}", Uuid::new_v4(), extension)
}

/// Chaves são planas: sem separadores, sem `..`, só `[A-Za-z0-9._-]`.
pub fn is_valid_key(path: &str) -> bool {
    !path.is_empty()
        && !path.starts_with('.')
        && !path.contains("..")
        && path.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
}

pub fn content_type_for(path: &str) -> &'static str {
    let extension = path.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("heic") => "image/heic",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}
