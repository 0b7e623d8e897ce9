// src/models/donation.rs

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Mapeia o CREATE TYPE donation_status do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "donation_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DonationStatus {
    Pending,
    Approved,
    Rejected,
}

impl DonationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DonationStatus::Pending => "pending",
            DonationStatus::Approved => "approved",
            DonationStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for DonationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DonationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(DonationStatus::Pending),
            "approved" => Ok(DonationStatus::Approved),
            "rejected" => Ok(DonationStatus::Rejected),
            other => Err(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Donation {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    #[schema(example = 5)]
    pub quantity: i32,
    // Chave do objeto no bucket `receipts` (não é uma URL pública)
    #[schema(example = "3f1c2a4e-7d1b-4b7e-9a55-1f0c8e2d9b11.jpg")]
    pub proof_url: String,
    pub status: DonationStatus,
    pub reviewed_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewDonation {
    pub quantity: i32,
    pub proof_url: String,
}

// Decisões possíveis na revisão do muazzin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReviewDecision {
    Approved,
    Rejected,
}

impl From<ReviewDecision> for DonationStatus {
    fn from(decision: ReviewDecision) -> Self {
        match decision {
            ReviewDecision::Approved => DonationStatus::Approved,
            ReviewDecision::Rejected => DonationStatus::Rejected,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReviewDonationPayload {
    #[schema(example = "approved")]
    pub status: ReviewDecision,
}

// Doação + URL assinada (1h) do comprovante
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DonationWithSignedUrl {
    #[serde(flatten)]
    pub donation: Donation,
    pub signed_proof_url: Option<String>,
}

// Arquivo recebido no formulário público (multipart)
#[derive(Debug, Clone, Default)]
pub struct ProofFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}
