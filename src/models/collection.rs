// src/models/collection.rs

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

// Mapeia o CREATE TYPE collection_status do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "collection_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CollectionStatus {
    Pending,
    Approved,
    Rejected,
    Collected,
    Uncollected,
}

impl CollectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionStatus::Pending => "pending",
            CollectionStatus::Approved => "approved",
            CollectionStatus::Rejected => "rejected",
            CollectionStatus::Collected => "collected",
            CollectionStatus::Uncollected => "uncollected",
        }
    }
}

impl fmt::Display for CollectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollectionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(CollectionStatus::Pending),
            "approved" => Ok(CollectionStatus::Approved),
            "rejected" => Ok(CollectionStatus::Rejected),
            "collected" => Ok(CollectionStatus::Collected),
            "uncollected" => Ok(CollectionStatus::Uncollected),
            other => Err(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CollectionRequest {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    #[schema(example = 40)]
    pub quantity: i32,
    #[schema(value_type = String, example = "2026-03-01")]
    pub target_date: NaiveDate,
    pub status: CollectionStatus,
    // Muazzin que fez o pedido
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCollectionRequest {
    pub quantity: i32,
    pub target_date: NaiveDate,
    pub created_by: Uuid,
}

// Visão do restaurante: pedido + e-mail de quem pediu
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CollectionRequestWithCreator {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub request: CollectionRequest,
    pub creator_email: Option<String>,
}

// Valida o formato YYYY-MM-DD e se a data existe no calendário
pub fn validate_target_date(value: &str) -> Result<(), ValidationError> {
    let well_formed = value.len() == 10
        && value.char_indices().all(|(i, c)| match i {
            4 | 7 => c == '-',
            _ => c.is_ascii_digit(),
        });

    if !well_formed || NaiveDate::parse_from_str(value, "%Y-%m-%d").is_err() {
        let mut err = ValidationError::new("target_date");
        err.message = Some("invalid_target_date".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCollectionPayload {
    #[validate(range(min = 1, max = 2147483647, message = "invalid_quantity"))]
    #[schema(example = 40)]
    pub quantity: i64,

    #[validate(custom(function = "validate_target_date"))]
    #[schema(example = "2026-03-01")]
    pub target_date: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCollectionStatusPayload {
    #[schema(example = "collected")]
    pub status: CollectionStatus,
}
