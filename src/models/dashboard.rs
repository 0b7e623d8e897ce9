// src/models/dashboard.rs

use serde::Serialize;
use utoipa::ToSchema;

// Cards do painel do muazzin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MuazzinStats {
    pub pending_count: i64,      // Doações aguardando revisão
    pub approved_packets: i64,   // Soma das doações aprovadas
    pub requested_packets: i64,  // Soma de todos os pedidos de coleta
    pub collected_packets: i64,  // Soma dos pedidos já coletados
    pub packets_available: i64,  // max(0, aprovados - pedidos)
}

// Cards do painel do restaurante
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantStats {
    pub pending_count: i64,
    pub approved_count: i64,
    pub fulfilled_count: i64,
}
