// src/services/dashboard_service.rs

use std::sync::Arc;

use crate::{
    common::error::AppError,
    db::{CollectionStore, DonationStore},
    models::{
        auth::{AccessContext, AccessRole},
        collection::CollectionStatus,
        dashboard::{MuazzinStats, RestaurantStats},
        donation::DonationStatus,
    },
};

/// Pacotes disponíveis = aprovados - todos os pedidos (qualquer status), nunca negativo.
pub fn available_packets(approved_sum: i64, requested_sum: i64) -> i64 {
    (approved_sum - requested_sum).max(0)
}

#[derive(Clone)]
pub struct DashboardService {
    donations: Arc<dyn DonationStore>,
    collections: Arc<dyn CollectionStore>,
}

impl DashboardService {
    pub fn new(donations: Arc<dyn DonationStore>, collections: Arc<dyn CollectionStore>) -> Self {
        Self { donations, collections }
    }

    // Recalculado a cada leitura, sem cache
    pub async fn muazzin_stats(&self, ctx: &AccessContext) -> Result<MuazzinStats, AppError> {
        ctx.require(AccessRole::Muazzin)?;

        let (pending_count, approved_packets, requested_packets, collected_packets) = tokio::try_join!(
            self.donations.count_by_status(DonationStatus::Pending),
            self.donations.sum_quantity(DonationStatus::Approved),
            self.collections.sum_quantity(None),
            self.collections.sum_quantity(Some(CollectionStatus::Collected)),
        )?;

        Ok(MuazzinStats {
            pending_count,
            approved_packets,
            requested_packets,
            collected_packets,
            packets_available: available_packets(approved_packets, requested_packets),
        })
    }

    pub async fn restaurant_stats(&self, ctx: &AccessContext) -> Result<RestaurantStats, AppError> {
        ctx.require(AccessRole::RestaurantAdmin)?;

        let (pending_count, approved_count, fulfilled_count) = tokio::try_join!(
            self.collections.count_by_status(CollectionStatus::Pending),
            self.collections.count_by_status(CollectionStatus::Approved),
            self.collections.count_by_status(CollectionStatus::Collected),
        )?;

        Ok(RestaurantStats {
            pending_count,
            approved_count,
            fulfilled_count,
        })
    }
}
