// src/services/collection_service.rs

use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, pagination::PageParams},
    db::CollectionStore,
    models::{
        auth::{AccessContext, AccessRole},
        collection::{
            CollectionRequest, CollectionRequestWithCreator, CollectionStatus,
            CreateCollectionPayload, NewCollectionRequest,
        },
    },
};

#[derive(Clone)]
pub struct CollectionService {
    collections: Arc<dyn CollectionStore>,
}

impl CollectionService {
    pub fn new(collections: Arc<dyn CollectionStore>) -> Self {
        Self { collections }
    }

    pub async fn create(
        &self,
        ctx: &AccessContext,
        payload: &CreateCollectionPayload,
    ) -> Result<CollectionRequest, AppError> {
        let created_by = ctx.require(AccessRole::Muazzin)?;
        payload.validate()?;

        let quantity = i32::try_from(payload.quantity)
            .ok()
            .filter(|q| *q > 0)
            .ok_or(AppError::InvalidQuantity)?;
        let target_date = NaiveDate::parse_from_str(&payload.target_date, "%Y-%m-%d")
            .map_err(|_| AppError::InvalidForm("targetDate".into()))?;

        let request = self
            .collections
            .insert(NewCollectionRequest {
                quantity,
                target_date,
                created_by,
            })
            .await?;

        tracing::info!(request_id = %request.id, %created_by, quantity, "Pedido de coleta criado");
        Ok(request)
    }

    pub async fn update_status(
        &self,
        ctx: &AccessContext,
        request_id: Uuid,
        requested: CollectionStatus,
    ) -> Result<CollectionRequest, AppError> {
        ctx.require(AccessRole::RestaurantAdmin)?;

        let current = self
            .collections
            .find_by_id(request_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("collection request {request_id}")))?;

        let next = current.status.transition(requested, ctx.role)?;

        let updated = self
            .collections
            .transition_status(request_id, current.status, next)
            .await?
            .ok_or(AppError::StaleTransition)?;

        tracing::info!(%request_id, from = %current.status, to = %next, "Status do pedido atualizado");
        Ok(updated)
    }

    /// Visão do muazzin: só os próprios pedidos.
    pub async fn list_own(
        &self,
        ctx: &AccessContext,
        page: PageParams,
        status: Option<CollectionStatus>,
    ) -> Result<Vec<CollectionRequest>, AppError> {
        let creator = ctx.require(AccessRole::Muazzin)?;
        self.collections.list_by_creator(creator, status, page).await
    }

    /// Visão do restaurante: todos os pedidos, com o e-mail de quem pediu.
    pub async fn list_all(
        &self,
        ctx: &AccessContext,
        page: PageParams,
        status: Option<CollectionStatus>,
    ) -> Result<Vec<CollectionRequestWithCreator>, AppError> {
        ctx.require(AccessRole::RestaurantAdmin)?;
        self.collections.list_with_creator(status, page).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::profile::UserRole,
        testing::{self, Fakes},
    };

    fn payload(quantity: i64, target_date: &str) -> CreateCollectionPayload {
        CreateCollectionPayload {
            quantity,
            target_date: target_date.into(),
        }
    }

    #[tokio::test]
    async fn muazzin_creates_pending_request_owned_by_caller() {
        let fakes = Fakes::default();
        let service = testing::collection_service(&fakes);
        let ctx = fakes.ctx(UserRole::Muazzin).await;

        let request = service.create(&ctx, &payload(20, "2026-03-01")).await.unwrap();

        assert_eq!(request.status, CollectionStatus::Pending);
        assert_eq!(Some(request.created_by), ctx.identity_id);
        assert_eq!(request.target_date, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
    }

    #[tokio::test]
    async fn invalid_payload_is_rejected_before_insert() {
        let fakes = Fakes::default();
        let service = testing::collection_service(&fakes);
        let ctx = fakes.ctx(UserRole::Muazzin).await;

        for bad in [payload(0, "2026-03-01"), payload(5, "2026-02-30"), payload(5, "01/03/2026")] {
            let result = service.create(&ctx, &bad).await;
            assert!(matches!(result, Err(AppError::ValidationError(_))));
        }
        assert_eq!(fakes.collections.len(), 0);
    }

    #[tokio::test]
    async fn restaurant_cannot_create_requests() {
        let fakes = Fakes::default();
        let service = testing::collection_service(&fakes);
        let ctx = fakes.ctx(UserRole::RestaurantAdmin).await;

        let result = service.create(&ctx, &payload(5, "2026-03-01")).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn restaurant_walks_forward_path_only() {
        let fakes = Fakes::default();
        let service = testing::collection_service(&fakes);
        let muazzin = fakes.ctx(UserRole::Muazzin).await;
        let restaurant = fakes.ctx(UserRole::RestaurantAdmin).await;
        let request = service.create(&muazzin, &payload(10, "2026-03-01")).await.unwrap();

        let skip = service.update_status(&restaurant, request.id, CollectionStatus::Collected).await;
        assert!(matches!(skip, Err(AppError::InvalidTransition(_))));

        service.update_status(&restaurant, request.id, CollectionStatus::Approved).await.unwrap();
        let done = service
            .update_status(&restaurant, request.id, CollectionStatus::Collected)
            .await
            .unwrap();
        assert_eq!(done.status, CollectionStatus::Collected);

        let back = service.update_status(&restaurant, request.id, CollectionStatus::Pending).await;
        assert!(matches!(back, Err(AppError::InvalidTransition(_))));
    }

    #[tokio::test]
    async fn muazzin_cannot_update_status() {
        let fakes = Fakes::default();
        let service = testing::collection_service(&fakes);
        let muazzin = fakes.ctx(UserRole::Muazzin).await;
        let request = service.create(&muazzin, &payload(10, "2026-03-01")).await.unwrap();

        let result = service.update_status(&muazzin, request.id, CollectionStatus::Approved).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn unknown_request_is_not_found() {
        let fakes = Fakes::default();
        let service = testing::collection_service(&fakes);
        let restaurant = fakes.ctx(UserRole::RestaurantAdmin).await;

        let result = service
            .update_status(&restaurant, Uuid::new_v4(), CollectionStatus::Approved)
            .await;
        assert!(matches!(result, Err(AppError::ResourceNotFound(_))));
    }

    #[tokio::test]
    async fn muazzin_sees_only_own_requests_restaurant_sees_all() {
        let fakes = Fakes::default();
        let service = testing::collection_service(&fakes);
        let first = fakes.ctx_for("a@masjid.org", UserRole::Muazzin).await;
        let second = fakes.ctx_for("b@masjid.org", UserRole::Muazzin).await;
        let restaurant = fakes.ctx(UserRole::RestaurantAdmin).await;
        service.create(&first, &payload(1, "2026-03-01")).await.unwrap();
        service.create(&second, &payload(2, "2026-03-02")).await.unwrap();
        let page = PageParams::new(None, None).unwrap();

        let own = service.list_own(&first, page, None).await.unwrap();
        assert_eq!(own.len(), 1);
        assert_eq!(Some(own[0].created_by), first.identity_id);

        let all = service.list_all(&restaurant, page, None).await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().any(|r| r.creator_email.as_deref() == Some("b@masjid.org")));
    }
}
