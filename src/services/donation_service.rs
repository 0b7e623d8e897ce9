// src/services/donation_service.rs

use std::{collections::HashMap, sync::Arc};

use uuid::Uuid;

use crate::{
    common::{compensation::with_compensation, error::AppError, pagination::PageParams},
    db::DonationStore,
    models::{
        auth::{AccessContext, AccessRole},
        donation::{
            Donation, DonationStatus, DonationWithSignedUrl, NewDonation, ProofFile,
            ReviewDecision,
        },
    },
    storage::{object_key, ObjectStorage, SIGNED_URL_TTL_SECS},
};

#[derive(Clone)]
pub struct DonationService {
    donations: Arc<dyn DonationStore>,
    storage: Arc<dyn ObjectStorage>,
}

impl DonationService {
    pub fn new(donations: Arc<dyn DonationStore>, storage: Arc<dyn ObjectStorage>) -> Self {
        Self { donations, storage }
    }

    /// Formulário público. Quantidade e arquivo são checados antes de tocar no storage.
    pub async fn submit(&self, quantity: i64, proof: ProofFile) -> Result<Donation, AppError> {
        let quantity = i32::try_from(quantity)
            .ok()
            .filter(|q| *q > 0)
            .ok_or(AppError::InvalidQuantity)?;

        if proof.bytes.is_empty() {
            return Err(AppError::MissingProof);
        }

        let key = object_key(proof.file_name.as_deref());
        self.storage
            .upload(&key, &proof.bytes, proof.content_type.as_deref())
            .await?;

        // Upload feito: se o insert falhar, o objeto é removido
        let orphan = vec![key.clone()];
        let donation = with_compensation(
            "insert_donation",
            &key,
            self.donations.insert(NewDonation {
                quantity,
                proof_url: key.clone(),
            }),
            || self.storage.remove(&orphan),
        )
        .await?;

        tracing::info!(donation_id = %donation.id, quantity, "Doação recebida");
        Ok(donation)
    }

    pub async fn review(
        &self,
        ctx: &AccessContext,
        donation_id: Uuid,
        decision: ReviewDecision,
    ) -> Result<Donation, AppError> {
        let reviewer = ctx.require(AccessRole::Muazzin)?;

        let current = self
            .donations
            .find_by_id(donation_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("donation {donation_id}")))?;

        let next = current.status.transition(decision.into(), ctx.role)?;

        let updated = self
            .donations
            .transition_status(donation_id, current.status, next, reviewer)
            .await?
            .ok_or(AppError::StaleTransition)?;

        tracing::info!(%donation_id, %reviewer, from = %current.status, to = %next, "Doação revisada");
        Ok(updated)
    }

    pub async fn list(
        &self,
        ctx: &AccessContext,
        page: PageParams,
        status: Option<DonationStatus>,
    ) -> Result<Vec<DonationWithSignedUrl>, AppError> {
        ctx.require(AccessRole::Muazzin)?;

        let donations = self.donations.list(status, page).await?;
        if donations.is_empty() {
            return Ok(Vec::new());
        }

        let paths: Vec<String> = donations
            .iter()
            .map(|d| d.proof_url.clone())
            .filter(|p| !p.is_empty())
            .collect();

        // Uma única chamada para a página inteira
        let signed: HashMap<String, String> = if paths.is_empty() {
            HashMap::new()
        } else {
            match self.storage.create_signed_urls(&paths, SIGNED_URL_TTL_SECS).await {
                Ok(urls) => urls
                    .into_iter()
                    .filter_map(|entry| entry.signed_url.map(|url| (entry.path, url)))
                    .collect(),
                Err(e) => {
                    // Listagem continua sem os links
                    tracing::warn!(error = %e, "Falha ao assinar comprovantes");
                    HashMap::new()
                }
            }
        };

        Ok(donations
            .into_iter()
            .map(|donation| {
                let signed_proof_url = signed.get(&donation.proof_url).cloned();
                DonationWithSignedUrl { donation, signed_proof_url }
            })
            .collect())
    }
}
