// src/services/status_rules.rs
//
// Tabelas de transição de status. Qualquer escrita de status passa por aqui
// antes de chegar ao banco.

use thiserror::Error;

use crate::models::{
    auth::AccessRole,
    collection::CollectionStatus,
    donation::DonationStatus,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Transição ilegal de '{from}' para '{to}'")]
    Illegal { from: &'static str, to: &'static str },

    #[error("O papel '{role}' não pode executar esta transição")]
    RoleNotAllowed { role: &'static str },
}

impl DonationStatus {
    /// Revisão do muazzin: pending -> approved | rejected. Depois disso o status é imutável.
    pub fn transition(self, requested: Self, caller: AccessRole) -> Result<Self, TransitionError> {
        if caller != AccessRole::Muazzin {
            return Err(TransitionError::RoleNotAllowed { role: caller.as_str() });
        }

        use DonationStatus::*;
        match (self, requested) {
            (Pending, Approved) | (Pending, Rejected) => Ok(requested),
            _ => Err(TransitionError::Illegal {
                from: self.as_str(),
                to: requested.as_str(),
            }),
        }
    }
}

impl CollectionStatus {
    /// Restaurante: pending -> approved | rejected, approved -> collected | uncollected.
    /// Nenhum caminho volta para pending.
    pub fn transition(self, requested: Self, caller: AccessRole) -> Result<Self, TransitionError> {
        if caller != AccessRole::RestaurantAdmin {
            return Err(TransitionError::RoleNotAllowed { role: caller.as_str() });
        }

        use CollectionStatus::*;
        match (self, requested) {
            (Pending, Approved) | (Pending, Rejected) => Ok(requested),
            (Approved, Collected) | (Approved, Uncollected) => Ok(requested),
            _ => Err(TransitionError::Illegal {
                from: self.as_str(),
                to: requested.as_str(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DONATION_STATES: [DonationStatus; 3] =
        [DonationStatus::Pending, DonationStatus::Approved, DonationStatus::Rejected];

    const COLLECTION_STATES: [CollectionStatus; 5] = [
        CollectionStatus::Pending,
        CollectionStatus::Approved,
        CollectionStatus::Rejected,
        CollectionStatus::Collected,
        CollectionStatus::Uncollected,
    ];

    #[test]
    fn donation_only_leaves_pending_once() {
        for from in DONATION_STATES {
            for to in DONATION_STATES {
                let result = from.transition(to, AccessRole::Muazzin);
                let legal = from == DonationStatus::Pending && to != DonationStatus::Pending;
                assert_eq!(result.is_ok(), legal, "{from} -> {to}");
            }
        }
    }

    #[test]
    fn reviewed_donation_reports_illegal_edge() {
        let err = DonationStatus::Approved.transition(DonationStatus::Rejected, AccessRole::Muazzin)
            .unwrap_err();
        assert_eq!(err, TransitionError::Illegal { from: "approved", to: "rejected" });
    }

    #[test]
    fn only_muazzin_reviews_donations() {
        for role in [AccessRole::Public, AccessRole::RestaurantAdmin, AccessRole::SuperAdmin] {
            let err = DonationStatus::Pending.transition(DonationStatus::Approved, role).unwrap_err();
            assert!(matches!(err, TransitionError::RoleNotAllowed { .. }));
        }
    }

    #[test]
    fn collection_table_matches_forward_paths() {
        use CollectionStatus::*;
        let legal = [
            (Pending, Approved),
            (Pending, Rejected),
            (Approved, Collected),
            (Approved, Uncollected),
        ];

        for from in COLLECTION_STATES {
            for to in COLLECTION_STATES {
                let result = from.transition(to, AccessRole::RestaurantAdmin);
                assert_eq!(result.is_ok(), legal.contains(&(from, to)), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn only_restaurant_updates_collections() {
        let err = CollectionStatus::Pending.transition(CollectionStatus::Approved, AccessRole::Muazzin)
            .unwrap_err();
        assert_eq!(err, TransitionError::RoleNotAllowed { role: "muazzin" });
    }
}
