// src/common/compensation.rs

use std::future::Future;

use crate::common::error::AppError;

/// Executa o passo dependente de uma operação em duas etapas (ex.: upload -> insert,
/// convite -> perfil). Se ele falhar, roda a compensação que desfaz o passo principal.
///
/// O erro devolvido é sempre o do passo dependente. Falha na compensação não é
/// repetida: fica registrada no log `reconciliation` com o recurso órfão.
pub async fn with_compensation<T, D, C, CFut>(
    step: &str,
    orphan: &str,
    dependent: D,
    compensate: C,
) -> Result<T, AppError>
where
    D: Future<Output = Result<T, AppError>>,
    C: FnOnce() -> CFut,
    CFut: Future<Output = Result<(), AppError>>,
{
    match dependent.await {
        Ok(value) => Ok(value),
        Err(err) => {
            tracing::warn!(step, orphan, error = %err, "Passo dependente falhou, desfazendo o passo principal");

            match compensate().await {
                Ok(()) => tracing::info!(step, orphan, "Compensação executada"),
                Err(rollback_err) => tracing::error!(
                    target: "reconciliation",
                    step,
                    orphan,
                    error = %err,
                    rollback_error = %rollback_err,
                    "Compensação falhou: recurso órfão precisa de reconciliação manual"
                ),
            }

            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn success_skips_compensation() {
        let calls = AtomicUsize::new(0);

        let result = with_compensation("teste", "obj", async { Ok::<_, AppError>(42) }, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failure_runs_compensation_and_keeps_original_error() {
        let calls = AtomicUsize::new(0);

        let result: Result<(), AppError> =
            with_compensation("teste", "obj", async { Err(AppError::MissingProof) }, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .await;

        assert!(matches!(result, Err(AppError::MissingProof)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_compensation_still_reports_dependent_error() {
        let result: Result<(), AppError> = with_compensation(
            "teste",
            "obj",
            async { Err(AppError::InvalidQuantity) },
            || async { Err(AppError::StorageError("disco cheio".into())) },
        )
        .await;

        assert!(matches!(result, Err(AppError::InvalidQuantity)));
    }
}
