// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::accept_invite,

        // --- Users ---
        handlers::auth::get_me,
        handlers::auth::update_password,

        // --- Donations (público) ---
        handlers::donations::submit_donation,

        // --- Muazzin ---
        handlers::donations::list_donations,
        handlers::donations::review_donation,
        handlers::collections::list_own_collections,
        handlers::collections::create_collection,

        // --- Restaurant ---
        handlers::collections::list_all_collections,
        handlers::collections::update_collection_status,

        // --- Dashboard ---
        handlers::dashboard::muazzin_stats,
        handlers::dashboard::restaurant_stats,

        // --- Admin ---
        handlers::admin::get_users,
        handlers::admin::invite_user,
        handlers::admin::resend_invite,
        handlers::admin::delete_user,

        // --- Storage ---
        handlers::storage::download_receipt,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::AccessRole,
            models::auth::AccessContext,
            models::auth::LoginPayload,
            models::auth::AcceptInvitePayload,
            models::auth::UpdatePasswordPayload,
            models::auth::AuthResponse,

            // --- Donations ---
            models::donation::DonationStatus,
            models::donation::Donation,
            models::donation::ReviewDecision,
            models::donation::ReviewDonationPayload,
            models::donation::DonationWithSignedUrl,
            handlers::donations::DonationForm,

            // --- Collections ---
            models::collection::CollectionStatus,
            models::collection::CollectionRequest,
            models::collection::CollectionRequestWithCreator,
            models::collection::CreateCollectionPayload,
            models::collection::UpdateCollectionStatusPayload,

            // --- Dashboard ---
            models::dashboard::MuazzinStats,
            models::dashboard::RestaurantStats,

            // --- Profiles ---
            models::profile::UserRole,
            models::profile::Profile,
            models::profile::InvitableRole,
            models::profile::InviteUserPayload,
            models::profile::ResendInvitePayload,
            models::profile::InviteResponse,
            models::profile::ProfileWithStatus,
        )
    ),
    tags(
        (name = "Auth", description = "Login e aceite de convite"),
        (name = "Users", description = "Sessão e senha do próprio usuário"),
        (name = "Donations", description = "Formulário público de doação"),
        (name = "Muazzin", description = "Revisão de doações e pedidos de coleta"),
        (name = "Restaurant", description = "Atendimento dos pedidos de coleta"),
        (name = "Dashboard", description = "Indicadores dos painéis"),
        (name = "Admin", description = "Convites e gestão de usuários"),
        (name = "Storage", description = "Download de comprovantes por URL assinada")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
