pub mod admin_service;
pub mod auth;
pub mod collection_service;
pub mod dashboard_service;
pub mod donation_service;
pub mod status_rules;

pub use admin_service::AdminService;
pub use auth::AuthService;
pub use collection_service::CollectionService;
pub use dashboard_service::DashboardService;
pub use donation_service::DonationService;
