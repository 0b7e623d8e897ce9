pub mod collection_repo;
pub mod donation_repo;
pub mod identity_repo;
pub mod profile_repo;

pub use collection_repo::{CollectionRepository, CollectionStore};
pub use donation_repo::{DonationRepository, DonationStore};
pub use identity_repo::{IdentityProvider, IdentityRepository};
pub use profile_repo::{ProfileRepository, ProfileStore};
