// Contacts - directory of people and their typed contact methods
pub mod draft;
pub mod error;
pub mod handlers;
pub mod import;
pub mod memory;
pub mod methods;
pub mod postgres;
pub mod repository;
pub mod service;
pub mod types;

pub use draft::{ContactDraft, DraftMethod};
pub use error::ContactsError;
pub use handlers::configure_contacts_routes;
pub use import::{candidates_from_json, candidates_from_rows};
pub use memory::MemoryContactRepository;
pub use methods::normalize_methods;
pub use postgres::PgContactRepository;
pub use repository::{ContactRepository, SharedRepository, StoreError, MAX_TEXT_LEN};
pub use service::ContactsService;
pub use types::*;
