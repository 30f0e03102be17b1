//! Business logic services for the ProdFlow backend

pub mod auth;
pub mod category;
pub mod journal;
pub mod lab;
pub mod order;
pub mod party;
pub mod purchase;
pub mod recipe;
pub mod reference;
pub mod shipment;

pub use auth::AuthService;
pub use category::CategoryService;
pub use journal::JournalService;
pub use lab::LabService;
pub use order::OrderService;
pub use party::PartyService;
pub use purchase::PurchaseService;
pub use recipe::RecipeService;
pub use reference::ReferenceService;
pub use shipment::ShipmentService;
