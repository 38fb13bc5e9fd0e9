//! Customer Aggregate

pub mod api;
pub mod entity;
pub mod repository;

pub use api::{customers_router, CustomersState};
pub use entity::Customer;
pub use repository::CustomerRepository;
