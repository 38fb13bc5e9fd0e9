//! Account Aggregate

pub mod api;
pub mod entity;
pub mod repository;

pub use api::{accounts_router, AccountsState};
pub use entity::{Account, AccountRole};
pub use repository::AccountRepository;
