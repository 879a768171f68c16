pub mod models;
pub mod order_item_repo;
pub mod order_repo;

pub use order_repo::DieselCartStore;
