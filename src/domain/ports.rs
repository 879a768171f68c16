use super::errors::DomainError;
use super::order::{Fetch, Order, OrderItem};

pub trait OrderRepository {
    /// Owner of `order_id`, provided the order is still open. The order row
    /// stays locked until the surrounding transaction ends.
    fn resolve_owner(&mut self, order_id: u64) -> Result<u64, DomainError>;
    fn read_current_open_order(&mut self, user_id: u64, fetch: Fetch)
        -> Result<Order, DomainError>;
    fn read_by_id_eager(&mut self, order_id: u64) -> Result<Order, DomainError>;
    /// Opens a cart for `user_id`, or returns `None` when one is already
    /// open. Waits for a concurrent insert for the same user to settle.
    fn try_create_order(&mut self, user_id: u64) -> Result<Option<Order>, DomainError>;
    fn create_order(&mut self, user_id: u64) -> Result<Order, DomainError> {
        self.try_create_order(user_id)?.ok_or_else(|| {
            DomainError::Internal(format!("user {} already has an open order", user_id))
        })
    }
    /// Persists `is_arranged` and `status` of a still-open order.
    fn update_arrangement(&mut self, order: &Order) -> Result<bool, DomainError>;
}

pub trait OrderItemRepository {
    fn find_item(&mut self, order_id: u64, product_id: u64)
        -> Result<Option<OrderItem>, DomainError>;
    fn insert_item(&mut self, item: &OrderItem) -> Result<bool, DomainError>;
    /// Replaces the stored quantity with `item.quantity`.
    fn update_item(&mut self, item: &OrderItem) -> Result<bool, DomainError>;
    fn delete_item(&mut self, order_id: u64, product_id: u64) -> Result<bool, DomainError>;
}

/// Both repositories bound to the same transaction.
pub trait CartRepositories: OrderRepository + OrderItemRepository {}

impl<T: OrderRepository + OrderItemRepository> CartRepositories for T {}

pub trait CartStore: Send + Sync + 'static {
    /// Runs `work` inside one storage transaction. Commits when `work`
    /// returns `Ok`, rolls back otherwise.
    fn run_in_transaction(
        &self,
        work: &mut dyn FnMut(&mut dyn CartRepositories) -> Result<(), DomainError>,
    ) -> Result<(), DomainError>;
}

impl dyn CartStore {
    pub fn in_transaction<T>(
        &self,
        work: impl FnOnce(&mut dyn CartRepositories) -> Result<T, DomainError>,
    ) -> Result<T, DomainError> {
        let mut work = Some(work);
        let mut output = None;
        self.run_in_transaction(&mut |repos: &mut dyn CartRepositories| {
            let work = work
                .take()
                .ok_or_else(|| DomainError::Internal("transaction body ran twice".to_string()))?;
            output = Some(work(repos)?);
            Ok(())
        })?;
        output.ok_or_else(|| DomainError::Internal("transaction produced no result".to_string()))
    }
}
