use std::sync::Arc;

use crate::domain::errors::DomainError;
use crate::domain::order::{Fetch, Order};
use crate::domain::ports::{CartStore, OrderRepository};

pub struct OrderService {
    store: Arc<dyn CartStore>,
}

impl OrderService {
    pub fn new(store: Arc<dyn CartStore>) -> Self {
        Self { store }
    }

    pub fn read_current(&self, user_id: u64, fetch: Fetch) -> Result<Order, DomainError> {
        self.store
            .in_transaction(|repos| repos.read_current_open_order(user_id, fetch))
    }

    /// Opens a cart for the user, or returns the one already open.
    pub fn create(&self, user_id: u64) -> Result<Order, DomainError> {
        self.store.in_transaction(|repos| match repos.try_create_order(user_id)? {
            Some(created) => {
                log::info!("user {} opened cart {}", user_id, created.id);
                Ok(created)
            }
            None => repos.read_current_open_order(user_id, Fetch::Lazy),
        })
    }

    /// Reads any order with its items. With `viewer` set, only that user's
    /// orders are visible.
    pub fn read_by_id(&self, order_id: u64, viewer: Option<u64>) -> Result<Order, DomainError> {
        let order = self
            .store
            .in_transaction(|repos| repos.read_by_id_eager(order_id))?;

        match viewer {
            Some(user_id) if user_id != order.user_id => Err(DomainError::ForeignOrder),
            _ => Ok(order),
        }
    }

    /// Submits the user's open cart under `status` and opens a fresh empty
    /// cart for them in the same transaction.
    pub fn arrange(&self, user_id: u64, status: &str) -> Result<Order, DomainError> {
        if status.is_empty() {
            return Err(DomainError::InvalidInput(
                "wrong values format provided".to_string(),
            ));
        }

        self.store.in_transaction(|repos| {
            let open = repos.read_current_open_order(user_id, Fetch::Lazy)?;
            repos.resolve_owner(open.id)?;
            // Count again under the lock; a concurrent removal may have emptied the cart.
            let mut order = repos.read_current_open_order(user_id, Fetch::Lazy)?;
            if order.count == 0 {
                return Err(DomainError::OrderEmpty);
            }

            order.status = status.to_string();
            order.is_arranged = true;
            if !repos.update_arrangement(&order)? {
                return Err(DomainError::Internal(format!(
                    "order {} was not arranged",
                    order.id
                )));
            }

            let next = repos.create_order(user_id)?;
            log::info!(
                "user {} arranged order {} as '{}', new cart {}",
                user_id,
                order.id,
                order.status,
                next.id
            );
            Ok(order)
        })
    }
}
