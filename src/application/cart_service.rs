use std::sync::Arc;

use crate::domain::errors::DomainError;
use crate::domain::order::{CartChange, Fetch, Order, OrderItem};
use crate::domain::ports::{CartRepositories, CartStore, OrderItemRepository, OrderRepository};

/// Cart mutations. Every call runs in one transaction that first locks the
/// open order, then changes a single line, then re-reads the whole cart.
pub struct CartService {
    store: Arc<dyn CartStore>,
}

/// The cart's owner, provided the cart is open and belongs to `acting_user`.
fn owned_cart(
    repos: &mut dyn CartRepositories,
    acting_user: u64,
    order_id: u64,
) -> Result<u64, DomainError> {
    match repos.resolve_owner(order_id) {
        Ok(owner) if owner == acting_user => Ok(owner),
        Ok(owner) => {
            log::warn!(
                "user {} tried to change cart {} owned by user {}",
                acting_user,
                order_id,
                owner
            );
            Err(DomainError::WrongCart)
        }
        Err(DomainError::OrderNotFound) => Err(DomainError::WrongCart),
        Err(e) => Err(e),
    }
}

fn require_product(product_id: u64) -> Result<(), DomainError> {
    if product_id == 0 {
        return Err(DomainError::InvalidInput(
            "product id value must be positive".to_string(),
        ));
    }
    Ok(())
}

impl CartService {
    pub fn new(store: Arc<dyn CartStore>) -> Self {
        Self { store }
    }

    /// Adds `change.quantity` to an existing line, or creates the line with
    /// that quantity. A result that is not positive is rejected, never
    /// stored and never turned into a delete.
    pub fn update_cart(&self, acting_user: u64, change: CartChange) -> Result<Order, DomainError> {
        require_product(change.product_id)?;

        self.store.in_transaction(|repos| {
            let owner = owned_cart(repos, acting_user, change.order_id)?;

            match repos.find_item(change.order_id, change.product_id)? {
                Some(existing) => {
                    let total = existing
                        .quantity
                        .checked_add(change.quantity)
                        .ok_or_else(|| DomainError::InvalidInput("quantity is too large".to_string()))?;
                    if total <= 0 {
                        return Err(DomainError::NotPositiveQuantity);
                    }
                    if !repos.update_item(&OrderItem {
                        quantity: total,
                        ..existing
                    })? {
                        return Err(DomainError::OrderItemNotFound);
                    }
                    log::debug!(
                        "order {} product {} quantity {} -> {}",
                        change.order_id,
                        change.product_id,
                        existing.quantity,
                        total
                    );
                }
                None => {
                    if change.quantity <= 0 {
                        return Err(DomainError::NotPositiveQuantity);
                    }
                    if !repos.insert_item(&OrderItem {
                        order_id: change.order_id,
                        product_id: change.product_id,
                        quantity: change.quantity,
                    })? {
                        return Err(DomainError::Internal(format!(
                            "order item ({}, {}) was not inserted",
                            change.order_id, change.product_id
                        )));
                    }
                }
            }

            refetch(repos, owner)
        })
    }

    pub fn remove_from_cart(
        &self,
        acting_user: u64,
        order_id: u64,
        product_id: u64,
    ) -> Result<Order, DomainError> {
        require_product(product_id)?;

        self.store.in_transaction(|repos| {
            let owner = owned_cart(repos, acting_user, order_id)?;

            if !repos.delete_item(order_id, product_id)? {
                return Err(DomainError::OrderItemNotFound);
            }

            refetch(repos, owner)
        })
    }
}

fn refetch(repos: &mut dyn CartRepositories, owner: u64) -> Result<Order, DomainError> {
    repos
        .read_current_open_order(owner, Fetch::Eager)
        .inspect_err(|e| {
            if matches!(e, DomainError::OrderNotFound) {
                log::error!("open order of user {} vanished during a cart change", owner);
            }
        })
}
