use diesel::prelude::*;

use crate::domain::errors::DomainError;
use crate::domain::order::OrderItem;
use crate::domain::ports::OrderItemRepository;
use crate::schema::order_items;

use super::models::{NewOrderItemRow, OrderItemRow};
use super::order_repo::{db_id, DieselRepositories};

fn item_key(order_id: u64, product_id: u64) -> Option<(i64, i64)> {
    Some((db_id(order_id)?, db_id(product_id)?))
}

fn required_key(item: &OrderItem) -> Result<(i64, i64), DomainError> {
    item_key(item.order_id, item.product_id)
        .ok_or_else(|| DomainError::InvalidInput("id value is out of range".to_string()))
}

impl OrderItemRepository for DieselRepositories<'_> {
    fn find_item(
        &mut self,
        order_id: u64,
        product_id: u64,
    ) -> Result<Option<OrderItem>, DomainError> {
        let Some(key) = item_key(order_id, product_id) else {
            return Ok(None);
        };
        let row = order_items::table
            .find(key)
            .select(OrderItemRow::as_select())
            .first(self.conn)
            .optional()?;

        Ok(row.map(OrderItem::from))
    }

    fn insert_item(&mut self, item: &OrderItem) -> Result<bool, DomainError> {
        let (order_id, product_id) = required_key(item)?;
        let inserted = diesel::insert_into(order_items::table)
            .values(&NewOrderItemRow {
                order_id,
                product_id,
                quantity: item.quantity,
            })
            .execute(self.conn)?;

        Ok(inserted > 0)
    }

    fn update_item(&mut self, item: &OrderItem) -> Result<bool, DomainError> {
        let key = required_key(item)?;
        let updated = diesel::update(order_items::table.find(key))
            .set((
                order_items::quantity.eq(item.quantity),
                order_items::updated_at.eq(chrono::Utc::now()),
            ))
            .execute(self.conn)?;

        Ok(updated > 0)
    }

    fn delete_item(&mut self, order_id: u64, product_id: u64) -> Result<bool, DomainError> {
        let Some(key) = item_key(order_id, product_id) else {
            return Ok(false);
        };
        let deleted = diesel::delete(order_items::table.find(key)).execute(self.conn)?;

        Ok(deleted > 0)
    }
}
