use diesel::pg::PgConnection;
use diesel::prelude::*;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::{Fetch, Order, OrderLine, DEFAULT_STATUS};
use crate::domain::ports::{CartRepositories, CartStore, OrderRepository};
use crate::schema::{categories, companies, order_items, orders, products};

use super::models::{
    into_order_line, CategoryRow, CompanyRow, NewOrderRow, OrderItemRow, OrderLineJoin, OrderRow,
    ProductRow,
};

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

/// Ids beyond `i64::MAX` cannot name a stored row.
pub(crate) fn db_id(id: u64) -> Option<i64> {
    i64::try_from(id).ok()
}

// ── Store ─────────────────────────────────────────────────────────────────────

pub struct DieselCartStore {
    pool: DbPool,
}

impl DieselCartStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl CartStore for DieselCartStore {
    fn run_in_transaction(
        &self,
        work: &mut dyn FnMut(&mut dyn CartRepositories) -> Result<(), DomainError>,
    ) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        conn.transaction::<_, DomainError, _>(|conn| work(&mut DieselRepositories::new(conn)))
    }
}

/// Order and order-item repositories sharing one transactional connection.
pub struct DieselRepositories<'c> {
    pub(super) conn: &'c mut PgConnection,
}

impl<'c> DieselRepositories<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    fn open_order_row(&mut self, user_id: u64) -> Result<OrderRow, DomainError> {
        let user_id = db_id(user_id).ok_or(DomainError::OrderNotFound)?;
        orders::table
            .filter(orders::user_id.eq(user_id))
            .filter(orders::is_arranged.eq(false))
            .select(OrderRow::as_select())
            .first(self.conn)
            .optional()?
            .ok_or(DomainError::OrderNotFound)
    }

    fn load_lines(&mut self, order_id: i64) -> Result<Vec<OrderLine>, DomainError> {
        let rows: Vec<OrderLineJoin> = order_items::table
            .inner_join(products::table)
            .inner_join(categories::table.on(categories::id.eq(products::category_id)))
            .inner_join(companies::table.on(companies::id.eq(products::company_id)))
            .filter(order_items::order_id.eq(order_id))
            .order((order_items::created_at.asc(), order_items::product_id.asc()))
            .select((
                OrderItemRow::as_select(),
                ProductRow::as_select(),
                CategoryRow::as_select(),
                CompanyRow::as_select(),
            ))
            .load(self.conn)?;

        Ok(rows.into_iter().map(into_order_line).collect())
    }

    fn eager(&mut self, row: OrderRow) -> Result<Order, DomainError> {
        let lines = self.load_lines(row.id)?;
        let count = lines.len() as u64;
        Ok(row.into_order(count, Some(lines)))
    }
}

impl OrderRepository for DieselRepositories<'_> {
    fn resolve_owner(&mut self, order_id: u64) -> Result<u64, DomainError> {
        let order_id = db_id(order_id).ok_or(DomainError::OrderNotFound)?;
        let owner: Option<i64> = orders::table
            .filter(orders::id.eq(order_id))
            .filter(orders::is_arranged.eq(false))
            .select(orders::user_id)
            .for_update()
            .first(self.conn)
            .optional()?;

        owner
            .map(super::models::unsigned)
            .ok_or(DomainError::OrderNotFound)
    }

    fn read_current_open_order(
        &mut self,
        user_id: u64,
        fetch: Fetch,
    ) -> Result<Order, DomainError> {
        let row = self.open_order_row(user_id)?;

        match fetch {
            Fetch::Eager => self.eager(row),
            Fetch::Lazy => {
                let count: i64 = order_items::table
                    .filter(order_items::order_id.eq(row.id))
                    .count()
                    .get_result(self.conn)?;
                Ok(row.into_order(super::models::unsigned(count), None))
            }
        }
    }

    fn read_by_id_eager(&mut self, order_id: u64) -> Result<Order, DomainError> {
        let order_id = db_id(order_id).ok_or(DomainError::OrderNotFound)?;
        let row = orders::table
            .find(order_id)
            .select(OrderRow::as_select())
            .first(self.conn)
            .optional()?
            .ok_or(DomainError::OrderNotFound)?;

        self.eager(row)
    }

    fn try_create_order(&mut self, user_id: u64) -> Result<Option<Order>, DomainError> {
        let user_id = db_id(user_id)
            .ok_or_else(|| DomainError::InvalidInput("wrong user id value".to_string()))?;
        // Conflicts only on orders_one_open_per_user.
        let row = diesel::insert_into(orders::table)
            .values(&NewOrderRow {
                status: DEFAULT_STATUS,
                is_arranged: false,
                user_id,
            })
            .on_conflict_do_nothing()
            .returning(OrderRow::as_returning())
            .get_result(self.conn)
            .optional()?;

        Ok(row.map(|row| row.into_order(0, None)))
    }

    fn update_arrangement(&mut self, order: &Order) -> Result<bool, DomainError> {
        let Some(order_id) = db_id(order.id) else {
            return Ok(false);
        };
        let affected = diesel::update(
            orders::table
                .filter(orders::id.eq(order_id))
                .filter(orders::is_arranged.eq(false)),
        )
        .set((
            orders::is_arranged.eq(order.is_arranged),
            orders::status.eq(&order.status),
            orders::updated_at.eq(chrono::Utc::now()),
        ))
        .execute(self.conn)?;

        Ok(affected > 0)
    }
}
