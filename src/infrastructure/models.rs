use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::order::{Category, Company, Order, OrderItem, OrderLine, Product};
use crate::schema::{categories, companies, order_items, orders, products};

/// Serial keys and catalog amounts are non-negative in the schema.
pub(crate) fn unsigned(value: i64) -> u64 {
    value.max(0) as u64
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    pub id: i64,
    pub total: i64,
    pub status: String,
    pub is_arranged: bool,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderRow {
    pub fn into_order(self, count: u64, items: Option<Vec<OrderLine>>) -> Order {
        Order {
            id: unsigned(self.id),
            total: unsigned(self.total),
            status: self.status,
            is_arranged: self.is_arranged,
            user_id: unsigned(self.user_id),
            count,
            items,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow<'a> {
    pub status: &'a str,
    pub is_arranged: bool,
    pub user_id: i64,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = order_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderItemRow {
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        OrderItem {
            order_id: unsigned(row.order_id),
            product_id: unsigned(row.product_id),
            quantity: row.quantity,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = order_items)]
pub struct NewOrderItemRow {
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i32,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductRow {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub stock: i64,
    pub image: String,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CategoryRow {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = companies)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CompanyRow {
    pub id: i64,
    pub name: String,
}

/// One row of the eager order join.
pub type OrderLineJoin = (OrderItemRow, ProductRow, CategoryRow, CompanyRow);

pub fn into_order_line((item, product, category, company): OrderLineJoin) -> OrderLine {
    OrderLine {
        order_id: unsigned(item.order_id),
        quantity: item.quantity,
        product: Product {
            id: unsigned(product.id),
            name: product.name,
            description: product.description,
            price: unsigned(product.price),
            stock: unsigned(product.stock),
            image: product.image,
            category: Category {
                id: unsigned(category.id),
                name: category.name,
            },
            company: Company {
                id: unsigned(company.id),
                name: company.name,
            },
        },
    }
}
