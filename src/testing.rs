//! In-memory `CartStore` with the same constraints as the Postgres schema:
//! one open order per user, positive quantities, product foreign keys and
//! all-or-nothing transactions.

use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::domain::errors::DomainError;
use crate::domain::order::{
    Category, Company, Fetch, Order, OrderItem, OrderLine, Product, DEFAULT_STATUS,
};
use crate::domain::ports::{CartRepositories, CartStore, OrderItemRepository, OrderRepository};

#[derive(Debug, Clone)]
struct OrderRecord {
    status: String,
    is_arranged: bool,
    user_id: u64,
}

#[derive(Debug, Clone, Default)]
struct Tables {
    next_order_id: u64,
    orders: BTreeMap<u64, OrderRecord>,
    items: BTreeMap<(u64, u64), i32>,
    products: BTreeMap<u64, Product>,
}

impl Tables {
    fn order(&self, id: u64, record: &OrderRecord, fetch: Fetch) -> Order {
        let lines: Vec<OrderLine> = self
            .items
            .range((id, 0)..=(id, u64::MAX))
            .filter_map(|(&(order_id, product_id), &quantity)| {
                let product = self.products.get(&product_id)?.clone();
                Some(OrderLine {
                    order_id,
                    product,
                    quantity,
                })
            })
            .collect();

        Order {
            id,
            total: 0,
            status: record.status.clone(),
            is_arranged: record.is_arranged,
            user_id: record.user_id,
            count: lines.len() as u64,
            items: match fetch {
                Fetch::Eager => Some(lines),
                Fetch::Lazy => None,
            },
        }
    }
}

fn product(id: u64) -> Product {
    Product {
        id,
        name: format!("product-{id}"),
        description: String::new(),
        price: 100 * id,
        stock: 10,
        image: String::new(),
        category: Category {
            id: 1,
            name: "games".to_string(),
        },
        company: Company {
            id: 1,
            name: "studio".to_string(),
        },
    }
}

#[derive(Default)]
pub struct InMemoryCartStore {
    tables: Mutex<Tables>,
}

impl InMemoryCartStore {
    pub fn with_products(ids: &[u64]) -> Self {
        let store = Self::default();
        {
            let mut tables = store.tables.lock().expect("lock");
            for &id in ids {
                tables.products.insert(id, product(id));
            }
        }
        store
    }

    /// Opens a cart for `user_id` outside any service call.
    pub fn open_order(&self, user_id: u64) -> u64 {
        let mut tables = self.tables.lock().expect("lock");
        let mut repos = MemoryRepositories {
            tables: &mut *tables,
        };
        repos.create_order(user_id).expect("open order").id
    }

    pub fn arrange(&self, order_id: u64) {
        let mut tables = self.tables.lock().expect("lock");
        if let Some(order) = tables.orders.get_mut(&order_id) {
            order.is_arranged = true;
        }
    }

    pub fn quantity(&self, order_id: u64, product_id: u64) -> Option<i32> {
        let tables = self.tables.lock().expect("lock");
        tables.items.get(&(order_id, product_id)).copied()
    }

    pub fn item_rows(&self, order_id: u64) -> usize {
        let tables = self.tables.lock().expect("lock");
        tables
            .items
            .keys()
            .filter(|(order, _)| *order == order_id)
            .count()
    }

    pub fn open_orders(&self, user_id: u64) -> usize {
        let tables = self.tables.lock().expect("lock");
        tables
            .orders
            .values()
            .filter(|o| o.user_id == user_id && !o.is_arranged)
            .count()
    }
}

impl CartStore for InMemoryCartStore {
    fn run_in_transaction(
        &self,
        work: &mut dyn FnMut(&mut dyn CartRepositories) -> Result<(), DomainError>,
    ) -> Result<(), DomainError> {
        let mut committed = self
            .tables
            .lock()
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        let mut scratch = committed.clone();

        work(&mut MemoryRepositories {
            tables: &mut scratch,
        })?;

        *committed = scratch;
        Ok(())
    }
}

struct MemoryRepositories<'t> {
    tables: &'t mut Tables,
}

impl OrderRepository for MemoryRepositories<'_> {
    fn resolve_owner(&mut self, order_id: u64) -> Result<u64, DomainError> {
        self.tables
            .orders
            .get(&order_id)
            .filter(|o| !o.is_arranged)
            .map(|o| o.user_id)
            .ok_or(DomainError::OrderNotFound)
    }

    fn read_current_open_order(
        &mut self,
        user_id: u64,
        fetch: Fetch,
    ) -> Result<Order, DomainError> {
        let (id, record) = self
            .tables
            .orders
            .iter()
            .find(|(_, o)| o.user_id == user_id && !o.is_arranged)
            .ok_or(DomainError::OrderNotFound)?;
        Ok(self.tables.order(*id, record, fetch))
    }

    fn read_by_id_eager(&mut self, order_id: u64) -> Result<Order, DomainError> {
        let record = self
            .tables
            .orders
            .get(&order_id)
            .ok_or(DomainError::OrderNotFound)?;
        Ok(self.tables.order(order_id, record, Fetch::Eager))
    }

    fn try_create_order(&mut self, user_id: u64) -> Result<Option<Order>, DomainError> {
        if self
            .tables
            .orders
            .values()
            .any(|o| o.user_id == user_id && !o.is_arranged)
        {
            return Ok(None);
        }

        self.tables.next_order_id += 1;
        let id = self.tables.next_order_id;
        let record = OrderRecord {
            status: DEFAULT_STATUS.to_string(),
            is_arranged: false,
            user_id,
        };
        let order = self.tables.order(id, &record, Fetch::Lazy);
        self.tables.orders.insert(id, record);
        Ok(Some(order))
    }

    fn update_arrangement(&mut self, order: &Order) -> Result<bool, DomainError> {
        match self.tables.orders.get_mut(&order.id) {
            Some(record) if !record.is_arranged => {
                record.is_arranged = order.is_arranged;
                record.status = order.status.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

impl OrderItemRepository for MemoryRepositories<'_> {
    fn find_item(
        &mut self,
        order_id: u64,
        product_id: u64,
    ) -> Result<Option<OrderItem>, DomainError> {
        Ok(self
            .tables
            .items
            .get(&(order_id, product_id))
            .map(|&quantity| OrderItem {
                order_id,
                product_id,
                quantity,
            }))
    }

    fn insert_item(&mut self, item: &OrderItem) -> Result<bool, DomainError> {
        if item.quantity <= 0 {
            return Err(DomainError::Internal(
                "new row violates check constraint \"order_items_quantity_check\"".to_string(),
            ));
        }
        if !self.tables.products.contains_key(&item.product_id)
            || !self.tables.orders.contains_key(&item.order_id)
        {
            return Err(DomainError::Internal(
                "insert violates foreign key constraint".to_string(),
            ));
        }
        let key = (item.order_id, item.product_id);
        if self.tables.items.contains_key(&key) {
            return Err(DomainError::Internal(
                "duplicate key value violates unique constraint \"order_items_pkey\"".to_string(),
            ));
        }
        self.tables.items.insert(key, item.quantity);
        Ok(true)
    }

    fn update_item(&mut self, item: &OrderItem) -> Result<bool, DomainError> {
        if item.quantity <= 0 {
            return Err(DomainError::Internal(
                "new row violates check constraint \"order_items_quantity_check\"".to_string(),
            ));
        }
        match self.tables.items.get_mut(&(item.order_id, item.product_id)) {
            Some(quantity) => {
                *quantity = item.quantity;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete_item(&mut self, order_id: u64, product_id: u64) -> Result<bool, DomainError> {
        Ok(self.tables.items.remove(&(order_id, product_id)).is_some())
    }
}
