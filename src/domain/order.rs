/// Status given to every freshly created cart.
pub const DEFAULT_STATUS: &str = "Created";

/// How much of an order a read materializes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fetch {
    /// Header fields plus a counted number of items.
    Lazy,
    /// Header fields plus every line item with its product, category and company.
    Eager,
}

impl Fetch {
    /// `eager` selects [`Fetch::Eager`]; anything else falls back to lazy.
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            Some("eager") => Fetch::Eager,
            _ => Fetch::Lazy,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Company {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub price: u64,
    pub stock: u64,
    pub image: String,
    pub category: Category,
    pub company: Company,
}

/// A persisted (order, product) pairing. `quantity` is always positive once stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItem {
    pub order_id: u64,
    pub product_id: u64,
    pub quantity: i32,
}

/// A line item as returned by an eager read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLine {
    pub order_id: u64,
    pub product: Product,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: u64,
    pub total: u64,
    pub status: String,
    pub is_arranged: bool,
    pub user_id: u64,
    pub count: u64,
    /// Only populated by eager reads.
    pub items: Option<Vec<OrderLine>>,
}

/// Requested change to one line of a cart. For an existing line `quantity` is
/// a signed delta; for a new line it is the initial quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartChange {
    pub order_id: u64,
    pub product_id: u64,
    pub quantity: i32,
}
