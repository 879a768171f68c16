use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("user can't change other user's cart")]
    WrongCart,
    #[error("user can't make quantity below 1")]
    NotPositiveQuantity,
    #[error("order item not found")]
    OrderItemNotFound,
    #[error("order not found")]
    OrderNotFound,
    #[error("order is empty")]
    OrderEmpty,
    #[error("user can't get other user's order")]
    ForeignOrder,
    #[error("{0}")]
    InvalidInput(String),
    #[error("Internal error: {0}")]
    Internal(String),
}
