//! Sales orders with personalized lines (event-sourced).
//!
//! Adding a product that is already in the order with an equivalent set of
//! personalizations increases that line's quantity; any difference in the
//! personalizations starts a new line.

pub mod contents;
pub mod order;

pub use contents::OrderContents;
pub use order::{
    AddLine, CreateSalesOrder, LineAdded, LineQuantityIncreased, OrderLine, SalesOrder,
    SalesOrderCommand, SalesOrderCreated, SalesOrderEvent, SalesOrderId,
};
