//! Domain types for the simulation core.

pub mod event;
pub mod fill;
pub mod ids;
pub mod order;
pub mod position;

pub use event::{MarketEvent, DEFAULT_EVENT_SIZE};
pub use fill::Fill;
pub use ids::OrderId;
pub use order::{Order, OrderSide, OrderStatus, OrderType};
pub use position::{Position, PositionLot};
