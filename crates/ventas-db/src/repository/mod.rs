//! Repository implementations, one per aggregate.

mod audit;
mod movement;
mod order;
mod product;
mod report;
mod returns;

pub use audit::AuditRepository;
pub use movement::{MovementRepository, NewMovement};
pub use order::OrderRepository;
pub use product::{NewProduct, ProductRepository};
pub use report::{ReportRepository, RenderedQuery};
pub use returns::{NewReturn, ReturnRepository};
