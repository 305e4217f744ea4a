//! SQL building and bind-value bridging for model CRUD.

mod builder;
mod params;

pub use builder::{delete, insert, quoted, select_all, select_where, update, OrderDir, QueryBuf};
pub use params::BindValue;
