pub mod aggregate;
pub mod query;
pub mod record;

pub use aggregate::*;
pub use query::*;
pub use record::{Cell, Field, FieldKind, Record, RecordCollection, Value};
