//! xpense-domain
//!
//! Pure domain models (Transaction, Budget, PeriodKind, Alert).
//! No I/O, no CLI, no storage. Only data types and core enums.

pub mod alert;
pub mod budget;
pub mod category;
pub mod common;
pub mod period;
pub mod transaction;

pub use alert::*;
pub use budget::*;
pub use category::*;
pub use common::*;
pub use period::*;
pub use transaction::*;
