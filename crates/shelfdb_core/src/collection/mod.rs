//! Typed collection API.
//!
//! Provides `Collection<T>`: records of one serde type stored one file per
//! record, with unique secondary indexes over selected fields.

mod page;
mod record;
mod typed;

pub use page::{paginate, Page};
pub use record::{field_of, id_of, Record};
pub use typed::Collection;
