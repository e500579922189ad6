// ABOUTME: Revision ledger over the bucket: pointer, revision list, and commit map.
// ABOUTME: Exports the Ledger, its SHAS record format, and errors.

mod error;
mod record;
mod revision_ledger;

pub use error::LedgerError;
pub use record::ShaRecord;
pub use revision_ledger::{Ledger, POINTER_CACHE_CONTROL};
