// ABOUTME: Validated domain types for revisions and commit identifiers.
// ABOUTME: Parsing happens once at the boundary so downstream code can trust the values.

mod commit;
mod revision;

pub use commit::{CommitId, CommitIdError};
pub use revision::{REVISION_FORMAT, Revision, RevisionError};
