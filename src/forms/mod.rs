pub mod errors;

pub use errors::{escape_html, field_dom_id, prefixed_name, ErrorList, FieldErrors};

use async_trait::async_trait;

use crate::error::ViewError;

/// A validation object bound to submitted data.
///
/// Views only ask three things of a form: whether it is valid, which fields
/// failed and why, and to persist itself once valid.
#[async_trait]
pub trait Form: Send + Sync {
    /// Record produced by a successful save
    type Saved: Send;

    /// Prefix applied to submitted field names and DOM ids
    fn prefix(&self) -> Option<&str> {
        None
    }

    /// Run validation (once) and report the outcome
    fn is_valid(&mut self) -> bool;

    /// Errors collected by the last validation run
    fn errors(&self) -> &FieldErrors;

    /// Persist the validated data
    async fn save(&mut self) -> Result<Self::Saved, ViewError>;
}
