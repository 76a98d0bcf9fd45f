mod error;
mod field;
mod issue;
mod query;
mod server;

pub use error::{Result, YouTrackError};
pub use field::{default_field, FieldList, FieldSpec, NOTE_FIELD};
pub use issue::{CustomField, CustomFieldValue, Issue, Person, Value};
pub use query::{IssueRef, QueryDescriptor};
pub use server::ServerRecord;
