mod enumeration;
mod field;
mod list;
mod table;

use youtrack_domain::{FieldList, Issue, Result};

use crate::{block::Block, parameters::MacroParameters};

pub use enumeration::EnumDisplayer;
pub use field::{
    field_value, format_date, DateFieldDisplayer, DefaultFieldDisplayer, FieldDisplayer,
    FieldDisplayerRegistry, KeyFieldDisplayer, PersonFieldDisplayer, StateFieldDisplayer,
    StatusFieldDisplayer, TypeFieldDisplayer, UrlFieldDisplayer, URL_LABEL_PARAMETER,
};
pub use list::ListDisplayer;
pub use table::TableDisplayer;

pub trait IssueDisplayer {
    fn default_fields(&self) -> FieldList;

    fn display(
        &self,
        issues: &[Issue],
        fields: &FieldList,
        parameters: &MacroParameters,
        registry: &FieldDisplayerRegistry,
    ) -> Result<Vec<Block>>;
}

/// Fields requested by the call, or the displayer defaults, with labels and
/// types back-filled from the field registry.
pub fn normalize_fields(parameters: &MacroParameters, defaults: FieldList) -> FieldList {
    if parameters.fields.is_empty() {
        defaults.normalized()
    } else {
        parameters.fields.normalized()
    }
}

/// Displays every field of one issue, separated by spaces.
fn issue_fields(
    issue: &Issue,
    fields: &FieldList,
    parameters: &MacroParameters,
    registry: &FieldDisplayerRegistry,
) -> Result<Vec<Block>> {
    let mut blocks = Vec::new();
    for (index, field) in fields.iter().enumerate() {
        if index > 0 {
            blocks.push(Block::Space);
        }
        blocks.extend(registry.lookup(field).display_field(field, issue, parameters)?);
    }
    Ok(blocks)
}
