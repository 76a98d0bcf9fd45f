use youtrack_domain::{FieldList, Issue, Result};

use super::{issue_fields, FieldDisplayerRegistry, IssueDisplayer};
use crate::{block::Block, parameters::MacroParameters};

pub struct EnumDisplayer;

impl IssueDisplayer for EnumDisplayer {
    fn default_fields(&self) -> FieldList {
        FieldList::from_ids(&["status", "key"])
    }

    fn display(
        &self,
        issues: &[Issue],
        fields: &FieldList,
        parameters: &MacroParameters,
        registry: &FieldDisplayerRegistry,
    ) -> Result<Vec<Block>> {
        let mut blocks = Vec::new();
        for (index, issue) in issues.iter().enumerate() {
            if index > 0 {
                blocks.push(Block::Space);
            }
            blocks.extend(issue_fields(issue, fields, parameters, registry)?);
        }
        Ok(blocks)
    }
}
