use youtrack_domain::{FieldList, Issue, Result};

use super::{issue_fields, FieldDisplayerRegistry, IssueDisplayer};
use crate::{block::Block, parameters::MacroParameters};

pub struct ListDisplayer;

impl IssueDisplayer for ListDisplayer {
    fn default_fields(&self) -> FieldList {
        FieldList::from_ids(&["status", "key", "summary"])
    }

    fn display(
        &self,
        issues: &[Issue],
        fields: &FieldList,
        parameters: &MacroParameters,
        registry: &FieldDisplayerRegistry,
    ) -> Result<Vec<Block>> {
        let items = issues
            .iter()
            .map(|issue| issue_fields(issue, fields, parameters, registry).map(Block::ListItem))
            .collect::<Result<Vec<_>>>()?;
        Ok(vec![Block::NumberedList(items)])
    }
}
