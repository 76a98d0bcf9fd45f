use youtrack_domain::{FieldList, Issue, Result};

use super::{FieldDisplayerRegistry, IssueDisplayer};
use crate::{block::Block, parameters::MacroParameters};

pub struct TableDisplayer;

impl IssueDisplayer for TableDisplayer {
    fn default_fields(&self) -> FieldList {
        FieldList::from_ids(&["type", "key", "summary", "status", "created"])
    }

    fn display(
        &self,
        issues: &[Issue],
        fields: &FieldList,
        parameters: &MacroParameters,
        registry: &FieldDisplayerRegistry,
    ) -> Result<Vec<Block>> {
        let header = fields
            .iter()
            .map(|field| Block::TableHeadCell(vec![Block::verbatim(field.display_label())]))
            .collect();

        let mut rows = vec![Block::TableRow(header)];
        for issue in issues {
            let cells = fields
                .iter()
                .map(|field| {
                    registry
                        .lookup(field)
                        .display_field(field, issue, parameters)
                        .map(Block::TableCell)
                })
                .collect::<Result<Vec<_>>>()?;
            rows.push(Block::TableRow(cells));
        }

        Ok(vec![Block::Table(rows)])
    }
}
