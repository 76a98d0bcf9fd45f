#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IssueRef {
    pub id: String,
    pub note: Option<String>,
}

/// What a data source asks the remote tracker for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueryDescriptor {
    Ids(Vec<IssueRef>),
    Jql(String),
    Search(String),
}

impl QueryDescriptor {
    /// Parses list-source content: one `issueId[|note]` per line, blank
    /// lines and blank ids skipped.
    pub fn parse_ids(content: &str) -> Self {
        let ids = content
            .lines()
            .filter_map(|line| {
                let (id, note) = line.split_once('|').unwrap_or((line, ""));
                let id = id.trim();
                if id.is_empty() {
                    return None;
                }
                let note = note.trim();
                Some(IssueRef {
                    id: id.to_string(),
                    note: (!note.is_empty()).then(|| note.to_string()),
                })
            })
            .collect();
        Self::Ids(ids)
    }

    pub fn is_query_mode(&self) -> bool {
        !matches!(self, Self::Ids(_))
    }

    pub fn query(&self) -> Option<&str> {
        match self {
            Self::Ids(_) => None,
            Self::Jql(query) | Self::Search(query) => Some(query),
        }
    }
}
