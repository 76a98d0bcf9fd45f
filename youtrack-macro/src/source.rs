use tracing::debug;
use youtrack_client::{issue_url, parse_issue, search_url, IssueFetcher};
use youtrack_config::YouTrackConfig;
use youtrack_domain::{Issue, QueryDescriptor, Result, ServerRecord, YouTrackError};

use crate::parameters::MacroParameters;

pub struct SourceContext<'a> {
    pub config: &'a YouTrackConfig,
    pub fetcher: &'a dyn IssueFetcher,
}

pub trait DataSource {
    fn query(&self, content: &str) -> Result<QueryDescriptor>;

    fn get_data(
        &self,
        content: &str,
        parameters: &MacroParameters,
        context: &SourceContext<'_>,
    ) -> Result<Vec<Issue>> {
        let server = context
            .config
            .resolve_server(parameters.url.as_deref(), parameters.id.as_deref())?;
        let query = self.query(content)?;
        fetch_issues(&query, &server, parameters.max_count, context.fetcher)
    }
}

/// Content lists issue ids, one per line, each optionally followed by
/// `|note`.
pub struct ListDataSource;

impl DataSource for ListDataSource {
    fn query(&self, content: &str) -> Result<QueryDescriptor> {
        match QueryDescriptor::parse_ids(content) {
            QueryDescriptor::Ids(ids) if ids.is_empty() => {
                Err(YouTrackError::input("Empty list of YouTrack ids!"))
            }
            query => Ok(query),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueryKind {
    Jql,
    Search,
}

pub struct QueryDataSource {
    kind: QueryKind,
}

impl QueryDataSource {
    pub fn new(kind: QueryKind) -> Self {
        Self { kind }
    }
}

impl DataSource for QueryDataSource {
    fn query(&self, content: &str) -> Result<QueryDescriptor> {
        let query = content.trim();
        if query.is_empty() {
            return Err(YouTrackError::input("Missing JQL query!"));
        }
        Ok(match self.kind {
            QueryKind::Jql => QueryDescriptor::Jql(query.to_string()),
            QueryKind::Search => QueryDescriptor::Search(query.to_string()),
        })
    }
}

/// Fetches the issues a query designates. Id lists keep the input order and
/// carry their notes; any failed fetch aborts the whole list.
pub fn fetch_issues(
    query: &QueryDescriptor,
    server: &ServerRecord,
    max_count: Option<usize>,
    fetcher: &dyn IssueFetcher,
) -> Result<Vec<Issue>> {
    match query {
        QueryDescriptor::Ids(ids) => ids
            .iter()
            .map(|issue_ref| {
                let document = fetcher.fetch(&issue_url(server, &issue_ref.id), server)?;
                let mut issue = parse_issue(document, server)?;
                issue.note = issue_ref.note.clone();
                Ok(issue)
            })
            .collect(),
        QueryDescriptor::Jql(query) | QueryDescriptor::Search(query) => {
            let documents = fetcher.fetch_list(&search_url(server, query, max_count), server)?;
            debug!(query, count = documents.len(), "YouTrack query returned issues");
            documents
                .into_iter()
                .map(|document| parse_issue(document, server))
                .collect()
        }
    }
}
