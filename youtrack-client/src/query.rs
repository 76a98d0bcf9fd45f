use tracing::debug;
use youtrack_domain::ServerRecord;

const ISSUES_PATH: &str = "/api/issues";

/// Fields requested for every issue. The set of custom fields is fixed.
const FIELD_SELECTION: &str = "fields=idReadable,summary,reporter(fullName,avatarUrl),\
created,updated,resolved,customFields(name,value(name,fullName,avatarUrl))\
&customFields=type&customFields=assignee&customFields=priority&customFields=state\
&customFields=reviewer&customFields=fix+versions&customFields=sprints";

pub fn issue_url(server: &ServerRecord, issue_id: &str) -> String {
    let url = format!(
        "{}/{}?{FIELD_SELECTION}",
        server.join(ISSUES_PATH),
        urlencoding::encode(issue_id)
    );
    debug!(url = %url, "Computed YouTrack URL");
    url
}

pub fn search_url(server: &ServerRecord, query: &str, max_count: Option<usize>) -> String {
    let mut url = format!(
        "{}?{FIELD_SELECTION}&query={}",
        server.join(ISSUES_PATH),
        urlencoding::encode(query)
    );
    if let Some(max_count) = max_count {
        url.push_str(&format!("&$top={max_count}"));
    }
    debug!(url = %url, "Computed YouTrack URL");
    url
}
