use std::{cell::RefCell, collections::HashMap};

use serde_json::{json, Value as Json};
use youtrack_client::{issue_url, parse_issue, IssueFetcher};
use youtrack_config::YouTrackConfig;
use youtrack_domain::{Issue, Result, ServerRecord, YouTrackError};

pub const SERVER_URL: &str = "https://yt.example.org";

pub fn server() -> ServerRecord {
    ServerRecord::anonymous(SERVER_URL)
}

pub fn config() -> YouTrackConfig {
    YouTrackConfig {
        servers: [("1".to_string(), server())].into_iter().collect(),
        async_rendering: false,
    }
}

#[derive(Default)]
pub struct FakeFetcher {
    documents: HashMap<String, Json>,
    pub calls: RefCell<Vec<String>>,
}

impl FakeFetcher {
    pub fn with_issue(mut self, document: Json) -> Self {
        let id = document["idReadable"].as_str().unwrap_or_default().to_string();
        self.documents.insert(issue_url(&server(), &id), document);
        self
    }

    pub fn with_document(mut self, url: impl Into<String>, document: Json) -> Self {
        self.documents.insert(url.into(), document);
        self
    }
}

impl IssueFetcher for FakeFetcher {
    fn get_json(&self, url: &str, _server: &ServerRecord) -> Result<Json> {
        self.calls.borrow_mut().push(url.to_string());
        self.documents
            .get(url)
            .cloned()
            .ok_or_else(|| YouTrackError::fetch(url, Some(404), "HTTP 404 Not Found"))
    }
}

pub fn issue_document(id: &str, summary: &str, state: Option<&str>) -> Json {
    json!({
        "idReadable": id,
        "summary": summary,
        "created": 1_700_000_000_000_i64,
        "updated": null,
        "resolved": null,
        "reporter": { "fullName": "Rita Reporter", "avatarUrl": "/avatars/rita.png" },
        "customFields": [
            { "name": "Type", "value": { "name": "Bug" } },
            { "name": "State", "value": state.map(|state| json!({ "name": state })) },
            {
                "name": "Assignee",
                "value": { "name": "alice", "fullName": "Alice Doe", "avatarUrl": "/avatars/alice.png" }
            },
            { "name": "Reviewer", "value": null },
            { "name": "Fix versions", "value": [{ "name": "1.0" }, { "name": "1.1" }] }
        ]
    })
}

pub fn sample_issue(id: &str, state: Option<&str>) -> Issue {
    parse_issue(issue_document(id, &format!("Summary of {id}"), state), &server())
        .expect("sample issue")
}
