mod payload;
mod query;

use std::sync::OnceLock;

use anyhow::Context;
use regex::{Regex, RegexBuilder};
use reqwest::blocking::Client;
use serde_json::Value;
use tracing::{info, warn};
use youtrack_domain::{Result, ServerRecord, YouTrackError};

pub use payload::parse_issue;
pub use query::{issue_url, search_url};

const USER_AGENT: &str = "XWikiYouTrackMacro";
const ERROR_EXCERPT_LIMIT: usize = 200;

/// Retrieves parsed JSON documents from a YouTrack server.
///
pub trait IssueFetcher {
    fn get_json(&self, url: &str, server: &ServerRecord) -> Result<Value>;

    fn fetch(&self, url: &str, server: &ServerRecord) -> Result<Value> {
        match self.get_json(url, server)? {
            document @ Value::Object(_) => Ok(document),
            other => Err(YouTrackError::Deserialization(format!(
                "expected a JSON object from [{url}], got {}",
                kind(&other)
            ))),
        }
    }

    fn fetch_list(&self, url: &str, server: &ServerRecord) -> Result<Vec<Value>> {
        match self.get_json(url, server)? {
            Value::Array(documents) => Ok(documents),
            other => Err(YouTrackError::Deserialization(format!(
                "expected a JSON array from [{url}], got {}",
                kind(&other)
            ))),
        }
    }
}

/// Blocking HTTP fetcher. Credentials, when the server has some, are sent
/// with the first request as basic auth.
pub struct HttpFetcher {
    http: Client,
}

impl HttpFetcher {
    pub fn new() -> anyhow::Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .with_context(|| "failed to build YouTrack HTTP client")?;
        Ok(Self { http })
    }
}

impl IssueFetcher for HttpFetcher {
    fn get_json(&self, url: &str, server: &ServerRecord) -> Result<Value> {
        let mut request = self.http.get(url).header("Accept", "application/json");
        if let Some((user, password)) = server.credentials() {
            request = request.basic_auth(user, Some(password));
        }

        info!(url, authenticated = server.credentials().is_some(), "fetching YouTrack data");
        let response = request
            .send()
            .map_err(|error| YouTrackError::fetch(url, None, error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.text() {
                Ok(body) => extract_error_message(&body)
                    .unwrap_or_else(|| format!("HTTP {status}: {}", compact_excerpt(&body))),
                Err(error) => format!("HTTP {status}: failed to read response body: {error}"),
            };
            warn!(url, status = status.as_u16(), %message, "YouTrack request failed");
            return Err(YouTrackError::fetch(url, Some(status.as_u16()), message));
        }

        let body = response
            .text()
            .map_err(|error| YouTrackError::fetch(url, Some(status.as_u16()), error.to_string()))?;
        serde_json::from_str(&body).map_err(|error| {
            YouTrackError::fetch(
                url,
                Some(status.as_u16()),
                format!("invalid JSON response: {error}"),
            )
        })
    }
}

/// Pulls a human-readable message out of an error response: the JSON
/// `error_description`/`error` pair YouTrack sends, else the first `<h1>`,
/// else the `<title>` of an HTML page.
pub fn extract_error_message(body: &str) -> Option<String> {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        let error = map.get("error").and_then(Value::as_str);
        let description = map.get("error_description").and_then(Value::as_str);
        match (error, description) {
            (Some(error), Some(description)) => return Some(format!("{error}: {description}")),
            (Some(message), None) | (None, Some(message)) => return Some(message.to_string()),
            (None, None) => {}
        }
    }

    [heading_regex(), title_regex()]
        .into_iter()
        .filter_map(|regex| regex.captures(body))
        .filter_map(|captures| captures.get(1))
        .map(|text| collapse_whitespace(text.as_str()))
        .find(|text| !text.is_empty())
}

fn heading_regex() -> &'static Regex {
    static HEADING: OnceLock<Regex> = OnceLock::new();
    HEADING.get_or_init(|| tag_regex("h1"))
}

fn title_regex() -> &'static Regex {
    static TITLE: OnceLock<Regex> = OnceLock::new();
    TITLE.get_or_init(|| tag_regex("title"))
}

fn tag_regex(tag: &str) -> Regex {
    RegexBuilder::new(&format!(r"<{tag}[^>]*>(.*?)</{tag}>"))
        .case_insensitive(true)
        .dot_matches_new_line(true)
        .build()
        .expect("regex")
}

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn compact_excerpt(value: &str) -> String {
    let cleaned = collapse_whitespace(value);
    if cleaned.chars().count() <= ERROR_EXCERPT_LIMIT {
        return cleaned;
    }
    let truncated: String = cleaned.chars().take(ERROR_EXCERPT_LIMIT).collect();
    format!("{truncated}...")
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io::{Read, Write},
        net::TcpListener,
        thread,
    };

    use serde_json::json;
    use wiremock::{
        matchers::{header, method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };
    use youtrack_domain::{ServerRecord, YouTrackError};

    use super::{compact_excerpt, extract_error_message, issue_url, HttpFetcher, IssueFetcher};

    fn start_server(runtime: &tokio::runtime::Runtime, mocks: Vec<Mock>) -> MockServer {
        runtime.block_on(async {
            let server = MockServer::start().await;
            for mock in mocks {
                mock.mount(&server).await;
            }
            server
        })
    }

    #[test]
    fn extracts_heading_then_title() {
        let page = "<html><head><title>Ignored</title></head><body><H1 class=\"x\">\n  Issue not\n found </H1></body></html>";
        assert_eq!(extract_error_message(page).as_deref(), Some("Issue not found"));

        let titled = "<html><head><title>502 Bad Gateway</title></head></html>";
        assert_eq!(extract_error_message(titled).as_deref(), Some("502 Bad Gateway"));

        assert_eq!(extract_error_message("plain failure"), None);
    }

    #[test]
    fn extracts_youtrack_json_errors() {
        let body = r#"{"error":"Not Found","error_description":"Entity with id DEMO-9 not found"}"#;
        assert_eq!(
            extract_error_message(body).as_deref(),
            Some("Not Found: Entity with id DEMO-9 not found")
        );
    }

    #[test]
    fn compacts_long_bodies() {
        let excerpt = compact_excerpt(&"a ".repeat(300));
        assert!(excerpt.ends_with("..."));
        assert_eq!(excerpt.chars().count(), 203);
    }

    #[test]
    fn sends_basic_auth_preemptively_and_parses_object() {
        let runtime = tokio::runtime::Runtime::new().expect("runtime");
        let mock_server = start_server(
            &runtime,
            vec![Mock::given(method("GET"))
                .and(path("/api/issues/DEMO-1"))
                .and(query_param("customFields", "state"))
                .and(header("authorization", "Basic YWxpY2U6c2VjcmV0"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "idReadable": "DEMO-1",
                    "customFields": []
                })))
                .expect(1)],
        );

        let server = ServerRecord::new(mock_server.uri(), Some("alice"), Some("secret"));
        let fetcher = HttpFetcher::new().expect("fetcher");
        let document = fetcher
            .fetch(&issue_url(&server, "DEMO-1"), &server)
            .expect("document");
        assert_eq!(document["idReadable"], "DEMO-1");
    }

    #[test]
    fn reports_status_and_heading_on_failure() {
        let runtime = tokio::runtime::Runtime::new().expect("runtime");
        let mock_server = start_server(
            &runtime,
            vec![Mock::given(method("GET"))
                .and(path("/api/issues"))
                .respond_with(
                    ResponseTemplate::new(401)
                        .set_body_string("<html><body><h1>Unauthorized</h1></body></html>"),
                )],
        );

        let server = ServerRecord::anonymous(mock_server.uri());
        let fetcher = HttpFetcher::new().expect("fetcher");
        let url = format!("{}/api/issues?query=x", mock_server.uri());
        let error = fetcher.fetch_list(&url, &server).expect_err("failure");
        match error {
            YouTrackError::Fetch {
                url: failed_url,
                status,
                message,
            } => {
                assert_eq!(failed_url, url);
                assert_eq!(status, Some(401));
                assert_eq!(message, "Unauthorized");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn list_fetch_rejects_single_object() {
        let runtime = tokio::runtime::Runtime::new().expect("runtime");
        let mock_server = start_server(
            &runtime,
            vec![Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({"idReadable": "A-1"})))],
        );

        let server = ServerRecord::anonymous(mock_server.uri());
        let fetcher = HttpFetcher::new().expect("fetcher");
        let error = fetcher
            .fetch_list(&format!("{}/api/issues", mock_server.uri()), &server)
            .expect_err("shape mismatch");
        assert!(matches!(error, YouTrackError::Deserialization(_)));
    }

    #[test]
    fn truncated_error_body_keeps_the_read_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("listener");
        let address = listener.local_addr().expect("address");
        let responder = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("connection");
            let mut request = [0_u8; 4096];
            let _ = stream.read(&mut request).expect("request");
            stream
                .write_all(b"HTTP/1.1 500 Internal Server Error\r\nContent-Length: 100\r\n\r\nshort")
                .expect("response");
        });

        let server = ServerRecord::anonymous(format!("http://{address}"));
        let fetcher = HttpFetcher::new().expect("fetcher");
        let error = fetcher
            .fetch(&issue_url(&server, "A-1"), &server)
            .expect_err("truncated body");
        responder.join().expect("responder");

        match error {
            YouTrackError::Fetch {
                status, message, ..
            } => {
                assert_eq!(status, Some(500));
                assert!(
                    message.starts_with("HTTP 500 Internal Server Error: failed to read response body"),
                    "unexpected message: {message}"
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unreachable_server_is_a_fetch_error() {
        let server = ServerRecord::anonymous("http://127.0.0.1:9");
        let fetcher = HttpFetcher::new().expect("fetcher");
        let error = fetcher
            .fetch("http://127.0.0.1:9/api/issues/A-1", &server)
            .expect_err("connection refused");
        assert!(matches!(error, YouTrackError::Fetch { status: None, .. }));
    }
}
