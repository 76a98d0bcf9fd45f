use serde::Deserialize;
use serde_json::Value as Json;
use youtrack_domain::{
    CustomField, CustomFieldValue, Issue, Person, Result, ServerRecord, Value, YouTrackError,
};

#[derive(Deserialize)]
struct IssuePayload {
    #[serde(rename = "idReadable")]
    id_readable: String,
    summary: Option<String>,
    created: Option<Scalar>,
    updated: Option<Scalar>,
    resolved: Option<Scalar>,
    reporter: Option<PersonPayload>,
    #[serde(rename = "customFields")]
    custom_fields: Vec<CustomFieldPayload>,
}

#[derive(Deserialize)]
struct CustomFieldPayload {
    name: String,
    #[serde(default)]
    value: Option<FieldValuePayload>,
}

/// The remote `value` is either one object or an array of objects (`null`
/// lands in the surrounding `Option`).
#[derive(Deserialize)]
#[serde(untagged)]
enum FieldValuePayload {
    Multiple(Vec<ValuePayload>),
    Single(ValuePayload),
}

#[derive(Default, Deserialize)]
struct ValuePayload {
    name: Option<String>,
    #[serde(rename = "fullName")]
    full_name: Option<String>,
    #[serde(rename = "avatarUrl")]
    avatar_url: Option<String>,
}

#[derive(Default, Deserialize)]
struct PersonPayload {
    #[serde(rename = "fullName")]
    full_name: Option<String>,
    #[serde(rename = "avatarUrl")]
    avatar_url: Option<String>,
}

/// Dates come back as epoch milliseconds; older servers send strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Number(i64),
    Text(String),
}

pub fn parse_issue(document: Json, server: &ServerRecord) -> Result<Issue> {
    let payload: IssuePayload = serde_json::from_value(document)
        .map_err(|error| YouTrackError::Deserialization(error.to_string()))?;
    Ok(into_issue(payload, server))
}

fn into_issue(payload: IssuePayload, server: &ServerRecord) -> Issue {
    let link = server.join(&format!("/issue/{}", payload.id_readable));
    Issue {
        summary: payload.summary,
        created: payload.created.map(scalar_text),
        updated: payload.updated.map(scalar_text),
        resolved: payload.resolved.map(scalar_text),
        reporter: payload.reporter.map(|person| Person {
            full_name: person.full_name,
            avatar_url: person.avatar_url.map(|url| absolute_url(server, &url)),
        }),
        custom_fields: payload
            .custom_fields
            .into_iter()
            .map(|field| CustomField {
                name: field.name,
                value: field.value.map(|value| into_field_value(value, server)),
            })
            .collect(),
        id: payload.id_readable,
        link,
        note: None,
    }
}

fn into_field_value(payload: FieldValuePayload, server: &ServerRecord) -> CustomFieldValue {
    match payload {
        FieldValuePayload::Single(value) => CustomFieldValue::Single(into_value(value, server)),
        FieldValuePayload::Multiple(values) => CustomFieldValue::Multiple(
            values
                .into_iter()
                .map(|value| into_value(value, server))
                .collect(),
        ),
    }
}

fn into_value(payload: ValuePayload, server: &ServerRecord) -> Value {
    Value {
        name: payload.name,
        full_name: payload.full_name,
        avatar_url: payload.avatar_url.map(|url| absolute_url(server, &url)),
    }
}

fn scalar_text(value: Scalar) -> String {
    match value {
        Scalar::Number(number) => number.to_string(),
        Scalar::Text(text) => text,
    }
}

fn absolute_url(server: &ServerRecord, url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        server.join(url)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use youtrack_domain::{CustomFieldValue, ServerRecord, YouTrackError};

    use super::parse_issue;

    fn server() -> ServerRecord {
        ServerRecord::anonymous("https://yt.example.com")
    }

    fn document(custom_fields: serde_json::Value) -> serde_json::Value {
        json!({
            "idReadable": "DEMO-1",
            "summary": "Crash on start",
            "created": 1_700_000_000_000_i64,
            "updated": 1_700_000_500_000_i64,
            "resolved": null,
            "reporter": {"fullName": "Bob", "avatarUrl": "/hub/api/rest/avatar/bob"},
            "customFields": custom_fields,
            "$type": "Issue"
        })
    }

    #[test]
    fn array_value_becomes_multiple_in_order() {
        let issue = parse_issue(
            document(json!([{
                "name": "Fix versions",
                "value": [{"name": "2.0"}, {"name": "1.0"}]
            }])),
            &server(),
        )
        .expect("issue");

        let value = issue.custom_fields[0].value.as_ref().expect("value");
        match value {
            CustomFieldValue::Multiple(values) => {
                assert_eq!(values.len(), 2);
                assert_eq!(values[0].name.as_deref(), Some("2.0"));
                assert_eq!(values[1].name.as_deref(), Some("1.0"));
            }
            other => panic!("expected multiple values, got {other:?}"),
        }
    }

    #[test]
    fn object_value_becomes_single_with_absolute_avatar() {
        let issue = parse_issue(
            document(json!([{
                "name": "Assignee",
                "value": {"name": "alice", "fullName": "Alice", "avatarUrl": "/avatars/alice.png"}
            }])),
            &server(),
        )
        .expect("issue");

        let value = issue.custom_fields[0]
            .value
            .as_ref()
            .and_then(CustomFieldValue::single)
            .expect("single value");
        assert_eq!(value.full_name.as_deref(), Some("Alice"));
        assert_eq!(
            value.avatar_url.as_deref(),
            Some("https://yt.example.com/avatars/alice.png")
        );
    }

    #[test]
    fn null_value_is_absent_not_an_error() {
        let issue = parse_issue(
            document(json!([{"name": "Assignee", "value": null}, {"name": "Reviewer"}])),
            &server(),
        )
        .expect("issue");

        assert!(issue.custom_fields.iter().all(|field| field.value.is_none()));
    }

    #[test]
    fn derives_link_dates_and_reporter() {
        let issue = parse_issue(document(json!([])), &server()).expect("issue");
        assert_eq!(issue.id, "DEMO-1");
        assert_eq!(issue.link, "https://yt.example.com/issue/DEMO-1");
        assert_eq!(issue.created.as_deref(), Some("1700000000000"));
        assert_eq!(issue.resolved, None);

        let reporter = issue.reporter.expect("reporter");
        assert_eq!(
            reporter.avatar_url.as_deref(),
            Some("https://yt.example.com/hub/api/rest/avatar/bob")
        );
    }

    #[test]
    fn keeps_already_absolute_avatar_urls() {
        let issue = parse_issue(
            document(json!([{
                "name": "Assignee",
                "value": {"fullName": "Alice", "avatarUrl": "https://gravatar.example/alice"}
            }])),
            &server(),
        )
        .expect("issue");

        let value = issue.custom_fields[0]
            .value
            .as_ref()
            .and_then(CustomFieldValue::single)
            .expect("single value");
        assert_eq!(value.avatar_url.as_deref(), Some("https://gravatar.example/alice"));
    }

    #[test]
    fn rejects_documents_without_custom_fields() {
        let error = parse_issue(json!({"idReadable": "DEMO-1"}), &server()).expect_err("malformed");
        assert!(matches!(error, YouTrackError::Deserialization(_)));
    }

    #[test]
    fn rejects_unexpected_value_shapes() {
        let error = parse_issue(
            document(json!([{"name": "Votes", "value": 3}])),
            &server(),
        )
        .expect_err("malformed");
        assert!(matches!(error, YouTrackError::Deserialization(_)));
    }
}
