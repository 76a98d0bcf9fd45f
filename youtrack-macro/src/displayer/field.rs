use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Utc};
use youtrack_domain::{CustomFieldValue, FieldSpec, Issue, Result, NOTE_FIELD};

use crate::{block::Block, block::Format, parameters::MacroParameters};

const ICON_PATH: &str = "/resources/icons/silk/";
const NO_STATE: &str = "No State";
const AVATAR_SIZE: &str = "25";
pub const URL_LABEL_PARAMETER: &str = "field.url.label";

pub trait FieldDisplayer {
    fn display_field(
        &self,
        field: &FieldSpec,
        issue: &Issue,
        parameters: &MacroParameters,
    ) -> Result<Vec<Block>>;
}

/// Field displayers looked up by field id, then by `type/<type>`, then the
/// default one.
pub struct FieldDisplayerRegistry {
    displayers: HashMap<String, Arc<dyn FieldDisplayer>>,
    fallback: Arc<dyn FieldDisplayer>,
}

impl FieldDisplayerRegistry {
    pub fn new(fallback: Arc<dyn FieldDisplayer>) -> Self {
        Self {
            displayers: HashMap::new(),
            fallback,
        }
    }

    pub fn register(&mut self, key: impl Into<String>, displayer: Arc<dyn FieldDisplayer>) {
        self.displayers.insert(key.into(), displayer);
    }

    pub fn lookup(&self, field: &FieldSpec) -> &dyn FieldDisplayer {
        if let Some(displayer) = self.displayers.get(&field.id) {
            return displayer.as_ref();
        }
        field
            .field_type
            .as_deref()
            .and_then(|field_type| self.displayers.get(&type_key(field_type)))
            .unwrap_or(&self.fallback)
            .as_ref()
    }
}

impl Default for FieldDisplayerRegistry {
    fn default() -> Self {
        let mut registry = Self::new(Arc::new(DefaultFieldDisplayer));
        let key: Arc<dyn FieldDisplayer> = Arc::new(KeyFieldDisplayer);
        registry.register("key", key.clone());
        registry.register("idReadable", key);
        registry.register("type", Arc::new(TypeFieldDisplayer));
        registry.register("status", Arc::new(StatusFieldDisplayer));
        registry.register("state", Arc::new(StateFieldDisplayer));
        registry.register("assignee", Arc::new(PersonFieldDisplayer::assignee()));
        registry.register("reviewer", Arc::new(PersonFieldDisplayer::reviewer()));
        registry.register("reporter", Arc::new(PersonFieldDisplayer::reporter()));
        let date: Arc<dyn FieldDisplayer> = Arc::new(DateFieldDisplayer);
        registry.register("created", date.clone());
        registry.register(type_key("date"), date);
        registry.register(type_key("url"), Arc::new(UrlFieldDisplayer));
        registry
    }
}

fn type_key(field_type: &str) -> String {
    format!("type/{field_type}")
}

/// Textual value of a field: built-in issue properties first, custom fields
/// otherwise. Multi-valued fields are joined with `, `.
pub fn field_value(field: &FieldSpec, issue: &Issue) -> Result<Option<String>> {
    let value = match field.id.to_ascii_lowercase().as_str() {
        "summary" => issue.summary.clone(),
        "key" | "idreadable" | "id" => Some(issue.id.clone()),
        "created" => issue.created.clone(),
        "updated" => issue.updated.clone(),
        "resolved" => issue.resolved.clone(),
        "link" => Some(issue.link.clone()),
        "reporter" => issue
            .reporter
            .as_ref()
            .and_then(|person| person.full_name.clone()),
        NOTE_FIELD => issue.note.clone(),
        _ => issue
            .custom_field(&field.id)?
            .value
            .as_ref()
            .and_then(CustomFieldValue::display_name),
    };
    Ok(value)
}

pub struct DefaultFieldDisplayer;

impl FieldDisplayer for DefaultFieldDisplayer {
    fn display_field(
        &self,
        field: &FieldSpec,
        issue: &Issue,
        _parameters: &MacroParameters,
    ) -> Result<Vec<Block>> {
        Ok(field_value(field, issue)?
            .map(|value| vec![Block::Verbatim(value)])
            .unwrap_or_default())
    }
}

/// Issue key linked to the issue, preceded by its state icon. Finished
/// issues are struck out.
pub struct KeyFieldDisplayer;

impl FieldDisplayer for KeyFieldDisplayer {
    fn display_field(
        &self,
        _field: &FieldSpec,
        issue: &Issue,
        _parameters: &MacroParameters,
    ) -> Result<Vec<Block>> {
        let mut label = vec![Block::verbatim(issue.id.as_str())];
        if issue.state() == Some("Done") {
            label = vec![Block::Format {
                format: Format::StrikedOut,
                children: label,
            }];
        }
        Ok(vec![
            state_image(issue.state()),
            Block::Link {
                label,
                reference: issue.link.clone(),
            },
        ])
    }
}

pub struct StatusFieldDisplayer;

impl FieldDisplayer for StatusFieldDisplayer {
    fn display_field(
        &self,
        _field: &FieldSpec,
        issue: &Issue,
        _parameters: &MacroParameters,
    ) -> Result<Vec<Block>> {
        Ok(vec![state_image(issue.state())])
    }
}

pub struct StateFieldDisplayer;

impl FieldDisplayer for StateFieldDisplayer {
    fn display_field(
        &self,
        _field: &FieldSpec,
        issue: &Issue,
        _parameters: &MacroParameters,
    ) -> Result<Vec<Block>> {
        Ok(single_name(issue, "state")?
            .map(|state| vec![Block::Word(state)])
            .unwrap_or_default())
    }
}

pub struct TypeFieldDisplayer;

impl FieldDisplayer for TypeFieldDisplayer {
    fn display_field(
        &self,
        _field: &FieldSpec,
        issue: &Issue,
        _parameters: &MacroParameters,
    ) -> Result<Vec<Block>> {
        let Some(issue_type) = single_name(issue, "type")? else {
            return Ok(Vec::new());
        };
        let icon = match issue_type.as_str() {
            "Bug" => Some("bug.png"),
            "Task" => Some("cog.png"),
            _ => None,
        };
        let mut blocks: Vec<Block> = icon
            .map(|icon| {
                Block::image(
                    format!("{ICON_PATH}{icon}"),
                    [("alt", issue_type.as_str()), ("title", issue_type.as_str())],
                )
            })
            .into_iter()
            .collect();
        blocks.push(Block::Verbatim(issue_type));
        Ok(blocks)
    }
}

enum PersonSource {
    CustomField(&'static str),
    Reporter,
}

pub struct PersonFieldDisplayer {
    source: PersonSource,
    placeholder: &'static str,
}

impl PersonFieldDisplayer {
    pub fn assignee() -> Self {
        Self {
            source: PersonSource::CustomField("assignee"),
            placeholder: "Unassigned",
        }
    }

    pub fn reviewer() -> Self {
        Self {
            source: PersonSource::CustomField("reviewer"),
            placeholder: "Unassigned",
        }
    }

    pub fn reporter() -> Self {
        Self {
            source: PersonSource::Reporter,
            placeholder: "Unknown",
        }
    }
}

impl FieldDisplayer for PersonFieldDisplayer {
    fn display_field(
        &self,
        _field: &FieldSpec,
        issue: &Issue,
        _parameters: &MacroParameters,
    ) -> Result<Vec<Block>> {
        let (full_name, avatar_url) = match self.source {
            PersonSource::CustomField(name) => {
                let value = issue
                    .custom_field(name)?
                    .value
                    .as_ref()
                    .and_then(CustomFieldValue::single);
                (
                    value.and_then(|value| value.full_name.as_deref()),
                    value.and_then(|value| value.avatar_url.as_deref()),
                )
            }
            PersonSource::Reporter => (
                issue
                    .reporter
                    .as_ref()
                    .and_then(|person| person.full_name.as_deref()),
                issue
                    .reporter
                    .as_ref()
                    .and_then(|person| person.avatar_url.as_deref()),
            ),
        };

        let blocks = match (full_name, avatar_url) {
            (Some(full_name), Some(avatar_url)) => vec![
                Block::image(
                    avatar_url,
                    [
                        ("alt", full_name),
                        ("title", full_name),
                        ("width", AVATAR_SIZE),
                        ("height", AVATAR_SIZE),
                    ],
                ),
                Block::word(full_name),
            ],
            _ => vec![Block::word(self.placeholder)],
        };
        Ok(blocks)
    }
}

pub struct DateFieldDisplayer;

impl FieldDisplayer for DateFieldDisplayer {
    fn display_field(
        &self,
        field: &FieldSpec,
        issue: &Issue,
        _parameters: &MacroParameters,
    ) -> Result<Vec<Block>> {
        Ok(field_value(field, issue)?
            .map(|value| vec![Block::Verbatim(format_date(&value))])
            .unwrap_or_default())
    }
}

/// Epoch milliseconds render as `%Y-%m-%d` (UTC), RFC 2822 dates as
/// `%d-%b-%Y`; anything else is kept verbatim.
pub fn format_date(value: &str) -> String {
    let trimmed = value.trim();
    if let Some(date) = trimmed
        .parse::<i64>()
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
    {
        return date.format("%Y-%m-%d").to_string();
    }
    match DateTime::parse_from_rfc2822(trimmed) {
        Ok(date) => date.format("%d-%b-%Y").to_string(),
        Err(_) => value.to_string(),
    }
}

pub struct UrlFieldDisplayer;

impl FieldDisplayer for UrlFieldDisplayer {
    fn display_field(
        &self,
        field: &FieldSpec,
        issue: &Issue,
        parameters: &MacroParameters,
    ) -> Result<Vec<Block>> {
        let Some(url) = field_value(field, issue)? else {
            return Ok(Vec::new());
        };
        let label = parameters
            .parameter(URL_LABEL_PARAMETER)
            .filter(|label| !label.trim().is_empty())
            .unwrap_or(&url)
            .to_string();
        Ok(vec![Block::Link {
            label: vec![Block::Verbatim(label)],
            reference: url,
        }])
    }
}

fn single_name(issue: &Issue, field: &str) -> Result<Option<String>> {
    Ok(issue
        .custom_field(field)?
        .value
        .as_ref()
        .and_then(CustomFieldValue::single)
        .and_then(|value| value.name.clone()))
}

fn state_image(state: Option<&str>) -> Block {
    let Some(state) = state else {
        return Block::image(
            format!("{ICON_PATH}exclamation.png"),
            [("alt", NO_STATE), ("title", NO_STATE)],
        );
    };
    Block::image(
        format!("{ICON_PATH}{}", state_icon(state)),
        [("alt", state), ("title", state)],
    )
}

fn state_icon(state: &str) -> &'static str {
    match state {
        "Done" => "accept.png",
        "In Review" => "eye.png",
        "In Progress" => "wrench.png",
        "To Do" => "clock.png",
        "In Testing" => "bomb.png",
        "Open" => "page.png",
        _ => "arrow_out.png",
    }
}
