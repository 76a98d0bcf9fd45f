use std::{collections::HashMap, fmt, sync::OnceLock};

/// Special field carrying the note attached to an issue by the list source.
pub const NOTE_FIELD: &str = "note";

const TEXT_TYPE: &str = "text";
const DATE_TYPE: &str = "date";

const FIELD_SEPARATOR: char = ',';
const LABEL_SEPARATOR: char = ':';
const TYPE_SEPARATOR: char = '!';

const DEFAULT_FIELDS: [(&str, &str, &str); 16] = [
    ("summary", "Summary", TEXT_TYPE),
    ("key", "Key", TEXT_TYPE),
    ("type", "Type", TEXT_TYPE),
    ("status", "Status", TEXT_TYPE),
    ("assignee", "Assignee", TEXT_TYPE),
    ("reporter", "Reporter", TEXT_TYPE),
    ("created", "Created Date", DATE_TYPE),
    ("updated", "Updated Date", DATE_TYPE),
    ("resolved", "Resolved Date", DATE_TYPE),
    ("fixVersion", "Fixed in", TEXT_TYPE),
    ("version", "Affected Versions", TEXT_TYPE),
    ("component", "Component", TEXT_TYPE),
    ("votes", "Votes", "number"),
    ("resolution", "Resolution", TEXT_TYPE),
    ("link", "Link", "url"),
    (NOTE_FIELD, "Note", TEXT_TYPE),
];

static REGISTRY: OnceLock<HashMap<&'static str, FieldSpec>> = OnceLock::new();

/// A field to display: id as known by YouTrack (custom field name for custom
/// fields), an optional label and an optional type used to pick a displayer.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldSpec {
    pub id: String,
    pub label: Option<String>,
    pub field_type: Option<String>,
}

impl FieldSpec {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: None,
            field_type: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_type(mut self, field_type: impl Into<String>) -> Self {
        self.field_type = Some(field_type.into());
        self
    }

    pub fn display_label(&self) -> &str {
        match self.label.as_deref() {
            Some(label) if !label.trim().is_empty() => label,
            _ => &self.id,
        }
    }

    pub fn normalized(&self) -> Self {
        let mut field = self.clone();
        let Some(default) = default_field(&self.id) else {
            return field;
        };
        if is_blank(field.label.as_deref()) {
            field.label = default.label.clone();
        }
        if is_blank(field.field_type.as_deref()) {
            field.field_type = default.field_type.clone();
        }
        field
    }
}

pub fn default_field(id: &str) -> Option<&'static FieldSpec> {
    REGISTRY
        .get_or_init(|| {
            DEFAULT_FIELDS
                .iter()
                .map(|(id, label, field_type)| {
                    (*id, FieldSpec::new(*id).with_label(*label).with_type(*field_type))
                })
                .collect()
        })
        .get(id)
}

/// Ordered list of fields; order drives column and item order when rendering.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldList(Vec<FieldSpec>);

impl FieldList {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self(fields)
    }

    pub fn from_ids(ids: &[&str]) -> Self {
        ids.iter()
            .map(|id| default_field(id).cloned().unwrap_or_else(|| FieldSpec::new(*id)))
            .collect()
    }

    /// Parses `id[:label][!type]` entries separated by commas. Single or double
    /// quotes make the enclosed text literal, separators and surrounding
    /// whitespace included; unquoted whitespace around tokens is dropped.
    pub fn parse(content: &str) -> Self {
        let mut fields = Vec::new();
        let mut tokens: [Option<String>; 3] = [None, None, None];
        let mut position = 0;
        let mut buffer = String::new();
        let mut quote: Option<char> = None;
        let mut literal_end: Option<usize> = None;
        let mut pending = false;

        for ch in content.chars() {
            if let Some(open) = quote {
                if ch == open {
                    quote = None;
                } else {
                    buffer.push(ch);
                }
                literal_end = Some(buffer.len());
                continue;
            }
            match ch {
                '\'' | '"' => {
                    quote = Some(ch);
                    literal_end = Some(buffer.len());
                    pending = true;
                }
                FIELD_SEPARATOR => {
                    tokens[position] = take_token(&mut buffer, literal_end.take());
                    push_field(&mut fields, &mut tokens);
                    position = 0;
                    pending = false;
                }
                LABEL_SEPARATOR | TYPE_SEPARATOR => {
                    tokens[position] = take_token(&mut buffer, literal_end.take());
                    position = if ch == LABEL_SEPARATOR { 1 } else { 2 };
                    pending = true;
                }
                ch if ch.is_whitespace() && buffer.is_empty() && literal_end.is_none() => {}
                _ => {
                    buffer.push(ch);
                    pending = true;
                }
            }
        }

        if pending || !buffer.is_empty() {
            tokens[position] = take_token(&mut buffer, literal_end);
            push_field(&mut fields, &mut tokens);
        }

        Self(fields)
    }

    pub fn normalized(&self) -> Self {
        self.0.iter().map(FieldSpec::normalized).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldSpec> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, field: FieldSpec) {
        self.0.push(field);
    }
}

impl FromIterator<FieldSpec> for FieldList {
    fn from_iter<I: IntoIterator<Item = FieldSpec>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a FieldList {
    type Item = &'a FieldSpec;
    type IntoIter = std::slice::Iter<'a, FieldSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for FieldList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, field) in self.0.iter().enumerate() {
            if index > 0 {
                write!(f, "{FIELD_SEPARATOR}")?;
            }
            f.write_str(&quote_token(&field.id))?;
            if let Some(label) = &field.label {
                write!(f, "{LABEL_SEPARATOR}{}", quote_token(label))?;
            }
            if let Some(field_type) = &field.field_type {
                write!(f, "{TYPE_SEPARATOR}{}", quote_token(field_type))?;
            }
        }
        Ok(())
    }
}

/// Takes the buffered token, dropping trailing whitespace that follows the
/// last quoted character.
fn take_token(buffer: &mut String, literal_end: Option<usize>) -> Option<String> {
    let keep = buffer.trim_end().len().max(literal_end.unwrap_or(0));
    buffer.truncate(keep);
    let token = std::mem::take(buffer);
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

fn push_field(fields: &mut Vec<FieldSpec>, tokens: &mut [Option<String>; 3]) {
    let [id, label, field_type] = std::mem::take(tokens);
    if let Some(id) = id {
        fields.push(FieldSpec {
            id,
            label,
            field_type,
        });
    }
}

fn quote_token(value: &str) -> String {
    let special = |ch: char| {
        matches!(
            ch,
            FIELD_SEPARATOR | LABEL_SEPARATOR | TYPE_SEPARATOR | '\'' | '"'
        )
    };
    let padded = value.trim() != value;
    if !padded && !value.chars().any(special) {
        return value.to_string();
    }
    if !value.contains('\'') {
        return format!("'{value}'");
    }
    if !value.contains('"') {
        return format!("\"{value}\"");
    }

    // Both quote kinds present: quoted runs concatenate back into one token.
    let mut out = String::new();
    for (index, run) in value.split('\'').enumerate() {
        if index > 0 {
            out.push_str("\"'\"");
        }
        if !run.is_empty() {
            out.push('\'');
            out.push_str(run);
            out.push('\'');
        }
    }
    out
}

fn is_blank(value: Option<&str>) -> bool {
    value.map(|value| value.trim().is_empty()).unwrap_or(true)
}
