use crate::error::{Result, YouTrackError};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Value {
    pub name: Option<String>,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CustomFieldValue {
    Single(Value),
    Multiple(Vec<Value>),
}

impl CustomFieldValue {
    pub fn display_name(&self) -> Option<String> {
        match self {
            Self::Single(value) => value.name.clone(),
            Self::Multiple(values) => Some(
                values
                    .iter()
                    .filter_map(|value| value.name.as_deref())
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
        }
    }

    pub fn single(&self) -> Option<&Value> {
        match self {
            Self::Single(value) => Some(value),
            Self::Multiple(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Multiple(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CustomField {
    pub name: String,
    /// `None` when the remote field was `null`.
    pub value: Option<CustomFieldValue>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Person {
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Issue {
    pub id: String,
    pub summary: Option<String>,
    pub created: Option<String>,
    pub updated: Option<String>,
    pub resolved: Option<String>,
    pub reporter: Option<Person>,
    pub custom_fields: Vec<CustomField>,
    pub link: String,
    pub note: Option<String>,
}

impl Issue {
    /// Case-insensitive custom field lookup. A missing field means the field
    /// name is misconfigured, so it is an error rather than an empty value.
    pub fn custom_field(&self, name: &str) -> Result<&CustomField> {
        self.find_custom_field(name)
            .ok_or_else(|| YouTrackError::UnknownField {
                field: name.to_string(),
                issue: self.id.clone(),
            })
    }

    pub fn find_custom_field(&self, name: &str) -> Option<&CustomField> {
        self.custom_fields
            .iter()
            .find(|field| field.name.eq_ignore_ascii_case(name))
    }

    pub fn state(&self) -> Option<&str> {
        self.find_custom_field("state")
            .and_then(|field| field.value.as_ref())
            .and_then(CustomFieldValue::single)
            .and_then(|value| value.name.as_deref())
    }
}
