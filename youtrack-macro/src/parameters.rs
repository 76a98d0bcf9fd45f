use std::collections::BTreeMap;

use youtrack_domain::{FieldList, Result, YouTrackError};

pub const DEFAULT_SERVER_ID: &str = "1";
pub const DEFAULT_SOURCE: &str = "list";
pub const DEFAULT_STYLE: &str = "table";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MacroParameters {
    pub id: Option<String>,
    pub url: Option<String>,
    pub source: String,
    pub style: String,
    pub fields: FieldList,
    /// `None` means no limit.
    pub max_count: Option<usize>,
    /// Parameters with no dedicated meaning, e.g. `field.url.label`.
    pub extra: BTreeMap<String, String>,
}

impl Default for MacroParameters {
    fn default() -> Self {
        Self {
            id: Some(DEFAULT_SERVER_ID.to_string()),
            url: None,
            source: DEFAULT_SOURCE.to_string(),
            style: DEFAULT_STYLE.to_string(),
            fields: FieldList::default(),
            max_count: None,
            extra: BTreeMap::new(),
        }
    }
}

impl MacroParameters {
    /// Builds parameters from raw key/value pairs as the host passes them.
    /// Known keys are matched case-insensitively.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut parameters = Self::default();
        for (key, value) in pairs {
            let key = key.as_ref();
            let value = value.into();
            match key.to_ascii_lowercase().as_str() {
                "id" => parameters.id = non_empty(value),
                "url" => parameters.url = non_empty(value),
                "source" => parameters.source = value.trim().to_string(),
                "style" => parameters.style = value.trim().to_string(),
                "fields" => parameters.fields = FieldList::parse(&value),
                "maxcount" => parameters.max_count = parse_max_count(&value)?,
                _ => {
                    parameters.extra.insert(key.to_string(), value);
                }
            }
        }
        Ok(parameters)
    }

    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.extra.get(key).map(String::as_str)
    }
}

fn parse_max_count(value: &str) -> Result<Option<usize>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    let count: i64 = value
        .parse()
        .map_err(|_| YouTrackError::input(format!("Invalid maxCount value [{value}]")))?;
    Ok(usize::try_from(count).ok())
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
