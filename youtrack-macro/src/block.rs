use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    StrikedOut,
}

/// Node of the rendered document tree handed back to the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Block {
    Word(String),
    Space,
    /// Inline text rendered as-is, without markup interpretation.
    Verbatim(String),
    Format {
        format: Format,
        children: Vec<Block>,
    },
    Link {
        label: Vec<Block>,
        reference: String,
    },
    Image {
        reference: String,
        parameters: BTreeMap<String, String>,
    },
    Table(Vec<Block>),
    TableRow(Vec<Block>),
    TableHeadCell(Vec<Block>),
    TableCell(Vec<Block>),
    NumberedList(Vec<Block>),
    ListItem(Vec<Block>),
    Error {
        message: String,
        description: String,
        inline: bool,
    },
}

impl Block {
    pub fn word(text: impl Into<String>) -> Self {
        Self::Word(text.into())
    }

    pub fn verbatim(text: impl Into<String>) -> Self {
        Self::Verbatim(text.into())
    }

    pub fn image<'a>(
        reference: impl Into<String>,
        parameters: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        Self::Image {
            reference: reference.into(),
            parameters: parameters
                .into_iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
        }
    }

    pub fn children(&self) -> &[Block] {
        match self {
            Self::Format { children, .. }
            | Self::Table(children)
            | Self::TableRow(children)
            | Self::TableHeadCell(children)
            | Self::TableCell(children)
            | Self::NumberedList(children)
            | Self::ListItem(children) => children,
            Self::Link { label, .. } => label,
            Self::Word(_)
            | Self::Space
            | Self::Verbatim(_)
            | Self::Image { .. }
            | Self::Error { .. } => &[],
        }
    }

    pub fn is_standalone(&self) -> bool {
        match self {
            Self::Table(_) | Self::NumberedList(_) => true,
            Self::Error { inline, .. } => !inline,
            _ => false,
        }
    }
}
