use crate::block::{Block, Format};

pub fn to_xwiki(blocks: &[Block]) -> String {
    let mut out = String::new();
    let mut previous_standalone = false;
    for block in blocks {
        let standalone = block.is_standalone();
        if !out.is_empty() && (standalone || previous_standalone) {
            out.push_str("\n\n");
        }
        write_block(block, &mut out);
        previous_standalone = standalone;
    }
    out
}

fn write_block(block: &Block, out: &mut String) {
    match block {
        Block::Word(text) => escape_text(text, out),
        Block::Space => out.push(' '),
        Block::Verbatim(text) if verbatim_safe(text) => {
            out.push_str("{{{");
            out.push_str(text);
            out.push_str("}}}");
        }
        Block::Verbatim(text) => escape_text(text, out),
        Block::Format {
            format: Format::StrikedOut,
            children,
        } => {
            out.push_str("--");
            write_all(children, out);
            out.push_str("--");
        }
        Block::Link { label, reference } => {
            out.push_str("[[");
            write_all(label, out);
            out.push_str(">>");
            escape_reference(reference, out);
            out.push_str("]]");
        }
        Block::Image {
            reference,
            parameters,
        } => {
            out.push_str("[[image:");
            escape_reference(reference, out);
            if !parameters.is_empty() {
                out.push_str("||");
                let rendered = parameters
                    .iter()
                    .map(|(key, value)| format!("{key}=\"{}\"", escape_parameter(value)))
                    .collect::<Vec<_>>()
                    .join(" ");
                out.push_str(&rendered);
            }
            out.push_str("]]");
        }
        Block::Table(rows) => {
            for (index, row) in rows.iter().enumerate() {
                if index > 0 {
                    out.push('\n');
                }
                write_block(row, out);
            }
        }
        Block::TableRow(cells) => write_all(cells, out),
        Block::TableHeadCell(children) => {
            out.push_str("|=");
            write_all(children, out);
        }
        Block::TableCell(children) => {
            out.push('|');
            write_all(children, out);
        }
        Block::NumberedList(items) => {
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    out.push('\n');
                }
                out.push_str("1. ");
                write_block(item, out);
            }
        }
        Block::ListItem(children) => write_all(children, out),
        Block::Error {
            message,
            description,
            ..
        } => {
            out.push_str("{{error}}");
            escape_text(message, out);
            if !description.is_empty() {
                out.push_str(": ");
                escape_text(description, out);
            }
            out.push_str("{{/error}}");
        }
    }
}

fn write_all(blocks: &[Block], out: &mut String) {
    for block in blocks {
        write_block(block, out);
    }
}

/// Inline verbatim cannot hold its own delimiters nor end with `}`.
fn verbatim_safe(text: &str) -> bool {
    !text.contains("{{{")
        && !text.contains("}}}")
        && !text.ends_with('}')
        && !text.contains(['\n', '\r'])
}

/// Plain text: every ASCII punctuation character gets the `~` escape and
/// line breaks become spaces.
fn escape_text(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '\n' | '\r' => out.push(' '),
            ch if ch.is_ascii_punctuation() => {
                out.push('~');
                out.push(ch);
            }
            ch => out.push(ch),
        }
    }
}

fn escape_reference(reference: &str, out: &mut String) {
    for ch in reference.chars() {
        if matches!(ch, '~' | '[' | ']' | '>' | '|') {
            out.push('~');
        }
        out.push(ch);
    }
}

fn escape_parameter(value: &str) -> String {
    value.replace('~', "~~").replace('"', "~\"")
}
