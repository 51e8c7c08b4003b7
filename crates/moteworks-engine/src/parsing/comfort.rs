use crate::parsing::{
    classify::{ParsedLine, PatternKind},
    error::{ParseError, ParseFailure},
    helpers::{ParseOptions, ParserHelpers},
    result::ComfortUpdateResult,
    rope::{SourceLine, TextRange},
};
use crate::store::MoteStore;

/// Scalar fields settable with a `Label: value` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Name,
    Description,
    UnlockedDescription,
}

impl Field {
    fn from_label(label: &str) -> Option<Self> {
        match label {
            "name" => Some(Field::Name),
            "description" => Some(Field::Description),
            "unlocked description" => Some(Field::UnlockedDescription),
            _ => None,
        }
    }

    fn hover(self) -> &'static str {
        match self {
            Field::Name => "Name: the comfort's display name",
            Field::Description => "Description: shown while the comfort is locked",
            Field::UnlockedDescription => {
                "Unlocked Description: shown once the comfort is unlocked"
            }
        }
    }

    fn is_prose(self) -> bool {
        !matches!(self, Field::Name)
    }
}

/// Parses a whole comfort document.
///
/// Content problems (empty name, unknown speaker, stray lines) are reported
/// as diagnostics and parsing carries on. Cursor desync and schema drift abort
/// the parse; the returned failure carries the trace gathered so far.
pub fn parse_stringified_comfort(
    text: &str,
    store: &dyn MoteStore,
    options: &ParseOptions,
) -> Result<ComfortUpdateResult, ParseFailure> {
    let mut helpers = ParserHelpers::new(text, store, options);
    match parse_lines(&mut helpers) {
        Ok(()) => Ok(helpers.finish()),
        Err(source) => {
            let trace = helpers.take_trace();
            log::debug!("parse failed after {} trace entries: {source}", trace.len());
            Err(ParseFailure { source, trace })
        }
    }
}

fn parse_lines(helpers: &mut ParserHelpers<'_>) -> Result<(), ParseError> {
    while let Some(line) = helpers.next_line()? {
        if line.is_blank() {
            helpers.advance(&line);
            continue;
        }

        let range = helpers.current_line_range();
        helpers.trace_line(&line);

        let Some(parsed) = helpers.parse_current_line() else {
            unfamiliar(helpers, &line, range);
            helpers.advance(&line);
            continue;
        };

        if parsed.is_comment() {
            helpers.add_comment(&parsed);
        } else if let Some(field) = scalar_field(&parsed) {
            set_field(helpers, field, &parsed, range);
        } else if parsed.is_stage() {
            // Advances past the header and the whole stage body.
            helpers.add_stage(&line, &parsed)?;
            continue;
        } else {
            unfamiliar(helpers, &line, range);
        }
        helpers.advance(&line);
    }

    helpers.ensure_consumed()
}

fn scalar_field(parsed: &ParsedLine) -> Option<Field> {
    if parsed.kind != PatternKind::Label {
        return None;
    }
    Field::from_label(&parsed.label_lower()?)
}

fn set_field(
    helpers: &mut ParserHelpers<'_>,
    field: Field,
    parsed: &ParsedLine,
    range: TextRange,
) {
    let value = parsed
        .text()
        .map(|c| c.value.trim().to_string())
        .unwrap_or_default();

    if field == Field::Name && value.is_empty() {
        helpers.diagnostic("Quest name required!", range);
    }
    if field.is_prose() {
        helpers.check_spelling(parsed.text());
    }
    if let Some(label) = parsed.label() {
        helpers.hover(field.hover(), label.range);
    }

    let record = &mut helpers.result.parsed;
    let slot = match field {
        Field::Name => &mut record.name,
        Field::Description => &mut record.description,
        Field::UnlockedDescription => &mut record.unlocked_description,
    };
    *slot = Some(value);
}

fn unfamiliar(helpers: &mut ParserHelpers<'_>, line: &SourceLine, range: TextRange) {
    helpers.diagnostic(format!("Unfamiliar syntax: {}", line.text), range);
}
