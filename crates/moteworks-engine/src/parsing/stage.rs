use crate::parsing::{
    classify::{ParsedLine, Pattern, PatternKind},
    error::ParseError,
    helpers::{ParserHelpers, SpeakerCheck},
    result::{ElementStyle, Stage, StageElement},
    rope::SourceLine,
};

/// Parses a stage header and the body lines that follow it.
///
/// The body is every following line that is blank, a comment, or a stage
/// element (dialogue or narration). The first other line ends the stage and
/// is left for the caller.
pub(crate) fn parse_stage(
    helpers: &mut ParserHelpers<'_>,
    header_line: &SourceLine,
    header: &ParsedLine,
) -> Result<Stage, ParseError> {
    // A header classified as a plain `Stage:` label still carries its `#id`
    // inside the text capture; re-read it with the stage pattern.
    let header = match header.kind {
        PatternKind::Stage => header.clone(),
        _ => Pattern::stage_header()
            .matches(header_line)
            .ok_or(ParseError::NotAStageHeader {
                line: header_line.index,
            })?,
    };

    let name = header
        .text()
        .map(|c| c.value.trim().to_string())
        .unwrap_or_default();
    if name.is_empty() {
        let range = helpers.current_line_range();
        helpers.diagnostic("Stage name required!", range);
    }
    helpers.check_spelling(header.text());
    let id = helpers.claim_id(header_line, header.id());
    helpers.trace(format!("stage {id} at line {}", header_line.index));
    helpers.advance(header_line);

    let mut stage = Stage {
        id: Some(id),
        name,
        elements: vec![],
    };

    while let Some(peeked) = helpers.peek_line() {
        let parsed = if peeked.is_blank() {
            None
        } else {
            match helpers.classify(peeked) {
                Some(p) if p.is_comment() || p.is_stage_element() => Some(p),
                _ => break,
            }
        };

        let Some(line) = helpers.next_line()? else {
            break;
        };
        match parsed {
            Some(p) if p.is_comment() => helpers.add_comment(&p),
            Some(p) => stage.elements.push(parse_element(helpers, &line, &p)?),
            None => {}
        }
        helpers.advance(&line);
    }

    Ok(stage)
}

fn parse_element(
    helpers: &mut ParserHelpers<'_>,
    line: &SourceLine,
    parsed: &ParsedLine,
) -> Result<StageElement, ParseError> {
    helpers.trace_line(line);
    let text = parsed
        .text()
        .map(|c| c.value.trim().to_string())
        .unwrap_or_default();
    helpers.check_spelling(parsed.text());

    let mut speaker_unknown = false;
    let (style, speaker) = match parsed.speaker() {
        Some(capture) => {
            let speaker = match helpers.resolve_speaker(capture)? {
                SpeakerCheck::Resolved(id) => id,
                SpeakerCheck::Unknown => {
                    speaker_unknown = true;
                    capture.value.trim().to_string()
                }
                SpeakerCheck::Unchecked => capture.value.trim().to_string(),
            };
            (ElementStyle::Dialogue, Some(speaker))
        }
        None => (ElementStyle::Text, None),
    };
    if text.is_empty() {
        let message = match style {
            ElementStyle::Dialogue => "Dialogue text required!",
            ElementStyle::Text => "Narration text required!",
        };
        let range = helpers.current_line_range();
        helpers.diagnostic(message, range);
    }

    let id = helpers.claim_id(line, parsed.id());
    Ok(StageElement {
        style,
        id: Some(id),
        speaker,
        speaker_unknown,
        text,
    })
}
