//! Parse model replies: the matcher's ANSWER line and query-only replies

use thiserror::Error;

const ANSWER_PREFIX: &str = "answer:";

/// Why a matcher reply could not be interpreted
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// No `ANSWER:` line in the reply
    #[error("reply has no final 'ANSWER:' line")]
    MissingAnswer,

    /// An `ANSWER:` line with nothing after it
    #[error("reply has an empty 'ANSWER:' line")]
    EmptyAnswer,
}

/// Extract the matched key from a matcher reply
///
/// The last line starting with `ANSWER:` (case-insensitive, optional markdown
/// bold) decides. `` ANSWER: `key` `` yields the key; a bare `ANSWER: none`
/// yields `None`.
pub fn parse_match_answer(response: &str) -> Result<Option<String>, ParseError> {
    let answer = response
        .lines()
        .rev()
        .find_map(answer_value)
        .ok_or(ParseError::MissingAnswer)?;

    if answer.is_empty() {
        return Err(ParseError::EmptyAnswer);
    }
    if answer.eq_ignore_ascii_case("none") {
        return Ok(None);
    }

    let key = unquote(answer);
    if key.is_empty() {
        return Err(ParseError::EmptyAnswer);
    }
    Ok(Some(key.to_string()))
}

fn answer_value(line: &str) -> Option<&str> {
    let line = line.trim().trim_start_matches('*');
    let head = line.get(..ANSWER_PREFIX.len())?;
    if !head.eq_ignore_ascii_case(ANSWER_PREFIX) {
        return None;
    }
    Some(
        line[ANSWER_PREFIX.len()..]
            .trim()
            .trim_start_matches('*')
            .trim_end_matches('*')
            .trim()
            .trim_end_matches('.')
            .trim(),
    )
}

fn unquote(answer: &str) -> &str {
    for quote in ['`', '"', '\''] {
        if answer.len() >= 2 && answer.starts_with(quote) && answer.ends_with(quote) {
            return answer[1..answer.len() - 1].trim();
        }
    }
    answer
}

/// Normalize a query-only reply
///
/// Trims whitespace and removes one surrounding markdown code fence. The text
/// is otherwise returned verbatim, so `None` and `"None"` stay distinct.
pub fn clean_query_text(response: &str) -> String {
    let trimmed = response.trim();

    if trimmed.starts_with("```") {
        let lines: Vec<&str> = trimmed.lines().collect();
        let body = match lines.last() {
            Some(last) if lines.len() >= 2 && last.trim() == "```" => &lines[1..lines.len() - 1],
            _ => &lines[1.min(lines.len())..],
        };
        body.join("\n").trim().to_string()
    } else {
        trimmed.to_string()
    }
}
