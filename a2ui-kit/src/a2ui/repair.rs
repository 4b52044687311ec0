//! Lenient JSON repair for model-generated A2UI payloads.
//!
//! Language models streaming A2UI often produce almost-JSON: comments,
//! trailing commas, a missing brace on one component line, or a payload cut
//! off by the token limit. [`repair_json`] applies increasingly invasive
//! fixes and stops at the first one that parses.

use serde::de::IgnoredAny;

fn is_valid(json: &str) -> bool {
    serde_json::from_str::<IgnoredAny>(json).is_ok()
}

/// Tracks string literals while scanning JSON text one char at a time.
#[derive(Debug, Default)]
struct Scanner {
    in_string: bool,
    escaped: bool,
}

impl Scanner {
    /// Feed one char. Returns `true` if it sits outside any string literal
    /// and is not a quote.
    fn structural(&mut self, ch: char) -> bool {
        if self.in_string {
            if self.escaped {
                self.escaped = false;
            } else if ch == '\\' {
                self.escaped = true;
            } else if ch == '"' {
                self.in_string = false;
            }
            false
        } else if ch == '"' {
            self.in_string = true;
            false
        } else {
            true
        }
    }
}

/// Net bracket depth change across `text`, ignoring string contents.
fn depth_delta(text: &str) -> i32 {
    let mut scanner = Scanner::default();
    text.chars()
        .filter(|&ch| scanner.structural(ch))
        .map(|ch| match ch {
            '{' | '[' => 1,
            '}' | ']' => -1,
            _ => 0,
        })
        .sum()
}

/// Attempt to turn malformed JSON into something that parses.
///
/// Returns the input unchanged if it is already valid or no repair works.
pub fn repair_json(json: &str) -> String {
    if is_valid(json) {
        return json.to_string();
    }
    ::log::debug!("[A2UI] JSON is invalid, attempting repair");

    let mut repaired = strip_trailing_commas(&strip_comments(json));
    if is_valid(&repaired) {
        ::log::debug!("[A2UI] Repaired by stripping comments and trailing commas");
        return repaired;
    }

    repaired = close_component_lines(&repaired);
    if is_valid(&repaired) {
        ::log::debug!("[A2UI] Repaired by balancing component lines");
        return repaired;
    }

    let closed = close_truncated(&repaired);
    if is_valid(&closed) {
        ::log::debug!(
            "[A2UI] Repaired by closing brackets ({} -> {} bytes)",
            json.len(),
            closed.len()
        );
        return closed;
    }

    if let Some(truncated) = truncate_to_last_complete_element(&repaired)
        .filter(|truncated| is_valid(truncated))
    {
        ::log::debug!(
            "[A2UI] Repaired by dropping the incomplete last element ({} -> {} bytes)",
            json.len(),
            truncated.len()
        );
        return truncated;
    }

    ::log::warn!("[A2UI] JSON repair failed, using the input as-is");
    json.to_string()
}

/// Remove `// line` and `/* block */` comments outside of strings.
fn strip_comments(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    let mut scanner = Scanner::default();
    let mut chars = json.chars().peekable();

    while let Some(ch) = chars.next() {
        if scanner.structural(ch) && ch == '/' {
            match chars.peek() {
                Some('/') => {
                    while chars.next_if(|&c| c != '\n').is_some() {}
                    continue;
                }
                Some('*') => {
                    chars.next();
                    let mut prev = '\0';
                    for c in chars.by_ref() {
                        if prev == '*' && c == '/' {
                            break;
                        }
                        prev = c;
                    }
                    continue;
                }
                _ => {}
            }
        }
        out.push(ch);
    }
    out
}

/// Drop commas directly followed (modulo whitespace) by `]` or `}`.
fn strip_trailing_commas(json: &str) -> String {
    let chars: Vec<char> = json.chars().collect();
    let mut out = String::with_capacity(json.len());
    let mut scanner = Scanner::default();

    for (i, &ch) in chars.iter().enumerate() {
        if scanner.structural(ch) && ch == ',' {
            let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
            if matches!(next, Some(']' | '}')) {
                continue;
            }
        }
        out.push(ch);
    }
    out
}

/// Close component entries that were left open on their own lines.
///
/// Models writing one `{"id": ...}` entry per line sometimes drop the final
/// `}`. When the next entry starts while the previous one is still open, the
/// missing braces are appended to the previous line.
fn close_component_lines(json: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut open_entry: Option<i32> = None;

    for line in json.lines() {
        if line.trim_start().starts_with("{\"id\"") {
            if let (Some(open), Some(previous)) = (open_entry, lines.last_mut()) {
                if open > 0 {
                    append_closers(previous, open);
                }
            }
            open_entry = Some(0);
        }

        if let Some(open) = open_entry.as_mut() {
            *open += depth_delta(line);
            if *open <= 0 {
                open_entry = None;
            }
        }
        lines.push(line.to_string());
    }
    lines.join("\n")
}

fn append_closers(line: &mut String, count: i32) {
    let trimmed = line.trim_end();
    let had_comma = trimmed.ends_with(',');
    let mut fixed = trimmed.trim_end_matches(',').to_string();
    fixed.extend(std::iter::repeat_n('}', count as usize));
    if had_comma {
        fixed.push(',');
    }
    *line = fixed;
}

/// Close an unterminated string and every bracket left open.
fn close_truncated(json: &str) -> String {
    let mut closed = json.trim_end().trim_end_matches(',').to_string();
    let mut scanner = Scanner::default();
    let mut closers = Vec::new();

    for ch in closed.chars() {
        if !scanner.structural(ch) {
            continue;
        }
        match ch {
            '[' => closers.push(']'),
            '{' => closers.push('}'),
            ']' | '}' => {
                closers.pop();
            }
            _ => {}
        }
    }

    if scanner.in_string {
        if scanner.escaped {
            closed.pop();
        }
        closed.push('"');
    } else {
        let kept = closed.trim_end_matches([':', ',']).trim_end().len();
        closed.truncate(kept);
    }

    closed.extend(closers.into_iter().rev());
    closed
}

/// Cut a top-level array after its last complete object element.
fn truncate_to_last_complete_element(json: &str) -> Option<String> {
    if !json.trim_start().starts_with('[') {
        return None;
    }

    let mut scanner = Scanner::default();
    let mut depth = 0;
    let mut last_end = None;
    for (i, ch) in json.char_indices() {
        if !scanner.structural(ch) {
            continue;
        }
        match ch {
            '[' | '{' => depth += 1,
            ']' | '}' => {
                depth -= 1;
                if depth == 1 && ch == '}' {
                    last_end = Some(i);
                }
            }
            _ => {}
        }
    }

    last_end.map(|end| format!("{}]", &json[..=end]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn parse(json: &str) -> Value {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_valid_json_is_untouched() {
        let json = r#"[{"deleteSurface": {"surfaceId": "main"}}]"#;
        assert_eq!(repair_json(json), json);
    }

    #[test]
    fn test_strips_comments_and_trailing_commas() {
        let json = r#"[
            // the surface
            {"deleteSurface": {"surfaceId": "http://example.com/a", /* inline */}},
        ]"#;
        assert_eq!(
            parse(&repair_json(json)),
            json!([{"deleteSurface": {"surfaceId": "http://example.com/a"}}])
        );
    }

    #[test]
    fn test_comment_markers_inside_strings_are_kept() {
        let json = r#"{"text": "a // b /* c */",}"#;
        assert_eq!(parse(&repair_json(json)), json!({"text": "a // b /* c */"}));
    }

    #[test]
    fn test_closes_missing_brace_on_component_line() {
        let json = [
            r#"{"components": ["#,
            r#"{"id": "a", "component": {"Text": {"text": "x"}},"#,
            r#"{"id": "b", "component": {"Text": {"text": "y"}}}"#,
            r#"]}"#,
        ]
        .join("\n");
        let repaired = parse(&repair_json(&json));
        assert_eq!(repaired["components"][0]["id"], "a");
        assert_eq!(repaired["components"][1]["component"]["Text"]["text"], "y");
    }

    #[test]
    fn test_closes_truncated_string_and_brackets() {
        let json = r#"[{"updateDataModel": {"surfaceId": "s", "path": "/title", "value": "Hel"#;
        assert_eq!(
            parse(&repair_json(json)),
            json!([{"updateDataModel": {"surfaceId": "s", "path": "/title", "value": "Hel"}}])
        );
    }

    #[test]
    fn test_drops_incomplete_last_element() {
        let json = r#"[{"deleteSurface": {"surfaceId": "a"}}, {"deleteSurface": {"surfaceId""#;
        assert_eq!(
            parse(&repair_json(json)),
            json!([{"deleteSurface": {"surfaceId": "a"}}])
        );
    }

    #[test]
    fn test_unrepairable_input_is_returned_as_is() {
        let json = "not json at all";
        assert_eq!(repair_json(json), json);
    }
}
