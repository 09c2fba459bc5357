//! Line classification.
//!
//! The notation is line oriented. Every non-blank, non-comment line is one of
//! a directive (`Process:`, `Actors:`), an actor mapping (`Actor: [a, b]`),
//! a main flow line, or a subprocess body line (`Name: Start -> ... -> End`).

use crate::{
    error::{Diagnostic, ErrorCode},
    span::Span,
};

const ARROW: &str = "->";

/// A classified source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Line<'src> {
    /// 1-based line number.
    pub number: usize,
    pub span: Span,
    pub kind: LineKind<'src>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LineKind<'src> {
    /// `Process: Name`
    ProcessName(&'src str),
    /// `Actors: a, b, c`
    Actors(Vec<&'src str>),
    /// `Actor: [activity, activity]`
    ActorMap {
        actor: &'src str,
        activities: Vec<&'src str>,
    },
    /// A flow, with the subprocess header when one is present.
    Flow {
        header: Option<&'src str>,
        body: &'src str,
    },
}

/// Split `source` into classified lines.
///
/// Lines that cannot be classified are reported as diagnostics and skipped.
pub(crate) fn classify_lines<'src>(source: &'src str) -> (Vec<Line<'src>>, Vec<Diagnostic>) {
    let mut lines = Vec::new();
    let mut diagnostics = Vec::new();

    for (index, raw) in source.lines().enumerate() {
        let number = index + 1;
        let text = raw.trim();
        if text.is_empty() || text.starts_with('#') || text.starts_with("//") {
            continue;
        }

        let span = Span::of(source, text);
        match classify(text) {
            Ok(kind) => lines.push(Line { number, span, kind }),
            Err(diagnostic) => diagnostics.push(
                diagnostic
                    .with_line(number)
                    .with_label(span, "in this line"),
            ),
        }
    }

    (lines, diagnostics)
}

fn classify(text: &str) -> Result<LineKind<'_>, Diagnostic> {
    let Some((header, rest)) = split_header(text) else {
        if text.contains(ARROW) {
            return Ok(LineKind::Flow {
                header: None,
                body: text,
            });
        }
        return Err(missing_arrow(text));
    };

    if rest.contains(ARROW) {
        return Ok(LineKind::Flow {
            header: Some(header),
            body: rest,
        });
    }

    if header.eq_ignore_ascii_case("process") {
        return Ok(LineKind::ProcessName(rest));
    }
    if header.eq_ignore_ascii_case("actors") {
        return Ok(LineKind::Actors(split_list(rest)));
    }
    if rest.starts_with('[') {
        let inner = rest
            .strip_prefix('[')
            .and_then(|inner| inner.strip_suffix(']'))
            .ok_or_else(|| {
                Diagnostic::error(format!("actor mapping for `{header}` is missing a closing `]`"))
                    .with_code(ErrorCode::E103)
                    .with_help("write the mapping as `Actor: [Activity, Activity]`")
            })?;
        return Ok(LineKind::ActorMap {
            actor: header,
            activities: split_list(inner),
        });
    }

    Err(missing_arrow(text))
}

/// Split `Name: rest` when the prefix before the first `:` is a plain name.
///
/// A prefix containing flow syntax means the colon belongs to a step, as in
/// `Start -> Check(x: y) -> End`.
fn split_header(text: &str) -> Option<(&str, &str)> {
    let (header, rest) = text.split_once(':')?;
    if header.contains(ARROW) || header.contains(['(', '[', '|']) {
        return None;
    }
    let header = header.trim();
    if header.is_empty() {
        return None;
    }
    Some((header, rest.trim()))
}

fn split_list(text: &str) -> Vec<&str> {
    text.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .collect()
}

fn missing_arrow(text: &str) -> Diagnostic {
    Diagnostic::error(format!("`{text}` is not a flow: missing `->` between steps"))
        .with_code(ErrorCode::E100)
        .with_help("join steps with `->`, e.g. `Start -> Review -> End`")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<LineKind<'_>> {
        let (lines, diagnostics) = classify_lines(source);
        assert!(diagnostics.is_empty(), "unexpected diagnostics: {diagnostics:?}");
        lines.into_iter().map(|line| line.kind).collect()
    }

    #[test]
    fn test_skips_blank_and_comment_lines() {
        let source = "\n# heading\n// note\n   \nStart -> End\n";
        let (lines, _) = classify_lines(source);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].number, 5);
        assert_eq!(lines[0].span, Span::new(23..35));
    }

    #[test]
    fn test_directives() {
        assert_eq!(
            kinds("Process: Order Handling\nActors: Customer, Clerk ,"),
            [
                LineKind::ProcessName("Order Handling"),
                LineKind::Actors(vec!["Customer", "Clerk"]),
            ]
        );
    }

    #[test]
    fn test_actor_mapping() {
        assert_eq!(
            kinds("Customer: [SubmitOrder, Pay]"),
            [LineKind::ActorMap {
                actor: "Customer",
                activities: vec!["SubmitOrder", "Pay"],
            }]
        );
    }

    #[test]
    fn test_flow_lines() {
        assert_eq!(
            kinds("Start -> A -> End\n  Packing: Start -> Pack -> End"),
            [
                LineKind::Flow {
                    header: None,
                    body: "Start -> A -> End",
                },
                LineKind::Flow {
                    header: Some("Packing"),
                    body: "Start -> Pack -> End",
                },
            ]
        );
    }

    #[test]
    fn test_colon_inside_step_is_not_a_header() {
        assert_eq!(
            kinds("Start -> XOR -> Ship(status: ok) -> End"),
            [LineKind::Flow {
                header: None,
                body: "Start -> XOR -> Ship(status: ok) -> End",
            }]
        );
    }

    #[test]
    fn test_missing_arrow() {
        let (lines, diagnostics) = classify_lines("Start\nPacking: Start");
        assert!(lines.is_empty());
        assert_eq!(diagnostics.len(), 2);
        assert!(
            diagnostics
                .iter()
                .all(|diag| diag.code() == Some(ErrorCode::E100))
        );
        assert_eq!(diagnostics[1].line(), Some(2));
    }

    #[test]
    fn test_unclosed_actor_mapping() {
        let (_, diagnostics) = classify_lines("Customer: [SubmitOrder");
        assert_eq!(diagnostics[0].code(), Some(ErrorCode::E103));
    }
}
