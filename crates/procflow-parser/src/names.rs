//! Step name handling: sanitization and kind detection.

use procflow_core::{registry::ElementType, semantic::GatewayDirection};

/// Literal step name for the start event.
pub(crate) const START: &str = "Start";
/// Literal step name for the end event.
pub(crate) const END: &str = "End";

/// What a step name denotes, before any parenthetical is considered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StepKind {
    Start,
    End,
    Gateway(ElementType, GatewayDirection),
    SubProcess,
    Task,
}

impl StepKind {
    /// Reserved names are kept verbatim instead of being sanitized.
    pub(crate) fn is_reserved(self) -> bool {
        matches!(self, StepKind::Start | StepKind::End | StepKind::Gateway(..))
    }
}

/// Decide what a step name denotes.
pub(crate) fn classify(name: &str, is_sub: bool) -> StepKind {
    if is_sub {
        return StepKind::SubProcess;
    }
    if name == START {
        return StepKind::Start;
    }
    if name == END {
        return StepKind::End;
    }
    match gateway_prefix(name) {
        Some(kind) => {
            let direction = if is_join(name) {
                GatewayDirection::Converging
            } else {
                GatewayDirection::Diverging
            };
            StepKind::Gateway(kind, direction)
        }
        None => StepKind::Task,
    }
}

/// Sanitize a free-form name into identifier-safe form.
///
/// Letters, digits, and underscores are kept. Every run of other characters
/// becomes a single `_`, and leading/trailing underscores are trimmed.
///
/// ```
/// # use procflow_parser::sanitize_name;
/// assert_eq!(sanitize_name("Submit Order"), "Submit_Order");
/// assert_eq!(sanitize_name("  Check stock / reserve! "), "Check_stock_reserve");
/// assert_eq!(sanitize_name("SubmitOrder"), "SubmitOrder");
/// ```
pub fn sanitize_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_separator = false;

    for c in raw.chars() {
        if c.is_alphanumeric() || c == '_' {
            if pending_separator && !out.is_empty() {
                out.push('_');
            }
            pending_separator = false;
            out.push(c);
        } else {
            pending_separator = true;
        }
    }

    out.trim_matches('_').to_string()
}

/// `XOR` → exclusive, `AND` → parallel, `OR` → exclusive.
///
/// The prefix must be the whole name or be followed by a non-alphanumeric
/// character, so `ORDER` or `Android` are plain tasks.
fn gateway_prefix(name: &str) -> Option<ElementType> {
    const PREFIXES: [(&str, ElementType); 3] = [
        ("XOR", ElementType::ExclusiveGateway),
        ("AND", ElementType::ParallelGateway),
        ("OR", ElementType::ExclusiveGateway),
    ];

    PREFIXES.iter().find_map(|(prefix, kind)| {
        let rest = name.strip_prefix(prefix)?;
        match rest.chars().next() {
            None => Some(*kind),
            Some(c) if !c.is_alphanumeric() => Some(*kind),
            Some(_) => None,
        }
    })
}

fn is_join(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.ends_with("_end") || lower.ends_with("_join")
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_classify_events() {
        assert_eq!(classify("Start", false), StepKind::Start);
        assert_eq!(classify("End", false), StepKind::End);
        // Only the exact literal is an event.
        assert_eq!(classify("Ending", false), StepKind::Task);
        assert_eq!(classify("start", false), StepKind::Task);
    }

    #[test]
    fn test_classify_gateways() {
        assert_eq!(
            classify("XOR", false),
            StepKind::Gateway(ElementType::ExclusiveGateway, GatewayDirection::Diverging)
        );
        assert_eq!(
            classify("XOR_Approved", false),
            StepKind::Gateway(ElementType::ExclusiveGateway, GatewayDirection::Diverging)
        );
        assert_eq!(
            classify("XOR_Approved_end", false),
            StepKind::Gateway(ElementType::ExclusiveGateway, GatewayDirection::Converging)
        );
        assert_eq!(
            classify("AND_Ship_Join", false),
            StepKind::Gateway(ElementType::ParallelGateway, GatewayDirection::Converging)
        );
        assert_eq!(
            classify("OR in stock?", false),
            StepKind::Gateway(ElementType::ExclusiveGateway, GatewayDirection::Diverging)
        );
    }

    #[test]
    fn test_gateway_prefix_needs_boundary() {
        assert_eq!(classify("ORDER", false), StepKind::Task);
        assert_eq!(classify("Android", false), StepKind::Task);
        assert_eq!(classify("XORacle", false), StepKind::Task);
    }

    #[test]
    fn test_sub_flag_wins() {
        assert_eq!(classify("Start", true), StepKind::SubProcess);
        assert!(!StepKind::SubProcess.is_reserved());
        assert!(StepKind::Start.is_reserved());
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("Submit Order"), "Submit_Order");
        assert_eq!(sanitize_name("already_fine_1"), "already_fine_1");
        assert_eq!(sanitize_name("--- "), "");
        assert_eq!(sanitize_name("Prüfen & Freigeben"), "Prüfen_Freigeben");
    }

    proptest! {
        #[test]
        fn sanitized_names_are_identifier_safe(raw in ".{0,40}") {
            let sanitized = sanitize_name(&raw);
            prop_assert!(sanitized.chars().all(|c| c.is_alphanumeric() || c == '_'));
            prop_assert!(!sanitized.starts_with('_'));
            prop_assert!(!sanitized.ends_with('_'));
        }

        #[test]
        fn sanitize_is_idempotent(raw in ".{0,40}") {
            let once = sanitize_name(&raw);
            prop_assert_eq!(sanitize_name(&once), once.clone());
        }
    }
}
