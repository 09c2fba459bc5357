//! Flow line parser.
//!
//! A flow body is a chain of groups joined by `->`. A group is one step, or
//! several steps joined by `||` that run in parallel. Each step follows the
//! grammar
//!
//! ```text
//! step  := "[sub]"? name ( "(" paren ")" )?
//! name  := any text without "(" or ")"
//! paren := any text without "(" or ")"
//! ```
//!
//! The public entry point is [`parse_flow`], which reports every malformed
//! step on the line rather than stopping at the first.

use winnow::{
    Parser as _,
    ascii::space0,
    combinator::{cut_err, delimited, eof, opt, terminated},
    error::{ContextError, ErrMode, ModalResult},
    token::{literal, take_till},
};

use crate::{
    error::{Diagnostic, ErrorCode},
    span::Span,
};

const ARROW: &str = "->";
const PARALLEL: &str = "||";
const SUB_MARKER: &str = "[sub]";

/// Diagnostic information attached to step grammar failures via `.context()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct StepDiagnostic {
    message: &'static str,
    help: &'static str,
}

type Input<'src> = &'src str;
type IResult<O> = ModalResult<O, ContextError<StepDiagnostic>>;

/// A step as written, before classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RawStep<'src> {
    pub is_sub: bool,
    pub name: &'src str,
    pub paren: Option<&'src str>,
    pub span: Span,
}

/// One `->` separated segment of a flow line.
pub(crate) type Group<'src> = Vec<RawStep<'src>>;

fn sub_marker(input: &mut Input<'_>) -> IResult<bool> {
    opt(terminated(literal(SUB_MARKER), space0))
        .map(|marker| marker.is_some())
        .parse_next(input)
}

fn step_name<'src>(input: &mut Input<'src>) -> IResult<&'src str> {
    take_till(1.., ('(', ')'))
        .map(str::trim)
        .verify(|name: &str| !name.is_empty())
        .context(StepDiagnostic {
            message: "step has no name",
            help: "write a name after the marker, e.g. `[sub]Packing`",
        })
        .parse_next(input)
}

fn parenthetical<'src>(input: &mut Input<'src>) -> IResult<&'src str> {
    delimited('(', take_till(0.., ('(', ')')), cut_err(')'))
        .map(str::trim)
        .context(StepDiagnostic {
            message: "unbalanced parentheses",
            help: "close the parenthetical, e.g. `Review(user)`",
        })
        .parse_next(input)
}

fn step<'src>(input: &mut Input<'src>) -> IResult<(bool, &'src str, Option<&'src str>)> {
    let is_sub = sub_marker(input)?;
    let name = cut_err(step_name).parse_next(input)?;
    let paren = opt(parenthetical).parse_next(input)?;
    cut_err((space0, eof))
        .context(StepDiagnostic {
            message: "unexpected text after step",
            help: "a step is a name with at most one trailing `(...)`",
        })
        .parse_next(input)?;
    Ok((is_sub, name, paren))
}

/// Parse a single step.
///
/// `text` must be a subslice of `source` so the span can be recovered.
pub(crate) fn parse_step<'src>(
    source: &'src str,
    text: &'src str,
) -> Result<RawStep<'src>, Diagnostic> {
    let text = text.trim();
    let span = Span::of(source, text);

    if text.is_empty() {
        return Err(Diagnostic::error("empty step")
            .with_code(ErrorCode::E101)
            .with_label(span, "expected a step here")
            .with_help("remove the extra `->` or `||`, or name the step"));
    }

    let mut input = text;
    match step(&mut input) {
        Ok((is_sub, name, paren)) => {
            if paren == Some("") {
                return Err(Diagnostic::error(format!("step `{name}` has empty parentheses"))
                    .with_code(ErrorCode::E103)
                    .with_label(span, "malformed step")
                    .with_help("drop the `()` or write a task type or condition inside"));
            }
            Ok(RawStep {
                is_sub,
                name,
                paren,
                span,
            })
        }
        Err(ErrMode::Backtrack(err)) | Err(ErrMode::Cut(err)) => {
            let context = err.context().next().copied();
            let (message, help) = context.map_or(("malformed step", None), |ctx| {
                (ctx.message, Some(ctx.help))
            });
            let mut diagnostic = Diagnostic::error(format!("{message} in `{text}`"))
                .with_code(ErrorCode::E103)
                .with_label(span, "malformed step");
            if let Some(help) = help {
                diagnostic = diagnostic.with_help(help);
            }
            Err(diagnostic)
        }
        Err(_) => Err(Diagnostic::error(format!("malformed step `{text}`"))
            .with_code(ErrorCode::E103)
            .with_label(span, "malformed step")),
    }
}

/// Parse a flow body into its `->` separated groups.
///
/// `body` must be a subslice of `source`. Every malformed step on the line is
/// reported.
pub(crate) fn parse_flow<'src>(
    source: &'src str,
    body: &'src str,
) -> Result<Vec<Group<'src>>, Vec<Diagnostic>> {
    let mut groups = Vec::new();
    let mut diagnostics = Vec::new();

    for segment in body.split(ARROW) {
        let mut group = Vec::new();
        for part in segment.split(PARALLEL) {
            match parse_step(source, part) {
                Ok(step) => group.push(step),
                Err(diagnostic) => diagnostics.push(diagnostic),
            }
        }
        groups.push(group);
    }

    if diagnostics.is_empty() {
        Ok(groups)
    } else {
        Err(diagnostics)
    }
}
