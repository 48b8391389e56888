use super::engine::Interpreter;
use super::{Evaluation, Mode, NullSink};
use crate::state::input::Input;
use once_cell::sync::Lazy;
use regex::Regex;

static INLINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"neax\[(?P<inner>.*?)\]").expect("valid regex"));

/// Text that replaces a failed inline invocation.
pub const FAILED_MARK: &str = "[x]";

/// Outcome of expanding every `neax[...]` span of one script.
pub struct Expansion {
    pub script: String,
    pub failures: Vec<Evaluation>,
}

impl Expansion {
    pub fn failed(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Aggregated report of every failed inline invocation, in source order.
    pub fn issues(&self) -> String {
        let body: Vec<String> = self
            .failures
            .iter()
            .map(|f| format!("Neax::{} =\n{}", f.code, f.result))
            .collect();
        format!("Issues: \n\n{}", body.join("\n\n"))
    }
}

/// Evaluates each span left to right as `<inner> --raw` in buffered mode and splices the
/// trimmed result back in. The innermost `]` closes a span, so spans do not nest.
pub(crate) async fn expand(
    interp: &Interpreter,
    input: &Input,
    script: &str,
    depth: usize,
) -> Expansion {
    let spans: Vec<(usize, usize, String)> = INLINE_RE
        .captures_iter(script)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let inner = caps.name("inner")?.as_str();
            Some((whole.start(), whole.end(), format!("{inner} --raw")))
        })
        .collect();

    let mut out = String::with_capacity(script.len());
    let mut failures = Vec::new();
    let mut last = 0;

    for (start, end, inner) in spans {
        out.push_str(&script[last..start]);
        let eval = interp
            .eval(input, &inner, &mut NullSink, Mode::Buffered, depth + 1)
            .await;
        if eval.code.is_success() {
            out.push_str(eval.result.trim());
        } else {
            tracing::debug!(script = %inner, code = %eval.code, "inline invocation failed");
            out.push_str(FAILED_MARK);
            failures.push(eval);
        }
        last = end;
    }
    out.push_str(&script[last..]);

    Expansion {
        script: out,
        failures,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::Code;

    #[test]
    fn issues_pair_codes_with_outputs() {
        let e = Expansion {
            script: String::new(),
            failures: vec![
                Evaluation::new(Code::CommandNotFound, "Neax::CommandNotFound = nope"),
                Evaluation::new(Code::MissingOrInvalidArgs, "[nothing]"),
            ],
        };
        assert!(e.failed());
        assert_eq!(
            e.issues(),
            "Issues: \n\nNeax::CommandNotFound =\nNeax::CommandNotFound = nope\n\n\
             Neax::MissingOrInvalidArgs =\n[nothing]"
        );
    }

    #[test]
    fn span_ends_at_first_bracket() {
        let caps: Vec<&str> = INLINE_RE
            .captures_iter("a neax[num:: 1] b neax[print::self [x]")
            .filter_map(|c| c.name("inner").map(|m| m.as_str()))
            .collect();
        assert_eq!(caps, vec!["num:: 1", "print::self [x"]);
    }
}
