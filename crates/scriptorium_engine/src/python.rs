//! Python-family engine.
//!
//! A line-oriented pattern emulation, not a parser: each statement form is
//! recognized by shape, blocks are delimited by indentation, and anything
//! the subset does not cover is skipped. Only text that matches no known
//! statement shape at all is rejected as malformed.
//!
//! Supported subset: assignment of number/string/boolean/list literals,
//! `print(...)` with literals, variables, simple arithmetic and f-string
//! interpolation, and `for <name> in range(...):` with nested bodies.

use crate::trait_::{EngineOutput, Executable};
use once_cell::sync::Lazy;
use regex::Regex;
use scriptorium_core::{CoreError, CoreResult, Language};
use std::collections::HashMap;

const DEFAULT_MAX_ITERATIONS: u64 = 100_000;
const DEFAULT_MAX_OUTPUT_BYTES: usize = 64 * 1024;

static ASSIGN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z_]\w*)\s*=\s*(.+)$").expect("assign regex"));
static PRINT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^print\s*\((.*)\)\s*$").expect("print regex"));
static FOR_RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^for\s+([A-Za-z_]\w*)\s+in\s+range\s*\((.*)\)\s*:\s*$").expect("for regex")
});
// Compound statements we recognize but do not execute; their blocks are
// consumed so the body lines are not misread as top-level statements.
static SKIPPED_BLOCK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(def|class|if|elif|else|while|try|except|finally|with|for)\b.*:\s*$")
        .expect("block regex")
});
static SKIPPED_SIMPLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(import|from|return|pass|break|continue|global|del|assert|raise)\b")
        .expect("simple regex")
});
static BARE_CALL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][\w.]*\s*\(.*\)\s*$").expect("call regex"));
static FOR_HEAD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^for\b").expect("for head regex"));
static PRINT_HEAD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^print\s*\(").expect("print head regex"));

/// Python-family pattern-matching emulation
pub struct PythonEngine {
    max_iterations: u64,
    max_output_bytes: usize,
}

impl PythonEngine {
    /// Create an engine with default budgets
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
        }
    }

    /// Set the loop iteration budget
    #[must_use]
    pub fn with_max_iterations(mut self, max: u64) -> Self {
        self.max_iterations = max;
        self
    }
}

impl Default for PythonEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Executable for PythonEngine {
    fn language(&self) -> Language {
        Language::PythonLike
    }

    fn run(&self, code: &str) -> CoreResult<EngineOutput> {
        let lines: Vec<Line> = code
            .lines()
            .enumerate()
            .map(|(i, text)| Line {
                number: i + 1,
                indent: indent_of(text),
                text: text.trim_end().to_string(),
            })
            .collect();

        let mut run = Run {
            env: HashMap::new(),
            out: String::new(),
            iterations_left: self.max_iterations,
            max_output_bytes: self.max_output_bytes,
        };
        match run.exec_block(&lines, 0, lines.len()) {
            Ok(()) => Ok(EngineOutput::success(run.out)),
            Err(ExecError::Program(message)) => Ok(EngineOutput::failure(message)),
            Err(ExecError::Malformed { line, reason }) => {
                Err(CoreError::MalformedInput { line, reason })
            }
        }
    }
}

struct Line {
    number: usize,
    indent: usize,
    text: String,
}

fn indent_of(text: &str) -> usize {
    text.chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .map(|c| if c == '\t' { 4 } else { 1 })
        .sum()
}

enum ExecError {
    /// Caught program-level failure, reported as diagnostic text
    Program(String),
    /// Text matching no known statement shape
    Malformed { line: usize, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
enum PyValue {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    List(Vec<PyValue>),
}

impl PyValue {
    fn display(&self) -> String {
        match self {
            Self::Int(n) => n.to_string(),
            Self::Float(n) => {
                if n.fract() == 0.0 {
                    format!("{:.1}", n)
                } else {
                    format!("{}", n)
                }
            }
            Self::Str(s) => s.clone(),
            Self::Bool(b) => if *b { "True" } else { "False" }.to_string(),
            Self::List(items) => {
                let rendered: Vec<String> = items.iter().map(PyValue::repr).collect();
                format!("[{}]", rendered.join(", "))
            }
        }
    }

    fn repr(&self) -> String {
        match self {
            Self::Str(s) => format!("'{}'", s),
            other => other.display(),
        }
    }
}

struct Run {
    env: HashMap<String, PyValue>,
    out: String,
    iterations_left: u64,
    max_output_bytes: usize,
}

impl Run {
    /// Execute lines[start..end], treating them as one block.
    fn exec_block(&mut self, lines: &[Line], start: usize, end: usize) -> Result<(), ExecError> {
        let mut i = start;
        while i < end {
            let line = &lines[i];
            let stripped = line.text.trim_start();

            if stripped.is_empty() || stripped.starts_with('#') {
                i += 1;
                continue;
            }

            if let Some(caps) = FOR_RANGE_RE.captures(stripped) {
                let variable = caps.get(1).map(|m| m.as_str().to_string()).unwrap_or_default();
                let range_args = caps.get(2).map(|m| m.as_str()).unwrap_or_default().to_string();
                let body_end = block_end(lines, i, end);
                self.exec_for_range(lines, line, &variable, &range_args, i + 1, body_end)?;
                i = body_end;
                continue;
            }

            if FOR_HEAD_RE.is_match(stripped) {
                if stripped.contains("range(") {
                    // A for-range that did not match the shape above
                    return Err(ExecError::Malformed {
                        line: line.number,
                        reason: "unparsable for/range statement".to_string(),
                    });
                }
                // Other iteration targets are outside the subset
                i = block_end(lines, i, end);
                continue;
            }

            if PRINT_HEAD_RE.is_match(stripped) {
                let caps = PRINT_RE.captures(stripped).ok_or(ExecError::Malformed {
                    line: line.number,
                    reason: "unparsable print statement".to_string(),
                })?;
                let args = caps.get(1).map(|m| m.as_str()).unwrap_or_default().to_string();
                self.exec_print(line, &args)?;
                i += 1;
                continue;
            }

            if SKIPPED_BLOCK_RE.is_match(stripped) {
                i = block_end(lines, i, end);
                continue;
            }

            if SKIPPED_SIMPLE_RE.is_match(stripped) {
                i += 1;
                continue;
            }

            if let Some(caps) = ASSIGN_RE.captures(stripped) {
                let name = caps.get(1).map(|m| m.as_str()).unwrap_or_default().to_string();
                let rhs = caps.get(2).map(|m| m.as_str()).unwrap_or_default().to_string();
                // Only literal right-hand sides are in the subset; an
                // expression assignment is unsupported, not malformed.
                if let Some(value) = parse_literal(&rhs) {
                    self.env.insert(name, value);
                }
                i += 1;
                continue;
            }

            if BARE_CALL_RE.is_match(stripped) {
                i += 1;
                continue;
            }

            return Err(ExecError::Malformed {
                line: line.number,
                reason: format!("unrecognized statement: {}", stripped),
            });
        }
        Ok(())
    }

    fn exec_for_range(
        &mut self,
        lines: &[Line],
        header: &Line,
        variable: &str,
        range_args: &str,
        body_start: usize,
        body_end: usize,
    ) -> Result<(), ExecError> {
        let args: Vec<&str> = if range_args.trim().is_empty() {
            Vec::new()
        } else {
            range_args.split(',').map(str::trim).collect()
        };
        let mut bounds = Vec::with_capacity(args.len());
        for arg in &args {
            match self.eval_expr(arg) {
                Some(PyValue::Int(n)) => bounds.push(n),
                _ => {
                    return Err(ExecError::Malformed {
                        line: header.number,
                        reason: format!("range argument is not an integer: {}", arg),
                    });
                }
            }
        }
        let (start, stop, step) = match bounds.as_slice() {
            [stop] => (0, *stop, 1),
            [start, stop] => (*start, *stop, 1),
            [start, stop, step] => (*start, *stop, *step),
            _ => {
                return Err(ExecError::Malformed {
                    line: header.number,
                    reason: "range takes 1 to 3 arguments".to_string(),
                });
            }
        };
        if step == 0 {
            return Err(ExecError::Program("range() step must not be zero".to_string()));
        }

        let mut current = start;
        loop {
            let in_range = if step > 0 { current < stop } else { current > stop };
            if !in_range {
                break;
            }
            if self.iterations_left == 0 {
                return Err(ExecError::Program("iteration budget exhausted".to_string()));
            }
            self.iterations_left -= 1;

            self.env.insert(variable.to_string(), PyValue::Int(current));
            self.exec_block(lines, body_start, body_end)?;
            current += step;
        }
        Ok(())
    }

    fn exec_print(&mut self, line: &Line, args: &str) -> Result<(), ExecError> {
        let mut rendered = Vec::new();
        for arg in split_top_level(args) {
            let arg = arg.trim();
            if arg.is_empty() {
                continue;
            }
            let value = self.eval_print_arg(arg).ok_or(ExecError::Malformed {
                line: line.number,
                reason: format!("unparsable print argument: {}", arg),
            })?;
            rendered.push(value);
        }
        let text = format!("{}\n", rendered.join(" "));
        if self.out.len() + text.len() > self.max_output_bytes {
            return Err(ExecError::Program("output limit exceeded".to_string()));
        }
        self.out.push_str(&text);
        Ok(())
    }

    fn eval_print_arg(&self, arg: &str) -> Option<String> {
        // f-string: interpolate {expr} segments
        if let Some(body) = fstring_body(arg) {
            let mut text = String::new();
            let mut chars = body.chars().peekable();
            while let Some(c) = chars.next() {
                match c {
                    '{' if chars.peek() == Some(&'{') => {
                        chars.next();
                        text.push('{');
                    }
                    '}' if chars.peek() == Some(&'}') => {
                        chars.next();
                        text.push('}');
                    }
                    '{' => {
                        let mut expr = String::new();
                        for inner in chars.by_ref() {
                            if inner == '}' {
                                break;
                            }
                            expr.push(inner);
                        }
                        text.push_str(&self.eval_expr(expr.trim())?.display());
                    }
                    _ => text.push(c),
                }
            }
            return Some(text);
        }
        Some(self.eval_expr(arg)?.display())
    }

    /// Evaluate a small expression: a literal, a variable, or left-to-right
    /// `+ - * /` arithmetic over them.
    fn eval_expr(&self, expr: &str) -> Option<PyValue> {
        let expr = expr.trim();
        if let Some(value) = self.eval_atom(expr) {
            return Some(value);
        }

        let terms = split_arithmetic(expr)?;
        let mut accumulator = self.eval_atom(terms.first()?.1.trim())?;
        for (op, term) in terms.iter().skip(1) {
            let rhs = self.eval_atom(term.trim())?;
            accumulator = apply_arithmetic(accumulator, *op, rhs)?;
        }
        Some(accumulator)
    }

    fn eval_atom(&self, atom: &str) -> Option<PyValue> {
        if let Some(value) = parse_literal(atom) {
            return Some(value);
        }
        self.env.get(atom).cloned()
    }
}

/// Index one past the last line of the block opened at `opener`.
///
/// A block starts at the first non-blank line after the compound statement
/// and ends at the first line whose indentation is less than or equal to
/// the opener's indentation.
fn block_end(lines: &[Line], opener: usize, end: usize) -> usize {
    let opening_indent = lines[opener].indent;
    let mut i = opener + 1;
    while i < end {
        let line = &lines[i];
        if !line.text.trim().is_empty() && line.indent <= opening_indent {
            break;
        }
        i += 1;
    }
    i
}

fn fstring_body(arg: &str) -> Option<&str> {
    let rest = arg.strip_prefix('f').or_else(|| arg.strip_prefix('F'))?;
    quoted_body(rest)
}

fn quoted_body(text: &str) -> Option<&str> {
    for quote in ['"', '\''] {
        if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            return Some(&text[1..text.len() - 1]);
        }
    }
    None
}

fn parse_literal(text: &str) -> Option<PyValue> {
    let text = text.trim();
    if text == "True" {
        return Some(PyValue::Bool(true));
    }
    if text == "False" {
        return Some(PyValue::Bool(false));
    }
    if let Some(body) = quoted_body(text) {
        return Some(PyValue::Str(body.to_string()));
    }
    if let Ok(n) = text.parse::<i64>() {
        return Some(PyValue::Int(n));
    }
    if let Ok(n) = text.parse::<f64>() {
        return Some(PyValue::Float(n));
    }
    if text.starts_with('[') && text.ends_with(']') {
        let inner = &text[1..text.len() - 1];
        if inner.trim().is_empty() {
            return Some(PyValue::List(Vec::new()));
        }
        let mut items = Vec::new();
        for item in split_top_level(inner) {
            items.push(parse_literal(item.trim())?);
        }
        return Some(PyValue::List(items));
    }
    None
}

/// Split on commas outside quotes and brackets.
fn split_top_level(text: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;

    for c in text.chars() {
        match quote {
            Some(q) => {
                current.push(c);
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                '"' | '\'' => {
                    quote = Some(c);
                    current.push(c);
                }
                '[' | '(' => {
                    depth += 1;
                    current.push(c);
                }
                ']' | ')' => {
                    depth -= 1;
                    current.push(c);
                }
                ',' if depth == 0 => {
                    parts.push(std::mem::take(&mut current));
                }
                _ => current.push(c),
            },
        }
    }
    if !current.trim().is_empty() {
        parts.push(current);
    }
    parts
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// Split `a + b * c` into `[(Add, "a"), (Add, "b"), ...]` pairs; the first
/// op is a placeholder. Evaluation is strictly left to right — precedence
/// is outside this subset. Returns None if no operator is present.
fn split_arithmetic(expr: &str) -> Option<Vec<(ArithOp, String)>> {
    let mut terms: Vec<(ArithOp, String)> = Vec::new();
    let mut current = String::new();
    let mut op = ArithOp::Add;
    let mut quote: Option<char> = None;
    let mut found_op = false;

    for c in expr.chars() {
        match quote {
            Some(q) => {
                current.push(c);
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                '"' | '\'' => {
                    quote = Some(c);
                    current.push(c);
                }
                '+' | '-' | '*' | '/' if !current.trim().is_empty() => {
                    terms.push((op, std::mem::take(&mut current)));
                    op = match c {
                        '+' => ArithOp::Add,
                        '-' => ArithOp::Sub,
                        '*' => ArithOp::Mul,
                        _ => ArithOp::Div,
                    };
                    found_op = true;
                }
                _ => current.push(c),
            },
        }
    }
    if !found_op || current.trim().is_empty() {
        return None;
    }
    terms.push((op, current));
    Some(terms)
}

fn apply_arithmetic(lhs: PyValue, op: ArithOp, rhs: PyValue) -> Option<PyValue> {
    use PyValue::*;
    match (lhs, rhs) {
        (Int(a), Int(b)) => Some(match op {
            ArithOp::Add => Int(a + b),
            ArithOp::Sub => Int(a - b),
            ArithOp::Mul => Int(a * b),
            ArithOp::Div => {
                if b == 0 {
                    return None;
                }
                Float(a as f64 / b as f64)
            }
        }),
        (Str(a), Str(b)) if op == ArithOp::Add => Some(Str(format!("{}{}", a, b))),
        (lhs, rhs) => {
            let a = to_float(&lhs)?;
            let b = to_float(&rhs)?;
            Some(match op {
                ArithOp::Add => Float(a + b),
                ArithOp::Sub => Float(a - b),
                ArithOp::Mul => Float(a * b),
                ArithOp::Div => {
                    if b == 0.0 {
                        return None;
                    }
                    Float(a / b)
                }
            })
        }
    }
}

fn to_float(value: &PyValue) -> Option<f64> {
    match value {
        PyValue::Int(n) => Some(*n as f64),
        PyValue::Float(n) => Some(*n),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(code: &str) -> EngineOutput {
        PythonEngine::new().run(code).unwrap()
    }

    #[test]
    fn test_fstring_interpolation() {
        let out = run("x = 5\nprint(f\"value: {x}\")");
        assert!(out.is_success());
        assert_eq!(out.output, "value: 5\n");
    }

    #[test]
    fn test_plain_print() {
        let out = run("print(\"hello\")\nprint('world')");
        assert_eq!(out.output, "hello\nworld\n");
    }

    #[test]
    fn test_print_multiple_args() {
        let out = run("a = 1\nprint(a, \"two\", 3)");
        assert_eq!(out.output, "1 two 3\n");
    }

    #[test]
    fn test_for_range() {
        let out = run("for i in range(3):\n    print(i)");
        assert_eq!(out.output, "0\n1\n2\n");
    }

    #[test]
    fn test_for_range_start_stop_step() {
        let out = run("for i in range(1, 10, 3):\n    print(i)");
        assert_eq!(out.output, "1\n4\n7\n");
    }

    #[test]
    fn test_nested_loops() {
        let code = "for i in range(2):\n    for j in range(2):\n        print(f\"{i}-{j}\")\n    print(\"row\")";
        let out = run(code);
        assert_eq!(out.output, "0-0\n0-1\nrow\n1-0\n1-1\nrow\n");
    }

    #[test]
    fn test_block_ends_at_dedent() {
        let out = run("for i in range(2):\n    print(i)\nprint(\"done\")");
        assert_eq!(out.output, "0\n1\ndone\n");
    }

    #[test]
    fn test_assignment_kinds() {
        let out = run("a = 3\nb = 2.5\nc = True\nd = 'hi'\ne = [1, 'x']\nprint(a, b, c, d, e)");
        assert_eq!(out.output, "3 2.5 True hi [1, 'x']\n");
    }

    #[test]
    fn test_fstring_arithmetic() {
        let out = run("a = 4\nb = 2\nprint(f\"{a + b} {a * b}\")");
        assert_eq!(out.output, "6 8\n");
    }

    #[test]
    fn test_unsupported_constructs_skipped() {
        let code = "import os\ndef helper():\n    print(\"never\")\nx = 1\nprint(x)";
        let out = run(code);
        assert_eq!(out.output, "1\n");
    }

    #[test]
    fn test_expression_assignment_skipped() {
        let out = run("x = compute()\nprint(\"after\")");
        assert_eq!(out.output, "after\n");
    }

    #[test]
    fn test_malformed_print_errors() {
        let err = PythonEngine::new().run("print(\"unclosed").unwrap_err();
        assert!(matches!(err, CoreError::MalformedInput { line: 1, .. }));
    }

    #[test]
    fn test_garbage_line_errors() {
        let err = PythonEngine::new().run("x = 1\n@@@ nonsense").unwrap_err();
        assert!(matches!(err, CoreError::MalformedInput { line: 2, .. }));
    }

    #[test]
    fn test_zero_step_is_program_error() {
        let out = run("for i in range(0, 3, 0):\n    print(i)");
        assert!(!out.is_success());
        assert!(out.error.as_deref().unwrap().contains("step"));
    }

    #[test]
    fn test_iteration_budget() {
        let out = PythonEngine::new()
            .with_max_iterations(10)
            .run("for i in range(1000):\n    print(i)")
            .unwrap();
        assert_eq!(out.error.as_deref(), Some("iteration budget exhausted"));
    }

    #[test]
    fn test_comments_and_blanks() {
        let out = run("# a comment\n\nprint(\"ok\")");
        assert_eq!(out.output, "ok\n");
    }

    #[test]
    fn test_empty_program() {
        let out = run("");
        assert!(out.is_success());
        assert!(out.output.is_empty());
    }
}
