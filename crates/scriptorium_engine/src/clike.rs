//! C-family engine.
//!
//! A structural emission emulation, not a compiler: it locates the `main`
//! entry block, brace-matches its body, and scans the statements inside
//! for output-producing forms (`printf`, `puts`, `cout` chains). String
//! literals are appended verbatim with escapes processed; nothing is
//! type-checked and undeclared identifiers are not diagnosed.

use crate::trait_::{EngineOutput, Executable};
use once_cell::sync::Lazy;
use regex::Regex;
use scriptorium_core::{CoreResult, Language};

static MAIN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bmain\s*\(").expect("main regex"));
// Unanchored: emission statements may sit behind residue of a split
// control-flow header (`if (1) { printf(...)`).
static PRINTF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\bprintf\s*\(\s*"((?:[^"\\]|\\.)*)""#).expect("printf regex")
});
static PUTS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\bputs\s*\(\s*"((?:[^"\\]|\\.)*)"\s*\)"#).expect("puts regex")
});
static COUT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bcout\b").expect("cout regex"));
static STRING_LIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""((?:[^"\\]|\\.)*)""#).expect("string regex"));

/// C-family structural emission emulation
pub struct CEngine;

impl CEngine {
    /// Create a new engine (unit struct)
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for CEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Executable for CEngine {
    fn language(&self) -> Language {
        Language::CLike
    }

    fn run(&self, code: &str) -> CoreResult<EngineOutput> {
        let body = match entry_body(code) {
            Ok(body) => body,
            Err(message) => return Ok(EngineOutput::failure(message)),
        };

        let mut out = String::new();
        for statement in split_statements(&body) {
            emit_statement(&statement, &mut out);
        }
        Ok(EngineOutput::success(out))
    }
}

/// Extract the brace-matched body of the `main` entry block.
fn entry_body(code: &str) -> Result<String, String> {
    let entry = MAIN_RE
        .find(code)
        .ok_or_else(|| "no entry block found".to_string())?;

    let after_entry = &code[entry.end()..];
    let open = after_entry
        .find('{')
        .ok_or_else(|| "entry block has no body".to_string())?;

    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;
    let body_start = open + 1;
    for (offset, c) in after_entry[open..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(after_entry[body_start..open + offset].to_string());
                }
            }
            _ => {}
        }
    }
    Err("unbalanced braces in entry block".to_string())
}

/// Split a block body on semicolons outside string literals.
fn split_statements(body: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut in_string = false;
    let mut escaped = false;

    for c in body.chars() {
        if in_string {
            current.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => {
                in_string = true;
                current.push(c);
            }
            ';' => statements.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    if !current.trim().is_empty() {
        statements.push(current);
    }
    statements
}

fn emit_statement(statement: &str, out: &mut String) {
    if let Some(caps) = PRINTF_RE.captures(statement) {
        out.push_str(&process_escapes(&caps[1]));
        return;
    }
    if let Some(caps) = PUTS_RE.captures(statement) {
        out.push_str(&process_escapes(&caps[1]));
        out.push('\n');
        return;
    }
    if COUT_RE.is_match(statement) {
        emit_cout_chain(statement, out);
    }
    // Anything else (declarations, returns, arithmetic) emits nothing.
}

/// Walk a `cout << ... << ...` chain left to right.
fn emit_cout_chain(statement: &str, out: &mut String) {
    for segment in statement.split("<<").skip(1) {
        let segment = segment.trim();
        if let Some(caps) = STRING_LIT_RE.captures(segment) {
            out.push_str(&process_escapes(&caps[1]));
        } else if segment == "endl" || segment == "std::endl" {
            out.push('\n');
        }
        // Non-literal segments (variables, numbers) are outside the subset.
    }
}

fn process_escapes(literal: &str) -> String {
    let mut text = String::with_capacity(literal.len());
    let mut chars = literal.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            text.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => text.push('\n'),
            Some('t') => text.push('\t'),
            Some('r') => text.push('\r'),
            Some('0') => {}
            Some(other) => text.push(other),
            None => text.push('\\'),
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(code: &str) -> EngineOutput {
        CEngine::new().run(code).unwrap()
    }

    #[test]
    fn test_printf_hello() {
        let code = r#"
            #include <stdio.h>
            int main(void) {
                printf("hello, world\n");
                return 0;
            }
        "#;
        let out = run(code);
        assert!(out.is_success());
        assert_eq!(out.output, "hello, world\n");
    }

    #[test]
    fn test_sequential_emission() {
        let code = r#"int main() { printf("a"); printf("b\n"); printf("c\n"); }"#;
        assert_eq!(run(code).output, "ab\nc\n");
    }

    #[test]
    fn test_puts_appends_newline() {
        let code = r#"int main() { puts("first"); puts("second"); }"#;
        assert_eq!(run(code).output, "first\nsecond\n");
    }

    #[test]
    fn test_cout_chain() {
        let code = r#"
            #include <iostream>
            int main() {
                std::cout << "sum: " << "42" << std::endl;
            }
        "#;
        assert_eq!(run(code).output, "sum: 42\n");
    }

    #[test]
    fn test_cout_bare_endl() {
        let code = "int main() { cout << \"x\" << endl; }";
        assert_eq!(run(code).output, "x\n");
    }

    #[test]
    fn test_escapes() {
        let code = r#"int main() { printf("tab\there\nquote\"done\n"); }"#;
        assert_eq!(run(code).output, "tab\there\nquote\"done\n");
    }

    #[test]
    fn test_non_emission_statements_ignored() {
        let code = r#"int main() { int x = 3; x += 1; printf("ok\n"); return x; }"#;
        assert_eq!(run(code).output, "ok\n");
    }

    #[test]
    fn test_nested_braces() {
        let code = r#"int main() { if (1) { printf("inner\n"); } printf("outer\n"); }"#;
        assert_eq!(run(code).output, "inner\nouter\n");
    }

    #[test]
    fn test_brace_inside_string() {
        let code = r#"int main() { printf("{not a block}\n"); }"#;
        assert_eq!(run(code).output, "{not a block}\n");
    }

    #[test]
    fn test_no_entry_block() {
        let out = run("int helper() { return 1; }");
        assert_eq!(out.error.as_deref(), Some("no entry block found"));
    }

    #[test]
    fn test_unbalanced_braces() {
        let out = run("int main() { printf(\"x\");");
        assert_eq!(out.error.as_deref(), Some("unbalanced braces in entry block"));
    }

    #[test]
    fn test_empty_main_emits_nothing() {
        let out = run("int main() { }");
        assert!(out.is_success());
        assert!(out.output.is_empty());
    }
}
