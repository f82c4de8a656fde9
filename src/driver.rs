//! # Driver
//!
//! Glues lex → parse → link → run into the one library entry point,
//! separated from `main.rs` so integration tests can call it directly
//! without spawning a process.

use std::io::Write;

use crate::error::Error;
use crate::link;
use crate::parser::Parser;
use crate::vm;

/// Parse, link, and run `src`, writing `*print` output to `out`.
///
/// Returns `Ok(())` on a clean halt. On a parse error, returns every
/// accumulated `ParseError` together rather than just the first, so
/// callers see the whole batch; link and runtime errors are fatal and
/// returned singly.
pub fn run_source(src: &str, out: &mut dyn Write) -> Result<(), Error> {
    let (nodes, errors) = Parser::new(src).parse();
    if !errors.is_empty() {
        return Err(Error::Parse(errors));
    }

    let linked = link::link(nodes)?;
    vm::run(linked.instrs, linked.source, out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_to_string(src: &str) -> Result<String, Error> {
        let mut out = Vec::new();
        run_source(src, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn e1_arithmetic_and_print() {
        let out = run_to_string(".text\nmain:\n    ipush 3\n    ipush 4\n    iadd\n    iprint\n")
            .unwrap();
        assert_eq!(out, "7");
    }

    #[test]
    fn e6_parse_error_refuses_to_run() {
        let result = run_to_string(".text\nmain:\n    bogus\n    iprint\n");
        match result {
            Err(Error::Parse(errors)) => assert_eq!(errors.len(), 1),
            other => panic!("expected a single parse error, got {:?}", other),
        }
    }
}
