//! End-to-end scenarios E1-E6, run through the library's one entry point
//! rather than a subprocess.

use tinyasm::error::Error;
use tinyasm::link;
use tinyasm::parser::Parser;
use tinyasm::vm::Interpreter;

fn run_to_string(src: &str) -> Result<String, Error> {
    let mut out = Vec::new();
    tinyasm::run_source(src, &mut out)?;
    Ok(String::from_utf8(out).unwrap())
}

#[test]
fn e1_arithmetic_and_print() {
    let src = "\
.text
main:
    ipush 3
    ipush 4
    iadd
    iprint
";
    assert_eq!(run_to_string(src).unwrap(), "7");
}

#[test]
fn e2_conditional_loop() {
    let src = "\
.text
main:
    ipush 0
loop:
    dupe32
    ipush 10
    iclt
    jumpcmp body
    jump done
body:
    ipush 1
    iadd
    jump loop
done:
    iprint
";
    assert_eq!(run_to_string(src).unwrap(), "10");
}

#[test]
fn e3_call_with_argument_and_typed_return() {
    let src = "\
.text
main:
    ipush 21
    jumpproc dbl 4
    iprint
dbl:
    load32 0
    ipush 2
    imult
    ret32
";
    assert_eq!(run_to_string(src).unwrap(), "42");
}

#[test]
fn e4_pointer_store_deref_into_declared_buffer() {
    let src = "\
.data
buf db [4]
.text
main:
    ppush buf
    cpush 65
    swap32
    pset8
    ppush buf
    pderef8
    cprint
";
    assert_eq!(run_to_string(src).unwrap(), "A");
}

#[test]
fn e5_comparison_does_not_pop() {
    let src = "\
.text
main:
    ipush 1
    ipush 2
    iclt
";
    let (nodes, errors) = Parser::new(src).parse();
    assert!(errors.is_empty());
    let linked = link::link(nodes).unwrap();
    let mut out = Vec::new();
    let mut vm = Interpreter::new(linked.instrs, linked.source, &mut out);
    vm.run().unwrap();
    assert_eq!(vm.sp(), 4 + 4 + 1);
}

#[test]
fn e6_parse_error_recovery_reports_exactly_one_error() {
    let src = "\
.text
main:
    notanopcode
    ipush 1
    iprint
";
    match run_to_string(src) {
        Err(Error::Parse(errors)) => assert_eq!(errors.len(), 1),
        other => panic!("expected exactly one parse error, got {:?}", other),
    }
}
