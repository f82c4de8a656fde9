//! # Arithmetic, compare, and print opcodes
//!
//! One handler per arithmetic/compare/print family: free functions over
//! an explicit `&mut Interpreter` rather than methods, so each handler's
//! signature states exactly what state it touches.

use std::io::Write;

use crate::error::RuntimeError;
use crate::vm::Interpreter;

/// Division by zero is defined as zero rather than panicking, logging
/// the condition the same way underflow is logged.
fn checked_div<T: Copy>(
    a: T,
    b: T,
    is_zero: impl Fn(T) -> bool,
    div: impl Fn(T, T) -> T,
    zero: T,
) -> T {
    if is_zero(b) {
        eprintln!("division by zero");
        zero
    } else {
        div(a, b)
    }
}

/// Pop two same-width operands if both are present; otherwise log once
/// and leave the stack untouched. Underflow makes the whole instruction
/// a no-op, not a partial one.
fn pop2(vm: &mut Interpreter, width: usize) -> Option<(Vec<u8>, Vec<u8>)> {
    if vm.available() < 2 * width {
        eprintln!("stack is empty");
        return None;
    }
    let b = vm.pop_bytes(width).expect("checked available above");
    let a = vm.pop_bytes(width).expect("checked available above");
    Some((a, b))
}

/// Peek two same-width operands without popping. Compares never pop
/// their operands.
pub(crate) fn peek2(vm: &Interpreter, width: usize) -> Option<(Vec<u8>, Vec<u8>)> {
    if vm.available() < 2 * width {
        eprintln!("stack is empty");
        return None;
    }
    let b = vm.peek_bytes(0, width).unwrap().to_vec();
    let a = vm.peek_bytes(width, width).unwrap().to_vec();
    Some((a, b))
}

pub(crate) fn peek1(vm: &Interpreter, width: usize) -> Option<Vec<u8>> {
    if vm.available() < width {
        eprintln!("stack is empty");
        return None;
    }
    Some(vm.peek_bytes(0, width).unwrap().to_vec())
}

// --- push immediate ---

pub fn push_i32(vm: &mut Interpreter, v: i32) -> Result<(), RuntimeError> {
    vm.push_bytes(&v.to_le_bytes())
}

pub fn push_u64(vm: &mut Interpreter, v: u64) -> Result<(), RuntimeError> {
    vm.push_bytes(&v.to_le_bytes())
}

pub fn push_f32(vm: &mut Interpreter, v: f32) -> Result<(), RuntimeError> {
    vm.push_bytes(&v.to_le_bytes())
}

pub fn push_u8(vm: &mut Interpreter, v: u8) -> Result<(), RuntimeError> {
    vm.push_bytes(&[v])
}

// --- arithmetic ---

pub fn i_binop(vm: &mut Interpreter, op: impl Fn(i32, i32) -> i32) -> Result<(), RuntimeError> {
    let Some((a, b)) = pop2(vm, 4) else {
        return Ok(());
    };
    let a = i32::from_le_bytes(a.try_into().unwrap());
    let b = i32::from_le_bytes(b.try_into().unwrap());
    vm.push_bytes(&op(a, b).to_le_bytes())
}

pub fn i_div(vm: &mut Interpreter) -> Result<(), RuntimeError> {
    let Some((a, b)) = pop2(vm, 4) else {
        return Ok(());
    };
    let a = i32::from_le_bytes(a.try_into().unwrap());
    let b = i32::from_le_bytes(b.try_into().unwrap());
    let result = checked_div(a, b, |x| x == 0, i32::wrapping_div, 0);
    vm.push_bytes(&result.to_le_bytes())
}

pub fn i_mod(vm: &mut Interpreter) -> Result<(), RuntimeError> {
    let Some((a, b)) = pop2(vm, 4) else {
        return Ok(());
    };
    let a = i32::from_le_bytes(a.try_into().unwrap());
    let b = i32::from_le_bytes(b.try_into().unwrap());
    let result = checked_div(a, b, |x| x == 0, i32::wrapping_rem, 0);
    vm.push_bytes(&result.to_le_bytes())
}

pub fn ul_binop(vm: &mut Interpreter, op: impl Fn(u64, u64) -> u64) -> Result<(), RuntimeError> {
    let Some((a, b)) = pop2(vm, 8) else {
        return Ok(());
    };
    let a = u64::from_le_bytes(a.try_into().unwrap());
    let b = u64::from_le_bytes(b.try_into().unwrap());
    vm.push_bytes(&op(a, b).to_le_bytes())
}

pub fn ul_div(vm: &mut Interpreter) -> Result<(), RuntimeError> {
    let Some((a, b)) = pop2(vm, 8) else {
        return Ok(());
    };
    let a = u64::from_le_bytes(a.try_into().unwrap());
    let b = u64::from_le_bytes(b.try_into().unwrap());
    let result = checked_div(a, b, |x| x == 0, u64::wrapping_div, 0);
    vm.push_bytes(&result.to_le_bytes())
}

pub fn ul_mod(vm: &mut Interpreter) -> Result<(), RuntimeError> {
    let Some((a, b)) = pop2(vm, 8) else {
        return Ok(());
    };
    let a = u64::from_le_bytes(a.try_into().unwrap());
    let b = u64::from_le_bytes(b.try_into().unwrap());
    let result = checked_div(a, b, |x| x == 0, u64::wrapping_rem, 0);
    vm.push_bytes(&result.to_le_bytes())
}

pub fn f_binop(vm: &mut Interpreter, op: impl Fn(f32, f32) -> f32) -> Result<(), RuntimeError> {
    let Some((a, b)) = pop2(vm, 4) else {
        return Ok(());
    };
    let a = f32::from_le_bytes(a.try_into().unwrap());
    let b = f32::from_le_bytes(b.try_into().unwrap());
    vm.push_bytes(&op(a, b).to_le_bytes())
}

pub fn c_binop(vm: &mut Interpreter, op: impl Fn(u8, u8) -> u8) -> Result<(), RuntimeError> {
    let Some((a, b)) = pop2(vm, 1) else {
        return Ok(());
    };
    vm.push_bytes(&[op(a[0], b[0])])
}

pub fn c_div(vm: &mut Interpreter) -> Result<(), RuntimeError> {
    let Some((a, b)) = pop2(vm, 1) else {
        return Ok(());
    };
    let result = checked_div(a[0], b[0], |x| x == 0, u8::wrapping_div, 0);
    vm.push_bytes(&[result])
}

pub fn c_mod(vm: &mut Interpreter) -> Result<(), RuntimeError> {
    let Some((a, b)) = pop2(vm, 1) else {
        return Ok(());
    };
    let result = checked_div(a[0], b[0], |x| x == 0, u8::wrapping_rem, 0);
    vm.push_bytes(&[result])
}

// --- print (peek, no newline) ---

pub fn i_print(vm: &mut Interpreter) {
    let Some(bytes) = peek1(vm, 4) else { return };
    let v = i32::from_le_bytes(bytes.try_into().unwrap());
    let _ = write!(vm.stdout(), "{}", v);
}

pub fn ul_print(vm: &mut Interpreter) {
    let Some(bytes) = peek1(vm, 8) else { return };
    let v = u64::from_le_bytes(bytes.try_into().unwrap());
    let _ = write!(vm.stdout(), "{}", v);
}

pub fn f_print(vm: &mut Interpreter) {
    let Some(bytes) = peek1(vm, 4) else { return };
    let v = f32::from_le_bytes(bytes.try_into().unwrap());
    // Fixed six decimal places, matching C's default `%f`, not Rust's
    // minimal `Display` (which would print `7` instead of `7.000000`).
    let _ = write!(vm.stdout(), "{:.6}", v);
}

pub fn c_print(vm: &mut Interpreter) {
    let Some(bytes) = peek1(vm, 1) else { return };
    // Write the raw byte directly; char::from(u8) + Display would
    // re-encode bytes >= 0x80 as multi-byte UTF-8 instead of the single
    // raw byte `putchar`/`%c` semantics call for.
    let _ = vm.stdout().write_all(&bytes[..1]);
}

pub fn ci_print(vm: &mut Interpreter) {
    let Some(bytes) = peek1(vm, 1) else { return };
    let _ = write!(vm.stdout(), "{}", bytes[0] as i32);
}

// --- compare (peek both, push bool) ---

pub fn i_cmp(vm: &mut Interpreter, cmp: impl Fn(i32, i32) -> bool) -> Result<(), RuntimeError> {
    let Some((a, b)) = peek2(vm, 4) else {
        return Ok(());
    };
    let a = i32::from_le_bytes(a.try_into().unwrap());
    let b = i32::from_le_bytes(b.try_into().unwrap());
    vm.push_bytes(&[cmp(a, b) as u8])
}

pub fn ul_cmp(vm: &mut Interpreter, cmp: impl Fn(u64, u64) -> bool) -> Result<(), RuntimeError> {
    let Some((a, b)) = peek2(vm, 8) else {
        return Ok(());
    };
    let a = u64::from_le_bytes(a.try_into().unwrap());
    let b = u64::from_le_bytes(b.try_into().unwrap());
    vm.push_bytes(&[cmp(a, b) as u8])
}

pub fn f_cmp(vm: &mut Interpreter, cmp: impl Fn(f32, f32) -> bool) -> Result<(), RuntimeError> {
    let Some((a, b)) = peek2(vm, 4) else {
        return Ok(());
    };
    let a = f32::from_le_bytes(a.try_into().unwrap());
    let b = f32::from_le_bytes(b.try_into().unwrap());
    vm.push_bytes(&[cmp(a, b) as u8])
}

/// Char compares are signed-8-bit.
pub fn c_cmp(vm: &mut Interpreter, cmp: impl Fn(i8, i8) -> bool) -> Result<(), RuntimeError> {
    let Some((a, b)) = peek2(vm, 1) else {
        return Ok(());
    };
    vm.push_bytes(&[cmp(a[0] as i8, b[0] as i8) as u8])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Source;
    use crate::vm::Interpreter;

    fn vm_with(out: &mut Vec<u8>) -> Interpreter<'_> {
        Interpreter::new(Vec::new(), Source::new(), out)
    }

    #[test]
    fn i_add_pops_both_and_pushes_sum() {
        let mut out = Vec::new();
        let mut vm = vm_with(&mut out);
        push_i32(&mut vm, 3).unwrap();
        push_i32(&mut vm, 4).unwrap();
        i_binop(&mut vm, i32::wrapping_add).unwrap();
        assert_eq!(vm.sp(), 4);
        i_print(&mut vm);
        assert_eq!(out, b"7");
    }

    #[test]
    fn cmp_does_not_pop() {
        let mut out = Vec::new();
        let mut vm = vm_with(&mut out);
        push_i32(&mut vm, 1).unwrap();
        push_i32(&mut vm, 2).unwrap();
        i_cmp(&mut vm, |a, b| a < b).unwrap();
        // both pushed i32s stay live (4 + 4), plus the 1-byte bool result.
        assert_eq!(vm.sp(), 9);
    }

    #[test]
    fn div_by_zero_yields_zero_and_logs() {
        let mut out = Vec::new();
        let mut vm = vm_with(&mut out);
        push_i32(&mut vm, 5).unwrap();
        push_i32(&mut vm, 0).unwrap();
        i_div(&mut vm).unwrap();
        i_print(&mut vm);
        assert_eq!(out, b"0");
    }

    #[test]
    fn underflow_on_binop_is_a_no_op() {
        let mut out = Vec::new();
        let mut vm = vm_with(&mut out);
        push_i32(&mut vm, 1).unwrap();
        i_binop(&mut vm, i32::wrapping_add).unwrap();
        // still just the one 4-byte value, untouched
        assert_eq!(vm.sp(), 4);
    }

    #[test]
    fn f_print_uses_fixed_six_decimal_places() {
        let mut out = Vec::new();
        let mut vm = vm_with(&mut out);
        push_f32(&mut vm, 7.0).unwrap();
        f_print(&mut vm);
        assert_eq!(out, b"7.000000");
    }

    #[test]
    fn c_print_writes_the_raw_byte_even_past_ascii() {
        let mut out = Vec::new();
        let mut vm = vm_with(&mut out);
        push_u8(&mut vm, 0xC3).unwrap();
        c_print(&mut vm);
        assert_eq!(out, vec![0xC3]);
    }
}
