//! # Stack-shape, local, and pointer opcodes
//!
//! `POP`/`DUPE`/`SWAP`/`COPY`, locals `STORE`/`LOAD`, and the pointer
//! family `PPUSH`/`PLOAD`/`PDEREF`/`PSET`, in the same
//! free-function-over-`&mut Interpreter` shape as `ops_arith`.

use crate::error::RuntimeError;
use crate::instr::PtrSource;
use crate::vm::ops_arith::{peek1, peek2};
use crate::vm::{Interpreter, Pointer};

pub fn pop(vm: &mut Interpreter, width: usize) {
    vm.pop_bytes(width);
}

pub fn dupe(vm: &mut Interpreter, width: usize) -> Result<(), RuntimeError> {
    let Some(bytes) = peek1(vm, width) else {
        return Ok(());
    };
    vm.push_bytes(&bytes)
}

/// Exchange the top two slots using a temporary buffer, the only basic
/// op that needs one.
pub fn swap(vm: &mut Interpreter, width: usize) -> Result<(), RuntimeError> {
    let Some((a, b)) = peek2(vm, width) else {
        return Ok(());
    };
    vm.pop_bytes(width);
    vm.pop_bytes(width);
    vm.push_bytes(&b)?;
    vm.push_bytes(&a)
}

/// `COPY w n`: duplicate the current top slot `n` additional times.
pub fn copy(vm: &mut Interpreter, width: usize, n: u64) -> Result<(), RuntimeError> {
    let Some(bytes) = peek1(vm, width) else {
        return Ok(());
    };
    for _ in 0..n {
        vm.push_bytes(&bytes)?;
    }
    Ok(())
}

pub fn store(vm: &mut Interpreter, width: usize, k: u64) {
    let Some(bytes) = vm.pop_bytes(width) else {
        return;
    };
    let frame = vm.current_frame_index();
    vm.write_locals(frame, k as usize, &bytes);
}

pub fn load(vm: &mut Interpreter, width: usize, k: u64) -> Result<(), RuntimeError> {
    let frame = vm.current_frame_index();
    let bytes = vm.read_locals(frame, k as usize, width).to_vec();
    vm.push_bytes(&bytes)
}

/// `PLOAD k`: push the instruction's own index `k` reinterpreted as a
/// pointer-width immediate, then push the real address of `locals[k]`.
/// The grammar gives `PLOAD` only the one `k` operand, so the first push
/// uses `k` itself as the raw immediate.
pub fn pload(vm: &mut Interpreter, k: u64) -> Result<(), RuntimeError> {
    vm.push_bytes(&(k as u32).to_le_bytes())?;
    let frame = vm.current_frame_index();
    let ptr = Pointer::Local {
        frame,
        offset: k as usize,
    };
    vm.push_bytes(&ptr.encode().to_le_bytes())
}

pub fn ppush(vm: &mut Interpreter, src: PtrSource) -> Result<(), RuntimeError> {
    let ptr = match src {
        PtrSource::Data(decl) => Pointer::Data { decl, offset: 0 },
        PtrSource::Raw(v) => Pointer::Raw(v),
    };
    vm.push_bytes(&ptr.encode().to_le_bytes())
}

fn pop_pointer(vm: &mut Interpreter) -> Option<Pointer> {
    let bytes = vm.pop_bytes(4)?;
    let bits = u32::from_le_bytes(bytes.try_into().unwrap());
    Some(Pointer::decode(bits))
}

pub fn pderef(vm: &mut Interpreter, width: usize) -> Result<(), RuntimeError> {
    let Some(ptr) = pop_pointer(vm) else {
        return Ok(());
    };
    let bytes = match ptr {
        Pointer::Data { decl, offset } => vm.read_data(decl, offset, width),
        Pointer::Local { frame, offset } => vm.read_locals(frame, offset, width).to_vec(),
        Pointer::Raw(_) => vec![0u8; width],
    };
    vm.push_bytes(&bytes)
}

/// Pops the value (top, `width` bytes) before the pointer beneath it —
/// the natural order after `ppush addr; <push value>`, with no swap
/// needed (see the `Pointer` doc comment on why the 4-byte width matters
/// here).
pub fn pset(vm: &mut Interpreter, width: usize) {
    let Some(value) = vm.pop_bytes(width) else {
        return;
    };
    let Some(ptr) = pop_pointer(vm) else {
        return;
    };
    match ptr {
        Pointer::Data { decl, offset } => vm.write_data(decl, offset, &value),
        Pointer::Local { frame, offset } => vm.write_locals(frame, offset, &value),
        Pointer::Raw(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Source;
    use crate::vm::ops_arith::push_i32;
    use crate::vm::Interpreter;

    fn vm_with(out: &mut Vec<u8>) -> Interpreter<'_> {
        Interpreter::new(Vec::new(), Source::new(), out)
    }

    #[test]
    fn dupe_then_pop_is_no_op() {
        let mut out = Vec::new();
        let mut vm = vm_with(&mut out);
        push_i32(&mut vm, 9).unwrap();
        dupe(&mut vm, 4).unwrap();
        pop(&mut vm, 4);
        assert_eq!(vm.sp(), 4);
    }

    #[test]
    fn swap_twice_is_no_op() {
        let mut out = Vec::new();
        let mut vm = vm_with(&mut out);
        push_i32(&mut vm, 1).unwrap();
        push_i32(&mut vm, 2).unwrap();
        swap(&mut vm, 4).unwrap();
        swap(&mut vm, 4).unwrap();
        let top = vm.peek_bytes(0, 4).unwrap().to_vec();
        assert_eq!(i32::from_le_bytes(top.try_into().unwrap()), 2);
    }

    #[test]
    fn copy_zero_is_no_op() {
        let mut out = Vec::new();
        let mut vm = vm_with(&mut out);
        push_i32(&mut vm, 1).unwrap();
        copy(&mut vm, 4, 0).unwrap();
        assert_eq!(vm.sp(), 4);
    }

    #[test]
    fn copy_n_grows_stack_by_n_times_width() {
        let mut out = Vec::new();
        let mut vm = vm_with(&mut out);
        push_i32(&mut vm, 1).unwrap();
        copy(&mut vm, 4, 3).unwrap();
        assert_eq!(vm.sp(), 4 + 3 * 4);
    }

    #[test]
    fn store_then_load_round_trips() {
        let mut out = Vec::new();
        let mut vm = vm_with(&mut out);
        push_i32(&mut vm, 42).unwrap();
        store(&mut vm, 4, 0);
        load(&mut vm, 4, 0).unwrap();
        let top = vm.peek_bytes(0, 4).unwrap().to_vec();
        assert_eq!(i32::from_le_bytes(top.try_into().unwrap()), 42);
    }

    #[test]
    fn ppush_pderef_pset_round_trip_through_data() {
        let mut out = Vec::new();
        let mut source = Source::new();
        source.declare(
            "buf".to_string(),
            crate::ast::DeclKind::Db,
            Some(4),
        );
        let mut vm = Interpreter::new(Vec::new(), source, &mut out);

        ppush(&mut vm, PtrSource::Data(0)).unwrap();
        push_i32(&mut vm, 65).unwrap();
        // pointer underneath, 1-byte value expected on top for pset8;
        // drop the high 3 bytes of the i32 push by popping them first.
        vm.pop_bytes(3);
        pset(&mut vm, 1);

        ppush(&mut vm, PtrSource::Data(0)).unwrap();
        pderef(&mut vm, 1).unwrap();
        let top = vm.peek_bytes(0, 1).unwrap().to_vec();
        assert_eq!(top[0], 65);
    }
}
