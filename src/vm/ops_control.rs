//! # Control-flow opcodes
//!
//! `JUMP`/`JUMPCMP`. `JUMPPROC`/`RET*` live directly on `Interpreter`
//! (`vm::call`/`vm::ret`) since they touch the frame chain and return
//! stack rather than just the operand stack and `pc`.

use crate::vm::ops_arith::peek1;
use crate::vm::Interpreter;

pub fn jump(vm: &mut Interpreter, offset: i64) {
    vm.pc = (vm.pc as i64 + 1 + offset) as usize;
    vm.set_advance(false);
}

/// Peek (not pop) one byte; jump only if it is non-zero. A zero flag, or
/// an empty stack, both fall through to the ordinary fetch-advance.
pub fn jump_cmp(vm: &mut Interpreter, offset: i64) {
    let taken = peek1(vm, 1).map(|b| b[0] != 0).unwrap_or(false);
    if taken {
        vm.pc = (vm.pc as i64 + 1 + offset) as usize;
        vm.set_advance(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Source;
    use crate::vm::ops_arith::push_u8;
    use crate::vm::Interpreter;

    fn vm_with(out: &mut Vec<u8>) -> Interpreter<'_> {
        Interpreter::new(Vec::new(), Source::new(), out)
    }

    #[test]
    fn jump_cmp_false_advances_by_one() {
        let mut out = Vec::new();
        let mut vm = vm_with(&mut out);
        push_u8(&mut vm, 0).unwrap();
        vm.pc = 5;
        jump_cmp(&mut vm, 10);
        assert_eq!(vm.pc, 5);
    }

    #[test]
    fn jump_cmp_true_takes_offset_and_does_not_pop() {
        let mut out = Vec::new();
        let mut vm = vm_with(&mut out);
        push_u8(&mut vm, 1).unwrap();
        vm.pc = 0;
        jump_cmp(&mut vm, 3);
        assert_eq!(vm.pc, 4);
        assert_eq!(vm.sp(), 1);
    }
}
