//! # Resolved instructions
//!
//! The instruction representation the VM actually dispatches on: one
//! variant per opcode family, fully resolved (labels and data names
//! turned into indices, no strings). Produced by `crate::link` from
//! `ast::Node`.

/// Where a linked `PPUSH` points. Most programs push a label onto the
/// data region's declaration table; the grammar also allows a bare
/// numeric immediate, which is carried through unresolved as a raw bit
/// pattern rather than forced into a declaration index it never
/// referred to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PtrSource {
    Data(usize),
    Raw(u64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Instr {
    // --- push immediate ---
    IPush(i32),
    UlPush(u64),
    FPush(f32),
    CPush(u8),
    PPush(PtrSource),

    // --- arithmetic ---
    IAdd,
    ISub,
    IMult,
    IDiv,
    IMod,
    UlAdd,
    UlSub,
    UlMult,
    UlDiv,
    UlMod,
    FAdd,
    FSub,
    FMult,
    FDiv,
    CAdd,
    CSub,
    CMult,
    CDiv,
    CMod,

    // --- print ---
    IPrint,
    UlPrint,
    FPrint,
    CPrint,
    CiPrint,

    // --- compare (peek, not pop) ---
    IClt,
    ICle,
    ICeq,
    ICgt,
    ICge,
    UlClt,
    UlCle,
    UlCeq,
    UlCgt,
    UlCge,
    FClt,
    FCle,
    FCeq,
    FCgt,
    FCge,
    CClt,
    CCle,
    CCeq,
    CCgt,
    CCge,

    // --- stack shape ---
    Pop8,
    Pop32,
    Pop64,
    Dupe8,
    Dupe32,
    Dupe64,
    Swap8,
    Swap32,
    Swap64,
    Copy8(u64),
    Copy32(u64),
    Copy64(u64),

    // --- locals ---
    Store8(u64),
    Store32(u64),
    Store64(u64),
    Load8(u64),
    Load32(u64),
    Load64(u64),

    // --- pointers ---
    PLoad(u64),
    PDeref(u64),
    PDeref8,
    PDeref32,
    PDeref64,
    PSet(u64),
    PSet8,
    PSet32,
    PSet64,

    // --- control flow ---
    Jump(i64),
    JumpCmp(i64),
    JumpProc { offset: i64, argc: u64 },
    Ret(u64),
    Ret8,
    Ret32,
    Ret64,
}
