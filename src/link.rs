//! # Link pass
//!
//! A single forward pass over the parsed node list, producing the
//! resolved `Vec<Instr>` plus the `Source` of declared buffers. Two
//! sub-passes: first walk the nodes to learn every label's instruction
//! index and materialize every declaration, then walk the instruction
//! nodes again rewriting symbolic targets into offsets/indices. Kept a
//! pure rewrite over a vector rather than mutation of a shared arena.

use std::collections::HashMap;

use crate::ast::{Literal, Node, Operand};
use crate::error::LinkError;
use crate::instr::{Instr, PtrSource};
use crate::source::Source;
use crate::token::OpKind;

pub struct Linked {
    pub source: Source,
    pub instrs: Vec<Instr>,
}

pub fn link(nodes: Vec<Node>) -> Result<Linked, LinkError> {
    let mut source = Source::new();
    let mut labels: HashMap<String, usize> = HashMap::new();

    let mut instr_index = 0usize;
    for node in &nodes {
        match node {
            Node::Label(name) => {
                // First definition wins on a duplicate label.
                labels.entry(name.clone()).or_insert(instr_index);
            }
            Node::Data { name, kind, count } => {
                source.declare(name.clone(), *kind, *count);
            }
            Node::Instruction { .. } => {
                instr_index += 1;
            }
        }
    }

    let mut instrs = Vec::with_capacity(instr_index);
    let mut i = 0usize;
    for node in nodes {
        if let Node::Instruction { op, operand } = node {
            let instr = resolve(op, operand, i, &labels, &source)?;
            instrs.push(instr);
            i += 1;
        }
    }

    Ok(Linked { source, instrs })
}

fn branch_offset(target: &str, i: usize, labels: &HashMap<String, usize>) -> Result<i64, LinkError> {
    let target_index = labels
        .get(target)
        .copied()
        .ok_or_else(|| LinkError::UnknownLabel(target.to_string()))?;
    Ok(target_index as i64 - i as i64 - 1)
}

fn resolve_ptr_source(lit: Literal, source: &Source) -> Result<PtrSource, LinkError> {
    match lit {
        Literal::Ident(name) => source
            .index_of(&name)
            .map(PtrSource::Data)
            .ok_or(LinkError::UnknownData(name)),
        Literal::UInt(v) => Ok(PtrSource::Raw(v)),
        Literal::Int(v) => Ok(PtrSource::Raw(v as u64)),
        Literal::Float(v) => Ok(PtrSource::Raw(v.to_bits() as u64)),
    }
}

fn imm_i32(lit: Literal) -> Result<i32, LinkError> {
    match lit {
        Literal::Int(v) => Ok(v as i32),
        Literal::UInt(v) => Ok(v as i32),
        Literal::Float(v) => Ok(v as i32),
        Literal::Ident(name) => Err(LinkError::NonPointerIdentImmediate(name)),
    }
}

fn imm_u64(lit: Literal) -> Result<u64, LinkError> {
    match lit {
        Literal::Int(v) => Ok(v as u64),
        Literal::UInt(v) => Ok(v),
        Literal::Float(v) => Ok(v as u64),
        Literal::Ident(name) => Err(LinkError::NonPointerIdentImmediate(name)),
    }
}

fn imm_f32(lit: Literal) -> Result<f32, LinkError> {
    match lit {
        Literal::Int(v) => Ok(v as f32),
        Literal::UInt(v) => Ok(v as f32),
        Literal::Float(v) => Ok(v),
        Literal::Ident(name) => Err(LinkError::NonPointerIdentImmediate(name)),
    }
}

fn imm_u8(lit: Literal) -> Result<u8, LinkError> {
    match lit {
        Literal::Int(v) => Ok(v as u8),
        Literal::UInt(v) => Ok(v as u8),
        Literal::Float(v) => Ok(v as u8),
        Literal::Ident(name) => Err(LinkError::NonPointerIdentImmediate(name)),
    }
}

fn literal_of(operand: Option<Operand>) -> Literal {
    match operand {
        Some(Operand::Literal(lit)) => lit,
        _ => unreachable!("parser guarantees an Imm operand here"),
    }
}

fn index_of(operand: Option<Operand>) -> u64 {
    match operand {
        Some(Operand::Index(n)) => n,
        _ => unreachable!("parser guarantees a UInt operand here"),
    }
}

fn symbol_of(operand: Option<Operand>) -> String {
    match operand {
        Some(Operand::Symbol(name)) => name,
        _ => unreachable!("parser guarantees a Symbol operand here"),
    }
}

fn resolve(
    op: OpKind,
    operand: Option<Operand>,
    i: usize,
    labels: &HashMap<String, usize>,
    source: &Source,
) -> Result<Instr, LinkError> {
    use OpKind::*;

    Ok(match op {
        IPush => Instr::IPush(imm_i32(literal_of(operand))?),
        UlPush => Instr::UlPush(imm_u64(literal_of(operand))?),
        FPush => Instr::FPush(imm_f32(literal_of(operand))?),
        CPush => Instr::CPush(imm_u8(literal_of(operand))?),
        PPush => Instr::PPush(resolve_ptr_source(literal_of(operand), source)?),

        IAdd => Instr::IAdd,
        ISub => Instr::ISub,
        IMult => Instr::IMult,
        IDiv => Instr::IDiv,
        IMod => Instr::IMod,
        UlAdd => Instr::UlAdd,
        UlSub => Instr::UlSub,
        UlMult => Instr::UlMult,
        UlDiv => Instr::UlDiv,
        UlMod => Instr::UlMod,
        FAdd => Instr::FAdd,
        FSub => Instr::FSub,
        FMult => Instr::FMult,
        FDiv => Instr::FDiv,
        CAdd => Instr::CAdd,
        CSub => Instr::CSub,
        CMult => Instr::CMult,
        CDiv => Instr::CDiv,
        CMod => Instr::CMod,

        IPrint => Instr::IPrint,
        UlPrint => Instr::UlPrint,
        FPrint => Instr::FPrint,
        CPrint => Instr::CPrint,
        CiPrint => Instr::CiPrint,

        IClt => Instr::IClt,
        ICle => Instr::ICle,
        ICeq => Instr::ICeq,
        ICgt => Instr::ICgt,
        ICge => Instr::ICge,
        UlClt => Instr::UlClt,
        UlCle => Instr::UlCle,
        UlCeq => Instr::UlCeq,
        UlCgt => Instr::UlCgt,
        UlCge => Instr::UlCge,
        FClt => Instr::FClt,
        FCle => Instr::FCle,
        FCeq => Instr::FCeq,
        FCgt => Instr::FCgt,
        FCge => Instr::FCge,
        CClt => Instr::CClt,
        CCle => Instr::CCle,
        CCeq => Instr::CCeq,
        CCgt => Instr::CCgt,
        CCge => Instr::CCge,

        Pop8 => Instr::Pop8,
        Pop32 => Instr::Pop32,
        Pop64 => Instr::Pop64,
        Dupe8 => Instr::Dupe8,
        Dupe32 => Instr::Dupe32,
        Dupe64 => Instr::Dupe64,
        Swap8 => Instr::Swap8,
        Swap32 => Instr::Swap32,
        Swap64 => Instr::Swap64,
        Copy8 => Instr::Copy8(index_of(operand)),
        Copy32 => Instr::Copy32(index_of(operand)),
        Copy64 => Instr::Copy64(index_of(operand)),

        Store8 => Instr::Store8(index_of(operand)),
        Store32 => Instr::Store32(index_of(operand)),
        Store64 => Instr::Store64(index_of(operand)),
        Load8 => Instr::Load8(index_of(operand)),
        Load32 => Instr::Load32(index_of(operand)),
        Load64 => Instr::Load64(index_of(operand)),

        PLoad => Instr::PLoad(index_of(operand)),
        PDeref => Instr::PDeref(index_of(operand)),
        PDeref8 => Instr::PDeref8,
        PDeref32 => Instr::PDeref32,
        PDeref64 => Instr::PDeref64,
        PSet => Instr::PSet(index_of(operand)),
        PSet8 => Instr::PSet8,
        PSet32 => Instr::PSet32,
        PSet64 => Instr::PSet64,

        Jump => Instr::Jump(branch_offset(&symbol_of(operand), i, labels)?),
        JumpCmp => Instr::JumpCmp(branch_offset(&symbol_of(operand), i, labels)?),
        JumpProc => match operand {
            Some(Operand::Call { target, argc }) => Instr::JumpProc {
                offset: branch_offset(&target, i, labels)?,
                argc,
            },
            _ => unreachable!("parser guarantees a Call operand here"),
        },

        Ret => Instr::Ret(index_of(operand)),
        Ret8 => Instr::Ret8,
        Ret32 => Instr::Ret32,
        Ret64 => Instr::Ret64,
    })
}
