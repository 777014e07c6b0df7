// executor.rs
//
// Decoded executors: one variant per base RV32I instruction, dispatched by
// a single match in the interpreter loop. Applying an executor performs
// the instruction's full effect, updates the pc, and hands back a hint for
// the next fetch.

use crate::device::Device;
use crate::exception::{FailToInterpret, TrapInfo, TrapKind};
use crate::icache::Hint;
use crate::libc;
use crate::memory::Memory;
use crate::register::RegisterFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Executor {
    // r-type
    Add { rd: usize, rs1: usize, rs2: usize },
    Sub { rd: usize, rs1: usize, rs2: usize },
    Sll { rd: usize, rs1: usize, rs2: usize },
    Slt { rd: usize, rs1: usize, rs2: usize },
    Sltu { rd: usize, rs1: usize, rs2: usize },
    Xor { rd: usize, rs1: usize, rs2: usize },
    Srl { rd: usize, rs1: usize, rs2: usize },
    Sra { rd: usize, rs1: usize, rs2: usize },
    Or { rd: usize, rs1: usize, rs2: usize },
    And { rd: usize, rs1: usize, rs2: usize },

    // i-type
    Addi { rd: usize, rs1: usize, imm: i32 },
    Slti { rd: usize, rs1: usize, imm: i32 },
    Sltiu { rd: usize, rs1: usize, imm: i32 },
    Xori { rd: usize, rs1: usize, imm: i32 },
    Ori { rd: usize, rs1: usize, imm: i32 },
    Andi { rd: usize, rs1: usize, imm: i32 },
    Slli { rd: usize, rs1: usize, shamt: i32 },
    Srli { rd: usize, rs1: usize, shamt: i32 },
    Srai { rd: usize, rs1: usize, shamt: i32 },

    // loads and stores
    Lb { rd: usize, rs1: usize, offset: i32 },
    Lh { rd: usize, rs1: usize, offset: i32 },
    Lw { rd: usize, rs1: usize, offset: i32 },
    Lbu { rd: usize, rs1: usize, offset: i32 },
    Lhu { rd: usize, rs1: usize, offset: i32 },
    Sb { rs1: usize, rs2: usize, offset: i32 },
    Sh { rs1: usize, rs2: usize, offset: i32 },
    Sw { rs1: usize, rs2: usize, offset: i32 },

    // branches
    Beq { rs1: usize, rs2: usize, offset: i32 },
    Bne { rs1: usize, rs2: usize, offset: i32 },
    Blt { rs1: usize, rs2: usize, offset: i32 },
    Bge { rs1: usize, rs2: usize, offset: i32 },
    Bltu { rs1: usize, rs2: usize, offset: i32 },
    Bgeu { rs1: usize, rs2: usize, offset: i32 },

    // jumps
    Jal { rd: usize, offset: i32 },
    Jalr { rd: usize, rs1: usize, offset: i32 },

    // u-type
    Lui { rd: usize, imm: i32 },
    Auipc { rd: usize, imm: i32 },

    // environment
    Ecall,
    Ebreak,

    Unknown { word: u32 },
}

impl Executor {
    /// Apply the instruction. `slot` is this executor's own cache slot,
    /// used to produce the sequential-fetch hint.
    pub fn execute(
        &self,
        slot: usize,
        regs: &mut RegisterFile,
        mem: &mut Memory,
        dev: &mut Device,
    ) -> Result<Hint, FailToInterpret> {
        let pc = regs.pc();
        let next = pc.wrapping_add(4);
        match *self {
            // r-type
            Executor::Add { rd, rs1, rs2 } => {
                let val = regs.get(rs1).wrapping_add(regs.get(rs2));
                regs.set(rd, val);
            }
            Executor::Sub { rd, rs1, rs2 } => {
                let val = regs.get(rs1).wrapping_sub(regs.get(rs2));
                regs.set(rd, val);
            }
            Executor::Sll { rd, rs1, rs2 } => {
                let shamt = regs.get(rs2) & 0x1f;
                regs.set(rd, regs.get(rs1) << shamt);
            }
            Executor::Slt { rd, rs1, rs2 } => {
                let val = if regs.get(rs1) < regs.get(rs2) { 1 } else { 0 };
                regs.set(rd, val);
            }
            Executor::Sltu { rd, rs1, rs2 } => {
                let val = if (regs.get(rs1) as u32) < (regs.get(rs2) as u32) { 1 } else { 0 };
                regs.set(rd, val);
            }
            Executor::Xor { rd, rs1, rs2 } => {
                regs.set(rd, regs.get(rs1) ^ regs.get(rs2));
            }
            Executor::Srl { rd, rs1, rs2 } => {
                let shamt = regs.get(rs2) & 0x1f;
                regs.set(rd, ((regs.get(rs1) as u32) >> shamt) as i32);
            }
            Executor::Sra { rd, rs1, rs2 } => {
                let shamt = regs.get(rs2) & 0x1f;
                regs.set(rd, regs.get(rs1) >> shamt);
            }
            Executor::Or { rd, rs1, rs2 } => {
                regs.set(rd, regs.get(rs1) | regs.get(rs2));
            }
            Executor::And { rd, rs1, rs2 } => {
                regs.set(rd, regs.get(rs1) & regs.get(rs2));
            }

            // i-type
            Executor::Addi { rd, rs1, imm } => {
                regs.set(rd, regs.get(rs1).wrapping_add(imm));
            }
            Executor::Slti { rd, rs1, imm } => {
                let val = if regs.get(rs1) < imm { 1 } else { 0 };
                regs.set(rd, val);
            }
            Executor::Sltiu { rd, rs1, imm } => {
                let val = if (regs.get(rs1) as u32) < (imm as u32) { 1 } else { 0 };
                regs.set(rd, val);
            }
            Executor::Xori { rd, rs1, imm } => {
                regs.set(rd, regs.get(rs1) ^ imm);
            }
            Executor::Ori { rd, rs1, imm } => {
                regs.set(rd, regs.get(rs1) | imm);
            }
            Executor::Andi { rd, rs1, imm } => {
                regs.set(rd, regs.get(rs1) & imm);
            }
            Executor::Slli { rd, rs1, shamt } => {
                regs.set(rd, regs.get(rs1) << shamt);
            }
            Executor::Srli { rd, rs1, shamt } => {
                regs.set(rd, ((regs.get(rs1) as u32) >> shamt) as i32);
            }
            Executor::Srai { rd, rs1, shamt } => {
                regs.set(rd, regs.get(rs1) >> shamt);
            }

            // loads
            Executor::Lb { rd, rs1, offset } => {
                let addr = (regs.get(rs1) as u32).wrapping_add(offset as u32);
                let val = mem.load_i8(addr)?;
                regs.set(rd, val);
            }
            Executor::Lh { rd, rs1, offset } => {
                let addr = (regs.get(rs1) as u32).wrapping_add(offset as u32);
                let val = mem.load_i16(addr)?;
                regs.set(rd, val);
            }
            Executor::Lw { rd, rs1, offset } => {
                let addr = (regs.get(rs1) as u32).wrapping_add(offset as u32);
                let val = mem.load_i32(addr)?;
                regs.set(rd, val);
            }
            Executor::Lbu { rd, rs1, offset } => {
                let addr = (regs.get(rs1) as u32).wrapping_add(offset as u32);
                let val = mem.load_u8(addr)?;
                regs.set(rd, val);
            }
            Executor::Lhu { rd, rs1, offset } => {
                let addr = (regs.get(rs1) as u32).wrapping_add(offset as u32);
                let val = mem.load_u16(addr)?;
                regs.set(rd, val);
            }

            // stores
            Executor::Sb { rs1, rs2, offset } => {
                let addr = (regs.get(rs1) as u32).wrapping_add(offset as u32);
                mem.store_i8(addr, regs.get(rs2))?;
            }
            Executor::Sh { rs1, rs2, offset } => {
                let addr = (regs.get(rs1) as u32).wrapping_add(offset as u32);
                mem.store_i16(addr, regs.get(rs2))?;
            }
            Executor::Sw { rs1, rs2, offset } => {
                let addr = (regs.get(rs1) as u32).wrapping_add(offset as u32);
                mem.store_i32(addr, regs.get(rs2))?;
            }

            // branches
            Executor::Beq { rs1, rs2, offset } => {
                if regs.get(rs1) == regs.get(rs2) {
                    return taken(regs, pc, offset);
                }
            }
            Executor::Bne { rs1, rs2, offset } => {
                if regs.get(rs1) != regs.get(rs2) {
                    return taken(regs, pc, offset);
                }
            }
            Executor::Blt { rs1, rs2, offset } => {
                if regs.get(rs1) < regs.get(rs2) {
                    return taken(regs, pc, offset);
                }
            }
            Executor::Bge { rs1, rs2, offset } => {
                if regs.get(rs1) >= regs.get(rs2) {
                    return taken(regs, pc, offset);
                }
            }
            Executor::Bltu { rs1, rs2, offset } => {
                if (regs.get(rs1) as u32) < (regs.get(rs2) as u32) {
                    return taken(regs, pc, offset);
                }
            }
            Executor::Bgeu { rs1, rs2, offset } => {
                if (regs.get(rs1) as u32) >= (regs.get(rs2) as u32) {
                    return taken(regs, pc, offset);
                }
            }

            // jumps
            Executor::Jal { rd, offset } => {
                regs.set(rd, next as i32);
                regs.set_pc((pc as i32).wrapping_add(offset) as u32);
                return Ok(Hint::NONE);
            }
            Executor::Jalr { rd, rs1, offset } => {
                let target = (regs.get(rs1) as u32).wrapping_add(offset as u32) & !1;
                regs.set(rd, next as i32);
                regs.set_pc(target);
                return Ok(Hint::NONE);
            }

            // u-type
            Executor::Lui { rd, imm } => {
                regs.set(rd, imm << 12);
            }
            Executor::Auipc { rd, imm } => {
                regs.set(rd, (pc as i32).wrapping_add(imm << 12));
            }

            // environment
            Executor::Ecall => {
                libc::ecall(regs, mem, dev)?;
            }
            Executor::Ebreak => {
                return Err(FailToInterpret::new(
                    TrapKind::NotImplemented,
                    pc,
                    TrapInfo::Message("ebreak"),
                ));
            }

            Executor::Unknown { word } => {
                return Err(FailToInterpret::new(
                    TrapKind::InsUnknown,
                    pc,
                    TrapInfo::Command(word),
                ));
            }
        }
        regs.set_pc(next);
        Ok(Hint::next(slot))
    }
}

fn taken(regs: &mut RegisterFile, pc: u32, offset: i32) -> Result<Hint, FailToInterpret> {
    regs.set_pc((pc as i32).wrapping_add(offset) as u32);
    Ok(Hint::NONE)
}
