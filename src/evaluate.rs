// evaluate.rs
//
// Immediate evaluation against final addresses. One evaluator exists per
// object file: symbol lookups try the file's local table before the global
// table, and PC-relative pairs are matched through the anchor map built
// from that file's text instructions.

use crate::immediate::{Immediate, RelOp, TreeOp};
use std::collections::HashMap;

pub struct Evaluator<'a> {
    global: &'a HashMap<String, u32>,
    local: &'a HashMap<String, u32>,
    /// Absolute instruction address → that instruction's source immediate.
    /// Used to find the `%pcrel_hi` half a `%pcrel_lo` names.
    anchors: &'a HashMap<u32, &'a Immediate>,
}

impl<'a> Evaluator<'a> {
    pub fn new(
        global: &'a HashMap<String, u32>,
        local: &'a HashMap<String, u32>,
        anchors: &'a HashMap<u32, &'a Immediate>,
    ) -> Self {
        Evaluator { global, local, anchors }
    }

    /// Evaluate an immediate with `position` set to the absolute address of
    /// the instruction or data item holding it.
    pub fn evaluate(&self, imm: &Immediate, position: u32) -> Result<u32, String> {
        match imm {
            Immediate::Int(value) => Ok(*value as u32),
            Immediate::Sym(name) => self.symbol_position(name, position),
            Immediate::Tree(terms) => {
                let mut result: u32 = 0;
                for (op, term) in terms {
                    let value = self.evaluate(term, position)?;
                    result = match op {
                        TreeOp::Add => result.wrapping_add(value),
                        TreeOp::Sub => result.wrapping_sub(value),
                    };
                }
                Ok(result)
            }
            Immediate::Rel(op, inner) => match op {
                // The +0x800 bias rounds the upper half so the sign-extended
                // lower half reconstructs the value exactly.
                RelOp::Hi => {
                    let value = self.evaluate(inner, position)?;
                    Ok(value.wrapping_add(0x800) >> 12)
                }
                RelOp::Lo => {
                    let value = self.evaluate(inner, position)?;
                    Ok(sext12(value))
                }
                RelOp::PcrelHi => {
                    let value = self.evaluate(inner, position)?;
                    Ok(value.wrapping_sub(position).wrapping_add(0x800) >> 12)
                }
                RelOp::PcrelLo => {
                    // The inner immediate names the label on the auipc; the
                    // displacement is computed from that instruction's own
                    // target and address.
                    let anchor = self.evaluate(inner, position)?;
                    let hi = match self.anchors.get(&anchor) {
                        Some(Immediate::Rel(RelOp::PcrelHi, hi_inner)) => hi_inner,
                        _ => {
                            return Err(format!(
                                "Unresolved PC-relative pair: no %pcrel_hi at 0x{:x}",
                                anchor
                            ));
                        }
                    };
                    let target = self.evaluate(hi, anchor)?;
                    Ok(sext12(target.wrapping_sub(anchor)))
                }
            },
        }
    }

    fn symbol_position(&self, name: &str, position: u32) -> Result<u32, String> {
        if name == "." {
            return Ok(position);
        }
        if let Some(&addr) = self.local.get(name) {
            return Ok(addr);
        }
        if let Some(&addr) = self.global.get(name) {
            return Ok(addr);
        }
        Err(format!("Unknown symbol \"{}\"", name))
    }
}

/// Sign-extend the low 12 bits.
pub fn sext12(value: u32) -> u32 {
    (((value & 0xfff) as i32) << 20 >> 20) as u32
}
