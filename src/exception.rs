// exception.rs
//
// The interpreter's trap taxonomy. A trap is returned by value from the
// fetch/execute loop (not unwound) and formatted exactly once, at exit,
// with the machine state still in scope.

use crate::device::Device;
use crate::memory::Memory;
use crate::register::RegisterFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrapKind {
    LoadMisAligned,
    LoadOutOfBound,
    StoreMisAligned,
    StoreOutOfBound,
    InsMisAligned,
    InsOutOfBound,
    InsUnknown,
    LibcMisAligned,
    LibcOutOfBound,
    LibcError,
    DivideByZero,
    NotImplemented,
}

impl TrapKind {
    fn describe(self) -> &'static str {
        match self {
            TrapKind::LoadMisAligned => "Load misaligned",
            TrapKind::LoadOutOfBound => "Load out of bound",
            TrapKind::StoreMisAligned => "Store misaligned",
            TrapKind::StoreOutOfBound => "Store out of bound",
            TrapKind::InsMisAligned => "Instruction fetch misaligned",
            TrapKind::InsOutOfBound => "Instruction fetch out of bound",
            TrapKind::InsUnknown => "Unknown instruction",
            TrapKind::LibcMisAligned => "Misaligned libc access",
            TrapKind::LibcOutOfBound => "Out-of-bound libc access",
            TrapKind::LibcError => "Libc error",
            TrapKind::DivideByZero => "Divide by zero",
            TrapKind::NotImplemented => "Not implemented",
        }
    }
}

/// Extra payload carried by a trap, depending on its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrapInfo {
    None,
    /// The offending 32-bit instruction word.
    Command(u32),
    /// The required alignment in bytes.
    Alignment(u32),
    /// The access width in bytes.
    Size(u32),
    Message(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailToInterpret {
    pub kind: TrapKind,
    pub address: u32,
    pub info: TrapInfo,
    /// Syscall number, for the libc trap kinds.
    pub libc_index: Option<u32>,
}

impl FailToInterpret {
    pub fn new(kind: TrapKind, address: u32, info: TrapInfo) -> Self {
        FailToInterpret { kind, address, info, libc_index: None }
    }

    pub fn libc(kind: TrapKind, address: u32, info: TrapInfo, index: u32) -> Self {
        FailToInterpret { kind, address, info, libc_index: Some(index) }
    }

    /// Format the trap with the machine state for the final report.
    pub fn what(&self, regs: &RegisterFile, _mem: &Memory, dev: &Device) -> String {
        let mut text = format!("{}: address = 0x{:x}", self.kind.describe(), self.address);
        match self.info {
            TrapInfo::None => {}
            TrapInfo::Command(word) => text.push_str(&format!(", command = 0x{:08x}", word)),
            TrapInfo::Alignment(a) => text.push_str(&format!(", alignment = {}", a)),
            TrapInfo::Size(s) => text.push_str(&format!(", size = {}", s)),
            TrapInfo::Message(msg) => text.push_str(&format!(", {}", msg)),
        }
        if let Some(index) = self.libc_index {
            text.push_str(&format!(", syscall = {}", index));
        }
        text.push_str(&format!(
            "\n  pc = 0x{:08x}, retired = {}, stdin = {} bytes, stdout = {} bytes",
            regs.pc(),
            regs.retired(),
            dev.bytes_in,
            dev.bytes_out
        ));
        text
    }
}
