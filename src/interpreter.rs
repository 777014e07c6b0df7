// interpreter.rs
//
// The top-level fetch/execute loop. The linked image owns all post-link
// storage; the register file, memory, device, and instruction cache live
// and die together with this struct.

use crate::debug::DebugManager;
use crate::device::Device;
use crate::exception::FailToInterpret;
use crate::icache::{Hint, ICache};
use crate::linker::LinkedImage;
use crate::memory::Memory;
use crate::object::SectionKind;
use crate::register::RegisterFile;

/// How a run ended, short of a trap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Exit(i32),
    TimeLimitExceeded,
}

pub struct Interpreter {
    pub regs: RegisterFile,
    pub mem: Memory,
    pub dev: Device,
    icache: ICache,
}

impl Interpreter {
    pub fn new(image: &LinkedImage, dev: Device) -> Self {
        let mem = Memory::new(image);
        let regs = RegisterFile::new(image.entry(), mem.stack_top());
        let icache = ICache::new(image.section(SectionKind::Text).start);
        Interpreter { regs, mem, dev, icache }
    }

    pub fn run(&mut self, timeout: u64) -> Result<Outcome, FailToInterpret> {
        self.run_loop(timeout, None)
    }

    /// The debug variant of the loop: identical, except the manager is
    /// consulted before every fetch.
    pub fn run_debug(
        &mut self,
        timeout: u64,
        manager: &mut DebugManager,
    ) -> Result<Outcome, FailToInterpret> {
        self.run_loop(timeout, Some(manager))
    }

    fn run_loop(
        &mut self,
        mut timeout: u64,
        mut debug: Option<&mut DebugManager>,
    ) -> Result<Outcome, FailToInterpret> {
        let mut hint = Hint::NONE;
        while self.regs.advance() {
            if timeout == 0 {
                return Ok(Outcome::TimeLimitExceeded);
            }
            timeout -= 1;
            if let Some(manager) = debug.as_deref_mut() {
                manager.test(&mut self.regs, &self.mem);
                if self.regs.halted() {
                    break;
                }
            }
            let (slot, exe) = self.icache.ifetch(self.regs.pc(), hint, &self.mem)?;
            hint = exe.execute(slot, &mut self.regs, &mut self.mem, &mut self.dev)?;
        }
        Ok(Outcome::Exit(self.regs.exit_code()))
    }
}
