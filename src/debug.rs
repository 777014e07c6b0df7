// debug.rs
//
// A line-oriented debug stepper. Consulted before every fetch; while
// stepping (or when a breakpoint hits) it prints the current instruction
// and reads commands from stdin. All output goes to stderr so the guest's
// stdout stays clean.

use crate::disasm::disassemble;
use crate::memory::Memory;
use crate::register::{RegisterFile, REG_NAMES};
use std::collections::HashSet;
use std::io::{self, BufRead, Write};

pub struct DebugManager {
    breakpoints: HashSet<u32>,
    stepping: bool,
}

impl DebugManager {
    pub fn new() -> Self {
        DebugManager { breakpoints: HashSet::new(), stepping: true }
    }

    /// Called by the debug loop before each fetch.
    pub fn test(&mut self, regs: &mut RegisterFile, mem: &Memory) {
        let pc = regs.pc();
        if !self.stepping && !self.breakpoints.contains(&pc) {
            return;
        }
        self.stepping = true;
        match mem.load_cmd(pc) {
            Ok(word) => eprintln!("0x{:08x}: {}", pc, disassemble(word)),
            Err(_) => eprintln!("0x{:08x}: <not executable>", pc),
        }
        self.prompt(regs, mem);
    }

    fn prompt(&mut self, regs: &mut RegisterFile, mem: &Memory) {
        let stdin = io::stdin();
        loop {
            eprint!("(dbg) ");
            let _ = io::stderr().flush();
            let mut line = String::new();
            match stdin.lock().read_line(&mut line) {
                Ok(0) | Err(_) => {
                    // stdin is gone; nothing left to step for
                    regs.halt(0);
                    return;
                }
                Ok(_) => {}
            }
            let mut words = line.split_whitespace();
            match words.next().unwrap_or("s") {
                "s" | "step" => return,
                "c" | "continue" => {
                    self.stepping = false;
                    return;
                }
                "b" | "break" => match words.next().and_then(parse_addr) {
                    Some(addr) => {
                        self.breakpoints.insert(addr);
                        eprintln!("breakpoint at 0x{:08x}", addr);
                    }
                    None => eprintln!("usage: b <hex address>"),
                },
                "r" | "regs" => self.print_registers(regs),
                "m" | "mem" => {
                    let addr = words.next().and_then(parse_addr);
                    let len = words.next().and_then(|w| w.parse::<u32>().ok()).unwrap_or(16);
                    match addr {
                        Some(addr) => self.print_memory(mem, addr, len),
                        None => eprintln!("usage: m <hex address> [length]"),
                    }
                }
                "q" | "quit" => {
                    regs.halt(0);
                    return;
                }
                other => eprintln!("unknown command \"{}\" (s c b r m q)", other),
            }
        }
    }

    fn print_registers(&self, regs: &RegisterFile) {
        for row in 0..8 {
            let mut line = String::new();
            for col in 0..4 {
                let index = row * 4 + col;
                line.push_str(&format!(
                    "{:>4} = 0x{:08x}  ",
                    REG_NAMES[index],
                    regs.get(index) as u32
                ));
            }
            eprintln!("{}", line.trim_end());
        }
        eprintln!("  pc = 0x{:08x}", regs.pc());
    }

    fn print_memory(&self, mem: &Memory, addr: u32, len: u32) {
        for base in (addr..addr.saturating_add(len)).step_by(4) {
            match mem.load_u32(base) {
                Ok(value) => eprintln!("0x{:08x}: 0x{:08x}", base, value),
                Err(_) => {
                    eprintln!("0x{:08x}: <unmapped>", base);
                    break;
                }
            }
        }
    }
}

impl Default for DebugManager {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_addr(word: &str) -> Option<u32> {
    let hex = word.strip_prefix("0x").unwrap_or(word);
    u32::from_str_radix(hex, 16).ok()
}
