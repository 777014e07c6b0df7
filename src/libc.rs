// libc.rs
//
// The libc shim behind ECALL. The syscall number rides in a7, arguments in
// a0..a6, and the return value is written back to a0. Faults surface as
// the libc trap kinds, carrying the syscall index.

use crate::device::Device;
use crate::exception::{FailToInterpret, TrapInfo, TrapKind};
use crate::memory::Memory;
use crate::register::{RegisterFile, A0, A1, A2, A7};

pub const SYS_READ: u32 = 63;
pub const SYS_WRITE: u32 = 64;
pub const SYS_EXIT: u32 = 93;
pub const SYS_BRK: u32 = 214;
/// Linux has no sbrk syscall; this is a local extension.
pub const SYS_SBRK: u32 = 1024;

pub fn ecall(
    regs: &mut RegisterFile,
    mem: &mut Memory,
    dev: &mut Device,
) -> Result<(), FailToInterpret> {
    let number = regs.get(A7) as u32;
    match number {
        SYS_READ => {
            let fd = regs.get(A0);
            let addr = regs.get(A1) as u32;
            let count = regs.get(A2);
            if fd != 0 {
                return Err(libc_error(number, addr, "read supports fd 0 only"));
            }
            if count < 0 {
                return Err(libc_error(number, addr, "negative buffer size"));
            }
            let buffer = mem.slice_mut(addr, count as u32).ok_or_else(|| {
                FailToInterpret::libc(TrapKind::LibcOutOfBound, addr, TrapInfo::Size(count as u32), number)
            })?;
            let n = dev
                .read(buffer)
                .map_err(|_| libc_error(number, addr, "device read failed"))?;
            regs.set(A0, n as i32);
        }
        SYS_WRITE => {
            let fd = regs.get(A0);
            let addr = regs.get(A1) as u32;
            let count = regs.get(A2);
            if fd != 1 {
                return Err(libc_error(number, addr, "write supports fd 1 only"));
            }
            if count < 0 {
                return Err(libc_error(number, addr, "negative buffer size"));
            }
            let data = mem.slice(addr, count as u32).ok_or_else(|| {
                FailToInterpret::libc(TrapKind::LibcOutOfBound, addr, TrapInfo::Size(count as u32), number)
            })?;
            let data = data.to_vec();
            dev.write(&data)
                .map_err(|_| libc_error(number, addr, "device write failed"))?;
            regs.set(A0, count);
        }
        SYS_EXIT => {
            regs.halt(regs.get(A0));
        }
        SYS_BRK => {
            let target = regs.get(A0) as u32;
            if target == 0 {
                regs.set(A0, mem.brk() as i32);
            } else {
                check_brk_target(number, target, mem)?;
                regs.set(A0, target as i32);
            }
        }
        SYS_SBRK => {
            let old = mem.brk();
            let delta = regs.get(A0);
            let target = old.wrapping_add(delta as u32);
            check_brk_target(number, target, mem)?;
            regs.set(A0, old as i32);
        }
        _ => {
            return Err(FailToInterpret::libc(
                TrapKind::LibcError,
                regs.pc(),
                TrapInfo::Message("unrecognized syscall number"),
                number,
            ));
        }
    }
    Ok(())
}

fn check_brk_target(number: u32, target: u32, mem: &mut Memory) -> Result<(), FailToInterpret> {
    if target % 4 != 0 {
        return Err(FailToInterpret::libc(
            TrapKind::LibcMisAligned,
            target,
            TrapInfo::Alignment(4),
            number,
        ));
    }
    if !mem.set_brk(target) {
        return Err(FailToInterpret::libc(
            TrapKind::LibcOutOfBound,
            target,
            TrapInfo::Size(0),
            number,
        ));
    }
    Ok(())
}

fn libc_error(number: u32, address: u32, message: &'static str) -> FailToInterpret {
    FailToInterpret::libc(TrapKind::LibcError, address, TrapInfo::Message(message), number)
}
