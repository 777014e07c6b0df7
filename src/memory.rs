// memory.rs
//
// The flat guest address space: the four linked sections plus a heap
// window (grown with brk/sbrk) and a fixed-size stack. Every typed access
// validates alignment, range, and permission, and reports failures as
// traps.

use crate::exception::{FailToInterpret, TrapInfo, TrapKind};
use crate::linker::{align_up, LinkedImage};
use crate::object::SectionKind;

const PAGE: u32 = 4096;
const HEAP_LIMIT: u32 = 1 << 20;
const STACK_SIZE: u32 = 1 << 16;

struct Region {
    start: u32,
    end: u32,
    bytes: Vec<u8>,
    writeable: bool,
    executable: bool,
}

impl Region {
    fn new(start: u32, end: u32, init: Vec<u8>, writeable: bool, executable: bool) -> Self {
        let mut bytes = init;
        bytes.resize((end - start) as usize, 0);
        Region { start, end, bytes, writeable, executable }
    }

    fn in_range(&self, addr: u32, width: u32) -> bool {
        addr >= self.start && addr.saturating_add(width) <= self.end
    }
}

enum Access {
    Load,
    Store,
    Fetch,
}

pub struct Memory {
    regions: Vec<Region>,
    heap_start: u32,
    heap_region: usize,
    brk: u32,
    stack_top: u32,
}

impl Memory {
    pub fn new(image: &LinkedImage) -> Self {
        let mut regions = Vec::new();
        for section in &image.sections {
            let writeable =
                matches!(section.kind, SectionKind::Data | SectionKind::Bss);
            let executable = section.kind == SectionKind::Text;
            regions.push(Region::new(
                section.start,
                section.end(),
                section.bytes.clone(),
                writeable,
                executable,
            ));
        }

        let heap_start = align_up(image.section(SectionKind::Bss).end(), PAGE);
        let heap_region = regions.len();
        // The heap's backing store covers the whole window; its logical end
        // tracks brk.
        let mut heap = Region::new(heap_start, heap_start + HEAP_LIMIT, Vec::new(), true, false);
        heap.end = heap_start;
        regions.push(heap);

        let stack_start = heap_start + HEAP_LIMIT + PAGE;
        let stack_top = stack_start + STACK_SIZE;
        regions.push(Region::new(stack_start, stack_top, Vec::new(), true, false));

        Memory { regions, heap_start, heap_region, brk: heap_start, stack_top }
    }

    pub fn stack_top(&self) -> u32 {
        self.stack_top
    }

    pub fn brk(&self) -> u32 {
        self.brk
    }

    pub fn heap_start(&self) -> u32 {
        self.heap_start
    }

    /// Move the program break. Returns false when the target falls outside
    /// the heap window.
    pub fn set_brk(&mut self, target: u32) -> bool {
        if target < self.heap_start || target > self.heap_start + HEAP_LIMIT {
            return false;
        }
        self.brk = target;
        self.regions[self.heap_region].end = target;
        true
    }

    // Alignment is validated before range so a misaligned address reports
    // misalignment even when it is also unmapped.
    fn check(&self, addr: u32, width: u32, access: Access) -> Result<usize, FailToInterpret> {
        if width > 1 && addr % width != 0 {
            let kind = match access {
                Access::Load => TrapKind::LoadMisAligned,
                Access::Store => TrapKind::StoreMisAligned,
                Access::Fetch => TrapKind::InsMisAligned,
            };
            return Err(FailToInterpret::new(kind, addr, TrapInfo::Alignment(width)));
        }
        let found = self.regions.iter().position(|r| r.in_range(addr, width));
        let region = match found {
            Some(index) => index,
            None => {
                let kind = match access {
                    Access::Load => TrapKind::LoadOutOfBound,
                    Access::Store => TrapKind::StoreOutOfBound,
                    Access::Fetch => TrapKind::InsOutOfBound,
                };
                return Err(FailToInterpret::new(kind, addr, TrapInfo::Size(width)));
            }
        };
        match access {
            Access::Store if !self.regions[region].writeable => {
                Err(FailToInterpret::new(TrapKind::StoreOutOfBound, addr, TrapInfo::Size(width)))
            }
            Access::Fetch if !self.regions[region].executable => {
                Err(FailToInterpret::new(TrapKind::InsOutOfBound, addr, TrapInfo::Size(width)))
            }
            _ => Ok(region),
        }
    }

    fn load(&self, addr: u32, width: u32) -> Result<&[u8], FailToInterpret> {
        let region = self.check(addr, width, Access::Load)?;
        let region = &self.regions[region];
        let offset = (addr - region.start) as usize;
        Ok(&region.bytes[offset..offset + width as usize])
    }

    fn store(&mut self, addr: u32, raw: &[u8]) -> Result<(), FailToInterpret> {
        let region = self.check(addr, raw.len() as u32, Access::Store)?;
        let region = &mut self.regions[region];
        let offset = (addr - region.start) as usize;
        region.bytes[offset..offset + raw.len()].copy_from_slice(raw);
        Ok(())
    }

    pub fn load_i8(&self, addr: u32) -> Result<i32, FailToInterpret> {
        Ok(self.load(addr, 1)?[0] as i8 as i32)
    }

    pub fn load_u8(&self, addr: u32) -> Result<i32, FailToInterpret> {
        Ok(self.load(addr, 1)?[0] as i32)
    }

    pub fn load_i16(&self, addr: u32) -> Result<i32, FailToInterpret> {
        let raw = self.load(addr, 2)?;
        Ok(i16::from_le_bytes(raw.try_into().unwrap()) as i32)
    }

    pub fn load_u16(&self, addr: u32) -> Result<i32, FailToInterpret> {
        let raw = self.load(addr, 2)?;
        Ok(u16::from_le_bytes(raw.try_into().unwrap()) as i32)
    }

    pub fn load_i32(&self, addr: u32) -> Result<i32, FailToInterpret> {
        let raw = self.load(addr, 4)?;
        Ok(i32::from_le_bytes(raw.try_into().unwrap()))
    }

    pub fn load_u32(&self, addr: u32) -> Result<u32, FailToInterpret> {
        Ok(self.load_i32(addr)? as u32)
    }

    pub fn store_i8(&mut self, addr: u32, value: i32) -> Result<(), FailToInterpret> {
        self.store(addr, &[value as u8])
    }

    pub fn store_i16(&mut self, addr: u32, value: i32) -> Result<(), FailToInterpret> {
        self.store(addr, &(value as u16).to_le_bytes())
    }

    pub fn store_i32(&mut self, addr: u32, value: i32) -> Result<(), FailToInterpret> {
        self.store(addr, &(value as u32).to_le_bytes())
    }

    /// Fetch a 32-bit instruction word from executable storage.
    pub fn load_cmd(&self, addr: u32) -> Result<u32, FailToInterpret> {
        let region = self.check(addr, 4, Access::Fetch)?;
        let region = &self.regions[region];
        let offset = (addr - region.start) as usize;
        Ok(u32::from_le_bytes(region.bytes[offset..offset + 4].try_into().unwrap()))
    }

    /// Raw view for the libc shim. Returns None when the range is unmapped.
    pub fn slice(&self, addr: u32, len: u32) -> Option<&[u8]> {
        let region = self.regions.iter().find(|r| r.in_range(addr, len))?;
        let offset = (addr - region.start) as usize;
        Some(&region.bytes[offset..offset + len as usize])
    }

    /// Raw writable view for the libc shim; refuses read-only regions.
    pub fn slice_mut(&mut self, addr: u32, len: u32) -> Option<&mut [u8]> {
        let region = self
            .regions
            .iter_mut()
            .find(|r| r.in_range(addr, len) && r.writeable)?;
        let offset = (addr - region.start) as usize;
        Some(&mut region.bytes[offset..offset + len as usize])
    }
}
