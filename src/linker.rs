// linker.rs
//
// Merges the per-file objects, lays out the four sections into the target
// address space, resolves symbols, and patches every instruction word and
// data relocation against final addresses.

use crate::error::{BuildError, Result};
use crate::evaluate::Evaluator;
use crate::immediate::Immediate;
use crate::object::{ObjectFile, SectionKind, Visibility, SECTION_KINDS};
use std::collections::HashMap;

/// Base address of the text section. The other sections follow in the
/// canonical order, each aligned to its own requirement.
pub const TEXT_BASE: u32 = 0x10000;

/// A fully laid-out section: final base address and resolved contents.
/// For bss, `bytes` stays empty and `size` records the zeroed length.
#[derive(Debug, Clone)]
pub struct LinkedSection {
    pub kind: SectionKind,
    pub start: u32,
    pub bytes: Vec<u8>,
    pub size: u32,
}

impl LinkedSection {
    pub fn end(&self) -> u32 {
        self.start + self.size
    }
}

/// The linker's output: the interpreter owns this for its whole run.
#[derive(Debug, Clone)]
pub struct LinkedImage {
    pub sections: [LinkedSection; 4],
    /// Absolute address of every global symbol; always contains `main`.
    pub position_table: HashMap<String, u32>,
}

impl LinkedImage {
    pub fn section(&self, kind: SectionKind) -> &LinkedSection {
        &self.sections[kind.index()]
    }

    pub fn entry(&self) -> u32 {
        self.position_table["main"]
    }
}

pub fn link(objects: &[ObjectFile]) -> Result<LinkedImage> {
    // Phase 1: merge per-section storage in input order, padding each
    // object's chunk to its declared alignment so intra-file .align holds
    // after concatenation.
    let mut merged: [Vec<u8>; 4] = Default::default();
    let mut merged_size = [0u32; 4];
    let mut section_align = [4u32; 4];
    let mut chunk_base = vec![[0u32; 4]; objects.len()];

    for (index, object) in objects.iter().enumerate() {
        for kind in SECTION_KINDS {
            let section = object.section(kind);
            let k = kind.index();
            section_align[k] = section_align[k].max(section.align);
            let base = align_up(merged_size[k], section.align.max(1));
            if kind != SectionKind::Bss {
                merged[k].resize(base as usize, 0);
                merged[k].extend_from_slice(&section.storage);
            }
            chunk_base[index][k] = base;
            merged_size[k] = base + section.size;
        }
    }

    // Phase 2: assign base addresses in the fixed order text, data,
    // rodata, bss and reject any overlap.
    let mut starts = [0u32; 4];
    let mut cursor = TEXT_BASE;
    for kind in SECTION_KINDS {
        let k = kind.index();
        let start = align_up(cursor, section_align[k]);
        if start < cursor {
            return Err(BuildError::link(format!(
                "Section {} overlaps the previous section",
                kind.name()
            )));
        }
        starts[k] = start;
        cursor = start
            .checked_add(merged_size[k])
            .ok_or_else(|| BuildError::link("Address space exhausted during layout"))?;
    }

    // Phase 3a: resolve symbols. Local symbols are scoped per file; global
    // symbols go into a single table, with duplicates fatal.
    let mut global: HashMap<String, u32> = HashMap::new();
    let mut locals: Vec<HashMap<String, u32>> = Vec::with_capacity(objects.len());
    for (index, object) in objects.iter().enumerate() {
        let mut local = HashMap::new();
        for (name, symbol) in &object.symbols {
            let k = symbol.section.index();
            let addr = starts[k] + chunk_base[index][k] + symbol.offset;
            local.insert(name.clone(), addr);
            if symbol.visibility == Visibility::Global
                && global.insert(name.clone(), addr).is_some()
            {
                return Err(BuildError::link(format!("Duplicate global symbol \"{}\"", name)));
            }
        }
        locals.push(local);
    }

    if !global.contains_key("main") {
        return Err(BuildError::link("No main function found"));
    }

    // Phase 3b: evaluate immediates and patch words and data items.
    let text_start = starts[SectionKind::Text.index()];
    for (index, object) in objects.iter().enumerate() {
        let text_chunk = chunk_base[index][SectionKind::Text.index()];
        let mut anchors: HashMap<u32, &Immediate> = HashMap::new();
        for slot in &object.section(SectionKind::Text).insns {
            if let Some(imm) = slot.insn.immediate() {
                anchors.insert(text_start + text_chunk + slot.offset, imm);
            }
        }
        let evaluator = Evaluator::new(&global, &locals[index], &anchors);

        for slot in &object.section(SectionKind::Text).insns {
            let position = text_start + text_chunk + slot.offset;
            let value = match slot.insn.immediate() {
                Some(imm) => evaluator
                    .evaluate(imm, position)
                    .map_err(|e| link_context(e, object, slot.offset))?,
                None => 0,
            };
            let word = slot
                .insn
                .encode(value, position)
                .map_err(|e| link_context(e, object, slot.offset))?;
            let patch = (text_chunk + slot.offset) as usize;
            merged[SectionKind::Text.index()][patch..patch + 4]
                .copy_from_slice(&word.to_le_bytes());
        }

        for kind in [SectionKind::Text, SectionKind::Data, SectionKind::Rodata] {
            let k = kind.index();
            for reloc in &object.section(kind).relocs {
                let position = starts[k] + chunk_base[index][k] + reloc.offset;
                let value = evaluator
                    .evaluate(&reloc.imm, position)
                    .map_err(|e| link_context(e, object, reloc.offset))?;
                let patch = (chunk_base[index][k] + reloc.offset) as usize;
                merged[k][patch..patch + reloc.width as usize]
                    .copy_from_slice(&value.to_le_bytes()[..reloc.width as usize]);
            }
        }
    }

    let [text, data, rodata, bss] = merged;
    let sections = [
        linked(SectionKind::Text, starts, merged_size, text),
        linked(SectionKind::Data, starts, merged_size, data),
        linked(SectionKind::Rodata, starts, merged_size, rodata),
        linked(SectionKind::Bss, starts, merged_size, bss),
    ];

    Ok(LinkedImage { sections, position_table: global })
}

fn linked(kind: SectionKind, starts: [u32; 4], sizes: [u32; 4], bytes: Vec<u8>) -> LinkedSection {
    let k = kind.index();
    LinkedSection { kind, start: starts[k], bytes, size: sizes[k] }
}

fn link_context(message: String, object: &ObjectFile, offset: u32) -> BuildError {
    BuildError::link(format!("{} ({} at offset 0x{:x})", message, object.name, offset))
}

pub fn align_up(value: u32, align: u32) -> u32 {
    debug_assert!(align.is_power_of_two());
    value.wrapping_add(align - 1) & !(align - 1)
}
