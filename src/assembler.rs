// assembler.rs
//
// The line-oriented assembler. Each input file is parsed one logical line
// at a time; the only state carried between lines is the current section
// cursor. Instructions are emitted with unresolved immediates and all
// positions are section-local offsets; the linker assigns addresses.

use crate::error::{BuildError, Location, Result};
use crate::immediate::Immediate;
use crate::instruction::{BranchFunct, IFunct, LoadFunct, RFunct, SourceInsn, StoreFunct};
use crate::object::{is_valid_label, DataReloc, InsnSlot, ObjectFile, SectionKind, Symbol, Visibility};

const RA: u8 = 1;
const T1: u8 = 6;

/// Assemble one source file into a relocatable object.
pub fn assemble(file: &str, source: &str) -> Result<ObjectFile> {
    let mut asm = Assembler::new(file);
    for (index, line) in source.lines().enumerate() {
        asm.location.line = index + 1;
        asm.process_line(line)?;
    }
    asm.object.finish();
    Ok(asm.object)
}

struct Assembler {
    object: ObjectFile,
    cursor: SectionKind,
    location: Location,
    pcrel_counter: u32,
}

impl Assembler {
    fn new(file: &str) -> Self {
        Assembler {
            object: ObjectFile::new(file),
            cursor: SectionKind::Text,
            location: Location { file: file.to_string(), line: 0 },
            pcrel_counter: 0,
        }
    }

    fn err(&self, message: impl Into<String>) -> BuildError {
        BuildError::parse(message, self.location.clone())
    }

    fn process_line(&mut self, line: &str) -> Result<()> {
        if contains_no_token(line) {
            return Ok(());
        }

        // A label definition is a token followed by ':' with nothing else on
        // the line; ':' inside a string or comment does not count.
        let quote = line.find('"').unwrap_or(line.len());
        let hash = line.find('#').unwrap_or(line.len());
        if let Some(colon) = line.find(':') {
            if colon < quote && colon < hash {
                // Only leading indentation is forgiven; whitespace between
                // the name and the colon is not a label character and
                // fails validation.
                let label = line[..colon].trim_start();
                if !is_valid_label(label) {
                    return Err(self.err(format!("Invalid label: \"{}\"", label)));
                }
                if !contains_no_token(&line[colon + 1..]) {
                    return Err(self.err("Unexpected token after label"));
                }
                return self.define_label(label);
            }
        }

        let (token, rest) = find_first_token(line);
        if token.starts_with('.') {
            self.process_directive(token, rest)
        } else {
            self.process_instruction(token, rest)
        }
    }

    // ------------------------------------------------------------------
    // Labels and symbols
    // ------------------------------------------------------------------

    fn define_label(&mut self, name: &str) -> Result<()> {
        if self.object.symbols.contains_key(name) {
            return Err(self.err(format!("Duplicate label \"{}\"", name)));
        }
        let offset = self.object.section(self.cursor).size;
        self.object.symbols.insert(
            name.to_string(),
            Symbol { section: self.cursor, offset, visibility: Visibility::Local },
        );
        Ok(())
    }

    // ------------------------------------------------------------------
    // Directives
    // ------------------------------------------------------------------

    fn process_directive(&mut self, token: &str, rest: &str) -> Result<()> {
        match token {
            ".text" => self.switch_section(SectionKind::Text, rest),
            ".data" => self.switch_section(SectionKind::Data, rest),
            ".rodata" => self.switch_section(SectionKind::Rodata, rest),
            ".bss" => self.switch_section(SectionKind::Bss, rest),
            ".globl" | ".global" => {
                let [name] = self.split_command::<1>(rest)?;
                if !is_valid_label(name) {
                    return Err(self.err(format!("Invalid symbol name \"{}\"", name)));
                }
                self.object.exported.insert(name.to_string());
                Ok(())
            }
            ".align" | ".p2align" => {
                let [arg] = self.split_command::<1>(rest)?;
                let n = parse_int(arg)
                    .ok_or_else(|| self.err(format!("Invalid alignment \"{}\"", arg)))?;
                if !(0..=16).contains(&n) {
                    return Err(self.err(format!("Alignment 2^{} out of range", n)));
                }
                self.object.section_mut(self.cursor).align_to(1u32 << n);
                Ok(())
            }
            ".byte" => self.emit_data(rest, 1),
            ".half" => self.emit_data(rest, 2),
            ".word" => self.emit_data(rest, 4),
            ".asciz" | ".string" => {
                if self.cursor == SectionKind::Bss {
                    return Err(self.err("String data is not allowed in .bss"));
                }
                let (string, remaining) = self.parse_string_literal(rest)?;
                if !contains_no_token(remaining) {
                    return Err(self.err("Unexpected token after string literal"));
                }
                let section = self.object.section_mut(self.cursor);
                section.emit_bytes(string.as_bytes());
                section.emit_bytes(&[0]);
                Ok(())
            }
            ".zero" | ".space" => {
                let [arg] = self.split_command::<1>(rest)?;
                let n = parse_int(arg)
                    .ok_or_else(|| self.err(format!("Invalid size \"{}\"", arg)))?;
                if n < 0 {
                    return Err(self.err(format!("Negative size {}", n)));
                }
                self.object.section_mut(self.cursor).reserve(n as u32);
                Ok(())
            }
            _ => Err(self.err(format!("Unknown directive {}", token))),
        }
    }

    fn switch_section(&mut self, kind: SectionKind, rest: &str) -> Result<()> {
        self.split_command::<0>(rest)?;
        self.cursor = kind;
        Ok(())
    }

    /// Emit `.byte`/`.half`/`.word` operands. Literal values are written
    /// directly; symbolic values reserve space and leave a relocation for
    /// the linker.
    fn emit_data(&mut self, rest: &str, width: u32) -> Result<()> {
        if self.cursor == SectionKind::Bss {
            return Err(self.err("Initialized data is not allowed in .bss"));
        }
        let cleaned = self.strip_comment_no_string(rest)?;
        if cleaned.trim().is_empty() {
            return Err(self.err("Too few arguments"));
        }
        for piece in cleaned.split(',') {
            let imm = self.parse_immediate(piece.trim())?;
            let section = self.object.section_mut(self.cursor);
            match imm {
                Immediate::Int(value) => {
                    section.emit_bytes(&value.to_le_bytes()[..width as usize]);
                }
                imm => {
                    let offset = section.size;
                    section.relocs.push(DataReloc { offset, width, imm });
                    section.reserve(width);
                }
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Instructions
    // ------------------------------------------------------------------

    fn process_instruction(&mut self, mnemonic: &str, rest: &str) -> Result<()> {
        if self.cursor != SectionKind::Text {
            return Err(self.err(format!(
                "Instruction \"{}\" outside the .text section",
                mnemonic
            )));
        }

        match mnemonic {
            // r-type
            "add" => self.r_type(RFunct::Add, rest),
            "sub" => self.r_type(RFunct::Sub, rest),
            "sll" => self.r_type(RFunct::Sll, rest),
            "slt" => self.r_type(RFunct::Slt, rest),
            "sltu" => self.r_type(RFunct::Sltu, rest),
            "xor" => self.r_type(RFunct::Xor, rest),
            "srl" => self.r_type(RFunct::Srl, rest),
            "sra" => self.r_type(RFunct::Sra, rest),
            "or" => self.r_type(RFunct::Or, rest),
            "and" => self.r_type(RFunct::And, rest),

            // i-type
            "addi" => self.i_type(IFunct::Addi, rest),
            "slti" => self.i_type(IFunct::Slti, rest),
            "sltiu" => self.i_type(IFunct::Sltiu, rest),
            "xori" => self.i_type(IFunct::Xori, rest),
            "ori" => self.i_type(IFunct::Ori, rest),
            "andi" => self.i_type(IFunct::Andi, rest),
            "slli" => self.i_type(IFunct::Slli, rest),
            "srli" => self.i_type(IFunct::Srli, rest),
            "srai" => self.i_type(IFunct::Srai, rest),

            // loads and stores
            "lb" => self.load(LoadFunct::Lb, rest),
            "lh" => self.load(LoadFunct::Lh, rest),
            "lw" => self.load(LoadFunct::Lw, rest),
            "lbu" => self.load(LoadFunct::Lbu, rest),
            "lhu" => self.load(LoadFunct::Lhu, rest),
            "sb" => self.store(StoreFunct::Sb, rest),
            "sh" => self.store(StoreFunct::Sh, rest),
            "sw" => self.store(StoreFunct::Sw, rest),

            // branches
            "beq" => self.branch(BranchFunct::Beq, rest),
            "bne" => self.branch(BranchFunct::Bne, rest),
            "blt" => self.branch(BranchFunct::Blt, rest),
            "bge" => self.branch(BranchFunct::Bge, rest),
            "bltu" => self.branch(BranchFunct::Bltu, rest),
            "bgeu" => self.branch(BranchFunct::Bgeu, rest),

            // u-type
            "lui" => {
                let [rd, imm] = self.split_command::<2>(rest)?;
                let rd = self.parse_register(rd)?;
                let imm = self.parse_immediate(imm)?;
                self.emit(SourceInsn::Lui { rd, imm })
            }
            "auipc" => {
                let [rd, imm] = self.split_command::<2>(rest)?;
                let rd = self.parse_register(rd)?;
                let imm = self.parse_immediate(imm)?;
                self.emit(SourceInsn::Auipc { rd, imm })
            }

            // jumps
            "jal" => {
                let cleaned = self.strip_comment_no_string(rest)?;
                if cleaned.contains(',') {
                    let [rd, target] = self.split_command::<2>(rest)?;
                    let rd = self.parse_register(rd)?;
                    let imm = self.parse_immediate(target)?;
                    self.emit(SourceInsn::Jal { rd, imm })
                } else {
                    let [target] = self.split_command::<1>(rest)?;
                    let imm = self.parse_immediate(target)?;
                    self.emit(SourceInsn::Jal { rd: RA, imm })
                }
            }
            "jalr" => {
                let cleaned = self.strip_comment_no_string(rest)?;
                if cleaned.contains(',') {
                    let [rd, rs1, imm] = self.split_command::<3>(rest)?;
                    let rd = self.parse_register(rd)?;
                    let rs1 = self.parse_register(rs1)?;
                    let imm = self.parse_immediate(imm)?;
                    self.emit(SourceInsn::Jalr { rd, rs1, imm })
                } else {
                    let [rs1] = self.split_command::<1>(rest)?;
                    let rs1 = self.parse_register(rs1)?;
                    self.emit(SourceInsn::Jalr { rd: RA, rs1, imm: Immediate::Int(0) })
                }
            }

            // environment
            "ecall" => {
                self.split_command::<0>(rest)?;
                self.emit(SourceInsn::Ecall)
            }
            "ebreak" => {
                self.split_command::<0>(rest)?;
                self.emit(SourceInsn::Ebreak)
            }

            // pseudo-instructions
            "li" | "la" => {
                let [rd, imm] = self.split_command::<2>(rest)?;
                let rd = self.parse_register(rd)?;
                let imm = self.parse_immediate(imm)?;
                self.emit(SourceInsn::Lui { rd, imm: Immediate::hi(imm.clone()) })?;
                self.emit(SourceInsn::IType {
                    funct: IFunct::Addi,
                    rd,
                    rs1: rd,
                    imm: Immediate::lo(imm),
                })
            }
            "call" => self.call_like(rest, RA, RA),
            "tail" => self.call_like(rest, T1, 0),
            "j" => {
                let [target] = self.split_command::<1>(rest)?;
                let imm = self.parse_immediate(target)?;
                self.emit(SourceInsn::Jal { rd: 0, imm })
            }
            "jr" => {
                let [rs1] = self.split_command::<1>(rest)?;
                let rs1 = self.parse_register(rs1)?;
                self.emit(SourceInsn::Jalr { rd: 0, rs1, imm: Immediate::Int(0) })
            }
            "mv" => {
                let [rd, rs1] = self.split_command::<2>(rest)?;
                let rd = self.parse_register(rd)?;
                let rs1 = self.parse_register(rs1)?;
                self.emit(SourceInsn::IType { funct: IFunct::Addi, rd, rs1, imm: Immediate::Int(0) })
            }
            "not" => {
                let [rd, rs1] = self.split_command::<2>(rest)?;
                let rd = self.parse_register(rd)?;
                let rs1 = self.parse_register(rs1)?;
                self.emit(SourceInsn::IType { funct: IFunct::Xori, rd, rs1, imm: Immediate::Int(-1) })
            }
            "neg" => {
                let [rd, rs2] = self.split_command::<2>(rest)?;
                let rd = self.parse_register(rd)?;
                let rs2 = self.parse_register(rs2)?;
                self.emit(SourceInsn::RType { funct: RFunct::Sub, rd, rs1: 0, rs2 })
            }
            "seqz" => {
                let [rd, rs1] = self.split_command::<2>(rest)?;
                let rd = self.parse_register(rd)?;
                let rs1 = self.parse_register(rs1)?;
                self.emit(SourceInsn::IType { funct: IFunct::Sltiu, rd, rs1, imm: Immediate::Int(1) })
            }
            "snez" => {
                let [rd, rs2] = self.split_command::<2>(rest)?;
                let rd = self.parse_register(rd)?;
                let rs2 = self.parse_register(rs2)?;
                self.emit(SourceInsn::RType { funct: RFunct::Sltu, rd, rs1: 0, rs2 })
            }
            "nop" => {
                self.split_command::<0>(rest)?;
                self.emit(SourceInsn::IType { funct: IFunct::Addi, rd: 0, rs1: 0, imm: Immediate::Int(0) })
            }
            "ret" => {
                self.split_command::<0>(rest)?;
                self.emit(SourceInsn::Jalr { rd: 0, rs1: RA, imm: Immediate::Int(0) })
            }

            // branch aliases
            "beqz" => self.branch_zero(BranchFunct::Beq, rest, false),
            "bnez" => self.branch_zero(BranchFunct::Bne, rest, false),
            "bltz" => self.branch_zero(BranchFunct::Blt, rest, false),
            "bgez" => self.branch_zero(BranchFunct::Bge, rest, false),
            "blez" => self.branch_zero(BranchFunct::Bge, rest, true),
            "bgtz" => self.branch_zero(BranchFunct::Blt, rest, true),
            "bgt" => self.branch_swapped(BranchFunct::Blt, rest),
            "ble" => self.branch_swapped(BranchFunct::Bge, rest),
            "bgtu" => self.branch_swapped(BranchFunct::Bltu, rest),
            "bleu" => self.branch_swapped(BranchFunct::Bgeu, rest),

            _ => Err(self.err(format!("Unknown instruction \"{}\"", mnemonic))),
        }
    }

    fn r_type(&mut self, funct: RFunct, rest: &str) -> Result<()> {
        let [rd, rs1, rs2] = self.split_command::<3>(rest)?;
        let rd = self.parse_register(rd)?;
        let rs1 = self.parse_register(rs1)?;
        let rs2 = self.parse_register(rs2)?;
        self.emit(SourceInsn::RType { funct, rd, rs1, rs2 })
    }

    fn i_type(&mut self, funct: IFunct, rest: &str) -> Result<()> {
        let [rd, rs1, imm] = self.split_command::<3>(rest)?;
        let rd = self.parse_register(rd)?;
        let rs1 = self.parse_register(rs1)?;
        let imm = self.parse_immediate(imm)?;
        self.emit(SourceInsn::IType { funct, rd, rs1, imm })
    }

    fn load(&mut self, funct: LoadFunct, rest: &str) -> Result<()> {
        let [rd, operand] = self.split_command::<2>(rest)?;
        let rd = self.parse_register(rd)?;
        let (imm, rs1) = self.split_offset_and_register(operand)?;
        self.emit(SourceInsn::Load { funct, rd, rs1, imm })
    }

    fn store(&mut self, funct: StoreFunct, rest: &str) -> Result<()> {
        let [rs2, operand] = self.split_command::<2>(rest)?;
        let rs2 = self.parse_register(rs2)?;
        let (imm, rs1) = self.split_offset_and_register(operand)?;
        self.emit(SourceInsn::Store { funct, rs1, rs2, imm })
    }

    fn branch(&mut self, funct: BranchFunct, rest: &str) -> Result<()> {
        let [rs1, rs2, target] = self.split_command::<3>(rest)?;
        let rs1 = self.parse_register(rs1)?;
        let rs2 = self.parse_register(rs2)?;
        let imm = self.parse_immediate(target)?;
        self.emit(SourceInsn::Branch { funct, rs1, rs2, imm })
    }

    /// One-register branch aliases. `swap` places the register in the rs2
    /// slot (blez/bgtz compare against x0 from the left).
    fn branch_zero(&mut self, funct: BranchFunct, rest: &str, swap: bool) -> Result<()> {
        let [rs, target] = self.split_command::<2>(rest)?;
        let rs = self.parse_register(rs)?;
        let imm = self.parse_immediate(target)?;
        let (rs1, rs2) = if swap { (0, rs) } else { (rs, 0) };
        self.emit(SourceInsn::Branch { funct, rs1, rs2, imm })
    }

    fn branch_swapped(&mut self, funct: BranchFunct, rest: &str) -> Result<()> {
        let [rs1, rs2, target] = self.split_command::<3>(rest)?;
        let a = self.parse_register(rs1)?;
        let b = self.parse_register(rs2)?;
        let imm = self.parse_immediate(target)?;
        self.emit(SourceInsn::Branch { funct, rs1: b, rs2: a, imm })
    }

    /// `call`/`tail`: an `auipc`+`jalr` pair addressed PC-relative. The
    /// `auipc` gets a synthetic local label so the low half can name its
    /// anchor, matching the standard `%pcrel_lo(label)` pairing.
    fn call_like(&mut self, rest: &str, scratch: u8, link: u8) -> Result<()> {
        let [target] = self.split_command::<1>(rest)?;
        let imm = self.parse_immediate(target)?;
        let label = format!(".Lpcrel_hi{}", self.pcrel_counter);
        self.pcrel_counter += 1;
        self.define_label(&label)?;
        self.emit(SourceInsn::Auipc { rd: scratch, imm: Immediate::pcrel_hi(imm) })?;
        self.emit(SourceInsn::Jalr {
            rd: link,
            rs1: scratch,
            imm: Immediate::pcrel_lo(Immediate::sym(label)),
        })
    }

    fn emit(&mut self, insn: SourceInsn) -> Result<()> {
        let section = self.object.section_mut(SectionKind::Text);
        section.insns.push(InsnSlot { offset: section.size, insn });
        section.emit_bytes(&[0, 0, 0, 0]);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Operand parsing helpers
    // ------------------------------------------------------------------

    /// Split the remainder of a line into exactly `N` comma-separated
    /// operands with surrounding whitespace stripped. `N = 0` demands the
    /// remainder hold no token at all.
    fn split_command<'a, const N: usize>(&self, rest: &'a str) -> Result<[&'a str; N]> {
        if N == 0 {
            if !contains_no_token(rest) {
                return Err(self.err("Unexpected token after command"));
            }
            return Ok([""; N]);
        }
        let cleaned = self.strip_comment_no_string(rest)?;
        if cleaned.trim().is_empty() {
            return Err(self.err("Too few arguments"));
        }
        let parts: Vec<&str> = cleaned.split(',').map(str::trim).collect();
        if parts.len() < N {
            return Err(self.err("Too few arguments"));
        }
        if parts.len() > N {
            return Err(self.err("Too many arguments"));
        }
        Ok(parts.try_into().unwrap())
    }

    /// Reject string literals and cut the comment off a command tail.
    fn strip_comment_no_string<'a>(&self, s: &'a str) -> Result<&'a str> {
        if s.contains('"') {
            return Err(self.err("Unexpected string literal"));
        }
        match s.find('#') {
            Some(pos) => Ok(&s[..pos]),
            None => Ok(s),
        }
    }

    /// Parse `imm(reg)` by stripping the trailing `)` and splitting at the
    /// last `(`. An empty offset part means zero.
    fn split_offset_and_register(&self, operand: &str) -> Result<(Immediate, u8)> {
        let operand = operand.trim();
        let inner = operand
            .strip_suffix(')')
            .and_then(|s| s.rfind('(').map(|pos| (&s[..pos], &s[pos + 1..])));
        let (offset, reg) = inner.ok_or_else(|| {
            self.err(format!("Invalid immediate and offset: \"{}\"", operand))
        })?;
        let imm = if offset.trim().is_empty() {
            Immediate::Int(0)
        } else {
            self.parse_immediate(offset)?
        };
        Ok((imm, self.parse_register(reg)?))
    }

    fn parse_register(&self, name: &str) -> Result<u8> {
        register_number(name.trim())
            .ok_or_else(|| self.err(format!("Expected register, found \"{}\"", name.trim())))
    }

    /// Parse an immediate operand: a single literal, symbol, or `.`, or a
    /// flat chain of them joined by `+`/`-`.
    fn parse_immediate(&self, s: &str) -> Result<Immediate> {
        use crate::immediate::TreeOp;

        let s = s.trim();
        if s.is_empty() {
            return Err(self.err("Empty immediate"));
        }

        let mut terms: Vec<(TreeOp, Immediate)> = Vec::new();
        let mut next_op = TreeOp::Add;
        let mut term_start = 0;
        for (pos, c) in s.char_indices() {
            if (c == '+' || c == '-') && pos > term_start {
                terms.push((next_op, self.parse_term(&s[term_start..pos])?));
                next_op = if c == '+' { TreeOp::Add } else { TreeOp::Sub };
                term_start = pos + 1;
            }
        }
        terms.push((next_op, self.parse_term(&s[term_start..])?));

        if terms.len() == 1 && terms[0].0 == TreeOp::Add {
            Ok(terms.pop().unwrap().1)
        } else {
            Ok(Immediate::Tree(terms))
        }
    }

    fn parse_term(&self, term: &str) -> Result<Immediate> {
        let term = term.trim();
        if let Some(value) = parse_int(term) {
            return Ok(Immediate::Int(value));
        }
        if is_valid_label(term) {
            return Ok(Immediate::sym(term));
        }
        Err(self.err(format!("Invalid immediate \"{}\"", term)))
    }

    /// Parse a string literal with the supported escapes, returning the
    /// decoded bytes and the rest of the line after the closing quote.
    fn parse_string_literal<'a>(&self, s: &'a str) -> Result<(String, &'a str)> {
        let s = s.trim_start();
        let mut chars = s.chars();
        if chars.next() != Some('"') {
            return Err(self.err("Invalid ascii string"));
        }
        let mut result = String::new();
        while let Some(c) = chars.next() {
            match c {
                '"' => return Ok((result, chars.as_str())),
                '\\' => match chars.next() {
                    Some('n') => result.push('\n'),
                    Some('t') => result.push('\t'),
                    Some('r') => result.push('\r'),
                    Some('0') => result.push('\0'),
                    Some('\\') => result.push('\\'),
                    Some('"') => result.push('"'),
                    _ => return Err(self.err("Invalid escape character")),
                },
                c => result.push(c),
            }
        }
        Err(self.err("Missing end of string"))
    }
}

/// Whether the string holds nothing but whitespace and/or a comment.
fn contains_no_token(s: &str) -> bool {
    let trimmed = s.trim_start();
    trimmed.is_empty() || trimmed.starts_with('#')
}

/// Split off the first whitespace/comma-delimited token.
fn find_first_token(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    let pos = s
        .find(|c: char| c.is_whitespace() || c == ',' || c == '#')
        .unwrap_or(s.len());
    (&s[..pos], &s[pos..])
}

/// Parse an integer literal: decimal, hex (0x), binary (0b), octal (0o or
/// a traditional leading zero), with an optional sign. Values that only
/// fit in u32 are accepted bit-for-bit.
pub fn parse_int(s: &str) -> Option<i32> {
    let s = s.trim();
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    if digits.is_empty() {
        return None;
    }
    let lower = digits.to_ascii_lowercase();
    let (base, body) = if let Some(hex) = lower.strip_prefix("0x") {
        (16, hex)
    } else if let Some(bin) = lower.strip_prefix("0b") {
        (2, bin)
    } else if let Some(oct) = lower.strip_prefix("0o") {
        (8, oct)
    } else if lower.len() > 1 && lower.starts_with('0') {
        (8, &lower[1..])
    } else {
        (10, lower.as_str())
    };
    let magnitude = match i64::from_str_radix(body, base) {
        Ok(v) => v,
        Err(_) => return None,
    };
    let value = if negative { -magnitude } else { magnitude };
    if value < i32::MIN as i64 || value > u32::MAX as i64 {
        return None;
    }
    Some(value as u32 as i32)
}

/// Map a register name (ABI or numeric) to its index.
pub fn register_number(name: &str) -> Option<u8> {
    let n = match name {
        "zero" | "x0" => 0,
        "ra" | "x1" => 1,
        "sp" | "x2" => 2,
        "gp" | "x3" => 3,
        "tp" | "x4" => 4,
        "t0" | "x5" => 5,
        "t1" | "x6" => 6,
        "t2" | "x7" => 7,
        "fp" | "s0" | "x8" => 8,
        "s1" | "x9" => 9,
        "a0" | "x10" => 10,
        "a1" | "x11" => 11,
        "a2" | "x12" => 12,
        "a3" | "x13" => 13,
        "a4" | "x14" => 14,
        "a5" | "x15" => 15,
        "a6" | "x16" => 16,
        "a7" | "x17" => 17,
        "s2" | "x18" => 18,
        "s3" | "x19" => 19,
        "s4" | "x20" => 20,
        "s5" | "x21" => 21,
        "s6" | "x22" => 22,
        "s7" | "x23" => 23,
        "s8" | "x24" => 24,
        "s9" | "x25" => 25,
        "s10" | "x26" => 26,
        "s11" | "x27" => 27,
        "t3" | "x28" => 28,
        "t4" | "x29" => 29,
        "t5" | "x30" => 30,
        "t6" | "x31" => 31,
        _ => return None,
    };
    Some(n)
}
