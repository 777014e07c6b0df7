use crate::assembler::{assemble, parse_int, register_number};
use crate::error::BuildError;
use crate::immediate::{Immediate, RelOp, TreeOp};
use crate::instruction::{IFunct, RFunct, SourceInsn};
use crate::object::{is_label_char, SectionKind, Visibility};

fn parse_error(source: &str) -> String {
    match assemble("test.s", source) {
        Err(BuildError::Parse { message, .. }) => message,
        other => panic!("expected a parse error, got {:?}", other),
    }
}

#[test]
fn test_empty_and_comment_lines() {
    let object = assemble("test.s", "\n   \n# whole line comment\n\t# another\n").unwrap();
    assert_eq!(object.section(SectionKind::Text).size, 0);
}

#[test]
fn test_label_definition() {
    let object = assemble("test.s", "start:\n  nop\n").unwrap();
    let symbol = &object.symbols["start"];
    assert_eq!(symbol.section, SectionKind::Text);
    assert_eq!(symbol.offset, 0);
    assert_eq!(symbol.visibility, Visibility::Local);
}

#[test]
fn test_label_characters() {
    // every accepted label char satisfies the predicate
    let object = assemble("test.s", "a.b@c_1:\n").unwrap();
    assert!(object.symbols.contains_key("a.b@c_1"));
    assert!("a.b@c_1".chars().all(is_label_char));

    let message = parse_error("bad!label:\n");
    assert!(message.contains("Invalid label"), "{}", message);
}

#[test]
fn test_label_whitespace_handling() {
    // leading indentation is fine, but a space before the colon is not a
    // label character
    let object = assemble("test.s", "  indented:\n").unwrap();
    assert!(object.symbols.contains_key("indented"));

    let message = parse_error("foo :\n");
    assert!(message.contains("Invalid label"), "{}", message);

    // a bare colon defines no label either
    let message = parse_error(":\n");
    assert!(message.contains("Invalid label"), "{}", message);
}

#[test]
fn test_label_offset_tracks_cursor() {
    let source = ".data\n.byte 1, 2, 3\nhere:\n.word 9\n";
    let object = assemble("test.s", source).unwrap();
    let symbol = &object.symbols["here"];
    assert_eq!(symbol.section, SectionKind::Data);
    assert_eq!(symbol.offset, 3);
}

#[test]
fn test_unexpected_token_after_label() {
    let message = parse_error("start: nop\n");
    assert!(message.contains("Unexpected token after label"), "{}", message);
}

#[test]
fn test_label_followed_by_comment_is_fine() {
    assemble("test.s", "start: # entry point\n  nop\n").unwrap();
}

#[test]
fn test_duplicate_label() {
    let message = parse_error("x:\nx:\n");
    assert!(message.contains("Duplicate label"), "{}", message);
}

#[test]
fn test_globl_marks_symbol() {
    let object = assemble("test.s", ".globl main\nmain:\n  ret\n").unwrap();
    assert_eq!(object.symbols["main"].visibility, Visibility::Global);
}

#[test]
fn test_globl_of_undefined_symbol_is_extern() {
    let object = assemble("test.s", ".globl elsewhere\nmain:\n  ret\n").unwrap();
    assert_eq!(object.symbols["main"].visibility, Visibility::Local);
    assert!(!object.symbols.contains_key("elsewhere"));
}

#[test]
fn test_wrong_operand_count() {
    let message = parse_error("add a0, a1\n");
    assert!(message.contains("Too few arguments"), "{}", message);
    let message = parse_error("add a0, a1, a2, a3\n");
    assert!(message.contains("Too many arguments"), "{}", message);
}

#[test]
fn test_unknown_mnemonic_and_directive() {
    let message = parse_error("frobnicate a0\n");
    assert!(message.contains("Unknown instruction"), "{}", message);
    let message = parse_error(".frobnicate\n");
    assert!(message.contains("Unknown directive"), "{}", message);
}

#[test]
fn test_trailing_comment_on_instruction() {
    let object = assemble("test.s", "add a0, a1, a2 # sum\n").unwrap();
    assert_eq!(object.section(SectionKind::Text).insns.len(), 1);
}

#[test]
fn test_register_names() {
    assert_eq!(register_number("zero"), Some(0));
    assert_eq!(register_number("x0"), Some(0));
    assert_eq!(register_number("fp"), Some(8));
    assert_eq!(register_number("s0"), Some(8));
    assert_eq!(register_number("t6"), Some(31));
    assert_eq!(register_number("x32"), None);
    assert_eq!(register_number("q1"), None);

    let message = parse_error("add a0, a1, 5\n");
    assert!(message.contains("Expected register"), "{}", message);
}

#[test]
fn test_parse_int_bases() {
    assert_eq!(parse_int("42"), Some(42));
    assert_eq!(parse_int("-42"), Some(-42));
    assert_eq!(parse_int("0x10"), Some(16));
    assert_eq!(parse_int("0b101"), Some(5));
    assert_eq!(parse_int("0o17"), Some(15));
    assert_eq!(parse_int("017"), Some(15));
    assert_eq!(parse_int("0"), Some(0));
    // u32-only values are accepted bit-for-bit
    assert_eq!(parse_int("0xdeadbeef"), Some(0xdead_beefu32 as i32));
    assert_eq!(parse_int("4294967295"), Some(-1));
    assert_eq!(parse_int("x"), None);
    assert_eq!(parse_int("1x"), None);
}

#[test]
fn test_memory_operand_forms() {
    let object = assemble("test.s", "lw a0, 8(a1)\nlw a0, (a1)\nlw a0, x+4(sp)\n").unwrap();
    let insns = &object.section(SectionKind::Text).insns;
    match &insns[0].insn {
        SourceInsn::Load { rd: 10, rs1: 11, imm: Immediate::Int(8), .. } => {}
        other => panic!("unexpected {:?}", other),
    }
    match &insns[1].insn {
        SourceInsn::Load { imm: Immediate::Int(0), .. } => {}
        other => panic!("unexpected {:?}", other),
    }
    match &insns[2].insn {
        SourceInsn::Load { rs1: 2, imm: Immediate::Tree(terms), .. } => {
            assert_eq!(terms.len(), 2);
            assert_eq!(terms[0], (TreeOp::Add, Immediate::sym("x")));
            assert_eq!(terms[1], (TreeOp::Add, Immediate::Int(4)));
        }
        other => panic!("unexpected {:?}", other),
    }

    let message = parse_error("lw a0, 8a1\n");
    assert!(message.contains("Invalid immediate and offset"), "{}", message);
}

#[test]
fn test_immediate_chain() {
    let object = assemble("test.s", "addi a0, a0, end-start-4\n").unwrap();
    match &object.section(SectionKind::Text).insns[0].insn {
        SourceInsn::IType { imm: Immediate::Tree(terms), .. } => {
            assert_eq!(terms[0], (TreeOp::Add, Immediate::sym("end")));
            assert_eq!(terms[1], (TreeOp::Sub, Immediate::sym("start")));
            assert_eq!(terms[2], (TreeOp::Sub, Immediate::Int(4)));
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_li_expands_to_hi_lo_pair() {
    let object = assemble("test.s", "li a0, 0x12345678\n").unwrap();
    let insns = &object.section(SectionKind::Text).insns;
    assert_eq!(insns.len(), 2);
    match &insns[0].insn {
        SourceInsn::Lui { rd: 10, imm: Immediate::Rel(RelOp::Hi, inner) } => {
            assert_eq!(**inner, Immediate::Int(0x12345678));
        }
        other => panic!("unexpected {:?}", other),
    }
    match &insns[1].insn {
        SourceInsn::IType { funct: IFunct::Addi, rd: 10, rs1: 10, imm: Immediate::Rel(RelOp::Lo, _) } => {}
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_call_expands_to_pcrel_pair_with_anchor_label() {
    let object = assemble("test.s", "call helper\n").unwrap();
    let insns = &object.section(SectionKind::Text).insns;
    assert_eq!(insns.len(), 2);
    match &insns[0].insn {
        SourceInsn::Auipc { rd: 1, imm: Immediate::Rel(RelOp::PcrelHi, _) } => {}
        other => panic!("unexpected {:?}", other),
    }
    let anchor = match &insns[1].insn {
        SourceInsn::Jalr { rd: 1, rs1: 1, imm: Immediate::Rel(RelOp::PcrelLo, inner) } => {
            match &**inner {
                Immediate::Sym(name) => name.clone(),
                other => panic!("unexpected inner {:?}", other),
            }
        }
        other => panic!("unexpected {:?}", other),
    };
    // the synthetic label sits on the auipc
    assert_eq!(object.symbols[&anchor].offset, insns[0].offset);
}

#[test]
fn test_branch_aliases() {
    let source = "beqz a0, top\nbgt a1, a2, top\n";
    let object = assemble("test.s", source).unwrap();
    let insns = &object.section(SectionKind::Text).insns;
    match &insns[0].insn {
        SourceInsn::Branch { rs1: 10, rs2: 0, .. } => {}
        other => panic!("unexpected {:?}", other),
    }
    // bgt swaps into blt
    match &insns[1].insn {
        SourceInsn::Branch { funct, rs1: 12, rs2: 11, .. } => {
            assert_eq!(*funct, crate::instruction::BranchFunct::Blt);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_neg_and_mv() {
    let object = assemble("test.s", "neg a0, a1\nmv a2, a3\n").unwrap();
    let insns = &object.section(SectionKind::Text).insns;
    match &insns[0].insn {
        SourceInsn::RType { funct: RFunct::Sub, rd: 10, rs1: 0, rs2: 11 } => {}
        other => panic!("unexpected {:?}", other),
    }
    match &insns[1].insn {
        SourceInsn::IType { funct: IFunct::Addi, rd: 12, rs1: 13, imm: Immediate::Int(0) } => {}
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_string_escapes() {
    let source = ".data\nmsg:\n.asciz \"a\\tb\\n\\\\\\\"\\r\\0x\"\n";
    let object = assemble("test.s", source).unwrap();
    let data = &object.section(SectionKind::Data).storage;
    assert_eq!(data.as_slice(), b"a\tb\n\\\"\r\0x\0");
}

#[test]
fn test_bad_escape_and_unterminated_string() {
    let message = parse_error(".data\n.asciz \"a\\qb\"\n");
    assert!(message.contains("Invalid escape character"), "{}", message);
    let message = parse_error(".data\n.asciz \"no end\n");
    assert!(message.contains("Missing end of string"), "{}", message);
    let message = parse_error(".data\n.asciz hello\n");
    assert!(message.contains("Invalid ascii string"), "{}", message);
}

#[test]
fn test_data_directives_widths() {
    let source = ".data\n.byte 1, 2\n.half 0x1234\n.word -1\n";
    let object = assemble("test.s", source).unwrap();
    let data = &object.section(SectionKind::Data).storage;
    assert_eq!(data.as_slice(), &[1, 2, 0x34, 0x12, 0xff, 0xff, 0xff, 0xff]);
}

#[test]
fn test_symbolic_word_leaves_reloc() {
    let source = ".data\n.word somewhere\n";
    let object = assemble("test.s", source).unwrap();
    let section = object.section(SectionKind::Data);
    assert_eq!(section.storage, vec![0, 0, 0, 0]);
    assert_eq!(section.relocs.len(), 1);
    assert_eq!(section.relocs[0].offset, 0);
    assert_eq!(section.relocs[0].width, 4);
}

#[test]
fn test_zero_and_align() {
    let source = ".data\n.byte 1\n.align 3\nval:\n.zero 5\n";
    let object = assemble("test.s", source).unwrap();
    let section = object.section(SectionKind::Data);
    assert_eq!(object.symbols["val"].offset, 8);
    assert_eq!(section.size, 13);
    assert_eq!(section.align, 8);
}

#[test]
fn test_text_alignment_pads_with_nop() {
    let source = "nop\n.align 3\nafter:\n";
    let object = assemble("test.s", source).unwrap();
    let section = object.section(SectionKind::Text);
    assert_eq!(object.symbols["after"].offset, 8);
    assert_eq!(&section.storage[4..8], &0x0000_0013u32.to_le_bytes());
}

#[test]
fn test_bss_only_holds_reservations() {
    let source = ".bss\nbuf:\n.zero 64\n";
    let object = assemble("test.s", source).unwrap();
    let section = object.section(SectionKind::Bss);
    assert_eq!(section.size, 64);
    assert!(section.storage.is_empty());

    let message = parse_error(".bss\n.word 1\n");
    assert!(message.contains("not allowed in .bss"), "{}", message);
    let message = parse_error(".bss\n.asciz \"x\"\n");
    assert!(message.contains("not allowed in .bss"), "{}", message);
}

#[test]
fn test_instruction_outside_text() {
    let message = parse_error(".data\nadd a0, a1, a2\n");
    assert!(message.contains("outside the .text section"), "{}", message);
}

#[test]
fn test_section_switch_rejects_operands() {
    let message = parse_error(".text junk\n");
    assert!(message.contains("Unexpected token"), "{}", message);
}

#[test]
fn test_error_location() {
    match assemble("file.s", "nop\nnop\nbogus\n") {
        Err(BuildError::Parse { location, .. }) => {
            assert_eq!(location.file, "file.s");
            assert_eq!(location.line, 3);
        }
        other => panic!("expected a parse error, got {:?}", other),
    }
}
