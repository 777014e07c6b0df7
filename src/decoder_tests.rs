use crate::decoder::{decode, get_imm_b, get_imm_i, get_imm_j, get_imm_s, get_imm_u};
use crate::disasm::disassemble;
use crate::executor::Executor;
use crate::immediate::Immediate;
use crate::instruction::{IFunct, LoadFunct, RFunct, SourceInsn, StoreFunct};
use crate::object::SectionKind;
use crate::test_utils::build_one;

fn encode(insn: SourceInsn, value: u32) -> u32 {
    insn.encode(value, 0).unwrap()
}

#[test]
fn test_encode_decode_r_type() {
    let word = encode(SourceInsn::RType { funct: RFunct::Add, rd: 10, rs1: 11, rs2: 12 }, 0);
    assert_eq!(decode(word), Executor::Add { rd: 10, rs1: 11, rs2: 12 });

    let word = encode(SourceInsn::RType { funct: RFunct::Sra, rd: 1, rs1: 2, rs2: 3 }, 0);
    assert_eq!(decode(word), Executor::Sra { rd: 1, rs1: 2, rs2: 3 });
}

#[test]
fn test_encode_decode_i_type() {
    let insn = SourceInsn::IType { funct: IFunct::Addi, rd: 5, rs1: 6, imm: Immediate::Int(0) };
    let word = encode(insn, (-5i32) as u32);
    assert_eq!(decode(word), Executor::Addi { rd: 5, rs1: 6, imm: -5 });
    assert_eq!(get_imm_i(word), -5);

    let insn = SourceInsn::IType { funct: IFunct::Srai, rd: 7, rs1: 8, imm: Immediate::Int(0) };
    let word = encode(insn, 9);
    assert_eq!(decode(word), Executor::Srai { rd: 7, rs1: 8, shamt: 9 });
}

#[test]
fn test_encode_decode_load_store() {
    let insn = SourceInsn::Load { funct: LoadFunct::Lw, rd: 10, rs1: 2, imm: Immediate::Int(0) };
    let word = encode(insn, 16);
    assert_eq!(decode(word), Executor::Lw { rd: 10, rs1: 2, offset: 16 });

    let insn = SourceInsn::Store { funct: StoreFunct::Sh, rs1: 8, rs2: 9, imm: Immediate::Int(0) };
    let word = encode(insn, (-2i32) as u32);
    assert_eq!(decode(word), Executor::Sh { rs1: 8, rs2: 9, offset: -2 });
    assert_eq!(get_imm_s(word), -2);
}

#[test]
fn test_encode_decode_branch_and_jump() {
    let insn = SourceInsn::Branch {
        funct: crate::instruction::BranchFunct::Bne,
        rs1: 10,
        rs2: 0,
        imm: Immediate::Int(0),
    };
    // target 0x0ff0 from position 0x1000: offset -16
    let word = insn.encode(0x0ff0, 0x1000).unwrap();
    assert_eq!(decode(word), Executor::Bne { rs1: 10, rs2: 0, offset: -16 });
    assert_eq!(get_imm_b(word), -16);

    let word = SourceInsn::Jal { rd: 1, imm: Immediate::Int(0) }.encode(0x1800, 0x1000).unwrap();
    assert_eq!(decode(word), Executor::Jal { rd: 1, offset: 0x800 });
    assert_eq!(get_imm_j(word), 0x800);
}

#[test]
fn test_encode_decode_u_type() {
    let word = encode(SourceInsn::Lui { rd: 10, imm: Immediate::Int(0) }, 0xfffff);
    assert_eq!(decode(word), Executor::Lui { rd: 10, imm: -1 });
    assert_eq!(get_imm_u(word), -1);

    let word = encode(SourceInsn::Auipc { rd: 4, imm: Immediate::Int(0) }, 0x12345);
    assert_eq!(decode(word), Executor::Auipc { rd: 4, imm: 0x12345 });
}

#[test]
fn test_decode_system_words() {
    assert_eq!(decode(0x0000_0073), Executor::Ecall);
    assert_eq!(decode(0x0010_0073), Executor::Ebreak);
}

#[test]
fn test_unknown_encodings() {
    // all-zero word, bad opcode, and the M-extension funct7 space
    assert_eq!(decode(0), Executor::Unknown { word: 0 });
    assert_eq!(decode(0xffff_ffff), Executor::Unknown { word: 0xffff_ffff });
    let mul = 0x02b5_0533; // mul a0, a0, a1
    assert_eq!(decode(mul), Executor::Unknown { word: mul });
}

#[test]
fn test_disassemble_formats() {
    let word = encode(SourceInsn::RType { funct: RFunct::Add, rd: 10, rs1: 11, rs2: 12 }, 0);
    assert_eq!(disassemble(word), "add a0, a1, a2");

    let insn = SourceInsn::Load { funct: LoadFunct::Lw, rd: 10, rs1: 2, imm: Immediate::Int(0) };
    assert_eq!(disassemble(encode(insn, 8)), "lw a0, 8(sp)");

    let insn = SourceInsn::Store { funct: StoreFunct::Sw, rs1: 8, rs2: 9, imm: Immediate::Int(0) };
    assert_eq!(disassemble(encode(insn, (-4i32) as u32)), "sw s1, -4(s0)");

    assert_eq!(disassemble(0x0000_0073), "ecall");
}

#[test]
fn test_disassemble_unknown_renders_as_hex() {
    assert_eq!(disassemble(0), "0x00000000");
    assert_eq!(disassemble(0x02b5_0533), "0x02b50533");
}

fn text_words(source: &str) -> Vec<u32> {
    let image = build_one(source).unwrap();
    let bytes = &image.section(SectionKind::Text).bytes;
    bytes
        .chunks_exact(4)
        .map(|chunk| u32::from_le_bytes(chunk.try_into().unwrap()))
        .collect()
}

#[test]
fn test_disassemble_reassemble_round_trip() {
    // assemble a representative program, then feed each word's
    // disassembly back through the assembler and demand the same word
    let source = "\
.globl main
main:
  add a0, a1, a2
  sub t0, t1, t2
  sltu s1, s2, s3
  addi a0, a0, -5
  andi t3, t4, 0x7f
  slli a1, a1, 9
  srai a2, a2, 31
  lw a0, 8(sp)
  lbu a3, -1(a4)
  sw s1, -4(s0)
  sh t5, 6(t6)
  beq a0, a1, main
  bne a5, zero, main
  bltu s4, s5, main
  jal ra, main
  jal zero, main
  jalr ra, t0, -3
  lui a0, 0xfffff
  lui t2, 1
  auipc s0, 0x12345
  ecall
  ebreak
";
    for word in text_words(source) {
        let line = disassemble(word);
        let single = format!(".globl main\nmain:\n  {}\n", line);
        let words = text_words(&single);
        assert_eq!(words.len(), 1, "\"{}\" expanded unexpectedly", line);
        assert_eq!(
            words[0], word,
            "\"{}\" reassembled to 0x{:08x}, expected 0x{:08x}",
            line, words[0], word
        );
    }
}
