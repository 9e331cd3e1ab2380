//! The flat instruction registry.
//!
//! A single table of `(name, opcode, mask, handler)` entries; the dispatch
//! table is built from it, and the disassembler resolves names against it.
//! A word `w` encodes an instruction iff `w & mask == opcode`.

use crate::core::dispatch::InsnFunc;
use crate::isa::exec;
use crate::isa::opcodes::*;

/// One registered instruction.
pub struct InsnDesc {
    /// Mnemonic, used for diagnostics.
    pub name: &'static str,
    /// Encoding bits that identify the instruction under `mask`.
    pub opcode: u32,
    /// Bits of the encoding that are significant for the match.
    pub mask: u32,
    /// Semantic handler.
    pub func: InsnFunc,
}

macro_rules! insn {
    ($name:literal, $opcode:expr, $mask:expr, $func:path) => {
        InsnDesc {
            name: $name,
            opcode: $opcode,
            mask: $mask,
            func: $func,
        }
    };
}

/// Every instruction the simulator implements.
pub static REGISTRY: &[InsnDesc] = &[
    insn!("lui", MATCH_LUI, MASK_OP, exec::lui),
    insn!("auipc", MATCH_AUIPC, MASK_OP, exec::auipc),
    insn!("jal", MATCH_JAL, MASK_OP, exec::jal),
    insn!("jalr", MATCH_JALR, MASK_F3, exec::jalr),
    insn!("beq", MATCH_BEQ, MASK_F3, exec::beq),
    insn!("bne", MATCH_BNE, MASK_F3, exec::bne),
    insn!("blt", MATCH_BLT, MASK_F3, exec::blt),
    insn!("bge", MATCH_BGE, MASK_F3, exec::bge),
    insn!("bltu", MATCH_BLTU, MASK_F3, exec::bltu),
    insn!("bgeu", MATCH_BGEU, MASK_F3, exec::bgeu),
    insn!("lb", MATCH_LB, MASK_F3, exec::lb),
    insn!("lh", MATCH_LH, MASK_F3, exec::lh),
    insn!("lw", MATCH_LW, MASK_F3, exec::lw),
    insn!("ld", MATCH_LD, MASK_F3, exec::ld),
    insn!("lbu", MATCH_LBU, MASK_F3, exec::lbu),
    insn!("lhu", MATCH_LHU, MASK_F3, exec::lhu),
    insn!("lwu", MATCH_LWU, MASK_F3, exec::lwu),
    insn!("sb", MATCH_SB, MASK_F3, exec::sb),
    insn!("sh", MATCH_SH, MASK_F3, exec::sh),
    insn!("sw", MATCH_SW, MASK_F3, exec::sw),
    insn!("sd", MATCH_SD, MASK_F3, exec::sd),
    insn!("addi", MATCH_ADDI, MASK_F3, exec::addi),
    insn!("slti", MATCH_SLTI, MASK_F3, exec::slti),
    insn!("sltiu", MATCH_SLTIU, MASK_F3, exec::sltiu),
    insn!("xori", MATCH_XORI, MASK_F3, exec::xori),
    insn!("ori", MATCH_ORI, MASK_F3, exec::ori),
    insn!("andi", MATCH_ANDI, MASK_F3, exec::andi),
    insn!("slli", MATCH_SLLI, MASK_SHIFT64, exec::slli),
    insn!("srli", MATCH_SRLI, MASK_SHIFT64, exec::srli),
    insn!("srai", MATCH_SRAI, MASK_SHIFT64, exec::srai),
    insn!("addiw", MATCH_ADDIW, MASK_F3, exec::addiw),
    insn!("slliw", MATCH_SLLIW, MASK_F7, exec::slliw),
    insn!("srliw", MATCH_SRLIW, MASK_F7, exec::srliw),
    insn!("sraiw", MATCH_SRAIW, MASK_F7, exec::sraiw),
    insn!("add", MATCH_ADD, MASK_F7, exec::add),
    insn!("sub", MATCH_SUB, MASK_F7, exec::sub),
    insn!("sll", MATCH_SLL, MASK_F7, exec::sll),
    insn!("slt", MATCH_SLT, MASK_F7, exec::slt),
    insn!("sltu", MATCH_SLTU, MASK_F7, exec::sltu),
    insn!("xor", MATCH_XOR, MASK_F7, exec::xor),
    insn!("srl", MATCH_SRL, MASK_F7, exec::srl),
    insn!("sra", MATCH_SRA, MASK_F7, exec::sra),
    insn!("or", MATCH_OR, MASK_F7, exec::or),
    insn!("and", MATCH_AND, MASK_F7, exec::and),
    insn!("addw", MATCH_ADDW, MASK_F7, exec::addw),
    insn!("subw", MATCH_SUBW, MASK_F7, exec::subw),
    insn!("sllw", MATCH_SLLW, MASK_F7, exec::sllw),
    insn!("srlw", MATCH_SRLW, MASK_F7, exec::srlw),
    insn!("sraw", MATCH_SRAW, MASK_F7, exec::sraw),
    insn!("mul", MATCH_MUL, MASK_F7, exec::mul),
    insn!("div", MATCH_DIV, MASK_F7, exec::div),
    insn!("divu", MATCH_DIVU, MASK_F7, exec::divu),
    insn!("rem", MATCH_REM, MASK_F7, exec::rem),
    insn!("remu", MATCH_REMU, MASK_F7, exec::remu),
    insn!("mulw", MATCH_MULW, MASK_F7, exec::mulw),
    insn!("fence", MATCH_FENCE, MASK_F3, exec::fence),
    insn!("fence.i", MATCH_FENCE_I, MASK_F3, exec::fence_i),
    insn!("syscall", MATCH_SYSCALL, MASK_FULL, exec::syscall),
    insn!("break", MATCH_BREAK, MASK_FULL, exec::break_),
    insn!("eret", MATCH_ERET, MASK_FULL, exec::eret),
    insn!("mtpcr", MATCH_MTPCR, MASK_F3, exec::mtpcr),
    insn!("mfpcr", MATCH_MFPCR, MASK_F3, exec::mfpcr),
    insn!("mffsr", MATCH_MFFSR, MASK_F3, exec::mffsr),
    insn!("mtfsr", MATCH_MTFSR, MASK_F3, exec::mtfsr),
    insn!("flw", MATCH_FLW, MASK_F3, exec::flw),
    insn!("fld", MATCH_FLD, MASK_F3, exec::fld),
    insn!("fsw", MATCH_FSW, MASK_F3, exec::fsw),
    insn!("fsd", MATCH_FSD, MASK_F3, exec::fsd),
    insn!("fadd.d", MATCH_FADD_D, MASK_FP_RM, exec::fadd_d),
    insn!("fsub.d", MATCH_FSUB_D, MASK_FP_RM, exec::fsub_d),
    insn!("fmul.d", MATCH_FMUL_D, MASK_FP_RM, exec::fmul_d),
    insn!("fmv.x.d", MATCH_FMV_X_D, MASK_FP_MV, exec::fmv_x_d),
    insn!("fmv.d.x", MATCH_FMV_D_X, MASK_FP_MV, exec::fmv_d_x),
    insn!("vsetcfg", MATCH_VSETCFG, MASK_F3, exec::vsetcfg),
    insn!("vsetvl", MATCH_VSETVL, MASK_F3, exec::vsetvl),
    insn!("utidx", MATCH_UTIDX, MASK_F3, exec::utidx),
    insn!("stop", MATCH_STOP, MASK_FULL, exec::stop),
    insn!("vmvv", MATCH_VMVV, MASK_F3, exec::vmvv),
    insn!("vfmvv", MATCH_VFMVV, MASK_F3, exec::vfmvv),
];
