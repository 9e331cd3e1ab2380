//! Instruction semantic handlers.
//!
//! Every handler shares the dispatch signature: it receives the processor,
//! the fetched word, and its address, and returns the next program counter
//! or a control-flow signal. Handlers write the architectural state
//! directly; the engine forces `xpr[0]` back to zero after each
//! retirement, so writes to the zero register need no special casing here.

use crate::common::constants::{
    CAUSE_IP_SHIFT, IPI_IRQ, PCR_BADVADDR, PCR_CAUSE, PCR_CLR_IPI, PCR_COMPARE, PCR_COREID,
    PCR_COUNT, PCR_EPC, PCR_EVEC, PCR_FROMHOST, PCR_K0, PCR_K1, PCR_STATUS, PCR_TOHOST,
    PCR_VECBANK, SR_EF, SR_ET, SR_EV, SR_PS, SR_S, TIMER_IRQ,
};
use crate::common::{Insn, Signal, Trap};
use crate::core::Processor;

type R = Result<u64, Signal>;

#[inline(always)]
fn next(insn: Insn, pc: u64) -> u64 {
    pc.wrapping_add(insn.len())
}

#[inline(always)]
fn require_supervisor(p: &Processor) -> Result<(), Signal> {
    if p.state.sr & SR_S == 0 {
        return Err(Trap::PrivilegedInstruction.into());
    }
    Ok(())
}

#[inline(always)]
fn require_fp(p: &Processor) -> Result<(), Signal> {
    if p.state.sr & SR_EF == 0 {
        return Err(Trap::FpDisabled.into());
    }
    Ok(())
}

#[inline(always)]
fn require_vector(p: &Processor) -> Result<(), Signal> {
    if p.state.sr & SR_EV == 0 {
        return Err(Trap::VectorDisabled.into());
    }
    Ok(())
}

// --- upper-immediate and control transfer ---

pub fn lui(p: &mut Processor, insn: Insn, pc: u64) -> R {
    p.state.xpr[insn.rd()] = insn.u_imm() as u64;
    Ok(next(insn, pc))
}

pub fn auipc(p: &mut Processor, insn: Insn, pc: u64) -> R {
    p.state.xpr[insn.rd()] = pc.wrapping_add(insn.u_imm() as u64);
    Ok(next(insn, pc))
}

pub fn jal(p: &mut Processor, insn: Insn, pc: u64) -> R {
    p.state.xpr[insn.rd()] = next(insn, pc);
    Ok(pc.wrapping_add(insn.j_imm() as u64))
}

pub fn jalr(p: &mut Processor, insn: Insn, pc: u64) -> R {
    let link = next(insn, pc);
    let target = p.state.xpr[insn.rs1()].wrapping_add(insn.i_imm() as u64) & !1;
    p.state.xpr[insn.rd()] = link;
    Ok(target)
}

#[inline(always)]
fn branch(insn: Insn, pc: u64, taken: bool) -> R {
    if taken {
        Ok(pc.wrapping_add(insn.b_imm() as u64))
    } else {
        Ok(next(insn, pc))
    }
}

pub fn beq(p: &mut Processor, insn: Insn, pc: u64) -> R {
    let taken = p.state.xpr[insn.rs1()] == p.state.xpr[insn.rs2()];
    branch(insn, pc, taken)
}

pub fn bne(p: &mut Processor, insn: Insn, pc: u64) -> R {
    let taken = p.state.xpr[insn.rs1()] != p.state.xpr[insn.rs2()];
    branch(insn, pc, taken)
}

pub fn blt(p: &mut Processor, insn: Insn, pc: u64) -> R {
    let taken = (p.state.xpr[insn.rs1()] as i64) < (p.state.xpr[insn.rs2()] as i64);
    branch(insn, pc, taken)
}

pub fn bge(p: &mut Processor, insn: Insn, pc: u64) -> R {
    let taken = (p.state.xpr[insn.rs1()] as i64) >= (p.state.xpr[insn.rs2()] as i64);
    branch(insn, pc, taken)
}

pub fn bltu(p: &mut Processor, insn: Insn, pc: u64) -> R {
    let taken = p.state.xpr[insn.rs1()] < p.state.xpr[insn.rs2()];
    branch(insn, pc, taken)
}

pub fn bgeu(p: &mut Processor, insn: Insn, pc: u64) -> R {
    let taken = p.state.xpr[insn.rs1()] >= p.state.xpr[insn.rs2()];
    branch(insn, pc, taken)
}

// --- loads and stores ---

#[inline(always)]
fn mem_addr(p: &Processor, insn: Insn, imm: i64) -> u64 {
    p.state.xpr[insn.rs1()].wrapping_add(imm as u64)
}

pub fn lb(p: &mut Processor, insn: Insn, pc: u64) -> R {
    let addr = mem_addr(p, insn, insn.i_imm());
    p.state.xpr[insn.rd()] = p.mmu.load_u8(addr)? as i8 as i64 as u64;
    Ok(next(insn, pc))
}

pub fn lh(p: &mut Processor, insn: Insn, pc: u64) -> R {
    let addr = mem_addr(p, insn, insn.i_imm());
    p.state.xpr[insn.rd()] = p.mmu.load_u16(addr)? as i16 as i64 as u64;
    Ok(next(insn, pc))
}

pub fn lw(p: &mut Processor, insn: Insn, pc: u64) -> R {
    let addr = mem_addr(p, insn, insn.i_imm());
    p.state.xpr[insn.rd()] = p.mmu.load_u32(addr)? as i32 as i64 as u64;
    Ok(next(insn, pc))
}

pub fn ld(p: &mut Processor, insn: Insn, pc: u64) -> R {
    let addr = mem_addr(p, insn, insn.i_imm());
    p.state.xpr[insn.rd()] = p.mmu.load_u64(addr)?;
    Ok(next(insn, pc))
}

pub fn lbu(p: &mut Processor, insn: Insn, pc: u64) -> R {
    let addr = mem_addr(p, insn, insn.i_imm());
    p.state.xpr[insn.rd()] = p.mmu.load_u8(addr)? as u64;
    Ok(next(insn, pc))
}

pub fn lhu(p: &mut Processor, insn: Insn, pc: u64) -> R {
    let addr = mem_addr(p, insn, insn.i_imm());
    p.state.xpr[insn.rd()] = p.mmu.load_u16(addr)? as u64;
    Ok(next(insn, pc))
}

pub fn lwu(p: &mut Processor, insn: Insn, pc: u64) -> R {
    let addr = mem_addr(p, insn, insn.i_imm());
    p.state.xpr[insn.rd()] = p.mmu.load_u32(addr)? as u64;
    Ok(next(insn, pc))
}

pub fn sb(p: &mut Processor, insn: Insn, pc: u64) -> R {
    let addr = mem_addr(p, insn, insn.s_imm());
    p.mmu.store_u8(addr, p.state.xpr[insn.rs2()] as u8)?;
    Ok(next(insn, pc))
}

pub fn sh(p: &mut Processor, insn: Insn, pc: u64) -> R {
    let addr = mem_addr(p, insn, insn.s_imm());
    p.mmu.store_u16(addr, p.state.xpr[insn.rs2()] as u16)?;
    Ok(next(insn, pc))
}

pub fn sw(p: &mut Processor, insn: Insn, pc: u64) -> R {
    let addr = mem_addr(p, insn, insn.s_imm());
    p.mmu.store_u32(addr, p.state.xpr[insn.rs2()] as u32)?;
    Ok(next(insn, pc))
}

pub fn sd(p: &mut Processor, insn: Insn, pc: u64) -> R {
    let addr = mem_addr(p, insn, insn.s_imm());
    p.mmu.store_u64(addr, p.state.xpr[insn.rs2()])?;
    Ok(next(insn, pc))
}

// --- integer computation ---

pub fn addi(p: &mut Processor, insn: Insn, pc: u64) -> R {
    p.state.xpr[insn.rd()] = p.state.xpr[insn.rs1()].wrapping_add(insn.i_imm() as u64);
    Ok(next(insn, pc))
}

pub fn slti(p: &mut Processor, insn: Insn, pc: u64) -> R {
    p.state.xpr[insn.rd()] = ((p.state.xpr[insn.rs1()] as i64) < insn.i_imm()) as u64;
    Ok(next(insn, pc))
}

pub fn sltiu(p: &mut Processor, insn: Insn, pc: u64) -> R {
    p.state.xpr[insn.rd()] = (p.state.xpr[insn.rs1()] < insn.i_imm() as u64) as u64;
    Ok(next(insn, pc))
}

pub fn xori(p: &mut Processor, insn: Insn, pc: u64) -> R {
    p.state.xpr[insn.rd()] = p.state.xpr[insn.rs1()] ^ insn.i_imm() as u64;
    Ok(next(insn, pc))
}

pub fn ori(p: &mut Processor, insn: Insn, pc: u64) -> R {
    p.state.xpr[insn.rd()] = p.state.xpr[insn.rs1()] | insn.i_imm() as u64;
    Ok(next(insn, pc))
}

pub fn andi(p: &mut Processor, insn: Insn, pc: u64) -> R {
    p.state.xpr[insn.rd()] = p.state.xpr[insn.rs1()] & insn.i_imm() as u64;
    Ok(next(insn, pc))
}

pub fn slli(p: &mut Processor, insn: Insn, pc: u64) -> R {
    p.state.xpr[insn.rd()] = p.state.xpr[insn.rs1()] << insn.shamt();
    Ok(next(insn, pc))
}

pub fn srli(p: &mut Processor, insn: Insn, pc: u64) -> R {
    p.state.xpr[insn.rd()] = p.state.xpr[insn.rs1()] >> insn.shamt();
    Ok(next(insn, pc))
}

pub fn srai(p: &mut Processor, insn: Insn, pc: u64) -> R {
    p.state.xpr[insn.rd()] = ((p.state.xpr[insn.rs1()] as i64) >> insn.shamt()) as u64;
    Ok(next(insn, pc))
}

pub fn addiw(p: &mut Processor, insn: Insn, pc: u64) -> R {
    let v = p.state.xpr[insn.rs1()].wrapping_add(insn.i_imm() as u64);
    p.state.xpr[insn.rd()] = v as i32 as i64 as u64;
    Ok(next(insn, pc))
}

pub fn slliw(p: &mut Processor, insn: Insn, pc: u64) -> R {
    let v = (p.state.xpr[insn.rs1()] as u32) << insn.shamt_w();
    p.state.xpr[insn.rd()] = v as i32 as i64 as u64;
    Ok(next(insn, pc))
}

pub fn srliw(p: &mut Processor, insn: Insn, pc: u64) -> R {
    let v = (p.state.xpr[insn.rs1()] as u32) >> insn.shamt_w();
    p.state.xpr[insn.rd()] = v as i32 as i64 as u64;
    Ok(next(insn, pc))
}

pub fn sraiw(p: &mut Processor, insn: Insn, pc: u64) -> R {
    let v = (p.state.xpr[insn.rs1()] as i32) >> insn.shamt_w();
    p.state.xpr[insn.rd()] = v as i64 as u64;
    Ok(next(insn, pc))
}

pub fn add(p: &mut Processor, insn: Insn, pc: u64) -> R {
    p.state.xpr[insn.rd()] =
        p.state.xpr[insn.rs1()].wrapping_add(p.state.xpr[insn.rs2()]);
    Ok(next(insn, pc))
}

pub fn sub(p: &mut Processor, insn: Insn, pc: u64) -> R {
    p.state.xpr[insn.rd()] =
        p.state.xpr[insn.rs1()].wrapping_sub(p.state.xpr[insn.rs2()]);
    Ok(next(insn, pc))
}

pub fn sll(p: &mut Processor, insn: Insn, pc: u64) -> R {
    let sh = p.state.xpr[insn.rs2()] & 0x3f;
    p.state.xpr[insn.rd()] = p.state.xpr[insn.rs1()] << sh;
    Ok(next(insn, pc))
}

pub fn slt(p: &mut Processor, insn: Insn, pc: u64) -> R {
    p.state.xpr[insn.rd()] =
        ((p.state.xpr[insn.rs1()] as i64) < (p.state.xpr[insn.rs2()] as i64)) as u64;
    Ok(next(insn, pc))
}

pub fn sltu(p: &mut Processor, insn: Insn, pc: u64) -> R {
    p.state.xpr[insn.rd()] = (p.state.xpr[insn.rs1()] < p.state.xpr[insn.rs2()]) as u64;
    Ok(next(insn, pc))
}

pub fn xor(p: &mut Processor, insn: Insn, pc: u64) -> R {
    p.state.xpr[insn.rd()] = p.state.xpr[insn.rs1()] ^ p.state.xpr[insn.rs2()];
    Ok(next(insn, pc))
}

pub fn srl(p: &mut Processor, insn: Insn, pc: u64) -> R {
    let sh = p.state.xpr[insn.rs2()] & 0x3f;
    p.state.xpr[insn.rd()] = p.state.xpr[insn.rs1()] >> sh;
    Ok(next(insn, pc))
}

pub fn sra(p: &mut Processor, insn: Insn, pc: u64) -> R {
    let sh = p.state.xpr[insn.rs2()] & 0x3f;
    p.state.xpr[insn.rd()] = ((p.state.xpr[insn.rs1()] as i64) >> sh) as u64;
    Ok(next(insn, pc))
}

pub fn or(p: &mut Processor, insn: Insn, pc: u64) -> R {
    p.state.xpr[insn.rd()] = p.state.xpr[insn.rs1()] | p.state.xpr[insn.rs2()];
    Ok(next(insn, pc))
}

pub fn and(p: &mut Processor, insn: Insn, pc: u64) -> R {
    p.state.xpr[insn.rd()] = p.state.xpr[insn.rs1()] & p.state.xpr[insn.rs2()];
    Ok(next(insn, pc))
}

pub fn addw(p: &mut Processor, insn: Insn, pc: u64) -> R {
    let v = p.state.xpr[insn.rs1()].wrapping_add(p.state.xpr[insn.rs2()]);
    p.state.xpr[insn.rd()] = v as i32 as i64 as u64;
    Ok(next(insn, pc))
}

pub fn subw(p: &mut Processor, insn: Insn, pc: u64) -> R {
    let v = p.state.xpr[insn.rs1()].wrapping_sub(p.state.xpr[insn.rs2()]);
    p.state.xpr[insn.rd()] = v as i32 as i64 as u64;
    Ok(next(insn, pc))
}

pub fn sllw(p: &mut Processor, insn: Insn, pc: u64) -> R {
    let sh = p.state.xpr[insn.rs2()] & 0x1f;
    let v = (p.state.xpr[insn.rs1()] as u32) << sh;
    p.state.xpr[insn.rd()] = v as i32 as i64 as u64;
    Ok(next(insn, pc))
}

pub fn srlw(p: &mut Processor, insn: Insn, pc: u64) -> R {
    let sh = p.state.xpr[insn.rs2()] & 0x1f;
    let v = (p.state.xpr[insn.rs1()] as u32) >> sh;
    p.state.xpr[insn.rd()] = v as i32 as i64 as u64;
    Ok(next(insn, pc))
}

pub fn sraw(p: &mut Processor, insn: Insn, pc: u64) -> R {
    let sh = p.state.xpr[insn.rs2()] & 0x1f;
    let v = (p.state.xpr[insn.rs1()] as i32) >> sh;
    p.state.xpr[insn.rd()] = v as i64 as u64;
    Ok(next(insn, pc))
}

pub fn mul(p: &mut Processor, insn: Insn, pc: u64) -> R {
    p.state.xpr[insn.rd()] =
        p.state.xpr[insn.rs1()].wrapping_mul(p.state.xpr[insn.rs2()]);
    Ok(next(insn, pc))
}

pub fn div(p: &mut Processor, insn: Insn, pc: u64) -> R {
    let a = p.state.xpr[insn.rs1()] as i64;
    let b = p.state.xpr[insn.rs2()] as i64;
    p.state.xpr[insn.rd()] = if b == 0 {
        u64::MAX
    } else {
        a.wrapping_div(b) as u64
    };
    Ok(next(insn, pc))
}

pub fn divu(p: &mut Processor, insn: Insn, pc: u64) -> R {
    let a = p.state.xpr[insn.rs1()];
    let b = p.state.xpr[insn.rs2()];
    p.state.xpr[insn.rd()] = if b == 0 { u64::MAX } else { a / b };
    Ok(next(insn, pc))
}

pub fn rem(p: &mut Processor, insn: Insn, pc: u64) -> R {
    let a = p.state.xpr[insn.rs1()] as i64;
    let b = p.state.xpr[insn.rs2()] as i64;
    p.state.xpr[insn.rd()] = if b == 0 {
        a as u64
    } else {
        a.wrapping_rem(b) as u64
    };
    Ok(next(insn, pc))
}

pub fn remu(p: &mut Processor, insn: Insn, pc: u64) -> R {
    let a = p.state.xpr[insn.rs1()];
    let b = p.state.xpr[insn.rs2()];
    p.state.xpr[insn.rd()] = if b == 0 { a } else { a % b };
    Ok(next(insn, pc))
}

pub fn mulw(p: &mut Processor, insn: Insn, pc: u64) -> R {
    let v = p.state.xpr[insn.rs1()].wrapping_mul(p.state.xpr[insn.rs2()]);
    p.state.xpr[insn.rd()] = v as i32 as i64 as u64;
    Ok(next(insn, pc))
}

// --- fences ---

pub fn fence(_p: &mut Processor, insn: Insn, pc: u64) -> R {
    Ok(next(insn, pc))
}

pub fn fence_i(_p: &mut Processor, insn: Insn, pc: u64) -> R {
    Ok(next(insn, pc))
}

// --- system ---

pub fn syscall(_p: &mut Processor, _insn: Insn, _pc: u64) -> R {
    Err(Trap::Syscall.into())
}

pub fn break_(_p: &mut Processor, _insn: Insn, _pc: u64) -> R {
    Err(Trap::Breakpoint.into())
}

/// Return from trap: restore the supervisor bit from PS, re-enable traps,
/// and resume at the saved exception PC.
pub fn eret(p: &mut Processor, _insn: Insn, _pc: u64) -> R {
    require_supervisor(p)?;
    let sr = p.state.sr;
    let restored_s = if sr & SR_PS != 0 { SR_S } else { 0 };
    p.set_sr(((sr & !SR_S) | restored_s) | SR_ET);
    Ok(p.state.epc)
}

fn read_pcr(p: &Processor, pcr: u32) -> Result<u64, Signal> {
    Ok(match pcr {
        PCR_STATUS => p.state.sr as u64,
        PCR_EPC => p.state.epc,
        PCR_BADVADDR => p.state.badvaddr,
        PCR_EVEC => p.state.evec,
        PCR_COUNT => p.state.count,
        PCR_COMPARE => p.state.compare,
        PCR_CAUSE => p.state.cause,
        PCR_CLR_IPI => 0,
        PCR_COREID => p.state.id as u64,
        PCR_K0 => p.state.pcr_k0,
        PCR_K1 => p.state.pcr_k1,
        PCR_VECBANK => p.state.vecbanks as u64,
        PCR_TOHOST => p.state.tohost,
        PCR_FROMHOST => p.state.fromhost,
        _ => return Err(Trap::IllegalInstruction.into()),
    })
}

fn write_pcr(p: &mut Processor, pcr: u32, val: u64) -> Result<(), Signal> {
    match pcr {
        PCR_STATUS => p.set_sr(val as u32),
        PCR_EPC => p.state.epc = val,
        PCR_BADVADDR => p.state.badvaddr = val,
        PCR_EVEC => p.state.evec = val,
        PCR_COUNT => p.state.count = val,
        PCR_COMPARE => {
            // Rearming the timer acknowledges a pending timer interrupt.
            p.state.compare = val;
            p.state.cause &= !(1 << (TIMER_IRQ + CAUSE_IP_SHIFT));
        }
        PCR_CAUSE => p.state.cause = val,
        PCR_CLR_IPI => p.state.cause &= !(1 << (IPI_IRQ + CAUSE_IP_SHIFT)),
        PCR_COREID => {}
        PCR_K0 => p.state.pcr_k0 = val,
        PCR_K1 => p.state.pcr_k1 = val,
        PCR_VECBANK => {
            p.state.vecbanks = val as u32 & 0xff;
            p.state.vecbanks_count = (val as u32 & 0xff).count_ones();
        }
        PCR_TOHOST => {
            p.state.tohost = val;
            if val != 0 {
                return Err(Signal::Halt);
            }
        }
        PCR_FROMHOST => p.state.fromhost = val,
        _ => return Err(Trap::IllegalInstruction.into()),
    }
    Ok(())
}

pub fn mfpcr(p: &mut Processor, insn: Insn, pc: u64) -> R {
    require_supervisor(p)?;
    let val = read_pcr(p, insn.pcr())?;
    p.state.xpr[insn.rd()] = val;
    Ok(next(insn, pc))
}

pub fn mtpcr(p: &mut Processor, insn: Insn, pc: u64) -> R {
    require_supervisor(p)?;
    let old = read_pcr(p, insn.pcr())?;
    let val = p.state.xpr[insn.rs1()];
    write_pcr(p, insn.pcr(), val)?;
    p.state.xpr[insn.rd()] = old;
    Ok(next(insn, pc))
}

pub fn mffsr(p: &mut Processor, insn: Insn, pc: u64) -> R {
    require_fp(p)?;
    p.state.xpr[insn.rd()] = p.state.fsr as u64;
    Ok(next(insn, pc))
}

pub fn mtfsr(p: &mut Processor, insn: Insn, pc: u64) -> R {
    require_fp(p)?;
    let old = p.state.fsr;
    let val = p.state.xpr[insn.rs1()] as u32;
    p.set_fsr(val);
    p.state.xpr[insn.rd()] = old as u64;
    Ok(next(insn, pc))
}

// --- floating point ---

pub fn flw(p: &mut Processor, insn: Insn, pc: u64) -> R {
    require_fp(p)?;
    let addr = mem_addr(p, insn, insn.i_imm());
    p.state.fpr[insn.rd()] = p.mmu.load_u32(addr)? as u64;
    Ok(next(insn, pc))
}

pub fn fld(p: &mut Processor, insn: Insn, pc: u64) -> R {
    require_fp(p)?;
    let addr = mem_addr(p, insn, insn.i_imm());
    p.state.fpr[insn.rd()] = p.mmu.load_u64(addr)?;
    Ok(next(insn, pc))
}

pub fn fsw(p: &mut Processor, insn: Insn, pc: u64) -> R {
    require_fp(p)?;
    let addr = mem_addr(p, insn, insn.s_imm());
    p.mmu.store_u32(addr, p.state.fpr[insn.rs2()] as u32)?;
    Ok(next(insn, pc))
}

pub fn fsd(p: &mut Processor, insn: Insn, pc: u64) -> R {
    require_fp(p)?;
    let addr = mem_addr(p, insn, insn.s_imm());
    p.mmu.store_u64(addr, p.state.fpr[insn.rs2()])?;
    Ok(next(insn, pc))
}

#[inline(always)]
fn fp_binop(p: &mut Processor, insn: Insn, op: fn(f64, f64) -> f64) -> Result<(), Signal> {
    require_fp(p)?;
    let a = f64::from_bits(p.state.fpr[insn.rs1()]);
    let b = f64::from_bits(p.state.fpr[insn.rs2()]);
    p.state.fpr[insn.rd()] = op(a, b).to_bits();
    Ok(())
}

pub fn fadd_d(p: &mut Processor, insn: Insn, pc: u64) -> R {
    fp_binop(p, insn, |a, b| a + b)?;
    Ok(next(insn, pc))
}

pub fn fsub_d(p: &mut Processor, insn: Insn, pc: u64) -> R {
    fp_binop(p, insn, |a, b| a - b)?;
    Ok(next(insn, pc))
}

pub fn fmul_d(p: &mut Processor, insn: Insn, pc: u64) -> R {
    fp_binop(p, insn, |a, b| a * b)?;
    Ok(next(insn, pc))
}

pub fn fmv_x_d(p: &mut Processor, insn: Insn, pc: u64) -> R {
    require_fp(p)?;
    p.state.xpr[insn.rd()] = p.state.fpr[insn.rs1()];
    Ok(next(insn, pc))
}

pub fn fmv_d_x(p: &mut Processor, insn: Insn, pc: u64) -> R {
    require_fp(p)?;
    p.state.fpr[insn.rd()] = p.state.xpr[insn.rs1()];
    Ok(next(insn, pc))
}

// --- vector thread ---

/// Reconfigure the micro-thread register partition from the immediate:
/// low six bits give the integer-register allocation, the next six the FP
/// allocation. Recomputes `vlmax`; a partition leaving no elements raises
/// `vector_bank`.
pub fn vsetcfg(p: &mut Processor, insn: Insn, pc: u64) -> R {
    require_vector(p)?;
    let imm = (insn.bits() >> 20) & 0xfff;
    p.state.nxpr_use = imm & 0x3f;
    p.state.nfpr_use = (imm >> 6) & 0x3f;
    p.state.vcfg();
    if p.state.vlmax == 0 {
        return Err(Trap::VectorBank.into());
    }
    Ok(next(insn, pc))
}

pub fn vsetvl(p: &mut Processor, insn: Insn, pc: u64) -> R {
    require_vector(p)?;
    let requested = p.state.xpr[insn.rs1()] as i64;
    let vl = p.state.setvl(requested);
    p.state.xpr[insn.rd()] = vl as u64;
    Ok(next(insn, pc))
}

pub fn utidx(p: &mut Processor, insn: Insn, pc: u64) -> R {
    require_vector(p)?;
    p.state.xpr[insn.rd()] = p.state.utidx as i64 as u64;
    Ok(next(insn, pc))
}

/// End the current vector-thread command stream.
pub fn stop(p: &mut Processor, _insn: Insn, _pc: u64) -> R {
    require_vector(p)?;
    Err(Signal::Stop)
}

/// Broadcast a scalar integer register to the active micro-threads.
pub fn vmvv(p: &mut Processor, insn: Insn, pc: u64) -> R {
    require_vector(p)?;
    let val = p.state.xpr[insn.rs1()];
    let rd = insn.rd();
    let vl = p.state.vl as usize;
    for ut in p.uts.iter_mut().take(vl) {
        ut.state.xpr[rd] = val;
    }
    Ok(next(insn, pc))
}

/// Broadcast a scalar FP register to the active micro-threads.
pub fn vfmvv(p: &mut Processor, insn: Insn, pc: u64) -> R {
    require_vector(p)?;
    require_fp(p)?;
    let val = p.state.fpr[insn.rs1()];
    let rd = insn.rd();
    let vl = p.state.vl as usize;
    for ut in p.uts.iter_mut().take(vl) {
        ut.state.fpr[rd] = val;
    }
    Ok(next(insn, pc))
}
