//! Arithmetic Logic Unit (ALU).
//!
//! This module implements the integer datapath shared by every hart. It provides:
//! 1. **Base Operations:** Add, subtract, shifts, comparisons and bitwise logic (RV32I/RV64I).
//! 2. **Multiply/Divide:** The full M-extension family, including the RISC-V
//!    division-by-zero and overflow results.
//! 3. **Atomic Read-Modify-Write:** The combine step of A-extension AMOs.
//!
//! With `is32` set an operation works on the low 32 bits of its operands and
//! sign-extends the result from bit 31. RV64 uses this for the `*W` forms and
//! RV32 for everything; the hart truncates to XLEN afterwards.

/// Integer operation selected by the decoder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AluOp {
    /// Wrapping addition.
    Add,
    /// Wrapping subtraction.
    Sub,
    /// Shift left logical.
    Sll,
    /// Set if less than, signed.
    Slt,
    /// Set if less than, unsigned.
    Sltu,
    /// Exclusive or.
    Xor,
    /// Shift right logical.
    Srl,
    /// Shift right arithmetic.
    Sra,
    /// Inclusive or.
    Or,
    /// And.
    And,
    /// Low half of the product.
    Mul,
    /// High half of signed x signed.
    Mulh,
    /// High half of signed x unsigned.
    Mulhsu,
    /// High half of unsigned x unsigned.
    Mulhu,
    /// Signed division, rounding towards zero.
    Div,
    /// Unsigned division.
    Divu,
    /// Signed remainder.
    Rem,
    /// Unsigned remainder.
    Remu,
}

/// Combine step of an atomic memory operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AmoOp {
    /// Store the register value.
    Swap,
    /// Wrapping addition.
    Add,
    /// Exclusive or.
    Xor,
    /// And.
    And,
    /// Inclusive or.
    Or,
    /// Signed minimum.
    Min,
    /// Signed maximum.
    Max,
    /// Unsigned minimum.
    Minu,
    /// Unsigned maximum.
    Maxu,
}

const WORD_BITS: u32 = 32;
const DOUBLE_BITS: u32 = 64;

/// Executes an integer ALU operation.
///
/// # Arguments
///
/// * `op`   - The operation to perform.
/// * `a`    - First operand.
/// * `b`    - Second operand, or the shift amount.
/// * `is32` - Operate on 32-bit words and sign-extend the result.
///
/// # Returns
///
/// The 64-bit result. Word results are sign-extended from bit 31.
///
/// # Examples
///
/// ```
/// use hammer_core::core::units::alu::{AluOp, execute};
///
/// assert_eq!(execute(AluOp::Add, 42, 8, false), 50);
/// assert_eq!(execute(AluOp::Add, 0x7FFF_FFFF, 1, true), 0xFFFF_FFFF_8000_0000);
/// assert_eq!(execute(AluOp::Divu, 100, 0, false), u64::MAX);
/// ```
pub fn execute(op: AluOp, a: u64, b: u64, is32: bool) -> u64 {
    if is32 {
        execute_word(op, a as u32, b as u32) as i32 as i64 as u64
    } else {
        execute_double(op, a, b)
    }
}

fn execute_word(op: AluOp, a: u32, b: u32) -> u32 {
    let sa = a as i32;
    let sb = b as i32;
    let shamt = b & (WORD_BITS - 1);
    match op {
        AluOp::Add => a.wrapping_add(b),
        AluOp::Sub => a.wrapping_sub(b),
        AluOp::Sll => a << shamt,
        AluOp::Slt => u32::from(sa < sb),
        AluOp::Sltu => u32::from(a < b),
        AluOp::Xor => a ^ b,
        AluOp::Srl => a >> shamt,
        AluOp::Sra => (sa >> shamt) as u32,
        AluOp::Or => a | b,
        AluOp::And => a & b,
        AluOp::Mul => a.wrapping_mul(b),
        AluOp::Mulh => ((i64::from(sa) * i64::from(sb)) >> WORD_BITS) as u32,
        AluOp::Mulhsu => ((i64::from(sa) * i64::from(b)) >> WORD_BITS) as u32,
        AluOp::Mulhu => ((u64::from(a) * u64::from(b)) >> WORD_BITS) as u32,
        AluOp::Div => {
            if sb == 0 {
                u32::MAX
            } else {
                sa.wrapping_div(sb) as u32
            }
        }
        AluOp::Divu => a.checked_div(b).unwrap_or(u32::MAX),
        AluOp::Rem => {
            if sb == 0 {
                a
            } else {
                sa.wrapping_rem(sb) as u32
            }
        }
        AluOp::Remu => a.checked_rem(b).unwrap_or(a),
    }
}

fn execute_double(op: AluOp, a: u64, b: u64) -> u64 {
    let sa = a as i64;
    let sb = b as i64;
    let shamt = (b as u32) & (DOUBLE_BITS - 1);
    match op {
        AluOp::Add => a.wrapping_add(b),
        AluOp::Sub => a.wrapping_sub(b),
        AluOp::Sll => a << shamt,
        AluOp::Slt => u64::from(sa < sb),
        AluOp::Sltu => u64::from(a < b),
        AluOp::Xor => a ^ b,
        AluOp::Srl => a >> shamt,
        AluOp::Sra => (sa >> shamt) as u64,
        AluOp::Or => a | b,
        AluOp::And => a & b,
        AluOp::Mul => a.wrapping_mul(b),
        AluOp::Mulh => ((i128::from(sa) * i128::from(sb)) >> DOUBLE_BITS) as u64,
        AluOp::Mulhsu => ((i128::from(sa) * i128::from(b)) >> DOUBLE_BITS) as u64,
        AluOp::Mulhu => ((u128::from(a) * u128::from(b)) >> DOUBLE_BITS) as u64,
        AluOp::Div => {
            if sb == 0 {
                u64::MAX
            } else {
                sa.wrapping_div(sb) as u64
            }
        }
        AluOp::Divu => a.checked_div(b).unwrap_or(u64::MAX),
        AluOp::Rem => {
            if sb == 0 {
                a
            } else {
                sa.wrapping_rem(sb) as u64
            }
        }
        AluOp::Remu => a.checked_rem(b).unwrap_or(a),
    }
}

/// Computes the value an AMO writes back to memory.
///
/// # Arguments
///
/// * `op`      - The combine operation.
/// * `mem_val` - Value loaded from memory.
/// * `reg_val` - Value of `rs2`.
/// * `word`    - 32-bit (`.W`) operation; comparisons use the low word only.
///
/// # Returns
///
/// The new memory value. For word operations only the low 32 bits are meaningful.
pub fn amo(op: AmoOp, mem_val: u64, reg_val: u64, word: bool) -> u64 {
    if word {
        let (a, b) = (mem_val as u32, reg_val as u32);
        let res = match op {
            AmoOp::Swap => b,
            AmoOp::Add => a.wrapping_add(b),
            AmoOp::Xor => a ^ b,
            AmoOp::And => a & b,
            AmoOp::Or => a | b,
            AmoOp::Min => (a as i32).min(b as i32) as u32,
            AmoOp::Max => (a as i32).max(b as i32) as u32,
            AmoOp::Minu => a.min(b),
            AmoOp::Maxu => a.max(b),
        };
        u64::from(res)
    } else {
        let (a, b) = (mem_val, reg_val);
        match op {
            AmoOp::Swap => b,
            AmoOp::Add => a.wrapping_add(b),
            AmoOp::Xor => a ^ b,
            AmoOp::And => a & b,
            AmoOp::Or => a | b,
            AmoOp::Min => (a as i64).min(b as i64) as u64,
            AmoOp::Max => (a as i64).max(b as i64) as u64,
            AmoOp::Minu => a.min(b),
            AmoOp::Maxu => a.max(b),
        }
    }
}
