//! Operator codes carried as parameters by the flag and variable opcodes.

/// `SET` operation on a flag bit.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitOp {
    Clear = 0,
    Set = 1,
    Flip = 7,
}

impl TryFrom<u8> for BitOp {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(BitOp::Clear),
            1 => Ok(BitOp::Set),
            7 => Ok(BitOp::Flip),
            other => Err(other),
        }
    }
}

/// `CMP` relation between a variable and a literal.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq = 0,
    Gt = 1,
    Ge = 2,
    Lt = 3,
    Le = 4,
    Ne = 5,
    /// Bitwise AND is nonzero.
    And = 6,
}

impl CompareOp {
    /// Apply the relation as `lhs <op> rhs`.
    pub fn test(self, lhs: i16, rhs: i16) -> bool {
        match self {
            CompareOp::Eq => lhs == rhs,
            CompareOp::Gt => lhs > rhs,
            CompareOp::Ge => lhs >= rhs,
            CompareOp::Lt => lhs < rhs,
            CompareOp::Le => lhs <= rhs,
            CompareOp::Ne => lhs != rhs,
            CompareOp::And => lhs & rhs != 0,
        }
    }
}

impl TryFrom<u8> for CompareOp {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(CompareOp::Eq),
            1 => Ok(CompareOp::Gt),
            2 => Ok(CompareOp::Ge),
            3 => Ok(CompareOp::Lt),
            4 => Ok(CompareOp::Le),
            5 => Ok(CompareOp::Ne),
            6 => Ok(CompareOp::And),
            other => Err(other),
        }
    }
}

/// `CALC` / `CALC2` arithmetic applied as `var = var <op> operand`.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CalcOp {
    Add = 0,
    Sub = 1,
    Mul = 2,
    Div = 3,
    Mod = 4,
    Or = 5,
    And = 6,
    Xor = 7,
    /// Bitwise NOT of the variable; the operand is ignored.
    Not = 8,
    Shl = 9,
    /// Logical shift right.
    Shr = 10,
    /// Arithmetic shift right.
    Sar = 11,
}

impl CalcOp {
    /// True for the operators that fail on a zero operand.
    pub fn divides(self) -> bool {
        matches!(self, CalcOp::Div | CalcOp::Mod)
    }
}

impl TryFrom<u8> for CalcOp {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(CalcOp::Add),
            1 => Ok(CalcOp::Sub),
            2 => Ok(CalcOp::Mul),
            3 => Ok(CalcOp::Div),
            4 => Ok(CalcOp::Mod),
            5 => Ok(CalcOp::Or),
            6 => Ok(CalcOp::And),
            7 => Ok(CalcOp::Xor),
            8 => Ok(CalcOp::Not),
            9 => Ok(CalcOp::Shl),
            10 => Ok(CalcOp::Shr),
            11 => Ok(CalcOp::Sar),
            other => Err(other),
        }
    }
}
