use rand::Rng;
use std::fmt;

/// Operands are drawn from `0..OPERAND_RANGE`.
pub const OPERAND_RANGE: i32 = 30;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Operator {
    Plus,
    Minus,
}

/// An arithmetic gate the player answers to open a door. The larger operand always comes first,
/// so answers are never negative.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Expression {
    operand_a: i32,
    operand_b: i32,
    operator: Operator,
}

impl Expression {
    pub fn new(operand_a: i32, operand_b: i32, operator: Operator) -> Expression {
        let (operand_a, operand_b) = if operand_a < operand_b {
            (operand_b, operand_a)
        } else {
            (operand_a, operand_b)
        };
        Expression {
            operand_a,
            operand_b,
            operator,
        }
    }

    pub fn generate<R: Rng>(rng: &mut R) -> Expression {
        let operand_a = rng.gen_range(0..OPERAND_RANGE);
        let operand_b = rng.gen_range(0..OPERAND_RANGE);
        let operator = if rng.gen::<bool>() { Operator::Plus } else { Operator::Minus };
        Expression::new(operand_a, operand_b, operator)
    }

    #[inline]
    pub fn operands(&self) -> (i32, i32) {
        (self.operand_a, self.operand_b)
    }

    #[inline]
    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn expected_result(&self) -> i32 {
        match self.operator {
            Operator::Plus => self.operand_a + self.operand_b,
            Operator::Minus => self.operand_a - self.operand_b,
        }
    }

    pub fn is_result_correct(&self, result: i32) -> bool {
        result == self.expected_result()
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Operator::Plus => write!(f, "+"),
            Operator::Minus => write!(f, "-"),
        }
    }
}

/// The question as shown to the player, e.g. `"12 +  7 = "`.
impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:2} {} {:2} = ", self.operand_a, self.operator, self.operand_b)
    }
}
