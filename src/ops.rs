use std::f64::consts;

use lazy_static::lazy_static;

// the power labels render after the operand: (7)², (7)³
pub(crate) const POWER_OF_2: &str = "\u{00B2}";
pub(crate) const POWER_OF_3: &str = "\u{00B3}";

/// Where a unary operation's label goes relative to its parenthesized
/// operand in the description.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Fixity {
    Prefix,
    Postfix,
}

/// Executable behavior of a catalogue operation. Function-bearing kinds
/// hold plain function pointers, which keeps the catalogue shareable
/// without synchronization.
#[derive(Clone, Copy)]
pub enum OpKind {
    Constant(f64),
    Unary(fn(f64) -> f64, Fixity),
    Binary(fn(f64, f64) -> f64),
    ZeroArg(fn() -> f64),
    Percent,
    Equals,
    Reset,
}

/// One catalogue operation: the keypad token it is entered as, the label
/// used in descriptions and in the persisted log, and its behavior.
/// Tokens and labels coincide for everything except the power operations
/// (token `x²`, label `²`).
pub struct Operation {
    pub token: &'static str,
    pub label: &'static str,
    pub kind: OpKind,
}

fn random_unit() -> f64 {
    let mut buf = [0u8; 8];
    if getrandom::getrandom(&mut buf).is_err() {
        return 0.0;
    }
    // 53 random bits make a uniform f64 in [0, 1)
    (u64::from_le_bytes(buf) >> 11) as f64 / (1u64 << 53) as f64
}

lazy_static! {
    /// The full operation catalogue. Built once, read-only afterwards,
    /// shared by every log instance.
    pub static ref OPERATIONS: Vec<Operation> = vec![
        Operation { token: "π", label: "π", kind: OpKind::Constant(consts::PI) },
        Operation { token: "e", label: "e", kind: OpKind::Constant(consts::E) },
        Operation { token: "√", label: "√", kind: OpKind::Unary(f64::sqrt, Fixity::Prefix) },
        Operation { token: "cos", label: "cos", kind: OpKind::Unary(f64::cos, Fixity::Prefix) },
        Operation { token: "sin", label: "sin", kind: OpKind::Unary(f64::sin, Fixity::Prefix) },
        Operation { token: "x²", label: POWER_OF_2, kind: OpKind::Unary(|x| x * x, Fixity::Postfix) },
        Operation { token: "x³", label: POWER_OF_3, kind: OpKind::Unary(|x| x * x * x, Fixity::Postfix) },
        Operation { token: "+", label: "+", kind: OpKind::Binary(|a, b| a + b) },
        Operation { token: "-", label: "-", kind: OpKind::Binary(|a, b| a - b) },
        Operation { token: "×", label: "×", kind: OpKind::Binary(|a, b| a * b) },
        Operation { token: "÷", label: "÷", kind: OpKind::Binary(|a, b| a / b) },
        Operation { token: "±", label: "±", kind: OpKind::Unary(|x| -x, Fixity::Prefix) },
        Operation { token: "=", label: "=", kind: OpKind::Equals },
        Operation { token: "0～1", label: "0～1", kind: OpKind::ZeroArg(random_unit) },
        Operation { token: "%", label: "%", kind: OpKind::Percent },
        Operation { token: "C", label: "C", kind: OpKind::Reset },
    ];
}

/// Looks up an operation by its keypad token.
pub fn by_token(token: &str) -> Option<&'static Operation> {
    OPERATIONS.iter().find(|op| op.token == token)
}

/// Looks up an operation by its display label. Labels are unique, so a
/// persisted entry resolves back to exactly one operation.
pub fn by_label(label: &str) -> Option<&'static Operation> {
    OPERATIONS.iter().find(|op| op.label == label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_lookup() {
        assert!(by_token("+").is_some());
        assert!(by_token("0～1").is_some());
        assert!(by_token("cbrt").is_none());
        assert!(by_token("").is_none());
    }

    #[test]
    fn test_power_token_differs_from_label() {
        let square = by_token("x²").unwrap();
        assert_eq!(square.label, "²");
        assert!(matches!(square.kind, OpKind::Unary(_, Fixity::Postfix)));
        // label lookup resolves the superscript form
        assert!(by_label("²").is_some());
        assert!(by_label("x²").is_none());
    }

    #[test]
    fn test_labels_are_unique() {
        for op in OPERATIONS.iter() {
            let count = OPERATIONS.iter().filter(|o| o.label == op.label).count();
            assert_eq!(count, 1, "duplicate label {}", op.label);
        }
    }

    #[test]
    fn test_constants() {
        let pi = by_token("π").unwrap();
        match pi.kind {
            OpKind::Constant(value) => assert_eq!(value, consts::PI),
            _ => panic!("π is not a constant"),
        }
    }

    #[test]
    fn test_random_unit_range() {
        for _ in 0..100 {
            let r = random_unit();
            assert!((0.0..1.0).contains(&r));
        }
    }
}
