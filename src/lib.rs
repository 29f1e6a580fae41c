//! # Replay calculator engine
//!
//! The engine keeps every entered operand and operator in an ordered log
//! and replays the whole log on demand into three things: the numeric
//! result, a flag telling whether a binary operation is still waiting for
//! its second operand, and a human-readable infix description of the
//! expression so far, e.g. `√(7 + 9) + 2`.
//!
//! Evaluation is calculator-style rather than precedence-based: each new
//! binary operator immediately resolves the previous pending one, so
//! `7 + 9 × 2` is `(7 + 9) × 2 = 32`. Unary operations wrap the operand
//! they apply to in parentheses (`√(9)`, `(3)²`), and a number typed right
//! after `=` starts a fresh expression.
//!
//! Operator tokens come from a fixed catalogue:
//! `π`, `e`, `√`, `cos`, `sin`, `x²`, `x³`, `+`, `-`, `×`, `÷`, `±`, `=`,
//! `0～1` (random), `%`, and `C` (reset). Unknown tokens are ignored.
//! Operands are either literal numbers or named variables; variables are
//! resolved when the log is evaluated, against a map supplied by the
//! caller, and unbound names count as `0`.
//!
//! The log serializes to an index-keyed `serde_json::Value` and back.
//! Decoding is best-effort: entries whose label is not in the catalogue
//! are dropped instead of failing the whole decode.
//!
//! ```
//! use tapecalc::model::CalcModel;
//!
//! let mut model = CalcModel::new();
//! model.set_operand(7.0);
//! model.perform_operation("+");
//! model.set_operand(9.0);
//! model.perform_operation("=");
//! model.perform_operation("√");
//!
//! let eval = model.evaluate(None);
//! assert_eq!(eval.result, 4.0);
//! assert_eq!(eval.description, "√(7 + 9)");
//! assert!(!eval.is_pending);
//! ```

pub mod errors;
pub mod model;
pub mod ops;
pub mod value;
