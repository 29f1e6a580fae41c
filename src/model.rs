use std::collections::HashMap;

use serde_json::{json, Map, Value as Json};

use crate::errors::CalcError;
use crate::ops::{self, Fixity, OpKind};
use crate::value::{format_number, Operand};

/// One recorded step of the calculator session. Behavior-bearing entries
/// keep only the catalogue label; the executable behavior is looked up in
/// the catalogue when the log is replayed, which keeps entries
/// serializable without losing the link back to their semantics.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum LogEntry {
    Constant(String),
    Operand(String, Operand),
    Unary(String),
    Binary(String),
    ZeroArg(String),
    Percent(String),
    Equals(String),
    Reset(String),
}

impl LogEntry {
    fn from_catalogue(op: &ops::Operation) -> LogEntry {
        let label = op.label.to_string();
        match op.kind {
            OpKind::Constant(_) => LogEntry::Constant(label),
            OpKind::Unary(..) => LogEntry::Unary(label),
            OpKind::Binary(_) => LogEntry::Binary(label),
            OpKind::ZeroArg(_) => LogEntry::ZeroArg(label),
            OpKind::Percent => LogEntry::Percent(label),
            OpKind::Equals => LogEntry::Equals(label),
            OpKind::Reset => LogEntry::Reset(label),
        }
    }

    fn tag(&self) -> &'static str {
        match self {
            LogEntry::Constant(_) => "Constant",
            LogEntry::Operand(..) => "Operand",
            LogEntry::Unary(_) => "UnaryOperation",
            LogEntry::Binary(_) => "BinaryOperation",
            LogEntry::ZeroArg(_) => "ZeroArgOperation",
            LogEntry::Percent(_) => "PercentOperation",
            LogEntry::Equals(_) => "Equals",
            LogEntry::Reset(_) => "Reset",
        }
    }

    fn encode(&self) -> Json {
        let tag = self.tag();
        match self {
            LogEntry::Operand(label, operand) => {
                let payload = match operand {
                    Operand::Number(n) => json!({ "Number": n }),
                    Operand::Variable(name) => json!({ "Variable": name }),
                };
                json!({ tag: { "description": label, "operand": payload } })
            }
            LogEntry::Constant(label)
            | LogEntry::Unary(label)
            | LogEntry::Binary(label)
            | LogEntry::ZeroArg(label)
            | LogEntry::Percent(label)
            | LogEntry::Equals(label)
            | LogEntry::Reset(label) => json!({ tag: label }),
        }
    }

    // None drops the entry: unknown tag, label missing from the
    // catalogue, or label bound to a different kind than the tag claims
    fn decode(encoded: &Json) -> Option<LogEntry> {
        let map = encoded.as_object()?;
        if map.len() != 1 {
            return None;
        }
        let (tag, payload) = map.iter().next()?;
        match tag.as_str() {
            "Constant" | "UnaryOperation" | "BinaryOperation" | "ZeroArgOperation"
            | "PercentOperation" => {
                let op = ops::by_label(payload.as_str()?)?;
                let entry = LogEntry::from_catalogue(op);
                if entry.tag() == tag {
                    Some(entry)
                } else {
                    None
                }
            }
            "Operand" => {
                let obj = payload.as_object()?;
                let label = obj.get("description")?.as_str()?;
                let operand = obj.get("operand")?.as_object()?;
                let operand = if let Some(number) = operand.get("Number") {
                    Operand::Number(number.as_f64()?)
                } else {
                    Operand::Variable(operand.get("Variable")?.as_str()?.to_string())
                };
                Some(LogEntry::Operand(label.to_string(), operand))
            }
            "Equals" => Some(LogEntry::Equals(payload.as_str()?.to_string())),
            "Reset" => Some(LogEntry::Reset(payload.as_str()?.to_string())),
            _ => None,
        }
    }
}

/// A binary operation waiting for its second operand.
struct PendingBinary {
    func: fn(f64, f64) -> f64,
    first_operand: f64,
}

/// What one replay of the log produces.
#[derive(Clone, Debug, PartialEq)]
pub struct Evaluation {
    pub result: f64,
    pub is_pending: bool,
    pub description: String,
}

/// The operation log engine. Owns the ordered log of entered operands and
/// operators; replaying it derives the current result, the pending flag
/// and the expression description from scratch every time, so there is no
/// incremental state to go stale.
///
/// Cloning takes a value snapshot of the log: the clone evaluates
/// independently while the original keeps mutating.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CalcModel {
    entries: Vec<LogEntry>,
}

fn kind_of(label: &str) -> Option<OpKind> {
    ops::by_label(label).map(|op| op.kind)
}

// space-joins a piece onto the running description
fn append_joined(description: &mut String, piece: &str) {
    if !description.is_empty() {
        description.push(' ');
    }
    description.push_str(piece);
}

impl CalcModel {
    pub fn new() -> Self {
        Default::default()
    }

    /// Appends a literal number to the log.
    pub fn set_operand(&mut self, value: f64) {
        self.entries
            .push(LogEntry::Operand(String::new(), Operand::Number(value)));
    }

    /// Appends a variable reference; its value is resolved against the
    /// bindings supplied to [`evaluate`](Self::evaluate).
    pub fn set_variable(&mut self, name: &str) {
        self.entries.push(LogEntry::Operand(
            "Var".to_string(),
            Operand::Variable(name.to_string()),
        ));
    }

    /// Appends the catalogue operation entered as `token`. Unknown tokens
    /// are ignored. The reset token clears the whole log instead of being
    /// appended.
    pub fn perform_operation(&mut self, token: &str) {
        let Some(op) = ops::by_token(token) else {
            return;
        };
        if let OpKind::Reset = op.kind {
            self.entries.clear();
            return;
        }
        self.entries.push(LogEntry::from_catalogue(op));
    }

    /// Removes the most recent entry. Does nothing when the log is empty.
    pub fn undo(&mut self) {
        self.entries.pop();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Replays the whole log and returns the accumulated result, whether
    /// a binary operation is still waiting for its second operand, and
    /// the infix description of the expression so far.
    ///
    /// Replay never mutates the log, so repeated calls on an unchanged
    /// log return identical output. Unbound variables evaluate to `0`;
    /// division by zero and domain errors propagate as IEEE-754
    /// `inf`/`NaN` through the accumulator.
    pub fn evaluate(&self, variables: Option<&HashMap<String, f64>>) -> Evaluation {
        let mut accumulator = 0.0_f64;
        let mut pending: Option<PendingBinary> = None;
        // the full expression text, and the not-yet-flushed operand text
        let mut description = String::new();
        let mut operand_desc = String::new();

        for entry in &self.entries {
            match entry {
                LogEntry::Constant(label) => {
                    let Some(OpKind::Constant(value)) = kind_of(label) else {
                        continue;
                    };
                    accumulator = value;
                    operand_desc = label.clone();
                }
                LogEntry::Operand(_, operand) => {
                    match operand {
                        Operand::Number(number) => {
                            accumulator = *number;
                            operand_desc = format_number(*number);
                        }
                        Operand::Variable(name) => {
                            accumulator = variables
                                .and_then(|vars| vars.get(name))
                                .copied()
                                .unwrap_or(0.0);
                            operand_desc = name.clone();
                        }
                    }
                    // a fresh operand after a completed expression starts
                    // a new one
                    if pending.is_none() {
                        description.clear();
                    }
                }
                LogEntry::Unary(label) => {
                    let Some(OpKind::Unary(func, fixity)) = kind_of(label) else {
                        continue;
                    };
                    accumulator = func(accumulator);
                    let inner = if operand_desc.is_empty() {
                        description.as_str()
                    } else {
                        operand_desc.as_str()
                    };
                    let wrapped = match fixity {
                        Fixity::Prefix => format!("{}({})", label, inner),
                        Fixity::Postfix => format!("({}){}", inner, label),
                    };
                    if operand_desc.is_empty() {
                        description = wrapped;
                    } else {
                        append_joined(&mut description, &wrapped);
                    }
                    operand_desc.clear();
                }
                LogEntry::Binary(label) => {
                    let Some(OpKind::Binary(func)) = kind_of(label) else {
                        continue;
                    };
                    // the operand text is flushed but deliberately kept:
                    // "7 + =" resolves against 7 again and reads "7 + 7"
                    if !operand_desc.is_empty() {
                        append_joined(&mut description, &operand_desc);
                    }
                    if let Some(prev) = pending.take() {
                        accumulator = (prev.func)(prev.first_operand, accumulator);
                    }
                    pending = Some(PendingBinary {
                        func,
                        first_operand: accumulator,
                    });
                    append_joined(&mut description, label);
                }
                LogEntry::ZeroArg(label) => {
                    let Some(OpKind::ZeroArg(func)) = kind_of(label) else {
                        continue;
                    };
                    // not usable as a pending operand context
                    pending = None;
                    accumulator = func();
                    description = format!("{}({})", label, operand_desc);
                    operand_desc.clear();
                }
                LogEntry::Percent(label) => {
                    accumulator = match &pending {
                        Some(prev) => prev.first_operand / 100.0 * accumulator,
                        None => accumulator / 100.0,
                    };
                    if operand_desc.is_empty() {
                        description = format!("{}({})", label, description);
                    } else {
                        let wrapped = format!("{}({})", label, operand_desc);
                        append_joined(&mut description, &wrapped);
                    }
                    operand_desc.clear();
                }
                LogEntry::Equals(_) => {
                    if !operand_desc.is_empty() {
                        append_joined(&mut description, &operand_desc);
                        operand_desc.clear();
                    }
                    if let Some(prev) = pending.take() {
                        accumulator = (prev.func)(prev.first_operand, accumulator);
                    }
                }
                LogEntry::Reset(_) => {
                    // only reachable through a decoded log; replay resumes
                    // from cleared state and the log itself stays intact
                    accumulator = 0.0;
                    pending = None;
                    description.clear();
                    operand_desc.clear();
                }
            }
        }

        Evaluation {
            result: accumulator,
            is_pending: pending.is_some(),
            description,
        }
    }

    /// Current result with no variable bindings.
    pub fn result(&self) -> f64 {
        self.evaluate(None).result
    }

    /// Whether a binary operation is still waiting for its second operand.
    pub fn is_pending(&self) -> bool {
        self.evaluate(None).is_pending
    }

    /// Current result rendered in the display number format.
    pub fn display_value(&self) -> String {
        format_number(self.result())
    }

    /// Serializes the log into a nested key-value structure keyed by
    /// stringified zero-based indices.
    pub fn encode(&self) -> Json {
        let mut map = Map::new();
        for (index, entry) in self.entries.iter().enumerate() {
            map.insert(index.to_string(), entry.encode());
        }
        Json::Object(map)
    }

    /// Rebuilds a log from its persisted encoding. Fails only when the
    /// root is not a key-value collection; inside it, keys that are not
    /// indices and entries that do not resolve against the catalogue are
    /// skipped rather than aborting the decode.
    pub fn decode(encoded: &Json) -> Result<CalcModel, CalcError> {
        let map = encoded.as_object().ok_or(CalcError::InvalidLogRoot)?;
        let mut indexed: Vec<(usize, &Json)> = map
            .iter()
            .filter_map(|(key, value)| Some((key.parse::<usize>().ok()?, value)))
            .collect();
        indexed.sort_by_key(|(index, _)| *index);

        let mut model = CalcModel::new();
        for (_, value) in indexed {
            if let Some(entry) = LogEntry::decode(value) {
                model.entries.push(entry);
            }
        }
        Ok(model)
    }
}
