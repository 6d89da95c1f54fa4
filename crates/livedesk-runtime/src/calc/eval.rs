//! Tree-walking evaluator.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::parser::{BinOp, Expr, FnDef, Stmt, UnOp};

const MAX_CALL_DEPTH: usize = 256;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Value {
    Num(f64),
    Str(String),
    Bool(bool),
    Func(String, Arc<FnDef>),
    /// Result of calls made for their effect, such as `print`.
    Nil,
}

impl Value {
    fn type_name(&self) -> &'static str {
        match self {
            Value::Num(_) => "number",
            Value::Str(_) => "string",
            Value::Bool(_) => "bool",
            Value::Func(..) => "function",
            Value::Nil => "nil",
        }
    }

    /// How a value is echoed as a result: strings are quoted.
    pub(crate) fn repr(&self) -> String {
        match self {
            Value::Str(s) => format!("{s:?}"),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Num(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Value::Num(n) => write!(f, "{n}"),
            Value::Str(s) => f.write_str(s),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Func(name, def) => write!(f, "<fn {name}/{}>", def.params.len()),
            Value::Nil => f.write_str("nil"),
        }
    }
}

/// What running one statement produced.
pub(crate) enum Outcome {
    /// An expression statement's value.
    Value(Value),
    /// A binding; carries the bound value for expand mode.
    Bound(Value),
}

/// Global bindings.
#[derive(Default)]
pub(crate) struct Env {
    globals: HashMap<String, Value>,
}

impl Env {
    /// Run one statement. Lines written by `print` are appended to `out`,
    /// including those written before a failure.
    pub(crate) fn exec(&mut self, stmt: &Stmt, out: &mut Vec<String>) -> Result<Outcome, String> {
        match stmt {
            Stmt::Let(name, expr) => {
                let value = Frame::new(self, out).eval(expr)?;
                self.globals.insert(name.clone(), value.clone());
                Ok(Outcome::Bound(value))
            }
            Stmt::Fn(name, def) => {
                let value = Value::Func(name.clone(), Arc::clone(def));
                self.globals.insert(name.clone(), value.clone());
                Ok(Outcome::Bound(value))
            }
            Stmt::Expr(expr) => Frame::new(self, out).eval(expr).map(Outcome::Value),
        }
    }
}

/// One evaluation in progress: globals, current locals and call depth.
struct Frame<'a> {
    env: &'a Env,
    out: &'a mut Vec<String>,
    locals: HashMap<String, Value>,
    depth: usize,
}

impl<'a> Frame<'a> {
    fn new(env: &'a Env, out: &'a mut Vec<String>) -> Self {
        Self {
            env,
            out,
            locals: HashMap::new(),
            depth: 0,
        }
    }

    fn lookup(&self, name: &str) -> Option<&Value> {
        self.locals.get(name).or_else(|| self.env.globals.get(name))
    }

    fn eval(&mut self, expr: &Expr) -> Result<Value, String> {
        match expr {
            Expr::Num(n) => Ok(Value::Num(*n)),
            Expr::Str(s) => Ok(Value::Str(s.clone())),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Var { name, .. } => self
                .lookup(name)
                .cloned()
                .ok_or_else(|| format!("`{name}` is not defined")),
            Expr::Unary(op, inner) => {
                let value = self.eval(inner)?;
                match (op, value) {
                    (UnOp::Neg, Value::Num(n)) => Ok(Value::Num(-n)),
                    (UnOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
                    (UnOp::Neg, v) => Err(format!("cannot negate a {}", v.type_name())),
                    (UnOp::Not, v) => Err(format!("cannot apply `!` to a {}", v.type_name())),
                }
            }
            Expr::Binary(BinOp::And, lhs, rhs) => {
                if self.truthy(lhs)? {
                    self.eval(rhs).and_then(|v| expect_bool(v, "&&"))
                } else {
                    Ok(Value::Bool(false))
                }
            }
            Expr::Binary(BinOp::Or, lhs, rhs) => {
                if self.truthy(lhs)? {
                    Ok(Value::Bool(true))
                } else {
                    self.eval(rhs).and_then(|v| expect_bool(v, "||"))
                }
            }
            Expr::Binary(op, lhs, rhs) => {
                let lhs = self.eval(lhs)?;
                let rhs = self.eval(rhs)?;
                binary(*op, lhs, rhs)
            }
            Expr::If(cond, then, otherwise) => {
                if self.truthy(cond)? {
                    self.eval(then)
                } else {
                    self.eval(otherwise)
                }
            }
            Expr::Call { name, args } => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.eval(arg)?);
                }
                self.call(name, values)
            }
        }
    }

    fn truthy(&mut self, expr: &Expr) -> Result<bool, String> {
        match self.eval(expr)? {
            Value::Bool(b) => Ok(b),
            other => Err(format!("expected a bool condition, got a {}", other.type_name())),
        }
    }

    fn call(&mut self, name: &str, args: Vec<Value>) -> Result<Value, String> {
        let def = match self.lookup(name) {
            Some(Value::Func(_, def)) => Arc::clone(def),
            Some(other) => return Err(format!("`{name}` is a {}, not a function", other.type_name())),
            None => return self.builtin(name, args),
        };

        if def.params.len() != args.len() {
            return Err(format!(
                "`{name}` takes {} argument(s), got {}",
                def.params.len(),
                args.len()
            ));
        }
        if self.depth >= MAX_CALL_DEPTH {
            return Err("maximum call depth exceeded".into());
        }

        let locals: HashMap<String, Value> = def.params.iter().cloned().zip(args).collect();
        let saved = std::mem::replace(&mut self.locals, locals);
        self.depth += 1;
        let result = self.eval(&def.body);
        self.depth -= 1;
        self.locals = saved;
        result
    }

    fn builtin(&mut self, name: &str, args: Vec<Value>) -> Result<Value, String> {
        match (name, args.as_slice()) {
            ("print", _) => {
                let line = args
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(" ");
                self.out.push(line);
                Ok(Value::Nil)
            }
            ("len", [Value::Str(s)]) => Ok(Value::Num(s.chars().count() as f64)),
            ("len", [other]) => Err(format!("len expects a string, got a {}", other.type_name())),
            ("str", [value]) => Ok(Value::Str(value.to_string())),
            ("len" | "str", _) => Err(format!("`{name}` takes 1 argument(s), got {}", args.len())),
            _ => Err(format!("`{name}` is not defined")),
        }
    }
}

fn expect_bool(value: Value, op: &str) -> Result<Value, String> {
    match value {
        Value::Bool(_) => Ok(value),
        other => Err(format!("`{op}` expects bools, got a {}", other.type_name())),
    }
}

fn binary(op: BinOp, lhs: Value, rhs: Value) -> Result<Value, String> {
    use Value::{Bool, Num, Str};
    let value = match (op, lhs, rhs) {
        (BinOp::Add, Num(a), Num(b)) => Num(a + b),
        (BinOp::Add, Str(a), b) => Str(format!("{a}{b}")),
        (BinOp::Add, a, Str(b)) => Str(format!("{a}{b}")),
        (BinOp::Sub, Num(a), Num(b)) => Num(a - b),
        (BinOp::Mul, Num(a), Num(b)) => Num(a * b),
        (BinOp::Div | BinOp::Rem, Num(_), Num(b)) if b == 0.0 => {
            return Err("division by zero".into())
        }
        (BinOp::Div, Num(a), Num(b)) => Num(a / b),
        (BinOp::Rem, Num(a), Num(b)) => Num(a % b),
        (BinOp::Eq, a, b) => Bool(a == b),
        (BinOp::Ne, a, b) => Bool(a != b),
        (BinOp::Lt, Num(a), Num(b)) => Bool(a < b),
        (BinOp::Le, Num(a), Num(b)) => Bool(a <= b),
        (BinOp::Gt, Num(a), Num(b)) => Bool(a > b),
        (BinOp::Ge, Num(a), Num(b)) => Bool(a >= b),
        (BinOp::Lt, Str(a), Str(b)) => Bool(a < b),
        (BinOp::Gt, Str(a), Str(b)) => Bool(a > b),
        (op, a, b) => {
            return Err(format!(
                "unsupported operands for {op:?}: {} and {}",
                a.type_name(),
                b.type_name()
            ))
        }
    };
    Ok(value)
}
