use std::fmt::{Display, Formatter, Result};

/// Expression nodes.
///
/// Every node owns its children outright; trees are never shared and never
/// mutated once the parse call that built them has returned. Backends consume
/// them by pattern matching.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal. Integer literals are promoted to `f64` while parsing.
    Number(f64),
    Variable(String),
    Unary {
        op: char,
        operand: Box<Expr>,
    },
    Binary {
        op: char,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Call {
        callee: String,
        args: Vec<Expr>,
    },
    If {
        cond: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
    For {
        var: String,
        start: Box<Expr>,
        end: Box<Expr>,
        /// `None` means a step of 1.0.
        step: Option<Box<Expr>>,
        body: Box<Expr>,
    },
    Var {
        bindings: Vec<(String, Option<Expr>)>,
        body: Box<Expr>,
    },
}

impl Expr {
    pub fn number(value: f64) -> Expr {
        Expr::Number(value)
    }

    pub fn variable(name: &str) -> Expr {
        Expr::Variable(String::from(name))
    }

    pub fn unary(op: char, operand: Expr) -> Expr {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn binary(op: char, lhs: Expr, rhs: Expr) -> Expr {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn call(callee: &str, args: Vec<Expr>) -> Expr {
        Expr::Call {
            callee: String::from(callee),
            args,
        }
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, Expr::Variable(_))
    }

    /// Number of nodes on the longest path from this node down to a leaf.
    pub fn height(&self) -> usize {
        let children = match self {
            Expr::Number(_) | Expr::Variable(_) => 0,
            Expr::Unary { operand, .. } => operand.height(),
            Expr::Binary { lhs, rhs, .. } => lhs.height().max(rhs.height()),
            Expr::Call { args, .. } => args.iter().map(Expr::height).max().unwrap_or(0),
            Expr::If {
                cond,
                then_branch,
                else_branch,
            } => cond.height().max(then_branch.height()).max(else_branch.height()),
            Expr::For {
                start,
                end,
                step,
                body,
                ..
            } => {
                let step = step.as_ref().map_or(0, |step| step.height());
                start.height().max(end.height()).max(step).max(body.height())
            }
            Expr::Var { bindings, body } => bindings
                .iter()
                .filter_map(|(_, init)| init.as_ref().map(Expr::height))
                .fold(body.height(), usize::max),
        };

        children + 1
    }
}

/// Prints the tree as an s-expression, e.g. `(+ 1 (* 2 3))`.
impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Expr::Number(value) => write!(f, "{}", value),
            Expr::Variable(name) => write!(f, "{}", name),
            Expr::Unary { op, operand } => write!(f, "({} {})", op, operand),
            Expr::Binary { op, lhs, rhs } => write!(f, "({} {} {})", op, lhs, rhs),
            Expr::Call { callee, args } => {
                write!(f, "(call {}", callee)?;
                for arg in args {
                    write!(f, " {}", arg)?;
                }
                write!(f, ")")
            }
            Expr::If {
                cond,
                then_branch,
                else_branch,
            } => write!(f, "(if {} {} {})", cond, then_branch, else_branch),
            Expr::For {
                var,
                start,
                end,
                step,
                body,
            } => {
                write!(f, "(for {} {} {}", var, start, end)?;
                if let Some(step) = step {
                    write!(f, " {}", step)?;
                }
                write!(f, " {})", body)
            }
            Expr::Var { bindings, body } => {
                write!(f, "(var (")?;
                for (i, (name, init)) in bindings.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    match init {
                        Some(init) => write!(f, "({} {})", name, init)?,
                        None => write!(f, "{}", name)?,
                    }
                }
                write!(f, ") {})", body)
            }
        }
    }
}
