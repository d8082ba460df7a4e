use lazy_static::lazy_static;
use std::collections::HashMap;

/// Host functions an `extern` prototype may bind to.
#[derive(Debug, Clone, Copy)]
pub enum Native {
    /// Writes its argument as a single byte, returns 0.
    Putchard,
    /// Writes its argument as `%f` followed by a newline, returns 0.
    Printd,
    Unary(extern "C" fn(f64) -> f64),
    Binary(extern "C" fn(f64, f64) -> f64),
}

impl Native {
    pub fn arity(&self) -> usize {
        match self {
            Native::Putchard | Native::Printd | Native::Unary(_) => 1,
            Native::Binary(_) => 2,
        }
    }
}

extern "C" fn sin(x: f64) -> f64 {
    x.sin()
}

extern "C" fn cos(x: f64) -> f64 {
    x.cos()
}

extern "C" fn tan(x: f64) -> f64 {
    x.tan()
}

extern "C" fn atan(x: f64) -> f64 {
    x.atan()
}

extern "C" fn sqrt(x: f64) -> f64 {
    x.sqrt()
}

extern "C" fn exp(x: f64) -> f64 {
    x.exp()
}

extern "C" fn log(x: f64) -> f64 {
    x.ln()
}

extern "C" fn fabs(x: f64) -> f64 {
    x.abs()
}

extern "C" fn floor(x: f64) -> f64 {
    x.floor()
}

extern "C" fn ceil(x: f64) -> f64 {
    x.ceil()
}

extern "C" fn pow(x: f64, y: f64) -> f64 {
    x.powf(y)
}

extern "C" fn fmod(x: f64, y: f64) -> f64 {
    x % y
}

lazy_static! {
    pub static ref NATIVES: HashMap<&'static str, Native> = {
        let mut map = HashMap::new();
        map.insert("putchard", Native::Putchard);
        map.insert("printd", Native::Printd);
        map.insert("sin", Native::Unary(sin));
        map.insert("cos", Native::Unary(cos));
        map.insert("tan", Native::Unary(tan));
        map.insert("atan", Native::Unary(atan));
        map.insert("sqrt", Native::Unary(sqrt));
        map.insert("exp", Native::Unary(exp));
        map.insert("log", Native::Unary(log));
        map.insert("fabs", Native::Unary(fabs));
        map.insert("floor", Native::Unary(floor));
        map.insert("ceil", Native::Unary(ceil));
        map.insert("pow", Native::Binary(pow));
        map.insert("fmod", Native::Binary(fmod));
        map
    };
}

pub fn lookup(name: &str) -> Option<Native> {
    NATIVES.get(name).copied()
}

/// Text `printd` writes for `value`.
pub fn format_printd(value: f64) -> String {
    format!("{:.6}\n", value)
}
