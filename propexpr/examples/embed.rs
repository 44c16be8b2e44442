//! Embedding demo: wire a host property source and a call resolver into the
//! evaluator.
//!
//! Run with: cargo run --example embed

use propexpr::{evaluate, evaluate_with, CallResolver, PropertySource, PropertyTable, Value};

/// Read-only view of the process environment.
struct EnvSource;

impl PropertySource for EnvSource {
    fn names(&self) -> Vec<String> {
        std::env::vars().map(|(name, _)| name).collect()
    }

    fn read(&self, name: &str) -> Value {
        match std::env::var(name) {
            Ok(text) => Value::Str(text),
            Err(_) => Value::Absent,
        }
    }

    fn write(&mut self, _name: &str, _value: Value) {}
}

/// Resolver that gives `len` applications a meaning.
struct Funcs;

impl CallResolver for Funcs {
    fn resolve(&self, callee: &Value, argument: &Value) -> Value {
        match callee {
            Value::Str(name) if name == "len" => {
                Value::Int(argument.as_str().chars().count() as i64)
            }
            _ => Value::Absent,
        }
    }
}

fn main() {
    let env = EnvSource;
    println!("environment lookups:");
    for src in ["HOME", "'user ' + USER", "HOME + ':' + NOT_SET"] {
        println!("  {src:28} => {}", evaluate(src, Some(&env)));
    }

    let mut props = PropertyTable::new();
    props.set("len", Value::Str("len".into()));
    props.set("GREETING", Value::Str("hello world".into()));

    println!("applications:");
    for src in ["len GREETING", "len (GREETING + '!')"] {
        println!("  {src:28} => {}", evaluate_with(src, Some(&props), &Funcs));
    }

    // Without a resolver, applications reduce to the stock placeholder.
    println!("  {:28} => {}", "len GREETING (stub)", evaluate("len GREETING", Some(&props)));
}
