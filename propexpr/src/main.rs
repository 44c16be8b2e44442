//! Line-oriented evaluation harness.
//!
//! Usage:
//!   propexpr [NAME=EXPR]... [-e EXPR]
//!
//! With `-e` the expression is evaluated once and printed. Otherwise a
//! stdin loop reads expressions; `name = expression` lines write back into
//! the property table.

use std::io::{self, BufRead, Write};

use propexpr::{evaluate, PropertySource, PropertyTable};

fn main() {
    let argv: Vec<String> = std::env::args().skip(1).collect();

    let mut props = PropertyTable::new();
    let mut once: Option<String> = None;

    let mut i = 0;
    while i < argv.len() {
        let arg = argv[i].as_str();
        if arg == "-e" {
            i += 1;
            match argv.get(i) {
                Some(expr) => once = Some(expr.clone()),
                None => {
                    eprintln!("propexpr: -e requires an expression");
                    std::process::exit(1);
                }
            }
        } else if let Some((name, expr)) = split_assignment(arg) {
            let value = evaluate(expr, Some(&props));
            props.write(name, value);
        } else {
            eprintln!("propexpr: unexpected argument {arg:?}");
            eprintln!("Usage: propexpr [NAME=EXPR]... [-e EXPR]");
            std::process::exit(1);
        }
        i += 1;
    }

    if let Some(expr) = once {
        println!("{}", evaluate(&expr, Some(&props)));
        return;
    }

    repl(&mut props);
}

fn repl(props: &mut PropertyTable) {
    let ver = env!("CARGO_PKG_VERSION");
    println!("propexpr {ver}");
    println!("Type an expression, `name = expression` to set a property,");
    println!("`/names` to list properties, or `/quit` to exit.");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut line = String::new();

    loop {
        print!("> ");
        let _ = stdout.flush();
        line.clear();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => break, // EOF
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match input {
            "/quit" => break,
            "/names" => {
                let mut names = props.names();
                names.sort();
                for name in names {
                    println!("{} = {}", name, props.read(&name));
                }
                continue;
            }
            _ => {}
        }

        // `name = expression` assigns through the table; everything else
        // evaluates as an expression. The grammar itself has no `=`.
        if let Some((name, expr)) = split_assignment(input) {
            let value = evaluate(expr, Some(props));
            println!("{name} = {value}");
            props.write(name, value);
        } else {
            let value = evaluate(input, Some(props));
            println!("{}  ({})", value, value.type_name());
        }
    }
}

/// Split `name = expression` when the left side is a bare identifier.
/// Anything else, including `=` inside a string literal, is not an
/// assignment.
fn split_assignment(line: &str) -> Option<(&str, &str)> {
    let (name, expr) = line.split_once('=')?;
    let name = name.trim();
    let mut bytes = name.bytes();
    let first = bytes.next()?;
    if (first.is_ascii_alphabetic() || first == b'_')
        && bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_')
    {
        Some((name, expr))
    } else {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
