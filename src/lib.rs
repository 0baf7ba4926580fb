//! horn: a small compiler and runtime for Horn clauses written in a
//! Lisp-style syntax.
//!
//! Source text is parsed into clauses, clauses are grouped into relations,
//! and a relation is called by searching depth first through its rules,
//! unifying terms on a heap and undoing bindings from a trail on
//! backtracking.
//!
//! ```text
//! ((append () Q Q))
//! ((append (H . A) B (H . Q)) (append A B Q))
//! ((main A B (1 2)) (append A B (1 2)))
//! ```

pub mod ast;
pub mod compiler;
pub mod error;
pub mod heap;
pub mod parser;
pub mod printer;
pub mod solver;
mod unify;

use std::io::Write;

pub use compiler::{compile, Program};
pub use error::{CompileError, Error, ParseError, Result};
pub use heap::Heap;
pub use parser::parse;
pub use printer::Printer;
pub use solver::Query;

/// Relation the driver calls.
pub const ENTRY: &str = "main";

/**
 * Compiles `source`, calls `main` with a fresh variable and writes every
 * answer to `out`, one per line. Returns the number of answers.
 */
pub fn run<W: Write>(source: &str, mut out: W) -> Result<usize> {
    let clauses = parse(source)?;
    let program = compile(&clauses)?;

    let mut heap = Heap::new();
    let mut printer = Printer::new();
    let args = heap.alloc_variable();

    let mut query = program.query(&mut heap, ENTRY, args)?;
    let mut answers = 0;
    while let Some(answer) = query.next_answer() {
        let text = printer.print(query.heap(), program.symbols(), answer);
        writeln!(out, "{}", text)?;
        answers += 1;
    }

    tracing::debug!(answers, "query exhausted");
    Ok(answers)
}
