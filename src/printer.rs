use std::fmt::Write;

use crate::compiler::{SymbolTable, NIL};
use crate::heap::*;

/// Hands out variable labels; never reset.
#[derive(Debug, Default)]
pub struct LabelCounter {
    next: Label,
}

/**
 * Renders terms as text. Unbound variables print as `_N`, where the label
 * is cached on the variable the first time the printer meets it, so the
 * same variable always prints the same way.
 */
#[derive(Debug, Default)]
pub struct Printer {
    labels: LabelCounter,
}

impl LabelCounter {
    pub fn new() -> Self {
        LabelCounter::default()
    }

    pub fn fresh(&mut self) -> Label {
        let label = self.next;
        self.next += 1;
        label
    }
}

impl Printer {
    pub fn new() -> Self {
        Printer::default()
    }

    pub fn with_labels(labels: LabelCounter) -> Self {
        Printer { labels }
    }

    pub fn print(&mut self, heap: &mut Heap, symbols: &SymbolTable, term: HeapIndex) -> String {
        let mut out = String::new();
        self.write_term(&mut out, heap, symbols, term);
        out
    }

    fn write_term(&mut self, out: &mut String, heap: &mut Heap, symbols: &SymbolTable, term: HeapIndex) {
        let term = heap.deref(term);
        match heap.read(term) {
            Cell::Variable { label } => {
                let label = match label {
                    Some(label) => label,
                    None => {
                        let label = self.labels.fresh();
                        heap.set_label(term, label);
                        label
                    }
                };
                let _ = write!(out, "_{}", label);
            }
            Cell::Symbol(NIL) => out.push_str("()"),
            Cell::Symbol(symbol) => out.push_str(symbols.get(symbol)),
            Cell::Pair(head, tail) => self.write_list(out, heap, symbols, head, tail),
            Cell::Reference(_) => unreachable!(),
        }
    }

    /**
     * Walks the spine of a list iteratively; only elements recurse.
     */
    fn write_list(
        &mut self,
        out: &mut String,
        heap: &mut Heap,
        symbols: &SymbolTable,
        mut head: HeapIndex,
        mut tail: HeapIndex,
    ) {
        out.push('(');
        loop {
            self.write_term(out, heap, symbols, head);

            let next = heap.deref(tail);
            match heap.read(next) {
                Cell::Pair(next_head, next_tail) => {
                    out.push(' ');
                    head = next_head;
                    tail = next_tail;
                }
                Cell::Symbol(NIL) => break,
                _ => {
                    out.push_str(" . ");
                    self.write_term(out, heap, symbols, next);
                    break;
                }
            }
        }
        out.push(')');
    }
}
