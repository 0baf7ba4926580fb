use std::collections::HashMap;

use crate::ast::*;
use crate::error::CompileError;
use crate::heap::*;

pub type RelationId = usize;

/// Symbol that terminates every list, spelled `()` in source.
pub const NIL: SymbolIndex = 0;

/**
 * Term pattern compiled from source. Variables are slots in the frame of
 * fresh variables allocated for each call of the relation.
 */
#[derive(Clone, Debug, PartialEq)]
pub enum Template {
    Variable(usize),
    Symbol(SymbolIndex),
    Pair(Box<Template>, Box<Template>),
}

/// A body goal: call `relation` with the argument tuple `args`.
#[derive(Clone, Debug, PartialEq)]
pub struct Goal {
    pub relation: RelationId,
    pub args: Template,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Rule {
    pub head: Template,
    pub body: Vec<Goal>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Relation {
    pub name: String,
    // Distinct variables across all rules, in order of first appearance
    pub variables: Vec<String>,
    // Tried in source order
    pub rules: Vec<Rule>,
}

/**
 * Compiled program: every relation by name, plus the symbols its
 * templates refer to. Read-only once built.
 */
#[derive(Debug)]
pub struct Program {
    relations: Vec<Relation>,
    index: HashMap<String, RelationId>,
    symbols: SymbolTable,
}

#[derive(Debug)]
pub struct SymbolTable {
    symbols: Vec<String>,
    symbols_to_indeces: HashMap<String, SymbolIndex>,
}

struct Compiler<'a> {
    symbols: SymbolTable,
    index: HashMap<String, RelationId>,
    groups: Vec<(&'a str, Vec<&'a Clause>)>,
}

/// Frame slots handed out to variable names within one relation.
#[derive(Default)]
struct VariableSlots {
    names: Vec<String>,
    slots: HashMap<String, usize>,
}

/**
 * Top-level function for compiling parsed clauses into a program.
 */
pub fn compile(clauses: &[Clause]) -> Result<Program, CompileError> {
    let mut compiler = Compiler::new();
    for clause in clauses {
        compiler.add_clause(clause);
    }
    compiler.finish()
}

impl<'a> Compiler<'a> {
    fn new() -> Self {
        Compiler {
            symbols: SymbolTable::new(),
            index: HashMap::new(),
            groups: Vec::new(),
        }
    }

    fn add_clause(&mut self, clause: &'a Clause) {
        let name = clause.head.relation.as_str();
        let id = match self.index.get(name) {
            Some(&id) => id,
            None => {
                let id = self.groups.len();
                self.index.insert(name.to_string(), id);
                self.groups.push((name, Vec::new()));
                id
            }
        };
        self.groups[id].1.push(clause);
    }

    fn finish(mut self) -> Result<Program, CompileError> {
        let groups = std::mem::take(&mut self.groups);
        let mut relations = Vec::with_capacity(groups.len());

        for (name, clauses) in groups {
            let relation = self.compile_relation(name, &clauses)?;
            tracing::debug!(
                relation = %relation.name,
                rules = relation.rules.len(),
                variables = relation.variables.len(),
                "compiled relation"
            );
            relations.push(relation);
        }

        Ok(Program {
            relations,
            index: self.index,
            symbols: self.symbols,
        })
    }

    fn compile_relation(&mut self, name: &str, clauses: &[&Clause]) -> Result<Relation, CompileError> {
        let mut slots = VariableSlots::default();
        for clause in clauses {
            clause.for_each_variable(&mut |name| {
                slots.slot(name);
            });
        }

        let mut rules = Vec::with_capacity(clauses.len());

        for clause in clauses {
            let head = self.compile_sequence(&clause.head.args, &mut slots);

            let mut body = Vec::with_capacity(clause.body.len());
            for call in &clause.body {
                let relation = match self.index.get(&call.relation) {
                    Some(&id) => id,
                    None => {
                        return Err(CompileError::UnknownRelation {
                            relation: call.relation.clone(),
                            caller: name.to_string(),
                        })
                    }
                };
                let args = self.compile_sequence(&call.args, &mut slots);
                body.push(Goal { relation, args });
            }

            rules.push(Rule { head, body });
        }

        Ok(Relation {
            name: name.to_string(),
            variables: slots.names,
            rules,
        })
    }

    fn compile_node(&mut self, node: &Node, slots: &mut VariableSlots) -> Template {
        match node {
            Node::Variable(name) => Template::Variable(slots.slot(name)),
            Node::Symbol(name) => Template::Symbol(self.symbols.intern(name)),
            Node::List(items) => self.compile_sequence(items, slots),
        }
    }

    /**
     * Compiles a sequence into a right-nested chain of pairs. The chain
     * ends in nil unless the sequence is written with a dotted tail,
     * `(a b . T)`.
     */
    fn compile_sequence(&mut self, items: &[Node], slots: &mut VariableSlots) -> Template {
        let (heads, tail) = match items {
            [heads @ .., Node::Symbol(dot), tail] if dot == "." && !heads.is_empty() => {
                (heads, Some(tail))
            }
            _ => (items, None),
        };

        let heads: Vec<Template> = heads
            .iter()
            .map(|node| self.compile_node(node, slots))
            .collect();
        let tail = match tail {
            Some(node) => self.compile_node(node, slots),
            None => Template::Symbol(NIL),
        };

        heads.into_iter().rev().fold(tail, |tail, head| {
            Template::Pair(Box::new(head), Box::new(tail))
        })
    }
}

impl VariableSlots {
    fn slot(&mut self, name: &str) -> usize {
        if let Some(&slot) = self.slots.get(name) {
            return slot;
        }
        let slot = self.names.len();
        self.names.push(name.to_string());
        self.slots.insert(name.to_string(), slot);
        slot
    }
}

impl Template {
    /**
     * Builds the term this template describes on the heap. `frame` is the
     * index of the first variable allocated for the current call.
     */
    pub fn instantiate(&self, heap: &mut Heap, frame: HeapIndex) -> HeapIndex {
        match self {
            Template::Variable(slot) => frame + slot,
            Template::Symbol(symbol) => heap.alloc_symbol(*symbol),
            Template::Pair(head, tail) => {
                let head = head.instantiate(heap, frame);
                let tail = tail.instantiate(heap, frame);
                heap.alloc_pair(head, tail)
            }
        }
    }
}

impl Program {
    pub fn relation_id(&self, name: &str) -> Option<RelationId> {
        self.index.get(name).copied()
    }

    pub fn relation(&self, id: RelationId) -> &Relation {
        &self.relations[id]
    }

    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        let mut table = SymbolTable {
            symbols: Vec::new(),
            symbols_to_indeces: HashMap::new(),
        };
        table.push("nil");
        table
    }

    fn push(&mut self, symbol: &str) -> SymbolIndex {
        self.symbols.push(symbol.to_string());
        let index = self.symbols.len() - 1;
        self.symbols_to_indeces.insert(symbol.to_string(), index);
        index
    }

    pub fn intern(&mut self, symbol: &str) -> SymbolIndex {
        match self.get_index(symbol) {
            Some(index) => index,
            None => self.push(symbol),
        }
    }

    pub fn get(&self, index: SymbolIndex) -> &str {
        &self.symbols[index]
    }

    pub fn get_index(&self, symbol: &str) -> Option<SymbolIndex> {
        self.symbols_to_indeces.get(symbol).copied()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        SymbolTable::new()
    }
}
