//! Depth-first, left-to-right search over a compiled program.
//!
//! A `Query` keeps the goals still to prove as a persistent linked list and
//! the untried alternatives as an explicit stack of choice points, so the
//! depth of a proof never touches the host call stack.

use std::rc::Rc;

use crate::compiler::{Goal, Program, Relation, RelationId};
use crate::error::CompileError;
use crate::heap::{Heap, HeapIndex, Mark};

/// Goals left to prove, first goal first. Tails are shared between the
/// choice points that captured them.
type Continuation<'p> = Option<Rc<Pending<'p>>>;

struct Pending<'p> {
    goal: &'p Goal,
    // Variables of the call whose rule body this goal belongs to
    frame: HeapIndex,
    next: Continuation<'p>,
}

struct ChoicePoint<'p> {
    relation: &'p Relation,
    args: HeapIndex,
    frame: HeapIndex,
    // Index of the next rule to try
    next_rule: usize,
    continuation: Continuation<'p>,
    // Taken after the call's frame was allocated
    mark: Mark,
}

enum State {
    Fresh,
    Answered,
    Exhausted,
}

/**
 * An in-progress call of one relation. Each `next_answer` resumes the
 * search where the previous answer left it.
 *
 * Dropping a query, exhausted or not, undoes every binding it made and
 * releases every cell it allocated.
 */
pub struct Query<'p, 'h> {
    program: &'p Program,
    heap: &'h mut Heap,
    args: HeapIndex,
    continuation: Continuation<'p>,
    choices: Vec<ChoicePoint<'p>>,
    base: Mark,
    state: State,
}

impl Program {
    /**
     * Opens a query calling the relation `name` with the argument tuple at
     * `args`, which must already live on `heap`.
     */
    pub fn query<'p, 'h>(
        &'p self,
        heap: &'h mut Heap,
        name: &str,
        args: HeapIndex,
    ) -> Result<Query<'p, 'h>, CompileError> {
        let id = self
            .relation_id(name)
            .ok_or_else(|| CompileError::MissingEntry {
                relation: name.to_string(),
            })?;
        tracing::debug!(relation = name, "opening query");
        Ok(Query::new(self, heap, id, args))
    }
}

impl<'p, 'h> Query<'p, 'h> {
    fn new(program: &'p Program, heap: &'h mut Heap, relation: RelationId, args: HeapIndex) -> Self {
        let base = heap.mark();
        let mut query = Query {
            program,
            heap,
            args,
            continuation: None,
            choices: Vec::new(),
            base,
            state: State::Fresh,
        };
        query.push_call(program.relation(relation), args, None);
        query
    }

    /**
     * Searches for the next proof. Returns the argument tuple, bound as the
     * proof requires, or `None` once every alternative is exhausted.
     */
    pub fn next_answer(&mut self) -> Option<HeapIndex> {
        let found = match self.state {
            State::Exhausted => return None,
            State::Fresh => self.resume(),
            State::Answered => {
                tracing::trace!("backtracking for next answer");
                self.resume()
            }
        } && self.solve();

        if found {
            self.state = State::Answered;
            tracing::debug!(choice_points = self.choices.len(), "found answer");
            Some(self.args)
        } else {
            self.state = State::Exhausted;
            self.heap.undo(self.base);
            None
        }
    }

    /// The heap answers live on, for printing between calls to `next_answer`.
    pub fn heap(&mut self) -> &mut Heap {
        &mut *self.heap
    }

    /**
     * Proves the goals in the current continuation, backtracking on
     * failure. Returns false once no alternatives are left.
     */
    fn solve(&mut self) -> bool {
        while let Some(pending) = self.continuation.take() {
            let relation = self.program.relation(pending.goal.relation);
            let args = pending.goal.args.instantiate(self.heap, pending.frame);
            let continuation = pending.next.clone();
            tracing::trace!(relation = %relation.name, depth = self.choices.len(), "call");

            self.push_call(relation, args, continuation);
            if !self.resume() {
                return false;
            }
        }
        true
    }

    fn push_call(&mut self, relation: &'p Relation, args: HeapIndex, continuation: Continuation<'p>) {
        let frame = self.heap.alloc_variables(relation.variables.len());
        self.choices.push(ChoicePoint {
            relation,
            args,
            frame,
            next_rule: 0,
            continuation,
            mark: self.heap.mark(),
        });
    }

    /**
     * Tries the remaining rules of the newest choice point, falling back to
     * older ones as each runs out. On success the continuation holds the
     * matched rule's body followed by what the call was to continue with.
     */
    fn resume(&mut self) -> bool {
        while let Some(choice) = self.choices.last_mut() {
            self.heap.undo(choice.mark);

            let relation: &'p Relation = choice.relation;
            let rules = &relation.rules;
            let mut matched = None;
            while choice.next_rule < rules.len() {
                let rule = &rules[choice.next_rule];
                choice.next_rule += 1;

                let head = rule.head.instantiate(self.heap, choice.frame);
                if self.heap.unify(choice.args, head) {
                    matched = Some(rule);
                    break;
                }
                self.heap.undo(choice.mark);
            }

            let Some(rule) = matched else {
                tracing::trace!(relation = %relation.name, "no more rules");
                self.choices.pop();
                continue;
            };

            let mut continuation = choice.continuation.clone();
            for goal in rule.body.iter().rev() {
                continuation = Some(Rc::new(Pending {
                    goal,
                    frame: choice.frame,
                    next: continuation,
                }));
            }
            self.continuation = continuation;

            // Older choice points' marks already cover this call's bindings
            if choice.next_rule == rules.len() {
                self.choices.pop();
            }
            return true;
        }
        false
    }
}

impl Drop for Query<'_, '_> {
    fn drop(&mut self) {
        self.choices.clear();
        self.continuation = None;
        self.heap.undo(self.base);
    }
}

impl Drop for Pending<'_> {
    fn drop(&mut self) {
        // Unlink iteratively so long continuations don't recurse on drop
        let mut next = self.next.take();
        while let Some(pending) = next {
            match Rc::try_unwrap(pending) {
                Ok(mut pending) => next = pending.next.take(),
                Err(_) => break,
            }
        }
    }
}
