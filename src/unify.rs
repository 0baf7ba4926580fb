use crate::heap::{Cell, Heap, HeapIndex};

impl Heap {
    /**
     * Unifies the terms at `a` and `b`, binding variables as needed.
     *
     * First-order terms have at most one most general unifier, so the
     * search here either succeeds once or fails. Every binding is on the
     * trail; on failure some may already have been made, and the caller
     * is expected to `undo` back to a mark taken beforehand.
     */
    pub fn unify(&mut self, a: HeapIndex, b: HeapIndex) -> bool {
        let mut pending = vec![(a, b)];

        while let Some((a, b)) = pending.pop() {
            let a = self.deref(a);
            let b = self.deref(b);
            if a == b {
                continue;
            }

            match (self.read(a), self.read(b)) {
                (Cell::Variable { .. }, _) => self.bind(a, b),
                (_, Cell::Variable { .. }) => self.bind(b, a),
                (Cell::Symbol(x), Cell::Symbol(y)) => {
                    if x != y {
                        return false;
                    }
                }
                (Cell::Pair(a_head, a_tail), Cell::Pair(b_head, b_tail)) => {
                    // heads are unified before tails
                    pending.push((a_tail, b_tail));
                    pending.push((a_head, b_head));
                }
                _ => return false,
            }
        }

        true
    }

    /**
     * Runs `on_success` once for every way `a` and `b` unify, then restores
     * both terms to how they were before the call. Returns the number of
     * successes.
     */
    pub fn unify_scoped<F>(&mut self, a: HeapIndex, b: HeapIndex, mut on_success: F) -> usize
    where
        F: FnMut(&mut Heap),
    {
        let mark = self.mark();
        let successes = if self.unify(a, b) {
            on_success(self);
            1
        } else {
            0
        };
        self.undo(mark);
        successes
    }
}

#[cfg(test)]
mod tests {
    use crate::heap::*;

    const NIL: SymbolIndex = 0;

    #[test]
    fn test_unify_symbols() {
        let mut heap = Heap::new();
        let a = heap.alloc_symbol(1);
        let also_a = heap.alloc_symbol(1);
        let b = heap.alloc_symbol(2);

        assert_eq!(1, heap.unify_scoped(a, also_a, |_| ()));
        assert_eq!(0, heap.unify_scoped(a, b, |_| ()));
    }

    #[test]
    fn test_unify_variable_is_unbound_afterwards() {
        let mut heap = Heap::new();
        let x = heap.alloc_variable();
        let a = heap.alloc_symbol(1);

        let successes = heap.unify_scoped(x, a, |heap| {
            assert_eq!(a, heap.deref(x));
        });

        assert_eq!(1, successes);
        assert!(heap.is_unbound(x));
        assert_eq!(Cell::Variable { label: None }, heap.read(x));
        assert_eq!(0, heap.trail_len());
    }

    #[test]
    fn test_unify_variable_on_either_side() {
        let mut heap = Heap::new();
        let x = heap.alloc_variable();
        let a = heap.alloc_symbol(1);

        assert!(heap.unify(a, x));
        assert_eq!(a, heap.deref(x));
    }

    #[test]
    fn test_unify_variable_with_itself() {
        let mut heap = Heap::new();
        let x = heap.alloc_variable();

        assert!(heap.unify(x, x));
        assert_eq!(0, heap.trail_len());
        assert!(heap.is_unbound(x));
    }

    #[test]
    fn test_unify_lists() {
        let mut heap = Heap::new();
        let x = heap.alloc_variable();
        let y = heap.alloc_variable();
        let a = heap.alloc_symbol(1);
        let b = heap.alloc_symbol(2);

        let left = heap.alloc_list(&[a, y], NIL);
        let right = heap.alloc_list(&[x, b], NIL);

        let successes = heap.unify_scoped(left, right, |heap| {
            assert_eq!(a, heap.deref(x));
            assert_eq!(b, heap.deref(y));
        });
        assert_eq!(1, successes);
        assert!(heap.is_unbound(x));
        assert!(heap.is_unbound(y));
    }

    #[test]
    fn test_unify_lists_element_mismatch() {
        let mut heap = Heap::new();
        let x = heap.alloc_variable();
        let a = heap.alloc_symbol(1);
        let b = heap.alloc_symbol(2);

        let left = heap.alloc_list(&[x, a], NIL);
        let right = heap.alloc_list(&[b, b], NIL);

        assert_eq!(0, heap.unify_scoped(left, right, |_| ()));
        assert!(heap.is_unbound(x));
    }

    #[test]
    fn test_unify_mismatched_terminators() {
        let mut heap = Heap::new();
        let a = heap.alloc_symbol(1);
        let left = heap.alloc_list(&[a], NIL);

        let tail = heap.alloc_symbol(5);
        let right = heap.alloc_pair(a, tail);

        assert_eq!(0, heap.unify_scoped(left, right, |_| ()));
    }

    #[test]
    fn test_unify_lists_of_different_length() {
        let mut heap = Heap::new();
        let a = heap.alloc_symbol(1);
        let short = heap.alloc_list(&[a], NIL);
        let long = heap.alloc_list(&[a, a], NIL);

        assert_eq!(0, heap.unify_scoped(short, long, |_| ()));
    }

    #[test]
    fn test_unify_symbol_with_pair() {
        let mut heap = Heap::new();
        let a = heap.alloc_symbol(1);
        let list = heap.alloc_list(&[a], NIL);

        let mark = heap.mark();
        assert!(!heap.unify(a, list));
        assert_eq!(mark, heap.mark());
    }

    #[test]
    fn test_unify_shared_variable() {
        let mut heap = Heap::new();
        let x = heap.alloc_variable();
        let a = heap.alloc_symbol(1);
        let b = heap.alloc_symbol(2);

        // (X X) against (a b)
        let left = heap.alloc_list(&[x, x], NIL);
        let right = heap.alloc_list(&[a, b], NIL);
        assert_eq!(0, heap.unify_scoped(left, right, |_| ()));
        assert!(heap.is_unbound(x));

        let right = heap.alloc_list(&[a, a], NIL);
        assert_eq!(1, heap.unify_scoped(left, right, |_| ()));
    }
}
