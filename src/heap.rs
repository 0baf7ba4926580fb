/**
 * Term store used while a program runs.
 *
 * Every term lives in a cell of the heap and is addressed by its index.
 * The only cells that ever change are variables: binding turns a
 * `Variable` into a `Reference`, and the previous cell is pushed on the
 * trail so that backtracking can put it back.
 */
#[derive(Debug, Default, PartialEq)]
pub struct Heap {
    buffer: Vec<Cell>,
    trail: Vec<TrailEntry>,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Cell {
    // Unbound logic variable, with the label the printer gave it, if any
    Variable { label: Option<Label> },

    // Bound variable pointing at another cell
    Reference(HeapIndex),

    // Index of a constant in the symbol table
    Symbol(SymbolIndex),

    // Head and tail of a cons cell
    Pair(HeapIndex, HeapIndex),
}

pub type HeapIndex = usize;
pub type SymbolIndex = usize;
pub type Label = u64;

#[derive(Copy, Clone, Debug, PartialEq)]
struct TrailEntry {
    site: HeapIndex,
    previous: Cell,
}

/// Heap and trail heights to return to when backtracking.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Mark {
    heap: usize,
    trail: usize,
}

impl Heap {
    pub fn new() -> Self {
        Heap::default()
    }

    pub fn alloc(&mut self, cell: Cell) -> HeapIndex {
        let index = self.buffer.len();
        self.buffer.push(cell);
        index
    }

    pub fn alloc_variable(&mut self) -> HeapIndex {
        self.alloc(Cell::Variable { label: None })
    }

    /**
     * Allocates `count` fresh variables next to each other and returns the
     * index of the first one.
     */
    pub fn alloc_variables(&mut self, count: usize) -> HeapIndex {
        let index = self.buffer.len();
        self.buffer
            .resize(index + count, Cell::Variable { label: None });
        index
    }

    pub fn alloc_symbol(&mut self, symbol: SymbolIndex) -> HeapIndex {
        self.alloc(Cell::Symbol(symbol))
    }

    pub fn alloc_pair(&mut self, head: HeapIndex, tail: HeapIndex) -> HeapIndex {
        self.alloc(Cell::Pair(head, tail))
    }

    /**
     * Builds a nil-terminated chain of pairs holding `items`.
     */
    pub fn alloc_list(&mut self, items: &[HeapIndex], nil: SymbolIndex) -> HeapIndex {
        let mut list = self.alloc_symbol(nil);
        for &item in items.iter().rev() {
            list = self.alloc_pair(item, list);
        }
        list
    }

    pub fn read(&self, index: HeapIndex) -> Cell {
        self.buffer[index]
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn trail_len(&self) -> usize {
        self.trail.len()
    }

    /**
     * Follows references until reaching a cell that is not one.
     */
    pub fn deref(&self, mut index: HeapIndex) -> HeapIndex {
        while let Cell::Reference(target) = self.buffer[index] {
            index = target;
        }
        index
    }

    pub fn is_unbound(&self, index: HeapIndex) -> bool {
        matches!(self.buffer[self.deref(index)], Cell::Variable { .. })
    }

    /**
     * Turns the unbound variable at `var` into a reference to `target`,
     * recording the old cell on the trail.
     */
    pub fn bind(&mut self, var: HeapIndex, target: HeapIndex) {
        let previous = self.buffer[var];
        debug_assert!(matches!(previous, Cell::Variable { .. }));
        self.trail.push(TrailEntry { site: var, previous });
        self.buffer[var] = Cell::Reference(target);
    }

    pub(crate) fn set_label(&mut self, var: HeapIndex, label: Label) {
        if let Cell::Variable { .. } = self.buffer[var] {
            self.buffer[var] = Cell::Variable { label: Some(label) };
        }
    }

    pub fn mark(&self) -> Mark {
        Mark {
            heap: self.buffer.len(),
            trail: self.trail.len(),
        }
    }

    /**
     * Undoes every binding made since `mark`, newest first, then releases
     * the cells allocated since then.
     */
    pub fn undo(&mut self, mark: Mark) {
        while self.trail.len() > mark.trail {
            if let Some(entry) = self.trail.pop() {
                self.buffer[entry.site] = entry.previous;
            }
        }
        self.buffer.truncate(mark.heap);
    }
}

#[cfg(test)]
mod tests {
    use crate::heap::*;

    #[test]
    fn test_alloc() {
        let mut heap = Heap::new();
        let index = heap.alloc_variables(32);

        assert_eq!(0, index);
        assert_eq!(32, heap.len());
        assert_eq!(Cell::Variable { label: None }, heap.read(31));

        let index = heap.alloc_symbol(3);
        assert_eq!(32, index);
        assert_eq!(Cell::Symbol(3), heap.read(index));
    }

    #[test]
    fn test_alloc_list() {
        let mut heap = Heap::new();
        let a = heap.alloc_symbol(1);
        let b = heap.alloc_symbol(2);
        let list = heap.alloc_list(&[a, b], 0);

        let Cell::Pair(head, tail) = heap.read(list) else {
            panic!("expected a pair");
        };
        assert_eq!(a, head);
        let Cell::Pair(head, tail) = heap.read(tail) else {
            panic!("expected a pair");
        };
        assert_eq!(b, head);
        assert_eq!(Cell::Symbol(0), heap.read(tail));
    }

    #[test]
    fn test_bind_and_deref() {
        let mut heap = Heap::new();
        let x = heap.alloc_variable();
        let y = heap.alloc_variable();
        let a = heap.alloc_symbol(1);

        heap.bind(x, y);
        heap.bind(y, a);

        assert_eq!(a, heap.deref(x));
        assert!(!heap.is_unbound(x));
        assert_eq!(2, heap.trail_len());
    }

    #[test]
    fn test_undo_restores_bindings_and_heap() {
        let mut heap = Heap::new();
        let x = heap.alloc_variable();
        heap.set_label(x, 7);

        let mark = heap.mark();
        let a = heap.alloc_symbol(1);
        heap.bind(x, a);
        heap.alloc_variables(4);

        heap.undo(mark);

        assert_eq!(1, heap.len());
        assert_eq!(0, heap.trail_len());
        assert_eq!(Cell::Variable { label: Some(7) }, heap.read(x));
    }

    #[test]
    fn test_undo_is_lifo() {
        let mut heap = Heap::new();
        let x = heap.alloc_variable();
        let y = heap.alloc_variable();
        let a = heap.alloc_symbol(1);

        let outer = heap.mark();
        heap.bind(x, a);
        let inner = heap.mark();
        heap.bind(y, x);

        heap.undo(inner);
        assert!(heap.is_unbound(y));
        assert!(!heap.is_unbound(x));

        heap.undo(outer);
        assert!(heap.is_unbound(x));
    }
}
