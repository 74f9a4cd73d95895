//! Per-evaluation values of formula cells.
//!
//! Formula cells are not cached between evaluations: the grid is the only
//! state. While one formula is being evaluated, the formula cells it reads are
//! computed once, dependencies first, and kept here until the outermost
//! evaluation finishes.

use rhai::Dynamic;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use super::{CellRef, CellType, Grid};

/// Limit on evaluations started from inside another evaluation.
///
/// Dependencies are evaluated in order before the cells that read them, so
/// nesting only grows through references the formula text does not show
/// (for example `CELL(row, col)` with computed arguments).
pub const MAX_EVAL_DEPTH: usize = 64;

#[derive(Clone, Debug)]
pub(crate) enum CachedValue {
    /// Being evaluated; reading it again means a circular reference.
    Pending,
    Value(Dynamic),
    Failed(String),
}

#[derive(Default)]
struct EvalState {
    depth: usize,
    values: HashMap<CellRef, CachedValue>,
}

thread_local! {
    static EVAL_STATE: RefCell<EvalState> = RefCell::new(EvalState::default());
}

/// An evaluation in progress. Cached values live until the outermost scope drops.
pub(crate) struct EvalScope;

impl EvalScope {
    pub(crate) fn enter() -> Option<EvalScope> {
        EVAL_STATE.with(|state| {
            let mut state = state.borrow_mut();
            if state.depth >= MAX_EVAL_DEPTH {
                return None;
            }
            state.depth += 1;
            Some(EvalScope)
        })
    }
}

impl Drop for EvalScope {
    fn drop(&mut self) {
        EVAL_STATE.with(|state| {
            let mut state = state.borrow_mut();
            state.depth = state.depth.saturating_sub(1);
            if state.depth == 0 {
                state.values.clear();
            }
        });
    }
}

pub(crate) fn cached_value(cell_ref: &CellRef) -> Option<CachedValue> {
    EVAL_STATE.with(|state| state.borrow().values.get(cell_ref).cloned())
}

pub(crate) fn store_value(cell_ref: CellRef, value: CachedValue) {
    EVAL_STATE.with(|state| {
        state.borrow_mut().values.insert(cell_ref, value);
    });
}

pub(crate) fn formula_of(grid: &Grid, cell_ref: &CellRef) -> Option<String> {
    grid.get(cell_ref).and_then(|entry| match &entry.contents {
        CellType::Formula(f) => Some(f.clone()),
        _ => None,
    })
}

/// Formula cells reachable from `start` (itself included) that still need a
/// value, ordered so every cell comes after the formula cells it reads.
pub(crate) fn formula_cells_in_order(grid: &Grid, start: CellRef) -> Vec<CellRef> {
    let mut order = Vec::new();
    let mut seen = HashSet::new();
    let mut stack = vec![(start, false)];

    while let Some((cell_ref, expanded)) = stack.pop() {
        if expanded {
            order.push(cell_ref);
            continue;
        }
        if !seen.insert(cell_ref) || cached_value(&cell_ref).is_some() {
            continue;
        }
        let deps = match grid.get(&cell_ref) {
            Some(entry) if matches!(entry.contents, CellType::Formula(_)) => {
                entry.depends_on.clone()
            }
            _ => continue,
        };
        stack.push((cell_ref, true));
        stack.extend(
            deps.into_iter()
                .rev()
                .filter(|dep| !seen.contains(dep))
                .map(|dep| (dep, false)),
        );
    }
    order
}
