//! Built-in spreadsheet functions registered into the Rhai engine.
//!
//! Conventions:
//! - Spreadsheet-facing built-in names are ALL CAPS (e.g. `SUM`, `AVERAGE`).
//! - Accessors take `(row, col)` in that order, zero-indexed.
//! - If you add a new aggregate, add it to `AGGREGATES`; `register_aggregates`
//!   installs every entry of that table.

use crate::engine::eval::run_formula;
use crate::engine::value_cache::{
    CachedValue, EvalScope, cached_value, formula_cells_in_order, formula_of, store_value,
};
use crate::engine::{
    AGGREGATES, AST, Aggregate, CellRange, CellRef, CellType, Grid, col_to_letters,
};
use rhai::{Array, Dynamic, Engine, EvalAltResult, NativeCallContext, Position};

const MAX_RANGE_CELLS: usize = 1_000_000;

fn invalid_arg(message: &str) -> Box<EvalAltResult> {
    EvalAltResult::ErrorRuntime(message.into(), Position::NONE).into()
}

fn to_usize(value: i64, label: &str) -> Result<usize, Box<EvalAltResult>> {
    usize::try_from(value).map_err(|_| invalid_arg(&format!("{} must be >= 0", label)))
}

fn to_range(r1: i64, c1: i64, r2: i64, c2: i64) -> Result<CellRange, Box<EvalAltResult>> {
    Ok(CellRange::new(
        CellRef::new(to_usize(r1, "r1")?, to_usize(c1, "c1")?),
        CellRef::new(to_usize(r2, "r2")?, to_usize(c2, "c2")?),
    ))
}

fn cached_result(
    cell_ref: CellRef,
    cached: CachedValue,
) -> Result<Dynamic, Box<EvalAltResult>> {
    match cached {
        CachedValue::Value(value) => Ok(value),
        CachedValue::Pending => Err(invalid_arg(&format!("Circular reference at {}", cell_ref))),
        CachedValue::Failed(message) => {
            Err(invalid_arg(&format!("Error in {}: {}", cell_ref, message)))
        }
    }
}

/// Typed value of a cell: number, text, `()` for blanks, or the value of a
/// formula cell. Formula cells it depends on are evaluated first, each once.
fn resolve_cell(
    ctx: &NativeCallContext,
    grid: &Grid,
    custom_ast: Option<&AST>,
    cell_ref: CellRef,
) -> Result<Dynamic, Box<EvalAltResult>> {
    if let Some(cached) = cached_value(&cell_ref) {
        return cached_result(cell_ref, cached);
    }
    {
        let Some(entry) = grid.get(&cell_ref) else {
            return Ok(Dynamic::UNIT);
        };
        if !matches!(entry.contents, CellType::Formula(_)) {
            return Ok(entry.literal_value().unwrap_or(Dynamic::UNIT));
        }
    }

    let _scope = EvalScope::enter().ok_or_else(|| {
        invalid_arg(&format!("Formula nesting too deep at {}", cell_ref))
    })?;
    for formula_cell in formula_cells_in_order(grid, cell_ref) {
        if cached_value(&formula_cell).is_some() {
            continue;
        }
        let Some(formula) = formula_of(grid, &formula_cell) else {
            continue;
        };
        store_value(formula_cell, CachedValue::Pending);
        let value = match run_formula(ctx.engine(), &formula, custom_ast) {
            Ok(value) => CachedValue::Value(value),
            Err(e) => CachedValue::Failed(e.to_string()),
        };
        store_value(formula_cell, value);
    }

    match cached_value(&cell_ref) {
        Some(cached) => cached_result(cell_ref, cached),
        None => Ok(Dynamic::UNIT),
    }
}

/// Install SUM, AVERAGE, MAX, MIN and COUNT into `engine`.
///
/// Each name accepts one to four arguments. Multiple arguments are reduced as
/// one argument list, so `SUM(1, [2, 3])` is the same as `SUM([1, [2, 3]])`.
pub fn register_aggregates(engine: &mut Engine) {
    for builtin in AGGREGATES {
        register_aggregate(engine, builtin.kind);
    }
    tracing::debug!(count = AGGREGATES.len(), "registered aggregate functions");
}

fn register_aggregate(engine: &mut Engine, kind: Aggregate) {
    let name = kind.name();
    engine.register_fn(name, move |a: Dynamic| -> f64 { kind.apply(&a) });
    engine.register_fn(name, move |a: Dynamic, b: Dynamic| -> f64 {
        kind.apply(&Dynamic::from_array(vec![a, b]))
    });
    engine.register_fn(name, move |a: Dynamic, b: Dynamic, c: Dynamic| -> f64 {
        kind.apply(&Dynamic::from_array(vec![a, b, c]))
    });
    engine.register_fn(
        name,
        move |a: Dynamic, b: Dynamic, c: Dynamic, d: Dynamic| -> f64 {
            kind.apply(&Dynamic::from_array(vec![a, b, c, d]))
        },
    );
}

/// Register all built-in functions into the Rhai engine.
pub fn register_builtins(engine: &mut Engine, grid: Grid) {
    register_builtins_with_functions(engine, grid, None);
}

/// Register all built-ins. Formula cells read through `CELL`/`RANGE` are
/// evaluated with `custom_ast`, so they can call user-defined functions.
pub fn register_builtins_with_functions(engine: &mut Engine, grid: Grid, custom_ast: Option<AST>) {
    register_aggregates(engine);

    // CELL(row, col): typed value at cell

    let grid_cell = grid.clone();
    let ast_cell = custom_ast.clone();
    engine.register_fn(
        "CELL",
        move |ctx: NativeCallContext, row: i64, col: i64| -> Result<Dynamic, Box<EvalAltResult>> {
            let cell_ref = CellRef::new(to_usize(row, "row")?, to_usize(col, "col")?);
            resolve_cell(&ctx, &grid_cell, ast_cell.as_ref(), cell_ref)
        },
    );

    // RANGE(r1, c1, r2, c2): array of rows, each an array of typed values

    let grid_range = grid;
    let ast_range = custom_ast;
    engine.register_fn(
        "RANGE",
        move |ctx: NativeCallContext,
              r1: i64,
              c1: i64,
              r2: i64,
              c2: i64|
              -> Result<Array, Box<EvalAltResult>> {
            let range = to_range(r1, c1, r2, c2)?;
            let too_large = range
                .rows()
                .checked_mul(range.cols())
                .is_none_or(|n| n > MAX_RANGE_CELLS);
            if too_large {
                return Err(invalid_arg(&format!("Range too large: {}", range)));
            }

            let mut rows = Array::with_capacity(range.rows());
            for row in range.start.row..=range.end.row {
                let mut values = Array::with_capacity(range.cols());
                for col in range.start.col..=range.end.col {
                    values.push(resolve_cell(
                        &ctx,
                        &grid_range,
                        ast_range.as_ref(),
                        CellRef::new(row, col),
                    )?);
                }
                rows.push(Dynamic::from_array(values));
            }
            Ok(rows)
        },
    );

    // COLUMN_LABEL(index): 0 -> "A", 26 -> "AA"

    engine.register_fn(
        "COLUMN_LABEL",
        |index: i64| -> Result<String, Box<EvalAltResult>> {
            Ok(col_to_letters(to_usize(index, "index")?))
        },
    );

    // PARSE_CELL("A1"): returns [row, col] (0-indexed)
    engine.register_fn(
        "PARSE_CELL",
        |address: &str| -> Result<Array, Box<EvalAltResult>> {
            let cell_ref = CellRef::parse(address).map_err(|e| invalid_arg(&e.to_string()))?;
            Ok(vec![
                Dynamic::from(cell_ref.row as i64),
                Dynamic::from(cell_ref.col as i64),
            ])
        },
    );

    // FORMAT_CELL(row, col): returns "A1" (0-indexed)

    engine.register_fn(
        "FORMAT_CELL",
        |row: i64, col: i64| -> Result<String, Box<EvalAltResult>> {
            Ok(CellRef::new(to_usize(row, "row")?, to_usize(col, "col")?).to_string())
        },
    );

    // PARSE_RANGE("A1:B4"): returns [r1, c1, r2, c2], normalized

    engine.register_fn(
        "PARSE_RANGE",
        |range: &str| -> Result<Array, Box<EvalAltResult>> {
            let range = CellRange::parse(range).map_err(|e| invalid_arg(&e.to_string()))?;
            Ok(vec![
                Dynamic::from(range.start.row as i64),
                Dynamic::from(range.start.col as i64),
                Dynamic::from(range.end.row as i64),
                Dynamic::from(range.end.col as i64),
            ])
        },
    );

    // FORMAT_RANGE(r1, c1, r2, c2): returns "A1:B4", corners in any order

    engine.register_fn(
        "FORMAT_RANGE",
        |r1: i64, c1: i64, r2: i64, c2: i64| -> Result<String, Box<EvalAltResult>> {
            Ok(to_range(r1, c1, r2, c2)?.to_string())
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Cell;
    use dashmap::DashMap;
    use std::sync::Arc;

    fn engine_with(cells: &[(&str, &str)]) -> Engine {
        let grid: Grid = Arc::new(DashMap::new());
        for (address, input) in cells {
            grid.insert(CellRef::parse(address).unwrap(), Cell::from_input(input));
        }
        let mut engine = Engine::new();
        register_builtins(&mut engine, grid);
        engine
    }

    #[test]
    fn test_aggregates_registered_under_uppercase_names() {
        let mut engine = Engine::new();
        register_aggregates(&mut engine);

        let input = r#"[1, 2, [3, 4], (), "x", 5]"#;
        let sum: f64 = engine.eval(&format!("SUM({})", input)).unwrap();
        assert_eq!(sum, 15.0);
        let avg: f64 = engine.eval(&format!("AVERAGE({})", input)).unwrap();
        assert_eq!(avg, 3.0);
        let max: f64 = engine.eval(&format!("MAX({})", input)).unwrap();
        assert_eq!(max, 5.0);
        let min: f64 = engine.eval(&format!("MIN({})", input)).unwrap();
        assert_eq!(min, 1.0);
        let count: f64 = engine.eval(&format!("COUNT({})", input)).unwrap();
        assert_eq!(count, 5.0);
    }

    #[test]
    fn test_aggregates_never_fail() {
        let mut engine = Engine::new();
        register_aggregates(&mut engine);

        let result: f64 = engine.eval("SUM([])").unwrap();
        assert_eq!(result, 0.0);
        let result: f64 = engine.eval(r#"SUM([(), "a", true])"#).unwrap();
        assert_eq!(result, 0.0);
        let result: f64 = engine.eval(r#"COUNT([(), "a"])"#).unwrap();
        assert_eq!(result, 0.0);
        let result: f64 = engine.eval("AVERAGE([7])").unwrap();
        assert_eq!(result, 7.0);
        let result: f64 = engine.eval(r#"MAX("text")"#).unwrap();
        assert_eq!(result, 0.0);
    }

    #[test]
    fn test_aggregates_accept_several_arguments() {
        let mut engine = Engine::new();
        register_aggregates(&mut engine);

        let result: f64 = engine.eval("SUM(1, [2, 3])").unwrap();
        assert_eq!(result, 6.0);
        let result: f64 = engine.eval("MIN(4, 2.5, 9, [1.5])").unwrap();
        assert_eq!(result, 1.5);
    }

    #[test]
    fn test_range_returns_rows_with_blanks() {
        let engine = engine_with(&[("A1", "1"), ("B1", "x"), ("A2", "3")]);
        let rows: Array = engine.eval("RANGE(0, 0, 1, 1)").unwrap();
        assert_eq!(rows.len(), 2);

        let first = rows[0].clone().into_array().unwrap();
        assert_eq!(first[0].clone().cast::<f64>(), 1.0);
        assert_eq!(first[1].clone().into_string().unwrap(), "x");

        let second = rows[1].clone().into_array().unwrap();
        assert!(second[1].is_unit());
    }

    #[test]
    fn test_sum_over_range_skips_text_and_blanks() {
        let engine = engine_with(&[("A1", "10"), ("A2", "hello"), ("A4", "5")]);
        let result: f64 = engine.eval("SUM(RANGE(0, 0, 3, 0))").unwrap();
        assert_eq!(result, 15.0);
        let result: f64 = engine.eval("COUNT(RANGE(3, 0, 0, 0))").unwrap();
        assert_eq!(result, 2.0);
    }

    #[test]
    fn test_cell_evaluates_formula_cells() {
        let engine = engine_with(&[("A1", "2"), ("A2", "=A1 * 10"), ("A3", "=SUM(A1:A2)")]);
        let result: f64 = engine.eval("CELL(2, 0)").unwrap();
        assert_eq!(result, 22.0);
    }

    #[test]
    fn test_self_reference_is_reported_not_recursed() {
        let engine = engine_with(&[("A1", "=A1 + 1")]);
        let err = engine.eval::<Dynamic>("CELL(0, 0)").unwrap_err();
        assert!(err.to_string().contains("Circular reference at A1"), "{}", err);
    }

    #[test]
    fn test_long_formula_chain_resolves() {
        let mut cells = vec![("A1".to_string(), "1".to_string())];
        for row in 2..=200 {
            cells.push((format!("A{}", row), format!("=A{} + 1", row - 1)));
        }
        let refs: Vec<(&str, &str)> = cells.iter().map(|(a, b)| (a.as_str(), b.as_str())).collect();
        let engine = engine_with(&refs);
        let result: f64 = engine.eval("CELL(199, 0)").unwrap();
        assert_eq!(result, 200.0);
    }

    #[test]
    fn test_error_in_read_cell_propagates() {
        let engine = engine_with(&[("A1", "=1 / 0"), ("B1", "=A1 + 1")]);
        let err = engine.eval::<Dynamic>("CELL(0, 1)").unwrap_err();
        assert!(err.to_string().contains("Error in A1"), "{}", err);
    }

    #[test]
    fn test_read_cells_see_custom_functions() {
        let grid: Grid = Arc::new(DashMap::new());
        grid.insert(CellRef::new(0, 0), Cell::from_input("=double(2)"));
        grid.insert(CellRef::new(0, 1), Cell::from_input("=A1 + 1"));

        let mut engine = Engine::new();
        let ast = engine.compile("fn double(x) { x * 2 }").unwrap();
        register_builtins_with_functions(&mut engine, grid, Some(ast));
        let result: i64 = engine.eval("CELL(0, 1)").unwrap();
        assert_eq!(result, 5);
    }

    #[test]
    fn test_negative_indices_are_rejected() {
        let engine = engine_with(&[]);
        assert!(engine.eval::<Dynamic>("CELL(-1, 0)").is_err());
        assert!(engine.eval::<Array>("RANGE(0, 0, -2, 0)").is_err());
        assert!(engine.eval::<String>("FORMAT_CELL(-1, 0)").is_err());
        assert!(engine.eval::<String>("FORMAT_RANGE(-1, 0, 2, 2)").is_err());
        assert!(engine.eval::<String>("COLUMN_LABEL(-1)").is_err());
    }

    #[test]
    fn test_notation_builtins() {
        let engine = engine_with(&[]);

        let result: Array = engine.eval(r#"PARSE_CELL("B4")"#).unwrap();
        assert_eq!(result[0].clone().cast::<i64>(), 3);
        assert_eq!(result[1].clone().cast::<i64>(), 1);

        let result: String = engine.eval("FORMAT_CELL(3, 1)").unwrap();
        assert_eq!(result, "B4");

        let result: Array = engine.eval(r#"PARSE_RANGE("B4:A1")"#).unwrap();
        let values: Vec<i64> = result.into_iter().map(|v| v.cast::<i64>()).collect();
        assert_eq!(values, vec![0, 0, 3, 1]);

        let result: String = engine.eval("FORMAT_RANGE(2, 2, 0, 0)").unwrap();
        assert_eq!(result, "A1:C3");

        let result: String = engine.eval("COLUMN_LABEL(702)").unwrap();
        assert_eq!(result, "AAA");

        assert!(engine.eval::<Array>(r#"PARSE_CELL("A0")"#).is_err());
        assert!(engine.eval::<Array>(r#"PARSE_RANGE("A1")"#).is_err());
    }
}
