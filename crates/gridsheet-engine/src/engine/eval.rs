//! Rhai engine creation and formula evaluation.
//!
//! Creates the Rhai scripting engine with all spreadsheet built-in functions
//! registered (SUM, AVERAGE, cell accessors, etc.). Also handles evaluation
//! of formulas with optional user-defined custom functions from external files.

use rhai::{Engine, EvalAltResult, Position};

use super::value_cache::EvalScope;
use super::{AST, Dynamic, Grid, preprocess_formula};
use crate::builtins::register_builtins_with_functions;

/// Create a Rhai engine with built-ins registered.
pub fn create_engine(grid: Grid) -> Engine {
    let mut engine = Engine::new();
    crate::builtins::register_builtins(&mut engine, grid);
    engine
}

/// Create a Rhai engine with built-ins registered.
/// Optionally compiles custom functions from the provided script; formula
/// cells read by other formulas can call them too.
/// Returns the engine, compiled AST (if any), and any error message.
pub fn create_engine_with_functions(
    grid: Grid,
    custom_script: Option<&str>,
) -> (Engine, Option<AST>, Option<String>) {
    let mut engine = Engine::new();

    let (ast, error) = if let Some(script) = custom_script {
        match engine.compile(script) {
            Ok(ast) => (Some(ast), None),
            Err(e) => (None, Some(format!("Error in custom functions: {}", e))),
        }
    } else {
        (None, None)
    };

    register_builtins_with_functions(&mut engine, grid, ast.clone());
    (engine, ast, error)
}

/// Preprocess and run one formula, without opening an evaluation scope.
pub(crate) fn run_formula(
    engine: &Engine,
    formula: &str,
    custom_ast: Option<&AST>,
) -> Result<Dynamic, Box<EvalAltResult>> {
    let processed = preprocess_formula(formula);
    tracing::debug!(formula, processed = %processed, "evaluating formula");

    match custom_ast {
        Some(custom) => {
            let formula_ast = engine.compile(&processed).map_err(|e| {
                let parse_type = *e.0;
                let pos = e.1;
                Box::new(EvalAltResult::ErrorParsing(parse_type, pos))
            })?;
            let merged = custom.merge(&formula_ast);
            engine.eval_ast(&merged)
        }
        None => engine.eval(&processed),
    }
}

/// Evaluate a formula (without the leading '='), optionally with custom functions AST.
///
/// Formula cells the formula reads are computed once per call.
pub fn eval_formula(
    engine: &Engine,
    formula: &str,
    custom_ast: Option<&AST>,
) -> Result<Dynamic, Box<EvalAltResult>> {
    let _scope = EvalScope::enter().ok_or_else(|| {
        Box::new(EvalAltResult::ErrorRuntime(
            "Formula nesting too deep".into(),
            Position::NONE,
        ))
    })?;
    run_formula(engine, formula, custom_ast)
}
