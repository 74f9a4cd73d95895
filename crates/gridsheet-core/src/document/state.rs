use gridsheet_engine::engine::{AST, Cell, CellRef, Grid, column_headers, create_engine_with_functions};
use rand::Rng;
use rhai::Engine;
use std::path::PathBuf;

/// Rows in a new sheet.
pub const DEFAULT_ROWS: usize = 50;
/// Columns in a new sheet (A..Z).
pub const DEFAULT_COLS: usize = 26;

/// Sample values fill at most this many leading rows and columns.
const SAMPLE_BLOCK: usize = 5;

/// UI-agnostic document state for the spreadsheet.
pub struct Document {
    /// The spreadsheet grid (DashMap is internally Arc-based, clones are cheap)
    pub grid: Grid,
    /// Rhai engine for evaluating formulas
    pub engine: Engine,
    /// Number of rows in the sheet
    pub(crate) rows: usize,
    /// Number of columns in the sheet
    pub(crate) cols: usize,
    /// Whether the grid has been modified
    pub modified: bool,
    /// Paths to custom Rhai functions files
    pub functions_files: Vec<PathBuf>,
    /// Cached custom functions script content (concatenated from all files)
    pub custom_functions: Option<String>,
    /// Compiled custom functions AST
    pub custom_ast: Option<AST>,
}

impl Document {
    /// Create an empty 50 x 26 sheet.
    ///
    /// This constructor is side-effect free: it does not touch the filesystem.
    pub fn new() -> Self {
        Self::with_size(DEFAULT_ROWS, DEFAULT_COLS)
    }

    pub fn with_size(rows: usize, cols: usize) -> Self {
        let grid: Grid = std::sync::Arc::new(dashmap::DashMap::new());
        let (engine, _, _) = create_engine_with_functions(grid.clone(), None);

        Document {
            grid,
            engine,
            rows,
            cols,
            modified: false,
            functions_files: Vec::new(),
            custom_functions: None,
            custom_ast: None,
        }
    }

    /// Create a sheet whose top-left 5 x 5 block holds random integers in 0..100.
    pub fn with_sample_data(rows: usize, cols: usize) -> Self {
        let doc = Self::with_size(rows, cols);
        let mut rng = rand::thread_rng();
        for row in 0..rows.min(SAMPLE_BLOCK) {
            for col in 0..cols.min(SAMPLE_BLOCK) {
                let n: u32 = rng.gen_range(0..100);
                doc.grid
                    .insert(CellRef::new(row, col), Cell::new_number(f64::from(n)));
            }
        }
        doc
    }

    /// Create a new document and load custom function files.
    /// Files that fail to load are logged and skipped.
    pub fn with_functions(functions_files: Vec<PathBuf>) -> Self {
        let mut doc = Self::new();
        for path in &functions_files {
            if let Err(e) = doc.load_functions(path) {
                tracing::warn!(path = %path.display(), error = %e, "skipping functions file");
            }
        }
        doc
    }

    /// Recreate the Rhai engine with updated custom functions.
    /// Returns any Rhai compilation error message.
    pub(crate) fn recreate_engine_with_functions(&mut self) -> Option<String> {
        let (engine, ast, error) =
            create_engine_with_functions(self.grid.clone(), self.custom_functions.as_deref());
        self.engine = engine;
        self.custom_ast = ast;
        error
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Column header labels for the current width (A, B, ..., Z, AA, ...).
    pub fn column_headers(&self) -> Vec<String> {
        column_headers(self.cols)
    }

    /// Snapshot of a cell, if it holds anything.
    pub fn cell(&self, cell_ref: &CellRef) -> Option<Cell> {
        self.grid.get(cell_ref).map(|entry| entry.clone())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
