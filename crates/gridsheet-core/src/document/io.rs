use super::Document;
use crate::error::{GridsheetError, Result};
use std::path::{Path, PathBuf};

const MAX_FUNCTION_FILE_BYTES: u64 = 1_048_576; // 1 MiB

fn read_functions_file(path: &Path) -> Result<String> {
    let meta = std::fs::metadata(path)?;
    if meta.len() > MAX_FUNCTION_FILE_BYTES {
        return Err(GridsheetError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!(
                "Refusing to read {}: functions file too large ({} bytes, max {})",
                path.display(),
                meta.len(),
                MAX_FUNCTION_FILE_BYTES
            ),
        )));
    }
    Ok(std::fs::read_to_string(path)?)
}

impl Document {
    /// Compile `script` against this grid and install it only if it compiles.
    fn commit_functions(&mut self, script: String) -> Result<()> {
        let previous = self.custom_functions.replace(script);
        if let Some(err) = self.recreate_engine_with_functions() {
            self.custom_functions = previous;
            self.recreate_engine_with_functions();
            return Err(GridsheetError::RhaiCompile(err));
        }
        Ok(())
    }

    /// Load custom Rhai functions from a file (appended to those already loaded).
    /// Returns the canonical path of the file.
    pub fn load_functions(&mut self, path: &Path) -> Result<PathBuf> {
        let path_buf = std::fs::canonicalize(path)?;
        if self.functions_files.contains(&path_buf) {
            return Ok(path_buf);
        }
        let content = read_functions_file(&path_buf)?;

        let merged = match &self.custom_functions {
            Some(existing) => format!("{}\n\n{}", existing, content),
            None => content,
        };
        self.commit_functions(merged)?;
        self.functions_files.push(path_buf.clone());

        tracing::debug!(path = %path_buf.display(), "loaded functions file");
        Ok(path_buf)
    }

    /// Re-read every loaded functions file. Returns the number of files.
    pub fn reload_functions(&mut self) -> Result<usize> {
        if self.functions_files.is_empty() {
            return Err(GridsheetError::NoFunctionsLoaded);
        }

        let mut sources = Vec::with_capacity(self.functions_files.len());
        for path in &self.functions_files {
            sources.push(read_functions_file(path)?);
        }
        self.commit_functions(sources.join("\n\n"))?;

        tracing::debug!(files = self.functions_files.len(), "reloaded functions");
        Ok(self.functions_files.len())
    }
}
