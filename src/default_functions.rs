use directories::ProjectDirs;
use std::path::PathBuf;

pub(crate) fn default_functions_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("me", "shoryuken", "gridsheet")?;
    Some(proj.config_dir().join("default.rhai"))
}

/// Put `default.rhai` in front of the user's function files when it exists.
pub(crate) fn prepend_default_functions_if_present(
    functions: &mut Vec<PathBuf>,
    no_default_functions: bool,
) {
    if no_default_functions {
        return;
    }
    let Some(path) = default_functions_path() else {
        tracing::debug!("no config directory for default functions");
        return;
    };
    if path.is_file() {
        functions.insert(0, path);
    } else {
        tracing::debug!(path = %path.display(), "no default functions file");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_functions_path_ends_with_default_rhai() {
        if let Some(path) = default_functions_path() {
            assert!(path.ends_with("default.rhai"));
        }
    }

    #[test]
    fn disabled_default_functions_leave_list_alone() {
        let mut functions = vec![PathBuf::from("mine.rhai")];
        prepend_default_functions_if_present(&mut functions, true);
        assert_eq!(functions, vec![PathBuf::from("mine.rhai")]);
    }
}
