use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-zA-Z0-9]").unwrap());

/// One radio button + label of the process list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcOption {
    /// DOM id of the radio input.
    pub id: String,
    pub name: String,
}

impl ProcOption {
    pub fn new(name: &str) -> Self {
        Self {
            id: format!("proc_{}", NON_ALNUM.replace_all(name, "_")),
            name: name.to_string(),
        }
    }
}

/// The traced-process radio group and its current selection.
#[derive(Debug, Clone, Default)]
pub struct ProcessSelector {
    options: Vec<ProcOption>,
    selected: Option<String>,
}

impl ProcessSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the option list. A selection no longer offered is dropped.
    pub fn populate(&mut self, names: &[String]) {
        self.options = names.iter().map(|n| ProcOption::new(n)).collect();
        if let Some(sel) = &self.selected {
            if !self.contains(sel) {
                tracing::debug!(process = %sel, "selected process disappeared from list");
                self.selected = None;
            }
        }
    }

    pub fn options(&self) -> &[ProcOption] {
        &self.options
    }

    pub fn contains(&self, name: &str) -> bool {
        self.options.iter().any(|o| o.name == name)
    }

    /// Check the radio for `name`. Returns false for unlisted names.
    pub fn select(&mut self, name: &str) -> bool {
        if !self.contains(name) {
            tracing::warn!(process = %name, "ignoring selection of unknown process");
            return false;
        }
        self.selected = Some(name.to_string());
        true
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.selected.as_deref() == Some(name)
    }
}
