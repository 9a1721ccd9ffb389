//! Binding options.

/// Default name of the table holding global functions.
pub const DEFAULT_GLOBAL_TABLE: &str = "Global";

/// Options controlling how a registry is exposed to Lua.
///
/// ```
/// use reflua::BindOptions;
///
/// let options = BindOptions::default()
///     .global_table("Native")
///     .expose_functions_as_globals(false);
/// assert_eq!(options.global_table_name(), "Native");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindOptions {
    global_table: String,
    expose_functions_as_globals: bool,
}

impl Default for BindOptions {
    fn default() -> Self {
        Self {
            global_table: DEFAULT_GLOBAL_TABLE.to_string(),
            expose_functions_as_globals: true,
        }
    }
}

impl BindOptions {
    /// Name of the table global functions are collected in.
    pub fn global_table(mut self, name: impl Into<String>) -> Self {
        self.global_table = name.into();
        self
    }

    /// Whether global functions are also bound as top-level Lua globals.
    pub fn expose_functions_as_globals(mut self, expose: bool) -> Self {
        self.expose_functions_as_globals = expose;
        self
    }

    /// Configured global table name.
    pub fn global_table_name(&self) -> &str {
        &self.global_table
    }

    /// Configured top-level exposure.
    pub fn exposes_functions_as_globals(&self) -> bool {
        self.expose_functions_as_globals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = BindOptions::default();
        assert_eq!(options.global_table_name(), "Global");
        assert!(options.exposes_functions_as_globals());
    }
}
