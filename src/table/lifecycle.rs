use std::fmt;

use crate::util::{Result, Status};

/// Lifecycle state of a table.
///
/// ```text
///            disable
///   Enabled ─────────→ Disabled
///      ↑ ↺ enable          │ ↺ disable
///      └───────────────────┘
///            enable
/// ```
///
/// Both transitions are allowed from either state. Structural and
/// destructive operations (alter, drop) are only permitted while `Disabled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableState {
    #[default]
    Enabled,
    Disabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Enable,
    Disable,
}

impl TableState {
    pub fn from_disabled(disabled: bool) -> Self {
        if disabled {
            TableState::Disabled
        } else {
            TableState::Enabled
        }
    }

    pub fn is_enabled(self) -> bool {
        self == TableState::Enabled
    }

    pub fn is_disabled(self) -> bool {
        self == TableState::Disabled
    }

    pub fn apply(self, transition: Transition) -> TableState {
        match transition {
            Transition::Enable => TableState::Enabled,
            Transition::Disable => TableState::Disabled,
        }
    }

    /// Gate for operations that require a disabled table.
    pub fn require_disabled(self, table: &str, operation: &str) -> Result<()> {
        match self {
            TableState::Disabled => Ok(()),
            TableState::Enabled => Err(Status::table_enabled(format!(
                "Table '{table}' must be disabled before {operation}"
            ))),
        }
    }
}

impl fmt::Display for TableState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableState::Enabled => write!(f, "ENABLED"),
            TableState::Disabled => write!(f, "DISABLED"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions_are_idempotent() {
        let state = TableState::default();
        assert!(state.is_enabled());

        let state = state.apply(Transition::Disable);
        assert!(state.is_disabled());
        assert_eq!(state.apply(Transition::Disable), TableState::Disabled);

        let state = state.apply(Transition::Enable);
        assert_eq!(state, TableState::Enabled);
        assert_eq!(state.apply(Transition::Enable), TableState::Enabled);
    }

    #[test]
    fn test_require_disabled() {
        let err = TableState::Enabled
            .require_disabled("users", "drop")
            .unwrap_err();
        assert!(err.is_table_enabled());
        assert!(TableState::Disabled.require_disabled("users", "drop").is_ok());
    }

    #[test]
    fn test_from_disabled_flag() {
        assert_eq!(TableState::from_disabled(true), TableState::Disabled);
        assert_eq!(TableState::from_disabled(false), TableState::Enabled);
    }
}
