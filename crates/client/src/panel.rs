//! Data-panel state machine.
//!
//! Models one entity's CRUD screen without rendering anything: the loading
//! lifecycle, the row list, single-row selection, and which actions are
//! currently available.

use std::mem;

/// Where the panel is in its loading lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelState<T> {
    /// Nothing requested yet.
    Idle,
    /// A list request is in flight.
    Loading,
    /// Rows are on screen.
    Loaded(Vec<T>),
    /// An operation failed; the previous rows stay on screen behind the
    /// message until it is dismissed.
    ErrorShown {
        /// Rows kept from before the failure.
        rows: Vec<T>,
        /// Message to show the user.
        message: String,
    },
}

/// Headless controller for an entity's CRUD screen.
#[derive(Debug)]
pub struct DataPanel<T> {
    state: PanelState<T>,
    selected: Option<usize>,
    privileged: bool,
}

impl<T> DataPanel<T> {
    /// Creates an idle panel. `privileged` unlocks the add affordance and
    /// reflects the signed-in user's role.
    #[must_use]
    pub fn new(privileged: bool) -> Self {
        Self {
            state: PanelState::Idle,
            selected: None,
            privileged,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> &PanelState<T> {
        &self.state
    }

    /// Rows currently on screen, also while an error is shown.
    #[must_use]
    pub fn rows(&self) -> &[T] {
        match &self.state {
            PanelState::Loaded(rows) | PanelState::ErrorShown { rows, .. } => rows,
            PanelState::Idle | PanelState::Loading => &[],
        }
    }

    /// Index of the selected row, if any.
    #[must_use]
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Marks a list request as in flight and drops the selection.
    pub fn begin_load(&mut self) {
        self.state = PanelState::Loading;
        self.selected = None;
    }

    /// Puts the fetched rows on screen.
    pub fn finish_load(&mut self, rows: Vec<T>) {
        self.state = PanelState::Loaded(rows);
        self.selected = None;
    }

    /// Reports a failed list request. Rows already on screen stay there.
    pub fn fail_load(&mut self, message: impl Into<String>) {
        let rows = self.take_rows();
        self.state = PanelState::ErrorShown {
            rows,
            message: message.into(),
        };
    }

    /// Replaces the rows after a successful mutation and refresh.
    pub fn apply_mutation_success(&mut self, rows: Vec<T>) {
        self.state = PanelState::Loaded(rows);
        self.selected = None;
    }

    /// Reports a failed mutation; the list is unchanged and the selection
    /// is kept.
    pub fn apply_mutation_failure(&mut self, message: impl Into<String>) {
        let rows = self.take_rows();
        self.state = PanelState::ErrorShown {
            rows,
            message: message.into(),
        };
    }

    /// Clears the error and returns to the rows that were on screen.
    pub fn dismiss_error(&mut self) {
        if let PanelState::ErrorShown { .. } = self.state {
            let rows = self.take_rows();
            self.state = PanelState::Loaded(rows);
        }
    }

    /// Selects the row at `index`. Out-of-range indices are ignored.
    pub fn select(&mut self, index: usize) {
        if index < self.rows().len() {
            self.selected = Some(index);
        }
    }

    /// Drops the selection.
    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Whether the add action is available.
    #[must_use]
    pub fn can_add(&self) -> bool {
        self.privileged
    }

    /// Whether the edit action is available.
    #[must_use]
    pub fn can_edit(&self) -> bool {
        self.selected.is_some()
    }

    /// Whether the delete action is available.
    #[must_use]
    pub fn can_delete(&self) -> bool {
        self.selected.is_some()
    }

    fn take_rows(&mut self) -> Vec<T> {
        match mem::replace(&mut self.state, PanelState::Idle) {
            PanelState::Loaded(rows) | PanelState::ErrorShown { rows, .. } => rows,
            PanelState::Idle | PanelState::Loading => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DataPanel, PanelState};

    fn loaded_panel() -> DataPanel<&'static str> {
        let mut panel = DataPanel::new(true);
        panel.begin_load();
        panel.finish_load(vec!["pan de batalla", "torta tres leches"]);
        panel
    }

    #[test]
    fn load_lifecycle_reaches_loaded() {
        let mut panel: DataPanel<&str> = DataPanel::new(true);
        assert_eq!(*panel.state(), PanelState::Idle);
        assert!(panel.rows().is_empty());

        panel.begin_load();
        assert_eq!(*panel.state(), PanelState::Loading);

        panel.finish_load(vec!["empanada"]);
        assert_eq!(panel.rows(), ["empanada"]);
    }

    #[test]
    fn selection_gates_edit_and_delete() {
        let mut panel = loaded_panel();
        assert!(!panel.can_edit());
        assert!(!panel.can_delete());

        panel.select(1);
        assert_eq!(panel.selected(), Some(1));
        assert!(panel.can_edit());
        assert!(panel.can_delete());

        panel.clear_selection();
        assert!(!panel.can_edit());
    }

    #[test]
    fn out_of_range_selection_is_ignored() {
        let mut panel = loaded_panel();
        panel.select(7);
        assert_eq!(panel.selected(), None);
    }

    #[test]
    fn add_is_gated_on_the_privileged_role() {
        let privileged: DataPanel<&str> = DataPanel::new(true);
        let regular: DataPanel<&str> = DataPanel::new(false);
        assert!(privileged.can_add());
        assert!(!regular.can_add());
    }

    #[test]
    fn failed_mutation_keeps_rows_until_dismissed() {
        let mut panel = loaded_panel();
        panel.select(0);

        panel.apply_mutation_failure("El cliente tiene pedidos asociados.");
        assert_eq!(panel.rows(), ["pan de batalla", "torta tres leches"]);
        assert_eq!(panel.selected(), Some(0));
        assert!(matches!(panel.state(), PanelState::ErrorShown { .. }));

        panel.dismiss_error();
        assert_eq!(
            *panel.state(),
            PanelState::Loaded(vec!["pan de batalla", "torta tres leches"])
        );
    }

    #[test]
    fn successful_mutation_refreshes_rows_and_clears_selection() {
        let mut panel = loaded_panel();
        panel.select(1);

        panel.apply_mutation_success(vec!["pan de batalla"]);
        assert_eq!(panel.rows(), ["pan de batalla"]);
        assert_eq!(panel.selected(), None);
    }

    #[test]
    fn failed_load_on_an_empty_panel_shows_no_rows() {
        let mut panel: DataPanel<&str> = DataPanel::new(false);
        panel.begin_load();
        panel.fail_load("Error interno del servidor");

        assert!(panel.rows().is_empty());
        assert!(matches!(panel.state(), PanelState::ErrorShown { .. }));
    }
}
