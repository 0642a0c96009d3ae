//! Location/shelf tracking across the row scan.
//!
//! Sheets group items under header-like rows: a bold main-location row
//! ("Basement") optionally followed by shelf rows ("Shelf 1 Row A"), then
//! the item rows themselves. [`SectionTracker`] carries that context from
//! row to row as an explicit three-state machine.

use parstock_core::LocationCatalog;

/// Where the scan currently is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SectionState {
    /// No main-location header seen yet.
    NoLocation,
    InMain { location: String },
    InSubsection { location: String, shelf: String },
}

impl SectionState {
    fn main_location(&self) -> Option<&str> {
        match self {
            SectionState::NoLocation => None,
            SectionState::InMain { location } | SectionState::InSubsection { location, .. } => {
                Some(location)
            }
        }
    }

    fn subsection(&self) -> Option<&str> {
        match self {
            SectionState::InSubsection { shelf, .. } => Some(shelf),
            _ => None,
        }
    }
}

/// Resolved position of an item row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Placement {
    pub location: String,
    pub shelf: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RowOutcome {
    /// Header, blank or unplaceable row.
    Skip,
    Item(Placement),
}

pub struct SectionTracker<'c> {
    catalog: &'c LocationCatalog,
    state: SectionState,
}

impl<'c> SectionTracker<'c> {
    pub fn new(catalog: &'c LocationCatalog) -> Self {
        Self {
            catalog,
            state: SectionState::NoLocation,
        }
    }

    pub fn state(&self) -> &SectionState {
        &self.state
    }

    /// Feed one row's trimmed location and product cells.
    ///
    /// Rows without a product can only change state. Item rows resolve their
    /// location against the current main location: a matching location cell
    /// is kept as written, a different one becomes the shelf, and with no
    /// main location yet the cell itself is the location.
    pub fn observe(&mut self, location_cell: &str, product: &str) -> RowOutcome {
        if product.is_empty() {
            self.observe_header(location_cell);
            return RowOutcome::Skip;
        }

        let main = self.state.main_location();
        let (location, row_shelf) = match (location_cell.is_empty(), main) {
            (true, main) => (main.map(String::from), None),
            (false, Some(main)) if LocationCatalog::same_location(location_cell, main) => {
                (Some(location_cell.to_string()), None)
            }
            (false, Some(main)) => (Some(main.to_string()), Some(location_cell.to_string())),
            (false, None) => (Some(location_cell.to_string()), None),
        };

        match location.filter(|l| !l.is_empty()) {
            Some(location) => RowOutcome::Item(Placement {
                location,
                shelf: row_shelf.or_else(|| self.state.subsection().map(String::from)),
            }),
            None => RowOutcome::Skip,
        }
    }

    fn observe_header(&mut self, location_cell: &str) {
        if location_cell.is_empty() {
            return;
        }
        if self.catalog.is_main_location(location_cell) {
            log::debug!("main location: {}", location_cell);
            self.state = SectionState::InMain {
                location: location_cell.to_string(),
            };
            return;
        }
        let main = match self.state.main_location() {
            Some(main) if !LocationCatalog::same_location(location_cell, main) => main.to_string(),
            _ => return,
        };
        self.state = SectionState::InSubsection {
            location: main,
            shelf: location_cell.to_string(),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(location: &str, shelf: Option<&str>) -> RowOutcome {
        RowOutcome::Item(Placement {
            location: location.into(),
            shelf: shelf.map(String::from),
        })
    }

    #[test]
    fn main_then_shelf_then_item() {
        let catalog = LocationCatalog::default();
        let mut t = SectionTracker::new(&catalog);
        assert_eq!(t.observe("Basement", ""), RowOutcome::Skip);
        assert_eq!(t.observe("Shelf 1 Row A", ""), RowOutcome::Skip);
        assert_eq!(t.observe("", "Gloves"), item("Basement", Some("Shelf 1 Row A")));
        assert_eq!(
            t.state(),
            &SectionState::InSubsection {
                location: "Basement".into(),
                shelf: "Shelf 1 Row A".into()
            }
        );
    }

    #[test]
    fn new_main_location_clears_the_shelf() {
        let catalog = LocationCatalog::default();
        let mut t = SectionTracker::new(&catalog);
        t.observe("Basement", "");
        t.observe("Shelf 2", "");
        t.observe("Golf", "");
        assert_eq!(t.observe("", "Tees"), item("Golf", None));
    }

    #[test]
    fn location_cell_on_an_item_row_becomes_the_shelf() {
        let catalog = LocationCatalog::default();
        let mut t = SectionTracker::new(&catalog);
        t.observe("Basement", "");
        assert_eq!(t.observe("Top bin", "Tape"), item("Basement", Some("Top bin")));
        // Matching the main location keeps the row's own spelling.
        assert_eq!(t.observe("BASEMENT", "Bleach"), item("BASEMENT", None));
    }

    #[test]
    fn row_shelf_beats_the_current_subsection() {
        let catalog = LocationCatalog::default();
        let mut t = SectionTracker::new(&catalog);
        t.observe("Basement", "");
        t.observe("Shelf 1", "");
        assert_eq!(t.observe("Shelf 9", "Rags"), item("Basement", Some("Shelf 9")));
        assert_eq!(t.observe("", "Mops"), item("Basement", Some("Shelf 1")));
    }

    #[test]
    fn before_any_main_location() {
        let catalog = LocationCatalog::default();
        let mut t = SectionTracker::new(&catalog);
        // Not a known location and nothing to nest under.
        assert_eq!(t.observe("Attic", ""), RowOutcome::Skip);
        assert_eq!(t.state(), &SectionState::NoLocation);
        assert_eq!(t.observe("Attic", "Fans"), item("Attic", None));
        assert_eq!(t.observe("", "Orphan"), RowOutcome::Skip);
    }

    #[test]
    fn blank_and_repeated_header_rows_change_nothing() {
        let catalog = LocationCatalog::default();
        let mut t = SectionTracker::new(&catalog);
        t.observe("Golf", "");
        t.observe("", "");
        t.observe("golf", "");
        assert_eq!(
            t.state(),
            &SectionState::InMain {
                location: "golf".into()
            }
        );
    }

    #[test]
    fn non_ascii_main_location_matches_regardless_of_case() {
        let catalog = LocationCatalog::new(vec!["Café".into()], vec![]);
        let mut t = SectionTracker::new(&catalog);
        t.observe("CAFÉ", "");
        assert_eq!(t.observe("café", "Cups"), item("café", None));
        t.observe("café", "");
        assert_eq!(
            t.state(),
            &SectionState::InMain {
                location: "café".into()
            }
        );
    }

    #[test]
    fn custom_catalog_drives_classification() {
        let catalog = LocationCatalog::new(vec!["Cellar".into()], vec![]);
        let mut t = SectionTracker::new(&catalog);
        t.observe("Cellar", "");
        t.observe("Basement", "");
        assert_eq!(t.observe("", "Wine"), item("Cellar", Some("Basement")));
    }
}
