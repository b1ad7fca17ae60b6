//! Coordinate field vocabulary offered after a root is chosen.

use crate::domain::model::CoordinateFields;

/// Column names from the first selected file plus the current X and Y pick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldChoices {
    columns: Vec<String>,
    x: Option<usize>,
    y: Option<usize>,
}

impl FieldChoices {
    /// Preselect the first column matching a preference (case-insensitive),
    /// falling back to the first column.
    pub fn new<S: AsRef<str>>(columns: Vec<String>, x_prefs: &[S], y_prefs: &[S]) -> Self {
        let x = preselect(&columns, x_prefs);
        let y = preselect(&columns, y_prefs);
        Self { columns, x, y }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn x(&self) -> Option<&str> {
        self.x.map(|index| self.columns[index].as_str())
    }

    pub fn y(&self) -> Option<&str> {
        self.y.map(|index| self.columns[index].as_str())
    }

    /// Returns `false` when no column carries that exact name.
    pub fn select_x(&mut self, name: &str) -> bool {
        select(&self.columns, &mut self.x, name)
    }

    pub fn select_y(&mut self, name: &str) -> bool {
        select(&self.columns, &mut self.y, name)
    }

    pub fn cycle_x(&mut self, step: isize) {
        cycle(self.columns.len(), &mut self.x, step);
    }

    pub fn cycle_y(&mut self, step: isize) {
        cycle(self.columns.len(), &mut self.y, step);
    }

    /// Both picks, or `None` while either is missing or blank.
    pub fn selected(&self) -> Option<CoordinateFields> {
        CoordinateFields::new(self.x()?, self.y()?)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

fn preselect<S: AsRef<str>>(columns: &[String], prefs: &[S]) -> Option<usize> {
    prefs
        .iter()
        .find_map(|pref| {
            columns
                .iter()
                .position(|column| column.eq_ignore_ascii_case(pref.as_ref()))
        })
        .or_else(|| (!columns.is_empty()).then_some(0))
}

fn select(columns: &[String], slot: &mut Option<usize>, name: &str) -> bool {
    match columns.iter().position(|column| column == name) {
        Some(index) => {
            *slot = Some(index);
            true
        }
        None => false,
    }
}

fn cycle(len: usize, slot: &mut Option<usize>, step: isize) {
    if len == 0 {
        return;
    }
    let current = slot.unwrap_or(0) as isize;
    *slot = Some((current + step).rem_euclid(len as isize) as usize);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn preselects_preferences_case_insensitively() {
        let choices = FieldChoices::new(
            columns(&["id", "Latitude", "LON"]),
            &["lon", "x"],
            &["lat", "latitude"],
        );
        assert_eq!(choices.x(), Some("LON"));
        assert_eq!(choices.y(), Some("Latitude"));
        let fields = choices.selected().unwrap();
        assert_eq!((fields.x.as_str(), fields.y.as_str()), ("LON", "Latitude"));
    }

    #[test]
    fn falls_back_to_first_column() {
        let choices = FieldChoices::new(columns(&["a", "b"]), &["lon"], &["lat"]);
        assert_eq!(choices.x(), Some("a"));
        assert_eq!(choices.y(), Some("a"));
    }

    #[test]
    fn empty_header_has_no_selection() {
        let choices = FieldChoices::new(Vec::new(), &["lon"], &["lat"]);
        assert!(choices.is_empty());
        assert_eq!(choices.selected(), None);
    }

    #[test]
    fn select_and_cycle_wrap_around() {
        let mut choices = FieldChoices::new(columns(&["a", "b", "c"]), &["a"], &["a"]);
        assert!(choices.select_y("c"));
        assert!(!choices.select_y("missing"));
        assert_eq!(choices.y(), Some("c"));

        choices.cycle_y(1);
        assert_eq!(choices.y(), Some("a"));
        choices.cycle_x(-1);
        assert_eq!(choices.x(), Some("c"));
    }

    #[test]
    fn blank_column_is_not_a_usable_field() {
        let choices = FieldChoices::new(columns(&["", "lat"]), &["lon"], &["lat"]);
        assert_eq!(choices.x(), Some(""));
        assert_eq!(choices.selected(), None);
    }
}
