//! Per-person preference rows and name search
//!
//! Every day sheet has the same fixed layout: two title/header rows, then one
//! row per person with six columns. The layout is a convention of the sheets,
//! not something inferred from their content.
//!
//! Search is a linear scan. Sheets hold tens of rows, so no index is kept.

use serde::Serialize;

use crate::sheets::Grid;

/// Rows at the top of every sheet that are not records
pub const HEADER_ROWS: usize = 2;

/// Cells per record
pub const COLUMN_COUNT: usize = 6;

/// Column holding the person's name
pub const NAME_COLUMN: usize = 1;
pub const BREAKFAST_COLUMN: usize = 2;
pub const LUNCH_COLUMN: usize = 3;
pub const DINNER_COLUMN: usize = 4;
pub const PREFERENCE_COLUMN: usize = 5;

/// One person's row, cells in sheet order
///
/// The service trims empty trailing cells, so a row may be shorter than
/// [`COLUMN_COUNT`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row(Vec<String>);

impl Row {
    pub fn new(cells: Vec<String>) -> Self {
        Self(cells)
    }

    /// Cell at `index`, `None` when the row is shorter
    pub fn cell(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn cells(&self) -> &[String] {
        &self.0
    }

    pub fn name(&self) -> Option<&str> {
        self.cell(NAME_COLUMN)
    }

    /// Whether the name cell contains `needle`, which must already be lowercase
    fn name_contains(&self, needle: &str) -> bool {
        match self.name() {
            Some(name) if !name.is_empty() => name.to_lowercase().contains(needle),
            _ => false,
        }
    }

    /// The five display fields of this row
    pub fn card(&self) -> PreferenceCard {
        let field = |index| self.cell(index).unwrap_or_default().to_string();
        PreferenceCard {
            name: field(NAME_COLUMN),
            breakfast: field(BREAKFAST_COLUMN),
            lunch: field(LUNCH_COLUMN),
            dinner: field(DINNER_COLUMN),
            preference: field(PREFERENCE_COLUMN),
        }
    }
}

impl<S: Into<String>> FromIterator<S> for Row {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// What the user sees for a selected person
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PreferenceCard {
    pub name: String,
    pub breakfast: String,
    pub lunch: String,
    pub dinner: String,
    pub preference: String,
}

/// Today's rows with the header rows removed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordSet {
    rows: Vec<Row>,
}

impl RecordSet {
    /// Drop the header rows of `grid`; a grid shorter than that yields no records
    pub fn from_grid(grid: Grid) -> Self {
        let rows = grid.into_iter().skip(HEADER_ROWS).map(Row::new).collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows whose name contains `term`, ignoring case, in sheet order
    ///
    /// An empty term matches nothing; there is no browse-all.
    pub fn search(&self, term: &str) -> Vec<Row> {
        if term.is_empty() {
            return Vec::new();
        }
        let needle = term.to_lowercase();
        self.rows
            .iter()
            .filter(|row| row.name_contains(&needle))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[&str]]) -> Grid {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    fn sample() -> RecordSet {
        RecordSet::from_grid(grid(&[
            &["h1", "h1", "h1", "h1", "h1", "h1"],
            &["h2", "h2", "h2", "h2", "h2", "h2"],
            &["1", "Alice", "OFF", "ON", "ON", "veg"],
            &["2", "Bob", "ON", "ON", "OFF", "none"],
            &["3", "alina K", "ON", "OFF", "ON"],
            &["4"],
            &["5", "", "ON", "ON", "ON", "x"],
        ]))
    }

    #[test]
    fn short_grids_have_no_records() {
        assert!(RecordSet::from_grid(Vec::new()).is_empty());
        assert!(RecordSet::from_grid(grid(&[&["h1"]])).is_empty());
        assert!(RecordSet::from_grid(grid(&[&["h1"], &["h2"]])).is_empty());
        assert_eq!(RecordSet::from_grid(grid(&[&["h1"], &["h2"], &["1", "A"]])).len(), 1);
    }

    #[test]
    fn empty_term_matches_nothing() {
        assert!(sample().search("").is_empty());
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let names: Vec<_> = sample()
            .search("ALI")
            .iter()
            .map(|r| r.name().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["Alice", "alina K"]);
    }

    #[test]
    fn search_is_sound_and_complete() {
        let records = sample();
        for term in ["a", "B", "ob", "K", "zzz", " ", "1"] {
            let found = records.search(term);
            let lower = term.to_lowercase();
            let predicate = |row: &Row| {
                row.name()
                    .map(|n| !n.is_empty() && n.to_lowercase().contains(&lower))
                    .unwrap_or(false)
            };
            assert!(found.iter().all(predicate), "unsound for {:?}", term);
            let expected: Vec<Row> = records.rows().iter().filter(|r| predicate(r)).cloned().collect();
            assert_eq!(found, expected, "incomplete for {:?}", term);
        }
    }

    #[test]
    fn search_is_idempotent() {
        let records = sample();
        assert_eq!(records.search("al"), records.search("al"));
    }

    #[test]
    fn rows_without_names_never_match() {
        let records = sample();
        assert!(records.search("4").is_empty());
        assert!(records.search("x").is_empty());
    }

    #[test]
    fn card_of_short_row_uses_blanks() {
        let row: Row = ["3", "alina K", "ON", "OFF", "ON"].into_iter().collect();
        let card = row.card();
        assert_eq!(card.name, "alina K");
        assert_eq!(card.dinner, "ON");
        assert_eq!(card.preference, "");
    }

    #[test]
    fn alice_and_bob() {
        let records = RecordSet::from_grid(grid(&[
            &["h1", "h1", "h1", "h1", "h1", "h1"],
            &["h2", "h2", "h2", "h2", "h2", "h2"],
            &["1", "Alice", "OFF", "ON", "ON", "veg"],
            &["2", "Bob", "ON", "ON", "OFF", "none"],
        ]));
        assert_eq!(records.len(), 2);

        let found = records.search("ali");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].cells().len(), COLUMN_COUNT);
        assert_eq!(found[0].cells(), &["1", "Alice", "OFF", "ON", "ON", "veg"]);

        let card = found[0].card();
        assert_eq!(card.breakfast, "OFF");
        assert_eq!(card.lunch, "ON");
        assert_eq!(card.dinner, "ON");
        assert_eq!(card.preference, "veg");
    }
}
