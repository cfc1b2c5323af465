//! Filter and sort pipeline shared by every list on every page.

use std::cmp::Ordering;

use crate::record::{Record, parse_date};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    /// CSS class the sorted column header carries.
    pub fn class(self) -> &'static str {
        match self {
            SortDirection::Ascending => "sort-asc",
            SortDirection::Descending => "sort-desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortState {
    pub column: String,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Cards,
    Table,
}

/// Per-controller view state: search term, sort, presentation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewState {
    pub filter: String,
    pub sort: Option<SortState>,
    pub view_mode: ViewMode,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Header click: same column flips the direction, a new column starts ascending.
    pub fn sort_by(&mut self, column: &str) {
        let direction = match &self.sort {
            Some(current) if current.column == column => current.direction.flipped(),
            _ => SortDirection::Ascending,
        };
        self.sort = Some(SortState {
            column: column.to_string(),
            direction,
        });
    }

    pub fn set_filter(&mut self, term: &str) {
        self.filter = term.to_string();
    }

    pub fn direction_of(&self, column: &str) -> Option<SortDirection> {
        self.sort
            .as_ref()
            .filter(|s| s.column == column)
            .map(|s| s.direction)
    }
}

/// Where the search term is looked for in a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    /// A scalar field
    Text(&'static str),
    /// Several fields joined with a space (first + last name)
    Joined(&'static [&'static str]),
    /// A field of every object inside an array field
    Nested {
        array: &'static str,
        field: &'static str,
    },
}

impl FilterField {
    fn haystack(&self, record: &Record) -> String {
        match self {
            FilterField::Text(field) => record.scalar(field).unwrap_or_default(),
            FilterField::Joined(fields) => fields
                .iter()
                .map(|f| record.scalar(f).unwrap_or_default())
                .collect::<Vec<_>>()
                .join(" "),
            FilterField::Nested { array, field } => record
                .records(array)
                .iter()
                .map(|r| r.scalar(field).unwrap_or_default())
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

/// Case-insensitive substring match over the declared fields.
pub fn matches(record: &Record, term: &str, fields: &[FilterField]) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return true;
    }
    fields
        .iter()
        .any(|f| f.haystack(record).to_lowercase().contains(&term))
}

/// Keep the records matching `term`; `None` and blank terms keep everything.
pub fn filter_records<'a>(
    records: &'a [Record],
    term: Option<&str>,
    fields: &[FilterField],
) -> Vec<&'a Record> {
    let term = term.unwrap_or("");
    records
        .iter()
        .filter(|r| matches(r, term, fields))
        .collect()
}

/// Three-way comparison of two cell values
///
/// Both parse as dates: chronological. Both parse as numbers: numeric, so
/// "9" sorts before "10". Otherwise text, case-insensitive first.
pub fn compare_values(a: &str, b: &str) -> Ordering {
    if let (Some(da), Some(db)) = (parse_date(a), parse_date(b)) {
        return da.cmp(&db);
    }
    if let (Some(na), Some(nb)) = (parse_number(a), parse_number(b)) {
        return na.partial_cmp(&nb).unwrap_or(Ordering::Equal);
    }
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|n| !n.is_nan())
}

/// Sort in place by `sort.column`
///
/// Descending is the exact reverse of ascending, so toggling a column twice
/// mirrors the order even across ties.
pub fn sort_records(records: &mut [&Record], sort: &SortState) {
    records.sort_by(|a, b| {
        let av = a.scalar(&sort.column).unwrap_or_default();
        let bv = b.scalar(&sort.column).unwrap_or_default();
        compare_values(&av, &bv)
    });
    if sort.direction == SortDirection::Descending {
        records.reverse();
    }
}

/// Filter then sort: the order every view mode renders.
pub fn arrange<'a>(
    records: &'a [Record],
    view: &ViewState,
    fields: &[FilterField],
) -> Vec<&'a Record> {
    let mut visible = filter_records(records, Some(&view.filter), fields);
    if let Some(sort) = &view.sort {
        sort_records(&mut visible, sort);
    }
    visible
}
