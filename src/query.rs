//! City list query pipeline
//!
//! Pure functions that turn the accumulated city records plus the current
//! query state (sort and per-column filters) into the rows to display, and
//! the live search input into autocomplete suggestions.
//!
//! Rows are sorted first and filtered second, so rows that are equal under the
//! sort key keep their arrival order after filtering.

use std::cmp::Ordering;
use std::fmt;

use crate::data::City;

/// Maximum number of autocomplete suggestions
pub const MAX_SUGGESTIONS: usize = 5;

/// A sortable, filterable column of the city table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CityField {
    /// The city column shows and sorts on the ASCII name but filters on the
    /// display name
    Name,
    Country,
    Timezone,
}

impl CityField {
    pub const ALL: [CityField; 3] = [CityField::Name, CityField::Country, CityField::Timezone];

    /// The record's value for this column; missing values read as ""
    pub fn value(self, city: &City) -> &str {
        match self {
            CityField::Name => city.ascii_name(),
            CityField::Country => city.country(),
            CityField::Timezone => city.timezone(),
        }
    }

    /// The value a column filter matches against
    pub fn filter_value(self, city: &City) -> &str {
        match self {
            CityField::Name => city.display_name(),
            _ => self.value(city),
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            CityField::Name => "City",
            CityField::Country => "Country",
            CityField::Timezone => "Timezone",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortConfig {
    pub field: CityField,
    pub direction: SortDirection,
}

impl SortConfig {
    fn compare(&self, a: &City, b: &City) -> Ordering {
        let ordering = self.field.value(a).cmp(self.field.value(b));
        match self.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// Per-column filter text; an empty entry imposes no constraint
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    name: String,
    country: String,
    timezone: String,
}

impl Filters {
    pub fn get(&self, field: CityField) -> &str {
        match field {
            CityField::Name => &self.name,
            CityField::Country => &self.country,
            CityField::Timezone => &self.timezone,
        }
    }

    pub fn get_mut(&mut self, field: CityField) -> &mut String {
        match field {
            CityField::Name => &mut self.name,
            CityField::Country => &mut self.country,
            CityField::Timezone => &mut self.timezone,
        }
    }

    pub fn set(&mut self, field: CityField, text: impl Into<String>) {
        *self.get_mut(field) = text.into();
    }

    pub fn is_empty(&self) -> bool {
        CityField::ALL.iter().all(|f| self.get(*f).is_empty())
    }

    /// True if the city satisfies every non-empty filter
    pub fn matches(&self, city: &City) -> bool {
        CityField::ALL.iter().all(|field| {
            let needle = self.get(*field);
            needle.is_empty()
                || field
                    .filter_value(city)
                    .to_lowercase()
                    .contains(&needle.to_lowercase())
        })
    }
}

/// Sort and filter settings of the city table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryState {
    pub sort: Option<SortConfig>,
    pub filters: Filters,
}

impl QueryState {
    /// Header click: the same column toggles direction, a new column starts ascending
    pub fn request_sort(&mut self, field: CityField) {
        let direction = match self.sort {
            Some(current)
                if current.field == field && current.direction == SortDirection::Ascending =>
            {
                SortDirection::Descending
            }
            _ => SortDirection::Ascending,
        };
        self.sort = Some(SortConfig { field, direction });
    }
}

/// Identity of a displayed row
///
/// Catalog identifiers repeat across pages, so the position in the
/// accumulated list is part of the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RowKey {
    pub id: u64,
    lon_bits: u64,
    lat_bits: u64,
    pub ascii_name: String,
    pub position: usize,
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}-{}",
            self.id,
            f64::from_bits(self.lat_bits),
            f64::from_bits(self.lon_bits),
            self.ascii_name,
            self.position
        )
    }
}

/// A city as displayed, with its position in the accumulated list
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Row<'a> {
    pub position: usize,
    pub city: &'a City,
}

impl Row<'_> {
    pub fn key(&self) -> RowKey {
        RowKey {
            id: self.city.id,
            lon_bits: self.city.coordinates.lon.to_bits(),
            lat_bits: self.city.coordinates.lat.to_bits(),
            ascii_name: self.city.ascii_name().to_string(),
            position: self.position,
        }
    }
}

/// Autocomplete: first `MAX_SUGGESTIONS` records whose ASCII name contains
/// the input, case-insensitively, in arrival order.
pub fn suggestions<'a>(records: &'a [City], input: &str) -> Vec<&'a City> {
    if input.is_empty() {
        return Vec::new();
    }
    let needle = input.to_lowercase();
    records
        .iter()
        .filter(|city| city.ascii_name().to_lowercase().contains(&needle))
        .take(MAX_SUGGESTIONS)
        .collect()
}

/// Stable sort; `None` keeps arrival order
pub fn sort_rows(rows: &mut [Row<'_>], sort: Option<SortConfig>) {
    if let Some(sort) = sort {
        rows.sort_by(|a, b| sort.compare(a.city, b.city));
    }
}

/// Keeps rows that satisfy every non-empty filter, preserving order
pub fn filter_rows<'a>(rows: Vec<Row<'a>>, filters: &Filters) -> Vec<Row<'a>> {
    if filters.is_empty() {
        return rows;
    }
    rows.into_iter().filter(|row| filters.matches(row.city)).collect()
}

/// Full pipeline: arrival order → sort → filter
pub fn derive_rows<'a>(records: &'a [City], query: &QueryState) -> Vec<Row<'a>> {
    let mut rows: Vec<Row<'a>> = records
        .iter()
        .enumerate()
        .map(|(position, city)| Row { position, city })
        .collect();
    sort_rows(&mut rows, query.sort);
    filter_rows(rows, &query.filters)
}
