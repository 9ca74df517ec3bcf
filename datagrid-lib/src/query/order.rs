//! Single-column sorting.

use std::cmp::Ordering;
use std::iter::Peekable;
use std::str::Chars;

use serde::Deserialize;
use serde::Serialize;

use crate::model::Row;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Ascending order (A-Z, 0-9).
    #[default]
    Asc,
    /// Descending order (Z-A, 9-0).
    Desc,
}

impl Direction {
    /// Returns the opposite direction.
    pub fn toggle(self) -> Self {
        match self {
            Direction::Asc => Direction::Desc,
            Direction::Desc => Direction::Asc,
        }
    }
}

/// The active sort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortConfig {
    /// Column key.
    pub column: String,
    /// Direction.
    pub direction: Direction,
}

impl SortConfig {
    /// Computes the sort that follows clicking `column`: the same column
    /// flips direction, a new column starts ascending.
    pub fn next(current: Option<&SortConfig>, column: &str) -> SortConfig {
        match current {
            Some(sort) if sort.column == column => SortConfig {
                column: sort.column.clone(),
                direction: sort.direction.toggle(),
            },
            _ => SortConfig {
                column: column.to_string(),
                direction: Direction::Asc,
            },
        }
    }
}

/// Returns the rows ordered by the string form of `column`.
///
/// Ordering is representation-based even for number and date columns, using
/// [`natural_cmp`] so that `"2"` sorts before `"10"`. Null and missing values
/// go last in both directions. An empty `column` returns the rows in their
/// original order. The input is never modified.
///
/// # Example
///
/// ```
/// use datagrid_lib::model::Row;
/// use datagrid_lib::query::{sort_rows, Direction};
///
/// let rows = vec![Row::new().set("n", "10"), Row::new().set("n", "2")];
/// let sorted = sort_rows(&rows, "n", Direction::Asc);
/// assert_eq!(sorted[0], rows[1]);
/// ```
pub fn sort_rows(rows: &[Row], column: &str, direction: Direction) -> Vec<Row> {
    if column.is_empty() {
        return rows.to_vec();
    }

    let mut keyed: Vec<(Option<String>, &Row)> = rows
        .iter()
        .map(|row| (row.value(column).display_string(), row))
        .collect();

    keyed.sort_by(|(a, _), (b, _)| match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => match direction {
            Direction::Asc => natural_cmp(a, b),
            Direction::Desc => natural_cmp(b, a),
        },
    });

    keyed.into_iter().map(|(_, row)| row.clone()).collect()
}

/// Compares strings the way a human reads them.
///
/// Digit runs compare by numeric value and letters compare ignoring case;
/// only when two strings are otherwise equal does case decide, lowercase
/// first.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let primary = compare_folded(a.chars().peekable(), b.chars().peekable());
    if primary != Ordering::Equal {
        return primary;
    }

    for (ca, cb) in a.chars().zip(b.chars()) {
        if ca != cb {
            match (ca.is_lowercase(), cb.is_lowercase()) {
                (true, false) => return Ordering::Less,
                (false, true) => return Ordering::Greater,
                _ => {}
            }
        }
    }
    a.cmp(b)
}

fn compare_folded(mut a: Peekable<Chars<'_>>, mut b: Peekable<Chars<'_>>) -> Ordering {
    loop {
        let (ca, cb) = match (a.peek(), b.peek()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(&ca), Some(&cb)) => (ca, cb),
        };

        if ca.is_ascii_digit() && cb.is_ascii_digit() {
            let da = take_digits(&mut a);
            let db = take_digits(&mut b);
            let ordering = compare_digit_runs(&da, &db);
            if ordering != Ordering::Equal {
                return ordering;
            }
        } else {
            a.next();
            b.next();
            let ordering = fold(ca).cmp(&fold(cb));
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
    }
}

fn take_digits(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(&c) = chars.peek() {
        if !c.is_ascii_digit() {
            break;
        }
        run.push(c);
        chars.next();
    }
    run
}

fn compare_digit_runs(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Value;

    fn names(rows: &[Row]) -> Vec<String> {
        rows.iter()
            .map(|r| r.value("name").display_string().unwrap_or_else(|| "-".into()))
            .collect()
    }

    #[test]
    fn test_natural_cmp_numeric_runs() {
        assert_eq!(natural_cmp("2", "10"), Ordering::Less);
        assert_eq!(natural_cmp("item 9", "item 10"), Ordering::Less);
        assert_eq!(natural_cmp("08", "7"), Ordering::Greater);
        assert_eq!(natural_cmp("abc", "abc"), Ordering::Equal);
    }

    #[test]
    fn test_natural_cmp_case() {
        assert_eq!(natural_cmp("apple", "Banana"), Ordering::Less);
        assert_eq!(natural_cmp("a", "A"), Ordering::Less);
        assert_eq!(natural_cmp("B", "a"), Ordering::Greater);
    }

    #[test]
    fn test_sort_by_name() {
        let rows = vec![
            Row::new().set("id", 1i64).set("name", "Bob"),
            Row::new().set("id", 2i64).set("name", "Amy"),
        ];
        assert_eq!(names(&sort_rows(&rows, "name", Direction::Asc)), vec!["Amy", "Bob"]);
        assert_eq!(names(&sort_rows(&rows, "name", Direction::Desc)), vec!["Bob", "Amy"]);
        // Input untouched.
        assert_eq!(names(&rows), vec!["Bob", "Amy"]);
    }

    #[test]
    fn test_nulls_last_both_directions() {
        let rows = vec![
            Row::new().set("name", Value::Null),
            Row::new().set("name", "Cy"),
            Row::new(),
            Row::new().set("name", "Al"),
        ];
        assert_eq!(names(&sort_rows(&rows, "name", Direction::Asc)), vec!["Al", "Cy", "-", "-"]);
        assert_eq!(names(&sort_rows(&rows, "name", Direction::Desc)), vec!["Cy", "Al", "-", "-"]);
    }

    #[test]
    fn test_desc_is_reversed_asc_without_nulls() {
        let rows: Vec<Row> = ["10", "9", "b", "A", "1.5", "zed"]
            .iter()
            .map(|n| Row::new().set("name", *n))
            .collect();
        let mut asc = sort_rows(&rows, "name", Direction::Asc);
        asc.reverse();
        assert_eq!(asc, sort_rows(&rows, "name", Direction::Desc));
    }

    #[test]
    fn test_numbers_sort_by_representation() {
        let rows = vec![
            Row::new().set("name", 10i64),
            Row::new().set("name", 2i64),
            Row::new().set("name", 33i64),
        ];
        assert_eq!(names(&sort_rows(&rows, "name", Direction::Asc)), vec!["2", "10", "33"]);
    }

    #[test]
    fn test_empty_column_keeps_order() {
        let rows = vec![Row::new().set("name", "b"), Row::new().set("name", "a")];
        assert_eq!(sort_rows(&rows, "", Direction::Asc), rows);
    }

    #[test]
    fn test_sort_config_toggle() {
        let first = SortConfig::next(None, "name");
        assert_eq!(first.direction, Direction::Asc);
        let second = SortConfig::next(Some(&first), "name");
        assert_eq!(second.direction, Direction::Desc);
        let third = SortConfig::next(Some(&second), "name");
        assert_eq!(third.direction, Direction::Asc);
        let other = SortConfig::next(Some(&second), "age");
        assert_eq!(other, SortConfig { column: "age".into(), direction: Direction::Asc });
    }
}
