//! Table helpers: column lookups and projections over DataFrames.

use polars::prelude::*;
use std::collections::BTreeSet;

/// Column names of a DataFrame, in order.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Columns present in both tables, sorted by name.
pub fn common_columns(left: &DataFrame, right: &DataFrame) -> Vec<String> {
    let left: BTreeSet<String> = column_names(left).into_iter().collect();
    let right: BTreeSet<String> = column_names(right).into_iter().collect();
    left.intersection(&right).cloned().collect()
}

/// Names from `wanted` that the table does not have.
pub fn missing_columns(df: &DataFrame, wanted: &[String]) -> Vec<String> {
    wanted
        .iter()
        .filter(|c| df.column(c.as_str()).is_err())
        .cloned()
        .collect()
}

/// Restrict a table to `columns`, in the given order.
pub fn project(df: &DataFrame, columns: &[String]) -> PolarsResult<DataFrame> {
    df.select(columns.iter().map(|c| c.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_columns_sorted() {
        let a = df!("z" => [1i64], "x" => [1i64], "y" => [1i64]).unwrap();
        let b = df!("y" => [1i64], "w" => [1i64], "x" => [1i64]).unwrap();
        assert_eq!(common_columns(&a, &b), vec!["x", "y"]);
    }

    #[test]
    fn test_missing_and_project() {
        let df = df!("x" => [1i64, 2], "y" => ["a", "b"], "z" => [0.5, 1.5]).unwrap();
        let wanted = vec!["z".to_string(), "x".to_string(), "q".to_string()];
        assert_eq!(missing_columns(&df, &wanted), vec!["q"]);

        let projected = project(&df, &wanted[..2]).unwrap();
        assert_eq!(column_names(&projected), vec!["z", "x"]);
        assert_eq!(projected.height(), 2);
        assert!(project(&df, &wanted).is_err());
    }
}
