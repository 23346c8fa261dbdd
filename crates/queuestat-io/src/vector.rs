//! Whitespace-separated vector cells

use crate::reader::{IoError, IoResult};

/// Parse a `vecvalue` or `vectime` cell into numbers
///
/// `run` and `column` only label the error.
pub fn parse_vector(cell: &str, run: &str, column: &str) -> IoResult<Vec<f64>> {
    cell.split_whitespace()
        .map(|token| {
            token.parse::<f64>().map_err(|_| IoError::InvalidNumber {
                run: run.to_string(),
                column: column.to_string(),
                value: token.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vector() {
        assert_eq!(
            parse_vector(" 1 2.5\t-3e-2  4 ", "r0", "vecvalue").unwrap(),
            vec![1.0, 2.5, -0.03, 4.0]
        );
        assert!(parse_vector("", "r0", "vecvalue").unwrap().is_empty());
    }

    #[test]
    fn test_parse_vector_rejects_garbage() {
        match parse_vector("1 two 3", "r7", "vectime") {
            Err(IoError::InvalidNumber { run, column, value }) => {
                assert_eq!(run, "r7");
                assert_eq!(column, "vectime");
                assert_eq!(value, "two");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
