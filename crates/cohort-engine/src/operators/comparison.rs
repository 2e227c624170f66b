//! Numeric and lexical comparison operators
//!
//! Numeric operators coerce both sides to `f64`; a side that cannot be read
//! as a number (including NaN) simply fails the predicate, it never errors.
//! Lexical operators lower-case both sides, so `equals`, `not_equals` and
//! `contains` are case-insensitive.

use cohort_model::{CellValue, FilterOp};

/// Evaluate a numeric comparison. `value2` is the upper bound for `between`
/// (inclusive on both ends); a missing bound fails the predicate.
pub fn compare_numeric(
    op: &FilterOp,
    cell: &CellValue,
    value: &CellValue,
    value2: Option<&CellValue>,
) -> bool {
    let Some(lhs) = cell.as_number() else {
        return false;
    };
    let Some(rhs) = value.as_number() else {
        return false;
    };
    match op {
        FilterOp::Gt => lhs > rhs,
        FilterOp::Gte => lhs >= rhs,
        FilterOp::Lt => lhs < rhs,
        FilterOp::Lte => lhs <= rhs,
        FilterOp::Equals => lhs == rhs,
        FilterOp::NotEquals => lhs != rhs,
        FilterOp::Between => match value2.and_then(CellValue::as_number) {
            Some(hi) => rhs <= lhs && lhs <= hi,
            None => false,
        },
        _ => false,
    }
}

/// Evaluate a case-insensitive lexical comparison.
pub fn compare_lexical(op: &FilterOp, cell: &CellValue, value: &CellValue) -> bool {
    let lhs = cell.to_display_string().to_lowercase();
    let rhs = value.to_display_string().to_lowercase();
    match op {
        FilterOp::Equals => lhs == rhs,
        FilterOp::NotEquals => lhs != rhs,
        FilterOp::Contains => lhs.contains(&rhs),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(FilterOp::Gt, 45.0, 18.0, true)]
    #[case(FilterOp::Gt, 18.0, 18.0, false)]
    #[case(FilterOp::Gte, 18.0, 18.0, true)]
    #[case(FilterOp::Lt, 17.0, 18.0, true)]
    #[case(FilterOp::Lte, 18.0, 18.0, true)]
    #[case(FilterOp::Equals, 18.0, 18.0, true)]
    #[case(FilterOp::NotEquals, 18.0, 19.0, true)]
    fn numeric_operators(
        #[case] op: FilterOp,
        #[case] lhs: f64,
        #[case] rhs: f64,
        #[case] expected: bool,
    ) {
        assert_eq!(
            compare_numeric(&op, &CellValue::Number(lhs), &CellValue::Number(rhs), None),
            expected
        );
    }

    #[test]
    fn between_is_inclusive_on_both_ends() {
        let hi = CellValue::Number(65.0);
        for (x, expected) in [(18.0, true), (65.0, true), (40.0, true), (17.9, false), (65.1, false)] {
            assert_eq!(
                compare_numeric(
                    &FilterOp::Between,
                    &CellValue::Number(x),
                    &CellValue::Number(18.0),
                    Some(&hi),
                ),
                expected,
                "between failed for {x}"
            );
        }
    }

    #[test]
    fn between_without_upper_bound_fails() {
        assert!(!compare_numeric(
            &FilterOp::Between,
            &CellValue::Number(40.0),
            &CellValue::Number(18.0),
            None,
        ));
    }

    #[test]
    fn text_cells_are_coerced() {
        assert!(compare_numeric(
            &FilterOp::Gte,
            &CellValue::from("45"),
            &CellValue::from("18"),
            None,
        ));
    }

    #[test]
    fn nan_and_unparseable_fail_every_comparison() {
        for op in [FilterOp::Gt, FilterOp::Gte, FilterOp::Lt, FilterOp::Lte, FilterOp::Equals] {
            assert!(!compare_numeric(
                &op,
                &CellValue::Number(f64::NAN),
                &CellValue::Number(1.0),
                None,
            ));
            assert!(!compare_numeric(
                &op,
                &CellValue::from("forty"),
                &CellValue::Number(1.0),
                None,
            ));
        }
    }

    #[rstest]
    #[case(FilterOp::Equals, "Female", "female", true)]
    #[case(FilterOp::Equals, "Female", "male", false)]
    #[case(FilterOp::NotEquals, "Female", "male", true)]
    #[case(FilterOp::Contains, "Type II Diabetes", "diabetes", true)]
    #[case(FilterOp::Contains, "Type II Diabetes", "asthma", false)]
    fn lexical_operators(
        #[case] op: FilterOp,
        #[case] lhs: &str,
        #[case] rhs: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(
            compare_lexical(&op, &CellValue::from(lhs), &CellValue::from(rhs)),
            expected
        );
    }

    #[test]
    fn lexical_comparison_of_numbers_uses_display_form() {
        // A numeric cell compared as text: 45.0 renders as "45".
        assert!(compare_lexical(
            &FilterOp::Equals,
            &CellValue::Number(45.0),
            &CellValue::from("45"),
        ));
    }
}
