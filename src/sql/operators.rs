//! Filter-suffix registry: maps the token after `field_` to an SQL comparison.

use crate::error::AppError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FilterOperator {
    pub suffix: &'static str,
    pub sql: &'static str,
    /// Prepended to the operand of LIKE-style operators.
    pub pattern_prefix: Option<&'static str>,
    /// Appended to the operand of LIKE-style operators.
    pub pattern_suffix: Option<&'static str>,
    /// Operand is a list rendered as `(?, ?, ...)`.
    pub is_list: bool,
}

const fn op(suffix: &'static str, sql: &'static str) -> FilterOperator {
    FilterOperator {
        suffix,
        sql,
        pattern_prefix: None,
        pattern_suffix: None,
        is_list: false,
    }
}

const fn list(suffix: &'static str, sql: &'static str) -> FilterOperator {
    FilterOperator {
        is_list: true,
        ..op(suffix, sql)
    }
}

const fn pattern(
    suffix: &'static str,
    sql: &'static str,
    prefix: Option<&'static str>,
    tail: Option<&'static str>,
) -> FilterOperator {
    FilterOperator {
        pattern_prefix: prefix,
        pattern_suffix: tail,
        ..op(suffix, sql)
    }
}

const ANY: Option<&str> = Some("%");

const OPERATORS: &[FilterOperator] = &[
    op("", "="),
    op("not", "!="),
    op("gt", ">"),
    op("gte", ">="),
    op("lt", "<"),
    op("lte", "<="),
    list("in", "IN"),
    list("not_in", "NOT IN"),
    pattern("contains", "LIKE", ANY, ANY),
    pattern("not_contains", "NOT LIKE", ANY, ANY),
    pattern("starts_with", "LIKE", None, ANY),
    pattern("not_starts_with", "NOT LIKE", None, ANY),
    pattern("ends_with", "LIKE", ANY, None),
    pattern("not_ends_with", "NOT LIKE", ANY, None),
];

impl FilterOperator {
    pub const EQUALS: &'static FilterOperator = &OPERATORS[0];

    pub fn all() -> &'static [FilterOperator] {
        OPERATORS
    }

    pub fn lookup(suffix: &str) -> Option<&'static FilterOperator> {
        OPERATORS.iter().find(|o| o.suffix == suffix)
    }

    /// Like [`lookup`](Self::lookup) but an unknown suffix is an error.
    pub fn resolve(suffix: &str) -> Result<&'static FilterOperator, AppError> {
        Self::lookup(suffix).ok_or_else(|| AppError::UnknownFilterOperator(suffix.to_string()))
    }

    pub fn is_pattern(&self) -> bool {
        self.pattern_prefix.is_some() || self.pattern_suffix.is_some()
    }

    /// Wrap a LIKE operand with this operator's wildcards. `%`, `_` and `\` in the
    /// operand are escaped so they match literally under `ESCAPE '\'`.
    pub fn wrap_pattern(&self, operand: &str) -> String {
        let mut out = String::with_capacity(operand.len() + 2);
        out.push_str(self.pattern_prefix.unwrap_or(""));
        for c in operand.chars() {
            if matches!(c, '%' | '_' | '\\') {
                out.push('\\');
            }
            out.push(c);
        }
        out.push_str(self.pattern_suffix.unwrap_or(""));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_suffix_is_equality() {
        let eq = FilterOperator::lookup("").unwrap();
        assert_eq!(eq.sql, "=");
        assert_eq!(eq, FilterOperator::EQUALS);
    }

    #[test]
    fn list_operators_are_flagged() {
        for suffix in ["in", "not_in"] {
            assert!(FilterOperator::lookup(suffix).unwrap().is_list, "{suffix}");
        }
        assert_eq!(FilterOperator::lookup("not_in").unwrap().sql, "NOT IN");
        assert!(!FilterOperator::lookup("gt").unwrap().is_list);
    }

    #[test]
    fn unknown_suffix_fails() {
        assert!(matches!(
            FilterOperator::resolve("like"),
            Err(AppError::UnknownFilterOperator(s)) if s == "like"
        ));
    }

    #[test]
    fn patterns_wrap_and_escape() {
        let contains = FilterOperator::lookup("contains").unwrap();
        assert_eq!(contains.wrap_pattern("ab"), "%ab%");
        assert_eq!(contains.wrap_pattern("5%_x"), "%5\\%\\_x%");
        assert_eq!(FilterOperator::lookup("starts_with").unwrap().wrap_pattern("ab"), "ab%");
        assert_eq!(FilterOperator::lookup("ends_with").unwrap().wrap_pattern("ab"), "%ab");
        assert!(!FilterOperator::lookup("lte").unwrap().is_pattern());
    }

    #[test]
    fn suffixes_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for o in FilterOperator::all() {
            assert!(seen.insert(o.suffix), "duplicate suffix {}", o.suffix);
        }
    }
}
