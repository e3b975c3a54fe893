use chrono::{NaiveDate, NaiveDateTime};
use sqlx::mysql::MySqlArguments;
use sqlx::Arguments;

/// ===============================
/// SQL bindable value enum
/// ===============================
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    String(String),
    U64(u64),
    I64(i64),
    Bool(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::String(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::String(v)
    }
}

impl From<u64> for SqlValue {
    fn from(v: u64) -> Self {
        SqlValue::U64(v)
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::I64(v)
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<NaiveDate> for SqlValue {
    fn from(v: NaiveDate) -> Self {
        SqlValue::Date(v)
    }
}

impl From<NaiveDateTime> for SqlValue {
    fn from(v: NaiveDateTime) -> Self {
        SqlValue::DateTime(v)
    }
}

/// ===============================
/// Dynamic WHERE clause builder
/// ===============================
/// Conditions are joined with AND; every `?` in a pushed fragment must be
/// matched by exactly one value, in order.
#[derive(Debug, Default, Clone)]
pub struct Conditions {
    clauses: Vec<String>,
    values: Vec<SqlValue>,
}

impl Conditions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, clause: impl Into<String>, values: Vec<SqlValue>) -> &mut Self {
        let clause = clause.into();
        debug_assert_eq!(clause.matches('?').count(), values.len());
        self.clauses.push(clause);
        self.values.extend(values);
        self
    }

    pub fn push_eq(&mut self, column: &str, value: impl Into<SqlValue>) -> &mut Self {
        self.push(format!("{} = ?", column), vec![value.into()])
    }

    /// `column IN (?, ?, ...)`; an empty list matches nothing.
    pub fn push_in(&mut self, column: &str, values: &[u64]) -> &mut Self {
        if values.is_empty() {
            return self.push("1 = 0", Vec::new());
        }
        let marks = vec!["?"; values.len()].join(", ");
        self.push(
            format!("{} IN ({})", column, marks),
            values.iter().map(|v| SqlValue::U64(*v)).collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// `" WHERE a AND b"` or an empty string
    pub fn where_sql(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        }
    }

    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    /// Arguments for the condition values followed by `extra` (LIMIT/OFFSET etc.)
    pub fn arguments(&self, extra: &[SqlValue]) -> MySqlArguments {
        bind_values(self.values.iter().chain(extra.iter()))
    }
}

/// ===============================
/// Bind values into MySQL arguments
/// ===============================
pub fn bind_values<'a>(values: impl IntoIterator<Item = &'a SqlValue>) -> MySqlArguments {
    let mut args = MySqlArguments::default();

    for value in values {
        match value {
            SqlValue::String(v) => args.add(v.clone()),
            SqlValue::U64(v) => args.add(*v),
            SqlValue::I64(v) => args.add(*v),
            SqlValue::Bool(v) => args.add(*v),
            SqlValue::Date(v) => args.add(*v),
            SqlValue::DateTime(v) => args.add(*v),
        }
    }

    args
}

/// Escapes LIKE wildcards so user search text matches literally.
pub fn like_contains(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_conditions_render_nothing() {
        let c = Conditions::new();
        assert!(c.is_empty());
        assert_eq!(c.where_sql(), "");
    }

    #[test]
    fn conditions_join_with_and_and_keep_value_order() {
        let mut c = Conditions::new();
        c.push_eq("t.employee_id", 7u64)
            .push("(e.first_name LIKE ? OR e.email LIKE ?)", vec!["%a%".into(), "%a%".into()])
            .push_eq("t.ticket_type", "LATE");

        assert_eq!(
            c.where_sql(),
            " WHERE t.employee_id = ? AND (e.first_name LIKE ? OR e.email LIKE ?) AND t.ticket_type = ?"
        );
        assert_eq!(
            c.values(),
            &[
                SqlValue::U64(7),
                SqlValue::String("%a%".into()),
                SqlValue::String("%a%".into()),
                SqlValue::String("LATE".into()),
            ]
        );
    }

    #[test]
    fn in_clause_expands_placeholders() {
        let mut c = Conditions::new();
        c.push_in("t.employee_id", &[1, 2, 3]);
        assert_eq!(c.where_sql(), " WHERE t.employee_id IN (?, ?, ?)");
        assert_eq!(c.values().len(), 3);

        let mut none = Conditions::new();
        none.push_in("t.employee_id", &[]);
        assert_eq!(none.where_sql(), " WHERE 1 = 0");
    }

    #[test]
    fn like_contains_escapes_wildcards() {
        assert_eq!(like_contains("ada"), "%ada%");
        assert_eq!(like_contains("50%_off"), "%50\\%\\_off%");
    }
}
