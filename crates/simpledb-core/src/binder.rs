//! Placeholder binding.
//!
//! A statement is assembled from [`Fragment`]s. Each fragment carries its own
//! parameters, matched left to right against the `?` markers of its text.
//! Scalars keep their marker; a list of N values rewrites its marker into N
//! comma-separated markers. The output is one SQL string plus the flattened
//! values in placeholder order.
//!
//! `?` characters inside quoted regions (`'...'`, `"..."`, `` `...` ``) and
//! inside `-- ...` or `/* ... */` comments are literal text and are never
//! treated as markers.

use crate::error::BindingError;
use crate::param::{IntoParams, Param};
use crate::value::SqlValue;

/// One appended chunk of SQL text and the parameters for its markers.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    /// Raw SQL text, `?` as the only placeholder syntax.
    pub text: String,
    /// One entry per `?` marker in `text`.
    pub params: Vec<Param>,
}

impl Fragment {
    /// Creates a fragment.
    pub fn new(text: impl Into<String>, params: impl IntoParams) -> Self {
        Self {
            text: text.into(),
            params: params.into_params(),
        }
    }

    /// Binds this fragment on its own.
    pub fn bind(&self) -> Result<(String, Vec<SqlValue>), BindingError> {
        bind(&self.text, &self.params)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scan {
    Code,
    Quoted(u8),
    LineComment,
    BlockComment,
}

/// Byte offsets of every placeholder marker in `text`, skipping quoted
/// regions and comments. A doubled quote inside a quoted region is an
/// escaped quote.
fn marker_positions(text: &str) -> Vec<usize> {
    let mut positions = Vec::new();
    let mut state = Scan::Code;
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        let next = bytes.get(i + 1).copied();
        match state {
            Scan::Quoted(q) if b == q => {
                if next == Some(q) {
                    i += 1;
                } else {
                    state = Scan::Code;
                }
            }
            Scan::Quoted(_) => {}
            Scan::LineComment if b == b'\n' => state = Scan::Code,
            Scan::LineComment => {}
            Scan::BlockComment if b == b'*' && next == Some(b'/') => {
                state = Scan::Code;
                i += 1;
            }
            Scan::BlockComment => {}
            Scan::Code => match (b, next) {
                (b'\'' | b'"' | b'`', _) => state = Scan::Quoted(b),
                (b'-', Some(b'-')) => {
                    state = Scan::LineComment;
                    i += 1;
                }
                (b'/', Some(b'*')) => {
                    state = Scan::BlockComment;
                    i += 1;
                }
                (b'?', _) => positions.push(i),
                _ => {}
            },
        }
        i += 1;
    }
    positions
}

/// Number of placeholder markers in `text`.
#[must_use]
pub fn count_markers(text: &str) -> usize {
    marker_positions(text).len()
}

/// Rewrites `text` against `values`.
///
/// Fails when the number of markers differs from the number of values, or
/// when a list value is empty (there would be nothing to expand into).
pub fn bind(text: &str, values: &[Param]) -> Result<(String, Vec<SqlValue>), BindingError> {
    let positions = marker_positions(text);
    if positions.len() != values.len() {
        return Err(BindingError::PlaceholderMismatch {
            markers: positions.len(),
            values: values.len(),
            fragment: text.to_string(),
        });
    }

    let mut sql = String::with_capacity(text.len());
    let mut flat = Vec::with_capacity(values.iter().map(Param::width).sum());
    let mut last = 0;

    for (index, (pos, value)) in positions.iter().zip(values).enumerate() {
        sql.push_str(&text[last..*pos]);
        match value {
            Param::Scalar(v) => {
                sql.push('?');
                flat.push(v.clone());
            }
            Param::List(items) => {
                if items.is_empty() {
                    return Err(BindingError::EmptyList {
                        position: index,
                        fragment: text.to_string(),
                    });
                }
                sql.push_str(&vec!["?"; items.len()].join(", "));
                flat.extend(items.iter().cloned());
            }
        }
        last = pos + 1;
    }
    sql.push_str(&text[last..]);

    Ok((sql, flat))
}

/// Binds every fragment and joins them with a single space.
pub fn finalize(fragments: &[Fragment]) -> Result<(String, Vec<SqlValue>), BindingError> {
    let mut parts = Vec::with_capacity(fragments.len());
    let mut params = Vec::new();
    for fragment in fragments {
        let (sql, values) = fragment.bind()?;
        parts.push(sql);
        params.extend(values);
    }
    Ok((parts.join(" "), params))
}

/// Substitutes bound values back into `sql` as escaped literals.
///
/// Used for development logging only.
#[must_use]
pub fn render_inline(sql: &str, params: &[SqlValue]) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut last = 0;
    let mut params = params.iter();
    for pos in marker_positions(sql) {
        out.push_str(&sql[last..pos]);
        match params.next() {
            Some(v) => out.push_str(&v.to_sql_inline()),
            None => out.push('?'),
        }
        last = pos + 1;
    }
    out.push_str(&sql[last..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalars(values: &[i64]) -> Vec<Param> {
        values.iter().map(|v| Param::from(*v)).collect()
    }

    #[test]
    fn test_scalars_keep_markers_and_order() {
        for len in 0..6 {
            let values: Vec<i64> = (0..len).collect();
            let text = format!("SELECT {}", vec!["?"; values.len()].join(", "));
            let (sql, flat) = bind(&text, &scalars(&values)).unwrap();
            assert_eq!(sql, text);
            assert_eq!(flat, values.iter().map(|v| SqlValue::Int(*v)).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_list_expands_in_place() {
        let (sql, flat) = bind(
            "WHERE a = ? AND id IN (?) AND b = ?",
            &[
                Param::from("x"),
                Param::from(vec![1_i64, 2, 3]),
                Param::from(true),
            ],
        )
        .unwrap();
        assert_eq!(sql, "WHERE a = ? AND id IN (?, ?, ?) AND b = ?");
        assert_eq!(
            flat,
            vec![
                SqlValue::from("x"),
                SqlValue::Int(1),
                SqlValue::Int(2),
                SqlValue::Int(3),
                SqlValue::Bool(true),
            ]
        );
    }

    #[test]
    fn test_list_of_n_yields_n_markers() {
        for n in 1..8_i64 {
            let values: Vec<i64> = (0..n).collect();
            let (sql, flat) = bind("IN (?)", &[Param::from(values)]).unwrap();
            assert_eq!(count_markers(&sql), n as usize);
            assert_eq!(flat.len(), n as usize);
        }
    }

    #[test]
    fn test_count_mismatch_fails() {
        let err = bind("WHERE id = ? AND x = ?", &scalars(&[1])).unwrap_err();
        assert_eq!(
            err,
            BindingError::PlaceholderMismatch {
                markers: 2,
                values: 1,
                fragment: String::from("WHERE id = ? AND x = ?"),
            }
        );
        assert!(bind("SELECT 1", &scalars(&[1])).is_err());
    }

    #[test]
    fn test_empty_list_fails() {
        let err = bind("IN (?)", &[Param::List(Vec::new())]).unwrap_err();
        assert!(matches!(err, BindingError::EmptyList { position: 0, .. }));
    }

    #[test]
    fn test_quoted_question_marks_are_literal() {
        assert_eq!(count_markers("SELECT '?', \"?\", `?` FROM t WHERE a = ?"), 1);
        assert_eq!(count_markers("SELECT 'it''s ?' WHERE a = ?"), 1);
        let (sql, flat) = bind("WHERE title LIKE '%?%' AND id = ?", &scalars(&[4])).unwrap();
        assert_eq!(sql, "WHERE title LIKE '%?%' AND id = ?");
        assert_eq!(flat, vec![SqlValue::Int(4)]);
    }

    #[test]
    fn test_commented_question_marks_are_literal() {
        assert_eq!(count_markers("SELECT 1 -- what?"), 0);
        assert_eq!(count_markers("SELECT /* why? */ a FROM t WHERE id = ?"), 1);
        assert_eq!(count_markers("SELECT a -- any?\nFROM t WHERE id = ?"), 1);
        assert_eq!(count_markers("SELECT a - ? FROM t"), 1);
        let (sql, flat) = bind("WHERE id = ? /* id? */ -- done?", &scalars(&[7])).unwrap();
        assert_eq!(sql, "WHERE id = ? /* id? */ -- done?");
        assert_eq!(flat, vec![SqlValue::Int(7)]);
    }

    #[test]
    fn test_finalize_joins_with_single_space() {
        let fragments = vec![
            Fragment::new("UPDATE article", ()),
            Fragment::new("SET title = ?", ("new",)),
            Fragment::new("WHERE id IN (?)", (vec![0_i64, 1, 2, 3],)),
        ];
        let (sql, params) = finalize(&fragments).unwrap();
        assert_eq!(sql, "UPDATE article SET title = ? WHERE id IN (?, ?, ?, ?)");
        assert_eq!(params.len(), 5);
        assert_eq!(params[0], SqlValue::from("new"));
    }

    #[test]
    fn test_render_inline() {
        let rendered = render_inline(
            "SELECT * FROM t WHERE a = ? AND b IN (?, ?)",
            &[SqlValue::from("O'Brien"), SqlValue::Int(1), SqlValue::Int(2)],
        );
        assert_eq!(rendered, "SELECT * FROM t WHERE a = 'O''Brien' AND b IN (1, 2)");
    }
}
