use std::borrow::Cow;
use std::fmt::Write;

/// Rewrite `?` placeholders into PostgreSQL-style `$1`, `$2`, ... in order of occurrence.
///
/// This is a plain textual pass: a `?` inside a string literal, identifier or comment is
/// rewritten like any other. Returns a borrowed `Cow` when the text has no `?`.
///
/// ```rust
/// use pg_adapter::translation::rewrite_placeholders;
///
/// assert_eq!(
///     rewrite_placeholders("SELECT * FROM t WHERE a = ? AND b = ?"),
///     "SELECT * FROM t WHERE a = $1 AND b = $2"
/// );
/// ```
#[must_use]
pub fn rewrite_placeholders(sql: &str) -> Cow<'_, str> {
    let Some(first) = sql.find('?') else {
        return Cow::Borrowed(sql);
    };

    let mut out = String::with_capacity(sql.len() + 8);
    out.push_str(&sql[..first]);

    let mut seq: usize = 0;
    for ch in sql[first..].chars() {
        if ch == '?' {
            seq += 1;
            // writing into a String cannot fail
            let _ = write!(out, "${seq}");
        } else {
            out.push(ch);
        }
    }

    Cow::Owned(out)
}

/// Number of `?` placeholders [`rewrite_placeholders`] would replace.
#[must_use]
pub fn placeholder_count(sql: &str) -> usize {
    sql.matches('?').count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_placeholders_borrows() {
        let sql = "select * from t";
        let res = rewrite_placeholders(sql);
        assert!(matches!(res, Cow::Borrowed(_)));
        assert_eq!(res, sql);
    }

    #[test]
    fn numbers_left_to_right() {
        assert_eq!(rewrite_placeholders("?"), "$1");
        assert_eq!(
            rewrite_placeholders("insert into t values(?, ?, ?)"),
            "insert into t values($1, $2, $3)"
        );
    }

    #[test]
    fn counts_past_nine() {
        let sql = vec!["?"; 12].join(",");
        let res = rewrite_placeholders(&sql);
        assert!(res.ends_with("$10,$11,$12"));
        assert_eq!(placeholder_count(&sql), 12);
    }

    #[test]
    fn rewrites_inside_literals_too() {
        assert_eq!(
            rewrite_placeholders("select '?' as q, ? -- why?"),
            "select '$1' as q, $2 -- why$3"
        );
    }

    #[test]
    fn keeps_multibyte_text() {
        assert_eq!(
            rewrite_placeholders("select 'héllo ✓' where a = ?"),
            "select 'héllo ✓' where a = $1"
        );
    }
}
