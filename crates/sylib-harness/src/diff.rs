//! Diff rendering for expected/actual console text.

/// Render a line diff between expected and actual output.
///
/// Lines present on only one side are shown as `<missing>` on the other.
#[must_use]
pub fn render_diff(expected: &str, actual: &str) -> String {
    if expected == actual {
        return String::from("[identical]");
    }

    let expected_lines: Vec<&str> = expected.split('\n').collect();
    let actual_lines: Vec<&str> = actual.split('\n').collect();
    let mut out = String::from("--- expected\n+++ actual\n");
    for i in 0..expected_lines.len().max(actual_lines.len()) {
        let e = expected_lines.get(i).copied();
        let a = actual_lines.get(i).copied();
        if e != a {
            out.push_str(&format!("@@ line {} @@\n", i + 1));
            out.push_str(&format!("-{}\n", e.unwrap_or("<missing>")));
            out.push_str(&format!("+{}\n", a.unwrap_or("<missing>")));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_text() {
        assert_eq!(render_diff("a\nb", "a\nb"), "[identical]");
    }

    #[test]
    fn changed_and_missing_lines() {
        let diff = render_diff("3: 1 2 3\n", "3: 1 2 4\n0:\n");
        assert!(diff.contains("@@ line 1 @@\n-3: 1 2 3\n+3: 1 2 4\n"));
        assert!(diff.contains("@@ line 2 @@\n-\n+0:\n"));
        assert!(diff.contains("@@ line 3 @@\n-<missing>\n+\n"));
    }
}
