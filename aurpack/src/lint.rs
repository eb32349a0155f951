//! Filtering of package linter output against per-recipe exclusions.

/// Lint lines not covered by `exclusions`, in output order.
pub fn filter_lint_output<'a>(output: &'a str, exclusions: &[String]) -> Vec<&'a str> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !exclusions.iter().any(|excluded| excluded.trim() == *line))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_lint_output() {
        let output = "\
python-mopidy-mopify W: Dependency included and not needed ('python')
python-mopidy-mopify E: Missing custom license directory

python-mopidy-mopify W: Referenced library 'python3' is an uninstalled dependency
";
        let exclusions = vec![
            "python-mopidy-mopify W: Dependency included and not needed ('python')".to_string(),
        ];
        let remaining = filter_lint_output(output, &exclusions);
        assert_eq!(
            remaining,
            vec![
                "python-mopidy-mopify E: Missing custom license directory",
                "python-mopidy-mopify W: Referenced library 'python3' is an uninstalled dependency",
            ]
        );
    }

    #[test]
    fn test_clean_output_passes() {
        assert!(filter_lint_output("\n  \n", &[]).is_empty());
    }

    #[test]
    fn test_everything_excluded() {
        let exclusions = vec!["a W: x".to_string(), "a W: y".to_string()];
        assert!(filter_lint_output("a W: y\na W: x\n", &exclusions).is_empty());
    }
}
