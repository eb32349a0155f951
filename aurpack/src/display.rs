/// Greedily pack `items` into lines no wider than `width`, separated by
/// `padding` spaces. An item wider than `width` gets a line to itself.
pub fn wrap_join<S: AsRef<str>>(items: &[S], padding: usize, width: usize) -> Vec<String> {
    let separator = " ".repeat(padding);
    let mut lines = Vec::new();
    let mut current = String::new();

    for item in items {
        let item = item.as_ref();
        if current.is_empty() {
            current.push_str(item);
        } else if current.len() + padding + item.len() <= width {
            current.push_str(&separator);
            current.push_str(item);
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(item);
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_join() {
        let items = ["alpha", "beta", "gamma", "delta"];
        assert_eq!(wrap_join(&items, 2, 13), vec!["alpha  beta", "gamma  delta"]);
        assert_eq!(wrap_join(&items, 1, 100), vec!["alpha beta gamma delta"]);
    }

    #[test]
    fn test_long_item_on_own_line() {
        let items = ["a", "much-too-long-for-the-line", "b"];
        assert_eq!(
            wrap_join(&items, 1, 10),
            vec!["a", "much-too-long-for-the-line", "b"]
        );
    }

    #[test]
    fn test_empty() {
        let items: [&str; 0] = [];
        assert!(wrap_join(&items, 2, 66).is_empty());
    }
}
