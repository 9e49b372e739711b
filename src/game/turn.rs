/// Returns the player after `current` in `order`, wrapping to the front when
/// `current` is last or not in the list. `None` only for an empty list.
pub fn next_player<'a>(order: &'a [String], current: &str) -> Option<&'a str> {
    let next_index = order
        .iter()
        .position(|name| name == current)
        .map_or(0, |index| index + 1);

    order
        .get(next_index)
        .or_else(|| order.first())
        .map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_advances_to_next() {
        let order = names(&["A", "B", "C"]);
        assert_eq!(next_player(&order, "A"), Some("B"));
        assert_eq!(next_player(&order, "B"), Some("C"));
    }

    #[test]
    fn test_wraps_from_last() {
        let order = names(&["A", "B", "C"]);
        assert_eq!(next_player(&order, "C"), Some("A"));
    }

    #[test]
    fn test_missing_player_falls_back_to_first() {
        let order = names(&["A", "B", "C"]);
        assert_eq!(next_player(&order, "Z"), Some("A"));
    }

    #[test]
    fn test_single_player_returns_self() {
        let order = names(&["A"]);
        assert_eq!(next_player(&order, "A"), Some("A"));
    }

    #[test]
    fn test_empty_order() {
        assert_eq!(next_player(&[], "A"), None);
    }
}
