//! Identifier helpers shared by the built-in rules.

/// Upper-case the first character: `name` -> `Name`
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Turn an identifier into a display name: `firstName` -> `First Name`,
/// `order_lines` -> `Order Lines`
pub fn humanize(identifier: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut previous: Option<char> = None;

    for c in identifier.chars() {
        if c == '_' || c == '-' || c == ' ' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            previous = None;
            continue;
        }
        let boundary = match previous {
            Some(p) => c.is_uppercase() && (p.is_lowercase() || p.is_ascii_digit()),
            None => false,
        };
        if boundary && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        current.push(c);
        previous = Some(c);
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
        .iter()
        .map(|word| capitalize(word))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("name"), "Name");
        assert_eq!(capitalize("Name"), "Name");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_humanize() {
        assert_eq!(humanize("firstName"), "First Name");
        assert_eq!(humanize("order_lines"), "Order Lines");
        assert_eq!(humanize("URL"), "URL");
        assert_eq!(humanize("address2Line"), "Address2 Line");
        assert_eq!(humanize("Customer"), "Customer");
    }
}
