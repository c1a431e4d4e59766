//! Field naming conventions. Filter keys and sort tokens may arrive in snake_case; schemas use camelCase.

/// `col_string` → `colString`. Keys without an underscore are returned unchanged.
pub fn to_camel_case(key: &str) -> String {
    if !key.contains('_') {
        return key.to_string();
    }
    let mut camel = String::with_capacity(key.len());
    let words = key.trim_end_matches('_').split('_').enumerate().filter(|(i, w)| *i == 0 || !w.is_empty());
    for (i, word) in words {
        if i == 0 {
            camel.push_str(&word.to_lowercase());
        } else {
            let mut chars = word.chars();
            if let Some(first) = chars.next() {
                camel.extend(first.to_uppercase());
                camel.push_str(&chars.as_str().to_lowercase());
            }
        }
    }
    camel
}

/// `ParentTable` → `parent_table`
pub fn to_snake_case(name: &str) -> String {
    let mut snake = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 && !snake.ends_with('_') {
                snake.push('_');
            }
            snake.extend(c.to_lowercase());
        } else {
            snake.push(c);
        }
    }
    snake
}
