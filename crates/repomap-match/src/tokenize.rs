//! Shared identifier tokenization: split on `_`, `-`, and case
//! transitions, then lowercase.

pub fn tokenize(identifier: &str) -> Vec<String> {
    let chars: Vec<char> = identifier.chars().collect();
    let mut tokens = Vec::new();
    let mut current = String::new();

    for (i, &ch) in chars.iter().enumerate() {
        if ch == '_' || ch == '-' || ch.is_whitespace() {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            continue;
        }

        if ch.is_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next = chars.get(i + 1).copied();
            // lower->upper ("getUser" -> "get" | "User") or the end of
            // an acronym run ("HTTPClient" -> "HTTP" | "Client").
            let boundary = prev.is_lowercase() || prev.is_numeric() || (prev.is_uppercase() && next.map(|n| n.is_lowercase()).unwrap_or(false));
            if boundary {
                tokens.push(std::mem::take(&mut current));
            }
        }
        current.push(ch.to_ascii_lowercase());
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

pub fn normalized(identifier: &str) -> String {
    tokenize(identifier).join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_snake_case() {
        assert_eq!(tokenize("get_user_id"), vec!["get", "user", "id"]);
    }

    #[test]
    fn splits_camel_case() {
        assert_eq!(tokenize("getUserId"), vec!["get", "user", "id"]);
    }

    #[test]
    fn splits_kebab_case() {
        assert_eq!(tokenize("get-user-id"), vec!["get", "user", "id"]);
    }

    #[test]
    fn handles_pascal_case_and_acronyms() {
        assert_eq!(tokenize("HTTPClient"), vec!["http", "client"]);
    }
}
