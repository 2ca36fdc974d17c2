//! Table naming strategy

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamingStrategy {
    pub table_prefix: String,
    /// Keep table names singular (`user`, not `users`).
    pub singular_table: bool,
}

impl NamingStrategy {
    pub fn singular() -> Self {
        Self {
            table_prefix: String::new(),
            singular_table: true,
        }
    }

    /// `UserProfile` becomes `user_profile`, or `user_profiles` when plural.
    pub fn table_name(&self, entity: &str) -> String {
        let name = to_snake_case(entity);
        let name = if self.singular_table {
            name
        } else {
            pluralize(&name)
        };
        format!("{}{}", self.table_prefix, name)
    }
}

fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(|n| n.is_lowercase()),
                _ => false,
            };
            if boundary {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }

    out
}

fn pluralize(name: &str) -> String {
    const SIBILANTS: [&str; 5] = ["s", "x", "z", "ch", "sh"];

    if SIBILANTS.iter().any(|suffix| name.ends_with(suffix)) {
        return format!("{name}es");
    }

    if let Some(stem) = name.strip_suffix('y') {
        if stem.chars().last().is_some_and(|c| !"aeiou".contains(c)) {
            return format!("{stem}ies");
        }
    }

    format!("{name}s")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singular_tables() {
        let naming = NamingStrategy::singular();
        assert_eq!(naming.table_name("User"), "user");
        assert_eq!(naming.table_name("UserProfile"), "user_profile");
        assert_eq!(naming.table_name("HTTPSession"), "http_session");
    }

    #[test]
    fn test_plural_tables() {
        let naming = NamingStrategy::default();
        assert_eq!(naming.table_name("User"), "users");
        assert_eq!(naming.table_name("Address"), "addresses");
        assert_eq!(naming.table_name("Company"), "companies");
        assert_eq!(naming.table_name("Key"), "keys");
    }

    #[test]
    fn test_prefix() {
        let naming = NamingStrategy {
            table_prefix: "auth_".into(),
            singular_table: true,
        };
        assert_eq!(naming.table_name("Role"), "auth_role");
    }
}
