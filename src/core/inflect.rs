//! Word inflection for resource types and generated type names
//!
//! Resource types are plural and kebab/snake cased (`blog-posts`); generated
//! types are singular and StudlyCased (`BlogPost`).

/// Utility for converting resource names between their forms
pub struct Inflector;

impl Inflector {
    /// Convert a singular noun to its plural form
    ///
    /// Used to infer the resource type of a to-one relationship from its
    /// name (`author` -> `authors`).
    ///
    /// ```
    /// use jsonapi::core::inflect::Inflector;
    ///
    /// assert_eq!(Inflector::pluralize("author"), "authors");
    /// assert_eq!(Inflector::pluralize("category"), "categories");
    /// ```
    pub fn pluralize(singular: &str) -> String {
        if singular.is_empty() {
            return singular.to_string();
        }

        match singular {
            s if s.ends_with('y')
                && s.len() > 1
                && !matches!(s.as_bytes()[s.len() - 2], b'a' | b'e' | b'i' | b'o' | b'u') =>
            {
                format!("{}ies", &s[..s.len() - 1])
            }

            s if s.ends_with('s')
                || s.ends_with("sh")
                || s.ends_with("ch")
                || s.ends_with('x')
                || s.ends_with('z') =>
            {
                format!("{}es", s)
            }

            s => format!("{}s", s),
        }
    }

    /// Convert a plural noun to its singular form
    ///
    /// ```
    /// use jsonapi::core::inflect::Inflector;
    ///
    /// assert_eq!(Inflector::singularize("posts"), "post");
    /// assert_eq!(Inflector::singularize("categories"), "category");
    /// assert_eq!(Inflector::singularize("blog"), "blog");
    /// ```
    pub fn singularize(plural: &str) -> String {
        match plural {
            s if s.ends_with("ies") && s.len() > 3 => format!("{}y", &s[..s.len() - 3]),

            s if s.len() > 3
                && (s.ends_with("sses")
                    || s.ends_with("shes")
                    || s.ends_with("ches")
                    || s.ends_with("xes")
                    || s.ends_with("zes")) =>
            {
                s[..s.len() - 2].to_string()
            }

            // "status", "news", "bus": a trailing "ss"/"us" is not a plural marker
            s if s.ends_with("ss") || s.ends_with("us") => s.to_string(),

            s if s.ends_with('s') && s.len() > 1 => s[..s.len() - 1].to_string(),

            s => s.to_string(),
        }
    }

    /// Convert `blog-posts`, `blog_posts` or `blog posts` to `BlogPosts`
    pub fn studly(s: &str) -> String {
        s.split(['-', '_', ' '])
            .filter(|part| !part.is_empty())
            .map(|part| {
                let mut chars = part.chars();
                match chars.next() {
                    None => String::new(),
                    Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
                }
            })
            .collect()
    }

    /// Convert `BlogPosts`, `blog-posts` or `blog posts` to `blog_posts`
    pub fn snake(s: &str) -> String {
        let mut out = String::with_capacity(s.len() + 4);
        let mut prev_lower = false;

        for c in s.chars() {
            if c == '-' || c == ' ' || c == '_' {
                if !out.ends_with('_') && !out.is_empty() {
                    out.push('_');
                }
                prev_lower = false;
            } else if c.is_uppercase() {
                if prev_lower {
                    out.push('_');
                }
                out.extend(c.to_lowercase());
                prev_lower = false;
            } else {
                out.push(c);
                prev_lower = c.is_lowercase() || c.is_ascii_digit();
            }
        }

        out
    }
}
