//! TypeSpec naming rules for enum members and model properties.

/// TypeSpec keywords that cannot appear as bare property names.
const RESERVED_WORDS: &[&str] = &[
    "alias",
    "dec",
    "enum",
    "extends",
    "fn",
    "if",
    "import",
    "interface",
    "is",
    "model",
    "namespace",
    "never",
    "op",
    "scalar",
    "union",
    "unknown",
    "using",
    "valueof",
    "void",
];

/// Derive an enum member identifier from a raw enum value.
///
/// Runs of non-alphanumeric characters become a single `_`, outer
/// underscores are stripped, a leading digit gets a `_` prefix and the
/// result is uppercased. Returns `None` when nothing is left.
///
/// ```
/// use tspec_codegen::enum_member_identifier;
///
/// assert_eq!(enum_member_identifier(" in-review "), Some("IN_REVIEW".to_string()));
/// assert_eq!(enum_member_identifier("2fa"), Some("_2FA".to_string()));
/// assert_eq!(enum_member_identifier("--"), None);
/// ```
pub fn enum_member_identifier(value: &str) -> Option<String> {
    let mut ident = String::with_capacity(value.len());
    for c in value.trim().chars() {
        if c.is_ascii_alphanumeric() {
            ident.push(c.to_ascii_uppercase());
        } else if !ident.is_empty() && !ident.ends_with('_') {
            ident.push('_');
        }
    }
    while ident.ends_with('_') {
        ident.pop();
    }
    if ident.is_empty() {
        return None;
    }
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    Some(ident)
}

/// Whether `name` can be written as a bare TypeSpec identifier.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let starts_well = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$');
    starts_well
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        && !RESERVED_WORDS.contains(&name)
}

/// Property name as written in a model; backtick-quoted when not a plain identifier.
pub fn property_name(name: &str) -> String {
    if is_identifier(name) {
        name.to_string()
    } else {
        format!("`{}`", name.replace('`', "\\`"))
    }
}
