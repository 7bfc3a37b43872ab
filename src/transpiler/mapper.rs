use std::collections::BTreeMap;

/// API type parameter used by types declared inside the contract trait.
pub const CONTRACT_API: &str = "<Self::Api>";
/// API type parameter used by generated struct declarations.
pub const STRUCT_API: &str = "<M>";

/// Solidity type tokens mapped to MultiversX types. Unknown tokens map to themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRegistry {
    entries: BTreeMap<String, String>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        let mut registry = TypeRegistry::empty();
        registry.register("uint256", "BigUint<Self::Api>");
        registry.register("address", "ManagedAddress<Self::Api>");
        registry.register("string", "ManagedBuffer<Self::Api>");
        registry.register("bool", "bool");
        registry.register("u8", "u8");
        registry
    }
}

impl TypeRegistry {
    pub fn empty() -> Self {
        TypeRegistry {
            entries: BTreeMap::new(),
        }
    }

    /// Adds or replaces a mapping, returning the previous destination type.
    pub fn register(&mut self, solidity_type: &str, rust_type: &str) -> Option<String> {
        self.entries
            .insert(solidity_type.trim().to_string(), rust_type.trim().to_string())
    }

    pub fn is_recognized(&self, solidity_type: &str) -> bool {
        self.entries.contains_key(solidity_type.trim())
    }

    pub fn map_type<'a>(&'a self, solidity_type: &'a str) -> &'a str {
        let solidity_type = solidity_type.trim();
        self.entries
            .get(solidity_type)
            .map(String::as_str)
            .unwrap_or(solidity_type)
    }

    /// Like [`TypeRegistry::map_type`], for a field of a struct generic over `M`.
    pub fn map_field_type(&self, solidity_type: &str) -> String {
        self.map_type(solidity_type).replace(CONTRACT_API, STRUCT_API)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

fn is_upper(c: char) -> bool {
    c.is_ascii_uppercase()
}

fn is_lower(c: char) -> bool {
    c.is_ascii_lowercase()
}

/// Converts a camelCase or PascalCase identifier to snake_case.
///
/// Two boundary passes run left to right without overlapping matches:
/// first `X` + `Ylower...` becomes `X_Ylower...` (`HTTPServer` -> `HTTP_Server`),
/// then `lower-or-digit` + `Upper` becomes `lower_Upper`. The result is lowercased.
pub fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();

    let mut words = Vec::with_capacity(chars.len() + 4);
    let mut i = 0;
    while i < chars.len() {
        let starts_word = chars[i] != '\n'
            && chars.get(i + 1).map_or(false, |c| is_upper(*c))
            && chars.get(i + 2).map_or(false, |c| is_lower(*c));
        if starts_word {
            let mut end = i + 3;
            while end < chars.len() && is_lower(chars[end]) {
                end += 1;
            }
            words.push(chars[i]);
            words.push('_');
            words.extend_from_slice(&chars[i + 1..end]);
            i = end;
        } else {
            words.push(chars[i]);
            i += 1;
        }
    }

    let mut output = String::with_capacity(words.len() + 4);
    let mut i = 0;
    while i < words.len() {
        let current = words[i];
        let boundary = (is_lower(current) || current.is_ascii_digit())
            && words.get(i + 1).map_or(false, |c| is_upper(*c));
        output.push(current);
        if boundary {
            output.push('_');
            output.push(words[i + 1]);
            i += 2;
        } else {
            i += 1;
        }
    }

    output.to_lowercase()
}
