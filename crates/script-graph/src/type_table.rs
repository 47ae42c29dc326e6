//! Recognized-type table: native element type names mapped onto [`ElementType`].

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::ir::ElementType;

/// Mappings every table starts from.
const STANDARD_TYPES: [(&str, ElementType); 6] = [
    ("float", ElementType::Float32),
    ("int", ElementType::Int32),
    ("bool", ElementType::Bool),
    ("torch.float32", ElementType::Float32),
    ("torch.int32", ElementType::Int32),
    ("torch.bool", ElementType::Bool),
];

static STANDARD: LazyLock<TypeTable> = LazyLock::new(|| {
    let mut table = TypeTable::empty();
    table.extend(STANDARD_TYPES);
    table
});

/// Closed mapping from native type names to target element types.
///
/// Extending a table only ever adds names: an existing mapping is never replaced, so code
/// relying on it keeps decoding the same way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeTable {
    entries: HashMap<String, ElementType>,
}

impl TypeTable {
    /// The process-wide standard table.
    pub fn standard() -> &'static TypeTable {
        &STANDARD
    }

    /// A table with no mappings.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Element type for `name`, or [`ElementType::Dynamic`] when it is not recognized.
    pub fn lookup(&self, name: &str) -> ElementType {
        self.get(name).unwrap_or(ElementType::Dynamic)
    }

    /// Element type for `name`, if recognized.
    pub fn get(&self, name: &str) -> Option<ElementType> {
        self.entries.get(name).copied()
    }

    /// Whether `name` is recognized.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Add a mapping.
    ///
    /// Returns `false` and leaves the table untouched when `name` is already mapped or when
    /// `elem_type` is dynamic.
    pub fn insert(&mut self, name: impl Into<String>, elem_type: ElementType) -> bool {
        let name = name.into();
        if elem_type.is_dynamic() {
            log::warn!("Ignoring mapping of {name} to the dynamic element type");
            return false;
        }
        match self.entries.get(&name) {
            Some(existing) if *existing == elem_type => false,
            Some(existing) => {
                log::warn!(
                    "Type {name} is already mapped to {existing}, keeping it instead of {elem_type}"
                );
                false
            }
            None => {
                self.entries.insert(name, elem_type);
                true
            }
        }
    }

    /// Builder-style [`TypeTable::insert`].
    pub fn with(mut self, name: impl Into<String>, elem_type: ElementType) -> Self {
        self.insert(name, elem_type);
        self
    }

    /// Number of recognized names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table recognizes nothing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(name, element type)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, ElementType)> {
        self.entries.iter().map(|(name, ty)| (name.as_str(), *ty))
    }
}

impl Default for TypeTable {
    fn default() -> Self {
        Self::standard().clone()
    }
}

impl<S: Into<String>> Extend<(S, ElementType)> for TypeTable {
    fn extend<T: IntoIterator<Item = (S, ElementType)>>(&mut self, iter: T) {
        for (name, elem_type) in iter {
            self.insert(name, elem_type);
        }
    }
}
