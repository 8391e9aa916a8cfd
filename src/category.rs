use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Name of the root category every other category descends from.
pub const ROOT_CATEGORY: &str = "Warning";

const BUILTIN_CATEGORIES: &[&str] = &[
    "UserWarning",
    "DeprecationWarning",
    "PendingDeprecationWarning",
    "SyntaxWarning",
    "RuntimeWarning",
    "FutureWarning",
    "ImportWarning",
    "UnicodeWarning",
    "BytesWarning",
    "ResourceWarning",
    "EncodingWarning",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CategoryError {
    #[error("Category '{0}' is already registered")]
    AlreadyRegistered(String),

    #[error("Unknown parent category '{parent}' for '{name}'")]
    UnknownParent { name: String, parent: String },

    #[error("Category name must not be empty")]
    EmptyName,
}

/// A resolved warning category.
///
/// Carries its full ancestry (itself first, the root last) so subclass checks
/// don't need the registry.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Category {
    lineage: Arc<[String]>,
}

impl Category {
    fn root() -> Self {
        Self {
            lineage: Arc::from(vec![ROOT_CATEGORY.to_string()]),
        }
    }

    fn child_of(name: &str, parent: &Category) -> Self {
        let mut lineage = Vec::with_capacity(parent.lineage.len() + 1);
        lineage.push(name.to_string());
        lineage.extend(parent.lineage.iter().cloned());
        Self {
            lineage: Arc::from(lineage),
        }
    }

    pub fn name(&self) -> &str {
        &self.lineage[0]
    }

    pub fn parent(&self) -> Option<&str> {
        self.lineage.get(1).map(String::as_str)
    }

    /// True when `self` is `other` or one of its descendants.
    pub fn is_subclass_of(&self, other: &Category) -> bool {
        self.lineage.iter().any(|name| name == other.name())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Debug for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Category({})", self.lineage.join(" < "))
    }
}

impl Serialize for Category {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Registry of known warning categories, keyed by name.
#[derive(Debug, Clone)]
pub struct CategoryRegistry {
    categories: HashMap<String, Category>,
    order: Vec<String>,
}

impl Default for CategoryRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl CategoryRegistry {
    /// Registry pre-populated with `Warning` and its standard subcategories.
    pub fn with_builtins() -> Self {
        let root = Category::root();
        let mut registry = Self {
            categories: HashMap::new(),
            order: Vec::new(),
        };
        registry.insert(root.clone());
        for name in BUILTIN_CATEGORIES {
            registry.insert(Category::child_of(name, &root));
        }
        registry
    }

    fn insert(&mut self, category: Category) {
        self.order.push(category.name().to_string());
        self.categories
            .insert(category.name().to_string(), category);
    }

    /// Register a custom category below an already known parent.
    pub fn register(&mut self, name: &str, parent: &str) -> Result<Category, CategoryError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CategoryError::EmptyName);
        }
        if self.categories.contains_key(name) {
            return Err(CategoryError::AlreadyRegistered(name.to_string()));
        }
        let parent_category = self
            .lookup(parent)
            .ok_or_else(|| CategoryError::UnknownParent {
                name: name.to_string(),
                parent: parent.to_string(),
            })?;
        let category = Category::child_of(name, &parent_category);
        self.insert(category.clone());
        Ok(category)
    }

    /// Resolve a category by name. An empty name resolves to the root.
    pub fn lookup(&self, name: &str) -> Option<Category> {
        let name = name.trim();
        if name.is_empty() {
            return Some(self.root());
        }
        self.categories.get(name).cloned()
    }

    pub fn root(&self) -> Category {
        self.categories
            .get(ROOT_CATEGORY)
            .cloned()
            .unwrap_or_else(Category::root)
    }

    /// Categories in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.order.iter().filter_map(|name| self.categories.get(name))
    }
}
