//! # Option Registry
//!
//! Maps each [`ValueCategory`] to the ordered options evaluated for fields of
//! that category. [`OptionRegistry::builtin`] carries the built-in options;
//! hosts add their own with [`OptionRegistry::register`] before the engine is
//! built. The registry is immutable once the engine owns it.

use std::collections::BTreeMap;
use std::sync::Arc;

use fieldguard_core::ValueCategory;

use crate::option::{Digits, Distinct, Max, Min, Pattern, Range, Required, ValidatingOption};

/// Category to ordered option list.
#[derive(Debug, Clone, Default)]
pub struct OptionRegistry {
    options: BTreeMap<ValueCategory, Vec<Arc<dyn ValidatingOption>>>,
}

impl OptionRegistry {
    /// A registry without any options.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in options.
    ///
    /// Every category gets `required` and `distinct`; strings add `pattern`;
    /// numeric categories add `range`, `min`, `max` and `digits`.
    pub fn builtin() -> Self {
        let required: Arc<dyn ValidatingOption> = Arc::new(Required);
        let distinct: Arc<dyn ValidatingOption> = Arc::new(Distinct);
        let pattern: Arc<dyn ValidatingOption> = Arc::new(Pattern);
        let numeric: [Arc<dyn ValidatingOption>; 4] =
            [Arc::new(Range), Arc::new(Min), Arc::new(Max), Arc::new(Digits)];

        let mut registry = Self::empty();
        for &category in ValueCategory::all() {
            registry.register(category, Arc::clone(&required));
            registry.register(category, Arc::clone(&distinct));
            if category == ValueCategory::String {
                registry.register(category, Arc::clone(&pattern));
            }
            if category.is_numeric() {
                for option in &numeric {
                    registry.register(category, Arc::clone(option));
                }
            }
        }
        registry
    }

    /// Appends an option to the list of a category.
    pub fn register(
        &mut self,
        category: ValueCategory,
        option: Arc<dyn ValidatingOption>,
    ) -> &mut Self {
        self.options.entry(category).or_default().push(option);
        self
    }

    /// Options evaluated for fields of `category`, in registration order.
    pub fn options_for(&self, category: ValueCategory) -> &[Arc<dyn ValidatingOption>] {
        self.options
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Options registered for other categories but not for `category`.
    ///
    /// Such an option set on a field of `category` is an authoring error.
    pub fn misplaced(&self, category: ValueCategory) -> Vec<&Arc<dyn ValidatingOption>> {
        let own = self.options_for(category);
        let mut found: Vec<&Arc<dyn ValidatingOption>> = Vec::new();
        for option in self
            .options
            .iter()
            .filter(|(c, _)| **c != category)
            .flat_map(|(_, options)| options)
        {
            let name = option.name();
            let known = own.iter().any(|o| o.name() == name)
                || found.iter().any(|o| o.name() == name);
            if !known {
                found.push(option);
            }
        }
        found
    }

    /// True when an option with this name is registered for any category.
    pub fn is_registered(&self, name: &str) -> bool {
        self.options.values().flatten().any(|o| o.name() == name)
    }
}
