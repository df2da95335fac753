//! Cross-module name qualification and reference resolution

use crate::COMBINED_MODULE_NAME;
use modsum_summary::ModuleSummaryStore;
use std::collections::HashSet;

/// Names defined across every input of a merge, in their merged spelling
pub(crate) struct NameResolver {
    functions: HashSet<String>,
}

impl NameResolver {
    pub fn new(inputs: &[&ModuleSummaryStore]) -> Self {
        let mut functions = HashSet::new();
        for input in inputs {
            let scope = Scope::new(input);
            for function in input.functions() {
                if let Some(name) = input.symbols().get(function.id()) {
                    functions.insert(scope.qualify(name));
                }
            }
        }
        Self { functions }
    }

    /// Whether some input defines a function under this merged name
    pub fn is_function(&self, name: &str) -> bool {
        self.functions.contains(name)
    }
}

/// Name resolution context for one input store
pub(crate) struct Scope<'a> {
    input: &'a ModuleSummaryStore,
    /// `None` for inputs that are already merged
    prefix: Option<&'a str>,
}

impl<'a> Scope<'a> {
    pub fn new(input: &'a ModuleSummaryStore) -> Self {
        let prefix = if is_merged(input) {
            None
        } else {
            Some(input.module_name())
        };
        Self { input, prefix }
    }

    pub fn module_name(&self) -> &'a str {
        self.input.module_name()
    }

    /// Merged spelling of a name defined by this input
    pub fn qualify(&self, local: &str) -> String {
        match self.prefix {
            Some(module) => format!("{module}.{local}"),
            None => local.to_string(),
        }
    }

    /// Merged spelling of a name referenced by this input
    ///
    /// A local definition wins. Anything else is kept verbatim, which
    /// covers references already qualified with the defining module
    /// (`Other.f`) as well as truly external symbols.
    pub fn resolve(&self, reference: &str) -> String {
        if self.input.defines(reference) {
            self.qualify(reference)
        } else {
            reference.to_string()
        }
    }
}

/// Whether a store is the output of an earlier merge
pub(crate) fn is_merged(store: &ModuleSummaryStore) -> bool {
    store.module_name() == COMBINED_MODULE_NAME
}
