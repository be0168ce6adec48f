//! Identifier exclusion configuration
//!
//! Short names and very common Python names carry almost no information, so
//! the parser filters them out of classes, functions, variables and calls.
//! String literals are exempt from the name set; only the length rule
//! applies to them.
//!
//! The set is an immutable configuration value built once at startup and
//! passed explicitly into the parser; there is no ambient global state.

use std::collections::HashSet;

/// Minimum identifier length kept in classes/functions/variables/calls
pub const MIN_NAME_LEN: usize = 3;

/// String literals whose trimmed length does not exceed this are dropped
pub const MIN_STRING_LEN: usize = 6;

/// Python dunder methods, builtins and ubiquitous method names.
const COMMON_NAMES: &[&str] = &[
    // Python idioms.
    "_",
    // Python special method names.
    "__abs__", "__add__", "__and__", "__ceil__", "__cmp__", "__coerce__",
    "__complex__", "__contains__", "__copy__", "__deepcopy__", "__del__",
    "__delete__", "__delitem__", "__dir__", "__div__", "__divmod__",
    "__eq__", "__float__", "__floor__", "__floordiv__", "__format__",
    "__ge__", "__get__", "__getitem__", "__gt__", "__hash__", "__hex__",
    "__iadd__", "__iand__", "__idiv__", "__ifloordiv__", "__ilshift__",
    "__imod__", "__imul__", "__index__", "__init__", "__int__",
    "__invert__", "__ior__", "__ipow__", "__irshift__", "__isub__",
    "__iter__", "__itruediv__", "__ixor__", "__le__", "__len__", "__long__",
    "__lshift__", "__lt__", "__missing__", "__mod__", "__mul__", "__ne__",
    "__neg__", "__new__", "__nonzero__", "__oct__", "__or__", "__pos__",
    "__pow__", "__radd__", "__rand__", "__rdiv__", "__rdivmod__", "__repr__",
    "__reversed__", "__rfloordiv__", "__rlshift__", "__rmod__", "__rmul__",
    "__ror__", "__round__", "__rpow__", "__rrshift__", "__rshift__",
    "__rsub__", "__rtruediv__", "__rxor__", "__set__", "__setitem__",
    "__sizeof__", "__str__", "__sub__", "__truediv__", "__trunc__",
    "__unicode__", "__xor__", "__import__",
    // Built-in functions.
    "abs", "all", "any", "ascii", "bin", "bool", "bytearray", "bytes",
    "callable", "chr", "classmethod", "compile", "complex", "delattr",
    "dict", "dir", "divmod", "enumerate", "eval", "exec", "filter",
    "float", "format", "frozenset", "getattr", "globals", "hasattr", "hash",
    "help", "hex", "id", "input", "int", "isinstance", "issubclass", "iter",
    "len", "list", "locals", "map", "max", "memoryview", "min", "next",
    "object", "oct", "ord", "pow", "print", "property", "range",
    "repr", "reversed", "round", "set", "setattr", "slice", "sorted",
    "staticmethod", "str", "sum", "super", "tuple", "type", "vars", "self",
    "zip",
    // Common method names and exception types.
    "add", "get", "join", "startswith", "endswith", "strip",
    "find", "index", "lstrip", "rstrip", "replace", "sub",
    "pop", "popitem", "values", "update", "copy", "clear",
    "items", "keys", "append", "appendleft", "ValueError",
    "SystemExit", "StopIteration", "KeyError", "RuntimeError",
];

/// Immutable exclusion configuration shared by all workers
#[derive(Debug, Clone)]
pub struct ExclusionSet {
    min_name_len: usize,
    min_string_len: usize,
    common: HashSet<&'static str>,
}

impl ExclusionSet {
    /// The standard exclusion configuration
    pub fn standard() -> Self {
        Self {
            min_name_len: MIN_NAME_LEN,
            min_string_len: MIN_STRING_LEN,
            common: COMMON_NAMES.iter().copied().collect(),
        }
    }

    /// True if an identifier should be dropped from the record
    pub fn ignorable_name(&self, name: &str) -> bool {
        name.len() < self.min_name_len || self.common.contains(name)
    }

    /// True if a string literal should be dropped.
    ///
    /// Only the length rule applies; common names are not consulted, so a
    /// long string that happens to equal a builtin name is still kept.
    pub fn ignorable_string(&self, text: &str) -> bool {
        text.trim().len() <= self.min_string_len
    }
}

impl Default for ExclusionSet {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_names_are_ignorable() {
        let ex = ExclusionSet::standard();
        assert!(ex.ignorable_name("ab"));
        assert!(!ex.ignorable_name("abc"));
    }

    #[test]
    fn common_names_are_ignorable_regardless_of_length() {
        let ex = ExclusionSet::standard();
        assert!(ex.ignorable_name("isinstance"));
        assert!(ex.ignorable_name("__init__"));
        assert!(ex.ignorable_name("self"));
        assert!(!ex.ignorable_name("walk_tree"));
    }

    #[test]
    fn string_boundary_is_exclusive_at_six() {
        let ex = ExclusionSet::standard();
        assert!(ex.ignorable_string("sixsix")); // exactly 6: dropped
        assert!(!ex.ignorable_string("sevens7")); // 7: kept
        assert!(ex.ignorable_string("  sixsix  ")); // trimmed length counts
    }

    #[test]
    fn strings_are_exempt_from_the_name_set() {
        let ex = ExclusionSet::standard();
        // "classmethod" is a common name but a perfectly good long string.
        assert!(ex.ignorable_name("classmethod"));
        assert!(!ex.ignorable_string("classmethod"));
    }
}
