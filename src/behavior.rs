//! Per-class behavior tables.
//!
//! Every bound class gets one [`BehaviorTable`], keyed `<raw type name>_MT_`.
//! A pointer type resolves to its pointee first, so `T` and `T*` instances
//! share a table and dispatch against the same members.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use reflua_core::{TypeEntry, TypeHash};
use reflua_registry::TypeRegistry;

/// Suffix appended to a class name to form its behavior table key.
pub const BEHAVIOR_SUFFIX: &str = "_MT_";

/// Behavior table key for `type_hash`, or `None` if the type is unknown.
pub fn behavior_table_name(registry: &TypeRegistry, type_hash: TypeHash) -> Option<String> {
    registry
        .resolve(type_hash)
        .map(|raw| format!("{}{}", raw.name, BEHAVIOR_SUFFIX))
}

/// Dispatch target shared by every instance of one class.
#[derive(Debug, PartialEq, Eq)]
pub struct BehaviorTable {
    name: String,
    class: TypeHash,
    class_name: String,
}

impl BehaviorTable {
    fn new(class: &TypeEntry) -> Self {
        Self {
            name: format!("{}{}", class.name, BEHAVIOR_SUFFIX),
            class: class.type_hash,
            class_name: class.name.clone(),
        }
    }

    /// Table key, `<class>_MT_`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Class members are resolved against.
    pub fn class(&self) -> TypeHash {
        self.class
    }

    /// Name of that class.
    pub fn class_name(&self) -> &str {
        &self.class_name
    }
}

/// All behavior tables of a bridge, built once at bind time.
#[derive(Debug, Default)]
pub struct BehaviorTables {
    tables: FxHashMap<String, Rc<BehaviorTable>>,
}

impl BehaviorTables {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the table for `class`.
    pub fn create(&mut self, class: &TypeEntry) -> Rc<BehaviorTable> {
        let table = BehaviorTable::new(class);
        Rc::clone(
            self.tables
                .entry(table.name.clone())
                .or_insert_with(|| Rc::new(table)),
        )
    }

    /// Look a table up by key.
    pub fn get(&self, name: &str) -> Option<&Rc<BehaviorTable>> {
        self.tables.get(name)
    }

    /// Table for instances of `type_hash` (class or pointer to class).
    pub fn for_type(&self, registry: &TypeRegistry, type_hash: TypeHash) -> Option<Rc<BehaviorTable>> {
        let name = behavior_table_name(registry, type_hash)?;
        self.get(&name).cloned()
    }

    /// Number of tables.
    pub(crate) fn len(&self) -> usize {
        self.tables.len()
    }
}
