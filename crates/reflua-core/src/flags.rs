//! Type classification flags.

use bitflags::bitflags;

bitflags! {
    /// Kind of a registered type.
    ///
    /// ```
    /// use reflua_core::TypeFlags;
    ///
    /// let flags = TypeFlags::POINTER;
    /// assert!(flags.contains(TypeFlags::POINTER));
    /// assert!(!flags.contains(TypeFlags::CLASS));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TypeFlags: u8 {
        /// User class with members; gets a constructor table and a behavior table.
        const CLASS = 1 << 0;
        /// Pointer to another registered type (see `TypeEntry::raw_type`).
        const POINTER = 1 << 1;
        /// Built-in scalar.
        const PRIMITIVE = 1 << 2;
        /// The `void` type.
        const VOID = 1 << 3;
    }
}
