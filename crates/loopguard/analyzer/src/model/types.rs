// Loopguard
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Type information attached to declarations and call signatures

/// Width of a builtin integer type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntegerKind {
    Bool,
    Char,
    Short,
    Int,
    Long,
    LongLong,
}

/// Structural kind of a type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Void,
    /// Builtin integer, `signed` is ignored for `bool`
    Integer { kind: IntegerKind, signed: bool },
    Floating,
    /// Enumeration, scoped enums do not convert to integers
    Enum { name: String, scoped: bool },
    Pointer(Box<QualType>),
    LValueReference(Box<QualType>),
    RValueReference(Box<QualType>),
    /// Class or struct type
    Record { name: String, has_destructor: bool },
}

/// Coarse classification used by the loop check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeClass {
    Integer,
    Other,
}

/// A type together with its top-level const qualifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualType {
    pub kind: TypeKind,
    pub is_const: bool,
}

impl QualType {
    pub fn new(kind: TypeKind) -> Self {
        Self { kind, is_const: false }
    }

    pub fn int() -> Self {
        Self::new(TypeKind::Integer { kind: IntegerKind::Int, signed: true })
    }

    pub fn unsigned(kind: IntegerKind) -> Self {
        Self::new(TypeKind::Integer { kind, signed: false })
    }

    pub fn integer(kind: IntegerKind) -> Self {
        Self::new(TypeKind::Integer { kind, signed: true })
    }

    pub fn bool() -> Self {
        Self::integer(IntegerKind::Bool)
    }

    pub fn double() -> Self {
        Self::new(TypeKind::Floating)
    }

    pub fn void() -> Self {
        Self::new(TypeKind::Void)
    }

    pub fn enumeration(name: &str, scoped: bool) -> Self {
        Self::new(TypeKind::Enum { name: name.to_string(), scoped })
    }

    pub fn record(name: &str, has_destructor: bool) -> Self {
        Self::new(TypeKind::Record { name: name.to_string(), has_destructor })
    }

    pub fn pointer_to(self) -> Self {
        Self::new(TypeKind::Pointer(Box::new(self)))
    }

    pub fn lvalue_ref_to(self) -> Self {
        Self::new(TypeKind::LValueReference(Box::new(self)))
    }

    pub fn rvalue_ref_to(self) -> Self {
        Self::new(TypeKind::RValueReference(Box::new(self)))
    }

    /// Add a const qualifier
    pub fn constant(mut self) -> Self {
        self.is_const = true;
        self
    }

    /// Builtin integers, `bool`, characters and unscoped enums
    pub fn is_integer(&self) -> bool {
        match &self.kind {
            TypeKind::Integer { .. } => true,
            TypeKind::Enum { scoped, .. } => !scoped,
            _ => false,
        }
    }

    pub fn class(&self) -> TypeClass {
        if self.is_integer() { TypeClass::Integer } else { TypeClass::Other }
    }

    /// Lvalue or rvalue reference
    pub fn is_reference(&self) -> bool {
        self.referenced().is_some()
    }

    /// Type a reference refers to
    pub fn referenced(&self) -> Option<&QualType> {
        match &self.kind {
            TypeKind::LValueReference(inner) | TypeKind::RValueReference(inner) => Some(inner),
            _ => None,
        }
    }

    /// Reference through which the referenced object may be written
    pub fn is_non_const_reference(&self) -> bool {
        self.referenced().is_some_and(|inner| !inner.is_const)
    }

    /// Record with a non-trivial destructor, references never own one
    pub fn has_destructor(&self) -> bool {
        matches!(self.kind, TypeKind::Record { has_destructor: true, .. })
    }
}
