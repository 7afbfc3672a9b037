//! # Descriptor Model
//!
//! An operation catalogue describes the surface of one pipeline interface:
//! each operation has a name, an ordered parameter list, a return type and a
//! [`Direction`]. The chain runtime is parametrized over this data; it never
//! inspects handler code to learn it.
//!
//! Catalogues come from two places:
//!
//! 1. **Typed operations**: [`CatalogueBuilder::operation`] derives the
//!    descriptor from an [`Operation`] implementation, so the declared shape
//!    and the callable shape cannot drift apart.
//! 2. **External producers**: [`OperationDescriptor::new`] builds a
//!    descriptor by hand, e.g. from a schema file.
//!
//! The builder only checks what the chain depends on: the catalogue is
//! non-empty and names are unique.

use crate::{
    direction::Direction, error::CatalogueError, interface::Interface, operation::Operation,
};
use std::{
    any::{TypeId, type_name},
    borrow::Cow,
    collections::HashMap,
    fmt,
};

/// One entry of an operation's ordered parameter list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Parameter {
    name: Cow<'static, str>,
    ty: Cow<'static, str>,
}

impl Parameter {
    /// Create a parameter from a name and a type label.
    pub fn new(name: impl Into<Cow<'static, str>>, ty: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }

    /// Parameter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameter type label.
    pub fn ty(&self) -> &str {
        &self.ty
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.ty)
    }
}

/// Return shape of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReturnType {
    /// The result is discarded (`()`).
    Void,
    /// The handler's value is returned to the caller unchanged.
    Value(Cow<'static, str>),
}

impl ReturnType {
    /// Whether the operation returns nothing.
    pub fn is_void(&self) -> bool {
        matches!(self, ReturnType::Void)
    }
}

/// Immutable description of one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationDescriptor {
    name: Cow<'static, str>,
    parameters: Vec<Parameter>,
    return_type: ReturnType,
    direction: Direction,
}

impl OperationDescriptor {
    /// Start a void, parameterless descriptor.
    pub fn new(name: impl Into<Cow<'static, str>>, direction: Direction) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            return_type: ReturnType::Void,
            direction,
        }
    }

    /// Append a parameter.
    pub fn with_parameter(
        mut self,
        name: impl Into<Cow<'static, str>>,
        ty: impl Into<Cow<'static, str>>,
    ) -> Self {
        self.parameters.push(Parameter::new(name, ty));
        self
    }

    /// Set a value return type.
    pub fn returning(mut self, ty: impl Into<Cow<'static, str>>) -> Self {
        self.return_type = ReturnType::Value(ty.into());
        self
    }

    /// Derive the descriptor of a typed operation.
    ///
    /// The return type is [`ReturnType::Void`] exactly when `Op::Output` is `()`.
    pub fn of<I, Op>() -> Self
    where
        I: Interface,
        Op: Operation<I>,
    {
        let return_type = if TypeId::of::<Op::Output>() == TypeId::of::<()>() {
            ReturnType::Void
        } else {
            ReturnType::Value(Cow::Borrowed(type_name::<Op::Output>()))
        };

        Self {
            name: Cow::Borrowed(Op::NAME),
            parameters: Op::PARAMETERS
                .iter()
                .map(|&(name, ty)| Parameter::new(name, ty))
                .collect(),
            return_type,
            direction: Op::DIRECTION,
        }
    }

    /// Operation name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ordered parameters, excluding the routed context.
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Return shape.
    pub fn return_type(&self) -> &ReturnType {
        &self.return_type
    }

    /// Propagation direction.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Render the handler-facing signature, with the routed context appended
    /// as the last parameter (`next` for forward, `prev` for reverse).
    pub fn routed_signature(&self) -> String {
        let routed = if self.direction.is_forward() {
            "next"
        } else {
            "prev"
        };
        let mut params: Vec<String> = self.parameters.iter().map(ToString::to_string).collect();
        params.push(routed.to_string());

        match &self.return_type {
            ReturnType::Void => format!("{}({})", self.name, params.join(", ")),
            ReturnType::Value(ty) => format!("{}({}) -> {}", self.name, params.join(", "), ty),
        }
    }
}

impl fmt::Display for OperationDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, param) in self.parameters.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{param}")?;
        }
        f.write_str(")")?;
        if let ReturnType::Value(ty) = &self.return_type {
            write!(f, " -> {ty}")?;
        }
        write!(f, " [{}]", self.direction)
    }
}

/// A validated, ordered set of operation descriptors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalogue {
    operations: Vec<OperationDescriptor>,
    index: HashMap<String, usize>,
}

impl Catalogue {
    /// Start building a catalogue.
    pub fn builder() -> CatalogueBuilder {
        CatalogueBuilder::new()
    }

    /// Look up an operation by name.
    pub fn get(&self, name: &str) -> Option<&OperationDescriptor> {
        self.index.get(name).map(|&i| &self.operations[i])
    }

    /// Whether an operation with this name is declared.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// All operations in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &OperationDescriptor> {
        self.operations.iter()
    }

    /// Operations routed toward `next`.
    pub fn forward(&self) -> impl Iterator<Item = &OperationDescriptor> {
        self.iter().filter(|op| op.direction() == Direction::Forward)
    }

    /// Operations routed toward `prev`.
    pub fn reverse(&self) -> impl Iterator<Item = &OperationDescriptor> {
        self.iter().filter(|op| op.direction() == Direction::Reverse)
    }

    /// Number of operations. Never zero.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Always `false`; a built catalogue holds at least one operation.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

impl<'a> IntoIterator for &'a Catalogue {
    type Item = &'a OperationDescriptor;
    type IntoIter = std::slice::Iter<'a, OperationDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.iter()
    }
}

/// Builder for constructing a [`Catalogue`].
#[derive(Debug, Default)]
pub struct CatalogueBuilder {
    operations: Vec<OperationDescriptor>,
}

impl CatalogueBuilder {
    /// Create a new empty catalogue builder.
    pub fn new() -> Self {
        Self {
            operations: Vec::new(),
        }
    }

    /// Declare a typed operation.
    pub fn operation<I, Op>(self) -> Self
    where
        I: Interface,
        Op: Operation<I>,
    {
        self.descriptor(OperationDescriptor::of::<I, Op>())
    }

    /// Declare a hand-built descriptor.
    pub fn descriptor(mut self, descriptor: OperationDescriptor) -> Self {
        self.operations.push(descriptor);
        self
    }

    /// Validate and build the catalogue.
    pub fn build(self) -> Result<Catalogue, CatalogueError> {
        if self.operations.is_empty() {
            return Err(CatalogueError::Empty);
        }

        let mut index = HashMap::with_capacity(self.operations.len());
        for (i, op) in self.operations.iter().enumerate() {
            if index.insert(op.name().to_string(), i).is_some() {
                return Err(CatalogueError::Duplicate(op.name().to_string()));
            }
        }

        Ok(Catalogue {
            operations: self.operations,
            index,
        })
    }
}
