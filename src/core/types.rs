//! Core value types that flow through the composition graph.
//!
//! Unlike a closed enum of payloads, values here are type-erased: a [`Value`]
//! holds exactly one payload of any `'static + Send + Sync` type together with
//! a [`TypeTag`] naming that type. Nodes declare what they accept and produce
//! as [`Capability`]s, and the graph checks capabilities when edges are built
//! so that a mismatched payload is never discovered mid-evaluation.

use crate::core::error::{EvaluationError, TypeMismatch};
use image::{ImageBuffer, Luma, RgbImage};
use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// 8-bit, three channel image. The channel order is whatever color type the
/// producer says it is (RGB for images coming from the `image` crate).
pub type Image = RgbImage;

/// Single channel matrix of normalized `f32` samples (0.0 ..= 1.0 for
/// channels produced by [`SplitChannels`](crate::filters::builtin::SplitChannels)).
pub type Plane = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Runtime identity of a payload type.
///
/// Equality and hashing use the [`TypeId`] only; the name is kept for
/// error messages and presentation.
#[derive(Clone, Copy)]
pub struct TypeTag {
    id: TypeId,
    name: &'static str,
}

impl TypeTag {
    /// Tag for the type `T`.
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// The underlying [`TypeId`].
    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name.
    pub fn full_name(&self) -> &'static str {
        self.name
    }

    /// Type name with module paths stripped, e.g. `ImageBuffer<Luma<f32>, Vec<f32>>`.
    pub fn short_name(&self) -> String {
        let mut out = String::with_capacity(self.name.len());
        let mut segment = String::new();
        let mut chars = self.name.chars().peekable();

        while let Some(c) = chars.next() {
            if c == ':' && chars.peek() == Some(&':') {
                chars.next();
                segment.clear();
            } else if c.is_alphanumeric() || c == '_' {
                segment.push(c);
            } else {
                out.push_str(&segment);
                segment.clear();
                out.push(c);
            }
        }
        out.push_str(&segment);
        out
    }
}

impl PartialEq for TypeTag {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeTag {}

impl Hash for TypeTag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeTag({})", self.short_name())
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.short_name())
    }
}

/// A type-erased, immutable payload carrier.
///
/// Cloning a `Value` shares the payload; nobody can obtain a mutable
/// reference to it once it is wrapped.
#[derive(Clone)]
pub struct Value {
    tag: TypeTag,
    payload: Arc<dyn Any + Send + Sync>,
}

impl Value {
    /// Wrap `value` and tag it with its type.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            tag: TypeTag::of::<T>(),
            payload: Arc::new(value),
        }
    }

    /// Type of the payload.
    pub fn tag(&self) -> TypeTag {
        self.tag
    }

    /// Tag-checked access to the payload.
    pub fn get<T: Any>(&self) -> Result<&T, TypeMismatch> {
        self.payload
            .downcast_ref::<T>()
            .ok_or_else(|| TypeMismatch::new(TypeTag::of::<T>(), self.tag))
    }

    /// Access the payload if it is a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }

    /// Whether the payload is a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.tag.type_id() == TypeId::of::<T>()
    }

    /// Whether both values share the same payload instance.
    pub fn ptr_eq(&self, other: &Value) -> bool {
        Arc::ptr_eq(&self.payload, &other.payload)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.downcast_ref::<Bundle>() {
            Some(bundle) => write!(f, "Value({})", bundle),
            None => write!(f, "Value({})", self.tag),
        }
    }
}

/// Ordered group of values, the payload of fan-out outputs and fan-in inputs.
#[derive(Clone, Debug, Default)]
pub struct Bundle {
    components: Vec<Value>,
}

impl Bundle {
    /// Create a bundle from its components.
    pub fn new(components: Vec<Value>) -> Self {
        Self { components }
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether the bundle has no components.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Component `index` as a value.
    pub fn component(&self, index: usize) -> Option<&Value> {
        self.components.get(index)
    }

    /// Tag-checked access to component `index`.
    pub fn get<T: Any>(&self, index: usize) -> Result<&T, EvaluationError> {
        let value = self
            .components
            .get(index)
            .ok_or(EvaluationError::MissingComponent {
                index,
                len: self.components.len(),
            })?;
        Ok(value.get::<T>()?)
    }

    /// All components.
    pub fn components(&self) -> &[Value] {
        &self.components
    }

    /// Tags of all components, in order.
    pub fn tags(&self) -> Vec<TypeTag> {
        self.components.iter().map(Value::tag).collect()
    }
}

impl FromIterator<Value> for Bundle {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl fmt::Display for Bundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bundle[")?;
        for (i, tag) in self.tags().iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", tag)?;
        }
        write!(f, "]")
    }
}

/// Declared payload kind of a node's input or output.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Exactly one payload of the given type.
    Single(TypeTag),
    /// A [`Bundle`] whose components have the given types.
    Bundle(Vec<TypeTag>),
}

impl Capability {
    /// Single payload of type `T`.
    pub fn of<T: Any>() -> Self {
        Capability::Single(TypeTag::of::<T>())
    }

    /// Bundle of `count` components of type `T`.
    pub fn repeated<T: Any>(count: usize) -> Self {
        Capability::Bundle(vec![TypeTag::of::<T>(); count])
    }

    /// Bundle with the given component types.
    pub fn bundle(tags: impl IntoIterator<Item = TypeTag>) -> Self {
        Capability::Bundle(tags.into_iter().collect())
    }

    /// Number of addressable components (1 for single payloads).
    pub fn arity(&self) -> usize {
        match self {
            Capability::Single(_) => 1,
            Capability::Bundle(tags) => tags.len(),
        }
    }

    /// What travels through `port`: the whole capability, or one bundle component.
    pub fn select(&self, port: crate::graph::connection::Port) -> Option<Capability> {
        use crate::graph::connection::Port;

        match (self, port) {
            (_, Port::Whole) => Some(self.clone()),
            (Capability::Bundle(tags), Port::Component(index)) => {
                tags.get(index).map(|tag| Capability::Single(*tag))
            }
            (Capability::Single(_), Port::Component(_)) => None,
        }
    }

    /// Check whether a value satisfies this capability.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Capability::Single(tag) => value.tag() == *tag,
            Capability::Bundle(tags) => value
                .downcast_ref::<Bundle>()
                .map(|bundle| bundle.tags() == *tags)
                .unwrap_or(false),
        }
    }

    /// Capability describing an existing value.
    pub fn of_value(value: &Value) -> Self {
        match value.downcast_ref::<Bundle>() {
            Some(bundle) => Capability::Bundle(bundle.tags()),
            None => Capability::Single(value.tag()),
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Single(tag) => write!(f, "{}", tag),
            Capability::Bundle(tags) => {
                write!(f, "Bundle[")?;
                for (i, tag) in tags.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", tag)?;
                }
                write!(f, "]")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::connection::Port;

    #[test]
    fn test_value_tag_checked_access() {
        let value = Value::new(42i64);

        assert_eq!(value.tag(), TypeTag::of::<i64>());
        assert_eq!(*value.get::<i64>().unwrap(), 42);
        assert!(value.is::<i64>());

        let err = value.get::<f32>().unwrap_err();
        assert_eq!(err.expected, TypeTag::of::<f32>());
        assert_eq!(err.found, TypeTag::of::<i64>());
    }

    #[test]
    fn test_value_clone_shares_payload() {
        let value = Value::new(Plane::new(4, 4));
        let copy = value.clone();

        assert!(value.ptr_eq(&copy));
        assert!(!value.ptr_eq(&Value::new(Plane::new(4, 4))));
    }

    #[test]
    fn test_short_name_strips_paths() {
        assert_eq!(TypeTag::of::<i64>().short_name(), "i64");
        assert_eq!(TypeTag::of::<Bundle>().short_name(), "Bundle");
        assert_eq!(
            TypeTag::of::<Plane>().short_name(),
            "ImageBuffer<Luma<f32>, Vec<f32>>"
        );
    }

    #[test]
    fn test_capability_select() {
        let planes = Capability::repeated::<Plane>(3);

        assert_eq!(planes.arity(), 3);
        assert_eq!(planes.select(Port::Whole), Some(planes.clone()));
        assert_eq!(planes.select(Port::Component(2)), Some(Capability::of::<Plane>()));
        assert_eq!(planes.select(Port::Component(3)), None);
        assert_eq!(Capability::of::<Image>().select(Port::Component(0)), None);
    }

    #[test]
    fn test_capability_accepts_bundle() {
        let bundle = Value::new(Bundle::new(vec![
            Value::new(Plane::new(1, 1)),
            Value::new(Plane::new(1, 1)),
        ]));

        assert!(Capability::repeated::<Plane>(2).accepts(&bundle));
        assert!(!Capability::repeated::<Plane>(3).accepts(&bundle));
        assert!(!Capability::of::<Plane>().accepts(&bundle));
        assert_eq!(Capability::of_value(&bundle), Capability::repeated::<Plane>(2));
    }
}
