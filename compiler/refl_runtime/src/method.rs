//! Reflected methods.
//!
//! A method records its parameter and return tags next to a type-erased
//! entry point. [`MetaMethod::invoke`] checks the arguments against the
//! recorded tags before calling the entry point;
//! [`MetaMethod::invoke_unchecked`] calls it directly.

use std::any::Any;
use std::fmt;

use refl_ir::{Name, StringLookup};
use smallvec::SmallVec;

use crate::error::ReflectError;
use crate::metadata::DisplayMetadata;
use crate::variant::{Variant, VariantType, VariantValue};

/// Type-erased method entry point.
///
/// The instance is `None` for static methods and is otherwise already
/// projected to the declaring class.
pub type MethodEntry =
    Box<dyn Fn(Option<&mut dyn Any>, &ArgBlock) -> Result<Variant, ReflectError> + Send + Sync>;

/// Positional call arguments.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ArgBlock {
    args: SmallVec<[Variant; 4]>,
}

impl ArgBlock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: impl Into<Variant>) {
        self.args.push(value.into());
    }

    /// Builder form of [`push`](Self::push).
    #[must_use]
    pub fn with(mut self, value: impl Into<Variant>) -> Self {
        self.push(value);
        self
    }

    pub fn get(&self, index: usize) -> Option<&Variant> {
        self.args.get(index)
    }

    /// Typed argument, `None` if missing or of another type.
    pub fn arg<T: VariantValue>(&self, index: usize) -> Option<T> {
        self.args.get(index).and_then(T::from_variant)
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Variant> + '_ {
        self.args.iter()
    }
}

impl FromIterator<Variant> for ArgBlock {
    fn from_iter<I: IntoIterator<Item = Variant>>(iter: I) -> Self {
        ArgBlock {
            args: iter.into_iter().collect(),
        }
    }
}

/// Method of a reflected class.
pub struct MetaMethod {
    pub(crate) name: Name,
    pub(crate) owner: Name,
    pub(crate) is_static: bool,
    pub(crate) is_const: bool,
    pub(crate) params: Vec<VariantType>,
    pub(crate) ret: VariantType,
    pub(crate) metadata: DisplayMetadata,
    entry: MethodEntry,
}

impl MetaMethod {
    /// Instance method with a raw entry point.
    pub fn new<F>(name: Name, params: Vec<VariantType>, ret: VariantType, entry: F) -> Self
    where
        F: Fn(Option<&mut dyn Any>, &ArgBlock) -> Result<Variant, ReflectError>
            + Send
            + Sync
            + 'static,
    {
        MetaMethod {
            name,
            owner: Name::NONE,
            is_static: false,
            is_const: false,
            params,
            ret,
            metadata: DisplayMetadata::default(),
            entry: Box::new(entry),
        }
    }

    /// Instance method on a Rust type `C`.
    pub fn native<C, F>(name: Name, params: Vec<VariantType>, ret: VariantType, f: F) -> Self
    where
        C: Any,
        F: Fn(&mut C, &ArgBlock) -> Result<Variant, ReflectError> + Send + Sync + 'static,
    {
        Self::new(
            name,
            params,
            ret,
            move |instance: Option<&mut dyn Any>, args: &ArgBlock| {
                let this = instance
                    .and_then(|instance| instance.downcast_mut::<C>())
                    .ok_or(ReflectError::InvalidInstance)?;
                f(this, args)
            },
        )
    }

    /// Static method; the entry point never sees an instance.
    pub fn static_fn<F>(name: Name, params: Vec<VariantType>, ret: VariantType, f: F) -> Self
    where
        F: Fn(&ArgBlock) -> Result<Variant, ReflectError> + Send + Sync + 'static,
    {
        let mut method = Self::new(
            name,
            params,
            ret,
            move |_: Option<&mut dyn Any>, args: &ArgBlock| f(args),
        );
        method.is_static = true;
        method
    }

    #[must_use]
    pub fn with_const(mut self, is_const: bool) -> Self {
        self.is_const = is_const;
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: DisplayMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn name(&self) -> Name {
        self.name
    }

    /// Class that declares this method.
    pub fn owner(&self) -> Name {
        self.owner
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn is_const(&self) -> bool {
        self.is_const
    }

    pub fn params(&self) -> &[VariantType] {
        &self.params
    }

    pub fn return_type(&self) -> VariantType {
        self.ret
    }

    pub fn metadata(&self) -> &DisplayMetadata {
        &self.metadata
    }

    /// Check arity and argument tags.
    pub fn validate<L: StringLookup + ?Sized>(
        &self,
        lookup: &L,
        args: &ArgBlock,
    ) -> Result<(), ReflectError> {
        if args.len() != self.params.len() {
            return Err(ReflectError::ArgumentCount {
                method: lookup.render(self.name),
                expected: self.params.len(),
                found: args.len(),
            });
        }
        for (index, (expected, arg)) in self.params.iter().zip(args.iter()).enumerate() {
            if arg.ty() != *expected {
                return Err(ReflectError::ArgumentType {
                    method: lookup.render(self.name),
                    index,
                    expected: expected.describe(lookup),
                    found: arg.ty().describe(lookup),
                });
            }
        }
        Ok(())
    }

    /// Validate `args`, then call the entry point.
    pub fn invoke<L: StringLookup + ?Sized>(
        &self,
        lookup: &L,
        instance: Option<&mut dyn Any>,
        args: &ArgBlock,
    ) -> Result<Variant, ReflectError> {
        self.validate(lookup, args)?;
        if !self.is_static && instance.is_none() {
            return Err(ReflectError::MissingInstance {
                method: lookup.render(self.name),
            });
        }
        self.invoke_unchecked(instance, args)
    }

    /// Call the entry point without checking the arguments.
    ///
    /// Still memory-safe: typed entry points downcast and fail on mismatch.
    pub fn invoke_unchecked(
        &self,
        instance: Option<&mut dyn Any>,
        args: &ArgBlock,
    ) -> Result<Variant, ReflectError> {
        (self.entry)(instance, args)
    }
}

impl fmt::Debug for MetaMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetaMethod")
            .field("name", &self.name)
            .field("owner", &self.owner)
            .field("is_static", &self.is_static)
            .field("params", &self.params)
            .field("ret", &self.ret)
            .finish_non_exhaustive()
    }
}
