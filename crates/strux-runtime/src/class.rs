//! Class descriptors and instances
//!
//! A [`ClassRef`] is a type descriptor compared by identity, never by shape:
//! two classes built from identical definitions are still different classes.
//! Instances carry their class and an insertion-ordered table of own
//! enumerable fields. Declared members (methods, accessors) live on the class
//! and are kept apart from data fields so field assignment can refuse to
//! shadow them.

use crate::assign::{self, MissingSource};
use crate::error::{StruxError, StruxResult};
use crate::policy::Policy;
use crate::predicates::is_struct_like;
use crate::value::{Callable, Value};
use indexmap::IndexMap;
use std::cell::{Ref, RefCell};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// Member names every non-bare class inherits from the base object
pub const OBJECT_MEMBERS: &[&str] = &[
    "constructor",
    "__defineGetter__",
    "__defineSetter__",
    "__lookupGetter__",
    "__lookupSetter__",
    "__proto__",
    "hasOwnProperty",
    "isPrototypeOf",
    "propertyIsEnumerable",
    "toLocaleString",
    "toString",
    "valueOf",
];

/// Constructor body: receives the fresh instance and the raw argument
pub type Initializer = Rc<dyn Fn(&Instance, Value) -> StruxResult<()>>;

/// "Reduce to plain form" hook
pub type PlainHook = Rc<dyn Fn(&Instance) -> Value>;

/// Class definition. Build one with [`Class::builder`].
pub struct Class {
    name: String,
    parent: Option<ClassRef>,
    members: IndexMap<String, Value>,
    init: Option<Initializer>,
    to_plain: Option<PlainHook>,
    bare: bool,
}

impl Class {
    pub fn builder(name: impl Into<String>) -> ClassBuilder {
        ClassBuilder {
            name: name.into(),
            parent: None,
            members: IndexMap::new(),
            init: None,
            to_plain: None,
            bare: false,
        }
    }

    /// Builder for a lightweight value object: the constructor requires a
    /// struct-like argument and copies its fields through field assignment.
    pub fn record(name: impl Into<String>) -> ClassBuilder {
        Class::builder(name).init(|this, arg| {
            if !is_struct_like(&arg) {
                return Err(StruxError::mismatch(&arg, "is_struct_like"));
            }
            assign::assign_instance(MissingSource::Reject, this, &arg)
        })
    }
}

/// Fluent class builder
pub struct ClassBuilder {
    name: String,
    parent: Option<ClassRef>,
    members: IndexMap<String, Value>,
    init: Option<Initializer>,
    to_plain: Option<PlainHook>,
    bare: bool,
}

impl ClassBuilder {
    pub fn extends(mut self, parent: &ClassRef) -> Self {
        self.parent = Some(parent.clone());
        self
    }

    /// Declare a method
    pub fn method(mut self, name: &str) -> Self {
        self.members
            .insert(name.to_string(), Value::Function(Callable::named(name)));
        self
    }

    /// Declare a non-data member with an explicit value (accessors, constants)
    pub fn member(mut self, name: &str, value: Value) -> Self {
        self.members.insert(name.to_string(), value);
        self
    }

    pub fn init(mut self, init: impl Fn(&Instance, Value) -> StruxResult<()> + 'static) -> Self {
        self.init = Some(Rc::new(init));
        self
    }

    pub fn to_plain(mut self, hook: impl Fn(&Instance) -> Value + 'static) -> Self {
        self.to_plain = Some(Rc::new(hook));
        self
    }

    /// Do not inherit the base object members
    pub fn bare(mut self) -> Self {
        self.bare = true;
        self
    }

    pub fn build(self) -> ClassRef {
        ClassRef(Rc::new(Class {
            name: self.name,
            parent: self.parent,
            members: self.members,
            init: self.init,
            to_plain: self.to_plain,
            bare: self.bare,
        }))
    }
}

/// Shared handle to a class; equality is identity
#[derive(Clone)]
pub struct ClassRef(Rc<Class>);

impl ClassRef {
    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn parent(&self) -> Option<&ClassRef> {
        self.0.parent.as_ref()
    }

    /// This class followed by its ancestors
    pub fn ancestry(&self) -> impl Iterator<Item = &ClassRef> {
        std::iter::successors(Some(self), |class| class.parent())
    }

    /// True if `self` is `other` or inherits from it
    pub fn is_subclass_of(&self, other: &ClassRef) -> bool {
        self.ancestry().any(|class| class == other)
    }

    /// True if some class in the chain opted out of the base object members
    pub fn is_bare(&self) -> bool {
        self.ancestry().any(|class| class.0.bare)
    }

    /// Look up an inherited non-data member
    pub fn member(&self, name: &str) -> Option<Value> {
        if let Some(found) = self.ancestry().find_map(|class| class.0.members.get(name)) {
            return Some(found.clone());
        }
        if self.is_bare() || !OBJECT_MEMBERS.contains(&name) {
            return None;
        }
        if name == "constructor" {
            return Some(Value::Function(Callable::named(self.name())));
        }
        Some(Value::Function(Callable::named(name)))
    }

    pub fn has_member(&self, name: &str) -> bool {
        self.member(name).is_some()
    }

    fn initializer(&self) -> Option<&Initializer> {
        self.ancestry().find_map(|class| class.0.init.as_ref())
    }

    pub(crate) fn plain_hook(&self) -> Option<&PlainHook> {
        self.ancestry().find_map(|class| class.0.to_plain.as_ref())
    }

    /// Construct a new instance from a single raw argument.
    ///
    /// The nearest initializer in the chain validates the argument; a chain
    /// without any initializer ignores it.
    pub fn construct(&self, arg: Value) -> StruxResult<Instance> {
        let instance = Instance::blank(self);
        if let Some(init) = self.initializer() {
            init(&instance, arg)?;
        }
        Ok(instance)
    }

    /// Construct from an argument list of length 0 or 1
    pub fn construct_args(&self, args: &[Value]) -> StruxResult<Instance> {
        StruxError::check_arg_count(args.len(), 0, 1)?;
        self.construct(args.first().cloned().unwrap_or_default())
    }
}

impl PartialEq for ClassRef {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for ClassRef {}

impl fmt::Debug for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Class({})", self.name())
    }
}

struct InstanceData {
    class: ClassRef,
    fields: RefCell<IndexMap<String, Value>>,
}

/// Class instance with own enumerable fields; identity semantics
#[derive(Clone)]
pub struct Instance(Rc<InstanceData>);

impl Instance {
    /// An instance with no fields and no constructor run
    pub fn blank(class: &ClassRef) -> Self {
        Instance(Rc::new(InstanceData {
            class: class.clone(),
            fields: RefCell::new(IndexMap::new()),
        }))
    }

    pub fn class(&self) -> &ClassRef {
        &self.0.class
    }

    /// Read an own field
    pub fn get(&self, name: &str) -> Option<Value> {
        self.0.fields.borrow().get(name).cloned()
    }

    /// Write an own field directly, bypassing shadow protection
    pub fn set(&self, name: impl Into<String>, value: Value) {
        self.0.fields.borrow_mut().insert(name.into(), value);
    }

    pub fn remove(&self, name: &str) -> Option<Value> {
        self.0.fields.borrow_mut().shift_remove(name)
    }

    pub fn has_own(&self, name: &str) -> bool {
        self.0.fields.borrow().contains_key(name)
    }

    /// Own field or inherited member
    pub fn has_property(&self, name: &str) -> bool {
        self.has_own(name) || self.class().has_member(name)
    }

    pub fn fields(&self) -> Ref<'_, IndexMap<String, Value>> {
        self.0.fields.borrow()
    }

    /// Copy of the own fields, safe to hold across mutation
    pub fn snapshot(&self) -> Vec<(String, Value)> {
        self.0
            .fields
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn is_exact(&self, class: &ClassRef) -> bool {
        self.class() == class
    }

    pub fn is_a(&self, class: &ClassRef) -> bool {
        self.class().is_subclass_of(class)
    }

    /// Field assignment onto this instance under the default policy
    pub fn assign(&self, source: &Value) -> StruxResult<&Self> {
        self.assign_with(&Policy::default(), source)
    }

    pub fn assign_with(&self, policy: &Policy, source: &Value) -> StruxResult<&Self> {
        assign::assign_instance(policy.missing_source, self, source)?;
        Ok(self)
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Instance {}

impl Hash for Instance {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Rc::as_ptr(&self.0).hash(state);
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct(self.class().name());
        if let Ok(fields) = self.0.fields.try_borrow() {
            for (name, value) in fields.iter() {
                out.field(name, value);
            }
        }
        out.finish()
    }
}
