//! Static call-site metadata and the per-call view built from it.

use std::fmt::Display;

/// Separator between namespace segments of a component path.
pub const PATH_SEPARATOR: &str = "::";

/// Placeholder for the parameter list in a signature's short form.
pub const PARAM_PLACEHOLDER: &str = "..";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

/// Shape of the value a call hands back to its caller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReturnShape {
    /// A future or stream resolved later.
    #[default]
    Async,
    /// A plain value produced synchronously.
    Value,
    Unit,
}

/// Static description of one instrumentable method.
///
/// Sites are written out where the handler is registered; nothing is
/// discovered at runtime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallSite {
    component: String,
    method: String,
    param_count: usize,
    visibility: Visibility,
    returns: ReturnShape,
}

impl CallSite {
    /// Public, asynchronous, parameterless method `method` on `component`.
    ///
    /// `component` is the fully-qualified path of the declaring type, e.g.
    /// `service::controller::v1_0::rule::RuleController`.
    pub fn new(component: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            method: method.into(),
            param_count: 0,
            visibility: Visibility::Public,
            returns: ReturnShape::Async,
        }
    }

    pub fn params(mut self, count: usize) -> Self {
        self.param_count = count;
        self
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn private(self) -> Self {
        self.visibility(Visibility::Private)
    }

    pub fn returns(mut self, shape: ReturnShape) -> Self {
        self.returns = shape;
        self
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    /// Namespace of the declaring type: its path without the last segment.
    pub fn namespace(&self) -> &str {
        self.component
            .rsplit_once(PATH_SEPARATOR)
            .map_or("", |(ns, _)| ns)
    }

    /// Bare name of the declaring type.
    pub fn type_name(&self) -> &str {
        self.component
            .rsplit_once(PATH_SEPARATOR)
            .map_or(self.component.as_str(), |(_, name)| name)
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn param_count(&self) -> usize {
        self.param_count
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    pub fn return_shape(&self) -> ReturnShape {
        self.returns
    }

    /// Short signature form, `Type.method(..)`.
    pub fn short_form(&self) -> String {
        format!(
            "{}.{}({})",
            self.type_name(),
            self.method,
            PARAM_PLACEHOLDER
        )
    }
}

/// Borrowed view of a single intercepted call.
///
/// `None` entries in `args` stand for absent arguments.
#[derive(Clone, Copy)]
pub struct CallDescriptor<'a> {
    pub site: &'a CallSite,
    pub target: &'a dyn Display,
    pub args: &'a [Option<&'a dyn Display>],
}

impl<'a> CallDescriptor<'a> {
    pub fn new(
        site: &'a CallSite,
        target: &'a dyn Display,
        args: &'a [Option<&'a dyn Display>],
    ) -> Self {
        Self { site, target, args }
    }
}
