//! Selection of the call sites that get wrapped by the interceptor.
//!
//! A site is eligible when its declaring type sits directly in one of the
//! included namespaces, is not an excluded component, is public, and returns
//! an asynchronous result. Namespace membership is not transitive: a nested
//! namespace has to be included on its own.

use std::collections::HashSet;

use crate::descriptor::{CallSite, ReturnShape};

pub const DEFAULT_CONTROLLER_ROOT: &str = "service::controller::v1_0";
pub const DEFAULT_RULE_ROOT: &str = "service::controller::v1_0::rule";
pub const DEFAULT_ERROR_COMPONENT: &str = "service::controller::v1_0::AppErrorController";

#[derive(Clone, Debug)]
pub struct EligibilityRule {
    roots: Vec<String>,
    excluded: HashSet<String>,
    returns: ReturnShape,
}

impl Default for EligibilityRule {
    fn default() -> Self {
        Self::builder()
            .include(DEFAULT_CONTROLLER_ROOT)
            .include(DEFAULT_RULE_ROOT)
            .exclude(DEFAULT_ERROR_COMPONENT)
            .build()
    }
}

impl EligibilityRule {
    pub fn builder() -> EligibilityRuleBuilder {
        EligibilityRuleBuilder::default()
    }

    pub fn matches(&self, site: &CallSite) -> bool {
        self.in_roots(site)
            && !self.excluded.contains(site.component())
            && site.is_public()
            && site.return_shape() == self.returns
    }

    fn in_roots(&self, site: &CallSite) -> bool {
        let ns = site.namespace();
        self.roots.iter().any(|root| root == ns)
    }
}

/// Builder for [`EligibilityRule`]. Starts empty: no roots, no exclusions.
#[derive(Default)]
pub struct EligibilityRuleBuilder {
    roots: Vec<String>,
    excluded: HashSet<String>,
}

impl EligibilityRuleBuilder {
    /// Includes types declared directly in `root`.
    pub fn include(mut self, root: impl Into<String>) -> Self {
        let root = root.into();
        if !self.roots.contains(&root) {
            self.roots.push(root);
        }
        self
    }

    /// Excludes exactly the component at `path`.
    pub fn exclude(mut self, path: impl Into<String>) -> Self {
        self.excluded.insert(path.into());
        self
    }

    pub fn build(self) -> EligibilityRule {
        EligibilityRule {
            roots: self.roots,
            excluded: self.excluded,
            returns: ReturnShape::Async,
        }
    }
}
