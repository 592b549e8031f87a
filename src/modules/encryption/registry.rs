use lazy_static::lazy_static;

use super::scheme::Scheme;
use super::transforms::{
    Base64Transform, Md5Transform, PasswordTransform, ReverseTransform, SaltedSha256Transform,
};

lazy_static! {
    static ref BUILTIN_REGISTRY: TransformRegistry = TransformRegistry::with_builtin();
}

/// Process-wide registry holding the built-in strategies
pub fn registry() -> &'static TransformRegistry {
    &BUILTIN_REGISTRY
}

/// Lookup table from scheme to strategy
pub struct TransformRegistry {
    strategies: Vec<Box<dyn PasswordTransform>>,
}

impl TransformRegistry {
    /// Empty registry, mostly useful for tests and custom setups
    pub fn empty() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    /// Registry with the four built-in strategies
    pub fn with_builtin() -> Self {
        Self::empty()
            .with(Box::new(Base64Transform))
            .with(Box::new(Md5Transform))
            .with(Box::new(ReverseTransform))
            .with(Box::new(SaltedSha256Transform))
    }

    /// Add a strategy, replacing any strategy already bound to its scheme
    pub fn with(mut self, strategy: Box<dyn PasswordTransform>) -> Self {
        let scheme = strategy.scheme();
        self.strategies.retain(|s| s.scheme() != scheme);
        self.strategies.push(strategy);
        self
    }

    /// Resolve a textual scheme token ("1".."4" or a scheme name)
    pub fn resolve(&self, scheme_id: &str) -> Option<&dyn PasswordTransform> {
        Scheme::from_token(scheme_id).and_then(|scheme| self.get(scheme))
    }

    pub fn get(&self, scheme: Scheme) -> Option<&dyn PasswordTransform> {
        self.strategies
            .iter()
            .find(|s| s.scheme() == scheme)
            .map(|s| &**s)
    }

    /// Registered schemes in menu order
    pub fn schemes(&self) -> Vec<Scheme> {
        Scheme::ALL
            .into_iter()
            .filter(|scheme| self.get(*scheme).is_some())
            .collect()
    }
}
