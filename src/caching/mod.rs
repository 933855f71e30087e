//! Cache region derivation.
//!
//! A cache region is a named partition used to group cached query results
//! for bulk invalidation. The region name is derived from the query type
//! identity plus optional per-principal and per-locale qualifiers supplied
//! by an injected scope context, never by ambient state.

use crate::errors::CacheRegionError;
use crate::request::Request;
use std::sync::Arc;

/// Supplies the principal and locale the current execution runs under.
pub trait ScopeContext: Send + Sync {
    /// The identity of the current principal, if one is active.
    fn principal_id(&self) -> Option<String> {
        None
    }

    /// The locale of the current execution, if one is active.
    fn locale(&self) -> Option<String> {
        None
    }
}

/// A fixed scope context.
///
/// Useful at composition roots with a single ambient identity, and in tests.
#[derive(Debug, Clone, Default)]
pub struct StaticScopeContext {
    /// The principal identity, if any.
    pub principal_id: Option<String>,
    /// The locale, if any.
    pub locale: Option<String>,
}

impl StaticScopeContext {
    /// Creates a context with neither principal nor locale.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Sets the principal identity.
    #[must_use]
    pub fn with_principal(mut self, principal_id: impl Into<String>) -> Self {
        self.principal_id = Some(principal_id.into());
        self
    }

    /// Sets the locale.
    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }
}

impl ScopeContext for StaticScopeContext {
    fn principal_id(&self) -> Option<String> {
        self.principal_id.clone()
    }

    fn locale(&self) -> Option<String> {
        self.locale.clone()
    }
}

/// Derives cache region names from query types.
pub struct CacheRegionNamer {
    scope: Arc<dyn ScopeContext>,
}

impl CacheRegionNamer {
    /// Creates a namer drawing principal and locale from the given scope.
    #[must_use]
    pub fn new(scope: Arc<dyn ScopeContext>) -> Self {
        Self { scope }
    }

    /// Derives the cache region for a query.
    ///
    /// The base region is the fully-qualified type name. A user-scoped query
    /// appends `-{principal}`, a locale-scoped query appends a second,
    /// independent `-{locale}`; the `-` marker is appended even when the
    /// scope value is absent, so scoped and unscoped types never collide.
    ///
    /// # Errors
    ///
    /// Returns [`CacheRegionError`] when no query is supplied.
    pub fn cache_region<Q>(&self, query: Option<&Q>) -> Result<String, CacheRegionError>
    where
        Q: Request,
    {
        let query = query.ok_or(CacheRegionError)?;
        let mut region = std::any::type_name::<Q>().to_owned();
        if query.scoped_by_user() {
            region.push('-');
            if let Some(principal) = self.scope.principal_id() {
                region.push_str(&principal);
            }
        }
        if query.scoped_by_locale() {
            region.push('-');
            if let Some(locale) = self.scope.locale() {
                region.push_str(&locale);
            }
        }
        Ok(region)
    }
}

impl Default for CacheRegionNamer {
    fn default() -> Self {
        Self::new(Arc::new(StaticScopeContext::anonymous()))
    }
}

impl std::fmt::Debug for CacheRegionNamer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheRegionNamer").finish_non_exhaustive()
    }
}
