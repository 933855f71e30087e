//! Concurrent fan-out primitive shared by the collaborator decorators.

use futures::future::join_all;
use std::future::Future;
use std::sync::Arc;

/// Invokes one call per collaborator concurrently and waits for all of them.
///
/// The four collaborator decorators (validation, permission, logging,
/// cache-invalidation) all fan out through this single primitive so their
/// concurrency semantics cannot drift apart: N collaborators each taking
/// duration D complete in roughly D, completion order is unspecified, and
/// an empty collaborator set is a no-op.
pub async fn fan_out<'a, C, F, Fut, T>(collaborators: &'a [Arc<C>], call: F) -> Vec<T>
where
    C: ?Sized + 'a,
    F: Fn(&'a C) -> Fut,
    Fut: Future<Output = T>,
{
    join_all(
        collaborators
            .iter()
            .map(|collaborator| call(collaborator.as_ref())),
    )
    .await
}
