//! All-or-nothing execution of state transitions

use crate::error::Result;

/// Run `op` against two pieces of state, restoring both if it fails
///
/// Operations are free to mutate as they go (optimistic transfers included);
/// a failure anywhere rolls everything back to the checkpoint.
pub(crate) fn atomically<A, B, T>(
    a: &mut A,
    b: &mut B,
    op: impl FnOnce(&mut A, &mut B) -> Result<T>,
) -> Result<T>
where
    A: Clone,
    B: Clone,
{
    let checkpoint = (a.clone(), b.clone());
    match op(a, b) {
        Ok(value) => Ok(value),
        Err(err) => {
            *a = checkpoint.0;
            *b = checkpoint.1;
            Err(err)
        }
    }
}
