//! Application services for scheme ownership.

mod binding;
mod reconciler;

pub use binding::OsBinding;
pub use reconciler::{
    ReconcileDirective, ReconcileError, ReconcileOutcome, RegistrationReconciler,
};
