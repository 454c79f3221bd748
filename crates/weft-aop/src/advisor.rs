//! Advisor: the bound (pointcut, advice) pair, the atomic unit registered
//! with the engine.

use std::fmt;
use std::sync::Arc;

use crate::advice::Advice;
use crate::pointcut::Pointcut;
use crate::target::MethodRef;

/// Immutable pairing of one pointcut with one advice.
#[derive(Clone)]
pub struct Advisor {
    pointcut: Pointcut,
    advice: Arc<dyn Advice>,
}

impl Advisor {
    pub fn new(pointcut: Pointcut, advice: Arc<dyn Advice>) -> Self {
        Self { pointcut, advice }
    }

    pub fn pointcut(&self) -> &Pointcut {
        &self.pointcut
    }

    pub fn advice(&self) -> &Arc<dyn Advice> {
        &self.advice
    }

    /// Whether this advisor applies to the given call site.
    pub fn applies_to(&self, method: &MethodRef) -> bool {
        self.pointcut.matches(method)
    }
}

impl fmt::Debug for Advisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Advisor")
            .field("pointcut", &self.pointcut)
            .finish_non_exhaustive()
    }
}
