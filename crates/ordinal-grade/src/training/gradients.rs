//! Gradient/hessian pairs handed to an external optimizer.

/// First and second derivative of the loss w.r.t. one threshold logit.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GradsTuple {
    pub grad: f32,
    pub hess: f32,
}

impl GradsTuple {
    #[inline]
    pub fn new(grad: f32, hess: f32) -> Self {
        Self { grad, hess }
    }
}
