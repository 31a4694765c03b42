/// Element-wise activation applied after a layer's affine transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Activation {
    Sigmoid,
    Tanh,
    ReLU,
    Identity,
}

impl Activation {
    pub fn function(&self, x: f64) -> f64 {
        match self {
            Activation::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Activation::Tanh => x.tanh(),
            Activation::ReLU => if x > 0.0 { x } else { 0.0 },
            Activation::Identity => x,
        }
    }

    /// Derivative with respect to the pre-activation input `x`.
    pub fn derivative(&self, x: f64) -> f64 {
        match self {
            Activation::Sigmoid => {
                let fx = self.function(x);
                fx * (1.0 - fx)
            }
            Activation::Tanh => {
                let t = x.tanh();
                1.0 - t * t
            }
            Activation::ReLU => if x > 0.0 { 1.0 } else { 0.0 },
            Activation::Identity => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Activation;

    #[test]
    fn sigmoid_is_centered_and_saturates() {
        assert_eq!(Activation::Sigmoid.function(0.0), 0.5);
        assert!(Activation::Sigmoid.function(40.0) <= 1.0);
        assert!(Activation::Sigmoid.function(-40.0) >= 0.0);
        assert_eq!(Activation::Sigmoid.derivative(0.0), 0.25);
    }

    #[test]
    fn derivatives_match_finite_differences() {
        let h = 1e-6;
        for act in [Activation::Sigmoid, Activation::Tanh, Activation::Identity] {
            for &x in &[-2.0, -0.3, 0.7, 1.5] {
                let numeric = (act.function(x + h) - act.function(x - h)) / (2.0 * h);
                assert!((numeric - act.derivative(x)).abs() < 1e-6, "{act:?} at {x}");
            }
        }
    }
}
