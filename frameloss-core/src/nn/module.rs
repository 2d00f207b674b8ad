use crate::error::FrameLossError;
use crate::nn::Parameter;
use crate::tensor::Tensor;

/// The base trait for all neural network modules (layers, containers, etc.).
///
/// `forward` records the autograd graph as a side effect of the ops it runs,
/// so parameters with `requires_grad` receive gradients on `backward()`.
pub trait Module: std::fmt::Debug + Send + Sync {
    /// Performs a forward pass of the module.
    fn forward(&self, input: &Tensor) -> Result<Tensor, FrameLossError>;

    /// Returns all parameters of the module, including those of sub-modules.
    fn parameters(&self) -> Vec<&Parameter> {
        Vec::new()
    }

    /// Returns all parameters with hierarchical names (e.g. `"2.weight"`).
    fn named_parameters(&self) -> Vec<(String, &Parameter)> {
        Vec::new()
    }

    /// Returns the direct child modules.
    fn children(&self) -> Vec<&dyn Module> {
        Vec::new()
    }

    /// Clears `requires_grad` on every parameter: later forward passes do not
    /// record them and `backward()` leaves their `grad` empty.
    fn freeze(&self) {
        for param in self.parameters() {
            param.set_requires_grad(false);
        }
    }

    /// True when no parameter requires a gradient.
    fn is_frozen(&self) -> bool {
        self.parameters().iter().all(|p| !p.requires_grad())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tensor::zeros;

    #[derive(Debug)]
    struct MockModule {
        param: Parameter,
    }

    impl Module for MockModule {
        fn forward(&self, input: &Tensor) -> Result<Tensor, FrameLossError> {
            Ok(input.clone())
        }

        fn parameters(&self) -> Vec<&Parameter> {
            vec![&self.param]
        }

        fn named_parameters(&self) -> Vec<(String, &Parameter)> {
            let name = self.param.name().unwrap_or("param").to_string();
            vec![(name, &self.param)]
        }
    }

    #[test]
    fn test_freeze_clears_requires_grad() -> Result<(), FrameLossError> {
        let module = MockModule {
            param: Parameter::new_unnamed(zeros(&[2])?),
        };
        assert!(module.parameters()[0].requires_grad(), "Parameters start trainable");
        assert!(!module.is_frozen());

        module.freeze();
        assert!(module.is_frozen());
        assert!(!module.parameters()[0].requires_grad());
        Ok(())
    }

    #[test]
    fn test_named_parameters_default_name() -> Result<(), FrameLossError> {
        let module = MockModule {
            param: Parameter::new_unnamed(zeros(&[1])?),
        };
        let named = module.named_parameters();
        assert_eq!(named.len(), 1);
        assert_eq!(named[0].0, "param");
        assert!(module.children().is_empty());
        Ok(())
    }
}
