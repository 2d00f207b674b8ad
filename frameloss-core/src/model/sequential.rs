use crate::error::FrameLossError;
use crate::nn::module::Module;
use crate::nn::parameter::Parameter;
use crate::tensor::Tensor;

/// Runs child modules one after another, feeding each output to the next.
///
/// Children keep the name they were added under, so parameter names read
/// like `"0.weight"`, `"2.bias"`.
#[derive(Debug, Default)]
pub struct Sequential {
    modules: Vec<(String, Box<dyn Module>)>,
}

impl Sequential {
    pub fn new() -> Self {
        Sequential { modules: Vec::new() }
    }

    pub fn add_module(&mut self, name: &str, module: Box<dyn Module>) {
        self.modules.push((name.to_string(), module));
    }

    /// Appends a module named after its position.
    pub fn push(&mut self, module: Box<dyn Module>) {
        let name = self.modules.len().to_string();
        self.add_module(&name, module);
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Keeps only the first `len` children.
    pub fn truncate(&mut self, len: usize) {
        self.modules.truncate(len);
    }
}

impl Module for Sequential {
    fn forward(&self, input: &Tensor) -> Result<Tensor, FrameLossError> {
        let mut current = input.clone();
        for (_, module) in &self.modules {
            current = module.forward(&current)?;
        }
        Ok(current)
    }

    fn parameters(&self) -> Vec<&Parameter> {
        self.modules.iter().flat_map(|(_, m)| m.parameters()).collect()
    }

    fn named_parameters(&self) -> Vec<(String, &Parameter)> {
        let mut params = Vec::new();
        for (name, module) in &self.modules {
            for (param_name, param) in module.named_parameters() {
                params.push((format!("{}.{}", name, param_name), param));
            }
        }
        params
    }

    fn children(&self) -> Vec<&dyn Module> {
        self.modules.iter().map(|(_, m)| m.as_ref()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nn::layers::{Conv2d, ReLU};
    use crate::ops::conv::Conv2dParams;

    #[test]
    fn test_sequential_chains_and_names() -> Result<(), FrameLossError> {
        let mut seq = Sequential::new();
        seq.push(Box::new(Conv2d::new(1, 2, 3, Conv2dParams::default().with_padding(1), 0)?));
        seq.push(Box::new(ReLU::new()));
        seq.push(Box::new(Conv2d::new(2, 1, 3, Conv2dParams::default().with_padding(1), 1)?));
        assert_eq!(seq.len(), 3);

        let names: Vec<String> = seq.named_parameters().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["0.weight", "0.bias", "2.weight", "2.bias"]);

        let out = seq.forward(&crate::tensor::ones(&[1, 1, 4, 4])?)?;
        assert_eq!(out.shape(), vec![1, 1, 4, 4]);

        seq.truncate(2);
        assert_eq!(seq.children().len(), 2);
        let out = seq.forward(&crate::tensor::ones(&[1, 1, 4, 4])?)?;
        assert_eq!(out.shape(), vec![1, 2, 4, 4]);
        assert!(out.get_f32_data()?.iter().all(|&v| v >= 0.0));
        Ok(())
    }
}
