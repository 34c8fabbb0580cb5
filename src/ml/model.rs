use burn::{
    nn::{
        loss::{BinaryCrossEntropyLossConfig, CrossEntropyLossConfig},
        Linear, LinearConfig,
    },
    prelude::*,
};

use crate::domain::series::TimeGrid;
use crate::ml::discrepancy::{Discrepancy, DiscrepancyKind, MetricType};
use crate::ml::shapelet::{GeneralisedShapeletTransform, TransformSettings};

/// Offset inside `log(similarity + LOG_EPS)`
const LOG_EPS: f32 = 1e-5;

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct LinearShapeletConfig {
    pub in_channels:            usize,
    /// 1 for binary problems (a single logit), else the number of classes
    pub out_channels:           usize,
    pub num_shapelets:          usize,
    pub num_shapelet_samples:   usize,
    pub num_continuous_samples: usize,
    pub lengths_per_shapelet:   usize,
    pub max_shapelet_length:    f32,
    pub grid:                   TimeGrid,
    pub discrepancy:            DiscrepancyKind,
    /// None switches the learnt pseudometric off
    pub metric:                 Option<MetricType>,
    pub learn_lengths:          bool,
    pub lengths_at_max:         bool,
    pub log:                    bool,
}

impl LinearShapeletConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> LinearShapeletModel<B> {
        let discrepancy = Discrepancy::new(self.discrepancy, self.metric, self.in_channels, device);
        let transform   = GeneralisedShapeletTransform::new(
            self.transform_settings(),
            discrepancy,
            self.in_channels,
            device,
        );
        let linear = LinearConfig::new(transform.num_outputs(), self.out_channels).init(device);
        LinearShapeletModel { transform, linear, log: self.log }
    }

    pub fn transform_settings(&self) -> TransformSettings {
        TransformSettings {
            grid:                   self.grid,
            num_shapelets:          self.num_shapelets,
            num_shapelet_samples:   self.num_shapelet_samples,
            num_continuous_samples: self.num_continuous_samples,
            lengths_per_shapelet:   self.lengths_per_shapelet,
            max_shapelet_length:    self.max_shapelet_length,
            learn_lengths:          self.learn_lengths,
            lengths_at_max:         self.lengths_at_max,
        }
    }
}

#[derive(Module, Debug)]
pub struct LinearShapeletModel<B: Backend> {
    pub transform: GeneralisedShapeletTransform<B>,
    pub linear:    Linear<B>,
    pub log:       bool,
}

pub struct ShapeletOutput<B: Backend> {
    /// [batch, out_channels]
    pub logits:     Tensor<B, 2>,
    /// [batch, num_shapelets * lengths_per_shapelet], before any log
    pub similarity: Tensor<B, 2>,
}

impl<B: Backend> LinearShapeletModel<B> {
    /// x: [batch, length, channels]
    pub fn forward(&self, x: Tensor<B, 3>) -> ShapeletOutput<B> {
        let similarity = self.transform.forward(x);
        let features   = if self.log {
            similarity.clone().add_scalar(LOG_EPS).log()
        } else {
            similarity.clone()
        };
        let logits = self.linear.forward(features);
        ShapeletOutput { logits, similarity }
    }

    pub fn is_binary(&self) -> bool {
        self.linear.weight.dims()[1] == 1
    }

    /// Mean loss: BCE on the single logit for binary problems, else cross entropy.
    pub fn loss(&self, logits: Tensor<B, 2>, labels: Tensor<B, 1, Int>) -> Tensor<B, 1> {
        let [batch, _] = logits.dims();
        let device     = logits.device();
        if self.is_binary() {
            BinaryCrossEntropyLossConfig::new()
                .with_logits(true)
                .init(&device)
                .forward(logits.reshape([batch]), labels)
        } else {
            CrossEntropyLossConfig::new().init(&device).forward(logits, labels)
        }
    }

    /// Number of correct predictions in the batch.
    pub fn correct(&self, logits: Tensor<B, 2>, labels: Tensor<B, 1, Int>) -> usize {
        let [batch, _] = logits.dims();
        let predicted  = if self.is_binary() {
            // sigmoid(logit) > 0.5
            logits.reshape([batch]).greater_elem(0.0).int()
        } else {
            logits.argmax(1).flatten::<1>(0, 1)
        };
        let correct: i64 = predicted.equal(labels).int().sum().into_scalar().elem::<i64>();
        correct as usize
    }

    /// Human-readable summary stored in the result record.
    pub fn describe(&self) -> String {
        let settings = self.transform.settings();
        let [inputs, outputs] = self.linear.weight.dims();
        let metric = match (&self.transform.discrepancy.general, &self.transform.discrepancy.diagonal) {
            (Some(_), _) => "general",
            (_, Some(_)) => "diagonal",
            _ => "none",
        };
        format!(
            "LinearShapeletModel(\n  shapelet_transform: GeneralisedShapeletTransform(num_shapelets={}, \
             num_shapelet_samples={}, lengths_per_shapelet={}, num_continuous_samples={}, \
             max_shapelet_length={}, learn_lengths={}, discrepancy={}, pseudometric={})\n  \
             log: {}\n  linear: Linear(in_features={}, out_features={})\n)",
            settings.num_shapelets,
            settings.num_shapelet_samples,
            settings.lengths_per_shapelet,
            settings.num_continuous_samples,
            settings.max_shapelet_length,
            settings.learn_lengths,
            self.transform.discrepancy.kind(),
            metric,
            self.log,
            inputs,
            outputs,
        )
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type B = NdArray;

    fn config(out_channels: usize) -> LinearShapeletConfig {
        LinearShapeletConfig {
            in_channels:            2,
            out_channels,
            num_shapelets:          4,
            num_shapelet_samples:   3,
            num_continuous_samples: 6,
            lengths_per_shapelet:   2,
            max_shapelet_length:    3.0,
            grid:                   TimeGrid::unit(6),
            discrepancy:            DiscrepancyKind::L2,
            metric:                 Some(MetricType::General),
            learn_lengths:          true,
            lengths_at_max:         false,
            log:                    true,
        }
    }

    #[test]
    fn test_forward_shapes() {
        let device = Default::default();
        let model  = config(3).init::<B>(&device);
        let out    = model.forward(Tensor::random([5, 6, 2], burn::tensor::Distribution::Default, &device));
        assert_eq!(out.logits.dims(), [5, 3]);
        assert_eq!(out.similarity.dims(), [5, 8]);
    }

    #[test]
    fn test_binary_accuracy_uses_sign_of_logit() {
        let device = Default::default();
        let model  = config(1).init::<B>(&device);
        assert!(model.is_binary());
        let logits = Tensor::<B, 1>::from_floats([2.0, -1.0, 0.5], &device).reshape([3, 1]);
        let labels = Tensor::<B, 1, Int>::from_ints([1, 0, 0], &device);
        assert_eq!(model.correct(logits.clone(), labels.clone()), 2);
        let loss: f32 = model.loss(logits, labels).into_scalar();
        assert!(loss.is_finite() && loss > 0.0);
    }

    #[test]
    fn test_multiclass_accuracy_uses_argmax() {
        let device = Default::default();
        let model  = config(3).init::<B>(&device);
        let logits = Tensor::<B, 1>::from_floats([0.0, 5.0, 1.0, 3.0, 0.0, 0.0], &device).reshape([2, 3]);
        let labels = Tensor::<B, 1, Int>::from_ints([1, 2], &device);
        assert_eq!(model.correct(logits, labels), 1);
    }

    #[test]
    fn test_describe_mentions_discrepancy() {
        let model = config(3).init::<B>(&Default::default());
        let text  = model.describe();
        assert!(text.contains("discrepancy=L2"));
        assert!(text.contains("pseudometric=general"));
        assert!(text.contains("in_features=8"));
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let json = serde_json::to_string(&config(1)).unwrap();
        let back: LinearShapeletConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.discrepancy, DiscrepancyKind::L2);
        assert_eq!(back.grid, TimeGrid::unit(6));
    }
}
