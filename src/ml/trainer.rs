// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Adam over every batch of the training set, with three extras:
//
//   - every EVAL_EVERY epochs (and at the last one) train and val are
//     evaluated and the learning rate is reduced when val accuracy
//     plateaus
//   - training stops once the train loss has not improved for
//     `plateau_terminate` epochs
//   - the model with the best val accuracy is returned, not the last
//
// Training runs on the Autodiff backend; evaluation uses model.valid()
// on the inner backend so no graph is recorded.
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use std::sync::Arc;

use anyhow::Result;
use burn::{
    data::dataloader::{DataLoader, DataLoaderBuilder},
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::data::{batcher::{SeriesBatch, SeriesBatcher}, dataset::SeriesDataset};
use crate::domain::record::{EvalMetrics, HistoryEntry};
use crate::ml::model::LinearShapeletModel;
use crate::ml::scheduler::ReduceLrOnPlateau;
use crate::ml::shapelet::GeneralisedShapeletTransform;

const EVAL_EVERY:             usize = 10;
const SIMILARITY_COEFFICIENT: f32   = 1e-4;
/// Relative margin a train loss must beat the best by to count as progress
const LOSS_IMPROVEMENT:       f64   = 1.0001;

#[derive(Debug, Clone)]
pub struct TrainSettings {
    pub epochs:                    usize,
    pub lr:                        f64,
    pub plateau_patience:          usize,
    pub plateau_terminate:         usize,
    pub similarity_regularisation: bool,
    pub batch_size:                usize,
    pub shuffle_seed:              u64,
}

impl TrainSettings {
    /// Plateau patience counted in evaluations rather than epochs.
    pub fn scheduler_patience(&self) -> usize {
        self.plateau_patience.div_ceil(EVAL_EVERY).max(1)
    }
}

pub struct TrainOutcome<B: AutodiffBackend> {
    pub model:   LinearShapeletModel<B>,
    pub history: Vec<HistoryEntry>,
}

pub fn train<B: AutodiffBackend>(
    mut model: LinearShapeletModel<B>,
    train_set: SeriesDataset,
    val_set:   SeriesDataset,
    settings:  &TrainSettings,
    device:    &B::Device,
) -> Result<TrainOutcome<B>> {
    let (length, channels) = (train_set.series_length(), train_set.channels());

    // ── Adam optimiser ────────────────────────────────────────────────────────
    let mut optim     = AdamConfig::new().init();
    let mut scheduler = ReduceLrOnPlateau::new(settings.lr, settings.scheduler_patience());

    // ── Data loaders ──────────────────────────────────────────────────────────
    let train_loader = DataLoaderBuilder::new(SeriesBatcher::<B>::new(device.clone(), length, channels))
        .batch_size(settings.batch_size)
        .shuffle(settings.shuffle_seed)
        .num_workers(1)
        .build(train_set.clone());
    let train_eval = eval_loader::<B::InnerBackend>(train_set, settings.batch_size, device);
    let val_eval   = eval_loader::<B::InnerBackend>(val_set, settings.batch_size, device);

    let mut best_model: Option<LinearShapeletModel<B>> = None;
    let mut best_train_loss   = f64::INFINITY;
    let mut best_val_accuracy = 0.0;
    let mut best_epoch        = 0;
    let mut history           = Vec::new();

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 0..settings.epochs {
        for batch in train_loader.iter() {
            let output   = model.forward(batch.series);
            let mut loss = model.loss(output.logits, batch.labels);
            if settings.similarity_regularisation {
                let reg = GeneralisedShapeletTransform::similarity_regularisation(output.similarity);
                loss = loss + reg.mul_scalar(SIMILARITY_COEFFICIENT);
            }

            let grads = GradientsParams::from_grads(loss.backward(), &model);
            model = optim.step(scheduler.lr(), model, grads);
            model.transform.clip_lengths();
        }

        if epoch % EVAL_EVERY != 0 && epoch + 1 != settings.epochs {
            continue;
        }

        let model_valid = model.valid();
        let train_metrics = evaluate_metrics(&model_valid, &train_eval);
        let val_metrics   = evaluate_metrics(&model_valid, &val_eval);

        if train_metrics.loss * LOSS_IMPROVEMENT < best_train_loss {
            best_train_loss = train_metrics.loss;
            best_epoch      = epoch;
        }

        let entry = HistoryEntry::new(epoch, train_metrics, val_metrics);
        if entry.is_improvement(best_val_accuracy) {
            best_val_accuracy = entry.val_accuracy;
            best_model        = Some(model.clone());
        }

        println!(
            "Epoch: {}  Train loss: {:.3}  Train accuracy: {:.3}  Val loss: {:.3}  Val accuracy: {:.3}",
            epoch, entry.train_loss, entry.train_accuracy, entry.val_loss, entry.val_accuracy,
        );
        scheduler.step(val_metrics.accuracy);
        history.push(entry);

        if epoch > best_epoch + settings.plateau_terminate {
            tracing::info!(
                "Breaking because of no improvement in training loss for {} epochs.",
                settings.plateau_terminate
            );
            break;
        }
    }

    let model = best_model.unwrap_or(model);
    tracing::debug!("Shapelet lengths after training: {:?}", model.transform.length_values());
    Ok(TrainOutcome { model, history })
}

/// Deterministic, unshuffled loader used for evaluation.
pub fn eval_loader<B: Backend>(
    dataset:    SeriesDataset,
    batch_size: usize,
    device:     &B::Device,
) -> Arc<dyn DataLoader<SeriesBatch<B>>> {
    let batcher = SeriesBatcher::<B>::new(device.clone(), dataset.series_length(), dataset.channels());
    DataLoaderBuilder::new(batcher)
        .batch_size(batch_size)
        .num_workers(1)
        .build(dataset)
}

/// Loss and accuracy over a whole loader, weighted by batch size.
pub fn evaluate_metrics<B: Backend>(
    model:  &LinearShapeletModel<B>,
    loader: &Arc<dyn DataLoader<SeriesBatch<B>>>,
) -> EvalMetrics {
    let mut loss_sum = 0.0f64;
    let mut correct  = 0usize;
    let mut total    = 0usize;

    for batch in loader.iter() {
        let batch_size = batch.labels.dims()[0];
        let output     = model.forward(batch.series);
        let loss: f64  = model
            .loss(output.logits.clone(), batch.labels.clone())
            .into_scalar()
            .elem::<f64>();

        loss_sum += loss * batch_size as f64;
        correct  += model.correct(output.logits, batch.labels);
        total    += batch_size;
    }

    if total == 0 {
        return EvalMetrics { loss: f64::NAN, accuracy: 0.0 };
    }
    EvalMetrics {
        loss:     loss_sum / total as f64,
        accuracy: correct as f64 / total as f64,
    }
}
