// ============================================================
// Layer 5 — Reduce-LR-on-Plateau
// ============================================================
// Watches a metric that should go up (validation accuracy) and cuts
// the learning rate by `factor` once it has failed to improve for more
// than `patience` consecutive steps.
//
//   improvement:  metric > best · (1 + threshold)
//   reduction:    lr ← max(lr · factor, min_lr), skipped if the change
//                 would be smaller than eps

#[derive(Debug, Clone)]
pub struct ReduceLrOnPlateau {
    lr:            f64,
    factor:        f64,
    patience:      usize,
    threshold:     f64,
    cooldown:      usize,
    min_lr:        f64,
    eps:           f64,
    best:          f64,
    bad_steps:     usize,
    cooldown_left: usize,
}

impl ReduceLrOnPlateau {
    pub fn new(lr: f64, patience: usize) -> Self {
        Self {
            lr,
            factor:        0.1,
            patience,
            threshold:     1e-4,
            cooldown:      0,
            min_lr:        0.0,
            eps:           1e-8,
            best:          f64::NEG_INFINITY,
            bad_steps:     0,
            cooldown_left: 0,
        }
    }

    pub fn lr(&self) -> f64 {
        self.lr
    }

    /// Record one observation of the metric; returns the learning rate to use next.
    pub fn step(&mut self, metric: f64) -> f64 {
        if metric > self.best * (1.0 + self.threshold) {
            self.best      = metric;
            self.bad_steps = 0;
        } else {
            self.bad_steps += 1;
        }

        if self.cooldown_left > 0 {
            self.cooldown_left -= 1;
            self.bad_steps = 0;
        }

        if self.bad_steps > self.patience {
            let reduced = (self.lr * self.factor).max(self.min_lr);
            if self.lr - reduced > self.eps {
                tracing::info!("Reducing learning rate {:.3e} → {:.3e}", self.lr, reduced);
                self.lr = reduced;
            }
            self.cooldown_left = self.cooldown;
            self.bad_steps     = 0;
        }
        self.lr
    }
}
