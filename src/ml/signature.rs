// ============================================================
// Layer 5 — Truncated (Log-)Signatures
// ============================================================
// The signature of a path is the sequence of its iterated integrals;
// its logarithm packs the same information more compactly. The logsig
// discrepancy compares windows and shapelets through these features.
//
// Paths here are piecewise linear through their sample points, so:
//
//   signature of one segment with increment d:
//       exp(d) = (1, d, d⊗d/2!, d⊗d⊗d/3!, ...)
//
//   Chen's identity joins segments:
//       S(a·b)_k = Σ_{i+j=k} S(a)_i ⊗ S(b)_j
//
//   and the truncated tensor logarithm of S = 1 + X is
//       log S = Σ_{n=1..N} (-1)^{n+1} / n · X^{⊗n}
//
// Levels are kept as separate [batch, C^k] tensors and concatenated
// at the end, i.e. features are in expanded tensor coordinates
// (Σ_k C^k of them) rather than a Lyndon basis.

use burn::prelude::*;

/// Number of features `logsignature` produces for `channels` and `depth`.
pub fn logsignature_dim(channels: usize, depth: usize) -> usize {
    (1..=depth as u32).map(|k| channels.pow(k)).sum()
}

/// Outer product of two batched vectors: `[N, p] ⊗ [N, q] → [N, p * q]`.
fn outer<B: Backend>(a: Tensor<B, 2>, b: Tensor<B, 2>) -> Tensor<B, 2> {
    let [n, p] = a.dims();
    let [_, q] = b.dims();
    (a.reshape([n, p, 1]) * b.reshape([n, 1, q])).reshape([n, p * q])
}

/// Truncated product of two group-like elements without their level 0,
/// i.e. `(a ⊗ b)_k = Σ_{i+j=k, i,j≥1} a_i ⊗ b_j` for `k = 1..depth`.
fn mul_truncated<B: Backend>(a: &[Tensor<B, 2>], b: &[Tensor<B, 2>]) -> Vec<Tensor<B, 2>> {
    let depth    = a.len();
    let [n, c]   = a[0].dims();
    let device   = a[0].device();
    (1..=depth)
        .map(|k| {
            let mut level = Tensor::zeros([n, c.pow(k as u32)], &device);
            for i in 1..k {
                level = level + outer(a[i - 1].clone(), b[k - i - 1].clone());
            }
            level
        })
        .collect()
}

/// Levels 1..=depth of `exp(d)` for a batch of increments `d: [N, C]`.
fn segment_exp<B: Backend>(d: Tensor<B, 2>, depth: usize) -> Vec<Tensor<B, 2>> {
    let mut levels = Vec::with_capacity(depth);
    levels.push(d.clone());
    for k in 2..=depth {
        let next = outer(levels[k - 2].clone(), d.clone()).div_scalar(k as f32);
        levels.push(next);
    }
    levels
}

/// Truncated signature (levels 1..=depth) of piecewise-linear paths.
///
/// `path`: [N, M, C] — N paths of M points in C channels.
/// Returns `depth` tensors, level k of shape [N, C^k].
pub fn signature<B: Backend>(path: Tensor<B, 3>, depth: usize) -> Vec<Tensor<B, 2>> {
    let [n, m, c] = path.dims();
    let device    = path.device();

    if m < 2 {
        return (1..=depth as u32)
            .map(|k| Tensor::zeros([n, c.pow(k)], &device))
            .collect();
    }

    let increment = |i: usize| {
        (path.clone().slice([0..n, i + 1..i + 2, 0..c]) - path.clone().slice([0..n, i..i + 1, 0..c]))
            .reshape([n, c])
    };

    let mut sig = segment_exp(increment(0), depth);
    for i in 1..m - 1 {
        let seg = segment_exp(increment(i), depth);
        // Chen: S ⊗ exp(d), keeping the implicit level-0 ones
        let cross = mul_truncated(&sig, &seg);
        sig = sig
            .into_iter()
            .zip(seg)
            .zip(cross)
            .map(|((s, e), x)| s + e + x)
            .collect();
    }
    sig
}

/// Truncated tensor logarithm of a signature given by its levels 1..=depth.
pub fn log_of_signature<B: Backend>(sig: &[Tensor<B, 2>]) -> Vec<Tensor<B, 2>> {
    let depth     = sig.len();
    let mut power = sig.to_vec();
    let mut log   = sig.to_vec();
    for n in 2..=depth {
        power = mul_truncated(&power, sig);
        let coef = if n % 2 == 0 { -1.0 / n as f32 } else { 1.0 / n as f32 };
        log = log
            .into_iter()
            .zip(power.iter())
            .map(|(l, p)| l + p.clone().mul_scalar(coef))
            .collect();
    }
    log
}

/// Log-signature features of piecewise-linear paths.
///
/// `path`: [N, M, C] → [N, Σ_{k=1..depth} C^k]
pub fn logsignature<B: Backend>(path: Tensor<B, 3>, depth: usize) -> Tensor<B, 2> {
    let sig = signature(path, depth);
    Tensor::cat(log_of_signature(&sig), 1)
}
