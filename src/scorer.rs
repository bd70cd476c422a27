//! Information-theoretic scoring functions (component C2).
//!
//! Every scorer is driven by the same five-callback protocol a
//! [`crate::partition::Partition`] intersection emits: `begin_pair` (or
//! `begin` for scoring a single partition without intersecting),
//! `subbegin`/`update`/`subend` once per outer part, then `end`. This lets
//! scoring happen in the same pass as refinement, without ever building a
//! contingency table.
//!
//! Each scorer that supports pruning also produces an upper bound on the
//! score achievable by any further refinement of the current subset; the
//! miner (`C5`) uses that bound against the top-K queue's current worst
//! score to prune subtrees.

use crate::partition::Partition;

pub(crate) fn xlogx(c: f64) -> f64 {
    if c > 0.0 { c * c.log2() } else { 0.0 }
}

/// The callback protocol driven by partition scoring / intersection.
pub trait Scorer {
    /// Scoring a single partition directly (no intersection).
    fn begin(&mut self, _n_parts: usize) {}
    /// Scoring the intersection of two partitions with `n_x`/`n_y` parts.
    fn begin_pair(&mut self, n_x: usize, n_y: usize) {
        let _ = (n_x, n_y);
    }
    fn subbegin(&mut self) {}
    fn update(&mut self, count: f64);
    fn subend(&mut self) {}
    fn end(&mut self) {}
}

/// Does nothing; used when a caller only wants the refined `Partition` and
/// has no interest in a score.
pub struct NoScore;

impl Scorer for NoScore {
    fn update(&mut self, _count: f64) {}
}

/// Plain Shannon entropy of a partition's part-size distribution, in bits.
#[derive(Default, Clone, Copy)]
pub struct Entropy {
    h: f64,
    n: f64,
}

impl Entropy {
    pub fn value(&self) -> f64 {
        self.h
    }
}

impl Scorer for Entropy {
    fn begin(&mut self, _n_parts: usize) {
        self.h = 0.0;
        self.n = 0.0;
    }
    fn begin_pair(&mut self, n_x: usize, n_y: usize) {
        self.begin(n_x.saturating_mul(n_y));
    }
    fn update(&mut self, count: f64) {
        self.h += xlogx(count);
        self.n += count;
    }
    fn end(&mut self) {
        self.h = if self.n > 0.0 { self.n.log2() - self.h / self.n } else { 0.0 };
        self.h = crate::utils::clamp_nonnegative(self.h);
    }
}

/// Additively-smoothed entropy accumulator (Laplace-style pseudo-counts of
/// `alpha` per part), used as a building block by the smoothed-MI family.
#[derive(Clone, Copy)]
struct SmoothedEntropyAcc {
    alpha: f64,
    counts: f64,
    sumxlogx: f64,
    n_parts: f64,
    n_nonempty: f64,
}

impl SmoothedEntropyAcc {
    fn new(alpha: f64, n_parts: f64) -> Self {
        Self { alpha, counts: 0.0, sumxlogx: 0.0, n_parts, n_nonempty: 0.0 }
    }

    fn add(&mut self, count: f64) {
        self.counts += count;
        self.n_nonempty += 1.0;
        self.sumxlogx += xlogx(count + self.alpha);
    }

    fn settled_sumxlogx(&mut self) -> f64 {
        let n_empty = self.n_parts - self.n_nonempty;
        if n_empty > 0.0 {
            self.sumxlogx += n_empty * xlogx(self.alpha);
            self.n_nonempty = self.n_parts;
        }
        self.sumxlogx
    }

    fn pseudo_counts(&self) -> f64 {
        self.counts + self.n_parts * self.alpha
    }

    fn value(&mut self) -> f64 {
        let sumxlogx = self.settled_sumxlogx();
        let counts = self.pseudo_counts();
        crate::utils::clamp_nonnegative(counts.log2() - sumxlogx / counts)
    }
}

/// Smoothed entropy of a single partition, `H_alpha(X)`.
pub struct SmoothedEntropy {
    alpha: f64,
    acc: Option<SmoothedEntropyAcc>,
}

impl SmoothedEntropy {
    pub fn new(alpha: f64) -> Self {
        Self { alpha, acc: None }
    }
}

impl Scorer for SmoothedEntropy {
    fn begin(&mut self, n_parts: usize) {
        self.acc = Some(SmoothedEntropyAcc::new(self.alpha, n_parts as f64));
    }
    fn begin_pair(&mut self, n_x: usize, n_y: usize) {
        self.begin(n_x.saturating_mul(n_y));
    }
    fn update(&mut self, count: f64) {
        self.acc.as_mut().expect("begin must precede update").add(count);
    }
    fn end(&mut self) {}
}

impl SmoothedEntropy {
    pub fn value(&mut self) -> f64 {
        self.acc.as_mut().expect("begin must precede value").value()
    }
}

/// Trait for scorers that depend on a designated target partition, selected
/// once by the CLI / caller before mining begins.
pub trait TargetScorer: Scorer {
    fn set_target(&mut self, target: &Partition);
    /// Final `(score, bound)` pair after a completed intersection pass.
    fn result(&self) -> (f64, f64);
}

/// Smoothed mutual information `I_alpha(X;Y)` with a dual Newton-Raphson
/// tightened upper bound.
///
/// `use_bound1`/`use_bound2` mirror the reference engine's compile-time
/// toggles; when both are enabled the tighter (smaller) of the two bounds is
/// kept, matching the "min of two envelopes" behavior the original reports
/// via a best-bound counter.
pub struct SmoothedMutualInformation {
    alpha: f64,
    aloga: f64,
    n_y: usize,
    n_x: usize,
    ny_counts: Vec<f64>,
    h_x_smoothed: SmoothedEntropyAcc,
    h_yx: SmoothedEntropyAcc,
    h_ygx_counts: f64,
    h_ygx_sumxlogx: f64,
    h_ygx_sumxylogxy: f64,
    n: f64,
    ixy: f64,
    bound: f64,
    use_bound1: bool,
    use_bound2: bool,
}

impl SmoothedMutualInformation {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            aloga: xlogx(alpha),
            n_y: 0,
            n_x: 0,
            ny_counts: Vec::new(),
            h_x_smoothed: SmoothedEntropyAcc::new(alpha, 0.0),
            h_yx: SmoothedEntropyAcc::new(alpha, 0.0),
            h_ygx_counts: 0.0,
            h_ygx_sumxlogx: 0.0,
            h_ygx_sumxylogxy: 0.0,
            n: 0.0,
            ixy: 0.0,
            bound: 0.0,
            use_bound1: true,
            use_bound2: true,
        }
    }

    fn newton_raphson(&self, min_nz: f64, max_nz: f64, f: impl Fn(f64) -> (f64, f64)) -> f64 {
        const EPS: f64 = 0.1;
        let mut nz = min_nz;
        loop {
            let (val, deriv) = f(nz);
            let mut dnz = -val / deriv;
            if nz + dnz < min_nz {
                dnz = min_nz - nz;
            } else if nz + dnz > max_nz {
                dnz = max_nz - nz;
            }
            if val * dnz <= 0.0 {
                break;
            }
            nz += dnz;
            if dnz.abs() <= EPS {
                break;
            }
        }
        nz
    }

    fn smoothed_entropy_of_y(&self, alpha: f64) -> f64 {
        let mut h = SmoothedEntropyAcc::new(alpha, self.n_y as f64);
        for &ny in &self.ny_counts {
            h.add(ny);
        }
        h.value()
    }

    fn bound1_derivative(&self, nz: f64, c0: f64) -> (f64, f64) {
        let (mut s1, mut s2) = (0.0, 0.0);
        for &ny in &self.ny_counts {
            let c1 = ny + nz * self.alpha;
            let c2 = ny - self.n / self.n_y as f64;
            s1 += c2 * c1.log2();
            s2 += c2 / c1;
        }
        let f = (s1 - self.n * (self.n_y as f64).log2()) - c0;
        let fprime = self.alpha * s2 / std::f64::consts::LN_2;
        (f, fprime)
    }

    fn bound1(&mut self, h_xa_sumxlogx: f64) -> f64 {
        let c0 = self.n_x as f64 * self.alpha * xlogx(self.n_y as f64)
            + self.n_x as f64 * (self.n_y as f64 - 1.0) * self.aloga
            + (h_xa_sumxlogx - self.h_ygx_sumxlogx);
        let nz = self.newton_raphson(self.n_x as f64, (self.n_x * self.n_y) as f64, |nz| self.bound1_derivative(nz, c0));
        let s: f64 = self.ny_counts.iter().map(|&ny| xlogx(ny + nz * self.alpha)).sum();
        let n = self.h_ygx_counts;
        let c = n + nz * self.n_y as f64 * self.alpha;
        c.log2() + (c0 - s - nz * self.n_y as f64 * self.alpha * (self.n_y as f64).log2()) / c
    }

    fn bound2_derivative(&self, nz: f64, c0: f64) -> (f64, f64) {
        let (mut s1, mut s2) = (0.0, 0.0);
        for &ny in &self.ny_counts {
            let c1 = ny + nz * self.alpha;
            let c2 = ny - self.n / self.n_y as f64;
            s1 += c2 * c1.log2();
            s2 += c2 / c1;
        }
        let c = self.n + nz * self.n_y as f64 * self.alpha;
        let f = s1 - c0 + (self.n + (self.n_x * self.n_y) as f64) * self.aloga
            + self.n * c / (nz * self.n_y as f64 * self.alpha) / std::f64::consts::LN_2;
        let fprime = self.alpha * s2 - self.n * self.n / (nz * nz * self.n_y as f64 * self.alpha) / std::f64::consts::LN_2;
        (f, fprime)
    }

    fn bound2(&mut self) -> f64 {
        let c0 = self.h_ygx_sumxylogxy;
        let nz = self.newton_raphson(self.n_x as f64, (self.n_x * self.n_y) as f64, |nz| self.bound2_derivative(nz, c0));
        let s: f64 = self.ny_counts.iter().map(|&ny| xlogx(ny + nz * self.alpha)).sum();
        nz.log2() + (c0 - s + (nz - self.n_x as f64) * self.n_y as f64 * self.aloga) / (self.n + nz * self.n_y as f64 * self.alpha)
    }
}

impl Scorer for SmoothedMutualInformation {
    fn begin_pair(&mut self, n_x: usize, _n_y: usize) {
        self.n_x = n_x;
        self.h_x_smoothed = SmoothedEntropyAcc::new(self.alpha, n_x as f64);
        self.h_ygx_counts = 0.0;
        self.h_ygx_sumxlogx = 0.0;
        self.h_ygx_sumxylogxy = 0.0;
    }

    fn subbegin(&mut self) {
        self.h_yx = SmoothedEntropyAcc::new(self.alpha, self.n_y as f64);
    }

    fn update(&mut self, count: f64) {
        self.h_yx.add(count);
    }

    fn subend(&mut self) {
        let counts = self.h_yx.counts;
        self.h_x_smoothed.add(counts);
        self.h_ygx_counts += counts;
        self.h_ygx_sumxlogx += xlogx(counts + self.n_y as f64 * self.alpha);
        self.h_ygx_sumxylogxy += self.h_yx.settled_sumxlogx();
    }

    fn end(&mut self) {
        self.n = self.h_ygx_counts;
        let h_y = self.smoothed_entropy_of_y(self.alpha * self.n_x as f64);
        let h_ygx = (self.h_ygx_sumxlogx - self.h_ygx_sumxylogxy) / (self.n + (self.n_x * self.n_y) as f64 * self.alpha);
        self.ixy = h_y - h_ygx;

        let h_xa_sumxlogx = self.h_x_smoothed.settled_sumxlogx();
        self.bound = match (self.use_bound1, self.use_bound2) {
            (true, true) => self.bound1(h_xa_sumxlogx).min(self.bound2()),
            (true, false) => self.bound1(h_xa_sumxlogx),
            (false, true) => self.bound2(),
            (false, false) => {
                let s = self.h_ygx_sumxlogx - h_xa_sumxlogx;
                (self.n_y as f64).log2()
                    - (s - self.n_x as f64 * (self.n_y as f64 - 1.0) * self.aloga) / (self.n + (self.n_x * self.n_y) as f64 * self.alpha)
            }
        };
    }
}

impl TargetScorer for SmoothedMutualInformation {
    fn set_target(&mut self, target: &Partition) {
        self.n_y = target.n_parts();
        self.ny_counts = target.part_sizes();
    }

    fn result(&self) -> (f64, f64) {
        (crate::utils::clamp_nonnegative(self.ixy), crate::utils::clamp_nonnegative(self.bound))
    }
}

/// Reliable Fraction of Information: normalized mutual information minus an
/// incremental hypergeometric bias correction, with a matching bias-corrected
/// upper bound.
pub struct ReliableFractionOfInformation {
    h_y: f64,
    n: u64,
    ny_counts: Vec<f64>,
    n_x: usize,
    n_y: usize,
    h_x_sumxlogx: f64,
    h_xy_sumxlogx: f64,
    bias: f64,
    bound_bias: f64,
    nx_current: f64,
    rfi: f64,
    bound: f64,
}

impl Default for ReliableFractionOfInformation {
    fn default() -> Self {
        Self {
            h_y: 0.0,
            n: 0,
            ny_counts: Vec::new(),
            n_x: 0,
            n_y: 0,
            h_x_sumxlogx: 0.0,
            h_xy_sumxlogx: 0.0,
            bias: 0.0,
            bound_bias: 0.0,
            nx_current: 0.0,
            rfi: 0.0,
            bound: 0.0,
        }
    }
}

impl ReliableFractionOfInformation {
    /// `log2 Pr[overlap = k]` for a hypergeometric draw of `a` vs `b` out of
    /// `n`, computed by an incremental product in log-space to avoid
    /// overflow for large counts.
    fn hypergeometric_log_prob(k: u64, mut a: u64, mut b: u64, n: u64) -> f64 {
        if a > n || b > n || k + n < a + b || k > a || k > b {
            return f64::NEG_INFINITY;
        }
        if a < b {
            std::mem::swap(&mut a, &mut b);
        }
        let mut res = 0.0;
        let (mut p1, mut p2, mut p3, mut p4, mut p5) = (a, b, n, k, n - a);
        for _ in 0..k {
            res += ((p1 as f64 / p3 as f64) * (p2 as f64 / p4 as f64)).log2();
            p1 -= 1;
            p2 -= 1;
            p3 -= 1;
            p4 -= 1;
        }
        for _ in 0..(b - k) {
            res += (p5 as f64 / p3 as f64).log2();
            p3 -= 1;
            p5 -= 1;
        }
        res
    }

    fn update_bias(&self, bias: &mut f64, ai: f64, bj: f64) {
        let n = self.n;
        let (ai, bj) = (ai.round() as u64, bj.round() as u64);
        let m = if ai + bj <= n + 1 { 1 } else { ai + bj - n };
        let big_m = ai.min(bj);
        let mut logh = Self::hypergeometric_log_prob(m, ai, bj, n);
        let mut total = 0.0;
        if m <= big_m {
            let mut k = m;
            while k <= big_m {
                let h = logh.exp2();
                total += h * k as f64 * (k as f64).log2();
                if k < big_m {
                    let c = (ai - k) as f64 / (k + 1) as f64 * (bj as f64 - k as f64) / (n as f64 - ai as f64 - bj as f64 + k as f64 + 1.0);
                    if c != 0.0 {
                        logh += c.log2();
                    }
                }
                k += 1;
            }
        }
        // The closed-form correction below applies unconditionally, even
        // when the hypergeometric support above is empty.
        let p = ai as f64 / n as f64 * bj as f64 / n as f64;
        total -= xlogx(p * n as f64);
        *bias += total / n as f64;
    }
}

impl Scorer for ReliableFractionOfInformation {
    fn begin_pair(&mut self, n_x: usize, n_y: usize) {
        self.n_x = n_x;
        self.n_y = n_y;
        self.h_x_sumxlogx = 0.0;
        self.h_xy_sumxlogx = 0.0;
        self.bias = 0.0;
        self.bound_bias = 0.0;
    }

    fn subbegin(&mut self) {
        self.nx_current = 0.0;
    }

    fn update(&mut self, count: f64) {
        self.h_xy_sumxlogx += xlogx(count);
        self.nx_current += count;
        for &ny in &self.ny_counts {
            self.update_bias(&mut self.bound_bias, count, ny);
        }
    }

    fn subend(&mut self) {
        self.h_x_sumxlogx += xlogx(self.nx_current);
        let nx = self.nx_current;
        for &ny in &self.ny_counts {
            self.update_bias(&mut self.bias, nx, ny);
        }
    }

    fn end(&mut self) {
        let logn = (self.n as f64).log2();
        let n = self.n as f64;
        let h_x = logn - self.h_x_sumxlogx / n;
        let h_xy = logn - self.h_xy_sumxlogx / n;
        self.bias /= self.h_y;
        self.bound_bias /= self.h_y;
        self.rfi = (self.h_y + h_x - h_xy) / self.h_y - self.bias;
        self.bound = 1.0 - self.bound_bias;
    }
}

impl TargetScorer for ReliableFractionOfInformation {
    fn set_target(&mut self, target: &Partition) {
        self.h_y = target.entropy();
        self.n = target.size() as u64;
        self.ny_counts = target.part_sizes();
    }

    fn result(&self) -> (f64, f64) {
        (crate::utils::clamp_nonnegative(self.rfi), crate::utils::clamp_nonnegative(self.bound))
    }
}

/// Mutual information bias-corrected by a chi-squared critical value scaled
/// with the number of attributes combined so far (degrees of freedom grows
/// multiplicatively with each extension).
///
/// See Vinh et al., "Reconsidering Mutual Information Based Feature
/// Selection: A Statistical Significance View".
pub struct AdjustedDependency {
    alpha: f64,
    dof: u64,
    h_y: f64,
    n: u64,
    h_x_sumxlogx: f64,
    h_xy_sumxlogx: f64,
    nx_current: f64,
    value: f64,
    bound: f64,
}

impl AdjustedDependency {
    pub fn new(alpha: f64) -> Self {
        Self { alpha, dof: 0, h_y: 0.0, n: 0, h_x_sumxlogx: 0.0, h_xy_sumxlogx: 0.0, nx_current: 0.0, value: 0.0, bound: 0.0 }
    }

    /// Scale the base degrees of freedom (|Y|-1) by `(n_x - 1)` the way the
    /// reference engine grows it for each attribute folded into the subset.
    pub fn scale_degrees_of_freedom(&mut self, n_x: usize) {
        if n_x > 1 {
            self.dof *= (n_x - 1) as u64;
        }
    }
}

impl Scorer for AdjustedDependency {
    fn begin_pair(&mut self, _n_x: usize, _n_y: usize) {
        self.h_x_sumxlogx = 0.0;
        self.h_xy_sumxlogx = 0.0;
    }

    fn subbegin(&mut self) {
        self.nx_current = 0.0;
    }

    fn update(&mut self, count: f64) {
        self.h_xy_sumxlogx += xlogx(count);
        self.nx_current += count;
    }

    fn subend(&mut self) {
        self.h_x_sumxlogx += xlogx(self.nx_current);
    }

    fn end(&mut self) {
        let logn = (self.n as f64).log2();
        let n = self.n as f64;
        let h_x = logn - self.h_x_sumxlogx / n;
        let h_xy = logn - self.h_xy_sumxlogx / n;
        let info = self.h_y + h_x - h_xy;
        let bias = chi2_critical_value(self.alpha, self.dof) / (2.0 * n);
        self.value = (info - bias) / self.h_y;
        self.bound = 1.0 - bias;
    }
}

impl TargetScorer for AdjustedDependency {
    fn set_target(&mut self, target: &Partition) {
        self.h_y = target.entropy();
        self.n = target.size() as u64;
        self.dof = (target.n_parts() as u64).saturating_sub(1);
    }

    fn result(&self) -> (f64, f64) {
        (crate::utils::clamp_nonnegative(self.value), crate::utils::clamp_nonnegative(self.bound))
    }
}

/// Mutual information minus the Suzuki bias term `(N_X-1)(N_Y-1)/(2N) *
/// log2(N)`; see Suzuki, "Mutual Information Estimation: Independence
/// Detection and Consistency".
pub struct SuzukiMutualInformation {
    h_y: f64,
    n: u64,
    n_y: usize,
    n_x: usize,
    h_x_sumxlogx: f64,
    h_xy_sumxlogx: f64,
    nx_current: f64,
    value: f64,
    bound: f64,
}

impl Default for SuzukiMutualInformation {
    fn default() -> Self {
        Self { h_y: 0.0, n: 0, n_y: 0, n_x: 0, h_x_sumxlogx: 0.0, h_xy_sumxlogx: 0.0, nx_current: 0.0, value: 0.0, bound: 0.0 }
    }
}

impl Scorer for SuzukiMutualInformation {
    fn begin_pair(&mut self, n_x: usize, _n_y: usize) {
        self.n_x = n_x;
        self.h_x_sumxlogx = 0.0;
        self.h_xy_sumxlogx = 0.0;
    }

    fn subbegin(&mut self) {
        self.nx_current = 0.0;
    }

    fn update(&mut self, count: f64) {
        self.h_xy_sumxlogx += xlogx(count);
        self.nx_current += count;
    }

    fn subend(&mut self) {
        self.h_x_sumxlogx += xlogx(self.nx_current);
    }

    fn end(&mut self) {
        let logn = (self.n as f64).log2();
        let n = self.n as f64;
        let h_x = logn - self.h_x_sumxlogx / n;
        let h_xy = logn - self.h_xy_sumxlogx / n;
        let info = self.h_y + h_x - h_xy;
        let bias = (self.n_x as f64 - 1.0) * (self.n_y as f64 - 1.0) / (2.0 * n) * n.log2();
        self.value = (info - bias) / self.h_y;
        self.bound = 1.0 - bias;
    }
}

impl TargetScorer for SuzukiMutualInformation {
    fn set_target(&mut self, target: &Partition) {
        self.h_y = target.entropy();
        self.n = target.size() as u64;
        self.n_y = target.n_parts();
    }

    fn result(&self) -> (f64, f64) {
        (crate::utils::clamp_nonnegative(self.value), crate::utils::clamp_nonnegative(self.bound))
    }
}

/// Inverse standard normal CDF, Acklam's rational approximation
/// (relative error below ~1.15e-9 over the open unit interval).
fn inverse_normal_cdf(p: f64) -> f64 {
    const A: [f64; 6] =
        [-3.969_683_028_665_376e+01, 2.209_460_984_245_205e+02, -2.759_285_104_469_687e+02, 1.383_577_518_672_690e+02, -3.066_479_806_614_716e+01, 2.506_628_277_459_239e+00];
    const B: [f64; 5] = [-5.447_609_879_822_406e+01, 1.615_858_368_580_409e+02, -1.556_989_798_598_866e+02, 6.680_131_188_771_972e+01, -1.328_068_155_288_572e+01];
    const C: [f64; 6] =
        [-7.784_894_002_430_293e-03, -3.223_964_580_411_365e-01, -2.400_758_277_161_838e+00, -2.549_732_539_343_734e+00, 4.374_664_141_464_968e+00, 2.938_163_982_698_783e+00];
    const D: [f64; 4] = [7.784_695_709_041_462e-03, 3.224_671_290_700_398e-01, 2.445_134_137_142_996e+00, 3.754_408_661_907_416e+00];

    let p_low = 0.02425;
    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }
    if p < p_low {
        let q = (-2.0 * p.ln()).sqrt();
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    } else if p <= 1.0 - p_low {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        let q = (-2.0 * (1.0 - p).ln()).sqrt();
        -(((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    }
}

/// Upper `alpha`-critical value of the chi-squared distribution with `df`
/// degrees of freedom, via the Wilson-Hilferty cube-root approximation.
/// `df == 0` collapses to zero (a degenerate target has no dependency to
/// adjust for).
fn chi2_critical_value(alpha: f64, df: u64) -> f64 {
    if df == 0 {
        return 0.0;
    }
    let df = df as f64;
    let z = inverse_normal_cdf(1.0 - alpha);
    let h = 2.0 / (9.0 * df);
    let term = 1.0 - h + z * h.sqrt();
    crate::utils::clamp_nonnegative(df * term * term * term)
}

/// Which scoring family a run uses, selected once from the CLI.
pub enum ScorerKind {
    ReliableFractionOfInformation,
    SmoothedMutualInformation { alpha: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::PartitionBuilder;

    fn build(transactions: &[&[(u16, u8)]]) -> crate::partition::Partitions {
        let mut b = PartitionBuilder::new();
        for t in transactions {
            b.add(t);
        }
        b.finish()
    }

    #[test]
    fn rfi_on_perfect_dependency_is_near_one() {
        let parts = build(&[&[(0, 0), (1, 0)], &[(0, 0), (1, 0)], &[(0, 1), (1, 1)], &[(0, 1), (1, 1)]]);
        let mut scorer = ReliableFractionOfInformation::default();
        scorer.set_target(parts.get(1).unwrap());
        let mut x = parts.get(0).unwrap().clone();
        x.intersect_scored(parts.get(1).unwrap(), &mut scorer).unwrap();
        let (score, bound) = scorer.result();
        assert!(score > 0.9, "expected near-perfect RFI, got {score}");
        assert!(bound >= score - 1e-9);
    }

    #[test]
    fn smoothed_mi_bound_dominates_score() {
        let parts = build(&[
            &[(0, 0), (1, 0)],
            &[(0, 0), (1, 1)],
            &[(0, 1), (1, 0)],
            &[(0, 1), (1, 1)],
            &[(0, 0), (1, 0)],
            &[(0, 1), (1, 1)],
        ]);
        for alpha in [0.1, 1.0, 10.0] {
            let mut scorer = SmoothedMutualInformation::new(alpha);
            scorer.set_target(parts.get(1).unwrap());
            let mut x = parts.get(0).unwrap().clone();
            x.intersect_scored(parts.get(1).unwrap(), &mut scorer).unwrap();
            let (score, bound) = scorer.result();
            assert!(bound + 1e-9 >= score, "alpha={alpha}: bound {bound} < score {score}");
        }
    }

    #[test]
    fn suzuki_and_adjusted_dependency_bound_their_score() {
        let parts = build(&[&[(0, 0), (1, 0)], &[(0, 0), (1, 1)], &[(0, 1), (1, 0)], &[(0, 1), (1, 1)]]);

        let mut suzuki = SuzukiMutualInformation::default();
        suzuki.set_target(parts.get(1).unwrap());
        let mut x = parts.get(0).unwrap().clone();
        x.intersect_scored(parts.get(1).unwrap(), &mut suzuki).unwrap();
        let (s, b) = suzuki.result();
        assert!(b + 1e-9 >= s);

        let mut adj = AdjustedDependency::new(0.05);
        adj.set_target(parts.get(1).unwrap());
        let mut y = parts.get(0).unwrap().clone();
        y.intersect_scored(parts.get(1).unwrap(), &mut adj).unwrap();
        let (s2, b2) = adj.result();
        assert!(b2 + 1e-9 >= s2);
    }

    #[test]
    fn chi2_critical_value_is_nonnegative_and_grows_with_df() {
        let small = chi2_critical_value(0.05, 1);
        let large = chi2_critical_value(0.05, 10);
        assert!(small >= 0.0);
        assert!(large > small);
    }

    #[test]
    fn chi2_critical_value_zero_dof_is_zero() {
        assert_eq!(chi2_critical_value(0.05, 0), 0.0);
    }
}
