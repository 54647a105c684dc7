use std::io::Write;

use super::Attributes;
use crate::attribute::FeatureId;
use crate::error::Result;
use crate::tokens::escape;

/// Keeps the AdaGrad step finite before any history accumulates.
const ADAGRAD_EPSILON: f64 = 1e-8;

/// Parameter vector interface used by the optimizer.
///
/// Vectors passed in or out are indexed in pool order and must hold exactly
/// [`nfeatures`](Attributes::nfeatures) elements; index `i` is the weight
/// with `FeatureId(i)`. None of these methods moves a weight. Those writing
/// by position panic unless the store is compact.
impl Attributes {
    pub fn zero_lambdas(&mut self) {
        for weight in self.store.weights.iter_mut() {
            weight.lambda = 0.0;
        }
    }

    pub fn assign_lambdas(&mut self, lambdas: &[f64]) {
        self.assert_compact();
        assert_eq!(lambdas.len(), self.nfeatures(), "lambda vector length");
        for (weight, &lambda) in self.store.weights.iter_mut().zip(lambdas) {
            weight.lambda = lambda;
        }
    }

    /// Current lambdas in pool order
    pub fn lambdas(&self) -> Vec<f64> {
        self.live_weights().map(|w| w.lambda).collect()
    }

    /// Squared L2 norm of the lambdas
    pub fn sum_lambda_sq(&self) -> f64 {
        self.live_weights().map(|w| w.lambda * w.lambda).sum()
    }

    /// Write the gradient of every weight into `gradients`.
    pub fn copy_gradients(&self, gradients: &mut [f64], inv_sigma_sq: f64) {
        assert_eq!(gradients.len(), self.nfeatures(), "gradient vector length");
        for (g, weight) in gradients.iter_mut().zip(self.live_weights()) {
            *g = weight.gradient(weight.lambda, inv_sigma_sq);
        }
    }

    /// Rewind the cursor of [`inc_next_lambda`](Self::inc_next_lambda).
    pub fn prep_finite_differences(&mut self) {
        self.assert_compact();
        self.undo_perturbation();
        self.cursor = 0;
    }

    /// Undo the previous perturbation and add `val` to the next lambda.
    ///
    /// Returns `false` once every lambda has been visited; the store is then
    /// back to its unperturbed state.
    pub fn inc_next_lambda(&mut self, val: f64) -> bool {
        self.assert_compact();
        self.undo_perturbation();
        if self.cursor >= self.nfeatures() {
            return false;
        }
        let index = self.cursor;
        self.store.weights[index].lambda += val;
        self.perturbed = Some((index, val));
        self.cursor += 1;
        true
    }

    fn assert_compact(&self) {
        assert!(self.is_compact(), "attributes must be compacted before optimizing");
    }

    pub(super) fn undo_perturbation(&mut self) {
        if let Some((index, val)) = self.perturbed.take() {
            self.store.weights[index].lambda -= val;
        }
    }

    /// One AdaGrad step over every weight.
    ///
    /// The gradient of weight `i` is evaluated at `weights[i]`; the updated
    /// value is written to both `weights[i]` and the stored lambda.
    pub fn adagrad_update(
        &mut self,
        weights: &mut [f64],
        history: &mut [f64],
        t0: f64,
        inv_sigma_sq: f64,
        inv_n: f64,
    ) {
        self.assert_compact();
        assert_eq!(weights.len(), self.nfeatures(), "weight vector length");
        assert_eq!(history.len(), self.nfeatures(), "history vector length");
        let rate = t0 * inv_n;
        for ((weight, lambda), hist) in self
            .store
            .weights
            .iter_mut()
            .zip(weights.iter_mut())
            .zip(history.iter_mut())
        {
            let g = weight.gradient(*lambda, inv_sigma_sq);
            *hist += g * g;
            *lambda -= rate * g / (hist.sqrt() + ADAGRAD_EPSILON);
            weight.lambda = *lambda;
        }
    }

    /// Accumulate a model expectation on one weight.
    #[inline]
    pub fn add_expectation(&mut self, fid: FeatureId, val: f64) {
        self.store.weights[fid.index()].exp += val;
    }

    /// Zero the per-pass expectations.
    pub fn reset_expectations(&mut self) {
        for weight in self.store.weights.iter_mut() {
            weight.exp = 0.0;
        }
    }

    /// Zero the lambdas and expectations; observed counts are kept.
    pub fn reset(&mut self) {
        self.zero_lambdas();
        self.reset_expectations();
        self.perturbed = None;
        self.cursor = 0;
    }

    /// Write one line per weight with its current gradient.
    pub fn print_gradients<W: Write>(&self, mut out: W, inv_sigma_sq: f64) -> Result<()> {
        for entry in self.live() {
            for weight in self.weights(entry.attrib) {
                writeln!(
                    out,
                    "{} {} {} {} lambda={} exp={} freq={} grad={}",
                    entry.r#type.name,
                    escape(entry.value),
                    escape(self.tags.str(weight.klasses.prev)),
                    escape(self.tags.str(weight.klasses.curr)),
                    weight.lambda,
                    weight.exp,
                    weight.freq,
                    weight.gradient(weight.lambda, inv_sigma_sq)
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::small;
    use super::super::{Activate, Attributes};
    use crate::attribute::FeatureId;
    use crate::tagset::TagPair;
    use crate::types::WORD;

    fn trained() -> Attributes {
        let mut attrs = small();
        let tags = attrs.tags().clone();
        let tp = TagPair::new(tags.canonize("O"), tags.canonize("PER"));
        attrs.add(WORD, "a", tp, Activate::STATE);
        attrs.add(WORD, "b", tp, Activate::ALL);
        attrs.add(WORD, "b", tp, Activate::ALL);
        // "a" grows after "b" and leaves a hole behind
        attrs.add(WORD, "a", tp, Activate::TRANS);
        attrs.compact();
        attrs
    }

    #[test]
    fn test_assign_and_sum() {
        let mut attrs = trained();
        assert_eq!(attrs.nfeatures(), 4);
        attrs.assign_lambdas(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(attrs.lambdas(), vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(attrs.sum_lambda_sq(), 30.0);
        attrs.zero_lambdas();
        assert_eq!(attrs.sum_lambda_sq(), 0.0);
    }

    #[test]
    #[should_panic(expected = "lambda vector length")]
    fn test_assign_wrong_length() {
        let mut attrs = trained();
        attrs.assign_lambdas(&[1.0]);
    }

    #[test]
    #[should_panic(expected = "attributes must be compacted before optimizing")]
    fn test_assign_requires_compact_store() {
        let mut attrs = small();
        let tp = TagPair::new(attrs.tags().canonize("O"), attrs.tags().canonize("PER"));
        attrs.add(WORD, "a", tp, Activate::STATE);
        attrs.add(WORD, "b", tp, Activate::STATE);
        attrs.add(WORD, "a", tp, Activate::TRANS);
        let n = attrs.nfeatures();
        attrs.assign_lambdas(&vec![0.0; n]);
    }

    #[test]
    fn test_optimizer_never_moves_weights() {
        let mut attrs = trained();
        let before: Vec<_> = (0..attrs.nfeatures())
            .map(|i| attrs.weight(FeatureId(i as u32)).klasses)
            .collect();
        let n = attrs.nfeatures();
        attrs.zero_lambdas();
        attrs.assign_lambdas(&vec![0.5; n]);
        attrs.adagrad_update(&mut vec![0.0; n], &mut vec![0.0; n], 0.1, 1.0, 1.0);
        attrs.prep_finite_differences();
        while attrs.inc_next_lambda(0.1) {}
        attrs.reset();
        let after: Vec<_> = (0..n)
            .map(|i| attrs.weight(FeatureId(i as u32)).klasses)
            .collect();
        assert_eq!(before, after);
        assert_eq!(attrs.get(WORD, "a").begin, 2);
    }

    #[test]
    fn test_copy_gradients() {
        let mut attrs = trained();
        attrs.assign_lambdas(&[0.5, 0.0, 0.0, 0.0]);
        attrs.add_expectation(FeatureId(0), 0.25);
        let mut g = vec![0.0; 4];
        attrs.copy_gradients(&mut g, 2.0);
        // weight 0 is "b" state: freq 2
        assert_eq!(g[0], 0.25 - 2.0 + 2.0 * 0.5);
        assert_eq!(g[1], -2.0);

        attrs.reset_expectations();
        attrs.copy_gradients(&mut g, 0.0);
        assert_eq!(g[0], -2.0);
    }

    #[test]
    fn test_finite_differences_visit_each_lambda_once() {
        let mut attrs = trained();
        attrs.prep_finite_differences();
        let mut visited = 0;
        while attrs.inc_next_lambda(0.1) {
            visited += 1;
            let perturbed: Vec<_> = attrs.lambdas().iter().map(|l| *l != 0.0).collect();
            assert_eq!(perturbed.iter().filter(|p| **p).count(), 1);
            assert!(perturbed[visited - 1]);
        }
        assert_eq!(visited, attrs.nfeatures());
        assert_eq!(attrs.sum_lambda_sq(), 0.0);
        assert!(!attrs.inc_next_lambda(0.1));
    }

    #[test]
    fn test_adagrad_update() {
        let mut attrs = trained();
        let n = attrs.nfeatures();
        let mut weights = vec![0.0; n];
        let mut history = vec![0.0; n];
        attrs.adagrad_update(&mut weights, &mut history, 0.1, 1.0, 0.5);

        // weight 1 is "b" (O, PER) with freq 2: g = -2
        assert_eq!(history[1], 4.0);
        let expected = 0.1 * 0.5 * 2.0 / (2.0 + 1e-8);
        assert!((weights[1] - expected).abs() < 1e-12);
        assert_eq!(attrs.lambdas(), weights);
    }

    #[test]
    fn test_adagrad_is_deterministic() {
        let mut first = trained();
        let mut second = trained();
        let mut w1 = vec![0.3, -0.1, 0.0, 2.0];
        let mut h1 = vec![1.0, 0.0, 0.5, 0.0];
        let mut w2 = w1.clone();
        let mut h2 = h1.clone();
        first.adagrad_update(&mut w1, &mut h1, 0.5, 0.1, 1.0);
        second.adagrad_update(&mut w2, &mut h2, 0.5, 0.1, 1.0);
        assert_eq!(w1, w2);
        assert_eq!(h1, h2);
    }

    #[test]
    fn test_reset_keeps_counts() {
        let mut attrs = trained();
        attrs.assign_lambdas(&[1.0; 4]);
        attrs.add_expectation(FeatureId(2), 1.0);
        attrs.reset();
        assert_eq!(attrs.sum_lambda_sq(), 0.0);
        let mut g = vec![0.0; 4];
        attrs.copy_gradients(&mut g, 1.0);
        assert_eq!(g, vec![-2.0, -2.0, -1.0, -1.0]);
    }

    #[test]
    fn test_print_gradients() {
        let attrs = trained();
        let mut out = Vec::new();
        attrs.print_gradients(&mut out, 1.0).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "w b __NONE__ PER lambda=0 exp=0 freq=2 grad=-2");
    }
}
