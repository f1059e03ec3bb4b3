//! Classification metrics over predicted/true class indices.

use data_contracts::{AverageMetrics, ClassMetrics, ClassificationReport};

/// Fraction of positions where `predictions[i] == targets[i]`; 0 for empty input.
pub fn accuracy(predictions: &[usize], targets: &[usize]) -> f32 {
    if targets.is_empty() {
        return 0.0;
    }
    let correct = predictions
        .iter()
        .zip(targets)
        .filter(|(p, t)| p == t)
        .count();
    correct as f32 / targets.len() as f32
}

fn ratio(num: usize, den: usize) -> f32 {
    if den == 0 {
        0.0
    } else {
        num as f32 / den as f32
    }
}

/// Per-class precision/recall/F1 plus macro and support-weighted averages. Classes
/// with no predictions (or no support) score 0 rather than NaN.
pub fn classification_report(
    predictions: &[usize],
    targets: &[usize],
    classes: &[String],
) -> ClassificationReport {
    let n = classes.len();
    let mut tp = vec![0usize; n];
    let mut predicted = vec![0usize; n];
    let mut support = vec![0usize; n];
    for (&p, &t) in predictions.iter().zip(targets) {
        if p < n {
            predicted[p] += 1;
        }
        if t < n {
            support[t] += 1;
            if p == t {
                tp[t] += 1;
            }
        }
    }

    let per_class: Vec<ClassMetrics> = classes
        .iter()
        .enumerate()
        .map(|(c, label)| {
            let precision = ratio(tp[c], predicted[c]);
            let recall = ratio(tp[c], support[c]);
            let f1 = if precision + recall > 0.0 {
                2.0 * precision * recall / (precision + recall)
            } else {
                0.0
            };
            ClassMetrics {
                label: label.clone(),
                precision,
                recall,
                f1,
                support: support[c],
            }
        })
        .collect();

    let total: usize = support.iter().sum();
    let mean = |f: fn(&ClassMetrics) -> f32| {
        if per_class.is_empty() {
            0.0
        } else {
            per_class.iter().map(f).sum::<f32>() / per_class.len() as f32
        }
    };
    let weighted = |f: fn(&ClassMetrics) -> f32| {
        if total == 0 {
            0.0
        } else {
            per_class
                .iter()
                .map(|m| f(m) * m.support as f32)
                .sum::<f32>()
                / total as f32
        }
    };

    ClassificationReport {
        accuracy: accuracy(predictions, targets),
        macro_avg: AverageMetrics {
            precision: mean(|m| m.precision),
            recall: mean(|m| m.recall),
            f1: mean(|m| m.f1),
            support: total,
        },
        weighted_avg: AverageMetrics {
            precision: weighted(|m| m.precision),
            recall: weighted(|m| m.recall),
            f1: weighted(|m| m.f1),
            support: total,
        },
        classes: per_class,
    }
}
