use std::cmp::Ordering;
use std::collections::HashMap;

/// Describe-style statistics for one numeric column. `std` is the sample
/// standard deviation and is None for fewer than two values.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: f64,
    pub std: Option<f64>,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

/// None when there are no values to summarize.
pub fn numeric_summary(values: &[f64]) -> Option<NumericSummary> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let count = sorted.len();
    let mean = sorted.iter().sum::<f64>() / count as f64;
    let std = if count < 2 {
        None
    } else {
        let squared: f64 = sorted.iter().map(|v| (v - mean) * (v - mean)).sum();
        Some((squared / (count - 1) as f64).sqrt())
    };

    Some(NumericSummary {
        count,
        mean,
        std,
        min: sorted[0],
        q25: quantile(&sorted, 0.25),
        median: quantile(&sorted, 0.5),
        q75: quantile(&sorted, 0.75),
        max: sorted[count - 1],
    })
}

// Linear interpolation between closest ranks; `sorted` must be ascending
// and non-empty.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
    }
}

/// Pearson correlation coefficient of two equally long samples. None for
/// fewer than two points or when either side has zero variance, so a
/// degenerate input never turns into a silent NaN.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let count = xs.len();
    if count != ys.len() || count < 2 {
        return None;
    }

    let n = count as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let mut covariance = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        covariance += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }

    Some(covariance / (var_x.sqrt() * var_y.sqrt()))
}

/// Occurrence counts per distinct value, ordered by descending count.
/// Ties keep the order in which the values were first seen.
pub fn category_counts(values: &[Option<String>]) -> Vec<(String, usize)> {
    let mut order: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for value in values.iter().flatten() {
        match index.get(value.as_str()) {
            Some(&slot) => order[slot].1 += 1,
            None => {
                index.insert(value.clone(), order.len());
                order.push((value.clone(), 1));
            }
        }
    }

    // Stable sort preserves first-seen order among equal counts.
    order.sort_by(|a, b| b.1.cmp(&a.1));
    order
}
