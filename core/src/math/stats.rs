use ndarray::ArrayView1;

pub struct StatsHelper;

impl StatsHelper {
    pub fn rms(samples: ArrayView1<f64>) -> f64 {
        if samples.is_empty() {
            return 0.0;
        }
        let sum_sq: f64 = samples.iter().map(|&v| v * v).sum();
        (sum_sq / samples.len() as f64).sqrt()
    }

    pub fn mean(samples: ArrayView1<f64>) -> f64 {
        if samples.is_empty() {
            return 0.0;
        }
        samples.sum() / samples.len() as f64
    }
}
