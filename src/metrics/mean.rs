use crate::metrics::Metric;

/// Running arithmetic mean of scalar observations.
#[derive(Debug, Clone)]
pub struct Mean {
    name: String,
    total: f64,
    count: usize,
}

impl Mean {
    pub fn new(name: impl Into<String>) -> Mean {
        Mean {
            name: name.into(),
            total: 0.0,
            count: 0,
        }
    }

    pub fn update(&mut self, value: f64) {
        self.total += value;
        self.count += 1;
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

impl Metric for Mean {
    fn name(&self) -> &str {
        &self.name
    }

    fn reset(&mut self) {
        self.total = 0.0;
        self.count = 0;
    }

    /// `0.0` before the first update.
    fn result(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total / self.count as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn averages_and_resets() {
        let mut m = Mean::new("loss");
        assert_eq!(m.result(), 0.0);
        m.update(1.0);
        m.update(2.0);
        m.update(6.0);
        assert_eq!(m.result(), 3.0);
        assert_eq!(m.count(), 3);
        m.reset();
        assert_eq!(m.result(), 0.0);
        assert_eq!(m.count(), 0);
    }
}
