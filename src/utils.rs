use std::collections::VecDeque;

use crate::model::Price;

/// Mean over the last `window` fed values.
pub struct MovingAverage {
    window: usize,
    values: VecDeque<Price>,
    sum: Price,
}

impl MovingAverage {
    pub fn new(window: usize) -> Self {
        Self {
            window,
            values: VecDeque::with_capacity(window),
            sum: Price::default(),
        }
    }

    pub fn feed(&mut self, value: Price) {
        self.values.push_back(value);
        self.sum += value;

        if self.values.len() > self.window {
            if let Some(old) = self.values.pop_front() {
                self.sum -= old;
            }
        }
    }

    pub fn is_full(&self) -> bool {
        self.window > 0 && self.values.len() == self.window
    }

    /// `None` until `window` values have been fed.
    pub fn avg(&self) -> Option<Price> {
        self.is_full().then(|| self.sum / self.window as Price)
    }
}
