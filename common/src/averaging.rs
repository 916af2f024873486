use std::collections::VecDeque;

use crate::types::CalibratedReading;

#[derive(Debug, Clone)]
pub struct AveragingBuffer {
    capacity: usize,
    samples: VecDeque<CalibratedReading>,
}

impl AveragingBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            samples: VecDeque::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.samples.len() == self.capacity
    }

    pub fn push(&mut self, sample: CalibratedReading) {
        if self.is_full() {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn mean(&self) -> Option<CalibratedReading> {
        if self.samples.is_empty() {
            return None;
        }

        let count = self.samples.len() as f32;
        let (temperature, humidity) = self
            .samples
            .iter()
            .fold((0.0_f32, 0.0_f32), |(temp, hum), sample| {
                (temp + sample.temperature, hum + sample.humidity)
            });

        Some(CalibratedReading {
            temperature: temperature / count,
            humidity: humidity / count,
        })
    }
}
