use std::collections::VecDeque;

/// Nominal queue length. Larger values lag the camera more, smaller
/// values lag it less.
const MAX_SAMPLES: usize = 5;

/// Bounded FIFO of raw motion deltas for one axis.
///
/// New samples are accepted while `len <= MAX_SAMPLES`, so the queue
/// actually holds up to six; the camera tuning depends on that exact
/// window. `average` over the whole queue is what decouples erratic
/// pointer events from frame-rate-dependent camera motion; consuming one
/// sample per frame is what gives the camera its inertia.
#[derive(Debug, Default, Clone)]
pub struct DeltaQueue {
    samples: VecDeque<f32>,
}

impl DeltaQueue {
    pub fn push(&mut self, delta: f32) {
        if self.samples.len() <= MAX_SAMPLES {
            self.samples.push_back(delta);
        }
    }

    /// Arithmetic mean of the buffered samples; 0 when empty.
    pub fn average(&self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f32>() / self.samples.len() as f32
    }

    /// Drop the oldest sample. Call once per rendered frame, after the
    /// average has been read.
    pub fn consume(&mut self) {
        self.samples.pop_front();
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Paired x/y delta queues fed by pointer motion.
#[derive(Debug, Default, Clone)]
pub struct InputSmoother {
    x: DeltaQueue,
    y: DeltaQueue,
}

impl InputSmoother {
    pub fn push_x(&mut self, delta: f32) {
        self.x.push(delta);
    }

    pub fn push_y(&mut self, delta: f32) {
        self.y.push(delta);
    }

    pub fn average_x(&self) -> f32 {
        self.x.average()
    }

    pub fn average_y(&self) -> f32 {
        self.y.average()
    }

    /// Drop the oldest sample from both axes.
    pub fn consume(&mut self) {
        self.x.consume();
        self.y.consume();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_average_is_zero() {
        let queue = DeltaQueue::default();
        assert_eq!(queue.average(), 0.0);
    }

    #[test]
    fn average_is_the_arithmetic_mean() {
        let mut queue = DeltaQueue::default();
        for sample in [2.0, 4.0, 6.0] {
            queue.push(sample);
        }
        assert_eq!(queue.average(), 4.0);
    }

    #[test]
    fn consume_drops_the_oldest_sample() {
        let mut queue = DeltaQueue::default();
        for sample in [2.0, 4.0, 6.0] {
            queue.push(sample);
        }
        queue.consume();
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.average(), 5.0);
    }

    #[test]
    fn capacity_admits_one_past_the_nominal_maximum() {
        // The length check runs before the push, so a sixth sample fits
        // and the seventh is dropped.
        let mut queue = DeltaQueue::default();
        for sample in 0..7 {
            queue.push(sample as f32);
        }
        assert_eq!(queue.len(), MAX_SAMPLES + 1);
    }

    #[test]
    fn smoother_axes_are_independent() {
        let mut smoother = InputSmoother::default();
        smoother.push_x(10.0);
        smoother.push_y(-2.0);
        smoother.push_y(-4.0);
        assert_eq!(smoother.average_x(), 10.0);
        assert_eq!(smoother.average_y(), -3.0);

        smoother.consume();
        assert_eq!(smoother.average_x(), 0.0);
        assert_eq!(smoother.average_y(), -4.0);
    }
}
