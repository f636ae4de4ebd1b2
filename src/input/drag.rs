use crate::core::constants::DRAG_SAMPLE_CAPACITY;
use crate::core::geo::Point;
use crate::input::events::PointerId;
use instant::Instant;
use std::collections::VecDeque;

/// State of one pointer drag, alive between pointer down and up/cancel/leave
#[derive(Debug, Clone)]
pub struct DragSession {
    pointer_id: PointerId,
    start: Point,
    last: Point,
    /// Newest sample at the back
    samples: VecDeque<(Point, Instant)>,
    max_distance: f64,
}

impl DragSession {
    pub fn new(pointer_id: PointerId, position: Point, time: Instant) -> Self {
        let mut samples = VecDeque::with_capacity(DRAG_SAMPLE_CAPACITY);
        samples.push_back((position, time));
        Self {
            pointer_id,
            start: position,
            last: position,
            samples,
            max_distance: 0.0,
        }
    }

    /// Records a move and returns the pixel delta since the previous one
    pub fn record(&mut self, position: Point, time: Instant) -> Point {
        let delta = position.subtract(&self.last);
        self.last = position;
        self.max_distance = self.max_distance.max(position.distance_to(&self.start));

        if self.samples.len() == DRAG_SAMPLE_CAPACITY {
            self.samples.pop_front();
        }
        self.samples.push_back((position, time));
        delta
    }

    /// Release velocity in px/ms.
    ///
    /// Measured from the newest sample back to the most recent one at least
    /// `window_ms` older, or to the oldest buffered sample if none is.
    pub fn release_velocity(&self, window_ms: f64) -> Point {
        let Some(&(newest, newest_time)) = self.samples.back() else {
            return Point::default();
        };

        let reference = self
            .samples
            .iter()
            .rev()
            .skip(1)
            .find(|(_, t)| elapsed_ms(*t, newest_time) >= window_ms)
            .or_else(|| self.samples.front());

        match reference {
            Some(&(position, time)) => {
                let dt = elapsed_ms(time, newest_time);
                if dt <= 0.0 {
                    Point::default()
                } else {
                    newest.subtract(&position).multiply(1.0 / dt)
                }
            }
            None => Point::default(),
        }
    }

    pub fn pointer_id(&self) -> PointerId {
        self.pointer_id
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn last(&self) -> Point {
        self.last
    }

    /// Whether the pointer ever strayed further than `slop` from where it went down
    pub fn moved_beyond(&self, slop: f64) -> bool {
        self.max_distance > slop
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }
}

fn elapsed_ms(from: Instant, to: Instant) -> f64 {
    to.saturating_duration_since(from).as_secs_f64() * 1000.0
}
