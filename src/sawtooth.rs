/// Triangle wave stepping by one between `min` and `max` inclusive, starting at `min`.
///
/// A degenerate range (`min >= max`) yields `min` forever.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Sawtooth {
    min:   u32,
    max:   u32,
    value: u32,
    delta: i8,
}

impl Sawtooth {
    #[inline]
    pub fn new(min: u32, max: u32) -> Self {
        Self {
            min,
            max,
            value: min,
            delta: 1,
        }
    }
}

impl Iterator for Sawtooth {
    type Item = u32;

    fn next(&mut self) -> Option<Self::Item> {
        let value = self.value;

        if self.min >= self.max {
            return Some(self.min);
        }

        if value >= self.max {
            self.delta = -1;
        } else if value <= self.min {
            self.delta = 1;
        }

        self.value = match self.delta {
            1 => value + 1,
            _ => value - 1,
        };

        Some(value)
    }
}

#[cfg(test)]
mod test {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_wave() {
        let values = Sawtooth::new(0, 3).take(10).collect::<Vec<_>>();
        assert_eq!(values, vec![0, 1, 2, 3, 2, 1, 0, 1, 2, 3]);
    }

    #[test]
    fn test_degenerate() {
        assert_eq!(Sawtooth::new(5, 5).take(3).collect::<Vec<_>>(), vec![5, 5, 5]);
        assert_eq!(Sawtooth::new(7, 2).take(2).collect::<Vec<_>>(), vec![7, 7]);
    }

    proptest! {
        #[test]
        fn stays_in_range(min in 0u32..1000, span in 1u32..50, n in 0usize..500) {
            let max = min + span;

            for value in Sawtooth::new(min, max).take(n) {
                prop_assert!((min..=max).contains(&value));
            }
        }
    }
}
