use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU32, Ordering};

use bitflags::Flags;

/// A lock-free 32-bit flag word.
///
/// Every mutation runs the same loop: snapshot the word, compute the
/// candidate from the snapshot, and install it with compare-and-swap. A failed
/// swap means another caller made progress, so the loop retries against the
/// fresh value. Bits are only ever combined with OR and AND-NOT, never with
/// arithmetic, so overlapping multi-bit masks cannot carry into each other.
pub struct BitRegister<F> {
    word: AtomicU32,
    _flags: PhantomData<fn() -> F>,
}

impl<F> BitRegister<F> {
    /// Creates a register with no bits set.
    pub const fn zeroed() -> Self {
        Self {
            word: AtomicU32::new(0),
            _flags: PhantomData,
        }
    }
}

impl<F> Default for BitRegister<F> {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl<F> BitRegister<F>
where
    F: Flags<Bits = u32> + Copy,
{
    pub fn new(initial: F) -> Self {
        Self {
            word: AtomicU32::new(initial.bits()),
            _flags: PhantomData,
        }
    }

    pub fn load(&self) -> F {
        F::from_bits_retain(self.word.load(Ordering::Acquire))
    }

    /// Overwrites the word unconditionally.
    ///
    /// This skips every transition guard. Only use it to initialize or reset
    /// a register that no other caller is driving.
    pub fn store(&self, value: F) {
        self.word.store(value.bits(), Ordering::Release);
    }

    /// ORs `mask` into the word. Returns the previous value.
    pub fn set(&self, mask: F) -> F {
        let mask = mask.bits();
        F::from_bits_retain(self.update(|cur| Some(cur | mask)).unwrap_or_else(|v| v))
    }

    /// Clears every bit of `mask`. Returns the previous value.
    pub fn clear(&self, mask: F) -> F {
        let mask = mask.bits();
        F::from_bits_retain(self.update(|cur| Some(cur & !mask)).unwrap_or_else(|v| v))
    }

    /// Sets `set` only if every bit of `must_have` is already present.
    ///
    /// Returns `false` without touching the word when the precondition fails.
    pub fn set_if(&self, must_have: F, set: F) -> bool {
        let must_have = must_have.bits();
        let set = set.bits();
        self.update(|cur| (cur & must_have == must_have).then_some(cur | set))
            .is_ok()
    }

    /// Guarded transition: if none of `forbidden` is set, clears `clear` and
    /// then sets `set`, all within one compare-and-swap.
    ///
    /// Returns `Ok(previous)` when the transition landed, or `Err(observed)`
    /// with the snapshot that tripped the guard. The guard is re-evaluated on
    /// every retry, so a concurrent write of a forbidden bit can never be
    /// overwritten.
    pub fn transition(&self, forbidden: F, set: F, clear: F) -> Result<F, F> {
        let forbidden = forbidden.bits();
        let set = set.bits();
        let clear = clear.bits();
        self.update(|cur| (cur & forbidden == 0).then_some((cur & !clear) | set))
            .map(F::from_bits_retain)
            .map_err(F::from_bits_retain)
    }

    /// True if any bit of `mask` is set in a single snapshot.
    pub fn any(&self, mask: F) -> bool {
        self.word.load(Ordering::Acquire) & mask.bits() != 0
    }

    /// True if every bit of `mask` is set in a single snapshot.
    pub fn all(&self, mask: F) -> bool {
        let mask = mask.bits();
        self.word.load(Ordering::Acquire) & mask == mask
    }

    // CAS retry loop shared by every mutation. `next` returning `None` aborts
    // with the snapshot it rejected.
    fn update(&self, mut next: impl FnMut(u32) -> Option<u32>) -> Result<u32, u32> {
        let mut cur = self.word.load(Ordering::Acquire);
        loop {
            let candidate = next(cur).ok_or(cur)?;
            match self.word.compare_exchange_weak(
                cur,
                candidate,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(prev) => return Ok(prev),
                Err(actual) => cur = actual,
            }
        }
    }
}

impl<F> fmt::Debug for BitRegister<F>
where
    F: Flags<Bits = u32> + Copy + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BitRegister").field(&self.load()).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use bitflags::bitflags;

    use super::*;

    bitflags! {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        struct Bits: u32 {
            const A = 1 << 0;
            const B = 1 << 1;
            const C = 1 << 2;
        }
    }

    #[test]
    fn zeroed_register_is_empty() {
        let r: BitRegister<Bits> = BitRegister::default();
        assert!(r.load().is_empty());
        assert!(!r.any(Bits::all()));
    }

    #[test]
    fn set_and_clear() {
        let r = BitRegister::zeroed();
        let prev = r.set(Bits::A | Bits::B);
        assert!(prev.is_empty());
        assert_eq!(r.load(), Bits::A | Bits::B);

        let prev = r.clear(Bits::B);
        assert_eq!(prev, Bits::A | Bits::B);
        assert_eq!(r.load(), Bits::A);
    }

    #[test]
    fn set_is_idempotent_for_overlapping_masks() {
        let r = BitRegister::zeroed();
        r.set(Bits::A | Bits::B);
        r.set(Bits::B | Bits::C);
        r.set(Bits::A | Bits::B);
        assert_eq!(r.load(), Bits::all());
    }

    #[test]
    fn store_overwrites() {
        let r = BitRegister::new(Bits::all());
        r.store(Bits::C);
        assert_eq!(r.load(), Bits::C);
    }

    #[test]
    fn set_if_requires_all_bits() {
        let r = BitRegister::new(Bits::A);
        assert!(!r.set_if(Bits::A | Bits::B, Bits::C));
        assert_eq!(r.load(), Bits::A);

        assert!(r.set_if(Bits::A, Bits::C));
        assert_eq!(r.load(), Bits::A | Bits::C);
    }

    #[test]
    fn set_if_with_empty_precondition_always_sets() {
        let r = BitRegister::zeroed();
        assert!(r.set_if(Bits::empty(), Bits::B));
        assert_eq!(r.load(), Bits::B);
    }

    #[test]
    fn transition_clears_then_sets() {
        let r = BitRegister::new(Bits::A | Bits::B);
        let prev = r.transition(Bits::C, Bits::B, Bits::A | Bits::B);
        assert_eq!(prev, Ok(Bits::A | Bits::B));
        assert_eq!(r.load(), Bits::B);
    }

    #[test]
    fn transition_rejects_forbidden_bits() {
        let r = BitRegister::new(Bits::C);
        assert_eq!(r.transition(Bits::C, Bits::A, Bits::empty()), Err(Bits::C));
        assert_eq!(r.load(), Bits::C);
    }

    #[test]
    fn any_and_all() {
        let r = BitRegister::new(Bits::A | Bits::C);
        assert!(r.any(Bits::A | Bits::B));
        assert!(!r.any(Bits::B));
        assert!(r.all(Bits::A | Bits::C));
        assert!(!r.all(Bits::A | Bits::B));
        assert!(r.all(Bits::empty()));
    }

    #[test]
    fn unknown_bits_are_retained() {
        let r: BitRegister<Bits> = BitRegister::zeroed();
        r.set(Bits::from_bits_retain(1 << 20));
        assert_eq!(r.load().bits(), 1 << 20);
    }

    #[test]
    fn concurrent_distinct_bits_are_never_lost() {
        let r: Arc<BitRegister<Bits>> = Arc::new(BitRegister::zeroed());
        let handles: Vec<_> = (0..32)
            .map(|i| {
                let r = Arc::clone(&r);
                thread::spawn(move || {
                    r.set(Bits::from_bits_retain(1 << i));
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(r.load().bits(), u32::MAX);
    }

    #[test]
    fn concurrent_set_and_clear_keep_untouched_bits() {
        let r = BitRegister::new(Bits::C);
        thread::scope(|s| {
            for i in 0..8 {
                let r = &r;
                s.spawn(move || {
                    for _ in 0..1_000 {
                        if i % 2 == 0 {
                            r.set(Bits::A);
                        } else {
                            r.clear(Bits::A);
                        }
                        r.set(Bits::B);
                    }
                });
            }
        });
        assert!(r.all(Bits::B | Bits::C));
    }
}
