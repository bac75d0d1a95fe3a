//! Resource model
//!
//! Every script-visible object embeds a [`Finalizer`] as its last field.
//! Rust drops struct fields in declaration order, so by the time the
//! finalizer runs every native child of the object has been released.
//! Objects whose construction failed are never wrapped, so there is no
//! half-populated object to finalize.

use std::cell::Cell;

/// Script-visible object types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Canvas,
    Image,
    Font,
    Pattern,
    Path,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::Canvas,
        ResourceKind::Image,
        ResourceKind::Font,
        ResourceKind::Pattern,
        ResourceKind::Path,
    ];

    /// Script-facing type name
    pub fn name(self) -> &'static str {
        match self {
            ResourceKind::Canvas => "Canvas",
            ResourceKind::Image => "Image",
            ResourceKind::Font => "Font",
            ResourceKind::Pattern => "Pattern",
            ResourceKind::Path => "Path",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

thread_local! {
    static LIVE: Cell<[usize; 5]> = const { Cell::new([0; 5]) };
}

/// Number of live objects of `kind` on the current thread
pub fn live_count(kind: ResourceKind) -> usize {
    LIVE.with(|live| live.get()[kind.slot()])
}

/// Type-tagged finalization guard
///
/// Not `Clone`: one guard per object, finalized exactly once.
#[derive(Debug)]
pub struct Finalizer {
    kind: ResourceKind,
}

impl Finalizer {
    pub fn new(kind: ResourceKind) -> Self {
        LIVE.with(|live| {
            let mut counts = live.get();
            counts[kind.slot()] += 1;
            live.set(counts);
        });
        Self { kind }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }
}

impl Drop for Finalizer {
    fn drop(&mut self) {
        LIVE.with(|live| {
            let mut counts = live.get();
            counts[self.kind.slot()] = counts[self.kind.slot()].saturating_sub(1);
            live.set(counts);
        });
        tracing::trace!("Finalized {}", self.kind.name());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_follow_lifetime() {
        assert_eq!(live_count(ResourceKind::Pattern), 0);

        let a = Finalizer::new(ResourceKind::Pattern);
        let b = Finalizer::new(ResourceKind::Pattern);
        assert_eq!(live_count(ResourceKind::Pattern), 2);
        assert_eq!(live_count(ResourceKind::Path), 0);

        drop(a);
        assert_eq!(live_count(ResourceKind::Pattern), 1);
        drop(b);
        assert_eq!(live_count(ResourceKind::Pattern), 0);
    }

    #[test]
    fn test_finalizer_runs_after_children() {
        struct Child<'a>(&'a Cell<bool>);
        impl Drop for Child<'_> {
            fn drop(&mut self) {
                assert_eq!(live_count(ResourceKind::Image), 1);
                self.0.set(true);
            }
        }

        struct Object<'a> {
            _child: Child<'a>,
            _finalizer: Finalizer,
        }

        let dropped = Cell::new(false);
        let object = Object {
            _child: Child(&dropped),
            _finalizer: Finalizer::new(ResourceKind::Image),
        };
        drop(object);

        assert!(dropped.get());
        assert_eq!(live_count(ResourceKind::Image), 0);
    }

    #[test]
    fn test_names() {
        let names: Vec<_> = ResourceKind::ALL.iter().map(|k| k.name()).collect();
        assert_eq!(names, ["Canvas", "Image", "Font", "Pattern", "Path"]);
    }
}
