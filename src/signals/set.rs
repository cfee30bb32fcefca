//! # Compact set of signal kinds.
//!
//! [`SignalSet`] is a bitset over [`SignalKind`]. It is `Copy`, and union is
//! associative, commutative and idempotent, which is what strategy merging relies on.

use std::fmt;
use std::ops::BitOr;

use super::SignalKind;

/// A set of [`SignalKind`]s.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SignalSet(u8);

impl SignalSet {
    /// The empty set.
    pub const EMPTY: Self = Self(0);

    /// `Subscribe`, `Request`, `Cancel`.
    pub const UPSTREAM: Self = Self(
        SignalKind::Subscribe.bit() | SignalKind::Request.bit() | SignalKind::Cancel.bit(),
    );

    /// `OnSubscribe`, `OnNext`, `OnComplete`, `OnError`.
    pub const DOWNSTREAM: Self = Self(
        SignalKind::OnSubscribe.bit()
            | SignalKind::OnNext.bit()
            | SignalKind::OnComplete.bit()
            | SignalKind::OnError.bit(),
    );

    /// Every signal kind.
    pub const ALL: Self = Self(Self::UPSTREAM.0 | Self::DOWNSTREAM.0);

    /// Creates a set holding a single kind.
    #[inline]
    pub const fn of(kind: SignalKind) -> Self {
        Self(kind.bit())
    }

    /// Returns a copy of this set with `kind` added.
    #[must_use]
    #[inline]
    pub const fn with(self, kind: SignalKind) -> Self {
        Self(self.0 | kind.bit())
    }

    /// Set union.
    #[must_use]
    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Returns `true` if `kind` is in the set.
    #[inline]
    pub const fn contains(self, kind: SignalKind) -> bool {
        self.0 & kind.bit() != 0
    }

    /// Returns `true` if any kind of `other` is in the set.
    #[inline]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterates the kinds in the set, upstream first.
    pub fn iter(self) -> impl Iterator<Item = SignalKind> {
        SignalKind::ALL
            .into_iter()
            .filter(move |kind| self.contains(*kind))
    }
}

impl BitOr for SignalSet {
    type Output = SignalSet;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl FromIterator<SignalKind> for SignalSet {
    fn from_iter<I: IntoIterator<Item = SignalKind>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, Self::with)
    }
}

impl From<SignalKind> for SignalSet {
    fn from(kind: SignalKind) -> Self {
        Self::of(kind)
    }
}

impl fmt::Debug for SignalSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
