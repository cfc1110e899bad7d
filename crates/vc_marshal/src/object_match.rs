use core::fmt;

// -----------------------------------------------------------------------------
// ObjectMatch

/// How well a wire value matches a candidate reconstruction.
///
/// The ordering goes from best to worst: `Exact < Coercible < Approximate <
/// Impossible`. `Impossible` rejects the candidate.
///
/// Aggregates are combined with [`worse_of`](Self::worse_of), so a
/// container is never reported as a better match than its weakest element.
///
/// # Examples
///
/// ```
/// use vc_marshal::ObjectMatch;
///
/// let fields = [ObjectMatch::Exact, ObjectMatch::Approximate, ObjectMatch::Coercible];
/// assert_eq!(ObjectMatch::fold(fields), ObjectMatch::Approximate);
/// assert_eq!(ObjectMatch::fold([]), ObjectMatch::Exact);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum ObjectMatch {
    /// The wire value has exactly the expected shape.
    #[default]
    Exact,
    /// The value can be rebuilt through a lossless coercion,
    /// e.g. the string `"true"` read as a boolean.
    Coercible,
    /// The value can be rebuilt, but not faithfully,
    /// e.g. a number read as its string form.
    Approximate,
    /// The value cannot be rebuilt by this candidate.
    Impossible,
}

impl ObjectMatch {
    /// Returns the more degraded of the two matches.
    #[inline]
    #[must_use]
    pub const fn worse_of(self, other: Self) -> Self {
        if (self as u8) >= (other as u8) {
            self
        } else {
            other
        }
    }

    /// Folds matches with [`worse_of`](Self::worse_of), starting from
    /// [`Exact`](Self::Exact).
    pub fn fold(matches: impl IntoIterator<Item = Self>) -> Self {
        matches.into_iter().fold(Self::Exact, Self::worse_of)
    }

    /// Whether the candidate can rebuild the value at all.
    #[inline]
    pub const fn is_possible(self) -> bool {
        !matches!(self, Self::Impossible)
    }
}

impl fmt::Display for ObjectMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Exact => "exact",
            Self::Coercible => "coercible",
            Self::Approximate => "approximate",
            Self::Impossible => "impossible",
        })
    }
}

// -----------------------------------------------------------------------------
// Tests
