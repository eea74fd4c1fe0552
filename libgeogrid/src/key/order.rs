/// Outcome of comparing two partially ordered ranges
///
/// Unlike a total ordering, two ranges can be [`RangeOrdering::Incomparable`]:
/// they overlap without being identical, including the case where they share
/// only an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeOrdering {
    /// The whole range lies strictly below the other
    Less,
    /// The ranges are identical
    Equal,
    /// The whole range lies strictly above the other
    More,
    /// The ranges overlap without being identical
    Incomparable,
}

impl RangeOrdering {
    /// Whether the result is [`RangeOrdering::Less`]
    #[must_use]
    pub const fn is_less(self) -> bool {
        matches!(self, Self::Less)
    }

    /// Whether the result is [`RangeOrdering::More`]
    #[must_use]
    pub const fn is_more(self) -> bool {
        matches!(self, Self::More)
    }

    /// Whether the result is anything but [`RangeOrdering::Incomparable`]
    #[must_use]
    pub const fn is_comparable(self) -> bool {
        !matches!(self, Self::Incomparable)
    }
}
