//! Game-phase segmentation.

/// A statistics scope: the whole game or one phase slice of it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Scope {
    Overall,
    Opening,
    Middle,
    End,
}

impl Scope {
    pub const COUNT: usize = 4;
    pub const ALL: [Scope; Scope::COUNT] =
        [Scope::Overall, Scope::Opening, Scope::Middle, Scope::End];

    pub(crate) fn index(self) -> usize {
        match self {
            Scope::Overall => 0,
            Scope::Opening => 1,
            Scope::Middle => 2,
            Scope::End => 3,
        }
    }

    /// File-name suffix used by the report writer. Overall has none.
    pub fn suffix(self) -> &'static str {
        match self {
            Scope::Overall => "",
            Scope::Opening => "_opening",
            Scope::Middle => "_middle",
            Scope::End => "_end",
        }
    }
}

/// Configurable phase boundaries: a ply is opening below `opening_max`,
/// middle below `middle_max`, endgame otherwise.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseSchedule {
    opening_max: usize,
    middle_max: usize,
}

impl Default for PhaseSchedule {
    fn default() -> Self {
        Self {
            opening_max: Self::DEFAULT_OPENING_MAX,
            middle_max: Self::DEFAULT_MIDDLE_MAX,
        }
    }
}

impl PhaseSchedule {
    pub const DEFAULT_OPENING_MAX: usize = 12;
    pub const DEFAULT_MIDDLE_MAX: usize = 44;

    pub fn new(opening_max: usize, middle_max: usize) -> Result<Self, &'static str> {
        if opening_max == 0 || opening_max >= middle_max {
            return Err("phase boundaries must satisfy 0 < opening < middle");
        }
        Ok(Self {
            opening_max,
            middle_max,
        })
    }

    /// The phase scope of a ply. Never returns `Overall`.
    pub fn classify(&self, ply: usize) -> Scope {
        if ply < self.opening_max {
            Scope::Opening
        } else if ply < self.middle_max {
            Scope::Middle
        } else {
            Scope::End
        }
    }
}
