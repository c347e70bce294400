//! Built-in demonstration scenarios.
//!
//! Applied through bulk replacement: Need is derived by
//! [`AllocationState::from_parts`], never stored here.

use banker_types::{AllocationState, Dimensions, StateError, Units};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    pub slug: &'static str,
    pub name: &'static str,
    pub available: &'static [Units],
    pub max: &'static [&'static [Units]],
    pub allocation: &'static [&'static [Units]],
}

impl Preset {
    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.max.len(), self.available.len())
    }

    pub fn to_state(&self) -> Result<AllocationState, StateError> {
        AllocationState::from_parts(
            self.dimensions(),
            self.available.to_vec(),
            owned_rows(self.max),
            owned_rows(self.allocation),
        )
    }
}

fn owned_rows(matrix: &[&[Units]]) -> Vec<Vec<Units>> {
    matrix.iter().map(|row| row.to_vec()).collect()
}

const PRESETS: &[Preset] = &[
    Preset {
        slug: "textbook-safe",
        name: "Safe State Example",
        available: &[3, 3, 2],
        max: &[&[7, 5, 3], &[3, 2, 2], &[9, 0, 2], &[2, 2, 2], &[4, 3, 3]],
        allocation: &[&[0, 1, 0], &[2, 0, 0], &[3, 0, 2], &[2, 1, 1], &[0, 0, 2]],
    },
    Preset {
        slug: "textbook-unsafe",
        name: "Unsafe State Example",
        available: &[0, 0],
        max: &[&[3, 3], &[2, 2], &[2, 2]],
        allocation: &[&[2, 2], &[1, 1], &[1, 1]],
    },
    Preset {
        slug: "banking-loans",
        name: "Banking Scenario: Safe Loans",
        available: &[500_000, 300_000, 200_000],
        max: &[
            &[300_000, 100_000, 50_000],
            &[200_000, 150_000, 75_000],
            &[400_000, 80_000, 30_000],
            &[250_000, 120_000, 60_000],
        ],
        allocation: &[
            &[100_000, 50_000, 20_000],
            &[150_000, 80_000, 40_000],
            &[200_000, 30_000, 10_000],
            &[100_000, 60_000, 30_000],
        ],
    },
];

#[must_use]
pub fn all() -> &'static [Preset] {
    PRESETS
}

/// Case-insensitive lookup by slug.
#[must_use]
pub fn find(slug: &str) -> Option<&'static Preset> {
    let slug = slug.trim();
    PRESETS
        .iter()
        .find(|preset| preset.slug.eq_ignore_ascii_case(slug))
}
