// SPDX-License-Identifier: MPL-2.0
//! Maps a toast's place in the stack to its visual transform.
//!
//! Rank 0 is the newest toast, drawn in front. Toasts deeper than
//! [`CULL_RANK`] stay in the stack but are fully transparent.

use super::entity::Toast;

/// First rank that is no longer visible.
pub const CULL_RANK: usize = 3;

/// Transform applied to one toast by the rendering surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Presentation {
    /// Downward shift in logical pixels.
    pub vertical_offset: f32,
    pub scale: f32,
    pub opacity: f32,
}

/// Starting point of the entrance animation.
pub const ENTERING: Presentation = Presentation::new(-50.0, 0.8, 0.0);

/// End point of the exit animation.
pub const EXITING: Presentation = Presentation::new(0.0, 0.8, 0.0);

const STACK: [Presentation; CULL_RANK + 1] = [
    Presentation::new(0.0, 1.0, 1.0),
    Presentation::new(10.0, 0.9, 1.0),
    Presentation::new(15.0, 0.8, 1.0),
    Presentation::new(20.0, 0.7, 0.0),
];

impl Presentation {
    #[must_use]
    pub const fn new(vertical_offset: f32, scale: f32, opacity: f32) -> Self {
        Self {
            vertical_offset,
            scale,
            opacity,
        }
    }

    /// Transform for a toast at `rank` from the top of the stack.
    #[must_use]
    pub fn for_rank(rank: usize) -> Self {
        STACK[rank.min(CULL_RANK)]
    }

    /// Like [`for_rank`](Self::for_rank), but entering and exiting toasts
    /// take their animation transform regardless of rank.
    #[must_use]
    pub fn for_toast<C>(toast: &Toast<C>, rank: usize) -> Self {
        if toast.is_opening() {
            ENTERING
        } else if toast.is_closing() {
            EXITING
        } else {
            Self::for_rank(rank)
        }
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.opacity > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{assert_relative_eq, F32_EPSILON};
    use crate::toast::{ToastId, ToastPatch};
    use std::time::Duration;

    #[test]
    fn ranks_map_to_fixed_transforms() {
        let expected: [(f32, f32, f32); 5] = [
            (0.0, 1.0, 1.0),
            (10.0, 0.9, 1.0),
            (15.0, 0.8, 1.0),
            (20.0, 0.7, 0.0),
            (20.0, 0.7, 0.0),
        ];
        for (rank, (offset, scale, opacity)) in expected.into_iter().enumerate() {
            let p = Presentation::for_rank(rank);
            assert_relative_eq!(p.vertical_offset, offset, epsilon = F32_EPSILON);
            assert_relative_eq!(p.scale, scale, epsilon = F32_EPSILON);
            assert_relative_eq!(p.opacity, opacity, epsilon = F32_EPSILON);
        }
    }

    #[test]
    fn deep_ranks_are_culled() {
        assert!(Presentation::for_rank(CULL_RANK - 1).is_visible());
        assert!(!Presentation::for_rank(CULL_RANK).is_visible());
        assert_eq!(Presentation::for_rank(usize::MAX), Presentation::for_rank(CULL_RANK));
    }

    #[test]
    fn animation_overrides_rank() {
        let opening = Toast::new(ToastId::new(1), (), Duration::ZERO);
        let closing = opening.patched(ToastPatch::closing());
        let idle = opening.patched(ToastPatch::settled());

        assert_eq!(Presentation::for_toast(&opening, 0), ENTERING);
        assert_eq!(Presentation::for_toast(&closing, 2), EXITING);
        assert_eq!(Presentation::for_toast(&idle, 1), Presentation::for_rank(1));
    }
}
