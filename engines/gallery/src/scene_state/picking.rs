use lib_geometry::{Camera, Ray};

use super::Sprite;

/// Tracks which sprite the pointer is hovering, if any.
///
/// The pick itself is a nearest-hit ray test against the sprites' billboard
/// quads; the state machine part makes hover transitions explicit so the
/// scene can undo the previous selection's decoration exactly once.
#[derive(Debug, Default)]
pub(crate) struct Picker {
    selection: Option<usize>,
}

/// What changed as a result of the latest pointer position.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum HoverChange {
    /// Same sprite (or no sprite) as before.
    Unchanged,
    /// The pointer left the previously hovered sprite.
    Deselected { previous: usize },
    /// A new sprite is hovered; `previous` needs its decoration removed.
    Selected {
        previous: Option<usize>,
        next: usize,
    },
}

impl Picker {
    pub(crate) fn selection(&self) -> Option<usize> {
        self.selection
    }

    /// The index of the sprite closest to the ray origin that the ray hits.
    pub(crate) fn nearest_hit(ray: &Ray, sprites: &[Sprite], camera: &Camera) -> Option<usize> {
        sprites
            .iter()
            .enumerate()
            .filter_map(|(index, sprite)| {
                ray.intersect_billboard(sprite.position, sprite.half_extents, camera)
                    .map(|distance| (index, distance))
            })
            .min_by(|left, right| left.1.total_cmp(&right.1))
            .map(|(index, _)| index)
    }

    /// Feeds the latest hit into the state machine and reports the transition.
    pub(crate) fn hover(&mut self, hit: Option<usize>) -> HoverChange {
        match (self.selection, hit) {
            (None, None) => HoverChange::Unchanged,
            (Some(previous), Some(next)) if previous == next => HoverChange::Unchanged,
            (Some(previous), None) => {
                self.selection = None;
                HoverChange::Deselected { previous }
            }
            (previous, Some(next)) => {
                self.selection = Some(next);
                HoverChange::Selected { previous, next }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{HoverChange, Picker};

    #[test]
    fn hovering_nothing_stays_unchanged() {
        let mut picker = Picker::default();
        assert_eq!(picker.hover(None), HoverChange::Unchanged);
        assert_eq!(picker.selection(), None);
    }

    #[test]
    fn first_hit_selects() {
        let mut picker = Picker::default();
        assert_eq!(
            picker.hover(Some(2)),
            HoverChange::Selected {
                previous: None,
                next: 2
            }
        );
        assert_eq!(picker.selection(), Some(2));
    }

    #[test]
    fn repeated_hit_is_idempotent() {
        let mut picker = Picker::default();
        picker.hover(Some(1));
        assert_eq!(picker.hover(Some(1)), HoverChange::Unchanged);
        assert_eq!(picker.selection(), Some(1));
    }

    #[test]
    fn switching_reports_previous_selection() {
        let mut picker = Picker::default();
        picker.hover(Some(0));
        assert_eq!(
            picker.hover(Some(1)),
            HoverChange::Selected {
                previous: Some(0),
                next: 1
            }
        );
    }

    #[test]
    fn leaving_deselects() {
        let mut picker = Picker::default();
        picker.hover(Some(0));
        assert_eq!(picker.hover(None), HoverChange::Deselected { previous: 0 });
        assert_eq!(picker.selection(), None);
    }
}
