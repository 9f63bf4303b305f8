/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use compositor_types::{Area, InputRegion, LayoutSolution, Rational, Rect, Region};

/// Ticks closing 20% of the remaining distance per step (§4.3.3).
const SPEED: i64 = 5;

/// Interpolates one coordinate's numerator toward `target`'s, at a shared
/// denominator. `current` and `target` need not share a denominator on
/// entry.
///
/// Truncating integer division toward zero means `diff / SPEED` is exactly
/// zero whenever `0 < |diff| < SPEED`; left unchecked that stalls forever.
/// Per the convergence property in §8 (property 5: "snaps exactly when the
/// residual is < 1"), a zero step snaps straight to the target instead.
fn tween_rational(current: Rational, target: Rational) -> Rational {
    let shared_denominator = current.denominator.max(target.denominator).max(1000);
    let current = current.rescale(shared_denominator);
    let target = target.rescale(shared_denominator);

    if current.numerator == target.numerator {
        return current;
    }

    let diff = target.numerator as i64 - current.numerator as i64;
    let step = diff / SPEED;
    let numerator = if step == 0 {
        target.numerator as i64
    } else {
        current.numerator as i64 + step
    };
    Rational::new(numerator as u32, shared_denominator)
}

fn tween_rect(current: Rect, target: Rect) -> Rect {
    Rect::new(
        tween_rational(current.left, target.left),
        tween_rational(current.top, target.top),
        tween_rational(current.width, target.width),
        tween_rational(current.height, target.height),
    )
}

/// Advances `current` one tick toward `target` per §4.3.3: new entries and
/// non-rectangle regions snap in unchanged; matching rectangle entries
/// interpolate; entries absent from `target` are dropped with no exit
/// tween.
pub(crate) fn tween_layout(current: &LayoutSolution, target: &LayoutSolution) -> LayoutSolution {
    target
        .iter()
        .map(|target_ir| {
            let previous = current
                .iter()
                .find(|current_ir| current_ir.input == target_ir.input);

            let (Some(previous), Some(target_rect)) =
                (previous, target_ir.region.area.as_rect())
            else {
                return target_ir.clone();
            };

            let Some(current_rect) = previous.region.area.as_rect() else {
                return target_ir.clone();
            };

            InputRegion::new(
                target_ir.input,
                Region {
                    id: target_ir.region.id.clone(),
                    area: Area::Rectangle(tween_rect(current_rect, target_rect)),
                },
            )
        })
        .collect()
}
