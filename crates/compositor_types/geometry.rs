/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use crate::rational::Rational;

/// A rectangle in the unit square, interpreted against the enclosing
/// canvas or region dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub left: Rational,
    pub top: Rational,
    pub width: Rational,
    pub height: Rational,
}

impl Rect {
    pub fn new(left: Rational, top: Rational, width: Rational, height: Rational) -> Self {
        Rect {
            left,
            top,
            width,
            height,
        }
    }

    pub fn full() -> Self {
        Rect::new(
            Rational::zero(),
            Rational::zero(),
            Rational::whole(),
            Rational::whole(),
        )
    }
}

/// A circle in the unit square. Accepted by the data model but never
/// rendered (§9 open question — preserved as-is).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Circle {
    pub center_x: Rational,
    pub center_y: Rational,
    pub radius: Rational,
}

/// The shape tag of a `Region`. Kept alongside `Area` (rather than only
/// inferring it from the `Area` variant) because callers sometimes need to
/// check the shape without matching on geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Rectangle,
    Circle,
}

/// The area of a region, tagged by shape so a `Region` can never carry a
/// `shape` field that disagrees with its geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Area {
    Rectangle(Rect),
    Circle(Circle),
}

impl Area {
    pub fn shape(&self) -> Shape {
        match self {
            Area::Rectangle(_) => Shape::Rectangle,
            Area::Circle(_) => Shape::Circle,
        }
    }

    pub fn as_rect(&self) -> Option<Rect> {
        match self {
            Area::Rectangle(rect) => Some(*rect),
            Area::Circle(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub id: String,
    pub area: Area,
}

impl Region {
    pub fn rectangle(id: impl Into<String>, rect: Rect) -> Self {
        Region {
            id: id.into(),
            area: Area::Rectangle(rect),
        }
    }

    pub fn shape(&self) -> Shape {
        self.area.shape()
    }
}
