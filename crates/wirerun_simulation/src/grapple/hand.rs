//! Hand tag + per-hand storage (левая/правая рука)

use std::ops::{Index, IndexMut};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum Hand {
    Left,
    Right,
}

impl Hand {
    pub const ALL: [Hand; 2] = [Hand::Left, Hand::Right];

    fn index(self) -> usize {
        match self {
            Hand::Left => 0,
            Hand::Right => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Hand::Left => "left",
            Hand::Right => "right",
        }
    }
}

/// Fixed-size storage по одному значению на руку
///
/// Общая логика пишется один раз через `Hand` ключ, без зеркальных
/// left/right полей.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HandSlots<T> {
    slots: [T; 2],
}

impl<T> HandSlots<T> {
    pub fn new(left: T, right: T) -> Self {
        Self { slots: [left, right] }
    }

    pub fn from_fn(mut f: impl FnMut(Hand) -> T) -> Self {
        Self::new(f(Hand::Left), f(Hand::Right))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Hand, &T)> {
        Hand::ALL.into_iter().zip(self.slots.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Hand, &mut T)> {
        Hand::ALL.into_iter().zip(self.slots.iter_mut())
    }

    pub fn map<U>(&self, mut f: impl FnMut(Hand, &T) -> U) -> HandSlots<U> {
        HandSlots::from_fn(|hand| f(hand, &self[hand]))
    }
}

impl<T> Index<Hand> for HandSlots<T> {
    type Output = T;

    fn index(&self, hand: Hand) -> &T {
        &self.slots[hand.index()]
    }
}

impl<T> IndexMut<Hand> for HandSlots<T> {
    fn index_mut(&mut self, hand: Hand) -> &mut T {
        &mut self.slots[hand.index()]
    }
}
