use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Stable handle to a soft body stored in a [`BodyArena`].
///
/// The generation is bumped whenever a slot is vacated, so a handle kept
/// after `remove` no longer resolves even if the slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct BodyId {
    index: usize,
    generation: u32,
}

impl BodyId {
    pub fn new(index: usize, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn is_null(&self) -> bool {
        self.index == usize::MAX
    }
}

impl Default for BodyId {
    fn default() -> Self {
        Self::new(usize::MAX, 0)
    }
}

/// Generational slot storage, iterated in slot order.
#[derive(Debug, Clone)]
pub struct BodyArena<T> {
    slots: Vec<Option<T>>,
    generations: Vec<u32>,
    free_list: VecDeque<usize>,
}

impl<T> Default for BodyArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> BodyArena<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            generations: Vec::new(),
            free_list: VecDeque::new(),
        }
    }

    pub fn insert(&mut self, item: T) -> BodyId {
        if let Some(index) = self.free_list.pop_front() {
            self.slots[index] = Some(item);
            return BodyId::new(index, self.generations[index]);
        }

        let index = self.slots.len();
        self.slots.push(Some(item));
        self.generations.push(0);
        BodyId::new(index, 0)
    }

    pub fn get(&self, id: BodyId) -> Option<&T> {
        if !self.contains(id) {
            return None;
        }
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut T> {
        if !self.contains(id) {
            return None;
        }
        self.slots.get_mut(id.index()).and_then(Option::as_mut)
    }

    pub fn remove(&mut self, id: BodyId) -> Option<T> {
        if !self.contains(id) {
            return None;
        }
        let item = self.slots[id.index()].take()?;
        self.generations[id.index()] = self.generations[id.index()].wrapping_add(1);
        self.free_list.push_back(id.index());
        Some(item)
    }

    pub fn contains(&self, id: BodyId) -> bool {
        self.generations
            .get(id.index())
            .is_some_and(|&generation| generation == id.generation())
            && self.slots[id.index()].is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.slots.iter().filter_map(Option::as_ref)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> + '_ {
        self.slots.iter_mut().filter_map(Option::as_mut)
    }

    pub fn ids(&self) -> impl Iterator<Item = BodyId> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.as_ref()
                .map(|_| BodyId::new(index, self.generations[index]))
        })
    }

    pub fn len(&self) -> usize {
        self.slots.len() - self.free_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
