use std::collections::HashMap;

use crate::catalog::{self, MetaPixelType};
use crate::error_codes::MetaPixelError;
use crate::meta_pixel::MetaPixel;

/// Ordered metapixels keyed by type id, at most one per type.
///
/// `order` and `pixels` always hold the same id set. Position in `order` is
/// the persisted row, and a `Randomized` entry modifies the entry right
/// before it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetaPixelDocument {
    order: Vec<u8>,
    pixels: HashMap<u8, MetaPixel>,
}

impl MetaPixelDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a metapixel of `kind` decoded from a zero channel pair.
    pub fn add(&mut self, kind: &'static MetaPixelType) -> Result<&mut MetaPixel, MetaPixelError> {
        self.insert(MetaPixel::new(kind, 0, 0))
    }

    /// Appends an already built metapixel.
    pub fn insert(&mut self, pixel: MetaPixel) -> Result<&mut MetaPixel, MetaPixelError> {
        let id = pixel.id();
        if self.pixels.contains_key(&id) {
            return Err(MetaPixelError::DuplicateType {
                id,
                name: pixel.name(),
            });
        }
        self.order.push(id);
        Ok(self.pixels.entry(id).or_insert(pixel))
    }

    pub fn remove(&mut self, id: u8) -> Option<MetaPixel> {
        let pixel = self.pixels.remove(&id)?;
        self.order.retain(|existing| *existing != id);
        Some(pixel)
    }

    /// Swaps `id` with its predecessor, wrapping the first entry to the end.
    pub fn move_up(&mut self, id: u8) -> bool {
        self.swap_with_neighbor(id, |index, len| (index + len - 1) % len)
    }

    /// Swaps `id` with its successor, wrapping the last entry to the front.
    pub fn move_down(&mut self, id: u8) -> bool {
        self.swap_with_neighbor(id, |index, len| (index + 1) % len)
    }

    fn swap_with_neighbor(&mut self, id: u8, neighbor: impl Fn(usize, usize) -> usize) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        let target = neighbor(index, self.order.len());
        self.order.swap(index, target);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetaPixel> + '_ {
        self.order.iter().filter_map(|id| self.pixels.get(id))
    }

    pub fn get(&self, id: u8) -> Option<&MetaPixel> {
        self.pixels.get(&id)
    }

    pub fn get_mut(&mut self, id: u8) -> Option<&mut MetaPixel> {
        self.pixels.get_mut(&id)
    }

    /// Like [`Self::get_mut`], failing with `MissingType` when the type is absent.
    pub fn require_mut(&mut self, kind: &'static MetaPixelType) -> Result<&mut MetaPixel, MetaPixelError> {
        self.pixels
            .get_mut(&kind.id)
            .ok_or(MetaPixelError::MissingType {
                id: kind.id,
                name: kind.name,
            })
    }

    pub fn contains(&self, id: u8) -> bool {
        self.pixels.contains_key(&id)
    }

    pub fn position(&self, id: u8) -> Option<usize> {
        self.order.iter().position(|existing| *existing == id)
    }

    pub fn ids(&self) -> &[u8] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Catalog types that can still be added, in catalog order.
    pub fn available_types(&self) -> Vec<&'static MetaPixelType> {
        catalog::all()
            .iter()
            .filter(|kind| !self.contains(kind.id))
            .collect()
    }
}
