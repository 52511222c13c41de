use glow::HasContext;

/// Generation-checked handle into the [`TextureArena`].
///
/// Handles stay `Copy` and survive in figures while the underlying GL
/// texture may already be retired; `TextureArena::get` returns `None` for
/// stale generations instead of handing out a recycled texture.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TextureHandle {
    index: u32,
    generation: u32,
}

impl TextureHandle {
    #[cfg(test)]
    pub(crate) fn for_tests(index: u32) -> Self {
        Self { index, generation: 0 }
    }
}

#[derive(Debug)]
struct Slot {
    texture: Option<glow::Texture>,
    generation: u32,
}

/// Arena of GL textures with deferred deletion.
///
/// [`dispose`] only marks a handle as retired; the GL delete happens in
/// [`drain_retired`], which runs at checkpoints where nothing is bound:
/// before a texture is created, and at frame start ahead of any model
/// rebuild. This keeps figure code free to drop textures at any time
/// without needing the context to be current.
///
/// [`dispose`]: TextureArena::dispose
/// [`drain_retired`]: TextureArena::drain_retired
#[derive(Debug, Default)]
pub struct TextureArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    retired: Vec<u32>,
}

impl TextureArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a texture and returns its handle.
    pub fn insert(&mut self, texture: glow::Texture) -> TextureHandle {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            debug_assert!(slot.texture.is_none());
            slot.texture = Some(texture);
            return TextureHandle { index, generation: slot.generation };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot { texture: Some(texture), generation: 0 });
        TextureHandle { index, generation: 0 }
    }

    /// Resolves a handle, `None` if it was disposed (or is foreign).
    pub fn get(&self, handle: TextureHandle) -> Option<glow::Texture> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.texture
    }

    /// Marks a handle for deletion at the next checkpoint. Disposing an
    /// already stale handle is a no-op.
    pub fn dispose(&mut self, handle: TextureHandle) {
        let Some(slot) = self.slots.get_mut(handle.index as usize) else {
            return;
        };
        if slot.generation != handle.generation || slot.texture.is_none() {
            return;
        }
        if !self.retired.contains(&handle.index) {
            self.retired.push(handle.index);
        }
    }

    /// Deletes all retired textures. The context must be current.
    ///
    /// Freed slots bump their generation and return to the free list, so
    /// stale handles can never resolve to a recycled texture.
    pub fn drain_retired(&mut self, gl: &glow::Context) {
        for index in self.retired.drain(..) {
            let slot = &mut self.slots[index as usize];
            if let Some(texture) = slot.texture.take() {
                unsafe { gl.delete_texture(texture) };
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(index);
            }
        }
    }

    /// Deletes everything, retired or not. Called on context teardown.
    pub fn destroy(&mut self, gl: &glow::Context) {
        for slot in &mut self.slots {
            if let Some(texture) = slot.texture.take() {
                unsafe { gl.delete_texture(texture) };
            }
        }
        self.slots.clear();
        self.free.clear();
        self.retired.clear();
    }

    /// Live (not yet disposed) texture count.
    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|s| s.texture.is_some()).count() - self.retired.len()
    }

    /// Textures awaiting deletion.
    pub fn retired_count(&self) -> usize {
        self.retired.len()
    }
}
