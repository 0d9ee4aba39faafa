use crate::scene::geometry::MeshData;

/// Owned token for an uploaded mesh. Not `Clone`: releasing consumes it, so a
/// geometry can only ever be released once.
#[derive(Debug, PartialEq, Eq)]
pub struct GeometryHandle(u32);

impl GeometryHandle {
    pub fn slot(&self) -> u32 {
        self.0
    }
}

/// Owned token for a per-object material (uniform buffer + bind group).
#[derive(Debug, PartialEq, Eq)]
pub struct MaterialHandle(u32);

impl MaterialHandle {
    pub fn slot(&self) -> u32 {
        self.0
    }

    pub fn key(&self) -> MaterialKey {
        MaterialKey(self.0)
    }
}

/// Copyable identity of a material, for comparing without owning it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialKey(u32);

/// Allocator for the GPU side of scene objects.
pub trait GpuResources {
    fn create_geometry(&mut self, mesh: &MeshData) -> GeometryHandle;
    fn create_material(&mut self, label: &str) -> MaterialHandle;
    fn release_geometry(&mut self, handle: GeometryHandle);
    fn release_material(&mut self, handle: MaterialHandle);
}

/// Slot storage backing the handles. Freed slots are recycled.
pub struct Slots<T> {
    entries: Vec<Option<T>>,
    free: Vec<u32>,
}

impl<T> Slots<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            free: Vec::new(),
        }
    }

    fn insert(&mut self, value: T) -> u32 {
        match self.free.pop() {
            Some(slot) => {
                self.entries[slot as usize] = Some(value);
                slot
            }
            None => {
                self.entries.push(Some(value));
                (self.entries.len() - 1) as u32
            }
        }
    }

    fn take(&mut self, slot: u32) -> Option<T> {
        let value = self.entries.get_mut(slot as usize)?.take();
        if value.is_some() {
            self.free.push(slot);
        }
        value
    }

    pub fn insert_geometry(&mut self, value: T) -> GeometryHandle {
        GeometryHandle(self.insert(value))
    }

    pub fn insert_material(&mut self, value: T) -> MaterialHandle {
        MaterialHandle(self.insert(value))
    }

    pub fn take_geometry(&mut self, handle: GeometryHandle) -> Option<T> {
        self.take(handle.0)
    }

    pub fn take_material(&mut self, handle: MaterialHandle) -> Option<T> {
        self.take(handle.0)
    }

    pub fn get(&self, slot: u32) -> Option<&T> {
        self.entries.get(slot as usize).and_then(Option::as_ref)
    }

    pub fn live(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_some()).count()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
        self.free.clear();
        self.entries.drain(..).flatten()
    }
}

impl<T> Default for Slots<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;

    /// Bookkeeping-only allocator. Panics on a double release so tests catch it.
    #[derive(Default)]
    pub struct CountingResources {
        geometries: Slots<&'static str>,
        materials: Slots<String>,
        pub geometries_created: usize,
        pub materials_created: usize,
        pub geometries_released: usize,
        pub materials_released: usize,
    }

    impl CountingResources {
        pub fn live_geometries(&self) -> usize {
            self.geometries.live()
        }

        pub fn live_materials(&self) -> usize {
            self.materials.live()
        }
    }

    impl GpuResources for CountingResources {
        fn create_geometry(&mut self, mesh: &MeshData) -> GeometryHandle {
            self.geometries_created += 1;
            self.geometries.insert_geometry(mesh.name)
        }

        fn create_material(&mut self, label: &str) -> MaterialHandle {
            self.materials_created += 1;
            self.materials.insert_material(label.to_string())
        }

        fn release_geometry(&mut self, handle: GeometryHandle) {
            let slot = handle.slot();
            assert!(
                self.geometries.take_geometry(handle).is_some(),
                "geometry slot {slot} released twice"
            );
            self.geometries_released += 1;
        }

        fn release_material(&mut self, handle: MaterialHandle) {
            let slot = handle.slot();
            assert!(
                self.materials.take_material(handle).is_some(),
                "material slot {slot} released twice"
            );
            self.materials_released += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_recycle_released_entries() {
        let mut slots = Slots::new();
        let a = slots.insert_geometry("a");
        let b = slots.insert_geometry("b");
        assert_eq!(slots.live(), 2);

        let a_slot = a.slot();
        assert_eq!(slots.take_geometry(a), Some("a"));
        assert_eq!(slots.live(), 1);

        let c = slots.insert_geometry("c");
        assert_eq!(c.slot(), a_slot);
        assert_eq!(slots.get(b.slot()), Some(&"b"));
    }

    #[test]
    fn drain_empties_all_slots() {
        let mut slots = Slots::new();
        let _ = slots.insert_material(1);
        let _ = slots.insert_material(2);
        let drained: Vec<i32> = slots.drain().collect();
        assert_eq!(drained, vec![1, 2]);
        assert_eq!(slots.live(), 0);
    }
}
