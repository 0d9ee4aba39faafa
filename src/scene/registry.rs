use glam::Vec3;
use rand::Rng;

use crate::config::{EditorConfig, SpawnConfig};
use crate::scene::color::Color;
use crate::scene::geometry::MeshData;
use crate::scene::object::{HelperKind, ObjectId, PrimitiveKind, SceneObject, Shape};
use crate::scene::resources::GpuResources;

/// Everything needed to bring a removed object back with its original id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectSnapshot {
    pub id: ObjectId,
    pub kind: PrimitiveKind,
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
    pub color: Color,
}

/// Owns every object in the scene together with its GPU resources.
///
/// The grid and axes helpers live here too, flagged as non-pickable helpers,
/// and are hidden from [`SceneObjectRegistry::objects`].
pub struct SceneObjectRegistry {
    objects: Vec<SceneObject>,
    next_id: u64,
    spawn: SpawnConfig,
}

impl SceneObjectRegistry {
    pub fn new(config: &EditorConfig, resources: &mut dyn GpuResources) -> Self {
        let mut registry = Self {
            objects: Vec::new(),
            next_id: 0,
            spawn: config.spawn,
        };

        registry.insert_helper(
            HelperKind::Grid,
            &MeshData::grid(config.grid_size, config.grid_divisions),
            resources,
        );
        registry.insert_helper(
            HelperKind::Axes,
            &MeshData::axes(config.axes_length),
            resources,
        );

        registry
    }

    fn allocate_id(&mut self) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        id
    }

    fn insert_helper(
        &mut self,
        helper: HelperKind,
        mesh: &MeshData,
        resources: &mut dyn GpuResources,
    ) {
        let id = self.allocate_id();
        let geometry = resources.create_geometry(mesh);
        let material = resources.create_material(mesh.name);

        self.objects.push(SceneObject {
            id,
            shape: Shape::Helper(helper),
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            color: Color::WHITE,
            geometry,
            material,
            helper: true,
            pickable: false,
            visible: true,
        });
    }

    fn insert_primitive(&mut self, snapshot: ObjectSnapshot, resources: &mut dyn GpuResources) {
        let mesh = MeshData::primitive(snapshot.kind);
        let geometry = resources.create_geometry(&mesh);
        let material = resources.create_material(&snapshot.id.to_string());

        self.objects.push(SceneObject {
            id: snapshot.id,
            shape: Shape::Primitive(snapshot.kind),
            position: snapshot.position,
            rotation: snapshot.rotation,
            scale: snapshot.scale,
            color: snapshot.color,
            geometry,
            material,
            helper: false,
            pickable: true,
            visible: true,
        });
    }

    /// Places a new primitive at a random spot with a random color.
    pub fn add(
        &mut self,
        kind: PrimitiveKind,
        rng: &mut impl Rng,
        resources: &mut dyn GpuResources,
    ) -> ObjectId {
        let extent = self.spawn.horizontal_extent;
        let position = Vec3::new(
            rng.gen_range(-extent..=extent),
            rng.gen_range(0.0..=self.spawn.max_height),
            rng.gen_range(-extent..=extent),
        );
        let color = Color::from_hex(rng.gen_range(0..=0xffffff));

        let id = self.allocate_id();
        self.insert_primitive(
            ObjectSnapshot {
                id,
                kind,
                position,
                rotation: Vec3::ZERO,
                scale: Vec3::ONE,
                color,
            },
            resources,
        );

        log::debug!("Added {} {id} at {position}", kind.name());
        id
    }

    /// Like [`Self::add`], but takes the type by name. Unknown names add nothing.
    pub fn add_named(
        &mut self,
        name: &str,
        rng: &mut impl Rng,
        resources: &mut dyn GpuResources,
    ) -> Option<ObjectId> {
        match name.parse::<PrimitiveKind>() {
            Ok(kind) => Some(self.add(kind, rng, resources)),
            Err(e) => {
                log::debug!("Not adding object: {e}");
                None
            }
        }
    }

    /// Re-inserts a previously removed object under its old id. Does nothing if
    /// the id is already live.
    pub fn restore(&mut self, snapshot: ObjectSnapshot, resources: &mut dyn GpuResources) -> bool {
        if self.contains(snapshot.id) {
            return false;
        }

        self.insert_primitive(snapshot, resources);
        true
    }

    /// Removes a placed object and releases its geometry and material.
    /// Absent ids and helpers are left alone.
    pub fn remove(&mut self, id: ObjectId, resources: &mut dyn GpuResources) -> Option<ObjectSnapshot> {
        let index = self
            .objects
            .iter()
            .position(|object| object.id == id && !object.helper)?;

        let snapshot = Self::snapshot_of(&self.objects[index])?;
        let object = self.objects.remove(index);

        resources.release_geometry(object.geometry);
        resources.release_material(object.material);

        log::debug!("Removed {id}");
        Some(snapshot)
    }

    /// Releases every object, helpers included.
    pub fn clear(&mut self, resources: &mut dyn GpuResources) {
        for object in self.objects.drain(..) {
            resources.release_geometry(object.geometry);
            resources.release_material(object.material);
        }
    }

    pub fn update_color(&mut self, id: ObjectId, color: Color) -> bool {
        match self.get_mut(id) {
            Some(object) => {
                object.color = color;
                true
            }
            None => false,
        }
    }

    /// The only place object positions are written.
    pub fn translate(&mut self, id: ObjectId, delta: Vec3) -> bool {
        match self.get_mut(id) {
            Some(object) => {
                object.position += delta;
                true
            }
            None => false,
        }
    }

    pub fn set_helper_visible(&mut self, helper: HelperKind, visible: bool) {
        for object in &mut self.objects {
            if object.shape == Shape::Helper(helper) {
                object.visible = visible;
            }
        }
    }

    pub fn helper_visible(&self, helper: HelperKind) -> bool {
        self.objects
            .iter()
            .any(|object| object.shape == Shape::Helper(helper) && object.visible)
    }

    pub fn snapshot(&self, id: ObjectId) -> Option<ObjectSnapshot> {
        self.get(id).and_then(Self::snapshot_of)
    }

    fn snapshot_of(object: &SceneObject) -> Option<ObjectSnapshot> {
        Some(ObjectSnapshot {
            id: object.id,
            kind: object.kind()?,
            position: object.position,
            rotation: object.rotation,
            scale: object.scale,
            color: object.color,
        })
    }

    /// Placed objects only, helpers never show up here.
    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects
            .iter()
            .find(|object| object.id == id && !object.helper)
    }

    fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects
            .iter_mut()
            .find(|object| object.id == id && !object.helper)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.get(id).is_some()
    }

    pub fn objects(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.iter().filter(|object| !object.helper)
    }

    pub fn pickable(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects
            .iter()
            .filter(|object| object.pickable && object.visible && !object.helper)
    }

    /// Every entry including helpers, in insertion order.
    pub fn iter_all(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.iter()
    }

    pub fn len(&self) -> usize {
        self.objects().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
