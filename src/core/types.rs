//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Perception-assigned object identifier
///
/// Only stable within one perception cycle. Never carry one across snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub u32);

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Perception cycle counter
pub type Cycle = u64;

/// 3D position in meters
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Same x/y, z raised by `dz`
    pub fn lifted(&self, dz: f32) -> Self {
        Self { z: self.z + dz, ..*self }
    }

    pub fn distance(&self, other: &Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

impl From<[f32; 3]> for Position {
    fn from(v: [f32; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl std::ops::Add for Position {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self { x: self.x + rhs.x, y: self.y + rhs.y, z: self.z + rhs.z }
    }
}

/// One perceived object as delivered by perception for a single cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectDescriptor {
    pub id: ObjectId,
    /// Canonical name, e.g. "red"
    pub name: String,
    /// Extra descriptor variants from perception ("crimson cube", "left cube");
    /// the candidate builder adds its template expansions of `name` in front
    pub descriptors: Vec<String>,
    pub position: Position,
    /// Yaw in radians
    pub yaw: f32,
    pub visible: bool,
}

impl ObjectDescriptor {
    /// Visible object with no extra descriptors
    pub fn new(id: ObjectId, name: impl Into<String>, position: Position, yaw: f32) -> Self {
        Self {
            id,
            name: name.into().trim().to_lowercase(),
            descriptors: Vec::new(),
            position,
            yaw,
            visible: true,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn with_descriptors(mut self, descriptors: Vec<String>) -> Self {
        self.descriptors = descriptors;
        self
    }
}

/// The complete object set of one perception cycle
///
/// Replaced wholesale every cycle. Objects are never patched in place.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneSnapshot {
    pub cycle: Cycle,
    objects: Vec<ObjectDescriptor>,
}

impl SceneSnapshot {
    pub fn new(cycle: Cycle, objects: Vec<ObjectDescriptor>) -> Self {
        Self { cycle, objects }
    }

    pub fn objects(&self) -> &[ObjectDescriptor] {
        &self.objects
    }

    /// Visible objects in perception order
    pub fn visible(&self) -> impl Iterator<Item = &ObjectDescriptor> {
        self.objects.iter().filter(|o| o.visible)
    }

    pub fn visible_count(&self) -> usize {
        self.visible().count()
    }

    pub fn get(&self, id: ObjectId) -> Option<&ObjectDescriptor> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn position_of(&self, id: ObjectId) -> Option<Position> {
        self.get(id).map(|o| o.position)
    }

    /// Next cycle's snapshot; ids from this one must not be reused against it
    pub fn succeed(&self, objects: Vec<ObjectDescriptor>) -> Self {
        Self::new(self.cycle + 1, objects)
    }
}
