/// Scene objects.
///
/// An object is a closed variant (camera, light source, prop, world) plus
/// the set of components it is composed of. The constructors attach the
/// components each variant needs:
///
/// | Variant     | Components        |
/// |-------------|-------------------|
/// | Camera      | Position          |
/// | LightSource | Position          |
/// | Prop        | Position, Model   |
/// | World       | Skybox            |

use glam::Vec3;
use slotmap::new_key_type;
use crate::scene::{
    Component, ComponentSet, PositionComponent, ModelComponent, SkyboxComponent,
};

new_key_type! {
    /// Stable key for an Object within a Scene
    pub struct ObjectKey;
}

/// Projection parameters of a camera (angles in radians)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraParams {
    /// Vertical field of view
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraParams {
    fn default() -> Self {
        Self {
            fov_y: std::f32::consts::FRAC_PI_3,
            near: 0.1,
            far: 1000.0,
        }
    }
}

/// Shape of a light's emission
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    /// Omnidirectional, shadowed through six cube faces
    Point,
    /// Spot light; `angle` is the full opening angle in radians
    Cone { angle: f32 },
    /// Area light projected orthographically
    Rectangle { width: f32, height: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightParams {
    pub kind: LightKind,
    pub color: Vec3,
    /// Reach of the light, also the shadow far plane
    pub range: f32,
    pub enabled: bool,
}

impl LightParams {
    pub fn new(kind: LightKind) -> Self {
        Self {
            kind,
            color: Vec3::ONE,
            range: 50.0,
            enabled: true,
        }
    }

    pub fn with_color(mut self, color: Vec3) -> Self {
        self.color = color;
        self
    }

    pub fn with_range(mut self, range: f32) -> Self {
        self.range = range;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObjectVariant {
    Camera(CameraParams),
    LightSource(LightParams),
    Prop,
    World,
}

impl ObjectVariant {
    pub fn label(&self) -> &'static str {
        match self {
            ObjectVariant::Camera(_) => "Camera",
            ObjectVariant::LightSource(_) => "LightSource",
            ObjectVariant::Prop => "Prop",
            ObjectVariant::World => "World",
        }
    }
}

pub struct Object {
    name: String,
    variant: ObjectVariant,
    components: ComponentSet,
}

impl Object {
    /// Object with no components
    pub fn new(name: impl Into<String>, variant: ObjectVariant) -> Self {
        Self {
            name: name.into(),
            variant,
            components: ComponentSet::new(),
        }
    }

    pub fn camera(name: impl Into<String>, params: CameraParams) -> Self {
        Self::new(name, ObjectVariant::Camera(params))
            .with_component(Component::Position(PositionComponent::default()))
    }

    pub fn light(name: impl Into<String>, params: LightParams) -> Self {
        Self::new(name, ObjectVariant::LightSource(params))
            .with_component(Component::Position(PositionComponent::default()))
    }

    /// Prop without a mesh yet (invisible until one is set)
    pub fn prop(name: impl Into<String>) -> Self {
        Self::new(name, ObjectVariant::Prop)
            .with_component(Component::Position(PositionComponent::default()))
            .with_component(Component::Model(ModelComponent::default()))
    }

    pub fn world(name: impl Into<String>, skybox: SkyboxComponent) -> Self {
        Self::new(name, ObjectVariant::World)
            .with_component(Component::Skybox(skybox))
    }

    pub fn with_component(mut self, component: Component) -> Self {
        self.components.insert(component);
        self
    }

    /// Set the translation (no-op without a position component)
    pub fn at(mut self, translation: Vec3) -> Self {
        if let Some(position) = self.components.position_mut() {
            position.translation = translation;
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name, or the variant label for unnamed objects
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            self.variant.label()
        } else {
            &self.name
        }
    }

    pub fn variant(&self) -> &ObjectVariant {
        &self.variant
    }

    pub fn variant_mut(&mut self) -> &mut ObjectVariant {
        &mut self.variant
    }

    pub fn components(&self) -> &ComponentSet {
        &self.components
    }

    pub fn components_mut(&mut self) -> &mut ComponentSet {
        &mut self.components
    }

    pub fn is_camera(&self) -> bool {
        matches!(self.variant, ObjectVariant::Camera(_))
    }

    /// Light parameters if this is a light source
    pub fn light_params_mut(&mut self) -> Option<&mut LightParams> {
        match &mut self.variant {
            ObjectVariant::LightSource(params) => Some(params),
            _ => None,
        }
    }
}
