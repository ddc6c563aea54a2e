//! Materials with one effect per render phase
//!
//! A single material participates in both geometry passes; which effect
//! applies is selected by the `PassKind` value handed to the render call,
//! never by mutable flags on the material itself.

use crate::backend::traits::{BindGroupHandle, RenderPipelineHandle};
use crate::backend::types::MaterialUniform;
use glam::Vec4;

/// Render phases a material can participate in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassKind {
    GBuffer,
    FinalPass,
}

/// A compiled effect: pipeline plus the resources bound at group 2 and the
/// stencil reference applied before drawing
#[derive(Debug, Clone, Copy)]
pub struct Effect {
    pub pipeline: RenderPipelineHandle,
    pub material_bind_group: BindGroupHandle,
    pub stencil_reference: u32,
}

/// Scene material: per-pass effects plus the specular constants shared by
/// both of them
#[derive(Debug, Clone)]
pub struct Material {
    pub name: String,
    pub specular_albedo: f32,
    pub specular_power: f32,
    gbuffer: Option<Effect>,
    final_pass: Option<Effect>,
}

impl Material {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            specular_albedo: 0.75,
            specular_power: 32.0,
            gbuffer: None,
            final_pass: None,
        }
    }

    pub fn with_specular(mut self, albedo: f32, power: f32) -> Self {
        self.specular_albedo = albedo;
        self.specular_power = power;
        self
    }

    pub fn set_effect(&mut self, pass: PassKind, effect: Effect) {
        match pass {
            PassKind::GBuffer => self.gbuffer = Some(effect),
            PassKind::FinalPass => self.final_pass = Some(effect),
        }
    }

    /// The effect for the given pass. Exactly one variant applies per
    /// geometry pass; a material without an effect for a pass does not
    /// participate in it.
    pub fn effect(&self, pass: PassKind) -> Option<&Effect> {
        match pass {
            PassKind::GBuffer => self.gbuffer.as_ref(),
            PassKind::FinalPass => self.final_pass.as_ref(),
        }
    }

    /// Uniform constants shared by the G-Buffer and final pass shaders
    pub fn uniform_data(&self) -> MaterialUniform {
        MaterialUniform {
            specular: Vec4::new(self.specular_albedo, self.specular_power, 0.0, 0.0),
        }
    }
}
