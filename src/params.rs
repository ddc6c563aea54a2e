//! Named shader-visible parameter store
//!
//! A keyed map of values that effects resolve by name when their bind
//! groups are built. The orchestrator writes time and texture parameters
//! here; passes read them instead of holding resource references directly.

use crate::backend::traits::{SamplerHandle, TextureViewHandle};
use glam::Vec4;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    Scalar(f32),
    Vector(Vec4),
    Texture(TextureViewHandle),
    Sampler(SamplerHandle),
}

/// Parameter names written by the frame orchestrator
pub const PARAM_TIME_FACTORS: &str = "TimeFactors";
pub const PARAM_DIFFUSE_MAP: &str = "DiffuseMap";
pub const PARAM_NORMAL_MAP: &str = "NormalMap";
pub const PARAM_ANISO_SAMPLER: &str = "AnisoSampler";

#[derive(Debug, Default)]
pub struct ParameterStore {
    params: HashMap<String, ParamValue>,
}

impl ParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_scalar(&mut self, name: &str, value: f32) {
        self.params.insert(name.to_string(), ParamValue::Scalar(value));
    }

    pub fn set_vector(&mut self, name: &str, value: Vec4) {
        self.params.insert(name.to_string(), ParamValue::Vector(value));
    }

    pub fn set_texture(&mut self, name: &str, view: TextureViewHandle) {
        self.params.insert(name.to_string(), ParamValue::Texture(view));
    }

    pub fn set_sampler(&mut self, name: &str, sampler: SamplerHandle) {
        self.params
            .insert(name.to_string(), ParamValue::Sampler(sampler));
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name)
    }

    pub fn scalar(&self, name: &str) -> Option<f32> {
        match self.params.get(name) {
            Some(ParamValue::Scalar(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn vector(&self, name: &str) -> Option<Vec4> {
        match self.params.get(name) {
            Some(ParamValue::Vector(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn texture(&self, name: &str) -> Option<TextureViewHandle> {
        match self.params.get(name) {
            Some(ParamValue::Texture(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn sampler(&self, name: &str) -> Option<SamplerHandle> {
        match self.params.get(name) {
            Some(ParamValue::Sampler(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}
