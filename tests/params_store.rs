//! Named parameter store: typed reads only succeed against matching writes

use glam::Vec4;
use prepass_renderer::backend::traits::{SamplerHandle, TextureViewHandle};
use prepass_renderer::params::{ParameterStore, PARAM_DIFFUSE_MAP, PARAM_TIME_FACTORS};

#[test]
fn typed_accessors_round_trip() {
    let mut store = ParameterStore::new();

    store.set_scalar("Exposure", 1.25);
    store.set_vector(PARAM_TIME_FACTORS, Vec4::new(0.016, 60.0, 1.0, 60.0));
    store.set_texture(PARAM_DIFFUSE_MAP, TextureViewHandle::from_raw(7));
    store.set_sampler("AnisoSampler", SamplerHandle::from_raw(9));

    assert_eq!(store.scalar("Exposure"), Some(1.25));
    assert_eq!(
        store.vector(PARAM_TIME_FACTORS),
        Some(Vec4::new(0.016, 60.0, 1.0, 60.0))
    );
    assert_eq!(
        store.texture(PARAM_DIFFUSE_MAP),
        Some(TextureViewHandle::from_raw(7))
    );
    assert_eq!(store.sampler("AnisoSampler"), Some(SamplerHandle::from_raw(9)));
    assert_eq!(store.len(), 4);
}

#[test]
fn mismatched_type_reads_return_none() {
    let mut store = ParameterStore::new();
    store.set_scalar("Exposure", 1.0);

    assert_eq!(store.vector("Exposure"), None);
    assert_eq!(store.texture("Exposure"), None);
    assert_eq!(store.sampler("Exposure"), None);
    assert_eq!(store.scalar("Missing"), None);
}

#[test]
fn later_writes_replace_earlier_ones() {
    let mut store = ParameterStore::new();
    store.set_scalar("Exposure", 1.0);
    store.set_scalar("Exposure", 2.0);

    assert_eq!(store.scalar("Exposure"), Some(2.0));
    assert_eq!(store.len(), 1);
}
