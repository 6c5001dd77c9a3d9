//! Ordered layering of child effects

use heapless::Vec;

use super::{Children, FxId};
use crate::error::FxError;

/// Renders its children in list order, later ones blending over earlier ones
///
/// Start and stop reach every child unconditionally. The traversal itself
/// lives in [`super::EffectTree`], which owns the children.
#[derive(Debug, Clone)]
pub struct CompositeEffect {
    children: Children,
}

impl CompositeEffect {
    /// Fails with [`FxError::ResourceExhausted`] past [`crate::MAX_CHILDREN`] children
    pub fn new(children: &[FxId]) -> Result<Self, FxError> {
        let children = Vec::from_slice(children).map_err(|()| FxError::ResourceExhausted)?;
        Ok(Self { children })
    }

    pub fn children(&self) -> &[FxId] {
        &self.children
    }

    pub(super) fn children_list(&self) -> Children {
        self.children.clone()
    }
}
