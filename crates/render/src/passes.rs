use orbitlab_scene::DepthConvention;

/// Draw passes of one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pass {
    /// Visible cube instances, one indexed-instanced draw.
    Opaque,
    /// Cubemap sphere behind everything already drawn.
    Sky,
    /// Blended quads, tested against but not written to depth.
    Transparent,
    /// Offscreen color resampled onto the backbuffer.
    PostProcess,
    Present,
}

/// Execution order of a frame. Backends iterate this instead of hard-coding it.
pub const FRAME_PASSES: [Pass; 5] = [
    Pass::Opaque,
    Pass::Sky,
    Pass::Transparent,
    Pass::PostProcess,
    Pass::Present,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassTarget {
    /// Offscreen color + depth.
    Offscreen,
    Backbuffer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthState {
    pub compare: CompareOp,
    pub write: bool,
}

impl Pass {
    pub fn name(self) -> &'static str {
        match self {
            Pass::Opaque => "opaque",
            Pass::Sky => "sky",
            Pass::Transparent => "transparent",
            Pass::PostProcess => "postprocess",
            Pass::Present => "present",
        }
    }

    pub fn target(self) -> PassTarget {
        match self {
            Pass::Opaque | Pass::Sky | Pass::Transparent => PassTarget::Offscreen,
            Pass::PostProcess | Pass::Present => PassTarget::Backbuffer,
        }
    }

    /// Depth test for this pass, `None` when the pass has no depth attachment.
    ///
    /// The sky is drawn at the far depth, so it only lands where the depth
    /// buffer still holds the clear value.
    pub fn depth_state(self, convention: DepthConvention) -> Option<DepthState> {
        let reversed = convention == DepthConvention::Reversed;
        let (compare, write) = match self {
            Pass::Opaque | Pass::Sky if reversed => (CompareOp::GreaterEqual, self == Pass::Opaque),
            Pass::Opaque | Pass::Sky => (CompareOp::LessEqual, self == Pass::Opaque),
            Pass::Transparent if reversed => (CompareOp::Greater, false),
            Pass::Transparent => (CompareOp::Less, false),
            Pass::PostProcess | Pass::Present => return None,
        };
        Some(DepthState { compare, write })
    }
}

impl std::fmt::Display for Pass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pass_order() {
        let names: Vec<_> = FRAME_PASSES.iter().map(|p| p.name()).collect();
        assert_eq!(
            names,
            ["opaque", "sky", "transparent", "postprocess", "present"]
        );
    }

    #[test]
    fn offscreen_passes_come_first() {
        let split = FRAME_PASSES
            .iter()
            .position(|p| p.target() == PassTarget::Backbuffer)
            .unwrap();
        assert!(FRAME_PASSES[..split].iter().all(|p| p.target() == PassTarget::Offscreen));
        assert!(FRAME_PASSES[split..].iter().all(|p| p.target() == PassTarget::Backbuffer));
    }

    #[test]
    fn reversed_depth_states() {
        let conv = DepthConvention::Reversed;
        assert_eq!(
            Pass::Opaque.depth_state(conv),
            Some(DepthState { compare: CompareOp::GreaterEqual, write: true })
        );
        assert_eq!(
            Pass::Sky.depth_state(conv),
            Some(DepthState { compare: CompareOp::GreaterEqual, write: false })
        );
        assert_eq!(
            Pass::Transparent.depth_state(conv),
            Some(DepthState { compare: CompareOp::Greater, write: false })
        );
        assert_eq!(Pass::PostProcess.depth_state(conv), None);
    }

    #[test]
    fn standard_depth_states_mirror_reversed() {
        let conv = DepthConvention::Standard;
        assert_eq!(Pass::Opaque.depth_state(conv).unwrap().compare, CompareOp::LessEqual);
        assert_eq!(Pass::Transparent.depth_state(conv).unwrap().compare, CompareOp::Less);
        assert!(!Pass::Sky.depth_state(conv).unwrap().write);
    }
}
