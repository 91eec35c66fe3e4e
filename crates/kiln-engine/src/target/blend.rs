use crate::backend::{BlendEquation as Op, BlendFactor as F, BlendState, Features};

/// Preset blend functions.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum BlendMode {
    #[default]
    Normal,
    Multiply,
    Add,
    Subtract,
    AddColor,
    SubtractColor,
    Difference,
    Punchout,
    Cutout,
}

impl BlendMode {
    /// Backend features the mode depends on.
    pub fn required_features(self) -> Features {
        match self {
            BlendMode::Normal | BlendMode::Add => Features::empty(),
            BlendMode::Multiply | BlendMode::AddColor => Features::BLEND_FUNC_SEPARATE,
            BlendMode::Subtract | BlendMode::Punchout | BlendMode::Cutout => Features::BLEND_EQUATIONS,
            BlendMode::SubtractColor | BlendMode::Difference => {
                Features::BLEND_FUNC_SEPARATE | Features::BLEND_EQUATIONS
            }
        }
    }

    pub fn is_supported(self, features: Features) -> bool {
        features.contains(self.required_features())
    }

    pub fn state(self) -> BlendState {
        match self {
            BlendMode::Normal => BlendState::NORMAL,
            BlendMode::Multiply => BlendState::separate(F::DstColor, F::Zero, F::SrcAlpha, F::OneMinusSrcAlpha, Op::Add),
            BlendMode::Add => BlendState::new(F::One, F::One, Op::Add),
            BlendMode::Subtract => BlendState::new(F::One, F::One, Op::Subtract),
            BlendMode::AddColor => BlendState::separate(F::One, F::One, F::SrcAlpha, F::OneMinusSrcAlpha, Op::Add),
            BlendMode::SubtractColor => {
                BlendState::separate(F::One, F::One, F::OneMinusSrcAlpha, F::SrcAlpha, Op::Subtract)
            }
            BlendMode::Difference => BlendState::separate(F::One, F::One, F::One, F::Zero, Op::Subtract),
            BlendMode::Punchout => BlendState::new(F::SrcAlpha, F::OneMinusSrcAlpha, Op::ReverseSubtract),
            BlendMode::Cutout => BlendState::new(F::OneMinusSrcAlpha, F::SrcAlpha, Op::ReverseSubtract),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_modes_need_nothing() {
        assert!(BlendMode::Normal.is_supported(Features::empty()));
        assert!(BlendMode::Add.is_supported(Features::empty()));
    }

    #[test]
    fn equation_modes_are_gated() {
        assert!(!BlendMode::Subtract.is_supported(Features::BLEND_FUNC_SEPARATE));
        assert!(!BlendMode::Difference.is_supported(Features::BLEND_EQUATIONS));
        assert!(BlendMode::Difference.is_supported(Features::BLEND_EQUATIONS | Features::BLEND_FUNC_SEPARATE));
    }

    #[test]
    fn punchout_reverse_subtracts() {
        assert_eq!(BlendMode::Punchout.state().equation, Op::ReverseSubtract);
    }
}
