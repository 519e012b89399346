//! Filter decision.

use norma_core::enums::UnidadTipo;

const MIN_KEPT_LENGTH: usize = 200;
const NOISE_PROMOTION_LENGTH: usize = 500;

/// Outcome of `should_keep_semantic_unit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterDecision {
    /// Keep with the classified type.
    Keep { unidad_tipo: UnidadTipo },
    /// Text was noise-like but long enough to be worth keeping as `OTROS`.
    PromoteToOtros,
    Drop { reason: &'static str },
}

/// `shouldKeepSemanticUnit(unidad_tipo, text, hasChildrenWithContent,
/// looksNoise)`.
#[must_use]
pub fn should_keep_semantic_unit(
    unidad_tipo: UnidadTipo,
    text: &str,
    has_children_with_content: bool,
    looks_noise: bool,
) -> FilterDecision {
    if text.is_empty() {
        return FilterDecision::Drop { reason: "empty_text" };
    }

    if text.chars().count() < MIN_KEPT_LENGTH && !has_children_with_content {
        return FilterDecision::Drop { reason: "too_short" };
    }

    if looks_noise {
        return if text.chars().count() >= NOISE_PROMOTION_LENGTH {
            FilterDecision::PromoteToOtros
        } else {
            FilterDecision::Drop { reason: "noise_filtered" }
        };
    }

    FilterDecision::Keep { unidad_tipo }
}
