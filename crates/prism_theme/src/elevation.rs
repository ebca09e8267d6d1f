//! Elevation composition
//!
//! Each elevation level (0-4) stores four token indirections (blur,
//! spread, offset-x, offset-y) plus a shadow color/opacity pair. An axis
//! marked `scale-by-default` ignores the level's own token and instead
//! advances level 0's token `level` steps along the canonical size scale,
//! clamping at the top of the scale.
//!
//! The shadow color is emitted as a transparency mix over the resolved
//! base color rather than a pre-multiplied rgba literal, so a later edit
//! of the opacity token re-renders without recomputing the color.

use prism_core::Value;
use serde::Deserialize;
use serde_json::Value as Json;
use tracing::debug;

use crate::reference::Collection;
use crate::resolver::{ResolveError, Resolver};

/// Number of elevation levels.
pub const ELEVATION_LEVELS: usize = 5;

/// Canonical size-scale ordering used by `scale-by-default` advancement.
pub const SIZE_SCALE: &[&str] = &["none", "0.5x", "default", "1x", "1.5x", "2x", "3x", "4x"];

/// The four token-driven shadow axes.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum ElevationAxis {
    Blur,
    Spread,
    OffsetX,
    OffsetY,
}

impl ElevationAxis {
    pub const ALL: [ElevationAxis; 4] = [
        ElevationAxis::Blur,
        ElevationAxis::Spread,
        ElevationAxis::OffsetX,
        ElevationAxis::OffsetY,
    ];

    /// Output-variable suffix for this axis.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Blur => "blur",
            Self::Spread => "spread",
            Self::OffsetX => "offset-x",
            Self::OffsetY => "offset-y",
        }
    }
}

/// One axis of one level: the stored token identity and the scaling flag.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AxisSpec {
    /// Token identity, e.g. `size/1x`.
    pub token: String,
    #[serde(default)]
    pub scale_by_default: bool,
}

/// One level's stored spec, deserialized from the brand document.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ElevationSpec {
    pub blur: AxisSpec,
    pub spread: AxisSpec,
    pub offset_x: AxisSpec,
    pub offset_y: AxisSpec,
    /// Base shadow color: a literal or a reference string.
    pub shadow_color: Json,
    /// Shadow opacity: a literal number or a reference string.
    pub shadow_opacity: Json,
}

impl ElevationSpec {
    pub fn axis(&self, axis: ElevationAxis) -> &AxisSpec {
        match axis {
            ElevationAxis::Blur => &self.blur,
            ElevationAxis::Spread => &self.spread,
            ElevationAxis::OffsetX => &self.offset_x,
            ElevationAxis::OffsetY => &self.offset_y,
        }
    }
}

/// Advance `steps` along the canonical scale, clamping at the top.
/// `None` when the segment is not on the scale at all.
fn advance_on_scale(segment: &str, steps: usize) -> Option<&'static str> {
    let index = SIZE_SCALE.iter().position(|entry| *entry == segment)?;
    Some(SIZE_SCALE[(index + steps).min(SIZE_SCALE.len() - 1)])
}

/// Resolve one axis of one level. `base` is level 0's spec (the scaling
/// origin); for level 0 itself the two coincide.
pub fn resolve_axis(
    resolver: &Resolver<'_>,
    base: &ElevationSpec,
    spec: &ElevationSpec,
    level: usize,
    axis: ElevationAxis,
) -> Result<Value, ResolveError> {
    let own = spec.axis(axis);
    if own.scale_by_default {
        let origin = &base.axis(axis).token;
        let mut segments: Vec<String> = origin.split('/').map(str::to_string).collect();
        match segments.last().map(|last| advance_on_scale(last, level)) {
            Some(Some(scaled)) => {
                if let Some(last) = segments.last_mut() {
                    *last = scaled.to_string();
                }
                return resolver.resolve(Collection::Tokens, &segments);
            }
            _ => {
                debug!(
                    token = %origin,
                    "scaling origin is not on the size scale; using the level's own token"
                );
            }
        }
    }
    resolver.resolve_token(&own.token)
}

/// Compose the shadow color variable for one level: the resolved base
/// color mixed to the resolved opacity over transparency.
pub fn shadow_color(resolver: &Resolver<'_>, spec: &ElevationSpec) -> Result<Value, ResolveError> {
    let base = resolver.resolve_raw(&spec.shadow_color)?;
    let opacity = resolver.resolve_raw(&spec.shadow_opacity)?;
    let fraction = opacity.as_number().ok_or_else(|| {
        ResolveError::UnresolvedPath(format!("shadow opacity `{opacity}` is not a number"))
    })?;
    let percent = Value::Number(fraction * 100.0);
    Ok(Value::Text(format!(
        "color-mix(in srgb, {base} {percent}%, transparent)"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentSet;
    use crate::overrides::Overrides;
    use serde_json::json;

    fn size_tokens() -> Json {
        json!({
            "size": {
                "none": 0, "0.5x": 2, "default": 4, "1x": 8,
                "1.5x": 12, "2x": 16, "3x": 24, "4x": 32
            },
            "color": { "shadow": "#10131a" },
            "opacity": { "shadow": 0.35 }
        })
    }

    fn axis(token: &str, scale: bool) -> Json {
        json!({ "token": token, "scale-by-default": scale })
    }

    fn level(blur: Json) -> ElevationSpec {
        serde_json::from_value(json!({
            "blur": blur,
            "spread": axis("size/none", false),
            "offset-x": axis("size/none", false),
            "offset-y": axis("size/none", false),
            "shadow-color": "{tokens.color.shadow}",
            "shadow-opacity": "{tokens.opacity.shadow}"
        }))
        .unwrap()
    }

    #[test]
    fn unscaled_axis_uses_the_levels_own_token() {
        let documents = DocumentSet::new(size_tokens(), json!({}), json!({}));
        let overrides = Overrides::new();
        let resolver = Resolver::new(&documents, &overrides);
        let base = level(axis("size/0.5x", false));
        let own = level(axis("size/2x", false));
        assert_eq!(
            resolve_axis(&resolver, &base, &own, 3, ElevationAxis::Blur),
            Ok(Value::Number(16.0))
        );
    }

    #[test]
    fn scaled_axis_advances_from_level_zero() {
        let documents = DocumentSet::new(size_tokens(), json!({}), json!({}));
        let overrides = Overrides::new();
        let resolver = Resolver::new(&documents, &overrides);
        let base = level(axis("size/0.5x", true));
        // Level 3, three steps above `0.5x`: `1.5x`.
        assert_eq!(
            resolve_axis(&resolver, &base, &base, 3, ElevationAxis::Blur),
            Ok(Value::Number(12.0))
        );
    }

    #[test]
    fn scaling_clamps_at_the_top_of_the_scale() {
        let documents = DocumentSet::new(size_tokens(), json!({}), json!({}));
        let overrides = Overrides::new();
        let resolver = Resolver::new(&documents, &overrides);
        let base = level(axis("size/2x", true));
        // Four steps above `2x` runs off the scale; clamp to `4x`.
        assert_eq!(
            resolve_axis(&resolver, &base, &base, 4, ElevationAxis::Blur),
            Ok(Value::Number(32.0))
        );
    }

    #[test]
    fn off_scale_origin_falls_back_to_the_levels_own_token() {
        let documents = DocumentSet::new(
            json!({ "size": { "md": 6, "none": 0 } }),
            json!({}),
            json!({}),
        );
        let overrides = Overrides::new();
        let resolver = Resolver::new(&documents, &overrides);
        let base = level(axis("size/md", true));
        assert_eq!(
            resolve_axis(&resolver, &base, &base, 2, ElevationAxis::Blur),
            Ok(Value::Number(6.0))
        );
    }

    #[test]
    fn shadow_color_is_a_transparency_mix() {
        let documents = DocumentSet::new(size_tokens(), json!({}), json!({}));
        let overrides = Overrides::new();
        let resolver = Resolver::new(&documents, &overrides);
        let spec = level(axis("size/none", false));
        assert_eq!(
            shadow_color(&resolver, &spec),
            Ok(Value::Text(
                "color-mix(in srgb, #10131a 35%, transparent)".to_string()
            ))
        );
    }
}
