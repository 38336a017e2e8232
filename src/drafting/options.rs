use tracing::debug;

use crate::error::InputError;

use super::classify::ClassifyFlags;

/// Line weights assigned to the class layers.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightPolicy {
    /// Weight unit `w0` of the gradient.
    pub base_weight: f64,
    /// Gradient exponent `p`.
    pub exponent: f64,
    /// Weight of the hidden layer; `None` falls back to `base_weight`.
    pub hidden_weight: Option<f64>,
    /// Name of the line pattern requested for the hidden layer.
    pub hidden_pattern: String,
}

impl Default for WeightPolicy {
    fn default() -> Self {
        Self {
            base_weight: 0.1,
            exponent: 1.5,
            hidden_weight: None,
            hidden_pattern: "Hidden".into(),
        }
    }
}

impl WeightPolicy {
    /// Weight of the class at ordinal `index` among `count` visible classes,
    /// heaviest first: `base_weight * (count - index)^exponent`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn weight(&self, index: usize, count: usize) -> f64 {
        let rank = count.saturating_sub(index) as f64;
        self.base_weight * rank.powf(self.exponent)
    }

    /// Weight of the hidden layer.
    #[must_use]
    pub fn hidden(&self) -> f64 {
        self.hidden_weight.unwrap_or(self.base_weight)
    }

    fn validate(&self) -> Result<(), InputError> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.base_weight) {
            return Err(InputError::InvalidWeightPolicy(format!(
                "base weight must be positive, got {}",
                self.base_weight
            )));
        }
        if !positive(self.exponent) {
            return Err(InputError::InvalidWeightPolicy(format!(
                "exponent must be positive, got {}",
                self.exponent
            )));
        }
        if let Some(w) = self.hidden_weight.filter(|w| !positive(*w)) {
            return Err(InputError::InvalidWeightPolicy(format!(
                "hidden weight must be positive, got {w}"
            )));
        }
        Ok(())
    }
}

/// Names of the fixed layers of the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerNames {
    /// Top-level layer.
    pub root: String,
    /// Parent of the visible class layers.
    pub visible: String,
    /// Layer for hidden lines.
    pub hidden: String,
}

impl Default for LayerNames {
    fn default() -> Self {
        Self {
            root: "Linework".into(),
            visible: "Visible".into(),
            hidden: "Hidden".into(),
        }
    }
}

/// Settings for one drawing run.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawingOptions {
    /// Geometric tolerance for every query.
    pub tolerance: f64,
    /// Emit hidden lines on the hidden layer.
    pub include_hidden_lines: bool,
    /// Emit section cuts from clipping planes.
    pub include_clipping_cuts: bool,
    /// Emit the silhouette of the whole scene. Suppresses clipping cuts.
    pub include_scene_silhouette: bool,
    /// Ask the projection for tangent-transition edges.
    pub include_tangent_edges: bool,
    /// Split outlines and convex edges where they meet other objects.
    pub intersection_segmentation: bool,
    /// Line weights.
    pub weights: WeightPolicy,
    /// Layer naming.
    pub layer_names: LayerNames,
}

impl Default for DrawingOptions {
    fn default() -> Self {
        Self {
            tolerance: 0.001,
            include_hidden_lines: false,
            include_clipping_cuts: false,
            include_scene_silhouette: false,
            include_tangent_edges: true,
            intersection_segmentation: true,
            weights: WeightPolicy::default(),
            layer_names: LayerNames::default(),
        }
    }
}

/// The optional stages a run actually performs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct Capabilities {
    /// Hidden lines are projected and kept.
    pub hidden: bool,
    /// Section cuts are projected and kept.
    pub clipping: bool,
    /// The scene silhouette is projected.
    pub scene_silhouette: bool,
    /// Intersection curves re-partition outlines and convex edges.
    pub intersection_segmentation: bool,
}

impl Capabilities {
    /// Flags handed to the classifier.
    #[must_use]
    pub fn classify_flags(&self) -> ClassifyFlags {
        ClassifyFlags {
            include_hidden: self.hidden,
            include_cuts: self.clipping,
        }
    }
}

impl DrawingOptions {
    /// Checks tolerance and weight policy.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::InvalidTolerance`] for a non-positive or
    /// non-finite tolerance and [`InputError::InvalidWeightPolicy`] for a
    /// non-positive weight or exponent.
    pub fn validate(&self) -> Result<(), InputError> {
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(InputError::InvalidTolerance(self.tolerance));
        }
        self.weights.validate()
    }

    /// Resolves the stages to run. Scene silhouette and clipping cuts are
    /// mutually exclusive; the silhouette wins.
    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        let clipping = self.include_clipping_cuts && !self.include_scene_silhouette;
        if self.include_clipping_cuts && !clipping {
            debug!("scene silhouette requested, suppressing clipping cuts");
        }
        Capabilities {
            hidden: self.include_hidden_lines,
            clipping,
            scene_silhouette: self.include_scene_silhouette,
            intersection_segmentation: self.intersection_segmentation,
        }
    }
}
